pub mod fake_vault;
pub mod fixtures;
