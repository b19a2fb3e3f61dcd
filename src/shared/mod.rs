use once_cell::sync::Lazy;

pub mod configuration;
pub mod constants;
pub mod discord;
pub mod file_ledger;
pub mod gacha;
pub mod json_store;
pub mod name_ledger;

pub static HTTP_CLIENT: Lazy<reqwest::Client> = Lazy::new(reqwest::Client::new);
