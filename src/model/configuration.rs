use crate::shared::constants::MAX_CLAIM_COOLDOWN_HOURS;
use serde::{Deserialize, Serialize};
use time::Duration;

#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct Configuration {
    pub bot_token: String,
    pub guild_id: u64,
    pub jwt_secret: String,
    pub bot_user_name: String,
    pub bot_user_pass: String,
    pub server_bind_point: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_discord_api_base")]
    pub discord_api_base: String,
    #[serde(default)]
    pub ledger: LedgerConfiguration,
}

#[derive(Deserialize, Serialize, Clone, Debug)]
#[serde(default)]
pub struct LedgerConfiguration {
    pub initial_points: i64,
    pub nickname_max_length: usize,
    pub gacha_cost: i64,
    pub claim_reward: i64,
    pub claim_cooldown_hours: i64,
    pub users_file: String,
    pub items_file: String,
    pub gacha_directory: String,
    pub gacha_extensions: Vec<String>,
}

impl Default for LedgerConfiguration {
    fn default() -> Self {
        LedgerConfiguration {
            initial_points: 500,
            nickname_max_length: 32,
            gacha_cost: 1000,
            claim_reward: 100,
            claim_cooldown_hours: 12,
            users_file: "./data/users.json".to_string(),
            items_file: "./data/items.json".to_string(),
            gacha_directory: "./asset/gacha".to_string(),
            gacha_extensions: ["png", "jpg", "jpeg", "gif", "webp"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl LedgerConfiguration {
    pub fn claim_cooldown(&self) -> Duration {
        Duration::hours(self.claim_cooldown_hours.clamp(0, MAX_CLAIM_COOLDOWN_HOURS))
    }
}

fn default_log_level() -> String {
    "DEBUG".to_string()
}

fn default_discord_api_base() -> String {
    crate::shared::discord::BASE_URL.to_string()
}
