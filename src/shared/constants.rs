pub const CONFIG_DIRECTORY: &str = "./config";
pub const GACHA_ASSET_ROUTE: &str = "/asset/gacha";
pub const TOKEN_LIFETIME_HOURS: i64 = 1;
pub const MAX_CLAIM_COOLDOWN_HOURS: i64 = 24 * 366;
