use crate::model::configuration::{Configuration, LedgerConfiguration};
use crate::shared::constants::{CONFIG_DIRECTORY, MAX_CLAIM_COOLDOWN_HOURS};
use anyhow::Context;

const CONFIGURATION_FILE_NAME: &str = "/config.toml";

pub fn initialize() -> anyhow::Result<Configuration> {
    if !std::path::Path::new(CONFIG_DIRECTORY).exists() {
        std::fs::create_dir(CONFIG_DIRECTORY)?;
    }

    let configuration_path = String::from(CONFIG_DIRECTORY) + CONFIGURATION_FILE_NAME;
    if !std::path::Path::new(&configuration_path).exists() {
        // Read from environment variables
        let configuration = from_environment()?;
        validate(&configuration.ledger)?;
        let serialized_toml = toml::to_string_pretty(&configuration)?;
        std::fs::write(&configuration_path, serialized_toml)?;
        Ok(configuration)
    } else {
        let toml = std::fs::read_to_string(&configuration_path)?;
        let deserialized_toml = toml::from_str::<Configuration>(&toml)
            .with_context(|| format!("Failed to parse {}", &configuration_path))?;
        validate(&deserialized_toml.ledger)
            .with_context(|| format!("Invalid ledger settings in {}", &configuration_path))?;
        Ok(deserialized_toml)
    }
}

pub fn validate(ledger: &LedgerConfiguration) -> anyhow::Result<()> {
    anyhow::ensure!(
        ledger.initial_points >= 0,
        "initial_points must not be negative, got {}",
        ledger.initial_points
    );
    anyhow::ensure!(
        ledger.gacha_cost >= 0,
        "gacha_cost must not be negative, got {}",
        ledger.gacha_cost
    );
    anyhow::ensure!(
        ledger.claim_reward >= 0,
        "claim_reward must not be negative, got {}",
        ledger.claim_reward
    );
    anyhow::ensure!(
        (0..=MAX_CLAIM_COOLDOWN_HOURS).contains(&ledger.claim_cooldown_hours),
        "claim_cooldown_hours must be between 0 and {}, got {}",
        MAX_CLAIM_COOLDOWN_HOURS,
        ledger.claim_cooldown_hours
    );
    anyhow::ensure!(
        ledger.nickname_max_length > 0,
        "nickname_max_length must be at least 1"
    );
    Ok(())
}

fn from_environment() -> anyhow::Result<Configuration> {
    let mut ledger = LedgerConfiguration::default();
    if let Some(initial_points) = optional_env("INITIAL_POINTS")? {
        ledger.initial_points = initial_points;
    }
    if let Some(gacha_cost) = optional_env("GACHA_COST")? {
        ledger.gacha_cost = gacha_cost;
    }
    if let Ok(gacha_directory) = std::env::var("GACHA_DIRECTORY") {
        ledger.gacha_directory = gacha_directory;
    }

    Ok(Configuration {
        bot_token: required_env("BOT_TOKEN")?,
        guild_id: required_env("GUILD_ID")?
            .parse()
            .context("GUILD_ID has to be a numeric guild id")?,
        jwt_secret: required_env("JWT_SECRET")?,
        bot_user_name: required_env("BOT_USERNAME")?,
        bot_user_pass: required_env("BOT_USERPASS")?,
        server_bind_point: required_env("SERVER_BIND_POINT")?,
        log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "DEBUG".to_string()),
        discord_api_base: crate::shared::discord::BASE_URL.to_string(),
        ledger,
    })
}

fn required_env(key: &str) -> anyhow::Result<String> {
    std::env::var(key).with_context(|| format!("Missing environment variable {}", key))
}

fn optional_env(key: &str) -> anyhow::Result<Option<i64>> {
    match std::env::var(key) {
        Ok(value) => Ok(Some(
            value
                .parse()
                .with_context(|| format!("Failed to parse {}='{}'", key, value))?,
        )),
        Err(_) => Ok(None),
    }
}
