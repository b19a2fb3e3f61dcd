use crate::controller::build_router;
use crate::model::app_state::AppState;
use crate::shared::discord::DiscordClient;
use crate::shared::file_ledger::FileLedger;
use std::str::FromStr;
use std::sync::Arc;

mod controller;
mod middleware;
mod model;
mod shared;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let configuration = shared::configuration::initialize()?;

    let log_level =
        tracing::Level::from_str(&configuration.log_level).unwrap_or(tracing::Level::DEBUG);
    tracing_subscriber::fmt().with_max_level(log_level).init();

    let members = Arc::new(DiscordClient::new(
        &configuration.discord_api_base,
        &configuration.bot_token,
    ));
    let file_ledger = FileLedger::from_configuration(&configuration.ledger);
    let bind_point = configuration.server_bind_point.clone();
    tracing::info!(
        "Serving guild {} with ledger files {} and {}.",
        configuration.guild_id,
        &configuration.ledger.users_file,
        &configuration.ledger.items_file
    );

    let state = AppState {
        configuration: Arc::new(configuration),
        members,
        file_ledger,
    };
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_point).await?;
    tracing::info!("Listening on {}", &bind_point);
    axum::serve(listener, app).await?;
    Ok(())
}
