use crate::controller::reply;
use crate::model::app_state::AppState;
use crate::model::claim::Claim;
use crate::model::command::{Attachment, CommandReply};
use crate::model::errors::{storage_failure, ApiError};
use crate::model::user_roll::UserRollHistory;
use crate::shared::constants::GACHA_ASSET_ROUTE;
use crate::shared::file_ledger::DrawOutcome;
use crate::shared::gacha::load_reward_pool;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use rand::rngs::StdRng;
use rand::SeedableRng;
use url::Url;

pub fn roll_routes() -> Router<AppState> {
    Router::new()
        .route("/gacha/:user_id", get(get_user_rolls))
        .route("/gacha/:user_id/draw", post(post_user_roll))
}

async fn post_user_roll(
    _claim: Claim,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Response, ApiError> {
    let ledger_configuration = &state.configuration.ledger;
    let cost = ledger_configuration.gacha_cost;
    let pool = load_reward_pool(
        std::path::Path::new(&ledger_configuration.gacha_directory),
        &ledger_configuration.gacha_extensions,
    )
    .await
    .map_err(|e| storage_failure("Failed to load gacha rewards", e))?;

    let mut rng = StdRng::from_entropy();
    let outcome = state
        .file_ledger
        .draw(&user_id, cost, &pool, &mut rng)
        .await
        .map_err(|e| storage_failure("Failed to record gacha draw", e))?;

    let response = match outcome {
        DrawOutcome::Drawn { item, points } => {
            tracing::info!("{} drew {} ({} points left).", &user_id, &item, points);
            let attachment = Attachment {
                url: reward_url(&item)
                    .map_err(|e| storage_failure("Failed to build reward URL", e))?,
                filename: item.clone(),
            };
            (
                StatusCode::CREATED,
                Json(CommandReply::with_attachment(
                    format!(
                        "🎉 <@{}> は **{}** を引き当てました！残り **{}pt**",
                        &user_id, &item, points
                    ),
                    attachment,
                )),
            )
                .into_response()
        }
        DrawOutcome::Insufficient { points } => reply(
            StatusCode::ACCEPTED,
            format!(
                "ポイントが足りません。（必要 **{}pt** / 所持 **{}pt**）",
                cost, points
            ),
        ),
        DrawOutcome::EmptyPool => {
            tracing::warn!(
                "No rewards found in {}.",
                &ledger_configuration.gacha_directory
            );
            reply(StatusCode::ACCEPTED, "景品がまだ用意されていません。")
        }
    };
    Ok(response)
}

/// Path of a reward under the static route, with the file name percent-encoded
/// as a single segment.
fn reward_url(item: &str) -> anyhow::Result<String> {
    let mut url = Url::parse("http://localhost")?;
    url.path_segments_mut()
        .map_err(|_| anyhow::anyhow!("Reward URL has no path"))?
        .extend(GACHA_ASSET_ROUTE.split('/').filter(|segment| !segment.is_empty()))
        .push(item);
    Ok(url.path().to_string())
}

async fn get_user_rolls(
    _claim: Claim,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<UserRollHistory>, ApiError> {
    let items = state
        .file_ledger
        .items(&user_id)
        .await
        .map_err(|e| storage_failure("Failed to read user rolls", e))?;
    Ok(Json(UserRollHistory { user_id, items }))
}
