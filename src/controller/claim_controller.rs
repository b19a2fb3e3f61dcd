use crate::controller::reply;
use crate::model::app_state::AppState;
use crate::model::claim::Claim;
use crate::model::errors::{storage_failure, ApiError};
use crate::shared::file_ledger::ClaimOutcome;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::routing::post;
use axum::Router;
use time::{Duration, OffsetDateTime};

pub fn claim_routes() -> Router<AppState> {
    Router::new().route("/credit/:user_id/claim", post(claim_reward))
}

async fn claim_reward(
    _claim: Claim,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Response, ApiError> {
    let ledger_configuration = &state.configuration.ledger;
    let reward = ledger_configuration.claim_reward;
    let cooldown = ledger_configuration.claim_cooldown();

    let outcome = state
        .file_ledger
        .claim(&user_id, OffsetDateTime::now_utc(), cooldown, reward)
        .await
        .map_err(|e| storage_failure("Failed to claim periodic reward", e))?;

    let response = match outcome {
        ClaimOutcome::Granted { points } => {
            tracing::info!("{} claimed {} points.", &user_id, reward);
            reply(
                StatusCode::OK,
                format!(
                    "🎁 <@{}> が **{}pt** を受け取りました！合計 **{}pt**",
                    &user_id, reward, points
                ),
            )
        }
        ClaimOutcome::CoolingDown { remaining } => reply(
            StatusCode::ACCEPTED,
            format!(
                "⏳ 次に受け取れるまであと **{}** です。",
                format_remaining(remaining)
            ),
        ),
    };
    Ok(response)
}

/// `"3時間5分"`, rounding partial minutes up.
fn format_remaining(remaining: Duration) -> String {
    let minutes = (remaining.whole_seconds().max(0) + 59) / 60;
    format!("{}時間{}分", minutes / 60, minutes % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::test_support::{reply_of, send, TestContext};
    use crate::model::configuration::{Configuration, LedgerConfiguration};
    use crate::shared::discord::testing::InMemoryDirectory;
    use axum::http::Method;
    use std::sync::Arc;

    #[test]
    fn remaining_time_rounds_up_to_the_minute() {
        assert_eq!(format_remaining(Duration::hours(1)), "1時間0分");
        assert_eq!(format_remaining(Duration::seconds(61)), "0時間2分");
        assert_eq!(
            format_remaining(Duration::hours(11) + Duration::minutes(59) + Duration::seconds(1)),
            "12時間0分"
        );
    }

    #[tokio::test]
    async fn second_claim_within_the_cooldown_is_rejected() {
        let context = TestContext::new(InMemoryDirectory::default());
        let first = send(&context, Method::POST, "/credit/8/claim", None).await;
        assert_eq!(first.0, StatusCode::OK);
        assert_eq!(
            reply_of(&first).content,
            "🎁 <@8> が **100pt** を受け取りました！合計 **100pt**"
        );

        let second = send(&context, Method::POST, "/credit/8/claim", None).await;
        assert_eq!(second.0, StatusCode::ACCEPTED);
        assert!(reply_of(&second).content.starts_with("⏳ 次に受け取れるまであと **1"));
        assert_eq!(context.state.file_ledger.balance("8").await.unwrap(), 100);
    }

    #[tokio::test]
    async fn oversized_cooldown_setting_still_answers() {
        let mut context = TestContext::new(InMemoryDirectory::default());
        let configuration = Configuration {
            ledger: LedgerConfiguration {
                claim_cooldown_hours: i64::MAX,
                ..context.state.configuration.ledger.clone()
            },
            ..(*context.state.configuration).clone()
        };
        context.state.configuration = Arc::new(configuration);

        let first = send(&context, Method::POST, "/credit/8/claim", None).await;
        assert_eq!(first.0, StatusCode::OK);
        let second = send(&context, Method::POST, "/credit/8/claim", None).await;
        assert_eq!(second.0, StatusCode::ACCEPTED);
        assert!(reply_of(&second).content.starts_with("⏳ 次に受け取れるまであと **878"));
    }
}
