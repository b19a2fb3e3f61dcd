use crate::controller::reply;
use crate::model::app_state::AppState;
use crate::model::claim::Claim;
use crate::model::errors::{storage_failure, ApiError, ServerError};
use crate::model::user_credit::{UserCreditUpdateInfo, UserCreditUpdateOpt};
use crate::shared::file_ledger::AdjustOutcome;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::routing::{get, patch};
use axum::{Json, Router};

pub fn credit_routes() -> Router<AppState> {
    Router::new()
        .route("/credit/:user_id", get(get_user_credits))
        .route("/credit/:user_id/plus", patch(add_credit))
        .route("/credit/:user_id/minus", patch(reduce_credit))
}

async fn get_user_credits(
    _claim: Claim,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Response, ApiError> {
    let points = state
        .file_ledger
        .balance(&user_id)
        .await
        .map_err(|e| storage_failure("Failed to read user credits", e))?;
    Ok(reply(
        StatusCode::OK,
        format!("<@{}> のポイントは **{}pt** です！", &user_id, points),
    ))
}

async fn add_credit(
    claim: Claim,
    state: State<AppState>,
    user_id: Path<String>,
    request: Json<UserCreditUpdateInfo>,
) -> Result<Response, ApiError> {
    adjust_credit(claim, state, user_id, request, UserCreditUpdateOpt::Plus).await
}

async fn reduce_credit(
    claim: Claim,
    state: State<AppState>,
    user_id: Path<String>,
    request: Json<UserCreditUpdateInfo>,
) -> Result<Response, ApiError> {
    adjust_credit(claim, state, user_id, request, UserCreditUpdateOpt::Minus).await
}

async fn adjust_credit(
    _claim: Claim,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(request): Json<UserCreditUpdateInfo>,
    opt: UserCreditUpdateOpt,
) -> Result<Response, ApiError> {
    if request.credit < 0 {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ServerError::with_message(
                "The amount of credits has to be greater than 0.",
            )),
        ));
    }

    let amount = request.credit;
    let outcome = state
        .file_ledger
        .adjust(&user_id, request, opt)
        .await
        .map_err(|e| storage_failure("Failed to update user's credit", e))?;
    tracing::info!("{:?} {} for {}: {:?}", opt, amount, &user_id, &outcome);

    let response = match (outcome, opt) {
        (AdjustOutcome::Updated { points }, UserCreditUpdateOpt::Plus) => reply(
            StatusCode::OK,
            format!(
                "<@{}> に **{}pt** 付与しました。合計 **{}pt**",
                &user_id, amount, points
            ),
        ),
        (AdjustOutcome::Updated { points }, UserCreditUpdateOpt::Minus) => reply(
            StatusCode::OK,
            format!(
                "<@{}> から **{}pt** 差し引きました。合計 **{}pt**",
                &user_id, amount, points
            ),
        ),
        (AdjustOutcome::Insufficient { points }, _) => reply(
            StatusCode::ACCEPTED,
            format!(
                "ポイントが足りません。（必要 **{}pt** / 所持 **{}pt**）",
                amount, points
            ),
        ),
    };
    Ok(response)
}

#[cfg(test)]
mod tests {
    use crate::controller::test_support::{reply_of, send, TestContext};
    use crate::shared::discord::testing::InMemoryDirectory;
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    #[tokio::test]
    async fn new_users_start_with_zero() {
        let context = TestContext::new(InMemoryDirectory::default());
        let response = send(&context, Method::GET, "/credit/5", None).await;
        assert_eq!(response.0, StatusCode::OK);
        assert_eq!(reply_of(&response).content, "<@5> のポイントは **0pt** です！");
    }

    #[tokio::test]
    async fn plus_then_minus_updates_the_balance() {
        let context = TestContext::new(InMemoryDirectory::default());
        let response = send(
            &context,
            Method::PATCH,
            "/credit/5/plus",
            Some(json!({ "credit": 1200 })),
        )
        .await;
        assert_eq!(
            reply_of(&response).content,
            "<@5> に **1200pt** 付与しました。合計 **1200pt**"
        );

        let response = send(
            &context,
            Method::PATCH,
            "/credit/5/minus",
            Some(json!({ "credit": 200 })),
        )
        .await;
        assert_eq!(response.0, StatusCode::OK);
        assert_eq!(context.state.file_ledger.balance("5").await.unwrap(), 1000);
    }

    #[tokio::test]
    async fn minus_beyond_the_balance_is_rejected() {
        let context = TestContext::new(InMemoryDirectory::default());
        let response = send(
            &context,
            Method::PATCH,
            "/credit/5/minus",
            Some(json!({ "credit": 10 })),
        )
        .await;
        assert_eq!(response.0, StatusCode::ACCEPTED);
        assert_eq!(context.state.file_ledger.balance("5").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn negative_amounts_are_bad_requests() {
        let context = TestContext::new(InMemoryDirectory::default());
        let response = send(
            &context,
            Method::PATCH,
            "/credit/5/plus",
            Some(json!({ "credit": -10 })),
        )
        .await;
        assert_eq!(response.0, StatusCode::BAD_REQUEST);
    }
}
