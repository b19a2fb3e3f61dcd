use crate::model::app_state::AppState;
use crate::model::command::CommandReply;
use crate::shared::constants::GACHA_ASSET_ROUTE;
use crate::shared::discord::ProfileError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use tower_http::services::ServeDir;

mod claim_controller;
mod credit_controller;
mod login_controller;
mod nickname_controller;
mod roll_controller;

pub fn build_router(state: AppState) -> Router {
    let gacha_directory = ServeDir::new(&state.configuration.ledger.gacha_directory);
    Router::new()
        .route("/login", post(login_controller::login))
        .merge(nickname_controller::nickname_routes())
        .merge(credit_controller::credit_routes())
        .merge(claim_controller::claim_routes())
        .merge(roll_controller::roll_routes())
        .nest_service(GACHA_ASSET_ROUTE, gacha_directory)
        .with_state(state)
}

pub(crate) fn reply<S: Into<String>>(status: StatusCode, content: S) -> Response {
    (status, Json(CommandReply::text(content))).into_response()
}

#[derive(Copy, Clone, Debug)]
pub(crate) enum ProfileAction {
    ReadMember,
    ListMembers,
    AddPoints,
    FixNickname,
}

impl ProfileAction {
    fn label(self) -> &'static str {
        match self {
            ProfileAction::ReadMember => "メンバー情報の取得",
            ProfileAction::ListMembers => "メンバー一覧の取得",
            ProfileAction::AddPoints | ProfileAction::FixNickname => "ニックネーム更新",
        }
    }

    fn forbidden_message(self) -> &'static str {
        match self {
            ProfileAction::ReadMember => "⚠️ メンバー情報を参照する権限がありません。",
            ProfileAction::ListMembers => {
                "⚠️ メンバー一覧を取得する権限がありません（Server Members Intentを確認）。"
            }
            ProfileAction::AddPoints => {
                "⚠️ ニックネームを変更する権限がありません（Botのロール位置/権限を確認）。"
            }
            ProfileAction::FixNickname => "⚠️ ニックネームを変更する権限がありません。",
        }
    }
}

pub(crate) fn profile_failure(action: ProfileAction, error: ProfileError) -> Response {
    tracing::error!("{} failed: {}", action.label(), &error);
    match error {
        ProfileError::Forbidden => reply(StatusCode::FORBIDDEN, action.forbidden_message()),
        e => reply(
            StatusCode::BAD_GATEWAY,
            format!("⚠️ {}に失敗しました: {}", action.label(), e),
        ),
    }
}
