use crate::controller::{profile_failure, reply, ProfileAction};
use crate::model::app_state::AppState;
use crate::model::claim::Claim;
use crate::model::command::{AddPointsRequest, CommandUser, InvokerRequest};
use crate::shared::name_ledger::NicknameLedger;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::routing::{get, post};
use axum::{Json, Router};
use futures::TryStreamExt;

pub fn nickname_routes() -> Router<AppState> {
    Router::new()
        .route("/nickname/init", post(init_here))
        .route("/nickname/:user_id", get(get_points).patch(add_points))
        .route("/nickname/:user_id/fix", post(fix_nickname))
}

fn missing_permission(invoker: &CommandUser) -> Option<Response> {
    if invoker.can_manage_nicknames() {
        None
    } else {
        tracing::warn!("{} lacks the manage nicknames permission.", invoker.user_id);
        Some(reply(
            StatusCode::FORBIDDEN,
            "⚠️ このコマンドを実行するにはニックネームの管理権限が必要です。",
        ))
    }
}

async fn get_points(
    _claim: Claim,
    State(state): State<AppState>,
    Path(user_id): Path<u64>,
) -> Response {
    let ledger = state.nickname_ledger();
    match ledger.member(user_id).await {
        Ok(member) => reply(
            StatusCode::OK,
            format!(
                "{} のポイントは **{}pt** です！",
                member.mention(),
                ledger.get(&member)
            ),
        ),
        Err(e) => profile_failure(ProfileAction::ReadMember, e),
    }
}

async fn add_points(
    _claim: Claim,
    State(state): State<AppState>,
    Path(user_id): Path<u64>,
    Json(request): Json<AddPointsRequest>,
) -> Response {
    if let Some(rejection) = missing_permission(&request.invoker) {
        return rejection;
    }

    let ledger = state.nickname_ledger();
    let member = match ledger.member(user_id).await {
        Ok(member) => member,
        Err(e) => return profile_failure(ProfileAction::ReadMember, e),
    };

    let new_points = ledger.get(&member).saturating_add(request.amount);
    match ledger.set(&member, new_points).await {
        Ok(_) => reply(
            StatusCode::OK,
            format!(
                "{} に **{}pt** 反映しました。合計 **{}pt**",
                member.mention(),
                request.amount,
                new_points.max(0)
            ),
        ),
        Err(e) => profile_failure(ProfileAction::AddPoints, e),
    }
}

async fn fix_nickname(
    _claim: Claim,
    State(state): State<AppState>,
    Path(user_id): Path<u64>,
    Json(request): Json<InvokerRequest>,
) -> Response {
    let ledger = state.nickname_ledger();
    let member = match ledger.member(user_id).await {
        Ok(member) => member,
        Err(e) => return profile_failure(ProfileAction::ReadMember, e),
    };

    let points = ledger.get(&member);
    match ledger.set(&member, points).await {
        Ok(_) if user_id == request.invoker.user_id => reply(
            StatusCode::OK,
            "🔧 あなたのニックネームをポイント表記に修復しました。",
        ),
        Ok(_) => reply(
            StatusCode::OK,
            format!("🔧 {} のニックネームを修復しました。", member.mention()),
        ),
        Err(e) => profile_failure(ProfileAction::FixNickname, e),
    }
}

async fn init_here(
    _claim: Claim,
    State(state): State<AppState>,
    Json(request): Json<InvokerRequest>,
) -> Response {
    if let Some(rejection) = missing_permission(&request.invoker) {
        return rejection;
    }

    let ledger = state.nickname_ledger();
    let pages = ledger.member_pages();
    futures::pin_mut!(pages);

    let mut updated = 0usize;
    let mut failed = 0usize;
    loop {
        let page = match pages.try_next().await {
            Ok(Some(page)) => page,
            Ok(None) => break,
            Err(e) => return profile_failure(ProfileAction::ListMembers, e),
        };

        for member in page
            .iter()
            .filter(|member| !member.is_bot() && !NicknameLedger::has_points(member))
        {
            match ledger.set(member, ledger.initial_points()).await {
                Ok(_) => updated += 1,
                Err(e) => {
                    tracing::warn!("Failed to initialize {}: {}", &member.user.id, e);
                    failed += 1;
                }
            }
        }
    }

    tracing::info!("Initialized {} members, {} failed.", updated, failed);
    reply(
        StatusCode::OK,
        format!("✅ 初期化完了: 付与 {} 人 / 失敗 {} 人", updated, failed),
    )
}
