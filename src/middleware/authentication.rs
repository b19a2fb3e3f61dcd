use crate::model::app_state::AppState;
use crate::model::claim::Claim;
use crate::model::errors::{ApiError, ServerError};
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::{async_trait, Json, RequestPartsExt};
use axum_extra::headers::authorization::Bearer;
use axum_extra::headers::Authorization;
use axum_extra::TypedHeader;
use jsonwebtoken::{decode, DecodingKey, Validation};
use time::OffsetDateTime;

#[async_trait]
impl FromRequestParts<AppState> for Claim {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|_e| {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(ServerError::with_message("Authorization header not found")),
                )
            })?;

        let secret = &state.configuration.jwt_secret;

        match decode::<Claim>(
            bearer.token(),
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        ) {
            Ok(token) => match OffsetDateTime::from_unix_timestamp(token.claims.exp as i64) {
                Ok(expiry) if expiry > OffsetDateTime::now_utc() => {
                    tracing::debug!("Authorized {}", &token.claims.sub);
                    Ok(token.claims)
                }
                Ok(_) => Err((
                    StatusCode::UNAUTHORIZED,
                    Json(ServerError::with_message("Token expired")),
                )),
                Err(e) => {
                    tracing::error!(
                        "Failed to retrieve token expiration data from timestamp: {}",
                        e
                    );
                    Err((
                        StatusCode::BAD_REQUEST,
                        Json(ServerError::with_message(
                            "Failed to retrieve token expiration data from timestamp.",
                        )),
                    ))
                }
            },
            Err(e) => {
                tracing::warn!("Rejected bearer token: {}", e);
                Err((
                    StatusCode::UNAUTHORIZED,
                    Json(ServerError::with_message("Unauthorized")),
                ))
            }
        }
    }
}
