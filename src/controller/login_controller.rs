use crate::model::app_state::AppState;
use crate::model::claim::Claim;
use crate::model::errors::{ApiError, ServerError};
use crate::model::login_info::{LoginCredential, LoginResponse};
use crate::shared::constants::TOKEN_LIFETIME_HOURS;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use jsonwebtoken::{encode, EncodingKey, Header};
use time::format_description::well_known::Rfc3339;
use time::{Duration, OffsetDateTime};

pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginCredential>,
) -> Result<Json<LoginResponse>, ApiError> {
    let configuration = &state.configuration;
    if configuration.bot_user_name != request.user_name
        || configuration.bot_user_pass != request.password
    {
        tracing::warn!("Rejected login attempt for {}", &request.user_name);
        return Err((
            StatusCode::UNAUTHORIZED,
            Json(ServerError::with_message("Invalid credentials.")),
        ));
    }

    let expiry = OffsetDateTime::now_utc() + Duration::hours(TOKEN_LIFETIME_HOURS);
    let token = generate_jwt_token(&configuration.jwt_secret, &request.user_name, expiry)
        .map_err(|e| {
            let error_message = format!("Failed to encode JWT token: {}", e);
            tracing::error!("{}", &error_message);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ServerError::with_message(error_message)),
            )
        })?;

    Ok(Json(LoginResponse {
        token,
        expiry: expiry.format(&Rfc3339).unwrap_or_default(),
    }))
}

pub fn generate_jwt_token(
    secret: &str,
    user_name: &str,
    expiry: OffsetDateTime,
) -> jsonwebtoken::errors::Result<String> {
    let claim = Claim {
        sub: user_name.into(),
        exp: expiry.unix_timestamp() as usize,
    };
    encode(
        &Header::default(),
        &claim,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}
