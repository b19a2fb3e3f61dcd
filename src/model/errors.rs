use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

pub type ApiError = (StatusCode, Json<ServerError>);

#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct ServerError {
    pub error_message: String,
}

impl ServerError {
    pub fn with_message<S: Into<String>>(message: S) -> Self {
        ServerError {
            error_message: message.into(),
        }
    }
}

impl From<String> for ServerError {
    fn from(str: String) -> Self {
        ServerError::with_message(str)
    }
}

impl From<&str> for ServerError {
    fn from(str: &str) -> Self {
        ServerError::with_message(str)
    }
}

/// Builds the 500 response used whenever the JSON ledger cannot be read or written.
pub fn storage_failure(context: &str, error: anyhow::Error) -> ApiError {
    let error_message = format!("{}: {:#}", context, error);
    tracing::error!("{}", &error_message);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ServerError::with_message(error_message)),
    )
}
