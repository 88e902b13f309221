// HTTP response utilities
use crate::domain::settings::SettingsError;
use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    InvalidSettings(#[from] SettingsError),
    #[error("{0} is not enabled on this server")]
    Unavailable(&'static str),
    #[error("{0} has not loaded yet")]
    NotReady(&'static str),
    #[error("backend request failed: {0}")]
    Backend(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidSettings(_) => StatusCode::BAD_REQUEST,
            ApiError::Unavailable(_) => StatusCode::NOT_FOUND,
            ApiError::NotReady(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Backend(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("{}", self);
        } else {
            tracing::debug!("{}", self);
        }
        (status, self.to_string()).into_response()
    }
}

/// SVG markup with the matching content type
pub fn svg_response(markup: String) -> Response {
    ([(header::CONTENT_TYPE, "image/svg+xml")], markup).into_response()
}
