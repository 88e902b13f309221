// HTTP request handlers for the simulation API
use crate::domain::measurement::DataPayload;
use crate::domain::settings::SettingsPayload;
use crate::infrastructure::http_response::ApiError;
use crate::presentation::app_state::AppState;
use axum::{
    extract::{Form, State},
    response::Redirect,
    Json,
};
use std::collections::HashMap;
use std::sync::Arc;

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

pub async fn index() -> Redirect {
    Redirect::to("/dashboard/")
}

/// Measurement history as parallel arrays
pub async fn get_data(State(state): State<Arc<AppState>>) -> Result<Json<DataPayload>, ApiError> {
    Ok(Json(state.simulation()?.data().await))
}

pub async fn get_settings(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SettingsPayload>, ApiError> {
    Ok(Json(state.simulation()?.settings().await))
}

/// Apply a settings form and answer with the settings now in effect
pub async fn set_settings(
    State(state): State<Arc<AppState>>,
    Form(form): Form<HashMap<String, String>>,
) -> Result<Json<SettingsPayload>, ApiError> {
    let settings = state.simulation()?.apply_settings(&form).await?;
    Ok(Json(settings))
}
