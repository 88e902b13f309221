// HTTP request handlers for the dashboard views
use crate::infrastructure::http_response::{svg_response, ApiError};
use crate::presentation::app_state::AppState;
use crate::presentation::page::render_page;
use axum::{
    extract::{Form, State},
    response::{Html, Redirect, Response},
    Json,
};
use std::sync::Arc;
use std::time::Instant;

pub async fn dashboard_page(State(state): State<Arc<AppState>>) -> Result<Html<String>, ApiError> {
    let view = state.dashboard()?.snapshot().await;
    Ok(Html(render_page(&view, Instant::now())))
}

/// Schematic with the latest labels
pub async fn scheme_svg(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let markup = state
        .dashboard()?
        .schematic_markup()
        .await
        .ok_or(ApiError::NotReady("schematic"))?;
    Ok(svg_response(markup))
}

/// Highstock options for the live chart
pub async fn chart_json(
    State(state): State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state
        .dashboard()?
        .chart_options()
        .await
        .map(Json)
        .ok_or(ApiError::NotReady("chart"))
}

pub async fn submit_settings(
    State(state): State<Arc<AppState>>,
    Form(form): Form<Vec<(String, String)>>,
) -> Result<Redirect, ApiError> {
    state
        .dashboard()?
        .submit(form.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        .await
        .map_err(|e| ApiError::Backend(format!("{:#}", e)))?;
    Ok(Redirect::to("/dashboard/"))
}
