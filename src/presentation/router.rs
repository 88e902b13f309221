// Route table for the simulation API, the dashboard views and static assets
use crate::infrastructure::config::ServerSettings;
use crate::presentation::app_state::AppState;
use crate::presentation::dashboard_handlers::{
    chart_json, dashboard_page, scheme_svg, submit_settings,
};
use crate::presentation::handlers::{get_data, get_settings, health_check, index, set_settings};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub fn build_router(state: Arc<AppState>, server: &ServerSettings) -> Router {
    let api = Router::new()
        .route("/api/data/", get(get_data))
        .route("/api/settings/", get(get_settings))
        .route("/api/set/", post(set_settings))
        .layer(CorsLayer::new().allow_origin(Any));

    Router::new()
        .route("/", get(index))
        .route("/healthz", get(health_check))
        .merge(api)
        .route("/dashboard/", get(dashboard_page))
        .route("/dashboard/scheme.svg", get(scheme_svg))
        .route("/dashboard/chart.json", get(chart_json))
        .route("/dashboard/settings", post(submit_settings))
        .nest_service("/static", ServeDir::new(&server.static_dir))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
