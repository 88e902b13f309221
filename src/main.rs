// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use crate::application::dashboard_controller::DashboardController;
use crate::application::simulation_service::SimulationService;
use crate::infrastructure::config::load_app_config;
use crate::infrastructure::http_client::HttpDashboardApi;
use crate::presentation::app_state::AppState;
use crate::presentation::router::build_router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = load_app_config()?;
    let addr = config.server.addr()?;

    // Simulation backend (application layer)
    let simulation = config
        .simulation
        .enabled
        .then(|| SimulationService::new(&config.simulation));

    // Dashboard controller, talking to the backend over HTTP
    let dashboard = if config.dashboard.enabled {
        let backend_url = config.dashboard.backend_url_for(&config.server);
        tracing::info!("Dashboard backend: {}", backend_url);
        let api = HttpDashboardApi::new(&backend_url, config.dashboard.request_timeout())?;
        Some(DashboardController::new(
            Arc::new(api),
            config.dashboard.refresh_interval(),
        ))
    } else {
        None
    };

    // Create application state
    let state = Arc::new(AppState {
        simulation: simulation.clone(),
        dashboard: dashboard.clone(),
    });

    // Build router (presentation layer)
    let router = build_router(state, &config.server);

    // Bind before the dashboard starts polling so its first requests land
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Starting chp-dashboard on {}", addr);

    if let Some(simulation) = simulation {
        simulation.spawn();
    }
    if let Some(dashboard) = dashboard {
        dashboard.spawn();
    }

    axum::serve(listener, router).await?;

    Ok(())
}
