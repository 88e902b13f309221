// Application state for HTTP handlers
use crate::application::dashboard_controller::DashboardController;
use crate::application::simulation_service::SimulationService;
use crate::infrastructure::http_response::ApiError;

#[derive(Clone, Default)]
pub struct AppState {
    pub simulation: Option<SimulationService>,
    pub dashboard: Option<DashboardController>,
}

impl AppState {
    pub fn simulation(&self) -> Result<&SimulationService, ApiError> {
        self.simulation
            .as_ref()
            .ok_or(ApiError::Unavailable("simulation"))
    }

    pub fn dashboard(&self) -> Result<&DashboardController, ApiError> {
        self.dashboard
            .as_ref()
            .ok_or(ApiError::Unavailable("dashboard"))
    }
}
