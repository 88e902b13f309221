// Dashboard view model: everything the page shows
use super::chart::StockChart;
use super::schematic::Schematic;
use super::settings_form::{SettingsForm, SubmitState};

#[derive(Debug, Clone, Default)]
pub struct Dashboard {
    /// Absent until the SVG has been fetched
    pub schematic: Option<Schematic>,
    /// Absent until the history has been loaded
    pub chart: Option<StockChart>,
    pub form: SettingsForm,
    pub submit: SubmitState,
    /// Set once the refresh loop is running
    pub live: bool,
}

impl Dashboard {
    pub fn new() -> Self {
        Self::default()
    }
}
