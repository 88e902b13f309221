// Backend API seen by the dashboard controller
use crate::domain::measurement::DataPayload;
use async_trait::async_trait;

/// Settings as loose JSON, so unknown keys pass through to the form untouched
pub type SettingsMap = serde_json::Map<String, serde_json::Value>;

#[async_trait]
pub trait DashboardApi: Send + Sync {
    /// Raw SVG markup of the plant schematic
    async fn fetch_schematic(&self) -> anyhow::Result<String>;

    async fn fetch_settings(&self) -> anyhow::Result<SettingsMap>;

    /// Full measurement history as parallel arrays
    async fn fetch_data(&self) -> anyhow::Result<DataPayload>;

    /// Post a URL-encoded settings form; the backend answers with the settings now in effect
    async fn submit_settings(&self, form_body: String) -> anyhow::Result<SettingsMap>;
}
