// HTTP implementation of the dashboard backend API
use crate::application::dashboard_api::{DashboardApi, SettingsMap};
use crate::domain::measurement::DataPayload;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use std::time::Duration;

pub const SCHEMATIC_PATH: &str = "static/img/simulation.svg";
pub const SETTINGS_PATH: &str = "api/settings/";
pub const DATA_PATH: &str = "api/data/";
pub const SUBMIT_PATH: &str = "api/set/";

#[derive(Debug, Clone)]
pub struct HttpDashboardApi {
    base_url: String,
    client: reqwest::Client,
}

impl HttpDashboardApi {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn checked(response: reqwest::Response, what: &str) -> Result<reqwest::Response> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("{} failed with status {}: {}", what, status, body);
        }
        Ok(response)
    }
}

#[async_trait]
impl DashboardApi for HttpDashboardApi {
    async fn fetch_schematic(&self) -> Result<String> {
        let response = self
            .client
            .get(self.url(SCHEMATIC_PATH))
            .send()
            .await
            .context("Failed to request schematic")?;

        Self::checked(response, "Schematic request")
            .await?
            .text()
            .await
            .context("Failed to read schematic")
    }

    async fn fetch_settings(&self) -> Result<SettingsMap> {
        let response = self
            .client
            .get(self.url(SETTINGS_PATH))
            .header(ACCEPT, "application/json")
            .send()
            .await
            .context("Failed to request settings")?;

        Self::checked(response, "Settings request")
            .await?
            .json::<SettingsMap>()
            .await
            .context("Failed to parse settings")
    }

    async fn fetch_data(&self) -> Result<DataPayload> {
        let response = self
            .client
            .get(self.url(DATA_PATH))
            .header(ACCEPT, "application/json")
            .send()
            .await
            .context("Failed to request data")?;

        Self::checked(response, "Data request")
            .await?
            .json::<DataPayload>()
            .await
            .context("Failed to parse data")
    }

    async fn submit_settings(&self, form_body: String) -> Result<SettingsMap> {
        tracing::debug!("Posting settings: {}", form_body);
        let response = self
            .client
            .post(self.url(SUBMIT_PATH))
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header(ACCEPT, "application/json")
            .body(form_body)
            .send()
            .await
            .context("Failed to submit settings")?;

        Self::checked(response, "Settings submit")
            .await?
            .json::<SettingsMap>()
            .await
            .context("Failed to parse settings response")
    }
}
