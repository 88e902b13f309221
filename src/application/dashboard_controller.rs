// Dashboard controller - Loads the page state, keeps it live, submits settings
use crate::application::dashboard_api::DashboardApi;
use crate::domain::chart::StockChart;
use crate::domain::dashboard::Dashboard;
use crate::domain::schematic::Schematic;
use crate::domain::settings_form::SettingsForm;
use anyhow::Context;
use chrono::{Local, TimeZone};
use std::fmt::Display;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

#[derive(Clone)]
pub struct DashboardController<Tz: TimeZone = Local> {
    api: Arc<dyn DashboardApi>,
    view: Arc<RwLock<Dashboard>>,
    refresh_interval: Duration,
    tz: Tz,
}

impl DashboardController<Local> {
    pub fn new(api: Arc<dyn DashboardApi>, refresh_interval: Duration) -> Self {
        Self::with_timezone(api, refresh_interval, Local)
    }
}

impl<Tz> DashboardController<Tz>
where
    Tz: TimeZone + Send + Sync + 'static,
    Tz::Offset: Display + Send + Sync,
{
    pub fn with_timezone(api: Arc<dyn DashboardApi>, refresh_interval: Duration, tz: Tz) -> Self {
        Self {
            api,
            view: Arc::new(RwLock::new(Dashboard::new())),
            refresh_interval,
            tz,
        }
    }

    /// Copy of the current page state
    pub async fn snapshot(&self) -> Dashboard {
        self.view.read().await.clone()
    }

    pub async fn schematic_markup(&self) -> Option<String> {
        self.view
            .read()
            .await
            .schematic
            .as_ref()
            .map(|s| s.markup().to_string())
    }

    pub async fn chart_options(&self) -> Option<serde_json::Value> {
        self.view.read().await.chart.as_ref().map(StockChart::to_options)
    }

    /// Fetch the SVG schematic; the dashboard works without it
    pub async fn load_schematic(&self) -> bool {
        match self.api.fetch_schematic().await {
            Ok(markup) => {
                self.view.write().await.schematic = Some(Schematic::new(markup));
                true
            }
            Err(e) => {
                tracing::warn!("Could not load schematic: {:#}", e);
                false
            }
        }
    }

    /// Startup sequence: schematic, empty sliders, settings, then history
    pub async fn initialize(&self) -> anyhow::Result<()> {
        self.load_schematic().await;
        self.view.write().await.form = SettingsForm::default();

        let settings = self
            .api
            .fetch_settings()
            .await
            .context("Failed to load initial settings")?;
        self.view.write().await.form.apply_settings(&settings);

        let data = self
            .api
            .fetch_data()
            .await
            .context("Failed to load history")?;
        let chart = StockChart::from_data(&data);
        tracing::info!(
            "Dashboard initialized with {} samples",
            chart.series.first().map(|s| s.data.len()).unwrap_or(0)
        );
        self.view.write().await.chart = Some(chart);

        Ok(())
    }

    /// Pull the latest data and patch schematic labels and chart series
    pub async fn refresh(&self) -> anyhow::Result<()> {
        let data = self
            .api
            .fetch_data()
            .await
            .context("Failed to refresh data")?;

        let mut view = self.view.write().await;
        if let Some(schematic) = view.schematic.as_mut() {
            let patched = schematic.apply_data(&data, &self.tz);
            tracing::trace!("Patched {} schematic labels", patched);
        }
        view.chart
            .get_or_insert_with(StockChart::default)
            .update(&data);
        Ok(())
    }

    /// Submit the settings form with the given edits applied first
    pub async fn submit<'a>(
        &self,
        edits: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> anyhow::Result<()> {
        let body = {
            let mut view = self.view.write().await;
            view.form.apply_edits(edits);
            view.form.serialize()
        };

        let settings = self
            .api
            .submit_settings(body)
            .await
            .context("Failed to submit settings")?;

        let mut view = self.view.write().await;
        view.submit.succeeded(Instant::now());
        view.form.apply_settings(&settings);
        tracing::info!("Settings submitted");
        Ok(())
    }

    /// Initialize, then refresh on a fixed interval. A slow request delays the
    /// next tick instead of overlapping it.
    pub async fn run(self) {
        if let Err(e) = self.initialize().await {
            tracing::warn!("Dashboard not started: {:#}", e);
            return;
        }

        let mut ticker = tokio::time::interval(self.refresh_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // the first tick completes immediately
        ticker.tick().await;
        self.view.write().await.live = true;

        loop {
            ticker.tick().await;
            if let Err(e) = self.refresh().await {
                tracing::warn!("{:#}", e);
            }
        }
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::dashboard_api::SettingsMap;
    use crate::domain::measurement::DataPayload;
    use crate::domain::settings_form::ButtonStyle;
    use async_trait::async_trait;
    use chrono::Utc;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    const SVG: &str = r#"<svg><text id="time">-</text><text id="hs_level">-</text></svg>"#;

    #[derive(Default)]
    struct FakeApi {
        schematic: Option<String>,
        data: Mutex<Vec<DataPayload>>,
        fail_settings: bool,
        posted: Mutex<Vec<String>>,
    }

    fn data(json: serde_json::Value) -> DataPayload {
        serde_json::from_value(json).unwrap()
    }

    fn settings() -> SettingsMap {
        json!({
            "average_thermal_demand": 20.0,
            "hs_capacity": 700.0,
            "sim_forward": "",
            "daily_thermal_demand": vec![0.5; 24],
        })
        .as_object()
        .cloned()
        .unwrap()
    }

    #[async_trait]
    impl DashboardApi for FakeApi {
        async fn fetch_schematic(&self) -> anyhow::Result<String> {
            self.schematic
                .clone()
                .ok_or_else(|| anyhow::anyhow!("404 Not Found"))
        }

        async fn fetch_settings(&self) -> anyhow::Result<SettingsMap> {
            if self.fail_settings {
                anyhow::bail!("connection refused");
            }
            Ok(settings())
        }

        async fn fetch_data(&self) -> anyhow::Result<DataPayload> {
            let mut queue = self.data.lock().unwrap();
            if queue.is_empty() {
                anyhow::bail!("no data");
            }
            Ok(if queue.len() > 1 {
                queue.remove(0)
            } else {
                queue[0].clone()
            })
        }

        async fn submit_settings(&self, form_body: String) -> anyhow::Result<SettingsMap> {
            self.posted.lock().unwrap().push(form_body);
            let mut response = settings();
            response.insert("hs_capacity".into(), json!(900.0));
            Ok(response)
        }
    }

    fn controller(api: FakeApi) -> (DashboardController<Utc>, Arc<FakeApi>) {
        let api = Arc::new(api);
        let controller =
            DashboardController::with_timezone(api.clone(), Duration::from_millis(20), Utc);
        (controller, api)
    }

    fn history() -> DataPayload {
        data(json!({
            "time": ["1400000000"],
            "cu_workload": [99.0],
            "plb_workload": [0.0],
            "hs_level": [4.3],
            "thermal_consumption": [26.0],
        }))
    }

    #[tokio::test]
    async fn test_initialize_loads_everything() {
        let (controller, _) = controller(FakeApi {
            schematic: Some(SVG.to_string()),
            data: Mutex::new(vec![history()]),
            ..Default::default()
        });
        controller.initialize().await.unwrap();

        let view = controller.snapshot().await;
        assert!(view.schematic.is_some());
        assert_eq!(view.form.sliders()[0], 5000);
        assert_eq!(view.form.field("hs_capacity"), Some("700"));
        let chart = view.chart.unwrap();
        assert_eq!(chart.series[2].data.len(), 1);
        assert_eq!(chart.series[2].data[0].time_ms, 1_400_000_000_000);
    }

    #[tokio::test]
    async fn test_initialize_without_schematic() {
        let (controller, _) = controller(FakeApi {
            data: Mutex::new(vec![history()]),
            ..Default::default()
        });
        controller.initialize().await.unwrap();
        assert!(controller.schematic_markup().await.is_none());
        assert!(controller.chart_options().await.is_some());
    }

    #[tokio::test]
    async fn test_initialize_fails_without_settings() {
        let (controller, _) = controller(FakeApi {
            fail_settings: true,
            data: Mutex::new(vec![history()]),
            ..Default::default()
        });
        assert!(controller.initialize().await.is_err());
        assert!(controller.snapshot().await.chart.is_none());
    }

    #[tokio::test]
    async fn test_refresh_patches_schematic_and_chart() {
        let newer = data(json!({
            "time": ["1400000000", "1400003600"],
            "cu_workload": [99.0, 80.0],
            "plb_workload": [0.0, 0.0],
            "hs_level": [4.3, 8.25],
            "thermal_consumption": [26.0, 24.5],
        }));
        let (controller, _) = controller(FakeApi {
            schematic: Some(SVG.to_string()),
            data: Mutex::new(vec![history(), newer]),
            ..Default::default()
        });
        controller.initialize().await.unwrap();
        controller.refresh().await.unwrap();

        let markup = controller.schematic_markup().await.unwrap();
        assert!(markup.contains(r#"<text id="hs_level">8.25 %</text>"#));
        assert!(markup.contains(r#"<text id="time">Tue May 13 2014 17:53:20</text>"#));

        let view = controller.snapshot().await;
        let chart = view.chart.unwrap();
        assert_eq!(chart.series[0].data.len(), 2);
        assert_eq!(chart.revision, 2);
    }

    #[tokio::test]
    async fn test_refresh_error_keeps_view() {
        let (controller, api) = controller(FakeApi {
            data: Mutex::new(vec![history()]),
            ..Default::default()
        });
        controller.initialize().await.unwrap();
        api.data.lock().unwrap().clear();

        assert!(controller.refresh().await.is_err());
        assert_eq!(controller.snapshot().await.chart.unwrap().series[0].data.len(), 1);
    }

    #[tokio::test]
    async fn test_submit_posts_form_and_applies_response() {
        let (controller, api) = controller(FakeApi {
            data: Mutex::new(vec![history()]),
            ..Default::default()
        });
        controller.initialize().await.unwrap();
        controller
            .submit([("hs_capacity", "900"), ("daily_thermal_demand_2", "2500")])
            .await
            .unwrap();

        let posted = api.posted.lock().unwrap().clone();
        assert_eq!(posted.len(), 1);
        assert!(posted[0].contains("hs_capacity=900&"));
        assert!(posted[0].contains("&daily_thermal_demand_1=0.5&daily_thermal_demand_2=0.25&"));

        let view = controller.snapshot().await;
        assert_eq!(view.form.field("hs_capacity"), Some("900"));
        // the response resets the edited slider
        assert_eq!(view.form.sliders()[2], 5000);
        assert_eq!(view.submit.style(Instant::now()), ButtonStyle::Success);
    }

    /// Answers every data request after a delay longer than the refresh interval
    struct SlowApi {
        delay: Duration,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl DashboardApi for SlowApi {
        async fn fetch_schematic(&self) -> anyhow::Result<String> {
            Ok(SVG.to_string())
        }

        async fn fetch_settings(&self) -> anyhow::Result<SettingsMap> {
            Ok(settings())
        }

        async fn fetch_data(&self) -> anyhow::Result<DataPayload> {
            let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(running, Ordering::SeqCst);
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(history())
        }

        async fn submit_settings(&self, _form_body: String) -> anyhow::Result<SettingsMap> {
            Ok(settings())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_keeps_one_request_in_flight() {
        let api = Arc::new(SlowApi {
            delay: Duration::from_millis(50),
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            calls: AtomicUsize::new(0),
        });
        let controller =
            DashboardController::with_timezone(api.clone(), Duration::from_millis(20), Utc);

        let handle = controller.clone().spawn();
        // twenty five refresh intervals
        tokio::time::sleep(Duration::from_millis(500)).await;
        handle.abort();

        assert!(controller.snapshot().await.live);
        assert!(api.calls.load(Ordering::SeqCst) >= 4);
        assert_eq!(api.peak.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_run_goes_live() {
        let (controller, _) = controller(FakeApi {
            data: Mutex::new(vec![history()]),
            ..Default::default()
        });
        let handle = controller.clone().spawn();
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(controller.snapshot().await.live);
        handle.abort();
    }
}
