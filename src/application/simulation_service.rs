// Simulation service - Runs the plant against a paced clock and records measurements
use crate::domain::measurement::{DataPayload, Measurement, MeasurementLog};
use crate::domain::plant::Plant;
use crate::domain::settings::{SettingsError, SettingsPayload, SettingsUpdate};
use crate::infrastructure::config::SimulationSettings;
use chrono::{Local, TimeZone, Timelike};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// Simulated seconds per step
pub const STEP_SECONDS: i64 = 3600;

/// Longest fast forward accepted in one request, one simulated year
pub const MAX_FORWARD_HOURS: f64 = 24.0 * 365.0;

struct SimulationState {
    plant: Plant,
    log: MeasurementLog,
    rng: StdRng,
    start_epoch: i64,
    /// Simulated seconds since start
    now: i64,
    /// Simulated seconds still to run without pacing
    forward: i64,
}

#[derive(Clone)]
pub struct SimulationService {
    state: Arc<Mutex<SimulationState>>,
    step_interval: Duration,
}

impl SimulationService {
    pub fn new(settings: &SimulationSettings) -> Self {
        let start_epoch = settings
            .start_epoch
            .unwrap_or_else(|| chrono::Utc::now().timestamp());
        let rng = match settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            state: Arc::new(Mutex::new(SimulationState {
                plant: Plant::default(),
                log: MeasurementLog::default(),
                rng,
                start_epoch,
                now: 0,
                forward: 0,
            })),
            step_interval: settings.step_interval(),
        }
    }

    pub async fn data(&self) -> DataPayload {
        self.state.lock().await.log.snapshot()
    }

    pub async fn settings(&self) -> SettingsPayload {
        self.state.lock().await.plant.settings()
    }

    /// Apply a submitted settings form. Nothing is applied if any field is invalid.
    pub async fn apply_settings(
        &self,
        form: &HashMap<String, String>,
    ) -> Result<SettingsPayload, SettingsError> {
        let update = SettingsUpdate::from_form(form)?;

        let mut state = self.state.lock().await;
        state.plant.apply(&update);
        if let Some(requested) = update.sim_forward_hours {
            let hours = requested.clamp(0.0, MAX_FORWARD_HOURS);
            if hours != requested {
                tracing::warn!("Fast forward of {} h clamped to {} h", requested, hours);
            }
            state.forward = (hours * STEP_SECONDS as f64) as i64;
            tracing::info!("Fast forwarding simulation by {} h", hours);
        }
        tracing::info!("Simulation settings updated");

        Ok(state.plant.settings())
    }

    /// Advance the plant by one hour and record a measurement.
    /// The flag is true while fast forwarding, i.e. the step needs no pacing.
    pub async fn step(&self) -> (Measurement, bool) {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;

        let time = state.start_epoch + state.now;
        let hour_of_day = Local
            .timestamp_opt(time, 0)
            .single()
            .map(|date| date.hour() as usize)
            .unwrap_or(0);

        state.plant.step(hour_of_day, &mut state.rng);
        let measurement = state.plant.measure(time);
        state.log.push(measurement.clone());
        state.now += STEP_SECONDS;

        let fast_forward = state.forward > 0;
        if fast_forward {
            state.forward = (state.forward - STEP_SECONDS).max(0);
        }

        (measurement, fast_forward)
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            tracing::info!(
                "Starting simulation, one simulated hour every {:?}",
                self.step_interval
            );
            loop {
                let (measurement, fast_forward) = self.step().await;
                tracing::debug!(time = measurement.time, "Recorded measurement");
                if fast_forward {
                    tokio::task::yield_now().await;
                } else {
                    tokio::time::sleep(self.step_interval).await;
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::telemetry::RawValue;

    fn service() -> SimulationService {
        SimulationService::new(&SimulationSettings {
            enabled: true,
            step_interval_ms: 10,
            start_epoch: Some(1_400_000_000),
            seed: Some(5),
        })
    }

    fn form(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[tokio::test]
    async fn test_steps_are_hourly() {
        let service = service();
        let (first, _) = service.step().await;
        let (second, _) = service.step().await;
        assert_eq!(first.time, 1_400_000_000);
        assert_eq!(second.time - first.time, STEP_SECONDS);

        let data = service.data().await;
        assert_eq!(data.column("time").len(), 2);
        assert_eq!(data.last("time"), Some(&RawValue::Number(1_400_003_600.0)));
        assert_eq!(data.column("hs_level").len(), 2);
    }

    #[tokio::test]
    async fn test_sim_forward_skips_pacing() {
        let service = service();
        let settings = service
            .apply_settings(&form(&[("sim_forward", "2")]))
            .await
            .unwrap();
        assert_eq!(settings.sim_forward, "");

        assert!(service.step().await.1);
        assert!(service.step().await.1);
        assert!(!service.step().await.1);
    }

    #[tokio::test]
    async fn test_invalid_settings_change_nothing() {
        let service = service();
        let before = service.settings().await;

        let err = service
            .apply_settings(&form(&[("hs_capacity", "900"), ("cu_max_gas_input", "much")]))
            .await
            .unwrap_err();
        assert!(matches!(err, SettingsError::InvalidNumber { .. }));
        assert_eq!(service.settings().await, before);

        let after = service
            .apply_settings(&form(&[("hs_capacity", "900"), ("thermal_demand_noise", "0")]))
            .await
            .unwrap();
        assert_eq!(after.hs_capacity, 900.0);
        assert_eq!(after.thermal_demand_noise, 0);
    }

    #[tokio::test]
    async fn test_zero_capacity_is_rejected() {
        let service = service();
        let err = service
            .apply_settings(&form(&[("hs_capacity", "0")]))
            .await
            .unwrap_err();
        assert!(matches!(err, SettingsError::NotPositive { .. }));

        let (measurement, _) = service.step().await;
        assert!(measurement.values.iter().all(|v| v.is_finite()));
        let json = serde_json::to_string(&service.data().await).unwrap();
        assert!(!json.contains("null"));
    }

    #[tokio::test]
    async fn test_fast_forward_is_bounded() {
        let service = service();
        assert!(service
            .apply_settings(&form(&[("sim_forward", "inf")]))
            .await
            .is_err());
        assert_eq!(service.state.lock().await.forward, 0);

        service
            .apply_settings(&form(&[("sim_forward", "1e300")]))
            .await
            .unwrap();
        assert_eq!(
            service.state.lock().await.forward,
            MAX_FORWARD_HOURS as i64 * STEP_SECONDS
        );

        service
            .apply_settings(&form(&[("sim_forward", "0")]))
            .await
            .unwrap();
        assert_eq!(service.state.lock().await.forward, 0);
        assert!(!service.step().await.1);
    }
}
