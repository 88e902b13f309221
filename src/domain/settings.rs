// Settings payload and form updates exchanged with the dashboard
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const HOURS_PER_DAY: usize = 24;

pub const DAILY_DEMAND_KEY: &str = "daily_thermal_demand";

/// Slider positions are stored as integers in `0..=SLIDER_SCALE`
pub const SLIDER_SCALE: f64 = 10000.0;

/// Form fields in page order. `daily_thermal_demand` travels separately.
pub const FORM_FIELDS: [&str; 11] = [
    "average_thermal_demand",
    "varying_thermal_demand",
    "thermal_demand_noise",
    "hs_capacity",
    "hs_target_energy",
    "hs_undersupplied_threshold",
    "cu_max_gas_input",
    "cu_minimal_workload",
    "cu_noise",
    "plb_max_gas_input",
    "sim_forward",
];

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum SettingsError {
    #[error("field `{field}` is not a number: {value:?}")]
    InvalidNumber { field: String, value: String },
    #[error("field `{field}` must be greater than zero, got {value}")]
    NotPositive { field: String, value: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsPayload {
    pub average_thermal_demand: f64,
    pub varying_thermal_demand: f64,
    pub thermal_demand_noise: u8,
    pub hs_capacity: f64,
    pub hs_target_energy: f64,
    pub hs_undersupplied_threshold: f64,
    pub cu_max_gas_input: f64,
    pub cu_minimal_workload: f64,
    pub cu_noise: u8,
    pub plb_max_gas_input: f64,
    pub sim_forward: String,
    pub daily_thermal_demand: Vec<f64>,
}

/// Fields present in a submitted settings form
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsUpdate {
    pub average_thermal_demand: Option<f64>,
    pub varying_thermal_demand: Option<f64>,
    pub thermal_demand_noise: Option<bool>,
    pub hs_capacity: Option<f64>,
    pub hs_target_energy: Option<f64>,
    pub hs_undersupplied_threshold: Option<f64>,
    pub cu_max_gas_input: Option<f64>,
    pub cu_minimal_workload: Option<f64>,
    pub cu_noise: Option<bool>,
    pub plb_max_gas_input: Option<f64>,
    /// Hours to run without real-time pacing
    pub sim_forward_hours: Option<f64>,
    /// Only set when all 24 hourly values were submitted
    pub daily_thermal_demand: Option<Vec<f64>>,
}

fn parse_number(form: &HashMap<String, String>, field: &str) -> Result<Option<f64>, SettingsError> {
    match form.get(field) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .map(Some)
            .ok_or_else(|| SettingsError::InvalidNumber {
                field: field.to_string(),
                value: raw.clone(),
            }),
    }
}

fn parse_positive(
    form: &HashMap<String, String>,
    field: &str,
) -> Result<Option<f64>, SettingsError> {
    match parse_number(form, field)? {
        Some(value) if value <= 0.0 => Err(SettingsError::NotPositive {
            field: field.to_string(),
            value,
        }),
        other => Ok(other),
    }
}

fn parse_flag(form: &HashMap<String, String>, field: &str) -> Option<bool> {
    form.get(field).map(|raw| raw == "1")
}

impl SettingsUpdate {
    pub fn from_form(form: &HashMap<String, String>) -> Result<Self, SettingsError> {
        let sim_forward_hours = match form.get("sim_forward") {
            Some(raw) if !raw.is_empty() => parse_number(form, "sim_forward")?,
            _ => None,
        };

        let mut daily = Vec::with_capacity(HOURS_PER_DAY);
        for hour in 0..HOURS_PER_DAY {
            if let Some(value) = parse_number(form, &format!("{}_{}", DAILY_DEMAND_KEY, hour))? {
                daily.push(value);
            }
        }

        Ok(Self {
            average_thermal_demand: parse_number(form, "average_thermal_demand")?,
            varying_thermal_demand: parse_number(form, "varying_thermal_demand")?,
            thermal_demand_noise: parse_flag(form, "thermal_demand_noise"),
            hs_capacity: parse_positive(form, "hs_capacity")?,
            hs_target_energy: parse_number(form, "hs_target_energy")?,
            hs_undersupplied_threshold: parse_number(form, "hs_undersupplied_threshold")?,
            cu_max_gas_input: parse_number(form, "cu_max_gas_input")?,
            cu_minimal_workload: parse_number(form, "cu_minimal_workload")?,
            cu_noise: parse_flag(form, "cu_noise"),
            plb_max_gas_input: parse_number(form, "plb_max_gas_input")?,
            sim_forward_hours,
            daily_thermal_demand: (daily.len() == HOURS_PER_DAY).then_some(daily),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_parses_present_fields() {
        let update = SettingsUpdate::from_form(&form(&[
            ("average_thermal_demand", "25.5"),
            ("cu_noise", "0"),
            ("thermal_demand_noise", "1"),
            ("sim_forward", ""),
        ]))
        .unwrap();

        assert_eq!(update.average_thermal_demand, Some(25.5));
        assert_eq!(update.cu_noise, Some(false));
        assert_eq!(update.thermal_demand_noise, Some(true));
        assert_eq!(update.sim_forward_hours, None);
        assert_eq!(update.hs_capacity, None);
        assert_eq!(update.daily_thermal_demand, None);
    }

    #[test]
    fn test_daily_demand_requires_all_hours() {
        let mut fields: Vec<(String, String)> = (0..23)
            .map(|h| (format!("daily_thermal_demand_{}", h), "0.5".to_string()))
            .collect();
        let partial: HashMap<_, _> = fields.iter().cloned().collect();
        assert_eq!(SettingsUpdate::from_form(&partial).unwrap().daily_thermal_demand, None);

        fields.push(("daily_thermal_demand_23".to_string(), "0.25".to_string()));
        let full: HashMap<_, _> = fields.into_iter().collect();
        let daily = SettingsUpdate::from_form(&full).unwrap().daily_thermal_demand.unwrap();
        assert_eq!(daily.len(), HOURS_PER_DAY);
        assert_eq!(daily[23], 0.25);
    }

    #[test]
    fn test_rejects_garbage_number() {
        let err = SettingsUpdate::from_form(&form(&[("hs_capacity", "lots")])).unwrap_err();
        assert_eq!(
            err,
            SettingsError::InvalidNumber {
                field: "hs_capacity".to_string(),
                value: "lots".to_string()
            }
        );
        assert_eq!(err.to_string(), "field `hs_capacity` is not a number: \"lots\"");
    }

    #[test]
    fn test_rejects_non_finite_numbers() {
        for raw in ["NaN", "inf", "-infinity"] {
            let err = SettingsUpdate::from_form(&form(&[("sim_forward", raw)])).unwrap_err();
            assert!(matches!(err, SettingsError::InvalidNumber { ref field, .. } if field == "sim_forward"));
        }
        assert!(SettingsUpdate::from_form(&form(&[("cu_max_gas_input", "nan")])).is_err());
    }

    #[test]
    fn test_capacity_must_be_positive() {
        let err = SettingsUpdate::from_form(&form(&[("hs_capacity", "0")])).unwrap_err();
        assert_eq!(
            err,
            SettingsError::NotPositive {
                field: "hs_capacity".to_string(),
                value: 0.0
            }
        );
        assert!(SettingsUpdate::from_form(&form(&[("hs_capacity", "-5")])).is_err());
        let update = SettingsUpdate::from_form(&form(&[("hs_capacity", "0.5")])).unwrap();
        assert_eq!(update.hs_capacity, Some(0.5));
    }

    #[test]
    fn test_sim_forward_in_hours() {
        let update = SettingsUpdate::from_form(&form(&[("sim_forward", "12")])).unwrap();
        assert_eq!(update.sim_forward_hours, Some(12.0));
    }
}
