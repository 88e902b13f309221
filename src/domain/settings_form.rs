// Settings form state: plain fields plus the 24 hourly demand sliders
use super::settings::{DAILY_DEMAND_KEY, FORM_FIELDS, HOURS_PER_DAY, SLIDER_SCALE};
use serde_json::{Map, Value};
use std::time::{Duration, Instant};

/// How long the submit button shows success after a post
pub const SUBMIT_FEEDBACK: Duration = Duration::from_millis(500);

const SLIDER_MAX: u32 = SLIDER_SCALE as u32;

#[derive(Debug, Clone, PartialEq)]
pub struct SettingsForm {
    fields: Vec<(String, String)>,
    sliders: [u32; HOURS_PER_DAY],
}

impl Default for SettingsForm {
    fn default() -> Self {
        Self {
            fields: FORM_FIELDS
                .iter()
                .map(|name| (name.to_string(), String::new()))
                .collect(),
            sliders: [0; HOURS_PER_DAY],
        }
    }
}

pub fn slider_name(hour: usize) -> String {
    format!("{}_{}", DAILY_DEMAND_KEY, hour)
}

/// Whole floats drop their fraction, so `20.0` shows as `20`
fn field_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Number(n) if n.is_f64() => n
            .as_f64()
            .map(|f| f.to_string())
            .unwrap_or_else(|| n.to_string()),
        other => other.to_string(),
    }
}

impl SettingsForm {
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Unknown field names are ignored
    pub fn set_field(&mut self, name: &str, value: &str) -> bool {
        match self.fields.iter_mut().find(|(n, _)| n == name) {
            Some((_, v)) => {
                *v = value.to_string();
                true
            }
            None => false,
        }
    }

    pub fn sliders(&self) -> &[u32; HOURS_PER_DAY] {
        &self.sliders
    }

    /// Positions are clamped to `0..=10000`
    pub fn set_slider(&mut self, hour: usize, position: f64) -> bool {
        let Some(slot) = self.sliders.get_mut(hour) else {
            return false;
        };
        *slot = position.round().clamp(0.0, SLIDER_SCALE) as u32;
        true
    }

    /// Fill the form from a settings payload: `daily_thermal_demand` drives the
    /// sliders, every other key the field of the same name.
    pub fn apply_settings(&mut self, settings: &Map<String, Value>) {
        for (key, value) in settings {
            if key == DAILY_DEMAND_KEY {
                if let Value::Array(hours) = value {
                    for (hour, hour_value) in hours.iter().enumerate() {
                        if let Some(v) = hour_value.as_f64() {
                            self.set_slider(hour, v * SLIDER_SCALE);
                        }
                    }
                }
            } else {
                self.set_field(key, &field_text(value));
            }
        }
    }

    /// Apply a browser form submission: field edits and raw slider positions
    pub fn apply_edits<'a>(&mut self, edits: impl IntoIterator<Item = (&'a str, &'a str)>) {
        for (name, value) in edits {
            let hour = name
                .strip_prefix(DAILY_DEMAND_KEY)
                .and_then(|rest| rest.strip_prefix('_'))
                .and_then(|h| h.parse::<usize>().ok());
            match hour {
                Some(hour) => match value.trim().parse::<f64>() {
                    Ok(position) => {
                        self.set_slider(hour, position);
                    }
                    Err(_) => tracing::warn!("Ignoring slider {} value {:?}", name, value),
                },
                None => {
                    self.set_field(name, value);
                }
            }
        }
    }

    /// URL-encoded form body: fields in page order, then every slider scaled
    /// back to a demand factor.
    pub fn serialize(&self) -> String {
        let mut parts: Vec<String> = self
            .fields
            .iter()
            .map(|(name, value)| {
                format!("{}={}", urlencoding::encode(name), urlencoding::encode(value))
            })
            .collect();
        for (hour, position) in self.sliders.iter().enumerate() {
            parts.push(format!(
                "{}={}",
                slider_name(hour),
                *position as f64 / SLIDER_SCALE
            ));
        }
        parts.join("&")
    }

    pub fn slider_max(&self) -> u32 {
        SLIDER_MAX
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonStyle {
    Primary,
    Success,
}

impl ButtonStyle {
    pub fn css_class(self) -> &'static str {
        match self {
            ButtonStyle::Primary => "btn-primary",
            ButtonStyle::Success => "btn-success",
        }
    }
}

/// Submit button feedback
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubmitState {
    succeeded_at: Option<Instant>,
}

impl SubmitState {
    pub fn succeeded(&mut self, at: Instant) {
        self.succeeded_at = Some(at);
    }

    pub fn style(&self, now: Instant) -> ButtonStyle {
        match self.succeeded_at {
            Some(at) if now.saturating_duration_since(at) < SUBMIT_FEEDBACK => {
                ButtonStyle::Success
            }
            _ => ButtonStyle::Primary,
        }
    }
}
