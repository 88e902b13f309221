// SVG schematic with live text labels
use super::measurement::{unit_for, DataPayload, TIME_KEY};
use super::telemetry::{date_in, format_date, timestamp_ms, RawValue};
use chrono::TimeZone;
use std::fmt::Display;

#[derive(Debug, Clone, PartialEq)]
pub struct Schematic {
    markup: String,
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

impl Schematic {
    pub fn new(markup: String) -> Self {
        Self { markup }
    }

    pub fn markup(&self) -> &str {
        &self.markup
    }

    /// Byte range of the text content of the element carrying `id`.
    /// Self-closing elements have no content and yield `None`.
    fn content_range(&self, id: &str) -> Option<(usize, usize)> {
        let needle = format!("id=\"{}\"", id);
        let mut from = 0;
        let attr = loop {
            let pos = from + self.markup[from..].find(&needle)?;
            let preceded_by_space = self.markup[..pos]
                .chars()
                .next_back()
                .is_some_and(char::is_whitespace);
            if preceded_by_space {
                break pos;
            }
            from = pos + needle.len();
        };

        let tag_end = attr + self.markup[attr..].find('>')?;
        if self.markup[..tag_end].ends_with('/') {
            return None;
        }
        let start = tag_end + 1;
        let end = start + self.markup[start..].find('<')?;
        Some((start, end))
    }

    pub fn has_element(&self, id: &str) -> bool {
        self.content_range(id).is_some()
    }

    pub fn text(&self, id: &str) -> Option<&str> {
        self.content_range(id)
            .map(|(start, end)| &self.markup[start..end])
    }

    /// Replace the text of the element with `id`; returns false when absent
    pub fn set_text(&mut self, id: &str, text: &str) -> bool {
        match self.content_range(id) {
            Some((start, end)) => {
                self.markup.replace_range(start..end, &escape_text(text));
                true
            }
            None => false,
        }
    }

    /// Write the newest value of every payload column into its label.
    /// `time` is shown as a date in `tz`, metrics as `<value> <unit>`.
    pub fn apply_data<Tz: TimeZone>(&mut self, data: &DataPayload, tz: &Tz) -> usize
    where
        Tz::Offset: Display,
    {
        let mut patched = 0;
        for (key, values) in data.iter() {
            let Some(value) = values.last().filter(|v| **v != RawValue::Missing) else {
                continue;
            };
            if !self.has_element(key) {
                continue;
            }

            let label = if key == TIME_KEY {
                match timestamp_ms(value).and_then(|ms| date_in(ms, tz)) {
                    Some(date) => format_date(&date),
                    None => {
                        tracing::warn!("Unreadable timestamp in data payload: {}", value);
                        continue;
                    }
                }
            } else {
                match unit_for(key) {
                    Some(unit) => format!("{} {}", value, unit),
                    None => value.to_string(),
                }
            };

            if self.set_text(key, &label) {
                patched += 1;
            }
        }
        patched
    }
}
