// Stock chart model, serialized as Highstock options
use super::measurement::{DataPayload, TIME_KEY};
use super::telemetry::{timestamp_ms, TimeSeriesPoint};
use serde::Serialize;

/// Charted metrics and their tooltip suffixes, in series order
pub const CHART_SERIES: [(&str, &str); 4] = [
    ("cu_workload", " %"),
    ("plb_workload", " %"),
    ("hs_level", " %"),
    ("thermal_consumption", " kW"),
];

pub const CHART_TITLE: &str = "Live simulation data";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesTooltip {
    pub value_suffix: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub name: String,
    pub data: Vec<TimeSeriesPoint>,
    pub tooltip: SeriesTooltip,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RangeButton {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
    #[serde(rename = "type")]
    pub kind: String,
    pub text: String,
}

impl RangeButton {
    fn new(count: Option<u32>, kind: &str, text: &str) -> Self {
        Self {
            count,
            kind: kind.to_string(),
            text: text.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RangeSelector {
    pub buttons: Vec<RangeButton>,
    pub selected: usize,
}

impl Default for RangeSelector {
    fn default() -> Self {
        Self {
            buttons: vec![
                RangeButton::new(Some(6), "hour", "6H"),
                RangeButton::new(Some(12), "hour", "12H"),
                RangeButton::new(Some(1), "day", "1D"),
                RangeButton::new(Some(1), "week", "1W"),
                RangeButton::new(Some(2), "week", "2W"),
                RangeButton::new(None, "all", "All"),
            ],
            selected: 2,
        }
    }
}

/// Split a payload into one point list per charted series.
/// Columns are cut to the shortest length; unparsable samples are skipped.
pub fn series_points(data: &DataPayload) -> Vec<Vec<TimeSeriesPoint>> {
    let times = data.column(TIME_KEY);
    let columns: Vec<_> = CHART_SERIES
        .iter()
        .map(|(key, _)| data.column(key))
        .collect();
    let len = columns
        .iter()
        .map(|c| c.len())
        .fold(times.len(), usize::min);

    let mut points = vec![Vec::with_capacity(len); CHART_SERIES.len()];
    for i in 0..len {
        let Some(time_ms) = timestamp_ms(&times[i]) else {
            continue;
        };
        for (series, column) in points.iter_mut().zip(&columns) {
            if let Some(value) = column[i].as_f64() {
                series.push(TimeSeriesPoint::new(time_ms, value));
            }
        }
    }
    points
}

#[derive(Debug, Clone, PartialEq)]
pub struct StockChart {
    pub title: String,
    pub range_selector: RangeSelector,
    pub y_min: f64,
    pub value_decimals: u8,
    pub line_width: u8,
    pub markers: bool,
    pub credits: bool,
    pub use_utc: bool,
    pub series: Vec<ChartSeries>,
    /// Bumped on every redraw
    pub revision: u64,
    dirty: bool,
}

impl Default for StockChart {
    fn default() -> Self {
        Self {
            title: CHART_TITLE.to_string(),
            range_selector: RangeSelector::default(),
            y_min: 0.0,
            value_decimals: 2,
            line_width: 1,
            markers: false,
            credits: false,
            use_utc: false,
            series: CHART_SERIES
                .iter()
                .map(|(name, suffix)| ChartSeries {
                    name: name.to_string(),
                    data: Vec::new(),
                    tooltip: SeriesTooltip {
                        value_suffix: suffix.to_string(),
                    },
                })
                .collect(),
            revision: 0,
            dirty: false,
        }
    }
}

impl StockChart {
    pub fn from_data(data: &DataPayload) -> Self {
        let mut chart = Self::default();
        chart.update(data);
        chart
    }

    /// Replace a series' data; with `redraw` false the change waits for `redraw()`
    pub fn set_data(&mut self, index: usize, points: Vec<TimeSeriesPoint>, redraw: bool) -> bool {
        let Some(series) = self.series.get_mut(index) else {
            return false;
        };
        series.data = points;
        self.dirty = true;
        if redraw {
            self.redraw();
        }
        true
    }

    pub fn redraw(&mut self) {
        if self.dirty {
            self.revision += 1;
            self.dirty = false;
        }
    }

    /// Rebuild every series from the full payload, then redraw once
    pub fn update(&mut self, data: &DataPayload) {
        for (index, points) in series_points(data).into_iter().enumerate().rev() {
            self.set_data(index, points, false);
        }
        self.redraw();
    }

    /// Highstock `StockChart` options object
    pub fn to_options(&self) -> serde_json::Value {
        serde_json::json!({
            "global": { "useUTC": self.use_utc },
            "rangeSelector": self.range_selector,
            "title": { "text": self.title },
            "yAxis": { "min": self.y_min },
            "tooltip": { "valueDecimals": self.value_decimals },
            "plotOptions": {
                "series": {
                    "marker": { "enabled": self.markers },
                    "lineWidth": self.line_width,
                }
            },
            "series": self.series,
            "credits": { "enabled": self.credits },
        })
    }
}
