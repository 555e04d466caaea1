// =============================================================================
// Presentation Builder — dual-axis AHR999 / price figure
// =============================================================================
//
// `build` turns a DerivedSeries into a `ChartSpec` whose JSON form is a
// Plotly.js figure (`{ data, layout }`) plus a textual `Summary`. It never
// fails: an empty or all-undefined indicator column simply renders as an
// empty trace next to the price line.
//
// Axis layout:
//   y  (left)  — indicator, with a dashed zero reference line
//   y2 (right) — close price, overlaying y, scaled independently
//   x          — shared date axis with range slider and quick-range buttons
// =============================================================================

pub mod html;
pub mod summary;

use chrono::{Local, NaiveDate};
use serde::Serialize;

use crate::types::DerivedSeries;

pub use summary::Summary;

pub const INDICATOR_NAME: &str = "AHR999";

const INDICATOR_HOVER: &str = "Date: %{x|%Y-%m-%d}<br>AHR999: %{y:.4f}<extra></extra>";
const PRICE_HOVER: &str = "Date: %{x|%Y-%m-%d}<br>Price: $%{y:,.2f}<extra></extra>";

// ---------------------------------------------------------------------------
// Figure types
// ---------------------------------------------------------------------------

/// Renderable figure description. Serializes to a Plotly.js figure.
#[derive(Debug, Clone, Serialize)]
pub struct ChartSpec {
    pub data: Vec<Trace>,
    pub layout: Layout,
}

#[derive(Debug, Clone, Serialize)]
pub struct Trace {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub mode: &'static str,
    pub name: String,
    pub x: Vec<NaiveDate>,
    /// `None` serializes as `null`, which Plotly draws as a gap.
    pub y: Vec<Option<f64>>,
    pub yaxis: &'static str,
    pub hovertemplate: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct Title {
    pub text: String,
}

impl Title {
    fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Layout {
    pub title: Title,
    pub hovermode: &'static str,
    pub xaxis: XAxis,
    pub yaxis: YAxis,
    pub yaxis2: YAxis,
    pub shapes: Vec<Shape>,
    pub annotations: Vec<Annotation>,
}

#[derive(Debug, Clone, Serialize)]
pub struct XAxis {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub title: Title,
    pub rangeslider: RangeSlider,
    pub rangeselector: RangeSelector,
}

#[derive(Debug, Clone, Serialize)]
pub struct RangeSlider {
    pub visible: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct RangeSelector {
    pub buttons: Vec<RangeButton>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RangeButton {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
    pub label: &'static str,
    pub step: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stepmode: Option<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct YAxis {
    pub title: Title,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overlaying: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub side: Option<&'static str>,
}

/// Horizontal reference line spanning the full x domain.
#[derive(Debug, Clone, Serialize)]
pub struct Shape {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub xref: &'static str,
    pub x0: f64,
    pub x1: f64,
    pub yref: &'static str,
    pub y0: f64,
    pub y1: f64,
    pub line: LineStyle,
}

#[derive(Debug, Clone, Serialize)]
pub struct LineStyle {
    pub color: &'static str,
    pub dash: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct Annotation {
    pub text: &'static str,
    pub xref: &'static str,
    pub x: f64,
    pub yref: &'static str,
    pub y: f64,
    pub showarrow: bool,
    pub xanchor: &'static str,
    pub yanchor: &'static str,
}

// ---------------------------------------------------------------------------
// Quick-range presets
// ---------------------------------------------------------------------------

/// Date-axis buttons. Selecting one only moves the visible window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangePreset {
    OneMonth,
    SixMonths,
    OneYear,
    All,
}

impl RangePreset {
    pub const ALL: [RangePreset; 4] = [
        RangePreset::OneMonth,
        RangePreset::SixMonths,
        RangePreset::OneYear,
        RangePreset::All,
    ];

    pub fn button(self) -> RangeButton {
        let backward = |count, label, step| RangeButton {
            count: Some(count),
            label,
            step,
            stepmode: Some("backward"),
        };
        match self {
            Self::OneMonth => backward(1, "1M", "month"),
            Self::SixMonths => backward(6, "6M", "month"),
            Self::OneYear => backward(1, "1Y", "year"),
            Self::All => RangeButton {
                count: None,
                label: "All",
                step: "all",
                stepmode: None,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Build the figure and summary, stamping the summary with today's date.
pub fn build(series: &DerivedSeries, title: &str) -> (ChartSpec, Summary) {
    build_at(series, title, Local::now().date_naive())
}

/// Build the figure and summary for a fixed wall-clock date.
pub fn build_at(series: &DerivedSeries, title: &str, as_of: NaiveDate) -> (ChartSpec, Summary) {
    let dates: Vec<NaiveDate> = series.points.iter().map(|p| p.date).collect();

    let indicator = Trace {
        kind: "scatter",
        mode: "lines",
        name: INDICATOR_NAME.to_string(),
        x: dates.clone(),
        y: series.points.iter().map(|p| p.indicator).collect(),
        yaxis: "y",
        hovertemplate: INDICATOR_HOVER,
    };

    let price = Trace {
        kind: "scatter",
        mode: "lines",
        name: format!("{title} Price"),
        x: dates,
        y: series.points.iter().map(|p| Some(p.close)).collect(),
        yaxis: "y2",
        hovertemplate: PRICE_HOVER,
    };

    let layout = Layout {
        title: Title::new(format!("{title} {INDICATOR_NAME} Index and Price")),
        hovermode: "x unified",
        xaxis: XAxis {
            kind: "date",
            title: Title::new("Date"),
            rangeslider: RangeSlider { visible: true },
            rangeselector: RangeSelector {
                buttons: RangePreset::ALL.iter().map(|p| p.button()).collect(),
            },
        },
        yaxis: YAxis {
            title: Title::new(format!("{INDICATOR_NAME} Value")),
            overlaying: None,
            side: None,
        },
        yaxis2: YAxis {
            title: Title::new(format!("{title} Price (USD)")),
            overlaying: Some("y"),
            side: Some("right"),
        },
        shapes: vec![Shape {
            kind: "line",
            xref: "x domain",
            x0: 0.0,
            x1: 1.0,
            yref: "y",
            y0: 0.0,
            y1: 0.0,
            line: LineStyle {
                color: "red",
                dash: "dash",
            },
        }],
        annotations: vec![Annotation {
            text: "0 line",
            xref: "x domain",
            x: 1.0,
            yref: "y",
            y: 0.0,
            showarrow: false,
            xanchor: "right",
            yanchor: "bottom",
        }],
    };

    let summary = Summary::from_series(series, title, as_of);

    (
        ChartSpec {
            data: vec![indicator, price],
            layout,
        },
        summary,
    )
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DerivedPoint;
    use chrono::Duration;

    fn day(i: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + Duration::days(i)
    }

    fn derived(points: Vec<(f64, Option<f64>)>) -> DerivedSeries {
        DerivedSeries {
            symbol: "BTC-USD".to_string(),
            window: 200,
            points: points
                .into_iter()
                .enumerate()
                .map(|(i, (close, indicator))| DerivedPoint {
                    date: day(i as i64),
                    close,
                    moving_average: indicator.map(|r| close / (1.0 + r)),
                    indicator,
                })
                .collect(),
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    #[test]
    fn two_traces_on_separate_axes() {
        let series = derived(vec![(100.0, None), (110.0, Some(0.05))]);
        let (spec, _) = build_at(&series, "Bitcoin", today());

        assert_eq!(spec.data.len(), 2);
        assert_eq!(spec.data[0].name, "AHR999");
        assert_eq!(spec.data[0].yaxis, "y");
        assert_eq!(spec.data[1].name, "Bitcoin Price");
        assert_eq!(spec.data[1].yaxis, "y2");
        assert_eq!(spec.layout.yaxis2.overlaying, Some("y"));
        assert_eq!(spec.layout.yaxis2.side, Some("right"));
        assert_eq!(spec.data[0].x, spec.data[1].x);
    }

    #[test]
    fn undefined_indicator_serializes_as_null() {
        let series = derived(vec![(100.0, None), (110.0, Some(0.05))]);
        let (spec, _) = build_at(&series, "Bitcoin", today());
        let json = serde_json::to_value(&spec).unwrap();

        assert_eq!(json["data"][0]["y"], serde_json::json!([null, 0.05]));
        assert_eq!(json["data"][1]["y"], serde_json::json!([100.0, 110.0]));
        assert_eq!(json["data"][0]["x"][0], "2024-01-01");
        assert_eq!(json["data"][0]["type"], "scatter");
    }

    #[test]
    fn layout_has_zero_line_and_range_controls() {
        let (spec, _) = build_at(&derived(vec![(1.0, None)]), "Ethereum", today());
        let json = serde_json::to_value(&spec).unwrap();
        let layout = &json["layout"];

        assert_eq!(layout["hovermode"], "x unified");
        assert_eq!(layout["title"]["text"], "Ethereum AHR999 Index and Price");
        assert_eq!(layout["xaxis"]["type"], "date");
        assert_eq!(layout["xaxis"]["rangeslider"]["visible"], true);
        assert_eq!(layout["yaxis2"]["title"]["text"], "Ethereum Price (USD)");

        let shape = &layout["shapes"][0];
        assert_eq!(shape["yref"], "y");
        assert_eq!(shape["y0"], 0.0);
        assert_eq!(shape["y1"], 0.0);
        assert_eq!(shape["line"]["dash"], "dash");
        assert_eq!(shape["line"]["color"], "red");
        assert_eq!(layout["annotations"][0]["text"], "0 line");
    }

    #[test]
    fn range_buttons_cover_month_half_year_year_all() {
        let (spec, _) = build_at(&derived(vec![(1.0, None)]), "X", today());
        let buttons = &spec.layout.xaxis.rangeselector.buttons;
        let labels: Vec<&str> = buttons.iter().map(|b| b.label).collect();
        assert_eq!(labels, vec!["1M", "6M", "1Y", "All"]);
        assert_eq!(buttons[1].count, Some(6));
        assert_eq!(buttons[1].step, "month");
        assert_eq!(buttons[2].step, "year");

        let all = serde_json::to_value(&buttons[3]).unwrap();
        assert_eq!(all, serde_json::json!({ "label": "All", "step": "all" }));
    }

    #[test]
    fn hover_templates_format_values() {
        let (spec, _) = build_at(&derived(vec![(1.0, None)]), "X", today());
        assert!(spec.data[0].hovertemplate.contains("%{y:.4f}"));
        assert!(spec.data[1].hovertemplate.contains("$%{y:,.2f}"));
        assert!(spec.data[0].hovertemplate.contains("%{x|%Y-%m-%d}"));
    }

    #[test]
    fn single_point_series_renders() {
        let series = derived(vec![(42_000.0, None)]);
        let (spec, summary) = build_at(&series, "Bitcoin", today());
        assert_eq!(spec.data[0].y, vec![None]);
        assert_eq!(spec.data[1].y, vec![Some(42_000.0)]);
        assert_eq!(summary.latest_close, Some(42_000.0));
        assert!(summary.latest_indicator.is_none());
    }

    #[test]
    fn empty_series_does_not_panic() {
        let series = DerivedSeries {
            symbol: "X".to_string(),
            window: 200,
            points: Vec::new(),
        };
        let (spec, summary) = build_at(&series, "X", today());
        assert!(spec.data[0].x.is_empty());
        assert!(summary.latest_close.is_none());
        assert!(summary.last_date.is_none());
    }

    #[test]
    fn summary_uses_last_point() {
        let series = derived(vec![(100.0, Some(-0.2)), (123_456.789, Some(0.123_456))]);
        let (_, summary) = build_at(&series, "Bitcoin", today());
        assert_eq!(summary.as_of, today());
        assert_eq!(summary.last_date, Some(day(1)));
        assert_eq!(summary.latest_indicator, Some(0.123_456));
        assert_eq!(summary.latest_close, Some(123_456.789));
    }
}
