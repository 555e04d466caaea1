use std::fmt;

use chrono::NaiveDate;

use crate::chart::INDICATOR_NAME;
use crate::types::DerivedSeries;

/// Terminal values of a rendered series, for display or logging.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub title: String,
    /// Wall-clock date at render time.
    pub as_of: NaiveDate,
    pub last_date: Option<NaiveDate>,
    pub latest_indicator: Option<f64>,
    pub latest_close: Option<f64>,
}

impl Summary {
    pub fn from_series(series: &DerivedSeries, title: &str, as_of: NaiveDate) -> Self {
        let last = series.last();
        Self {
            title: title.to_string(),
            as_of,
            last_date: last.map(|p| p.date),
            latest_indicator: last.and_then(|p| p.indicator),
            latest_close: last.map(|p| p.close),
        }
    }

    /// The three summary lines: date, indicator, price.
    pub fn lines(&self) -> [String; 3] {
        let indicator = self
            .latest_indicator
            .map(|v| format!("{v:.4}"))
            .unwrap_or_else(|| "n/a".to_string());
        let price = self
            .latest_close
            .map(|v| format!("${}", format_thousands(v, 2)))
            .unwrap_or_else(|| "n/a".to_string());

        [
            format!("Current date: {}", self.as_of.format("%Y-%m-%d")),
            format!("Latest {} {INDICATOR_NAME} value: {indicator}", self.title),
            format!("Latest {} price: {price}", self.title),
        ]
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [date, indicator, price] = self.lines();
        write!(f, "{date}\n{indicator}\n{price}")
    }
}

/// Format `value` with `decimals` fraction digits and comma-grouped thousands.
pub fn format_thousands(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let fixed = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };

    let mut grouped = String::with_capacity(fixed.len() + int_part.len() / 3 + 1);
    // Rounding can turn a tiny negative into "0.00"; keep the sign only when
    // a non-zero digit survives.
    if value < 0.0 && fixed.bytes().any(|b| matches!(b, b'1'..=b'9')) {
        grouped.push('-');
    }
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if let Some(frac) = frac_part {
        grouped.push('.');
        grouped.push_str(frac);
    }
    grouped
}
