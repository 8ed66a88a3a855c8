use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// PeriodType
// ---------------------------------------------------------------------------

/// Cadence of a growth-rate comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodType {
    Month,
    Quarter,
    Year,
    Custom,
}

impl PeriodType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PeriodType::Month => "month",
            PeriodType::Quarter => "quarter",
            PeriodType::Year => "year",
            PeriodType::Custom => "custom",
        }
    }

    /// The noun used in human-readable messages ("compared to previous …").
    pub fn noun(&self) -> &'static str {
        match self {
            PeriodType::Month => "month",
            PeriodType::Quarter => "quarter",
            PeriodType::Year => "year",
            PeriodType::Custom => "period",
        }
    }
}

impl fmt::Display for PeriodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// PeriodWindow
// ---------------------------------------------------------------------------

/// An inclusive time window `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl PeriodWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// True if the two windows share any instant.
    pub fn overlaps(&self, other: &PeriodWindow) -> bool {
        self.start <= other.end && other.start <= self.end
    }
}

// ---------------------------------------------------------------------------
// GrowthRateResult
// ---------------------------------------------------------------------------

/// Output of a growth-rate comparison between two equal-cadence windows.
/// Computed on demand from aggregated opportunity values; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrowthRateResult {
    /// Signed percentage, rounded to the requested precision.
    pub growth_rate: f64,
    /// `currentPeriod - previousPeriod`, rounded to 2 decimals.
    pub absolute_change: f64,
    pub current_period: f64,
    pub previous_period: f64,
    pub period_type: PeriodType,
    /// True iff `growth_rate >= 0` (forced false for the no-data case).
    pub is_positive_growth: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_start_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_end_date: Option<DateTime<Utc>>,
}

impl GrowthRateResult {
    /// All-zero result: used when both windows have no revenue, and when
    /// aggregation fails (the message then carries the error description
    /// instead of it propagating past the calculator boundary).
    pub fn zero(period_type: PeriodType, message: impl Into<String>) -> Self {
        Self {
            growth_rate: 0.0,
            absolute_change: 0.0,
            current_period: 0.0,
            previous_period: 0.0,
            period_type,
            is_positive_growth: false,
            message: message.into(),
            start_date: None,
            end_date: None,
            previous_start_date: None,
            previous_end_date: None,
        }
    }

    /// Attach the window boundaries the comparison was computed over.
    pub fn with_windows(mut self, current: &PeriodWindow, previous: &PeriodWindow) -> Self {
        self.start_date = Some(current.start);
        self.end_date = Some(current.end);
        self.previous_start_date = Some(previous.start);
        self.previous_end_date = Some(previous.end);
        self
    }
}
