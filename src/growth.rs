//! Revenue growth-rate math and calendar window framing.
//!
//! Pure value computation lives here; the store-backed aggregation that
//! feeds it is in [`crate::queries::revenue`]. Windows are computed in UTC
//! from an explicit `now` anchor, never from a hidden system clock.

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};

use crate::error::{Result, TangoCrmError};
use crate::models::{GrowthRateResult, Niche, PeriodType, PeriodWindow};

/// Decimal places the growth rate is rounded to unless the caller overrides.
pub const DEFAULT_PRECISION: u32 = 2;

// ---------------------------------------------------------------------------
// Value math
// ---------------------------------------------------------------------------

/// Monetary totals for two equal-cadence windows.
#[derive(Debug, Clone)]
pub struct GrowthInput {
    pub current: f64,
    pub previous: f64,
    pub period_type: PeriodType,
    pub precision: Option<u32>,
}

/// Compute the percentage growth between two period totals.
///
/// Edge-case policy, in priority order:
/// 1. both totals zero → rate 0, not positive, "no revenue data" message;
/// 2. previous zero with current revenue → rate pinned to 100, positive;
/// 3. otherwise `((current - previous) / previous) * 100`, rounded to the
///    requested precision.
pub fn calculate_growth_rate_from_values(input: &GrowthInput) -> GrowthRateResult {
    let precision = input.precision.unwrap_or(DEFAULT_PRECISION);
    let period_type = input.period_type;

    if input.current == 0.0 && input.previous == 0.0 {
        return GrowthRateResult::zero(period_type, "No revenue data available for both periods");
    }

    if input.previous == 0.0 {
        return GrowthRateResult {
            growth_rate: 100.0,
            absolute_change: round_to(input.current, 2),
            current_period: round_to(input.current, 2),
            previous_period: 0.0,
            period_type,
            is_positive_growth: true,
            message: message_for(100.0, period_type),
            start_date: None,
            end_date: None,
            previous_start_date: None,
            previous_end_date: None,
        };
    }

    let rate = round_to(
        ((input.current - input.previous) / input.previous) * 100.0,
        precision,
    );

    GrowthRateResult {
        growth_rate: rate,
        absolute_change: round_to(input.current - input.previous, 2),
        current_period: round_to(input.current, 2),
        previous_period: round_to(input.previous, 2),
        period_type,
        is_positive_growth: rate >= 0.0,
        message: message_for(rate, period_type),
        start_date: None,
        end_date: None,
        previous_start_date: None,
        previous_end_date: None,
    }
}

/// Human-readable summary for a computed rate.
///
/// A rate of exactly 100 on a calendar period reads as new revenue (the
/// previous-window total was zero); custom periods always spell the
/// percentage out.
fn message_for(rate: f64, period_type: PeriodType) -> String {
    let noun = period_type.noun();
    if rate == 0.0 {
        return format!("No change compared to previous {noun}");
    }
    if rate == 100.0 && period_type != PeriodType::Custom {
        return format!("New revenue this {noun} with no prior {noun} baseline");
    }
    let direction = if rate >= 0.0 { "growth" } else { "decline" };
    format!(
        "{:.2}% {} compared to previous {}",
        rate.abs(),
        direction,
        noun
    )
}

fn round_to(value: f64, digits: u32) -> f64 {
    let factor = 10f64.powi(digits as i32);
    (value * factor).round() / factor
}

// ---------------------------------------------------------------------------
// Window framing
// ---------------------------------------------------------------------------

/// Current and immediately preceding calendar windows for a period type.
///
/// `month`/`quarter`/`year` frame the present calendar unit and the one
/// before it (quarter and year framing roll over year boundaries). `Custom`
/// is rejected here; custom windows come with explicit bounds through
/// [`custom_windows`].
pub fn period_windows(
    period_type: PeriodType,
    now: DateTime<Utc>,
) -> Result<(PeriodWindow, PeriodWindow)> {
    let today = now.date_naive();
    let windows = match period_type {
        PeriodType::Month => {
            let (py, pm) = add_months(today.year(), today.month(), -1);
            month_window(today.year(), today.month()).zip(month_window(py, pm))
        }
        PeriodType::Quarter => {
            let quarter = today.month0() / 3 + 1;
            let (py, pq) = if quarter == 1 {
                (today.year() - 1, 4)
            } else {
                (today.year(), quarter - 1)
            };
            quarter_window(today.year(), quarter).zip(quarter_window(py, pq))
        }
        PeriodType::Year => year_window(today.year()).zip(year_window(today.year() - 1)),
        PeriodType::Custom => {
            return Err(TangoCrmError::InvalidArgument(
                "custom periods require explicit window bounds".to_string(),
            ))
        }
    };
    windows.ok_or_else(|| {
        TangoCrmError::InvalidArgument("calendar window out of supported range".to_string())
    })
}

/// Build a custom window pair from explicit bounds.
///
/// The previous window has the same duration and ends 1 ms before
/// `start`. Equal or inverted bounds are rejected.
pub fn custom_windows(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<(PeriodWindow, PeriodWindow)> {
    if start >= end {
        return Err(TangoCrmError::InvalidDateRange(format!(
            "custom window start {start} must precede end {end}"
        )));
    }
    let duration = end - start;
    let previous_end = start - Duration::milliseconds(1);
    let previous_start = previous_end - duration;
    Ok((
        PeriodWindow::new(start, end),
        PeriodWindow::new(previous_start, previous_end),
    ))
}

/// Calendar windows for trend analysis: index 0 is the current unit, each
/// subsequent index one cadence step further back.
pub fn trend_windows(
    period_type: PeriodType,
    periods: usize,
    now: DateTime<Utc>,
) -> Result<Vec<PeriodWindow>> {
    let today = now.date_naive();
    let mut windows = Vec::with_capacity(periods);

    for index in 0..periods {
        let step = index as i32;
        let window = match period_type {
            PeriodType::Month => {
                let (y, m) = add_months(today.year(), today.month(), -step);
                month_window(y, m)
            }
            PeriodType::Quarter => {
                let absolute = today.year() * 4 + today.month0() as i32 / 3 - step;
                let year = absolute.div_euclid(4);
                let quarter = absolute.rem_euclid(4) as u32 + 1;
                quarter_window(year, quarter)
            }
            PeriodType::Year => year_window(today.year() - step),
            PeriodType::Custom => {
                return Err(TangoCrmError::InvalidArgument(
                    "trend analysis requires a calendar period type".to_string(),
                ))
            }
        };
        windows.push(window.ok_or_else(|| {
            TangoCrmError::InvalidArgument(
                "calendar window out of supported range".to_string(),
            )
        })?);
    }

    Ok(windows)
}

/// Canonical statuses whose value counts as revenue for a niche.
///
/// Coaches keep the legacy `paid` label alongside `won`: coach records that
/// predate the canonical vocabulary carry it and must keep counting.
pub fn revenue_statuses(niche: Niche) -> &'static [&'static str] {
    match niche {
        Niche::Coach => &["won", "paid"],
        _ => &["won"],
    }
}

// ---------------------------------------------------------------------------
// Calendar helpers
// ---------------------------------------------------------------------------

/// Inclusive window covering one calendar month.
fn month_window(year: i32, month: u32) -> Option<PeriodWindow> {
    let (next_year, next_month) = add_months(year, month, 1);
    bounded_window(
        NaiveDate::from_ymd_opt(year, month, 1)?,
        NaiveDate::from_ymd_opt(next_year, next_month, 1)?,
    )
}

/// Inclusive window covering one calendar quarter (1–4).
fn quarter_window(year: i32, quarter: u32) -> Option<PeriodWindow> {
    let start_month = (quarter - 1) * 3 + 1;
    let (next_year, next_month) = add_months(year, start_month, 3);
    bounded_window(
        NaiveDate::from_ymd_opt(year, start_month, 1)?,
        NaiveDate::from_ymd_opt(next_year, next_month, 1)?,
    )
}

/// Inclusive window covering one calendar year.
fn year_window(year: i32) -> Option<PeriodWindow> {
    bounded_window(
        NaiveDate::from_ymd_opt(year, 1, 1)?,
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?,
    )
}

/// Window from a start date (inclusive) to an end date (exclusive), closed
/// at 1 ms before the exclusive bound.
fn bounded_window(start: NaiveDate, end_exclusive: NaiveDate) -> Option<PeriodWindow> {
    let start = Utc.from_utc_datetime(&start.and_hms_opt(0, 0, 0)?);
    let end = Utc.from_utc_datetime(&end_exclusive.and_hms_opt(0, 0, 0)?)
        - Duration::milliseconds(1);
    Some(PeriodWindow::new(start, end))
}

fn add_months(year: i32, month: u32, delta: i32) -> (i32, u32) {
    let total = year * 12 + month as i32 - 1 + delta;
    (total.div_euclid(12), total.rem_euclid(12) as u32 + 1)
}
