//! Revenue aggregation and growth-rate reporting.
//!
//! Sums won-opportunity value over calendar or custom windows and feeds the
//! totals into the pure calculator in [`crate::growth`]. Store failures never
//! escape this boundary: they come back as an all-zero result carrying the
//! error description. The one fatal case is an invalid custom window, which
//! is a caller bug and is surfaced as an error.

use chrono::{DateTime, Utc};

use crate::clock::Clock;
use crate::config;
use crate::dates;
use crate::error::Result;
use crate::growth::{self, GrowthInput};
use crate::models::{GrowthRateResult, Niche, PeriodType, PeriodWindow};
use crate::sql_builder::SqlBuilder;
use crate::store::Store;

/// Query interface for revenue analytics.
pub struct RevenueQuery<'a> {
    store: &'a Store,
    clock: &'a dyn Clock,
}

impl<'a> RevenueQuery<'a> {
    pub fn new(store: &'a Store, clock: &'a dyn Clock) -> Self {
        Self { store, clock }
    }

    /// Growth rate for the present calendar period against the previous one.
    ///
    /// Errors only on invalid arguments: [`PeriodType::Custom`] needs
    /// explicit bounds and belongs to
    /// [`growth_rate_custom`](Self::growth_rate_custom). Aggregation
    /// failures are folded into the returned result.
    pub fn growth_rate(
        &self,
        user_id: &str,
        niche: Niche,
        period_type: PeriodType,
    ) -> Result<GrowthRateResult> {
        let (current, previous) = growth::period_windows(period_type, self.clock.now_utc())?;
        Ok(self.growth_between(user_id, niche, period_type, current, previous))
    }

    /// Growth rate for an explicit window against the same-duration window
    /// immediately preceding it.
    ///
    /// Equal or inverted bounds are rejected with an error; this validation
    /// failure is fatal by contract, unlike aggregation failures.
    pub fn growth_rate_custom(
        &self,
        user_id: &str,
        niche: Niche,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<GrowthRateResult> {
        let (current, previous) = growth::custom_windows(start, end)?;
        Ok(self.growth_between(user_id, niche, PeriodType::Custom, current, previous))
    }

    /// Multi-period trend: `periods` consecutive results stepping backward
    /// one cadence unit per index (index 0 = most recent), each computed
    /// independently through the custom-window path.
    pub fn trend(
        &self,
        user_id: &str,
        niche: Niche,
        period_type: PeriodType,
        periods: usize,
    ) -> Result<Vec<GrowthRateResult>> {
        let windows = growth::trend_windows(period_type, periods, self.clock.now_utc())?;
        let mut results = Vec::with_capacity(windows.len());
        for window in windows {
            let (current, previous) = growth::custom_windows(window.start, window.end)?;
            results.push(self.growth_between(user_id, niche, period_type, current, previous));
        }
        Ok(results)
    }

    /// Sum of opportunity value in a window for the niche's
    /// revenue-equivalent statuses, bounded on `actualCloseDate`.
    pub fn sum_revenue(&self, user_id: &str, niche: Niche, window: &PeriodWindow) -> Result<f64> {
        let statuses = growth::revenue_statuses(niche);
        let (sql, params) = SqlBuilder::new(config::OPPORTUNITIES_TABLE)
            .select(&["COALESCE(SUM(value), 0) AS total"])
            .where_eq("userId", user_id)
            .where_eq("niche", niche.as_str())
            .where_in("status", statuses)
            .where_gte("actualCloseDate", &dates::format_utc(window.start))
            .where_lte("actualCloseDate", &dates::format_utc(window.end))
            .build();

        let total = self.store.execute_scalar(&sql, &params)?;
        Ok(total.and_then(|v| v.as_f64()).unwrap_or(0.0))
    }

    fn growth_between(
        &self,
        user_id: &str,
        niche: Niche,
        period_type: PeriodType,
        current: PeriodWindow,
        previous: PeriodWindow,
    ) -> GrowthRateResult {
        let totals = self
            .sum_revenue(user_id, niche, &current)
            .and_then(|c| self.sum_revenue(user_id, niche, &previous).map(|p| (c, p)));

        match totals {
            Ok((current_total, previous_total)) => growth::calculate_growth_rate_from_values(
                &GrowthInput {
                    current: current_total,
                    previous: previous_total,
                    period_type,
                    precision: None,
                },
            )
            .with_windows(&current, &previous),
            Err(err) => GrowthRateResult::zero(period_type, format!("Error: {err}")),
        }
    }
}
