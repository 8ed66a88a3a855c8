//! Revenue aggregation tests: the coach `paid` asymmetry, calendar growth
//! over seeded records, custom-window validation, trend analysis, and the
//! error-to-zero-result boundary.

mod common;

use tangocrm_sdk::models::{Niche, PeriodType};
use tangocrm_sdk::TangoCrmError;

const USER: &str = "user-1";

// Clock is frozen at 2026-03-15T12:00:00Z: current month = March 2026,
// previous month = February 2026.

// ---------------------------------------------------------------------------
// Coach `paid` asymmetry
// ---------------------------------------------------------------------------

#[test]
fn coach_aggregation_counts_legacy_paid_rows() {
    let crm = common::setup_crm();
    common::seed_revenue_row(&crm, "c1", USER, "coach", "won", 1000.0, "2026-03-05T10:00:00.000Z");
    common::seed_revenue_row(&crm, "c2", USER, "coach", "paid", 500.0, "2026-03-10T10:00:00.000Z");
    common::seed_revenue_row(&crm, "c3", USER, "coach", "won", 1000.0, "2026-02-10T10:00:00.000Z");

    let result = crm
        .revenue()
        .growth_rate(USER, Niche::Coach, PeriodType::Month)
        .unwrap();

    assert_eq!(result.current_period, 1500.0);
    assert_eq!(result.previous_period, 1000.0);
    assert_eq!(result.growth_rate, 50.0);
    assert!(result.is_positive_growth);
}

#[test]
fn other_niches_exclude_unmapped_paid_rows() {
    let crm = common::setup_crm();
    common::seed_revenue_row(&crm, "r1", USER, "creator", "won", 1000.0, "2026-03-05T10:00:00.000Z");
    common::seed_revenue_row(&crm, "r2", USER, "creator", "paid", 500.0, "2026-03-10T10:00:00.000Z");
    common::seed_revenue_row(&crm, "r3", USER, "creator", "won", 1000.0, "2026-02-10T10:00:00.000Z");

    let result = crm
        .revenue()
        .growth_rate(USER, Niche::Creator, PeriodType::Month)
        .unwrap();

    assert_eq!(result.current_period, 1000.0);
    assert_eq!(result.growth_rate, 0.0);
    assert_eq!(result.message, "No change compared to previous month");
}

#[test]
fn lost_and_open_deals_never_count_as_revenue() {
    let crm = common::setup_crm();
    common::seed_revenue_row(&crm, "x1", USER, "creator", "lost", 900.0, "2026-03-05T10:00:00.000Z");
    common::seed_revenue_row(&crm, "x2", USER, "creator", "negotiation", 900.0, "2026-03-06T10:00:00.000Z");

    let result = crm
        .revenue()
        .growth_rate(USER, Niche::Creator, PeriodType::Month)
        .unwrap();
    assert_eq!(result.current_period, 0.0);
    assert_eq!(result.message, "No revenue data available for both periods");
}

// ---------------------------------------------------------------------------
// Edge messages and window scoping
// ---------------------------------------------------------------------------

#[test]
fn empty_store_reports_no_data() {
    let crm = common::setup_crm();
    let result = crm
        .revenue()
        .growth_rate(USER, Niche::Coach, PeriodType::Month)
        .unwrap();

    assert_eq!(result.growth_rate, 0.0);
    assert!(!result.is_positive_growth);
    assert_eq!(result.message, "No revenue data available for both periods");
}

#[test]
fn revenue_in_only_the_current_window_is_new_revenue() {
    let crm = common::setup_crm();
    common::seed_revenue_row(&crm, "n1", USER, "creator", "won", 800.0, "2026-03-05T10:00:00.000Z");

    let result = crm
        .revenue()
        .growth_rate(USER, Niche::Creator, PeriodType::Month)
        .unwrap();

    assert_eq!(result.growth_rate, 100.0);
    assert!(result.is_positive_growth);
    assert!(result.message.contains("New revenue"));
}

#[test]
fn windows_bound_on_the_actual_close_date() {
    let crm = common::setup_crm();
    // Outside both windows entirely.
    common::seed_revenue_row(&crm, "w1", USER, "creator", "won", 700.0, "2025-12-01T10:00:00.000Z");
    // Exactly at the current window start still counts.
    common::seed_revenue_row(&crm, "w2", USER, "creator", "won", 300.0, "2026-03-01T00:00:00.000Z");

    let result = crm
        .revenue()
        .growth_rate(USER, Niche::Creator, PeriodType::Month)
        .unwrap();
    assert_eq!(result.current_period, 300.0);
    assert_eq!(result.previous_period, 0.0);
}

#[test]
fn aggregation_is_owner_scoped() {
    let crm = common::setup_crm();
    common::seed_revenue_row(&crm, "o1", "someone-else", "creator", "won", 9999.0, "2026-03-05T10:00:00.000Z");

    let result = crm
        .revenue()
        .growth_rate(USER, Niche::Creator, PeriodType::Month)
        .unwrap();
    assert_eq!(result.current_period, 0.0);
}

#[test]
fn quarterly_growth_rolls_into_the_prior_year() {
    let crm = common::setup_crm_at("2025-02-10T09:00:00Z");
    // Q1 2025 and Q4 2024.
    common::seed_revenue_row(&crm, "q1", USER, "freelancer", "won", 1200.0, "2025-01-20T10:00:00.000Z");
    common::seed_revenue_row(&crm, "q2", USER, "freelancer", "won", 800.0, "2024-11-15T10:00:00.000Z");

    let result = crm
        .revenue()
        .growth_rate(USER, Niche::Freelancer, PeriodType::Quarter)
        .unwrap();
    assert_eq!(result.current_period, 1200.0);
    assert_eq!(result.previous_period, 800.0);
    assert_eq!(result.growth_rate, 50.0);
    assert_eq!(result.start_date, Some("2025-01-01T00:00:00Z".parse().unwrap()));
    assert_eq!(
        result.previous_start_date,
        Some("2024-10-01T00:00:00Z".parse().unwrap())
    );
}

// ---------------------------------------------------------------------------
// Custom windows
// ---------------------------------------------------------------------------

#[test]
fn custom_growth_uses_the_supplied_window() {
    let crm = common::setup_crm();
    common::seed_revenue_row(&crm, "cu1", USER, "creator", "won", 400.0, "2026-03-12T10:00:00.000Z");
    common::seed_revenue_row(&crm, "cu2", USER, "creator", "won", 200.0, "2026-03-06T10:00:00.000Z");

    let result = crm
        .revenue()
        .growth_rate_custom(
            USER,
            Niche::Creator,
            "2026-03-10T00:00:00Z".parse().unwrap(),
            "2026-03-15T00:00:00Z".parse().unwrap(),
        )
        .unwrap();

    // Current window catches the 400; the preceding 5-day window ends just
    // before 2026-03-10 and catches the 200 from 2026-03-06.
    assert_eq!(result.period_type, PeriodType::Custom);
    assert_eq!(result.current_period, 400.0);
    assert_eq!(result.previous_period, 200.0);
    assert_eq!(result.growth_rate, 100.0);
}

#[test]
fn invalid_custom_bounds_are_fatal() {
    let crm = common::setup_crm();
    let start = "2026-03-15T00:00:00Z".parse().unwrap();

    let err = crm
        .revenue()
        .growth_rate_custom(USER, Niche::Creator, start, start)
        .unwrap_err();
    assert!(matches!(err, TangoCrmError::InvalidDateRange(_)));

    let err = crm
        .revenue()
        .growth_rate(USER, Niche::Creator, PeriodType::Custom)
        .unwrap_err();
    assert!(matches!(err, TangoCrmError::InvalidArgument(_)));
}

// ---------------------------------------------------------------------------
// Trend analysis
// ---------------------------------------------------------------------------

#[test]
fn monthly_trend_produces_one_result_per_period() {
    let crm = common::setup_crm();
    common::seed_revenue_row(&crm, "t1", USER, "coach", "won", 100.0, "2026-01-15T10:00:00.000Z");
    common::seed_revenue_row(&crm, "t2", USER, "coach", "won", 200.0, "2026-02-14T10:00:00.000Z");
    common::seed_revenue_row(&crm, "t3", USER, "coach", "won", 400.0, "2026-03-14T10:00:00.000Z");

    let trend = crm
        .revenue()
        .trend(USER, Niche::Coach, PeriodType::Month, 3)
        .unwrap();

    assert_eq!(trend.len(), 3);
    // Index 0 is the most recent period.
    assert_eq!(trend[0].current_period, 400.0);
    assert_eq!(trend[1].current_period, 200.0);
    assert_eq!(trend[2].current_period, 100.0);
    for result in &trend {
        assert_eq!(result.period_type, PeriodType::Month);
    }
}

#[test]
fn custom_trend_is_rejected() {
    let crm = common::setup_crm();
    let err = crm
        .revenue()
        .trend(USER, Niche::Coach, PeriodType::Custom, 3)
        .unwrap_err();
    assert!(matches!(err, TangoCrmError::InvalidArgument(_)));
}

// ---------------------------------------------------------------------------
// Error boundary
// ---------------------------------------------------------------------------

#[test]
fn store_failures_surface_as_a_zero_result() {
    let crm = common::setup_crm();
    crm.store()
        .raw()
        .execute_batch("DROP TABLE opportunities")
        .unwrap();

    let result = crm
        .revenue()
        .growth_rate(USER, Niche::Creator, PeriodType::Month)
        .unwrap();

    assert_eq!(result.growth_rate, 0.0);
    assert_eq!(result.current_period, 0.0);
    assert!(!result.is_positive_growth);
    assert!(result.message.starts_with("Error:"));
}
