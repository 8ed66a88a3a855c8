//! Shared test fixtures for the Tango CRM SDK integration tests.
//!
//! Provides `setup_crm()` which builds an in-memory client with a frozen
//! clock, plus a raw-row seeding helper for pre-canonical legacy data that
//! the create path would otherwise normalize away.

// Not every test binary uses every fixture.
#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tangocrm_sdk::{FixedClock, TangoCrm};

/// Frozen "now" used across the suite: mid-March 2026, well inside Q1.
pub const NOW: &str = "2026-03-15T12:00:00Z";

pub fn frozen_now() -> DateTime<Utc> {
    NOW.parse().unwrap()
}

/// In-memory client with the clock pinned to [`NOW`].
pub fn setup_crm() -> TangoCrm {
    TangoCrm::builder()
        .in_memory()
        .clock(Arc::new(FixedClock(frozen_now())))
        .build()
        .unwrap()
}

/// In-memory client with the clock pinned to an arbitrary instant.
pub fn setup_crm_at(now: &str) -> TangoCrm {
    TangoCrm::builder()
        .in_memory()
        .clock(Arc::new(FixedClock(now.parse().unwrap())))
        .build()
        .unwrap()
}

/// Insert an opportunity row directly, bypassing the create-path
/// normalization. Lets tests seed legacy statuses (coach `paid`) and exact
/// close dates.
pub fn seed_revenue_row(
    crm: &TangoCrm,
    id: &str,
    user_id: &str,
    niche: &str,
    status: &str,
    value: f64,
    actual_close_date: &str,
) {
    crm.store()
        .execute_write(
            "INSERT INTO opportunities (
                id, userId, clientId, title, value, status, dealType, niche,
                probability, actualCloseDate, tags, customFields, createdAt, updatedAt
            ) VALUES (?, ?, NULL, ?, ?, ?, ?, ?, 50, ?, '[]', '{}', ?, ?)",
            &[
                Some(id.to_string()),
                Some(user_id.to_string()),
                Some(format!("Seeded {status} deal")),
                Some(value.to_string()),
                Some(status.to_string()),
                Some("other".to_string()),
                Some(niche.to_string()),
                Some(actual_close_date.to_string()),
                Some(NOW.to_string()),
                Some(NOW.to_string()),
            ],
        )
        .unwrap();
}
