use std::path::PathBuf;

/// File name of the on-disk database inside the data directory.
pub const DEFAULT_DB_FILE: &str = "tango-crm.duckdb";

/// Canonical probability (percent) assigned to a new opportunity when the
/// caller does not supply one. Applies to every creation path.
pub const DEFAULT_PROBABILITY: u8 = 50;

pub const OPPORTUNITIES_TABLE: &str = "opportunities";
pub const CLIENTS_TABLE: &str = "clients";

/// DDL applied on every store open. Statements are idempotent so an existing
/// database is left untouched.
///
/// Timestamps are persisted as RFC 3339 UTC strings (millisecond precision,
/// `Z` suffix), which makes lexicographic comparison equivalent to
/// chronological comparison for date-window filters. `tags` and
/// `customFields` hold JSON text.
pub fn schema_statements() -> Vec<&'static str> {
    vec![
        "CREATE TABLE IF NOT EXISTS opportunities (
            id VARCHAR PRIMARY KEY,
            userId VARCHAR NOT NULL,
            clientId VARCHAR,
            title VARCHAR NOT NULL,
            value DOUBLE NOT NULL DEFAULT 0,
            status VARCHAR NOT NULL,
            dealType VARCHAR NOT NULL,
            niche VARCHAR NOT NULL,
            probability INTEGER NOT NULL,
            expectedCloseDate VARCHAR,
            actualCloseDate VARCHAR,
            followUpDate VARCHAR,
            discoveryCallDate VARCHAR,
            scheduledDate VARCHAR,
            userTimezone VARCHAR,
            notes VARCHAR,
            tags VARCHAR,
            customFields VARCHAR,
            createdAt VARCHAR NOT NULL,
            updatedAt VARCHAR NOT NULL
        )",
        "CREATE TABLE IF NOT EXISTS clients (
            id VARCHAR PRIMARY KEY,
            userId VARCHAR NOT NULL,
            name VARCHAR NOT NULL,
            email VARCHAR,
            status VARCHAR NOT NULL,
            niche VARCHAR NOT NULL,
            tags VARCHAR,
            notes VARCHAR,
            createdAt VARCHAR NOT NULL,
            updatedAt VARCHAR NOT NULL
        )",
    ]
}

pub fn default_data_dir() -> PathBuf {
    if let Some(data) = dirs::data_dir() {
        data.join("tango-crm")
    } else {
        PathBuf::from(".tango-crm")
    }
}
