//! Tango CRM SDK for Rust.
//!
//! Provides a high-level client for the Tango CRM domain core: opportunity
//! pipeline records with niche-aware stage mapping, timezone-aware date
//! normalization, and revenue growth analytics. Records live in an embedded
//! DuckDB database: on disk under the platform data directory by default,
//! in-memory for tests.
//!
//! # Quick start
//!
//! ```no_run
//! use tangocrm_sdk::models::{NewOpportunity, Niche, PeriodType, UpdateOpportunity};
//! use tangocrm_sdk::TangoCrm;
//!
//! let crm = TangoCrm::builder().in_memory().build().unwrap();
//!
//! // Create an opportunity; the stage label maps to a canonical status.
//! let mut params = NewOpportunity::new("Spring brand campaign", Niche::Creator);
//! params.stage = Some("pitch-sent".to_string());
//! params.value = Some(2500.0);
//! let write = crm.opportunities().create("user-1", &params).unwrap();
//!
//! // Win it; the counterparty client record is synced best-effort.
//! let patch = UpdateOpportunity {
//!     stage: Some("deal-closed".to_string()),
//!     actual_close_date: Some("2026-08-01".to_string()),
//!     ..Default::default()
//! };
//! crm.opportunities()
//!     .update("user-1", &write.opportunity.id, &patch)
//!     .unwrap();
//!
//! // Month-over-month revenue growth.
//! let growth = crm.revenue()
//!     .growth_rate("user-1", Niche::Creator, PeriodType::Month)
//!     .unwrap();
//! println!("{}", growth.message);
//! ```

#[cfg(feature = "async")]
pub mod async_client;
pub mod clock;
pub mod config;
pub mod dates;
pub mod error;
pub mod growth;
pub mod models;
pub mod notes;
pub mod queries;
pub mod sql_builder;
pub mod stages;
pub mod store;

#[cfg(feature = "async")]
pub use async_client::AsyncTangoCrm;
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{Result, TangoCrmError};
pub use sql_builder::SqlBuilder;
pub use store::Store;

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use queries::{ClientQuery, OpportunityQuery, RevenueQuery};

// ---------------------------------------------------------------------------
// TangoCrmBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing a [`TangoCrm`] instance.
///
/// Use [`TangoCrm::builder()`] to obtain a builder, chain configuration
/// methods, and call [`build()`](TangoCrmBuilder::build) to create the
/// client.
#[derive(Default)]
pub struct TangoCrmBuilder {
    data_dir: Option<PathBuf>,
    in_memory: bool,
    clock: Option<Arc<dyn Clock>>,
}

impl TangoCrmBuilder {
    /// Set a custom data directory for the on-disk database.
    ///
    /// If not set, the platform-appropriate default data directory is used
    /// (e.g. `~/.local/share/tango-crm` on Linux).
    pub fn data_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.data_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Use an in-memory database instead of an on-disk one. Contents are
    /// lost when the client is dropped; intended for tests and tooling.
    pub fn in_memory(mut self) -> Self {
        self.in_memory = true;
        self
    }

    /// Inject a clock. Defaults to [`SystemClock`]; tests pass a
    /// [`FixedClock`] to pin date windows and record timestamps.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Build the client, opening the store and applying the schema.
    pub fn build(self) -> Result<TangoCrm> {
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let store = if self.in_memory {
            Store::open_in_memory()?
        } else {
            let dir = self.data_dir.unwrap_or_else(config::default_data_dir);
            Store::open(dir.join(config::DEFAULT_DB_FILE))?
        };
        Ok(TangoCrm { store, clock })
    }
}

// ---------------------------------------------------------------------------
// TangoCrm
// ---------------------------------------------------------------------------

/// The main entry point for the Tango CRM SDK.
///
/// Owns the embedded [`Store`] and the session [`Clock`] and exposes the
/// domain query interfaces as lightweight borrowing wrappers.
///
/// Created via [`TangoCrm::builder()`].
pub struct TangoCrm {
    store: Store,
    clock: Arc<dyn Clock>,
}

impl TangoCrm {
    /// Create a new builder for configuring the client.
    pub fn builder() -> TangoCrmBuilder {
        TangoCrmBuilder::default()
    }

    // -- Query accessors ---------------------------------------------------

    /// Access the opportunity query interface.
    pub fn opportunities(&self) -> OpportunityQuery<'_> {
        OpportunityQuery::new(&self.store, self.clock.as_ref())
    }

    /// Access the client (counterparty) query interface.
    pub fn clients(&self) -> ClientQuery<'_> {
        ClientQuery::new(&self.store, self.clock.as_ref())
    }

    /// Access the revenue analytics interface.
    pub fn revenue(&self) -> RevenueQuery<'_> {
        RevenueQuery::new(&self.store, self.clock.as_ref())
    }

    // -- Utility methods ---------------------------------------------------

    /// Execute a raw SQL query against the store.
    ///
    /// Escape-hatch access for queries not covered by the domain
    /// interfaces.
    ///
    /// # Arguments
    ///
    /// * `query` - SQL string with `?` positional placeholders.
    /// * `params` - Parameter values corresponding to the placeholders.
    pub fn sql(
        &self,
        query: &str,
        params: &[String],
    ) -> Result<Vec<HashMap<String, serde_json::Value>>> {
        self.store.execute(query, params)
    }

    /// Return a reference to the underlying [`Store`] for advanced usage.
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// The current UTC instant as seen by the injected clock.
    pub fn now(&self) -> chrono::DateTime<chrono::Utc> {
        self.clock.now_utc()
    }
}

impl fmt::Display for TangoCrm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TangoCrm(store={})", self.store.describe_location())
    }
}
