//! Async wrapper around [`TangoCrm`] for use in async runtimes (Tokio, etc.).
//!
//! Runs all SDK operations on a blocking thread pool via
//! [`tokio::task::spawn_blocking`], keeping the async event loop free.
//! DuckDB queries are CPU-bound but fast, making this approach efficient.
//!
//! # Example
//!
//! ```no_run
//! use tangocrm_sdk::models::{NewOpportunity, Niche};
//! use tangocrm_sdk::AsyncTangoCrm;
//!
//! # async fn example() -> tangocrm_sdk::Result<()> {
//! let crm = AsyncTangoCrm::builder().in_memory().build().await?;
//!
//! // Run any sync SDK method via closure
//! let write = crm
//!     .run(|c| {
//!         c.opportunities()
//!             .create("user-1", &NewOpportunity::new("Retainer", Niche::Freelancer))
//!     })
//!     .await?;
//!
//! println!("created {}", write.opportunity.id);
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::error::{Result, TangoCrmError};
use crate::TangoCrm;

// ---------------------------------------------------------------------------
// AsyncTangoCrmBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing an [`AsyncTangoCrm`] instance.
#[derive(Default)]
pub struct AsyncTangoCrmBuilder {
    data_dir: Option<PathBuf>,
    in_memory: bool,
}

impl AsyncTangoCrmBuilder {
    /// Set a custom data directory for the on-disk database.
    pub fn data_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.data_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Use an in-memory database instead of an on-disk one.
    pub fn in_memory(mut self) -> Self {
        self.in_memory = true;
        self
    }

    /// Build the async client, opening the store on the blocking thread
    /// pool so initialization won't block the async event loop.
    pub async fn build(self) -> Result<AsyncTangoCrm> {
        tokio::task::spawn_blocking(move || {
            let mut builder = TangoCrm::builder();
            if let Some(dir) = self.data_dir {
                builder = builder.data_dir(dir);
            }
            if self.in_memory {
                builder = builder.in_memory();
            }
            let crm = builder.build()?;
            Ok(AsyncTangoCrm {
                inner: Arc::new(Mutex::new(crm)),
            })
        })
        .await
        .map_err(|e| TangoCrmError::InvalidArgument(format!("Task join error: {e}")))?
    }
}

// ---------------------------------------------------------------------------
// AsyncTangoCrm
// ---------------------------------------------------------------------------

/// Async wrapper around [`TangoCrm`].
///
/// All operations are dispatched to a blocking thread pool via
/// [`tokio::task::spawn_blocking`]. The underlying [`TangoCrm`] is protected
/// by a [`Mutex`] so the store's single connection is used from one thread
/// at a time.
pub struct AsyncTangoCrm {
    inner: Arc<Mutex<TangoCrm>>,
}

impl AsyncTangoCrm {
    /// Create a new builder for configuring the async client.
    pub fn builder() -> AsyncTangoCrmBuilder {
        AsyncTangoCrmBuilder::default()
    }

    /// Run a sync SDK operation on the blocking thread pool.
    ///
    /// The closure receives a `&TangoCrm` reference and should return a
    /// `Result<T>`. The operation runs on a dedicated blocking thread,
    /// keeping the async event loop free.
    pub async fn run<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&TangoCrm) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let crm = self.inner.clone();
        tokio::task::spawn_blocking(move || {
            let guard = crm
                .lock()
                .map_err(|_| TangoCrmError::InvalidArgument("client lock poisoned".into()))?;
            f(&guard)
        })
        .await
        .map_err(|e| TangoCrmError::InvalidArgument(format!("Task join error: {e}")))?
    }

    /// Execute a raw SQL query asynchronously.
    ///
    /// Convenience wrapper around [`run()`](Self::run) for
    /// [`TangoCrm::sql()`].
    pub async fn sql(
        &self,
        query: &str,
        params: &[String],
    ) -> Result<Vec<HashMap<String, serde_json::Value>>> {
        let query = query.to_string();
        let params = params.to_vec();
        self.run(move |c| c.sql(&query, &params)).await
    }
}
