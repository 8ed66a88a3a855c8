//! Store-backed query interfaces.
//!
//! Each interface is a lightweight wrapper borrowing the [`crate::store::Store`]
//! and the session [`crate::clock::Clock`]. Every operation is scoped to an
//! explicit `user_id`; the scope is trusted, not enforced here.

pub mod clients;
pub mod opportunities;
pub mod revenue;

pub use clients::ClientQuery;
pub use opportunities::{ListOpportunitiesParams, OpportunityQuery};
pub use revenue::RevenueQuery;

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::Result;

/// Deserialize a store row into a typed record.
///
/// NULL columns are dropped so serde defaults apply, and the named JSON text
/// columns (`tags`, `customFields`) are decoded back into structured values
/// before deserialization.
pub(crate) fn row_into<T: DeserializeOwned>(
    mut row: HashMap<String, Value>,
    json_columns: &[&str],
) -> Result<T> {
    row.retain(|_, v| !v.is_null());
    for column in json_columns {
        let decoded = match row.get(*column) {
            Some(Value::String(raw)) => serde_json::from_str::<Value>(raw).ok(),
            _ => None,
        };
        if let Some(decoded) = decoded {
            row.insert((*column).to_string(), decoded);
        }
    }
    let value = Value::Object(row.into_iter().collect());
    Ok(serde_json::from_value(value)?)
}
