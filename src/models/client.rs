use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Niche;

// ---------------------------------------------------------------------------
// ClientStatus
// ---------------------------------------------------------------------------

/// Relationship status of a counterparty record. A `lead` becomes a `client`
/// when an opportunity referencing it is won.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientStatus {
    Lead,
    Client,
}

impl ClientStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClientStatus::Lead => "lead",
            ClientStatus::Client => "client",
        }
    }

    pub fn parse(s: &str) -> Option<ClientStatus> {
        match s {
            "lead" => Some(ClientStatus::Lead),
            "client" => Some(ClientStatus::Client),
            _ => None,
        }
    }
}

impl fmt::Display for ClientStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// A counterparty record: the brand, guest, sponsor, or client behind one or
/// more opportunities.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: String,
    pub user_id: String,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    pub status: ClientStatus,
    pub niche: Niche,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// NewClient
// ---------------------------------------------------------------------------

/// Parameters for creating a client record.
#[derive(Debug, Clone)]
pub struct NewClient {
    pub name: String,
    pub niche: Niche,
    pub email: Option<String>,
    pub status: Option<ClientStatus>,
    pub tags: Vec<String>,
    pub notes: Option<String>,
}

impl NewClient {
    pub fn new(name: impl Into<String>, niche: Niche) -> Self {
        Self {
            name: name.into(),
            niche,
            email: None,
            status: None,
            tags: Vec::new(),
            notes: None,
        }
    }
}
