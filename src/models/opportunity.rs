use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Niche
// ---------------------------------------------------------------------------

/// Business vertical a user operates in. Parameterizes the stage vocabulary,
/// the derived deal type, and the revenue-equivalent status set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Niche {
    Creator,
    Coach,
    Podcaster,
    Freelancer,
}

impl Niche {
    pub const ALL: [Niche; 4] = [
        Niche::Creator,
        Niche::Coach,
        Niche::Podcaster,
        Niche::Freelancer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Niche::Creator => "creator",
            Niche::Coach => "coach",
            Niche::Podcaster => "podcaster",
            Niche::Freelancer => "freelancer",
        }
    }

    pub fn parse(s: &str) -> Option<Niche> {
        match s {
            "creator" => Some(Niche::Creator),
            "coach" => Some(Niche::Coach),
            "podcaster" => Some(Niche::Podcaster),
            "freelancer" => Some(Niche::Freelancer),
            _ => None,
        }
    }
}

impl fmt::Display for Niche {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Canonical pipeline status. This is the only status vocabulary persisted;
/// every UI-level stage id is mapped into this set before storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Prospecting,
    Qualification,
    Proposal,
    Negotiation,
    Won,
    Lost,
}

impl Status {
    pub const ALL: [Status; 6] = [
        Status::Prospecting,
        Status::Qualification,
        Status::Proposal,
        Status::Negotiation,
        Status::Won,
        Status::Lost,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Prospecting => "prospecting",
            Status::Qualification => "qualification",
            Status::Proposal => "proposal",
            Status::Negotiation => "negotiation",
            Status::Won => "won",
            Status::Lost => "lost",
        }
    }

    pub fn parse(s: &str) -> Option<Status> {
        match s {
            "prospecting" => Some(Status::Prospecting),
            "qualification" => Some(Status::Qualification),
            "proposal" => Some(Status::Proposal),
            "negotiation" => Some(Status::Negotiation),
            "won" => Some(Status::Won),
            "lost" => Some(Status::Lost),
            _ => None,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// DealType
// ---------------------------------------------------------------------------

/// Kind of deal an opportunity represents. Derived from the niche at
/// creation and never independently overwritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DealType {
    BrandDeal,
    Sponsorship,
    Consulting,
    Coaching,
    ContentCreation,
    Other,
}

impl DealType {
    /// The deal type a niche produces. Total over `Niche`; unrecognized
    /// niche strings are handled by [`crate::stages::map_niche_to_type`].
    pub fn for_niche(niche: Niche) -> DealType {
        match niche {
            Niche::Creator => DealType::BrandDeal,
            Niche::Coach => DealType::Coaching,
            Niche::Podcaster => DealType::Sponsorship,
            Niche::Freelancer => DealType::Consulting,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DealType::BrandDeal => "brand_deal",
            DealType::Sponsorship => "sponsorship",
            DealType::Consulting => "consulting",
            DealType::Coaching => "coaching",
            DealType::ContentCreation => "content_creation",
            DealType::Other => "other",
        }
    }
}

impl fmt::Display for DealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// CustomFields
// ---------------------------------------------------------------------------

/// Open key/value map for niche-specific contact and brand attributes that
/// are not first-class columns. Known keys get typed accessors; everything
/// else stays reachable through the map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomFields(pub BTreeMap<String, serde_json::Value>);

impl CustomFields {
    pub const CONTACT_NAME: &'static str = "contactName";
    pub const BRAND_NAME: &'static str = "brandName";
    pub const COMPANY_NAME: &'static str = "companyName";
    pub const GUEST_OR_SPONSOR_NAME: &'static str = "guestOrSponsorName";
    pub const CLIENT_NAME: &'static str = "clientName";

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Set a field, replacing any previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// String value of a key, if present and non-empty.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0
            .get(key)
            .and_then(|v| v.as_str())
            .filter(|s| !s.trim().is_empty())
    }

    pub fn contact_name(&self) -> Option<&str> {
        self.get_str(Self::CONTACT_NAME)
    }

    pub fn brand_name(&self) -> Option<&str> {
        self.get_str(Self::BRAND_NAME)
    }

    pub fn company_name(&self) -> Option<&str> {
        self.get_str(Self::COMPANY_NAME)
    }

    pub fn guest_or_sponsor_name(&self) -> Option<&str> {
        self.get_str(Self::GUEST_OR_SPONSOR_NAME)
    }

    pub fn client_name(&self) -> Option<&str> {
        self.get_str(Self::CLIENT_NAME)
    }

    /// Resolve the counterparty name for the "won" client sync.
    ///
    /// Each niche prefers the field its vocabulary centers on: podcasters
    /// name guests or sponsors, creators name brands, coaches and
    /// freelancers name clients.
    pub fn counterparty_name(&self, niche: Niche) -> Option<&str> {
        let order: [&str; 4] = match niche {
            Niche::Podcaster => [
                Self::GUEST_OR_SPONSOR_NAME,
                Self::BRAND_NAME,
                Self::CLIENT_NAME,
                Self::COMPANY_NAME,
            ],
            Niche::Creator => [
                Self::BRAND_NAME,
                Self::COMPANY_NAME,
                Self::CONTACT_NAME,
                Self::CLIENT_NAME,
            ],
            Niche::Coach => [
                Self::CLIENT_NAME,
                Self::CONTACT_NAME,
                Self::COMPANY_NAME,
                Self::BRAND_NAME,
            ],
            Niche::Freelancer => [
                Self::CLIENT_NAME,
                Self::COMPANY_NAME,
                Self::CONTACT_NAME,
                Self::BRAND_NAME,
            ],
        };
        order.iter().find_map(|key| self.get_str(key))
    }
}

// ---------------------------------------------------------------------------
// Opportunity
// ---------------------------------------------------------------------------

/// A sales-pipeline record, fully normalized: canonical status, derived deal
/// type, and UTC timestamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Opportunity {
    pub id: String,
    pub user_id: String,
    #[serde(default)]
    pub client_id: Option<String>,
    pub title: String,
    pub value: f64,
    pub status: Status,
    pub deal_type: DealType,
    pub niche: Niche,
    pub probability: u8,
    #[serde(default)]
    pub expected_close_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub actual_close_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub follow_up_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub discovery_call_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub scheduled_date: Option<DateTime<Utc>>,
    /// IANA timezone captured at write time; reverses the UTC conversion for
    /// display.
    #[serde(default)]
    pub user_timezone: Option<String>,
    /// Plain text, or a JSON object carrying a `noteHistory` array once the
    /// merge policy has run.
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub custom_fields: CustomFields,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// NewOpportunity / UpdateOpportunity
// ---------------------------------------------------------------------------

/// Parameters for creating an opportunity.
///
/// Date fields take raw user input strings; the create path normalizes them
/// to UTC through the user's timezone. `stage` may be a canonical status, a
/// global alias, or a niche-specific stage id.
#[derive(Debug, Clone)]
pub struct NewOpportunity {
    pub title: String,
    pub niche: Niche,
    pub client_id: Option<String>,
    pub value: Option<f64>,
    pub stage: Option<String>,
    pub probability: Option<u8>,
    pub expected_close_date: Option<String>,
    pub actual_close_date: Option<String>,
    pub follow_up_date: Option<String>,
    pub discovery_call_date: Option<String>,
    pub scheduled_date: Option<String>,
    pub user_timezone: Option<String>,
    pub notes: Option<String>,
    pub tags: Vec<String>,
    pub custom_fields: CustomFields,
}

impl NewOpportunity {
    pub fn new(title: impl Into<String>, niche: Niche) -> Self {
        Self {
            title: title.into(),
            niche,
            client_id: None,
            value: None,
            stage: None,
            probability: None,
            expected_close_date: None,
            actual_close_date: None,
            follow_up_date: None,
            discovery_call_date: None,
            scheduled_date: None,
            user_timezone: None,
            notes: None,
            tags: Vec::new(),
            custom_fields: CustomFields::default(),
        }
    }
}

/// Patch for updating an opportunity. `None` fields are left untouched.
///
/// A supplied `notes` value is merged into the existing notes history rather
/// than replacing it; a supplied date string is re-normalized through the
/// effective timezone.
#[derive(Debug, Clone, Default)]
pub struct UpdateOpportunity {
    pub title: Option<String>,
    pub client_id: Option<String>,
    pub value: Option<f64>,
    pub stage: Option<String>,
    pub probability: Option<u8>,
    pub expected_close_date: Option<String>,
    pub actual_close_date: Option<String>,
    pub follow_up_date: Option<String>,
    pub discovery_call_date: Option<String>,
    pub scheduled_date: Option<String>,
    pub user_timezone: Option<String>,
    pub notes: Option<String>,
    pub tags: Option<Vec<String>>,
    pub custom_fields: Option<CustomFields>,
}

// ---------------------------------------------------------------------------
// ClientSync / OpportunityWrite
// ---------------------------------------------------------------------------

/// Outcome of the best-effort client sync that runs when a write lands on
/// `won`. Kept separate from the primary result so callers can observe the
/// side channel without the primary write ever depending on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientSync {
    /// No sync was attempted: the status is not `won`, or no counterparty
    /// could be resolved from the custom fields.
    Skipped,
    /// An existing client record was marked `client`.
    Updated { client_id: String },
    /// A new client record was created and tagged `from-opportunity`.
    Created { client_id: String },
    /// The sync failed; the error was logged and the primary write kept.
    Failed { reason: String },
}

/// Result of an opportunity create or update: the persisted record plus the
/// side-channel outcome.
#[derive(Debug, Clone)]
pub struct OpportunityWrite {
    pub opportunity: Opportunity,
    pub client_sync: ClientSync,
}
