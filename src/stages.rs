//! Pipeline stage and status mapping rules.
//!
//! UI surfaces use niche-specific stage ids (`discovery-scheduled`,
//! `episode-booked`, …) and a handful of legacy labels; only the six
//! canonical [`Status`] values are ever persisted. Resolution is permissive:
//! an unrecognized label falls back to `prospecting` instead of erroring, so
//! data entry never fails on vocabulary drift.

use crate::models::{DealType, Niche, Status};

/// Map a UI-level stage id or status label to a canonical [`Status`].
///
/// Resolution order, first match wins:
/// 1. the input is already a canonical status value;
/// 2. the niche-independent alias table;
/// 3. the niche's stage-id table, when a niche is supplied;
/// 4. fallback to `prospecting`.
pub fn map_stage_to_status(input: &str, niche: Option<Niche>) -> Status {
    if let Some(status) = Status::parse(input) {
        return status;
    }
    if let Some(status) = global_alias(input) {
        return status;
    }
    if let Some(niche) = niche {
        if let Some(status) = niche_stage(niche, input) {
            return status;
        }
    }
    Status::Prospecting
}

/// Derive the canonical deal type from a niche label. Total function: any
/// unrecognized label yields `other`.
pub fn map_niche_to_type(niche: &str) -> DealType {
    match Niche::parse(niche) {
        Some(niche) => DealType::for_niche(niche),
        None => DealType::Other,
    }
}

/// Niche-independent aliases carried over from older pipelines and external
/// imports. Canonical values themselves never reach this table; they resolve
/// in step 1 of [`map_stage_to_status`].
fn global_alias(label: &str) -> Option<Status> {
    match label {
        "new" | "inquiry" => Some(Status::Prospecting),
        "qualified" => Some(Status::Qualification),
        "proposal_sent" => Some(Status::Proposal),
        "negotiating" => Some(Status::Negotiation),
        "published" | "paid" | "completed" | "active" => Some(Status::Won),
        "declined" | "expired" => Some(Status::Lost),
        _ => None,
    }
}

/// Per-niche stage-id tables. Early-pipeline ids map to
/// prospecting/qualification, mid-pipeline to proposal/negotiation, terminal
/// ids to won or lost.
fn niche_stage(niche: Niche, stage_id: &str) -> Option<Status> {
    match niche {
        Niche::Creator => match stage_id {
            "initial-contact" => Some(Status::Prospecting),
            "brand-interested" => Some(Status::Qualification),
            "pitch-sent" => Some(Status::Proposal),
            "rate-negotiation" => Some(Status::Negotiation),
            "deal-closed" => Some(Status::Won),
            "deal-lost" => Some(Status::Lost),
            _ => None,
        },
        Niche::Coach => match stage_id {
            "new-lead" => Some(Status::Prospecting),
            "discovery-scheduled" => Some(Status::Qualification),
            "proposal-shared" => Some(Status::Proposal),
            "package-negotiation" => Some(Status::Negotiation),
            "signed-client" => Some(Status::Won),
            "not-a-fit" => Some(Status::Lost),
            _ => None,
        },
        Niche::Podcaster => match stage_id {
            "guest-outreach" => Some(Status::Prospecting),
            "pitch-accepted" => Some(Status::Qualification),
            "sponsorship-proposal" => Some(Status::Proposal),
            "terms-negotiation" => Some(Status::Negotiation),
            "episode-booked" => Some(Status::Won),
            "passed" => Some(Status::Lost),
            _ => None,
        },
        Niche::Freelancer => match stage_id {
            "new-inquiry" => Some(Status::Prospecting),
            "discovery-call" => Some(Status::Qualification),
            "quote-sent" => Some(Status::Proposal),
            "scope-negotiation" => Some(Status::Negotiation),
            "contract-signed" => Some(Status::Won),
            "declined-by-client" => Some(Status::Lost),
            _ => None,
        },
    }
}

/// Every stage id a niche's table recognizes. Exposed so callers can render
/// pipeline pickers without duplicating the table.
pub fn stage_ids(niche: Niche) -> &'static [&'static str] {
    match niche {
        Niche::Creator => &[
            "initial-contact",
            "brand-interested",
            "pitch-sent",
            "rate-negotiation",
            "deal-closed",
            "deal-lost",
        ],
        Niche::Coach => &[
            "new-lead",
            "discovery-scheduled",
            "proposal-shared",
            "package-negotiation",
            "signed-client",
            "not-a-fit",
        ],
        Niche::Podcaster => &[
            "guest-outreach",
            "pitch-accepted",
            "sponsorship-proposal",
            "terms-negotiation",
            "episode-booked",
            "passed",
        ],
        Niche::Freelancer => &[
            "new-inquiry",
            "discovery-call",
            "quote-sent",
            "scope-negotiation",
            "contract-signed",
            "declined-by-client",
        ],
    }
}
