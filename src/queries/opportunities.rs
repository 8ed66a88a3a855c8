//! Owner-scoped opportunity CRUD with pipeline-rule normalization.
//!
//! The write paths run the full rule set: stage labels are mapped to the
//! canonical status, the deal type is derived from the niche, date input is
//! normalized to UTC through the user's timezone, notes are merged
//! append-only, and a write landing on `won` triggers the best-effort client
//! sync. The sync outcome rides along on [`OpportunityWrite`] and can never
//! fail the primary write.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::clock::Clock;
use crate::config;
use crate::dates;
use crate::error::{Result, TangoCrmError};
use crate::models::{
    ClientSync, DealType, NewOpportunity, Niche, Opportunity, OpportunityWrite, Status,
    UpdateOpportunity,
};
use crate::notes;
use crate::sql_builder::SqlBuilder;
use crate::stages;
use crate::store::Store;

// ---------------------------------------------------------------------------
// ListOpportunitiesParams
// ---------------------------------------------------------------------------

/// Filters for listing opportunities. All fields optional; `None` skips the
/// corresponding filter.
#[derive(Debug, Clone, Default)]
pub struct ListOpportunitiesParams {
    pub niche: Option<Niche>,
    pub status: Option<Status>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

// ---------------------------------------------------------------------------
// OpportunityQuery
// ---------------------------------------------------------------------------

/// Query interface for opportunity records.
pub struct OpportunityQuery<'a> {
    store: &'a Store,
    clock: &'a dyn Clock,
}

impl<'a> OpportunityQuery<'a> {
    pub fn new(store: &'a Store, clock: &'a dyn Clock) -> Self {
        Self { store, clock }
    }

    // -- Create ------------------------------------------------------------

    /// Create an opportunity for the given owner.
    ///
    /// The stage label (canonical status, alias, or niche stage id) is
    /// mapped to a canonical status, the deal type is derived from the
    /// niche, and raw date strings are normalized to UTC through the
    /// supplied timezone. A stage resolving to `won` triggers the client
    /// sync.
    pub fn create(&self, user_id: &str, params: &NewOpportunity) -> Result<OpportunityWrite> {
        validate_title(&params.title)?;
        let value = params.value.unwrap_or(0.0);
        validate_value(value)?;
        let probability = params.probability.unwrap_or(config::DEFAULT_PROBABILITY);
        validate_probability(probability)?;

        let now = self.clock.now_utc();
        let tz = params.user_timezone.as_deref().unwrap_or("UTC");
        let status = match params.stage.as_deref() {
            Some(stage) => stages::map_stage_to_status(stage, Some(params.niche)),
            None => Status::Prospecting,
        };

        let opportunity = Opportunity {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            client_id: params.client_id.clone(),
            title: params.title.trim().to_string(),
            value,
            status,
            deal_type: DealType::for_niche(params.niche),
            niche: params.niche,
            probability,
            expected_close_date: dates::to_utc(params.expected_close_date.as_deref(), tz),
            actual_close_date: dates::to_utc(params.actual_close_date.as_deref(), tz),
            follow_up_date: dates::to_utc(params.follow_up_date.as_deref(), tz),
            discovery_call_date: dates::to_utc(params.discovery_call_date.as_deref(), tz),
            scheduled_date: dates::to_utc(params.scheduled_date.as_deref(), tz),
            user_timezone: params.user_timezone.clone(),
            notes: params.notes.clone(),
            tags: params.tags.clone(),
            custom_fields: params.custom_fields.clone(),
            created_at: now,
            updated_at: now,
        };

        self.insert(&opportunity)?;

        let client_sync = if opportunity.status == Status::Won {
            self.sync_client_for_won(&opportunity, now)
        } else {
            ClientSync::Skipped
        };

        Ok(OpportunityWrite {
            opportunity,
            client_sync,
        })
    }

    // -- Read --------------------------------------------------------------

    /// Fetch a single opportunity by id, scoped to its owner.
    pub fn get(&self, user_id: &str, id: &str) -> Result<Option<Opportunity>> {
        let (sql, params) = SqlBuilder::new(config::OPPORTUNITIES_TABLE)
            .where_eq("id", id)
            .where_eq("userId", user_id)
            .limit(1)
            .build();
        let rows = self.store.execute(&sql, &params)?;
        rows.into_iter().next().map(row_to_opportunity).transpose()
    }

    /// List an owner's opportunities, newest first.
    pub fn list(
        &self,
        user_id: &str,
        params: &ListOpportunitiesParams,
    ) -> Result<Vec<Opportunity>> {
        let mut builder = SqlBuilder::new(config::OPPORTUNITIES_TABLE);
        builder.where_eq("userId", user_id);
        if let Some(niche) = params.niche {
            builder.where_eq("niche", niche.as_str());
        }
        if let Some(status) = params.status {
            builder.where_eq("status", status.as_str());
        }
        builder.order_by(&["createdAt DESC"]);
        if let Some(limit) = params.limit {
            builder.limit(limit);
        }
        if let Some(offset) = params.offset {
            builder.offset(offset);
        }
        let (sql, sql_params) = builder.build();

        let rows = self.store.execute(&sql, &sql_params)?;
        rows.into_iter().map(row_to_opportunity).collect()
    }

    /// Pipeline summary: opportunity counts keyed by stored status value.
    ///
    /// Keys are raw strings rather than [`Status`] so pre-canonical legacy
    /// rows (coach `paid`) stay visible instead of failing the read.
    pub fn count_by_status(
        &self,
        user_id: &str,
        niche: Option<Niche>,
    ) -> Result<HashMap<String, i64>> {
        let mut builder = SqlBuilder::new(config::OPPORTUNITIES_TABLE);
        builder
            .select(&["status", "COUNT(*) AS total"])
            .where_eq("userId", user_id);
        if let Some(niche) = niche {
            builder.where_eq("niche", niche.as_str());
        }
        builder.group_by(&["status"]);
        let (sql, params) = builder.build();

        let rows = self.store.execute(&sql, &params)?;
        let mut counts = HashMap::new();
        for row in rows {
            let status = row
                .get("status")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string();
            let total = row.get("total").and_then(|v| v.as_i64()).unwrap_or(0);
            counts.insert(status, total);
        }
        Ok(counts)
    }

    // -- Update ------------------------------------------------------------

    /// Apply a patch to an opportunity.
    ///
    /// Supplied date strings are re-normalized through the effective
    /// timezone (patch timezone wins over the stored one); a supplied notes
    /// value is merged into the existing history; a stage resolving to `won`
    /// triggers the client sync. Niche and deal type are fixed at creation
    /// and never patched.
    pub fn update(
        &self,
        user_id: &str,
        id: &str,
        patch: &UpdateOpportunity,
    ) -> Result<OpportunityWrite> {
        let existing = self
            .get(user_id, id)?
            .ok_or_else(|| TangoCrmError::NotFound(format!("opportunity {id}")))?;

        if let Some(title) = &patch.title {
            validate_title(title)?;
        }
        if let Some(value) = patch.value {
            validate_value(value)?;
        }
        if let Some(probability) = patch.probability {
            validate_probability(probability)?;
        }

        let now = self.clock.now_utc();
        let tz = patch
            .user_timezone
            .as_deref()
            .or(existing.user_timezone.as_deref())
            .unwrap_or("UTC");

        let status = match patch.stage.as_deref() {
            Some(stage) => stages::map_stage_to_status(stage, Some(existing.niche)),
            None => existing.status,
        };

        let notes = match &patch.notes {
            Some(incoming) => Some(
                match existing.notes.as_deref().filter(|n| !n.is_empty()) {
                    Some(current) => notes::merge_notes(Some(current), incoming, now),
                    None => incoming.clone(),
                },
            ),
            None => existing.notes.clone(),
        };

        let updated = Opportunity {
            id: existing.id.clone(),
            user_id: existing.user_id.clone(),
            client_id: patch.client_id.clone().or_else(|| existing.client_id.clone()),
            title: patch
                .title
                .as_deref()
                .map(|t| t.trim().to_string())
                .unwrap_or_else(|| existing.title.clone()),
            value: patch.value.unwrap_or(existing.value),
            status,
            deal_type: existing.deal_type,
            niche: existing.niche,
            probability: patch.probability.unwrap_or(existing.probability),
            expected_close_date: patch_date(&patch.expected_close_date, existing.expected_close_date, tz),
            actual_close_date: patch_date(&patch.actual_close_date, existing.actual_close_date, tz),
            follow_up_date: patch_date(&patch.follow_up_date, existing.follow_up_date, tz),
            discovery_call_date: patch_date(
                &patch.discovery_call_date,
                existing.discovery_call_date,
                tz,
            ),
            scheduled_date: patch_date(&patch.scheduled_date, existing.scheduled_date, tz),
            user_timezone: patch
                .user_timezone
                .clone()
                .or_else(|| existing.user_timezone.clone()),
            notes,
            tags: patch.tags.clone().unwrap_or_else(|| existing.tags.clone()),
            custom_fields: patch
                .custom_fields
                .clone()
                .unwrap_or_else(|| existing.custom_fields.clone()),
            created_at: existing.created_at,
            updated_at: now,
        };

        self.persist_update(&updated)?;

        let client_sync = if updated.status == Status::Won && patch.stage.is_some() {
            self.sync_client_for_won(&updated, now)
        } else {
            ClientSync::Skipped
        };

        Ok(OpportunityWrite {
            opportunity: updated,
            client_sync,
        })
    }

    // -- Delete ------------------------------------------------------------

    /// Delete an opportunity, scoped to its owner.
    pub fn delete(&self, user_id: &str, id: &str) -> Result<()> {
        let affected = self.store.execute_write(
            "DELETE FROM opportunities WHERE id = ? AND userId = ?",
            &[Some(id.to_string()), Some(user_id.to_string())],
        )?;
        if affected == 0 {
            return Err(TangoCrmError::NotFound(format!("opportunity {id}")));
        }
        Ok(())
    }

    // -- Persistence -------------------------------------------------------

    fn insert(&self, o: &Opportunity) -> Result<()> {
        let sql = "INSERT INTO opportunities (
            id, userId, clientId, title, value, status, dealType, niche,
            probability, expectedCloseDate, actualCloseDate, followUpDate,
            discoveryCallDate, scheduledDate, userTimezone, notes, tags,
            customFields, createdAt, updatedAt
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)";

        let params: Vec<Option<String>> = vec![
            Some(o.id.clone()),
            Some(o.user_id.clone()),
            o.client_id.clone(),
            Some(o.title.clone()),
            Some(o.value.to_string()),
            Some(o.status.as_str().to_string()),
            Some(o.deal_type.as_str().to_string()),
            Some(o.niche.as_str().to_string()),
            Some(o.probability.to_string()),
            o.expected_close_date.map(dates::format_utc),
            o.actual_close_date.map(dates::format_utc),
            o.follow_up_date.map(dates::format_utc),
            o.discovery_call_date.map(dates::format_utc),
            o.scheduled_date.map(dates::format_utc),
            o.user_timezone.clone(),
            o.notes.clone(),
            Some(serde_json::to_string(&o.tags)?),
            Some(serde_json::to_string(&o.custom_fields)?),
            Some(dates::format_utc(o.created_at)),
            Some(dates::format_utc(o.updated_at)),
        ];

        self.store.execute_write(sql, &params)?;
        Ok(())
    }

    fn persist_update(&self, o: &Opportunity) -> Result<()> {
        let sql = "UPDATE opportunities SET
            clientId = ?, title = ?, value = ?, status = ?, probability = ?,
            expectedCloseDate = ?, actualCloseDate = ?, followUpDate = ?,
            discoveryCallDate = ?, scheduledDate = ?, userTimezone = ?,
            notes = ?, tags = ?, customFields = ?, updatedAt = ?
        WHERE id = ? AND userId = ?";

        let params: Vec<Option<String>> = vec![
            o.client_id.clone(),
            Some(o.title.clone()),
            Some(o.value.to_string()),
            Some(o.status.as_str().to_string()),
            Some(o.probability.to_string()),
            o.expected_close_date.map(dates::format_utc),
            o.actual_close_date.map(dates::format_utc),
            o.follow_up_date.map(dates::format_utc),
            o.discovery_call_date.map(dates::format_utc),
            o.scheduled_date.map(dates::format_utc),
            o.user_timezone.clone(),
            o.notes.clone(),
            Some(serde_json::to_string(&o.tags)?),
            Some(serde_json::to_string(&o.custom_fields)?),
            Some(dates::format_utc(o.updated_at)),
            Some(o.id.clone()),
            Some(o.user_id.clone()),
        ];

        self.store.execute_write(sql, &params)?;
        Ok(())
    }

    // -- Won-transition client sync ----------------------------------------

    /// Best-effort sync of the counterparty client record after a write
    /// lands on `won`. Errors are logged and folded into the returned
    /// [`ClientSync`]; the primary write has already succeeded.
    fn sync_client_for_won(&self, opportunity: &Opportunity, now: DateTime<Utc>) -> ClientSync {
        match self.try_sync_client(opportunity, now) {
            Ok(sync) => sync,
            Err(err) => {
                tracing::warn!(
                    opportunity_id = %opportunity.id,
                    error = %err,
                    "client sync after won transition failed; keeping primary write"
                );
                ClientSync::Failed {
                    reason: err.to_string(),
                }
            }
        }
    }

    fn try_sync_client(
        &self,
        opportunity: &Opportunity,
        now: DateTime<Utc>,
    ) -> Result<ClientSync> {
        let stamp = dates::format_utc(now);

        if let Some(client_id) = &opportunity.client_id {
            let affected = self.store.execute_write(
                "UPDATE clients SET status = ?, updatedAt = ? WHERE id = ? AND userId = ?",
                &[
                    Some("client".to_string()),
                    Some(stamp),
                    Some(client_id.clone()),
                    Some(opportunity.user_id.clone()),
                ],
            )?;
            if affected == 0 {
                return Err(TangoCrmError::NotFound(format!("client {client_id}")));
            }
            return Ok(ClientSync::Updated {
                client_id: client_id.clone(),
            });
        }

        let Some(name) = opportunity
            .custom_fields
            .counterparty_name(opportunity.niche)
        else {
            return Ok(ClientSync::Skipped);
        };

        // Read-then-write without a transaction: concurrent won transitions
        // naming the same counterparty can race and create duplicates.
        let (sql, params) = SqlBuilder::new(config::CLIENTS_TABLE)
            .select(&["id"])
            .where_eq("userId", &opportunity.user_id)
            .where_eq("niche", opportunity.niche.as_str())
            .where_eq("name", name)
            .limit(1)
            .build();
        let found = self.store.execute(&sql, &params)?;

        if let Some(row) = found.into_iter().next() {
            let client_id = row
                .get("id")
                .and_then(|v| v.as_str())
                .map(|s| s.to_string())
                .ok_or_else(|| TangoCrmError::NotFound("client id column missing".to_string()))?;
            self.store.execute_write(
                "UPDATE clients SET status = ?, updatedAt = ? WHERE id = ? AND userId = ?",
                &[
                    Some("client".to_string()),
                    Some(stamp),
                    Some(client_id.clone()),
                    Some(opportunity.user_id.clone()),
                ],
            )?;
            return Ok(ClientSync::Updated { client_id });
        }

        let client_id = Uuid::new_v4().to_string();
        self.store.execute_write(
            "INSERT INTO clients (id, userId, name, email, status, niche, tags, notes, createdAt, updatedAt)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            &[
                Some(client_id.clone()),
                Some(opportunity.user_id.clone()),
                Some(name.to_string()),
                None,
                Some("client".to_string()),
                Some(opportunity.niche.as_str().to_string()),
                Some(serde_json::to_string(&["from-opportunity"])?),
                Some(provenance_note(opportunity)),
                Some(stamp.clone()),
                Some(stamp),
            ],
        )?;
        Ok(ClientSync::Created { client_id })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn row_to_opportunity(row: HashMap<String, serde_json::Value>) -> Result<Opportunity> {
    super::row_into(row, &["tags", "customFields"])
}

fn patch_date(
    supplied: &Option<String>,
    current: Option<DateTime<Utc>>,
    tz: &str,
) -> Option<DateTime<Utc>> {
    match supplied {
        // Malformed input clears the field; parse failures never propagate.
        Some(raw) => dates::to_utc(Some(raw), tz),
        None => current,
    }
}

fn validate_title(title: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(TangoCrmError::InvalidArgument(
            "opportunity title must be non-empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_value(value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(TangoCrmError::InvalidArgument(format!(
            "opportunity value must be a non-negative amount, got {value}"
        )));
    }
    Ok(())
}

fn validate_probability(probability: u8) -> Result<()> {
    if probability > 100 {
        return Err(TangoCrmError::InvalidArgument(format!(
            "probability must be 0-100, got {probability}"
        )));
    }
    Ok(())
}

fn provenance_note(opportunity: &Opportunity) -> String {
    match opportunity.niche {
        Niche::Creator => format!("Brand captured from won deal \"{}\"", opportunity.title),
        Niche::Coach => format!(
            "Coaching client captured from won engagement \"{}\"",
            opportunity.title
        ),
        Niche::Podcaster => format!(
            "Guest or sponsor captured from won episode deal \"{}\"",
            opportunity.title
        ),
        Niche::Freelancer => format!(
            "Client captured from won project \"{}\"",
            opportunity.title
        ),
    }
}
