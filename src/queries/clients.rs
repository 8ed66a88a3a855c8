//! Owner-scoped client (counterparty) CRUD.
//!
//! Clients are the collaborator records behind opportunities: the brand,
//! guest, sponsor, or person a deal is with. The won-transition sync in
//! [`super::opportunities`] writes to the same table.

use std::collections::HashMap;

use uuid::Uuid;

use crate::clock::Clock;
use crate::config;
use crate::dates;
use crate::error::{Result, TangoCrmError};
use crate::models::{Client, ClientStatus, NewClient, Niche};
use crate::sql_builder::SqlBuilder;
use crate::store::Store;

/// Query interface for client records.
pub struct ClientQuery<'a> {
    store: &'a Store,
    clock: &'a dyn Clock,
}

impl<'a> ClientQuery<'a> {
    pub fn new(store: &'a Store, clock: &'a dyn Clock) -> Self {
        Self { store, clock }
    }

    /// Create a client for the given owner. Status defaults to `lead`.
    pub fn create(&self, user_id: &str, params: &NewClient) -> Result<Client> {
        if params.name.trim().is_empty() {
            return Err(TangoCrmError::InvalidArgument(
                "client name must be non-empty".to_string(),
            ));
        }

        let now = self.clock.now_utc();
        let client = Client {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            name: params.name.trim().to_string(),
            email: params.email.clone(),
            status: params.status.unwrap_or(ClientStatus::Lead),
            niche: params.niche,
            tags: params.tags.clone(),
            notes: params.notes.clone(),
            created_at: now,
            updated_at: now,
        };

        let sql = "INSERT INTO clients (
            id, userId, name, email, status, niche, tags, notes, createdAt, updatedAt
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)";
        let stamp = dates::format_utc(now);
        let params: Vec<Option<String>> = vec![
            Some(client.id.clone()),
            Some(client.user_id.clone()),
            Some(client.name.clone()),
            client.email.clone(),
            Some(client.status.as_str().to_string()),
            Some(client.niche.as_str().to_string()),
            Some(serde_json::to_string(&client.tags)?),
            client.notes.clone(),
            Some(stamp.clone()),
            Some(stamp),
        ];
        self.store.execute_write(sql, &params)?;

        Ok(client)
    }

    /// Fetch a single client by id, scoped to its owner.
    pub fn get(&self, user_id: &str, id: &str) -> Result<Option<Client>> {
        let (sql, params) = SqlBuilder::new(config::CLIENTS_TABLE)
            .where_eq("id", id)
            .where_eq("userId", user_id)
            .limit(1)
            .build();
        let rows = self.store.execute(&sql, &params)?;
        rows.into_iter().next().map(row_to_client).transpose()
    }

    /// Find a client by exact name within a niche.
    pub fn get_by_name(
        &self,
        user_id: &str,
        niche: Niche,
        name: &str,
    ) -> Result<Option<Client>> {
        let (sql, params) = SqlBuilder::new(config::CLIENTS_TABLE)
            .where_eq("userId", user_id)
            .where_eq("niche", niche.as_str())
            .where_eq("name", name)
            .limit(1)
            .build();
        let rows = self.store.execute(&sql, &params)?;
        rows.into_iter().next().map(row_to_client).transpose()
    }

    /// List an owner's clients, newest first, optionally filtered by niche.
    pub fn list(&self, user_id: &str, niche: Option<Niche>) -> Result<Vec<Client>> {
        let mut builder = SqlBuilder::new(config::CLIENTS_TABLE);
        builder.where_eq("userId", user_id);
        if let Some(niche) = niche {
            builder.where_eq("niche", niche.as_str());
        }
        builder.order_by(&["createdAt DESC"]);
        let (sql, params) = builder.build();

        let rows = self.store.execute(&sql, &params)?;
        rows.into_iter().map(row_to_client).collect()
    }

    /// Set a client's relationship status.
    pub fn set_status(&self, user_id: &str, id: &str, status: ClientStatus) -> Result<()> {
        let affected = self.store.execute_write(
            "UPDATE clients SET status = ?, updatedAt = ? WHERE id = ? AND userId = ?",
            &[
                Some(status.as_str().to_string()),
                Some(dates::format_utc(self.clock.now_utc())),
                Some(id.to_string()),
                Some(user_id.to_string()),
            ],
        )?;
        if affected == 0 {
            return Err(TangoCrmError::NotFound(format!("client {id}")));
        }
        Ok(())
    }

    /// Delete a client, scoped to its owner.
    pub fn delete(&self, user_id: &str, id: &str) -> Result<()> {
        let affected = self.store.execute_write(
            "DELETE FROM clients WHERE id = ? AND userId = ?",
            &[Some(id.to_string()), Some(user_id.to_string())],
        )?;
        if affected == 0 {
            return Err(TangoCrmError::NotFound(format!("client {id}")));
        }
        Ok(())
    }
}

fn row_to_client(row: HashMap<String, serde_json::Value>) -> Result<Client> {
    super::row_into(row, &["tags"])
}
