//! libSQL backend — async implementation of both store traits.
//!
//! Supports local file and in-memory databases. One connection is
//! reused for all operations; `libsql::Connection` is `Send + Sync`
//! and safe for concurrent async use.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use libsql::{Connection, Database as LibSqlDatabase, params};
use tracing::info;

use crate::contacts::model::BIRTHDAY_REF_YEAR;
use crate::contacts::{Contact, EditState, Step};
use crate::error::DatabaseError;
use crate::store::migrations;
use crate::store::traits::{ContactStore, EditStateStore};

/// libSQL database backend.
pub struct LibSqlBackend {
    #[allow(dead_code)]
    db: Arc<LibSqlDatabase>,
    conn: Connection,
}

impl LibSqlBackend {
    /// Open (or create) a local database file and run migrations.
    pub async fn new_local(path: &Path) -> Result<Self, DatabaseError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DatabaseError::Pool(format!("Failed to create database directory: {e}"))
            })?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| DatabaseError::Pool(format!("Failed to open libSQL database: {e}")))?;

        let conn = db
            .connect()
            .map_err(|e| DatabaseError::Pool(format!("Failed to create connection: {e}")))?;

        let backend = Self {
            db: Arc::new(db),
            conn,
        };
        migrations::run_migrations(backend.conn()).await?;
        info!(path = %path.display(), "Database opened");
        Ok(backend)
    }

    /// Create an in-memory database (for tests).
    pub async fn new_memory() -> Result<Self, DatabaseError> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| {
                DatabaseError::Pool(format!("Failed to create in-memory database: {e}"))
            })?;

        let conn = db
            .connect()
            .map_err(|e| DatabaseError::Pool(format!("Failed to create connection: {e}")))?;

        let backend = Self {
            db: Arc::new(db),
            conn,
        };
        migrations::run_migrations(backend.conn()).await?;
        Ok(backend)
    }

    /// Get the connection.
    fn conn(&self) -> &Connection {
        &self.conn
    }
}

// ── Helper functions ────────────────────────────────────────────────

const CONTACT_COLUMNS: &str = "contact_id, name, phone, birthday, description";

/// Canonical write format for the birthday column.
fn birthday_to_db(birthday: NaiveDate) -> String {
    birthday.format("%Y-%m-%d").to_string()
}

/// Parse the birthday column; unparseable values count as unset.
fn birthday_from_db(s: Option<String>) -> Option<NaiveDate> {
    let s = s?;
    NaiveDate::parse_from_str(&s, "%Y-%m-%d")
        .ok()
        .map(|d| d.with_year(BIRTHDAY_REF_YEAR).unwrap_or(d))
}

/// Convert `Option<String>` to a libsql Value.
fn opt_text(s: Option<String>) -> libsql::Value {
    match s {
        Some(s) => libsql::Value::Text(s),
        None => libsql::Value::Null,
    }
}

/// Map a libsql row (CONTACT_COLUMNS order) to a Contact.
fn row_to_contact(row: &libsql::Row) -> Result<Contact, libsql::Error> {
    let birthday_str: Option<String> = row.get(3).ok();
    Ok(Contact {
        contact_id: row.get(0)?,
        name: row.get(1)?,
        phone: row.get(2)?,
        birthday: birthday_from_db(birthday_str),
        description: row.get(4)?,
    })
}

fn query_err(e: libsql::Error) -> DatabaseError {
    DatabaseError::Query(e.to_string())
}

// ── Trait implementations ───────────────────────────────────────────

#[async_trait]
impl ContactStore for LibSqlBackend {
    async fn write_contact(&self, owner_id: i64, contact: &Contact) -> Result<(), DatabaseError> {
        let birthday = opt_text(contact.birthday.map(birthday_to_db));
        self.conn()
            .execute(
                "INSERT INTO contacts (tg_user_id, contact_id, name, phone, birthday, description)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    owner_id,
                    contact.contact_id,
                    contact.name.as_str(),
                    contact.phone.as_str(),
                    birthday,
                    contact.description.as_str(),
                ],
            )
            .await
            .map_err(query_err)?;
        Ok(())
    }

    async fn get_contact(
        &self,
        owner_id: i64,
        contact_id: i64,
    ) -> Result<Option<Contact>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                &format!(
                    "SELECT {CONTACT_COLUMNS} FROM contacts
                     WHERE tg_user_id = ?1 AND contact_id = ?2"
                ),
                params![owner_id, contact_id],
            )
            .await
            .map_err(query_err)?;

        match rows.next().await.map_err(query_err)? {
            Some(row) => Ok(Some(row_to_contact(&row).map_err(query_err)?)),
            None => Ok(None),
        }
    }

    async fn get_by_name(&self, owner_id: i64, name: &str) -> Result<Vec<Contact>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                &format!(
                    "SELECT {CONTACT_COLUMNS} FROM contacts
                     WHERE tg_user_id = ?1 AND name = ?2
                     ORDER BY contact_id"
                ),
                params![owner_id, name],
            )
            .await
            .map_err(query_err)?;

        let mut contacts = Vec::new();
        while let Some(row) = rows.next().await.map_err(query_err)? {
            contacts.push(row_to_contact(&row).map_err(query_err)?);
        }
        Ok(contacts)
    }

    async fn get_all(&self, owner_id: i64) -> Result<Vec<Contact>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                &format!(
                    "SELECT {CONTACT_COLUMNS} FROM contacts
                     WHERE tg_user_id = ?1
                     ORDER BY contact_id"
                ),
                params![owner_id],
            )
            .await
            .map_err(query_err)?;

        let mut contacts = Vec::new();
        while let Some(row) = rows.next().await.map_err(query_err)? {
            contacts.push(row_to_contact(&row).map_err(query_err)?);
        }
        Ok(contacts)
    }

    async fn delete_contact(&self, owner_id: i64, contact_id: i64) -> Result<(), DatabaseError> {
        self.conn()
            .execute(
                "DELETE FROM contacts WHERE tg_user_id = ?1 AND contact_id = ?2",
                params![owner_id, contact_id],
            )
            .await
            .map_err(query_err)?;
        Ok(())
    }

    async fn write_name(
        &self,
        name: &str,
        owner_id: i64,
        contact_id: i64,
    ) -> Result<(), DatabaseError> {
        self.conn()
            .execute(
                "UPDATE contacts SET name = ?1 WHERE tg_user_id = ?2 AND contact_id = ?3",
                params![name, owner_id, contact_id],
            )
            .await
            .map_err(query_err)?;
        Ok(())
    }

    async fn write_phone(
        &self,
        phone: &str,
        owner_id: i64,
        contact_id: i64,
    ) -> Result<(), DatabaseError> {
        self.conn()
            .execute(
                "UPDATE contacts SET phone = ?1 WHERE tg_user_id = ?2 AND contact_id = ?3",
                params![phone, owner_id, contact_id],
            )
            .await
            .map_err(query_err)?;
        Ok(())
    }

    async fn write_birthday(
        &self,
        birthday: NaiveDate,
        owner_id: i64,
        contact_id: i64,
    ) -> Result<(), DatabaseError> {
        self.conn()
            .execute(
                "UPDATE contacts SET birthday = ?1 WHERE tg_user_id = ?2 AND contact_id = ?3",
                params![birthday_to_db(birthday), owner_id, contact_id],
            )
            .await
            .map_err(query_err)?;
        Ok(())
    }

    async fn write_description(
        &self,
        description: &str,
        owner_id: i64,
        contact_id: i64,
    ) -> Result<(), DatabaseError> {
        self.conn()
            .execute(
                "UPDATE contacts SET description = ?1 WHERE tg_user_id = ?2 AND contact_id = ?3",
                params![description, owner_id, contact_id],
            )
            .await
            .map_err(query_err)?;
        Ok(())
    }

    async fn next_contact_id(&self, owner_id: i64) -> Result<i64, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                "SELECT COALESCE(MAX(contact_id), 0) + 1 FROM contacts WHERE tg_user_id = ?1",
                params![owner_id],
            )
            .await
            .map_err(query_err)?;

        match rows.next().await.map_err(query_err)? {
            Some(row) => row.get::<i64>(0).map_err(query_err),
            None => Ok(1),
        }
    }
}

#[async_trait]
impl EditStateStore for LibSqlBackend {
    async fn set_state(&self, user_id: i64, state: EditState) -> Result<(), DatabaseError> {
        self.conn()
            .execute(
                "INSERT INTO user_states (tg_user_id, contact_id, message_id, step)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT (tg_user_id) DO UPDATE
                 SET contact_id = ?2, message_id = ?3, step = ?4",
                params![
                    user_id,
                    state.contact_id,
                    state.message_id,
                    state.step.to_db()
                ],
            )
            .await
            .map_err(query_err)?;
        Ok(())
    }

    async fn get_state(&self, user_id: i64) -> Result<Option<EditState>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                "SELECT contact_id, message_id, step FROM user_states WHERE tg_user_id = ?1",
                params![user_id],
            )
            .await
            .map_err(query_err)?;

        match rows.next().await.map_err(query_err)? {
            Some(row) => {
                let step: i64 = row.get(2).map_err(query_err)?;
                Ok(Some(EditState {
                    contact_id: row.get(0).map_err(query_err)?,
                    message_id: row.get(1).map_err(query_err)?,
                    step: Step::from_db(step),
                }))
            }
            None => Ok(None),
        }
    }

    async fn reset_to_idle(&self, user_id: i64) -> Result<(), DatabaseError> {
        self.conn()
            .execute(
                "INSERT INTO user_states (tg_user_id, step) VALUES (?1, ?2)
                 ON CONFLICT (tg_user_id) DO UPDATE SET step = ?2",
                params![user_id, Step::Idle.to_db()],
            )
            .await
            .map_err(query_err)?;
        Ok(())
    }
}

// ── Tests ───────────────────────────────────────────────────────────
