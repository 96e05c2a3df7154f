//! Storage capability traits.
//!
//! Two narrow interfaces: one for contact records, one for per-user
//! edit-state. Dispatchers depend only on these, so tests can
//! substitute an in-memory backend or hand-rolled doubles.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::contacts::{Contact, EditState};
use crate::error::DatabaseError;

/// Durable per-(user, contact) field storage.
#[async_trait]
pub trait ContactStore: Send + Sync {
    /// Insert a full contact row.
    async fn write_contact(&self, owner_id: i64, contact: &Contact) -> Result<(), DatabaseError>;

    /// Fetch one contact, or `None` if the row does not exist.
    async fn get_contact(
        &self,
        owner_id: i64,
        contact_id: i64,
    ) -> Result<Option<Contact>, DatabaseError>;

    /// All contacts with exactly this name.
    async fn get_by_name(&self, owner_id: i64, name: &str) -> Result<Vec<Contact>, DatabaseError>;

    /// All contacts of this user.
    async fn get_all(&self, owner_id: i64) -> Result<Vec<Contact>, DatabaseError>;

    /// Delete one contact row. Deleting a missing row is not an error.
    async fn delete_contact(&self, owner_id: i64, contact_id: i64) -> Result<(), DatabaseError>;

    // Per-field updates. Idempotent: re-applying the same value yields
    // the same stored row.

    async fn write_name(
        &self,
        name: &str,
        owner_id: i64,
        contact_id: i64,
    ) -> Result<(), DatabaseError>;

    async fn write_phone(
        &self,
        phone: &str,
        owner_id: i64,
        contact_id: i64,
    ) -> Result<(), DatabaseError>;

    async fn write_birthday(
        &self,
        birthday: NaiveDate,
        owner_id: i64,
        contact_id: i64,
    ) -> Result<(), DatabaseError>;

    async fn write_description(
        &self,
        description: &str,
        owner_id: i64,
        contact_id: i64,
    ) -> Result<(), DatabaseError>;

    /// Mint the next free contact id for this user. Per-user
    /// monotonic, starting at 1.
    async fn next_contact_id(&self, owner_id: i64) -> Result<i64, DatabaseError>;
}

/// Durable per-user "what step am I on" storage.
#[async_trait]
pub trait EditStateStore: Send + Sync {
    /// Create or overwrite the user's edit-state.
    async fn set_state(&self, user_id: i64, state: EditState) -> Result<(), DatabaseError>;

    /// Fetch the user's edit-state; `None` means idle.
    async fn get_state(&self, user_id: i64) -> Result<Option<EditState>, DatabaseError>;

    /// Reset the step to idle, keeping the row.
    async fn reset_to_idle(&self, user_id: i64) -> Result<(), DatabaseError>;
}
