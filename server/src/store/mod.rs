//! Persistence layer for the Gatherly server.
//!
//! Two trait seams, [`UserStore`] and [`EventStore`], cover everything the
//! handlers need. [`mongo::MongoStore`] backs them with a document database;
//! [`memory::MemoryStore`] backs them with process-local maps for dev mode
//! and tests.
//!
//! The handlers own all decision logic (ownership checks, RSVP merge,
//! checklist lookup); the stores are plain read/write collaborators. Each
//! operation is independently transactional - concurrent writers to the same
//! event are last-write-wins.

pub mod memory;
pub mod mongo;

use async_trait::async_trait;
use thiserror::Error;

use crate::types::{Event, User};

/// Generic persistence failure. Maps to HTTP 500 at the handler boundary.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The underlying database operation failed.
    #[error("database error: {0}")]
    Database(String),
}

/// Persists user identity records.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Inserts a new user.
    async fn insert_user(&self, user: User) -> Result<(), StoreError>;

    /// Looks up a user by email.
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
}

/// Persists event documents with their embedded sub-collections.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Inserts a new event.
    async fn insert_event(&self, event: Event) -> Result<(), StoreError>;

    /// Fetches an event by id.
    async fn find_event(&self, id: &str) -> Result<Option<Event>, StoreError>;

    /// Lists all events owned by `creator`.
    async fn list_events_by_creator(&self, creator: &str) -> Result<Vec<Event>, StoreError>;

    /// Overwrites a stored event with `event` (matched by id).
    async fn replace_event(&self, event: &Event) -> Result<(), StoreError>;

    /// Deletes an event by id.
    async fn delete_event(&self, id: &str) -> Result<(), StoreError>;
}
