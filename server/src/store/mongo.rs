//! MongoDB-backed store.
//!
//! Documents are stored in two collections, `users` and `events`, with event
//! sub-collections embedded in the event document. On connect a unique index
//! on `users.email` backs the handler-level duplicate check.

use futures_util::stream::TryStreamExt;
use mongodb::bson::doc;
use mongodb::options::IndexOptions;
use mongodb::{Client, Collection, IndexModel};
use tracing::info;

use crate::types::{Event, User};

use super::{EventStore, StoreError, UserStore};

impl From<mongodb::error::Error> for StoreError {
    fn from(err: mongodb::error::Error) -> Self {
        Self::Database(err.to_string())
    }
}

/// MongoDB implementation of [`UserStore`] and [`EventStore`].
#[derive(Debug, Clone)]
pub struct MongoStore {
    users: Collection<User>,
    events: Collection<Event>,
}

impl MongoStore {
    /// Connects to MongoDB and prepares the collections.
    ///
    /// # Errors
    ///
    /// Fails if the connection string is invalid, the server is unreachable,
    /// or the unique email index cannot be created.
    pub async fn connect(uri: &str, database: &str) -> Result<Self, StoreError> {
        let client = Client::with_uri_str(uri).await?;
        let db = client.database(database);

        let users = db.collection::<User>("users");
        let events = db.collection::<Event>("events");

        // Email uniqueness invariant, enforced at the store as well as in
        // the signup handler.
        let email_index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        users.create_index(email_index, None).await?;

        info!(database = database, "Connected to MongoDB");

        Ok(Self { users, events })
    }
}

#[async_trait::async_trait]
impl UserStore for MongoStore {
    async fn insert_user(&self, user: User) -> Result<(), StoreError> {
        self.users.insert_one(user, None).await?;
        Ok(())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self.users.find_one(doc! { "email": email }, None).await?)
    }
}

#[async_trait::async_trait]
impl EventStore for MongoStore {
    async fn insert_event(&self, event: Event) -> Result<(), StoreError> {
        self.events.insert_one(event, None).await?;
        Ok(())
    }

    async fn find_event(&self, id: &str) -> Result<Option<Event>, StoreError> {
        Ok(self.events.find_one(doc! { "_id": id }, None).await?)
    }

    async fn list_events_by_creator(&self, creator: &str) -> Result<Vec<Event>, StoreError> {
        let cursor = self.events.find(doc! { "creator": creator }, None).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn replace_event(&self, event: &Event) -> Result<(), StoreError> {
        self.events
            .replace_one(doc! { "_id": &event.id }, event, None)
            .await?;
        Ok(())
    }

    async fn delete_event(&self, id: &str) -> Result<(), StoreError> {
        self.events.delete_one(doc! { "_id": id }, None).await?;
        Ok(())
    }
}
