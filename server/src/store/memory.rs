//! In-memory store backing dev mode and tests.
//!
//! Data lives in process-local maps and does not survive a restart. The
//! server falls back to this store when `GATHERLY_MONGODB_URI` is unset.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::types::{Event, User};

use super::{EventStore, StoreError, UserStore};

/// Process-local implementation of [`UserStore`] and [`EventStore`].
///
/// Cheap to clone; clones share the same underlying maps.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    users: Arc<RwLock<HashMap<String, User>>>,
    events: Arc<RwLock<HashMap<String, Event>>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert_user(&self, user: User) -> Result<(), StoreError> {
        self.users.write().await.insert(user.id.clone(), user);
        Ok(())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }
}

#[async_trait]
impl EventStore for MemoryStore {
    async fn insert_event(&self, event: Event) -> Result<(), StoreError> {
        self.events.write().await.insert(event.id.clone(), event);
        Ok(())
    }

    async fn find_event(&self, id: &str) -> Result<Option<Event>, StoreError> {
        Ok(self.events.read().await.get(id).cloned())
    }

    async fn list_events_by_creator(&self, creator: &str) -> Result<Vec<Event>, StoreError> {
        let events = self.events.read().await;
        Ok(events
            .values()
            .filter(|e| e.creator == creator)
            .cloned()
            .collect())
    }

    async fn replace_event(&self, event: &Event) -> Result<(), StoreError> {
        self.events
            .write()
            .await
            .insert(event.id.clone(), event.clone());
        Ok(())
    }

    async fn delete_event(&self, id: &str) -> Result<(), StoreError> {
        self.events.write().await.remove(id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample_event(creator: &str) -> Event {
        Event::new("Picnic", None, Utc::now(), "Park", creator)
    }

    #[tokio::test]
    async fn inserted_user_is_found_by_email() {
        let store = MemoryStore::new();
        let user = User::new("alice@x.com", "hash");
        let user_id = user.id.clone();
        store.insert_user(user).await.unwrap();

        let found = store.find_user_by_email("alice@x.com").await.unwrap();
        assert_eq!(found.unwrap().id, user_id);
    }

    #[tokio::test]
    async fn unknown_email_returns_none() {
        let store = MemoryStore::new();
        assert!(store
            .find_user_by_email("nobody@x.com")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn event_crud_roundtrip() {
        let store = MemoryStore::new();
        let mut event = sample_event("user-1");
        let event_id = event.id.clone();

        store.insert_event(event.clone()).await.unwrap();
        assert_eq!(
            store.find_event(&event_id).await.unwrap().unwrap().title,
            "Picnic"
        );

        event.title = "Company picnic".to_string();
        store.replace_event(&event).await.unwrap();
        assert_eq!(
            store.find_event(&event_id).await.unwrap().unwrap().title,
            "Company picnic"
        );

        store.delete_event(&event_id).await.unwrap();
        assert!(store.find_event(&event_id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_filters_by_creator() {
        let store = MemoryStore::new();
        store.insert_event(sample_event("user-1")).await.unwrap();
        store.insert_event(sample_event("user-1")).await.unwrap();
        store.insert_event(sample_event("user-2")).await.unwrap();

        let mine = store.list_events_by_creator("user-1").await.unwrap();
        assert_eq!(mine.len(), 2);
        assert!(mine.iter().all(|e| e.creator == "user-1"));
    }

    #[tokio::test]
    async fn clones_share_state() {
        let store = MemoryStore::new();
        let clone = store.clone();
        clone.insert_event(sample_event("user-1")).await.unwrap();

        assert_eq!(store.list_events_by_creator("user-1").await.unwrap().len(), 1);
    }
}
