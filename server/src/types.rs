//! Core data model for the Gatherly server.
//!
//! Two document collections are persisted: [`User`] and [`Event`]. An event
//! embeds its RSVP list, checklist, and reminder list as ordered
//! sub-collections rather than normalizing them into separate collections.
//!
//! Identifiers are UUID v4 strings. Top-level documents rename their `id`
//! field to `_id` so the same struct serializes correctly both for MongoDB
//! and for the JSON API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered user.
///
/// Created on signup, never mutated or deleted. The email is unique across
/// all users; the handlers enforce this with a check-then-insert and the
/// Mongo store backs it with a unique index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique user identifier (UUID v4).
    #[serde(rename = "_id")]
    pub id: String,

    /// Login email, unique across all users.
    pub email: String,

    /// Argon2-encoded password hash. Never returned by any endpoint.
    pub password_hash: String,
}

impl User {
    /// Creates a new user with a fresh identifier.
    pub fn new(email: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: email.into(),
            password_hash: password_hash.into(),
        }
    }
}

/// Attendance response to an event.
///
/// Serialized with the human-readable labels the API contract uses
/// (`"Going"`, `"Not Going"`, `"Maybe"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RsvpStatus {
    Going,
    #[serde(rename = "Not Going")]
    NotGoing,
    #[default]
    Maybe,
}

/// One user's RSVP entry on an event.
///
/// Invariant: at most one entry per user; re-RSVP updates the existing entry
/// in place rather than appending a second one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rsvp {
    /// The responding user's id.
    pub user: String,

    /// Current attendance status.
    pub status: RsvpStatus,
}

/// A to-do entry on an event's checklist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistItem {
    /// Item identifier (UUID v4), used to address the item for toggling.
    pub id: String,

    /// Free-text content.
    pub item: String,

    /// Completion flag, toggled via the checklist item endpoint.
    pub completed: bool,
}

impl ChecklistItem {
    /// Creates a new, uncompleted checklist item.
    pub fn new(item: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            item: item.into(),
            completed: false,
        }
    }
}

/// A stored (time, message) reminder pair.
///
/// Reminders are persisted and logged at creation time; nothing schedules or
/// delivers them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    /// When the reminder is nominally due.
    pub time: DateTime<Utc>,

    /// Reminder text.
    pub message: String,
}

/// An event document with its embedded sub-collections.
///
/// Owned by exactly one user: `creator` is set at creation and immutable
/// thereafter. All mutations except RSVPs are owner-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Unique event identifier (UUID v4).
    #[serde(rename = "_id")]
    pub id: String,

    /// Event title.
    pub title: String,

    /// Optional free-text description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// When the event takes place.
    pub date: DateTime<Utc>,

    /// Where the event takes place.
    pub location: String,

    /// Id of the owning user. Immutable after creation.
    pub creator: String,

    /// One RSVP entry per distinct responding user.
    #[serde(default)]
    pub rsvps: Vec<Rsvp>,

    /// Ordered checklist items.
    #[serde(default)]
    pub checklist: Vec<ChecklistItem>,

    /// Ordered reminder entries.
    #[serde(default)]
    pub reminders: Vec<Reminder>,
}

impl Event {
    /// Creates a new event owned by `creator` with empty sub-collections.
    pub fn new(
        title: impl Into<String>,
        description: Option<String>,
        date: DateTime<Utc>,
        location: impl Into<String>,
        creator: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            description,
            date,
            location: location.into(),
            creator: creator.into(),
            rsvps: Vec::new(),
            checklist: Vec::new(),
            reminders: Vec::new(),
        }
    }

    /// Returns a mutable reference to the caller's RSVP entry, if present.
    pub fn rsvp_for_mut(&mut self, user_id: &str) -> Option<&mut Rsvp> {
        self.rsvps.iter_mut().find(|r| r.user == user_id)
    }

    /// Returns a mutable reference to the checklist item with `item_id`.
    pub fn checklist_item_mut(&mut self, item_id: &str) -> Option<&mut ChecklistItem> {
        self.checklist.iter_mut().find(|i| i.id == item_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_event() -> Event {
        let date = DateTime::parse_from_rfc3339("2026-09-01T18:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        Event::new("Launch party", None, date, "Rooftop", "user-1")
    }

    #[test]
    fn rsvp_status_serializes_with_api_labels() {
        assert_eq!(
            serde_json::to_string(&RsvpStatus::Going).unwrap(),
            r#""Going""#
        );
        assert_eq!(
            serde_json::to_string(&RsvpStatus::NotGoing).unwrap(),
            r#""Not Going""#
        );
        assert_eq!(
            serde_json::to_string(&RsvpStatus::Maybe).unwrap(),
            r#""Maybe""#
        );
    }

    #[test]
    fn rsvp_status_deserializes_from_api_labels() {
        assert_eq!(
            serde_json::from_str::<RsvpStatus>(r#""Not Going""#).unwrap(),
            RsvpStatus::NotGoing
        );
        assert_eq!(
            serde_json::from_str::<RsvpStatus>(r#""Maybe""#).unwrap(),
            RsvpStatus::Maybe
        );
    }

    #[test]
    fn rsvp_status_defaults_to_maybe() {
        assert_eq!(RsvpStatus::default(), RsvpStatus::Maybe);
    }

    #[test]
    fn user_serializes_id_as_underscore_id() {
        let user = User::new("alice@x.com", "$argon2id$stub");
        let json: serde_json::Value = serde_json::to_value(&user).unwrap();
        assert_eq!(json["_id"], user.id);
        assert_eq!(json["email"], "alice@x.com");
        assert!(json.get("id").is_none());
    }

    #[test]
    fn event_new_sets_owner_and_empty_collections() {
        let event = sample_event();
        assert_eq!(event.creator, "user-1");
        assert!(event.rsvps.is_empty());
        assert!(event.checklist.is_empty());
        assert!(event.reminders.is_empty());
    }

    #[test]
    fn event_omits_missing_description() {
        let event = sample_event();
        let json = serde_json::to_string(&event).unwrap();
        assert!(!json.contains("description"));
    }

    #[test]
    fn event_roundtrips_through_json() {
        let mut event = sample_event();
        event.description = Some("Bring snacks".to_string());
        event.rsvps.push(Rsvp {
            user: "user-2".to_string(),
            status: RsvpStatus::Going,
        });
        event.checklist.push(ChecklistItem::new("Order cake"));
        event.reminders.push(Reminder {
            time: event.date,
            message: "Starts soon".to_string(),
        });

        let json = serde_json::to_string(&event).unwrap();
        let roundtrip: Event = serde_json::from_str(&json).unwrap();
        assert_eq!(event, roundtrip);
    }

    #[test]
    fn checklist_item_starts_uncompleted() {
        let item = ChecklistItem::new("Send invites");
        assert!(!item.completed);
        assert_eq!(item.item, "Send invites");
    }

    #[test]
    fn rsvp_for_mut_finds_matching_user() {
        let mut event = sample_event();
        event.rsvps.push(Rsvp {
            user: "user-2".to_string(),
            status: RsvpStatus::Maybe,
        });

        assert!(event.rsvp_for_mut("user-2").is_some());
        assert!(event.rsvp_for_mut("user-3").is_none());
    }

    #[test]
    fn checklist_item_mut_finds_by_id() {
        let mut event = sample_event();
        let item = ChecklistItem::new("Book venue");
        let item_id = item.id.clone();
        event.checklist.push(item);

        assert!(event.checklist_item_mut(&item_id).is_some());
        assert!(event.checklist_item_mut("missing").is_none());
    }
}
