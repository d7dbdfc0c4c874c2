//! HTTP route handlers for the Gatherly server.
//!
//! This module provides the HTTP API endpoints:
//!
//! - `POST /signup`, `POST /login` - account creation and token issuance
//! - `POST /events`, `GET /events` - event creation and listing
//! - `PUT /events/{id}`, `DELETE /events/{id}` - owner-only event mutation
//! - `POST /events/{id}/rsvp` - attendance responses (any authenticated user)
//! - `POST /events/{id}/checklist`, `PUT /events/{id}/checklist/{item_id}` -
//!   checklist management
//! - `POST /events/{id}/reminders` - reminder storage (logged, not delivered)
//! - `GET /health` - health check endpoint
//!
//! # Architecture
//!
//! All routes share application state through [`AppState`]: configuration
//! plus the user and event stores. Protected routes sit behind the
//! [`require_auth`] middleware, which resolves the bearer token into an
//! [`AuthUser`] extension. The handlers hold all of the decision logic -
//! ownership checks, the RSVP in-place merge, and the truthy-override update
//! policy - while the stores stay plain CRUD.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::middleware;
use axum::routing::{get, post, put};
use axum::{Extension, Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::auth::{hash_password, issue_token, require_auth, verify_password, AuthUser};
use crate::config::Config;
use crate::error::ApiError;
use crate::store::memory::MemoryStore;
use crate::store::{EventStore, UserStore};
use crate::types::{ChecklistItem, Event, Reminder, Rsvp, RsvpStatus, User};

// ============================================================================
// Application State
// ============================================================================

/// Shared application state for all route handlers.
///
/// Cloned per request; the stores are behind `Arc` so clones are cheap.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<Config>,

    /// User identity store.
    pub users: Arc<dyn UserStore>,

    /// Event document store.
    pub events: Arc<dyn EventStore>,

    /// Server start time for uptime reporting.
    pub start_time: Instant,
}

impl AppState {
    /// Creates application state over explicit store implementations.
    #[must_use]
    pub fn new(config: Config, users: Arc<dyn UserStore>, events: Arc<dyn EventStore>) -> Self {
        Self {
            config: Arc::new(config),
            users,
            events,
            start_time: Instant::now(),
        }
    }

    /// Creates application state backed by a fresh in-memory store.
    ///
    /// Used in dev mode (no `GATHERLY_MONGODB_URI`) and throughout the tests.
    #[must_use]
    pub fn in_memory(config: Config) -> Self {
        let store = Arc::new(MemoryStore::new());
        Self::new(config, store.clone(), store)
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("start_time", &self.start_time)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Router
// ============================================================================

/// Creates the application router with all routes configured.
///
/// `/signup`, `/login`, and `/health` are public; everything under `/events`
/// requires a valid bearer token.
pub fn create_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/events", post(create_event).get(list_events))
        .route("/events/{id}", put(update_event).delete(delete_event))
        .route("/events/{id}/rsvp", post(rsvp_event))
        .route("/events/{id}/checklist", post(add_checklist_item))
        .route(
            "/events/{id}/checklist/{item_id}",
            put(toggle_checklist_item),
        )
        .route("/events/{id}/reminders", post(add_reminder))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/health", get(get_health))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ============================================================================
// Request / Response Types
// ============================================================================

/// Request body for signup and login.
#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Response body carrying a freshly issued bearer token.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Response body for operations that only report a message.
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub msg: String,
}

/// Request body for event creation.
#[derive(Debug, Deserialize)]
struct CreateEventRequest {
    title: String,
    #[serde(default)]
    description: Option<String>,
    date: DateTime<Utc>,
    location: String,
}

/// Request body for event updates. Every field is optional.
#[derive(Debug, Default, Deserialize)]
struct UpdateEventRequest {
    title: Option<String>,
    description: Option<String>,
    date: Option<DateTime<Utc>>,
    location: Option<String>,
}

/// Request body for RSVPs. A missing status defaults to `Maybe`.
#[derive(Debug, Deserialize)]
struct RsvpRequest {
    #[serde(default)]
    status: RsvpStatus,
}

/// Request body for adding a checklist item.
#[derive(Debug, Deserialize)]
struct ChecklistRequest {
    item: String,
}

/// Request body for adding a reminder.
#[derive(Debug, Deserialize)]
struct ReminderRequest {
    time: DateTime<Utc>,
    message: String,
}

// ============================================================================
// Helpers
// ============================================================================

/// Fetches an event or fails with 404.
async fn load_event(state: &AppState, id: &str) -> Result<Event, ApiError> {
    state
        .events
        .find_event(id)
        .await?
        .ok_or(ApiError::NotFound("event"))
}

/// Fails with 403 unless `user` owns `event`.
fn ensure_owner(event: &Event, user: &AuthUser) -> Result<(), ApiError> {
    if event.creator != user.id {
        return Err(ApiError::Forbidden);
    }
    Ok(())
}

// ============================================================================
// POST /signup, POST /login
// ============================================================================

/// POST /signup - register a new user.
///
/// # Responses
///
/// - `200 OK` with `{token}` - account created
/// - `400 Bad Request` - email already registered, or missing field
async fn signup(
    State(state): State<AppState>,
    Json(body): Json<Credentials>,
) -> Result<Json<TokenResponse>, ApiError> {
    if body.email.is_empty() || body.password.is_empty() {
        return Err(ApiError::Validation(
            "email and password are required".to_string(),
        ));
    }

    if state.users.find_user_by_email(&body.email).await?.is_some() {
        return Err(ApiError::DuplicateUser);
    }

    let user = User::new(&body.email, hash_password(&body.password)?);
    state.users.insert_user(user.clone()).await?;

    // Tokens are only signed for persisted users.
    let token = issue_token(&user.id, &state.config.jwt_secret)?;

    info!(user_id = %user.id, "User registered");
    Ok(Json(TokenResponse { token }))
}

/// POST /login - exchange credentials for a bearer token.
///
/// Unknown email and wrong password both produce the same 400 response.
async fn login(
    State(state): State<AppState>,
    Json(body): Json<Credentials>,
) -> Result<Json<TokenResponse>, ApiError> {
    let user = state
        .users
        .find_user_by_email(&body.email)
        .await?
        .ok_or(ApiError::InvalidCredentials)?;

    if !verify_password(&user.password_hash, &body.password) {
        return Err(ApiError::InvalidCredentials);
    }

    let token = issue_token(&user.id, &state.config.jwt_secret)?;
    Ok(Json(TokenResponse { token }))
}

// ============================================================================
// Event CRUD
// ============================================================================

/// POST /events - create an event owned by the caller.
async fn create_event(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<CreateEventRequest>,
) -> Result<Json<Event>, ApiError> {
    if body.title.is_empty() || body.location.is_empty() {
        return Err(ApiError::Validation(
            "title and location are required".to_string(),
        ));
    }

    let event = Event::new(body.title, body.description, body.date, body.location, &user.id);
    state.events.insert_event(event.clone()).await?;

    info!(event_id = %event.id, creator = %user.id, "Event created");
    Ok(Json(event))
}

/// GET /events - list all events owned by the caller. No pagination.
async fn list_events(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<Event>>, ApiError> {
    let events = state.events.list_events_by_creator(&user.id).await?;
    Ok(Json(events))
}

/// PUT /events/{id} - owner-only partial update.
///
/// Truthy-override merge: a field that is absent or empty leaves the stored
/// value unchanged, so an update cannot clear a field. The `creator` field
/// is never touched regardless of request body content.
async fn update_event(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(body): Json<UpdateEventRequest>,
) -> Result<Json<Event>, ApiError> {
    let mut event = load_event(&state, &id).await?;
    ensure_owner(&event, &user)?;

    if let Some(title) = body.title.filter(|s| !s.is_empty()) {
        event.title = title;
    }
    if let Some(description) = body.description.filter(|s| !s.is_empty()) {
        event.description = Some(description);
    }
    if let Some(date) = body.date {
        event.date = date;
    }
    if let Some(location) = body.location.filter(|s| !s.is_empty()) {
        event.location = location;
    }

    state.events.replace_event(&event).await?;
    Ok(Json(event))
}

/// DELETE /events/{id} - owner-only delete.
async fn delete_event(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let event = load_event(&state, &id).await?;
    ensure_owner(&event, &user)?;

    state.events.delete_event(&event.id).await?;
    info!(event_id = %event.id, "Event deleted");

    Ok(Json(MessageResponse {
        msg: "Event deleted".to_string(),
    }))
}

// ============================================================================
// Sub-resources: RSVPs, checklist, reminders
// ============================================================================

/// POST /events/{id}/rsvp - record the caller's attendance response.
///
/// Ownership is NOT required; any authenticated user may RSVP. Idempotent
/// per user: an existing entry is updated in place, otherwise a new entry is
/// appended, so each user has at most one RSVP per event.
async fn rsvp_event(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(body): Json<RsvpRequest>,
) -> Result<Json<Event>, ApiError> {
    let mut event = load_event(&state, &id).await?;

    match event.rsvp_for_mut(&user.id) {
        Some(entry) => entry.status = body.status,
        None => event.rsvps.push(Rsvp {
            user: user.id.clone(),
            status: body.status,
        }),
    }

    state.events.replace_event(&event).await?;
    Ok(Json(event))
}

/// POST /events/{id}/checklist - owner-only append of an uncompleted item.
async fn add_checklist_item(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(body): Json<ChecklistRequest>,
) -> Result<Json<Event>, ApiError> {
    let mut event = load_event(&state, &id).await?;
    ensure_owner(&event, &user)?;

    event.checklist.push(ChecklistItem::new(body.item));
    state.events.replace_event(&event).await?;

    Ok(Json(event))
}

/// PUT /events/{id}/checklist/{item_id} - owner-only completion toggle.
///
/// 404 if either the event or the addressed checklist item is missing.
async fn toggle_checklist_item(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path((id, item_id)): Path<(String, String)>,
) -> Result<Json<Event>, ApiError> {
    let mut event = load_event(&state, &id).await?;
    ensure_owner(&event, &user)?;

    let item = event
        .checklist_item_mut(&item_id)
        .ok_or(ApiError::NotFound("checklist item"))?;
    item.completed = !item.completed;

    state.events.replace_event(&event).await?;
    Ok(Json(event))
}

/// POST /events/{id}/reminders - owner-only reminder storage.
///
/// Emits a notification-simulation log line; nothing is scheduled or
/// delivered.
async fn add_reminder(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(body): Json<ReminderRequest>,
) -> Result<Json<Event>, ApiError> {
    let mut event = load_event(&state, &id).await?;
    ensure_owner(&event, &user)?;

    let reminder = Reminder {
        time: body.time,
        message: body.message,
    };
    info!(
        event = %event.title,
        time = %reminder.time,
        message = %reminder.message,
        "Reminder set (simulation only, nothing will be delivered)"
    );

    event.reminders.push(reminder);
    state.events.replace_event(&event).await?;

    Ok(Json(event))
}

// ============================================================================
// GET /health - Health Check
// ============================================================================

/// Response body for health check endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Server status (always "ok" if responding).
    pub status: String,

    /// Server uptime in seconds.
    pub uptime_seconds: u64,
}

/// GET /health - health check endpoint. No authentication required.
async fn get_health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
    })
}

// ============================================================================
// Tests
// ============================================================================
