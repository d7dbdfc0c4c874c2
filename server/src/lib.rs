//! Gatherly Server - Event planning REST backend.
//!
//! This crate provides the Gatherly HTTP API, responsible for:
//! - User signup/login with signed, time-limited bearer tokens
//! - Event CRUD with owner-only mutation
//! - RSVP tracking, checklist items, and stored reminders
//!
//! # Architecture
//!
//! Requests flow client -> auth gate (protected routes) -> route handlers ->
//! user/event store. Persistence sits behind the [`store`] traits: MongoDB
//! in production, an in-memory store for dev mode and tests. Reminders are
//! stored and logged; nothing delivers them.

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;
pub mod store;
pub mod types;
