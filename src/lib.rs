//! # Questboard: Event Tracking for Live Games
//!
//! Questboard is the staff-side tracking service for a live event built
//! around adventuring parties. Before the event, organizers load the
//! roster: the parties, each party's scripted encounters, the roaming
//! combat scenarios, and one checkin row per (combat, party) pair. During
//! the event, staff work against that data in real time: marking
//! encounters complete, recording which parties ran into which combats,
//! logging issues as they come up, and collecting stakeholder feedback.
//!
//! The crate provides:
//!
//! - **Validated domain records**: every write passes through a
//!   field-by-field validator that names the offending field, so a typo'd
//!   payload is rejected before it reaches storage
//! - **Swappable storage**: a single [`DataStore`] trait with an in-memory
//!   implementation for development and tests and a PostgreSQL
//!   implementation for durable deployments
//! - **HTTP API**: RESTful endpoints under `/api` with a uniform
//!   `{"error": ...}` error body
//! - **Cached client**: a reqwest-based client whose reads are memoized by
//!   path and invalidated by prefix when a mutation lands
//! - **Derived aggregates**: pure functions folding fetched records into
//!   per-party dashboard numbers
//!
//! ## Core Concepts
//!
//! ### Identifiers
//! Every record gets an opaque id at creation: a resource prefix plus
//! URL-safe base64 over 16 random bytes, e.g.
//! `party:3q2-7wAAAAAAAAAAAAAAAA`. Ids are immutable and never carry
//! meaning beyond uniqueness.
//!
//! ### Partial updates
//! PATCH payloads mention only the fields they change. A field that is
//! absent, or explicitly null, leaves the stored value untouched; there is
//! no way to reset a field through a patch. Creation timestamps survive
//! every update.
//!
//! ### Ordering
//! Issues and feedback list newest-first, the order staff triage them in.
//! Other listings have no mandated order.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │ HTTP API Layer (Axum routes)            │
//! ├─────────────────────────────────────────┤
//! │ Validation (field-naming errors)        │
//! ├─────────────────────────────────────────┤
//! │ Data Store (trait-based abstraction)    │
//! ├─────────────────────────────────────────┤
//! │ In-memory maps  │  PostgreSQL (sqlx)    │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage Examples
//!
//! ### Storage operations
//!
//! ```rust
//! # use questboard::{CreateParty, CreateEncounter, DataStore, InMemoryDataStore};
//! # async fn example() -> Result<(), questboard::DataStoreError> {
//! let store = InMemoryDataStore::new();
//!
//! let party = store.create_party(CreateParty { name: "Arden".to_string() }).await?;
//! let encounter = store
//!     .create_encounter(CreateEncounter {
//!         party_id: party.id.clone(),
//!         name: "Kiko Truthspeaker".to_string(),
//!         time: None,
//!         location: None,
//!         activity: None,
//!         item: Some("locus root".to_string()),
//!         completed: None,
//!         notes: None,
//!     })
//!     .await?;
//! assert!(!encounter.completed);
//! # Ok(())
//! # }
//! ```
//!
//! ### Serving the API
//!
//! ```rust,no_run
//! # use questboard::{InMemoryDataStore, create_api_router};
//! # use std::sync::Arc;
//! # async fn example() {
//! let store = Arc::new(InMemoryDataStore::new());
//! let app = create_api_router(store);
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await.unwrap();
//! axum::serve(listener, app).await.unwrap();
//! # }
//! ```

#![deny(missing_docs)]
mod combat;
mod data_store;
mod encounter;
mod errors;
mod feedback;
mod issue;
mod party;
mod router;
mod test_utils;

/// Derived per-party aggregates computed client-side from fetched records.
pub mod dashboard;

/// Opaque prefixed identifier generation.
pub mod ident;

/// Field-level JSON validation helpers shared by the domain types.
pub mod validate;

/// PostgreSQL operations and the durable data store implementation.
pub mod sql;

// CLI utility modules

/// Command-line interface utilities for program termination and output formatting.
pub mod cli_utils;

/// Command-line interface command handlers for the questctl application.
pub mod commands;

/// HTTP client utilities for interacting with questboard services.
pub mod http_utils;

pub use combat::{
    CombatCheckin, CombatEncounter, CreateCombatCheckin, CreateCombatEncounter,
    UpdateCombatCheckin, create_combat_router,
};
pub use data_store::{DataStore, InMemoryDataStore};
pub use encounter::{CreateEncounter, Encounter, UpdateEncounter, create_encounter_router};
pub use errors::{ApiError, DataStoreError};
pub use feedback::{
    CreateFeedback, FEEDBACK_STATUSES, Feedback, FeedbackStatus, FeedbackStatusParseError,
    UpdateFeedback, create_feedback_router,
};
pub use issue::{
    CreateIssue, ISSUE_PRIORITIES, Issue, IssuePriority, IssuePriorityParseError, UpdateIssue,
    create_issue_router,
};
pub use party::{CreateParty, Party, create_party_router};
pub use router::create_api_router;
pub use validate::ValidationError;
