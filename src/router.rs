use std::sync::Arc;

use axum::Router;

use crate::{
    DataStore, combat::create_combat_router, encounter::create_encounter_router,
    feedback::create_feedback_router, issue::create_issue_router, party::create_party_router,
};

/// Assembles the full HTTP API, every resource router nested under `/api`.
pub fn create_api_router(store: Arc<dyn DataStore>) -> Router {
    let api = Router::new()
        .merge(create_party_router(store.clone()))
        .merge(create_encounter_router(store.clone()))
        .merge(create_combat_router(store.clone()))
        .merge(create_issue_router(store.clone()))
        .merge(create_feedback_router(store));
    Router::new().nest("/api", api)
}
