//! Party records and their HTTP routes.
//!
//! A party is one play group tracked independently through the event. Parties
//! are created during setup (via the storage layer) and are read-only over
//! HTTP: the API exposes listing and lookup by name, nothing else.

use std::sync::Arc;

use axum::Router;
use axum::extract::{Path, State};
use axum::response::Json;
use axum::routing::get;
use serde::{Deserialize, Serialize};

use crate::{ApiError, DataStore, ValidationError, validate};

/////////////////////////////////////////////// Party //////////////////////////////////////////////////

/// One play group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Party {
    /// Opaque server-generated identifier, immutable once assigned.
    pub id: String,
    /// Unique, non-empty display name.
    pub name: String,
}

/// Validated input for creating a party.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateParty {
    /// Unique, non-empty display name.
    pub name: String,
}

impl CreateParty {
    /// Validates a candidate JSON object into creation input.
    pub fn validate(value: &serde_json::Value) -> Result<CreateParty, ValidationError> {
        let obj = validate::as_object(value)?;
        Ok(CreateParty {
            name: validate::require_nonempty_string(obj, "name")?,
        })
    }
}

////////////////////////////////////////////// Routes //////////////////////////////////////////////////

async fn list_parties(
    State(store): State<Arc<dyn DataStore>>,
) -> Result<Json<Vec<Party>>, ApiError> {
    let parties = store.list_parties().await?;
    Ok(Json(parties))
}

async fn get_party_by_name(
    State(store): State<Arc<dyn DataStore>>,
    Path(name): Path<String>,
) -> Result<Json<Party>, ApiError> {
    match store.get_party_by_name(&name).await? {
        Some(party) => Ok(Json(party)),
        None => Err(ApiError::not_found("Party not found")),
    }
}

/// Creates the HTTP router for party endpoints.
pub fn create_party_router(store: Arc<dyn DataStore>) -> Router {
    Router::new()
        .route("/parties", get(list_parties))
        .route("/parties/:name", get(get_party_by_name))
        .with_state(store)
}
