//! Roaming combat encounters, per-party checkins, and their HTTP routes.
//!
//! A combat encounter is a roaming scenario not owned by any single party.
//! Whether a given party ran into it is recorded in a checkin row, one per
//! (combat, party) pair, created at setup and patched during the event.

use std::sync::Arc;

use axum::Router;
use axum::extract::{Path, State};
use axum::response::Json;
use axum::routing::get;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{ApiError, DataStore, ValidationError, validate};

////////////////////////////////////////// CombatEncounter /////////////////////////////////////////////

/// One roaming combat scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombatEncounter {
    /// Opaque server-generated identifier, immutable once assigned.
    pub id: String,
    /// Display name of the scenario.
    pub name: String,
    /// Freeform category, e.g. "Ambush" or "Siege".
    #[serde(rename = "type")]
    pub kind: String,
}

/// Validated input for creating a combat encounter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCombatEncounter {
    /// Display name of the scenario.
    pub name: String,
    /// Freeform category.
    #[serde(rename = "type")]
    pub kind: String,
}

impl CreateCombatEncounter {
    /// Validates a candidate JSON object into creation input.
    pub fn validate(value: &Value) -> Result<CreateCombatEncounter, ValidationError> {
        let obj = validate::as_object(value)?;
        Ok(CreateCombatEncounter {
            name: validate::require_nonempty_string(obj, "name")?,
            kind: validate::require_string(obj, "type")?,
        })
    }
}

/////////////////////////////////////////// CombatCheckin //////////////////////////////////////////////

/// The record of whether one party experienced one combat scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombatCheckin {
    /// Opaque server-generated identifier, immutable once assigned.
    pub id: String,
    /// Identifier of the combat scenario. Referential validity is a setup
    /// contract, not a database-enforced constraint.
    pub combat_id: String,
    /// Identifier of the party.
    pub party_id: String,
    /// Whether the party encountered this combat.
    pub encountered: bool,
    /// Staff notes, empty by default.
    pub notes: String,
}

/// Validated input for creating a combat checkin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCombatCheckin {
    /// Identifier of the combat scenario; must already exist (setup concern).
    pub combat_id: String,
    /// Identifier of the party; must already exist (setup concern).
    pub party_id: String,
    /// Encountered flag; defaults to false when omitted.
    pub encountered: Option<bool>,
    /// Staff notes; defaults to empty when omitted.
    pub notes: Option<String>,
}

impl CreateCombatCheckin {
    /// Validates a candidate JSON object into creation input.
    pub fn validate(value: &Value) -> Result<CreateCombatCheckin, ValidationError> {
        let obj = validate::as_object(value)?;
        Ok(CreateCombatCheckin {
            combat_id: validate::require_nonempty_string(obj, "combatId")?,
            party_id: validate::require_nonempty_string(obj, "partyId")?,
            encountered: validate::optional_bool(obj, "encountered")?,
            notes: validate::optional_string(obj, "notes")?,
        })
    }
}

/// Validated partial update for a combat checkin.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCombatCheckin {
    /// New encountered flag, if present.
    pub encountered: Option<bool>,
    /// New notes text, if present.
    pub notes: Option<String>,
}

impl UpdateCombatCheckin {
    /// Validates a candidate JSON object into a partial update.
    pub fn validate(value: &Value) -> Result<UpdateCombatCheckin, ValidationError> {
        let obj = validate::as_object(value)?;
        Ok(UpdateCombatCheckin {
            encountered: validate::optional_bool(obj, "encountered")?,
            notes: validate::optional_string(obj, "notes")?,
        })
    }

    /// Merges this partial update over an existing record, overwriting only
    /// the fields present in the payload.
    pub fn apply_to(&self, checkin: &mut CombatCheckin) {
        if let Some(encountered) = self.encountered {
            checkin.encountered = encountered;
        }
        if let Some(notes) = &self.notes {
            checkin.notes = notes.clone();
        }
    }
}

////////////////////////////////////////////// Routes //////////////////////////////////////////////////

async fn list_combat_encounters(
    State(store): State<Arc<dyn DataStore>>,
) -> Result<Json<Vec<CombatEncounter>>, ApiError> {
    let combats = store.list_combat_encounters().await?;
    Ok(Json(combats))
}

async fn list_combat_checkins(
    State(store): State<Arc<dyn DataStore>>,
) -> Result<Json<Vec<CombatCheckin>>, ApiError> {
    let checkins = store.list_combat_checkins().await?;
    Ok(Json(checkins))
}

async fn list_combat_checkins_for_combat(
    State(store): State<Arc<dyn DataStore>>,
    Path(combat_id): Path<String>,
) -> Result<Json<Vec<CombatCheckin>>, ApiError> {
    let checkins = store.list_combat_checkins_for_combat(&combat_id).await?;
    Ok(Json(checkins))
}

async fn patch_combat_checkin(
    State(store): State<Arc<dyn DataStore>>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<CombatCheckin>, ApiError> {
    let update = UpdateCombatCheckin::validate(&body)?;
    match store.update_combat_checkin(&id, update).await? {
        Some(checkin) => Ok(Json(checkin)),
        None => Err(ApiError::not_found("Combat checkin not found")),
    }
}

/// Creates the HTTP router for combat encounter and checkin endpoints.
///
/// GET `/combat-checkins/:id` lists the checkins for one combat scenario
/// while PATCH on the same template updates a single checkin; the method
/// decides how the path parameter is read.
pub fn create_combat_router(store: Arc<dyn DataStore>) -> Router {
    Router::new()
        .route("/combat-encounters", get(list_combat_encounters))
        .route("/combat-checkins", get(list_combat_checkins))
        .route(
            "/combat-checkins/:id",
            get(list_combat_checkins_for_combat).patch(patch_combat_checkin),
        )
        .with_state(store)
}
