//! Scripted encounters and their HTTP routes.
//!
//! An encounter is one plot beat assigned to exactly one party. Rows are
//! created at setup, one per (party, beat) pairing, and then patched
//! throughout the event as staff mark beats complete and take notes. That
//! patching is the system's primary write workload.

use std::sync::Arc;

use axum::Router;
use axum::extract::{Path, State};
use axum::response::Json;
use axum::routing::{get, patch};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{ApiError, DataStore, ValidationError, validate};

///////////////////////////////////////////// Encounter ////////////////////////////////////////////////

/// One scripted plot beat belonging to a single party.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Encounter {
    /// Opaque server-generated identifier, immutable once assigned.
    pub id: String,
    /// Identifier of the owning party. Referential validity is a setup
    /// contract, not a database-enforced constraint.
    pub party_id: String,
    /// Display name of the beat.
    pub name: String,
    /// Scheduled time, freeform.
    pub time: Option<String>,
    /// Where the beat takes place.
    pub location: Option<String>,
    /// What the party is expected to do.
    pub activity: Option<String>,
    /// Prop or item involved, if any.
    pub item: Option<String>,
    /// Whether staff have marked this beat complete.
    pub completed: bool,
    /// Staff notes, empty by default.
    pub notes: String,
}

/// Validated input for creating an encounter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEncounter {
    /// Identifier of the owning party; must already exist (setup concern).
    pub party_id: String,
    /// Display name of the beat.
    pub name: String,
    /// Scheduled time, freeform.
    pub time: Option<String>,
    /// Where the beat takes place.
    pub location: Option<String>,
    /// What the party is expected to do.
    pub activity: Option<String>,
    /// Prop or item involved, if any.
    pub item: Option<String>,
    /// Completion flag; defaults to false when omitted.
    pub completed: Option<bool>,
    /// Staff notes; defaults to empty when omitted.
    pub notes: Option<String>,
}

impl CreateEncounter {
    /// Validates a candidate JSON object into creation input.
    pub fn validate(value: &Value) -> Result<CreateEncounter, ValidationError> {
        let obj = validate::as_object(value)?;
        Ok(CreateEncounter {
            party_id: validate::require_nonempty_string(obj, "partyId")?,
            name: validate::require_nonempty_string(obj, "name")?,
            time: validate::optional_string(obj, "time")?,
            location: validate::optional_string(obj, "location")?,
            activity: validate::optional_string(obj, "activity")?,
            item: validate::optional_string(obj, "item")?,
            completed: validate::optional_bool(obj, "completed")?,
            notes: validate::optional_string(obj, "notes")?,
        })
    }
}

/// Validated partial update for an encounter.
///
/// Only `completed` and `notes` are updatable; a field absent from the
/// payload (or explicitly null) is left untouched by the merge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEncounter {
    /// New completion flag, if present.
    pub completed: Option<bool>,
    /// New notes text, if present.
    pub notes: Option<String>,
}

impl UpdateEncounter {
    /// Validates a candidate JSON object into a partial update.
    pub fn validate(value: &Value) -> Result<UpdateEncounter, ValidationError> {
        let obj = validate::as_object(value)?;
        Ok(UpdateEncounter {
            completed: validate::optional_bool(obj, "completed")?,
            notes: validate::optional_string(obj, "notes")?,
        })
    }

    /// Merges this partial update over an existing record, overwriting only
    /// the fields present in the payload.
    pub fn apply_to(&self, encounter: &mut Encounter) {
        if let Some(completed) = self.completed {
            encounter.completed = completed;
        }
        if let Some(notes) = &self.notes {
            encounter.notes = notes.clone();
        }
    }
}

////////////////////////////////////////////// Routes //////////////////////////////////////////////////

async fn list_encounters(
    State(store): State<Arc<dyn DataStore>>,
) -> Result<Json<Vec<Encounter>>, ApiError> {
    let encounters = store.list_encounters().await?;
    Ok(Json(encounters))
}

async fn list_encounters_for_party(
    State(store): State<Arc<dyn DataStore>>,
    Path(party_id): Path<String>,
) -> Result<Json<Vec<Encounter>>, ApiError> {
    let encounters = store.list_encounters_for_party(&party_id).await?;
    Ok(Json(encounters))
}

async fn patch_encounter(
    State(store): State<Arc<dyn DataStore>>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<Encounter>, ApiError> {
    let update = UpdateEncounter::validate(&body)?;
    match store.update_encounter(&id, update).await? {
        Some(encounter) => Ok(Json(encounter)),
        None => Err(ApiError::not_found("Encounter not found")),
    }
}

/// Creates the HTTP router for encounter endpoints.
pub fn create_encounter_router(store: Arc<dyn DataStore>) -> Router {
    Router::new()
        .route("/encounters", get(list_encounters))
        .route("/encounters/party/:party_id", get(list_encounters_for_party))
        .route("/encounters/:id", patch(patch_encounter))
        .with_state(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CreateParty;
    use crate::test_utils::test_helpers::{seed_encounter, test_store};
    use axum_test::TestServer;
    use reqwest::StatusCode;
    use serde_json::json;

    #[test]
    fn create_defaults_are_not_part_of_validation() {
        let input = CreateEncounter::validate(&json!({
            "partyId": "party:abc",
            "name": "Kiko Truthspeaker",
            "item": "locus root",
        }))
        .unwrap();
        assert_eq!(input.completed, None);
        assert_eq!(input.notes, None);
        assert_eq!(input.item.as_deref(), Some("locus root"));
    }

    #[test]
    fn update_validates_only_present_keys() {
        let update = UpdateEncounter::validate(&json!({"completed": true})).unwrap();
        assert_eq!(update.completed, Some(true));
        assert_eq!(update.notes, None);

        // Wrong type for a present key fails like creation would.
        assert!(UpdateEncounter::validate(&json!({"completed": "yes"})).is_err());
        // Explicit null means "leave untouched", never "reset".
        let update = UpdateEncounter::validate(&json!({"notes": null})).unwrap();
        assert_eq!(update, UpdateEncounter::default());
    }

    #[test]
    fn apply_to_only_touches_present_fields() {
        let mut encounter = Encounter {
            id: "encounter:a".to_string(),
            party_id: "party:a".to_string(),
            name: "Kiko Truthspeaker".to_string(),
            time: Some("dusk".to_string()),
            location: None,
            activity: None,
            item: Some("locus root".to_string()),
            completed: false,
            notes: "pending".to_string(),
        };

        UpdateEncounter {
            completed: Some(true),
            notes: None,
        }
        .apply_to(&mut encounter);

        assert!(encounter.completed);
        assert_eq!(encounter.notes, "pending");
        assert_eq!(encounter.item.as_deref(), Some("locus root"));
    }

    #[tokio::test]
    async fn scenario_patch_completed_keeps_other_fields() {
        let store = test_store();
        let arden = store
            .create_party(CreateParty {
                name: "Arden".to_string(),
            })
            .await
            .unwrap();
        let encounter = seed_encounter(&store, &arden.id, "Kiko Truthspeaker", Some("locus root")).await;

        let server = TestServer::new(create_encounter_router(store.clone())).unwrap();

        let response = server
            .patch(&format!("/encounters/{}", encounter.id))
            .json(&json!({"completed": true}))
            .await;
        response.assert_status(StatusCode::OK);

        let response = server
            .get(&format!("/encounters/party/{}", arden.id))
            .await;
        response.assert_status(StatusCode::OK);
        let encounters: Vec<Encounter> = response.json();
        assert_eq!(encounters.len(), 1);
        assert!(encounters[0].completed);
        assert_eq!(encounters[0].item.as_deref(), Some("locus root"));
        assert_eq!(encounters[0].notes, "");
    }

    #[tokio::test]
    async fn patch_unknown_encounter_is_404() {
        let store = test_store();
        let server = TestServer::new(create_encounter_router(store)).unwrap();

        let response = server
            .patch("/encounters/does-not-exist")
            .json(&json!({"completed": true}))
            .await;
        response.assert_status(StatusCode::NOT_FOUND);
        let body: Value = response.json();
        assert_eq!(body, json!({"error": "Encounter not found"}));
    }

    #[tokio::test]
    async fn patch_invalid_body_is_400_and_writes_nothing() {
        let store = test_store();
        let arden = store
            .create_party(CreateParty {
                name: "Arden".to_string(),
            })
            .await
            .unwrap();
        let encounter = seed_encounter(&store, &arden.id, "Kiko Truthspeaker", None).await;

        let server = TestServer::new(create_encounter_router(store.clone())).unwrap();
        let response = server
            .patch(&format!("/encounters/{}", encounter.id))
            .json(&json!({"completed": "yes"}))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let unchanged = store.list_encounters().await.unwrap();
        assert_eq!(unchanged, vec![encounter]);
    }
}
