//! # Data Storage Abstraction
//!
//! This module defines the storage contract every backing must satisfy and
//! provides the in-memory implementation. The HTTP layer and all other
//! callers depend only on the [`DataStore`] trait; which backing is active
//! is decided exactly once, at process startup, and never branched on at a
//! call site.
//!
//! ## Contract
//!
//! - `create` assigns a fresh id, applies declared defaults for omitted
//!   optional fields, stamps `timestamp` where the entity carries one, and
//!   returns the full stored record.
//! - `update` returns `Ok(None)` when the id does not exist (a sentinel,
//!   not an error) and otherwise merges only the fields present in the
//!   partial update over the existing record. `id` and `timestamp` never
//!   change.
//! - Issue and feedback listings are ordered newest-first; all other list
//!   operations have no mandated order.
//!
//! Both implementations ([`InMemoryDataStore`] here and
//! [`PgDataStore`](crate::sql::PgDataStore)) must produce identical
//! observable behavior for every operation, including ordering and
//! default-value handling.

use std::collections::HashMap;
use std::sync::Mutex;

use axum::async_trait;
use chrono::Utc;

use crate::{
    CombatCheckin, CombatEncounter, CreateCombatCheckin, CreateCombatEncounter, CreateEncounter,
    CreateFeedback, CreateIssue, CreateParty, DataStoreError, Encounter, Feedback, Issue, Party,
    UpdateCombatCheckin, UpdateEncounter, UpdateFeedback, UpdateIssue, ident,
};

/// The storage contract shared by every backing.
#[async_trait]
pub trait DataStore: Send + Sync {
    // Party operations

    /// Lists all parties, in no mandated order.
    async fn list_parties(&self) -> Result<Vec<Party>, DataStoreError>;
    /// Looks a party up by its unique name.
    async fn get_party_by_name(&self, name: &str) -> Result<Option<Party>, DataStoreError>;
    /// Creates a party. Fails with `AlreadyExists` on a duplicate name.
    async fn create_party(&self, input: CreateParty) -> Result<Party, DataStoreError>;

    // Encounter operations

    /// Lists all encounters.
    async fn list_encounters(&self) -> Result<Vec<Encounter>, DataStoreError>;
    /// Lists the encounters belonging to one party.
    async fn list_encounters_for_party(
        &self,
        party_id: &str,
    ) -> Result<Vec<Encounter>, DataStoreError>;
    /// Creates an encounter with defaults applied for omitted fields.
    async fn create_encounter(&self, input: CreateEncounter) -> Result<Encounter, DataStoreError>;
    /// Merges a partial update over an encounter; `Ok(None)` if the id is
    /// unknown.
    async fn update_encounter(
        &self,
        id: &str,
        update: UpdateEncounter,
    ) -> Result<Option<Encounter>, DataStoreError>;

    // Combat operations

    /// Lists all combat scenarios.
    async fn list_combat_encounters(&self) -> Result<Vec<CombatEncounter>, DataStoreError>;
    /// Creates a combat scenario.
    async fn create_combat_encounter(
        &self,
        input: CreateCombatEncounter,
    ) -> Result<CombatEncounter, DataStoreError>;
    /// Lists all checkins.
    async fn list_combat_checkins(&self) -> Result<Vec<CombatCheckin>, DataStoreError>;
    /// Lists the checkins recorded against one combat scenario.
    async fn list_combat_checkins_for_combat(
        &self,
        combat_id: &str,
    ) -> Result<Vec<CombatCheckin>, DataStoreError>;
    /// Creates a checkin with defaults applied for omitted fields.
    async fn create_combat_checkin(
        &self,
        input: CreateCombatCheckin,
    ) -> Result<CombatCheckin, DataStoreError>;
    /// Merges a partial update over a checkin; `Ok(None)` if the id is
    /// unknown.
    async fn update_combat_checkin(
        &self,
        id: &str,
        update: UpdateCombatCheckin,
    ) -> Result<Option<CombatCheckin>, DataStoreError>;

    // Issue operations

    /// Lists all issues, newest first.
    async fn list_issues(&self) -> Result<Vec<Issue>, DataStoreError>;
    /// Creates an issue, stamping its creation timestamp.
    async fn create_issue(&self, input: CreateIssue) -> Result<Issue, DataStoreError>;
    /// Merges a partial update over an issue; `Ok(None)` if the id is
    /// unknown. Never alters the timestamp.
    async fn update_issue(
        &self,
        id: &str,
        update: UpdateIssue,
    ) -> Result<Option<Issue>, DataStoreError>;

    // Feedback operations

    /// Lists all feedback, newest first.
    async fn list_feedback(&self) -> Result<Vec<Feedback>, DataStoreError>;
    /// Creates a feedback record in status New, stamping its timestamp.
    async fn create_feedback(&self, input: CreateFeedback) -> Result<Feedback, DataStoreError>;
    /// Updates the review status of a feedback record; `Ok(None)` if the id
    /// is unknown.
    async fn update_feedback(
        &self,
        id: &str,
        update: UpdateFeedback,
    ) -> Result<Option<Feedback>, DataStoreError>;
}

fn generate_id(prefix: &str) -> Result<String, DataStoreError> {
    ident::generate(prefix).map_err(|e| DataStoreError::Internal(e.to_string()))
}

/// Thread-safe in-memory implementation of the [`DataStore`] trait.
///
/// All collections live in `Mutex<HashMap>`s keyed by id. Data is lost on
/// restart, which is acceptable for development and testing; the Postgres
/// backing covers durable deployments.
pub struct InMemoryDataStore {
    parties: Mutex<HashMap<String, Party>>,
    encounters: Mutex<HashMap<String, Encounter>>,
    combat_encounters: Mutex<HashMap<String, CombatEncounter>>,
    combat_checkins: Mutex<HashMap<String, CombatCheckin>>,
    issues: Mutex<HashMap<String, Issue>>,
    feedback: Mutex<HashMap<String, Feedback>>,
}

impl InMemoryDataStore {
    /// Creates a new empty in-memory data store.
    pub fn new() -> Self {
        Self {
            parties: Mutex::new(HashMap::new()),
            encounters: Mutex::new(HashMap::new()),
            combat_encounters: Mutex::new(HashMap::new()),
            combat_checkins: Mutex::new(HashMap::new()),
            issues: Mutex::new(HashMap::new()),
            feedback: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryDataStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DataStore for InMemoryDataStore {
    async fn list_parties(&self) -> Result<Vec<Party>, DataStoreError> {
        let parties = self.parties.lock().unwrap();
        Ok(parties.values().cloned().collect())
    }

    async fn get_party_by_name(&self, name: &str) -> Result<Option<Party>, DataStoreError> {
        let parties = self.parties.lock().unwrap();
        Ok(parties.values().find(|p| p.name == name).cloned())
    }

    async fn create_party(&self, input: CreateParty) -> Result<Party, DataStoreError> {
        let mut parties = self.parties.lock().unwrap();
        if parties.values().any(|p| p.name == input.name) {
            return Err(DataStoreError::AlreadyExists);
        }
        let party = Party {
            id: generate_id("party")?,
            name: input.name,
        };
        parties.insert(party.id.clone(), party.clone());
        Ok(party)
    }

    async fn list_encounters(&self) -> Result<Vec<Encounter>, DataStoreError> {
        let encounters = self.encounters.lock().unwrap();
        Ok(encounters.values().cloned().collect())
    }

    async fn list_encounters_for_party(
        &self,
        party_id: &str,
    ) -> Result<Vec<Encounter>, DataStoreError> {
        let encounters = self.encounters.lock().unwrap();
        Ok(encounters
            .values()
            .filter(|e| e.party_id == party_id)
            .cloned()
            .collect())
    }

    async fn create_encounter(&self, input: CreateEncounter) -> Result<Encounter, DataStoreError> {
        let encounter = Encounter {
            id: generate_id("encounter")?,
            party_id: input.party_id,
            name: input.name,
            time: input.time,
            location: input.location,
            activity: input.activity,
            item: input.item,
            completed: input.completed.unwrap_or(false),
            notes: input.notes.unwrap_or_default(),
        };
        let mut encounters = self.encounters.lock().unwrap();
        encounters.insert(encounter.id.clone(), encounter.clone());
        Ok(encounter)
    }

    async fn update_encounter(
        &self,
        id: &str,
        update: UpdateEncounter,
    ) -> Result<Option<Encounter>, DataStoreError> {
        let mut encounters = self.encounters.lock().unwrap();
        match encounters.get_mut(id) {
            Some(encounter) => {
                update.apply_to(encounter);
                Ok(Some(encounter.clone()))
            }
            None => Ok(None),
        }
    }

    async fn list_combat_encounters(&self) -> Result<Vec<CombatEncounter>, DataStoreError> {
        let combats = self.combat_encounters.lock().unwrap();
        Ok(combats.values().cloned().collect())
    }

    async fn create_combat_encounter(
        &self,
        input: CreateCombatEncounter,
    ) -> Result<CombatEncounter, DataStoreError> {
        let combat = CombatEncounter {
            id: generate_id("combat")?,
            name: input.name,
            kind: input.kind,
        };
        let mut combats = self.combat_encounters.lock().unwrap();
        combats.insert(combat.id.clone(), combat.clone());
        Ok(combat)
    }

    async fn list_combat_checkins(&self) -> Result<Vec<CombatCheckin>, DataStoreError> {
        let checkins = self.combat_checkins.lock().unwrap();
        Ok(checkins.values().cloned().collect())
    }

    async fn list_combat_checkins_for_combat(
        &self,
        combat_id: &str,
    ) -> Result<Vec<CombatCheckin>, DataStoreError> {
        let checkins = self.combat_checkins.lock().unwrap();
        Ok(checkins
            .values()
            .filter(|c| c.combat_id == combat_id)
            .cloned()
            .collect())
    }

    async fn create_combat_checkin(
        &self,
        input: CreateCombatCheckin,
    ) -> Result<CombatCheckin, DataStoreError> {
        let checkin = CombatCheckin {
            id: generate_id("checkin")?,
            combat_id: input.combat_id,
            party_id: input.party_id,
            encountered: input.encountered.unwrap_or(false),
            notes: input.notes.unwrap_or_default(),
        };
        let mut checkins = self.combat_checkins.lock().unwrap();
        checkins.insert(checkin.id.clone(), checkin.clone());
        Ok(checkin)
    }

    async fn update_combat_checkin(
        &self,
        id: &str,
        update: UpdateCombatCheckin,
    ) -> Result<Option<CombatCheckin>, DataStoreError> {
        let mut checkins = self.combat_checkins.lock().unwrap();
        match checkins.get_mut(id) {
            Some(checkin) => {
                update.apply_to(checkin);
                Ok(Some(checkin.clone()))
            }
            None => Ok(None),
        }
    }

    async fn list_issues(&self) -> Result<Vec<Issue>, DataStoreError> {
        let issues = self.issues.lock().unwrap();
        let mut issues: Vec<Issue> = issues.values().cloned().collect();
        issues.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(issues)
    }

    async fn create_issue(&self, input: CreateIssue) -> Result<Issue, DataStoreError> {
        let issue = Issue {
            id: generate_id("issue")?,
            party: input.party,
            job: input.job,
            kind: input.kind,
            priority: input.priority,
            status: input.status,
            situation: input.situation,
            timestamp: Utc::now(),
            has_details: input.has_details.unwrap_or(false),
        };
        let mut issues = self.issues.lock().unwrap();
        issues.insert(issue.id.clone(), issue.clone());
        Ok(issue)
    }

    async fn update_issue(
        &self,
        id: &str,
        update: UpdateIssue,
    ) -> Result<Option<Issue>, DataStoreError> {
        let mut issues = self.issues.lock().unwrap();
        match issues.get_mut(id) {
            Some(issue) => {
                update.apply_to(issue);
                Ok(Some(issue.clone()))
            }
            None => Ok(None),
        }
    }

    async fn list_feedback(&self) -> Result<Vec<Feedback>, DataStoreError> {
        let feedback = self.feedback.lock().unwrap();
        let mut feedback: Vec<Feedback> = feedback.values().cloned().collect();
        feedback.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(feedback)
    }

    async fn create_feedback(&self, input: CreateFeedback) -> Result<Feedback, DataStoreError> {
        let feedback = Feedback {
            id: generate_id("feedback")?,
            name: input.name,
            feature: input.feature,
            comments: input.comments,
            status: Default::default(),
            timestamp: Utc::now(),
        };
        let mut records = self.feedback.lock().unwrap();
        records.insert(feedback.id.clone(), feedback.clone());
        Ok(feedback)
    }

    async fn update_feedback(
        &self,
        id: &str,
        update: UpdateFeedback,
    ) -> Result<Option<Feedback>, DataStoreError> {
        let mut records = self.feedback.lock().unwrap();
        match records.get_mut(id) {
            Some(feedback) => {
                update.apply_to(feedback);
                Ok(Some(feedback.clone()))
            }
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FeedbackStatus, IssuePriority};

    fn sample_encounter(party_id: &str) -> CreateEncounter {
        CreateEncounter {
            party_id: party_id.to_string(),
            name: "Kiko Truthspeaker".to_string(),
            time: Some("dusk".to_string()),
            location: None,
            activity: None,
            item: Some("locus root".to_string()),
            completed: None,
            notes: None,
        }
    }

    fn sample_issue(party: &str) -> CreateIssue {
        CreateIssue {
            party: party.to_string(),
            job: "Marshal".to_string(),
            kind: "Medical".to_string(),
            priority: IssuePriority::Low,
            status: "Monitoring".to_string(),
            situation: "scraped knee".to_string(),
            has_details: None,
        }
    }

    #[tokio::test]
    async fn party_create_enforces_unique_name() {
        let store = InMemoryDataStore::new();
        store
            .create_party(CreateParty {
                name: "Arden".to_string(),
            })
            .await
            .unwrap();
        let result = store
            .create_party(CreateParty {
                name: "Arden".to_string(),
            })
            .await;
        assert_eq!(result, Err(DataStoreError::AlreadyExists));
    }

    #[tokio::test]
    async fn encounter_create_applies_defaults() {
        let store = InMemoryDataStore::new();
        let encounter = store.create_encounter(sample_encounter("party:a")).await.unwrap();
        assert!(!encounter.completed);
        assert_eq!(encounter.notes, "");
        assert!(encounter.id.starts_with("encounter:"));
    }

    #[tokio::test]
    async fn partial_update_preserves_unmentioned_fields() {
        let store = InMemoryDataStore::new();
        let created = store.create_encounter(sample_encounter("party:a")).await.unwrap();

        let updated = store
            .update_encounter(
                &created.id,
                UpdateEncounter {
                    completed: Some(true),
                    notes: None,
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert!(updated.completed);
        assert_eq!(updated.notes, created.notes);
        assert_eq!(updated.item, created.item);
        assert_eq!(updated.time, created.time);
    }

    #[tokio::test]
    async fn update_missing_id_is_a_sentinel_and_writes_nothing() {
        let store = InMemoryDataStore::new();
        let created = store.create_encounter(sample_encounter("party:a")).await.unwrap();

        let result = store
            .update_encounter(
                "encounter:missing",
                UpdateEncounter {
                    completed: Some(true),
                    notes: Some("ghost write".to_string()),
                },
            )
            .await
            .unwrap();
        assert!(result.is_none());

        let all = store.list_encounters().await.unwrap();
        assert_eq!(all, vec![created]);
    }

    #[tokio::test]
    async fn encounters_filtered_by_party() {
        let store = InMemoryDataStore::new();
        store.create_encounter(sample_encounter("party:a")).await.unwrap();
        store.create_encounter(sample_encounter("party:a")).await.unwrap();
        store.create_encounter(sample_encounter("party:b")).await.unwrap();

        assert_eq!(
            store.list_encounters_for_party("party:a").await.unwrap().len(),
            2
        );
        assert_eq!(
            store.list_encounters_for_party("party:b").await.unwrap().len(),
            1
        );
        assert!(
            store
                .list_encounters_for_party("party:c")
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn issue_timestamp_survives_update() {
        let store = InMemoryDataStore::new();
        let created = store.create_issue(sample_issue("Arden")).await.unwrap();

        tokio::time::sleep(tokio::time::Duration::from_millis(2)).await;

        let updated = store
            .update_issue(
                &created.id,
                UpdateIssue {
                    status: Some("Resolved".to_string()),
                    situation: None,
                    has_details: None,
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.timestamp, created.timestamp);
        assert_eq!(updated.status, "Resolved");
        assert_eq!(updated.situation, created.situation);
    }

    #[tokio::test]
    async fn feedback_defaults_and_ordering() {
        let store = InMemoryDataStore::new();
        for name in ["a", "b", "c"] {
            let feedback = store
                .create_feedback(CreateFeedback {
                    name: name.to_string(),
                    feature: "Dashboard".to_string(),
                    comments: "c".to_string(),
                })
                .await
                .unwrap();
            assert_eq!(feedback.status, FeedbackStatus::New);
            tokio::time::sleep(tokio::time::Duration::from_millis(2)).await;
        }

        let all = store.list_feedback().await.unwrap();
        let names: Vec<&str> = all.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["c", "b", "a"]);
    }

    #[tokio::test]
    async fn checkin_update_is_last_write_wins_per_field() {
        let store = InMemoryDataStore::new();
        let checkin = store
            .create_combat_checkin(CreateCombatCheckin {
                combat_id: "combat:a".to_string(),
                party_id: "party:a".to_string(),
                encountered: None,
                notes: None,
            })
            .await
            .unwrap();

        store
            .update_combat_checkin(
                &checkin.id,
                UpdateCombatCheckin {
                    encountered: Some(true),
                    notes: None,
                },
            )
            .await
            .unwrap();
        let updated = store
            .update_combat_checkin(
                &checkin.id,
                UpdateCombatCheckin {
                    encountered: None,
                    notes: Some("ran twice".to_string()),
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert!(updated.encountered);
        assert_eq!(updated.notes, "ran twice");
    }
}
