//! PostgreSQL database operations for questboard.
//!
//! This module provides functions for interacting with the PostgreSQL
//! database, organized by data type, plus [`PgDataStore`], the durable
//! implementation of the [`DataStore`](crate::DataStore) trait. Each trait
//! method opens a transaction, performs its statements, and commits; the
//! free functions in the submodules operate on a caller-supplied
//! transaction so they compose.
//!
//! Queries are built at runtime with `sqlx::query` and mapped by hand, so
//! the crate compiles without a reachable database.

use axum::async_trait;
use sqlx::PgPool;

use crate::{
    CombatCheckin, CombatEncounter, CreateCombatCheckin, CreateCombatEncounter, CreateEncounter,
    CreateFeedback, CreateIssue, CreateParty, DataStore, DataStoreError, Encounter, Feedback,
    Issue, Party, UpdateCombatCheckin, UpdateEncounter, UpdateFeedback, UpdateIssue, ident,
};

/// Party operations.
pub mod party;

/// Encounter operations.
pub mod encounter;

/// Combat encounter and checkin operations.
pub mod combat;

/// Issue operations.
pub mod issue;

/// Feedback operations.
pub mod feedback;

/// Result type for database operations.
pub type SqlResult<T> = Result<T, DataStoreError>;

fn generate_id(prefix: &str) -> SqlResult<String> {
    ident::generate(prefix).map_err(|e| DataStoreError::Internal(e.to_string()))
}

/// Durable [`DataStore`] backed by PostgreSQL.
pub struct PgDataStore {
    pool: PgPool,
}

impl PgDataStore {
    /// Wraps an already-connected pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DataStore for PgDataStore {
    async fn list_parties(&self) -> Result<Vec<Party>, DataStoreError> {
        let mut tx = self.pool.begin().await?;
        let parties = party::list(&mut tx).await?;
        tx.commit().await?;
        Ok(parties)
    }

    async fn get_party_by_name(&self, name: &str) -> Result<Option<Party>, DataStoreError> {
        let mut tx = self.pool.begin().await?;
        let party = party::get_by_name(&mut tx, name).await?;
        tx.commit().await?;
        Ok(party)
    }

    async fn create_party(&self, input: CreateParty) -> Result<Party, DataStoreError> {
        let id = generate_id("party")?;
        let mut tx = self.pool.begin().await?;
        let party = party::create(&mut tx, &id, input).await?;
        tx.commit().await?;
        Ok(party)
    }

    async fn list_encounters(&self) -> Result<Vec<Encounter>, DataStoreError> {
        let mut tx = self.pool.begin().await?;
        let encounters = encounter::list(&mut tx).await?;
        tx.commit().await?;
        Ok(encounters)
    }

    async fn list_encounters_for_party(
        &self,
        party_id: &str,
    ) -> Result<Vec<Encounter>, DataStoreError> {
        let mut tx = self.pool.begin().await?;
        let encounters = encounter::list_for_party(&mut tx, party_id).await?;
        tx.commit().await?;
        Ok(encounters)
    }

    async fn create_encounter(&self, input: CreateEncounter) -> Result<Encounter, DataStoreError> {
        let id = generate_id("encounter")?;
        let mut tx = self.pool.begin().await?;
        let encounter = encounter::create(&mut tx, &id, input).await?;
        tx.commit().await?;
        Ok(encounter)
    }

    async fn update_encounter(
        &self,
        id: &str,
        update: UpdateEncounter,
    ) -> Result<Option<Encounter>, DataStoreError> {
        let mut tx = self.pool.begin().await?;
        let encounter = encounter::update(&mut tx, id, update).await?;
        tx.commit().await?;
        Ok(encounter)
    }

    async fn list_combat_encounters(&self) -> Result<Vec<CombatEncounter>, DataStoreError> {
        let mut tx = self.pool.begin().await?;
        let combats = combat::list_combat_encounters(&mut tx).await?;
        tx.commit().await?;
        Ok(combats)
    }

    async fn create_combat_encounter(
        &self,
        input: CreateCombatEncounter,
    ) -> Result<CombatEncounter, DataStoreError> {
        let id = generate_id("combat")?;
        let mut tx = self.pool.begin().await?;
        let combat = combat::create_combat_encounter(&mut tx, &id, input).await?;
        tx.commit().await?;
        Ok(combat)
    }

    async fn list_combat_checkins(&self) -> Result<Vec<CombatCheckin>, DataStoreError> {
        let mut tx = self.pool.begin().await?;
        let checkins = combat::list_combat_checkins(&mut tx).await?;
        tx.commit().await?;
        Ok(checkins)
    }

    async fn list_combat_checkins_for_combat(
        &self,
        combat_id: &str,
    ) -> Result<Vec<CombatCheckin>, DataStoreError> {
        let mut tx = self.pool.begin().await?;
        let checkins = combat::list_combat_checkins_for_combat(&mut tx, combat_id).await?;
        tx.commit().await?;
        Ok(checkins)
    }

    async fn create_combat_checkin(
        &self,
        input: CreateCombatCheckin,
    ) -> Result<CombatCheckin, DataStoreError> {
        let id = generate_id("checkin")?;
        let mut tx = self.pool.begin().await?;
        let checkin = combat::create_combat_checkin(&mut tx, &id, input).await?;
        tx.commit().await?;
        Ok(checkin)
    }

    async fn update_combat_checkin(
        &self,
        id: &str,
        update: UpdateCombatCheckin,
    ) -> Result<Option<CombatCheckin>, DataStoreError> {
        let mut tx = self.pool.begin().await?;
        let checkin = combat::update_combat_checkin(&mut tx, id, update).await?;
        tx.commit().await?;
        Ok(checkin)
    }

    async fn list_issues(&self) -> Result<Vec<Issue>, DataStoreError> {
        let mut tx = self.pool.begin().await?;
        let issues = issue::list(&mut tx).await?;
        tx.commit().await?;
        Ok(issues)
    }

    async fn create_issue(&self, input: CreateIssue) -> Result<Issue, DataStoreError> {
        let id = generate_id("issue")?;
        let mut tx = self.pool.begin().await?;
        let issue = issue::create(&mut tx, &id, input).await?;
        tx.commit().await?;
        Ok(issue)
    }

    async fn update_issue(
        &self,
        id: &str,
        update: UpdateIssue,
    ) -> Result<Option<Issue>, DataStoreError> {
        let mut tx = self.pool.begin().await?;
        let issue = issue::update(&mut tx, id, update).await?;
        tx.commit().await?;
        Ok(issue)
    }

    async fn list_feedback(&self) -> Result<Vec<Feedback>, DataStoreError> {
        let mut tx = self.pool.begin().await?;
        let feedback = feedback::list(&mut tx).await?;
        tx.commit().await?;
        Ok(feedback)
    }

    async fn create_feedback(&self, input: CreateFeedback) -> Result<Feedback, DataStoreError> {
        let id = generate_id("feedback")?;
        let mut tx = self.pool.begin().await?;
        let feedback = feedback::create(&mut tx, &id, input).await?;
        tx.commit().await?;
        Ok(feedback)
    }

    async fn update_feedback(
        &self,
        id: &str,
        update: UpdateFeedback,
    ) -> Result<Option<Feedback>, DataStoreError> {
        let mut tx = self.pool.begin().await?;
        let feedback = feedback::update(&mut tx, id, update).await?;
        tx.commit().await?;
        Ok(feedback)
    }
}
