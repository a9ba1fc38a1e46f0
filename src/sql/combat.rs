//! Combat encounter and checkin operations for the PostgreSQL database.

use sqlx::postgres::PgRow;
use sqlx::{Postgres, Row, Transaction};

use super::SqlResult;
use crate::{
    CombatCheckin, CombatEncounter, CreateCombatCheckin, CreateCombatEncounter, DataStoreError,
    UpdateCombatCheckin,
};

fn row_to_combat_encounter(row: &PgRow) -> SqlResult<CombatEncounter> {
    Ok(CombatEncounter {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        kind: row.try_get("type")?,
    })
}

fn row_to_combat_checkin(row: &PgRow) -> SqlResult<CombatCheckin> {
    Ok(CombatCheckin {
        id: row.try_get("id")?,
        combat_id: row.try_get("combat_id")?,
        party_id: row.try_get("party_id")?,
        encountered: row.try_get("encountered")?,
        notes: row.try_get("notes")?,
    })
}

/// Creates a new combat scenario.
pub async fn create_combat_encounter(
    tx: &mut Transaction<'_, Postgres>,
    id: &str,
    input: CreateCombatEncounter,
) -> SqlResult<CombatEncounter> {
    let result = sqlx::query(
        r#"
        INSERT INTO combat_encounters (id, name, type)
        VALUES ($1, $2, $3)
        RETURNING id, name, type
        "#,
    )
    .bind(id)
    .bind(&input.name)
    .bind(&input.kind)
    .fetch_one(&mut **tx)
    .await;

    match result {
        Ok(row) => row_to_combat_encounter(&row),
        Err(e) => {
            eprintln!("Database error creating combat encounter: {}", e);
            Err(DataStoreError::Internal(e.to_string()))
        }
    }
}

/// Lists all combat scenarios.
pub async fn list_combat_encounters(
    tx: &mut Transaction<'_, Postgres>,
) -> SqlResult<Vec<CombatEncounter>> {
    let result = sqlx::query(
        r#"
        SELECT id, name, type
        FROM combat_encounters
        "#,
    )
    .fetch_all(&mut **tx)
    .await;

    match result {
        Ok(rows) => rows.iter().map(row_to_combat_encounter).collect(),
        Err(e) => {
            eprintln!("Database error listing combat encounters: {}", e);
            Err(DataStoreError::Internal(e.to_string()))
        }
    }
}

/// Creates a new checkin, applying defaults for omitted optional fields.
pub async fn create_combat_checkin(
    tx: &mut Transaction<'_, Postgres>,
    id: &str,
    input: CreateCombatCheckin,
) -> SqlResult<CombatCheckin> {
    let result = sqlx::query(
        r#"
        INSERT INTO combat_checkins (id, combat_id, party_id, encountered, notes)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, combat_id, party_id, encountered, notes
        "#,
    )
    .bind(id)
    .bind(&input.combat_id)
    .bind(&input.party_id)
    .bind(input.encountered.unwrap_or(false))
    .bind(input.notes.unwrap_or_default())
    .fetch_one(&mut **tx)
    .await;

    match result {
        Ok(row) => row_to_combat_checkin(&row),
        Err(e) => {
            eprintln!("Database error creating combat checkin: {}", e);
            Err(DataStoreError::Internal(e.to_string()))
        }
    }
}

/// Lists all checkins.
pub async fn list_combat_checkins(
    tx: &mut Transaction<'_, Postgres>,
) -> SqlResult<Vec<CombatCheckin>> {
    let result = sqlx::query(
        r#"
        SELECT id, combat_id, party_id, encountered, notes
        FROM combat_checkins
        "#,
    )
    .fetch_all(&mut **tx)
    .await;

    match result {
        Ok(rows) => rows.iter().map(row_to_combat_checkin).collect(),
        Err(e) => {
            eprintln!("Database error listing combat checkins: {}", e);
            Err(DataStoreError::Internal(e.to_string()))
        }
    }
}

/// Lists the checkins recorded against one combat scenario.
pub async fn list_combat_checkins_for_combat(
    tx: &mut Transaction<'_, Postgres>,
    combat_id: &str,
) -> SqlResult<Vec<CombatCheckin>> {
    let result = sqlx::query(
        r#"
        SELECT id, combat_id, party_id, encountered, notes
        FROM combat_checkins
        WHERE combat_id = $1
        "#,
    )
    .bind(combat_id)
    .fetch_all(&mut **tx)
    .await;

    match result {
        Ok(rows) => rows.iter().map(row_to_combat_checkin).collect(),
        Err(e) => {
            eprintln!("Database error listing combat checkins for combat: {}", e);
            Err(DataStoreError::Internal(e.to_string()))
        }
    }
}

/// Merges a partial update over a checkin; `Ok(None)` if the id is unknown.
pub async fn update_combat_checkin(
    tx: &mut Transaction<'_, Postgres>,
    id: &str,
    update: UpdateCombatCheckin,
) -> SqlResult<Option<CombatCheckin>> {
    let result = sqlx::query(
        r#"
        UPDATE combat_checkins
        SET encountered = COALESCE($2, encountered),
            notes = COALESCE($3, notes)
        WHERE id = $1
        RETURNING id, combat_id, party_id, encountered, notes
        "#,
    )
    .bind(id)
    .bind(update.encountered)
    .bind(update.notes)
    .fetch_optional(&mut **tx)
    .await;

    match result {
        Ok(Some(row)) => Ok(Some(row_to_combat_checkin(&row)?)),
        Ok(None) => Ok(None),
        Err(e) => {
            eprintln!("Database error updating combat checkin: {}", e);
            Err(DataStoreError::Internal(e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_checkin(combat_id: &str, party_id: &str) -> CreateCombatCheckin {
        CreateCombatCheckin {
            combat_id: combat_id.to_string(),
            party_id: party_id.to_string(),
            encountered: None,
            notes: None,
        }
    }

    #[tokio::test]
    #[ignore]
    async fn combat_encounter_round_trip() {
        let pool = super::super::tests::setup_test_db().await;

        let mut tx = pool.begin().await.unwrap();
        let created = create_combat_encounter(
            &mut tx,
            "combat:t1",
            CreateCombatEncounter {
                name: "Bandit ambush".to_string(),
                kind: "Ambush".to_string(),
            },
        )
        .await
        .unwrap();
        tx.commit().await.unwrap();

        let mut tx = pool.begin().await.unwrap();
        let all = list_combat_encounters(&mut tx).await.unwrap();
        tx.commit().await.unwrap();
        assert_eq!(all, vec![created]);
    }

    #[tokio::test]
    #[ignore]
    async fn checkin_defaults_and_filtering() {
        let pool = super::super::tests::setup_test_db().await;

        let mut tx = pool.begin().await.unwrap();
        let created = create_combat_checkin(&mut tx, "checkin:t1", sample_checkin("combat:a", "party:a"))
            .await
            .unwrap();
        create_combat_checkin(&mut tx, "checkin:t2", sample_checkin("combat:b", "party:a"))
            .await
            .unwrap();
        tx.commit().await.unwrap();

        assert!(!created.encountered);
        assert_eq!(created.notes, "");

        let mut tx = pool.begin().await.unwrap();
        let for_a = list_combat_checkins_for_combat(&mut tx, "combat:a").await.unwrap();
        tx.commit().await.unwrap();
        assert_eq!(for_a, vec![created]);
    }

    #[tokio::test]
    #[ignore]
    async fn checkin_update_merges() {
        let pool = super::super::tests::setup_test_db().await;

        let mut tx = pool.begin().await.unwrap();
        let created = create_combat_checkin(&mut tx, "checkin:t3", sample_checkin("combat:a", "party:a"))
            .await
            .unwrap();
        tx.commit().await.unwrap();

        let mut tx = pool.begin().await.unwrap();
        let updated = update_combat_checkin(
            &mut tx,
            &created.id,
            UpdateCombatCheckin {
                encountered: Some(true),
                notes: None,
            },
        )
        .await
        .unwrap()
        .unwrap();
        tx.commit().await.unwrap();

        assert!(updated.encountered);
        assert_eq!(updated.notes, "");

        let mut tx = pool.begin().await.unwrap();
        let missing = update_combat_checkin(
            &mut tx,
            "checkin:missing",
            UpdateCombatCheckin::default(),
        )
        .await
        .unwrap();
        tx.commit().await.unwrap();
        assert!(missing.is_none());
    }
}
