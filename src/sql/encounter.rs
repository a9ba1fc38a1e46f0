//! Encounter operations for the PostgreSQL database.
//!
//! Partial updates are expressed with `COALESCE` so a field absent from the
//! payload keeps its stored value; the merge the in-memory store performs
//! with `apply_to` happens here inside the UPDATE statement itself.

use sqlx::postgres::PgRow;
use sqlx::{Postgres, Row, Transaction};

use super::SqlResult;
use crate::{CreateEncounter, DataStoreError, Encounter, UpdateEncounter};

const ENCOUNTER_COLUMNS: &str = "id, party_id, name, time, location, activity, item, completed, notes";

fn row_to_encounter(row: &PgRow) -> SqlResult<Encounter> {
    Ok(Encounter {
        id: row.try_get("id")?,
        party_id: row.try_get("party_id")?,
        name: row.try_get("name")?,
        time: row.try_get("time")?,
        location: row.try_get("location")?,
        activity: row.try_get("activity")?,
        item: row.try_get("item")?,
        completed: row.try_get("completed")?,
        notes: row.try_get("notes")?,
    })
}

/// Creates a new encounter, applying defaults for omitted optional fields.
pub async fn create(
    tx: &mut Transaction<'_, Postgres>,
    id: &str,
    input: CreateEncounter,
) -> SqlResult<Encounter> {
    let result = sqlx::query(&format!(
        r#"
        INSERT INTO encounters (id, party_id, name, time, location, activity, item, completed, notes)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING {ENCOUNTER_COLUMNS}
        "#,
    ))
    .bind(id)
    .bind(&input.party_id)
    .bind(&input.name)
    .bind(&input.time)
    .bind(&input.location)
    .bind(&input.activity)
    .bind(&input.item)
    .bind(input.completed.unwrap_or(false))
    .bind(input.notes.unwrap_or_default())
    .fetch_one(&mut **tx)
    .await;

    match result {
        Ok(row) => row_to_encounter(&row),
        Err(e) => {
            eprintln!("Database error creating encounter: {}", e);
            Err(DataStoreError::Internal(e.to_string()))
        }
    }
}

/// Lists all encounters.
pub async fn list(tx: &mut Transaction<'_, Postgres>) -> SqlResult<Vec<Encounter>> {
    let result = sqlx::query(&format!(
        r#"
        SELECT {ENCOUNTER_COLUMNS}
        FROM encounters
        "#,
    ))
    .fetch_all(&mut **tx)
    .await;

    match result {
        Ok(rows) => rows.iter().map(row_to_encounter).collect(),
        Err(e) => {
            eprintln!("Database error listing encounters: {}", e);
            Err(DataStoreError::Internal(e.to_string()))
        }
    }
}

/// Lists the encounters belonging to one party.
pub async fn list_for_party(
    tx: &mut Transaction<'_, Postgres>,
    party_id: &str,
) -> SqlResult<Vec<Encounter>> {
    let result = sqlx::query(&format!(
        r#"
        SELECT {ENCOUNTER_COLUMNS}
        FROM encounters
        WHERE party_id = $1
        "#,
    ))
    .bind(party_id)
    .fetch_all(&mut **tx)
    .await;

    match result {
        Ok(rows) => rows.iter().map(row_to_encounter).collect(),
        Err(e) => {
            eprintln!("Database error listing encounters for party: {}", e);
            Err(DataStoreError::Internal(e.to_string()))
        }
    }
}

/// Merges a partial update over an encounter.
///
/// # Returns
/// * `Ok(Some(Encounter))` - The updated record
/// * `Ok(None)` - No encounter with this id
/// * `Err(DataStoreError::Internal)` - Database error
pub async fn update(
    tx: &mut Transaction<'_, Postgres>,
    id: &str,
    update: UpdateEncounter,
) -> SqlResult<Option<Encounter>> {
    let result = sqlx::query(&format!(
        r#"
        UPDATE encounters
        SET completed = COALESCE($2, completed),
            notes = COALESCE($3, notes)
        WHERE id = $1
        RETURNING {ENCOUNTER_COLUMNS}
        "#,
    ))
    .bind(id)
    .bind(update.completed)
    .bind(update.notes)
    .fetch_optional(&mut **tx)
    .await;

    match result {
        Ok(Some(row)) => Ok(Some(row_to_encounter(&row)?)),
        Ok(None) => Ok(None),
        Err(e) => {
            eprintln!("Database error updating encounter: {}", e);
            Err(DataStoreError::Internal(e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_input(party_id: &str) -> CreateEncounter {
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

    #[tokio::test]
    #[ignore]
    async fn create_applies_defaults() {
        let pool = super::super::tests::setup_test_db().await;

        let mut tx = pool.begin().await.unwrap();
        let created = create(&mut tx, "encounter:t1", sample_input("party:a"))
            .await
            .unwrap();
        tx.commit().await.unwrap();

        assert!(!created.completed);
        assert_eq!(created.notes, "");
        assert_eq!(created.item.as_deref(), Some("locus root"));
        assert_eq!(created.location, None);
    }

    #[tokio::test]
    #[ignore]
    async fn update_merges_only_present_fields() {
        let pool = super::super::tests::setup_test_db().await;

        let mut tx = pool.begin().await.unwrap();
        let created = create(&mut tx, "encounter:t2", sample_input("party:a"))
            .await
            .unwrap();
        tx.commit().await.unwrap();

        let mut tx = pool.begin().await.unwrap();
        let updated = update(
            &mut tx,
            &created.id,
            UpdateEncounter {
                completed: Some(true),
                notes: None,
            },
        )
        .await
        .unwrap()
        .unwrap();
        tx.commit().await.unwrap();

        assert!(updated.completed);
        assert_eq!(updated.notes, created.notes);
        assert_eq!(updated.item, created.item);
    }

    #[tokio::test]
    #[ignore]
    async fn update_missing_id_is_none() {
        let pool = super::super::tests::setup_test_db().await;

        let mut tx = pool.begin().await.unwrap();
        let result = update(
            &mut tx,
            "encounter:missing",
            UpdateEncounter {
                completed: Some(true),
                notes: None,
            },
        )
        .await
        .unwrap();
        tx.commit().await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    #[ignore]
    async fn list_for_party_filters() {
        let pool = super::super::tests::setup_test_db().await;

        let mut tx = pool.begin().await.unwrap();
        create(&mut tx, "encounter:f1", sample_input("party:a"))
            .await
            .unwrap();
        create(&mut tx, "encounter:f2", sample_input("party:a"))
            .await
            .unwrap();
        create(&mut tx, "encounter:f3", sample_input("party:b"))
            .await
            .unwrap();
        tx.commit().await.unwrap();

        let mut tx = pool.begin().await.unwrap();
        let for_a = list_for_party(&mut tx, "party:a").await.unwrap();
        let for_c = list_for_party(&mut tx, "party:c").await.unwrap();
        tx.commit().await.unwrap();
        assert_eq!(for_a.len(), 2);
        assert!(for_c.is_empty());
    }
}
