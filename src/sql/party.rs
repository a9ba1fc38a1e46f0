//! Party operations for the PostgreSQL database.

use sqlx::postgres::PgRow;
use sqlx::{Postgres, Row, Transaction};

use super::SqlResult;
use crate::{CreateParty, DataStoreError, Party};

fn row_to_party(row: &PgRow) -> SqlResult<Party> {
    Ok(Party {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
    })
}

/// Creates a new party.
///
/// # Returns
/// * `Ok(Party)` - The stored record
/// * `Err(DataStoreError::AlreadyExists)` - A party with this name exists
/// * `Err(DataStoreError::Internal)` - Database error
pub async fn create(
    tx: &mut Transaction<'_, Postgres>,
    id: &str,
    input: CreateParty,
) -> SqlResult<Party> {
    let result = sqlx::query(
        r#"
        INSERT INTO parties (id, name)
        VALUES ($1, $2)
        RETURNING id, name
        "#,
    )
    .bind(id)
    .bind(&input.name)
    .fetch_one(&mut **tx)
    .await;

    match result {
        Ok(row) => row_to_party(&row),
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
            Err(DataStoreError::AlreadyExists)
        }
        Err(e) => {
            eprintln!("Database error creating party: {}", e);
            Err(DataStoreError::Internal(e.to_string()))
        }
    }
}

/// Looks a party up by its unique name.
pub async fn get_by_name(
    tx: &mut Transaction<'_, Postgres>,
    name: &str,
) -> SqlResult<Option<Party>> {
    let result = sqlx::query(
        r#"
        SELECT id, name
        FROM parties
        WHERE name = $1
        "#,
    )
    .bind(name)
    .fetch_optional(&mut **tx)
    .await;

    match result {
        Ok(Some(row)) => Ok(Some(row_to_party(&row)?)),
        Ok(None) => Ok(None),
        Err(e) => {
            eprintln!("Database error getting party by name: {}", e);
            Err(DataStoreError::Internal(e.to_string()))
        }
    }
}

/// Lists all parties.
pub async fn list(tx: &mut Transaction<'_, Postgres>) -> SqlResult<Vec<Party>> {
    let result = sqlx::query(
        r#"
        SELECT id, name
        FROM parties
        ORDER BY name ASC
        "#,
    )
    .fetch_all(&mut **tx)
    .await;

    match result {
        Ok(rows) => rows.iter().map(row_to_party).collect(),
        Err(e) => {
            eprintln!("Database error listing parties: {}", e);
            Err(DataStoreError::Internal(e.to_string()))
        }
    }
}
