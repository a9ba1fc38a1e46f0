//! Issue operations for the PostgreSQL database.
//!
//! `priority` is stored as text and parsed back through `FromStr`; a value
//! outside the enum can only appear via out-of-band writes and surfaces as
//! a serialization error rather than a panic.

use std::str::FromStr;

use sqlx::postgres::PgRow;
use sqlx::{Postgres, Row, Transaction};

use super::SqlResult;
use crate::{CreateIssue, DataStoreError, Issue, IssuePriority, UpdateIssue};

const ISSUE_COLUMNS: &str =
    "id, party, job, type, priority, status, situation, timestamp, has_details";

fn row_to_issue(row: &PgRow) -> SqlResult<Issue> {
    let priority: String = row.try_get("priority")?;
    let priority = IssuePriority::from_str(&priority)
        .map_err(|e| DataStoreError::SerializationError(e.to_string()))?;
    Ok(Issue {
        id: row.try_get("id")?,
        party: row.try_get("party")?,
        job: row.try_get("job")?,
        kind: row.try_get("type")?,
        priority,
        status: row.try_get("status")?,
        situation: row.try_get("situation")?,
        timestamp: row.try_get("timestamp")?,
        has_details: row.try_get("has_details")?,
    })
}

/// Creates a new issue, stamping its timestamp server-side.
pub async fn create(
    tx: &mut Transaction<'_, Postgres>,
    id: &str,
    input: CreateIssue,
) -> SqlResult<Issue> {
    let result = sqlx::query(&format!(
        r#"
        INSERT INTO issues (id, party, job, type, priority, status, situation, timestamp, has_details)
        VALUES ($1, $2, $3, $4, $5, $6, $7, CURRENT_TIMESTAMP, $8)
        RETURNING {ISSUE_COLUMNS}
        "#,
    ))
    .bind(id)
    .bind(&input.party)
    .bind(&input.job)
    .bind(&input.kind)
    .bind(input.priority.to_string())
    .bind(&input.status)
    .bind(&input.situation)
    .bind(input.has_details.unwrap_or(false))
    .fetch_one(&mut **tx)
    .await;

    match result {
        Ok(row) => row_to_issue(&row),
        Err(e) => {
            eprintln!("Database error creating issue: {}", e);
            Err(DataStoreError::Internal(e.to_string()))
        }
    }
}

/// Lists all issues, newest first.
pub async fn list(tx: &mut Transaction<'_, Postgres>) -> SqlResult<Vec<Issue>> {
    let result = sqlx::query(&format!(
        r#"
        SELECT {ISSUE_COLUMNS}
        FROM issues
        ORDER BY timestamp DESC
        "#,
    ))
    .fetch_all(&mut **tx)
    .await;

    match result {
        Ok(rows) => rows.iter().map(row_to_issue).collect(),
        Err(e) => {
            eprintln!("Database error listing issues: {}", e);
            Err(DataStoreError::Internal(e.to_string()))
        }
    }
}

/// Merges a partial update over an issue; `Ok(None)` if the id is unknown.
/// The timestamp column is never part of the SET list.
pub async fn update(
    tx: &mut Transaction<'_, Postgres>,
    id: &str,
    update: UpdateIssue,
) -> SqlResult<Option<Issue>> {
    let result = sqlx::query(&format!(
        r#"
        UPDATE issues
        SET status = COALESCE($2, status),
            situation = COALESCE($3, situation),
            has_details = COALESCE($4, has_details)
        WHERE id = $1
        RETURNING {ISSUE_COLUMNS}
        "#,
    ))
    .bind(id)
    .bind(update.status)
    .bind(update.situation)
    .bind(update.has_details)
    .fetch_optional(&mut **tx)
    .await;

    match result {
        Ok(Some(row)) => Ok(Some(row_to_issue(&row)?)),
        Ok(None) => Ok(None),
        Err(e) => {
            eprintln!("Database error updating issue: {}", e);
            Err(DataStoreError::Internal(e.to_string()))
        }
    }
}
