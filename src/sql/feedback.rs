//! Feedback operations for the PostgreSQL database.

use std::str::FromStr;

use sqlx::postgres::PgRow;
use sqlx::{Postgres, Row, Transaction};

use super::SqlResult;
use crate::{CreateFeedback, DataStoreError, Feedback, FeedbackStatus, UpdateFeedback};

const FEEDBACK_COLUMNS: &str = "id, name, feature, comments, status, timestamp";

fn row_to_feedback(row: &PgRow) -> SqlResult<Feedback> {
    let status: String = row.try_get("status")?;
    let status = FeedbackStatus::from_str(&status)
        .map_err(|e| DataStoreError::SerializationError(e.to_string()))?;
    Ok(Feedback {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        feature: row.try_get("feature")?,
        comments: row.try_get("comments")?,
        status,
        timestamp: row.try_get("timestamp")?,
    })
}

/// Creates a new feedback record in status New, stamping its timestamp
/// server-side.
pub async fn create(
    tx: &mut Transaction<'_, Postgres>,
    id: &str,
    input: CreateFeedback,
) -> SqlResult<Feedback> {
    let result = sqlx::query(&format!(
        r#"
        INSERT INTO feedback (id, name, feature, comments, status, timestamp)
        VALUES ($1, $2, $3, $4, $5, CURRENT_TIMESTAMP)
        RETURNING {FEEDBACK_COLUMNS}
        "#,
    ))
    .bind(id)
    .bind(&input.name)
    .bind(&input.feature)
    .bind(&input.comments)
    .bind(FeedbackStatus::New.to_string())
    .fetch_one(&mut **tx)
    .await;

    match result {
        Ok(row) => row_to_feedback(&row),
        Err(e) => {
            eprintln!("Database error creating feedback: {}", e);
            Err(DataStoreError::Internal(e.to_string()))
        }
    }
}

/// Lists all feedback, newest first.
pub async fn list(tx: &mut Transaction<'_, Postgres>) -> SqlResult<Vec<Feedback>> {
    let result = sqlx::query(&format!(
        r#"
        SELECT {FEEDBACK_COLUMNS}
        FROM feedback
        ORDER BY timestamp DESC
        "#,
    ))
    .fetch_all(&mut **tx)
    .await;

    match result {
        Ok(rows) => rows.iter().map(row_to_feedback).collect(),
        Err(e) => {
            eprintln!("Database error listing feedback: {}", e);
            Err(DataStoreError::Internal(e.to_string()))
        }
    }
}

/// Updates the review status of a feedback record; `Ok(None)` if the id is
/// unknown.
pub async fn update(
    tx: &mut Transaction<'_, Postgres>,
    id: &str,
    update: UpdateFeedback,
) -> SqlResult<Option<Feedback>> {
    let result = sqlx::query(&format!(
        r#"
        UPDATE feedback
        SET status = $2
        WHERE id = $1
        RETURNING {FEEDBACK_COLUMNS}
        "#,
    ))
    .bind(id)
    .bind(update.status.to_string())
    .fetch_optional(&mut **tx)
    .await;

    match result {
        Ok(Some(row)) => Ok(Some(row_to_feedback(&row)?)),
        Ok(None) => Ok(None),
        Err(e) => {
            eprintln!("Database error updating feedback: {}", e);
            Err(DataStoreError::Internal(e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_feedback(name: &str) -> CreateFeedback {
        CreateFeedback {
            name: name.to_string(),
            feature: "Dashboard".to_string(),
            comments: "Looks great".to_string(),
        }
    }

    #[tokio::test]
    #[ignore]
    async fn create_starts_in_new() {
        let pool = super::super::tests::setup_test_db().await;

        let mut tx = pool.begin().await.unwrap();
        let created = create(&mut tx, "feedback:t1", sample_feedback("Rob"))
            .await
            .unwrap();
        tx.commit().await.unwrap();

        assert_eq!(created.status, FeedbackStatus::New);
        assert_eq!(created.comments, "Looks great");
    }

    #[tokio::test]
    #[ignore]
    async fn update_moves_status_and_preserves_timestamp() {
        let pool = super::super::tests::setup_test_db().await;

        let mut tx = pool.begin().await.unwrap();
        let created = create(&mut tx, "feedback:t2", sample_feedback("Rob"))
            .await
            .unwrap();
        tx.commit().await.unwrap();

        let mut tx = pool.begin().await.unwrap();
        let updated = update(
            &mut tx,
            &created.id,
            UpdateFeedback {
                status: FeedbackStatus::Accepted,
            },
        )
        .await
        .unwrap()
        .unwrap();
        tx.commit().await.unwrap();

        assert_eq!(updated.status, FeedbackStatus::Accepted);
        assert_eq!(updated.timestamp, created.timestamp);

        let mut tx = pool.begin().await.unwrap();
        let missing = update(
            &mut tx,
            "feedback:missing",
            UpdateFeedback {
                status: FeedbackStatus::Reviewed,
            },
        )
        .await
        .unwrap();
        tx.commit().await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    #[ignore]
    async fn list_is_newest_first() {
        let pool = super::super::tests::setup_test_db().await;

        for (id, name) in [("feedback:o1", "a"), ("feedback:o2", "b"), ("feedback:o3", "c")] {
            let mut tx = pool.begin().await.unwrap();
            create(&mut tx, id, sample_feedback(name)).await.unwrap();
            tx.commit().await.unwrap();
            tokio::time::sleep(tokio::time::Duration::from_millis(10)).await;
        }

        let mut tx = pool.begin().await.unwrap();
        let all = list(&mut tx).await.unwrap();
        tx.commit().await.unwrap();
        let names: Vec<&str> = all.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["c", "b", "a"]);
    }
}
