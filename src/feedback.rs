//! Stakeholder feedback records and their HTTP routes.
//!
//! Feedback is commentary on a feature area of the application itself,
//! collected from stakeholders during the event. A record starts in status
//! New and can move to any of the other review states in any order; no
//! transition ordering is enforced.

use std::str::FromStr;
use std::sync::Arc;

use axum::Router;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{get, patch};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{ApiError, DataStore, ValidationError, validate};

/////////////////////////////////////////// FeedbackStatus /////////////////////////////////////////////

/// Review state of a feedback record. Closed enum; any transition between
/// states is permitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeedbackStatus {
    /// Not yet looked at. Assigned at creation.
    #[default]
    New,
    /// Seen by the team, no decision yet.
    Reviewed,
    /// Will be acted on.
    Accepted,
    /// Will not be acted on.
    Rejected,
}

/// The spellings accepted for [`FeedbackStatus`] on the wire.
pub const FEEDBACK_STATUSES: &[&str] = &["New", "Reviewed", "Accepted", "Rejected"];

impl std::fmt::Display for FeedbackStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::New => write!(f, "New"),
            Self::Reviewed => write!(f, "Reviewed"),
            Self::Accepted => write!(f, "Accepted"),
            Self::Rejected => write!(f, "Rejected"),
        }
    }
}

/// Error returned when parsing an unrecognized feedback status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackStatusParseError(String);

impl std::fmt::Display for FeedbackStatusParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Invalid feedback status {:?}; allowed values: New, Reviewed, Accepted, Rejected",
            self.0
        )
    }
}

impl std::error::Error for FeedbackStatusParseError {}

impl FromStr for FeedbackStatus {
    type Err = FeedbackStatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "New" => Ok(FeedbackStatus::New),
            "Reviewed" => Ok(FeedbackStatus::Reviewed),
            "Accepted" => Ok(FeedbackStatus::Accepted),
            "Rejected" => Ok(FeedbackStatus::Rejected),
            other => Err(FeedbackStatusParseError(other.to_string())),
        }
    }
}

///////////////////////////////////////////// Feedback /////////////////////////////////////////////////

/// One stakeholder feedback record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    /// Opaque server-generated identifier, immutable once assigned.
    pub id: String,
    /// Who gave the feedback.
    pub name: String,
    /// Which area of the application it concerns.
    pub feature: String,
    /// Free-text commentary.
    pub comments: String,
    /// Review state; New at creation.
    pub status: FeedbackStatus,
    /// Creation time, server-assigned and never altered by updates.
    pub timestamp: DateTime<Utc>,
}

/// Validated input for creating a feedback record. `status` and `timestamp`
/// are server-assigned and not accepted from the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFeedback {
    /// Who gave the feedback.
    pub name: String,
    /// Which area of the application it concerns.
    pub feature: String,
    /// Free-text commentary.
    pub comments: String,
}

impl CreateFeedback {
    /// Validates a candidate JSON object into creation input.
    pub fn validate(value: &Value) -> Result<CreateFeedback, ValidationError> {
        let obj = validate::as_object(value)?;
        Ok(CreateFeedback {
            name: validate::require_nonempty_string(obj, "name")?,
            feature: validate::require_string(obj, "feature")?,
            comments: validate::require_string(obj, "comments")?,
        })
    }
}

/// Validated update for a feedback record: the status is the only mutable
/// field, and it must be present in the payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFeedback {
    /// The new review state.
    pub status: FeedbackStatus,
}

impl UpdateFeedback {
    /// Validates a candidate JSON object into an update.
    pub fn validate(value: &Value) -> Result<UpdateFeedback, ValidationError> {
        let obj = validate::as_object(value)?;
        Ok(UpdateFeedback {
            status: validate::require_enum(obj, "status", FEEDBACK_STATUSES)?,
        })
    }

    /// Applies the update, leaving every other field untouched.
    pub fn apply_to(&self, feedback: &mut Feedback) {
        feedback.status = self.status;
    }
}

////////////////////////////////////////////// Routes //////////////////////////////////////////////////

async fn list_feedback(
    State(store): State<Arc<dyn DataStore>>,
) -> Result<Json<Vec<Feedback>>, ApiError> {
    let feedback = store.list_feedback().await?;
    Ok(Json(feedback))
}

async fn create_feedback(
    State(store): State<Arc<dyn DataStore>>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Feedback>), ApiError> {
    let input = CreateFeedback::validate(&body)?;
    let feedback = store.create_feedback(input).await?;
    Ok((StatusCode::CREATED, Json(feedback)))
}

async fn patch_feedback(
    State(store): State<Arc<dyn DataStore>>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<Feedback>, ApiError> {
    let update = UpdateFeedback::validate(&body)?;
    match store.update_feedback(&id, update).await? {
        Some(feedback) => Ok(Json(feedback)),
        None => Err(ApiError::not_found("Feedback not found")),
    }
}

/// Creates the HTTP router for feedback endpoints.
pub fn create_feedback_router(store: Arc<dyn DataStore>) -> Router {
    Router::new()
        .route("/feedback", get(list_feedback).post(create_feedback))
        .route("/feedback/:id", patch(patch_feedback))
        .with_state(store)
}
