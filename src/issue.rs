//! Participant issues and their HTTP routes.
//!
//! An issue is a logged incident (medical, operational, or an opportunity)
//! tied to a party by name. Issues are created ad hoc during the event and
//! subsequently patched as their status evolves. The listing order is
//! newest-first, which is the order staff triage them in.

use std::sync::Arc;
use std::str::FromStr;

use axum::Router;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{get, patch};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{ApiError, DataStore, ValidationError, validate};

//////////////////////////////////////////// IssuePriority /////////////////////////////////////////////

/// Priority of an issue. The persisted schema admits exactly these two
/// values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IssuePriority {
    /// Routine; handle when convenient.
    Low,
    /// Needs prompt staff attention.
    High,
}

/// The spellings accepted for [`IssuePriority`] on the wire.
pub const ISSUE_PRIORITIES: &[&str] = &["Low", "High"];

impl std::fmt::Display for IssuePriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "Low"),
            Self::High => write!(f, "High"),
        }
    }
}

/// Error returned when parsing an unrecognized priority value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuePriorityParseError(String);

impl std::fmt::Display for IssuePriorityParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Invalid issue priority {:?}; allowed values: Low, High", self.0)
    }
}

impl std::error::Error for IssuePriorityParseError {}

impl FromStr for IssuePriority {
    type Err = IssuePriorityParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Low" => Ok(IssuePriority::Low),
            "High" => Ok(IssuePriority::High),
            other => Err(IssuePriorityParseError(other.to_string())),
        }
    }
}

/////////////////////////////////////////////// Issue //////////////////////////////////////////////////

/// One logged incident.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    /// Opaque server-generated identifier, immutable once assigned.
    pub id: String,
    /// Party name this issue concerns. The source schema stores the name,
    /// not a party id.
    pub party: String,
    /// Staff role or job the issue relates to.
    pub job: String,
    /// Category, e.g. "Medical", "Opportunity!", "General".
    #[serde(rename = "type")]
    pub kind: String,
    /// Low or High.
    pub priority: IssuePriority,
    /// Freeform status text. The UI suggests Monitoring, Fixing, Hopefully
    /// fixed as a soft convention; the schema does not enforce it.
    pub status: String,
    /// Free-text description of the situation.
    pub situation: String,
    /// Creation time, server-assigned and never altered by updates.
    pub timestamp: DateTime<Utc>,
    /// Whether a detail record exists elsewhere for this issue.
    pub has_details: bool,
}

/// Validated input for creating an issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateIssue {
    /// Party name this issue concerns.
    pub party: String,
    /// Staff role or job the issue relates to.
    pub job: String,
    /// Category string.
    #[serde(rename = "type")]
    pub kind: String,
    /// Low or High.
    pub priority: IssuePriority,
    /// Freeform status text.
    pub status: String,
    /// Free-text description of the situation.
    pub situation: String,
    /// Detail flag; defaults to false when omitted.
    pub has_details: Option<bool>,
}

impl CreateIssue {
    /// Validates a candidate JSON object into creation input.
    pub fn validate(value: &Value) -> Result<CreateIssue, ValidationError> {
        let obj = validate::as_object(value)?;
        Ok(CreateIssue {
            party: validate::require_nonempty_string(obj, "party")?,
            job: validate::require_string(obj, "job")?,
            kind: validate::require_string(obj, "type")?,
            priority: validate::require_enum(obj, "priority", ISSUE_PRIORITIES)?,
            status: validate::require_string(obj, "status")?,
            situation: validate::require_string(obj, "situation")?,
            has_details: validate::optional_bool(obj, "hasDetails")?,
        })
    }
}

/// Validated partial update for an issue. Only `status`, `situation`, and
/// `hasDetails` are updatable; `timestamp` and identity fields never change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateIssue {
    /// New status text, if present.
    pub status: Option<String>,
    /// New situation text, if present.
    pub situation: Option<String>,
    /// New detail flag, if present.
    pub has_details: Option<bool>,
}

impl UpdateIssue {
    /// Validates a candidate JSON object into a partial update.
    pub fn validate(value: &Value) -> Result<UpdateIssue, ValidationError> {
        let obj = validate::as_object(value)?;
        Ok(UpdateIssue {
            status: validate::optional_string(obj, "status")?,
            situation: validate::optional_string(obj, "situation")?,
            has_details: validate::optional_bool(obj, "hasDetails")?,
        })
    }

    /// Merges this partial update over an existing record, overwriting only
    /// the fields present in the payload.
    pub fn apply_to(&self, issue: &mut Issue) {
        if let Some(status) = &self.status {
            issue.status = status.clone();
        }
        if let Some(situation) = &self.situation {
            issue.situation = situation.clone();
        }
        if let Some(has_details) = self.has_details {
            issue.has_details = has_details;
        }
    }
}

////////////////////////////////////////////// Routes //////////////////////////////////////////////////

async fn list_issues(
    State(store): State<Arc<dyn DataStore>>,
) -> Result<Json<Vec<Issue>>, ApiError> {
    let issues = store.list_issues().await?;
    Ok(Json(issues))
}

async fn create_issue(
    State(store): State<Arc<dyn DataStore>>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Issue>), ApiError> {
    let input = CreateIssue::validate(&body)?;
    let issue = store.create_issue(input).await?;
    Ok((StatusCode::CREATED, Json(issue)))
}

async fn patch_issue(
    State(store): State<Arc<dyn DataStore>>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<Issue>, ApiError> {
    let update = UpdateIssue::validate(&body)?;
    match store.update_issue(&id, update).await? {
        Some(issue) => Ok(Json(issue)),
        None => Err(ApiError::not_found("Issue not found")),
    }
}

/// Creates the HTTP router for issue endpoints.
pub fn create_issue_router(store: Arc<dyn DataStore>) -> Router {
    Router::new()
        .route("/issues", get(list_issues).post(create_issue))
        .route("/issues/:id", patch(patch_issue))
        .with_state(store)
}
