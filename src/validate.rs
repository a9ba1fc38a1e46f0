//! Request body validation.
//!
//! This module provides the building blocks for the schema layer: small
//! field accessors over a JSON object that either produce a typed value or
//! fail with a [`ValidationError`] naming the offending field. Each entity
//! module composes these into a creation validator (required fields plus
//! declared defaults) and an update validator (only the keys present are
//! checked; absent keys are left untouched by the storage layer).
//!
//! A field that is present but explicitly `null` is treated exactly like an
//! absent field. This guards against a client wiping a field it never
//! intended to touch by serializing an unset optional as `null`.
//!
//! Validation here is purely shape/type/enum checking. Cross-record rules
//! (such as whether a referenced party exists) are a setup concern and are
//! deliberately not enforced at this layer.

use serde_json::{Map, Value};

/// Errors produced when a request body fails schema validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The body was not a JSON object.
    NotAnObject,
    /// A required field was absent (or explicitly null).
    MissingField {
        /// Name of the absent field.
        field: String,
    },
    /// A field held a value of the wrong primitive type.
    TypeMismatch {
        /// Name of the offending field.
        field: String,
        /// The JSON type the schema expects.
        expected: &'static str,
    },
    /// A string field that must not be empty was empty.
    EmptyField {
        /// Name of the offending field.
        field: String,
    },
    /// An enum field held a value outside its allowed set.
    InvalidEnumValue {
        /// Name of the offending field.
        field: String,
        /// The value that was rejected.
        value: String,
        /// The allowed values, for the error message.
        allowed: &'static [&'static str],
    },
}

impl ValidationError {
    /// Convenience constructor for a missing required field.
    pub fn missing_field(field: impl Into<String>) -> Self {
        ValidationError::MissingField {
            field: field.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotAnObject => write!(f, "Request body must be a JSON object"),
            Self::MissingField { field } => write!(f, "Missing required field: {}", field),
            Self::TypeMismatch { field, expected } => {
                write!(f, "Field {} must be a {}", field, expected)
            }
            Self::EmptyField { field } => write!(f, "Field {} must not be empty", field),
            Self::InvalidEnumValue {
                field,
                value,
                allowed,
            } => write!(
                f,
                "Field {} has invalid value {:?}; allowed values: {}",
                field,
                value,
                allowed.join(", ")
            ),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Views the body as a JSON object or fails.
pub fn as_object(value: &Value) -> Result<&Map<String, Value>, ValidationError> {
    value.as_object().ok_or(ValidationError::NotAnObject)
}

/// Extracts a required string field.
pub fn require_string(obj: &Map<String, Value>, field: &str) -> Result<String, ValidationError> {
    match obj.get(field) {
        None | Some(Value::Null) => Err(ValidationError::missing_field(field)),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(ValidationError::TypeMismatch {
            field: field.to_string(),
            expected: "string",
        }),
    }
}

/// Extracts a required, non-empty string field.
pub fn require_nonempty_string(
    obj: &Map<String, Value>,
    field: &str,
) -> Result<String, ValidationError> {
    let s = require_string(obj, field)?;
    if s.is_empty() {
        return Err(ValidationError::EmptyField {
            field: field.to_string(),
        });
    }
    Ok(s)
}

/// Extracts an optional string field. Absent and `null` both yield `None`.
pub fn optional_string(
    obj: &Map<String, Value>,
    field: &str,
) -> Result<Option<String>, ValidationError> {
    match obj.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(ValidationError::TypeMismatch {
            field: field.to_string(),
            expected: "string",
        }),
    }
}

/// Extracts an optional boolean field. Absent and `null` both yield `None`.
pub fn optional_bool(
    obj: &Map<String, Value>,
    field: &str,
) -> Result<Option<bool>, ValidationError> {
    match obj.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(_) => Err(ValidationError::TypeMismatch {
            field: field.to_string(),
            expected: "boolean",
        }),
    }
}

/// Extracts a required enum field, parsed through `FromStr`.
///
/// `allowed` lists the legal spellings and is used both for the membership
/// check and the error message, so it must match the type's `FromStr`.
pub fn require_enum<T: std::str::FromStr>(
    obj: &Map<String, Value>,
    field: &str,
    allowed: &'static [&'static str],
) -> Result<T, ValidationError> {
    let s = require_string(obj, field)?;
    parse_enum(&s, field, allowed)
}

/// Extracts an optional enum field. Absent and `null` both yield `None`.
pub fn optional_enum<T: std::str::FromStr>(
    obj: &Map<String, Value>,
    field: &str,
    allowed: &'static [&'static str],
) -> Result<Option<T>, ValidationError> {
    match optional_string(obj, field)? {
        None => Ok(None),
        Some(s) => parse_enum(&s, field, allowed).map(Some),
    }
}

fn parse_enum<T: std::str::FromStr>(
    s: &str,
    field: &str,
    allowed: &'static [&'static str],
) -> Result<T, ValidationError> {
    if !allowed.contains(&s) {
        return Err(ValidationError::InvalidEnumValue {
            field: field.to_string(),
            value: s.to_string(),
            allowed,
        });
    }
    s.parse().map_err(|_| ValidationError::InvalidEnumValue {
        field: field.to_string(),
        value: s.to_string(),
        allowed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn non_object_body_rejected() {
        assert_eq!(as_object(&json!([1, 2, 3])), Err(ValidationError::NotAnObject));
        assert_eq!(as_object(&json!("text")), Err(ValidationError::NotAnObject));
        assert!(as_object(&json!({})).is_ok());
    }

    #[test]
    fn require_string_missing_and_wrong_type() {
        let obj = json!({"name": 7});
        let obj = obj.as_object().unwrap();
        assert_eq!(
            require_string(obj, "absent"),
            Err(ValidationError::missing_field("absent"))
        );
        assert_eq!(
            require_string(obj, "name"),
            Err(ValidationError::TypeMismatch {
                field: "name".to_string(),
                expected: "string"
            })
        );
    }

    #[test]
    fn explicit_null_counts_as_absent() {
        let obj = json!({"notes": null, "completed": null});
        let obj = obj.as_object().unwrap();
        assert_eq!(optional_string(obj, "notes"), Ok(None));
        assert_eq!(optional_bool(obj, "completed"), Ok(None));
        assert_eq!(
            require_string(obj, "notes"),
            Err(ValidationError::missing_field("notes"))
        );
    }

    #[test]
    fn empty_string_rejected_when_nonempty_required() {
        let obj = json!({"name": ""});
        let obj = obj.as_object().unwrap();
        assert_eq!(
            require_nonempty_string(obj, "name"),
            Err(ValidationError::EmptyField {
                field: "name".to_string()
            })
        );
    }

    #[test]
    fn enum_membership_checked() {
        use crate::IssuePriority;
        let obj = json!({"priority": "Medium"});
        let obj = obj.as_object().unwrap();
        let result: Result<IssuePriority, _> =
            require_enum(obj, "priority", &["Low", "High"]);
        assert_eq!(
            result,
            Err(ValidationError::InvalidEnumValue {
                field: "priority".to_string(),
                value: "Medium".to_string(),
                allowed: &["Low", "High"],
            })
        );

        let obj = json!({"priority": "High"});
        let obj = obj.as_object().unwrap();
        let parsed: IssuePriority = require_enum(obj, "priority", &["Low", "High"]).unwrap();
        assert_eq!(parsed, IssuePriority::High);
    }

    #[test]
    fn error_messages_name_the_field() {
        let err = ValidationError::missing_field("comments");
        assert!(err.to_string().contains("comments"));
        let err = ValidationError::InvalidEnumValue {
            field: "status".to_string(),
            value: "Shipped".to_string(),
            allowed: &["New", "Reviewed", "Accepted", "Rejected"],
        };
        let msg = err.to_string();
        assert!(msg.contains("status"));
        assert!(msg.contains("Shipped"));
        assert!(msg.contains("Reviewed"));
    }
}
