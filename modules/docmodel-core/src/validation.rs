//! Schema validation for action inputs.
//!
//! Two layers, both pure and state-free:
//! - structural: serde decodes the raw JSON input into the typed input struct
//!   (required fields, field types, enum membership);
//! - semantic: `Validate::validate` checks formats the type system can't
//!   (identifier patterns, URLs, non-negative amounts, currency codes).
//!
//! Invalid input never reaches a reducer.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// Regex Patterns
// =============================================================================

static RE_IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_.:-]*$").unwrap());
static RE_CURRENCY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Z]{3}$").unwrap());
static RE_MISSING_FIELD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"missing field `([^`]+)`").unwrap());
static RE_UNKNOWN_VARIANT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"unknown variant `([^`]*)`").unwrap());

// =============================================================================
// Violations
// =============================================================================

/// Why a field was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ViolationKind {
    Missing,
    Empty,
    InvalidIdentifier,
    InvalidUrl,
    Negative,
    NotAllowed(String),
    InvalidFormat(String),
    Malformed(String),
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViolationKind::Missing => f.write_str("is required"),
            ViolationKind::Empty => f.write_str("must not be empty"),
            ViolationKind::InvalidIdentifier => f.write_str("is not a valid identifier"),
            ViolationKind::InvalidUrl => f.write_str("is not a valid http(s) URL"),
            ViolationKind::Negative => f.write_str("must not be negative"),
            ViolationKind::NotAllowed(value) => write!(f, "does not allow `{value}`"),
            ViolationKind::InvalidFormat(detail) => write!(f, "has invalid format: {detail}"),
            ViolationKind::Malformed(detail) => write!(f, "is malformed: {detail}"),
        }
    }
}

/// A single rejected field. `field` is a dotted path relative to the input
/// (`"$input"` when the failure can't be pinned to one field).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    pub field: String,
    pub kind: ViolationKind,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, kind: ViolationKind) -> Self {
        Self {
            field: field.into(),
            kind,
        }
    }

    /// Classify a serde decoding failure. Missing fields and unknown enum
    /// variants are pinned to their field; everything else is reported
    /// against the whole input.
    pub fn from_decode_error(err: &serde_json::Error) -> Self {
        let message = err.to_string();
        if let Some(caps) = RE_MISSING_FIELD.captures(&message) {
            return Self::new(&caps[1], ViolationKind::Missing);
        }
        if let Some(caps) = RE_UNKNOWN_VARIANT.captures(&message) {
            return Self::new("$input", ViolationKind::NotAllowed(caps[1].to_string()));
        }
        Self::new("$input", ViolationKind::Malformed(message))
    }
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.kind)
    }
}

/// Validation failure for a whole action. Enumerates every violated field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {action_type} input: {}", join_violations(.violations))]
pub struct ValidationError {
    pub action_type: String,
    pub violations: Vec<FieldViolation>,
}

impl ValidationError {
    pub fn new(action_type: impl Into<String>, violations: Vec<FieldViolation>) -> Self {
        Self {
            action_type: action_type.into(),
            violations,
        }
    }

    pub fn single(action_type: impl Into<String>, violation: FieldViolation) -> Self {
        Self::new(action_type, vec![violation])
    }

    /// True when `field` is among the violated fields.
    pub fn has_field(&self, field: &str) -> bool {
        self.violations.iter().any(|v| v.field == field)
    }
}

fn join_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

// =============================================================================
// Validate
// =============================================================================

/// Semantic checks on a decoded input. Must not look at document state.
pub trait Validate {
    fn validate(&self) -> Result<(), Vec<FieldViolation>> {
        Ok(())
    }
}

/// Marker for everything that can travel as an action's `input`.
pub trait ActionInput: Serialize + DeserializeOwned + Validate + Send + Sync + 'static {}

impl<T> ActionInput for T where T: Serialize + DeserializeOwned + Validate + Send + Sync + 'static {}

/// Decode and validate a raw input. The single entry point used by the
/// action registry, also usable directly to pre-validate before dispatch.
pub fn decode_input<I: ActionInput>(
    action_type: &str,
    input: &serde_json::Value,
) -> Result<I, ValidationError> {
    let decoded = I::deserialize(input).map_err(|e| {
        ValidationError::single(action_type, FieldViolation::from_decode_error(&e))
    })?;
    decoded
        .validate()
        .map_err(|violations| ValidationError::new(action_type, violations))?;
    Ok(decoded)
}

/// Collects violations while checking an input's fields.
#[derive(Debug, Default)]
pub struct Violations(Vec<FieldViolation>);

impl Violations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &str, kind: ViolationKind) -> &mut Self {
        self.0.push(FieldViolation::new(field, kind));
        self
    }

    pub fn non_empty(&mut self, field: &str, value: &str) -> &mut Self {
        if value.trim().is_empty() {
            self.push(field, ViolationKind::Empty);
        }
        self
    }

    pub fn identifier(&mut self, field: &str, value: &str) -> &mut Self {
        if value.is_empty() {
            self.push(field, ViolationKind::Empty);
        } else if !RE_IDENTIFIER.is_match(value) {
            self.push(field, ViolationKind::InvalidIdentifier);
        }
        self
    }

    pub fn identifiers(&mut self, field: &str, values: &[String]) -> &mut Self {
        for (i, value) in values.iter().enumerate() {
            self.identifier(&format!("{field}.{i}"), value);
        }
        self
    }

    pub fn url(&mut self, field: &str, value: &str) -> &mut Self {
        match url::Url::parse(value) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") && parsed.has_host() => {}
            _ => {
                self.push(field, ViolationKind::InvalidUrl);
            }
        }
        self
    }

    pub fn non_negative(&mut self, field: &str, value: f64) -> &mut Self {
        if !value.is_finite() {
            self.push(field, ViolationKind::InvalidFormat("not a finite number".into()));
        } else if value < 0.0 {
            self.push(field, ViolationKind::Negative);
        }
        self
    }

    pub fn currency(&mut self, field: &str, value: &str) -> &mut Self {
        if !RE_CURRENCY.is_match(value) {
            self.push(
                field,
                ViolationKind::InvalidFormat("expected a three-letter ISO 4217 code".into()),
            );
        }
        self
    }

    /// Record a violation when `condition` does not hold.
    pub fn ensure(&mut self, condition: bool, field: &str, kind: ViolationKind) -> &mut Self {
        if !condition {
            self.push(field, kind);
        }
        self
    }

    pub fn finish(self) -> Result<(), Vec<FieldViolation>> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(self.0)
        }
    }
}
