use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// Kinds of entries in a recipe's append-only version history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VersionKind {
    Raw,
    Parsed,
    Converted,
}

impl VersionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            VersionKind::Raw => "raw",
            VersionKind::Parsed => "parsed",
            VersionKind::Converted => "converted",
        }
    }
}

impl fmt::Display for VersionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ingestion job lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Queued,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }

    /// Completed and failed are terminal; no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    /// Transitions are monotonic: queued -> processing -> completed/failed.
    /// A job may fail from any non-terminal state.
    pub fn can_transition_to(&self, next: JobStatus) -> bool {
        match self {
            JobStatus::Queued => matches!(next, JobStatus::Processing | JobStatus::Failed),
            JobStatus::Processing => matches!(next, JobStatus::Completed | JobStatus::Failed),
            JobStatus::Completed | JobStatus::Failed => false,
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Job types. Only document ingestion exists today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobType {
    Ocr,
}

impl JobType {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobType::Ocr => "ocr",
        }
    }
}

/// A single ingredient. Matching and equality are case-insensitive on `name`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    /// Numeric quantity, already reduced to decimal (e.g. "1 1/2" -> 1.5)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qty: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    pub name: String,
    /// Preparation note, e.g. "mashed"
    #[serde(rename = "mod", default, skip_serializing_if = "Option::is_none")]
    pub modifier: Option<String>,
}

/// Structured recipe payload stored for parsed and converted versions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRecipe {
    pub title: String,
    #[serde(rename = "yield", default, skip_serializing_if = "Option::is_none")]
    pub yield_: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_time: Option<String>,
    pub ingredients: Vec<Ingredient>,
    /// Order-significant preparation steps
    pub steps: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl NormalizedRecipe {
    /// Check the required-field invariants: non-empty title, at least one
    /// ingredient, at least one step. Used both for parser output and for
    /// provider-structured drafts.
    pub fn validate(&self) -> Result<(), ParseError> {
        if self.title.trim().is_empty() {
            return Err(ParseError::MissingField("title"));
        }
        if self.ingredients.is_empty() {
            return Err(ParseError::MissingField("ingredients"));
        }
        if self.steps.is_empty() {
            return Err(ParseError::MissingField("steps"));
        }
        Ok(())
    }
}

/// Payload stored for `raw` versions when the adapter returned plain text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPayload {
    pub raw_text: String,
}
