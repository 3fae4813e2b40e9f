use thiserror::Error;
use uuid::Uuid;

use crate::types::JobStatus;

/// Errors from the external text/vision extraction service.
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("Extraction request failed: {0}")]
    RequestFailed(String),

    #[error("Extraction service returned {status}: {message}")]
    ServiceError { status: u16, message: String },

    #[error("Failed to parse extraction response: {0}")]
    InvalidResponse(String),

    #[error("Extraction adapter not configured: {0}")]
    NotConfigured(String),
}

/// Errors from parsing extracted text into a structured recipe.
///
/// Per-line ingredient problems are warnings, not errors; parsing only fails
/// when a required field is missing after best-effort recovery.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
}

/// Errors from the persistence boundary.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("{0} not found: {1}")]
    NotFound(&'static str, Uuid),

    #[error("Invalid job transition from {from} to {to}")]
    InvalidTransition { from: JobStatus, to: JobStatus },

    #[error("Payload serialization failed: {0}")]
    Payload(String),
}

/// Errors from a single ingestion attempt. Extraction and parse failures
/// carry the recipe id of the attempt so callers can inspect what the
/// failed run left behind.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Extraction failed for recipe {recipe_id}: {source}")]
    Extraction {
        recipe_id: Uuid,
        #[source]
        source: ExtractionError,
    },

    #[error("Parse failed for recipe {recipe_id}: {source}")]
    Parse {
        recipe_id: Uuid,
        #[source]
        source: ParseError,
    },

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Errors from a conversion request.
#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("No parsed version found for recipe {0}")]
    NoParsedVersion(Uuid),

    #[error("Stored parsed payload is not a valid recipe: {0}")]
    BadPayload(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}
