//! Pipeline orchestration.
//!
//! [`Pipeline::ingest`] drives one ingestion attempt through its job states
//! (queued -> processing -> completed/failed): extract, persist the raw
//! version, parse, persist the parsed version. The raw version is kept even
//! when parsing fails so the attempt can be diagnosed.
//!
//! [`Pipeline::convert_recipe`] is a separate operation outside the job
//! state machine: it reads the latest parsed version, runs the substitution
//! engine, and appends a new converted version plus audit records. Calling
//! it again appends another converted version; single-flight semantics are
//! the caller's concern.

use std::sync::Arc;

use uuid::Uuid;

use crate::error::{ConvertError, IngestError, ParseError, StoreError};
use crate::extract::{ExtractedDocument, ExtractionAdapter};
use crate::recipe_parser::{self, ParseWarning};
use crate::store::{RecipeStore, SubstitutionRecord, VersionRecord};
use crate::substitution::{self, RuleCatalog};
use crate::types::{JobStatus, JobType, NormalizedRecipe, RawPayload, VersionKind};

/// Title given to a recipe before its document has been parsed.
const PLACEHOLDER_TITLE: &str = "Untitled recipe";

pub struct Pipeline {
    store: Arc<dyn RecipeStore>,
    extractor: Arc<dyn ExtractionAdapter>,
    catalog: RuleCatalog,
}

/// Result of a completed ingestion.
#[derive(Debug, Clone)]
pub struct IngestOutcome {
    pub recipe_id: Uuid,
    pub job_id: Uuid,
}

/// Result of a conversion pass.
#[derive(Debug, Clone)]
pub struct ConvertOutcome {
    pub version: VersionRecord,
    pub substitutions: Vec<SubstitutionRecord>,
}

impl Pipeline {
    pub fn new(
        store: Arc<dyn RecipeStore>,
        extractor: Arc<dyn ExtractionAdapter>,
        catalog: RuleCatalog,
    ) -> Self {
        Self {
            store,
            extractor,
            catalog,
        }
    }

    /// Run one ingestion attempt end to end.
    ///
    /// Creates the recipe and its job record, then runs extraction and
    /// parsing. Fatal failures mark the job failed (with the stage name in
    /// the reason) and are returned to the caller; per-line parse warnings
    /// are logged and do not fail the attempt.
    pub async fn ingest(
        &self,
        user_id: Uuid,
        document_ref: &str,
    ) -> Result<IngestOutcome, IngestError> {
        let recipe = self.store.create_recipe(user_id, PLACEHOLDER_TITLE)?;
        let job = self.store.create_job(recipe.id, JobType::Ocr)?;
        tracing::info!(recipe_id = %recipe.id, job_id = %job.id, document_ref, "ingestion queued");

        self.store
            .update_job_status(job.id, JobStatus::Processing, None)?;

        let document = match self.extractor.extract(document_ref).await {
            Ok(document) => document,
            Err(e) => {
                self.fail_job(job.id, "extract", &e.to_string());
                return Err(IngestError::Extraction {
                    recipe_id: recipe.id,
                    source: e,
                });
            }
        };

        let raw_payload = match &document {
            ExtractedDocument::Text(text) => serde_json::to_value(RawPayload {
                raw_text: text.clone(),
            }),
            ExtractedDocument::Draft(draft) => serde_json::to_value(draft),
        }
        .map_err(|e| StoreError::Payload(e.to_string()))?;
        self.store
            .append_version(recipe.id, VersionKind::Raw, raw_payload)?;

        let (parsed, warnings) = match parse_document(&document) {
            Ok(outcome) => outcome,
            Err(e) => {
                // The raw version stays behind for diagnosis.
                self.fail_job(job.id, "parse", &e.to_string());
                return Err(IngestError::Parse {
                    recipe_id: recipe.id,
                    source: e,
                });
            }
        };
        for warning in &warnings {
            tracing::warn!(
                recipe_id = %recipe.id,
                line = %warning.line,
                reason = %warning.reason,
                "dropped ingredient line"
            );
        }

        let parsed_payload =
            serde_json::to_value(&parsed).map_err(|e| StoreError::Payload(e.to_string()))?;
        self.store
            .append_version(recipe.id, VersionKind::Parsed, parsed_payload)?;
        self.store.rename_recipe(recipe.id, &parsed.title)?;

        self.store
            .update_job_status(job.id, JobStatus::Completed, None)?;
        tracing::info!(recipe_id = %recipe.id, job_id = %job.id, title = %parsed.title, "ingestion completed");

        Ok(IngestOutcome {
            recipe_id: recipe.id,
            job_id: job.id,
        })
    }

    /// Convert the latest parsed version of a recipe to gluten-free.
    ///
    /// Appends a new converted version and its substitution audit records;
    /// existing versions are never touched. Fails with
    /// [`ConvertError::NoParsedVersion`] when the recipe has never been
    /// parsed, and in that case creates nothing.
    pub fn convert_recipe(&self, recipe_id: Uuid) -> Result<ConvertOutcome, ConvertError> {
        let parsed = self
            .store
            .latest_version(recipe_id, VersionKind::Parsed)?
            .ok_or(ConvertError::NoParsedVersion(recipe_id))?;

        let recipe: NormalizedRecipe = serde_json::from_value(parsed.payload.clone())
            .map_err(|e| ConvertError::BadPayload(e.to_string()))?;

        let (converted, applied) = substitution::convert(&recipe, &self.catalog);

        let payload =
            serde_json::to_value(&converted).map_err(|e| StoreError::Payload(e.to_string()))?;
        let version = self
            .store
            .append_version(recipe_id, VersionKind::Converted, payload)?;
        let substitutions = self.store.add_substitutions(recipe_id, &applied)?;

        tracing::info!(
            %recipe_id,
            version_id = %version.id,
            substitutions = substitutions.len(),
            "conversion completed"
        );

        Ok(ConvertOutcome {
            version,
            substitutions,
        })
    }

    /// Mark a job failed, recording which stage broke. A store failure here
    /// is logged but not propagated; the original error matters more.
    fn fail_job(&self, job_id: Uuid, stage: &str, reason: &str) {
        tracing::warn!(%job_id, stage, reason, "ingestion failed");
        let message = format!("{}: {}", stage, reason);
        if let Err(e) = self
            .store
            .update_job_status(job_id, JobStatus::Failed, Some(&message))
        {
            tracing::error!(%job_id, error = %e, "failed to record job failure");
        }
    }
}

/// Turn an extracted document into a normalized recipe. Text goes through
/// the parser; a provider-structured draft skips parsing but is validated
/// against the same required-field rules.
fn parse_document(
    document: &ExtractedDocument,
) -> Result<(NormalizedRecipe, Vec<ParseWarning>), ParseError> {
    match document {
        ExtractedDocument::Text(text) => {
            let outcome = recipe_parser::parse_recipe(text)?;
            Ok((outcome.recipe, outcome.warnings))
        }
        ExtractedDocument::Draft(draft) => {
            draft.validate()?;
            Ok((draft.clone(), Vec::new()))
        }
    }
}
