//! End-to-end pipeline tests against the in-memory store.

use std::sync::Arc;

use async_trait::async_trait;
use sifted_core::{
    canadian_catalog, ConvertError, ExtractedDocument, ExtractionAdapter, ExtractionError,
    FixtureExtractor, IngestError, JobStatus, MemoryStore, NormalizedRecipe, Pipeline,
    RecipeStore, VersionKind,
};
use uuid::Uuid;

const BANANA_BREAD: &str = "Banana Bread\n\
                            Ingredients:\n\
                            - 1 1/2 cups all-purpose flour\n\
                            - 1 egg\n\
                            Steps:\n\
                            1) Mix.\n\
                            2) Bake.";

/// Adapter that always fails, for exercising the failure path.
#[derive(Debug)]
struct DownExtractor;

#[async_trait]
impl ExtractionAdapter for DownExtractor {
    async fn extract(&self, _document_ref: &str) -> Result<ExtractedDocument, ExtractionError> {
        Err(ExtractionError::ServiceError {
            status: 503,
            message: "service down".to_string(),
        })
    }

    fn adapter_name(&self) -> &'static str {
        "down"
    }
}

fn pipeline_with_text(text: &str) -> (Pipeline, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let extractor = FixtureExtractor::new().with_default_response(text);
    let pipeline = Pipeline::new(store.clone(), Arc::new(extractor), canadian_catalog());
    (pipeline, store)
}

fn parsed_payload(store: &MemoryStore, recipe_id: Uuid) -> NormalizedRecipe {
    let version = store
        .latest_version(recipe_id, VersionKind::Parsed)
        .unwrap()
        .expect("parsed version must exist");
    serde_json::from_value(version.payload).unwrap()
}

#[tokio::test]
async fn test_successful_ingestion() {
    let (pipeline, store) = pipeline_with_text(BANANA_BREAD);

    let outcome = pipeline
        .ingest(Uuid::new_v4(), "uploads/banana.jpg")
        .await
        .unwrap();

    // queued -> processing -> completed, with exactly one raw and one parsed
    // version left behind.
    let job = store.get_job(outcome.job_id).unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Completed);
    assert!(job.completed_at.is_some());

    let versions = store.list_versions(outcome.recipe_id).unwrap();
    let raw_count = versions
        .iter()
        .filter(|v| v.kind == VersionKind::Raw)
        .count();
    let parsed_count = versions
        .iter()
        .filter(|v| v.kind == VersionKind::Parsed)
        .count();
    assert_eq!(raw_count, 1);
    assert_eq!(parsed_count, 1);

    // The recipe title is refreshed from the parse.
    let recipe = store.get_recipe(outcome.recipe_id).unwrap().unwrap();
    assert_eq!(recipe.title, "Banana Bread");

    // The raw payload preserves the extracted text verbatim.
    let raw = store
        .latest_version(outcome.recipe_id, VersionKind::Raw)
        .unwrap()
        .unwrap();
    assert_eq!(raw.payload["raw_text"], BANANA_BREAD);
}

#[tokio::test]
async fn test_extraction_failure_marks_job_failed() {
    let store = Arc::new(MemoryStore::new());
    let pipeline = Pipeline::new(store.clone(), Arc::new(DownExtractor), canadian_catalog());

    let err = pipeline
        .ingest(Uuid::new_v4(), "uploads/whatever.jpg")
        .await
        .unwrap_err();

    let (recipe_id, source) = match err {
        IngestError::Extraction { recipe_id, source } => (recipe_id, source),
        other => panic!("expected extraction failure, got {:?}", other),
    };
    assert!(matches!(
        source,
        ExtractionError::ServiceError { status: 503, .. }
    ));

    // The job is failed with the stage recorded, and no versions exist.
    let jobs = store.list_jobs(recipe_id).unwrap();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].status, JobStatus::Failed);
    assert!(jobs[0].error.as_deref().unwrap().starts_with("extract:"));
    assert!(store.list_versions(recipe_id).unwrap().is_empty());
}

#[tokio::test]
async fn test_parse_failure_keeps_raw_version() {
    // Steps section is missing, so parsing fails after the raw version has
    // been appended.
    let (pipeline, store) = pipeline_with_text("Mystery Dish\nIngredients:\n- 1 egg\n");

    let err = pipeline
        .ingest(Uuid::new_v4(), "uploads/mystery.jpg")
        .await
        .unwrap_err();

    let (recipe_id, source) = match err {
        IngestError::Parse { recipe_id, source } => (recipe_id, source),
        other => panic!("expected parse failure, got {:?}", other),
    };
    assert!(source.to_string().contains("steps"));

    let jobs = store.list_jobs(recipe_id).unwrap();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].status, JobStatus::Failed);
    assert!(jobs[0].error.as_deref().unwrap().starts_with("parse:"));

    // Exactly one raw version, zero parsed.
    let versions = store.list_versions(recipe_id).unwrap();
    assert_eq!(versions.len(), 1);
    assert_eq!(versions[0].kind, VersionKind::Raw);
}

#[tokio::test]
async fn test_conversion_of_ingested_recipe() {
    let (pipeline, store) = pipeline_with_text(BANANA_BREAD);
    let outcome = pipeline
        .ingest(Uuid::new_v4(), "uploads/banana.jpg")
        .await
        .unwrap();

    let conversion = pipeline.convert_recipe(outcome.recipe_id).unwrap();

    // Flour converted in place, egg untouched, one audit record.
    let converted: NormalizedRecipe =
        serde_json::from_value(conversion.version.payload.clone()).unwrap();
    assert_eq!(converted.ingredients[0].name, "gluten-free 1:1 baking flour");
    assert_eq!(converted.ingredients[0].qty, Some(1.5));
    assert_eq!(converted.ingredients[0].unit.as_deref(), Some("cups"));
    assert_eq!(converted.ingredients[1].name, "egg");

    assert_eq!(conversion.substitutions.len(), 1);
    assert_eq!(
        conversion.substitutions[0].ingredient_name,
        "all-purpose flour"
    );
    assert_eq!(conversion.substitutions[0].brand, "PC");

    // The parsed version is untouched.
    let parsed = parsed_payload(&store, outcome.recipe_id);
    assert_eq!(parsed.ingredients[0].name, "all-purpose flour");
}

#[tokio::test]
async fn test_convert_without_parsed_version() {
    let (pipeline, store) = pipeline_with_text(BANANA_BREAD);
    let recipe = store.create_recipe(Uuid::new_v4(), "Empty").unwrap();

    let result = pipeline.convert_recipe(recipe.id);
    assert!(matches!(result, Err(ConvertError::NoParsedVersion(id)) if id == recipe.id));

    // No converted version was created.
    assert!(store
        .latest_version(recipe.id, VersionKind::Converted)
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_reconversion_appends_new_version() {
    let (pipeline, store) = pipeline_with_text(BANANA_BREAD);
    let outcome = pipeline
        .ingest(Uuid::new_v4(), "uploads/banana.jpg")
        .await
        .unwrap();

    let first = pipeline.convert_recipe(outcome.recipe_id).unwrap();
    let second = pipeline.convert_recipe(outcome.recipe_id).unwrap();

    assert_ne!(first.version.id, second.version.id);
    assert_eq!(first.version.payload, second.version.payload);

    // Latest converted is the second pass; the first stays retrievable.
    let latest = store
        .latest_version(outcome.recipe_id, VersionKind::Converted)
        .unwrap()
        .unwrap();
    assert_eq!(latest.id, second.version.id);
    assert!(store.get_version(first.version.id).unwrap().is_some());

    // Audit rows accumulate across passes.
    let subs = store.list_substitutions(outcome.recipe_id).unwrap();
    assert_eq!(subs.len(), 2);
}

#[tokio::test]
async fn test_ingest_twice_isolated_per_recipe() {
    let (pipeline, store) = pipeline_with_text(BANANA_BREAD);
    let user = Uuid::new_v4();

    let first = pipeline.ingest(user, "uploads/banana-1.jpg").await.unwrap();
    let second = pipeline.ingest(user, "uploads/banana-2.jpg").await.unwrap();

    assert_ne!(first.recipe_id, second.recipe_id);
    assert_eq!(store.list_versions(first.recipe_id).unwrap().len(), 2);
    assert_eq!(store.list_versions(second.recipe_id).unwrap().len(), 2);
}

#[tokio::test]
async fn test_structured_draft_skips_text_parsing() {
    // An adapter that returns a provider-structured draft instead of text.
    #[derive(Debug)]
    struct DraftExtractor;

    #[async_trait]
    impl ExtractionAdapter for DraftExtractor {
        async fn extract(
            &self,
            _document_ref: &str,
        ) -> Result<ExtractedDocument, ExtractionError> {
            Ok(ExtractedDocument::Draft(NormalizedRecipe {
                title: "Pad Thai".to_string(),
                yield_: None,
                total_time: Some("30m".to_string()),
                ingredients: vec![sifted_core::Ingredient {
                    qty: Some(2.0),
                    unit: Some("tbsp".to_string()),
                    name: "soy sauce".to_string(),
                    modifier: None,
                }],
                steps: vec!["Stir-fry.".to_string()],
                notes: None,
            }))
        }

        fn adapter_name(&self) -> &'static str {
            "draft"
        }
    }

    let store = Arc::new(MemoryStore::new());
    let pipeline = Pipeline::new(store.clone(), Arc::new(DraftExtractor), canadian_catalog());

    let outcome = pipeline
        .ingest(Uuid::new_v4(), "uploads/pad-thai.pdf")
        .await
        .unwrap();

    let recipe = store.get_recipe(outcome.recipe_id).unwrap().unwrap();
    assert_eq!(recipe.title, "Pad Thai");

    let parsed = parsed_payload(&store, outcome.recipe_id);
    assert_eq!(parsed.ingredients[0].name, "soy sauce");

    // Drafts convert like any parsed recipe.
    let conversion = pipeline.convert_recipe(outcome.recipe_id).unwrap();
    assert_eq!(conversion.substitutions[0].brand, "San-J");
}
