pub mod error;
pub mod extract;
pub mod pipeline;
pub mod recipe_parser;
pub mod store;
pub mod substitution;
pub mod types;

pub use error::{ConvertError, ExtractionError, IngestError, ParseError, StoreError};
pub use extract::{
    create_adapter_from_env, ExtractedDocument, ExtractionAdapter, FixtureExtractor,
    VisionExtractor,
};
pub use pipeline::{ConvertOutcome, IngestOutcome, Pipeline};
pub use recipe_parser::{parse_recipe, ParseOutcome, ParseWarning};
pub use store::{
    JobRecord, MemoryStore, RecipeRecord, RecipeStore, SubstitutionRecord, VersionRecord,
};
pub use substitution::{
    canadian_catalog, convert, AppliedSubstitution, RuleCatalog, SubstitutionRule,
};
pub use types::{Ingredient, JobStatus, JobType, NormalizedRecipe, RawPayload, VersionKind};
