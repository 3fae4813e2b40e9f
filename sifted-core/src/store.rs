//! Persistence boundary.
//!
//! The core depends on a minimal record-store contract, not on any specific
//! storage technology. [`RecipeStore`] is that contract; [`MemoryStore`] is
//! the in-process implementation used by tests and the server binary.
//!
//! Versions form a per-recipe append-only log. Every record carries an
//! insertion sequence number in addition to its timestamp so that "latest"
//! is well defined even when two appends land on the same instant: latest is
//! the maximum of `(created_at, seq)`.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::error::StoreError;
use crate::substitution::AppliedSubstitution;
use crate::types::{JobStatus, JobType, VersionKind};

#[derive(Debug, Clone)]
pub struct RecipeRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct VersionRecord {
    pub id: Uuid,
    pub recipe_id: Uuid,
    pub kind: VersionKind,
    pub payload: JsonValue,
    /// Store-wide insertion sequence number; ties on created_at break here.
    pub seq: u64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct JobRecord {
    pub id: Uuid,
    pub recipe_id: Uuid,
    pub job_type: JobType,
    pub status: JobStatus,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct SubstitutionRecord {
    pub id: Uuid,
    pub recipe_id: Uuid,
    pub ingredient_name: String,
    pub suggested_product: String,
    pub brand: String,
    pub product_url: Option<String>,
    pub rationale: String,
    pub created_at: DateTime<Utc>,
}

/// Record operations the pipeline needs. Implementations must be safe to
/// share across concurrent requests; individual calls are atomic but callers
/// get no cross-call transactions.
pub trait RecipeStore: Send + Sync {
    fn create_recipe(&self, user_id: Uuid, title: &str) -> Result<RecipeRecord, StoreError>;
    fn get_recipe(&self, id: Uuid) -> Result<Option<RecipeRecord>, StoreError>;
    fn rename_recipe(&self, id: Uuid, title: &str) -> Result<(), StoreError>;

    fn create_job(&self, recipe_id: Uuid, job_type: JobType) -> Result<JobRecord, StoreError>;
    fn get_job(&self, id: Uuid) -> Result<Option<JobRecord>, StoreError>;
    /// All jobs for a recipe, newest first.
    fn list_jobs(&self, recipe_id: Uuid) -> Result<Vec<JobRecord>, StoreError>;
    /// Transition a job. Rejects non-monotonic transitions (terminal states
    /// never regress). `completed_at` is stamped on completion.
    fn update_job_status(
        &self,
        id: Uuid,
        status: JobStatus,
        error: Option<&str>,
    ) -> Result<(), StoreError>;

    /// Append one version record to the recipe's log. Never overwrites.
    fn append_version(
        &self,
        recipe_id: Uuid,
        kind: VersionKind,
        payload: JsonValue,
    ) -> Result<VersionRecord, StoreError>;
    fn get_version(&self, id: Uuid) -> Result<Option<VersionRecord>, StoreError>;
    /// Most recent version of the given kind, by (created_at, seq).
    fn latest_version(
        &self,
        recipe_id: Uuid,
        kind: VersionKind,
    ) -> Result<Option<VersionRecord>, StoreError>;
    /// All versions for a recipe, newest first.
    fn list_versions(&self, recipe_id: Uuid) -> Result<Vec<VersionRecord>, StoreError>;

    fn add_substitutions(
        &self,
        recipe_id: Uuid,
        applied: &[AppliedSubstitution],
    ) -> Result<Vec<SubstitutionRecord>, StoreError>;
    fn list_substitutions(&self, recipe_id: Uuid) -> Result<Vec<SubstitutionRecord>, StoreError>;
}

#[derive(Default)]
struct Inner {
    recipes: HashMap<Uuid, RecipeRecord>,
    jobs: HashMap<Uuid, JobRecord>,
    versions: HashMap<Uuid, VersionRecord>,
    /// Per-recipe version ids in insertion order
    version_log: HashMap<Uuid, Vec<Uuid>>,
    substitutions: Vec<SubstitutionRecord>,
    next_seq: u64,
}

/// In-memory store. All state lives behind one lock; operations are atomic.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Inner>, StoreError> {
        self.inner
            .read()
            .map_err(|_| StoreError::Unavailable("store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Inner>, StoreError> {
        self.inner
            .write()
            .map_err(|_| StoreError::Unavailable("store lock poisoned".to_string()))
    }
}

impl RecipeStore for MemoryStore {
    fn create_recipe(&self, user_id: Uuid, title: &str) -> Result<RecipeRecord, StoreError> {
        let mut inner = self.write()?;
        let now = Utc::now();
        let record = RecipeRecord {
            id: Uuid::new_v4(),
            user_id,
            title: title.to_string(),
            created_at: now,
            updated_at: now,
        };
        inner.recipes.insert(record.id, record.clone());
        Ok(record)
    }

    fn get_recipe(&self, id: Uuid) -> Result<Option<RecipeRecord>, StoreError> {
        Ok(self.read()?.recipes.get(&id).cloned())
    }

    fn rename_recipe(&self, id: Uuid, title: &str) -> Result<(), StoreError> {
        let mut inner = self.write()?;
        let recipe = inner
            .recipes
            .get_mut(&id)
            .ok_or(StoreError::NotFound("recipe", id))?;
        recipe.title = title.to_string();
        recipe.updated_at = Utc::now();
        Ok(())
    }

    fn create_job(&self, recipe_id: Uuid, job_type: JobType) -> Result<JobRecord, StoreError> {
        let mut inner = self.write()?;
        if !inner.recipes.contains_key(&recipe_id) {
            return Err(StoreError::NotFound("recipe", recipe_id));
        }
        let record = JobRecord {
            id: Uuid::new_v4(),
            recipe_id,
            job_type,
            status: JobStatus::Queued,
            error: None,
            created_at: Utc::now(),
            completed_at: None,
        };
        inner.jobs.insert(record.id, record.clone());
        Ok(record)
    }

    fn get_job(&self, id: Uuid) -> Result<Option<JobRecord>, StoreError> {
        Ok(self.read()?.jobs.get(&id).cloned())
    }

    fn list_jobs(&self, recipe_id: Uuid) -> Result<Vec<JobRecord>, StoreError> {
        let inner = self.read()?;
        let mut jobs: Vec<JobRecord> = inner
            .jobs
            .values()
            .filter(|j| j.recipe_id == recipe_id)
            .cloned()
            .collect();
        jobs.sort_by_key(|j| std::cmp::Reverse(j.created_at));
        Ok(jobs)
    }

    fn update_job_status(
        &self,
        id: Uuid,
        status: JobStatus,
        error: Option<&str>,
    ) -> Result<(), StoreError> {
        let mut inner = self.write()?;
        let job = inner
            .jobs
            .get_mut(&id)
            .ok_or(StoreError::NotFound("job", id))?;
        if !job.status.can_transition_to(status) {
            return Err(StoreError::InvalidTransition {
                from: job.status,
                to: status,
            });
        }
        job.status = status;
        job.error = error.map(|e| e.to_string());
        if status == JobStatus::Completed {
            job.completed_at = Some(Utc::now());
        }
        Ok(())
    }

    fn append_version(
        &self,
        recipe_id: Uuid,
        kind: VersionKind,
        payload: JsonValue,
    ) -> Result<VersionRecord, StoreError> {
        let mut inner = self.write()?;
        if !inner.recipes.contains_key(&recipe_id) {
            return Err(StoreError::NotFound("recipe", recipe_id));
        }
        let seq = inner.next_seq;
        inner.next_seq += 1;
        let record = VersionRecord {
            id: Uuid::new_v4(),
            recipe_id,
            kind,
            payload,
            seq,
            created_at: Utc::now(),
        };
        inner.versions.insert(record.id, record.clone());
        inner
            .version_log
            .entry(recipe_id)
            .or_default()
            .push(record.id);
        Ok(record)
    }

    fn get_version(&self, id: Uuid) -> Result<Option<VersionRecord>, StoreError> {
        Ok(self.read()?.versions.get(&id).cloned())
    }

    fn latest_version(
        &self,
        recipe_id: Uuid,
        kind: VersionKind,
    ) -> Result<Option<VersionRecord>, StoreError> {
        let inner = self.read()?;
        let Some(log) = inner.version_log.get(&recipe_id) else {
            return Ok(None);
        };
        Ok(log
            .iter()
            .filter_map(|id| inner.versions.get(id))
            .filter(|v| v.kind == kind)
            .max_by_key(|v| (v.created_at, v.seq))
            .cloned())
    }

    fn list_versions(&self, recipe_id: Uuid) -> Result<Vec<VersionRecord>, StoreError> {
        let inner = self.read()?;
        let Some(log) = inner.version_log.get(&recipe_id) else {
            return Ok(Vec::new());
        };
        let mut versions: Vec<VersionRecord> = log
            .iter()
            .filter_map(|id| inner.versions.get(id))
            .cloned()
            .collect();
        versions.sort_by_key(|v| std::cmp::Reverse((v.created_at, v.seq)));
        Ok(versions)
    }

    fn add_substitutions(
        &self,
        recipe_id: Uuid,
        applied: &[AppliedSubstitution],
    ) -> Result<Vec<SubstitutionRecord>, StoreError> {
        let mut inner = self.write()?;
        if !inner.recipes.contains_key(&recipe_id) {
            return Err(StoreError::NotFound("recipe", recipe_id));
        }
        let now = Utc::now();
        let records: Vec<SubstitutionRecord> = applied
            .iter()
            .map(|sub| SubstitutionRecord {
                id: Uuid::new_v4(),
                recipe_id,
                ingredient_name: sub.ingredient_name.clone(),
                suggested_product: sub.suggested_product.clone(),
                brand: sub.brand.clone(),
                product_url: sub.product_url.clone(),
                rationale: sub.rationale.clone(),
                created_at: now,
            })
            .collect();
        inner.substitutions.extend(records.iter().cloned());
        Ok(records)
    }

    fn list_substitutions(&self, recipe_id: Uuid) -> Result<Vec<SubstitutionRecord>, StoreError> {
        Ok(self
            .read()?
            .substitutions
            .iter()
            .filter(|s| s.recipe_id == recipe_id)
            .cloned()
            .collect())
    }
}
