//! Candidate record storage.
//!
//! The services only talk to the [`CandidateStore`] and [`ReferenceLookup`]
//! traits. Every mutating method is a single atomic write on one record, so a
//! concurrent reader sees either the old or the new candidate, never a mix.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use std::collections::HashMap;
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::Result;
use crate::models::candidate::{
    Candidate, CandidateFilter, CandidatePatch, NewCandidate, StatusTracking,
};

pub use memory::{MemoryCandidateStore, MemorySeed};
pub use postgres::PgCandidateStore;

/// One group-by bucket: how many candidates of `center_id` carry `status`.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct StatusCountRow {
    pub center_id: Uuid,
    pub status: String,
    pub total: i64,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CandidateStore: Send + Sync {
    /// Persists a new candidate in the `Available` state, assigning id and timestamps.
    async fn insert(&self, draft: NewCandidate) -> Result<Candidate>;

    async fn find(&self, id: Uuid) -> Result<Option<Candidate>>;

    /// Merges `patch` into the stored record. `Ok(None)` when the id is unknown.
    async fn update(&self, id: Uuid, patch: CandidatePatch) -> Result<Option<Candidate>>;

    /// Overwrites every status column with `tracking`. `Ok(None)` when the id is unknown.
    async fn replace_status(&self, id: Uuid, tracking: StatusTracking)
        -> Result<Option<Candidate>>;

    /// Returns whether a record was removed.
    async fn delete(&self, id: Uuid) -> Result<bool>;

    /// Matching candidates, newest first.
    async fn list(&self, filter: CandidateFilter) -> Result<Vec<Candidate>>;

    async fn status_counts(&self, center_id: Uuid) -> Result<Vec<StatusCountRow>>;

    async fn status_counts_by_center(&self) -> Result<Vec<StatusCountRow>>;

    async fn ping(&self) -> Result<()>;
}

/// Resolves the reference entities a candidate points at.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReferenceLookup: Send + Sync {
    async fn center_exists(&self, id: Uuid) -> Result<bool>;

    async fn filiere_exists(&self, id: Uuid) -> Result<bool>;

    /// Display names of every known center.
    async fn center_names(&self) -> Result<HashMap<Uuid, String>>;
}
