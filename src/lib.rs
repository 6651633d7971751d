pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;
pub mod telemetry;

use std::sync::Arc;

use crate::services::{
    candidate_service::CandidateService, stats_service::StatsService,
    status_service::StatusService,
};
use crate::store::{CandidateStore, ReferenceLookup};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CandidateStore>,
    pub candidate_service: CandidateService,
    pub status_service: StatusService,
    pub stats_service: StatsService,
}

impl AppState {
    pub fn new(store: Arc<dyn CandidateStore>, references: Arc<dyn ReferenceLookup>) -> Self {
        let candidate_service = CandidateService::new(store.clone(), references.clone());
        let status_service = StatusService::new(store.clone());
        let stats_service = StatsService::new(store.clone(), references);

        Self {
            store,
            candidate_service,
            status_service,
            stats_service,
        }
    }

    /// State backed by one value that both stores candidates and resolves references.
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: CandidateStore + ReferenceLookup + 'static,
    {
        Self::new(store.clone(), store)
    }
}
