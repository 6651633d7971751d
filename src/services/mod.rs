pub mod candidate_service;
pub mod stats_service;
pub mod status_service;
