use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::candidate::{Candidate, EmploymentDetails, InternshipDetails, StatusTracking};
use crate::store::CandidateStore;

/// Sole writer of a candidate's [`StatusTracking`].
///
/// Any status may follow any other. Every transition stores a complete new
/// value in one atomic write, so fields of the previous status never survive.
#[derive(Clone)]
pub struct StatusService {
    store: Arc<dyn CandidateStore>,
}

impl StatusService {
    pub fn new(store: Arc<dyn CandidateStore>) -> Self {
        Self { store }
    }

    pub async fn transition_to_available(&self, id: Uuid) -> Result<Candidate> {
        self.transition(id, StatusTracking::Available).await
    }

    pub async fn transition_to_internship(
        &self,
        id: Uuid,
        details: InternshipDetails,
    ) -> Result<Candidate> {
        self.transition(id, StatusTracking::Internship(details)).await
    }

    pub async fn transition_to_employment(
        &self,
        id: Uuid,
        details: EmploymentDetails,
    ) -> Result<Candidate> {
        self.transition(id, StatusTracking::Employment(details)).await
    }

    pub async fn transition(&self, id: Uuid, tracking: StatusTracking) -> Result<Candidate> {
        let target = tracking.status();
        if let Err(e) = tracking.validate() {
            warn!(candidate_id = %id, status = %target, error = %e, "rejected status transition");
            return Err(e);
        }

        let candidate = self
            .store
            .replace_status(id, tracking)
            .await?
            .ok_or_else(|| Error::candidate_not_found(id))?;
        info!(candidate_id = %id, status = %target, "candidate status changed");
        Ok(candidate)
    }
}
