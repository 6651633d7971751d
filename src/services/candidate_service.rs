use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::candidate::{
    Attachment, AttachmentKind, Candidate, CandidateFilter, CandidatePatch, NewCandidate,
};
use crate::store::{CandidateStore, ReferenceLookup};

#[derive(Clone)]
pub struct CandidateService {
    store: Arc<dyn CandidateStore>,
    references: Arc<dyn ReferenceLookup>,
}

impl CandidateService {
    pub fn new(store: Arc<dyn CandidateStore>, references: Arc<dyn ReferenceLookup>) -> Self {
        Self { store, references }
    }

    pub async fn create_candidate(&self, mut draft: NewCandidate) -> Result<Candidate> {
        draft.full_name = required_name(&draft.full_name)?;
        self.ensure_center(draft.center_id).await?;
        self.ensure_filiere(draft.filiere_id).await?;

        let candidate = self.store.insert(draft).await?;
        info!(
            candidate_id = %candidate.id,
            center_id = %candidate.center_id,
            has_cv = candidate.cv.is_some(),
            has_cover_letter = candidate.cover_letter.is_some(),
            "candidate created"
        );
        Ok(candidate)
    }

    pub async fn get_candidate(&self, id: Uuid) -> Result<Candidate> {
        self.store
            .find(id)
            .await?
            .ok_or_else(|| Error::candidate_not_found(id))
    }

    pub async fn update_candidate(&self, id: Uuid, mut patch: CandidatePatch) -> Result<Candidate> {
        if let Some(name) = patch.full_name.take() {
            patch.full_name = Some(required_name(&name)?);
        }
        if let Some(center_id) = patch.center_id {
            self.ensure_center(center_id).await?;
        }
        if let Some(filiere_id) = patch.filiere_id {
            self.ensure_filiere(filiere_id).await?;
        }

        let candidate = self
            .store
            .update(id, patch)
            .await?
            .ok_or_else(|| Error::candidate_not_found(id))?;
        info!(candidate_id = %id, "candidate updated");
        Ok(candidate)
    }

    pub async fn delete_candidate(&self, id: Uuid) -> Result<()> {
        if !self.store.delete(id).await? {
            return Err(Error::candidate_not_found(id));
        }
        info!(candidate_id = %id, "candidate deleted");
        Ok(())
    }

    pub async fn list_candidates(&self, filter: CandidateFilter) -> Result<Vec<Candidate>> {
        self.store.list(filter).await
    }

    pub async fn get_attachment(&self, id: Uuid, kind: AttachmentKind) -> Result<Attachment> {
        let candidate = self.get_candidate(id).await?;
        candidate.attachment(kind).cloned().ok_or_else(|| {
            Error::NotFound(format!("{} not found for candidate {}", kind.describe(), id))
        })
    }

    async fn ensure_center(&self, center_id: Uuid) -> Result<()> {
        if !self.references.center_exists(center_id).await? {
            warn!(center_id = %center_id, "rejected unknown center reference");
            return Err(Error::Validation(format!("Center {} does not exist", center_id)));
        }
        Ok(())
    }

    async fn ensure_filiere(&self, filiere_id: Uuid) -> Result<()> {
        if !self.references.filiere_exists(filiere_id).await? {
            warn!(filiere_id = %filiere_id, "rejected unknown filière reference");
            return Err(Error::Validation(format!(
                "Filière {} does not exist",
                filiere_id
            )));
        }
        Ok(())
    }
}

fn required_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(Error::Validation("full_name is required".to_string()));
    }
    Ok(trimmed.to_string())
}
