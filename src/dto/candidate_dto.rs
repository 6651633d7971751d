use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::error::{Error, Result};
use crate::models::candidate::{
    Attachment, Candidate, CandidateFilter, CandidatePatch, CandidateStatus, EmploymentDetails,
    InternshipDetails, NewCandidate, StatusTracking,
};

/// File supplied by the upload collaborator: original name plus base64 content.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AttachmentPayload {
    #[validate(length(min = 1, message = "file_name must not be empty"))]
    pub file_name: String,
    pub content_base64: String,
}

impl AttachmentPayload {
    fn decode(self) -> Result<Attachment> {
        self.validate()?;
        let data = STANDARD.decode(self.content_base64.trim())?;
        if data.is_empty() {
            return Err(Error::Validation(format!(
                "Attachment {} is empty",
                self.file_name
            )));
        }
        Ok(Attachment {
            file_name: self.file_name,
            data,
        })
    }
}

fn decode_optional(payload: Option<AttachmentPayload>) -> Result<Option<Attachment>> {
    payload.map(AttachmentPayload::decode).transpose()
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCandidatePayload {
    #[validate(length(min = 1, message = "full_name is required"))]
    pub full_name: String,
    #[serde(default, deserialize_with = "trim_optional_string")]
    pub linkedin: Option<String>,
    #[serde(default, deserialize_with = "trim_optional_string")]
    pub portfolio: Option<String>,
    pub filiere_id: Uuid,
    pub center_id: Uuid,
    pub cv: Option<AttachmentPayload>,
    pub cover_letter: Option<AttachmentPayload>,
}

impl CreateCandidatePayload {
    pub fn into_draft(self) -> Result<NewCandidate> {
        self.validate()?;
        Ok(NewCandidate {
            full_name: self.full_name,
            linkedin: self.linkedin,
            portfolio: self.portfolio,
            filiere_id: self.filiere_id,
            center_id: self.center_id,
            cv: decode_optional(self.cv)?,
            cover_letter: decode_optional(self.cover_letter)?,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateCandidatePayload {
    pub full_name: Option<String>,
    #[serde(default, deserialize_with = "trim_optional_string")]
    pub linkedin: Option<String>,
    #[serde(default, deserialize_with = "trim_optional_string")]
    pub portfolio: Option<String>,
    pub filiere_id: Option<Uuid>,
    pub center_id: Option<Uuid>,
    pub cv: Option<AttachmentPayload>,
    pub cover_letter: Option<AttachmentPayload>,
}

impl UpdateCandidatePayload {
    pub fn into_patch(self) -> Result<CandidatePatch> {
        Ok(CandidatePatch {
            full_name: self.full_name,
            linkedin: self.linkedin,
            portfolio: self.portfolio,
            filiere_id: self.filiere_id,
            center_id: self.center_id,
            cv: decode_optional(self.cv)?,
            cover_letter: decode_optional(self.cover_letter)?,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CandidateListQuery {
    pub center_id: Option<Uuid>,
    pub filiere_id: Option<Uuid>,
    #[serde(default, deserialize_with = "trim_optional_string")]
    pub status: Option<String>,
}

impl CandidateListQuery {
    pub fn into_filter(self) -> Result<CandidateFilter> {
        Ok(CandidateFilter {
            center_id: self.center_id,
            filiere_id: self.filiere_id,
            status: self
                .status
                .as_deref()
                .map(str::parse::<CandidateStatus>)
                .transpose()?,
        })
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct InternshipPayload {
    #[validate(length(min = 1))]
    pub company: String,
    #[validate(length(min = 1))]
    pub title: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[validate(length(min = 1))]
    pub internship_type: String,
}

impl InternshipPayload {
    pub fn into_details(self) -> Result<InternshipDetails> {
        self.validate()?;
        Ok(InternshipDetails {
            company: self.company.trim().to_string(),
            title: self.title.trim().to_string(),
            start_date: self.start_date,
            end_date: self.end_date,
            internship_type: self.internship_type.trim().to_string(),
        })
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct EmploymentPayload {
    #[validate(length(min = 1))]
    pub company: String,
    #[validate(length(min = 1))]
    pub title: String,
    #[validate(length(min = 1))]
    pub contract_type: String,
    pub start_date: NaiveDate,
}

impl EmploymentPayload {
    pub fn into_details(self) -> Result<EmploymentDetails> {
        self.validate()?;
        Ok(EmploymentDetails {
            company: self.company.trim().to_string(),
            title: self.title.trim().to_string(),
            contract_type: self.contract_type.trim().to_string(),
            start_date: self.start_date,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct AttachmentInfo {
    pub file_name: String,
    pub size: usize,
}

impl From<&Attachment> for AttachmentInfo {
    fn from(attachment: &Attachment) -> Self {
        Self {
            file_name: attachment.file_name.clone(),
            size: attachment.data.len(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CandidateResponse {
    pub id: Uuid,
    pub full_name: String,
    pub linkedin: Option<String>,
    pub portfolio: Option<String>,
    pub filiere_id: Uuid,
    pub center_id: Uuid,
    pub cv: Option<AttachmentInfo>,
    pub cover_letter: Option<AttachmentInfo>,
    pub status_tracking: StatusTracking,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Candidate> for CandidateResponse {
    fn from(candidate: Candidate) -> Self {
        Self {
            id: candidate.id,
            cv: candidate.cv.as_ref().map(AttachmentInfo::from),
            cover_letter: candidate.cover_letter.as_ref().map(AttachmentInfo::from),
            full_name: candidate.full_name,
            linkedin: candidate.linkedin,
            portfolio: candidate.portfolio,
            filiere_id: candidate.filiere_id,
            center_id: candidate.center_id,
            status_tracking: candidate.status_tracking,
            created_at: candidate.created_at,
            updated_at: candidate.updated_at,
        }
    }
}

// Trims strings and turns empty ones into None
fn trim_optional_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    Ok(opt.and_then(|s| {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn create_payload_decodes_attachments() {
        let payload: CreateCandidatePayload = serde_json::from_value(json!({
            "full_name": "Amina",
            "linkedin": "  ",
            "filiere_id": Uuid::new_v4(),
            "center_id": Uuid::new_v4(),
            "cv": { "file_name": "cv.pdf", "content_base64": STANDARD.encode(b"%PDF-1.7") }
        }))
        .unwrap();

        let draft = payload.into_draft().unwrap();
        assert!(draft.linkedin.is_none());
        assert_eq!(draft.cv.unwrap().data, b"%PDF-1.7".to_vec());
        assert!(draft.cover_letter.is_none());
    }

    #[test]
    fn bad_base64_is_a_validation_error() {
        let payload = UpdateCandidatePayload {
            cv: Some(AttachmentPayload {
                file_name: "cv.pdf".into(),
                content_base64: "not base64!!".into(),
            }),
            ..Default::default()
        };
        assert!(matches!(payload.into_patch(), Err(Error::Validation(_))));
    }

    #[test]
    fn list_query_accepts_status_labels() {
        let query = CandidateListQuery {
            status: Some("En Stage".into()),
            ..Default::default()
        };
        assert_eq!(
            query.into_filter().unwrap().status,
            Some(CandidateStatus::Internship)
        );

        let query = CandidateListQuery {
            status: Some("Emploi".into()),
            ..Default::default()
        };
        assert!(query.into_filter().is_err());
    }
}
