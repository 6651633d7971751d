use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{Error, Result};

/// Placement status tag. Display order is the canonical reporting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CandidateStatus {
    #[serde(rename = "Disponible", alias = "available")]
    Available,
    #[serde(rename = "En Stage", alias = "internship")]
    Internship,
    #[serde(rename = "En Travail", alias = "employment")]
    Employment,
}

impl CandidateStatus {
    pub const ALL: [CandidateStatus; 3] = [
        CandidateStatus::Available,
        CandidateStatus::Internship,
        CandidateStatus::Employment,
    ];

    pub fn label(self) -> &'static str {
        match self {
            CandidateStatus::Available => "Disponible",
            CandidateStatus::Internship => "En Stage",
            CandidateStatus::Employment => "En Travail",
        }
    }

    /// Value persisted in the `status` column.
    pub fn slug(self) -> &'static str {
        match self {
            CandidateStatus::Available => "available",
            CandidateStatus::Internship => "internship",
            CandidateStatus::Employment => "employment",
        }
    }

    pub fn index(self) -> usize {
        match self {
            CandidateStatus::Available => 0,
            CandidateStatus::Internship => 1,
            CandidateStatus::Employment => 2,
        }
    }
}

impl fmt::Display for CandidateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for CandidateStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let needle = s.trim();
        CandidateStatus::ALL
            .into_iter()
            .find(|status| {
                status.label().eq_ignore_ascii_case(needle) || status.slug().eq_ignore_ascii_case(needle)
            })
            .ok_or_else(|| Error::Validation(format!("Unknown candidate status '{}'", needle)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InternshipDetails {
    pub company: String,
    pub title: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub internship_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmploymentDetails {
    pub company: String,
    pub title: String,
    pub contract_type: String,
    pub start_date: NaiveDate,
}

/// Current placement of a candidate. Each variant owns exactly the fields that
/// belong to it, so a transition is always a whole-value replacement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "current_status")]
pub enum StatusTracking {
    #[default]
    #[serde(rename = "Disponible")]
    Available,
    #[serde(rename = "En Stage")]
    Internship(InternshipDetails),
    #[serde(rename = "En Travail")]
    Employment(EmploymentDetails),
}

impl StatusTracking {
    pub fn status(&self) -> CandidateStatus {
        match self {
            StatusTracking::Available => CandidateStatus::Available,
            StatusTracking::Internship(_) => CandidateStatus::Internship,
            StatusTracking::Employment(_) => CandidateStatus::Employment,
        }
    }

    /// Rejects blank required text fields and an internship ending before it starts.
    pub fn validate(&self) -> Result<()> {
        match self {
            StatusTracking::Available => Ok(()),
            StatusTracking::Internship(details) => {
                require_text("company", &details.company)?;
                require_text("title", &details.title)?;
                require_text("internship_type", &details.internship_type)?;
                if details.start_date > details.end_date {
                    return Err(Error::Validation(format!(
                        "Internship start_date {} is after end_date {}",
                        details.start_date, details.end_date
                    )));
                }
                Ok(())
            }
            StatusTracking::Employment(details) => {
                require_text("company", &details.company)?;
                require_text("title", &details.title)?;
                require_text("contract_type", &details.contract_type)
            }
        }
    }
}

fn require_text(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::Validation(format!("{} is required", field)));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentKind {
    Cv,
    CoverLetter,
}

impl AttachmentKind {
    pub fn describe(self) -> &'static str {
        match self {
            AttachmentKind::Cv => "CV",
            AttachmentKind::CoverLetter => "Cover letter",
        }
    }
}

/// Uploaded document kept byte-for-byte alongside its original file name.
#[derive(Clone, PartialEq, Eq)]
pub struct Attachment {
    pub file_name: String,
    pub data: Vec<u8>,
}

impl fmt::Debug for Attachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attachment")
            .field("file_name", &self.file_name)
            .field("size", &self.data.len())
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub id: Uuid,
    pub full_name: String,
    pub linkedin: Option<String>,
    pub portfolio: Option<String>,
    pub filiere_id: Uuid,
    pub center_id: Uuid,
    pub cv: Option<Attachment>,
    pub cover_letter: Option<Attachment>,
    pub status_tracking: StatusTracking,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Candidate {
    pub fn status(&self) -> CandidateStatus {
        self.status_tracking.status()
    }

    pub fn attachment(&self, kind: AttachmentKind) -> Option<&Attachment> {
        match kind {
            AttachmentKind::Cv => self.cv.as_ref(),
            AttachmentKind::CoverLetter => self.cover_letter.as_ref(),
        }
    }
}

/// Intake data for a new candidate. Status always starts as `Available`.
#[derive(Debug, Clone)]
pub struct NewCandidate {
    pub full_name: String,
    pub linkedin: Option<String>,
    pub portfolio: Option<String>,
    pub filiere_id: Uuid,
    pub center_id: Uuid,
    pub cv: Option<Attachment>,
    pub cover_letter: Option<Attachment>,
}

/// Partial edit. `None` keeps the stored value; attachments are only replaced
/// when new bytes are supplied.
#[derive(Debug, Clone, Default)]
pub struct CandidatePatch {
    pub full_name: Option<String>,
    pub linkedin: Option<String>,
    pub portfolio: Option<String>,
    pub filiere_id: Option<Uuid>,
    pub center_id: Option<Uuid>,
    pub cv: Option<Attachment>,
    pub cover_letter: Option<Attachment>,
}

impl CandidatePatch {
    pub fn apply_to(self, candidate: &mut Candidate) {
        if let Some(full_name) = self.full_name {
            candidate.full_name = full_name;
        }
        if let Some(linkedin) = self.linkedin {
            candidate.linkedin = Some(linkedin);
        }
        if let Some(portfolio) = self.portfolio {
            candidate.portfolio = Some(portfolio);
        }
        if let Some(filiere_id) = self.filiere_id {
            candidate.filiere_id = filiere_id;
        }
        if let Some(center_id) = self.center_id {
            candidate.center_id = center_id;
        }
        if let Some(cv) = self.cv {
            candidate.cv = Some(cv);
        }
        if let Some(cover_letter) = self.cover_letter {
            candidate.cover_letter = Some(cover_letter);
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateFilter {
    pub center_id: Option<Uuid>,
    pub filiere_id: Option<Uuid>,
    pub status: Option<CandidateStatus>,
}

impl CandidateFilter {
    pub fn matches(&self, candidate: &Candidate) -> bool {
        self.center_id.map_or(true, |id| candidate.center_id == id)
            && self.filiere_id.map_or(true, |id| candidate.filiere_id == id)
            && self.status.map_or(true, |s| candidate.status() == s)
    }
}

/// Flattened status columns as persisted in the `candidates` table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusColumns {
    pub status: String,
    pub stage_company: Option<String>,
    pub stage_title: Option<String>,
    pub stage_start_date: Option<NaiveDate>,
    pub stage_end_date: Option<NaiveDate>,
    pub stage_type: Option<String>,
    pub job_company: Option<String>,
    pub job_title: Option<String>,
    pub job_contract_type: Option<String>,
    pub job_start_date: Option<NaiveDate>,
}

impl From<&StatusTracking> for StatusColumns {
    fn from(tracking: &StatusTracking) -> Self {
        let mut columns = StatusColumns {
            status: tracking.status().slug().to_string(),
            ..Default::default()
        };
        match tracking {
            StatusTracking::Available => {}
            StatusTracking::Internship(d) => {
                columns.stage_company = Some(d.company.clone());
                columns.stage_title = Some(d.title.clone());
                columns.stage_start_date = Some(d.start_date);
                columns.stage_end_date = Some(d.end_date);
                columns.stage_type = Some(d.internship_type.clone());
            }
            StatusTracking::Employment(d) => {
                columns.job_company = Some(d.company.clone());
                columns.job_title = Some(d.title.clone());
                columns.job_contract_type = Some(d.contract_type.clone());
                columns.job_start_date = Some(d.start_date);
            }
        }
        columns
    }
}

impl TryFrom<StatusColumns> for StatusTracking {
    type Error = Error;

    fn try_from(c: StatusColumns) -> Result<Self> {
        let status = CandidateStatus::from_str(&c.status)
            .map_err(|_| corrupt(format!("unknown status '{}'", c.status)))?;
        let stage_set = c.stage_company.is_some()
            || c.stage_title.is_some()
            || c.stage_start_date.is_some()
            || c.stage_end_date.is_some()
            || c.stage_type.is_some();
        let job_set = c.job_company.is_some()
            || c.job_title.is_some()
            || c.job_contract_type.is_some()
            || c.job_start_date.is_some();

        match status {
            CandidateStatus::Available if !stage_set && !job_set => Ok(StatusTracking::Available),
            CandidateStatus::Internship if !job_set => {
                match (
                    c.stage_company,
                    c.stage_title,
                    c.stage_start_date,
                    c.stage_end_date,
                    c.stage_type,
                ) {
                    (Some(company), Some(title), Some(start_date), Some(end_date), Some(internship_type)) => {
                        Ok(StatusTracking::Internship(InternshipDetails {
                            company,
                            title,
                            start_date,
                            end_date,
                            internship_type,
                        }))
                    }
                    _ => Err(corrupt("internship fields incomplete".to_string())),
                }
            }
            CandidateStatus::Employment if !stage_set => {
                match (c.job_company, c.job_title, c.job_contract_type, c.job_start_date) {
                    (Some(company), Some(title), Some(contract_type), Some(start_date)) => {
                        Ok(StatusTracking::Employment(EmploymentDetails {
                            company,
                            title,
                            contract_type,
                            start_date,
                        }))
                    }
                    _ => Err(corrupt("employment fields incomplete".to_string())),
                }
            }
            other => Err(corrupt(format!(
                "fields of another status linger under '{}'",
                other.slug()
            ))),
        }
    }
}

fn corrupt(reason: String) -> Error {
    Error::Internal(format!("Corrupted status tracking: {}", reason))
}

#[derive(Debug, Clone, FromRow)]
pub struct CandidateRow {
    pub id: Uuid,
    pub full_name: String,
    pub linkedin: Option<String>,
    pub portfolio: Option<String>,
    pub filiere_id: Uuid,
    pub center_id: Uuid,
    pub cv_data: Option<Vec<u8>>,
    pub cv_name: Option<String>,
    pub cover_letter_data: Option<Vec<u8>>,
    pub cover_letter_name: Option<String>,
    pub status: String,
    pub stage_company: Option<String>,
    pub stage_title: Option<String>,
    pub stage_start_date: Option<NaiveDate>,
    pub stage_end_date: Option<NaiveDate>,
    pub stage_type: Option<String>,
    pub job_company: Option<String>,
    pub job_title: Option<String>,
    pub job_contract_type: Option<String>,
    pub job_start_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn attachment_from_columns(data: Option<Vec<u8>>, name: Option<String>) -> Option<Attachment> {
    data.map(|data| Attachment {
        file_name: name.unwrap_or_default(),
        data,
    })
}

impl TryFrom<CandidateRow> for Candidate {
    type Error = Error;

    fn try_from(row: CandidateRow) -> Result<Self> {
        let status_tracking = StatusTracking::try_from(StatusColumns {
            status: row.status,
            stage_company: row.stage_company,
            stage_title: row.stage_title,
            stage_start_date: row.stage_start_date,
            stage_end_date: row.stage_end_date,
            stage_type: row.stage_type,
            job_company: row.job_company,
            job_title: row.job_title,
            job_contract_type: row.job_contract_type,
            job_start_date: row.job_start_date,
        })?;

        Ok(Candidate {
            id: row.id,
            full_name: row.full_name,
            linkedin: row.linkedin,
            portfolio: row.portfolio,
            filiere_id: row.filiere_id,
            center_id: row.center_id,
            cv: attachment_from_columns(row.cv_data, row.cv_name),
            cover_letter: attachment_from_columns(row.cover_letter_data, row.cover_letter_name),
            status_tracking,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
