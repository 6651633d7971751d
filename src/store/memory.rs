use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use super::{CandidateStore, ReferenceLookup, StatusCountRow};
use crate::error::{Error, Result};
use crate::models::candidate::{
    Candidate, CandidateFilter, CandidatePatch, NewCandidate, StatusTracking,
};
use crate::models::center::Center;
use crate::models::filiere::Filiere;

#[derive(Default)]
struct MemoryState {
    next_seq: u64,
    candidates: HashMap<Uuid, (u64, Candidate)>,
    centers: HashMap<Uuid, Center>,
    filieres: HashMap<Uuid, Filiere>,
}

impl MemoryState {
    fn check_references(&self, center_id: Uuid, filiere_id: Uuid) -> Result<()> {
        if !self.centers.contains_key(&center_id) || !self.filieres.contains_key(&filiere_id) {
            return Err(Error::Validation(
                "Referenced center or filière does not exist".to_string(),
            ));
        }
        Ok(())
    }
}

/// Reference data loaded into a memory store at startup.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MemorySeed {
    #[serde(default)]
    pub centers: Vec<Center>,
    #[serde(default)]
    pub filieres: Vec<Filiere>,
}

impl MemorySeed {
    /// Reads a seed from a JSON file shaped `{"centers": [...], "filieres": [...]}`.
    pub async fn load(path: &Path) -> Result<Self> {
        let raw = tokio::fs::read(path).await?;
        Ok(serde_json::from_slice(&raw)?)
    }
}

/// Process-local store with the same guarantees as the Postgres one: each
/// mutation runs under a single write lock and references are checked like
/// foreign keys.
#[derive(Clone, Default)]
pub struct MemoryCandidateStore {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryCandidateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads every center, then every filière, rejecting filières whose center is unknown.
    pub async fn seed(&self, seed: MemorySeed) -> Result<()> {
        let (centers, filieres) = (seed.centers.len(), seed.filieres.len());
        for center in seed.centers {
            self.insert_center(center).await;
        }
        for filiere in seed.filieres {
            self.insert_filiere(filiere).await?;
        }
        info!(centers, filieres, "memory store seeded");
        Ok(())
    }

    pub async fn insert_center(&self, center: Center) {
        self.state.write().await.centers.insert(center.id, center);
    }

    pub async fn insert_filiere(&self, filiere: Filiere) -> Result<()> {
        let mut state = self.state.write().await;
        if !state.centers.contains_key(&filiere.center_id) {
            return Err(Error::Validation(format!(
                "Center {} does not exist",
                filiere.center_id
            )));
        }
        state.filieres.insert(filiere.id, filiere);
        Ok(())
    }

    /// Removes a center unless something still references it.
    pub async fn remove_center(&self, id: Uuid) -> Result<bool> {
        let mut state = self.state.write().await;
        let referenced = state.filieres.values().any(|f| f.center_id == id)
            || state.candidates.values().any(|(_, c)| c.center_id == id);
        if referenced {
            return Err(Error::Validation(format!(
                "Center {} is still referenced by filières or candidates",
                id
            )));
        }
        Ok(state.centers.remove(&id).is_some())
    }

    /// Removes a filière unless a candidate still references it.
    pub async fn remove_filiere(&self, id: Uuid) -> Result<bool> {
        let mut state = self.state.write().await;
        if state.candidates.values().any(|(_, c)| c.filiere_id == id) {
            return Err(Error::Validation(format!(
                "Filière {} is still referenced by candidates",
                id
            )));
        }
        Ok(state.filieres.remove(&id).is_some())
    }
}

#[async_trait]
impl CandidateStore for MemoryCandidateStore {
    async fn insert(&self, draft: NewCandidate) -> Result<Candidate> {
        let mut state = self.state.write().await;
        state.check_references(draft.center_id, draft.filiere_id)?;

        let now = Utc::now();
        let candidate = Candidate {
            id: Uuid::new_v4(),
            full_name: draft.full_name,
            linkedin: draft.linkedin,
            portfolio: draft.portfolio,
            filiere_id: draft.filiere_id,
            center_id: draft.center_id,
            cv: draft.cv,
            cover_letter: draft.cover_letter,
            status_tracking: StatusTracking::Available,
            created_at: now,
            updated_at: now,
        };
        let seq = state.next_seq;
        state.next_seq += 1;
        state.candidates.insert(candidate.id, (seq, candidate.clone()));
        Ok(candidate)
    }

    async fn find(&self, id: Uuid) -> Result<Option<Candidate>> {
        let state = self.state.read().await;
        Ok(state.candidates.get(&id).map(|(_, c)| c.clone()))
    }

    async fn update(&self, id: Uuid, patch: CandidatePatch) -> Result<Option<Candidate>> {
        let mut state = self.state.write().await;
        let Some((_, current)) = state.candidates.get(&id) else {
            return Ok(None);
        };

        let mut updated = current.clone();
        patch.apply_to(&mut updated);
        state.check_references(updated.center_id, updated.filiere_id)?;
        updated.updated_at = Utc::now();

        if let Some((_, slot)) = state.candidates.get_mut(&id) {
            *slot = updated.clone();
        }
        Ok(Some(updated))
    }

    async fn replace_status(
        &self,
        id: Uuid,
        tracking: StatusTracking,
    ) -> Result<Option<Candidate>> {
        let mut state = self.state.write().await;
        Ok(state.candidates.get_mut(&id).map(|(_, candidate)| {
            candidate.status_tracking = tracking;
            candidate.updated_at = Utc::now();
            candidate.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        Ok(self.state.write().await.candidates.remove(&id).is_some())
    }

    async fn list(&self, filter: CandidateFilter) -> Result<Vec<Candidate>> {
        let state = self.state.read().await;
        let mut matching: Vec<&(u64, Candidate)> = state
            .candidates
            .values()
            .filter(|(_, c)| filter.matches(c))
            .collect();
        matching.sort_by(|(seq_a, a), (seq_b, b)| {
            b.created_at.cmp(&a.created_at).then(seq_b.cmp(seq_a))
        });
        Ok(matching.into_iter().map(|(_, c)| c.clone()).collect())
    }

    async fn status_counts(&self, center_id: Uuid) -> Result<Vec<StatusCountRow>> {
        let rows = self.status_counts_by_center().await?;
        Ok(rows.into_iter().filter(|r| r.center_id == center_id).collect())
    }

    async fn status_counts_by_center(&self) -> Result<Vec<StatusCountRow>> {
        let state = self.state.read().await;
        let mut groups: BTreeMap<(Uuid, &'static str), i64> = BTreeMap::new();
        for (_, candidate) in state.candidates.values() {
            *groups
                .entry((candidate.center_id, candidate.status().slug()))
                .or_insert(0) += 1;
        }
        Ok(groups
            .into_iter()
            .map(|((center_id, status), total)| StatusCountRow {
                center_id,
                status: status.to_string(),
                total,
            })
            .collect())
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

#[async_trait]
impl ReferenceLookup for MemoryCandidateStore {
    async fn center_exists(&self, id: Uuid) -> Result<bool> {
        Ok(self.state.read().await.centers.contains_key(&id))
    }

    async fn filiere_exists(&self, id: Uuid) -> Result<bool> {
        Ok(self.state.read().await.filieres.contains_key(&id))
    }

    async fn center_names(&self) -> Result<HashMap<Uuid, String>> {
        let state = self.state.read().await;
        Ok(state
            .centers
            .values()
            .map(|c| (c.id, c.name.clone()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::candidate::CandidateStatus;

    #[tokio::test]
    async fn seed_file_makes_references_resolvable() {
        let center_id = Uuid::new_v4();
        let filiere_id = Uuid::new_v4();
        let path = std::env::temp_dir().join(format!("placement-seed-{}.json", Uuid::new_v4()));
        let body = serde_json::json!({
            "centers": [{ "id": center_id, "name": "Centre Sfax" }],
            "filieres": [{ "id": filiere_id, "name": "Réseaux", "center_id": center_id }]
        });
        std::fs::write(&path, body.to_string()).unwrap();

        let seed = MemorySeed::load(&path).await.unwrap();
        std::fs::remove_file(&path).unwrap();
        let store = MemoryCandidateStore::new();
        store.seed(seed).await.unwrap();

        assert!(store.center_exists(center_id).await.unwrap());
        assert!(store.filiere_exists(filiere_id).await.unwrap());
        let created = store.insert(draft("Amina", center_id, filiere_id)).await.unwrap();
        assert_eq!(created.status_tracking, StatusTracking::Available);
    }

    #[tokio::test]
    async fn seed_rejects_orphan_filiere_and_unreadable_files() {
        let store = MemoryCandidateStore::new();
        let orphan = MemorySeed {
            centers: vec![],
            filieres: vec![Filiere {
                id: Uuid::new_v4(),
                name: "Orpheline".into(),
                description: None,
                center_id: Uuid::new_v4(),
            }],
        };
        let err = store.seed(orphan).await.unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Validation);

        let missing = std::env::temp_dir().join(format!("absent-{}.json", Uuid::new_v4()));
        assert!(matches!(MemorySeed::load(&missing).await, Err(Error::Io(_))));
    }

    async fn seeded() -> (MemoryCandidateStore, Uuid, Uuid) {
        let store = MemoryCandidateStore::new();
        let center_id = Uuid::new_v4();
        let filiere_id = Uuid::new_v4();
        store
            .insert_center(Center {
                id: center_id,
                name: "Centre Tunis".into(),
                description: None,
                address: None,
                phone: None,
            })
            .await;
        store
            .insert_filiere(Filiere {
                id: filiere_id,
                name: "Développement web".into(),
                description: None,
                center_id,
            })
            .await
            .unwrap();
        (store, center_id, filiere_id)
    }

    fn draft(name: &str, center_id: Uuid, filiere_id: Uuid) -> NewCandidate {
        NewCandidate {
            full_name: name.into(),
            linkedin: None,
            portfolio: None,
            filiere_id,
            center_id,
            cv: None,
            cover_letter: None,
        }
    }

    #[tokio::test]
    async fn list_returns_newest_first() {
        let (store, center_id, filiere_id) = seeded().await;
        store.insert(draft("First", center_id, filiere_id)).await.unwrap();
        store.insert(draft("Second", center_id, filiere_id)).await.unwrap();
        store.insert(draft("Third", center_id, filiere_id)).await.unwrap();

        let names: Vec<String> = store
            .list(CandidateFilter::default())
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.full_name)
            .collect();
        assert_eq!(names, vec!["Third", "Second", "First"]);
    }

    #[tokio::test]
    async fn insert_rejects_unknown_references() {
        let (store, center_id, _) = seeded().await;
        let err = store
            .insert(draft("Ghost", center_id, Uuid::new_v4()))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn referenced_center_cannot_be_removed() {
        let (store, center_id, filiere_id) = seeded().await;
        store.insert(draft("Amina", center_id, filiere_id)).await.unwrap();

        assert!(store.remove_center(center_id).await.is_err());
        assert!(store.remove_filiere(filiere_id).await.is_err());
        assert!(store.center_exists(center_id).await.unwrap());
    }

    #[tokio::test]
    async fn counts_group_by_center_and_status() {
        let (store, center_id, filiere_id) = seeded().await;
        let a = store.insert(draft("A", center_id, filiere_id)).await.unwrap();
        store.insert(draft("B", center_id, filiere_id)).await.unwrap();
        store
            .replace_status(
                a.id,
                StatusTracking::Employment(crate::models::candidate::EmploymentDetails {
                    company: "Acme Corp".into(),
                    title: "Developer".into(),
                    contract_type: "CDI".into(),
                    start_date: chrono::NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
                }),
            )
            .await
            .unwrap();

        let rows = store.status_counts(center_id).await.unwrap();
        let total: i64 = rows.iter().map(|r| r.total).sum();
        assert_eq!(total, 2);
        assert!(rows
            .iter()
            .any(|r| r.status == CandidateStatus::Employment.slug() && r.total == 1));
        assert!(store.status_counts(Uuid::new_v4()).await.unwrap().is_empty());
    }
}
