use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

use crate::error::Result;
use crate::models::candidate::CandidateStatus;
use crate::models::stats::{CenterStats, ChartSeries, StatusCounts};
use crate::store::{CandidateStore, ReferenceLookup, StatusCountRow};

#[derive(Clone)]
pub struct StatsService {
    store: Arc<dyn CandidateStore>,
    references: Arc<dyn ReferenceLookup>,
}

impl StatsService {
    pub fn new(store: Arc<dyn CandidateStore>, references: Arc<dyn ReferenceLookup>) -> Self {
        Self { store, references }
    }

    /// Per-status population of one center. Unknown or empty centers yield zeros.
    pub async fn counts_for_center(&self, center_id: Uuid) -> Result<StatusCounts> {
        let rows = self.store.status_counts(center_id).await?;
        Ok(accumulate(rows.into_iter().filter(|r| r.center_id == center_id)))
    }

    pub async fn chart_series_for_center(&self, center_id: Uuid) -> Result<ChartSeries> {
        let counts = self.counts_for_center(center_id).await?;
        Ok(ChartSeries::from(&counts))
    }

    /// All centers with candidates, best placement performance first.
    pub async fn center_rankings(&self) -> Result<Vec<CenterStats>> {
        let rows = self.store.status_counts_by_center().await?;
        let mut names = self.references.center_names().await?;

        let mut per_center: BTreeMap<Uuid, Vec<StatusCountRow>> = BTreeMap::new();
        for row in rows {
            per_center.entry(row.center_id).or_default().push(row);
        }

        let mut rankings: Vec<CenterStats> = per_center
            .into_iter()
            .map(|(center_id, rows)| {
                CenterStats::new(center_id, names.remove(&center_id), accumulate(rows))
            })
            .collect();
        rankings.sort_by(|a, b| {
            b.performance
                .cmp(&a.performance)
                .then(b.total.cmp(&a.total))
                .then(a.center_id.cmp(&b.center_id))
        });
        Ok(rankings)
    }
}

/// Folds group-by rows into a zero-initialized accumulator so that statuses
/// with no candidates still appear.
fn accumulate<I>(rows: I) -> StatusCounts
where
    I: IntoIterator<Item = StatusCountRow>,
{
    let mut counts = StatusCounts::default();
    for row in rows {
        match row.status.parse::<CandidateStatus>() {
            Ok(status) => counts.add(status, row.total),
            Err(_) => warn!(status = %row.status, "ignoring unknown status in aggregation"),
        }
    }
    counts
}
