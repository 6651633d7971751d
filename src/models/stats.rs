use serde::ser::{Serialize, SerializeMap, Serializer};
use uuid::Uuid;

use super::candidate::CandidateStatus;

/// Candidate population per status. Every canonical status is always present;
/// serializes as a `{label: count}` map in canonical order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    counts: [i64; 3],
}

impl StatusCounts {
    pub fn get(&self, status: CandidateStatus) -> i64 {
        self.counts[status.index()]
    }

    pub fn add(&mut self, status: CandidateStatus, total: i64) {
        self.counts[status.index()] += total;
    }

    pub fn total(&self) -> i64 {
        self.counts.iter().sum()
    }

    /// Candidates currently placed, in internship or employment.
    pub fn placed(&self) -> i64 {
        self.get(CandidateStatus::Internship) + self.get(CandidateStatus::Employment)
    }

    pub fn iter(&self) -> impl Iterator<Item = (CandidateStatus, i64)> + '_ {
        CandidateStatus::ALL.into_iter().map(move |s| (s, self.get(s)))
    }
}

impl Serialize for StatusCounts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(CandidateStatus::ALL.len()))?;
        for (status, count) in self.iter() {
            map.serialize_entry(status.label(), &count)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub data: Vec<i64>,
}

impl From<&StatusCounts> for ChartSeries {
    fn from(counts: &StatusCounts) -> Self {
        let (labels, data) = counts
            .iter()
            .map(|(status, count)| (status.label().to_string(), count))
            .unzip();
        Self { labels, data }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct CenterStats {
    pub center_id: Uuid,
    /// `None` when the center row is gone or was never registered.
    pub center_name: Option<String>,
    pub statistics: StatusCounts,
    pub total: i64,
    pub performance: i64,
}

impl CenterStats {
    pub fn new(center_id: Uuid, center_name: Option<String>, statistics: StatusCounts) -> Self {
        Self {
            center_id,
            center_name,
            total: statistics.total(),
            performance: statistics.placed(),
            statistics,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_serialize_in_canonical_order_with_zeros() {
        let mut counts = StatusCounts::default();
        counts.add(CandidateStatus::Employment, 2);

        let json = serde_json::to_string(&counts).unwrap();
        assert_eq!(json, r#"{"Disponible":0,"En Stage":0,"En Travail":2}"#);
    }

    #[test]
    fn chart_series_matches_counts() {
        let mut counts = StatusCounts::default();
        counts.add(CandidateStatus::Available, 3);
        counts.add(CandidateStatus::Internship, 1);

        let series = ChartSeries::from(&counts);
        assert_eq!(series.labels, vec!["Disponible", "En Stage", "En Travail"]);
        assert_eq!(series.data, vec![3, 1, 0]);
    }
}
