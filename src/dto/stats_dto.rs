use serde::Serialize;
use uuid::Uuid;

use crate::models::stats::{CenterStats, ChartSeries, StatusCounts};

pub const CHART_DATASET_LABEL: &str = "Nombre de candidats";

#[derive(Debug, Serialize)]
pub struct CenterStatisticsResponse {
    pub center: Uuid,
    pub statistics: StatusCounts,
}

#[derive(Debug, Serialize)]
pub struct ChartDataset {
    pub label: &'static str,
    pub data: Vec<i64>,
}

/// Chart.js-shaped payload: one dataset aligned with `labels`.
#[derive(Debug, Serialize)]
pub struct ChartResponse {
    pub labels: Vec<String>,
    pub datasets: Vec<ChartDataset>,
}

impl From<ChartSeries> for ChartResponse {
    fn from(series: ChartSeries) -> Self {
        Self {
            labels: series.labels,
            datasets: vec![ChartDataset {
                label: CHART_DATASET_LABEL,
                data: series.data,
            }],
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CenterRankingsResponse {
    pub centers: Vec<CenterStats>,
}
