use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::dto::stats_dto::{CenterRankingsResponse, CenterStatisticsResponse, ChartResponse};
use crate::{error::Result, AppState};

pub async fn center_statistics(
    State(state): State<AppState>,
    Path(center_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let statistics = state.stats_service.counts_for_center(center_id).await?;
    Ok(Json(CenterStatisticsResponse {
        center: center_id,
        statistics,
    }))
}

pub async fn center_chart(
    State(state): State<AppState>,
    Path(center_id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let series = state.stats_service.chart_series_for_center(center_id).await?;
    Ok(Json(ChartResponse::from(series)))
}

pub async fn center_rankings(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let centers = state.stats_service.center_rankings().await?;
    Ok(Json(CenterRankingsResponse { centers }))
}
