pub mod candidate_routes;
pub mod extract;
pub mod health;
pub mod stats;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::AppState;

pub fn build_router(state: AppState, max_body_bytes: usize) -> Router {
    let candidate_api = Router::new()
        .route(
            "/api/candidates",
            get(candidate_routes::list_candidates).post(candidate_routes::create_candidate),
        )
        .route(
            "/api/candidates/:id",
            get(candidate_routes::get_candidate)
                .put(candidate_routes::update_candidate)
                .delete(candidate_routes::delete_candidate),
        )
        .route("/api/candidates/:id/cv", get(candidate_routes::download_cv))
        .route(
            "/api/candidates/:id/cover",
            get(candidate_routes::download_cover_letter),
        )
        .route("/api/candidates/:id/stage", put(candidate_routes::set_internship))
        .route("/api/candidates/:id/job", put(candidate_routes::set_employment))
        .route(
            "/api/candidates/:id/available",
            put(candidate_routes::set_available),
        );

    let stats_api = Router::new()
        .route("/api/stats/centers", get(stats::center_rankings))
        .route("/api/stats/center/:center_id", get(stats::center_statistics))
        .route("/api/stats/center/:center_id/chart", get(stats::center_chart));

    Router::new()
        .route("/health", get(health::health))
        .merge(candidate_api)
        .merge(stats_api)
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(max_body_bytes))
}
