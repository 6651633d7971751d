//! Runs against a live Postgres when `DATABASE_URL` is set; skipped otherwise.

use std::env;
use std::sync::Arc;

use chrono::NaiveDate;
use placement_backend::{
    error::ErrorKind,
    models::candidate::{
        Attachment, CandidateFilter, CandidatePatch, CandidateStatus, EmploymentDetails,
        InternshipDetails, NewCandidate, StatusTracking,
    },
    store::{CandidateStore, PgCandidateStore},
    AppState,
};
use sqlx::{postgres::PgPoolOptions, PgPool};
use uuid::Uuid;

async fn test_pool() -> Option<PgPool> {
    dotenvy::dotenv().ok();
    let Ok(url) = env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set; skipping Postgres store test");
        return None;
    };
    let pool = PgPoolOptions::new()
        .max_connections(4)
        .connect(&url)
        .await
        .expect("pool");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("migrations");
    Some(pool)
}

async fn seed_center(pool: &PgPool) -> (Uuid, Uuid) {
    let center_id = Uuid::new_v4();
    let filiere_id = Uuid::new_v4();
    sqlx::query("INSERT INTO centers (id, name) VALUES ($1, $2)")
        .bind(center_id)
        .bind(format!("Centre {}", center_id))
        .execute(pool)
        .await
        .expect("seed center");
    sqlx::query("INSERT INTO filieres (id, name, center_id) VALUES ($1, $2, $3)")
        .bind(filiere_id)
        .bind("Développement Full Stack")
        .bind(center_id)
        .execute(pool)
        .await
        .expect("seed filière");
    (center_id, filiere_id)
}

fn draft(name: &str, center_id: Uuid, filiere_id: Uuid) -> NewCandidate {
    NewCandidate {
        full_name: name.to_string(),
        linkedin: None,
        portfolio: None,
        filiere_id,
        center_id,
        cv: None,
        cover_letter: None,
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

fn internship() -> InternshipDetails {
    InternshipDetails {
        company: "Acme Corp".into(),
        title: "Stagiaire data".into(),
        start_date: date(2025, 2, 1),
        end_date: date(2025, 6, 30),
        internship_type: "PFE".into(),
    }
}

#[tokio::test]
async fn postgres_status_lifecycle_and_counts() {
    let Some(pool) = test_pool().await else { return };
    let (center_id, filiere_id) = seed_center(&pool).await;
    let state = AppState::from_store(Arc::new(PgCandidateStore::new(pool.clone())));

    let amina = state
        .candidate_service
        .create_candidate(draft("Amina", center_id, filiere_id))
        .await
        .unwrap();
    assert_eq!(amina.status_tracking, StatusTracking::Available);

    let staged = state
        .status_service
        .transition_to_internship(amina.id, internship())
        .await
        .unwrap();
    assert_eq!(staged.status_tracking, StatusTracking::Internship(internship()));

    let job = EmploymentDetails {
        company: "Acme Corp".into(),
        title: "Data analyst".into(),
        contract_type: "CDI".into(),
        start_date: date(2025, 9, 1),
    };
    let employed = state
        .status_service
        .transition_to_employment(amina.id, job.clone())
        .await
        .unwrap();
    assert_eq!(employed.status_tracking, StatusTracking::Employment(job));

    let stage_leftovers: i64 = sqlx::query_scalar(
        "SELECT num_nonnulls(stage_company, stage_title, stage_start_date, stage_end_date, stage_type)::BIGINT FROM candidates WHERE id = $1",
    )
    .bind(amina.id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(stage_leftovers, 0);

    state
        .candidate_service
        .create_candidate(draft("Youssef", center_id, filiere_id))
        .await
        .unwrap();
    let counts = state.stats_service.counts_for_center(center_id).await.unwrap();
    assert_eq!(counts.get(CandidateStatus::Available), 1);
    assert_eq!(counts.get(CandidateStatus::Internship), 0);
    assert_eq!(counts.get(CandidateStatus::Employment), 1);
    assert_eq!(counts.total(), 2);

    let rankings = state.stats_service.center_rankings().await.unwrap();
    let ours = rankings.iter().find(|c| c.center_id == center_id).unwrap();
    assert_eq!(ours.center_name, Some(format!("Centre {}", center_id)));
    assert_eq!(ours.performance, 1);
}

#[tokio::test]
async fn postgres_partial_update_keeps_attachments() {
    let Some(pool) = test_pool().await else { return };
    let (center_id, filiere_id) = seed_center(&pool).await;
    let store = PgCandidateStore::new(pool);

    let mut intake = draft("Amina", center_id, filiere_id);
    intake.cv = Some(Attachment {
        file_name: "amina_cv.pdf".into(),
        data: b"%PDF-1.7 original".to_vec(),
    });
    let created = store.insert(intake).await.unwrap();

    let updated = store
        .update(
            created.id,
            CandidatePatch {
                full_name: Some("Amina Trabelsi".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .expect("candidate exists");
    assert_eq!(updated.full_name, "Amina Trabelsi");
    assert_eq!(updated.cv, created.cv);
    assert_eq!(updated.cover_letter, None);

    assert!(store
        .update(Uuid::new_v4(), CandidatePatch::default())
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn postgres_rejects_inconsistent_rows_and_dangling_references() {
    let Some(pool) = test_pool().await else { return };
    let (center_id, filiere_id) = seed_center(&pool).await;
    let store = PgCandidateStore::new(pool.clone());
    let created = store
        .insert(draft("Karim", center_id, filiere_id))
        .await
        .unwrap();

    let mut reversed = internship();
    reversed.end_date = date(2025, 1, 1);
    let err = store
        .replace_status(created.id, StatusTracking::Internship(reversed))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let tag_only = sqlx::query("UPDATE candidates SET status = 'internship' WHERE id = $1")
        .bind(created.id)
        .execute(&pool)
        .await;
    assert!(tag_only.is_err());

    let stored = store.find(created.id).await.unwrap().unwrap();
    assert_eq!(stored.status_tracking, StatusTracking::Available);

    let err = store
        .insert(draft("Ghost", Uuid::new_v4(), filiere_id))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let center_delete = sqlx::query("DELETE FROM centers WHERE id = $1")
        .bind(center_id)
        .execute(&pool)
        .await;
    assert!(center_delete.is_err());
}

#[tokio::test]
async fn postgres_list_is_newest_first_and_delete_reports_absence() {
    let Some(pool) = test_pool().await else { return };
    let (center_id, filiere_id) = seed_center(&pool).await;
    let store = PgCandidateStore::new(pool);

    let first = store.insert(draft("First", center_id, filiere_id)).await.unwrap();
    let second = store.insert(draft("Second", center_id, filiere_id)).await.unwrap();

    let listed = store
        .list(CandidateFilter {
            center_id: Some(center_id),
            ..Default::default()
        })
        .await
        .unwrap();
    let ids: Vec<Uuid> = listed.iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![second.id, first.id]);

    assert!(store.delete(first.id).await.unwrap());
    assert!(!store.delete(first.id).await.unwrap());
    assert!(store.find(first.id).await.unwrap().is_none());
}
