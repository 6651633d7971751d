use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Training track. Always owned by one center.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Filiere {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub center_id: Uuid,
}
