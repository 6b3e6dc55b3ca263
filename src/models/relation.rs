use chrono::{DateTime, Utc};
use garde::Validate;
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, Row};
use strum::{Display, EnumString};
use uuid::Uuid;

use super::decode_enum;

/// Company-scoped tag on a worker.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, EnumString, Display, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RelationKind {
    Favorite,
    Blacklist,
}

#[derive(Debug, Clone, Serialize)]
pub struct WorkerRelation {
    pub company_id: Uuid,
    pub worker_id: Uuid,
    pub kind: RelationKind,
    pub note: Option<String>,
    pub worker_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, PgRow> for WorkerRelation {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            company_id: row.try_get("company_id")?,
            worker_id: row.try_get("worker_id")?,
            kind: decode_enum(row, "kind")?,
            note: row.try_get("note")?,
            worker_name: row.try_get("worker_name")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct SetRelationRequest {
    #[garde(skip)]
    pub kind: RelationKind,

    #[garde(length(max = 500))]
    pub note: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RelationFilter {
    pub kind: Option<RelationKind>,
}

/// Result of tagging a worker.
#[derive(Debug, Serialize)]
pub struct SetRelationResponse {
    pub relation: WorkerRelation,
    /// Open applications rejected because the worker was blacklisted.
    pub rejected_applications: u64,
}
