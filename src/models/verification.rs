use chrono::{DateTime, Utc};
use garde::Validate;
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, Row};
use strum::{Display, EnumString};
use uuid::Uuid;

use super::decode_enum;

/// Status of an identity verification submission.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, EnumString, Display, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SubmissionStatus {
    Pending,
    Approved,
    Rejected,
}

/// The two photos captured by the verification wizard.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, EnumString, Display, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DocumentKind {
    IdCard,
    Selfie,
}

#[derive(Debug, Clone, Serialize)]
pub struct Verification {
    pub id: Uuid,
    pub worker_id: Uuid,
    #[serde(skip_serializing)]
    pub id_card_key: String,
    #[serde(skip_serializing)]
    pub selfie_key: String,
    pub status: SubmissionStatus,
    pub rejection_reason: Option<String>,
    pub screened_at: Option<DateTime<Utc>>,
    pub reviewed_by: Option<Uuid>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Verification {
    pub fn document_key(&self, kind: DocumentKind) -> &str {
        match kind {
            DocumentKind::IdCard => &self.id_card_key,
            DocumentKind::Selfie => &self.selfie_key,
        }
    }
}

impl<'r> FromRow<'r, PgRow> for Verification {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            worker_id: row.try_get("worker_id")?,
            id_card_key: row.try_get("id_card_key")?,
            selfie_key: row.try_get("selfie_key")?,
            status: decode_enum(row, "status")?,
            rejection_reason: row.try_get("rejection_reason")?,
            screened_at: row.try_get("screened_at")?,
            reviewed_by: row.try_get("reviewed_by")?,
            reviewed_at: row.try_get("reviewed_at")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReviewOutcome {
    Approve,
    Reject,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ReviewVerificationRequest {
    #[garde(skip)]
    pub outcome: ReviewOutcome,

    #[garde(length(min = 1, max = 500))]
    pub reason: Option<String>,
}

/// Response after submitting the verification wizard.
#[derive(Debug, Serialize)]
pub struct SubmitVerificationResponse {
    pub verification_id: Uuid,
    pub status: SubmissionStatus,
    pub message: String,
}
