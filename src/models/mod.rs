pub mod application;
pub mod dashboard;
pub mod payment;
pub mod profile;
pub mod relation;
pub mod review;
pub mod shift;
pub mod timesheet;
pub mod verification;

use garde::Validate;
use serde::Deserialize;
use sqlx::postgres::PgRow;
use sqlx::Row;
use std::str::FromStr;

pub const DEFAULT_PAGE_LIMIT: i64 = 20;

pub(crate) fn default_limit() -> i64 {
    DEFAULT_PAGE_LIMIT
}

/// Plain `limit`/`offset` query for lists without other filters.
#[derive(Debug, Clone, Copy, Deserialize, Validate)]
pub struct Page {
    #[serde(default = "default_limit")]
    #[garde(range(min = 1, max = 100))]
    pub limit: i64,

    #[serde(default)]
    #[garde(range(min = 0))]
    pub offset: i64,
}

/// Read a TEXT status column into its enum.
pub(crate) fn decode_enum<T: FromStr>(row: &PgRow, column: &str) -> Result<T, sqlx::Error> {
    let raw: String = row.try_get(column)?;
    parse_column(column, &raw)
}

/// Nullable variant of [`decode_enum`].
pub(crate) fn decode_optional_enum<T: FromStr>(
    row: &PgRow,
    column: &str,
) -> Result<Option<T>, sqlx::Error> {
    let raw: Option<String> = row.try_get(column)?;
    raw.map(|raw| parse_column(column, &raw)).transpose()
}

pub(crate) fn parse_column<T: FromStr>(column: &str, raw: &str) -> Result<T, sqlx::Error> {
    raw.parse().map_err(|_| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: format!("unknown value {raw:?}").into(),
    })
}
