use sqlx::{PgConnection, PgExecutor, PgPool};
use uuid::Uuid;

use crate::models::parse_column;
use crate::models::relation::{RelationKind, WorkerRelation};

/// Insert or replace the company's tag on a worker.
pub async fn upsert_relation(
    conn: &mut PgConnection,
    company_id: Uuid,
    worker_id: Uuid,
    kind: RelationKind,
    note: Option<&str>,
) -> Result<WorkerRelation, sqlx::Error> {
    sqlx::query_as::<_, WorkerRelation>(
        r#"
        WITH upserted AS (
            INSERT INTO worker_relations (company_id, worker_id, kind, note)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (company_id, worker_id)
            DO UPDATE SET kind = EXCLUDED.kind, note = EXCLUDED.note
            RETURNING company_id, worker_id, kind, note, created_at, updated_at
        )
        SELECT u.company_id, u.worker_id, u.kind, u.note, u.created_at, u.updated_at,
               p.display_name AS worker_name
        FROM upserted u
        JOIN profiles p ON p.id = u.worker_id
        "#,
    )
    .bind(company_id)
    .bind(worker_id)
    .bind(kind.to_string())
    .bind(note)
    .fetch_one(conn)
    .await
}

/// Remove a tag. Returns whether one existed.
pub async fn delete_relation(
    pool: &PgPool,
    company_id: Uuid,
    worker_id: Uuid,
) -> Result<bool, sqlx::Error> {
    let result =
        sqlx::query("DELETE FROM worker_relations WHERE company_id = $1 AND worker_id = $2")
            .bind(company_id)
            .bind(worker_id)
            .execute(pool)
            .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn list_relations(
    pool: &PgPool,
    company_id: Uuid,
    kind: Option<RelationKind>,
) -> Result<Vec<WorkerRelation>, sqlx::Error> {
    sqlx::query_as::<_, WorkerRelation>(
        r#"
        SELECT wr.company_id, wr.worker_id, wr.kind, wr.note, wr.created_at, wr.updated_at,
               p.display_name AS worker_name
        FROM worker_relations wr
        JOIN profiles p ON p.id = wr.worker_id
        WHERE wr.company_id = $1
          AND ($2::TEXT IS NULL OR wr.kind = $2)
        ORDER BY wr.kind, p.display_name
        "#,
    )
    .bind(company_id)
    .bind(kind.map(|k| k.to_string()))
    .fetch_all(pool)
    .await
}

pub async fn relation_kind<'e>(
    executor: impl PgExecutor<'e>,
    company_id: Uuid,
    worker_id: Uuid,
) -> Result<Option<RelationKind>, sqlx::Error> {
    let kind: Option<String> = sqlx::query_scalar(
        "SELECT kind FROM worker_relations WHERE company_id = $1 AND worker_id = $2",
    )
    .bind(company_id)
    .bind(worker_id)
    .fetch_optional(executor)
    .await?;

    kind.map(|raw| parse_column("kind", &raw)).transpose()
}
