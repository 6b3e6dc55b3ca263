use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use garde::Validate;
use uuid::Uuid;

use super::extract::Caller;
use crate::app_state::AppState;
use crate::db;
use crate::error::AppError;
use crate::models::profile::Role;
use crate::models::relation::{
    RelationFilter, RelationKind, SetRelationRequest, SetRelationResponse, WorkerRelation,
};

/// PUT /api/v1/relations/{worker_id}
pub async fn set_relation(
    State(state): State<AppState>,
    caller: Caller,
    Path(worker_id): Path<Uuid>,
    Json(req): Json<SetRelationRequest>,
) -> Result<Json<SetRelationResponse>, AppError> {
    let company = caller.require(Role::Company)?;
    req.validate()?;

    let worker = db::profiles::get_profile(&state.db, worker_id)
        .await?
        .ok_or(AppError::NotFound("Worker"))?;
    if worker.role != Role::Worker {
        return Err(AppError::validation("Only workers can be tagged"));
    }

    // Same worker lock as apply, so no application slips past a blacklist.
    let mut tx = state.db.begin().await?;
    db::profiles::lock_profile(&mut tx, worker_id)
        .await?
        .ok_or(AppError::NotFound("Worker"))?;
    let relation = db::relations::upsert_relation(
        &mut tx,
        company.id,
        worker_id,
        req.kind,
        req.note.as_deref(),
    )
    .await?;

    let rejected_applications = match req.kind {
        RelationKind::Blacklist => {
            db::applications::reject_open_for_worker(&mut tx, company.id, worker_id).await?
        }
        RelationKind::Favorite => 0,
    };
    tx.commit().await?;

    metrics::counter!("worker_relations_set_total", "kind" => req.kind.to_string()).increment(1);
    tracing::info!(
        company_id = %company.id,
        worker_id = %worker_id,
        kind = %req.kind,
        rejected_applications,
        "Worker tagged"
    );

    Ok(Json(SetRelationResponse {
        relation,
        rejected_applications,
    }))
}

/// DELETE /api/v1/relations/{worker_id}
pub async fn remove_relation(
    State(state): State<AppState>,
    caller: Caller,
    Path(worker_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let company = caller.require(Role::Company)?;

    if !db::relations::delete_relation(&state.db, company.id, worker_id).await? {
        return Err(AppError::NotFound("Relation"));
    }

    tracing::info!(company_id = %company.id, worker_id = %worker_id, "Worker tag removed");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/relations
pub async fn list_relations(
    State(state): State<AppState>,
    caller: Caller,
    Query(filter): Query<RelationFilter>,
) -> Result<Json<Vec<WorkerRelation>>, AppError> {
    let company = caller.require(Role::Company)?;

    let relations = db::relations::list_relations(&state.db, company.id, filter.kind).await?;
    Ok(Json(relations))
}
