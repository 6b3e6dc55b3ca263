use sqlx::{PgConnection, PgExecutor, PgPool, Row};
use uuid::Uuid;

use crate::models::profile::{
    CreateProfileRequest, Profile, Role, UpdateProfileRequest, VerificationStatus,
};

const PROFILE_COLUMNS: &str = r#"
    id, role, display_name, email, phone, bio, company_name, location,
    verification_status, created_at, updated_at
"#;

/// Insert the caller's profile at onboarding.
pub async fn create_profile(
    pool: &PgPool,
    id: Uuid,
    req: &CreateProfileRequest,
    fallback_email: Option<&str>,
) -> Result<Profile, sqlx::Error> {
    sqlx::query_as::<_, Profile>(&format!(
        r#"
        INSERT INTO profiles (id, role, display_name, email, phone, bio, company_name, location)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING {PROFILE_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(req.role.to_string())
    .bind(&req.display_name)
    .bind(req.email.as_deref().or(fallback_email))
    .bind(&req.phone)
    .bind(&req.bio)
    .bind(&req.company_name)
    .bind(&req.location)
    .fetch_one(pool)
    .await
}

pub async fn get_profile<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
) -> Result<Option<Profile>, sqlx::Error> {
    sqlx::query_as::<_, Profile>(&format!(
        "SELECT {PROFILE_COLUMNS} FROM profiles WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(executor)
    .await
}

/// Lock a profile row. Serializes everything that books a worker or
/// changes a company's tag on them. Taken after any shift lock.
pub async fn lock_profile(
    conn: &mut PgConnection,
    id: Uuid,
) -> Result<Option<Profile>, sqlx::Error> {
    sqlx::query_as::<_, Profile>(&format!(
        "SELECT {PROFILE_COLUMNS} FROM profiles WHERE id = $1 FOR UPDATE"
    ))
    .bind(id)
    .fetch_optional(conn)
    .await
}

/// Apply the fields present in `req`; absent fields keep their value.
pub async fn update_profile(
    pool: &PgPool,
    id: Uuid,
    req: &UpdateProfileRequest,
) -> Result<Option<Profile>, sqlx::Error> {
    sqlx::query_as::<_, Profile>(&format!(
        r#"
        UPDATE profiles
        SET display_name = COALESCE($2, display_name),
            email        = COALESCE($3, email),
            phone        = COALESCE($4, phone),
            bio          = COALESCE($5, bio),
            company_name = COALESCE($6, company_name),
            location     = COALESCE($7, location)
        WHERE id = $1
        RETURNING {PROFILE_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(&req.display_name)
    .bind(&req.email)
    .bind(&req.phone)
    .bind(&req.bio)
    .bind(&req.company_name)
    .bind(&req.location)
    .fetch_optional(pool)
    .await
}

pub async fn set_verification_status<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
    status: VerificationStatus,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE profiles SET verification_status = $2 WHERE id = $1")
        .bind(id)
        .bind(status.to_string())
        .execute(executor)
        .await?;
    Ok(())
}

pub async fn count_by_role(pool: &PgPool, role: Role) -> Result<i64, sqlx::Error> {
    let row = sqlx::query("SELECT COUNT(*) AS n FROM profiles WHERE role = $1")
        .bind(role.to_string())
        .fetch_one(pool)
        .await?;
    row.try_get("n")
}
