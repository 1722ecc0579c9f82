//! Manager accounts and their sign-in sessions

use chrono::{DateTime, Utc};
use sea_orm::{
    sea_query::{Condition, Expr},
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set, SqlErr,
};
use tracing::debug;
use uuid::Uuid;

use crate::entities::session;
use crate::entities::user::{self, UserRole};
use crate::StoreError;

/// Emails are stored and compared lowercased
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Insert a user; a concurrent insert of the same email fails with
/// [`StoreError::DuplicateEmail`] through the unique index
pub async fn create_user<C: ConnectionTrait>(
    db: &C,
    email: &str,
    password_hash: &str,
    full_name: Option<String>,
    role: UserRole,
) -> Result<user::Model, StoreError> {
    let now = Utc::now();
    let email = normalize_email(email);

    let user = user::ActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set(email.clone()),
        password_hash: Set(password_hash.to_string()),
        full_name: Set(full_name),
        role: Set(role),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .map_err(|err| match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => StoreError::DuplicateEmail(email),
        _ => StoreError::Database(err),
    })?;

    debug!("Created user {} ({})", user.id, user.email);
    Ok(user)
}

pub async fn find_user<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<Option<user::Model>, StoreError> {
    Ok(user::Entity::find_by_id(id).one(db).await?)
}

pub async fn find_user_by_email<C: ConnectionTrait>(
    db: &C,
    email: &str,
) -> Result<Option<user::Model>, StoreError> {
    Ok(user::Entity::find()
        .filter(user::Column::Email.eq(normalize_email(email)))
        .one(db)
        .await?)
}

/// Change the role of an existing user, returning the updated row
pub async fn set_user_role<C: ConnectionTrait>(
    db: &C,
    user: user::Model,
    role: UserRole,
) -> Result<user::Model, StoreError> {
    if user.role == role {
        return Ok(user);
    }

    let mut active: user::ActiveModel = user.into();
    active.role = Set(role);
    active.updated_at = Set(Utc::now());
    Ok(active.update(db).await?)
}

pub async fn create_session<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
    expires_at: DateTime<Utc>,
) -> Result<session::Model, StoreError> {
    Ok(session::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        created_at: Set(Utc::now()),
        expires_at: Set(expires_at),
        revoked_at: Set(None),
    }
    .insert(db)
    .await?)
}

/// Mark a session revoked; returns false when it was unknown or already revoked
pub async fn revoke_session<C: ConnectionTrait>(
    db: &C,
    session_id: Uuid,
) -> Result<bool, StoreError> {
    let result = session::Entity::update_many()
        .col_expr(session::Column::RevokedAt, Expr::value(Utc::now()))
        .filter(session::Column::Id.eq(session_id))
        .filter(session::Column::RevokedAt.is_null())
        .exec(db)
        .await?;

    Ok(result.rows_affected > 0)
}

/// A session is active when it exists, is not revoked and has not expired
pub async fn is_session_active<C: ConnectionTrait>(
    db: &C,
    session_id: Uuid,
) -> Result<bool, StoreError> {
    let session = session::Entity::find_by_id(session_id).one(db).await?;

    Ok(session
        .map(|s| s.revoked_at.is_none() && s.expires_at > Utc::now())
        .unwrap_or(false))
}

/// Delete revoked and expired sessions, returning how many were removed
pub async fn purge_expired_sessions<C: ConnectionTrait>(
    db: &C,
    now: DateTime<Utc>,
) -> Result<u64, StoreError> {
    let result = session::Entity::delete_many()
        .filter(
            Condition::any()
                .add(session::Column::RevokedAt.is_not_null())
                .add(session::Column::ExpiresAt.lte(now)),
        )
        .exec(db)
        .await?;

    if result.rows_affected > 0 {
        debug!("Purged {} stale sessions", result.rows_affected);
    }
    Ok(result.rows_affected)
}
