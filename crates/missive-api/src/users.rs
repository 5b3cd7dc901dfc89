use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
use axum::{
    Json,
    extract::{Path, State},
};
use axum_extra::extract::WithRejection;
use rand_core::OsRng;
use tracing::info;
use uuid::Uuid;

use missive_types::api::{
    CreateUserRequest, DeletedResponse, UpdateUserRequest, UserListResponse, UserResponse,
};

use crate::error::{ApiError, require_non_empty};
use crate::state::{AppState, run_blocking};

/// GET /users
pub async fn list_users(State(state): State<AppState>) -> Result<Json<UserListResponse>, ApiError> {
    let users = run_blocking(&state, |db| {
        let rows = db.list_users()?;
        let mut lists = db.get_all_user_message_ids()?;
        Ok(rows
            .into_iter()
            .map(|row| {
                let messages = lists.remove(&row.id).unwrap_or_default();
                row.into_user(messages)
            })
            .collect::<Vec<_>>())
    })
    .await?;

    Ok(Json(UserListResponse { users }))
}

/// GET /users/{user_id}. An unknown id answers `{user: null}`.
pub async fn get_user(
    State(state): State<AppState>,
    WithRejection(Path(user_id), _): WithRejection<Path<String>, ApiError>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = run_blocking(&state, move |db| {
        let Some(row) = db.get_user_by_id(&user_id)? else {
            return Ok(None);
        };
        let messages = db.get_user_message_ids(&row.id)?;
        Ok(Some(row.into_user(messages)))
    })
    .await?;

    Ok(Json(UserResponse { user }))
}

/// POST /users
pub async fn create_user(
    State(state): State<AppState>,
    WithRejection(Json(req), _): WithRejection<Json<CreateUserRequest>, ApiError>,
) -> Result<Json<UserResponse>, ApiError> {
    require_non_empty("username", &req.username)?;
    require_non_empty("password", &req.password)?;
    if let Some(id) = &req.id {
        require_non_empty("_id", id)?;
    }

    let user_id = req.id.unwrap_or_else(|| Uuid::new_v4().to_string());
    let username = req.username;

    let id = user_id.clone();
    let user = run_blocking(&state, move |db| {
        let password_hash = hash_password(&req.password)?;
        db.create_user(&id, &username, &password_hash)?;
        db.get_user_by_id(&id)
    })
    .await?
    .ok_or_else(|| ApiError::Internal(format!("User {} vanished after insert", user_id)))?;

    info!("User {} created", user.username);
    Ok(Json(UserResponse {
        user: Some(user.into_user(Vec::new())),
    }))
}

/// PUT /users/{user_id}. A new password is re-hashed before it is stored.
pub async fn update_user(
    State(state): State<AppState>,
    WithRejection(Path(user_id), _): WithRejection<Path<String>, ApiError>,
    WithRejection(Json(req), _): WithRejection<Json<UpdateUserRequest>, ApiError>,
) -> Result<Json<UserResponse>, ApiError> {
    if let Some(username) = &req.username {
        require_non_empty("username", username)?;
    }
    if let Some(password) = &req.password {
        require_non_empty("password", password)?;
    }

    let user = run_blocking(&state, move |db| {
        let password_hash = req.password.as_deref().map(hash_password).transpose()?;
        db.update_user(&user_id, req.username.as_deref(), password_hash.as_deref())?;

        let Some(row) = db.get_user_by_id(&user_id)? else {
            return Ok(None);
        };
        let messages = db.get_user_message_ids(&row.id)?;
        Ok(Some(row.into_user(messages)))
    })
    .await?;

    Ok(Json(UserResponse { user }))
}

/// DELETE /users/{user_id}. Messages the user wrote are kept.
pub async fn delete_user(
    State(state): State<AppState>,
    WithRejection(Path(user_id), _): WithRejection<Path<String>, ApiError>,
) -> Result<Json<DeletedResponse>, ApiError> {
    let id = user_id.clone();
    let deleted = run_blocking(&state, move |db| db.delete_user(&id)).await?;
    if !deleted {
        return Err(ApiError::NotFound("User does not exist.".into()));
    }

    info!("User {} deleted", user_id);
    Ok(Json(DeletedResponse {
        message: "Successfully deleted.",
        id: user_id,
    }))
}

/// Argon2id PHC string with a fresh salt.
fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Password hashing failed: {}", e))?;
    Ok(hash.to_string())
}
