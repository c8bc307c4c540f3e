use axum::{extract::State, response::Json};
use tracing::debug;

use crate::app::AppState;
use crate::auth::jwt::AuthUser;
use crate::auth::password::spawn_hash_password;
use crate::dao::user::{NewUser, UserDao};
use crate::handlers::error::ApiError;
use crate::handlers::extract::{JsonBody, Path, Query};
use crate::schema::user::{validate_profile, Pagination, UserCreate, UserResponse, UserUpdate};

const USER_NOT_FOUND: &str = "User not found";
const EMAIL_TAKEN: &str = "Email already registered";

pub async fn list_users(
    State(state): State<AppState>,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let db = state.db.lock().await;
    let users = UserDao
        .list_users(&db, page.skip, page.limit())
        .await
        .map_err(|err| ApiError::internal("failed to fetch users", err))?;

    debug!("Listing {} users (skip {})", users.len(), page.skip);

    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// The user the bearer token was issued to.
pub async fn current_user(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> Result<Json<UserResponse>, ApiError> {
    let db = state.db.lock().await;
    let user = UserDao
        .get_user_by_email(&db, &claims.sub)
        .await
        .map_err(|err| ApiError::internal("failed to fetch user", err))?
        .ok_or_else(|| ApiError::Unauthorized("Could not validate credentials".to_string()))?;

    if !user.is_active {
        return Err(ApiError::BadRequest("Inactive user".to_string()));
    }

    Ok(Json(user.into()))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<UserResponse>, ApiError> {
    let db = state.db.lock().await;
    let user = UserDao
        .get_user(&db, user_id)
        .await
        .map_err(|err| ApiError::internal("failed to fetch user", err))?
        .ok_or_else(|| ApiError::NotFound(USER_NOT_FOUND.to_string()))?;

    Ok(Json(user.into()))
}

pub async fn create_user(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<UserCreate>,
) -> Result<Json<UserResponse>, ApiError> {
    validate_profile(&payload.name, &payload.email).map_err(ApiError::BadRequest)?;
    if payload.password.is_empty() {
        return Err(ApiError::BadRequest("password must not be empty".to_string()));
    }

    // argon2 runs on the blocking pool, outside the db lock.
    let hashed_password = spawn_hash_password(payload.password)
        .await
        .map_err(|err| ApiError::internal("failed to create user", err))?;

    let db = state.db.lock().await;

    let existing = UserDao
        .get_user_by_email(&db, &payload.email)
        .await
        .map_err(|err| ApiError::internal("failed to create user", err))?;
    if existing.is_some() {
        return Err(ApiError::BadRequest(EMAIL_TAKEN.to_string()));
    }

    let user = UserDao
        .create_user(
            &db,
            NewUser {
                name: &payload.name,
                email: &payload.email,
                is_active: payload.is_active,
                is_admin: payload.is_admin,
                role: &payload.role,
            },
            &hashed_password,
        )
        .await
        .map_err(|err| ApiError::internal("failed to create user", err))?;

    Ok(Json(user.into()))
}

pub async fn update_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    JsonBody(payload): JsonBody<UserUpdate>,
) -> Result<Json<UserResponse>, ApiError> {
    validate_profile(&payload.name, &payload.email).map_err(ApiError::BadRequest)?;

    let hashed_password = match payload.password {
        Some(password) if password.is_empty() => {
            return Err(ApiError::BadRequest("password must not be empty".to_string()))
        }
        Some(password) => Some(
            spawn_hash_password(password)
                .await
                .map_err(|err| ApiError::internal("failed to update user", err))?,
        ),
        None => None,
    };

    let db = state.db.lock().await;

    let owner = UserDao
        .get_user_by_email(&db, &payload.email)
        .await
        .map_err(|err| ApiError::internal("failed to update user", err))?;
    if owner.is_some_and(|owner| owner.id != user_id) {
        return Err(ApiError::BadRequest(EMAIL_TAKEN.to_string()));
    }

    let user = UserDao
        .update_user(
            &db,
            user_id,
            NewUser {
                name: &payload.name,
                email: &payload.email,
                is_active: payload.is_active,
                is_admin: payload.is_admin,
                role: &payload.role,
            },
            hashed_password.as_deref(),
        )
        .await
        .map_err(|err| ApiError::internal("failed to update user", err))?
        .ok_or_else(|| ApiError::NotFound(USER_NOT_FOUND.to_string()))?;

    Ok(Json(user.into()))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<UserResponse>, ApiError> {
    let db = state.db.lock().await;
    let user = UserDao
        .delete_user(&db, user_id)
        .await
        .map_err(|err| ApiError::internal("failed to delete user", err))?
        .ok_or_else(|| ApiError::NotFound(USER_NOT_FOUND.to_string()))?;

    Ok(Json(user.into()))
}
