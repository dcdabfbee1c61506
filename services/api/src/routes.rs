//! API service routes

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use common::models::{ApiResponse, CreateUserRequest, UpdateUserRequest, User};
use serde_json::json;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};

/// Create the router for the API service
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/users", post(create_user).get(get_users))
        .route(
            "/users/:id",
            get(get_user).put(update_user).delete(delete_user),
        )
        .fallback(route_not_found)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "api-service"
    }))
}

async fn route_not_found() -> ApiError {
    ApiError::NotFound("Route not found".to_string())
}

/// Create a new user
pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<ApiResponse<User>>)> {
    let Json(payload) = payload?;
    let user = state
        .user_service
        .create(payload)
        .await
        .map_err(|e| ApiError::from_service(e, "Failed to create user"))?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok("User created successfully", user)),
    ))
}

/// Get all users, newest first
pub async fn get_users(State(state): State<AppState>) -> ApiResult<Json<ApiResponse<Vec<User>>>> {
    let users = state
        .user_service
        .find_all()
        .await
        .map_err(|e| ApiError::from_service(e, "Failed to retrieve users"))?;

    Ok(Json(ApiResponse::ok("Users retrieved successfully", users)))
}

/// Get a user by ID
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<User>>> {
    let user = state
        .user_service
        .find_one(&id)
        .await
        .map_err(|e| ApiError::from_service(e, "Failed to retrieve user"))?
        .ok_or_else(ApiError::user_not_found)?;

    Ok(Json(ApiResponse::ok("User retrieved successfully", user)))
}

/// Partially update a user
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> ApiResult<Json<ApiResponse<User>>> {
    let Json(payload) = payload?;
    let user = state
        .user_service
        .update(&id, payload)
        .await
        .map_err(|e| ApiError::from_service(e, "Failed to update user"))?
        .ok_or_else(ApiError::user_not_found)?;

    Ok(Json(ApiResponse::ok("User updated successfully", user)))
}

/// Delete a user
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<()>>> {
    let deleted = state
        .user_service
        .remove(&id)
        .await
        .map_err(|e| ApiError::from_service(e, "Failed to delete user"))?;

    if deleted {
        Ok(Json(ApiResponse::message("User deleted successfully")))
    } else {
        Err(ApiError::user_not_found())
    }
}
