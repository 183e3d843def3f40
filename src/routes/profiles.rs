use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::{AppError, AppResult};
use crate::middleware::CurrentUser;
use crate::models::{Profile, ProfilePatch, MAX_PROFILE_NAME_LEN};
use crate::state::AppState;

// Request types

#[derive(Debug, Deserialize)]
pub struct CreateProfileRequest {
    pub name: Option<String>,
    pub avatar: Option<String>,
    pub preferences: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub avatar: Option<String>,
    pub preferences: Option<Value>,
}

/// Checks a display name against the length bound
fn validate_name(name: &str) -> AppResult<()> {
    if name.is_empty() {
        return Err(AppError::Validation("Profile name is required".to_string()));
    }
    if name.chars().count() > MAX_PROFILE_NAME_LEN {
        return Err(AppError::Validation(format!(
            "Profile name must be at most {} characters",
            MAX_PROFILE_NAME_LEN
        )));
    }
    Ok(())
}

/// Preference maps must be JSON objects
fn validate_preferences(preferences: &Value) -> AppResult<()> {
    if !preferences.is_object() {
        return Err(AppError::Validation(
            "preferences must be a JSON object".to_string(),
        ));
    }
    Ok(())
}

// Handlers

/// Lists all profiles owned by the caller, in insertion order
pub async fn list_profiles(
    State(state): State<AppState>,
    CurrentUser(auth): CurrentUser,
) -> AppResult<Json<Vec<Profile>>> {
    let profiles = state.store.list_profiles(auth.id).await?;
    Ok(Json(profiles))
}

/// Creates a profile owned by the caller.
///
/// The owner is always the authenticated account; any owner field a
/// client smuggles into the body is ignored.
pub async fn create_profile(
    State(state): State<AppState>,
    CurrentUser(auth): CurrentUser,
    Json(request): Json<CreateProfileRequest>,
) -> AppResult<(StatusCode, Json<Profile>)> {
    let name = request.name.as_deref().unwrap_or_default();
    validate_name(name)?;

    let preferences = request.preferences.unwrap_or_else(|| json!({}));
    validate_preferences(&preferences)?;

    let profile = state
        .store
        .create_profile(auth.id, name, request.avatar.as_deref(), preferences)
        .await?;

    tracing::info!(profile_id = profile.id, user_id = auth.id, "profile created");
    Ok((StatusCode::CREATED, Json(profile)))
}

/// Partially updates an owned profile; untouched fields keep their values
pub async fn update_profile(
    State(state): State<AppState>,
    CurrentUser(auth): CurrentUser,
    Path(profile_id): Path<i64>,
    Json(request): Json<UpdateProfileRequest>,
) -> AppResult<Json<Profile>> {
    if let Some(name) = request.name.as_deref() {
        validate_name(name)?;
    }
    if let Some(preferences) = &request.preferences {
        validate_preferences(preferences)?;
    }

    let patch = ProfilePatch {
        name: request.name,
        avatar: request.avatar,
        preferences: request.preferences,
    };

    let profile = state
        .store
        .update_profile(auth.id, profile_id, patch)
        .await?
        .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))?;

    Ok(Json(profile))
}

/// Deletes an owned profile along with its list entries
pub async fn delete_profile(
    State(state): State<AppState>,
    CurrentUser(auth): CurrentUser,
    Path(profile_id): Path<i64>,
) -> AppResult<Json<Value>> {
    let deleted = state.store.delete_profile(auth.id, profile_id).await?;
    if !deleted {
        return Err(AppError::NotFound("Profile not found".to_string()));
    }

    tracing::info!(profile_id, user_id = auth.id, "profile deleted");
    Ok(Json(json!({ "message": "Profile deleted successfully" })))
}
