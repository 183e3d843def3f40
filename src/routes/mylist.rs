use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::AuthUser;
use crate::error::{AppError, AppResult};
use crate::middleware::CurrentUser;
use crate::models::{ListEntry, NewListEntry, Profile};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ProfileQuery {
    pub profile_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct AddToListRequest {
    pub profile_id: Option<i64>,
    pub item_id: Option<i64>,
    pub title: Option<String>,
    pub poster_path: Option<String>,
    pub media_type: Option<String>,
}

/// Resolves the addressed profile, enforcing presence and ownership.
///
/// A missing id is a validation failure; a profile that does not exist
/// or belongs to another account is NotFound either way, so callers
/// cannot probe for foreign profile ids.
async fn resolve_profile(
    state: &AppState,
    auth: &AuthUser,
    profile_id: Option<i64>,
) -> AppResult<Profile> {
    let profile_id =
        profile_id.ok_or_else(|| AppError::Validation("profile_id is required".to_string()))?;

    state
        .store
        .find_profile(auth.id, profile_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))
}

/// Returns every list entry for the addressed profile, in insertion order
pub async fn get_list(
    State(state): State<AppState>,
    CurrentUser(auth): CurrentUser,
    Query(query): Query<ProfileQuery>,
) -> AppResult<Json<Vec<ListEntry>>> {
    let profile = resolve_profile(&state, &auth, query.profile_id).await?;
    let entries = state.store.list_entries(profile.id).await?;
    Ok(Json(entries))
}

/// Adds a catalog item to the addressed profile's list.
///
/// The duplicate pre-check exists for the friendly error; the store's
/// uniqueness constraint is the backstop when two adds race, and both
/// paths report the same Conflict.
pub async fn add_to_list(
    State(state): State<AppState>,
    CurrentUser(auth): CurrentUser,
    Json(request): Json<AddToListRequest>,
) -> AppResult<(StatusCode, Json<ListEntry>)> {
    let profile = resolve_profile(&state, &auth, request.profile_id).await?;

    let item_id = request
        .item_id
        .ok_or_else(|| AppError::Validation("item_id is required".to_string()))?;
    let title = request
        .title
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::Validation("title is required".to_string()))?;
    let poster_path = request
        .poster_path
        .filter(|p| !p.is_empty())
        .ok_or_else(|| AppError::Validation("poster_path is required".to_string()))?;

    if state.store.find_entry(profile.id, item_id).await?.is_some() {
        return Err(AppError::Conflict("Item already in list".to_string()));
    }

    let entry = state
        .store
        .add_entry(
            auth.id,
            profile.id,
            NewListEntry {
                item_id,
                title,
                poster_path,
                media_type: request.media_type,
            },
        )
        .await?;

    tracing::info!(profile_id = profile.id, item_id, "item added to list");
    Ok((StatusCode::CREATED, Json(entry)))
}

/// Removes a catalog item from the addressed profile's list
pub async fn remove_from_list(
    State(state): State<AppState>,
    CurrentUser(auth): CurrentUser,
    Path(item_id): Path<i64>,
    Query(query): Query<ProfileQuery>,
) -> AppResult<Json<Value>> {
    let profile = resolve_profile(&state, &auth, query.profile_id).await?;

    let removed = state.store.remove_entry(profile.id, item_id).await?;
    if !removed {
        return Err(AppError::NotFound("Item not found in list".to_string()));
    }

    tracing::info!(profile_id = profile.id, item_id, "item removed from list");
    Ok(Json(json!({ "message": "Item removed from list" })))
}
