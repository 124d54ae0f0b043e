//! User endpoints.

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use photogram_common::AppResult;
use photogram_core::CreateUserInput;
use serde::{Deserialize, Serialize};

use crate::{
    extractors::{AuthUser, MaybeAuthUser},
    middleware::AppState,
    response::ApiResponse,
};

/// Registered user response (includes the API token, returned once).
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredUserResponse {
    pub id: String,
    pub username: String,
    pub token: Option<String>,
    pub created_at: String,
}

/// Register a new account.
async fn register(
    State(state): State<AppState>,
    Json(input): Json<CreateUserInput>,
) -> AppResult<ApiResponse<RegisteredUserResponse>> {
    let user = state.user_service.create(input).await?;

    Ok(ApiResponse::ok(RegisteredUserResponse {
        id: user.id,
        username: user.username,
        token: user.token,
        created_at: user.created_at.to_rfc3339(),
    }))
}

/// User profile response with computed counts and relationship state.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub id: String,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    pub is_private: bool,
    pub is_verified: bool,
    pub followers_count: u64,
    pub following_count: u64,
    pub is_following: bool,
    pub is_requested: bool,
    pub created_at: String,
}

/// Get a user profile.
///
/// Counts come straight from the edge table; `is_following` /
/// `is_requested` reflect the caller's relationship to the profile and
/// are both false for anonymous callers.
async fn get_profile(
    MaybeAuthUser(caller): MaybeAuthUser,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<ApiResponse<ProfileResponse>> {
    let user = state.user_service.get(&user_id).await?;

    let followers_count = state.follow_service.count_followers(&user.id).await?;
    let following_count = state.follow_service.count_following(&user.id).await?;

    let (is_following, is_requested) = match caller {
        Some(caller) if caller.id != user.id => {
            let following = state.follow_service.is_following(&caller.id, &user.id).await?;
            let requested = if following {
                false
            } else {
                state
                    .follow_service
                    .has_pending_request(&caller.id, &user.id)
                    .await?
            };
            (following, requested)
        }
        _ => (false, false),
    };

    Ok(ApiResponse::ok(ProfileResponse {
        id: user.id,
        username: user.username,
        full_name: user.full_name,
        bio: user.bio,
        avatar_url: user.avatar_url,
        is_private: user.is_private,
        is_verified: user.is_verified,
        followers_count,
        following_count,
        is_following,
        is_requested,
        created_at: user.created_at.to_rfc3339(),
    }))
}

/// Privacy update request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivacyRequest {
    pub is_private: bool,
}

/// Privacy state response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivacyResponse {
    pub is_private: bool,
}

/// Toggle the authenticated user's account privacy.
async fn set_privacy(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<PrivacyRequest>,
) -> AppResult<ApiResponse<PrivacyResponse>> {
    let updated = state.user_service.set_privacy(&user.id, req.is_private).await?;

    Ok(ApiResponse::ok(PrivacyResponse {
        is_private: updated.is_private,
    }))
}

/// Create the users router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(register))
        .route("/me/privacy", post(set_privacy))
        .route("/{user_id}", get(get_profile))
}
