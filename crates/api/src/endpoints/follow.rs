//! Follow endpoints.

use axum::{
    extract::{Path, Query, State},
    routing::{delete, get, post},
    Router,
};
use photogram_common::AppResult;
use photogram_core::FollowOutcome;
use serde::{Deserialize, Serialize};

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Follow status response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowStatusResponse {
    pub status: String,
    pub is_following: bool,
    pub is_requested: bool,
}

impl From<FollowOutcome> for FollowStatusResponse {
    fn from(outcome: FollowOutcome) -> Self {
        match outcome {
            FollowOutcome::Following => Self {
                status: "following".to_string(),
                is_following: true,
                is_requested: false,
            },
            FollowOutcome::Requested => Self {
                status: "requested".to_string(),
                is_following: false,
                is_requested: true,
            },
        }
    }
}

/// Follow a user, or request to follow a private account.
async fn request_follow(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<ApiResponse<FollowStatusResponse>> {
    let outcome = state.follow_service.request_follow(&user.id, &user_id).await?;

    Ok(ApiResponse::ok(outcome.into()))
}

/// Pagination params.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    #[serde(default = "default_limit")]
    pub limit: u64,
    pub until_id: Option<String>,
}

const fn default_limit() -> u64 {
    20
}

/// Pending follow request response item.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowRequestResponse {
    pub id: String,
    pub follower_id: String,
    pub followee_id: String,
    pub created_at: String,
}

impl From<photogram_db::entities::follow_request::Model> for FollowRequestResponse {
    fn from(r: photogram_db::entities::follow_request::Model) -> Self {
        Self {
            id: r.id,
            follower_id: r.follower_id,
            followee_id: r.followee_id,
            created_at: r.created_at.to_rfc3339(),
        }
    }
}

/// List pending follow requests received by the authenticated user.
async fn list_requests(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<ApiResponse<Vec<FollowRequestResponse>>> {
    let limit = query.limit.min(100);
    let requests = state
        .follow_service
        .get_pending_requests(&user.id, limit, query.until_id.as_deref())
        .await?;

    Ok(ApiResponse::ok(
        requests.into_iter().map(Into::into).collect(),
    ))
}

/// Accept a follow request.
async fn accept_request(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(request_id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    state.follow_service.accept_request(&user.id, &request_id).await?;
    Ok(ApiResponse::ok(()))
}

/// Decline a follow request.
async fn decline_request(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(request_id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    state.follow_service.decline_request(&user.id, &request_id).await?;
    Ok(ApiResponse::ok(()))
}

/// Cancel the authenticated user's pending request toward a user.
async fn cancel_request(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    state.follow_service.cancel_request(&user.id, &user_id).await?;
    Ok(ApiResponse::ok(()))
}

/// Unfollow a user.
async fn unfollow(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    state.follow_service.unfollow(&user.id, &user_id).await?;
    Ok(ApiResponse::ok(()))
}

/// Remove one of the authenticated user's followers.
async fn remove_follower(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    state.follow_service.remove_follower(&user.id, &user_id).await?;
    Ok(ApiResponse::ok(()))
}

/// Follow edge response item.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowEdgeResponse {
    pub id: String,
    pub follower_id: String,
    pub followee_id: String,
    pub created_at: String,
}

impl From<photogram_db::entities::follow::Model> for FollowEdgeResponse {
    fn from(f: photogram_db::entities::follow::Model) -> Self {
        Self {
            id: f.id,
            follower_id: f.follower_id,
            followee_id: f.followee_id,
            created_at: f.created_at.to_rfc3339(),
        }
    }
}

/// List followers of a user.
async fn list_followers(
    AuthUser(_user): AuthUser,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<PageQuery>,
) -> AppResult<ApiResponse<Vec<FollowEdgeResponse>>> {
    let limit = query.limit.min(100);
    let edges = state
        .follow_service
        .get_followers(&user_id, limit, query.until_id.as_deref())
        .await?;

    Ok(ApiResponse::ok(edges.into_iter().map(Into::into).collect()))
}

/// List users that a user follows.
async fn list_following(
    AuthUser(_user): AuthUser,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<PageQuery>,
) -> AppResult<ApiResponse<Vec<FollowEdgeResponse>>> {
    let limit = query.limit.min(100);
    let edges = state
        .follow_service
        .get_following(&user_id, limit, query.until_id.as_deref())
        .await?;

    Ok(ApiResponse::ok(edges.into_iter().map(Into::into).collect()))
}

/// Create the follow router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/request/{user_id}", post(request_follow))
        .route("/requests", get(list_requests))
        .route("/requests/{request_id}/accept", post(accept_request))
        .route("/requests/{request_id}/decline", post(decline_request))
        .route("/requests/{user_id}", delete(cancel_request))
        .route("/unfollow/{user_id}", delete(unfollow))
        .route("/followers/{user_id}", delete(remove_follower))
        .route("/{user_id}/followers", get(list_followers))
        .route("/{user_id}/following", get(list_following))
}
