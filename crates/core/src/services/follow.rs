//! Follow service.
//!
//! Coordinates the follow graph, the follow-request lifecycle, and the
//! notification side effects as one logical unit.

use crate::services::notification::NotificationService;
use photogram_common::{AppError, AppResult, IdGenerator};
use photogram_db::{
    entities::{
        follow, follow_request,
        follow_request::RequestStatus,
        notification::NotificationType,
    },
    repositories::{FollowRepository, FollowRequestRepository, UserRepository},
};
use sea_orm::Set;

/// Result of a follow operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowOutcome {
    /// The actor is now following the target (public account).
    Following,
    /// A follow request was created (target is a private account).
    Requested,
}

/// Follow service for business logic.
///
/// Every operation validates against current state before mutating, and
/// relies on the store's unique constraints as the arbiter for concurrent
/// writers on the same pair. Notification emission is best-effort: a
/// failure there is logged and never rolls back the graph mutation.
#[derive(Clone)]
pub struct FollowService {
    follow_repo: FollowRepository,
    follow_request_repo: FollowRequestRepository,
    user_repo: UserRepository,
    notifications: NotificationService,
    id_gen: IdGenerator,
}

impl FollowService {
    /// Create a new follow service.
    #[must_use]
    pub const fn new(
        follow_repo: FollowRepository,
        follow_request_repo: FollowRequestRepository,
        user_repo: UserRepository,
        notifications: NotificationService,
    ) -> Self {
        Self {
            follow_repo,
            follow_request_repo,
            user_repo,
            notifications,
            id_gen: IdGenerator::new(),
        }
    }

    /// Follow a user, or request to follow a private account.
    ///
    /// Public targets get an edge immediately; private targets get a
    /// pending follow request. The returned [`FollowOutcome`] tells the
    /// caller which happened.
    pub async fn request_follow(
        &self,
        actor_id: &str,
        target_id: &str,
    ) -> AppResult<FollowOutcome> {
        if actor_id == target_id {
            return Err(AppError::InvalidOperation(
                "cannot follow yourself".to_string(),
            ));
        }

        // Target must resolve to an active account
        let target = self.user_repo.get_active(target_id).await?;

        if self.follow_repo.exists(actor_id, target_id).await? {
            return Err(AppError::AlreadyFollowing);
        }

        if target.is_private {
            if self
                .follow_request_repo
                .has_pending(actor_id, target_id)
                .await?
            {
                return Err(AppError::DuplicateRequest);
            }

            let model = follow_request::ActiveModel {
                id: Set(self.id_gen.generate()),
                follower_id: Set(actor_id.to_string()),
                followee_id: Set(target_id.to_string()),
                status: Set(RequestStatus::Pending),
                created_at: Set(chrono::Utc::now().into()),
                updated_at: Set(None),
            };

            // A concurrent duplicate loses the race inside the store and
            // surfaces here as DuplicateRequest.
            let request = self.follow_request_repo.create(model).await?;

            self.emit(
                target_id,
                actor_id,
                NotificationType::FollowRequest,
                Some(&request.id),
                "requested to follow you",
            )
            .await;

            return Ok(FollowOutcome::Requested);
        }

        self.create_edge(actor_id, target_id).await?;

        self.emit(
            target_id,
            actor_id,
            NotificationType::Follow,
            None,
            "started following you",
        )
        .await;

        Ok(FollowOutcome::Following)
    }

    /// Accept a follow request addressed to `target_id`.
    ///
    /// Accepting an already-accepted request is a no-op so a retry after a
    /// partial failure never errors or creates a second edge.
    pub async fn accept_request(&self, target_id: &str, request_id: &str) -> AppResult<()> {
        let request = self
            .follow_request_repo
            .find_by_id(request_id)
            .await?
            .ok_or_else(|| AppError::RequestNotFound(request_id.to_string()))?;

        if request.followee_id != target_id {
            return Err(AppError::Forbidden(
                "request is addressed to another user".to_string(),
            ));
        }

        match request.status {
            RequestStatus::Accepted => return Ok(()),
            RequestStatus::Declined => {
                return Err(AppError::InvalidState(
                    "request was already declined".to_string(),
                ));
            }
            RequestStatus::Pending => {}
        }

        // Edge first: if the status update below fails, a retried accept
        // finds the edge already present and short-circuits.
        match self
            .create_edge(&request.follower_id, &request.followee_id)
            .await
        {
            Ok(()) | Err(AppError::AlreadyFollowing) => {}
            Err(e) => return Err(e),
        }

        // The transition is conditional on the row still being pending;
        // a concurrent resolver winning the race leaves nothing to update.
        let transitioned = self
            .follow_request_repo
            .resolve_pending(request_id, RequestStatus::Accepted)
            .await?;

        if !transitioned {
            let current = self
                .follow_request_repo
                .find_by_id(request_id)
                .await?
                .ok_or_else(|| AppError::RequestNotFound(request_id.to_string()))?;

            return match current.status {
                // The concurrent accept already emitted the notification.
                RequestStatus::Accepted => Ok(()),
                _ => Err(AppError::InvalidState(
                    "request was already declined".to_string(),
                )),
            };
        }

        self.emit(
            &request.follower_id,
            target_id,
            NotificationType::FollowAccept,
            Some(request_id),
            "accepted your follow request",
        )
        .await;

        Ok(())
    }

    /// Decline a follow request addressed to `target_id`.
    ///
    /// Idempotent: declining a missing or already-declined request
    /// succeeds. No edge is created and no notification is sent.
    pub async fn decline_request(&self, target_id: &str, request_id: &str) -> AppResult<()> {
        let Some(request) = self.follow_request_repo.find_by_id(request_id).await? else {
            return Ok(());
        };

        if request.followee_id != target_id {
            return Err(AppError::Forbidden(
                "request is addressed to another user".to_string(),
            ));
        }

        match request.status {
            RequestStatus::Declined => Ok(()),
            RequestStatus::Accepted => Err(AppError::InvalidState(
                "request was already accepted".to_string(),
            )),
            RequestStatus::Pending => {
                let transitioned = self
                    .follow_request_repo
                    .resolve_pending(request_id, RequestStatus::Declined)
                    .await?;

                if !transitioned {
                    // Lost a race with a concurrent resolver.
                    let current = self.follow_request_repo.find_by_id(request_id).await?;
                    if matches!(
                        current.map(|r| r.status),
                        Some(RequestStatus::Accepted)
                    ) {
                        return Err(AppError::InvalidState(
                            "request was already accepted".to_string(),
                        ));
                    }
                }

                Ok(())
            }
        }
    }

    /// Cancel the actor's own pending follow request toward `target_id`.
    ///
    /// Never errors on "nothing to cancel".
    pub async fn cancel_request(&self, actor_id: &str, target_id: &str) -> AppResult<()> {
        let removed = self
            .follow_request_repo
            .delete_if_pending(actor_id, target_id)
            .await?;

        if !removed {
            tracing::debug!(actor_id, target_id, "No pending request to cancel");
        }

        Ok(())
    }

    /// Unfollow a user.
    ///
    /// Succeeds whether or not an edge existed ("end state achieved").
    /// Counts are computed from the edge table, so the deletion is the
    /// whole operation.
    pub async fn unfollow(&self, actor_id: &str, target_id: &str) -> AppResult<()> {
        let removed = self.follow_repo.delete_by_pair(actor_id, target_id).await?;

        if !removed {
            tracing::debug!(actor_id, target_id, "Unfollow of an absent edge");
        }

        Ok(())
    }

    /// Remove one of the actor's own followers.
    ///
    /// Deletes the reverse edge (follower -> actor); same idempotent
    /// semantics as [`Self::unfollow`].
    pub async fn remove_follower(&self, actor_id: &str, follower_id: &str) -> AppResult<()> {
        let removed = self.follow_repo.delete_by_pair(follower_id, actor_id).await?;

        if !removed {
            tracing::debug!(actor_id, follower_id, "Removal of an absent follower");
        }

        Ok(())
    }

    /// Check if a user is following another.
    pub async fn is_following(&self, follower_id: &str, followee_id: &str) -> AppResult<bool> {
        self.follow_repo.exists(follower_id, followee_id).await
    }

    /// Check if a user has a pending follow request toward another.
    pub async fn has_pending_request(
        &self,
        follower_id: &str,
        followee_id: &str,
    ) -> AppResult<bool> {
        self.follow_request_repo
            .has_pending(follower_id, followee_id)
            .await
    }

    /// Get followers of a user (paginated).
    pub async fn get_followers(
        &self,
        user_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<follow::Model>> {
        self.follow_repo.find_followers(user_id, limit, until_id).await
    }

    /// Get users that a user is following (paginated).
    pub async fn get_following(
        &self,
        user_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<follow::Model>> {
        self.follow_repo.find_following(user_id, limit, until_id).await
    }

    /// Count followers of a user (computed from the edge table).
    pub async fn count_followers(&self, user_id: &str) -> AppResult<u64> {
        self.follow_repo.count_followers(user_id).await
    }

    /// Count users that a user is following.
    pub async fn count_following(&self, user_id: &str) -> AppResult<u64> {
        self.follow_repo.count_following(user_id).await
    }

    /// Get pending follow requests received by a user (paginated).
    pub async fn get_pending_requests(
        &self,
        user_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<follow_request::Model>> {
        self.follow_request_repo
            .find_received_pending(user_id, limit, until_id)
            .await
    }

    /// Create a follow edge.
    async fn create_edge(&self, follower_id: &str, followee_id: &str) -> AppResult<()> {
        let model = follow::ActiveModel {
            id: Set(self.id_gen.generate()),
            follower_id: Set(follower_id.to_string()),
            followee_id: Set(followee_id.to_string()),
            created_at: Set(chrono::Utc::now().into()),
        };

        self.follow_repo.create(model).await?;
        Ok(())
    }

    /// Emit a notification, logging and swallowing any failure.
    async fn emit(
        &self,
        recipient_id: &str,
        sender_id: &str,
        notification_type: NotificationType,
        content_id: Option<&str>,
        message: &str,
    ) {
        if let Err(e) = self
            .notifications
            .notify(
                recipient_id,
                sender_id,
                notification_type,
                content_id,
                Some(message),
            )
            .await
        {
            tracing::warn!(error = %e, recipient_id, "Failed to emit notification");
        }
    }
}
