//! Notification service.

use photogram_common::{AppResult, IdGenerator};
use photogram_db::{
    entities::notification::{self, NotificationType},
    repositories::{NotificationRepository, UserRepository},
};
use sea_orm::Set;

/// Notification service for business logic.
///
/// Appending is fire-and-forget from the caller's perspective: a
/// self-notification or a notification addressed to a missing/inactive
/// recipient is dropped silently (returns `None`), never an error.
#[derive(Clone)]
pub struct NotificationService {
    notification_repo: NotificationRepository,
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

impl NotificationService {
    /// Create a new notification service.
    #[must_use]
    pub const fn new(notification_repo: NotificationRepository, user_repo: UserRepository) -> Self {
        Self {
            notification_repo,
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Append a notification to the recipient's log.
    ///
    /// Returns `None` when the notification was dropped (self-notification
    /// or inactive recipient) and the created row otherwise.
    pub async fn notify(
        &self,
        recipient_id: &str,
        sender_id: &str,
        notification_type: NotificationType,
        content_id: Option<&str>,
        message: Option<&str>,
    ) -> AppResult<Option<notification::Model>> {
        // Never notify yourself
        if recipient_id == sender_id {
            return Ok(None);
        }

        // Drop notifications to missing or inactive recipients
        if self.user_repo.find_active(recipient_id).await?.is_none() {
            tracing::debug!(
                recipient_id,
                kind = notification_type.as_str(),
                "Dropping notification to inactive recipient"
            );
            return Ok(None);
        }

        let model = notification::ActiveModel {
            id: Set(self.id_gen.generate()),
            recipient_id: Set(recipient_id.to_string()),
            sender_id: Set(sender_id.to_string()),
            notification_type: Set(notification_type),
            content_id: Set(content_id.map(std::string::ToString::to_string)),
            message: Set(message.map(std::string::ToString::to_string)),
            is_read: Set(false),
            read_at: Set(None),
            created_at: Set(chrono::Utc::now().into()),
        };

        let notification = self.notification_repo.create(model).await?;
        Ok(Some(notification))
    }

    /// Get notifications for a user.
    pub async fn list(
        &self,
        user_id: &str,
        limit: u64,
        until_id: Option<&str>,
        unread_only: bool,
    ) -> AppResult<Vec<notification::Model>> {
        self.notification_repo
            .find_by_recipient(user_id, limit, until_id, unread_only)
            .await
    }

    /// Mark a notification as read.
    ///
    /// Only the recipient may flip the read flag; a notification owned by
    /// someone else is left untouched.
    pub async fn mark_as_read(&self, user_id: &str, notification_id: &str) -> AppResult<()> {
        let notification = self.notification_repo.find_by_id(notification_id).await?;
        if let Some(n) = notification
            && n.recipient_id == user_id
        {
            self.notification_repo.mark_as_read(notification_id).await?;
        }
        Ok(())
    }

    /// Mark all notifications as read for a user.
    pub async fn mark_all_as_read(&self, user_id: &str) -> AppResult<u64> {
        self.notification_repo.mark_all_as_read(user_id).await
    }

    /// Count unread notifications for a user.
    pub async fn count_unread(&self, user_id: &str) -> AppResult<u64> {
        self.notification_repo.count_unread(user_id).await
    }

    /// Delete a notification (recipient only).
    pub async fn delete(&self, user_id: &str, notification_id: &str) -> AppResult<()> {
        let notification = self.notification_repo.find_by_id(notification_id).await?;
        if let Some(n) = notification
            && n.recipient_id == user_id
        {
            self.notification_repo.delete(notification_id).await?;
        }
        Ok(())
    }

    /// Delete all notifications for a user.
    pub async fn delete_all(&self, user_id: &str) -> AppResult<u64> {
        self.notification_repo.delete_all_for_recipient(user_id).await
    }
}
