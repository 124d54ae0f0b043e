//! User service.

use photogram_common::{AppError, AppResult, IdGenerator};
use photogram_db::{entities::user, repositories::UserRepository};
use sea_orm::Set;
use validator::Validate;

/// Input for creating a user account.
#[derive(Debug, Clone, Validate, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserInput {
    #[validate(length(min = 1, max = 30), custom(function = validate_username))]
    pub username: String,
    #[validate(length(max = 100))]
    pub full_name: Option<String>,
    #[validate(length(max = 500))]
    pub bio: Option<String>,
    #[validate(url)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub is_private: bool,
}

fn validate_username(username: &str) -> Result<(), validator::ValidationError> {
    if username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
    {
        Ok(())
    } else {
        Err(validator::ValidationError::new("invalid_username"))
    }
}

/// User service for business logic.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub const fn new(user_repo: UserRepository) -> Self {
        Self {
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a user account with a fresh access token.
    ///
    /// Usernames are unique case-insensitively.
    pub async fn create(&self, input: CreateUserInput) -> AppResult<user::Model> {
        input.validate()?;

        if self
            .user_repo
            .find_by_username(&input.username)
            .await?
            .is_some()
        {
            return Err(AppError::InvalidOperation(
                "username is already taken".to_string(),
            ));
        }

        let model = user::ActiveModel {
            id: Set(self.id_gen.generate()),
            username_lower: Set(input.username.to_lowercase()),
            username: Set(input.username),
            full_name: Set(input.full_name),
            bio: Set(input.bio),
            avatar_url: Set(input.avatar_url),
            is_private: Set(input.is_private),
            is_verified: Set(false),
            is_active: Set(true),
            token: Set(Some(self.id_gen.generate_token())),
            created_at: Set(chrono::Utc::now().into()),
            updated_at: Set(None),
        };

        self.user_repo.create(model).await
    }

    /// Resolve an access token to its active account.
    pub async fn authenticate_by_token(&self, token: &str) -> AppResult<user::Model> {
        let user = self
            .user_repo
            .find_by_token(token)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if !user.is_active {
            return Err(AppError::Unauthorized);
        }

        Ok(user)
    }

    /// Get an active user by id.
    pub async fn get(&self, user_id: &str) -> AppResult<user::Model> {
        self.user_repo.get_active(user_id).await
    }

    /// Look up an active user by username (case-insensitive).
    pub async fn get_by_username(&self, username: &str) -> AppResult<user::Model> {
        let user = self
            .user_repo
            .find_by_username(username)
            .await?
            .filter(|u| u.is_active)
            .ok_or_else(|| AppError::UserNotFound(username.to_string()))?;

        Ok(user)
    }

    /// Toggle account privacy.
    ///
    /// Making a private account public leaves already-pending requests
    /// untouched; they stay answerable.
    pub async fn set_privacy(&self, user_id: &str, is_private: bool) -> AppResult<user::Model> {
        let user = self.user_repo.get_active(user_id).await?;

        if user.is_private == is_private {
            return Ok(user);
        }

        let model = user::ActiveModel {
            id: Set(user.id),
            is_private: Set(is_private),
            updated_at: Set(Some(chrono::Utc::now().into())),
            ..Default::default()
        };

        self.user_repo.update(model).await
    }

    /// Activate or deactivate an account.
    ///
    /// Deactivated accounts keep their rows; they simply stop resolving
    /// as follow targets and notification recipients.
    pub async fn set_active(&self, user_id: &str, is_active: bool) -> AppResult<user::Model> {
        let user = self.user_repo.get_by_id(user_id).await?;

        if user.is_active == is_active {
            return Ok(user);
        }

        let model = user::ActiveModel {
            id: Set(user.id),
            is_active: Set(is_active),
            updated_at: Set(Some(chrono::Utc::now().into())),
            ..Default::default()
        };

        self.user_repo.update(model).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn create_test_user(id: &str, username: &str, is_active: bool) -> user::Model {
        user::Model {
            id: id.to_string(),
            username: username.to_string(),
            username_lower: username.to_lowercase(),
            full_name: None,
            bio: None,
            avatar_url: None,
            is_private: false,
            is_verified: false,
            is_active,
            token: Some("a".repeat(32)),
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn service_with(results: Vec<Vec<user::Model>>) -> UserService {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results(results)
                .into_connection(),
        );
        UserService::new(UserRepository::new(db))
    }

    fn input(username: &str) -> CreateUserInput {
        CreateUserInput {
            username: username.to_string(),
            full_name: None,
            bio: None,
            avatar_url: None,
            is_private: false,
        }
    }

    #[tokio::test]
    async fn test_create_user() {
        let created = create_test_user("user1", "alice", true);
        let service = service_with(vec![vec![], vec![created]]);

        let user = service.create(input("alice")).await.unwrap();

        assert_eq!(user.username, "alice");
        assert!(user.token.is_some());
    }

    #[tokio::test]
    async fn test_create_user_with_taken_username_fails() {
        let existing = create_test_user("user1", "alice", true);
        let service = service_with(vec![vec![existing]]);

        let result = service.create(input("Alice")).await;

        assert!(matches!(result, Err(AppError::InvalidOperation(_))));
    }

    #[tokio::test]
    async fn test_create_user_with_invalid_username_fails() {
        let service = service_with(vec![]);

        let result = service.create(input("no spaces allowed")).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_authenticate_by_token() {
        let user = create_test_user("user1", "alice", true);
        let service = service_with(vec![vec![user]]);

        let authed = service.authenticate_by_token(&"a".repeat(32)).await.unwrap();

        assert_eq!(authed.id, "user1");
    }

    #[tokio::test]
    async fn test_authenticate_with_unknown_token_fails() {
        let service = service_with(vec![vec![]]);

        let result = service.authenticate_by_token("bogus").await;

        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_authenticate_deactivated_account_fails() {
        let user = create_test_user("user1", "alice", false);
        let service = service_with(vec![vec![user]]);

        let result = service.authenticate_by_token(&"a".repeat(32)).await;

        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_set_privacy_is_a_noop_when_unchanged() {
        let user = create_test_user("user1", "alice", true);

        // Only the lookup is prepared; an update would exhaust the mock.
        let service = service_with(vec![vec![user]]);

        let updated = service.set_privacy("user1", false).await.unwrap();

        assert!(!updated.is_private);
    }

    #[tokio::test]
    async fn test_get_by_username_skips_deactivated_accounts() {
        let user = create_test_user("user1", "alice", false);
        let service = service_with(vec![vec![user]]);

        let result = service.get_by_username("alice").await;

        assert!(matches!(result, Err(AppError::UserNotFound(_))));
    }
}
