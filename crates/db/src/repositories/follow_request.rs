//! Follow request repository.

use std::sync::Arc;

use crate::entities::{FollowRequest, follow_request, follow_request::RequestStatus};
use photogram_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, SqlErr, sea_query::Expr,
};

/// Follow request repository for database operations.
///
/// A partial unique index on (follower, followee) WHERE status = 'pending'
/// guarantees at most one pending request per pair; [`Self::create`] reports
/// a violation as [`AppError::DuplicateRequest`].
#[derive(Clone)]
pub struct FollowRequestRepository {
    db: Arc<DatabaseConnection>,
}

impl FollowRequestRepository {
    /// Create a new follow request repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a follow request by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<follow_request::Model>> {
        FollowRequest::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find the pending request from one user to another, if any.
    pub async fn find_pending(
        &self,
        follower_id: &str,
        followee_id: &str,
    ) -> AppResult<Option<follow_request::Model>> {
        FollowRequest::find()
            .filter(follow_request::Column::FollowerId.eq(follower_id))
            .filter(follow_request::Column::FolloweeId.eq(followee_id))
            .filter(follow_request::Column::Status.eq(RequestStatus::Pending))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Check whether a pending request exists for the pair.
    pub async fn has_pending(&self, follower_id: &str, followee_id: &str) -> AppResult<bool> {
        Ok(self.find_pending(follower_id, followee_id).await?.is_some())
    }

    /// Create a new follow request.
    ///
    /// A unique-constraint violation on the pending pair surfaces as
    /// [`AppError::DuplicateRequest`].
    pub async fn create(
        &self,
        model: follow_request::ActiveModel,
    ) -> AppResult<follow_request::Model> {
        model.insert(self.db.as_ref()).await.map_err(|e| {
            if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                AppError::DuplicateRequest
            } else {
                AppError::Database(e.to_string())
            }
        })
    }

    /// Transition a request out of `pending` into a terminal status.
    ///
    /// The update is conditional on the row still being pending, so two
    /// concurrent resolvers cannot overwrite each other's terminal state.
    /// Returns whether a row was actually transitioned; a false result
    /// means another writer resolved the request first and the caller
    /// should re-read to learn the outcome.
    pub async fn resolve_pending(&self, id: &str, status: RequestStatus) -> AppResult<bool> {
        let result = FollowRequest::update_many()
            .col_expr(follow_request::Column::Status, Expr::value(status))
            .col_expr(
                follow_request::Column::UpdatedAt,
                Expr::value(chrono::Utc::now()),
            )
            .filter(follow_request::Column::Id.eq(id))
            .filter(follow_request::Column::Status.eq(RequestStatus::Pending))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected > 0)
    }

    /// Delete the pending request from one user to another.
    ///
    /// Returns whether a request was actually removed; no-op when nothing
    /// is pending.
    pub async fn delete_if_pending(
        &self,
        follower_id: &str,
        followee_id: &str,
    ) -> AppResult<bool> {
        let result = FollowRequest::delete_many()
            .filter(follow_request::Column::FollowerId.eq(follower_id))
            .filter(follow_request::Column::FolloweeId.eq(followee_id))
            .filter(follow_request::Column::Status.eq(RequestStatus::Pending))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected > 0)
    }

    /// Get pending follow requests received by a user (paginated).
    pub async fn find_received_pending(
        &self,
        user_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<follow_request::Model>> {
        let mut query = FollowRequest::find()
            .filter(follow_request::Column::FolloweeId.eq(user_id))
            .filter(follow_request::Column::Status.eq(RequestStatus::Pending))
            .order_by_desc(follow_request::Column::Id);

        if let Some(id) = until_id {
            query = query.filter(follow_request::Column::Id.lt(id));
        }

        query
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count pending follow requests received by a user.
    pub async fn count_received_pending(&self, user_id: &str) -> AppResult<u64> {
        FollowRequest::find()
            .filter(follow_request::Column::FolloweeId.eq(user_id))
            .filter(follow_request::Column::Status.eq(RequestStatus::Pending))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn create_test_request(
        id: &str,
        follower_id: &str,
        followee_id: &str,
        status: RequestStatus,
    ) -> follow_request::Model {
        follow_request::Model {
            id: id.to_string(),
            follower_id: follower_id.to_string(),
            followee_id: followee_id.to_string(),
            status,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_find_by_id_found() {
        let request = create_test_request("r1", "user1", "user2", RequestStatus::Pending);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[request.clone()]])
                .into_connection(),
        );

        let repo = FollowRequestRepository::new(db);
        let result = repo.find_by_id("r1").await.unwrap();

        assert!(result.is_some());
        assert_eq!(result.unwrap().status, RequestStatus::Pending);
    }

    #[tokio::test]
    async fn test_has_pending_false() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<follow_request::Model>::new()])
                .into_connection(),
        );

        let repo = FollowRequestRepository::new(db);
        let result = repo.has_pending("user1", "user2").await.unwrap();

        assert!(!result);
    }

    #[tokio::test]
    async fn test_delete_if_pending_nothing_to_delete() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                }])
                .into_connection(),
        );

        let repo = FollowRequestRepository::new(db);
        let deleted = repo.delete_if_pending("user1", "user2").await.unwrap();

        assert!(!deleted);
    }

    #[tokio::test]
    async fn test_resolve_pending_guards_on_current_status() {
        let conn = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        let conn = Arc::new(conn);
        let repo = FollowRequestRepository::new(Arc::clone(&conn));
        let transitioned = repo
            .resolve_pending("r1", RequestStatus::Accepted)
            .await
            .unwrap();

        assert!(transitioned);

        // The UPDATE must carry the pending-status filter alongside the id,
        // otherwise a concurrent resolver could overwrite a terminal state.
        drop(repo);
        let conn = Arc::try_unwrap(conn).unwrap();
        // Debug-formatting escapes the quotes inside the SQL string; undo
        // that so the quoted-identifier assertion sees the raw SQL.
        let log = format!("{:?}", conn.into_transaction_log()).replace("\\\"", "\"");
        assert!(log.contains("UPDATE"));
        assert!(log.contains(r#""follow_request"."status""#));
        assert!(log.contains("pending"));
    }

    #[tokio::test]
    async fn test_resolve_pending_reports_lost_race() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                }])
                .into_connection(),
        );

        let repo = FollowRequestRepository::new(db);
        let transitioned = repo
            .resolve_pending("r1", RequestStatus::Declined)
            .await
            .unwrap();

        assert!(!transitioned);
    }

    #[tokio::test]
    async fn test_find_received_pending() {
        let r1 = create_test_request("r1", "user2", "user1", RequestStatus::Pending);
        let r2 = create_test_request("r2", "user3", "user1", RequestStatus::Pending);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[r1, r2]])
                .into_connection(),
        );

        let repo = FollowRequestRepository::new(db);
        let result = repo.find_received_pending("user1", 10, None).await.unwrap();

        assert_eq!(result.len(), 2);
    }

    #[tokio::test]
    async fn test_count_received_pending() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[maplit::btreemap! {
                    "num_items" => sea_orm::Value::BigInt(Some(2))
                }]])
                .into_connection(),
        );

        let repo = FollowRequestRepository::new(db);
        let count = repo.count_received_pending("user1").await.unwrap();

        assert_eq!(count, 2);
    }

    #[test]
    fn test_request_status_terminality() {
        assert!(!RequestStatus::Pending.is_terminal());
        assert!(RequestStatus::Accepted.is_terminal());
        assert!(RequestStatus::Declined.is_terminal());
    }
}
