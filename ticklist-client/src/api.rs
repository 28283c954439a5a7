/// Core Api trait and wire types
///
/// This module defines the contract the state layer programs against.
/// Two implementations exist: [`crate::http::HttpApi`] talks to a real
/// server, [`crate::mock::MockApi`] runs the same semantics in memory.
///
/// All task operations take the bearer token explicitly; the trait has no
/// hidden session state. Token storage belongs to
/// [`crate::session::SessionStore`].
use crate::error::ClientResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use ticklist_shared::models::task::{StatusFilter, Task, TaskStatus};
use uuid::Uuid;

/// The identity half of an auth response; never carries a password hash
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionUser {
    /// User ID
    pub id: Uuid,

    /// Email address
    pub email: String,
}

/// What signup and login return: who you are plus the bearer token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    /// The authenticated user
    pub user: SessionUser,

    /// Bearer token for subsequent requests
    pub token: String,
}

/// Partial update for a task; at least one field must be set
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskChanges {
    /// New title
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// New status
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
}

impl TaskChanges {
    /// A change set that only flips the status
    pub fn status(status: TaskStatus) -> Self {
        Self {
            title: None,
            status: Some(status),
        }
    }

    /// A change set that only renames
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            status: None,
        }
    }
}

/// The backend contract
///
/// Implementations map each call onto one endpoint of the REST API and
/// surface failures as [`crate::error::ClientError`], with server-reported
/// errors carrying the HTTP status and the `{error}` message.
#[async_trait]
pub trait Api: Send + Sync {
    /// Create an account; fails with a 409 if the email is taken
    async fn signup(&self, email: &str, password: &str) -> ClientResult<AuthSession>;

    /// Authenticate; fails with a 401 on unknown email or wrong password
    async fn login(&self, email: &str, password: &str) -> ClientResult<AuthSession>;

    /// Resolve the identity behind a token; fails with a 401 if invalid
    async fn me(&self, token: &str) -> ClientResult<SessionUser>;

    /// List the caller's tasks ascending by display position
    async fn list_tasks(&self, token: &str, filter: StatusFilter) -> ClientResult<Vec<Task>>;

    /// Create a task at the end of the list
    async fn create_task(&self, token: &str, title: &str) -> ClientResult<Task>;

    /// Apply a partial update; a 404 covers both absence and foreign tasks
    async fn update_task(
        &self,
        token: &str,
        task_id: Uuid,
        changes: TaskChanges,
    ) -> ClientResult<Task>;

    /// Delete a task; a 404 covers both absence and foreign tasks
    async fn delete_task(&self, token: &str, task_id: Uuid) -> ClientResult<()>;

    /// Delete all completed tasks, returning how many went
    async fn clear_completed(&self, token: &str) -> ClientResult<u64>;

    /// Replace the whole ordering; fails with a 400 unless `ordered_ids`
    /// is exactly a permutation of the caller's current task ids
    async fn reorder(&self, token: &str, ordered_ids: &[Uuid]) -> ClientResult<Vec<Task>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_changes_skips_absent_fields() {
        let json = serde_json::to_string(&TaskChanges::status(TaskStatus::Completed)).unwrap();
        assert_eq!(json, r#"{"status":"completed"}"#);

        let json = serde_json::to_string(&TaskChanges::title("new name")).unwrap();
        assert_eq!(json, r#"{"title":"new name"}"#);
    }
}
