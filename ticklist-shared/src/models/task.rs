/// Task model and per-user repository operations
///
/// Tasks are the core entity of ticklist: each belongs to exactly one user,
/// and every operation here is scoped by `user_id` so a task is never
/// visible or mutable through another user's identity.
///
/// # Ordering
///
/// `sort_order` (the wire field `order`) defines the display sequence.
/// Creation appends at `max + 1` (or 0 for the first task); deletion leaves
/// gaps; [`Task::reorder_for_user`] renumbers densely from 0.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_status AS ENUM ('active', 'completed');
///
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     title TEXT NOT NULL,
///     status task_status NOT NULL DEFAULT 'active',
///     sort_order INTEGER NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use ticklist_shared::models::task::{StatusFilter, Task};
/// use ticklist_shared::db::pool::{create_pool, DatabaseConfig};
/// use uuid::Uuid;
///
/// # async fn example(user_id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let task = Task::create_for_user(&pool, user_id, "buy milk").await?;
/// assert_eq!(task.order, 0);
///
/// let all = Task::list_for_user(&pool, user_id, StatusFilter::All).await?;
/// assert_eq!(all.len(), 1);
/// # Ok(())
/// # }
/// ```
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::collections::HashSet;
use tracing::debug;
use uuid::Uuid;

/// Task status
///
/// Transitions freely between the two values; there is no state machine
/// beyond them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Task still to be done
    Active,

    /// Task checked off
    Completed,
}

impl TaskStatus {
    /// Returns the status as its wire string
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Active => "active",
            TaskStatus::Completed => "completed",
        }
    }

    /// Returns the opposite status (used by toggle)
    pub fn toggled(&self) -> Self {
        match self {
            TaskStatus::Active => TaskStatus::Completed,
            TaskStatus::Completed => TaskStatus::Active,
        }
    }
}

/// Status filter for task listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    /// Everything the user owns
    #[default]
    All,

    /// Only active tasks
    Active,

    /// Only completed tasks
    Completed,
}

impl StatusFilter {
    /// Parses the `?status=` query value; anything unrecognized means All
    pub fn from_query(value: Option<&str>) -> Self {
        match value {
            Some("active") => StatusFilter::Active,
            Some("completed") => StatusFilter::Completed,
            _ => StatusFilter::All,
        }
    }

    /// The status to restrict to, if any
    pub fn as_status(&self) -> Option<TaskStatus> {
        match self {
            StatusFilter::All => None,
            StatusFilter::Active => Some(TaskStatus::Active),
            StatusFilter::Completed => Some(TaskStatus::Completed),
        }
    }
}

/// A to-do item owned by one user
///
/// Serializes to the wire shape
/// `{id, userId, title, status, order, createdAt, updatedAt}`.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique task ID (UUID v4)
    pub id: Uuid,

    /// Owning user (immutable)
    pub user_id: Uuid,

    /// Non-empty trimmed title
    pub title: String,

    /// active | completed
    pub status: TaskStatus,

    /// Zero-based display position within the owner's list
    #[sqlx(rename = "sort_order")]
    #[serde(rename = "order")]
    pub order: i32,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last updated
    pub updated_at: DateTime<Utc>,
}

/// Partial update for a task
///
/// Only the provided fields are applied. An entirely empty change set is
/// treated like a missing task by [`Task::update_for_user`].
#[derive(Debug, Clone, Default)]
pub struct UpdateTask {
    /// New title (already trimmed and non-empty, the API layer validates)
    pub title: Option<String>,

    /// New status
    pub status: Option<TaskStatus>,
}

impl UpdateTask {
    /// True when no field is set
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.status.is_none()
    }
}

/// Checks whether `submitted` is exactly a permutation of `current`
///
/// Validity is a pure function of the two id sets: equal size, no duplicate
/// in the submission, and set equality. Order of the inputs is irrelevant
/// here; order only matters for the positions the caller then assigns.
///
/// # Example
///
/// ```
/// use ticklist_shared::models::task::is_valid_reorder;
/// use uuid::Uuid;
///
/// let a = Uuid::new_v4();
/// let b = Uuid::new_v4();
///
/// assert!(is_valid_reorder(&[a, b], &[b, a]));
/// assert!(!is_valid_reorder(&[a, b], &[a]));      // subset
/// assert!(!is_valid_reorder(&[a], &[a, b]));      // superset
/// assert!(!is_valid_reorder(&[a, b], &[a, a]));   // duplicate
/// ```
pub fn is_valid_reorder(current: &[Uuid], submitted: &[Uuid]) -> bool {
    if current.len() != submitted.len() {
        return false;
    }

    let mut seen: HashSet<Uuid> = HashSet::with_capacity(submitted.len());
    for id in submitted {
        if !seen.insert(*id) {
            return false;
        }
    }

    let current_set: HashSet<Uuid> = current.iter().copied().collect();
    seen == current_set
}

const TASK_COLUMNS: &str = "id, user_id, title, status, sort_order, created_at, updated_at";

impl Task {
    /// Lists a user's tasks ascending by display position
    ///
    /// `StatusFilter::All` returns everything; Active/Completed restrict to
    /// that status.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: Uuid,
        filter: StatusFilter,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = match filter.as_status() {
            Some(status) => {
                sqlx::query_as::<_, Task>(&format!(
                    "SELECT {TASK_COLUMNS} FROM tasks \
                     WHERE user_id = $1 AND status = $2 ORDER BY sort_order ASC"
                ))
                .bind(user_id)
                .bind(status)
                .fetch_all(pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Task>(&format!(
                    "SELECT {TASK_COLUMNS} FROM tasks \
                     WHERE user_id = $1 ORDER BY sort_order ASC"
                ))
                .bind(user_id)
                .fetch_all(pool)
                .await?
            }
        };

        Ok(tasks)
    }

    /// Creates a task at the end of the user's list
    ///
    /// The new task is `active` and gets position `max(sort_order) + 1`,
    /// or 0 when the list is empty. The title must already be trimmed and
    /// non-empty; the API layer validates before calling.
    pub async fn create_for_user(
        pool: &PgPool,
        user_id: Uuid,
        title: &str,
    ) -> Result<Self, sqlx::Error> {
        // Position computed in the same statement so two inserts cannot
        // read the same max.
        let task = sqlx::query_as::<_, Task>(&format!(
            "INSERT INTO tasks (user_id, title, sort_order) \
             VALUES ($1, $2, (SELECT COALESCE(MAX(sort_order) + 1, 0) FROM tasks WHERE user_id = $1)) \
             RETURNING {TASK_COLUMNS}"
        ))
        .bind(user_id)
        .bind(title)
        .fetch_one(pool)
        .await?;

        debug!(task_id = %task.id, user_id = %user_id, "Created task");
        Ok(task)
    }

    /// Applies a partial update to a task the user owns
    ///
    /// Returns `None` when no task with that id belongs to the user, or
    /// when the change set is empty. Only provided fields are written;
    /// `updated_at` is always refreshed.
    pub async fn update_for_user(
        pool: &PgPool,
        user_id: Uuid,
        task_id: Uuid,
        changes: UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        if changes.is_empty() {
            return Ok(None);
        }

        // Build the SET clause from the fields that are present
        let mut query = String::from("UPDATE tasks SET updated_at = NOW()");
        let mut bind_count = 2;

        if changes.title.is_some() {
            bind_count += 1;
            query.push_str(&format!(", title = ${}", bind_count));
        }
        if changes.status.is_some() {
            bind_count += 1;
            query.push_str(&format!(", status = ${}", bind_count));
        }

        query.push_str(&format!(
            " WHERE id = $1 AND user_id = $2 RETURNING {TASK_COLUMNS}"
        ));

        let mut q = sqlx::query_as::<_, Task>(&query).bind(task_id).bind(user_id);

        if let Some(title) = changes.title {
            q = q.bind(title);
        }
        if let Some(status) = changes.status {
            q = q.bind(status);
        }

        let task = q.fetch_optional(pool).await?;

        Ok(task)
    }

    /// Deletes a task the user owns
    ///
    /// Returns whether a row was deleted; absence is not an error here, the
    /// API layer maps `false` to 404. Remaining positions are not
    /// renumbered.
    pub async fn delete_for_user(
        pool: &PgPool,
        user_id: Uuid,
        task_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND user_id = $2")
            .bind(task_id)
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deletes all of the user's completed tasks
    ///
    /// Always succeeds; returns the number of rows removed (possibly zero).
    /// Active tasks keep their positions.
    pub async fn clear_completed_for_user(
        pool: &PgPool,
        user_id: Uuid,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE user_id = $1 AND status = $2")
            .bind(user_id)
            .bind(TaskStatus::Completed)
            .execute(pool)
            .await?;

        debug!(
            user_id = %user_id,
            deleted = result.rows_affected(),
            "Cleared completed tasks"
        );
        Ok(result.rows_affected())
    }

    /// Replaces the user's entire ordering
    ///
    /// `ordered_ids` must be exactly a permutation of the user's current
    /// task ids; otherwise nothing is written and `None` is returned. On
    /// success every task's position becomes its zero-based index in the
    /// submission, written in a single all-or-nothing transaction, and the
    /// tasks are returned in the new order.
    ///
    /// A delete racing the transaction makes one of the UPDATEs touch zero
    /// rows; the whole transaction is then rolled back so a partial
    /// ordering can never commit.
    pub async fn reorder_for_user(
        pool: &PgPool,
        user_id: Uuid,
        ordered_ids: &[Uuid],
    ) -> Result<Option<Vec<Self>>, sqlx::Error> {
        let current: Vec<Uuid> = sqlx::query_scalar("SELECT id FROM tasks WHERE user_id = $1")
            .bind(user_id)
            .fetch_all(pool)
            .await?;

        if !is_valid_reorder(&current, ordered_ids) {
            debug!(user_id = %user_id, "Rejected reorder: not a permutation of current tasks");
            return Ok(None);
        }

        let mut tx = pool.begin().await?;

        for (index, id) in ordered_ids.iter().enumerate() {
            let result = sqlx::query(
                "UPDATE tasks SET sort_order = $1, updated_at = NOW() \
                 WHERE id = $2 AND user_id = $3",
            )
            .bind(index as i32)
            .bind(id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() != 1 {
                // Concurrent mutation changed the set under us
                tx.rollback().await?;
                debug!(user_id = %user_id, "Rolled back reorder: task set changed concurrently");
                return Ok(None);
            }
        }

        let tasks = sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE user_id = $1 ORDER BY sort_order ASC"
        ))
        .bind(user_id)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Some(tasks))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(n: usize) -> Vec<Uuid> {
        (0..n).map(|_| Uuid::new_v4()).collect()
    }

    #[test]
    fn test_status_filter_from_query() {
        assert_eq!(StatusFilter::from_query(None), StatusFilter::All);
        assert_eq!(StatusFilter::from_query(Some("all")), StatusFilter::All);
        assert_eq!(
            StatusFilter::from_query(Some("active")),
            StatusFilter::Active
        );
        assert_eq!(
            StatusFilter::from_query(Some("completed")),
            StatusFilter::Completed
        );
        assert_eq!(
            StatusFilter::from_query(Some("bogus")),
            StatusFilter::All
        );
    }

    #[test]
    fn test_status_toggled() {
        assert_eq!(TaskStatus::Active.toggled(), TaskStatus::Completed);
        assert_eq!(TaskStatus::Completed.toggled(), TaskStatus::Active);
    }

    #[test]
    fn test_update_task_is_empty() {
        assert!(UpdateTask::default().is_empty());
        assert!(!UpdateTask {
            title: Some("t".to_string()),
            status: None,
        }
        .is_empty());
        assert!(!UpdateTask {
            title: None,
            status: Some(TaskStatus::Completed),
        }
        .is_empty());
    }

    #[test]
    fn test_valid_reorder_accepts_permutations() {
        let current = ids(4);

        let mut reversed = current.clone();
        reversed.reverse();
        assert!(is_valid_reorder(&current, &reversed));

        // Identity is also a permutation
        assert!(is_valid_reorder(&current, &current));

        // Empty against empty
        assert!(is_valid_reorder(&[], &[]));
    }

    #[test]
    fn test_valid_reorder_rejects_subset() {
        let current = ids(3);
        assert!(!is_valid_reorder(&current, &current[..2]));
    }

    #[test]
    fn test_valid_reorder_rejects_superset() {
        let current = ids(2);
        let mut extended = current.clone();
        extended.push(Uuid::new_v4());
        assert!(!is_valid_reorder(&current, &extended));
    }

    #[test]
    fn test_valid_reorder_rejects_duplicates() {
        let current = ids(2);
        // Same length as current, but one id repeated
        let submitted = vec![current[0], current[0]];
        assert!(!is_valid_reorder(&current, &submitted));
    }

    #[test]
    fn test_valid_reorder_rejects_foreign_ids() {
        let current = ids(2);
        let submitted = vec![current[0], Uuid::new_v4()];
        assert!(!is_valid_reorder(&current, &submitted));
    }

    #[test]
    fn test_task_wire_shape() {
        let task = Task {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: "buy milk".to_string(),
            status: TaskStatus::Active,
            order: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let value = serde_json::to_value(&task).unwrap();
        assert!(value.get("userId").is_some());
        assert!(value.get("order").is_some());
        assert!(value.get("createdAt").is_some());
        assert!(value.get("updatedAt").is_some());
        assert_eq!(value["status"], "active");

        // Snake-case leakage would break the wire contract
        assert!(value.get("user_id").is_none());
        assert!(value.get("sort_order").is_none());
    }

    #[test]
    fn test_task_wire_roundtrip() {
        let task = Task {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: "write tests".to_string(),
            status: TaskStatus::Completed,
            order: 3,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_string(&task).unwrap();
        let back: Task = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, task.id);
        assert_eq!(back.status, TaskStatus::Completed);
        assert_eq!(back.order, 3);
    }

    // Database-backed repository tests live in tests/repository_tests.rs
    // and require a running PostgreSQL.
}
