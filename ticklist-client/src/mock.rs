/// Mock implementation of the [`Api`] trait for tests and demos
///
/// Runs the whole backend contract in memory with the same observable
/// semantics as the real server:
/// - duplicate signup answers 409, bad credentials answer a generic 401
/// - foreign and missing tasks both answer 404
/// - titles are trimmed, blank titles answer 400
/// - creation appends at `max(order) + 1`
/// - reorder requires an exact permutation and renumbers densely from 0
///
/// # Example
///
/// ```
/// use ticklist_client::api::Api;
/// use ticklist_client::mock::MockApi;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let api = MockApi::new();
/// let session = api.signup("a@x.com", "password1").await?;
/// let task = api.create_task(&session.token, "buy milk").await?;
/// assert_eq!(task.order, 0);
/// # Ok(())
/// # }
/// ```
use crate::api::{Api, AuthSession, SessionUser, TaskChanges};
use crate::error::{ClientError, ClientResult};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Mutex;
use ticklist_shared::models::task::{is_valid_reorder, StatusFilter, Task, TaskStatus};
use uuid::Uuid;

const TOKEN_PREFIX: &str = "mock-token-";

struct MockUser {
    id: Uuid,
    email: String,
    password: String,
}

#[derive(Default)]
struct MockState {
    users: Vec<MockUser>,
    tasks: Vec<Task>,
    fail_next: Option<(u16, String)>,
}

/// In-memory [`Api`] implementation
#[derive(Default)]
pub struct MockApi {
    state: Mutex<MockState>,
}

fn api_error(status: u16, message: &str) -> ClientError {
    ClientError::Api {
        status,
        message: message.to_string(),
    }
}

impl MockApi {
    /// Creates an empty mock backend
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next API call fail with the given status and message
    ///
    /// Used to exercise failure paths (revert-on-reorder-failure, action
    /// errors) that the happy-path semantics never trigger.
    pub fn fail_next(&self, status: u16, message: &str) {
        self.state.lock().unwrap().fail_next = Some((status, message.to_string()));
    }

    fn take_injected_failure(state: &mut MockState) -> ClientResult<()> {
        if let Some((status, message)) = state.fail_next.take() {
            return Err(ClientError::Api { status, message });
        }
        Ok(())
    }

    fn authenticate(state: &MockState, token: &str) -> ClientResult<Uuid> {
        token
            .strip_prefix(TOKEN_PREFIX)
            .and_then(|raw| raw.parse::<Uuid>().ok())
            .filter(|id| state.users.iter().any(|u| u.id == *id))
            .ok_or_else(|| api_error(401, "Invalid token"))
    }

    fn session_for(user: &MockUser) -> AuthSession {
        AuthSession {
            user: SessionUser {
                id: user.id,
                email: user.email.clone(),
            },
            token: format!("{}{}", TOKEN_PREFIX, user.id),
        }
    }

    fn next_order(state: &MockState, user_id: Uuid) -> i32 {
        state
            .tasks
            .iter()
            .filter(|t| t.user_id == user_id)
            .map(|t| t.order)
            .max()
            .map_or(0, |max| max + 1)
    }
}

#[async_trait]
impl Api for MockApi {
    async fn signup(&self, email: &str, password: &str) -> ClientResult<AuthSession> {
        let mut state = self.state.lock().unwrap();
        Self::take_injected_failure(&mut state)?;

        if password.len() < 8 {
            return Err(api_error(400, "Password must be at least 8 characters"));
        }
        if state.users.iter().any(|u| u.email == email) {
            return Err(api_error(409, "Email is already in use"));
        }

        let user = MockUser {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password: password.to_string(),
        };
        let session = Self::session_for(&user);
        state.users.push(user);

        Ok(session)
    }

    async fn login(&self, email: &str, password: &str) -> ClientResult<AuthSession> {
        let mut state = self.state.lock().unwrap();
        Self::take_injected_failure(&mut state)?;

        state
            .users
            .iter()
            .find(|u| u.email == email && u.password == password)
            .map(Self::session_for)
            .ok_or_else(|| api_error(401, "Invalid email or password"))
    }

    async fn me(&self, token: &str) -> ClientResult<SessionUser> {
        let mut state = self.state.lock().unwrap();
        Self::take_injected_failure(&mut state)?;

        let user_id = Self::authenticate(&state, token)?;
        let user = state.users.iter().find(|u| u.id == user_id).unwrap();

        Ok(SessionUser {
            id: user.id,
            email: user.email.clone(),
        })
    }

    async fn list_tasks(&self, token: &str, filter: StatusFilter) -> ClientResult<Vec<Task>> {
        let mut state = self.state.lock().unwrap();
        Self::take_injected_failure(&mut state)?;

        let user_id = Self::authenticate(&state, token)?;
        let mut tasks: Vec<Task> = state
            .tasks
            .iter()
            .filter(|t| t.user_id == user_id)
            .filter(|t| filter.as_status().map_or(true, |s| t.status == s))
            .cloned()
            .collect();
        tasks.sort_by_key(|t| t.order);

        Ok(tasks)
    }

    async fn create_task(&self, token: &str, title: &str) -> ClientResult<Task> {
        let mut state = self.state.lock().unwrap();
        Self::take_injected_failure(&mut state)?;

        let user_id = Self::authenticate(&state, token)?;
        let title = title.trim();
        if title.is_empty() {
            return Err(api_error(400, "Title is required"));
        }

        let now = Utc::now();
        let task = Task {
            id: Uuid::new_v4(),
            user_id,
            title: title.to_string(),
            status: TaskStatus::Active,
            order: Self::next_order(&state, user_id),
            created_at: now,
            updated_at: now,
        };
        state.tasks.push(task.clone());

        Ok(task)
    }

    async fn update_task(
        &self,
        token: &str,
        task_id: Uuid,
        changes: TaskChanges,
    ) -> ClientResult<Task> {
        let mut state = self.state.lock().unwrap();
        Self::take_injected_failure(&mut state)?;

        let user_id = Self::authenticate(&state, token)?;

        let title = match changes.title {
            Some(title) => {
                let trimmed = title.trim().to_string();
                if trimmed.is_empty() {
                    return Err(api_error(400, "Title is required"));
                }
                Some(trimmed)
            }
            None => None,
        };
        if title.is_none() && changes.status.is_none() {
            return Err(api_error(404, "Task not found"));
        }

        let task = state
            .tasks
            .iter_mut()
            .find(|t| t.id == task_id && t.user_id == user_id)
            .ok_or_else(|| api_error(404, "Task not found"))?;

        if let Some(title) = title {
            task.title = title;
        }
        if let Some(status) = changes.status {
            task.status = status;
        }
        task.updated_at = Utc::now();

        Ok(task.clone())
    }

    async fn delete_task(&self, token: &str, task_id: Uuid) -> ClientResult<()> {
        let mut state = self.state.lock().unwrap();
        Self::take_injected_failure(&mut state)?;

        let user_id = Self::authenticate(&state, token)?;
        let before = state.tasks.len();
        state
            .tasks
            .retain(|t| !(t.id == task_id && t.user_id == user_id));

        if state.tasks.len() == before {
            return Err(api_error(404, "Task not found"));
        }
        Ok(())
    }

    async fn clear_completed(&self, token: &str) -> ClientResult<u64> {
        let mut state = self.state.lock().unwrap();
        Self::take_injected_failure(&mut state)?;

        let user_id = Self::authenticate(&state, token)?;
        let before = state.tasks.len();
        state
            .tasks
            .retain(|t| !(t.user_id == user_id && t.status == TaskStatus::Completed));

        Ok((before - state.tasks.len()) as u64)
    }

    async fn reorder(&self, token: &str, ordered_ids: &[Uuid]) -> ClientResult<Vec<Task>> {
        let mut state = self.state.lock().unwrap();
        Self::take_injected_failure(&mut state)?;

        let user_id = Self::authenticate(&state, token)?;
        let current: Vec<Uuid> = state
            .tasks
            .iter()
            .filter(|t| t.user_id == user_id)
            .map(|t| t.id)
            .collect();

        if !is_valid_reorder(&current, ordered_ids) {
            return Err(api_error(
                400,
                "orderedIds must contain each of your current task ids exactly once",
            ));
        }

        let now = Utc::now();
        for (index, id) in ordered_ids.iter().enumerate() {
            let task = state
                .tasks
                .iter_mut()
                .find(|t| t.id == *id && t.user_id == user_id)
                .unwrap();
            task.order = index as i32;
            task.updated_at = now;
        }

        let mut tasks: Vec<Task> = state
            .tasks
            .iter()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect();
        tasks.sort_by_key(|t| t.order);

        Ok(tasks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_signup_and_login() {
        let api = MockApi::new();
        let session = api.signup("a@x.com", "password1").await.unwrap();
        assert_eq!(session.user.email, "a@x.com");

        // Duplicate email
        let err = api.signup("a@x.com", "password1").await.unwrap_err();
        assert!(matches!(err, ClientError::Api { status: 409, .. }));

        // Wrong password and unknown email answer identically
        let wrong = api.login("a@x.com", "nope-nope").await.unwrap_err();
        let unknown = api.login("b@x.com", "password1").await.unwrap_err();
        assert_eq!(wrong.to_string(), unknown.to_string());

        let session = api.login("a@x.com", "password1").await.unwrap();
        let me = api.me(&session.token).await.unwrap();
        assert_eq!(me.id, session.user.id);
    }

    #[tokio::test]
    async fn test_orders_are_contiguous_from_zero() {
        let api = MockApi::new();
        let session = api.signup("a@x.com", "password1").await.unwrap();

        for (i, title) in ["a", "b", "c"].iter().enumerate() {
            let task = api.create_task(&session.token, title).await.unwrap();
            assert_eq!(task.order, i as i32);
        }
    }

    #[tokio::test]
    async fn test_cross_user_isolation() {
        let api = MockApi::new();
        let alice = api.signup("alice@x.com", "password1").await.unwrap();
        let bob = api.signup("bob@x.com", "password1").await.unwrap();

        let task = api.create_task(&alice.token, "secret").await.unwrap();

        assert!(api.list_tasks(&bob.token, StatusFilter::All).await.unwrap().is_empty());

        let err = api.delete_task(&bob.token, task.id).await.unwrap_err();
        assert!(matches!(err, ClientError::Api { status: 404, .. }));

        let err = api
            .update_task(&bob.token, task.id, TaskChanges::status(TaskStatus::Completed))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Api { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_reorder_permutation_rules() {
        let api = MockApi::new();
        let session = api.signup("a@x.com", "password1").await.unwrap();
        let t1 = api.create_task(&session.token, "one").await.unwrap();
        let t2 = api.create_task(&session.token, "two").await.unwrap();

        let reordered = api.reorder(&session.token, &[t2.id, t1.id]).await.unwrap();
        assert_eq!(reordered[0].id, t2.id);
        assert_eq!(reordered[0].order, 0);
        assert_eq!(reordered[1].order, 1);

        // Subset, superset, and duplicates all fail and move nothing
        for bad in [
            vec![t1.id],
            vec![t1.id, t2.id, Uuid::new_v4()],
            vec![t1.id, t1.id],
        ] {
            let err = api.reorder(&session.token, &bad).await.unwrap_err();
            assert!(matches!(err, ClientError::Api { status: 400, .. }));
        }
        let tasks = api.list_tasks(&session.token, StatusFilter::All).await.unwrap();
        assert_eq!(tasks[0].id, t2.id);
    }

    #[tokio::test]
    async fn test_clear_completed_preserves_active() {
        let api = MockApi::new();
        let session = api.signup("a@x.com", "password1").await.unwrap();
        let t1 = api.create_task(&session.token, "keep").await.unwrap();
        let t2 = api.create_task(&session.token, "drop").await.unwrap();

        api.update_task(&session.token, t2.id, TaskChanges::status(TaskStatus::Completed))
            .await
            .unwrap();

        assert_eq!(api.clear_completed(&session.token).await.unwrap(), 1);
        assert_eq!(api.clear_completed(&session.token).await.unwrap(), 0);

        let tasks = api.list_tasks(&session.token, StatusFilter::All).await.unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].id, t1.id);
    }

    #[tokio::test]
    async fn test_injected_failure_fires_once() {
        let api = MockApi::new();
        let session = api.signup("a@x.com", "password1").await.unwrap();

        api.fail_next(500, "boom");
        let err = api
            .list_tasks(&session.token, StatusFilter::All)
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Api { status: 500, .. }));

        assert!(api.list_tasks(&session.token, StatusFilter::All).await.is_ok());
    }
}
