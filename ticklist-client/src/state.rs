/// Client-side state
///
/// Two pieces a UI drives:
///
/// - [`AuthState`]: who is logged in, token lifecycle, session hydration
/// - [`TaskList`]: the task list with filter, busy-row gating, and
///   optimistic reordering
///
/// Error surfaces are deliberately split: a failure while loading the list
/// lands in [`TaskList::load_error`] (page-level), a failure from a user
/// action lands in [`TaskList::action_error`] (inline, tied to the
/// triggering action). A 401 during passive hydration is neither; it just
/// means "not logged in".
use crate::api::{Api, SessionUser, TaskChanges};
use crate::error::ClientResult;
use crate::session::SessionStore;
use std::collections::HashSet;
use std::sync::Arc;
use ticklist_shared::models::task::{StatusFilter, Task};
use uuid::Uuid;

/// Authentication state
///
/// Owns the [`SessionStore`]; every token write goes through here.
pub struct AuthState {
    api: Arc<dyn Api>,
    store: SessionStore,
    user: Option<SessionUser>,
    token: Option<String>,
    is_loading: bool,
    error: Option<String>,
}

impl AuthState {
    /// Creates auth state over a backend and a token store
    pub fn new(api: Arc<dyn Api>, store: SessionStore) -> Self {
        Self {
            api,
            store,
            user: None,
            token: None,
            is_loading: false,
            error: None,
        }
    }

    /// The logged-in user, if any
    pub fn user(&self) -> Option<&SessionUser> {
        self.user.as_ref()
    }

    /// The active bearer token, if any
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Whether hydration or an auth call is in flight
    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// The last auth error surfaced to the user, if any
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Restores the session from the stored token, if one exists
    ///
    /// A 401 means the stored token went stale; it is cleared silently and
    /// the user simply starts logged out. Any other failure (the server is
    /// down, the session file is unreadable) is surfaced via [`Self::error`].
    pub async fn hydrate(&mut self) -> ClientResult<()> {
        self.is_loading = true;
        self.error = None;

        let result = self.hydrate_inner().await;

        self.is_loading = false;
        if let Err(e) = &result {
            self.error = Some(e.to_string());
        }
        result
    }

    async fn hydrate_inner(&mut self) -> ClientResult<()> {
        let Some(token) = self.store.load()? else {
            return Ok(());
        };

        match self.api.me(&token).await {
            Ok(user) => {
                self.user = Some(user);
                self.token = Some(token);
                Ok(())
            }
            Err(e) if e.is_unauthorized() => {
                self.store.clear()?;
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Creates an account and starts a session with the returned token
    pub async fn signup(&mut self, email: &str, password: &str) -> ClientResult<()> {
        self.is_loading = true;
        self.error = None;

        let result = self.api.signup(email, password).await;

        self.is_loading = false;
        match result {
            Ok(session) => {
                self.store.set(&session.token)?;
                self.user = Some(session.user);
                self.token = Some(session.token);
                Ok(())
            }
            Err(e) => {
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Authenticates and starts a session with the returned token
    pub async fn login(&mut self, email: &str, password: &str) -> ClientResult<()> {
        self.is_loading = true;
        self.error = None;

        let result = self.api.login(email, password).await;

        self.is_loading = false;
        match result {
            Ok(session) => {
                self.store.set(&session.token)?;
                self.user = Some(session.user);
                self.token = Some(session.token);
                Ok(())
            }
            Err(e) => {
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Ends the session locally; the token is stateless so there is
    /// nothing to tell the server
    pub fn logout(&mut self) -> ClientResult<()> {
        self.store.clear()?;
        self.user = None;
        self.token = None;
        self.error = None;
        Ok(())
    }
}

/// The task list a UI renders
///
/// Toggle, rename, delete, and create wait for the server before touching
/// local state, and the affected row is marked busy until the request
/// resolves so a second click on the same row does nothing. Reordering is
/// the one optimistic operation: the list moves immediately and reverts if
/// the server rejects the new ordering.
pub struct TaskList {
    api: Arc<dyn Api>,
    token: String,
    tasks: Vec<Task>,
    filter: StatusFilter,
    busy: HashSet<Uuid>,
    load_error: Option<String>,
    action_error: Option<String>,
}

impl TaskList {
    /// Creates an empty list bound to a session token
    pub fn new(api: Arc<dyn Api>, token: impl Into<String>) -> Self {
        Self {
            api,
            token: token.into(),
            tasks: Vec::new(),
            filter: StatusFilter::All,
            busy: HashSet::new(),
            load_error: None,
            action_error: None,
        }
    }

    /// Tasks in display order, as last confirmed (or optimistically moved)
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// The active status filter
    pub fn filter(&self) -> StatusFilter {
        self.filter
    }

    /// Whether a mutation on this row is in flight
    pub fn is_busy(&self, task_id: Uuid) -> bool {
        self.busy.contains(&task_id)
    }

    /// Page-level error from the last load, if it failed
    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    /// Inline error from the last user action, if it failed
    pub fn action_error(&self) -> Option<&str> {
        self.action_error.as_deref()
    }

    /// Fetches the list for the current filter
    pub async fn load(&mut self) -> bool {
        self.load_error = None;
        match self.api.list_tasks(&self.token, self.filter).await {
            Ok(tasks) => {
                self.tasks = tasks;
                true
            }
            Err(e) => {
                self.load_error = Some(e.to_string());
                false
            }
        }
    }

    /// Switches the filter and reloads
    pub async fn set_filter(&mut self, filter: StatusFilter) -> bool {
        self.filter = filter;
        self.load().await
    }

    /// Creates a task; the row appears only once the server confirms it
    pub async fn create(&mut self, title: &str) -> Option<Uuid> {
        self.action_error = None;
        match self.api.create_task(&self.token, title).await {
            Ok(task) => {
                let id = task.id;
                // A new task is always active; under the completed filter
                // it stays out of view until the filter changes.
                if self.filter.as_status().map_or(true, |s| task.status == s) {
                    self.tasks.push(task);
                }
                Some(id)
            }
            Err(e) => {
                self.action_error = Some(e.to_string());
                None
            }
        }
    }

    /// Flips a task between active and completed
    ///
    /// Returns false without touching anything if the row is already busy
    /// or unknown.
    pub async fn toggle(&mut self, task_id: Uuid) -> bool {
        let Some(current) = self.tasks.iter().find(|t| t.id == task_id) else {
            return false;
        };
        if !self.busy.insert(task_id) {
            return false;
        }
        let changes = TaskChanges::status(current.status.toggled());

        self.action_error = None;
        let result = self.api.update_task(&self.token, task_id, changes).await;
        self.busy.remove(&task_id);

        match result {
            Ok(updated) => {
                self.apply_update(updated);
                true
            }
            Err(e) => {
                self.action_error = Some(e.to_string());
                false
            }
        }
    }

    /// Renames a task, busy-gated like [`Self::toggle`]
    pub async fn rename(&mut self, task_id: Uuid, title: &str) -> bool {
        if !self.tasks.iter().any(|t| t.id == task_id) {
            return false;
        }
        if !self.busy.insert(task_id) {
            return false;
        }

        self.action_error = None;
        let result = self
            .api
            .update_task(&self.token, task_id, TaskChanges::title(title))
            .await;
        self.busy.remove(&task_id);

        match result {
            Ok(updated) => {
                self.apply_update(updated);
                true
            }
            Err(e) => {
                self.action_error = Some(e.to_string());
                false
            }
        }
    }

    /// Deletes a task, busy-gated; the row leaves the list only once the
    /// server confirms
    pub async fn remove(&mut self, task_id: Uuid) -> bool {
        if !self.tasks.iter().any(|t| t.id == task_id) {
            return false;
        }
        if !self.busy.insert(task_id) {
            return false;
        }

        self.action_error = None;
        let result = self.api.delete_task(&self.token, task_id).await;
        self.busy.remove(&task_id);

        match result {
            Ok(()) => {
                self.tasks.retain(|t| t.id != task_id);
                true
            }
            Err(e) => {
                self.action_error = Some(e.to_string());
                false
            }
        }
    }

    /// Clears all completed tasks, returning how many the server removed
    pub async fn clear_completed(&mut self) -> Option<u64> {
        self.action_error = None;
        match self.api.clear_completed(&self.token).await {
            Ok(deleted) => {
                self.tasks
                    .retain(|t| t.status != ticklist_shared::models::task::TaskStatus::Completed);
                Some(deleted)
            }
            Err(e) => {
                self.action_error = Some(e.to_string());
                None
            }
        }
    }

    /// Moves the task at `from` to position `to`, optimistically
    ///
    /// The list reorders immediately, then persists. If the server rejects
    /// the ordering, the list reverts to the pre-move snapshot and the
    /// failure lands in [`Self::action_error`]. On success the list adopts
    /// the server's returned ordering.
    ///
    /// Only meaningful under the All filter; a filtered view holds a subset
    /// of the user's ids and cannot form a valid full ordering.
    pub async fn move_task(&mut self, from: usize, to: usize) -> bool {
        if from >= self.tasks.len() || to >= self.tasks.len() {
            return false;
        }
        if self.filter != StatusFilter::All {
            self.action_error = Some("Reordering requires the full list".to_string());
            return false;
        }
        if from == to {
            return true;
        }

        self.action_error = None;
        let snapshot = self.tasks.clone();

        let task = self.tasks.remove(from);
        self.tasks.insert(to, task);
        let ordered_ids: Vec<Uuid> = self.tasks.iter().map(|t| t.id).collect();

        match self.api.reorder(&self.token, &ordered_ids).await {
            Ok(tasks) => {
                self.tasks = tasks;
                true
            }
            Err(e) => {
                self.tasks = snapshot;
                self.action_error = Some(e.to_string());
                false
            }
        }
    }

    fn apply_update(&mut self, updated: Task) {
        match self.filter.as_status() {
            // Under a status filter, a row that no longer matches drops out
            Some(status) if updated.status != status => {
                self.tasks.retain(|t| t.id != updated.id);
            }
            _ => {
                if let Some(slot) = self.tasks.iter_mut().find(|t| t.id == updated.id) {
                    *slot = updated;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockApi;
    use ticklist_shared::models::task::TaskStatus;

    fn temp_store() -> SessionStore {
        let path =
            std::env::temp_dir().join(format!("ticklist-state-test-{}", Uuid::new_v4()));
        SessionStore::new(path)
    }

    async fn logged_in() -> (Arc<MockApi>, TaskList) {
        let api = Arc::new(MockApi::new());
        let session = api.signup("a@x.com", "password1").await.unwrap();
        let list = TaskList::new(api.clone(), session.token);
        (api, list)
    }

    #[tokio::test]
    async fn test_hydrate_with_stale_token_is_silent() {
        let api: Arc<dyn Api> = Arc::new(MockApi::new());
        let store = temp_store();
        store.set("mock-token-not-a-real-user").unwrap();

        let mut auth = AuthState::new(api, store.clone());
        auth.hydrate().await.unwrap();

        // Not logged in, no user-facing error, and the dead token is gone
        assert!(auth.user().is_none());
        assert!(auth.error().is_none());
        assert!(store.load().unwrap().is_none());
        store.clear().unwrap();
    }

    #[tokio::test]
    async fn test_hydrate_surfaces_non_auth_failures() {
        let api = Arc::new(MockApi::new());
        let session = api.signup("a@x.com", "password1").await.unwrap();
        let store = temp_store();
        store.set(&session.token).unwrap();

        api.fail_next(500, "boom");
        let mut auth = AuthState::new(api, store.clone());
        assert!(auth.hydrate().await.is_err());
        assert_eq!(auth.error(), Some("boom"));

        // The token survives; only a 401 clears it
        assert!(store.load().unwrap().is_some());
        store.clear().unwrap();
    }

    #[tokio::test]
    async fn test_signup_login_logout_lifecycle() {
        let api: Arc<dyn Api> = Arc::new(MockApi::new());
        let store = temp_store();
        let mut auth = AuthState::new(api, store.clone());

        auth.signup("a@x.com", "password1").await.unwrap();
        assert_eq!(auth.user().unwrap().email, "a@x.com");
        assert!(store.load().unwrap().is_some());

        auth.logout().unwrap();
        assert!(auth.user().is_none());
        assert!(auth.token().is_none());
        assert!(store.load().unwrap().is_none());

        assert!(auth.login("a@x.com", "wrong-password").await.is_err());
        assert!(auth.error().is_some());
        assert!(auth.user().is_none());

        auth.login("a@x.com", "password1").await.unwrap();
        assert!(auth.user().is_some());
        store.clear().unwrap();
    }

    #[tokio::test]
    async fn test_create_and_toggle() {
        let (_, mut list) = logged_in().await;

        let id = list.create("buy milk").await.unwrap();
        assert_eq!(list.tasks().len(), 1);
        assert_eq!(list.tasks()[0].status, TaskStatus::Active);

        assert!(list.toggle(id).await);
        assert_eq!(list.tasks()[0].status, TaskStatus::Completed);

        assert!(list.toggle(id).await);
        assert_eq!(list.tasks()[0].status, TaskStatus::Active);
        assert_eq!(list.tasks()[0].title, "buy milk");
    }

    #[tokio::test]
    async fn test_create_failure_sets_action_error() {
        let (_, mut list) = logged_in().await;

        assert!(list.create("   ").await.is_none());
        assert!(list.action_error().is_some());
        assert!(list.tasks().is_empty());
    }

    #[tokio::test]
    async fn test_toggle_unknown_row_is_ignored() {
        let (_, mut list) = logged_in().await;
        list.create("one").await.unwrap();

        assert!(!list.toggle(Uuid::new_v4()).await);
        assert!(list.action_error().is_none());
    }

    #[tokio::test]
    async fn test_remove_waits_for_server() {
        let (api, mut list) = logged_in().await;
        let id = list.create("doomed").await.unwrap();

        // Server failure leaves the row in place
        api.fail_next(500, "boom");
        assert!(!list.remove(id).await);
        assert_eq!(list.tasks().len(), 1);
        assert_eq!(list.action_error(), Some("boom"));
        assert!(!list.is_busy(id));

        assert!(list.remove(id).await);
        assert!(list.tasks().is_empty());
    }

    #[tokio::test]
    async fn test_optimistic_move_reverts_on_failure() {
        let (api, mut list) = logged_in().await;
        let a = list.create("a").await.unwrap();
        let b = list.create("b").await.unwrap();

        // Success path adopts the server ordering
        assert!(list.move_task(1, 0).await);
        assert_eq!(list.tasks()[0].id, b);
        assert_eq!(list.tasks()[0].order, 0);

        // Failure path reverts to the pre-move snapshot
        api.fail_next(400, "bad ordering");
        assert!(!list.move_task(1, 0).await);
        assert_eq!(list.tasks()[0].id, b);
        assert_eq!(list.tasks()[1].id, a);
        assert_eq!(list.action_error(), Some("bad ordering"));
    }

    #[tokio::test]
    async fn test_move_rejected_under_filter() {
        let (_, mut list) = logged_in().await;
        list.create("a").await.unwrap();
        list.create("b").await.unwrap();

        list.set_filter(StatusFilter::Active).await;
        assert!(!list.move_task(0, 1).await);
        assert!(list.action_error().is_some());
    }

    #[tokio::test]
    async fn test_filtered_toggle_drops_row_from_view() {
        let (_, mut list) = logged_in().await;
        let id = list.create("a").await.unwrap();
        list.create("b").await.unwrap();

        assert!(list.set_filter(StatusFilter::Active).await);
        assert_eq!(list.tasks().len(), 2);

        // Completing a task under the active filter removes it from view
        assert!(list.toggle(id).await);
        assert_eq!(list.tasks().len(), 1);

        assert!(list.set_filter(StatusFilter::Completed).await);
        assert_eq!(list.tasks().len(), 1);
        assert_eq!(list.tasks()[0].id, id);
    }

    #[tokio::test]
    async fn test_clear_completed_updates_local_state() {
        let (_, mut list) = logged_in().await;
        let a = list.create("keep").await.unwrap();
        let b = list.create("drop").await.unwrap();
        list.toggle(b).await;

        assert_eq!(list.clear_completed().await, Some(1));
        assert_eq!(list.tasks().len(), 1);
        assert_eq!(list.tasks()[0].id, a);

        assert_eq!(list.clear_completed().await, Some(0));
    }

    #[tokio::test]
    async fn test_load_failure_is_page_level() {
        let (api, mut list) = logged_in().await;
        list.create("a").await.unwrap();

        api.fail_next(500, "boom");
        assert!(!list.load().await);
        assert_eq!(list.load_error(), Some("boom"));
        assert!(list.action_error().is_none());

        assert!(list.load().await);
        assert!(list.load_error().is_none());
        assert_eq!(list.tasks().len(), 1);
    }
}
