/// Task management endpoints
///
/// All endpoints here sit behind the bearer-token guard, and every
/// repository call is scoped to the authenticated user: a task owned by
/// someone else answers exactly like a task that does not exist (404).
///
/// # Endpoints
///
/// - `GET    /tasks?status=all|active|completed` - List in display order
/// - `POST   /tasks` - Create at the end of the list
/// - `PATCH  /tasks/:task_id` - Partial update (title and/or status)
/// - `DELETE /tasks/:task_id` - Delete
/// - `DELETE /tasks/completed` - Clear completed, returns `{deleted}`
/// - `POST   /tasks/reorder` - Replace the whole ordering
use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use ticklist_shared::{
    auth::middleware::AuthContext,
    models::task::{StatusFilter, Task, TaskStatus, UpdateTask},
};
use uuid::Uuid;

/// Query string for task listing
#[derive(Debug, Deserialize)]
pub struct ListTasksQuery {
    /// all | active | completed; anything else means all
    pub status: Option<String>,
}

/// Create request
#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    /// Task title; trimmed server-side, must be non-empty
    pub title: String,
}

/// Partial update request; at least one field must be present
#[derive(Debug, Deserialize)]
pub struct UpdateTaskRequest {
    /// New title
    pub title: Option<String>,

    /// New status
    pub status: Option<TaskStatus>,
}

/// Reorder request: the complete new ordering of the user's task ids
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderRequest {
    /// Every task id the user owns, in the desired display order
    pub ordered_ids: Vec<Uuid>,
}

/// List envelope
#[derive(Debug, Serialize, Deserialize)]
pub struct TaskListResponse {
    /// Tasks ascending by display position
    pub items: Vec<Task>,
}

/// Clear-completed envelope
#[derive(Debug, Serialize, Deserialize)]
pub struct ClearCompletedResponse {
    /// Number of tasks removed (possibly zero)
    pub deleted: u64,
}

/// Task ids are opaque strings on the wire; anything that does not parse
/// cannot name an existing task, so it reports 404 like any other absence.
fn parse_task_id(raw: &str) -> ApiResult<Uuid> {
    raw.parse::<Uuid>()
        .map_err(|_| ApiError::NotFound("Task not found".to_string()))
}

/// List the authenticated user's tasks
///
/// # Endpoint
///
/// ```text
/// GET /tasks?status=active
/// Authorization: Bearer <token>
/// ```
pub async fn list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<ListTasksQuery>,
) -> ApiResult<Json<TaskListResponse>> {
    let filter = StatusFilter::from_query(query.status.as_deref());
    let items = Task::list_for_user(&state.db, auth.user_id, filter).await?;

    Ok(Json(TaskListResponse { items }))
}

/// Create a task at the end of the user's list
///
/// # Endpoint
///
/// ```text
/// POST /tasks
/// Authorization: Bearer <token>
///
/// { "title": "buy milk" }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: title empty after trimming
pub async fn create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    let title = req.title.trim();
    if title.is_empty() {
        return Err(ApiError::Validation("Title is required".to_string()));
    }

    let task = Task::create_for_user(&state.db, auth.user_id, title).await?;

    Ok((StatusCode::CREATED, Json(task)))
}

/// Partially update a task
///
/// Applies only the provided fields. A request with no fields, or naming
/// a task the user does not own, answers 404.
///
/// # Endpoint
///
/// ```text
/// PATCH /tasks/:task_id
/// Authorization: Bearer <token>
///
/// { "status": "completed" }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: provided title is empty after trimming
/// - `404 Not Found`: no such task for this user, or empty change set
pub async fn update(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(task_id): Path<String>,
    Json(req): Json<UpdateTaskRequest>,
) -> ApiResult<Json<Task>> {
    let task_id = parse_task_id(&task_id)?;

    let mut changes = UpdateTask::default();

    if let Some(title) = req.title {
        let trimmed = title.trim().to_string();
        if trimmed.is_empty() {
            return Err(ApiError::Validation("Title is required".to_string()));
        }
        changes.title = Some(trimmed);
    }
    if let Some(status) = req.status {
        changes.status = Some(status);
    }

    let task = Task::update_for_user(&state.db, auth.user_id, task_id, changes)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(Json(task))
}

/// Delete a task
///
/// # Endpoint
///
/// ```text
/// DELETE /tasks/:task_id
/// Authorization: Bearer <token>
/// ```
///
/// # Errors
///
/// - `404 Not Found`: no such task for this user
pub async fn remove(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(task_id): Path<String>,
) -> ApiResult<StatusCode> {
    let task_id = parse_task_id(&task_id)?;

    let deleted = Task::delete_for_user(&state.db, auth.user_id, task_id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Task not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Delete all of the user's completed tasks
///
/// Always succeeds, even when there is nothing to remove.
///
/// # Endpoint
///
/// ```text
/// DELETE /tasks/completed
/// Authorization: Bearer <token>
/// ```
pub async fn clear_completed(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<ClearCompletedResponse>> {
    let deleted = Task::clear_completed_for_user(&state.db, auth.user_id).await?;

    Ok(Json(ClearCompletedResponse { deleted }))
}

/// Replace the user's whole task ordering
///
/// The submitted ids must be exactly a permutation of the user's current
/// task ids; otherwise nothing changes and the request fails. All position
/// writes commit atomically.
///
/// # Endpoint
///
/// ```text
/// POST /tasks/reorder
/// Authorization: Bearer <token>
///
/// { "orderedIds": ["...", "..."] }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: submission is not a permutation of the current ids
pub async fn reorder(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<ReorderRequest>,
) -> ApiResult<Json<TaskListResponse>> {
    let items = Task::reorder_for_user(&state.db, auth.user_id, &req.ordered_ids)
        .await?
        .ok_or_else(|| {
            ApiError::Validation(
                "orderedIds must contain each of your current task ids exactly once".to_string(),
            )
        })?;

    Ok(Json(TaskListResponse { items }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_task_id_rejects_garbage_as_not_found() {
        assert!(matches!(
            parse_task_id("not-a-uuid"),
            Err(ApiError::NotFound(_))
        ));

        let id = Uuid::new_v4();
        assert_eq!(parse_task_id(&id.to_string()).unwrap(), id);
    }

    #[test]
    fn test_reorder_request_uses_camel_case() {
        let req: ReorderRequest =
            serde_json::from_str(&format!(r#"{{"orderedIds":["{}"]}}"#, Uuid::new_v4())).unwrap();
        assert_eq!(req.ordered_ids.len(), 1);

        let json = serde_json::to_string(&ReorderRequest {
            ordered_ids: vec![],
        })
        .unwrap();
        assert!(json.contains("orderedIds"));
    }
}
