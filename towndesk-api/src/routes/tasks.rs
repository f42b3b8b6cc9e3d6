/// Task CRUD endpoints
///
/// All writes require an acting user (see the actor middleware); the
/// identity is recorded as `modified_by` on every create, update,
/// completion flip and delete. Reads return tasks with their due date
/// rendered in the last modifier's timezone alongside the stored value.
///
/// # Endpoints
///
/// ```text
/// GET    /tasks?status={all|pending|completed}   list live tasks
/// GET    /tasks/:id                              audit lookup, includes deleted
/// POST   /tasks                                  create
/// PUT    /tasks/:id                              update fields
/// PUT    /tasks/:id/complete                     flip completion state
/// DELETE /tasks/:id                              soft delete
/// ```
///
/// # Example
///
/// `POST /tasks` with:
///
/// ```json
/// {
///   "title": "Water main break repair update",
///   "description": "Status update on Elm Street water main repair.",
///   "priority": "emergency",
///   "due_date": "2025-08-08"
/// }
/// ```
///
/// responds 201 with the canonical record and a success message;
/// invalid input responds 422 with one message per failing field.
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use towndesk_shared::lifecycle::{self, TaskDraft};
use towndesk_shared::models::task::{StatusCounts, StatusFilter, Task, TaskStoreError};
use towndesk_shared::models::user::User;
use towndesk_shared::presentation;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::{ApiError, ApiResult};
use crate::middleware::actor::ActingUser;

/// List query parameters
#[derive(Debug, Deserialize)]
pub struct ListTasksQuery {
    /// Status filter; absent means `all`
    pub status: Option<String>,
}

/// A task with its due date rendered for the viewer
///
/// The viewer is the task's last modifier; their configured timezone
/// (or the configured default) is applied at render time only.
#[derive(Debug, Serialize)]
pub struct TaskView {
    /// Stored task record
    #[serde(flatten)]
    pub task: Task,

    /// Due date in the viewer's local timezone
    pub due_date_local: Option<DateTime<Tz>>,

    /// Completion instant in the viewer's local timezone
    pub completed_at_local: Option<DateTime<Tz>>,
}

/// List response
#[derive(Debug, Serialize)]
pub struct ListTasksResponse {
    /// Tasks matching the filter, most-recently-updated first
    pub tasks: Vec<TaskView>,

    /// Echo of the applied filter
    pub filter: StatusFilter,

    /// Per-status tallies over all live tasks
    pub counts: StatusCounts,
}

/// Mutation response
#[derive(Debug, Serialize)]
pub struct TaskResponse {
    /// Canonical record after the write
    pub task: Task,

    /// User-facing success message
    pub message: String,
}

/// Delete response
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    /// User-facing success message
    pub message: String,
}

/// `GET /tasks` - lists live tasks with an optional status filter
pub async fn list_tasks(
    State(state): State<AppState>,
    Query(query): Query<ListTasksQuery>,
) -> ApiResult<Json<ListTasksResponse>> {
    let filter = match query.status.as_deref() {
        None => StatusFilter::All,
        Some(raw) => raw
            .parse::<StatusFilter>()
            .map_err(|e| ApiError::BadRequest(e.to_string()))?,
    };

    let tasks = Task::list(&state.db, filter)
        .await
        .map_err(|e| ApiError::from_store(e, "load tasks"))?;
    let counts = Task::count_by_status(&state.db)
        .await
        .map_err(|e| ApiError::from_store(e, "load tasks"))?;

    let tasks = localize(&state, tasks).await?;

    Ok(Json(ListTasksResponse {
        tasks,
        filter,
        counts,
    }))
}

/// `GET /tasks/:id` - audit lookup by id
///
/// Unlike listings this also returns soft-deleted tasks, so a removed
/// record stays inspectable.
pub async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<TaskView>> {
    let task = Task::find_by_id(&state.db, id)
        .await
        .map_err(|e| ApiError::from_store(e, "load task"))?
        .ok_or_else(|| ApiError::NotFound("Task not found.".to_string()))?;

    let mut views = localize(&state, vec![task]).await?;
    // localize preserves its input one-to-one
    match views.pop() {
        Some(view) => Ok(Json(view)),
        None => Err(ApiError::Persistence(
            "Failed to load task. Please try again.".to_string(),
        )),
    }
}

/// `POST /tasks` - creates a task
pub async fn create_task(
    State(state): State<AppState>,
    Extension(actor): Extension<ActingUser>,
    Json(draft): Json<TaskDraft>,
) -> ApiResult<(StatusCode, Json<TaskResponse>)> {
    let validated = lifecycle::validate(draft)?;

    let task = Task::create(&state.db, validated.stamped(actor.id))
        .await
        .map_err(|e| ApiError::from_store(e, "create task"))?;

    tracing::info!(task_id = %task.id, actor = %actor.id, "Task created");

    Ok((
        StatusCode::CREATED,
        Json(TaskResponse {
            task,
            message: "Task created successfully.".to_string(),
        }),
    ))
}

/// `PUT /tasks/:id` - updates a task's fields
pub async fn update_task(
    State(state): State<AppState>,
    Extension(actor): Extension<ActingUser>,
    Path(id): Path<Uuid>,
    Json(draft): Json<TaskDraft>,
) -> ApiResult<Json<TaskResponse>> {
    let validated = lifecycle::validate(draft)?;

    let task = Task::update(&state.db, id, validated.stamped(actor.id))
        .await
        .map_err(|e| ApiError::from_store(e, "update task"))?;

    Ok(Json(TaskResponse {
        task,
        message: "Task updated successfully.".to_string(),
    }))
}

/// `PUT /tasks/:id/complete` - flips completion state
///
/// Pending tasks gain a completion timestamp, completed tasks lose
/// theirs. The success message reflects the new state.
pub async fn toggle_completion(
    State(state): State<AppState>,
    Extension(actor): Extension<ActingUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<TaskResponse>> {
    let current = Task::find_by_id(&state.db, id)
        .await
        .map_err(|e| ApiError::from_store(e, "update task status"))?
        .filter(|task| task.deleted_at.is_none())
        .ok_or_else(|| ApiError::NotFound("Task not found.".to_string()))?;

    let flipped = lifecycle::toggled_completion(current.completed_at, Utc::now());

    let task = Task::set_completion(&state.db, id, flipped, actor.id)
        .await
        .map_err(|e| ApiError::from_store(e, "update task status"))?;

    let message = if task.is_completed() {
        "Task completed successfully."
    } else {
        "Task marked as pending successfully."
    };

    Ok(Json(TaskResponse {
        task,
        message: message.to_string(),
    }))
}

/// `DELETE /tasks/:id` - soft-deletes a task
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(actor): Extension<ActingUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    Task::soft_delete(&state.db, id, actor.id)
        .await
        .map_err(|e| ApiError::from_store(e, "delete task"))?;

    tracing::info!(task_id = %id, actor = %actor.id, "Task soft-deleted");

    Ok(Json(MessageResponse {
        message: "Task deleted successfully.".to_string(),
    }))
}

/// Renders due dates in each task's last-modifier timezone
///
/// Looks up the distinct modifier timezones in one query, then applies
/// the pure presentation conversion per task. Order is preserved.
async fn localize(state: &AppState, tasks: Vec<Task>) -> ApiResult<Vec<TaskView>> {
    let mut modifier_ids: Vec<Uuid> = tasks.iter().map(|task| task.modified_by).collect();
    modifier_ids.sort_unstable();
    modifier_ids.dedup();

    let users = User::find_by_ids(&state.db, &modifier_ids)
        .await
        .map_err(|e| ApiError::from_store(TaskStoreError::Database(e), "load tasks"))?;

    let zones: HashMap<Uuid, Option<String>> = users
        .into_iter()
        .map(|user| (user.id, user.timezone))
        .collect();

    let default_zone = state.config.presentation.default_timezone;

    Ok(tasks
        .into_iter()
        .map(|task| {
            let zone = presentation::viewer_zone(
                zones
                    .get(&task.modified_by)
                    .and_then(|zone| zone.as_deref()),
                default_zone,
            );

            TaskView {
                due_date_local: presentation::due_date_for_viewer(task.due_date, zone),
                completed_at_local: presentation::instant_for_viewer(task.completed_at, zone),
                task,
            }
        })
        .collect())
}
