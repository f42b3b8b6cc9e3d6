/// Task model and database operations
///
/// This module provides the Task model, the core entity of TownDesk.
/// A task is a unit of communications work with a priority, an optional
/// due date, and a completion timestamp. Deleting a task is always a
/// soft delete: the row keeps its data for audit and recovery and is
/// excluded from every listing.
///
/// # Completion
///
/// There is no completion boolean. A task is completed exactly when
/// `completed_at` is set; clearing it returns the task to pending.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_priority AS ENUM ('normal', 'resident', 'emergency');
///
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     title VARCHAR(160) NOT NULL,
///     description TEXT,
///     priority task_priority NOT NULL DEFAULT 'normal',
///     due_date DATE,
///     completed_at TIMESTAMPTZ,
///     modified_by UUID NOT NULL REFERENCES users(id),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     deleted_at TIMESTAMPTZ
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use towndesk_shared::models::task::{Task, TaskPriority, TaskWrite, StatusFilter};
/// use uuid::Uuid;
///
/// # async fn example(pool: sqlx::PgPool, actor: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// let task = Task::create(&pool, TaskWrite {
///     title: "Water main break repair update".to_string(),
///     description: Some("Status update on Elm Street repair.".to_string()),
///     priority: TaskPriority::Emergency,
///     due_date: None,
///     modified_by: actor,
/// }).await?;
///
/// let pending = Task::list(&pool, StatusFilter::Pending).await?;
/// assert!(pending.iter().any(|t| t.id == task.id));
/// # Ok(())
/// # }
/// ```
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Task priority level
///
/// Closed set; the database enforces the same set via the
/// `task_priority` enum type, so no other value can be persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    /// Routine communications work
    #[default]
    Normal,

    /// Resident-facing announcements
    Resident,

    /// Emergency notifications
    Emergency,
}

impl TaskPriority {
    /// Converts priority to its wire/database string
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Normal => "normal",
            TaskPriority::Resident => "resident",
            TaskPriority::Emergency => "emergency",
        }
    }
}

/// Error returned when parsing an unknown priority string
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown priority: {0}")]
pub struct UnknownPriority(pub String);

impl std::str::FromStr for TaskPriority {
    type Err = UnknownPriority;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "normal" => Ok(TaskPriority::Normal),
            "resident" => Ok(TaskPriority::Resident),
            "emergency" => Ok(TaskPriority::Emergency),
            other => Err(UnknownPriority(other.to_string())),
        }
    }
}

/// Listing filter over completion state
///
/// `Pending` and `Completed` partition the live (non-deleted) tasks;
/// `All` is their union. Soft-deleted tasks match none of the variants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    /// Every live task
    #[default]
    All,

    /// Tasks with no completion timestamp
    Pending,

    /// Tasks with a completion timestamp
    Completed,
}

impl StatusFilter {
    /// Converts filter to its query-string value
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusFilter::All => "all",
            StatusFilter::Pending => "pending",
            StatusFilter::Completed => "completed",
        }
    }

    /// Whether a task with the given completion timestamp passes this filter
    pub fn matches(&self, completed_at: Option<DateTime<Utc>>) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Pending => completed_at.is_none(),
            StatusFilter::Completed => completed_at.is_some(),
        }
    }
}

/// Error returned when parsing an unknown status filter
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown status filter: {0} (expected all, pending or completed)")]
pub struct UnknownStatusFilter(pub String);

impl std::str::FromStr for StatusFilter {
    type Err = UnknownStatusFilter;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(StatusFilter::All),
            "pending" => Ok(StatusFilter::Pending),
            "completed" => Ok(StatusFilter::Completed),
            other => Err(UnknownStatusFilter(other.to_string())),
        }
    }
}

/// Errors from task storage operations
#[derive(Debug, thiserror::Error)]
pub enum TaskStoreError {
    /// The id does not resolve to a live task
    #[error("task not found")]
    NotFound,

    /// Underlying storage failure
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Task model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID, assigned at creation and never reused
    pub id: Uuid,

    /// Short summary, 1-160 characters
    pub title: String,

    /// Free-form detail text
    pub description: Option<String>,

    /// Priority level
    pub priority: TaskPriority,

    /// Calendar date the task is due (no time of day)
    pub due_date: Option<NaiveDate>,

    /// When the task was completed (None while pending)
    pub completed_at: Option<DateTime<Utc>>,

    /// User who performed the most recent write
    pub modified_by: Uuid,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last updated
    pub updated_at: DateTime<Utc>,

    /// When the task was soft-deleted (None while live)
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Validated, attributed fields for a task insert or update
///
/// Produced by the lifecycle validation gate; handlers never build one
/// from raw client input directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskWrite {
    /// Task title
    pub title: String,

    /// Optional description
    pub description: Option<String>,

    /// Priority level
    pub priority: TaskPriority,

    /// Optional due date
    pub due_date: Option<NaiveDate>,

    /// Acting user recorded on the row
    pub modified_by: Uuid,
}

/// Per-status task tallies for the dashboard header
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::FromRow)]
pub struct StatusCounts {
    /// Live tasks in total
    pub all: i64,

    /// Live tasks with no completion timestamp
    pub pending: i64,

    /// Live tasks with a completion timestamp
    pub completed: i64,
}

impl Task {
    /// Whether the task is completed
    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }

    /// Creates a new pending task
    ///
    /// Assigns a fresh id, stamps `created_at`/`updated_at`, and returns
    /// the canonical row. New tasks always start with `completed_at`
    /// unset.
    pub async fn create(pool: &PgPool, data: TaskWrite) -> Result<Self, TaskStoreError> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (title, description, priority, due_date, modified_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, title, description, priority, due_date, completed_at,
                      modified_by, created_at, updated_at, deleted_at
            "#,
        )
        .bind(data.title)
        .bind(data.description)
        .bind(data.priority)
        .bind(data.due_date)
        .bind(data.modified_by)
        .fetch_one(pool)
        .await?;

        Ok(task)
    }

    /// Finds a task by ID, including soft-deleted rows
    ///
    /// This is the audit/recovery lookup: a deleted task is still
    /// retrievable here even though it no longer appears in listings.
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, TaskStoreError> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, description, priority, due_date, completed_at,
                   modified_by, created_at, updated_at, deleted_at
            FROM tasks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Updates a live task's fields
    ///
    /// Merges the validated fields, bumps `updated_at`, and records the
    /// acting user. Returns `NotFound` if the id does not resolve to a
    /// non-deleted row. Concurrent updates are last-write-wins.
    pub async fn update(pool: &PgPool, id: Uuid, data: TaskWrite) -> Result<Self, TaskStoreError> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET title = $2,
                description = $3,
                priority = $4,
                due_date = $5,
                modified_by = $6,
                updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING id, title, description, priority, due_date, completed_at,
                      modified_by, created_at, updated_at, deleted_at
            "#,
        )
        .bind(id)
        .bind(data.title)
        .bind(data.description)
        .bind(data.priority)
        .bind(data.due_date)
        .bind(data.modified_by)
        .fetch_optional(pool)
        .await?
        .ok_or(TaskStoreError::NotFound)?;

        Ok(task)
    }

    /// Persists a completion flip computed by the lifecycle
    ///
    /// `completed_at` is written as given (set or cleared) and the
    /// acting user is recorded. Returns `NotFound` for missing or
    /// deleted rows.
    pub async fn set_completion(
        pool: &PgPool,
        id: Uuid,
        completed_at: Option<DateTime<Utc>>,
        actor: Uuid,
    ) -> Result<Self, TaskStoreError> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET completed_at = $2,
                modified_by = $3,
                updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING id, title, description, priority, due_date, completed_at,
                      modified_by, created_at, updated_at, deleted_at
            "#,
        )
        .bind(id)
        .bind(completed_at)
        .bind(actor)
        .fetch_optional(pool)
        .await?
        .ok_or(TaskStoreError::NotFound)?;

        Ok(task)
    }

    /// Soft-deletes a live task
    ///
    /// Sets `deleted_at` and records the acting user; the row is never
    /// physically erased. Returns `NotFound` if the task is already
    /// absent or deleted.
    pub async fn soft_delete(pool: &PgPool, id: Uuid, actor: Uuid) -> Result<(), TaskStoreError> {
        let result = sqlx::query(
            r#"
            UPDATE tasks
            SET deleted_at = NOW(),
                modified_by = $2,
                updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .bind(actor)
        .execute(pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(TaskStoreError::NotFound);
        }

        Ok(())
    }

    /// Lists live tasks matching a status filter
    ///
    /// Soft-deleted tasks never appear. Ordering is most-recently-updated
    /// first; the result is a finite snapshot, so callers re-list to
    /// observe later changes.
    pub async fn list(pool: &PgPool, filter: StatusFilter) -> Result<Vec<Self>, TaskStoreError> {
        let query = match filter {
            StatusFilter::All => {
                r#"
                SELECT id, title, description, priority, due_date, completed_at,
                       modified_by, created_at, updated_at, deleted_at
                FROM tasks
                WHERE deleted_at IS NULL
                ORDER BY updated_at DESC
                "#
            }
            StatusFilter::Pending => {
                r#"
                SELECT id, title, description, priority, due_date, completed_at,
                       modified_by, created_at, updated_at, deleted_at
                FROM tasks
                WHERE deleted_at IS NULL AND completed_at IS NULL
                ORDER BY updated_at DESC
                "#
            }
            StatusFilter::Completed => {
                r#"
                SELECT id, title, description, priority, due_date, completed_at,
                       modified_by, created_at, updated_at, deleted_at
                FROM tasks
                WHERE deleted_at IS NULL AND completed_at IS NOT NULL
                ORDER BY updated_at DESC
                "#
            }
        };

        let tasks = sqlx::query_as::<_, Task>(query).fetch_all(pool).await?;

        Ok(tasks)
    }

    /// Lists live tasks last modified by the given user
    ///
    /// The reporting access pattern, backed by the `modified_by` index.
    pub async fn list_by_modifier(
        pool: &PgPool,
        user_id: Uuid,
    ) -> Result<Vec<Self>, TaskStoreError> {
        let tasks = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, description, priority, due_date, completed_at,
                   modified_by, created_at, updated_at, deleted_at
            FROM tasks
            WHERE deleted_at IS NULL AND modified_by = $1
            ORDER BY updated_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Counts live tasks per completion status
    pub async fn count_by_status(pool: &PgPool) -> Result<StatusCounts, TaskStoreError> {
        let counts = sqlx::query_as::<_, StatusCounts>(
            r#"
            SELECT COUNT(*) AS "all",
                   COUNT(*) FILTER (WHERE completed_at IS NULL) AS pending,
                   COUNT(*) FILTER (WHERE completed_at IS NOT NULL) AS completed
            FROM tasks
            WHERE deleted_at IS NULL
            "#,
        )
        .fetch_one(pool)
        .await?;

        Ok(counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn sample_task(completed_at: Option<DateTime<Utc>>) -> Task {
        let now = Utc::now();
        Task {
            id: Uuid::new_v4(),
            title: "Town hall meeting announcement".to_string(),
            description: None,
            priority: TaskPriority::Resident,
            due_date: None,
            completed_at,
            modified_by: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    #[test]
    fn test_priority_as_str() {
        assert_eq!(TaskPriority::Normal.as_str(), "normal");
        assert_eq!(TaskPriority::Resident.as_str(), "resident");
        assert_eq!(TaskPriority::Emergency.as_str(), "emergency");
    }

    #[test]
    fn test_priority_from_str() {
        assert_eq!(TaskPriority::from_str("normal"), Ok(TaskPriority::Normal));
        assert_eq!(
            TaskPriority::from_str("resident"),
            Ok(TaskPriority::Resident)
        );
        assert_eq!(
            TaskPriority::from_str("emergency"),
            Ok(TaskPriority::Emergency)
        );
        assert_eq!(
            TaskPriority::from_str("urgent"),
            Err(UnknownPriority("urgent".to_string()))
        );
    }

    #[test]
    fn test_priority_default_is_normal() {
        assert_eq!(TaskPriority::default(), TaskPriority::Normal);
    }

    #[test]
    fn test_status_filter_from_str() {
        assert_eq!(StatusFilter::from_str("all"), Ok(StatusFilter::All));
        assert_eq!(StatusFilter::from_str("pending"), Ok(StatusFilter::Pending));
        assert_eq!(
            StatusFilter::from_str("completed"),
            Ok(StatusFilter::Completed)
        );
        assert!(StatusFilter::from_str("done").is_err());
    }

    #[test]
    fn test_status_filter_matches() {
        let done = Some(Utc::now());

        assert!(StatusFilter::All.matches(None));
        assert!(StatusFilter::All.matches(done));

        assert!(StatusFilter::Pending.matches(None));
        assert!(!StatusFilter::Pending.matches(done));

        assert!(!StatusFilter::Completed.matches(None));
        assert!(StatusFilter::Completed.matches(done));
    }

    #[test]
    fn test_pending_and_completed_partition() {
        // Every task matches exactly one of the two narrow filters.
        for completed_at in [None, Some(Utc::now())] {
            let pending = StatusFilter::Pending.matches(completed_at);
            let completed = StatusFilter::Completed.matches(completed_at);
            assert!(pending != completed);
            assert!(StatusFilter::All.matches(completed_at));
        }
    }

    #[test]
    fn test_is_completed() {
        assert!(!sample_task(None).is_completed());
        assert!(sample_task(Some(Utc::now())).is_completed());
    }
}
