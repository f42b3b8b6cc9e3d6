/// Client-side task list state
///
/// `TaskListView` mirrors a task list already fetched from the server
/// and applies search and status filtering in memory. It owns no
/// persistence: create, update and delete round-trip to the server and
/// the whole list is replaced afterwards via [`TaskListView::replace_tasks`].
///
/// Completion toggling is the one optimistic operation: the flip is
/// applied locally first for immediate feedback, then the server
/// mutation is issued. Each attempt moves through an explicit state
/// machine so rollback behavior is observable:
///
/// ```text
/// applied-locally ──> confirmed   (server accepted; canonical record adopted)
///                └──> reverted    (server failed; local flip rolled back)
/// ```
///
/// The view runs single-threaded on user-interaction and response
/// callbacks, so no locking is involved.
use chrono::{DateTime, Utc};
use towndesk_shared::lifecycle;
use towndesk_shared::models::task::{StatusCounts, StatusFilter, Task};
use uuid::Uuid;

use crate::gateway::{GatewayError, TaskGateway};

/// Where a toggle attempt currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleState {
    /// Flip applied to the local mirror, server response pending
    AppliedLocally,

    /// Server accepted the flip; local task replaced with the canonical record
    Confirmed,

    /// Server rejected or failed; local flip rolled back
    Reverted,
}

/// Record of the most recent toggle attempt
#[derive(Debug, Clone)]
pub struct ToggleAttempt {
    /// Task the toggle targeted
    pub task_id: Uuid,

    /// Completion timestamp before the optimistic flip, restored on rollback
    pub previous: Option<DateTime<Utc>>,

    /// Current state of the attempt
    pub state: ToggleState,
}

/// Errors surfaced by view operations
#[derive(Debug, thiserror::Error)]
pub enum ViewError {
    /// The id is not in the local mirror
    #[error("no task with id {0} in the list")]
    UnknownTask(Uuid),

    /// The server mutation failed; the local flip was rolled back
    #[error("toggle failed and was rolled back: {0}")]
    ToggleRolledBack(#[from] GatewayError),
}

/// In-memory list view over fetched tasks
#[derive(Debug, Default)]
pub struct TaskListView {
    tasks: Vec<Task>,

    /// Free-text search applied to titles, case-insensitive
    pub search_term: String,

    /// Completion-status filter
    pub status_filter: StatusFilter,

    last_toggle: Option<ToggleAttempt>,
}

impl TaskListView {
    /// Creates a view over a server-provided task list
    ///
    /// The list is expected in server order (most-recently-updated
    /// first); the view never re-sorts it.
    pub fn new(tasks: Vec<Task>) -> Self {
        Self {
            tasks,
            search_term: String::new(),
            status_filter: StatusFilter::All,
            last_toggle: None,
        }
    }

    /// Replaces the local mirror after a server round trip
    pub fn replace_tasks(&mut self, tasks: Vec<Task>) {
        self.tasks = tasks;
    }

    /// All tasks in the local mirror, unfiltered
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Record of the most recent completion toggle, if any
    pub fn last_toggle(&self) -> Option<&ToggleAttempt> {
        self.last_toggle.as_ref()
    }

    /// Tasks passing both the search term and the status filter
    ///
    /// The two filters compose by intersection. Ordering is stable:
    /// items keep their position from the server-provided list no
    /// matter how the filters change.
    pub fn visible_tasks(&self) -> Vec<&Task> {
        let needle = self.search_term.to_lowercase();

        self.tasks
            .iter()
            .filter(|task| needle.is_empty() || task.title.to_lowercase().contains(&needle))
            .filter(|task| self.status_filter.matches(task.completed_at))
            .collect()
    }

    /// Tallies over the full local mirror, ignoring active filters
    pub fn counts(&self) -> StatusCounts {
        let completed = self
            .tasks
            .iter()
            .filter(|task| task.is_completed())
            .count() as i64;
        let all = self.tasks.len() as i64;

        StatusCounts {
            all,
            pending: all - completed,
            completed,
        }
    }

    /// Toggles a task's completion optimistically
    ///
    /// The flip is applied to the local mirror immediately, then the
    /// server mutation is issued. On success the canonical record from
    /// the server replaces the local task; on failure the flip is
    /// rolled back to its pre-toggle value and the error is returned.
    pub async fn toggle_completion(
        &mut self,
        id: Uuid,
        gateway: &dyn TaskGateway,
    ) -> Result<(), ViewError> {
        let previous = {
            let task = self.task_mut(id).ok_or(ViewError::UnknownTask(id))?;
            let previous = task.completed_at;
            task.completed_at = lifecycle::toggled_completion(previous, Utc::now());
            previous
        };

        self.last_toggle = Some(ToggleAttempt {
            task_id: id,
            previous,
            state: ToggleState::AppliedLocally,
        });

        match gateway.toggle_completion(id).await {
            Ok(canonical) => {
                if let Some(task) = self.task_mut(id) {
                    *task = canonical;
                }
                self.set_toggle_state(ToggleState::Confirmed);
                Ok(())
            }
            Err(error) => {
                if let Some(task) = self.task_mut(id) {
                    task.completed_at = previous;
                }
                self.set_toggle_state(ToggleState::Reverted);
                Err(ViewError::ToggleRolledBack(error))
            }
        }
    }

    fn task_mut(&mut self, id: Uuid) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|task| task.id == id)
    }

    fn set_toggle_state(&mut self, state: ToggleState) {
        if let Some(attempt) = self.last_toggle.as_mut() {
            attempt.state = state;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::MockGateway;
    use towndesk_shared::models::task::TaskPriority;

    fn task(title: &str, completed: bool) -> Task {
        let now = Utc::now();
        Task {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: None,
            priority: TaskPriority::Normal,
            due_date: None,
            completed_at: completed.then(|| now),
            modified_by: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    fn sample_list() -> Vec<Task> {
        vec![
            task("Water main break repair update", false),
            task("Send water quality report to EPA", true),
            task("Town hall meeting announcement", false),
            task("Library closure for renovations", true),
        ]
    }

    #[test]
    fn test_no_filters_shows_everything_in_order() {
        let view = TaskListView::new(sample_list());
        let titles: Vec<&str> = view
            .visible_tasks()
            .iter()
            .map(|t| t.title.as_str())
            .collect();

        assert_eq!(
            titles,
            vec![
                "Water main break repair update",
                "Send water quality report to EPA",
                "Town hall meeting announcement",
                "Library closure for renovations",
            ]
        );
    }

    #[test]
    fn test_search_is_case_insensitive_substring() {
        let mut view = TaskListView::new(sample_list());
        view.search_term = "WATER".to_string();

        let titles: Vec<&str> = view
            .visible_tasks()
            .iter()
            .map(|t| t.title.as_str())
            .collect();

        assert_eq!(
            titles,
            vec![
                "Water main break repair update",
                "Send water quality report to EPA",
            ]
        );
    }

    #[test]
    fn test_search_and_status_compose_by_intersection() {
        let mut view = TaskListView::new(sample_list());
        view.search_term = "water".to_string();
        view.status_filter = StatusFilter::Pending;

        let visible = view.visible_tasks();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].title, "Water main break repair update");
    }

    #[test]
    fn test_status_filter_alone() {
        let mut view = TaskListView::new(sample_list());
        view.status_filter = StatusFilter::Completed;

        assert!(view.visible_tasks().iter().all(|t| t.is_completed()));
        assert_eq!(view.visible_tasks().len(), 2);
    }

    #[test]
    fn test_counts_ignore_active_filters() {
        let mut view = TaskListView::new(sample_list());
        view.search_term = "water".to_string();

        let counts = view.counts();
        assert_eq!(counts.all, 4);
        assert_eq!(counts.pending, 2);
        assert_eq!(counts.completed, 2);
    }

    #[tokio::test]
    async fn test_toggle_confirms_and_adopts_canonical_record() {
        let tasks = sample_list();
        let id = tasks[0].id;
        let gateway = MockGateway::new(tasks.clone());
        let mut view = TaskListView::new(tasks);

        view.toggle_completion(id, &gateway).await.unwrap();

        let attempt = view.last_toggle().unwrap();
        assert_eq!(attempt.state, ToggleState::Confirmed);
        assert_eq!(attempt.task_id, id);
        assert_eq!(attempt.previous, None);

        // Local mirror now carries the server's canonical record.
        let local = view.tasks().iter().find(|t| t.id == id).unwrap();
        let server = gateway.task(id).unwrap();
        assert!(local.is_completed());
        assert_eq!(local.completed_at, server.completed_at);
    }

    #[tokio::test]
    async fn test_toggle_failure_rolls_back_local_flip() {
        let tasks = sample_list();
        let id = tasks[1].id;
        let before = tasks[1].completed_at;
        let gateway = MockGateway::new(tasks.clone());
        gateway.fail_next(GatewayError::Transport("connection reset".to_string()));
        let mut view = TaskListView::new(tasks);

        let error = view.toggle_completion(id, &gateway).await.unwrap_err();
        assert!(matches!(error, ViewError::ToggleRolledBack(_)));

        let attempt = view.last_toggle().unwrap();
        assert_eq!(attempt.state, ToggleState::Reverted);

        // The pre-toggle value is restored exactly.
        let local = view.tasks().iter().find(|t| t.id == id).unwrap();
        assert_eq!(local.completed_at, before);
    }

    #[tokio::test]
    async fn test_toggle_twice_returns_to_original_state() {
        let tasks = sample_list();
        let id = tasks[0].id;
        let gateway = MockGateway::new(tasks.clone());
        let mut view = TaskListView::new(tasks);

        view.toggle_completion(id, &gateway).await.unwrap();
        view.toggle_completion(id, &gateway).await.unwrap();

        let local = view.tasks().iter().find(|t| t.id == id).unwrap();
        assert!(!local.is_completed());
    }

    #[tokio::test]
    async fn test_toggle_unknown_task_touches_nothing() {
        let gateway = MockGateway::new([]);
        let mut view = TaskListView::new(sample_list());

        let error = view
            .toggle_completion(Uuid::new_v4(), &gateway)
            .await
            .unwrap_err();

        assert!(matches!(error, ViewError::UnknownTask(_)));
        assert!(view.last_toggle().is_none());
    }

    #[tokio::test]
    async fn test_completed_task_moves_between_filters() {
        let tasks = sample_list();
        let id = tasks[0].id;
        let gateway = MockGateway::new(tasks.clone());
        let mut view = TaskListView::new(tasks);

        view.status_filter = StatusFilter::Pending;
        assert!(view.visible_tasks().iter().any(|t| t.id == id));

        view.toggle_completion(id, &gateway).await.unwrap();

        assert!(!view.visible_tasks().iter().any(|t| t.id == id));
        view.status_filter = StatusFilter::Completed;
        assert!(view.visible_tasks().iter().any(|t| t.id == id));
    }
}
