/// Task gateway trait and types
///
/// The list view never talks to storage directly; server mutations go
/// through this contract so the view logic stays independent of the
/// transport. The production implementation wraps HTTP calls to the
/// TownDesk API; `MockGateway` backs tests and demos.
///
/// # Example
///
/// ```
/// use towndesk_view::gateway::{MockGateway, TaskGateway};
/// use uuid::Uuid;
///
/// # async fn example() {
/// let gateway = MockGateway::new([]);
/// let result = gateway.toggle_completion(Uuid::new_v4()).await;
/// assert!(result.is_err());
/// # }
/// ```
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Mutex;
use towndesk_shared::lifecycle;
use towndesk_shared::models::task::Task;
use uuid::Uuid;

/// Errors from server mutations issued by the view
#[derive(Debug, Clone, thiserror::Error)]
pub enum GatewayError {
    /// The server no longer knows the task
    #[error("task not found")]
    NotFound,

    /// The request did not complete
    #[error("request failed: {0}")]
    Transport(String),
}

/// Server mutations available to the list view
///
/// Requests are asynchronous and not cancellable once issued; the view
/// keeps at most one in flight at a time.
#[async_trait]
pub trait TaskGateway: Send + Sync {
    /// Flips the completion state of a task on the server
    ///
    /// Returns the canonical record after the write.
    async fn toggle_completion(&self, id: Uuid) -> Result<Task, GatewayError>;
}

/// In-memory gateway for testing and demos
///
/// Simulates server state with a task map. A queued failure is returned
/// once instead of applying the mutation, which is how tests exercise
/// the view's rollback path deterministically.
pub struct MockGateway {
    tasks: Mutex<HashMap<Uuid, Task>>,
    fail_next: Mutex<Option<GatewayError>>,
}

impl MockGateway {
    /// Creates a mock gateway seeded with server-side tasks
    pub fn new(tasks: impl IntoIterator<Item = Task>) -> Self {
        Self {
            tasks: Mutex::new(tasks.into_iter().map(|task| (task.id, task)).collect()),
            fail_next: Mutex::new(None),
        }
    }

    /// Queues a failure for the next mutation
    pub fn fail_next(&self, error: GatewayError) {
        *self.fail_next.lock().unwrap() = Some(error);
    }

    /// Reads the simulated server copy of a task
    pub fn task(&self, id: Uuid) -> Option<Task> {
        self.tasks.lock().unwrap().get(&id).cloned()
    }
}

#[async_trait]
impl TaskGateway for MockGateway {
    async fn toggle_completion(&self, id: Uuid) -> Result<Task, GatewayError> {
        if let Some(error) = self.fail_next.lock().unwrap().take() {
            return Err(error);
        }

        let mut tasks = self.tasks.lock().unwrap();
        let task = tasks.get_mut(&id).ok_or(GatewayError::NotFound)?;

        let now = Utc::now();
        task.completed_at = lifecycle::toggled_completion(task.completed_at, now);
        task.updated_at = now;

        Ok(task.clone())
    }
}
