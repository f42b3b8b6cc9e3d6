//! # TownDesk List View
//!
//! Client-side state for the task dashboard: in-memory search and
//! status filtering over a fetched task list, plus optimistic
//! completion toggling with rollback.
//!
//! ## Modules
//!
//! - `view`: The list view state machine
//! - `gateway`: The server-mutation contract and a mock implementation

pub mod gateway;
pub mod view;

pub use gateway::{GatewayError, MockGateway, TaskGateway};
pub use view::{TaskListView, ToggleAttempt, ToggleState, ViewError};
