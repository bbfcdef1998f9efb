//! Domain model: what flows between the coordinator, the worker loops and
//! the handlers.
//!
//! - **ids**: `TaskId` (coordinator-assigned) and `WorkerId` (local ULID)
//! - **task**: `TaskType`, `Task`
//! - **result**: `TaskResult`, `TaskResultStatus`, `TaskExecLog`

pub mod ids;
pub mod result;
pub mod task;

pub use ids::{Id, IdMarker, TaskId, WorkerId};
pub use result::{TaskExecLog, TaskResult, TaskResultStatus};
pub use task::{Task, TaskType};
