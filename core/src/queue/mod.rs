//! Sequential plugin-processing queue
//!
//! A queue walks an ordered list of install tasks strictly one at a time.
//! Each task settles to `Succeeded` or `Failed`; a failure never halts the
//! run, the driver simply moves on to the next index.
//!
//! # Lifecycle
//!
//! ```text
//! Selection (checked rows)
//!   ↓
//! QueueDriver::start()      → EmptyQueue | controls locked, start line logged
//!   ↓
//! QueueDriver::advance()    → Waiting → InProgress → Succeeded | Failed
//!   ↓ (repeat until cursor == len)
//! QueueDriver::finalize()   → start control shows "Finished"
//! ```

mod controls;
mod driver;
mod log;
mod progress;
mod render;
mod transitions;
mod types;

pub use controls::{Controls, StartLabel};
pub use driver::{QueueDriver, Step};
pub use log::{LogKind, LogLine, QueueLog};
pub use progress::ProgressMonitor;
pub use render::{QueueEvent, QueueRenderer};
pub use transitions::TaskTransition;
pub use types::{Queue, QueueSummary, SelectionItem, Task, TaskStatus};
