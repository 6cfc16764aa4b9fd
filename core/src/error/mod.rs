#[allow(clippy::module_inception)]
pub mod error;
pub mod executor;
pub mod preset;
pub mod queue;

pub use error::{CliError, StoreError};
pub use executor::ExecuteError;
pub use preset::{SlugError, TransferError};
pub use queue::{QueueError, TransitionError};
