use thiserror::Error;

use crate::queue::TaskStatus;

/// Errors raised while building or driving a queue.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueueError {
    /// Nothing was selected when the run was started.
    #[error("Please select at least one plugin to install.")]
    EmptyQueue,

    #[error("queue has not been started")]
    NotStarted,

    #[error("queue already started; build a new one to run again")]
    AlreadyStarted,

    #[error("task transition rejected: {0}")]
    Transition(#[from] TransitionError),
}

/// Task status transition errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Invalid transition from {from:?} to {to:?}")]
    InvalidTransition { from: TaskStatus, to: TaskStatus },
    #[error("Cannot transition from terminal state {state:?}")]
    FromTerminalState { state: TaskStatus },
}
