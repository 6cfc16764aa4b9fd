//! 任务状态转换规则和验证

use super::types::TaskStatus;
use crate::error::TransitionError;

/// 任务状态转换
pub struct TaskTransition;

impl TaskTransition {
    /// 验证状态转换是否合法
    pub fn validate(from: TaskStatus, to: TaskStatus) -> Result<(), TransitionError> {
        // 终态不能转换
        if Self::is_terminal(from) {
            return Err(TransitionError::FromTerminalState { state: from });
        }

        let is_valid = matches!(
            (from, to),
            (TaskStatus::Waiting, TaskStatus::InProgress)
                | (TaskStatus::InProgress, TaskStatus::Succeeded)
                | (TaskStatus::InProgress, TaskStatus::Failed)
        );

        if is_valid {
            Ok(())
        } else {
            Err(TransitionError::InvalidTransition { from, to })
        }
    }

    /// 判断是否为终态
    pub fn is_terminal(status: TaskStatus) -> bool {
        matches!(status, TaskStatus::Succeeded | TaskStatus::Failed)
    }
}
