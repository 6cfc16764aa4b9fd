//! QueueRenderer 实现：人类可读的日志行与机器可读的 JSONL

pub mod console;
pub mod jsonl;

pub use console::ConsoleRenderer;
pub use jsonl::JsonlRenderer;
