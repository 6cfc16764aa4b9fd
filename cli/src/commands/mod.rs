pub mod cli;
pub mod install;
pub mod preset;
pub mod transfer;
pub mod update;
