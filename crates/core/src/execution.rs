//! Process execution module
//!
//! This module is the boundary between tasks and the operating system: tasks
//! resolve what to run into a [`Command`] value, and a [`ProcessRunner`]
//! decides how it actually runs (for real, or recorded by a mock).

pub mod command;
pub mod mock;
pub mod runner;

pub use command::Command;
pub use mock::MockRunner;
pub use runner::{ProcessRunner, SystemRunner};
