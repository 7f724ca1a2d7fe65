//! Anvil Core Library
//!
//! This is the core library for the Anvil build-task runner. Build scripts
//! written against it declare tasks (dotnet builds, archive extraction,
//! service control) through constructor functions and chainable builders;
//! each task resolves to an external process invocation or a local file
//! operation when it runs.
//!
//! ## Architecture
//!
//! The core library is organized into several modules:
//!
//! - [`task`] - The task lifecycle: defaults, execution, completion
//! - [`context`] - Per-run context owning properties and the process capability
//! - [`props`] - Typed property store seeded by scripts and configuration
//! - [`execution`] - Process invocation boundary with system and mock runners
//! - [`fluent`] - Constructor functions for composing build scripts
//! - [`tasks`] - Built-in tasks for the dotnet CLI, archives, version updates, and systemctl
//! - [`configs`] - Configuration parsing that seeds the property store
//! - [`platform`] - Fixed tool locations per host platform
//! - [`types`] - Common error types and type aliases
//!
//! ## Usage
//!
//! A build script seeds a [`Context`] and runs tasks against it:
//!
//! ```rust,no_run
//! use anvil_core::context::Context;
//! use anvil_core::fluent::core_tasks;
//! use anvil_core::props::keys;
//! use anvil_core::task::Task;
//!
//! # fn example() -> anvil_core::types::AnvilResult<()> {
//! let mut ctx = Context::new();
//! ctx.props_mut()
//!     .set(keys::BUILD_CONFIGURATION, "Release".to_string());
//!
//! core_tasks::restore("App.sln", ".").run(&ctx)?;
//! core_tasks::build("App.sln").no_incremental().run(&ctx)?;
//! # Ok(())
//! # }
//! ```

pub mod configs;
pub mod context;
pub mod execution;
pub mod fluent;
pub mod platform;
pub mod props;
pub mod task;
pub mod tasks;
pub mod types;

// Re-export the main types for easier usage
pub use context::Context;
pub use task::Task;
pub use types::{AnvilError, AnvilResult};
