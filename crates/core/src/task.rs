//! Task lifecycle
//!
//! A task is a value: a constructor function builds it, chainable methods
//! refine it, and [`Task::run`] consumes it. Between construction and
//! execution sits [`Task::before_execute`], where a task fills in whatever
//! the script left unsaid from the run's properties. Explicit settings win
//! over properties, which win over hard-coded defaults, and filling in
//! defaults is idempotent: it only ever adds what is missing.

use crate::context::Context;
use crate::types::{AnvilError, AnvilResult};

pub trait Task {
    /// The value a successful execution produces.
    type Output;

    /// Human-readable description of what the task will do.
    ///
    /// Derived from the task's own settings unless a description was set
    /// explicitly.
    fn description(&self) -> String;

    /// Fill in missing defaults from the run context.
    ///
    /// Must be idempotent and must never overwrite anything set explicitly
    /// on the task.
    fn before_execute(&mut self, _ctx: &Context) -> AnvilResult<()> {
        Ok(())
    }

    /// Perform the task's effect.
    fn execute(&mut self, ctx: &Context) -> AnvilResult<Self::Output>;

    /// Run the full lifecycle: defaults first, then the effect.
    ///
    /// Consumes the task; a finished task cannot be run again.
    fn run(mut self, ctx: &Context) -> AnvilResult<Self::Output>
    where
        Self: Sized,
    {
        self.before_execute(ctx)?;
        self.execute(ctx)
    }
}

/// Flip a task's completion flag, rejecting a second `execute` call.
///
/// [`Task::run`] already prevents reuse by consuming the task; this guard
/// covers callers driving `execute` directly through a mutable reference.
pub fn mark_started(done: &mut bool, task: &str) -> AnvilResult<()> {
    if *done {
        return Err(AnvilError::TaskState(format!(
            "task '{}' has already executed and cannot run again",
            task
        )));
    }
    *done = true;
    Ok(())
}
