//! Per-run execution context
//!
//! One [`Context`] exists per run. It owns the run's [`PropertyStore`] and
//! the process capability every process-invoking task goes through. Tasks
//! receive it by reference; it is deliberately not `Clone`, so properties and
//! recorded invocations cannot diverge across copies mid-run.

use crate::execution::mock::MockRunner;
use crate::execution::runner::{ProcessRunner, SystemRunner};
use crate::props::PropertyStore;

pub struct Context {
    props: PropertyStore,
    runner: Box<dyn ProcessRunner>,
}

impl Context {
    /// A context that spawns real processes.
    pub fn new() -> Self {
        Self::with_runner(Box::new(SystemRunner))
    }

    /// A context with an injected process capability.
    pub fn with_runner(runner: Box<dyn ProcessRunner>) -> Self {
        Context {
            props: PropertyStore::new(),
            runner,
        }
    }

    /// A context that records invocations instead of spawning them.
    ///
    /// Returns the context together with a handle observing every command
    /// tasks hand to it.
    pub fn recording() -> (Self, MockRunner) {
        let runner = MockRunner::new();
        (Self::with_runner(Box::new(runner.clone())), runner)
    }

    pub fn props(&self) -> &PropertyStore {
        &self.props
    }

    pub fn props_mut(&mut self) -> &mut PropertyStore {
        &mut self.props
    }

    pub fn runner(&self) -> &dyn ProcessRunner {
        self.runner.as_ref()
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}
