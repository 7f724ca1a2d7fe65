//! Recording process runner
//!
//! [`MockRunner`] records every command it is handed and answers from a
//! scripted queue, which makes it the runner for tests and dry runs. Clones
//! share state, so a test can keep one handle while the context owns another.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::execution::command::Command;
use crate::execution::runner::ProcessRunner;
use crate::types::AnvilResult;

#[derive(Default)]
struct MockState {
    invocations: Mutex<Vec<Command>>,
    results: Mutex<VecDeque<AnvilResult<i32>>>,
}

/// Process runner that records invocations instead of spawning them.
///
/// Every run returns exit code `0` unless a result was queued with
/// [`MockRunner::enqueue_result`]; queued results are consumed in order.
#[derive(Clone, Default)]
pub struct MockRunner {
    state: Arc<MockState>,
}

impl MockRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the outcome of the next unscripted run.
    pub fn enqueue_result(&self, result: AnvilResult<i32>) {
        lock(&self.state.results).push_back(result);
    }

    /// Every command run so far, in order.
    pub fn invocations(&self) -> Vec<Command> {
        lock(&self.state.invocations).clone()
    }

    /// The most recent command, if any.
    pub fn last_invocation(&self) -> Option<Command> {
        lock(&self.state.invocations).last().cloned()
    }
}

impl ProcessRunner for MockRunner {
    fn run(&self, command: &Command) -> AnvilResult<i32> {
        lock(&self.state.invocations).push(command.clone());
        lock(&self.state.results).pop_front().unwrap_or(Ok(0))
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
