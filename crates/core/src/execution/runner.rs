//! Process invocation boundary
//!
//! Tasks never spawn processes themselves; they build a [`Command`] and hand
//! it to the context's [`ProcessRunner`]. The system implementation blocks
//! until the process exits. Swapping the runner out swaps every process
//! effect in the run, which is how dry runs and tests observe invocations
//! without spawning anything.

use std::io;
use std::process::{Child, Command as OsCommand};
use std::thread;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::execution::command::Command;
use crate::types::{AnvilError, AnvilResult};

/// How often a timed invocation is polled for completion.
const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Capability for running external processes to completion.
pub trait ProcessRunner {
    /// Run the command and return its exit code.
    ///
    /// A nonzero exit code is not an error at this boundary; tasks decide
    /// what a nonzero code means for them.
    fn run(&self, command: &Command) -> AnvilResult<i32>;
}

/// Runner backed by real operating system processes.
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(&self, command: &Command) -> AnvilResult<i32> {
        let mut os_command = OsCommand::new(&command.program);
        os_command.args(&command.args);
        if let Some(dir) = &command.working_dir {
            os_command.current_dir(dir);
        }

        debug!(command = %command.display_line(), "spawning process");

        match command.timeout {
            None => {
                let status = os_command
                    .status()
                    .map_err(|error| spawn_error(command, error))?;
                Ok(status.code().unwrap_or(-1))
            }
            Some(timeout) => run_with_timeout(&mut os_command, command, timeout),
        }
    }
}

fn run_with_timeout(
    os_command: &mut OsCommand,
    command: &Command,
    timeout: Duration,
) -> AnvilResult<i32> {
    let mut child = os_command
        .spawn()
        .map_err(|error| spawn_error(command, error))?;
    let started = Instant::now();

    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(status.code().unwrap_or(-1)),
            Ok(None) => {}
            Err(error) => {
                kill_and_reap(&mut child);
                return Err(AnvilError::Io(error));
            }
        }

        if started.elapsed() >= timeout {
            kill_and_reap(&mut child);
            return Err(AnvilError::ToolTimedOut {
                tool: command.program.display().to_string(),
                timeout,
            });
        }

        thread::sleep(POLL_INTERVAL);
    }
}

/// Terminate a child that will not be polled again.
///
/// The child may have exited between the poll and the kill; the wait reaps
/// it either way.
fn kill_and_reap(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

fn spawn_error(command: &Command, error: io::Error) -> AnvilError {
    if error.kind() == io::ErrorKind::NotFound {
        AnvilError::ToolNotFound(command.program.display().to_string())
    } else {
        AnvilError::Io(error)
    }
}
