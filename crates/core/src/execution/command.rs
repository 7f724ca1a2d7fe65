//! Resolved process invocations
//!
//! A [`Command`] is the value a task hands to its
//! [`ProcessRunner`](crate::execution::runner::ProcessRunner): the executable
//! it resolved, the accumulated arguments in order, and the run constraints.

use std::path::PathBuf;
use std::time::Duration;

/// One fully resolved external process invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    /// Absolute path of the executable to run.
    pub program: PathBuf,
    /// Arguments in the order they were accumulated.
    pub args: Vec<String>,
    /// Directory the process runs in; the runner's own when unset.
    pub working_dir: Option<PathBuf>,
    /// Maximum run time; unlimited when unset.
    pub timeout: Option<Duration>,
}

impl Command {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Command {
            program: program.into(),
            args: Vec::new(),
            working_dir: None,
            timeout: None,
        }
    }

    /// Append one argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append arguments in order.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Run the process in this directory.
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Kill the process if it runs longer than this.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// The invocation as a single loggable line.
    pub fn display_line(&self) -> String {
        if self.args.is_empty() {
            self.program.display().to_string()
        } else {
            format!("{} {}", self.program.display(), self.args.join(" "))
        }
    }
}
