//! Linux service management tasks

use std::time::Duration;

use tracing::info;

use crate::context::Context;
use crate::execution::command::Command;
use crate::platform;
use crate::task::{mark_started, Task};
use crate::types::{AnvilError, AnvilResult};

/// Runs `systemctl <command> <unit>`.
///
/// The systemctl path comes from the platform table and is trusted
/// unchecked; on hosts without it the invocation fails to spawn.
#[derive(Debug)]
pub struct SystemctlTask {
    command: String,
    unit: String,
    timeout: Option<Duration>,
    description: Option<String>,
    done: bool,
}

impl SystemctlTask {
    pub fn new(command: impl Into<String>, unit: impl Into<String>) -> Self {
        SystemctlTask {
            command: command.into(),
            unit: unit.into(),
            timeout: None,
            description: None,
            done: false,
        }
    }

    /// Kill the invocation if it runs longer than this.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Describe the task explicitly instead of deriving a description.
    pub fn with_description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }
}

impl Task for SystemctlTask {
    type Output = i32;

    fn description(&self) -> String {
        match &self.description {
            Some(text) => text.clone(),
            None => format!("Executes systemctl {} {}.", self.command, self.unit),
        }
    }

    fn execute(&mut self, ctx: &Context) -> AnvilResult<i32> {
        let description = self.description();
        mark_started(&mut self.done, &description)?;

        let mut command = Command::new(platform::SYSTEMCTL_PATH)
            .arg(&self.command)
            .arg(&self.unit);
        if let Some(timeout) = self.timeout {
            command = command.timeout(timeout);
        }

        info!(command = %command.display_line(), "running systemctl");
        let code = ctx.runner().run(&command)?;
        if code != 0 {
            return Err(AnvilError::ToolFailed {
                tool: format!("systemctl {}", self.command),
                code,
            });
        }
        Ok(code)
    }
}
