//! Dotnet CLI tasks
//!
//! [`DotnetTask`] runs any dotnet verb with whatever arguments were chained
//! onto it, in the order they were chained. [`DotnetBuildTask`] layers the
//! build verb's flags on top and fills in a project and configuration from
//! the run properties when the script left them out.
//!
//! The executable is resolved when the task executes, never cached:
//! an explicit path on the task wins, then [`keys::DOTNET_EXECUTABLE`] from
//! the property store, then the platform policy table in
//! [`platform`](crate::platform).

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use tracing::info;

use crate::context::Context;
use crate::execution::command::Command;
use crate::platform;
use crate::props::keys;
use crate::task::{mark_started, Task};
use crate::types::{AnvilError, AnvilResult};

/// Verbs understood by the dotnet CLI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DotnetCommand {
    Build,
    Pack,
    Test,
    Run,
    Publish,
    Restore,
    /// Any other verb, passed through verbatim.
    Custom(String),
}

impl DotnetCommand {
    /// The literal verb handed to the CLI.
    pub fn as_str(&self) -> &str {
        match self {
            DotnetCommand::Build => "build",
            DotnetCommand::Pack => "pack",
            DotnetCommand::Test => "test",
            DotnetCommand::Run => "run",
            DotnetCommand::Publish => "publish",
            DotnetCommand::Restore => "restore",
            DotnetCommand::Custom(verb) => verb,
        }
    }
}

impl fmt::Display for DotnetCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A dotnet CLI invocation for one verb.
///
/// Arguments accumulate in the order the chain appends them and are passed
/// to the CLI verbatim after the verb.
#[derive(Debug)]
pub struct DotnetTask {
    command: DotnetCommand,
    args: Vec<String>,
    working_dir: Option<PathBuf>,
    executable: Option<PathBuf>,
    timeout: Option<Duration>,
    description: Option<String>,
    done: bool,
}

impl DotnetTask {
    pub fn new(command: DotnetCommand) -> Self {
        DotnetTask {
            command,
            args: Vec::new(),
            working_dir: None,
            executable: None,
            timeout: None,
            description: None,
            done: false,
        }
    }

    /// A verb outside the well-known set.
    pub fn custom(verb: impl Into<String>) -> Self {
        Self::new(DotnetCommand::Custom(verb.into()))
    }

    /// Append one argument.
    pub fn with_argument(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append arguments in order.
    pub fn with_arguments<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Directory the process runs in.
    pub fn working_folder(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Use this executable instead of resolving one.
    pub fn executable(mut self, path: impl Into<PathBuf>) -> Self {
        self.executable = Some(path.into());
        self
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

    /// The verb this task runs.
    pub fn command(&self) -> &DotnetCommand {
        &self.command
    }

    /// The accumulated arguments, in order.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    fn resolve_executable(&self, ctx: &Context) -> AnvilResult<PathBuf> {
        if let Some(path) = &self.executable {
            return Ok(platform::absolutize(path));
        }
        if let Some(path) = ctx.props().get(keys::DOTNET_EXECUTABLE) {
            return Ok(platform::absolutize(&path));
        }
        platform::find_dotnet_executable()
            .ok_or_else(|| AnvilError::ToolNotFound("dotnet".to_string()))
    }
}

impl Task for DotnetTask {
    type Output = i32;

    fn description(&self) -> String {
        match &self.description {
            Some(text) => text.clone(),
            None => format!("Executes dotnet {}.", self.command),
        }
    }

    fn execute(&mut self, ctx: &Context) -> AnvilResult<i32> {
        let description = self.description();
        mark_started(&mut self.done, &description)?;

        let program = self.resolve_executable(ctx)?;
        let mut command = Command::new(program)
            .arg(self.command.as_str())
            .args(self.args.iter().cloned());
        if let Some(dir) = &self.working_dir {
            command = command.current_dir(dir);
        }
        if let Some(timeout) = self.timeout {
            command = command.timeout(timeout);
        }

        info!(command = %command.display_line(), "running dotnet");
        let code = ctx.runner().run(&command)?;
        if code != 0 {
            return Err(AnvilError::ToolFailed {
                tool: format!("dotnet {}", self.command),
                code,
            });
        }
        Ok(code)
    }
}

/// `dotnet build` with its common flags and property-backed defaults.
#[derive(Debug)]
pub struct DotnetBuildTask {
    inner: DotnetTask,
}

impl Default for DotnetBuildTask {
    fn default() -> Self {
        Self::new()
    }
}

impl DotnetBuildTask {
    pub fn new() -> Self {
        DotnetBuildTask {
            inner: DotnetTask::new(DotnetCommand::Build),
        }
    }

    /// The project or solution to build, as the leading positional argument.
    pub fn project(mut self, path: impl Into<String>) -> Self {
        self.inner.args.insert(0, path.into());
        self
    }

    /// Target framework (`-f`).
    pub fn framework(mut self, framework: impl Into<String>) -> Self {
        self.inner.args.push("-f".to_string());
        self.inner.args.push(framework.into());
        self
    }

    /// Target runtime (`-r`).
    pub fn runtime(mut self, runtime: impl Into<String>) -> Self {
        self.inner.args.push("-r".to_string());
        self.inner.args.push(runtime.into());
        self
    }

    /// Build configuration (`-c`).
    pub fn configuration(mut self, configuration: impl Into<String>) -> Self {
        self.inner.args.push("-c".to_string());
        self.inner.args.push(configuration.into());
        self
    }

    /// Skip incremental compilation (`--no-incremental`).
    pub fn no_incremental(mut self) -> Self {
        self.inner.args.push("--no-incremental".to_string());
        self
    }

    /// Skip building project-to-project references (`--no-dependencies`).
    pub fn no_dependencies(mut self) -> Self {
        self.inner.args.push("--no-dependencies".to_string());
        self
    }

    /// Append one argument.
    pub fn with_argument(mut self, arg: impl Into<String>) -> Self {
        self.inner = self.inner.with_argument(arg);
        self
    }

    /// Append arguments in order.
    pub fn with_arguments<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inner = self.inner.with_arguments(args);
        self
    }

    /// Directory the process runs in.
    pub fn working_folder(mut self, dir: impl Into<PathBuf>) -> Self {
        self.inner = self.inner.working_folder(dir);
        self
    }

    /// Use this executable instead of resolving one.
    pub fn executable(mut self, path: impl Into<PathBuf>) -> Self {
        self.inner = self.inner.executable(path);
        self
    }

    /// Kill the invocation if it runs longer than this.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.inner = self.inner.timeout(timeout);
        self
    }

    /// Describe the task explicitly instead of deriving a description.
    pub fn with_description(mut self, text: impl Into<String>) -> Self {
        self.inner = self.inner.with_description(text);
        self
    }

    /// The accumulated arguments, in order.
    pub fn args(&self) -> &[String] {
        self.inner.args()
    }
}

impl Task for DotnetBuildTask {
    type Output = i32;

    fn description(&self) -> String {
        self.inner.description()
    }

    /// Fill in the project and configuration the chain left out.
    ///
    /// The project falls back to [`keys::SOLUTION_FILE`] when the argument
    /// list is empty or leads with a flag; `-c` falls back to
    /// [`keys::BUILD_CONFIGURATION`] when neither `-c` nor `--configuration`
    /// was chained. Already-injected values keep later calls from adding
    /// duplicates.
    fn before_execute(&mut self, ctx: &Context) -> AnvilResult<()> {
        let needs_project = self
            .inner
            .args
            .first()
            .map_or(true, |first| first.starts_with('-'));
        if needs_project {
            if let Some(solution) = ctx.props().get(keys::SOLUTION_FILE) {
                self.inner.args.insert(0, solution);
            }
        }

        let has_configuration = self
            .inner
            .args
            .iter()
            .any(|arg| arg == "-c" || arg == "--configuration");
        if !has_configuration {
            if let Some(configuration) = ctx.props().get(keys::BUILD_CONFIGURATION) {
                self.inner.args.push("-c".to_string());
                self.inner.args.push(configuration);
            }
        }

        Ok(())
    }

    fn execute(&mut self, ctx: &Context) -> AnvilResult<i32> {
        self.inner.execute(ctx)
    }
}
