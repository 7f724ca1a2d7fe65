//! Entry points for composing build scripts
//!
//! Constructor functions grouped by surface. Each returns a task value ready
//! for chaining; nothing runs until the script calls
//! [`Task::run`](crate::task::Task::run) with its context.
//!
//! ```rust,no_run
//! use anvil_core::context::Context;
//! use anvil_core::fluent::core_tasks;
//! use anvil_core::task::Task;
//!
//! # fn example() -> anvil_core::types::AnvilResult<()> {
//! let ctx = Context::new();
//! core_tasks::build("App.sln").no_incremental().run(&ctx)?;
//! core_tasks::unzip("artifacts.zip", "out").run(&ctx)?;
//! # Ok(())
//! # }
//! ```

/// Tasks for the dotnet CLI and local file operations.
pub mod core_tasks {
    use std::path::PathBuf;

    use crate::tasks::dotnet::{DotnetBuildTask, DotnetCommand, DotnetTask};
    use crate::tasks::packaging::UnzipTask;
    use crate::tasks::versioning::UpdateVersionTask;

    /// `dotnet build` for a project or solution.
    pub fn build(project: impl Into<String>) -> DotnetBuildTask {
        DotnetBuildTask::new().project(project)
    }

    /// `dotnet pack` for a project, run in a working folder.
    pub fn pack(project: impl Into<String>, working_folder: impl Into<PathBuf>) -> DotnetTask {
        DotnetTask::new(DotnetCommand::Pack)
            .with_argument(project)
            .working_folder(working_folder)
    }

    /// `dotnet test` for a project, run in a working folder.
    pub fn test(project: impl Into<String>, working_folder: impl Into<PathBuf>) -> DotnetTask {
        DotnetTask::new(DotnetCommand::Test)
            .with_argument(project)
            .working_folder(working_folder)
    }

    /// `dotnet run` for a project, run in a working folder.
    pub fn run(project: impl Into<String>, working_folder: impl Into<PathBuf>) -> DotnetTask {
        DotnetTask::new(DotnetCommand::Run)
            .with_argument(project)
            .working_folder(working_folder)
    }

    /// `dotnet restore` for a project, run in a working folder.
    pub fn restore(project: impl Into<String>, working_folder: impl Into<PathBuf>) -> DotnetTask {
        DotnetTask::new(DotnetCommand::Restore)
            .with_argument(project)
            .working_folder(working_folder)
    }

    /// `dotnet publish` for a project; the configuration defaults to `Release`.
    pub fn publish(
        project: impl Into<String>,
        working_folder: impl Into<PathBuf>,
        configuration: Option<&str>,
    ) -> DotnetTask {
        DotnetTask::new(DotnetCommand::Publish)
            .with_argument(project)
            .with_arguments(["-c", configuration.unwrap_or("Release")])
            .working_folder(working_folder)
    }

    /// A dotnet invocation with any verb.
    pub fn execute_dotnet(verb: impl Into<String>) -> DotnetTask {
        DotnetTask::custom(verb)
    }

    /// Flat extraction of a zip archive into a directory.
    pub fn unzip(archive: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> UnzipTask {
        UnzipTask::new(archive, destination)
    }

    /// Version rewrite for one project file.
    pub fn update_version(file: impl Into<PathBuf>) -> UpdateVersionTask {
        UpdateVersionTask::new(file)
    }

    /// Version rewrite across a set of project files.
    pub fn update_versions<I, P>(files: I) -> UpdateVersionTask
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        files
            .into_iter()
            .fold(UpdateVersionTask::default(), |task, file| task.file(file))
    }
}

/// Tasks for Linux hosts.
pub mod linux_tasks {
    use crate::tasks::linux::SystemctlTask;

    /// `systemctl <command> <unit>`.
    pub fn systemctl(command: impl Into<String>, unit: impl Into<String>) -> SystemctlTask {
        SystemctlTask::new(command, unit)
    }

    /// `systemctl start <unit>`.
    pub fn start_service(unit: impl Into<String>) -> SystemctlTask {
        SystemctlTask::new("start", unit)
    }

    /// `systemctl stop <unit>`.
    pub fn stop_service(unit: impl Into<String>) -> SystemctlTask {
        SystemctlTask::new("stop", unit)
    }

    /// `systemctl restart <unit>`.
    pub fn restart_service(unit: impl Into<String>) -> SystemctlTask {
        SystemctlTask::new("restart", unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Context;
    use crate::task::Task;

    #[test]
    fn test_build_places_the_project_first() {
        let task = core_tasks::build("App.sln").framework("net8.0");
        assert_eq!(task.args(), ["App.sln", "-f", "net8.0"]);
    }

    #[test]
    fn test_publish_defaults_to_release() {
        let task = core_tasks::publish("App.csproj", "src/app", None);
        assert_eq!(task.args(), ["App.csproj", "-c", "Release"]);
    }

    #[test]
    fn test_publish_honors_an_explicit_configuration() {
        let task = core_tasks::publish("App.csproj", "src/app", Some("Debug"));
        assert_eq!(task.args(), ["App.csproj", "-c", "Debug"]);
    }

    #[test]
    fn test_verb_tasks_run_in_their_working_folder() {
        let (ctx, runner) = Context::recording();

        core_tasks::pack("App.csproj", "src/app")
            .executable("/opt/dotnet/dotnet")
            .run(&ctx)
            .unwrap();

        let command = runner.last_invocation().unwrap();
        assert_eq!(command.args, ["pack", "App.csproj"]);
        assert_eq!(
            command.working_dir,
            Some(std::path::PathBuf::from("src/app"))
        );
    }

    #[test]
    fn test_execute_dotnet_passes_custom_verbs_through() {
        let (ctx, runner) = Context::recording();

        core_tasks::execute_dotnet("nuget")
            .executable("/opt/dotnet/dotnet")
            .with_arguments(["push", "pkg.nupkg"])
            .run(&ctx)
            .unwrap();

        let command = runner.last_invocation().unwrap();
        assert_eq!(command.args, ["nuget", "push", "pkg.nupkg"]);
    }

    #[test]
    fn test_update_version_targets_one_file() {
        let task = core_tasks::update_version("App.csproj");
        assert_eq!(task.files(), [std::path::PathBuf::from("App.csproj")]);
    }

    #[test]
    fn test_update_versions_collects_every_file() {
        let task = core_tasks::update_versions(["A.csproj", "B.csproj"]);
        assert_eq!(
            task.files(),
            [
                std::path::PathBuf::from("A.csproj"),
                std::path::PathBuf::from("B.csproj")
            ]
        );
    }

    #[test]
    fn test_service_helpers_name_their_commands() {
        let (ctx, runner) = Context::recording();

        linux_tasks::restart_service("anvil.service").run(&ctx).unwrap();

        let command = runner.last_invocation().unwrap();
        assert_eq!(command.args, ["restart", "anvil.service"]);
    }
}
