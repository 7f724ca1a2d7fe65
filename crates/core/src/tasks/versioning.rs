//! Project version update tasks

use std::fs;
use std::path::PathBuf;

use tracing::info;

use crate::context::Context;
use crate::props::keys;
use crate::task::{mark_started, Task};
use crate::types::{AnvilError, AnvilResult};

/// Rewrites the `<Version>` element in a set of project files.
///
/// The version comes from the chain, or from [`keys::BUILD_VERSION`] when
/// the script left it out. Matching is exact on the tag: `<VersionPrefix>`
/// and other near-matches pass through untouched, as does any file with no
/// version element at all.
#[derive(Debug, Default)]
pub struct UpdateVersionTask {
    files: Vec<PathBuf>,
    version: Option<String>,
    description: Option<String>,
    done: bool,
}

impl UpdateVersionTask {
    pub fn new(file: impl Into<PathBuf>) -> Self {
        UpdateVersionTask {
            files: vec![file.into()],
            version: None,
            description: None,
            done: false,
        }
    }

    /// Update this file as well.
    pub fn file(mut self, file: impl Into<PathBuf>) -> Self {
        self.files.push(file.into());
        self
    }

    /// Write this version instead of reading [`keys::BUILD_VERSION`].
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Describe the task explicitly instead of deriving a description.
    pub fn with_description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    /// The files the task will rewrite, in order.
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }
}

impl Task for UpdateVersionTask {
    type Output = i32;

    fn description(&self) -> String {
        match &self.description {
            Some(text) => text.clone(),
            None => "Updates the version in project files.".to_string(),
        }
    }

    /// Fill in the version from [`keys::BUILD_VERSION`] when none was chained.
    fn before_execute(&mut self, ctx: &Context) -> AnvilResult<()> {
        if self.version.is_none() {
            self.version = ctx.props().get(keys::BUILD_VERSION);
        }
        Ok(())
    }

    fn execute(&mut self, _ctx: &Context) -> AnvilResult<i32> {
        let description = self.description();
        mark_started(&mut self.done, &description)?;

        let Some(version) = &self.version else {
            return Err(AnvilError::Config(
                "No version set; set one on the task or in the run properties".to_string(),
            ));
        };
        if self.files.is_empty() {
            return Err(AnvilError::Task("No project files to update".to_string()));
        }

        for file in &self.files {
            let contents = fs::read_to_string(file)?;
            let (updated, replaced) = replace_version_elements(&contents, version);
            if replaced > 0 {
                fs::write(file, updated)?;
            }
            info!(
                file = %file.display(),
                version = %version,
                replaced,
                "project version updated"
            );
        }
        Ok(0)
    }
}

/// Rewrite the content of every `<Version>` element in `contents`.
///
/// Returns the rewritten text and the number of elements rewritten. An
/// element left unclosed is kept verbatim.
fn replace_version_elements(contents: &str, version: &str) -> (String, usize) {
    const OPEN: &str = "<Version>";
    const CLOSE: &str = "</Version>";

    let mut output = String::with_capacity(contents.len());
    let mut rest = contents;
    let mut replaced = 0;

    while let Some(start) = rest.find(OPEN) {
        let value_start = start + OPEN.len();
        let Some(value_len) = rest[value_start..].find(CLOSE) else {
            break;
        };
        output.push_str(&rest[..value_start]);
        output.push_str(version);
        rest = &rest[value_start + value_len..];
        replaced += 1;
    }

    output.push_str(rest);
    (output, replaced)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    const PROJECT: &str = r#"<Project Sdk="Microsoft.NET.Sdk">
  <PropertyGroup>
    <TargetFramework>net8.0</TargetFramework>
    <Version>0.1.0</Version>
  </PropertyGroup>
</Project>
"#;

    fn project_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_version_element_is_rewritten() {
        let dir = tempfile::tempdir().unwrap();
        let project = project_file(dir.path(), "App.csproj", PROJECT);

        let (ctx, _) = Context::recording();
        let code = UpdateVersionTask::new(&project)
            .with_version("2.3.4")
            .run(&ctx)
            .unwrap();

        assert_eq!(code, 0);
        let updated = fs::read_to_string(&project).unwrap();
        assert!(updated.contains("<Version>2.3.4</Version>"));
        assert!(!updated.contains("0.1.0"));
    }

    #[test]
    fn test_every_version_element_is_rewritten() {
        let dir = tempfile::tempdir().unwrap();
        let project = project_file(
            dir.path(),
            "App.csproj",
            "<Version>1</Version><Version>2</Version>",
        );

        let (ctx, _) = Context::recording();
        UpdateVersionTask::new(&project)
            .with_version("9.0.0")
            .run(&ctx)
            .unwrap();

        assert_eq!(
            fs::read_to_string(&project).unwrap(),
            "<Version>9.0.0</Version><Version>9.0.0</Version>"
        );
    }

    #[test]
    fn test_near_matching_elements_are_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let project = project_file(
            dir.path(),
            "App.csproj",
            "<VersionPrefix>1.0</VersionPrefix><Version>1.0</Version>\
             <AssemblyVersion>1.0.0.0</AssemblyVersion>",
        );

        let (ctx, _) = Context::recording();
        UpdateVersionTask::new(&project)
            .with_version("5.0.0")
            .run(&ctx)
            .unwrap();

        let updated = fs::read_to_string(&project).unwrap();
        assert!(updated.contains("<VersionPrefix>1.0</VersionPrefix>"));
        assert!(updated.contains("<Version>5.0.0</Version>"));
        assert!(updated.contains("<AssemblyVersion>1.0.0.0</AssemblyVersion>"));
    }

    #[test]
    fn test_all_chained_files_are_updated() {
        let dir = tempfile::tempdir().unwrap();
        let first = project_file(dir.path(), "First.csproj", PROJECT);
        let second = project_file(dir.path(), "Second.csproj", PROJECT);

        let (ctx, _) = Context::recording();
        UpdateVersionTask::new(&first)
            .file(&second)
            .with_version("1.2.3")
            .run(&ctx)
            .unwrap();

        assert!(fs::read_to_string(&first)
            .unwrap()
            .contains("<Version>1.2.3</Version>"));
        assert!(fs::read_to_string(&second)
            .unwrap()
            .contains("<Version>1.2.3</Version>"));
    }

    #[test]
    fn test_version_falls_back_to_the_property() {
        let dir = tempfile::tempdir().unwrap();
        let project = project_file(dir.path(), "App.csproj", PROJECT);

        let (mut ctx, _) = Context::recording();
        ctx.props_mut()
            .set(keys::BUILD_VERSION, "7.7.7".to_string());
        UpdateVersionTask::new(&project).run(&ctx).unwrap();

        assert!(fs::read_to_string(&project)
            .unwrap()
            .contains("<Version>7.7.7</Version>"));
    }

    #[test]
    fn test_chained_version_wins_over_the_property() {
        let dir = tempfile::tempdir().unwrap();
        let project = project_file(dir.path(), "App.csproj", PROJECT);

        let (mut ctx, _) = Context::recording();
        ctx.props_mut()
            .set(keys::BUILD_VERSION, "7.7.7".to_string());
        UpdateVersionTask::new(&project)
            .with_version("8.8.8")
            .run(&ctx)
            .unwrap();

        assert!(fs::read_to_string(&project)
            .unwrap()
            .contains("<Version>8.8.8</Version>"));
    }

    #[test]
    fn test_files_without_a_version_element_pass_through() {
        let dir = tempfile::tempdir().unwrap();
        let contents = "<Project><PropertyGroup /></Project>";
        let project = project_file(dir.path(), "App.csproj", contents);

        let (ctx, _) = Context::recording();
        let code = UpdateVersionTask::new(&project)
            .with_version("2.0.0")
            .run(&ctx)
            .unwrap();

        assert_eq!(code, 0);
        assert_eq!(fs::read_to_string(&project).unwrap(), contents);
    }

    #[test]
    fn test_unclosed_element_is_kept_verbatim() {
        let (updated, replaced) =
            replace_version_elements("<Version>1.0</Version><Version>2.0", "3.0");

        assert_eq!(updated, "<Version>3.0</Version><Version>2.0");
        assert_eq!(replaced, 1);
    }

    #[test]
    fn test_missing_version_is_a_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let project = project_file(dir.path(), "App.csproj", PROJECT);

        let (ctx, _) = Context::recording();
        let result = UpdateVersionTask::new(&project).run(&ctx);

        assert!(matches!(result, Err(AnvilError::Config(_))));
        assert_eq!(fs::read_to_string(&project).unwrap(), PROJECT);
    }

    #[test]
    fn test_no_files_is_a_task_error() {
        let (ctx, _) = Context::recording();
        let result = UpdateVersionTask::default()
            .with_version("1.0.0")
            .run(&ctx);

        assert!(matches!(result, Err(AnvilError::Task(_))));
    }

    #[test]
    fn test_second_direct_execute_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let project = project_file(dir.path(), "App.csproj", PROJECT);

        let (ctx, _) = Context::recording();
        let mut task = UpdateVersionTask::new(&project).with_version("1.0.0");

        task.execute(&ctx).unwrap();
        let second = task.execute(&ctx);

        assert!(matches!(second, Err(AnvilError::TaskState(_))));
    }
}
