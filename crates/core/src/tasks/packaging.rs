//! Archive handling tasks

use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::context::Context;
use crate::task::{mark_started, Task};
use crate::types::AnvilResult;

/// Extracts every file in a zip archive flat into a destination directory.
///
/// Directory structure recorded in the archive is discarded: each file entry
/// lands directly in the destination under its base name, overwriting any
/// existing file with that name. Later entries win when base names collide.
/// Directory entries are skipped, and the destination is created when it
/// does not exist yet.
#[derive(Debug)]
pub struct UnzipTask {
    archive: PathBuf,
    destination: PathBuf,
    description: Option<String>,
    done: bool,
}

impl UnzipTask {
    pub fn new(archive: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        UnzipTask {
            archive: archive.into(),
            destination: destination.into(),
            description: None,
            done: false,
        }
    }

    /// Describe the task explicitly instead of deriving a description.
    pub fn with_description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }
}

impl Task for UnzipTask {
    type Output = i32;

    fn description(&self) -> String {
        match &self.description {
            Some(text) => text.clone(),
            None => format!(
                "Extracts {} to {}.",
                self.archive.display(),
                self.destination.display()
            ),
        }
    }

    fn execute(&mut self, _ctx: &Context) -> AnvilResult<i32> {
        let description = self.description();
        mark_started(&mut self.done, &description)?;

        fs::create_dir_all(&self.destination)?;

        let file = File::open(&self.archive)?;
        let mut archive = zip::ZipArchive::new(BufReader::new(file))?;

        for index in 0..archive.len() {
            let mut entry = archive.by_index(index)?;
            if entry.is_dir() {
                continue;
            }
            // The base name alone decides where the entry lands, so parent
            // and root components in raw entry names carry no traversal risk.
            let Some(file_name) = Path::new(entry.name())
                .file_name()
                .map(ToOwned::to_owned)
            else {
                continue;
            };

            let target = self.destination.join(&file_name);
            debug!(entry = entry.name(), target = %target.display(), "extracting");
            let mut output = File::create(&target)?;
            io::copy(&mut entry, &mut output)?;
        }

        info!(
            archive = %self.archive.display(),
            destination = %self.destination.display(),
            "archive extracted"
        );
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn write_archive(path: &Path, entries: &[(&str, &str)]) {
        let file = File::create(path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        let options = SimpleFileOptions::default();

        for (name, content) in entries {
            if name.ends_with('/') {
                writer.add_directory(name.trim_end_matches('/'), options).unwrap();
            } else {
                writer.start_file(*name, options).unwrap();
                writer.write_all(content.as_bytes()).unwrap();
            }
        }
        writer.finish().unwrap();
    }

    #[test]
    fn test_extraction_flattens_directory_structure() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("bundle.zip");
        write_archive(
            &archive,
            &[
                ("top.txt", "top"),
                ("nested/deep/inner.txt", "inner"),
                ("empty-dir/", ""),
            ],
        );

        let dest = dir.path().join("out");
        let (ctx, _) = Context::recording();
        let code = UnzipTask::new(&archive, &dest).run(&ctx).unwrap();

        assert_eq!(code, 0);
        assert_eq!(fs::read_to_string(dest.join("top.txt")).unwrap(), "top");
        assert_eq!(fs::read_to_string(dest.join("inner.txt")).unwrap(), "inner");
        assert!(!dest.join("nested").exists());
        assert!(!dest.join("empty-dir").exists());
    }

    #[test]
    fn test_destination_is_created_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("bundle.zip");
        write_archive(&archive, &[("a.txt", "a")]);

        let dest = dir.path().join("deeply/nested/out");
        let (ctx, _) = Context::recording();
        UnzipTask::new(&archive, &dest).run(&ctx).unwrap();

        assert!(dest.join("a.txt").exists());
    }

    #[test]
    fn test_existing_files_are_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("bundle.zip");
        write_archive(&archive, &[("a.txt", "fresh")]);

        let dest = dir.path().join("out");
        fs::create_dir_all(&dest).unwrap();
        fs::write(dest.join("a.txt"), "stale").unwrap();

        let (ctx, _) = Context::recording();
        UnzipTask::new(&archive, &dest).run(&ctx).unwrap();

        assert_eq!(fs::read_to_string(dest.join("a.txt")).unwrap(), "fresh");
    }

    #[test]
    fn test_repeated_extraction_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("bundle.zip");
        write_archive(&archive, &[("a.txt", "a"), ("sub/b.txt", "b")]);

        let dest = dir.path().join("out");
        let (ctx, _) = Context::recording();
        UnzipTask::new(&archive, &dest).run(&ctx).unwrap();
        UnzipTask::new(&archive, &dest).run(&ctx).unwrap();

        assert_eq!(fs::read_dir(&dest).unwrap().count(), 2);
        assert_eq!(fs::read_to_string(dest.join("b.txt")).unwrap(), "b");
    }

    #[test]
    fn test_colliding_base_names_resolve_to_the_later_entry() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("bundle.zip");
        write_archive(&archive, &[("x/report.txt", "first"), ("y/report.txt", "second")]);

        let dest = dir.path().join("out");
        let (ctx, _) = Context::recording();
        UnzipTask::new(&archive, &dest).run(&ctx).unwrap();

        assert_eq!(fs::read_dir(&dest).unwrap().count(), 1);
        assert_eq!(
            fs::read_to_string(dest.join("report.txt")).unwrap(),
            "second"
        );
    }

    #[test]
    fn test_parent_components_extract_under_the_base_name() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("bundle.zip");
        write_archive(&archive, &[("../escape.txt", "out"), ("normal.txt", "in")]);

        let dest = dir.path().join("out");
        let (ctx, _) = Context::recording();
        UnzipTask::new(&archive, &dest).run(&ctx).unwrap();

        assert_eq!(fs::read_to_string(dest.join("escape.txt")).unwrap(), "out");
        assert_eq!(fs::read_to_string(dest.join("normal.txt")).unwrap(), "in");
        assert!(!dir.path().join("escape.txt").exists());
    }

    #[test]
    fn test_missing_archive_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let (ctx, _) = Context::recording();

        let task = UnzipTask::new(dir.path().join("missing.zip"), dir.path().join("out"));
        let result = task.run(&ctx);

        assert!(matches!(result, Err(crate::types::AnvilError::Io(_))));
    }

    #[test]
    fn test_second_direct_execute_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("bundle.zip");
        write_archive(&archive, &[("a.txt", "a")]);

        let (ctx, _) = Context::recording();
        let mut task = UnzipTask::new(&archive, dir.path().join("out"));

        task.execute(&ctx).unwrap();
        let second = task.execute(&ctx);

        assert!(matches!(
            second,
            Err(crate::types::AnvilError::TaskState(_))
        ));
    }
}
