//! Entry points for composing transfer steps in build scripts

/// Tasks talking to a package transfer service.
pub mod transfer_tasks {
    use std::path::PathBuf;

    use crate::tasks::{CleanPackagesTask, UploadPackageTask};

    /// Upload every accepted archive found in a directory.
    pub fn upload_directory(dir: impl Into<PathBuf>) -> UploadPackageTask {
        UploadPackageTask::new().from_directory(dir)
    }

    /// Upload explicitly named archive files.
    pub fn upload_files<I, P>(files: I) -> UploadPackageTask
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        files
            .into_iter()
            .fold(UploadPackageTask::new(), |task, file| task.file(file))
    }

    /// Reset a packages directory on the service.
    pub fn clean_packages() -> CleanPackagesTask {
        CleanPackagesTask::new()
    }
}
