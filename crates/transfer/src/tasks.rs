//! Build tasks driving the transfer client
//!
//! These tasks close the loop from a build script to a deployed transfer
//! service: pack locally, then upload the archives, then (for a fresh
//! channel) clean the remote directory first. The service URL resolves like
//! every other task default: explicit setting first, then
//! [`keys::TRANSFER_URL`] from the run properties.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::info;

use anvil_core::context::Context;
use anvil_core::props::keys;
use anvil_core::task::{mark_started, Task};
use anvil_core::types::{AnvilError, AnvilResult};

use crate::client::TransferClient;
use crate::types::is_allowed_archive;

/// Uploads build artifacts to a package transfer service.
///
/// Files are named explicitly, discovered by scanning a directory for
/// accepted archive formats when the task executes, or both.
#[derive(Debug, Default)]
pub struct UploadPackageTask {
    files: Vec<PathBuf>,
    scan_dir: Option<PathBuf>,
    sub_directory: Option<String>,
    url: Option<String>,
    timeout: Option<Duration>,
    description: Option<String>,
    done: bool,
}

impl UploadPackageTask {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one file to upload.
    pub fn file(mut self, path: impl Into<PathBuf>) -> Self {
        self.files.push(path.into());
        self
    }

    /// Scan this directory for archives when the task executes.
    pub fn from_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scan_dir = Some(dir.into());
        self
    }

    /// Server-side subdirectory to upload into.
    pub fn to_sub_directory(mut self, sub: impl Into<String>) -> Self {
        self.sub_directory = Some(sub.into());
        self
    }

    /// Service URL, overriding the run property.
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Fail the upload once this much time has elapsed.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Describe the task explicitly instead of deriving a description.
    pub fn with_description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    /// The explicitly named files, in the order they were added.
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }
}

impl Task for UploadPackageTask {
    type Output = usize;

    fn description(&self) -> String {
        match &self.description {
            Some(text) => text.clone(),
            None => "Uploads packages to the transfer service.".to_string(),
        }
    }

    fn before_execute(&mut self, ctx: &Context) -> AnvilResult<()> {
        if self.url.is_none() {
            self.url = ctx.props().get(keys::TRANSFER_URL);
        }
        Ok(())
    }

    fn execute(&mut self, _ctx: &Context) -> AnvilResult<usize> {
        let description = self.description();
        mark_started(&mut self.done, &description)?;

        let url = self.url.clone().ok_or_else(|| {
            AnvilError::Config(
                "No transfer service URL set; set one on the task or in the run properties"
                    .to_string(),
            )
        })?;

        let mut files = self.files.clone();
        if let Some(dir) = &self.scan_dir {
            collect_archives(dir, &mut files)?;
        }
        if files.is_empty() {
            return Err(AnvilError::Task("No package files to upload".to_string()));
        }

        let client = build_client(&url, self.timeout)?;
        let sent = client
            .upload_packages(&files, self.sub_directory.as_deref())
            .map_err(|error| AnvilError::Task(error.to_string()))?;
        info!(count = sent, "packages uploaded");
        Ok(sent)
    }
}

/// Deletes and recreates a packages directory on the transfer service.
#[derive(Debug, Default)]
pub struct CleanPackagesTask {
    sub_directory: Option<String>,
    url: Option<String>,
    timeout: Option<Duration>,
    description: Option<String>,
    done: bool,
}

impl CleanPackagesTask {
    pub fn new() -> Self {
        Self::default()
    }

    /// Server-side subdirectory to reset; the packages root when unset.
    pub fn sub_directory(mut self, sub: impl Into<String>) -> Self {
        self.sub_directory = Some(sub.into());
        self
    }

    /// Service URL, overriding the run property.
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Fail the request once this much time has elapsed.
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

impl Task for CleanPackagesTask {
    type Output = ();

    fn description(&self) -> String {
        match &self.description {
            Some(text) => text.clone(),
            None => "Cleans the packages directory on the transfer service.".to_string(),
        }
    }

    fn before_execute(&mut self, ctx: &Context) -> AnvilResult<()> {
        if self.url.is_none() {
            self.url = ctx.props().get(keys::TRANSFER_URL);
        }
        Ok(())
    }

    fn execute(&mut self, _ctx: &Context) -> AnvilResult<()> {
        let description = self.description();
        mark_started(&mut self.done, &description)?;

        let url = self.url.clone().ok_or_else(|| {
            AnvilError::Config(
                "No transfer service URL set; set one on the task or in the run properties"
                    .to_string(),
            )
        })?;

        let client = build_client(&url, self.timeout)?;
        client
            .clean_packages(self.sub_directory.as_deref())
            .map_err(|error| AnvilError::Task(error.to_string()))?;
        info!("packages directory cleaned");
        Ok(())
    }
}

fn build_client(url: &str, timeout: Option<Duration>) -> AnvilResult<TransferClient> {
    let client = match timeout {
        Some(timeout) => TransferClient::with_timeout(url, timeout),
        None => TransferClient::new(url),
    };
    client.map_err(|error| AnvilError::Task(error.to_string()))
}

/// Collect allowed archive files directly inside `dir`, sorted by name.
fn collect_archives(dir: &Path, files: &mut Vec<PathBuf>) -> AnvilResult<()> {
    let mut found = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
            continue;
        };
        if is_allowed_archive(name) {
            found.push(path);
        }
    }
    found.sort();
    files.extend(found);
    Ok(())
}
