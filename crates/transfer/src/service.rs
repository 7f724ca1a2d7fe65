//! Package storage service
//!
//! Transport-agnostic implementation of the package upload and cleanup
//! endpoints. An HTTP frontend decodes the multipart request into an
//! [`UploadForm`], calls the service, and maps any [`TransferError`] to a
//! response via [`TransferError::status_code`] and [`TransferError::code`].
//! Everything behind that line (validation, storage layout, the cleanup
//! retry) lives here and is tested in-process.

use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Component, Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use tracing::{info, warn};

use crate::types::{
    is_allowed_archive, CleanPackagesRequest, TransferError, UploadPackageRequest,
};

/// Delay before the second attempt at deleting a package directory.
const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Directory name packages live under, relative to the service root.
const PACKAGES_DIR: &str = "packages";

/// One file part of a multipart upload.
pub struct FilePart {
    file_name: String,
    len: u64,
    reader: Box<dyn Read + Send>,
}

impl FilePart {
    /// A part streaming from any reader.
    pub fn from_reader(
        file_name: impl Into<String>,
        len: u64,
        reader: Box<dyn Read + Send>,
    ) -> Self {
        FilePart {
            file_name: file_name.into(),
            len,
            reader,
        }
    }

    /// A part backed by an in-memory buffer.
    pub fn from_bytes(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let len = bytes.len() as u64;
        Self::from_reader(file_name, len, Box::new(io::Cursor::new(bytes)))
    }

    /// The client-supplied file name, extension included.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }
}

/// A decoded multipart upload request.
pub struct UploadForm {
    has_form_content_type: bool,
    files: Vec<FilePart>,
    request: Option<String>,
}

impl UploadForm {
    /// An empty multipart form.
    pub fn new() -> Self {
        UploadForm {
            has_form_content_type: true,
            files: Vec::new(),
            request: None,
        }
    }

    /// A request that did not carry a multipart form content type.
    pub fn without_content_type() -> Self {
        UploadForm {
            has_form_content_type: false,
            files: Vec::new(),
            request: None,
        }
    }

    /// Append a file part.
    pub fn with_file(mut self, part: FilePart) -> Self {
        self.files.push(part);
        self
    }

    /// Attach the raw JSON of the `request` form field.
    pub fn with_request_json(mut self, raw: impl Into<String>) -> Self {
        self.request = Some(raw.into());
        self
    }
}

/// Stores uploaded packages under a root directory and resets them on demand.
pub struct PackageService {
    root: PathBuf,
    retry_delay: Duration,
    // Serializes directory replacement against writes so no request observes
    // the packages directory mid-reset.
    dir_lock: Mutex<()>,
}

impl PackageService {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        PackageService {
            root: root.into(),
            retry_delay: DEFAULT_RETRY_DELAY,
            dir_lock: Mutex::new(()),
        }
    }

    /// Override the delay between the two delete attempts.
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// The directory uploads land in for an optional subdirectory.
    pub fn packages_dir(&self, sub_directory: Option<&str>) -> Result<PathBuf, TransferError> {
        let base = self.root.join(PACKAGES_DIR);
        match sub_directory {
            None | Some("") => Ok(base),
            Some(sub) => {
                validate_sub_directory(sub)?;
                Ok(base.join(sub))
            }
        }
    }

    /// Store the files of a multipart upload and return their paths.
    ///
    /// Validation happens before anything is written: the request must carry
    /// a multipart content type, name at least one file, and every file must
    /// use an accepted archive extension. A single disallowed file rejects
    /// the whole upload. Zero-length parts are skipped. Files land under
    /// their base names; the optional `request` field selects a subdirectory
    /// and falls back to the packages root when its JSON does not parse.
    pub fn upload(&self, form: UploadForm) -> Result<Vec<PathBuf>, TransferError> {
        if !form.has_form_content_type {
            return Err(TransferError::FormHasNoContentType);
        }
        if form.files.is_empty() {
            return Err(TransferError::NoFiles);
        }
        for part in &form.files {
            if !is_allowed_archive(part.file_name()) {
                return Err(TransferError::FileExtensionNotAllowed {
                    extension: extension_of(part.file_name()),
                });
            }
        }

        let sub_directory = sub_directory_from_request(form.request.as_deref());
        let target_dir = self.packages_dir(sub_directory.as_deref())?;

        let _guard = lock(&self.dir_lock);
        fs::create_dir_all(&target_dir)?;

        let mut stored = Vec::new();
        for mut part in form.files {
            if part.len == 0 {
                continue;
            }
            let Some(base_name) = Path::new(&part.file_name).file_name() else {
                continue;
            };
            let target = target_dir.join(base_name);
            let mut output = File::create(&target)?;
            io::copy(&mut part.reader, &mut output)?;
            info!(file = %target.display(), bytes = part.len, "package stored");
            stored.push(target);
        }

        Ok(stored)
    }

    /// Delete and recreate a packages directory.
    ///
    /// The directory is removed recursively and recreated empty, so callers
    /// always find it afterwards. A failed removal is retried exactly once
    /// after the configured delay; a directory that is already gone counts
    /// as removed.
    pub fn clean(&self, request: &CleanPackagesRequest) -> Result<(), TransferError> {
        let target_dir = self.packages_dir(request.sub_directory_to_delete.as_deref())?;

        let _guard = lock(&self.dir_lock);
        remove_with_retry(self.retry_delay, || match fs::remove_dir_all(&target_dir) {
            Err(error) if error.kind() != io::ErrorKind::NotFound => Err(error),
            _ => Ok(()),
        })?;
        fs::create_dir_all(&target_dir)?;

        info!(dir = %target_dir.display(), "packages directory reset");
        Ok(())
    }
}

/// Decode the optional `request` form field.
///
/// A malformed body is tolerated: the upload proceeds to the packages root.
fn sub_directory_from_request(request: Option<&str>) -> Option<String> {
    let raw = request?;
    match serde_json::from_str::<UploadPackageRequest>(raw) {
        Ok(body) => body.upload_to_sub_directory,
        Err(error) => {
            warn!(%error, "malformed upload request field; storing in packages root");
            None
        }
    }
}

/// Reject subdirectory names that would escape the packages root.
fn validate_sub_directory(sub: &str) -> Result<(), TransferError> {
    let path = Path::new(sub);
    let escapes = path.is_absolute()
        || path.components().any(|component| {
            matches!(
                component,
                Component::ParentDir | Component::RootDir | Component::Prefix(_)
            )
        });
    if escapes {
        return Err(TransferError::InvalidSubdirectory(sub.to_string()));
    }
    Ok(())
}

/// Run a removal attempt, giving it one more try after `delay` on failure.
fn remove_with_retry(
    delay: Duration,
    mut attempt: impl FnMut() -> io::Result<()>,
) -> io::Result<()> {
    if let Err(first) = attempt() {
        warn!(error = %first, "package directory removal failed; retrying once");
        thread::sleep(delay);
        attempt()?;
    }
    Ok(())
}

fn extension_of(file_name: &str) -> String {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_string()
}

fn lock(mutex: &Mutex<()>) -> MutexGuard<'_, ()> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
