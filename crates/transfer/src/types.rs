//! Wire types and errors for the package transfer boundary

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Archive extensions the upload endpoint accepts.
pub const ALLOWED_ARCHIVE_EXTENSIONS: [&str; 3] = ["zip", "7z", "rar"];

/// Check a file name against the archive allow-list, case-insensitively.
pub fn is_allowed_archive(file_name: &str) -> bool {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            ALLOWED_ARCHIVE_EXTENSIONS
                .iter()
                .any(|allowed| ext.eq_ignore_ascii_case(allowed))
        })
        .unwrap_or(false)
}

/// Errors produced on either side of the transfer boundary.
///
/// Service-side variants carry their HTTP mapping through
/// [`TransferError::status_code`] and [`TransferError::code`]; an HTTP
/// frontend turns them into a status plus an [`ErrorBody`]. Client-side
/// variants ([`TransferError::Http`], [`TransferError::Server`]) report what
/// a remote service answered.
#[derive(Debug, Error)]
pub enum TransferError {
    #[error("request is not a multipart form upload")]
    FormHasNoContentType,

    #[error("upload contains no files")]
    NoFiles,

    #[error("file extension '{extension}' is not an accepted archive format")]
    FileExtensionNotAllowed { extension: String },

    #[error("subdirectory '{0}' escapes the packages root")]
    InvalidSubdirectory(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server rejected the request with status {status} ({code})")]
    Server { status: u16, code: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TransferError {
    /// HTTP status the error maps to at the service boundary.
    pub fn status_code(&self) -> u16 {
        match self {
            TransferError::FormHasNoContentType
            | TransferError::NoFiles
            | TransferError::InvalidSubdirectory(_) => 400,
            TransferError::FileExtensionNotAllowed { .. } => 403,
            TransferError::Io(_) | TransferError::Http(_) | TransferError::Other(_) => 500,
            TransferError::Server { status, .. } => *status,
        }
    }

    /// Stable machine-readable code for the error body.
    pub fn code(&self) -> &str {
        match self {
            TransferError::FormHasNoContentType => "FormHasNoContentType",
            TransferError::NoFiles => "NoFiles",
            TransferError::FileExtensionNotAllowed { .. } => "FileExtensionNotAllowed",
            TransferError::InvalidSubdirectory(_) => "InvalidSubdirectory",
            TransferError::Io(_) | TransferError::Http(_) | TransferError::Other(_) => {
                "InternalServerError"
            }
            TransferError::Server { code, .. } => code,
        }
    }

    /// The error body an HTTP frontend sends for this error.
    pub fn to_body(&self) -> ErrorBody {
        ErrorBody {
            code: self.code().to_string(),
            message: self.to_string(),
        }
    }
}

/// Body of the upload `request` form field.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadPackageRequest {
    /// Subdirectory under the packages root to store into.
    pub upload_to_sub_directory: Option<String>,
}

/// DELETE body naming the directory to clean.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanPackagesRequest {
    /// Subdirectory under the packages root to reset; the root when unset.
    pub sub_directory_to_delete: Option<String>,
}

/// JSON error body returned for failed requests.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}
