//! HTTP client for a remote package transfer service
//!
//! Blocking counterpart of [`PackageService`](crate::service::PackageService)
//! for build machines talking to a deployed service: multipart POST for
//! uploads, DELETE with a JSON body for cleanup. Non-success responses are
//! decoded into [`TransferError::Server`] so callers see the service's own
//! error code.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use reqwest::blocking::multipart;
use tracing::info;

use crate::types::{CleanPackagesRequest, ErrorBody, TransferError, UploadPackageRequest};

/// Endpoint the service is mounted on, relative to the base URL.
const PACKAGES_ENDPOINT: &str = "api/packages";

/// Blocking client for the package transfer endpoints.
pub struct TransferClient {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl TransferClient {
    /// A client for the service at `base_url`, blocking without limit.
    pub fn new(base_url: impl Into<String>) -> Result<Self, TransferError> {
        Self::build(base_url.into(), None)
    }

    /// A client whose requests fail once `timeout` elapses.
    pub fn with_timeout(
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, TransferError> {
        Self::build(base_url.into(), Some(timeout))
    }

    fn build(base_url: String, timeout: Option<Duration>) -> Result<Self, TransferError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(TransferClient { base_url, client })
    }

    /// Upload archive files, optionally into a subdirectory on the server.
    ///
    /// Returns the number of files sent.
    pub fn upload_packages(
        &self,
        files: &[PathBuf],
        sub_directory: Option<&str>,
    ) -> Result<usize, TransferError> {
        let mut form = multipart::Form::new();
        for file in files {
            form = form
                .file("files", file)
                .with_context(|| format!("Failed to read package file: {}", file.display()))?;
        }

        let request = UploadPackageRequest {
            upload_to_sub_directory: sub_directory.map(str::to_string),
        };
        let request_json =
            serde_json::to_string(&request).context("Failed to encode upload request field")?;
        form = form.text("request", request_json);

        info!(count = files.len(), url = %self.endpoint_url(), "uploading packages");
        let response = self.client.post(self.endpoint_url()).multipart(form).send()?;
        check_response(response)?;
        Ok(files.len())
    }

    /// Ask the service to delete and recreate a packages directory.
    pub fn clean_packages(&self, sub_directory: Option<&str>) -> Result<(), TransferError> {
        let request = CleanPackagesRequest {
            sub_directory_to_delete: sub_directory.map(str::to_string),
        };

        info!(url = %self.endpoint_url(), "cleaning packages");
        let response = self
            .client
            .delete(self.endpoint_url())
            .json(&request)
            .send()?;
        check_response(response)
    }

    fn endpoint_url(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            PACKAGES_ENDPOINT
        )
    }
}

/// Map a non-success response to a typed server error.
fn check_response(response: reqwest::blocking::Response) -> Result<(), TransferError> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }

    let code = response
        .json::<ErrorBody>()
        .map(|body| body.code)
        .unwrap_or_else(|_| "Unknown".to_string());
    Err(TransferError::Server {
        status: status.as_u16(),
        code,
    })
}
