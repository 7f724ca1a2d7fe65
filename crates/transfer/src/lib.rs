//! Anvil Transfer Library
//!
//! Package transfer boundary for the Anvil build runner: a storage service
//! for uploaded build artifacts, a blocking HTTP client for a deployed
//! instance of that service, and build tasks that drive the client from a
//! script.
//!
//! ## Architecture
//!
//! - [`service`] - Transport-agnostic upload and cleanup implementation
//! - [`client`] - Blocking HTTP client for a remote service
//! - [`tasks`] - Build tasks wrapping the client in the core task lifecycle
//! - [`fluent`] - Constructor functions for composing transfer steps
//! - [`types`] - Wire bodies, the archive allow-list, and error mapping
//!
//! ## Usage
//!
//! Hosting side, behind any HTTP frontend:
//!
//! ```rust,no_run
//! use anvil_transfer::service::{FilePart, PackageService, UploadForm};
//!
//! # fn example() -> Result<(), anvil_transfer::types::TransferError> {
//! let service = PackageService::new("/var/lib/anvil");
//! let form = UploadForm::new()
//!     .with_file(FilePart::from_bytes("app.zip", b"bytes".to_vec()));
//! service.upload(form)?;
//! # Ok(())
//! # }
//! ```
//!
//! Build-script side:
//!
//! ```rust,no_run
//! use anvil_core::context::Context;
//! use anvil_core::props::keys;
//! use anvil_core::task::Task;
//! use anvil_transfer::fluent::transfer_tasks;
//!
//! # fn example() -> anvil_core::types::AnvilResult<()> {
//! let mut ctx = Context::new();
//! ctx.props_mut()
//!     .set(keys::TRANSFER_URL, "http://packages.internal:5000".to_string());
//!
//! transfer_tasks::upload_directory("out/packages").run(&ctx)?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod fluent;
pub mod service;
pub mod tasks;
pub mod types;

// Re-export the main types for easier usage
pub use client::TransferClient;
pub use service::{FilePart, PackageService, UploadForm};
pub use types::{TransferError, ALLOWED_ARCHIVE_EXTENSIONS};
