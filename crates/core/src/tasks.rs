//! Built-in task implementations

pub mod dotnet;
pub mod linux;
pub mod packaging;
pub mod versioning;

pub use dotnet::{DotnetBuildTask, DotnetCommand, DotnetTask};
pub use linux::SystemctlTask;
pub use packaging::UnzipTask;
pub use versioning::UpdateVersionTask;
