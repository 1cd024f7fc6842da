// file: src/provision/mod.rs
// version: 1.3.0
// guid: 9c41d6ab-57e8-4f02-8d3a-21f7c0be964d

//! Provisioning stages and the pipeline that sequences them

pub mod hardening;
pub mod packages;
pub mod pipeline;
pub mod ssh_keys;
pub mod users;

pub use hardening::SystemHardener;
pub use packages::{InstallSummary, PackageInstaller};
pub use pipeline::{PipelineSummary, ProvisionPipeline, StagePolicy, StageReport, StageStatus};
pub use ssh_keys::KeyEnrollment;
pub use users::UserProvisioner;
