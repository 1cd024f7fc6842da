// file: src/system/identity.rs
// version: 1.0.0
// guid: 2d7f91b5-3a48-4e62-b90c-6f1d84a72e35

//! Effective-identity checks gating the pipeline

use crate::Result;

/// The effective uid of this process
pub fn effective_uid() -> u32 {
    #[cfg(unix)]
    {
        unsafe { libc::geteuid() }
    }
    #[cfg(not(unix))]
    {
        u32::MAX
    }
}

/// Whether this process runs with superuser privileges
pub fn is_superuser() -> bool {
    effective_uid() == 0
}

/// Fail unless the process runs as the superuser.
///
/// Asks the OS for the effective uid instead of trusting `$USER`, which may be
/// unset or stale under some invocation contexts.
pub fn require_superuser() -> Result<()> {
    if is_superuser() {
        Ok(())
    } else {
        Err(crate::error::ProvisionError::PrivilegeError(format!(
            "must run as the superuser (effective uid is {}); re-run with sudo",
            effective_uid()
        )))
    }
}
