//! Single-instance guard backed by a PID marker file.
//!
//! The marker holds the decimal PID of the owner. A marker naming a live process
//! other than the caller blocks acquisition; a missing, unreadable, corrupt or stale
//! marker is overwritten. Concurrent acquisitions of one path are serialized through a
//! sidecar lock, so at most one of them can win.
mod liveness;
mod serial;
pub use liveness::pid_is_alive;

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use tracing::{debug, instrument};

use crate::{cleanup::CleanupStack, error::ScriptError};

/// Marker path used when none is configured: `<temp-dir>/<identity>.pid`.
pub fn default_lock_path(identity: &str) -> PathBuf {
    std::env::temp_dir().join(format!("{identity}.pid"))
}

/// Held claim on a marker file.
///
/// Removal of the marker is registered with the cleanup stack at acquisition time,
/// so the claim is released when the owning process terminates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessLock {
    path: PathBuf,
    owner_pid: u32,
}

impl ProcessLock {
    /// Claim `path` for `current_pid`.
    ///
    /// Errors:
    /// - `UnsupportedPlatform` if PID liveness cannot be checked here.
    /// - `AlreadyRunning` if the marker names another live process; the marker is left untouched.
    /// - `Configuration` if the marker cannot be written.
    #[instrument(level = "debug", skip_all, fields(path = %path.as_ref().display(), pid = current_pid))]
    pub fn acquire(
        path: impl AsRef<Path>,
        current_pid: u32,
        cleanup: &CleanupStack,
    ) -> Result<Self, ScriptError> {
        liveness::ensure_supported()?;
        let path = path.as_ref().to_path_buf();
        let _serial = serial::lock_exclusive(&path).map_err(|e| {
            ScriptError::Configuration(format!(
                "cannot lock {}: {e}",
                serial::sidecar_path(&path).display()
            ))
        })?;

        match read_marker(&path) {
            Some(pid) if pid != current_pid && pid_is_alive(pid)? => {
                return Err(ScriptError::AlreadyRunning { path, pid });
            }
            Some(pid) => debug!(pid, "replacing marker"),
            None => debug!("no usable marker"),
        }

        write_marker(&path, current_pid).map_err(|e| {
            ScriptError::Configuration(format!(
                "cannot write process marker {}: {e}",
                path.display()
            ))
        })?;

        let marker = path.clone();
        cleanup.register(format!("remove {}", path.display()), move || {
            match fs::remove_file(&marker) {
                Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e.into()),
                _ => Ok(()),
            }
        });

        Ok(Self {
            path,
            owner_pid: current_pid,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn owner_pid(&self) -> u32 {
        self.owner_pid
    }
}

/// PID recorded in the marker, or `None` if it is missing, unreadable or not a PID.
fn read_marker(path: &Path) -> Option<u32> {
    match fs::read_to_string(path) {
        Ok(content) => content.trim().parse::<u32>().ok(),
        Err(e) => {
            if e.kind() != io::ErrorKind::NotFound {
                debug!(error = %e, "marker unreadable; treating as stale");
            }
            None
        }
    }
}

/// Replace the marker atomically: write a sibling temp file, then rename over it.
fn write_marker(path: &Path, pid: u32) -> io::Result<()> {
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "marker path has no file name"))?;
    let mut tmp_name = file_name.to_os_string();
    tmp_name.push(format!(".{pid}.tmp"));
    let tmp = path.with_file_name(tmp_name);

    fs::write(&tmp, pid.to_string())?;
    fs::rename(&tmp, path).inspect_err(|_| {
        let _ = fs::remove_file(&tmp);
    })
}
