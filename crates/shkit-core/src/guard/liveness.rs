//! Live-process checks by PID.

use crate::error::ScriptError;

/// Fails with `UnsupportedPlatform` when PID liveness cannot be checked on this host.
#[cfg(unix)]
pub(crate) fn ensure_supported() -> Result<(), ScriptError> {
    Ok(())
}

#[cfg(not(unix))]
pub(crate) fn ensure_supported() -> Result<(), ScriptError> {
    Err(ScriptError::UnsupportedPlatform(
        "no live-process check by pid on this platform",
    ))
}

/// Returns `true` if a process with `pid` currently exists.
///
/// PIDs that do not fit a positive `pid_t` are never live: `kill(0, ..)` and negative
/// values address process groups, not a single process.
#[cfg(unix)]
pub fn pid_is_alive(pid: u32) -> Result<bool, ScriptError> {
    let Ok(raw) = libc::pid_t::try_from(pid) else {
        return Ok(false);
    };
    if raw <= 0 {
        return Ok(false);
    }

    // SAFETY: signal 0 performs only the existence and permission checks,
    // nothing is delivered. `raw` is a positive pid_t.
    let result = unsafe { libc::kill(raw, 0) };
    if result == 0 {
        return Ok(true);
    }
    // EPERM: the process exists but belongs to someone else.
    let errno = std::io::Error::last_os_error().raw_os_error().unwrap_or(0);
    Ok(errno == libc::EPERM)
}

#[cfg(not(unix))]
pub fn pid_is_alive(_pid: u32) -> Result<bool, ScriptError> {
    ensure_supported().map(|_| false)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn own_process_is_alive() {
        assert!(pid_is_alive(std::process::id()).unwrap());
    }

    #[test]
    fn zero_and_out_of_range_pids_are_not_alive() {
        assert!(!pid_is_alive(0).unwrap());
        assert!(!pid_is_alive(u32::MAX).unwrap());
    }

    #[test]
    fn exited_child_is_not_alive() {
        let mut child = std::process::Command::new("true").spawn().unwrap();
        let pid = child.id();
        child.wait().unwrap();
        assert!(!pid_is_alive(pid).unwrap());
    }
}
