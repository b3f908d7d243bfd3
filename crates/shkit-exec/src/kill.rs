//! Termination of a job's process group.
//!
//! Jobs started under [`InFlightPolicy::Kill`](shkit_model::InFlightPolicy) lead their
//! own process group, so the shell and everything it started can be signalled together.
use std::time::Duration;

use tokio::process::{Child, Command};
use tracing::debug;

/// Time the group gets to exit after SIGTERM before it is SIGKILLed.
pub(crate) const TERM_GRACE: Duration = Duration::from_millis(500);

/// Make the spawned shell the leader of a new process group.
#[cfg(unix)]
pub(crate) fn isolate(cmd: &mut Command) {
    cmd.process_group(0);
}

#[cfg(not(unix))]
pub(crate) fn isolate(_cmd: &mut Command) {}

/// SIGTERM the job's process group, wait up to [`TERM_GRACE`] for the shell, then
/// SIGKILL the whole group and reap the shell.
///
/// The group is SIGKILLed even when the shell exited in time: descendants that ignore
/// SIGTERM would otherwise outlive the job.
pub(crate) async fn terminate(child: &mut Child) {
    let group = child.id();
    signal_group(group, Signal::Term);

    if tokio::time::timeout(TERM_GRACE, child.wait()).await.is_err() {
        debug!(pid = ?group, "job ignored SIGTERM");
    }
    signal_group(group, Signal::Kill);

    if let Err(e) = child.kill().await {
        debug!(error = %e, "job shell already gone");
    }
}

#[derive(Debug, Clone, Copy)]
enum Signal {
    Term,
    Kill,
}

#[cfg(unix)]
fn signal_group(group: Option<u32>, sig: Signal) {
    let Some(pgid) = group.and_then(|p| i32::try_from(p).ok()).filter(|p| *p > 0) else {
        return;
    };
    let signo = match sig {
        Signal::Term => libc::SIGTERM,
        Signal::Kill => libc::SIGKILL,
    };
    // SAFETY: plain syscall; a negative pid addresses the process group `pgid`.
    let rc = unsafe { libc::kill(-pgid, signo) };
    if rc != 0 {
        let err = std::io::Error::last_os_error();
        if err.raw_os_error() != Some(libc::ESRCH) {
            debug!(pgid, ?sig, error = %err, "failed to signal job group");
        }
    }
}

#[cfg(not(unix))]
fn signal_group(_group: Option<u32>, _sig: Signal) {}
