//! Serialization of marker check-and-write across processes.
//!
//! Every acquisition of `<marker>` holds an exclusive `flock` on the sidecar
//! `<marker>.lock` while it reads, judges and rewrites the marker. The sidecar is never
//! removed: unlinking it would let a waiter lock an orphaned inode while a newcomer locks
//! a fresh one.
use std::{
    fs::{File, OpenOptions},
    io,
    path::{Path, PathBuf},
};

/// Held exclusive lock on a marker's sidecar file. Released on drop (fd close).
#[derive(Debug)]
pub(crate) struct SerialGuard {
    _file: File,
}

pub(crate) fn sidecar_path(marker: &Path) -> PathBuf {
    let mut name = marker.as_os_str().to_os_string();
    name.push(".lock");
    PathBuf::from(name)
}

/// Block until the sidecar of `marker` is exclusively locked.
pub(crate) fn lock_exclusive(marker: &Path) -> io::Result<SerialGuard> {
    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(sidecar_path(marker))?;
    flock_exclusive(&file)?;
    Ok(SerialGuard { _file: file })
}

#[cfg(unix)]
fn flock_exclusive(file: &File) -> io::Result<()> {
    use std::os::unix::io::AsRawFd;
    let fd = file.as_raw_fd();
    loop {
        // SAFETY: `fd` is a valid descriptor owned by `file` for the whole call.
        let rc = unsafe { libc::flock(fd, libc::LOCK_EX) };
        if rc == 0 {
            return Ok(());
        }
        let err = io::Error::last_os_error();
        if err.kind() != io::ErrorKind::Interrupted {
            return Err(err);
        }
    }
}

#[cfg(not(unix))]
fn flock_exclusive(_file: &File) -> io::Result<()> {
    Ok(())
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn sidecar_sits_next_to_marker() {
        assert_eq!(
            sidecar_path(Path::new("/run/shkit/backup.pid")),
            PathBuf::from("/run/shkit/backup.pid.lock")
        );
    }

    #[test]
    fn second_lock_waits_for_the_first() {
        use std::{sync::mpsc, thread, time::Duration};

        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("x.pid");
        let first = lock_exclusive(&marker).unwrap();

        let (tx, rx) = mpsc::channel();
        let m = marker.clone();
        let waiter = thread::spawn(move || {
            let _second = lock_exclusive(&m).unwrap();
            tx.send(()).unwrap();
        });

        assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());
        drop(first);
        assert!(rx.recv_timeout(Duration::from_secs(5)).is_ok());
        waiter.join().unwrap();
    }
}
