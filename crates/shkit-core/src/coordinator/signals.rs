//! OS signal handling.
//!
//! [`ShutdownSignals::install`] registers the handlers immediately; from then on the
//! signals below no longer take their default action and are reported through
//! [`ShutdownSignals::recv`].
//!
//! ## Unix
//! - **SIGINT** (Ctrl-C in terminal)
//! - **SIGTERM** (default kill signal)
//! - **SIGHUP** (controlling terminal went away)
//!
//! ## Other platforms
//! Only [`tokio::signal::ctrl_c`] is awaited.
use std::{fmt, io};

/// Signal that requested termination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownSignal {
    Interrupt,
    Terminate,
    Hangup,
}

impl fmt::Display for ShutdownSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ShutdownSignal::Interrupt => "SIGINT",
            ShutdownSignal::Terminate => "SIGTERM",
            ShutdownSignal::Hangup => "SIGHUP",
        })
    }
}

/// Installed shutdown handlers. Must be created inside a Tokio runtime.
#[cfg(unix)]
pub struct ShutdownSignals {
    interrupt: tokio::signal::unix::Signal,
    terminate: tokio::signal::unix::Signal,
    hangup: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl ShutdownSignals {
    pub fn install() -> io::Result<Self> {
        use tokio::signal::unix::{SignalKind, signal};

        Ok(Self {
            interrupt: signal(SignalKind::interrupt())?,
            terminate: signal(SignalKind::terminate())?,
            hangup: signal(SignalKind::hangup())?,
        })
    }

    /// Next shutdown signal delivered to the process.
    pub async fn recv(&mut self) -> ShutdownSignal {
        tokio::select! {
            _ = self.interrupt.recv() => ShutdownSignal::Interrupt,
            _ = self.terminate.recv() => ShutdownSignal::Terminate,
            _ = self.hangup.recv()    => ShutdownSignal::Hangup,
        }
    }
}

#[cfg(not(unix))]
pub struct ShutdownSignals(());

#[cfg(not(unix))]
impl ShutdownSignals {
    pub fn install() -> io::Result<Self> {
        Ok(Self(()))
    }

    pub async fn recv(&mut self) -> ShutdownSignal {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::debug!(error = %e, "ctrl-c handler unavailable");
            std::future::pending::<()>().await;
        }
        ShutdownSignal::Interrupt
    }
}

/// Install the handlers and wait for the first shutdown signal.
pub async fn wait_for_shutdown_signal() -> io::Result<ShutdownSignal> {
    let mut signals = ShutdownSignals::install()?;
    Ok(signals.recv().await)
}
