//! Signal/exit coordination.
//!
//! - Drives the script body with a cancellation token.
//! - Turns interruption/termination signals into `quit(ALERT, "Exiting on signal", 3)`.
//! - Drains the cleanup stack exactly once, after the last log line and before the
//!   exit code is returned.
mod signals;
pub use signals::{ShutdownSignal, ShutdownSignals, wait_for_shutdown_signal};

mod termination;
pub use termination::Termination;

use std::{
    future::Future,
    sync::atomic::{AtomicBool, Ordering},
};

use shkit_model::{DEFAULT_QUIT_CODE, LogSeverity};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::context::ScriptContext;

/// Message logged when a signal ends the script.
pub const SIGNAL_EXIT_MESSAGE: &str = "Exiting on signal";

/// Owner of the termination path for one script.
///
/// Install it first, run the script body through [`Coordinator::run`] (or report a
/// synchronous outcome through [`Coordinator::finish`]), and exit with the returned
/// code. If the coordinator is dropped without finishing, the cleanup stack is drained
/// on drop.
pub struct Coordinator {
    ctx: ScriptContext,
    finished: AtomicBool,
}

impl Coordinator {
    pub fn new(ctx: ScriptContext) -> Self {
        Self {
            ctx,
            finished: AtomicBool::new(false),
        }
    }

    pub fn context(&self) -> &ScriptContext {
        &self.ctx
    }

    /// Run `body` until it completes or a shutdown signal arrives, then finish.
    ///
    /// Signal handlers are installed before `body` is created, so nothing the body
    /// does (e.g. writing a process marker) can race the default signal action.
    /// Returns the process exit code.
    pub async fn run<F, Fut>(&self, body: F) -> u8
    where
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = Result<(), Termination>>,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let forwarder = match ShutdownSignals::install() {
            Ok(mut signals) => Some(tokio::spawn(async move {
                loop {
                    let sig = signals.recv().await;
                    if tx.send(sig).is_err() {
                        break;
                    }
                }
            })),
            Err(e) => {
                debug!(error = %e, "signal handlers unavailable; continuing without them");
                drop(tx);
                None
            }
        };

        let code = self.run_until(body, rx).await;
        if let Some(forwarder) = forwarder {
            forwarder.abort();
        }
        code
    }

    /// Like [`Coordinator::run`] with shutdown requests read from `shutdown`.
    ///
    /// On the first request the termination is logged at ALERT, the body's token is
    /// cancelled and the body is awaited so it can stop dispatching work. A second
    /// request while it winds down abandons the body. A closed channel means no
    /// request will ever arrive; the body then runs to completion.
    pub async fn run_until<F, Fut>(
        &self,
        body: F,
        mut shutdown: mpsc::UnboundedReceiver<ShutdownSignal>,
    ) -> u8
    where
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = Result<(), Termination>>,
    {
        let cancel = CancellationToken::new();
        let body = body(cancel.clone());
        tokio::pin!(body);

        let mut listening = true;
        let outcome = loop {
            tokio::select! {
                res = &mut body => break res,
                sig = shutdown.recv(), if listening => match sig {
                    Some(sig) => {
                        let term = self.ctx.quit_with(
                            LogSeverity::Alert,
                            SIGNAL_EXIT_MESSAGE,
                            DEFAULT_QUIT_CODE,
                        );
                        debug!(signal = %sig, "shutdown requested; cancelling script body");
                        cancel.cancel();
                        tokio::select! {
                            res = &mut body => {
                                if let Err(inner) = res {
                                    trace!(termination = %inner, "script body stopped after cancellation");
                                }
                            }
                            Some(again) = shutdown.recv() => {
                                debug!(signal = %again, "second shutdown request; abandoning script body");
                            }
                        }
                        break Err(term);
                    }
                    None => listening = false,
                },
            }
        };
        self.finish(outcome)
    }

    /// Drain the cleanup stack (once) and map the outcome to an exit code.
    ///
    /// `Ok(())` exits 0; a termination exits with its own code. The termination message
    /// was already logged by `quit`.
    pub fn finish(&self, outcome: Result<(), Termination>) -> u8 {
        let code = match &outcome {
            Ok(()) => 0,
            Err(t) => t.code(),
        };
        self.drain_once();
        debug!(code, "script finished");
        code
    }

    fn drain_once(&self) {
        if self.finished.swap(true, Ordering::SeqCst) {
            return;
        }
        let ran = self.ctx.cleanup().drain(self.ctx.logger());
        trace!(actions = ran, "cleanup stack drained");
    }
}

impl Drop for Coordinator {
    fn drop(&mut self) {
        self.drain_once();
    }
}
