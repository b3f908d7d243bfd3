//! Deferred cleanup actions, run last-registered-first on process termination.
use std::{
    fmt,
    panic::{AssertUnwindSafe, catch_unwind},
    sync::{Arc, Mutex, PoisonError},
};

use shkit_observe::SeverityLogger;
use thiserror::Error;
use tracing::trace;

#[derive(Debug, Error)]
pub enum CleanupError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Failed(String),
}

pub type CleanupResult = Result<(), CleanupError>;

type ActionFn = Box<dyn FnOnce() -> CleanupResult + Send>;

struct CleanupAction {
    name: String,
    run: ActionFn,
}

/// LIFO stack of cleanup actions.
///
/// Clones share the same stack. Every registered action runs at most once: `drain`
/// removes actions before running them, so draining twice never repeats one.
#[derive(Clone, Default)]
pub struct CleanupStack {
    actions: Arc<Mutex<Vec<CleanupAction>>>,
}

impl CleanupStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push an action on top of the stack.
    pub fn register<F>(&self, name: impl Into<String>, action: F)
    where
        F: FnOnce() -> CleanupResult + Send + 'static,
    {
        let name = name.into();
        trace!(action = %name, "cleanup action registered");
        self.lock().push(CleanupAction {
            name,
            run: Box::new(action),
        });
    }

    /// Number of pending actions.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Run every pending action, most recent first, and return how many ran.
    ///
    /// Errors and panics of individual actions are logged at DEBUG; the remaining
    /// actions still run. The stack lock is released while an action runs, so an
    /// action may register further actions; those run within the same drain.
    pub fn drain(&self, logger: &SeverityLogger) -> usize {
        let mut ran = 0;
        while let Some(action) = self.pop() {
            ran += 1;
            let CleanupAction { name, run } = action;
            match catch_unwind(AssertUnwindSafe(run)) {
                Ok(Ok(())) => trace!(action = %name, "cleanup action finished"),
                Ok(Err(e)) => {
                    logger.debug(format!("cleanup action '{name}' failed: {e}"));
                }
                Err(_) => {
                    logger.debug(format!("cleanup action '{name}' panicked"));
                }
            }
        }
        ran
    }

    fn pop(&self) -> Option<CleanupAction> {
        self.lock().pop()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<CleanupAction>> {
        self.actions.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for CleanupStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.lock().iter().map(|a| a.name.clone()).collect();
        f.debug_struct("CleanupStack").field("actions", &names).finish()
    }
}
