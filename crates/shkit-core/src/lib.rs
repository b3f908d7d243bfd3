pub mod cleanup;
pub mod context;
pub mod coordinator;
pub mod error;
pub mod guard;

pub use cleanup::{CleanupError, CleanupResult, CleanupStack};
pub use context::ScriptContext;
pub use coordinator::{
    Coordinator, ShutdownSignal, ShutdownSignals, Termination, wait_for_shutdown_signal,
};
pub use error::ScriptError;
pub use guard::{ProcessLock, default_lock_path, pid_is_alive};

pub mod prelude {
    pub use crate::cleanup::CleanupStack;
    pub use crate::context::ScriptContext;
    pub use crate::coordinator::{Coordinator, Termination};
    pub use crate::error::ScriptError;
    pub use crate::guard::ProcessLock;
}
