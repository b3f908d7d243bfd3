mod invocation;
pub use invocation::{CommandTemplate, JobInvocation};
