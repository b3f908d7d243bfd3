mod logger;
pub use logger::*;

mod severity;
pub use severity::*;
