//! High-level scan session.
//!
//! The only surface application code invokes directly: owns device
//! enumeration, camera-preference heuristics, bounded retries, and the
//! composition of camera facade + decode engine into one start/stop
//! contract.

mod diagnostic;
mod retry;
mod scanner;
mod select;

pub use diagnostic::DiagnosticReport;
pub use retry::RetryPolicy;
pub use scanner::{ResultFn, ScanFailure, ScanSession};
pub use select::select_constraints;
