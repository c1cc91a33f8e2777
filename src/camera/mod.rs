//! Camera acquisition.
//!
//! Platform strategies request a capture stream with platform-tuned
//! constraints and fall back once to a minimal set; the facade unifies
//! them behind one start/stop contract and owns the resulting
//! [`StreamSession`].

mod facade;
mod platforms;
mod strategy;
mod stream;

pub use facade::CameraFacade;
pub use platforms::{strategy_for, AndroidStrategy, DesktopStrategy, IosStrategy};
pub use strategy::{CameraError, CameraStrategy};
pub use stream::StreamSession;
