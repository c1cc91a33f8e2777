//! Camera Acquisition and QR Scan Sessions
//!
//! A capability-injected pipeline for acquiring a camera stream and
//! running a one-shot QR scan session over it. Platform peculiarities
//! (facing-mode tuning, inline-playback hints, permission and
//! constraint failures) are isolated behind per-platform strategies;
//! everything above them is portable and fully testable with scripted
//! capability providers.
//!
//! # Architecture
//!
//! The system follows an explicit control flow:
//!
//! ```text
//! platform classification → constraint selection → camera strategy
//!                                                       ↓
//!               scan session  ←  decode engine  ←  video surface
//! ```
//!
//! # Design Principles
//!
//! - **Capabilities are injected**: media capture, frame decoding, and
//!   surface hosting are traits, never ambient globals
//! - **Closed failure taxonomy**: callers see [`session::ScanFailure`],
//!   never a raw capability error
//! - **Release before report**: the camera is torn down strictly before
//!   the result callback fires
//! - **One-shot scanning**: a session decodes at most one payload, then
//!   returns to idle
//!
//! # Example
//!
//! ```no_run
//! use camscan::capability::mock::{DecodeSchedule, MockHost, ScriptedDecoder, ScriptedMedia};
//! use camscan::capability::CapabilitySet;
//! use camscan::config::ScanConfig;
//! use camscan::platform::Environment;
//! use camscan::session::ScanSession;
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let env = Environment::new("Linux; Android 14", "https", "tickets.example.com");
//! let capabilities = CapabilitySet::new(
//!     Arc::new(ScriptedMedia::granting()),
//!     Arc::new(ScriptedDecoder::new(DecodeSchedule::OnFrame(3), "TICKET-1")),
//!     Arc::new(MockHost::new()),
//! );
//!
//! let session = ScanSession::new(env, ScanConfig::default(), capabilities, |payload| {
//!     println!("scanned: {payload}");
//! })?;
//!
//! session.start().await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod camera;
pub mod capability;
pub mod config;
pub mod constraints;
pub mod decode;
pub mod events;
pub mod platform;
pub mod session;

// Re-export commonly used types at crate root
pub use camera::{CameraError, CameraFacade};
pub use capability::{CapabilitySet, FrameDecoder, MediaProvider, SurfaceHost};
pub use config::{FileConfig, ScanBox, ScanConfig};
pub use constraints::{FacingMode, StreamConstraints};
pub use decode::QrDecodeEngine;
pub use events::{EventSink, ScanEvent};
pub use platform::{classify, Environment, Platform};
pub use session::{ScanFailure, ScanSession};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
