//! QR decode engine.
//!
//! Attaches a frame-sampling loop to an active video surface and fires
//! a one-shot callback when a payload is found.

mod engine;

pub use engine::{DecodeError, DecodedFn, QrDecodeEngine};
