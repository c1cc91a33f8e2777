//! Runtime environment snapshot.

use super::{classify, Platform};
use serde::{Deserialize, Serialize};

/// Identification of the environment a session runs in.
///
/// Supplied by the embedder at session construction; the core never
/// reads ambient globals (see [`crate::capability`] for the same rule
/// applied to hardware access).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Environment {
    /// Environment identification string (user agent or equivalent).
    pub identification: String,
    /// URI scheme the embedding page was loaded over ("https", "http", ...).
    pub scheme: String,
    /// Hostname the embedding page was loaded from.
    pub hostname: String,
}

impl Environment {
    /// Creates an environment snapshot.
    pub fn new(
        identification: impl Into<String>,
        scheme: impl Into<String>,
        hostname: impl Into<String>,
    ) -> Self {
        Self {
            identification: identification.into(),
            scheme: scheme.into(),
            hostname: hostname.into(),
        }
    }

    /// Classifies this environment's platform.
    pub fn platform(&self) -> Platform {
        classify(&self.identification)
    }

    /// Whether camera acquisition is permitted in this context.
    ///
    /// Capture capabilities require TLS, with a loopback exception for
    /// local development.
    pub fn is_secure_context(&self) -> bool {
        self.scheme.eq_ignore_ascii_case("https") || self.is_loopback()
    }

    fn is_loopback(&self) -> bool {
        matches!(self.hostname.as_str(), "localhost" | "127.0.0.1" | "::1" | "[::1]")
    }
}
