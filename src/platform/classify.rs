//! Device classification from the environment identification string.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Platform family a scan session runs on.
///
/// Drives strategy selection: mobile engines need inline-playback
/// surface attributes and explicit facing-mode requests that desktop
/// engines do not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// iPhone/iPad-class engines (Safari and WebKit shells).
    Ios,
    /// Android-class engines.
    Android,
    /// Everything else, including unrecognized environments.
    Desktop,
}

impl Platform {
    /// Returns true for iOS and Android classifications.
    pub fn is_mobile(self) -> bool {
        matches!(self, Platform::Ios | Platform::Android)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Platform::Ios => "ios",
            Platform::Android => "android",
            Platform::Desktop => "desktop",
        };
        f.write_str(name)
    }
}

/// Classifies an environment identification string into a [`Platform`].
///
/// Pure and total: there is no error case, unknown strings classify as
/// [`Platform::Desktop`]. iOS tokens are checked before the Android
/// token so that WebKit shells advertising both resolve to iOS.
pub fn classify(identification: &str) -> Platform {
    if ["iPad", "iPhone", "iPod"]
        .iter()
        .any(|token| identification.contains(token))
    {
        Platform::Ios
    } else if identification.contains("Android") {
        Platform::Android
    } else {
        Platform::Desktop
    }
}
