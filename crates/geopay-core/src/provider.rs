//! Platform location service seam
//!
//! A `PositionProvider` answers one single-shot position query per call. The
//! browser implementation wraps `navigator.geolocation.getCurrentPosition`;
//! native hosts supply fixed or simulated positions.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::coord::Coordinate;

/// Options passed with every position request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionOptions {
    pub enable_high_accuracy: bool,
    /// Milliseconds the platform may take before failing with a timeout
    pub timeout_ms: u32,
    /// Maximum age of a cached position in milliseconds; 0 forces a fresh fix
    pub maximum_age_ms: u32,
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self {
            enable_high_accuracy: true,
            timeout_ms: 10_000,
            maximum_age_ms: 0,
        }
    }
}

impl PositionOptions {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(u64::from(self.timeout_ms))
    }
}

/// Which platform failure occurred
///
/// Carried for logging only; the acquisition flow displays the message and
/// never branches on the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    PermissionDenied,
    PositionUnavailable,
    Timeout,
}

impl FailureKind {
    /// Map a `GeolocationPositionError.code` value
    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            1 => Some(FailureKind::PermissionDenied),
            2 => Some(FailureKind::PositionUnavailable),
            3 => Some(FailureKind::Timeout),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::PermissionDenied => "permission_denied",
            FailureKind::PositionUnavailable => "position_unavailable",
            FailureKind::Timeout => "timeout",
        }
    }
}

/// Error object delivered by the platform's failure callback
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionFailure {
    pub kind: Option<FailureKind>,
    /// Human-readable text as supplied by the platform, untouched
    pub message: Option<String>,
}

impl PositionFailure {
    pub fn new(kind: Option<FailureKind>, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: Some(message.into()),
        }
    }

    /// Failure as delivered by the platform error callback (code + message)
    pub fn from_platform(code: u16, message: impl Into<String>) -> Self {
        Self::new(FailureKind::from_code(code), message)
    }

    /// A failure with no message at all
    pub fn silent(kind: Option<FailureKind>) -> Self {
        Self {
            kind,
            message: None,
        }
    }

    /// Timeout as reported by native providers
    pub fn timeout() -> Self {
        Self::new(Some(FailureKind::Timeout), "Timeout expired")
    }

    /// Platform message, or `None` when it is absent or empty
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref().filter(|m| !m.is_empty())
    }
}

/// Host platform location capability
///
/// `current_position` issues exactly one platform request and resolves once.
#[async_trait]
pub trait PositionProvider: Send + Sync {
    /// Whether the host exposes a location capability at all
    fn is_supported(&self) -> bool;

    /// Request a single position fix
    async fn current_position(
        &self,
        options: &PositionOptions,
    ) -> Result<Coordinate, PositionFailure>;

    /// Short name for logs
    fn name(&self) -> &'static str {
        "provider"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options_match_platform_request() {
        let opts = PositionOptions::default();
        assert!(opts.enable_high_accuracy);
        assert_eq!(opts.timeout_ms, 10_000);
        assert_eq!(opts.maximum_age_ms, 0);
        assert_eq!(opts.timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_failure_kind_codes() {
        assert_eq!(FailureKind::from_code(1), Some(FailureKind::PermissionDenied));
        assert_eq!(FailureKind::from_code(3), Some(FailureKind::Timeout));
        assert_eq!(FailureKind::from_code(0), None);
    }

    #[test]
    fn test_empty_message_is_absent() {
        assert_eq!(PositionFailure::new(None, "").message(), None);
        assert_eq!(PositionFailure::silent(None).message(), None);
        assert_eq!(
            PositionFailure::new(None, "User denied Geolocation").message(),
            Some("User denied Geolocation")
        );
    }

    #[test]
    fn test_platform_error_mapping() {
        let denied = PositionFailure::from_platform(1, "User denied Geolocation");
        assert_eq!(denied.kind, Some(FailureKind::PermissionDenied));
        assert_eq!(denied.message(), Some("User denied Geolocation"));

        // Browsers may hand over an empty message; the flow then shows its fallback
        let blank = PositionFailure::from_platform(2, "");
        assert_eq!(blank.kind, Some(FailureKind::PositionUnavailable));
        assert_eq!(blank.message(), None);
        assert_eq!(
            crate::acquisition::failure_reason(&blank),
            crate::acquisition::FALLBACK_FAILURE_MESSAGE
        );

        assert_eq!(PositionFailure::from_platform(9, "odd").kind, None);
    }
}
