//! Acquisition state machine
//!
//! The lifecycle of one location request as a sum type plus a pure transition
//! function. `LocationSource` drives it; tests exercise it directly.
//!
//! ```text
//!            Requested              Resolved(c)
//!   Idle ───────────────► Pending ───────────────► Succeeded(c)
//!    │                      │
//!    │ Unsupported          │ Rejected(f)
//!    ▼                      ▼
//!  Failed("not supported")  Failed(reason)
//! ```
//!
//! `Succeeded` and `Failed` accept a fresh `Requested`; nothing else leaves
//! `Pending` except exactly one resolution. A request abandoned mid-flight
//! resolves as `Rejected` with `CANCELLED_MESSAGE`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::coord::Coordinate;
use crate::provider::PositionFailure;

/// Reason shown when the host has no location capability
pub const UNSUPPORTED_MESSAGE: &str = "Geolocation is not supported by your browser";

/// Reason shown when the platform fails without a message
pub const FALLBACK_FAILURE_MESSAGE: &str = "Location permission denied";

/// Reason shown when the platform reports an out-of-range coordinate
pub const INVALID_POSITION_MESSAGE: &str = "Invalid position reported by platform";

/// Reason recorded when a pending request is dropped before it resolves
pub const CANCELLED_MESSAGE: &str = "Location request cancelled";

/// Exactly one variant is active at a time
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum AcquisitionState {
    #[default]
    Idle,
    Pending,
    Succeeded { coordinate: Coordinate },
    Failed { reason: String },
}

impl AcquisitionState {
    pub fn is_pending(&self) -> bool {
        matches!(self, AcquisitionState::Pending)
    }

    pub fn coordinate(&self) -> Option<Coordinate> {
        match self {
            AcquisitionState::Succeeded { coordinate } => Some(*coordinate),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            AcquisitionState::Failed { reason } => Some(reason),
            _ => None,
        }
    }

    /// Short label for logs
    pub fn label(&self) -> &'static str {
        match self {
            AcquisitionState::Idle => "idle",
            AcquisitionState::Pending => "pending",
            AcquisitionState::Succeeded { .. } => "succeeded",
            AcquisitionState::Failed { .. } => "failed",
        }
    }
}

/// Inputs to the state machine
#[derive(Debug, Clone, PartialEq)]
pub enum AcquisitionEvent {
    /// User asked for a position on a capable host
    Requested,
    /// Host has no location capability
    Unsupported,
    /// Platform success callback
    Resolved(Coordinate),
    /// Platform failure callback
    Rejected(PositionFailure),
}

impl AcquisitionEvent {
    pub fn label(&self) -> &'static str {
        match self {
            AcquisitionEvent::Requested => "requested",
            AcquisitionEvent::Unsupported => "unsupported",
            AcquisitionEvent::Resolved(_) => "resolved",
            AcquisitionEvent::Rejected(_) => "rejected",
        }
    }
}

/// Error types for invalid state transitions
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TransitionError {
    #[error("A location request is already pending")]
    AlreadyPending,

    #[error("Cannot apply {event} while {state}: no request is pending")]
    NotPending {
        event: &'static str,
        state: &'static str,
    },
}

/// Result type for state transitions
pub type TransitionResult<T> = Result<T, TransitionError>;

/// Compute the next state; the current state is never modified
pub fn transition(
    current: &AcquisitionState,
    event: AcquisitionEvent,
) -> TransitionResult<AcquisitionState> {
    match (current, event) {
        (AcquisitionState::Pending, AcquisitionEvent::Requested) => {
            Err(TransitionError::AlreadyPending)
        }
        (_, AcquisitionEvent::Requested) => Ok(AcquisitionState::Pending),

        // Detected synchronously, never enters Pending
        (AcquisitionState::Pending, AcquisitionEvent::Unsupported) => {
            Err(TransitionError::AlreadyPending)
        }
        (_, AcquisitionEvent::Unsupported) => Ok(AcquisitionState::Failed {
            reason: UNSUPPORTED_MESSAGE.to_string(),
        }),

        (AcquisitionState::Pending, AcquisitionEvent::Resolved(coordinate)) => {
            if coordinate.is_valid() {
                Ok(AcquisitionState::Succeeded { coordinate })
            } else {
                Ok(AcquisitionState::Failed {
                    reason: INVALID_POSITION_MESSAGE.to_string(),
                })
            }
        }
        (AcquisitionState::Pending, AcquisitionEvent::Rejected(failure)) => {
            Ok(AcquisitionState::Failed {
                reason: failure_reason(&failure),
            })
        }
        (state, event) => Err(TransitionError::NotPending {
            event: event.label(),
            state: state.label(),
        }),
    }
}

/// Platform message verbatim, or the fallback when absent/empty
pub fn failure_reason(failure: &PositionFailure) -> String {
    failure
        .message()
        .unwrap_or(FALLBACK_FAILURE_MESSAGE)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::FailureKind;

    fn nairobi() -> Coordinate {
        Coordinate::new(-1.286389, 36.817223)
    }

    #[test]
    fn test_initial_state_is_idle() {
        assert_eq!(AcquisitionState::default(), AcquisitionState::Idle);
    }

    #[test]
    fn test_request_then_resolve() {
        let pending = transition(&AcquisitionState::Idle, AcquisitionEvent::Requested).unwrap();
        assert!(pending.is_pending());

        let done = transition(&pending, AcquisitionEvent::Resolved(nairobi())).unwrap();
        assert_eq!(done.coordinate(), Some(nairobi()));
    }

    #[test]
    fn test_unsupported_skips_pending() {
        let next = transition(&AcquisitionState::Idle, AcquisitionEvent::Unsupported).unwrap();
        assert_eq!(next.error(), Some(UNSUPPORTED_MESSAGE));
    }

    #[test]
    fn test_rejected_keeps_message_verbatim() {
        let next = transition(
            &AcquisitionState::Pending,
            AcquisitionEvent::Rejected(PositionFailure::new(
                Some(FailureKind::PermissionDenied),
                "User denied Geolocation",
            )),
        )
        .unwrap();
        assert_eq!(next.error(), Some("User denied Geolocation"));
    }

    #[test]
    fn test_rejected_without_message_uses_fallback() {
        for failure in [PositionFailure::silent(None), PositionFailure::new(None, "")] {
            let next =
                transition(&AcquisitionState::Pending, AcquisitionEvent::Rejected(failure)).unwrap();
            assert_eq!(next.error(), Some(FALLBACK_FAILURE_MESSAGE));
        }
    }

    #[test]
    fn test_request_clears_previous_failure() {
        let failed = AcquisitionState::Failed {
            reason: "Timeout expired".into(),
        };
        let next = transition(&failed, AcquisitionEvent::Requested).unwrap();
        assert_eq!(next, AcquisitionState::Pending);
        assert_eq!(next.error(), None);
    }

    #[test]
    fn test_success_replaces_rather_than_merges() {
        let succeeded = AcquisitionState::Succeeded {
            coordinate: nairobi(),
        };
        let pending = transition(&succeeded, AcquisitionEvent::Requested).unwrap();
        assert_eq!(pending.coordinate(), None);
        let failed = transition(
            &pending,
            AcquisitionEvent::Rejected(PositionFailure::timeout()),
        )
        .unwrap();
        assert_eq!(failed.coordinate(), None);
        assert_eq!(failed.error(), Some("Timeout expired"));
    }

    #[test]
    fn test_second_resolution_is_rejected() {
        let done = AcquisitionState::Succeeded {
            coordinate: nairobi(),
        };
        let err = transition(&done, AcquisitionEvent::Resolved(nairobi())).unwrap_err();
        assert_eq!(
            err,
            TransitionError::NotPending {
                event: "resolved",
                state: "succeeded"
            }
        );
        assert!(transition(
            &AcquisitionState::Idle,
            AcquisitionEvent::Rejected(PositionFailure::timeout())
        )
        .is_err());
    }

    #[test]
    fn test_request_while_pending_is_rejected() {
        assert_eq!(
            transition(&AcquisitionState::Pending, AcquisitionEvent::Requested),
            Err(TransitionError::AlreadyPending)
        );
    }

    #[test]
    fn test_invalid_coordinate_fails() {
        let next = transition(
            &AcquisitionState::Pending,
            AcquisitionEvent::Resolved(Coordinate::new(123.0, 0.0)),
        )
        .unwrap();
        assert_eq!(next.error(), Some(INVALID_POSITION_MESSAGE));
    }

    #[test]
    fn test_state_serializes_tagged() {
        let json = serde_json::to_value(AcquisitionState::Failed {
            reason: "x".into(),
        })
        .unwrap();
        assert_eq!(json["state"], "failed");
        assert_eq!(json["reason"], "x");
    }
}
