//! LocationSource - single-shot position acquisition
//!
//! Bridges a `PositionProvider` into the `AcquisitionState` model. The state
//! lives in a `tokio::sync::watch` channel owned by the source; UIs either
//! poll `state()` each frame or `subscribe()` for change notifications.
//!
//! Overlapping requests: while a request is pending, further calls are
//! ignored and report `RequestOutcome::AlreadyPending`. No second platform
//! request is issued. Dropping a pending `request_location` future moves the
//! state to `Failed`, so a cancelled request never blocks later ones.

use std::sync::Arc;

use tokio::sync::watch;

use crate::acquisition::{
    transition, AcquisitionEvent, AcquisitionState, TransitionResult, CANCELLED_MESSAGE,
};
use crate::provider::{PositionFailure, PositionOptions, PositionProvider};

/// What happened to a call of `request_location`
#[derive(Debug, Clone, PartialEq)]
pub enum RequestOutcome {
    /// The platform answered; carries the terminal state
    Resolved(AcquisitionState),
    /// The host has no location capability; state is `Failed` without passing `Pending`
    Unsupported,
    /// A previous request is still in flight; nothing was done
    AlreadyPending,
}

/// Owner of one component's acquisition state
pub struct LocationSource {
    provider: Arc<dyn PositionProvider>,
    options: PositionOptions,
    state: watch::Sender<AcquisitionState>,
}

impl LocationSource {
    /// Create a source in the `Idle` state with the default request options
    pub fn new(provider: Arc<dyn PositionProvider>) -> Self {
        Self::with_options(provider, PositionOptions::default())
    }

    pub fn with_options(provider: Arc<dyn PositionProvider>, options: PositionOptions) -> Self {
        let (state, _) = watch::channel(AcquisitionState::Idle);
        Self {
            provider,
            options,
            state,
        }
    }

    pub fn options(&self) -> &PositionOptions {
        &self.options
    }

    /// Snapshot of the current state
    pub fn state(&self) -> AcquisitionState {
        self.state.borrow().clone()
    }

    /// Receiver notified on every state change
    pub fn subscribe(&self) -> watch::Receiver<AcquisitionState> {
        self.state.subscribe()
    }

    /// True while a platform request is in flight
    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_pending()
    }

    /// Ask the platform for one position fix
    ///
    /// The support check and the move to `Pending` happen before the first
    /// suspension point. Failures end up in the state; this never errors.
    pub async fn request_location(&self) -> RequestOutcome {
        if !self.provider.is_supported() {
            return match self.apply(AcquisitionEvent::Unsupported) {
                Ok(()) => {
                    tracing::warn!(provider = self.provider.name(), "Location capability missing");
                    RequestOutcome::Unsupported
                }
                Err(err) => {
                    tracing::debug!(error = %err, "Ignoring location request");
                    RequestOutcome::AlreadyPending
                }
            };
        }

        if let Err(err) = self.apply(AcquisitionEvent::Requested) {
            tracing::debug!(error = %err, "Ignoring location request");
            return RequestOutcome::AlreadyPending;
        }

        // Leaves Pending on drop if this future is cancelled before resolving
        let mut guard = PendingGuard::new(self);

        tracing::info!(
            provider = self.provider.name(),
            high_accuracy = self.options.enable_high_accuracy,
            timeout_ms = self.options.timeout_ms,
            maximum_age_ms = self.options.maximum_age_ms,
            "Requesting position"
        );

        let event = match self.provider.current_position(&self.options).await {
            Ok(coordinate) => {
                tracing::info!(lat = coordinate.lat, lon = coordinate.lon, "Position acquired");
                AcquisitionEvent::Resolved(coordinate)
            }
            Err(failure) => {
                tracing::warn!(
                    kind = failure.kind.map(|k| k.as_str()).unwrap_or("unknown"),
                    message = failure.message().unwrap_or(""),
                    "Position request failed"
                );
                AcquisitionEvent::Rejected(failure)
            }
        };

        guard.resolve(event);
        RequestOutcome::Resolved(self.state())
    }

    /// Check-and-set under the channel lock
    fn apply(&self, event: AcquisitionEvent) -> TransitionResult<()> {
        let mut outcome = Ok(());
        self.state.send_if_modified(|current| match transition(current, event) {
            Ok(next) => {
                tracing::debug!(from = current.label(), to = next.label(), "Acquisition transition");
                *current = next;
                true
            }
            Err(err) => {
                outcome = Err(err);
                false
            }
        });
        outcome
    }
}

/// Owns the obligation to leave `Pending` for one request
struct PendingGuard<'a> {
    source: &'a LocationSource,
    armed: bool,
}

impl<'a> PendingGuard<'a> {
    fn new(source: &'a LocationSource) -> Self {
        Self {
            source,
            armed: true,
        }
    }

    fn resolve(&mut self, event: AcquisitionEvent) {
        self.armed = false;
        // Only this request can leave Pending, so the resolution always applies
        if let Err(err) = self.source.apply(event) {
            tracing::error!(error = %err, "Dropped position resolution");
        }
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        tracing::warn!("Position request cancelled before resolution");
        let failure = PositionFailure::new(None, CANCELLED_MESSAGE);
        if let Err(err) = self.source.apply(AcquisitionEvent::Rejected(failure)) {
            tracing::error!(error = %err, "Dropped cancellation");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acquisition::{FALLBACK_FAILURE_MESSAGE, UNSUPPORTED_MESSAGE};
    use crate::coord::Coordinate;
    use crate::provider::FailureKind;
    use std::time::Duration;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tokio::sync::Notify;

    /// Provider with a canned answer, an optional release gate and a call log
    struct ScriptedProvider {
        supported: bool,
        response: Result<Coordinate, PositionFailure>,
        gate: Option<Arc<Notify>>,
        calls: AtomicUsize,
        seen_options: Mutex<Vec<PositionOptions>>,
    }

    impl ScriptedProvider {
        fn answering(response: Result<Coordinate, PositionFailure>) -> Self {
            Self {
                supported: true,
                response,
                gate: None,
                calls: AtomicUsize::new(0),
                seen_options: Mutex::new(Vec::new()),
            }
        }

        fn unsupported() -> Self {
            Self {
                supported: false,
                ..Self::answering(Ok(Coordinate::new(0.0, 0.0)))
            }
        }

        fn gated(mut self, gate: Arc<Notify>) -> Self {
            self.gate = Some(gate);
            self
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PositionProvider for ScriptedProvider {
        fn is_supported(&self) -> bool {
            self.supported
        }

        async fn current_position(
            &self,
            options: &PositionOptions,
        ) -> Result<Coordinate, PositionFailure> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen_options.lock().unwrap().push(*options);
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            self.response.clone()
        }
    }

    fn nairobi() -> Coordinate {
        Coordinate::new(-1.286389, 36.817223)
    }

    #[tokio::test]
    async fn test_unsupported_platform_never_pends() {
        let provider = Arc::new(ScriptedProvider::unsupported());
        let source = LocationSource::new(provider.clone());

        let outcome = source.request_location().await;

        assert_eq!(outcome, RequestOutcome::Unsupported);
        assert_eq!(
            source.state(),
            AcquisitionState::Failed {
                reason: UNSUPPORTED_MESSAGE.into()
            }
        );
        assert!(!source.is_loading());
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_success_clears_loading() {
        let gate = Arc::new(Notify::new());
        let provider = Arc::new(ScriptedProvider::answering(Ok(nairobi())).gated(gate.clone()));
        let source = Arc::new(LocationSource::new(provider.clone()));
        let mut rx = source.subscribe();

        let task = {
            let source = source.clone();
            tokio::spawn(async move { source.request_location().await })
        };

        rx.wait_for(|s| s.is_pending()).await.unwrap();
        assert!(source.is_loading());

        gate.notify_one();
        let outcome = task.await.unwrap();

        let expected = AcquisitionState::Succeeded {
            coordinate: nairobi(),
        };
        assert_eq!(outcome, RequestOutcome::Resolved(expected.clone()));
        assert_eq!(source.state(), expected);
        assert!(!source.is_loading());
    }

    #[tokio::test]
    async fn test_request_uses_platform_options() {
        let provider = Arc::new(ScriptedProvider::answering(Ok(nairobi())));
        let source = LocationSource::new(provider.clone());

        source.request_location().await;

        let seen = provider.seen_options.lock().unwrap().clone();
        assert_eq!(seen, vec![PositionOptions::default()]);
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_failure_message_is_verbatim() {
        let provider = Arc::new(ScriptedProvider::answering(Err(PositionFailure::new(
            Some(FailureKind::PermissionDenied),
            "User denied Geolocation",
        ))));
        let source = LocationSource::new(provider);

        source.request_location().await;

        assert_eq!(source.state().error(), Some("User denied Geolocation"));
    }

    #[tokio::test]
    async fn test_failure_without_message_falls_back() {
        let provider = Arc::new(ScriptedProvider::answering(Err(PositionFailure::silent(
            Some(FailureKind::PositionUnavailable),
        ))));
        let source = LocationSource::new(provider);

        source.request_location().await;

        assert_eq!(source.state().error(), Some(FALLBACK_FAILURE_MESSAGE));
    }

    #[tokio::test]
    async fn test_overlapping_request_is_ignored() {
        let gate = Arc::new(Notify::new());
        let provider = Arc::new(ScriptedProvider::answering(Ok(nairobi())).gated(gate.clone()));
        let source = Arc::new(LocationSource::new(provider.clone()));
        let mut rx = source.subscribe();

        let first = {
            let source = source.clone();
            tokio::spawn(async move { source.request_location().await })
        };
        rx.wait_for(|s| s.is_pending()).await.unwrap();

        assert_eq!(source.request_location().await, RequestOutcome::AlreadyPending);
        assert_eq!(provider.calls(), 1);

        gate.notify_one();
        first.await.unwrap();
        assert_eq!(source.state().coordinate(), Some(nairobi()));
    }

    #[tokio::test]
    async fn test_retry_after_failure_starts_fresh_cycle() {
        let provider = Arc::new(ScriptedProvider::answering(Err(PositionFailure::timeout())));
        let source = LocationSource::new(provider.clone());

        source.request_location().await;
        assert_eq!(source.state().error(), Some("Timeout expired"));

        source.request_location().await;
        assert_eq!(provider.calls(), 2);
        assert_eq!(source.state().error(), Some("Timeout expired"));
    }

    #[tokio::test]
    async fn test_cancelled_request_does_not_stay_pending() {
        let gate = Arc::new(Notify::new());
        let provider = Arc::new(ScriptedProvider::answering(Ok(nairobi())).gated(gate.clone()));
        let source = LocationSource::new(provider.clone());

        let cancelled =
            tokio::time::timeout(Duration::from_millis(20), source.request_location()).await;
        assert!(cancelled.is_err());
        assert_eq!(source.state().error(), Some(CANCELLED_MESSAGE));
        assert!(!source.is_loading());

        // The next press reaches the platform again
        gate.notify_one();
        let outcome = source.request_location().await;
        assert_eq!(
            outcome,
            RequestOutcome::Resolved(AcquisitionState::Succeeded {
                coordinate: nairobi()
            })
        );
        assert_eq!(provider.calls(), 2);
    }
}
