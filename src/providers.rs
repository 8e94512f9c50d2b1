//! Native position providers
//!
//! Terminals and servers have no GPS, so the CLI answers position requests
//! from a configured fix (or a scripted failure) after an optional delay.
//! The request timeout is enforced here the way a browser enforces it.

use std::time::Duration;

use async_trait::async_trait;
use geopay_core::{Coordinate, PositionFailure, PositionOptions, PositionProvider};

/// Answers every request with the same fix or failure
#[derive(Debug, Clone)]
pub struct FixedPositionProvider {
    answer: Result<Coordinate, PositionFailure>,
    delay: Duration,
}

impl FixedPositionProvider {
    pub fn new(position: Coordinate) -> Self {
        Self {
            answer: Ok(position),
            delay: Duration::ZERO,
        }
    }

    /// Provider whose platform call always fails
    pub fn failing(failure: PositionFailure) -> Self {
        Self {
            answer: Err(failure),
            delay: Duration::ZERO,
        }
    }

    /// Simulated time to first fix
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[async_trait]
impl PositionProvider for FixedPositionProvider {
    fn is_supported(&self) -> bool {
        true
    }

    async fn current_position(
        &self,
        options: &PositionOptions,
    ) -> Result<Coordinate, PositionFailure> {
        let fix = async {
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.answer.clone()
        };

        match tokio::time::timeout(options.timeout(), fix).await {
            Ok(answer) => answer,
            Err(_) => {
                tracing::debug!(timeout_ms = options.timeout_ms, "Simulated fix timed out");
                Err(PositionFailure::timeout())
            }
        }
    }

    fn name(&self) -> &'static str {
        "fixed"
    }
}

/// Host without any location capability
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedPlatform;

#[async_trait]
impl PositionProvider for UnsupportedPlatform {
    fn is_supported(&self) -> bool {
        false
    }

    async fn current_position(
        &self,
        _options: &PositionOptions,
    ) -> Result<Coordinate, PositionFailure> {
        Err(PositionFailure::silent(None))
    }

    fn name(&self) -> &'static str {
        "unsupported"
    }
}
