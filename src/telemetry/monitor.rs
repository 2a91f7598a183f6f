use log::info;

use crate::fuel::{FuelEstimator, LapTracker};

use super::source::TelemetrySource;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connected,
}

/// Tracks whether the telemetry source is reachable and tears down or
/// rebuilds estimator state on transitions.
///
/// State only ever changes inside [`check`](ConnectionMonitor::check); the
/// rest of the pipeline reads the returned state and never infers
/// connectivity from sample content.
#[derive(Default)]
pub struct ConnectionMonitor {
    state: ConnectionState,
}

impl ConnectionMonitor {
    pub fn new() -> Self {
        ConnectionMonitor::default()
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Probe the source once and reconcile connection state.
    ///
    /// On loss of the source: reset the estimator and lap tracker, release
    /// the source handle, and report Disconnected. On a successful
    /// (re)initialization: report Connected. A failed startup attempt is not
    /// an error, just "still disconnected".
    pub fn check(
        &mut self,
        source: &mut dyn TelemetrySource,
        estimator: &mut FuelEstimator,
        tracker: &mut LapTracker,
    ) -> ConnectionState {
        match self.state {
            ConnectionState::Connected => {
                if !(source.is_initialized() && source.is_connected()) {
                    self.state = ConnectionState::Disconnected;
                    estimator.reset();
                    tracker.reset();
                    source.shutdown();
                    info!("telemetry source disconnected");
                }
            }
            ConnectionState::Disconnected => {
                if source.startup() && source.is_initialized() && source.is_connected() {
                    self.state = ConnectionState::Connected;
                    info!("telemetry source connected");
                }
            }
        }
        self.state
    }
}
