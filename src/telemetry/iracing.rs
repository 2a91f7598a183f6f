use std::time::Duration;

use log::{debug, warn};
use tokio::runtime::Runtime;
use tokio::time::timeout;

use super::source::TelemetrySource;

const CONN_RETRY_WAIT_MS: u64 = 200;
/// Bound on a single startup probe; the sim not running must fail fast so
/// the sampling loop keeps its cadence while disconnected.
const STARTUP_TIMEOUT_MS: u64 = 500;
/// Bound on latching one sample from a live session.
const FREEZE_TIMEOUT_MS: u64 = 200;

/// Live telemetry source over the iRacing shared-memory SDK.
///
/// Drives the async `simetry` client from a blocking runtime owned by the
/// source. `freeze_latest` pulls one sim state per tick and all channel
/// reads go against that latched state, so a tick sees a single consistent
/// sample.
pub struct IRacingSource {
    runtime: Runtime,
    client: Option<simetry::iracing::Client>,
    state: Option<simetry::iracing::SimState>,
    connected: bool,
}

impl IRacingSource {
    pub fn new() -> Result<Self, std::io::Error> {
        Ok(Self {
            runtime: Runtime::new()?,
            client: None,
            state: None,
            connected: false,
        })
    }
}

impl TelemetrySource for IRacingSource {
    fn startup(&mut self) -> bool {
        if self.client.is_some() {
            return true;
        }
        let retry_delay = Duration::from_millis(CONN_RETRY_WAIT_MS);
        let connect_attempt = self.runtime.block_on(async {
            timeout(
                Duration::from_millis(STARTUP_TIMEOUT_MS),
                simetry::iracing::Client::connect(retry_delay),
            )
            .await
            .ok()
        });

        match connect_attempt {
            Some(client) => {
                self.client = Some(client);
                self.connected = true;
                true
            }
            None => {
                debug!("iRacing session not available");
                false
            }
        }
    }

    fn shutdown(&mut self) {
        self.client = None;
        self.state = None;
        self.connected = false;
    }

    fn is_initialized(&self) -> bool {
        self.client.is_some()
    }

    fn is_connected(&self) -> bool {
        self.client.is_some() && self.connected
    }

    fn freeze_latest(&mut self) {
        let Some(client) = self.client.as_mut() else {
            self.state = None;
            self.connected = false;
            return;
        };

        let next_state = self.runtime.block_on(async {
            timeout(
                Duration::from_millis(FREEZE_TIMEOUT_MS),
                client.next_sim_state(),
            )
            .await
            .ok()
            .flatten()
        });

        if next_state.is_none() {
            warn!("could not latch iRacing sample, session may have ended");
            self.connected = false;
        }
        self.state = next_state;
    }

    fn read_f32(&self, channel: &str) -> Option<f32> {
        self.state.as_ref()?.read_name(channel)
    }

    fn read_i32(&self, channel: &str) -> Option<i32> {
        self.state.as_ref()?.read_name(channel)
    }

    fn read_bool(&self, channel: &str) -> Option<bool> {
        // pit service flags surface as floats or ints depending on the SDK
        // version, so fall back across the value kinds
        let state = self.state.as_ref()?;
        state
            .read_name::<bool>(channel)
            .or_else(|| state.read_name::<i32>(channel).map(|v| v != 0))
            .or_else(|| state.read_name::<f32>(channel).map(|v| v > 0.0))
    }

    fn driver_car_name(&self, car_idx: i32) -> Option<String> {
        if car_idx < 0 {
            return None;
        }
        let session_info = self.state.as_ref()?.session_info();
        session_info["DriverInfo"]["Drivers"][car_idx as usize]["CarScreenName"]
            .as_str()
            .map(str::to_string)
    }

    fn track_display_name(&self) -> Option<String> {
        let session_info = self.state.as_ref()?.session_info();
        session_info["WeekendInfo"]["TrackDisplayName"]
            .as_str()
            .map(str::to_string)
    }
}
