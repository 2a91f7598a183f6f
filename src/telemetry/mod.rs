pub mod monitor;
pub mod sampler;
pub mod snapshot;
pub mod source;

#[cfg(windows)]
pub mod iracing;

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

pub use monitor::{ConnectionMonitor, ConnectionState};
pub use sampler::Sampler;
pub use snapshot::SnapshotBuilder;
pub use source::{MockSample, MockTelemetrySource, TelemetrySource};

#[cfg(windows)]
pub use iracing::IRacingSource;

/// Pit-service tire-change requests, one flag per corner of the car.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TireChanges {
    pub left_front: bool,
    pub right_front: bool,
    pub left_rear: bool,
    pub right_rear: bool,
}

/// One immutable telemetry snapshot, produced and sent during a single tick.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    /// Wall-clock time of the tick, seconds since the Unix epoch
    pub timestamp: f64,
    /// Stable identity of this client, constant for the process lifetime
    pub client_id: String,
    /// Whether the player car is on track
    pub is_on_track: bool,
    /// Screen name of the player car
    pub car_name: String,
    /// Display name of the track
    pub track_name: String,
    /// Raw lap counter
    pub current_lap: i32,
    /// Laps left in the session
    pub laps_to_go: i32,
    /// Fuel remaining in the tank, liters
    pub current_fuel: f32,
    /// Rolling average fuel used per lap; 0 until a lap is recorded
    pub avg_consumption: f32,
    /// Laps the remaining fuel covers at the average consumption
    pub laps_remaining_with_fuel: f32,
    /// Fuel still needed to finish the session, clamped at 0
    pub fuel_needed: f32,
    /// Fuel used over the last recorded lap; sticky across ticks
    pub fuel_used_last_lap: Option<f32>,
    /// The raw consumption window behind the average, oldest first
    pub consumption_history: VecDeque<f32>,
    /// Incidents accrued by the player this session
    pub incident_count: i32,
    /// Fuel amount dialed into the pit service box, liters
    pub fuel_in_box: f32,
    /// Which tires are set to be changed at the next stop
    pub tires_to_change: TireChanges,
}
