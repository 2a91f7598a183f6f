use std::time::{SystemTime, UNIX_EPOCH};

use crate::fuel::FuelEstimator;

use super::source::{
    CHANNEL_DRIVER_CAR_IDX, CHANNEL_FUEL_LEVEL, CHANNEL_INCIDENT_COUNT, CHANNEL_IS_ON_TRACK,
    CHANNEL_LAP, CHANNEL_LF_TIRE_CHANGE, CHANNEL_LR_TIRE_CHANGE, CHANNEL_PIT_FUEL,
    CHANNEL_RF_TIRE_CHANGE, CHANNEL_RR_TIRE_CHANGE, CHANNEL_SESSION_LAPS_REMAIN, TelemetrySource,
};
use super::{TelemetrySnapshot, TireChanges};

/// Fallback car name when the session driver table cannot be read.
pub const UNKNOWN_CAR: &str = "Unknown Car";
/// Fallback track name when the session weekend info cannot be read.
pub const UNKNOWN_TRACK: &str = "Unknown Track";

/// Assembles one [`TelemetrySnapshot`] per tick from the latched sample.
///
/// Every optional channel is read through the source's `Option` accessors
/// and replaced with a documented fallback when missing; building a snapshot
/// never fails, whatever the simulator exposes.
pub struct SnapshotBuilder {
    client_id: String,
}

impl SnapshotBuilder {
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
        }
    }

    pub fn build(
        &self,
        source: &dyn TelemetrySource,
        estimator: &FuelEstimator,
        fuel_used_last_lap: Option<f32>,
    ) -> TelemetrySnapshot {
        let current_fuel = source.read_f32(CHANNEL_FUEL_LEVEL).unwrap_or(0.0);
        let laps_to_go = source.read_i32(CHANNEL_SESSION_LAPS_REMAIN).unwrap_or(0);
        let avg_consumption = estimator.average();

        let car_idx = source.read_i32(CHANNEL_DRIVER_CAR_IDX).unwrap_or(-1);
        let car_name = source
            .driver_car_name(car_idx)
            .unwrap_or_else(|| UNKNOWN_CAR.to_string());
        let track_name = source
            .track_display_name()
            .unwrap_or_else(|| UNKNOWN_TRACK.to_string());

        TelemetrySnapshot {
            timestamp: epoch_seconds(),
            client_id: self.client_id.clone(),
            is_on_track: source.read_bool(CHANNEL_IS_ON_TRACK).unwrap_or(false),
            car_name,
            track_name,
            current_lap: source.read_i32(CHANNEL_LAP).unwrap_or(0),
            laps_to_go,
            current_fuel,
            avg_consumption,
            laps_remaining_with_fuel: laps_remaining_with_fuel(current_fuel, avg_consumption),
            fuel_needed: fuel_needed(laps_to_go, avg_consumption, current_fuel),
            fuel_used_last_lap,
            consumption_history: estimator.history().clone(),
            incident_count: source.read_i32(CHANNEL_INCIDENT_COUNT).unwrap_or(0),
            fuel_in_box: source.read_f32(CHANNEL_PIT_FUEL).unwrap_or(0.0),
            tires_to_change: TireChanges {
                left_front: source.read_bool(CHANNEL_LF_TIRE_CHANGE).unwrap_or(false),
                right_front: source.read_bool(CHANNEL_RF_TIRE_CHANGE).unwrap_or(false),
                left_rear: source.read_bool(CHANNEL_LR_TIRE_CHANGE).unwrap_or(false),
                right_rear: source.read_bool(CHANNEL_RR_TIRE_CHANGE).unwrap_or(false),
            },
        }
    }
}

/// Laps the remaining fuel covers; 0 until an average is available.
fn laps_remaining_with_fuel(current_fuel: f32, avg_consumption: f32) -> f32 {
    if avg_consumption > 0.0 {
        current_fuel / avg_consumption
    } else {
        0.0
    }
}

/// Fuel still needed to finish the session, never negative.
fn fuel_needed(laps_to_go: i32, avg_consumption: f32, current_fuel: f32) -> f32 {
    (laps_to_go as f32 * avg_consumption - current_fuel).max(0.0)
}

fn epoch_seconds() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs_f64())
        .unwrap_or(0.0)
}
