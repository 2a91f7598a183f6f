use std::collections::HashMap;

/// Raw lap counter for the player car.
pub const CHANNEL_LAP: &str = "Lap";
/// Fuel remaining in the tank, liters.
pub const CHANNEL_FUEL_LEVEL: &str = "FuelLevel";
/// Whether the player car is on track.
pub const CHANNEL_IS_ON_TRACK: &str = "IsOnTrack";
/// Laps left in the session, including the partial current lap.
pub const CHANNEL_SESSION_LAPS_REMAIN: &str = "SessionLapsRemainEx";
/// Index of the player car in the session driver table.
pub const CHANNEL_DRIVER_CAR_IDX: &str = "DriverCarIdx";
/// Incident count accrued by the player this session.
pub const CHANNEL_INCIDENT_COUNT: &str = "PlayerCarMyIncidentCount";
/// Fuel amount dialed into the pit service box, liters.
pub const CHANNEL_PIT_FUEL: &str = "PitSvFuel";
/// Pit service tire-change requests, one flag per corner of the car.
pub const CHANNEL_LF_TIRE_CHANGE: &str = "dpLFTireChange";
pub const CHANNEL_RF_TIRE_CHANGE: &str = "dpRFTireChange";
pub const CHANNEL_LR_TIRE_CHANGE: &str = "dpLRTireChange";
pub const CHANNEL_RR_TIRE_CHANGE: &str = "dpRRTireChange";

/// A trait for reading live telemetry from a racing simulation.
///
/// This trait abstracts the telemetry data source behind the narrow surface
/// the sampler needs: lifecycle control, connection state queries, and typed
/// reads of named channels from a latched sample. Implementations connect to
/// a live game session or replay scripted data for testing.
///
/// # Lifecycle
///
/// 1. `startup()` attempts to reach the simulator; it is cheap to call every
///    tick while disconnected and reports failure as `false`, never panics.
/// 2. `freeze_latest()` latches one consistent sample; it must be called
///    once per tick before any channel read.
/// 3. `read_*` and the session-info lookups read from the latched sample and
///    return `None` for any channel the simulator does not expose.
/// 4. `shutdown()` releases the connection; callers may start over afterwards.
pub trait TelemetrySource {
    /// Attempt to initialize the connection to the simulator.
    ///
    /// Returns `false` when the simulator is not reachable; that is a normal
    /// condition, not an error.
    fn startup(&mut self) -> bool;

    /// Release the connection handle. Safe to call when not connected.
    fn shutdown(&mut self);

    /// Whether a connection handle currently exists.
    fn is_initialized(&self) -> bool;

    /// Whether the simulator is actively producing samples.
    fn is_connected(&self) -> bool;

    /// Latch the most recent sample for this tick's reads.
    fn freeze_latest(&mut self);

    fn read_f32(&self, channel: &str) -> Option<f32>;

    fn read_i32(&self, channel: &str) -> Option<i32>;

    fn read_bool(&self, channel: &str) -> Option<bool>;

    /// Screen name of the car driven by the driver at `car_idx` in the
    /// session driver table.
    fn driver_car_name(&self, car_idx: i32) -> Option<String>;

    /// Display name of the track for the current session.
    fn track_display_name(&self) -> Option<String>;
}

/// One scripted sample for [`MockTelemetrySource`].
#[derive(Clone, Debug, Default)]
pub struct MockSample {
    pub floats: HashMap<String, f32>,
    pub ints: HashMap<String, i32>,
    pub bools: HashMap<String, bool>,
    pub car_name: Option<String>,
    pub track_name: Option<String>,
}

impl MockSample {
    /// A sample for a car on track at `lap` with `fuel` liters remaining.
    pub fn on_track(lap: i32, fuel: f32) -> Self {
        let mut sample = MockSample::default();
        sample.ints.insert(CHANNEL_LAP.to_string(), lap);
        sample.floats.insert(CHANNEL_FUEL_LEVEL.to_string(), fuel);
        sample.bools.insert(CHANNEL_IS_ON_TRACK.to_string(), true);
        sample
    }

    pub fn with_int(mut self, channel: &str, value: i32) -> Self {
        self.ints.insert(channel.to_string(), value);
        self
    }

    pub fn with_float(mut self, channel: &str, value: f32) -> Self {
        self.floats.insert(channel.to_string(), value);
        self
    }

    pub fn with_bool(mut self, channel: &str, value: bool) -> Self {
        self.bools.insert(channel.to_string(), value);
        self
    }

    pub fn with_names(mut self, car_name: &str, track_name: &str) -> Self {
        self.car_name = Some(car_name.to_string());
        self.track_name = Some(track_name.to_string());
        self
    }
}

/// A scripted telemetry source for testing and offline development.
///
/// Replays a fixed sequence of samples, one per `freeze_latest` call, and
/// holds the last sample once the script is exhausted. `set_online(false)`
/// simulates the simulator going away so connection-lifecycle handling can
/// be exercised without a live game.
pub struct MockTelemetrySource {
    samples: Vec<MockSample>,
    cursor: usize,
    frozen: Option<MockSample>,
    started: bool,
    online: bool,
}

impl Default for MockTelemetrySource {
    fn default() -> Self {
        MockTelemetrySource::from_samples(Vec::new())
    }
}

impl MockTelemetrySource {
    pub fn from_samples(samples: Vec<MockSample>) -> Self {
        Self {
            samples,
            cursor: 0,
            frozen: None,
            started: false,
            online: true,
        }
    }

    /// A source that never comes up, for exercising failed startups.
    pub fn offline() -> Self {
        let mut source = MockTelemetrySource::default();
        source.online = false;
        source
    }

    pub fn set_online(&mut self, online: bool) {
        self.online = online;
    }
}

impl TelemetrySource for MockTelemetrySource {
    fn startup(&mut self) -> bool {
        if self.online {
            self.started = true;
        }
        self.started
    }

    fn shutdown(&mut self) {
        self.started = false;
        self.frozen = None;
    }

    fn is_initialized(&self) -> bool {
        self.started
    }

    fn is_connected(&self) -> bool {
        self.started && self.online
    }

    fn freeze_latest(&mut self) {
        if !self.is_connected() {
            self.frozen = None;
            return;
        }
        if self.cursor < self.samples.len() {
            self.frozen = Some(self.samples[self.cursor].clone());
            self.cursor += 1;
        }
    }

    fn read_f32(&self, channel: &str) -> Option<f32> {
        self.frozen.as_ref()?.floats.get(channel).copied()
    }

    fn read_i32(&self, channel: &str) -> Option<i32> {
        self.frozen.as_ref()?.ints.get(channel).copied()
    }

    fn read_bool(&self, channel: &str) -> Option<bool> {
        let frozen = self.frozen.as_ref()?;
        // tolerate flags scripted as ints or floats, as the SDK reports some
        frozen
            .bools
            .get(channel)
            .copied()
            .or_else(|| frozen.ints.get(channel).map(|v| *v != 0))
            .or_else(|| frozen.floats.get(channel).map(|v| *v > 0.0))
    }

    fn driver_car_name(&self, _car_idx: i32) -> Option<String> {
        self.frozen.as_ref()?.car_name.clone()
    }

    fn track_display_name(&self) -> Option<String> {
        self.frozen.as_ref()?.track_name.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_replays_samples_in_order() {
        let mut source = MockTelemetrySource::from_samples(vec![
            MockSample::on_track(1, 100.0),
            MockSample::on_track(2, 93.0),
        ]);
        assert!(source.startup());

        source.freeze_latest();
        assert_eq!(source.read_i32(CHANNEL_LAP), Some(1));
        assert_eq!(source.read_f32(CHANNEL_FUEL_LEVEL), Some(100.0));

        source.freeze_latest();
        assert_eq!(source.read_i32(CHANNEL_LAP), Some(2));

        // script exhausted: the last sample stays latched
        source.freeze_latest();
        assert_eq!(source.read_i32(CHANNEL_LAP), Some(2));
    }

    #[test]
    fn test_offline_mock_never_starts() {
        let mut source = MockTelemetrySource::offline();
        assert!(!source.startup());
        assert!(!source.is_initialized());
        assert!(!source.is_connected());
    }

    #[test]
    fn test_reads_without_freeze_are_empty() {
        let mut source = MockTelemetrySource::from_samples(vec![MockSample::on_track(1, 50.0)]);
        source.startup();
        assert_eq!(source.read_i32(CHANNEL_LAP), None);
        assert_eq!(source.driver_car_name(0), None);
    }

    #[test]
    fn test_bool_read_falls_back_across_value_kinds() {
        let mut source = MockTelemetrySource::from_samples(vec![
            MockSample::on_track(1, 50.0)
                .with_float(CHANNEL_LF_TIRE_CHANGE, 1.0)
                .with_int(CHANNEL_RF_TIRE_CHANGE, 0),
        ]);
        source.startup();
        source.freeze_latest();

        assert_eq!(source.read_bool(CHANNEL_LF_TIRE_CHANGE), Some(true));
        assert_eq!(source.read_bool(CHANNEL_RF_TIRE_CHANGE), Some(false));
        assert_eq!(source.read_bool(CHANNEL_LR_TIRE_CHANGE), None);
    }
}
