use std::collections::VecDeque;

/// Number of completed laps averaged for the fuel-consumption estimate.
pub const MAX_HISTORY_LAPS: usize = 5;

const NO_LAP: i32 = -1;
const NO_FUEL_READING: f32 = -1.0;

/// Rolling per-lap fuel-consumption estimator.
///
/// Keeps a bounded FIFO window of the last [`MAX_HISTORY_LAPS`] completed-lap
/// consumption values and exposes their arithmetic mean. The window only ever
/// contains positive values: recordings taken before the fuel sensor reports
/// a real level, or recordings where the fuel level increased mid-lap
/// (refuel, telemetry noise), are rejected without mutating the window.
pub struct FuelEstimator {
    history: VecDeque<f32>,
}

impl Default for FuelEstimator {
    fn default() -> Self {
        FuelEstimator::new()
    }
}

impl FuelEstimator {
    pub fn new() -> Self {
        Self {
            history: VecDeque::with_capacity(MAX_HISTORY_LAPS),
        }
    }

    /// Record the fuel used over a completed lap.
    ///
    /// Returns the recorded amount, or `None` when the reading is not usable:
    /// `previous_fuel <= 0` means the sensor had no value at the start of the
    /// lap, and a non-positive delta means fuel stayed flat or increased.
    pub fn record_lap(&mut self, previous_fuel: f32, current_fuel: f32) -> Option<f32> {
        if previous_fuel <= 0.0 {
            return None;
        }
        let fuel_used = previous_fuel - current_fuel;
        if fuel_used > 0.0 {
            self.history.push_back(fuel_used);
            if self.history.len() > MAX_HISTORY_LAPS {
                self.history.pop_front();
            }
            return Some(fuel_used);
        }
        None
    }

    /// Arithmetic mean of the recorded window; 0 when no laps are recorded.
    pub fn average(&self) -> f32 {
        if self.history.is_empty() {
            return 0.0;
        }
        self.history.iter().sum::<f32>() / self.history.len() as f32
    }

    /// Recorded consumption values, oldest first.
    pub fn history(&self) -> &VecDeque<f32> {
        &self.history
    }

    pub fn reset(&mut self) {
        self.history.clear();
    }
}

/// Detects lap-boundary crossings from the raw lap counter and drives the
/// estimator exactly once per completed lap.
///
/// `last_lap` and `fuel_at_lap_start` start at their `-1` sentinels and are
/// updated on every confirmed crossing, whether or not the estimator accepted
/// the recording. A tick with a bad fuel reading therefore costs one lap of
/// data instead of blocking tracking permanently.
pub struct LapTracker {
    last_lap: i32,
    fuel_at_lap_start: f32,
}

impl Default for LapTracker {
    fn default() -> Self {
        LapTracker::new()
    }
}

impl LapTracker {
    pub fn new() -> Self {
        Self {
            last_lap: NO_LAP,
            fuel_at_lap_start: NO_FUEL_READING,
        }
    }

    /// Process one sampling tick.
    ///
    /// Returns the consumption value recorded this tick, or `None` when no
    /// crossing happened or the crossing was not recordable. Callers keep the
    /// last returned value around for ticks where nothing new is recorded.
    pub fn on_tick(
        &mut self,
        current_lap: i32,
        current_fuel: f32,
        estimator: &mut FuelEstimator,
    ) -> Option<f32> {
        if current_lap == self.last_lap || current_lap <= 0 {
            return None;
        }
        let recorded = estimator.record_lap(self.fuel_at_lap_start, current_fuel);
        self.fuel_at_lap_start = current_fuel;
        self.last_lap = current_lap;
        recorded
    }

    pub fn last_lap(&self) -> i32 {
        self.last_lap
    }

    pub fn fuel_at_lap_start(&self) -> f32 {
        self.fuel_at_lap_start
    }

    pub fn reset(&mut self) {
        self.last_lap = NO_LAP;
        self.fuel_at_lap_start = NO_FUEL_READING;
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_history_capped_at_window_size() {
        let mut estimator = FuelEstimator::new();
        let mut fuel = 100.0;
        for used in 1..=8 {
            let next = fuel - used as f32;
            assert_eq!(estimator.record_lap(fuel, next), Some(used as f32));
            fuel = next;
        }

        let retained: Vec<f32> = estimator.history().iter().copied().collect();
        assert_eq!(retained, vec![4.0, 5.0, 6.0, 7.0, 8.0]);
    }

    #[test]
    fn test_average_empty_history_is_zero() {
        let estimator = FuelEstimator::new();
        assert_eq!(estimator.average(), 0.0);
    }

    #[test]
    fn test_average_of_recorded_laps() {
        let mut estimator = FuelEstimator::new();
        estimator.record_lap(60.0, 50.0);
        estimator.record_lap(50.0, 42.0);
        estimator.record_lap(42.0, 30.0);

        assert_eq!(estimator.average(), 10.0);
    }

    #[test]
    fn test_record_rejected_without_previous_reading() {
        let mut estimator = FuelEstimator::new();
        assert_eq!(estimator.record_lap(0.0, 5.0), None);
        assert_eq!(estimator.record_lap(-1.0, 5.0), None);
        assert!(estimator.history().is_empty());
    }

    #[test]
    fn test_record_rejected_when_fuel_increased() {
        let mut estimator = FuelEstimator::new();
        assert_eq!(estimator.record_lap(50.0, 55.0), None);
        assert_eq!(estimator.record_lap(50.0, 50.0), None);
        assert!(estimator.history().is_empty());
    }

    #[test]
    fn test_record_accepted_appends_usage() {
        let mut estimator = FuelEstimator::new();
        assert_eq!(estimator.record_lap(60.0, 50.0), Some(10.0));
        assert_eq!(estimator.history().len(), 1);
        assert_eq!(estimator.history()[0], 10.0);
    }

    #[test]
    fn test_same_lap_does_not_record_twice() {
        let mut estimator = FuelEstimator::new();
        let mut tracker = LapTracker::new();

        assert_eq!(tracker.on_tick(1, 100.0, &mut estimator), None);
        assert_eq!(tracker.on_tick(2, 93.0, &mut estimator), Some(7.0));
        assert_eq!(estimator.history().len(), 1);

        // same lap again, lower fuel: no new recording
        assert_eq!(tracker.on_tick(2, 90.0, &mut estimator), None);
        assert_eq!(estimator.history().len(), 1);
    }

    #[test]
    fn test_lap_zero_is_not_a_crossing() {
        let mut estimator = FuelEstimator::new();
        let mut tracker = LapTracker::new();

        assert_eq!(tracker.on_tick(0, 100.0, &mut estimator), None);
        assert_eq!(tracker.last_lap(), -1);
        assert_eq!(tracker.fuel_at_lap_start(), -1.0);
    }

    #[test]
    fn test_cursor_advances_even_when_recording_rejected() {
        let mut estimator = FuelEstimator::new();
        let mut tracker = LapTracker::new();

        // first crossing has no previous reading, so nothing records, but the
        // cursor must still move to avoid wedging on the next lap
        assert_eq!(tracker.on_tick(1, 100.0, &mut estimator), None);
        assert_eq!(tracker.last_lap(), 1);
        assert_eq!(tracker.fuel_at_lap_start(), 100.0);

        assert_eq!(tracker.on_tick(2, 92.0, &mut estimator), Some(8.0));
    }

    #[test]
    fn test_reset_restores_sentinels() {
        let mut estimator = FuelEstimator::new();
        let mut tracker = LapTracker::new();

        tracker.on_tick(1, 100.0, &mut estimator);
        tracker.on_tick(2, 95.0, &mut estimator);
        assert!(!estimator.history().is_empty());

        estimator.reset();
        tracker.reset();

        assert!(estimator.history().is_empty());
        assert_eq!(estimator.average(), 0.0);
        assert_eq!(tracker.last_lap(), -1);
        assert_eq!(tracker.fuel_at_lap_start(), -1.0);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_history_never_exceeds_window(usages in prop::collection::vec(0.1f32..20.0f32, 0..40)) {
            let mut estimator = FuelEstimator::new();
            let mut fuel = 10_000.0f32;
            for used in &usages {
                let next = fuel - used;
                estimator.record_lap(fuel, next);
                fuel = next;
            }

            prop_assert!(estimator.history().len() <= MAX_HISTORY_LAPS);
            prop_assert!(estimator.history().len() <= usages.len());
        }

        #[test]
        fn prop_average_within_window_bounds(usages in prop::collection::vec(0.1f32..20.0f32, 1..40)) {
            let mut estimator = FuelEstimator::new();
            let mut fuel = 10_000.0f32;
            for used in &usages {
                let next = fuel - used;
                estimator.record_lap(fuel, next);
                fuel = next;
            }

            let min = estimator.history().iter().copied().fold(f32::INFINITY, f32::min);
            let max = estimator.history().iter().copied().fold(f32::NEG_INFINITY, f32::max);
            let avg = estimator.average();
            prop_assert!(avg >= min - f32::EPSILON);
            prop_assert!(avg <= max + f32::EPSILON);
        }
    }
}
