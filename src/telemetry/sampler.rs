use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread,
    time::Duration,
};

use log::{debug, info, warn};

use crate::fuel::{FuelEstimator, LapTracker};
use crate::sink::SnapshotSink;

use super::monitor::{ConnectionMonitor, ConnectionState};
use super::snapshot::SnapshotBuilder;
use super::source::{CHANNEL_FUEL_LEVEL, CHANNEL_LAP, TelemetrySource};
use super::TelemetrySnapshot;

/// The driving loop: owns every piece of mutable sampling state and ties the
/// monitor, tracker, estimator, builder, and sink together on a fixed cadence.
///
/// All state lives here rather than in globals, so tests can drive individual
/// ticks through [`tick`](Sampler::tick) and inspect the produced snapshots.
pub struct Sampler<S: TelemetrySource, K: SnapshotSink> {
    source: S,
    sink: K,
    monitor: ConnectionMonitor,
    estimator: FuelEstimator,
    tracker: LapTracker,
    builder: SnapshotBuilder,
    /// Last recorded per-lap usage, retained across ticks with no new recording.
    fuel_used_last_lap: Option<f32>,
    interval: Duration,
}

impl<S: TelemetrySource, K: SnapshotSink> Sampler<S, K> {
    pub fn new(source: S, sink: K, client_id: impl Into<String>, interval: Duration) -> Self {
        Self {
            source,
            sink,
            monitor: ConnectionMonitor::new(),
            estimator: FuelEstimator::new(),
            tracker: LapTracker::new(),
            builder: SnapshotBuilder::new(client_id),
            fuel_used_last_lap: None,
            interval,
        }
    }

    /// Run one sampling tick.
    ///
    /// Reconciles connection state, and while connected runs the full
    /// pipeline: freeze the latest sample, track lap crossings, build the
    /// snapshot, send it. Returns the snapshot handed to the sink, or `None`
    /// when the pipeline was skipped because the source is unavailable.
    pub fn tick(&mut self) -> Option<TelemetrySnapshot> {
        let state =
            self.monitor
                .check(&mut self.source, &mut self.estimator, &mut self.tracker);
        if state != ConnectionState::Connected {
            return None;
        }

        self.source.freeze_latest();
        if !self.source.is_connected() {
            // lost the session mid-tick; the next check() tears down
            return None;
        }

        let current_lap = self.source.read_i32(CHANNEL_LAP).unwrap_or(0);
        let current_fuel = self.source.read_f32(CHANNEL_FUEL_LEVEL).unwrap_or(0.0);
        if let Some(used) = self
            .tracker
            .on_tick(current_lap, current_fuel, &mut self.estimator)
        {
            debug!("lap {} completed, {:.2}L used", current_lap - 1, used);
            self.fuel_used_last_lap = Some(used);
        }

        let snapshot = self
            .builder
            .build(&self.source, &self.estimator, self.fuel_used_last_lap);
        if let Err(e) = self.sink.send(&snapshot) {
            warn!("could not deliver snapshot: {}", e);
        }
        Some(snapshot)
    }

    /// Tick until `shutdown` is raised, then release the source handle.
    ///
    /// The handle is released on every exit path; a ctrl-c raised during the
    /// sleep stops the loop before another sleep is entered.
    pub fn run(&mut self, shutdown: Arc<AtomicBool>) {
        while !shutdown.load(Ordering::SeqCst) {
            self.tick();
            thread::sleep(self.interval);
        }
        self.source.shutdown();
        info!("sampler stopped");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use crate::errors::PitwallError;
    use crate::telemetry::source::{MockSample, MockTelemetrySource};

    use super::*;

    /// Sink that records every snapshot it is handed.
    #[derive(Default)]
    struct RecordingSink {
        sent: Mutex<Vec<TelemetrySnapshot>>,
    }

    impl SnapshotSink for &RecordingSink {
        fn send(&self, snapshot: &TelemetrySnapshot) -> Result<(), PitwallError> {
            self.sent.lock().unwrap().push(snapshot.clone());
            Ok(())
        }
    }

    /// Sink that always fails, to confirm delivery errors stay local.
    struct FailingSink;

    impl SnapshotSink for FailingSink {
        fn send(&self, _snapshot: &TelemetrySnapshot) -> Result<(), PitwallError> {
            Err(PitwallError::SinkStatusError { status: 503 })
        }
    }

    fn sampler_with_samples<'a>(
        sink: &'a RecordingSink,
        samples: Vec<MockSample>,
    ) -> Sampler<MockTelemetrySource, &'a RecordingSink> {
        Sampler::new(
            MockTelemetrySource::from_samples(samples),
            sink,
            "pitwall_test",
            Duration::from_millis(1),
        )
    }

    #[test]
    fn test_no_snapshot_while_disconnected() {
        let sink = RecordingSink::default();
        let mut sampler = Sampler::new(
            MockTelemetrySource::offline(),
            &sink,
            "pitwall_test",
            Duration::from_millis(1),
        );

        assert!(sampler.tick().is_none());
        assert!(sampler.tick().is_none());
        assert!(sink.sent.lock().unwrap().is_empty());
    }

    #[test]
    fn test_connected_tick_produces_and_sends_snapshot() {
        let sink = RecordingSink::default();
        let mut sampler = sampler_with_samples(&sink, vec![MockSample::on_track(1, 50.0)]);

        let snapshot = sampler.tick().expect("pipeline should run while connected");
        assert_eq!(snapshot.current_lap, 1);
        assert_eq!(sink.sent.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_sticky_last_lap_usage_across_ticks() {
        let sink = RecordingSink::default();
        let mut sampler = sampler_with_samples(
            &sink,
            vec![
                MockSample::on_track(1, 100.0),
                MockSample::on_track(2, 93.0),
                MockSample::on_track(2, 91.0),
                MockSample::on_track(2, 90.0),
            ],
        );

        assert_eq!(sampler.tick().unwrap().fuel_used_last_lap, None);
        assert_eq!(sampler.tick().unwrap().fuel_used_last_lap, Some(7.0));
        // no new recording on the following ticks, the value sticks
        assert_eq!(sampler.tick().unwrap().fuel_used_last_lap, Some(7.0));
        assert_eq!(sampler.tick().unwrap().fuel_used_last_lap, Some(7.0));
    }

    #[test]
    fn test_send_failure_does_not_stop_the_pipeline() {
        let mut sampler = Sampler::new(
            MockTelemetrySource::from_samples(vec![
                MockSample::on_track(1, 100.0),
                MockSample::on_track(2, 95.0),
            ]),
            FailingSink,
            "pitwall_test",
            Duration::from_millis(1),
        );

        assert!(sampler.tick().is_some());
        let snapshot = sampler.tick().expect("tick must survive a failing sink");
        // state advanced despite the failed delivery
        assert_eq!(snapshot.fuel_used_last_lap, Some(5.0));
    }

    #[test]
    fn test_run_releases_source_on_shutdown() {
        let sink = RecordingSink::default();
        let mut sampler = sampler_with_samples(&sink, vec![MockSample::on_track(1, 50.0)]);

        let shutdown = Arc::new(AtomicBool::new(true));
        sampler.run(shutdown);
        assert!(!sampler.source.is_initialized());
    }
}
