// Library interface for pitwall
// This allows integration tests and benches to access internal modules

pub mod config;
pub mod errors;
pub mod fuel;
pub mod sink;
pub mod telemetry;

// Re-export commonly used types
pub use config::AppConfig;
pub use errors::PitwallError;
pub use fuel::{FuelEstimator, LapTracker, MAX_HISTORY_LAPS};
pub use sink::{HttpSink, SnapshotSink};
pub use telemetry::{
    ConnectionMonitor, ConnectionState, Sampler, SnapshotBuilder, TelemetrySnapshot,
    TelemetrySource, TireChanges,
};
