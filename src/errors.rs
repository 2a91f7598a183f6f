// Error types for pitwall

use snafu::Snafu;
use std::io;

#[derive(Debug, Snafu)]
pub enum PitwallError {
    // Errors for the iRacing source
    #[snafu(display("Missing iRacing session, source not initialized"))]
    MissingIRacingSession,

    // Errors for the pit wall server sink
    #[snafu(display("Error building HTTP client for the pit wall server"))]
    SinkClientError { source: reqwest::Error },
    #[snafu(display("Error delivering snapshot to the pit wall server"))]
    SinkRequestError { source: reqwest::Error },
    #[snafu(display("Pit wall server rejected snapshot with status {status}"))]
    SinkStatusError { status: u16 },

    // Config management errors
    #[snafu(display("Could not find application data directory to save config file"))]
    NoConfigDir,
    #[snafu(display("Error reading config file"))]
    ConfigIOError { source: io::Error },
    #[snafu(display("Error serializing config file"))]
    ConfigSerializeError { source: serde_json::Error },
}
