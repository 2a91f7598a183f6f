use std::time::Duration;

use crate::errors::PitwallError;
use crate::telemetry::TelemetrySnapshot;

/// Path the pit wall server exposes for snapshot updates.
const UPDATE_PATH: &str = "/api/update";
/// Request bound, kept under one sampling period so a slow server cannot
/// starve the tick loop.
const SEND_TIMEOUT: Duration = Duration::from_millis(200);

/// Outbound seam for delivering snapshots to the remote consumer.
///
/// A failed send is reported to the caller, who logs and drops it; every
/// tick produces fresh data that supersedes a lost snapshot, so there is no
/// retry.
pub trait SnapshotSink {
    fn send(&self, snapshot: &TelemetrySnapshot) -> Result<(), PitwallError>;
}

/// POSTs snapshots as JSON to `<base_url>/api/update`.
///
/// Uses a reusable `reqwest` client with connection pooling and a request
/// timeout shorter than the sampling period.
pub struct HttpSink {
    http: reqwest::blocking::Client,
    update_url: String,
}

impl HttpSink {
    pub fn new(base_url: &str) -> Result<Self, PitwallError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(SEND_TIMEOUT)
            .build()
            .map_err(|e| PitwallError::SinkClientError { source: e })?;

        Ok(Self {
            http,
            update_url: format!("{}{}", base_url.trim_end_matches('/'), UPDATE_PATH),
        })
    }

    pub fn update_url(&self) -> &str {
        &self.update_url
    }
}

impl SnapshotSink for HttpSink {
    fn send(&self, snapshot: &TelemetrySnapshot) -> Result<(), PitwallError> {
        let response = self
            .http
            .post(&self.update_url)
            .json(snapshot)
            .send()
            .map_err(|e| PitwallError::SinkRequestError { source: e })?;

        if !response.status().is_success() {
            return Err(PitwallError::SinkStatusError {
                status: response.status().as_u16(),
            });
        }
        Ok(())
    }
}
