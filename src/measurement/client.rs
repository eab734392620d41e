// HttpMeasurementClient - blocking HTTP access to the measurement server
//
// The server exposes two endpoints:
// - GET /            -> {"status": "up"}
// - GET /measure/    -> a single JSON number for the `angle` query parameter

use std::time::Duration;

use log::debug;
use reqwest::blocking::Client;
use serde::Deserialize;

use super::{check_angle, MeasurementInterface, Sampler};
use crate::config::ClientConfig;
use crate::error::{log_measurement_error, MeasurementError};

/// Status endpoint payload
#[derive(Debug, Deserialize)]
struct StatusResponse {
    status: String,
}

/// Client for the measurement server API
pub struct HttpMeasurementClient {
    http: Client,
    base_url: String,
    measurement_count: usize,
}

impl HttpMeasurementClient {
    /// Create a client from connection settings
    ///
    /// # Arguments
    /// * `config` - Base URL and request timeout
    ///
    /// # Returns
    /// * `Ok(HttpMeasurementClient)` - Client ready to issue requests
    /// * `Err(MeasurementError::Transport)` - HTTP client could not be built
    pub fn new(config: &ClientConfig) -> Result<Self, MeasurementError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|err| MeasurementError::Transport {
                reason: err.to_string(),
            })?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            measurement_count: 0,
        })
    }

    /// Base URL with trailing slashes removed
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn fetch_status(&self) -> Result<String, MeasurementError> {
        let response = self
            .http
            .get(format!("{}/", self.base_url))
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(transport_error)?;
        let payload: StatusResponse = response.json().map_err(decode_error)?;
        Ok(payload.status)
    }
}

impl Sampler for HttpMeasurementClient {
    fn measure(&mut self, angle: f64) -> Result<f64, MeasurementError> {
        check_angle(angle)?;

        let response = self
            .http
            .get(format!("{}/measure/", self.base_url))
            .query(&[("angle", angle)])
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|err| MeasurementError::Transport {
                reason: format!("measuring at angle {}: {}", angle, err),
            })?;
        let reading: f64 = response.json().map_err(decode_error)?;

        self.measurement_count += 1;
        debug!("[HttpMeasurementClient] angle={:.1} reading={:.2}", angle, reading);
        Ok(reading)
    }
}

impl MeasurementInterface for HttpMeasurementClient {
    fn check_status(&mut self) -> bool {
        match self.fetch_status() {
            Ok(status) => status == "up",
            Err(err) => {
                log_measurement_error(&err, "HttpMeasurementClient::check_status");
                false
            }
        }
    }

    fn total_measurements(&self) -> usize {
        self.measurement_count
    }

    fn reset_count(&mut self) {
        self.measurement_count = 0;
    }
}

fn transport_error(err: reqwest::Error) -> MeasurementError {
    MeasurementError::Transport {
        reason: err.to_string(),
    }
}

fn decode_error(err: reqwest::Error) -> MeasurementError {
    MeasurementError::InvalidResponse {
        reason: err.to_string(),
    }
}
