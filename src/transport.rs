//! Blocking HTTP transport for the text service.
//!
//! Runs on the network worker thread, never on the input thread.

use std::io;
use std::time::Duration;

use tracing::debug;

use jamo_core::settings::NetworkSettings;

use crate::error::TransportError;
use crate::service::{OperationKind, ServiceRequest};

/// Raw HTTP outcome before service-level classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

/// Sends one request and waits for its response.
pub trait Transport: Send + Sync {
    fn send(&self, request: &ServiceRequest) -> Result<TransportResponse, TransportError>;
}

pub struct HttpTransport {
    agent: ureq::Agent,
    base_url: String,
    translate_path: String,
    correct_path: String,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            // 429 and other non-2xx statuses carry bodies we need to read.
            .http_status_as_error(false)
            .build();
        Self {
            agent: config.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            translate_path: "/translate".to_string(),
            correct_path: "/correct".to_string(),
        }
    }

    pub fn from_settings(s: &NetworkSettings) -> Self {
        Self::new(s.base_url.clone(), s.timeout()).with_paths(&s.translate_path, &s.correct_path)
    }

    /// Replace the default `/translate` and `/correct` endpoint paths.
    pub fn with_paths(mut self, translate_path: &str, correct_path: &str) -> Self {
        self.translate_path = translate_path.to_string();
        self.correct_path = correct_path.to_string();
        self
    }

    /// Full endpoint URL for `operation`.
    pub fn url_for(&self, operation: &OperationKind) -> String {
        let path = match operation {
            OperationKind::Translate { .. } => &self.translate_path,
            OperationKind::Correct { .. } => &self.correct_path,
        };
        format!("{}{}", self.base_url, path)
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: &ServiceRequest) -> Result<TransportResponse, TransportError> {
        let url = self.url_for(&request.operation);
        let payload = request.body.to_string();
        debug!(%url, bytes = payload.len(), "POST");

        let response = self
            .agent
            .post(&url)
            .header("Content-Type", "application/json")
            .send(payload.as_str())
            .map_err(map_ureq_error)?;
        let status = response.status().as_u16();
        let body = response
            .into_body()
            .read_to_string()
            .map_err(map_ureq_error)?;
        debug!(status, "response");
        Ok(TransportResponse { status, body })
    }
}

fn map_ureq_error(e: ureq::Error) -> TransportError {
    match e {
        ureq::Error::Timeout(_) => TransportError::Timeout,
        ureq::Error::HostNotFound | ureq::Error::ConnectionFailed => TransportError::Offline,
        ureq::Error::Io(ref err) if err.kind() == io::ErrorKind::TimedOut => {
            TransportError::Timeout
        }
        ureq::Error::Io(ref err) if err.kind() == io::ErrorKind::ConnectionRefused => {
            TransportError::Offline
        }
        other => TransportError::Network(other.to_string()),
    }
}
