//! Blocking HTTP client for the bugtrack API.

use bugtrack_core::{BugRecord, FieldErrors};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error};

/// Per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum ClientError {
    /// The server answered with a non-2xx status.
    #[error("{message}")]
    Api {
        status: u16,
        message: String,
        details: Option<FieldErrors>,
    },

    /// The form failed validation before anything was sent.
    #[error("Validation failed")]
    Invalid(FieldErrors),

    #[error("request to {url} failed: {reason}")]
    Transport { url: String, reason: String },

    #[error("unexpected response from {url}: {reason}")]
    Decode { url: String, reason: String },
}

impl ClientError {
    /// Per-field messages from either side of the wire.
    #[must_use]
    pub const fn details(&self) -> Option<&FieldErrors> {
        match self {
            Self::Api {
                details: Some(details),
                ..
            }
            | Self::Invalid(details) => Some(details),
            _ => None,
        }
    }

    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Server response to `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, serde::Serialize)]
pub struct Health {
    pub status: String,
    pub timestamp: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    message: String,
    #[serde(default)]
    details: Option<FieldErrors>,
}

/// The four list/write calls the board needs.
pub trait BugApi {
    /// # Errors
    ///
    /// Returns a [`ClientError`] when the request fails.
    fn fetch_bugs(&self) -> Result<Vec<BugRecord>, ClientError>;

    /// # Errors
    ///
    /// Returns a [`ClientError`] when the request fails.
    fn create_bug(&self, draft: &Map<String, Value>) -> Result<BugRecord, ClientError>;

    /// # Errors
    ///
    /// Returns a [`ClientError`] when the request fails.
    fn update_bug(&self, id: &str, patch: &Map<String, Value>) -> Result<BugRecord, ClientError>;

    /// # Errors
    ///
    /// Returns a [`ClientError`] when the request fails.
    fn delete_bug(&self, id: &str) -> Result<(), ClientError>;
}

pub struct ApiClient {
    base_url: String,
    agent: ureq::Agent,
}

impl ApiClient {
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    #[must_use]
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            agent: ureq::AgentBuilder::new()
                .timeout(timeout)
                .user_agent("bugtrack-cli")
                .build(),
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// # Errors
    ///
    /// Returns a [`ClientError`] when the server is unreachable or unhealthy.
    pub fn health(&self) -> Result<Health, ClientError> {
        let url = format!("{}/health", self.base_url);
        let response = self.call(&url, self.agent.get(&url).call())?;
        decode(&url, response)
    }

    fn bugs_url(&self) -> String {
        format!("{}/api/bugs", self.base_url)
    }

    fn bug_url(&self, id: &str) -> String {
        format!("{}/api/bugs/{}", self.base_url, encode_path_segment(id.trim()))
    }

    fn call(
        &self,
        url: &str,
        result: Result<ureq::Response, ureq::Error>,
    ) -> Result<ureq::Response, ClientError> {
        match result {
            Ok(response) => {
                debug!(url, status = response.status(), "request ok");
                Ok(response)
            }
            Err(ureq::Error::Status(status, response)) => {
                let body = response.into_json::<ErrorBody>().ok();
                let (message, details) = body.map_or_else(
                    || (format!("Request failed with status {status}"), None),
                    |body| (body.message, body.details),
                );
                debug!(url, status, %message, "request rejected");
                Err(ClientError::Api {
                    status,
                    message,
                    details,
                })
            }
            Err(ureq::Error::Transport(transport)) => {
                error!(url, base = %self.base_url, "request failed: {transport}");
                Err(ClientError::Transport {
                    url: url.to_string(),
                    reason: transport.to_string(),
                })
            }
        }
    }
}

/// Percent-encode everything outside the RFC 3986 unreserved set, so an id
/// always stays a single path segment.
fn encode_path_segment(segment: &str) -> String {
    use std::fmt::Write as _;

    let mut encoded = String::with_capacity(segment.len());
    for byte in segment.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.' | b'~') {
            encoded.push(char::from(byte));
        } else {
            let _ = write!(encoded, "%{byte:02X}");
        }
    }
    encoded
}

impl BugApi for ApiClient {
    fn fetch_bugs(&self) -> Result<Vec<BugRecord>, ClientError> {
        let url = self.bugs_url();
        let response = self.call(&url, self.agent.get(&url).call())?;
        decode(&url, response)
    }

    fn create_bug(&self, draft: &Map<String, Value>) -> Result<BugRecord, ClientError> {
        let url = self.bugs_url();
        let response = self.call(&url, self.agent.post(&url).send_json(draft))?;
        decode(&url, response)
    }

    fn update_bug(&self, id: &str, patch: &Map<String, Value>) -> Result<BugRecord, ClientError> {
        let url = self.bug_url(id);
        let response = self.call(&url, self.agent.patch(&url).send_json(patch))?;
        decode(&url, response)
    }

    fn delete_bug(&self, id: &str) -> Result<(), ClientError> {
        let url = self.bug_url(id);
        self.call(&url, self.agent.delete(&url).call())?;
        Ok(())
    }
}

fn decode<T: DeserializeOwned>(url: &str, response: ureq::Response) -> Result<T, ClientError> {
    response.into_json::<T>().map_err(|err| ClientError::Decode {
        url: url.to_string(),
        reason: err.to_string(),
    })
}
