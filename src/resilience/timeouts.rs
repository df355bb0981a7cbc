//! Transport timeouts.
//!
//! # Responsibilities
//! - Build the shared HTTP client with connect and request deadlines
//! - Keep idle connections alive as long as a request may take
//!
//! # Design Decisions
//! - Every outbound call has a deadline; a per-request timeout overrides the client's
//! - Timeouts surface as transport failures and are retried like any other

use std::time::Duration;

use crate::config::DispatchConfig;
use crate::resilience::DispatchError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(60),
            request_timeout: Duration::from_secs(60),
        }
    }
}

impl From<&DispatchConfig> for TransportConfig {
    fn from(config: &DispatchConfig) -> Self {
        Self {
            connect_timeout: config.connect_timeout(),
            request_timeout: config.request_timeout(),
        }
    }
}

/// Build the HTTP client used as the dispatcher transport.
pub fn build_client(config: &TransportConfig) -> Result<reqwest::Client, DispatchError> {
    reqwest::Client::builder()
        .connect_timeout(config.connect_timeout)
        .timeout(config.request_timeout)
        .tcp_keepalive(config.request_timeout)
        .build()
        .map_err(|e| DispatchError::InvalidRequest(format!("building HTTP client: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_dispatch_config() {
        let config = DispatchConfig {
            connect_timeout_secs: 3,
            request_timeout_secs: 9,
            ..DispatchConfig::default()
        };
        let transport = TransportConfig::from(&config);
        assert_eq!(transport.connect_timeout, Duration::from_secs(3));
        assert_eq!(transport.request_timeout, Duration::from_secs(9));
    }

    #[tokio::test]
    async fn test_build_client() {
        assert!(build_client(&TransportConfig::default()).is_ok());
    }
}
