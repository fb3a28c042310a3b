//! Correlation header configuration
//!
//! Header names default to the mesh-wide conventions and can be overridden
//! per service through environment variables.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::keys::{SlotKeys, CORRELATION_ID_HEADER, REQUEST_ID_HEADER, TRACE_ID_HEADER};

const ENV_PREFIX: &str = "CORRELATION_";

/// Header names used for correlation id resolution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrelationConfig {
    /// Correlation id header (`CORRELATION_HEADER`)
    #[serde(default = "default_correlation_header")]
    pub header: String,

    /// Trace id header (`CORRELATION_TRACE_HEADER`)
    #[serde(default = "default_trace_header")]
    pub trace_header: String,

    /// Request id header (`CORRELATION_REQUEST_HEADER`)
    #[serde(default = "default_request_header")]
    pub request_header: String,
}

fn default_correlation_header() -> String {
    CORRELATION_ID_HEADER.to_string()
}

fn default_trace_header() -> String {
    TRACE_ID_HEADER.to_string()
}

fn default_request_header() -> String {
    REQUEST_ID_HEADER.to_string()
}

impl Default for CorrelationConfig {
    fn default() -> Self {
        Self {
            header: default_correlation_header(),
            trace_header: default_trace_header(),
            request_header: default_request_header(),
        }
    }
}

impl CorrelationConfig {
    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - `CORRELATION_HEADER`: correlation id header (default: x-correlation-id)
    /// - `CORRELATION_TRACE_HEADER`: trace id header (default: x-b3-traceid)
    /// - `CORRELATION_REQUEST_HEADER`: request id header (default: x-request-id)
    pub fn from_env() -> Result<Self> {
        Ok(envy::prefixed(ENV_PREFIX).from_env::<Self>()?)
    }

    /// Load configuration from explicit `(name, value)` pairs
    pub fn from_vars<I>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Ok(envy::prefixed(ENV_PREFIX).from_iter::<_, Self>(vars)?)
    }

    /// Validate header names and turn them into slot keys
    pub fn slot_keys(&self) -> Result<SlotKeys> {
        SlotKeys::new(&self.header, &self.trace_header, &self.request_header)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CorrelationError;
    use serial_test::serial;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_default_config() {
        let config = CorrelationConfig::default();
        assert_eq!(config.header, "x-correlation-id");
        assert_eq!(config.slot_keys().unwrap(), SlotKeys::default());
    }

    #[test]
    fn test_from_vars_uses_defaults() {
        let config = CorrelationConfig::from_vars(vars(&[("UNRELATED", "1")])).unwrap();
        assert_eq!(config, CorrelationConfig::default());
    }

    #[test]
    fn test_from_vars_overrides() {
        let config = CorrelationConfig::from_vars(vars(&[
            ("CORRELATION_HEADER", "X-Flow-ID"),
            ("CORRELATION_TRACE_HEADER", "x-cloud-trace-context"),
        ]))
        .unwrap();

        let keys = config.slot_keys().unwrap();
        assert_eq!(keys.correlation(), "x-flow-id");
        assert_eq!(keys.trace(), "x-cloud-trace-context");
        assert_eq!(keys.request(), "x-request-id");
    }

    #[test]
    fn test_invalid_override_rejected_at_validation() {
        let config = CorrelationConfig::from_vars(vars(&[(
            "CORRELATION_REQUEST_HEADER",
            "x-correlation-id",
        )]))
        .unwrap();

        assert!(matches!(
            config.slot_keys(),
            Err(CorrelationError::InvalidKey { .. })
        ));
    }

    #[test]
    #[serial]
    fn test_from_env() {
        std::env::set_var("CORRELATION_REQUEST_HEADER", "x-amzn-requestid");
        let config = CorrelationConfig::from_env();
        std::env::remove_var("CORRELATION_REQUEST_HEADER");

        let config = config.unwrap();
        assert_eq!(config.request_header, "x-amzn-requestid");
        assert_eq!(config.header, "x-correlation-id");
    }
}
