//! Header keys for the three identifier slots
//!
//! Keys must be lowercase to match how gRPC metadata and HTTP/2 headers
//! arrive on the wire.

use std::fmt;

use crate::error::{CorrelationError, Result};
use crate::metadata::normalize_key;

/// Service-specific correlation id header
pub const CORRELATION_ID_HEADER: &str = "x-correlation-id";

/// Distributed tracing trace id header (B3 propagation)
pub const TRACE_ID_HEADER: &str = "x-b3-traceid";

/// Generic request id header set by proxies
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// One of the three identifier slots in a bag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Correlation,
    Trace,
    Request,
}

impl Slot {
    /// Slots consulted when no correlation id is present, highest first
    pub const FALLBACK_ORDER: [Slot; 2] = [Slot::Trace, Slot::Request];

    /// Every slot, in precedence order
    pub const ALL: [Slot; 3] = [Slot::Correlation, Slot::Trace, Slot::Request];
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Correlation => f.write_str("correlation"),
            Slot::Trace => f.write_str("trace"),
            Slot::Request => f.write_str("request"),
        }
    }
}

/// Header names used for each slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotKeys {
    correlation: String,
    trace: String,
    request: String,
}

impl Default for SlotKeys {
    fn default() -> Self {
        Self {
            correlation: CORRELATION_ID_HEADER.to_string(),
            trace: TRACE_ID_HEADER.to_string(),
            request: REQUEST_ID_HEADER.to_string(),
        }
    }
}

impl SlotKeys {
    /// Build slot keys from custom header names
    ///
    /// Names are lowercased. Each must be non-empty, contain only header
    /// token characters, and differ from the other two.
    pub fn new(correlation: &str, trace: &str, request: &str) -> Result<Self> {
        let keys = Self {
            correlation: normalize_key(correlation),
            trace: normalize_key(trace),
            request: normalize_key(request),
        };

        for slot in Slot::ALL {
            validate_header_name(keys.key(slot))?;
        }

        if keys.correlation == keys.trace || keys.correlation == keys.request {
            return Err(CorrelationError::invalid_key(
                keys.correlation,
                "correlation key must differ from trace and request keys",
            ));
        }
        if keys.trace == keys.request {
            return Err(CorrelationError::invalid_key(
                keys.trace,
                "trace and request keys must differ",
            ));
        }

        Ok(keys)
    }

    /// Header name for `slot`
    pub fn key(&self, slot: Slot) -> &str {
        match slot {
            Slot::Correlation => &self.correlation,
            Slot::Trace => &self.trace,
            Slot::Request => &self.request,
        }
    }

    pub fn correlation(&self) -> &str {
        &self.correlation
    }

    pub fn trace(&self) -> &str {
        &self.trace
    }

    pub fn request(&self) -> &str {
        &self.request
    }
}

// RFC 7230 tchar, lowercase only since keys are normalized first.
fn validate_header_name(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(CorrelationError::invalid_key(key, "key must not be empty"));
    }

    let valid = key.bytes().all(|b| {
        b.is_ascii_lowercase()
            || b.is_ascii_digit()
            || matches!(
                b,
                b'!' | b'#' | b'$' | b'%' | b'&' | b'\'' | b'*' | b'+' | b'-' | b'.' | b'^' | b'_'
                    | b'`' | b'|' | b'~'
            )
    });
    if !valid {
        return Err(CorrelationError::invalid_key(
            key,
            "key contains characters not allowed in a header name",
        ));
    }

    if key.ends_with("-bin") {
        return Err(CorrelationError::invalid_key(
            key,
            "binary metadata keys cannot carry identifiers",
        ));
    }

    Ok(())
}
