//! Tracing span carrying the correlation id

use tracing::{info_span, Span};

/// Span under which every log line of one call carries its correlation id
pub fn correlation_span(correlation_id: &str, method: Option<&str>) -> Span {
    info_span!(
        "correlated_call",
        correlation_id = %correlation_id,
        method = method.unwrap_or("unknown"),
    )
}
