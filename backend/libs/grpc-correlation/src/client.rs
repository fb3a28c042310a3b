//! Client-side Correlation Interceptor
//!
//! Carries the canonical correlation id onto outgoing gRPC calls so the
//! next hop resolves the same id.

use correlation_core::{Extractor, Scope, SlotKeys};
use tonic::metadata::{AsciiMetadataKey, AsciiMetadataValue};
use tonic::service::Interceptor;
use tonic::{Request, Status};

use crate::extensions::CorrelationExt;
use crate::metadata::{metadata_keys, metadata_value};

/// Client-side interceptor that injects a correlation id into all three slots
///
/// Keys and value are parsed once at construction, so `call` cannot fail.
///
/// ## Usage
///
/// ```rust,no_run
/// use grpc_correlation::{CorrelationClientInterceptor, CorrelationExt};
/// use tonic::{Request, Status};
///
/// async fn handler(request: Request<()>) -> Result<(), Status> {
///     // Forward the inbound id to a downstream service
///     let interceptor = CorrelationClientInterceptor::from_request(&request)?;
///     // let client = FeedServiceClient::with_interceptor(channel, interceptor);
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct CorrelationClientInterceptor {
    keys: [AsciiMetadataKey; 3],
    value: AsciiMetadataValue,
}

impl CorrelationClientInterceptor {
    /// Propagate `id` under the default header names
    pub fn new(id: &str) -> Result<Self, Status> {
        Self::with_keys(&SlotKeys::default(), id)
    }

    /// Propagate `id` under custom header names
    ///
    /// ## Errors
    ///
    /// Returns `Status::internal` if a key or the id cannot be encoded as
    /// ASCII metadata.
    pub fn with_keys(keys: &SlotKeys, id: &str) -> Result<Self, Status> {
        let to_status = |e: correlation_core::CorrelationError| Status::internal(e.to_string());
        Ok(Self {
            keys: metadata_keys(keys).map_err(to_status)?,
            value: metadata_value(keys, id).map_err(to_status)?,
        })
    }

    /// Propagate the id resolved into `scope`
    ///
    /// ## Errors
    ///
    /// Returns `Status::failed_precondition` if the scope holds no valid
    /// correlation id. No id is generated here.
    pub fn from_scope(scope: &Scope, keys: &SlotKeys) -> Result<Self, Status> {
        let id = Extractor::new(keys.clone()).from_scope(scope).ok_or_else(|| {
            Status::failed_precondition("Correlation id not resolved for this call")
        })?;
        Self::with_keys(keys, &id)
    }

    /// Propagate the id the server interceptor resolved for `request`
    ///
    /// The id goes out under the same header names the interceptor read it
    /// from, so a next hop sharing that configuration resolves it again.
    pub fn from_request<T>(request: &Request<T>) -> Result<Self, Status> {
        let id = request.correlation_id()?;
        Self::with_keys(request.correlation_keys()?, id)
    }

    pub fn correlation_id(&self) -> &str {
        // Built from a validated string, so it is always visible ASCII
        self.value.to_str().unwrap_or_default()
    }
}

impl Interceptor for CorrelationClientInterceptor {
    fn call(&mut self, mut request: Request<()>) -> Result<Request<()>, Status> {
        for key in &self.keys {
            request
                .metadata_mut()
                .insert(key.clone(), self.value.clone());
        }
        Ok(request)
    }
}
