//! Server-side Correlation Interceptor
//!
//! Resolves the canonical correlation id for every inbound gRPC call and
//! makes it available to handlers.

use std::sync::Arc;

use correlation_core::{
    CorrelationConfig, CorrelationResolver, IdGenerator, Scope, SlotKeys, UuidGenerator,
};
use tonic::service::Interceptor;
use tonic::{Request, Status};
use tracing::{debug, warn};

use crate::extensions::CorrelationId;
use crate::metadata::{bag_from_metadata, write_slots};

/// Server-side interceptor that resolves and propagates the correlation id
///
/// This interceptor:
/// 1. Snapshots the inbound metadata into a `MetadataBag`
/// 2. Runs `ensure` on a scope around it
/// 3. Rewrites the correlation, trace and request headers to the resolved id
/// 4. Stores the derived `Scope`, a `CorrelationId` and the `SlotKeys` used in
///    request extensions
///
/// Calls are never rejected for missing ids; an id is generated instead.
///
/// ## Usage
///
/// ```rust,no_run
/// use grpc_correlation::CorrelationServerInterceptor;
///
/// let interceptor: CorrelationServerInterceptor = CorrelationServerInterceptor::default();
/// // let service = MyServiceServer::with_interceptor(MyService, interceptor);
/// ```
pub struct CorrelationServerInterceptor<G = UuidGenerator> {
    resolver: Arc<CorrelationResolver<G>>,
}

impl CorrelationServerInterceptor<UuidGenerator> {
    pub fn new(keys: SlotKeys) -> Self {
        Self::with_resolver(CorrelationResolver::new(keys))
    }

    /// Build from validated configuration
    pub fn from_config(config: &CorrelationConfig) -> correlation_core::Result<Self> {
        Ok(Self::new(config.slot_keys()?))
    }
}

impl Default for CorrelationServerInterceptor<UuidGenerator> {
    fn default() -> Self {
        Self::new(SlotKeys::default())
    }
}

impl<G> Clone for CorrelationServerInterceptor<G> {
    fn clone(&self) -> Self {
        Self {
            resolver: Arc::clone(&self.resolver),
        }
    }
}

impl<G: IdGenerator> CorrelationServerInterceptor<G> {
    pub fn with_resolver(resolver: CorrelationResolver<G>) -> Self {
        Self {
            resolver: Arc::new(resolver),
        }
    }

    /// Resolve the id for `request` in place
    ///
    /// The request is owned by this call, so its metadata is rewritten
    /// directly. The bag handed to the resolver is a snapshot and is left
    /// as it was.
    pub fn resolve_request<T>(&self, request: &mut Request<T>) -> Result<CorrelationId, Status> {
        let inbound = bag_from_metadata(request.metadata());
        let resolution = self.resolver.resolve(&inbound);

        write_slots(request.metadata_mut(), self.resolver.keys(), &resolution.id).map_err(
            |e| {
                warn!(error = %e, "Failed to write correlation headers");
                Status::internal(format!("Failed to propagate correlation id: {}", e))
            },
        )?;

        debug!(
            correlation_id = %resolution.id,
            source = ?resolution.source,
            "Correlation id resolved for inbound call"
        );

        let id = CorrelationId::new(resolution.id);
        let extensions = request.extensions_mut();
        extensions.insert(Scope::new(resolution.bag));
        extensions.insert(id.clone());
        extensions.insert(self.resolver.keys().clone());

        Ok(id)
    }
}

impl<G: IdGenerator> Interceptor for CorrelationServerInterceptor<G> {
    fn call(&mut self, mut request: Request<()>) -> Result<Request<()>, Status> {
        self.resolve_request(&mut request)?;
        Ok(request)
    }
}
