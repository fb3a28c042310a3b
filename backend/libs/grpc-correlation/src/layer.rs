//! Tower layer resolving the correlation id for HTTP requests
//!
//! Used in front of the REST gateway so calls arriving over HTTP/JSON get the
//! same canonical id as native gRPC calls before being forwarded.

use std::sync::Arc;
use std::task::{Context, Poll};

use correlation_core::{
    CorrelationConfig, CorrelationResolver, IdGenerator, Scope, SlotKeys, UuidGenerator,
};
use tower::{Layer, Service};
use tracing::instrument::Instrumented;
use tracing::{debug, warn, Instrument};

use crate::extensions::CorrelationId;
use crate::metadata::{bag_from_headers, write_header_slots};
use crate::span::correlation_span;

/// Tower layer for correlation id resolution on HTTP requests
pub struct CorrelationLayer<G = UuidGenerator> {
    resolver: Arc<CorrelationResolver<G>>,
}

impl CorrelationLayer<UuidGenerator> {
    pub fn new(keys: SlotKeys) -> Self {
        Self::with_resolver(CorrelationResolver::new(keys))
    }

    pub fn from_config(config: &CorrelationConfig) -> correlation_core::Result<Self> {
        Ok(Self::new(config.slot_keys()?))
    }
}

impl Default for CorrelationLayer<UuidGenerator> {
    fn default() -> Self {
        Self::new(SlotKeys::default())
    }
}

impl<G: IdGenerator> CorrelationLayer<G> {
    pub fn with_resolver(resolver: CorrelationResolver<G>) -> Self {
        Self {
            resolver: Arc::new(resolver),
        }
    }
}

impl<G> Clone for CorrelationLayer<G> {
    fn clone(&self) -> Self {
        Self {
            resolver: Arc::clone(&self.resolver),
        }
    }
}

impl<S, G> Layer<S> for CorrelationLayer<G> {
    type Service = CorrelationService<S, G>;

    fn layer(&self, inner: S) -> Self::Service {
        CorrelationService {
            inner,
            resolver: Arc::clone(&self.resolver),
        }
    }
}

/// Tower service produced by [`CorrelationLayer`]
pub struct CorrelationService<S, G = UuidGenerator> {
    inner: S,
    resolver: Arc<CorrelationResolver<G>>,
}

impl<S: Clone, G> Clone for CorrelationService<S, G> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            resolver: Arc::clone(&self.resolver),
        }
    }
}

impl<S, B, G> Service<http::Request<B>> for CorrelationService<S, G>
where
    S: Service<http::Request<B>>,
    G: IdGenerator,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Instrumented<S::Future>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    /// Resolves and forwards the request
    ///
    /// If the resolved id cannot be written as a header value the request is
    /// forwarded untouched: no headers are rewritten and no `CorrelationId`,
    /// `Scope` or `SlotKeys` are stored. Inbound values round-trip from
    /// `to_str`, so only a custom generator can hit this.
    fn call(&mut self, mut req: http::Request<B>) -> Self::Future {
        let resolution = self.resolver.resolve(&bag_from_headers(req.headers()));
        let span = correlation_span(&resolution.id, Some(req.uri().path()));

        let keys = self.resolver.keys();
        if let Err(e) = write_header_slots(req.headers_mut(), keys, &resolution.id) {
            warn!(parent: &span, error = %e, "Failed to write correlation headers");
            return self.inner.call(req).instrument(span);
        }

        debug!(
            parent: &span,
            source = ?resolution.source,
            "Correlation id resolved for HTTP request"
        );

        let scope = Scope::new(resolution.bag).with_method(req.uri().path());
        let extensions = req.extensions_mut();
        extensions.insert(scope);
        extensions.insert(CorrelationId::new(resolution.id));
        extensions.insert(keys.clone());

        self.inner.call(req).instrument(span)
    }
}
