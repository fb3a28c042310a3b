//! Request Extension Access for the Canonical Correlation ID
//!
//! The server interceptor and the HTTP layer store the resolved
//! [`CorrelationId`], the derived [`Scope`] and the [`SlotKeys`] they resolved
//! with in request extensions. Handlers read them back through
//! [`CorrelationExt`].

use std::fmt;

use correlation_core::{Scope, SlotKeys};
use tonic::{Request, Status};

/// Canonical correlation id resolved for the current call
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CorrelationId(String);

impl CorrelationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    /// Look up the id stored in HTTP request extensions
    pub fn from_extensions(extensions: &http::Extensions) -> Option<&CorrelationId> {
        extensions.get::<CorrelationId>()
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CorrelationId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Extension trait for reading the resolved correlation id in gRPC handlers
///
/// ## Errors
///
/// All methods return `Status::internal` when the
/// `CorrelationServerInterceptor` was not attached to the service: a handler
/// reaching this point without a resolved id is a wiring bug, not a client error.
///
/// ## Example
///
/// ```rust
/// use grpc_correlation::CorrelationExt;
/// use tonic::{Request, Status};
///
/// fn handler<T>(request: Request<T>) -> Result<(), Status> {
///     let id = request.correlation_id()?;
///     tracing::info!(correlation_id = %id, "handling request");
///     Ok(())
/// }
/// ```
pub trait CorrelationExt {
    fn correlation_id(&self) -> Result<&str, Status>;

    fn correlation_scope(&self) -> Result<&Scope, Status>;

    /// Header names the id was resolved under, for outbound propagation
    fn correlation_keys(&self) -> Result<&SlotKeys, Status>;
}

impl<T> CorrelationExt for Request<T> {
    fn correlation_id(&self) -> Result<&str, Status> {
        self.extensions()
            .get::<CorrelationId>()
            .map(CorrelationId::as_str)
            .ok_or_else(|| {
                Status::internal(
                    "No correlation id found. Ensure CorrelationServerInterceptor is attached.",
                )
            })
    }

    fn correlation_scope(&self) -> Result<&Scope, Status> {
        self.extensions().get::<Scope>().ok_or_else(|| {
            Status::internal(
                "No correlation scope found. Ensure CorrelationServerInterceptor is attached.",
            )
        })
    }

    fn correlation_keys(&self) -> Result<&SlotKeys, Status> {
        self.extensions().get::<SlotKeys>().ok_or_else(|| {
            Status::internal(
                "No correlation keys found. Ensure CorrelationServerInterceptor is attached.",
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use correlation_core::MetadataBag;

    #[test]
    fn test_correlation_id_missing() {
        let request = Request::new(());
        let status = request.correlation_id().unwrap_err();

        assert_eq!(status.code(), tonic::Code::Internal);
        assert!(status.message().contains("No correlation id found"));
    }

    #[test]
    fn test_correlation_id_present() {
        let mut request = Request::new(());
        request
            .extensions_mut()
            .insert(CorrelationId::new("abc-123"));

        assert_eq!(request.correlation_id().unwrap(), "abc-123");
    }

    #[test]
    fn test_correlation_scope_present() {
        let scope = Scope::new(MetadataBag::from_pairs([("x-correlation-id", "abc")]));
        let mut request = Request::new(());
        request.extensions_mut().insert(scope.clone());

        assert_eq!(request.correlation_scope().unwrap(), &scope);
    }

    #[test]
    fn test_correlation_scope_missing() {
        let request = Request::new(());
        assert_eq!(
            request.correlation_scope().unwrap_err().code(),
            tonic::Code::Internal
        );
    }

    #[test]
    fn test_correlation_keys() {
        let mut request = Request::new(());
        assert_eq!(
            request.correlation_keys().unwrap_err().code(),
            tonic::Code::Internal
        );

        let keys = SlotKeys::new("x-flow-id", "x-trace", "x-req").unwrap();
        request.extensions_mut().insert(keys.clone());
        assert_eq!(request.correlation_keys().unwrap(), &keys);
    }

    #[test]
    fn test_from_http_extensions() {
        let mut extensions = http::Extensions::new();
        assert!(CorrelationId::from_extensions(&extensions).is_none());

        extensions.insert(CorrelationId::new("abc"));
        assert_eq!(
            CorrelationId::from_extensions(&extensions).map(|id| id.to_string()),
            Some("abc".to_string())
        );
    }
}
