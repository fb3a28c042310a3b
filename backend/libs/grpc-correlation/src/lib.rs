//! Correlation ID Propagation for gRPC Microservices
//!
//! Wires `correlation-core` resolution into the transport layer so every
//! inbound call gets exactly one canonical correlation id and every outbound
//! call carries it to the next hop.
//!
//! ## Core Components
//!
//! - **CorrelationServerInterceptor**: resolves the id on inbound gRPC calls
//! - **CorrelationClientInterceptor**: injects the id into outbound gRPC calls
//! - **CorrelationLayer**: tower layer doing the same for HTTP (REST gateway)
//! - **CorrelationExt**: request extension trait for handlers
//!
//! ## Usage Example
//!
//! ### Server Side
//!
//! ```rust,no_run
//! use grpc_correlation::{CorrelationExt, CorrelationServerInterceptor};
//! use tonic::{Request, Response, Status};
//!
//! let interceptor: CorrelationServerInterceptor = CorrelationServerInterceptor::default();
//! // let service = ContentServiceServer::with_interceptor(ContentService, interceptor);
//!
//! async fn get_post(request: Request<()>) -> Result<Response<()>, Status> {
//!     let correlation_id = request.correlation_id()?;
//!     tracing::info!(correlation_id = %correlation_id, "Fetching post");
//!     Ok(Response::new(()))
//! }
//! ```
//!
//! ### Client Side
//!
//! ```rust,no_run
//! use grpc_correlation::CorrelationClientInterceptor;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let interceptor = CorrelationClientInterceptor::new("3f1c8f0e-7a2b-4f8e-9c1d-2b6a5e4d3c21")?;
//!
//! let channel = tonic::transport::Channel::from_static("http://[::1]:50051")
//!     .connect()
//!     .await?;
//! // let mut client = FeedServiceClient::with_interceptor(channel, interceptor);
//! # Ok(())
//! # }
//! ```

mod client;
mod extensions;
mod layer;
mod metadata;
mod server;
mod span;

pub use client::CorrelationClientInterceptor;
pub use extensions::{CorrelationExt, CorrelationId};
pub use layer::{CorrelationLayer, CorrelationService};
pub use metadata::{
    bag_from_headers, bag_from_metadata, metadata_keys, metadata_value, write_header_slots,
    write_slots,
};
pub use server::CorrelationServerInterceptor;
pub use span::correlation_span;

// Re-export the core types handlers work with
pub use correlation_core::{
    CorrelationConfig, CorrelationError, CorrelationResolver, Extractor, MetadataBag, Scope,
    SlotKeys,
};
