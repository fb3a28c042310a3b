//! Canonical Correlation ID Resolution
//!
//! Every inbound call in the mesh should carry exactly one correlation id so
//! log lines and spans from different services can be joined. Callers may
//! send an explicit correlation id, a B3 trace id, a proxy request id, any
//! combination of them, or nothing at all. This crate picks one and writes
//! it into all three headers.
//!
//! ## Core Components
//!
//! - **MetadataBag**: immutable per-call header mapping; changes return a new bag
//! - **Scope**: explicit per-call carrier binding a bag to the call
//! - **CorrelationResolver**: `ensure` picks the id and propagates it
//! - **Extractor**: reads the resolved id back out of a scope
//!
//! ## Precedence
//!
//! `correlation` > `trace` > `request` > freshly generated UUID v4.
//!
//! ## Example
//!
//! ```rust
//! use correlation_core::{CorrelationResolver, Extractor, MetadataBag, Scope};
//!
//! let inbound = MetadataBag::from_pairs([("x-b3-traceid", "463ac35c9f6413ad")]);
//! let scope = Scope::new(inbound);
//!
//! let resolver: CorrelationResolver = CorrelationResolver::default();
//! let scope = resolver.ensure(&scope);
//!
//! let id = Extractor::default().from_scope(&scope);
//! assert_eq!(id.as_deref(), Some("463ac35c9f6413ad"));
//! ```

mod config;
mod error;
mod extract;
mod generator;
mod keys;
mod metadata;
mod resolver;
mod scope;

pub use config::CorrelationConfig;
pub use error::{CorrelationError, Result};
pub use extract::Extractor;
pub use generator::{FixedGenerator, IdGenerator, UuidGenerator};
pub use keys::{Slot, SlotKeys, CORRELATION_ID_HEADER, REQUEST_ID_HEADER, TRACE_ID_HEADER};
pub use metadata::{normalize_key, MetadataBag};
pub use resolver::{CorrelationResolver, IdSource, Resolution};
pub use scope::Scope;
