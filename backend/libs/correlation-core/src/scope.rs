//! Per-call scope carrying the metadata bag
//!
//! A `Scope` is threaded explicitly through the handling of one call.
//! Binding a new bag produces a new scope; holders of the old scope keep
//! seeing the old bag.

use std::sync::Arc;

use crate::metadata::MetadataBag;

/// Handle binding a [`MetadataBag`] to the lifetime of one call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scope {
    bag: Option<MetadataBag>,
    /// Fully-qualified rpc method or HTTP path, when the transport knows it
    method: Option<Arc<str>>,
}

impl Scope {
    /// Scope around an inbound bag
    pub fn new(bag: MetadataBag) -> Self {
        Self {
            bag: Some(bag),
            method: None,
        }
    }

    /// Scope for a call that arrived without any metadata
    pub fn empty() -> Self {
        Self::default()
    }

    /// Attach the method or path this call targets
    pub fn with_method(mut self, method: impl Into<Arc<str>>) -> Self {
        self.method = Some(method.into());
        self
    }

    pub fn current_bag(&self) -> Option<&MetadataBag> {
        self.bag.as_ref()
    }

    pub fn method(&self) -> Option<&str> {
        self.method.as_deref()
    }

    /// Derive a new scope holding `bag`
    ///
    /// Ambient state is carried over; `self` is not modified.
    pub fn bind(&self, bag: MetadataBag) -> Scope {
        Scope {
            bag: Some(bag),
            method: self.method.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_scope_has_no_bag() {
        assert!(Scope::empty().current_bag().is_none());
    }

    #[test]
    fn test_bind_leaves_original_untouched() {
        let original_bag = MetadataBag::from_pairs([("k", "old")]);
        let original = Scope::new(original_bag.clone()).with_method("/pkg.Service/Call");

        let derived = original.bind(MetadataBag::from_pairs([("k", "new")]));

        assert_eq!(original.current_bag(), Some(&original_bag));
        assert_eq!(derived.current_bag().and_then(|b| b.first("k")), Some("new"));
        assert_eq!(derived.method(), Some("/pkg.Service/Call"));
    }

    #[test]
    fn test_bind_on_empty_scope() {
        let derived = Scope::empty().bind(MetadataBag::from_pairs([("k", "v")]));
        assert!(derived.current_bag().is_some());
        assert!(derived.method().is_none());
    }
}
