//! Canonical correlation id resolution
//!
//! Picks one identifier out of the correlation, trace and request slots and
//! writes it back into all three, so every downstream reader sees the same
//! value whichever header it looks at.
//!
//! ## Precedence
//!
//! | correlation | trace     | request   | resolved          |
//! |-------------|-----------|-----------|-------------------|
//! | invalid     | invalid   | invalid   | freshly generated |
//! | invalid     | valid "T" | any       | "T"               |
//! | invalid     | invalid   | valid "R" | "R"               |
//! | invalid     | valid "T" | valid "R" | "T"               |
//! | valid "C"   | any       | any       | "C"               |
//!
//! A slot is invalid when its key is absent, its value list is empty, or its
//! first value is the empty string. Only the first value of a slot is
//! consulted, and every slot leaves resolution holding exactly one value.

use tracing::debug;

use crate::generator::{IdGenerator, UuidGenerator};
use crate::keys::{Slot, SlotKeys};
use crate::metadata::MetadataBag;
use crate::scope::Scope;

/// Where the canonical id came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdSource {
    Correlation,
    Trace,
    Request,
    Generated,
}

impl From<Slot> for IdSource {
    fn from(slot: Slot) -> Self {
        match slot {
            Slot::Correlation => IdSource::Correlation,
            Slot::Trace => IdSource::Trace,
            Slot::Request => IdSource::Request,
        }
    }
}

/// Outcome of resolving one bag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub id: String,
    pub source: IdSource,
    /// New bag with all three slots set to `id`
    pub bag: MetadataBag,
}

/// Resolves and propagates the canonical correlation id
#[derive(Debug, Clone)]
pub struct CorrelationResolver<G = UuidGenerator> {
    keys: SlotKeys,
    generator: G,
}

impl CorrelationResolver<UuidGenerator> {
    pub fn new(keys: SlotKeys) -> Self {
        Self {
            keys,
            generator: UuidGenerator,
        }
    }
}

impl Default for CorrelationResolver<UuidGenerator> {
    fn default() -> Self {
        Self::new(SlotKeys::default())
    }
}

impl<G: IdGenerator> CorrelationResolver<G> {
    /// Resolver with a custom id source, e.g. a deterministic one in tests
    pub fn with_generator(keys: SlotKeys, generator: G) -> Self {
        Self { keys, generator }
    }

    pub fn keys(&self) -> &SlotKeys {
        &self.keys
    }

    /// Whether `slot` holds a usable value in `bag`
    pub fn is_valid(&self, bag: &MetadataBag, slot: Slot) -> bool {
        valid_value(bag, self.keys.key(slot)).is_some()
    }

    /// Pick the canonical id for `bag` and build the propagated bag
    ///
    /// `bag` itself is never modified.
    pub fn resolve(&self, bag: &MetadataBag) -> Resolution {
        let correlation_key = self.keys.correlation();

        let (id, source) = match valid_value(bag, correlation_key) {
            Some(id) => (id.to_string(), IdSource::Correlation),
            None => self.fallback(bag),
        };

        // Collapses extra correlation values too, so the bag matches what
        // adapters put on the wire.
        let mut resolved = bag.set_single(correlation_key, id.as_str());
        for slot in Slot::FALLBACK_ORDER {
            resolved = resolved.set_single(self.keys.key(slot), id.as_str());
        }

        debug!(
            source = ?source,
            correlation_id = %id,
            "Resolved correlation id"
        );

        Resolution {
            id,
            source,
            bag: resolved,
        }
    }

    /// Resolve the bag in `scope` and bind the result into a derived scope
    ///
    /// A scope with no bag is treated as an empty bag.
    pub fn ensure(&self, scope: &Scope) -> Scope {
        let resolution = match scope.current_bag() {
            Some(bag) => self.resolve(bag),
            None => self.resolve(&MetadataBag::new()),
        };
        scope.bind(resolution.bag)
    }

    /// [`ensure`](Self::ensure) on a bare bag
    pub fn ensure_bag(&self, bag: &MetadataBag) -> MetadataBag {
        self.resolve(bag).bag
    }

    fn fallback(&self, bag: &MetadataBag) -> (String, IdSource) {
        Slot::FALLBACK_ORDER
            .iter()
            .find_map(|&slot| {
                valid_value(bag, self.keys.key(slot))
                    .map(|id| (id.to_string(), IdSource::from(slot)))
            })
            .unwrap_or_else(|| (self.generator.generate(), IdSource::Generated))
    }
}

/// First value under `key` if it is present and non-empty
pub(crate) fn valid_value<'a>(bag: &'a MetadataBag, key: &str) -> Option<&'a str> {
    bag.first(key).filter(|value| !value.is_empty())
}
