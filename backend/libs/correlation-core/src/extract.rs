//! Read path for an already resolved correlation id

use crate::keys::SlotKeys;
use crate::metadata::MetadataBag;
use crate::resolver::valid_value;
use crate::scope::Scope;

/// Reads the canonical id out of a scope
///
/// Extraction never generates an id. If `ensure` has not run on the scope
/// (or the correlation slot is empty) the result is `None`.
#[derive(Debug, Clone, Default)]
pub struct Extractor {
    keys: SlotKeys,
}

impl Extractor {
    pub fn new(keys: SlotKeys) -> Self {
        Self { keys }
    }

    pub fn from_scope(&self, scope: &Scope) -> Option<String> {
        scope
            .current_bag()
            .and_then(|bag| self.from_bag(bag))
            .map(str::to_string)
    }

    pub fn from_bag<'a>(&self, bag: &'a MetadataBag) -> Option<&'a str> {
        valid_value(bag, self.keys.correlation())
    }
}
