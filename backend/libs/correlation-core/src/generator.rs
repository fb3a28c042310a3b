//! Fresh identifier generation
//!
//! Used only when no inbound header carries a usable id.

use uuid::Uuid;

/// Source of fresh correlation identifiers
///
/// Implementations must be cheap and safe to call from any thread.
pub trait IdGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Random UUID v4 in canonical hyphenated lowercase form (36 characters)
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn generate(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Always returns the same identifier
#[derive(Debug, Clone)]
pub struct FixedGenerator(String);

impl FixedGenerator {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl IdGenerator for FixedGenerator {
    fn generate(&self) -> String {
        self.0.clone()
    }
}

impl<F> IdGenerator for F
where
    F: Fn() -> String + Send + Sync,
{
    fn generate(&self) -> String {
        self()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uuid_generator_format() {
        let id = UuidGenerator.generate();
        assert_eq!(id.len(), 36);
        assert!(Uuid::parse_str(&id).is_ok());
        assert_eq!(id, id.to_ascii_lowercase());

        let groups: Vec<usize> = id.split('-').map(|g| g.len()).collect();
        assert_eq!(groups, vec![8, 4, 4, 4, 12]);
    }

    #[test]
    fn test_uuid_generator_unique() {
        assert_ne!(UuidGenerator.generate(), UuidGenerator.generate());
    }

    #[test]
    fn test_fixed_generator() {
        let generator = FixedGenerator::new("fixed-id");
        assert_eq!(generator.generate(), "fixed-id");
        assert_eq!(generator.generate(), "fixed-id");
    }

    #[test]
    fn test_closure_generator() {
        let generator = || "from-closure".to_string();
        assert_eq!(IdGenerator::generate(&generator), "from-closure");
    }
}
