//! Identifier generation for items created during conversion.
//!
//! Converters that mint new items take an [`IdSource`] so tests can use
//! predictable identifiers while the CLI uses random UUIDs.

use uuid::Uuid;

/// Supplies fresh item identifiers.
pub trait IdSource {
    fn next_id(&mut self) -> String;
}

/// Random (version 4) UUIDs, lowercase hyphenated.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIds;

impl IdSource for RandomIds {
    fn next_id(&mut self) -> String {
        new_v4()
    }
}

/// Deterministic `<prefix><n>` identifiers, counting from zero.
#[derive(Debug, Clone)]
pub struct SequentialIds {
    prefix: String,
    next: usize,
}

impl SequentialIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 0,
        }
    }
}

impl IdSource for SequentialIds {
    fn next_id(&mut self) -> String {
        let id = format!("{}{}", self.prefix, self.next);
        self.next += 1;
        id
    }
}

/// A new random UUID as a string.
#[inline]
pub fn new_v4() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_ids_are_unique_uuids() {
        let mut ids = RandomIds;
        let a = ids.next_id();
        let b = ids.next_id();
        assert_ne!(a, b);
        assert_eq!(Uuid::parse_str(&a).unwrap().get_version_num(), 4);
    }

    #[test]
    fn test_sequential_ids() {
        let mut ids = SequentialIds::new("id-");
        assert_eq!(ids.next_id(), "id-0");
        assert_eq!(ids.next_id(), "id-1");
    }
}
