//! [`Id`] — the `(concept, instance)` pair that names every variable,
//! constraint, object and rhs-term in the kernel.
//!
//! Modeled as a pair of interned `Arc<str>` rather than two owned
//! `String`s: an `Id` is cloned into every variable/constraint-table entry
//! the assembly layer builds, and `Arc::clone` keeps that free of
//! allocation on the hot assembly path (the same flyweight-key tradeoff
//! `pywr`/`MUSE_2.0`-style commodity ids make with `Rc<str>`).

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// A non-empty `(concept, instance)` pair.
///
/// Equality and hashing are structural over both components; `Id`s are
/// never compared by substring (the one explicit exception is a naming
/// trick in `getstatevariables`-equivalent code, which matches on the
/// `instance` suffix deliberately and is documented where it occurs).
#[derive(Clone, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Id {
    concept: Arc<str>,
    instance: Arc<str>,
}

impl Id {
    /// Build an `Id`, panicking if either component is empty.
    ///
    /// Constructors throughout the kernel are expected to validate their
    /// own inputs (spec §7 "construction error"); `Id` itself asserts
    /// because a blank concept or instance can only come from a
    /// programming error in the assembly layer, not from user data.
    pub fn new(concept: impl Into<Arc<str>>, instance: impl Into<Arc<str>>) -> Self {
        let concept = concept.into();
        let instance = instance.into();
        assert!(!concept.is_empty(), "Id concept must not be empty");
        assert!(!instance.is_empty(), "Id instance must not be empty");
        Self { concept, instance }
    }

    pub fn concept(&self) -> &str {
        &self.concept
    }

    pub fn instance(&self) -> &str {
        &self.instance
    }
}

impl fmt::Debug for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.concept, self.instance)
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.concept, self.instance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structural_equality() {
        let a = Id::new("Flow", "Plant1");
        let b = Id::new("Flow", "Plant1");
        let c = Id::new("Flow", "Plant2");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_display() {
        let id = Id::new("Balance", "Hydro_NO1");
        assert_eq!(id.to_string(), "Balance(Hydro_NO1)");
    }

    #[test]
    #[should_panic(expected = "concept must not be empty")]
    fn test_empty_concept_panics() {
        Id::new("", "x");
    }

    #[test]
    fn test_cheap_clone_shares_storage() {
        let a = Id::new("Storage", "Reservoir1");
        let b = a.clone();
        assert!(Arc::ptr_eq(
            &a.concept,
            &b.concept
        ));
    }

    #[test]
    fn test_json_round_trip() {
        let id = Id::new("Flow", "Plant1");
        let json = serde_json::to_string(&id).unwrap();
        let back: Id = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }
}
