use std::fmt;

use serde::{Deserialize, Serialize};

/// Comparison operators accepted in submitted rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
}

impl Comparison {
    /// Rewrite into the stored basis.
    ///
    /// Negated relations fold into the branch selection: the returned flag
    /// tells whether the rule proceeds on the true branch of the stored
    /// comparison or on the false one.
    pub fn normalize(self) -> (StoredComparison, bool) {
        match self {
            Comparison::Equal => (StoredComparison::Equal, true),
            Comparison::NotEqual => (StoredComparison::Equal, false),
            Comparison::Less => (StoredComparison::GreaterEqual, false),
            Comparison::LessEqual => (StoredComparison::Greater, false),
            Comparison::Greater => (StoredComparison::Greater, true),
            Comparison::GreaterEqual => (StoredComparison::GreaterEqual, true),
        }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Comparison::Equal => write!(f, "=="),
            Comparison::NotEqual => write!(f, "!="),
            Comparison::Less => write!(f, "<"),
            Comparison::LessEqual => write!(f, "<="),
            Comparison::Greater => write!(f, ">"),
            Comparison::GreaterEqual => write!(f, ">="),
        }
    }
}

/// Comparison operators a stored decision node can carry.
///
/// Every predicate in the database is rewritten into this basis, so a code
/// generator walking the trees only ever sees two jump shapes plus equality.
/// The declaration order is the sort order used within sibling levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StoredComparison {
    Equal,
    GreaterEqual,
    Greater,
}

impl fmt::Display for StoredComparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoredComparison::Equal => write!(f, "=="),
            StoredComparison::GreaterEqual => write!(f, ">="),
            StoredComparison::Greater => write!(f, ">"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewrite_table() {
        assert_eq!(
            Comparison::Equal.normalize(),
            (StoredComparison::Equal, true)
        );
        assert_eq!(
            Comparison::NotEqual.normalize(),
            (StoredComparison::Equal, false)
        );
        assert_eq!(
            Comparison::Less.normalize(),
            (StoredComparison::GreaterEqual, false)
        );
        assert_eq!(
            Comparison::LessEqual.normalize(),
            (StoredComparison::Greater, false)
        );
        assert_eq!(
            Comparison::Greater.normalize(),
            (StoredComparison::Greater, true)
        );
        assert_eq!(
            Comparison::GreaterEqual.normalize(),
            (StoredComparison::GreaterEqual, true)
        );
    }

    #[test]
    fn stored_sort_order() {
        assert!(StoredComparison::Equal < StoredComparison::GreaterEqual);
        assert!(StoredComparison::GreaterEqual < StoredComparison::Greater);
    }
}
