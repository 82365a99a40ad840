//! In-memory filter database for system-call policy.
//!
//! Callers build an evolving policy by submitting rules of the form "if
//! syscall `N` is invoked and every argument predicate holds, take action
//! `A`". The database canonicalizes the accumulated rules into one compact
//! decision tree per syscall, from which a code generator can emit a flat
//! classifier program.
//!
//! ```
//! use filtron::{Action, Comparison, FilterDb, Predicate};
//!
//! let mut db = FilterDb::new(Action::Deny);
//!
//! // allow read(2) regardless of arguments
//! db.add(Action::Allow, 0, &[])?;
//!
//! // allow write(2) only on stdout and stderr
//! db.add(Action::Allow, 1, &[Predicate::new(0, Comparison::Equal, 1)])?;
//! db.add(Action::Allow, 1, &[Predicate::new(0, Comparison::Equal, 2)])?;
//!
//! assert!(db.find(1).is_some());
//! # Ok::<(), filtron::FiltronError>(())
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

mod chain;
mod database;
mod error;
mod merge;
mod operators;
mod tree;

pub use database::{FilterDb, SyscallEntry};
pub use error::FiltronError;
pub use operators::{Comparison, StoredComparison};
pub use tree::{Node, PreOrder};

/// Number of syscall arguments a rule may test (a0..a5 on the supported
/// platforms).
pub const MAX_ARGS: usize = 6;

/// Verdict a filter applies when a rule matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Allow,
    Deny,
    Kill,
    Trap,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Allow => write!(f, "allow"),
            Action::Deny => write!(f, "deny"),
            Action::Kill => write!(f, "kill"),
            Action::Trap => write!(f, "trap"),
        }
    }
}

/// A single test on one syscall argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Predicate {
    /// Argument index (a0 = 0, a1 = 1, ...).
    pub arg: u32,
    pub op: Comparison,
    /// Value the argument is compared against.
    pub datum: u64,
}

impl Predicate {
    pub fn new(arg: u32, op: Comparison, datum: u64) -> Self {
        Self { arg, op, datum }
    }
}

/// A filter rule as submitted by the caller: an action, a syscall number and
/// a conjunction of argument predicates.
///
/// The type derives [serde] traits so rule files can be loaded in bulk and
/// fed to [`FilterDb::add_rule`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub action: Action,
    pub syscall: i64,
    #[serde(default)]
    pub predicates: Vec<Predicate>,
}
