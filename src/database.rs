use crate::{
    chain, merge,
    tree::{Node, PreOrder},
    Action, FiltronError, Predicate, Rule,
};

/// One syscall's slot in the database: the syscall number and the root level
/// of its decision tree.
///
/// An entry with an empty tree matches the syscall unconditionally with
/// [`SyscallEntry::action`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyscallEntry {
    num: i64,
    action: Action,
    tree: Vec<Node>,
}

impl SyscallEntry {
    pub fn syscall(&self) -> i64 {
        self.num
    }

    /// Action fired unconditionally when the entry has no decision tree:
    /// the last action whose merge left the entry treeless.
    pub fn action(&self) -> Action {
        self.action
    }

    pub fn is_unconditional(&self) -> bool {
        self.tree.is_empty()
    }

    /// Root level of the decision tree: sibling alternatives ordered by
    /// (argument, operator).
    pub fn tree(&self) -> &[Node] {
        &self.tree
    }

    /// Pre-order traversal over the decision tree.
    pub fn nodes(&self) -> PreOrder<'_> {
        PreOrder::new(&self.tree)
    }
}

/// In-memory filter database for system-call policy.
///
/// Holds the default action and one [`SyscallEntry`] per filtered syscall,
/// kept strictly ascending by syscall number. Mutation happens only through
/// [`FilterDb::add`]; lookups never mutate. Callers serialise access
/// externally: `add` needs exclusive access, `find` and iteration shared
/// access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterDb {
    default_action: Action,
    syscalls: Vec<SyscallEntry>,
}

impl FilterDb {
    /// Create an empty database with the given default action.
    pub fn new(default_action: Action) -> Self {
        Self {
            default_action,
            syscalls: Vec::new(),
        }
    }

    /// Action taken when no syscall entry matches.
    pub fn default_action(&self) -> Action {
        self.default_action
    }

    /// Add a filter rule.
    ///
    /// The rule is normalised and merged into the entry for its syscall.
    /// When two rules cover overlapping argument space the most inclusive
    /// (shortest) one is kept. A failed add leaves the database exactly as
    /// it was: the rule's chain is fully built, and all storage reserved,
    /// before the stored policy is touched.
    pub fn add(
        &mut self,
        action: Action,
        syscall: i64,
        predicates: &[Predicate],
    ) -> Result<(), FiltronError> {
        let chain = chain::build(action, predicates)?;

        let at = match self.syscalls.binary_search_by_key(&syscall, |e| e.num) {
            Ok(at) => at,
            Err(at) => {
                // new syscall: insert its entry in number order
                let mut tree = Vec::new();
                if let Some(node) = chain {
                    tree.try_reserve(1)?;
                    tree.push(node);
                }
                self.syscalls.try_reserve(1)?;
                self.syscalls.insert(
                    at,
                    SyscallEntry {
                        num: syscall,
                        action,
                        tree,
                    },
                );
                log::debug!("syscall {syscall}: new filter entry");
                return Ok(());
            }
        };

        let entry = &mut self.syscalls[at];
        match chain {
            _ if entry.tree.is_empty() => {
                // the stored entry already fires unconditionally and is at
                // least as inclusive as any new rule
                log::debug!("syscall {syscall}: unconditional entry covers new rule");
            }
            None => {
                // the new rule fires unconditionally and subsumes the
                // stored tree
                entry.tree.clear();
                entry.action = action;
                log::debug!("syscall {syscall}: unconditional rule replaces decision tree");
            }
            Some(node) => {
                merge::into_level(&mut entry.tree, node)?;
                if entry.tree.is_empty() {
                    // opposite-branch leaves cancelled the last stored test
                    entry.action = action;
                }
            }
        }
        Ok(())
    }

    /// Add a rule loaded from a rule file.
    pub fn add_rule(&mut self, rule: &Rule) -> Result<(), FiltronError> {
        self.add(rule.action, rule.syscall, &rule.predicates)
    }

    /// Look up the entry for a syscall number.
    pub fn find(&self, syscall: i64) -> Option<&SyscallEntry> {
        self.syscalls
            .binary_search_by_key(&syscall, |e| e.num)
            .ok()
            .map(|at| &self.syscalls[at])
    }

    /// Entries in ascending syscall order.
    pub fn syscalls(&self) -> &[SyscallEntry] {
        &self.syscalls
    }
}

impl<'a> IntoIterator for &'a FilterDb {
    type Item = &'a SyscallEntry;
    type IntoIter = std::slice::Iter<'a, SyscallEntry>;
    fn into_iter(self) -> Self::IntoIter {
        self.syscalls.iter()
    }
}
