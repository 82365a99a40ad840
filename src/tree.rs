use crate::{operators::StoredComparison, Action, FiltronError};

/// Owned node of a per-syscall decision tree.
///
/// A node tests one syscall argument against a datum with a normalised
/// comparison. Each branch owns a *level*: an ordered sequence of sibling
/// alternatives, sorted by (argument, operator). A node is a leaf exactly
/// when it carries an action; a leaf owns at most the subtree on the branch
/// opposite the one its action fires on.
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) arg: u32,
    pub(crate) op: StoredComparison,
    pub(crate) datum: u64,
    pub(crate) action: Option<Action>,
    pub(crate) act_on_true: bool,
    pub(crate) on_true: Vec<Node>,
    pub(crate) on_false: Vec<Node>,
    /// Number of rule paths that have passed through this node.
    pub(crate) refs: u32,
}

impl Node {
    pub(crate) fn new(arg: u32, op: StoredComparison, datum: u64, act_on_true: bool) -> Self {
        Self {
            arg,
            op,
            datum,
            action: None,
            act_on_true,
            on_true: Vec::new(),
            on_false: Vec::new(),
            refs: 1,
        }
    }

    /// Argument index this node tests.
    pub fn arg(&self) -> u32 {
        self.arg
    }

    /// Stored-basis comparison operator.
    pub fn op(&self) -> StoredComparison {
        self.op
    }

    /// Value the argument is compared against.
    pub fn datum(&self) -> u64 {
        self.datum
    }

    /// The action this node fires, if it is a leaf.
    pub fn action(&self) -> Option<Action> {
        self.action
    }

    /// Whether the action (or, for an interior node, the rule continuation)
    /// applies when the comparison is true.
    pub fn action_on_true(&self) -> bool {
        self.act_on_true
    }

    pub fn is_leaf(&self) -> bool {
        self.action.is_some()
    }

    /// Sibling alternatives descended into when the comparison holds.
    pub fn on_true(&self) -> &[Node] {
        &self.on_true
    }

    /// Sibling alternatives descended into when the comparison fails.
    pub fn on_false(&self) -> &[Node] {
        &self.on_false
    }

    pub(crate) fn set_action(&mut self, action: Action) {
        self.action = Some(action);
    }

    /// Attach `tail` as this node's continuation, on its own action-branch
    /// side.
    pub(crate) fn attach_continuation(&mut self, tail: Node) -> Result<(), FiltronError> {
        let side = self.act_on_true;
        let level = self.child_mut(side);
        level.try_reserve(1)?;
        level.push(tail);
        Ok(())
    }

    /// Key ordering siblings within a level.
    pub(crate) fn level_key(&self) -> (u32, StoredComparison) {
        (self.arg, self.op)
    }

    /// Full predicate equality: same argument, operator and datum.
    pub(crate) fn same_test(&self, other: &Node) -> bool {
        self.arg == other.arg && self.op == other.op && self.datum == other.datum
    }

    pub(crate) fn child_mut(&mut self, on_true: bool) -> &mut Vec<Node> {
        if on_true {
            &mut self.on_true
        } else {
            &mut self.on_false
        }
    }

    /// Branch an interior chain node continues on. An interior node with no
    /// continuation, or with one on both branches, breaks the chain
    /// discipline.
    pub(crate) fn continuation_side(&self) -> Result<bool, FiltronError> {
        match (self.on_true.is_empty(), self.on_false.is_empty()) {
            (false, true) => Ok(true),
            (true, false) => Ok(false),
            _ => Err(FiltronError::Internal),
        }
    }
}

/// Structural equality over the stored policy. The refcounts are merge-time
/// diagnostics and do not take part.
impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.arg == other.arg
            && self.op == other.op
            && self.datum == other.datum
            && self.action == other.action
            && self.act_on_true == other.act_on_true
            && self.on_true == other.on_true
            && self.on_false == other.on_false
    }
}

impl Eq for Node {}

/// Pre-order traversal over a decision tree.
///
/// Yields every node before the nodes below it; a node's true-branch level
/// comes before its false-branch level, and siblings come in level order.
/// Driven by an explicit stack, so tree shape cannot overflow the call
/// stack.
pub struct PreOrder<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> PreOrder<'a> {
    pub(crate) fn new(root: &'a [Node]) -> Self {
        Self {
            stack: root.iter().rev().collect(),
        }
    }
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.on_false.iter().rev());
        self.stack.extend(node.on_true.iter().rev());
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(arg: u32, datum: u64) -> Node {
        Node::new(arg, StoredComparison::Equal, datum, true)
    }

    #[test]
    fn preorder_true_level_before_false_level() {
        let mut root = node(0, 0);
        let mut mid = node(1, 10);
        mid.on_true.push(node(2, 20));
        root.on_true.push(mid);
        root.on_true.push(node(1, 11));
        root.on_false.push(node(3, 30));

        let order: Vec<(u32, u64)> = PreOrder::new(std::slice::from_ref(&root))
            .map(|n| (n.arg(), n.datum()))
            .collect();
        assert_eq!(order, vec![(0, 0), (1, 10), (2, 20), (1, 11), (3, 30)]);
    }

    #[test]
    fn equality_ignores_refcounts() {
        let a = node(0, 7);
        let mut b = node(0, 7);
        b.refs = 42;
        assert_eq!(a, b);

        let mut c = node(0, 7);
        c.act_on_true = false;
        assert_ne!(a, c);
    }
}
