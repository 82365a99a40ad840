//! Decision-tree merger.
//!
//! Folds the canonical chain of a new rule into the stored tree for its
//! syscall, one level at a time. At each level the chain cursor either
//! matches a stored sibling on its full test (argument, operator, datum) or
//! it does not:
//!
//! - no match: the rest of the chain is spliced into the level at the
//!   position keeping siblings ordered by (argument, operator);
//! - match, both sides end here: agreeing action branches mean the stored
//!   leaf already covers the new rule; disagreeing branches mean the test
//!   fires an action on both outcomes and no longer discriminates anything,
//!   so it is dropped from its level;
//! - match, exactly one side ends here: the shorter rule is the more
//!   inclusive one and wins — either the rest of the chain is discarded, or
//!   the stored node becomes a leaf and its now-unreachable subtree is
//!   freed;
//! - match, neither side ends here: descend along the chain's continuation
//!   branch, grafting the tail if the stored node has nothing there.
//!
//! Ownership of a grafted tail moves into the stored tree at the graft
//! point; whatever is left of the chain is dropped when the walk returns.

use crate::{tree::Node, FiltronError};

/// Merge a chain (rooted at `new`) into the stored sibling level `level`.
pub(crate) fn into_level(level: &mut Vec<Node>, new: Node) -> Result<(), FiltronError> {
    match level.iter().position(|n| n.same_test(&new)) {
        None => splice(level, new),
        Some(at) => merge_matched(level, at, new),
    }
}

/// No stored sibling shares the chain's next test: insert the rest of the
/// chain as a new alternative. Siblings stay ordered by (argument,
/// operator); an alternative with an equal key goes after the existing
/// group.
fn splice(level: &mut Vec<Node>, new: Node) -> Result<(), FiltronError> {
    let at = level.partition_point(|n| n.level_key() <= new.level_key());
    level.try_reserve(1)?;
    level.insert(at, new);
    Ok(())
}

fn merge_matched(level: &mut Vec<Node>, at: usize, mut new: Node) -> Result<(), FiltronError> {
    level[at].refs += 1;

    match (level[at].is_leaf(), new.is_leaf()) {
        (true, true) => {
            if level[at].act_on_true != new.act_on_true {
                // an action now fires on both outcomes of the test: the
                // node no longer discriminates anything, drop it and its
                // subtrees
                level.remove(at);
            }
            Ok(())
        }
        (true, false) => {
            let side = new.continuation_side()?;
            let existing = &mut level[at];
            if side == existing.act_on_true {
                // the stored leaf already fires on that branch: it is the
                // more inclusive rule, the longer chain is dropped
                return Ok(());
            }
            let tail = std::mem::take(new.child_mut(side));
            attach(existing.child_mut(side), tail)
        }
        (false, true) => {
            // the new rule is the shorter, more inclusive one: the stored
            // node becomes a leaf and the subtree on the action branch is
            // unreachable from now on
            let existing = &mut level[at];
            existing.action = new.action;
            existing.act_on_true = new.act_on_true;
            existing.child_mut(new.act_on_true).clear();
            Ok(())
        }
        (false, false) => {
            let side = new.continuation_side()?;
            let tail = std::mem::take(new.child_mut(side));
            attach(level[at].child_mut(side), tail)
        }
    }
}

/// Hand a chain tail over to a stored child level: graft it whole when the
/// level is empty, keep walking otherwise.
fn attach(slot: &mut Vec<Node>, mut tail: Vec<Node>) -> Result<(), FiltronError> {
    if slot.is_empty() {
        *slot = tail;
        return Ok(());
    }
    let next = tail.pop().ok_or(FiltronError::Internal)?;
    if !tail.is_empty() {
        // a chain level holds exactly one node
        return Err(FiltronError::Internal);
    }
    into_level(slot, next)
}
