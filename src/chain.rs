//! Rule normaliser: rewrites a submitted rule into its canonical chain.
//!
//! The chain is a linear path of decision nodes sorted by argument index,
//! with every comparison rewritten into the stored basis. Each interior node
//! owns its continuation on its own action-branch side; only the deepest
//! node carries the action.

use crate::{tree::Node, Action, FiltronError, Predicate, MAX_ARGS};

/// Build the canonical chain for a rule. `Ok(None)` means the rule has no
/// predicates and applies unconditionally to its syscall.
///
/// The whole chain is allocated here, before the stored policy is touched,
/// so a failure leaves the database as it was.
pub(crate) fn build(
    action: Action,
    predicates: &[Predicate],
) -> Result<Option<Node>, FiltronError> {
    if predicates.len() > MAX_ARGS {
        return Err(FiltronError::TooManyPredicates(predicates.len()));
    }

    // one slot per argument index: rejects duplicates and leaves the chain
    // already sorted by argument
    let mut slots: [Option<Predicate>; MAX_ARGS] = [None; MAX_ARGS];
    for pred in predicates {
        if pred.arg as usize >= MAX_ARGS {
            return Err(FiltronError::ArgOutOfRange(pred.arg));
        }
        let slot = &mut slots[pred.arg as usize];
        if slot.is_some() {
            return Err(FiltronError::DuplicateArg(pred.arg));
        }
        *slot = Some(*pred);
    }

    // build bottom-up so each node can take ownership of its continuation
    let mut built: Option<Node> = None;
    for pred in slots.iter().rev().flatten() {
        let (op, act_on_true) = pred.op.normalize();
        let mut node = Node::new(pred.arg, op, pred.datum, act_on_true);
        match built.take() {
            None => node.set_action(action),
            Some(tail) => node.attach_continuation(tail)?,
        }
        built = Some(node);
    }
    Ok(built)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Comparison, StoredComparison};

    #[test]
    fn empty_rule_has_no_chain() {
        assert_eq!(build(Action::Allow, &[]).unwrap(), None);
    }

    #[test]
    fn predicates_sorted_by_argument() {
        let chain = build(
            Action::Allow,
            &[
                Predicate::new(3, Comparison::Equal, 30),
                Predicate::new(1, Comparison::Equal, 10),
            ],
        )
        .unwrap()
        .unwrap();

        assert_eq!(chain.arg(), 1);
        assert!(!chain.is_leaf());
        let next = &chain.on_true()[0];
        assert_eq!(next.arg(), 3);
        assert_eq!(next.action(), Some(Action::Allow));
    }

    #[test]
    fn negation_folds_into_branch() {
        // arg0 == 7 && arg1 != 0
        let chain = build(
            Action::Allow,
            &[
                Predicate::new(0, Comparison::Equal, 7),
                Predicate::new(1, Comparison::NotEqual, 0),
            ],
        )
        .unwrap()
        .unwrap();

        assert_eq!(chain.op(), StoredComparison::Equal);
        assert!(chain.action_on_true());
        assert!(chain.on_false().is_empty());

        let leaf = &chain.on_true()[0];
        assert_eq!(leaf.op(), StoredComparison::Equal);
        assert_eq!(leaf.datum(), 0);
        assert!(!leaf.action_on_true());
        assert_eq!(leaf.action(), Some(Action::Allow));
        assert!(leaf.on_true().is_empty() && leaf.on_false().is_empty());
    }

    #[test]
    fn less_than_becomes_greater_equal() {
        let chain = build(Action::Allow, &[Predicate::new(0, Comparison::Less, 5)])
            .unwrap()
            .unwrap();

        assert_eq!(chain.op(), StoredComparison::GreaterEqual);
        assert_eq!(chain.datum(), 5);
        assert!(!chain.action_on_true());
        assert_eq!(chain.action(), Some(Action::Allow));
    }

    #[test]
    fn rejects_too_many_predicates() {
        let preds: Vec<Predicate> = (0..7)
            .map(|i| Predicate::new(i, Comparison::Equal, 0))
            .collect();
        assert!(matches!(
            build(Action::Allow, &preds),
            Err(FiltronError::TooManyPredicates(7))
        ));
    }

    #[test]
    fn rejects_duplicate_argument() {
        let preds = [
            Predicate::new(2, Comparison::Equal, 1),
            Predicate::new(2, Comparison::Greater, 9),
        ];
        assert!(matches!(
            build(Action::Allow, &preds),
            Err(FiltronError::DuplicateArg(2))
        ));
    }

    #[test]
    fn rejects_argument_out_of_range() {
        let preds = [Predicate::new(6, Comparison::Equal, 0)];
        assert!(matches!(
            build(Action::Allow, &preds),
            Err(FiltronError::ArgOutOfRange(6))
        ));
    }
}
