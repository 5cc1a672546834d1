use searchforge_core::domain::EntityReference;
use searchforge_core::{ConstraintRef, HardSoftScore, ImpactType, SimpleScore};

use super::*;

struct Slots {
    values: Vec<Option<i64>>,
}

fn count(s: &Slots) -> usize {
    s.values.len()
}

fn value(s: &Slots, i: usize) -> Option<i64> {
    s.values[i]
}

fn conflicts() -> PairConflictConstraint<Slots, SimpleScore, i64, fn(&Slots) -> usize, fn(&Slots, usize) -> Option<i64>> {
    PairConflictConstraint::new(
        ConstraintRef::new("test", "Conflict"),
        ImpactType::Penalty,
        SimpleScore::of(1),
        0,
        count as fn(&Slots) -> usize,
        value as fn(&Slots, usize) -> Option<i64>,
    )
}

#[test]
fn test_pair_conflict_evaluate_counts_pairs() {
    let c = conflicts();
    let slots = Slots {
        values: vec![Some(1), Some(1), Some(1), Some(2), None],
    };
    // Three entities share value 1: three pairs.
    assert_eq!(c.evaluate(&slots), SimpleScore::of(-3));
    assert_eq!(c.match_count(&slots), 3);
}

#[test]
fn test_pair_conflict_incremental_matches_scratch() {
    let mut c = conflicts();
    let mut slots = Slots {
        values: vec![Some(1), Some(1), Some(2)],
    };
    let mut score = c.initialize(&slots);
    assert_eq!(score, SimpleScore::of(-1));

    score = score + c.on_retract(&slots, 1, 0);
    slots.values[1] = Some(2);
    score = score + c.on_insert(&slots, 1, 0);
    assert_eq!(score, c.evaluate(&slots));
    assert_eq!(score, SimpleScore::of(-1));

    score = score + c.on_retract(&slots, 0, 0);
    slots.values[0] = Some(2);
    score = score + c.on_insert(&slots, 0, 0);
    assert_eq!(score, SimpleScore::of(-3));
    assert_eq!(score, c.evaluate(&slots));
}

#[test]
fn test_pair_conflict_ignores_other_descriptors() {
    let mut c = conflicts();
    let slots = Slots {
        values: vec![Some(1), Some(1)],
    };
    c.initialize(&slots);
    assert_eq!(c.on_retract(&slots, 0, 3), SimpleScore::of(0));
    assert_eq!(c.on_insert(&slots, 0, 3), SimpleScore::of(0));
}

#[test]
fn test_pair_conflict_matches_are_justified() {
    let c = conflicts();
    let slots = Slots {
        values: vec![Some(4), None, Some(4)],
    };
    let matches = c.get_matches(&slots);
    assert_eq!(matches.len(), 1);
    assert_eq!(
        matches[0].justification,
        vec![EntityReference::new(0, 0), EntityReference::new(0, 2)]
    );
    assert_eq!(matches[0].score, SimpleScore::of(-1));
}

#[test]
fn test_uni_constraint_incremental() {
    let mut c = UniConstraint::new(
        ConstraintRef::new("", "Large"),
        ImpactType::Penalty,
        HardSoftScore::ONE_SOFT,
        0,
        count,
        |s: &Slots, i: usize| s.values[i].unwrap_or(0),
    );
    let mut slots = Slots {
        values: vec![Some(3), None],
    };
    let mut score = c.initialize(&slots);
    assert_eq!(score, HardSoftScore::of_soft(-3));

    score = score + c.on_retract(&slots, 1, 0);
    slots.values[1] = Some(5);
    score = score + c.on_insert(&slots, 1, 0);
    assert_eq!(score, HardSoftScore::of_soft(-8));
    assert_eq!(score, c.evaluate(&slots));
    assert_eq!(c.match_count(&slots), 2);
    assert_eq!(c.weight(), HardSoftScore::of_soft(-1));
}

#[test]
fn test_constraint_set_tuple() {
    let uni = UniConstraint::new(
        ConstraintRef::new("", "Unassigned"),
        ImpactType::Penalty,
        SimpleScore::of(10),
        0,
        count,
        |s: &Slots, i: usize| i64::from(s.values[i].is_none()),
    );
    let mut set = (conflicts(), uni);
    let slots = Slots {
        values: vec![Some(1), Some(1), None],
    };

    assert_eq!(set.constraint_count(), 2);
    assert_eq!(set.evaluate_all(&slots), SimpleScore::of(-11));
    assert_eq!(set.initialize_all(&slots), SimpleScore::of(-11));

    let totals = set.match_totals(&slots);
    assert_eq!(totals.len(), 2);
    assert_eq!(totals[0].score, SimpleScore::of(-1));
    assert_eq!(totals[1].score, SimpleScore::of(-10));
    assert_eq!(totals[1].match_count(), 1);
    assert_eq!(
        set.constraint_refs(),
        vec![
            ConstraintRef::new("test", "Conflict"),
            ConstraintRef::new("", "Unassigned")
        ]
    );
}
