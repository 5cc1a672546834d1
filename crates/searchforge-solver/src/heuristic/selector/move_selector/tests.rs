use rand::rngs::StdRng;
use rand::SeedableRng;
use searchforge_core::{HardSoftScore, SimpleScore};
use searchforge_scoring::SimpleScoreDirector;
use searchforge_test::pair::{self, PairSolution};
use searchforge_test::task::{self, TaskSolution};

use super::*;
use crate::heuristic::r#move::{ChangeMove, EitherMove, Move};
use crate::heuristic::selector::decorator::SelectedCountLimitSelector;
use crate::heuristic::selector::nearby::{NearbyDistribution, NearbyEntitySelector};
use crate::heuristic::selector::{
    EntityIndependentValueSelector, FromSolutionEntitySelector, MimicRecordingSelector,
    SelectionOrder, Selector, StaticValueSelector,
};

type PairDirector = SimpleScoreDirector<PairSolution, fn(&PairSolution) -> SimpleScore>;

fn pair_director(values: &[i64]) -> PairDirector {
    SimpleScoreDirector::new(
        PairSolution::with_values(values),
        pair::create_pair_descriptor(),
        pair::calculate_conflicts as fn(&PairSolution) -> SimpleScore,
    )
}

fn pass<S, C, D>(selector: &mut C, director: &D, rng: &mut StdRng) -> Vec<C::Item>
where
    S: searchforge_core::domain::PlanningSolution,
    C: Selector<S>,
    D: searchforge_scoring::ScoreDirector<S>,
{
    selector.restart(director, rng).unwrap();
    let mut items = Vec::new();
    while let Some(item) = selector.next(director, rng).unwrap() {
        items.push(item);
    }
    items
}

fn change_selector(
    random: bool,
) -> ChangeMoveSelector<
    PairSolution,
    i64,
    FromSolutionEntitySelector,
    EntityIndependentValueSelector<crate::heuristic::selector::FromSolutionValueSelector<PairSolution, i64>>,
> {
    ChangeMoveSelector::from_solution(
        pair::get_value,
        pair::set_value,
        0,
        "value",
        pair::value_range,
        random,
    )
}

fn change_pairs(moves: &[ChangeMove<PairSolution, i64>]) -> Vec<(usize, i64)> {
    moves
        .iter()
        .map(|m| (m.entity_index(), *m.to_value().unwrap()))
        .collect()
}

#[test]
fn test_change_selector_original_order() {
    let director = pair_director(&[1, 1]);
    let mut rng = StdRng::seed_from_u64(0);
    let mut selector = change_selector(false);

    assert_eq!(selector.size(&director), Some(6));
    assert!(!selector.is_never_ending());
    let moves = pass(&mut selector, &director, &mut rng);
    assert_eq!(
        change_pairs(&moves),
        vec![(0, 1), (0, 2), (0, 3), (1, 1), (1, 2), (1, 3)]
    );
    // Moves to the current value are generated but not doable.
    let doable = moves.iter().filter(|m| m.is_doable(&director)).count();
    assert_eq!(doable, 4);
}

#[test]
fn test_change_selector_random_interleaves_entities() {
    let director = pair_director(&[1, 1]);
    let mut rng = StdRng::seed_from_u64(12);
    let mut selector = change_selector(true);
    assert!(selector.is_never_ending());

    selector.restart(&director, &mut rng).unwrap();
    let moves: Vec<_> = (0..200)
        .map(|_| selector.next(&director, &mut rng).unwrap().unwrap())
        .collect();
    let pairs = change_pairs(&moves);
    assert!(pairs.contains(&(0, 3)));
    assert!(pairs.contains(&(1, 2)));
    assert!(pairs.iter().all(|&(e, v)| e < 2 && (1..=3).contains(&v)));
}

#[test]
fn test_count_limit_over_random_moves() {
    let director = pair_director(&[1, 1]);
    let mut rng = StdRng::seed_from_u64(1);
    let mut limited = SelectedCountLimitSelector::new(change_selector(true), 10);

    assert_eq!(pass(&mut limited, &director, &mut rng).len(), 10);
}

#[test]
fn test_swap_all_pairs_is_triangular() {
    let director = pair_director(&[1, 2, 3]);
    let mut rng = StdRng::seed_from_u64(0);
    let mut selector = SwapMoveSelector::all_pairs(pair::get_value, pair::set_value, 0, "value");

    assert_eq!(selector.size(&director), Some(3));
    let pairs: Vec<(usize, usize)> = pass(&mut selector, &director, &mut rng)
        .iter()
        .map(|m| (m.left_entity_index(), m.right_entity_index()))
        .collect();
    assert_eq!(pairs, vec![(0, 1), (0, 2), (1, 2)]);
}

#[test]
fn test_swap_with_nearby_right_follows_left() {
    // Weights are positions on a line.
    let director = SimpleScoreDirector::new(
        TaskSolution::from_weights(&[0, 10, 3, 7]),
        task::create_task_descriptor(),
        task::calculate_score as fn(&TaskSolution) -> HardSoftScore,
    );
    let mut rng = StdRng::seed_from_u64(0);
    let left = MimicRecordingSelector::<TaskSolution, _>::new(FromSolutionEntitySelector::new(0));
    let right = NearbyEntitySelector::<TaskSolution, _, _>::new(
        left.replayer(),
        0,
        |solution: &TaskSolution, origin: &usize, destination: &usize| {
            (task::task_weight(solution, *origin) - task::task_weight(solution, *destination)).abs()
                as f64
        },
        NearbyDistribution::default(),
        SelectionOrder::Original,
    )
    .unwrap();
    let mut selector =
        SwapMoveSelector::new(left, right, task::get_priority, task::set_priority, 0, "priority");

    let pairs: Vec<(usize, usize)> = pass(&mut selector, &director, &mut rng)
        .iter()
        .map(|m| (m.left_entity_index(), m.right_entity_index()))
        .collect();
    assert_eq!(pairs.len(), 12);
    assert_eq!(&pairs[..3], &[(0, 2), (0, 3), (0, 1)]);
    assert_eq!(&pairs[3..6], &[(1, 3), (1, 2), (1, 0)]);
}

#[test]
fn test_union_sequential() {
    let director = pair_director(&[1, 2]);
    let mut rng = StdRng::seed_from_u64(0);
    let mut union = UnionMoveSelector::<PairSolution, EitherMove<PairSolution, i64>>::new(false)
        .with(change_selector(false))
        .with(SwapMoveSelector::all_pairs(
            pair::get_value,
            pair::set_value,
            0,
            "value",
        ));

    assert_eq!(union.child_count(), 2);
    assert_eq!(union.size(&director), Some(7));
    let moves = pass(&mut union, &director, &mut rng);
    assert_eq!(moves.len(), 7);
    assert!(moves[..6].iter().all(|m| matches!(m, EitherMove::Change(_))));
    assert!(matches!(moves[6], EitherMove::Swap(_)));
}

#[test]
fn test_union_random_draws_from_every_child() {
    let director = pair_director(&[1, 2]);
    let mut rng = StdRng::seed_from_u64(8);
    let mut union = UnionMoveSelector::<PairSolution, EitherMove<PairSolution, i64>>::new(true)
        .with(change_selector(true))
        .with(SwapMoveSelector::random(
            pair::get_value,
            pair::set_value,
            0,
            "value",
        ));
    assert!(union.is_never_ending());

    union.restart(&director, &mut rng).unwrap();
    let (mut changes, mut swaps) = (0, 0);
    for _ in 0..200 {
        match union.next(&director, &mut rng).unwrap().unwrap() {
            EitherMove::Change(_) => changes += 1,
            EitherMove::Swap(_) => swaps += 1,
        }
    }
    assert!(changes > 0 && swaps > 0);
}

#[test]
fn test_cartesian_product_replays_the_recorded_entity() {
    let director = pair_director(&[1, 1]);
    let mut rng = StdRng::seed_from_u64(0);
    let recording = MimicRecordingSelector::<PairSolution, _>::new(FromSolutionEntitySelector::new(0));
    let replaying = recording.replayer();
    let first = ChangeMoveSelector::new(
        recording,
        EntityIndependentValueSelector::new(StaticValueSelector::new(vec![1i64])),
        pair::get_value,
        pair::set_value,
        0,
        "value",
    );
    let second = ChangeMoveSelector::new(
        replaying,
        EntityIndependentValueSelector::new(StaticValueSelector::new(vec![2i64, 3])),
        pair::get_value,
        pair::set_value,
        0,
        "value",
    );
    let mut selector = CartesianProductMoveSelector::new(vec![
        Box::new(first) as Box<dyn Selector<PairSolution, Item = ChangeMove<PairSolution, i64>>>,
        Box::new(second),
    ]);

    // The product of the child sizes; the replayed entity is not factored out.
    assert_eq!(selector.size(&director), Some(8));
    let composites = pass(&mut selector, &director, &mut rng);
    let combinations: Vec<Vec<(usize, i64)>> = composites
        .iter()
        .map(|composite| change_pairs(composite.moves()))
        .collect();
    assert_eq!(
        combinations,
        vec![
            vec![(0, 1), (0, 2)],
            vec![(0, 1), (0, 3)],
            vec![(1, 1), (1, 2)],
            vec![(1, 1), (1, 3)],
        ]
    );
}

#[test]
fn test_cartesian_product_with_empty_child_is_empty() {
    let director = pair_director(&[1, 1]);
    let mut rng = StdRng::seed_from_u64(0);
    let empty = ChangeMoveSelector::new(
        FromSolutionEntitySelector::new(0),
        EntityIndependentValueSelector::new(StaticValueSelector::<i64>::new(Vec::new())),
        pair::get_value,
        pair::set_value,
        0,
        "value",
    );
    let mut selector = CartesianProductMoveSelector::new(vec![
        Box::new(change_selector(false))
            as Box<dyn Selector<PairSolution, Item = ChangeMove<PairSolution, i64>>>,
        Box::new(empty),
    ]);

    assert!(pass(&mut selector, &director, &mut rng).is_empty());
}
