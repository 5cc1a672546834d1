use rand::rngs::StdRng;
use rand::SeedableRng;
use searchforge_core::{SearchForgeError, SimpleScore};
use searchforge_scoring::SimpleScoreDirector;
use searchforge_test::pair::{self, PairSolution};

use super::*;

type PairDirector = SimpleScoreDirector<PairSolution, fn(&PairSolution) -> SimpleScore>;

fn pair_director(values: &[i64]) -> PairDirector {
    SimpleScoreDirector::new(
        PairSolution::with_values(values),
        pair::create_pair_descriptor(),
        pair::calculate_conflicts as fn(&PairSolution) -> SimpleScore,
    )
}

fn pass<C: Selector<PairSolution>>(
    selector: &mut C,
    director: &PairDirector,
    rng: &mut StdRng,
) -> Vec<C::Item> {
    selector.restart(director, rng).unwrap();
    let mut items = Vec::new();
    while let Some(item) = selector.next(director, rng).unwrap() {
        items.push(item);
    }
    items
}

fn replay(
    replayer: &mut MimicReplayingSelector<PairSolution, usize>,
    director: &PairDirector,
    rng: &mut StdRng,
) -> searchforge_core::Result<Option<usize>> {
    Selector::<PairSolution>::next(replayer, director, rng)
}

#[test]
fn test_entity_selector_original_order() {
    let director = pair_director(&[1, 2, 3]);
    let mut rng = StdRng::seed_from_u64(0);
    let mut selector = FromSolutionEntitySelector::new(0);

    assert_eq!(Selector::<PairSolution>::size(&selector, &director), Some(3));
    assert!(!Selector::<PairSolution>::is_never_ending(&selector));
    assert_eq!(pass(&mut selector, &director, &mut rng), vec![0, 1, 2]);
    assert_eq!(pass(&mut selector, &director, &mut rng), vec![0, 1, 2]);
}

#[test]
fn test_entity_selector_random_is_seeded() {
    let director = pair_director(&[1, 2, 3]);
    let draw = |seed: u64| {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut selector = FromSolutionEntitySelector::random(0);
        Selector::<PairSolution>::restart(&mut selector, &director, &mut rng).unwrap();
        (0..20)
            .map(|_| {
                Selector::<PairSolution>::next(&mut selector, &director, &mut rng)
                    .unwrap()
                    .unwrap()
            })
            .collect::<Vec<usize>>()
    };
    let first = draw(4);
    assert!(first.iter().all(|&entity| entity < 3));
    assert_eq!(draw(4), first);
}

#[test]
fn test_entity_selector_rejects_cached_orders() {
    let err = FromSolutionEntitySelector::with_order(0, SelectionOrder::Sorted).unwrap_err();
    assert!(matches!(err, SearchForgeError::Config(_)));
}

#[test]
fn test_value_selectors() {
    let director = pair_director(&[1, 2]);
    let mut rng = StdRng::seed_from_u64(0);

    let mut from_solution = FromSolutionValueSelector::new(pair::value_range);
    assert_eq!(from_solution.size(&director), Some(3));
    assert_eq!(pass(&mut from_solution, &director, &mut rng), vec![1, 2, 3]);

    let mut fixed = StaticValueSelector::new(vec![7, 8]);
    assert_eq!(pass(&mut fixed, &director, &mut rng), vec![7, 8]);

    let mut independent = EntityIndependentValueSelector::new(StaticValueSelector::new(vec![4]));
    ValueSelector::<PairSolution>::restart(&mut independent, &director, &mut rng, 1).unwrap();
    assert_eq!(
        ValueSelector::<PairSolution>::next(&mut independent, &director, &mut rng).unwrap(),
        Some(4)
    );
    assert_eq!(
        ValueSelector::<PairSolution>::next(&mut independent, &director, &mut rng).unwrap(),
        None
    );
}

#[test]
fn test_entity_value_range_depends_on_entity() {
    let director = pair_director(&[1, 2]);
    let mut rng = StdRng::seed_from_u64(0);
    let mut selector = EntityValueRangeSelector::new(|_: &PairSolution, entity: usize| {
        vec![entity as i64 * 10, entity as i64 * 10 + 1]
    });

    selector.restart(&director, &mut rng, 1).unwrap();
    assert_eq!(selector.next(&director, &mut rng).unwrap(), Some(10));
    assert_eq!(selector.next(&director, &mut rng).unwrap(), Some(11));
    assert_eq!(selector.next(&director, &mut rng).unwrap(), None);
}

#[test]
fn test_mimic_replays_every_recorded_item_once() {
    let director = pair_director(&[1, 2, 3]);
    let mut rng = StdRng::seed_from_u64(0);
    let mut recorder = MimicRecordingSelector::<PairSolution, _>::new(FromSolutionEntitySelector::new(0));
    let mut first = recorder.replayer();
    let mut second = recorder.replayer();
    assert_eq!(recorder.recorder().observer_count(), 2);

    // Replayers report the recorded child's size before any pass.
    assert_eq!(Selector::<PairSolution>::size(&first, &director), Some(3));
    assert!(!Selector::<PairSolution>::is_never_ending(&second));
    recorder.restart(&director, &mut rng).unwrap();
    while let Some(entity) = recorder.next(&director, &mut rng).unwrap() {
        for replayer in [&mut first, &mut second] {
            Selector::<PairSolution>::restart(replayer, &director, &mut rng).unwrap();
            assert_eq!(replay(replayer, &director, &mut rng).unwrap(), Some(entity));
            assert_eq!(replay(replayer, &director, &mut rng).unwrap(), None);
        }
    }
    // The recorder's end of pass is replayed too.
    Selector::<PairSolution>::restart(&mut first, &director, &mut rng).unwrap();
    assert_eq!(replay(&mut first, &director, &mut rng).unwrap(), None);
}

#[test]
fn test_mimic_replay_before_recording_is_usage_error() {
    let director = pair_director(&[1, 2]);
    let mut rng = StdRng::seed_from_u64(0);
    let mut recorder = MimicRecordingSelector::<PairSolution, _>::new(FromSolutionEntitySelector::new(0));
    let mut replayer = recorder.replayer();

    let err = replay(&mut replayer, &director, &mut rng).unwrap_err();
    assert!(matches!(err, SearchForgeError::UsageOrder(_)));

    recorder.restart(&director, &mut rng).unwrap();
    recorder.next(&director, &mut rng).unwrap();
    assert_eq!(replay(&mut replayer, &director, &mut rng).unwrap(), Some(0));

    // A new step forgets the recording.
    recorder
        .lifecycle(SelectorEvent::StepStarted, &director, &mut rng)
        .unwrap();
    assert!(replay(&mut replayer, &director, &mut rng).is_err());
}

#[test]
fn test_mimic_registry() {
    let recorder = MimicRecordingSelector::<PairSolution, _>::new(FromSolutionEntitySelector::new(0));
    let mut registry = MimicRegistry::new();
    registry.register("entity", recorder.recorder()).unwrap();

    let err = registry.register("entity", recorder.recorder()).unwrap_err();
    assert!(matches!(err, SearchForgeError::Config(_)));
    assert!(registry.replayer("entity").is_ok());
    assert!(matches!(
        registry.replayer("missing"),
        Err(SearchForgeError::Config(_))
    ));
    assert_eq!(recorder.recorder().observer_count(), 1);
}

#[test]
fn test_cache_scopes() {
    assert!(!SelectionCacheType::JustInTime.is_cached());
    assert!(SelectionCacheType::Step.is_started_by(SelectorEvent::StepStarted));
    assert!(SelectionCacheType::Phase.is_ended_by(SelectorEvent::PhaseEnded));
    assert!(!SelectionCacheType::Phase.is_started_by(SelectorEvent::StepStarted));
    assert!(SelectionCacheType::Solver.is_started_by(SelectorEvent::SolvingStarted));
}
