use rand::rngs::StdRng;
use rand::SeedableRng;
use searchforge_core::{HardSoftScore, SimpleScore};
use searchforge_scoring::{ScoreDirector, SimpleScoreDirector};
use searchforge_test::pair::{self, PairSolution};

use super::*;
use crate::heuristic::r#move::{ChangeMove, CompositeMove};

type PairChange = ChangeMove<PairSolution, i64>;
type PairDirector = SimpleScoreDirector<PairSolution, fn(&PairSolution) -> SimpleScore>;

fn pair_director(values: &[i64]) -> PairDirector {
    SimpleScoreDirector::new(
        PairSolution::with_values(values),
        pair::create_pair_descriptor(),
        pair::calculate_conflicts as fn(&PairSolution) -> SimpleScore,
    )
}

fn change(entity: usize, value: i64) -> PairChange {
    ChangeMove::new(entity, Some(value), pair::get_value, pair::set_value, "value", 0)
}

// A move touching every listed entity.
fn touching(entities: &[usize]) -> CompositeMove<PairSolution, PairChange> {
    CompositeMove::new(entities.iter().map(|&e| change(e, 3)).collect())
}

fn phase(initial: i64, entity_count: usize) -> PhaseContext<SimpleScore> {
    PhaseContext {
        initial_score: SimpleScore::of(initial),
        best_score: SimpleScore::of(initial),
        total_entity_count: entity_count,
    }
}

fn step(step_index: u64, last: i64, best: i64) -> StepContext<SimpleScore> {
    StepContext {
        step_index,
        last_step_score: SimpleScore::of(last),
        best_score: SimpleScore::of(best),
        time_gradient: 0.0,
    }
}

fn accepts<M, A>(
    acceptor: &mut A,
    step: &StepContext<SimpleScore>,
    mv: &M,
    score: i64,
    director: &PairDirector,
    rng: &mut StdRng,
) -> bool
where
    M: Move<PairSolution>,
    A: Acceptor<PairSolution, M>,
{
    let candidate = Candidate {
        mv,
        score: SimpleScore::of(score),
        score_director: director as &dyn ScoreDirector<PairSolution>,
    };
    acceptor.is_accepted(step, &candidate, rng)
}

fn end_step<M, A>(
    acceptor: &mut A,
    step: &StepContext<SimpleScore>,
    step_move: &M,
    undo_move: &M,
    score: i64,
    director: &PairDirector,
) where
    M: Move<PairSolution>,
    A: Acceptor<PairSolution, M>,
{
    let taken = TakenStep {
        step_move,
        undo_move,
        step_score: SimpleScore::of(score),
        score_director: director as &dyn ScoreDirector<PairSolution>,
    };
    acceptor.step_ended(step, &taken);
}

#[test]
fn test_hill_climbing_accepts_equal_and_improving() {
    let director = pair_director(&[1, 1]);
    let mut rng = StdRng::seed_from_u64(0);
    let mut acceptor = HillClimbingAcceptor::new();
    let s = step(0, -5, -5);
    let m = change(0, 2);

    assert!(accepts(&mut acceptor, &s, &m, -3, &director, &mut rng));
    assert!(accepts(&mut acceptor, &s, &m, -5, &director, &mut rng));
    assert!(!accepts(&mut acceptor, &s, &m, -6, &director, &mut rng));
}

#[test]
fn test_late_acceptance_compares_with_late_score() {
    let director = pair_director(&[1, 1]);
    let mut rng = StdRng::seed_from_u64(0);
    let mut acceptor = LateAcceptanceAcceptor::<SimpleScore>::new(3).unwrap();
    let m = change(0, 2);
    Acceptor::<PairSolution, PairChange>::phase_started(&mut acceptor, &phase(-1000, 2));

    let s0 = step(0, -1000, -1000);
    assert!(accepts(&mut acceptor, &s0, &m, -500, &director, &mut rng));
    assert!(!accepts(&mut acceptor, &s0, &m, -1100, &director, &mut rng));
    end_step(&mut acceptor, &s0, &m, &m, -500, &director);

    // The late score is still the initial score.
    let s1 = step(1, -500, -500);
    assert!(accepts(&mut acceptor, &s1, &m, -900, &director, &mut rng));
    assert!(!accepts(&mut acceptor, &s1, &m, -1100, &director, &mut rng));
    end_step(&mut acceptor, &s1, &m, &m, -400, &director);

    let s2 = step(2, -400, -400);
    end_step(&mut acceptor, &s2, &m, &m, -300, &director);

    // The history wrapped: the late score is now the first step score.
    let s3 = step(3, -300, -300);
    assert!(!accepts(&mut acceptor, &s3, &m, -600, &director, &mut rng));
    assert!(accepts(&mut acceptor, &s3, &m, -500, &director, &mut rng));
    assert!(accepts(&mut acceptor, &s3, &m, -300, &director, &mut rng));
}

#[test]
fn test_late_acceptance_rejects_zero_size() {
    let err = LateAcceptanceAcceptor::<SimpleScore>::new(0).unwrap_err();
    assert!(matches!(err, searchforge_core::SearchForgeError::Config(_)));
}

#[test]
fn test_entity_tabu_size() {
    let director = pair_director(&[1, 1, 1, 1, 1]);
    let mut rng = StdRng::seed_from_u64(0);
    let mut acceptor = TabuAcceptor::new(TabuKind::Entity, TabuSize::Fixed(2)).unwrap();
    Acceptor::<PairSolution, CompositeMove<PairSolution, PairChange>>::phase_started(
        &mut acceptor,
        &phase(0, 5),
    );

    let expectations: [(usize, [bool; 5]); 5] = [
        (1, [true, true, true, true, true]),
        (2, [true, false, true, true, true]),
        (4, [true, false, false, true, true]),
        (3, [true, true, false, true, false]),
        (1, [true, true, true, false, false]),
    ];
    for (step_index, (taken, accepted)) in expectations.iter().enumerate() {
        let s = step(step_index as u64, 0, 0);
        for (entity, expected) in accepted.iter().enumerate() {
            let m = touching(&[entity]);
            assert_eq!(
                accepts(&mut acceptor, &s, &m, 0, &director, &mut rng),
                *expected,
                "step {} entity {}",
                step_index,
                entity
            );
        }
        let m = touching(&[*taken]);
        end_step(&mut acceptor, &s, &m, &m, 0, &director);
    }
}

#[test]
fn test_entity_tabu_with_multiple_entities_per_step() {
    let director = pair_director(&[1, 1, 1, 1, 1]);
    let mut rng = StdRng::seed_from_u64(0);
    let mut acceptor = TabuAcceptor::new(TabuKind::Entity, TabuSize::Fixed(2)).unwrap();
    Acceptor::<PairSolution, CompositeMove<PairSolution, PairChange>>::phase_started(
        &mut acceptor,
        &phase(0, 5),
    );

    let s0 = step(0, 0, 0);
    let taken = touching(&[0, 2]);
    assert!(accepts(&mut acceptor, &s0, &taken, 0, &director, &mut rng));
    end_step(&mut acceptor, &s0, &taken, &taken, 0, &director);

    let s1 = step(1, 0, 0);
    assert!(!accepts(&mut acceptor, &s1, &touching(&[0]), 0, &director, &mut rng));
    assert!(accepts(&mut acceptor, &s1, &touching(&[1]), 0, &director, &mut rng));
    assert!(!accepts(&mut acceptor, &s1, &touching(&[1, 2]), 0, &director, &mut rng));
    assert!(accepts(&mut acceptor, &s1, &touching(&[3, 4]), 0, &director, &mut rng));
    let taken = touching(&[1]);
    end_step(&mut acceptor, &s1, &taken, &taken, 0, &director);

    let s2 = step(2, 0, 0);
    assert!(!accepts(&mut acceptor, &s2, &touching(&[1, 3]), 0, &director, &mut rng));
    assert!(accepts(&mut acceptor, &s2, &touching(&[3, 4]), 0, &director, &mut rng));
    let taken = touching(&[3, 4]);
    end_step(&mut acceptor, &s2, &taken, &taken, 0, &director);

    let s3 = step(3, 0, 0);
    assert!(accepts(&mut acceptor, &s3, &touching(&[0, 2]), 0, &director, &mut rng));
    assert!(!accepts(&mut acceptor, &s3, &touching(&[0, 1]), 0, &director, &mut rng));
    assert!(!accepts(&mut acceptor, &s3, &touching(&[3]), 0, &director, &mut rng));
}

#[test]
fn test_tabu_aspiration() {
    let director = pair_director(&[1, 1]);
    let mut rng = StdRng::seed_from_u64(0);
    let mut acceptor = TabuAcceptor::new(TabuKind::Entity, TabuSize::Fixed(2)).unwrap();
    Acceptor::<PairSolution, CompositeMove<PairSolution, PairChange>>::phase_started(
        &mut acceptor,
        &phase(-100, 2),
    );

    let s0 = step(0, -100, -100);
    let taken = touching(&[1]);
    end_step(&mut acceptor, &s0, &taken, &taken, -100, &director);

    let s1 = step(1, -100, -100);
    assert!(accepts(&mut acceptor, &s1, &touching(&[0]), -120, &director, &mut rng));
    assert!(accepts(&mut acceptor, &s1, &touching(&[0]), -20, &director, &mut rng));
    assert!(!accepts(&mut acceptor, &s1, &touching(&[1]), -120, &director, &mut rng));
    assert!(accepts(&mut acceptor, &s1, &touching(&[1]), -20, &director, &mut rng));
    assert!(!accepts(&mut acceptor, &s1, &touching(&[0, 1]), -120, &director, &mut rng));
    assert!(accepts(&mut acceptor, &s1, &touching(&[0, 1]), -20, &director, &mut rng));

    let mut strict = TabuAcceptor::new(TabuKind::Entity, TabuSize::Fixed(2))
        .unwrap()
        .with_aspiration(false);
    Acceptor::<PairSolution, CompositeMove<PairSolution, PairChange>>::phase_started(
        &mut strict,
        &phase(-100, 2),
    );
    end_step(&mut strict, &s0, &taken, &taken, -100, &director);
    assert!(!accepts(&mut strict, &s1, &touching(&[1]), -20, &director, &mut rng));
}

#[test]
fn test_fading_tabu_accept_chance_grows() {
    let director = pair_director(&[1, 1]);
    let mut rng = StdRng::seed_from_u64(7);
    let mut acceptor = TabuAcceptor::new(TabuKind::Entity, TabuSize::Fixed(1))
        .unwrap()
        .with_fading_tabu_size(TabuSize::Fixed(2))
        .unwrap();
    Acceptor::<PairSolution, CompositeMove<PairSolution, PairChange>>::phase_started(
        &mut acceptor,
        &phase(0, 2),
    );
    let tabu = touching(&[0]);
    let other = touching(&[1]);
    end_step(&mut acceptor, &step(0, 0, 0), &tabu, &tabu, 0, &director);

    let mut accepted_counts = Vec::new();
    for step_index in 1..=4 {
        let s = step(step_index, 0, 0);
        let accepted = (0..3000)
            .filter(|_| accepts(&mut acceptor, &s, &tabu, 0, &director, &mut rng))
            .count();
        accepted_counts.push(accepted);
        end_step(&mut acceptor, &s, &other, &other, 0, &director);
    }

    assert_eq!(accepted_counts[0], 0);
    assert!((800..1200).contains(&accepted_counts[1]), "{:?}", accepted_counts);
    assert!((1800..2200).contains(&accepted_counts[2]), "{:?}", accepted_counts);
    assert_eq!(accepted_counts[3], 3000);
}

#[test]
fn test_value_tabu() {
    let director = pair_director(&[1, 1]);
    let mut rng = StdRng::seed_from_u64(0);
    let mut acceptor = TabuAcceptor::new(TabuKind::Value, TabuSize::Fixed(1)).unwrap();
    Acceptor::<PairSolution, PairChange>::phase_started(&mut acceptor, &phase(-1, 2));

    let s0 = step(0, -1, -1);
    let taken = change(0, 2);
    let undo = change(0, 1);
    end_step(&mut acceptor, &s0, &taken, &undo, 0, &director);

    let s1 = step(1, 0, 0);
    assert!(!accepts(&mut acceptor, &s1, &change(1, 2), 0, &director, &mut rng));
    assert!(accepts(&mut acceptor, &s1, &change(1, 3), 0, &director, &mut rng));
    assert!(accepts(&mut acceptor, &s1, &change(0, 1), 0, &director, &mut rng));
}

#[test]
fn test_move_and_undo_move_tabu() {
    let director = pair_director(&[1, 1]);
    let mut rng = StdRng::seed_from_u64(0);
    let taken = change(0, 2);
    let undo = change(0, 1);
    let s0 = step(0, -1, -1);
    let s1 = step(1, 0, 0);

    let mut move_tabu = TabuAcceptor::new(TabuKind::Move, TabuSize::Fixed(1)).unwrap();
    Acceptor::<PairSolution, PairChange>::phase_started(&mut move_tabu, &phase(-1, 2));
    end_step(&mut move_tabu, &s0, &taken, &undo, 0, &director);
    assert!(!accepts(&mut move_tabu, &s1, &change(0, 2), 0, &director, &mut rng));
    assert!(accepts(&mut move_tabu, &s1, &change(0, 1), 0, &director, &mut rng));

    let mut undo_tabu = TabuAcceptor::new(TabuKind::UndoMove, TabuSize::Fixed(1)).unwrap();
    Acceptor::<PairSolution, PairChange>::phase_started(&mut undo_tabu, &phase(-1, 2));
    end_step(&mut undo_tabu, &s0, &taken, &undo, 0, &director);
    assert!(accepts(&mut undo_tabu, &s1, &change(0, 2), 0, &director, &mut rng));
    assert!(!accepts(&mut undo_tabu, &s1, &change(0, 1), 0, &director, &mut rng));
}

#[test]
fn test_tabu_size_ratio() {
    assert_eq!(TabuSize::EntityRatio(0.5).resolve(5), 3);
    assert_eq!(TabuSize::EntityRatio(0.01).resolve(5), 1);
    assert_eq!(TabuSize::EntityRatio(0.99).resolve(5), 4);
    assert_eq!(TabuSize::Fixed(7).resolve(5), 7);
    assert!(TabuAcceptor::new(TabuKind::Entity, TabuSize::EntityRatio(0.0)).is_err());
    assert!(TabuAcceptor::new(TabuKind::Entity, TabuSize::Fixed(3))
        .unwrap()
        .with_fading_tabu_size(TabuSize::EntityRatio(1.0))
        .is_err());
}

#[test]
fn test_simulated_annealing_accept_chance() {
    let director = pair_director(&[1, 1]);
    let mut rng = StdRng::seed_from_u64(42);
    let mut acceptor = SimulatedAnnealingAcceptor::new(SimpleScore::of(10)).unwrap();
    let m = change(0, 2);
    Acceptor::<PairSolution, PairChange>::phase_started(&mut acceptor, &phase(-100, 2));

    let s = step(0, -100, -100);
    Acceptor::<PairSolution, PairChange>::step_started(&mut acceptor, &s);
    assert_eq!(acceptor.temperature_levels(), &[10.0]);
    assert!(accepts(&mut acceptor, &s, &m, -90, &director, &mut rng));
    assert!(accepts(&mut acceptor, &s, &m, -100, &director, &mut rng));

    // exp(-10 / 10) is about 0.368.
    let accepted = (0..10_000)
        .filter(|_| accepts(&mut acceptor, &s, &m, -110, &director, &mut rng))
        .count();
    assert!((3400..3950).contains(&accepted), "accepted {}", accepted);

    let half = StepContext {
        time_gradient: 0.5,
        ..s
    };
    Acceptor::<PairSolution, PairChange>::step_started(&mut acceptor, &half);
    assert_eq!(acceptor.temperature_levels(), &[5.0]);

    let frozen = StepContext {
        time_gradient: 1.0,
        ..s
    };
    Acceptor::<PairSolution, PairChange>::step_started(&mut acceptor, &frozen);
    assert_eq!(acceptor.temperature_levels(), &[1.0e-100]);
    assert!(!(0..1000).any(|_| accepts(&mut acceptor, &frozen, &m, -101, &director, &mut rng)));
}

#[test]
fn test_simulated_annealing_per_level() {
    #[derive(Clone, Debug)]
    struct Plan {
        score: Option<HardSoftScore>,
    }

    impl searchforge_core::PlanningSolution for Plan {
        type Score = HardSoftScore;

        fn score(&self) -> Option<HardSoftScore> {
            self.score
        }

        fn set_score(&mut self, score: Option<HardSoftScore>) {
            self.score = score;
        }
    }

    let mut acceptor = SimulatedAnnealingAcceptor::new(HardSoftScore::of(0, 10)).unwrap();
    assert_eq!(acceptor.temperature_levels(), &[0.0, 10.0]);
    let s = StepContext {
        step_index: 0,
        last_step_score: HardSoftScore::of(0, -100),
        best_score: HardSoftScore::of(0, -100),
        time_gradient: 0.0,
    };
    Acceptor::<Plan, ChangeMove<Plan, i64>>::step_started(&mut acceptor, &s);
    assert_eq!(acceptor.temperature_levels(), &[1.0e-100, 10.0]);

    assert!(SimulatedAnnealingAcceptor::new(HardSoftScore::of(-1, 5)).is_err());
}

#[test]
fn test_great_deluge_water_level_rises_by_ratio() {
    let director = pair_director(&[1, 1]);
    let mut rng = StdRng::seed_from_u64(0);
    let mut acceptor = GreatDelugeAcceptor::<SimpleScore>::with_ratio(0.1).unwrap();
    let m = change(0, 2);
    Acceptor::<PairSolution, PairChange>::phase_started(&mut acceptor, &phase(-1000, 2));
    assert_eq!(acceptor.water_level(), Some(SimpleScore::of(-1000)));

    let s0 = step(0, -1000, -1000);
    assert!(accepts(&mut acceptor, &s0, &m, -1000, &director, &mut rng));
    assert!(!accepts(&mut acceptor, &s0, &m, -1001, &director, &mut rng));
    end_step(&mut acceptor, &s0, &m, &m, -1000, &director);
    assert_eq!(acceptor.water_level(), Some(SimpleScore::of(-900)));

    let s1 = step(1, -1000, -1000);
    // Below the level, but better than the last step.
    assert!(accepts(&mut acceptor, &s1, &m, -950, &director, &mut rng));
    assert!(!accepts(&mut acceptor, &s1, &m, -1000, &director, &mut rng));
    assert!(accepts(&mut acceptor, &s1, &m, -900, &director, &mut rng));
}

#[test]
fn test_great_deluge_water_level_rises_by_score() {
    let director = pair_director(&[1, 1]);
    let mut acceptor =
        GreatDelugeAcceptor::with_increment_score(SimpleScore::of(10)).unwrap();
    let m = change(0, 2);
    Acceptor::<PairSolution, PairChange>::phase_started(&mut acceptor, &phase(-100, 2));
    for step_index in 0..3 {
        end_step(&mut acceptor, &step(step_index, -100, -100), &m, &m, -100, &director);
    }
    assert_eq!(acceptor.water_level(), Some(SimpleScore::of(-70)));
}

#[test]
fn test_great_deluge_rejects_invalid_increments() {
    assert!(GreatDelugeAcceptor::<SimpleScore>::with_ratio(0.0).is_err());
    assert!(GreatDelugeAcceptor::<SimpleScore>::with_ratio(-0.5).is_err());
    assert!(GreatDelugeAcceptor::with_increment_score(SimpleScore::of(-1)).is_err());
}

#[test]
fn test_composite_requires_every_acceptor() {
    let director = pair_director(&[1, 1]);
    let mut rng = StdRng::seed_from_u64(0);
    let mut acceptor = CompositeAcceptor::<PairSolution, PairChange>::new(Vec::new())
        .with(HillClimbingAcceptor::new())
        .with(TabuAcceptor::new(TabuKind::Move, TabuSize::Fixed(2)).unwrap().with_aspiration(false));
    assert_eq!(acceptor.len(), 2);
    acceptor.phase_started(&phase(-1, 2));

    let s0 = step(0, -1, -1);
    let taken = change(0, 2);
    end_step(&mut acceptor, &s0, &taken, &change(0, 1), 0, &director);

    let s1 = step(1, 0, 0);
    // Tabu rejects it although hill climbing would accept.
    assert!(!accepts(&mut acceptor, &s1, &change(0, 2), 0, &director, &mut rng));
    // Hill climbing rejects it although it is not tabu.
    assert!(!accepts(&mut acceptor, &s1, &change(1, 3), -1, &director, &mut rng));
    assert!(accepts(&mut acceptor, &s1, &change(1, 3), 0, &director, &mut rng));
}
