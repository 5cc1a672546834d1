use searchforge_core::domain::{
    ChainLink, EntityReference, ShadowContext, VariableListener,
};
use searchforge_core::{ConstraintRef, ImpactType, Result, SearchForgeError, SimpleScore};
use searchforge_test::pair::{self, PairSolution};
use searchforge_test::tour::{self, ArrivalListener, TourSolution};

use super::*;
use crate::constraint::{PairConflictConstraint, UniConstraint};

type PairConstraint = PairConflictConstraint<
    PairSolution,
    SimpleScore,
    i64,
    fn(&PairSolution) -> usize,
    fn(&PairSolution, usize) -> Option<i64>,
>;

type ArrivalConstraint =
    UniConstraint<TourSolution, SimpleScore, fn(&TourSolution) -> usize, fn(&TourSolution, usize) -> i64>;

fn pair_conflict() -> PairConstraint {
    PairConflictConstraint::new(
        ConstraintRef::new("pair", "Shared value"),
        ImpactType::Penalty,
        SimpleScore::of(1),
        0,
        pair::entity_count as fn(&PairSolution) -> usize,
        pair::get_value as fn(&PairSolution, usize) -> Option<i64>,
    )
}

fn arrival_weight(s: &TourSolution, i: usize) -> i64 {
    s.visits[i].arrival.unwrap_or(0)
}

fn arrival_penalty() -> ArrivalConstraint {
    UniConstraint::new(
        ConstraintRef::new("tour", "Arrival"),
        ImpactType::Penalty,
        SimpleScore::of(1),
        0,
        tour::visit_count as fn(&TourSolution) -> usize,
        arrival_weight as fn(&TourSolution, usize) -> i64,
    )
}

fn tour_listeners() -> Vec<ListenerRegistration<TourSolution>> {
    vec![
        ListenerRegistration::new("Visit", "next", || Box::new(tour::inverse_listener())),
        ListenerRegistration::new("Visit", "vehicle", || Box::new(tour::anchor_listener())),
        ListenerRegistration::new("Visit", "arrival", || Box::new(ArrivalListener)),
    ]
}

fn change_value<D: ScoreDirector<PairSolution>>(director: &mut D, idx: usize, value: i64) {
    director.before_variable_changed(0, idx, "value").unwrap();
    pair::set_value(director.working_solution_mut(), idx, Some(value));
    director.after_variable_changed(0, idx, "value").unwrap();
    director.trigger_variable_listeners().unwrap();
}

fn change_previous<D: ScoreDirector<TourSolution>>(director: &mut D, idx: usize, link: ChainLink) {
    director.before_variable_changed(0, idx, "previous").unwrap();
    tour::set_previous(director.working_solution_mut(), idx, Some(link));
    director.after_variable_changed(0, idx, "previous").unwrap();
    director.trigger_variable_listeners().unwrap();
}

#[test]
fn test_simple_director_change_and_undo() {
    let mut director = SimpleScoreDirector::new(
        PairSolution::with_values(&[1, 1]),
        pair::create_pair_descriptor(),
        pair::calculate_conflicts,
    );
    assert_eq!(director.calculate_score(), SimpleScore::of(-1));

    change_value(&mut director, 1, 2);
    assert_eq!(director.calculate_score(), SimpleScore::of(0));

    change_value(&mut director, 1, 1);
    assert_eq!(director.calculate_score(), SimpleScore::of(-1));
    assert_eq!(director.working_solution().score, Some(SimpleScore::of(-1)));
    assert_eq!(director.calculation_count(), 3);
}

#[test]
fn test_simple_director_caches_clean_score() {
    let mut director = SimpleScoreDirector::new(
        PairSolution::with_values(&[1, 2]),
        pair::create_pair_descriptor(),
        pair::calculate_conflicts,
    );
    let first = director.calculate_score();
    let second = director.calculate_score();
    assert_eq!(first, second);
}

#[test]
fn test_incremental_director_change_and_undo() {
    let mut director = IncrementalScoreDirector::new(
        PairSolution::with_values(&[1, 1]),
        pair::create_pair_descriptor(),
        (pair_conflict(),),
    );
    assert!(!director.is_initialized());
    assert_eq!(director.calculate_score(), SimpleScore::of(-1));

    change_value(&mut director, 0, 2);
    assert_eq!(director.calculate_score(), SimpleScore::of(0));
    director
        .assert_working_score_from_scratch(SimpleScore::of(0), "after change")
        .unwrap();

    change_value(&mut director, 0, 1);
    assert_eq!(director.calculate_score(), SimpleScore::of(-1));
}

#[test]
fn test_incremental_director_retracts_once_per_entity() {
    let mut director = IncrementalScoreDirector::new(
        PairSolution::with_values(&[1, 1, 2]),
        pair::create_pair_descriptor(),
        (pair_conflict(),),
    );
    assert_eq!(director.calculate_score(), SimpleScore::of(-1));

    // Two notifications for the same entity before the score is read.
    director.before_variable_changed(0, 2, "value").unwrap();
    pair::set_value(director.working_solution_mut(), 2, Some(3));
    director.after_variable_changed(0, 2, "value").unwrap();
    director.before_variable_changed(0, 2, "value").unwrap();
    pair::set_value(director.working_solution_mut(), 2, Some(1));
    director.after_variable_changed(0, 2, "value").unwrap();

    assert_eq!(director.calculate_score(), SimpleScore::of(-3));
}

#[test]
fn test_score_corruption_detected() {
    let mut director = IncrementalScoreDirector::new(
        PairSolution::with_values(&[1, 2]),
        pair::create_pair_descriptor(),
        (pair_conflict(),),
    );
    let score = director.calculate_score();

    // Unnotified write.
    pair::set_value(director.working_solution_mut(), 1, Some(1));

    let err = director
        .assert_working_score_from_scratch(score, "unnotified write")
        .unwrap_err();
    match err {
        SearchForgeError::ScoreCorruption {
            context,
            working_score,
            uncorrupted_score,
        } => {
            assert_eq!(context, "unnotified write");
            assert_eq!(working_score, "0");
            assert_eq!(uncorrupted_score, "-1");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_reset_after_entity_added() {
    let mut director = IncrementalScoreDirector::new(
        PairSolution::with_values(&[1, 2]),
        pair::create_pair_descriptor(),
        (pair_conflict(),),
    );
    assert_eq!(director.calculate_score(), SimpleScore::of(0));

    director.before_entity_added(0);
    director.working_solution_mut().values.push(Some(2));
    director.after_entity_added(0, 2);

    assert_eq!(director.entity_count(0), 3);
    assert_eq!(director.calculate_score(), SimpleScore::of(-1));
}

#[test]
fn test_constraint_match_totals_require_tracking() {
    let mut director = IncrementalScoreDirector::new(
        PairSolution::with_values(&[1, 1]),
        pair::create_pair_descriptor(),
        (pair_conflict(),),
    );
    assert!(matches!(
        director.constraint_match_totals(),
        Err(SearchForgeError::UsageOrder(_))
    ));
}

#[test]
fn test_constraint_match_totals() {
    let mut director = IncrementalScoreDirector::new(
        PairSolution::with_values(&[3, 3]),
        pair::create_pair_descriptor(),
        (pair_conflict(),),
    )
    .with_constraint_match_enabled(true);
    director.calculate_score();

    let total = director
        .constraint_match_total(&ConstraintRef::new("pair", "Shared value"))
        .unwrap();
    assert_eq!(total.score, SimpleScore::of(-1));
    assert_eq!(total.match_count(), 1);
    assert_eq!(
        total.matches[0].justification,
        vec![EntityReference::new(0, 0), EntityReference::new(0, 1)]
    );

    let missing = director.constraint_match_total(&ConstraintRef::new("pair", "Unknown"));
    assert!(matches!(missing, Err(SearchForgeError::UsageOrder(_))));
}

#[test]
fn test_simple_director_constraint_matches() {
    let mut director = SimpleScoreDirector::new(
        PairSolution::with_values(&[1, 2]),
        pair::create_pair_descriptor(),
        pair::calculate_conflicts,
    );
    assert!(!director.is_constraint_match_enabled());
    assert!(director.constraint_match_totals().is_err());

    let mut director = director.with_constraint_matches(|_| Vec::new());
    assert!(director.is_constraint_match_enabled());
    assert!(director.constraint_match_totals().unwrap().is_empty());
}

#[test]
fn test_listeners_recompute_shadows_on_build() {
    let director = SimpleScoreDirector::with_listeners(
        TourSolution::small(),
        tour::create_tour_descriptor(),
        tour::calculate_score,
        &tour_listeners(),
    )
    .unwrap();

    let visits = &director.working_solution().visits;
    assert_eq!(visits[0].next, Some(1));
    assert_eq!(visits[2].vehicle, Some(1));
    assert_eq!(visits[1].arrival, Some(5));
    assert_eq!(visits[3].arrival, None);
}

#[test]
fn test_chain_change_updates_all_shadows() {
    let mut director = SimpleScoreDirector::with_listeners(
        TourSolution::small(),
        tour::create_tour_descriptor(),
        tour::calculate_score,
        &tour_listeners(),
    )
    .unwrap();

    // Append the unassigned visit 3 behind visit 2.
    change_previous(&mut director, 3, ChainLink::Entity(2));

    let visits = &director.working_solution().visits;
    assert_eq!(visits[2].next, Some(3));
    assert_eq!(visits[3].vehicle, Some(1));
    // Visit 2 leaves at 9, then travels from 12 to 7.
    assert_eq!(visits[3].arrival, Some(14));
    assert_eq!(director.calculate_score(), SimpleScore::of(-28));
    director
        .assert_shadow_variables_are_not_stale("after append")
        .unwrap();
}

#[test]
fn test_incremental_director_tracks_shadow_changes() {
    let mut director = IncrementalScoreDirector::with_listeners(
        TourSolution::small(),
        tour::create_tour_descriptor(),
        (arrival_penalty(),),
        &tour_listeners(),
    )
    .unwrap();
    assert_eq!(director.calculate_score(), SimpleScore::of(-14));

    // Move visit 1 from behind visit 0 to behind visit 2.
    change_previous(&mut director, 1, ChainLink::Entity(2));
    let score = director.calculate_score();
    assert_eq!(score, SimpleScore::of(-26));
    assert_eq!(director.working_solution().visits[0].next, None);
    assert_eq!(director.working_solution().visits[1].vehicle, Some(1));
    director
        .assert_working_score_from_scratch(score, "after move")
        .unwrap();

    // And back again.
    change_previous(&mut director, 1, ChainLink::Entity(0));
    assert_eq!(director.calculate_score(), SimpleScore::of(-14));
    director.assert_shadow_variables_are_not_stale("after undo").unwrap();
}

#[test]
fn test_stale_shadow_detected() {
    let mut director = SimpleScoreDirector::with_listeners(
        TourSolution::small(),
        tour::create_tour_descriptor(),
        tour::calculate_score,
        &tour_listeners(),
    )
    .unwrap();

    // Genuine change without notifications leaves `next` stale.
    tour::set_previous(director.working_solution_mut(), 3, Some(ChainLink::Entity(1)));

    let err = director
        .assert_shadow_variables_are_not_stale("unnotified")
        .unwrap_err();
    assert!(matches!(err, SearchForgeError::ShadowVariableStale(_)));
}

#[test]
fn test_missing_listener_is_rejected() {
    let mut listeners = tour_listeners();
    listeners.pop();
    let result = SimpleScoreDirector::with_listeners(
        TourSolution::small(),
        tour::create_tour_descriptor(),
        tour::calculate_score,
        &listeners,
    );
    assert!(matches!(result, Err(SearchForgeError::DomainModel(_))));
}

#[test]
fn test_listener_for_genuine_variable_is_rejected() {
    let mut listeners = tour_listeners();
    listeners.push(ListenerRegistration::new("Visit", "previous", || {
        Box::new(ArrivalListener)
    }));
    let result = VariableListenerSupport::build(&tour::create_tour_descriptor(), &listeners);
    assert!(matches!(result, Err(SearchForgeError::DomainModel(_))));
}

// Writes `vehicle` although it is registered for `arrival`.
struct RogueListener;

impl VariableListener<TourSolution> for RogueListener {
    fn after_variable_changed(
        &mut self,
        ctx: &mut dyn ShadowContext<TourSolution>,
        entity: EntityReference,
    ) -> Result<()> {
        ctx.before_variable_changed(entity, "vehicle")?;
        ctx.working_solution_mut().visits[entity.entity_index].vehicle = None;
        ctx.after_variable_changed(entity, "vehicle")
    }

    fn reset_working_solution(&mut self, _solution: &mut TourSolution) {}
}

#[test]
fn test_undeclared_shadow_write_fails() {
    let mut listeners = tour_listeners();
    listeners.pop();
    listeners.push(ListenerRegistration::new("Visit", "arrival", || Box::new(RogueListener)));
    let mut director = SimpleScoreDirector::with_listeners(
        TourSolution::small(),
        tour::create_tour_descriptor(),
        tour::calculate_score,
        &listeners,
    )
    .unwrap();

    director.before_variable_changed(0, 3, "previous").unwrap();
    tour::set_previous(director.working_solution_mut(), 3, Some(ChainLink::Entity(2)));
    director.after_variable_changed(0, 3, "previous").unwrap();
    let err = director.trigger_variable_listeners().unwrap_err();
    assert!(matches!(err, SearchForgeError::DomainModel(_)));
}

#[test]
fn test_factory_builds_independent_directors() {
    let factory = IncrementalScoreDirectorFactory::new(tour::create_tour_descriptor(), (arrival_penalty(),))
        .with_listener(tour_listeners()[0].clone())
        .with_listener(tour_listeners()[1].clone())
        .with_listener(tour_listeners()[2].clone());

    let mut first = factory.build_score_director(TourSolution::small()).unwrap();
    let mut second = factory.build_score_director(TourSolution::small()).unwrap();
    first.calculate_score();
    change_previous(&mut first, 3, ChainLink::Entity(1));

    assert_eq!(second.calculate_score(), SimpleScore::of(-14));
    assert_ne!(first.calculate_score(), second.calculate_score());
    assert_eq!(factory.solution_descriptor().type_name, "TourSolution");
}

#[test]
fn test_simple_factory() {
    let factory = SimpleScoreDirectorFactory::new(pair::create_pair_descriptor(), pair::calculate_conflicts);
    let mut director = factory
        .build_score_director(PairSolution::with_values(&[2, 2]))
        .unwrap();
    assert_eq!(director.calculate_score(), SimpleScore::of(-1));
}

#[test]
fn test_shared_factory_builds_through_arc() {
    let factory = std::sync::Arc::new(SimpleScoreDirectorFactory::new(
        pair::create_pair_descriptor(),
        pair::calculate_conflicts,
    ));
    let shared = std::sync::Arc::clone(&factory);
    let mut director = shared
        .build_score_director(PairSolution::with_values(&[1, 3]))
        .unwrap();
    assert_eq!(director.calculate_score(), SimpleScore::of(0));
    assert_eq!(
        shared.solution_descriptor().type_name,
        factory.solution_descriptor().type_name
    );
}
