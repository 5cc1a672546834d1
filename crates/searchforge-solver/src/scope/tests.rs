use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use searchforge_config::EnvironmentMode;
use searchforge_core::SimpleScore;
use searchforge_scoring::{ScoreDirector, SimpleScoreDirector};
use searchforge_test::pair::{self, PairSolution};
use tokio::sync::mpsc;

use super::*;
use crate::realtime::{ClosureProblemChange, ProblemChangeResult, SolverHandle};
use crate::termination::{StepCountTermination, Termination};

type PairDirector = SimpleScoreDirector<PairSolution, fn(&PairSolution) -> SimpleScore>;

fn pair_director(values: &[i64]) -> PairDirector {
    SimpleScoreDirector::new(
        PairSolution::with_values(values),
        pair::create_pair_descriptor(),
        pair::calculate_conflicts as fn(&PairSolution) -> SimpleScore,
    )
}

fn set_value(scope: &mut SolverScope<PairSolution, PairDirector>, entity: usize, value: i64) {
    let director = scope.score_director_mut();
    director.before_variable_changed(0, entity, "value").unwrap();
    director.working_solution_mut().values[entity] = Some(value);
    director.after_variable_changed(0, entity, "value").unwrap();
}

#[test]
fn test_start_solving_records_best() {
    let mut scope = SolverScope::with_seed(pair_director(&[1, 1]), 7);
    assert!(scope.best_solution().is_none());

    scope.start_solving().unwrap();
    assert_eq!(scope.starting_score(), Some(&SimpleScore::of(-1)));
    assert_eq!(scope.best_score(), Some(&SimpleScore::of(-1)));
    assert_eq!(
        scope.best_solution().unwrap().score,
        Some(SimpleScore::of(-1))
    );
}

#[test]
fn test_update_best_solution_only_on_improvement() {
    let mut scope = SolverScope::with_seed(pair_director(&[1, 2]), 7);
    scope.start_solving().unwrap();

    set_value(&mut scope, 1, 1);
    assert!(!scope.update_best_solution());
    assert_eq!(scope.best_score(), Some(&SimpleScore::of(0)));
    assert_eq!(scope.best_solution().unwrap().values, vec![Some(1), Some(2)]);

    // The best solution is a snapshot, not the working solution.
    let working = scope.take_best_or_working_solution();
    assert_eq!(working.values, vec![Some(1), Some(2)]);
}

#[test]
fn test_best_solution_events() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut scope =
        SolverScope::with_seed(pair_director(&[1, 1]), 7).with_best_solution_sender(tx);
    scope.start_solving().unwrap();

    set_value(&mut scope, 1, 3);
    assert!(scope.update_best_solution());

    let (first, first_score) = rx.try_recv().unwrap();
    assert_eq!(first_score, SimpleScore::of(-1));
    assert_eq!(first.values, vec![Some(1), Some(1)]);
    let (second, second_score) = rx.try_recv().unwrap();
    assert_eq!(second_score, SimpleScore::of(0));
    assert_eq!(second.score, Some(SimpleScore::of(0)));
    assert!(rx.try_recv().is_err());
}

#[test]
fn test_asserted_start_detects_corrupt_calculator() {
    use std::sync::atomic::AtomicU64;
    static CALLS: AtomicU64 = AtomicU64::new(0);

    fn drifting(_: &PairSolution) -> SimpleScore {
        SimpleScore::of(CALLS.fetch_add(1, Ordering::SeqCst) as i64)
    }

    let director = SimpleScoreDirector::new(
        PairSolution::with_values(&[1, 2]),
        pair::create_pair_descriptor(),
        drifting as fn(&PairSolution) -> SimpleScore,
    );
    let mut scope =
        SolverScope::with_seed(director, 0).with_environment_mode(EnvironmentMode::FastAssert);
    let err = scope.start_solving().unwrap_err();
    assert!(err.is_consistency_error());
}

#[test]
fn test_phase_scope_counts_steps() {
    let mut scope = SolverScope::with_seed(pair_director(&[1, 1]), 7);
    scope.start_solving().unwrap();
    {
        let mut phase = PhaseScope::new(&mut scope);
        assert_eq!(phase.phase_index(), 0);
        assert_eq!(phase.starting_score(), Some(&SimpleScore::of(-1)));
        {
            let mut step = StepScope::new(&mut phase);
            assert_eq!(step.step_index(), 0);
            step.set_step_score(SimpleScore::of(-1));
            step.set_move_counts(6, 2);
            assert_eq!(step.accepted_move_count(), 2);
            step.complete();
        }
        assert_eq!(phase.step_count(), 1);
        assert_eq!(phase.last_step_score(), Some(&SimpleScore::of(-1)));
        assert_eq!(phase.progress().unimproved_step_count, 1);
    }
    assert_eq!(scope.total_step_count(), 1);
    assert_eq!(scope.progress().unimproved_step_count, 1);

    let phase = PhaseScope::new(&mut scope);
    assert_eq!(phase.phase_index(), 1);
    assert_eq!(phase.step_count(), 0);
}

#[test]
fn test_phase_termination_and_gradient() {
    let mut scope = SolverScope::with_seed(pair_director(&[1, 1]), 7)
        .with_termination(Box::new(StepCountTermination::new(10)));
    scope.start_solving().unwrap();
    let phase_termination = StepCountTermination::new(2);
    let phase_termination: &dyn Termination<PairSolution> = &phase_termination;

    let mut phase = PhaseScope::new(&mut scope);
    assert!(!phase.is_terminated(Some(phase_termination)));
    assert_eq!(phase.time_gradient(None), 0.0);

    phase.increment_step_count();
    assert!((phase.time_gradient(Some(phase_termination)) - 0.5).abs() < 1e-9);
    assert!((phase.time_gradient(None) - 0.1).abs() < 1e-9);

    phase.increment_step_count();
    assert!(phase.is_terminated(Some(phase_termination)));
    assert!(!phase.is_terminated(None));
}

#[test]
fn test_terminate_early_flag() {
    let flag = Arc::new(AtomicBool::new(false));
    let scope = SolverScope::with_seed(pair_director(&[1, 2]), 7)
        .with_terminate_early_flag(Arc::clone(&flag));
    assert!(!scope.is_solver_terminated());
    flag.store(true, Ordering::SeqCst);
    assert!(scope.is_terminate_early());
    assert!(scope.is_solver_terminated());
}

#[test]
fn test_apply_problem_changes_resets_best() {
    let (handle, receiver) = SolverHandle::<PairSolution>::new();
    receiver.set_solving(true);
    let mut scope = SolverScope::with_seed(pair_director(&[1, 2]), 7)
        .with_environment_mode(EnvironmentMode::FullAssert)
        .with_problem_changes(receiver);
    scope.start_solving().unwrap();
    assert_eq!(scope.apply_problem_changes().unwrap(), 0);

    let change = ClosureProblemChange::<PairSolution, _>::new("append", |director| {
        director.add_entity(0, |s| {
            s.values.push(Some(2));
            s.values.len() - 1
        })?;
        Ok(())
    });
    assert_eq!(handle.add_problem_change(change), ProblemChangeResult::Queued);
    assert!(scope.has_pending_problem_changes());

    assert_eq!(scope.apply_problem_changes().unwrap(), 1);
    // The new best solution is worse: the problem itself changed.
    assert_eq!(scope.best_score(), Some(&SimpleScore::of(-1)));
    assert_eq!(scope.best_solution().unwrap().values.len(), 3);
    assert!(!scope.has_pending_problem_changes());
}
