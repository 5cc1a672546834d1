use searchforge_core::{Result, SearchForgeError, SimpleScore};
use searchforge_scoring::{ScoreDirector, SimpleScoreDirector};
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

#[derive(Debug)]
struct AppendItem(i64);

impl ProblemChange<PairSolution> for AppendItem {
    fn apply(&self, director: &mut ProblemChangeDirector<'_, PairSolution>) -> Result<()> {
        let value = self.0;
        director.add_entity(0, |s| {
            s.values.push(Some(value));
            s.values.len() - 1
        })?;
        Ok(())
    }
}

#[test]
fn test_change_variable_is_scored() {
    let mut director = pair_director(&[1, 1]);
    assert_eq!(director.calculate_score(), SimpleScore::of(-1));

    let mut change_director = ProblemChangeDirector::new(&mut director);
    change_director
        .change_variable(0, 1, "value", |s| s.values[1] = Some(2))
        .unwrap();
    assert_eq!(director.calculate_score(), SimpleScore::of(0));
}

#[test]
fn test_add_and_remove_entity() {
    let mut director = pair_director(&[1, 2]);
    {
        let mut change_director = ProblemChangeDirector::new(&mut director);
        AppendItem(1).apply(&mut change_director).unwrap();
        assert_eq!(change_director.entity_count(0), 3);
    }
    assert_eq!(director.calculate_score(), SimpleScore::of(-1));

    let mut change_director = ProblemChangeDirector::new(&mut director);
    change_director
        .remove_entity(0, 0, |s| {
            s.values.remove(0);
        })
        .unwrap();
    assert_eq!(director.working_solution().values, vec![Some(2), Some(1)]);
    assert_eq!(director.calculate_score(), SimpleScore::of(0));
}

#[test]
fn test_lookup_working_entity() {
    let mut director = pair_director(&[1, 2, 3]);
    let change_director = ProblemChangeDirector::new(&mut director);
    assert_eq!(change_director.lookup_working_entity(0, 2), Some(2));
    assert_eq!(change_director.lookup_working_entity(0, 7), None);
    assert_eq!(change_director.lookup_working_entity(4, 0), None);
}

#[test]
fn test_out_of_range_changes_fail() {
    let mut director = pair_director(&[1, 2]);
    let mut change_director = ProblemChangeDirector::new(&mut director);
    assert!(change_director
        .change_variable(0, 5, "value", |_| {})
        .is_err());
    assert!(matches!(
        change_director.add_entity(3, |_| 0),
        Err(SearchForgeError::DomainModel(_))
    ));
    // The closure claims an index that was never added.
    assert!(change_director.add_entity(0, |_| 9).is_err());
}

#[test]
fn test_problem_fact_change_resets_score() {
    let mut director = pair_director(&[1, 2]);
    assert_eq!(director.calculate_score(), SimpleScore::of(0));
    let mut change_director = ProblemChangeDirector::new(&mut director);
    change_director.change_problem_fact(|s| s.values[1] = Some(1));
    change_director.update_shadow_variables().unwrap();
    assert_eq!(director.calculate_score(), SimpleScore::of(-1));

    let mut change_director = ProblemChangeDirector::new(&mut director);
    change_director.add_problem_fact(|s| s.values.push(Some(1)));
    assert_eq!(director.calculate_score(), SimpleScore::of(-3));
    let mut change_director = ProblemChangeDirector::new(&mut director);
    change_director.remove_problem_fact(|s| {
        s.values.pop();
    });
    assert_eq!(director.calculate_score(), SimpleScore::of(-1));
}

#[test]
fn test_handle_queues_only_while_solving() {
    let (handle, mut receiver) = SolverHandle::<PairSolution>::new();
    assert_eq!(
        handle.add_problem_change(AppendItem(1)),
        ProblemChangeResult::SolverNotRunning
    );

    receiver.set_solving(true);
    assert!(handle.is_solving());
    assert_eq!(handle.add_problem_change(AppendItem(1)), ProblemChangeResult::Queued);
    let closure = ClosureProblemChange::<PairSolution, _>::new("noop", |_| Ok(()));
    assert_eq!(handle.clone().add_problem_change(closure), ProblemChangeResult::Queued);
    assert!(receiver.has_pending());

    let changes = receiver.drain_pending();
    assert_eq!(changes.len(), 2);
    assert!(format!("{:?}", changes[0]).contains("AppendItem"));
    assert!(format!("{:?}", changes[1]).contains("noop"));
    assert!(!receiver.has_pending());
}

#[test]
fn test_closed_queue() {
    let (handle, receiver) = SolverHandle::<PairSolution>::new();
    receiver.set_solving(true);
    drop(receiver);
    assert_eq!(
        handle.add_problem_change(AppendItem(2)),
        ProblemChangeResult::QueueClosed
    );
}

#[test]
fn test_terminate_early_flag() {
    let (handle, receiver) = SolverHandle::<PairSolution>::new();
    let flag = receiver.terminate_early_flag();
    handle.terminate_early();
    assert!(receiver.is_terminate_early());
    assert!(flag.load(std::sync::atomic::Ordering::SeqCst));

    receiver.set_solving(true);
    assert!(!receiver.is_terminate_early());
}
