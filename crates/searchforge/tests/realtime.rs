//! Solving on one thread while another submits problem changes.

use std::sync::Once;
use std::thread;
use std::time::Duration;

use searchforge::engine::TimeTermination;
use searchforge::prelude::*;
use searchforge::{ClosureProblemChange, ProblemChangeResult};
use searchforge_test::nqueens::{self, NQueensSolution, Queen};
use tracing_subscriber::EnvFilter;

static LOGGING: Once = Once::new();

fn init_logging() {
    LOGGING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

fn queen_row() -> VariableAccess<NQueensSolution, i64> {
    VariableAccess {
        entity_class: "Queen",
        descriptor_index: 0,
        variable_name: "row",
        getter: nqueens::get_queen_row,
        setter: nqueens::set_queen_row,
        values: nqueens::row_range,
    }
}

#[test]
fn test_problem_change_reaches_the_running_solver() {
    init_logging();
    let factory = SolverFactory::new(
        SolverConfig::new().with_random_seed(4),
        SimpleScoreDirectorFactory::new(
            nqueens::create_nqueens_descriptor(),
            nqueens::calculate_conflicts as fn(&NQueensSolution) -> SimpleScore,
        ),
    )
    .unwrap();
    let mut solver = factory
        .build_solver(&[queen_row()])
        .unwrap()
        .with_termination(Box::new(TimeTermination::new(Duration::from_secs(10))));
    let handle = solver.handle();
    let director = factory
        .director_factory()
        .build_score_director(NQueensSolution::with_rows(&[0, 1, 2, 3, 0, 1]))
        .unwrap();

    let solving = thread::spawn(move || solver.solve(director));

    while !handle.is_solving() {
        thread::yield_now();
    }
    // A seventh queen joins at the next step boundary.
    let change = ClosureProblemChange::<NQueensSolution, _>::new(
        "add queen",
        |director| {
            director
                .add_entity(0, |s| {
                    s.n += 1;
                    s.queens.push(Queen::assigned(6, 6, 0));
                    s.queens.len() - 1
                })
                .map(|_| ())
        },
    );
    let queued = handle.add_problem_change(change);
    thread::sleep(Duration::from_millis(50));
    handle.terminate_early();

    let best = solving.join().unwrap().unwrap();
    assert_eq!(queued, ProblemChangeResult::Queued);
    assert_eq!(best.queens.len(), 7);
    assert_eq!(best.n, 7);
    assert!(best.score.is_some());
    assert!(!handle.is_solving());
}
