use searchforge_config::{EnvironmentMode, MoveThreadCount};
use searchforge_core::{HardSoftScore, SimpleScore};
use searchforge_scoring::SimpleScoreDirectorFactory;
use searchforge_test::nqueens::{self, NQueensSolution};
use searchforge_test::pair::{self, PairSolution};
use searchforge_test::task::{self, TaskSolution};

use super::*;

type QueensFactory = SimpleScoreDirectorFactory<NQueensSolution, fn(&NQueensSolution) -> SimpleScore>;

fn queens_factory(config: SolverConfig) -> Result<SolverFactory<NQueensSolution, QueensFactory>> {
    SolverFactory::new(
        config,
        SimpleScoreDirectorFactory::new(
            nqueens::create_nqueens_descriptor(),
            nqueens::calculate_conflicts as fn(&NQueensSolution) -> SimpleScore,
        ),
    )
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

fn task_priority() -> VariableAccess<TaskSolution, i64> {
    VariableAccess {
        entity_class: "Task",
        descriptor_index: 0,
        variable_name: "priority",
        getter: task::get_priority,
        setter: task::set_priority,
        values: task::priority_range,
    }
}

#[test]
fn test_default_phase_from_empty_config() {
    let factory = queens_factory(SolverConfig::new().with_termination_steps(200)).unwrap();
    let solver = factory.build_solver(&[queen_row()]).unwrap();
    assert_eq!(solver.phase_count(), 1);

    let best = factory
        .solve(NQueensSolution::with_rows(&[0, 0, 0, 0]), &[queen_row()])
        .unwrap();
    assert!(best.score.unwrap() > SimpleScore::of(-6));
}

#[test]
fn test_toml_tabu_search_solves_four_queens() {
    let config = SolverConfig::from_toml_str(
        r#"
        random_seed = 5

        [termination]
        best_score_limit = "0"
        step_count_limit = 500

        [[phases]]
        type = "local_search"
        [phases.acceptor]
        entity_tabu_size = 2
        [phases.forager]
        accepted_count_limit = 1000
        [phases.move_selector]
        type = "change_move_selector"
        selection_order = "original"
        "#,
    )
    .unwrap();
    let factory = queens_factory(config).unwrap();

    let best = factory
        .solve(NQueensSolution::with_rows(&[0, 0, 0, 0]), &[queen_row()])
        .unwrap();
    assert_eq!(best.score, Some(SimpleScore::of(0)));
}

#[test]
fn test_yaml_phases_run_in_order() {
    let config = SolverConfig::from_yaml_str(
        r#"
        random_seed: 1
        phases:
          - type: local_search
            local_search_type: hill_climbing
            move_selector:
              type: union_move_selector
              selection_order: original
              selectors:
                - type: change_move_selector
                - type: swap_move_selector
            termination:
              step_count_limit: 5
          - type: local_search
            acceptor:
              late_acceptance_size: 10
            forager:
              accepted_count_limit: 1
            termination:
              step_count_limit: 5
        "#,
    )
    .unwrap();
    let factory = SolverFactory::new(
        config,
        SimpleScoreDirectorFactory::new(task::create_task_descriptor(), task::calculate_score),
    )
    .unwrap();

    let solver = factory.build_solver(&[task_priority()]).unwrap();
    assert_eq!(solver.phase_count(), 2);

    let mut solution = TaskSolution::from_weights(&[3, 1, 2]);
    for (slot, task) in solution.tasks.iter_mut().enumerate() {
        task.priority = Some(slot as i64 % 2);
    }
    let best = factory.solve(solution, &[task_priority()]).unwrap();
    // Any score without hard conflicts.
    assert!(best.score.unwrap() > HardSoftScore::of(-1, 0));
}

#[test]
fn test_invalid_config_is_rejected_up_front() {
    let config = SolverConfig::new().with_move_thread_count(MoveThreadCount::Count(0));
    let err = queens_factory(config).unwrap_err();
    assert!(matches!(err, SearchForgeError::Config(_)));
}

#[test]
fn test_code_only_selectors_fail_at_build_time() {
    let config = SolverConfig::from_toml_str(
        r#"
        [[phases]]
        type = "local_search"
        [phases.move_selector]
        type = "cartesian_product_move_selector"
        [[phases.move_selector.selectors]]
        type = "change_move_selector"
        [[phases.move_selector.selectors]]
        type = "swap_move_selector"
        "#,
    )
    .unwrap();
    let factory = queens_factory(config).unwrap();
    let err = factory.build_solver(&[queen_row()]).unwrap_err();
    assert!(matches!(err, SearchForgeError::Config(_)));
}

#[test]
fn test_no_variables_is_a_config_error() {
    let factory = queens_factory(SolverConfig::new().with_termination_steps(1)).unwrap();
    let variables: [VariableAccess<NQueensSolution, i64>; 0] = [];
    assert!(factory.build_solver(&variables).is_err());
}

#[test]
fn test_move_threads_and_full_assert() {
    let config = SolverConfig::new()
        .with_termination_steps(20)
        .with_environment_mode(EnvironmentMode::FullAssert)
        .with_move_thread_count(MoveThreadCount::Count(2));
    let factory = queens_factory(config).unwrap();

    let best = factory
        .solve(NQueensSolution::with_rows(&[0, 0, 0, 0, 0]), &[queen_row()])
        .unwrap();
    assert!(best.score.unwrap() > SimpleScore::of(-10));
}

#[test]
fn test_pair_solution_through_the_facade() {
    let factory = SolverFactory::new(
        SolverConfig::new().with_termination_steps(10).with_random_seed(2),
        SimpleScoreDirectorFactory::new(pair::create_pair_descriptor(), pair::calculate_conflicts),
    )
    .unwrap();
    let value = VariableAccess {
        entity_class: "Item",
        descriptor_index: 0,
        variable_name: "value",
        getter: pair::get_value,
        setter: pair::set_value,
        values: pair::value_range,
    };
    let best = factory
        .solve(PairSolution::with_values(&[3, 3]), &[value])
        .unwrap();
    assert_eq!(best.score, Some(SimpleScore::of(0)));
}
