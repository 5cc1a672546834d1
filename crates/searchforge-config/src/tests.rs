//! Tests for solver configuration.

use std::time::Duration;

use searchforge_core::SearchForgeError;

use super::*;

fn local_search(config: &SolverConfig, index: usize) -> &LocalSearchConfig {
    let PhaseConfig::LocalSearch(local_search) = &config.phases[index];
    local_search
}

#[test]
fn test_toml_parsing() {
    let toml = r#"
        environment_mode = "full_assert"
        random_seed = 42
        move_thread_count = { count = 2 }

        [termination]
        seconds_spent_limit = 30
        unimproved_step_count_limit = 500

        [[phases]]
        type = "local_search"
        [phases.acceptor]
        acceptor_types = ["entity_tabu", "simulated_annealing"]
        entity_tabu_ratio = 0.2
        simulated_annealing_starting_temperature = "0hard/10soft"
        [phases.forager]
        accepted_count_limit = 4
        pick_early_type = "first_best_score_improving"
        finalist_podium_type = "strategic_oscillation_by_level_on_best_score"
        [phases.termination]
        step_count_limit = 100
    "#;

    let config = SolverConfig::from_toml_str(toml).unwrap();
    assert_eq!(config.environment_mode, EnvironmentMode::FullAssert);
    assert_eq!(config.random_seed, Some(42));
    assert_eq!(config.move_thread_count, MoveThreadCount::Count(2));
    let termination = config.termination.as_ref().unwrap();
    assert_eq!(termination.seconds_spent_limit, Some(30));
    assert_eq!(termination.unimproved_step_count_limit, Some(500));

    let phase = local_search(&config, 0);
    let acceptor = phase.acceptor.as_ref().unwrap();
    assert_eq!(
        acceptor.resolved_types(),
        vec![AcceptorType::EntityTabu, AcceptorType::SimulatedAnnealing]
    );
    let forager = phase.forager.as_ref().unwrap();
    assert_eq!(forager.accepted_count_limit, Some(4));
    assert_eq!(
        forager.finalist_podium_type,
        Some(FinalistPodiumType::StrategicOscillationByLevelOnBestScore)
    );
    assert_eq!(phase.termination.as_ref().unwrap().step_count_limit, Some(100));
    assert!(config.validate().is_ok());
}

#[test]
fn test_yaml_parsing() {
    let yaml = r#"
        environment_mode: reproducible
        random_seed: 42
        termination:
          seconds_spent_limit: 30
        phases:
          - type: local_search
            acceptor:
              late_acceptance_size: 400
            move_selector:
              type: union_move_selector
              selectors:
                - type: change_move_selector
                  selection_order: shuffled
                  cache_type: phase
                - type: swap_move_selector
    "#;

    let config = SolverConfig::from_yaml_str(yaml).unwrap();
    assert_eq!(config.environment_mode, EnvironmentMode::Reproducible);
    assert_eq!(config.random_seed, Some(42));
    let phase = local_search(&config, 0);
    assert_eq!(
        phase.acceptor.as_ref().unwrap().resolved_types(),
        vec![AcceptorType::LateAcceptance]
    );
    let Some(MoveSelectorConfig::UnionMoveSelector(union)) = &phase.move_selector else {
        panic!("expected a union move selector");
    };
    assert_eq!(union.selectors.len(), 2);
    assert_eq!(
        union.selectors[0].selection().selection_order,
        Some(SelectionOrder::Shuffled)
    );
    assert!(config.validate().is_ok());
}

#[test]
fn test_builder() {
    let config = SolverConfig::new()
        .with_random_seed(123)
        .with_termination_seconds(60)
        .with_termination_steps(1000)
        .with_environment_mode(EnvironmentMode::FastAssert)
        .with_phase(PhaseConfig::LocalSearch(LocalSearchConfig::default()));

    assert_eq!(config.random_seed, Some(123));
    assert_eq!(config.time_limit(), Some(Duration::from_secs(60)));
    assert_eq!(config.termination.as_ref().unwrap().step_count_limit, Some(1000));
    assert_eq!(config.phases.len(), 1);
}

#[test]
fn test_time_limit_sums_units() {
    let termination = TerminationConfig {
        millis_spent_limit: Some(500),
        seconds_spent_limit: Some(1),
        minutes_spent_limit: Some(1),
        ..TerminationConfig::default()
    };
    assert_eq!(termination.time_limit(), Some(Duration::from_millis(61_500)));
    assert!(!termination.is_empty());
    assert!(TerminationConfig::default().is_empty());
}

#[test]
fn test_local_search_type_presets() {
    let tabu = LocalSearchConfig {
        local_search_type: Some(LocalSearchType::TabuSearch),
        ..LocalSearchConfig::default()
    };
    assert_eq!(tabu.resolved_acceptor().resolved_types(), vec![AcceptorType::EntityTabu]);
    assert_eq!(tabu.resolved_forager().accepted_count_limit, Some(1000));
    assert!(tabu.validate().is_ok());

    let default = LocalSearchConfig::default();
    assert_eq!(
        default.resolved_acceptor().resolved_types(),
        vec![AcceptorType::LateAcceptance]
    );
    assert_eq!(default.resolved_forager().accepted_count_limit, Some(1));

    let descent = LocalSearchConfig {
        local_search_type: Some(LocalSearchType::VariableNeighborhoodDescent),
        ..LocalSearchConfig::default()
    };
    assert_eq!(
        descent.resolved_forager().pick_early_type,
        Some(PickEarlyType::FirstLastStepScoreImproving)
    );
}

#[test]
fn test_preset_conflicts_with_explicit_acceptor() {
    let config = LocalSearchConfig {
        local_search_type: Some(LocalSearchType::HillClimbing),
        acceptor: Some(AcceptorConfig {
            late_acceptance_size: Some(10),
            ..AcceptorConfig::default()
        }),
        ..LocalSearchConfig::default()
    };
    assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
}

#[test]
fn test_acceptor_validation() {
    let empty = AcceptorConfig::default();
    assert!(empty.validate().is_err());

    let size_and_ratio = AcceptorConfig {
        entity_tabu_size: Some(5),
        entity_tabu_ratio: Some(0.1),
        ..AcceptorConfig::default()
    };
    assert!(size_and_ratio.validate().is_err());

    let missing_temperature = AcceptorConfig {
        acceptor_types: vec![AcceptorType::SimulatedAnnealing],
        ..AcceptorConfig::default()
    };
    assert!(missing_temperature.validate().is_err());

    let negative_ratio = AcceptorConfig {
        great_deluge_water_level_increment_ratio: Some(-0.5),
        ..AcceptorConfig::default()
    };
    assert!(negative_ratio.validate().is_err());

    let move_tabu_without_size = AcceptorConfig {
        acceptor_types: vec![AcceptorType::MoveTabu],
        ..AcceptorConfig::default()
    };
    assert!(move_tabu_without_size.validate().is_err());

    let entity_tabu_default = AcceptorConfig {
        acceptor_types: vec![AcceptorType::EntityTabu],
        ..AcceptorConfig::default()
    };
    assert!(entity_tabu_default.validate().is_ok());
}

#[test]
fn test_sorted_selection_requires_cache() {
    let config = MoveSelectorConfig::ChangeMoveSelector(ChangeMoveSelectorConfig {
        selection: SelectionConfig {
            selection_order: Some(SelectionOrder::Sorted),
            ..SelectionConfig::default()
        },
        ..ChangeMoveSelectorConfig::default()
    });
    assert!(config.validate().is_err());

    let cached = MoveSelectorConfig::ChangeMoveSelector(ChangeMoveSelectorConfig {
        selection: SelectionConfig {
            selection_order: Some(SelectionOrder::Sorted),
            cache_type: Some(SelectionCacheType::Step),
            ..SelectionConfig::default()
        },
        ..ChangeMoveSelectorConfig::default()
    });
    assert!(cached.validate().is_ok());
}

#[test]
fn test_nearby_validation() {
    let shuffled_nearby = MoveSelectorConfig::ChangeMoveSelector(ChangeMoveSelectorConfig {
        nearby_selection: Some(NearbySelectionConfig::default()),
        selection: SelectionConfig {
            selection_order: Some(SelectionOrder::Shuffled),
            cache_type: Some(SelectionCacheType::Phase),
            ..SelectionConfig::default()
        },
        ..ChangeMoveSelectorConfig::default()
    });
    assert!(shuffled_nearby.validate().is_err());

    let bad_block = NearbyDistributionConfig::Block {
        size_minimum: Some(5),
        size_maximum: Some(2),
        size_ratio: None,
        uniform_distribution_probability: None,
    };
    assert!(bad_block.validate().is_err());

    let bad_beta = NearbyDistributionConfig::Beta {
        alpha: Some(0.0),
        beta: None,
    };
    assert!(bad_beta.validate().is_err());
    assert!(NearbyDistributionConfig::default().validate().is_ok());
}

#[test]
fn test_empty_union_is_rejected() {
    let config = MoveSelectorConfig::UnionMoveSelector(UnionMoveSelectorConfig::default());
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_reports_phase_index() {
    let config = SolverConfig::new()
        .with_phase(PhaseConfig::LocalSearch(LocalSearchConfig::default()))
        .with_phase(PhaseConfig::LocalSearch(LocalSearchConfig {
            forager: Some(ForagerConfig {
                accepted_count_limit: Some(0),
                ..ForagerConfig::default()
            }),
            ..LocalSearchConfig::default()
        }));
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("phase 1"));
}

#[test]
fn test_move_thread_count_zero_is_invalid() {
    let config = SolverConfig::new().with_move_thread_count(MoveThreadCount::Count(0));
    assert!(config.validate().is_err());
}

#[test]
fn test_config_error_converts() {
    let err: SearchForgeError = SolverConfig::from_toml_str("random_seed = \"x\"")
        .unwrap_err()
        .into();
    assert!(matches!(err, SearchForgeError::Config(_)));
}

#[test]
fn test_missing_file() {
    assert!(matches!(
        SolverConfig::load("/nonexistent/searchforge.toml"),
        Err(ConfigError::Io(_))
    ));
}
