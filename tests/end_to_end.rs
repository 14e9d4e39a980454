//! End-to-end runs of the engines on the bundled benchmark problems

mod common;

use approx::assert_abs_diff_eq;
use moea_harness::prelude::*;

#[test]
fn knapsack_sga_best_fitness_is_monotone() {
    common::init_tracing();
    let mut rng = common::rng(42);
    let problem = KnapsackProblem::new(
        vec![Item::new(10, vec![1]), Item::new(1, vec![100])],
        vec![1],
    )
    .unwrap();

    let mut sga = Sga::new(
        problem,
        MaxGenerations::new(50),
        SgaConfig::default().with_population_size(20),
        Operators::embedded(0.1),
        MemoryLogger::new(),
    )
    .unwrap();
    let result = sga.run(&mut rng).unwrap();

    assert_eq!(result.generations, 50);
    assert_eq!(result.termination_reason, "Maximum generations reached");
    let history = result.fitness_history();
    assert_eq!(history.len(), 51);
    // minimized fitness: the best value never gets worse
    assert!(history.windows(2).all(|w| w[1] <= w[0]));
    assert_eq!(result.best_fitness, -10.0);
    assert_eq!(result.best.amounts(), &[1, 0]);

    let logged: Vec<f64> = sga
        .logger()
        .records()
        .iter()
        .map(|r| r["solution"]["fitness"].as_f64().unwrap())
        .collect();
    assert!(logged.windows(2).all(|w| w[1] < w[0]));
}

#[test]
fn nsga2_zdt1_front_spans_first_objective() {
    common::init_tracing();
    let mut rng = common::rng(7);
    let problem = ZdtProblem::new(ZdtVariant::Zdt1, 10).unwrap();

    let mut nsga2 = Nsga2::new(
        problem,
        MaxGenerations::new(100),
        Nsga2Config::default().with_population_size(50),
        Operators::embedded(0.1),
        NullLogger,
    )
    .unwrap();
    let result = nsga2.run(&mut rng).unwrap();

    let front = result.front_objectives();
    assert!(front.len() > 5);
    let f1_min = front.iter().map(|o| o[0]).fold(f64::INFINITY, f64::min);
    let f1_max = front.iter().map(|o| o[0]).fold(f64::NEG_INFINITY, f64::max);
    assert!(f1_min < 0.1, "front starts at {f1_min}");
    assert!(f1_max > 0.9, "front ends at {f1_max}");

    for a in &front {
        for b in &front {
            assert!(!dominates(a, b));
        }
    }
}

#[test]
fn spea2_zdt2_archive_stays_full() {
    common::init_tracing();
    let mut rng = common::rng(11);
    let problem = ZdtProblem::new(ZdtVariant::Zdt2, 6).unwrap();

    let config = Spea2Config::default()
        .with_population_size(40)
        .with_archive_size(20)
        .with_verbose(true);
    let mut spea2 = Spea2::new(
        problem,
        MaxGenerations::new(40),
        config,
        Operators::embedded(0.2),
        MemoryLogger::new(),
    )
    .unwrap();
    let result = spea2.run(&mut rng).unwrap();

    assert_eq!(spea2.archive().len(), 20);
    assert!(!result.front.is_empty());
    for a in &result.front {
        for b in &result.front {
            assert!(!dominates(a.objectives(), b.objectives()));
        }
    }
    let records = spea2.logger().records();
    assert_eq!(records.len(), 41);
    assert!(records.iter().all(|r| r["pareto_front"].is_array()));
}

#[test]
fn tsp_square_reference_tour() {
    let problem = TspProblem::new(vec![
        City::new(0.0, 0.0),
        City::new(1.0, 0.0),
        City::new(1.0, 1.0),
        City::new(0.0, 1.0),
    ])
    .unwrap();

    let reference = problem.reference_solution();
    assert_abs_diff_eq!(reference.solution.length(), 4.0, epsilon = 1e-9);
}

#[test]
fn ssga_tsp_reaches_reference_length() {
    common::init_tracing();
    let mut rng = common::rng(3);
    let problem = TspProblem::random(7, 10.0, &mut rng).unwrap();
    let reference = problem.reference_solution();

    let mut ssga = Ssga::new(
        problem,
        MaxGenerations::new(3000),
        SsgaConfig::default().with_population_size(30),
        Operators::embedded(0.2),
        NullLogger,
    )
    .unwrap();
    let result = ssga.run(&mut rng).unwrap();

    assert!(result.best_fitness >= reference.solution.fitness() - 1e-9);
    assert_eq!(ssga.population().len(), 30);
}

#[test]
fn objectives_survive_json_round_trip() {
    let mut rng = common::rng(5);
    let zdt = ZdtProblem::new(ZdtVariant::Zdt3, 5).unwrap();
    let solution = zdt.random_solution(&mut rng);

    let json = serde_json::to_string(&solution).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    let objectives: Vec<f64> = serde_json::from_value(value["objectives"].clone()).unwrap();
    assert_eq!(objectives, solution.objectives());
    assert_eq!(value["fitness"].as_f64().unwrap(), solution.fitness());

    let layout = GraphPlaneProblem::random(8, 0.5, 1.0, 1.0, &mut rng)
        .unwrap()
        .random_solution(&mut rng);
    let value = serde_json::to_value(&layout).unwrap();
    let objectives: Vec<f64> = serde_json::from_value(value["objectives"].clone()).unwrap();
    assert_eq!(objectives, layout.objectives());
}

#[test]
fn force_layout_seeds_ssga_then_nsga2() {
    common::init_tracing();
    let mut rng = common::rng(19);
    let problem = GraphPlaneProblem::random(12, 0.25, 1.0, 1.0, &mut rng).unwrap();
    let initial = problem.random_solution(&mut rng);

    let mut force = ForceDirectedLayout::new(
        ForceDirectedConfig::default().with_iterations(200),
        NullLogger,
    )
    .unwrap();
    let layout = force.solve(&initial).unwrap().solution;
    assert!(layout.fitness() <= initial.fitness());

    let mut ssga = Ssga::new(
        problem.clone(),
        MaxGenerations::new(200),
        SsgaConfig::default().with_population_size(16),
        Operators::with_embedded_crossover(FixedNormMutation),
        NullLogger,
    )
    .unwrap();
    ssga.seed(&layout, &mut rng);
    assert_eq!(ssga.population()[0].positions(), layout.positions());
    let ssga_result = ssga.run(&mut rng).unwrap();
    assert!(ssga_result.best_fitness <= layout.fitness());

    let mut nsga2 = Nsga2::new(
        problem,
        MaxGenerations::new(20),
        Nsga2Config::default().with_population_size(16),
        Operators::new(FixedNormMutation, UniformCrossover::default()),
        NullLogger,
    )
    .unwrap();
    nsga2.set_population(ssga.population()).unwrap();
    let result = nsga2.run(&mut rng).unwrap();

    assert_eq!(nsga2.population().len(), 16);
    assert!(!result.front.is_empty());
}

#[test]
fn cancelled_run_stops_at_boundary() {
    let mut rng = common::rng(23);
    let problem = ZdtProblem::new(ZdtVariant::Zdt1, 4).unwrap();
    let token = CancellationToken::new();
    let mut nsga2 = Nsga2::new(
        problem,
        MaxGenerations::new(1000),
        Nsga2Config::default().with_population_size(10),
        Operators::embedded(0.1),
        NullLogger,
    )
    .unwrap()
    .with_cancellation(token.clone());

    token.cancel();
    let result = nsga2.run(&mut rng).unwrap();
    assert_eq!(result.generations, 0);
    assert_eq!(result.termination_reason, CANCELLED);
}

#[test]
fn target_fitness_stops_ssga_early() {
    let mut rng = common::rng(31);
    let problem = TspProblem::new(vec![
        City::new(0.0, 0.0),
        City::new(1.0, 0.0),
        City::new(1.0, 1.0),
        City::new(0.0, 1.0),
        City::new(0.5, -0.5),
    ])
    .unwrap();
    let optimum = problem.reference_solution().solution.length();

    let termination = AnyOf::new(Vec::new())
        .or(TargetFitness::new(optimum + 1e-9))
        .or(MaxGenerations::new(100_000))
        .or(Timeout::new(std::time::Duration::from_secs(30)));
    let mut ssga = Ssga::new(
        problem,
        termination,
        SsgaConfig::default().with_population_size(20),
        Operators::embedded(0.3),
        NullLogger,
    )
    .unwrap();
    let result = ssga.run(&mut rng).unwrap();

    assert_eq!(result.termination_reason, "Target fitness reached");
    assert_abs_diff_eq!(result.best_fitness, optimum, epsilon = 1e-9);
    assert_eq!(ssga.steps(), result.generations);
}

#[test]
fn jsonl_logger_writes_one_record_per_line() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("progress.jsonl");
    let mut rng = common::rng(29);
    let problem = ZdtProblem::new(ZdtVariant::Zdt1, 3).unwrap();

    let mut logger = JsonlLogger::new(&path);
    logger.init_logging().unwrap();
    logger.log_problem(&problem).unwrap();

    let mut nsga2 = Nsga2::new(
        problem,
        MaxGenerations::new(4),
        Nsga2Config::default()
            .with_population_size(8)
            .with_verbose(true),
        Operators::embedded(0.1),
        &mut logger,
    )
    .unwrap();
    nsga2.run(&mut rng).unwrap();
    drop(nsga2);

    let contents = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<serde_json::Value> = contents
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(lines.len(), 6);
    assert_eq!(lines[0]["name"], "ZDT1");
    assert_eq!(lines[1]["generation"], 0);
    assert_eq!(lines[5]["generation"], 4);
    assert!(lines[5]["elapsed"].is_u64());
    assert!(lines[5]["pareto_front"].is_array());
}
