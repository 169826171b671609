use evoforge::config::EnvironmentShape;
use evoforge::error::EvoError;
use evoforge::genome::Genome;
use evoforge::policy::{ApplyEnergyMethod, DivideMethod, SlicingMethod};
use evoforge::population::{Silent, Simulation, SimulationOptions, UpdateStats};
use evoforge::settings::RunSettings;
use rstest::rstest;
use std::sync::Arc;

const SHAPE: EnvironmentShape = EnvironmentShape {
    num_tasks: 3,
    num_reactions: 1,
    num_resources: 0,
    num_instructions: 8,
};

fn options(updates: usize, world_size: usize) -> SimulationOptions {
    SimulationOptions {
        updates,
        ticks_per_update: world_size,
        ancestor_length: 20,
        task_chance: 0.05,
        max_time: None,
    }
}

fn settings(world_size: usize, num_demes: usize, seed: u64) -> Arc<RunSettings> {
    Arc::new(
        RunSettings::builder()
            .world_size(world_size)
            .num_demes(num_demes)
            .seed(seed)
            .shape(SHAPE)
            .build(),
    )
}

#[test]
fn test_population_grows_from_one_ancestor() {
    let mut sim = Simulation::new(settings(100, 1, 3), options(5, 100)).unwrap();
    let result = sim.run(Silent).unwrap();

    assert_eq!(result.history.len(), 5);
    let births: usize = result.history.iter().map(|s| s.births).sum();
    assert!(births > 0, "no births in {:?}", result.history);
    assert!(sim.num_organisms() > 1);

    let last = result.last().unwrap();
    assert_eq!(last.num_organisms, sim.num_organisms());
    assert!(last.ave_merit > 0.0);
    assert!(last.max_merit >= last.ave_merit);
    assert!(last.ave_generation > 0.0);
}

#[test]
fn test_same_seed_same_world() {
    let run = |seed: u64| {
        let mut sim = Simulation::new(settings(60, 3, seed), options(4, 60)).unwrap();
        let result = sim.run(Silent).unwrap();
        (result.history, sim.snapshot())
    };

    let (history_a, snap_a) = run(11);
    let (history_b, snap_b) = run(11);
    assert_eq!(history_a, history_b);
    assert_eq!(snap_a, snap_b);
    assert!(!snap_a.is_empty());
}

#[test]
fn test_callback_can_stop_the_run() {
    let mut sim = Simulation::new(settings(50, 1, 1), options(100, 50)).unwrap();
    let result = sim.run(|s: &UpdateStats| s.update < 2).unwrap();

    assert_eq!(result.history.len(), 3);
    let updates: Vec<usize> = result.history.iter().map(|s| s.update).collect();
    assert_eq!(updates, vec![0, 1, 2]);
}

#[test]
fn test_every_deme_is_seeded() {
    let mut sim = Simulation::new(settings(40, 4, 5), options(0, 40)).unwrap();
    sim.seed_population().unwrap();

    let slots: Vec<usize> = sim.organisms().map(|(slot, _)| slot).collect();
    assert_eq!(slots, vec![0, 10, 20, 30]);
    for (_, org) in sim.organisms() {
        assert_eq!(org.genome.len(), 20);
        assert!(org.phenotype.is_injected());
    }
}

#[test]
fn test_offspring_stay_in_their_deme() {
    // One ancestor in deme 1 only; the other demes must stay empty.
    let mut sim = Simulation::new(settings(40, 4, 8), options(3, 40)).unwrap();
    sim.inject(12, Genome::new(vec![1; 15])).unwrap();
    sim.run(Silent).unwrap();

    assert!(sim.num_organisms() > 1);
    assert!(sim.organisms().all(|(slot, _)| (10..20).contains(&slot)));
}

#[rstest]
#[case(SlicingMethod::Constant, DivideMethod::Split)]
#[case(SlicingMethod::Probabilistic, DivideMethod::Normal)]
#[case(SlicingMethod::DemeProbabilistic, DivideMethod::Normal)]
fn test_policies_drive_a_full_run(#[case] slicing: SlicingMethod, #[case] divide: DivideMethod) {
    let settings = Arc::new(
        RunSettings::builder()
            .world_size(30)
            .num_demes(3)
            .slicing_method(slicing)
            .divide_method(divide)
            .seed(2)
            .shape(SHAPE)
            .build(),
    );
    let mut sim = Simulation::new(settings, options(4, 30)).unwrap();
    let result = sim.run(Silent).unwrap();

    assert_eq!(result.history.len(), 4);
    assert!(result.history.iter().map(|s| s.births).sum::<usize>() > 0);
}

#[test]
fn test_energy_run_keeps_stores_in_bounds() {
    let settings = Arc::new(
        RunSettings::builder()
            .world_size(50)
            .seed(4)
            .shape(SHAPE)
            .energy_enabled(true)
            .energy_given_on_inject(200.0)
            .energy_given_at_birth(50.0)
            .energy_cap(1000.0)
            .num_cycles_exc_before_0_energy(100)
            .apply_energy_method(ApplyEnergyMethod::OnTaskCompletion)
            .build(),
    );
    let mut opts = options(5, 50);
    opts.task_chance = 0.5;

    let mut sim = Simulation::new(settings, opts).unwrap();
    let result = sim.run(Silent).unwrap();

    assert!(result.history.iter().map(|s| s.births).sum::<usize>() > 0);
    for (_, org) in sim.organisms() {
        let energy = org.phenotype.energy_store();
        assert!((0.0..=1000.0).contains(&energy), "energy {}", energy);
    }
}

#[test]
fn test_inject_rejects_bad_input() {
    let mut sim = Simulation::new(settings(10, 1, 0), options(1, 10)).unwrap();

    let err = sim.inject(10, Genome::new(vec![0; 5])).unwrap_err();
    assert!(matches!(err, EvoError::Range { index: 10, size: 10 }));

    let err = sim.inject(0, Genome::new(vec![0, 8, 1])).unwrap_err();
    assert!(matches!(err, EvoError::Config(_)));
    assert!(err.to_string().contains("instruction id 8"));

    assert!(matches!(
        sim.inject(0, Genome::default()),
        Err(EvoError::Config(_))
    ));
    assert_eq!(sim.num_organisms(), 0);
}

#[test]
fn test_inject_replaces_occupant() {
    let mut sim = Simulation::new(settings(10, 1, 0), options(1, 10)).unwrap();
    sim.inject(3, Genome::new(vec![0; 5])).unwrap();
    sim.inject(3, Genome::new(vec![1; 9])).unwrap();

    assert_eq!(sim.num_organisms(), 1);
    assert_eq!(sim.organism(3).unwrap().genome.len(), 9);
    assert_eq!(sim.organism(3).unwrap().phenotype.merit(), 9.0);
}

#[rstest]
#[case(0, 0.1)]
#[case(10, -0.5)]
#[case(10, 1.5)]
fn test_bad_driver_options_are_rejected(#[case] ancestor_length: usize, #[case] chance: f64) {
    let mut opts = options(1, 10);
    opts.ancestor_length = ancestor_length;
    opts.task_chance = chance;
    assert!(matches!(
        Simulation::new(settings(10, 1, 0), opts),
        Err(EvoError::Config(_))
    ));
}

#[rstest]
#[case(0.0, false)]
#[case(1.0, true)]
fn test_task_chance_controls_task_completion(#[case] chance: f64, #[case] expect_tasks: bool) {
    let mut opts = options(4, 50);
    opts.task_chance = chance;
    let mut sim = Simulation::new(settings(50, 1, 6), opts).unwrap();
    let result = sim.run(Silent).unwrap();

    let tasks = result.last().unwrap().tasks_last_gen;
    assert_eq!(tasks > 0, expect_tasks, "tasks_last_gen = {}", tasks);
}
