use evoforge::config::EnvironmentShape;
use evoforge::genome::Genome;
use evoforge::phenotype::{ExecutionOutcome, Phenotype};
use evoforge::policy::ApplyEnergyMethod;
use evoforge::settings::RunSettings;
use proptest::prelude::*;
use rstest::rstest;
use std::sync::Arc;

fn shape() -> EnvironmentShape {
    EnvironmentShape {
        num_tasks: 1,
        num_reactions: 0,
        num_resources: 0,
        num_instructions: 2,
    }
}

fn energy_settings(method: ApplyEnergyMethod) -> Arc<RunSettings> {
    Arc::new(
        RunSettings::builder()
            .shape(shape())
            .energy_enabled(true)
            .energy_cap(1000.0)
            .energy_given_at_birth(10.0)
            .frac_parent_energy_given_at_birth(0.5)
            .num_cycles_exc_before_0_energy(100)
            .apply_energy_method(method)
            .build(),
    )
}

fn organism(settings: Arc<RunSettings>) -> Phenotype {
    Phenotype::injected(settings, &Genome::new(vec![0; 10]))
}

fn earn(p: &mut Phenotype, amount: f64) {
    let mut outcome = ExecutionOutcome::new(&shape());
    outcome.mark_task(0, 1.0, 1.0).add_energy(amount);
    let mut res = Vec::new();
    p.record_execution_outcome(&outcome, 0, &mut res);
}

#[rstest]
#[case(-5.0, 0.0)]
#[case(0.0, 0.0)]
#[case(42.5, 42.5)]
#[case(100.0, 100.0)]
#[case(500.0, 100.0)]
fn test_set_energy_clamps_to_cap(#[case] value: f64, #[case] expected: f64) {
    let settings = Arc::new(RunSettings::builder().shape(shape()).energy_cap(100.0).build());
    let mut p = organism(settings);
    p.set_energy(value);
    assert_eq!(p.energy_store(), expected);
}

#[test]
fn test_reduce_energy_never_goes_negative() {
    let settings = Arc::new(RunSettings::builder().shape(shape()).energy_cap(100.0).build());
    let mut p = organism(settings);
    p.set_energy(30.0);
    p.reduce_energy(12.0);
    assert_eq!(p.energy_store(), 18.0);
    p.reduce_energy(50.0);
    assert_eq!(p.energy_store(), 0.0);
}

#[test]
fn test_refresh_on_task_completion_applies_immediately() {
    let mut p = organism(energy_settings(ApplyEnergyMethod::OnTaskCompletion));
    earn(&mut p, 5.0);
    p.refresh_energy();

    assert_eq!(p.energy_store(), 5.0);
    assert_eq!(p.energy_to_be_applied(), 0.0);
    assert_eq!(p.cur().energy_bonus, 0.0);
}

#[rstest]
#[case(ApplyEnergyMethod::OnDivide)]
#[case(ApplyEnergyMethod::OnSleep)]
fn test_refresh_defers_until_applied(#[case] method: ApplyEnergyMethod) {
    let mut p = organism(energy_settings(method));
    earn(&mut p, 5.0);
    earn(&mut p, 2.0);
    p.refresh_energy();

    assert_eq!(p.energy_store(), 0.0);
    assert_eq!(p.energy_to_be_applied(), 7.0);
    assert_eq!(p.cur().energy_bonus, 0.0);

    p.apply_to_energy_store();
    assert_eq!(p.energy_store(), 7.0);
    assert_eq!(p.energy_to_be_applied(), 0.0);
}

#[test]
fn test_extract_parent_energy_splits_store() {
    let mut p = organism(energy_settings(ApplyEnergyMethod::OnTaskCompletion));
    p.set_energy(200.0);

    let child = p.extract_parent_energy();

    // child = 200 * 0.5 + 10, parent pays child - 2 * 10
    assert_eq!(child, 110.0);
    assert_eq!(p.energy_store(), 110.0);
    assert_eq!(p.merit(), 100.0 * 110.0 / 100.0);
}

#[test]
fn test_extract_flushes_deferred_energy_on_divide() {
    let mut p = organism(energy_settings(ApplyEnergyMethod::OnDivide));
    p.set_energy(100.0);
    earn(&mut p, 20.0);

    let child = p.extract_parent_energy();

    assert_eq!(p.energy_to_be_applied(), 0.0);
    assert_eq!(child, 120.0 * 0.5 + 10.0);
    assert_eq!(p.energy_store(), 120.0 - (70.0 - 20.0));
}

#[test]
fn test_extract_respects_decay_and_cap() {
    let settings = Arc::new(
        RunSettings::builder()
            .shape(shape())
            .energy_enabled(true)
            .energy_cap(50.0)
            .energy_given_at_birth(5.0)
            .frac_parent_energy_given_at_birth(1.0)
            .frac_energy_decay_at_birth(0.5)
            .fix_metabolic_rate(2.0)
            .build(),
    );
    let mut p = organism(settings);
    p.set_energy(50.0);

    let child = p.extract_parent_energy();

    // 50 decays to 25; child wants 25 + 5 = 30, under the cap
    assert_eq!(child, 30.0);
    assert_eq!(p.energy_store(), 25.0 - (30.0 - 10.0));
    // A fixed metabolic rate ignores the store.
    assert_eq!(p.merit(), 200.0);
}

#[test]
fn test_execution_ratio_scales_energy_merit() {
    let mut p = organism(energy_settings(ApplyEnergyMethod::OnTaskCompletion));
    p.set_energy(200.0);
    p.set_execution_ratio(0.5);
    p.extract_parent_energy();
    assert_eq!(p.merit(), 55.0);
}

#[test]
#[should_panic(expected = "energy accounting disabled")]
fn test_extract_without_energy_model_panics() {
    let settings = Arc::new(RunSettings::builder().shape(shape()).build());
    let mut p = organism(settings);
    p.extract_parent_energy();
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn test_store_stays_in_bounds(
        cap in 0.0..1e4f64,
        ops in proptest::collection::vec(-1e5..1e5f64, 1..30)
    ) {
        let settings = Arc::new(RunSettings::builder().shape(shape()).energy_cap(cap).build());
        let mut p = organism(settings);
        for v in ops {
            if v >= 0.0 {
                p.set_energy(v);
            } else {
                p.reduce_energy(-v);
            }
            prop_assert!(p.energy_store() >= 0.0);
            prop_assert!(p.energy_store() <= cap);
        }
    }
}
