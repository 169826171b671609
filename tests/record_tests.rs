use evoforge::config::EnvironmentShape;
use evoforge::error::EvoError;
use evoforge::genome::Genome;
use evoforge::phenotype::{
    DonorKind, ExecutionOutcome, LifeState, Phenotype, PhenotypeRecord, ReceiverKind, StepDelta,
};
use evoforge::settings::RunSettings;
use fastrand::Rng;
use std::sync::Arc;
use tempfile::tempdir;

const SHAPE: EnvironmentShape = EnvironmentShape {
    num_tasks: 3,
    num_reactions: 2,
    num_resources: 1,
    num_instructions: 5,
};

fn settings() -> Arc<RunSettings> {
    Arc::new(RunSettings::builder().shape(SHAPE).build())
}

/// A phenotype with something non-default in most persisted fields.
fn busy_phenotype() -> Phenotype {
    let mut rng = Rng::with_seed(21);
    let genome = Genome::new(vec![1, 2, 3, 4, 0, 1, 2, 3]);
    let mut p = Phenotype::injected(settings(), &genome);
    p.set_copied_size(8);
    p.set_executed_size(7);
    p.set_child_copied_size(8);

    let mut outcome = ExecutionOutcome::new(&SHAPE);
    outcome.mark_task(1, 1.0, 2.0).mark_reaction(0, 1.0).mult_bonus(1.5);
    for update in 0..4 {
        p.record_cpu_step(StepDelta::UNIT);
        p.record_instruction(update % 5);
        p.record_execution_outcome(&outcome, update as u64, &mut Vec::new());
    }
    p.mark_donor(DonorKind::TrueGb);
    p.mark_receiver(ReceiverKind::Kin);
    p.record_thresh_gb_donation();
    p.set_cross_num(3);
    p.divide_reset(&genome, &mut rng);

    p.record_cpu_step(StepDelta::UNIT);
    p.record_instruction(4);
    p.record_error();
    p.record_donation();
    p.mark_donor(DonorKind::QuantaThreshGb);
    p.record_quanta_thresh_gb_donation();
    p.set_modifier(true);
    p.set_mate_select_id(-1);
    p.set_divide_sex(true);
    p.set_child_fertile(false);
    p
}

#[test]
fn test_flat_record_length_matches_shape() {
    let rec = busy_phenotype().snapshot();
    let flat = rec.to_flat();
    assert_eq!(flat.len(), PhenotypeRecord::flat_len(&SHAPE));
    assert_eq!(flat[0], rec.merit);
    assert_eq!(flat[1], 8.0);
}

#[test]
fn test_flat_record_restores_the_same_phenotype() {
    let original = busy_phenotype();
    let rec = original.snapshot();

    let parsed = PhenotypeRecord::from_flat(&rec.to_flat(), &SHAPE).unwrap();
    assert_eq!(parsed, rec);

    let restored = Phenotype::restore(settings(), &parsed).unwrap();
    assert_eq!(restored.state(), LifeState::Active);
    assert_eq!(restored.snapshot(), rec);
    assert_eq!(restored.merit(), original.merit());
    assert_eq!(restored.last().task_count, original.last().task_count);
    assert!(restored.donor().was_set(DonorKind::TrueGb));
    assert!(restored.donor().is_set(DonorKind::QuantaThreshGb));
    assert!(restored.receiver().was_set(ReceiverKind::Kin));
    assert_eq!(restored.mate_select_id(), -1);
}

#[test]
fn test_restored_phenotype_keeps_running() {
    let original = busy_phenotype();
    let mut restored = Phenotype::restore(settings(), &original.snapshot()).unwrap();

    restored.record_cpu_step(StepDelta::UNIT);
    restored.divide_reset(&Genome::new(vec![0; 8]), &mut Rng::with_seed(0));
    assert_eq!(restored.num_divides(), original.num_divides() + 1);
}

#[test]
fn test_truncated_record_is_rejected() {
    let flat = busy_phenotype().snapshot().to_flat();
    let err = PhenotypeRecord::from_flat(&flat[..flat.len() - 1], &SHAPE).unwrap_err();
    assert!(matches!(err, EvoError::Record(_)), "got {:?}", err);

    let mut longer = flat.clone();
    longer.push(0.0);
    assert!(matches!(
        PhenotypeRecord::from_flat(&longer, &SHAPE),
        Err(EvoError::Record(_))
    ));
}

#[test]
fn test_malformed_values_are_rejected() {
    let flat = busy_phenotype().snapshot().to_flat();

    // genome_length must be a non-negative integer
    let mut bad = flat.clone();
    bad[1] = 7.5;
    let err = PhenotypeRecord::from_flat(&bad, &SHAPE).unwrap_err();
    assert!(err.to_string().contains("genome_length"), "got {}", err);

    let mut bad = flat.clone();
    bad[2] = -1.0;
    assert!(PhenotypeRecord::from_flat(&bad, &SHAPE).is_err());

    let mut bad = flat.clone();
    bad[0] = f64::NAN;
    assert!(PhenotypeRecord::from_flat(&bad, &SHAPE).is_err());

    // last value is last_child_fertile, a flag
    let mut bad = flat;
    let last = bad.len() - 1;
    bad[last] = 2.0;
    let err = PhenotypeRecord::from_flat(&bad, &SHAPE).unwrap_err();
    assert!(err.to_string().contains("last_child_fertile"), "got {}", err);
}

#[test]
fn test_restore_checks_environment_shape() {
    let rec = busy_phenotype().snapshot();
    let other = Arc::new(
        RunSettings::builder()
            .shape(EnvironmentShape {
                num_tasks: 4,
                ..SHAPE
            })
            .build(),
    );
    let err = Phenotype::restore(other, &rec).unwrap_err();
    assert!(matches!(err, EvoError::Record(_)));

    let mut short = rec.clone();
    short.donor.pop();
    assert!(matches!(
        Phenotype::restore(settings(), &short),
        Err(EvoError::Record(_))
    ));
}

#[test]
fn test_record_survives_json_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("phenotype.json");
    let rec = busy_phenotype().snapshot();

    std::fs::write(&path, serde_json::to_string_pretty(&rec).unwrap()).unwrap();
    let loaded: PhenotypeRecord =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(loaded, rec);
}
