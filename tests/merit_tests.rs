use evoforge::merit::{MeritModel, SizeStats};
use evoforge::policy::{BaseMeritMethod, FitnessMethod};
use evoforge::settings::RunSettings;
use rstest::rstest;

fn stats() -> SizeStats {
    SizeStats {
        genome_length: 10,
        copied_size: 8,
        executed_size: 12,
        bonus_instruction_count: 3,
    }
}

#[rstest]
#[case(BaseMeritMethod::Constant, 100)]
#[case(BaseMeritMethod::CopiedSize, 8)]
#[case(BaseMeritMethod::ExecutedSize, 12)]
#[case(BaseMeritMethod::FullSize, 10)]
#[case(BaseMeritMethod::LeastSize, 8)]
#[case(BaseMeritMethod::SqrtLeastSize, 2)]
fn test_size_based_merit(#[case] method: BaseMeritMethod, #[case] expected: u32) {
    let settings = RunSettings::builder().base_merit_method(method).build();
    assert_eq!(MeritModel::new(&settings).base_merit(&stats()), expected);
}

#[rstest]
#[case(1, false, 4)]
#[case(5, false, 4)]
#[case(-1, false, 8)]
#[case(0, false, 1)]
#[case(1, true, 1)]
fn test_bonus_instruction_merit(
    #[case] effect: i32,
    #[case] valley: bool,
    #[case] expected: u32,
) {
    let settings = RunSettings::builder()
        .base_merit_method(BaseMeritMethod::NumBonusInst)
        .merit_bonus_effect(effect)
        .fitness_valley(valley)
        .fitness_valley_start(2)
        .fitness_valley_stop(5)
        .build();
    assert_eq!(MeritModel::new(&settings).base_merit(&stats()), expected);
}

#[test]
fn test_fitness_valley_bounds_are_inclusive() {
    let settings = RunSettings::builder()
        .base_merit_method(BaseMeritMethod::NumBonusInst)
        .merit_bonus_effect(1)
        .fitness_valley(true)
        .fitness_valley_start(3)
        .fitness_valley_stop(3)
        .build();
    let model = MeritModel::new(&settings);

    assert_eq!(model.base_merit(&stats()), 1);
    let outside = SizeStats {
        bonus_instruction_count: 4,
        ..stats()
    };
    assert_eq!(model.base_merit(&outside), 5);
}

#[test]
fn test_penalty_never_underflows() {
    let settings = RunSettings::builder()
        .base_merit_method(BaseMeritMethod::NumBonusInst)
        .merit_bonus_effect(-3)
        .build();
    let heavy = SizeStats {
        bonus_instruction_count: 50,
        ..stats()
    };
    assert_eq!(MeritModel::new(&settings).base_merit(&heavy), 0);
}

#[rstest]
#[case(SizeStats { genome_length: 0, ..stats() })]
#[case(SizeStats { copied_size: 0, ..stats() })]
#[case(SizeStats { executed_size: 0, ..stats() })]
#[should_panic(expected = "base merit with")]
fn test_zero_sizes_are_contract_violations(#[case] bad: SizeStats) {
    let settings = RunSettings::default();
    MeritModel::new(&settings).base_merit(&bad);
}

#[test]
fn test_normal_fitness() {
    let settings = RunSettings::default();
    let model = MeritModel::new(&settings);
    assert_eq!(model.fitness(20.0, 2.0, 10, 0), 4.0);
    assert_eq!(model.fitness(20.0, 2.0, 10, 123_456), 4.0);
}

#[test]
#[should_panic(expected = "zero gestation")]
fn test_normal_fitness_zero_gestation_panics() {
    let settings = RunSettings::default();
    MeritModel::new(&settings).fitness(20.0, 2.0, 0, 5);
}

#[test]
fn test_diminishing_returns_fitness() {
    let settings = RunSettings::builder()
        .fitness_method(FitnessMethod::DiminishingReturns)
        .fitness_coeff(0.5)
        .default_bonus(1.0)
        .build();
    let model = MeritModel::new(&settings);

    // net bonus 2 -> 2/3, decay 0.5^2
    let f = model.fitness(99.0, 3.0, 2, 0);
    assert!((f - (2.0 / 3.0) * 0.25).abs() < 1e-12, "got {}", f);

    // Zero gestation is fine here.
    let f0 = model.fitness(99.0, 3.0, 0, 0);
    assert!((f0 - 2.0 / 3.0).abs() < 1e-12, "got {}", f0);
}

#[rstest]
#[case(-1.0, 100, 50.0, 50.0)]
#[case(-1.0, 200, 50.0, 25.0)]
#[case(-1.0, 0, 50.0, 0.0)]
#[case(0.25, 100, 50.0, 25.0)]
fn test_energy_to_merit(
    #[case] fixed_rate: f64,
    #[case] cycles: u32,
    #[case] energy: f64,
    #[case] expected: f64,
) {
    let settings = RunSettings::builder()
        .fix_metabolic_rate(fixed_rate)
        .num_cycles_exc_before_0_energy(cycles)
        .build();
    assert_eq!(MeritModel::new(&settings).energy_to_merit(energy), expected);
}
