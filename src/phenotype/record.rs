use super::flags::{DonorFlags, DonorKind, FlagPair, ReceiverFlags, ReceiverKind};
use super::stats::GenerationStats;
use super::{LifeState, Phenotype};
use crate::config::EnvironmentShape;
use crate::error::{EvoError, EvoResult};
use crate::settings::RunSettings;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use strum::EnumCount;

/// Every persisted phenotype field.
///
/// Field order here is the flat record order: divide-locked values, current
/// counters, last counters, life records, flags, child info. Donor and
/// receiver flags are written as `(last, cur)` pairs in category order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhenotypeRecord {
    pub merit: f64,
    pub genome_length: usize,
    pub copied_size: usize,
    pub executed_size: usize,
    pub gestation_time: u64,
    pub gestation_start: u64,
    pub fitness: f64,
    pub div_type: f64,

    pub cur_bonus: f64,
    pub cur_num_errors: u32,
    pub cur_num_donates: u32,
    pub cur_task_count: Vec<u32>,
    pub cur_reaction_count: Vec<u32>,
    pub cur_inst_count: Vec<u32>,

    pub last_merit_base: f64,
    pub last_bonus: f64,
    pub last_num_errors: u32,
    pub last_num_donates: u32,
    pub last_task_count: Vec<u32>,
    pub last_reaction_count: Vec<u32>,
    pub last_inst_count: Vec<u32>,

    pub num_divides: u32,
    pub generation: u32,
    pub cpu_cycles_used: u64,
    pub time_used: u64,
    pub age: u64,
    pub neutral_metric: f64,
    pub life_fitness: f64,

    pub is_injected: bool,
    pub donor: Vec<FlagPair>,
    pub num_thresh_gb_donations_last: u32,
    pub num_thresh_gb_donations: u32,
    pub num_quanta_thresh_gb_donations_last: u32,
    pub num_quanta_thresh_gb_donations: u32,
    pub receiver: Vec<FlagPair>,
    pub is_modifier: bool,
    pub is_modified: bool,
    pub is_fertile: bool,
    pub is_mutated: bool,
    pub parent_true: bool,
    pub parent_sex: bool,
    pub parent_cross_num: u32,

    pub copy_true: bool,
    pub divide_sex: bool,
    pub mate_select_id: i32,
    pub cross_num: u32,
    pub child_fertile: bool,
    pub last_child_fertile: bool,
}

impl PhenotypeRecord {
    /// Number of values `to_flat` emits for a given environment.
    pub fn flat_len(shape: &EnvironmentShape) -> usize {
        let per_gen = shape.num_tasks + shape.num_reactions + shape.num_instructions;
        8 + (3 + per_gen)
            + (4 + per_gen)
            + 7
            + 1
            + 2 * DonorKind::COUNT
            + 4
            + 2 * ReceiverKind::COUNT
            + 7
            + 6
    }

    pub fn to_flat(&self) -> Vec<f64> {
        let mut out = Vec::with_capacity(64);
        let b = |v: bool| if v { 1.0 } else { 0.0 };

        out.extend([
            self.merit,
            self.genome_length as f64,
            self.copied_size as f64,
            self.executed_size as f64,
            self.gestation_time as f64,
            self.gestation_start as f64,
            self.fitness,
            self.div_type,
        ]);

        out.extend([
            self.cur_bonus,
            self.cur_num_errors as f64,
            self.cur_num_donates as f64,
        ]);
        out.extend(self.cur_task_count.iter().map(|&c| c as f64));
        out.extend(self.cur_reaction_count.iter().map(|&c| c as f64));
        out.extend(self.cur_inst_count.iter().map(|&c| c as f64));

        out.extend([
            self.last_merit_base,
            self.last_bonus,
            self.last_num_errors as f64,
            self.last_num_donates as f64,
        ]);
        out.extend(self.last_task_count.iter().map(|&c| c as f64));
        out.extend(self.last_reaction_count.iter().map(|&c| c as f64));
        out.extend(self.last_inst_count.iter().map(|&c| c as f64));

        out.extend([
            self.num_divides as f64,
            self.generation as f64,
            self.cpu_cycles_used as f64,
            self.time_used as f64,
            self.age as f64,
            self.neutral_metric,
            self.life_fitness,
        ]);

        out.push(b(self.is_injected));
        for pair in &self.donor {
            out.extend([b(pair.last), b(pair.cur)]);
        }
        out.extend([
            self.num_thresh_gb_donations_last as f64,
            self.num_thresh_gb_donations as f64,
            self.num_quanta_thresh_gb_donations_last as f64,
            self.num_quanta_thresh_gb_donations as f64,
        ]);
        for pair in &self.receiver {
            out.extend([b(pair.last), b(pair.cur)]);
        }
        out.extend([
            b(self.is_modifier),
            b(self.is_modified),
            b(self.is_fertile),
            b(self.is_mutated),
            b(self.parent_true),
            b(self.parent_sex),
            self.parent_cross_num as f64,
        ]);

        out.extend([
            b(self.copy_true),
            b(self.divide_sex),
            self.mate_select_id as f64,
            self.cross_num as f64,
            b(self.child_fertile),
            b(self.last_child_fertile),
        ]);

        out
    }

    /// Reads back a record written by [`to_flat`](Self::to_flat) for the
    /// same environment shape.
    pub fn from_flat(values: &[f64], shape: &EnvironmentShape) -> EvoResult<Self> {
        let expected = Self::flat_len(shape);
        if values.len() != expected {
            return Err(EvoError::Record(format!(
                "expected {} values, found {}",
                expected,
                values.len()
            )));
        }

        let mut r = FlatReader { values, pos: 0 };

        let merit = r.real("merit")?;
        let genome_length = r.count("genome_length")? as usize;
        let copied_size = r.count("copied_size")? as usize;
        let executed_size = r.count("executed_size")? as usize;
        let gestation_time = r.count("gestation_time")?;
        let gestation_start = r.count("gestation_start")?;
        let fitness = r.real("fitness")?;
        let div_type = r.real("div_type")?;

        let cur_bonus = r.real("cur_bonus")?;
        let cur_num_errors = r.small("cur_num_errors")?;
        let cur_num_donates = r.small("cur_num_donates")?;
        let cur_task_count = r.smalls(shape.num_tasks, "cur_task_count")?;
        let cur_reaction_count = r.smalls(shape.num_reactions, "cur_reaction_count")?;
        let cur_inst_count = r.smalls(shape.num_instructions, "cur_inst_count")?;

        let last_merit_base = r.real("last_merit_base")?;
        let last_bonus = r.real("last_bonus")?;
        let last_num_errors = r.small("last_num_errors")?;
        let last_num_donates = r.small("last_num_donates")?;
        let last_task_count = r.smalls(shape.num_tasks, "last_task_count")?;
        let last_reaction_count = r.smalls(shape.num_reactions, "last_reaction_count")?;
        let last_inst_count = r.smalls(shape.num_instructions, "last_inst_count")?;

        let num_divides = r.small("num_divides")?;
        let generation = r.small("generation")?;
        let cpu_cycles_used = r.count("cpu_cycles_used")?;
        let time_used = r.count("time_used")?;
        let age = r.count("age")?;
        let neutral_metric = r.real("neutral_metric")?;
        let life_fitness = r.real("life_fitness")?;

        let is_injected = r.flag("is_injected")?;
        let donor = r.pairs(DonorKind::COUNT, "donor")?;
        let num_thresh_gb_donations_last = r.small("num_thresh_gb_donations_last")?;
        let num_thresh_gb_donations = r.small("num_thresh_gb_donations")?;
        let num_quanta_thresh_gb_donations_last = r.small("num_quanta_thresh_gb_donations_last")?;
        let num_quanta_thresh_gb_donations = r.small("num_quanta_thresh_gb_donations")?;
        let receiver = r.pairs(ReceiverKind::COUNT, "receiver")?;
        let is_modifier = r.flag("is_modifier")?;
        let is_modified = r.flag("is_modified")?;
        let is_fertile = r.flag("is_fertile")?;
        let is_mutated = r.flag("is_mutated")?;
        let parent_true = r.flag("parent_true")?;
        let parent_sex = r.flag("parent_sex")?;
        let parent_cross_num = r.small("parent_cross_num")?;

        let copy_true = r.flag("copy_true")?;
        let divide_sex = r.flag("divide_sex")?;
        let mate_select_id = r.signed("mate_select_id")?;
        let cross_num = r.small("cross_num")?;
        let child_fertile = r.flag("child_fertile")?;
        let last_child_fertile = r.flag("last_child_fertile")?;

        Ok(Self {
            merit,
            genome_length,
            copied_size,
            executed_size,
            gestation_time,
            gestation_start,
            fitness,
            div_type,
            cur_bonus,
            cur_num_errors,
            cur_num_donates,
            cur_task_count,
            cur_reaction_count,
            cur_inst_count,
            last_merit_base,
            last_bonus,
            last_num_errors,
            last_num_donates,
            last_task_count,
            last_reaction_count,
            last_inst_count,
            num_divides,
            generation,
            cpu_cycles_used,
            time_used,
            age,
            neutral_metric,
            life_fitness,
            is_injected,
            donor,
            num_thresh_gb_donations_last,
            num_thresh_gb_donations,
            num_quanta_thresh_gb_donations_last,
            num_quanta_thresh_gb_donations,
            receiver,
            is_modifier,
            is_modified,
            is_fertile,
            is_mutated,
            parent_true,
            parent_sex,
            parent_cross_num,
            copy_true,
            divide_sex,
            mate_select_id,
            cross_num,
            child_fertile,
            last_child_fertile,
        })
    }
}

struct FlatReader<'a> {
    values: &'a [f64],
    pos: usize,
}

impl FlatReader<'_> {
    fn real(&mut self, field: &str) -> EvoResult<f64> {
        let v = *self.values.get(self.pos).ok_or_else(|| {
            EvoError::Record(format!("record ends before field '{}'", field))
        })?;
        self.pos += 1;
        if !v.is_finite() {
            return Err(EvoError::Record(format!("field '{}' is not finite: {}", field, v)));
        }
        Ok(v)
    }

    fn count(&mut self, field: &str) -> EvoResult<u64> {
        let v = self.real(field)?;
        if v < 0.0 || v.fract() != 0.0 || v > u64::MAX as f64 {
            return Err(EvoError::Record(format!(
                "field '{}' must be a non-negative integer, found {}",
                field, v
            )));
        }
        Ok(v as u64)
    }

    fn small(&mut self, field: &str) -> EvoResult<u32> {
        let v = self.count(field)?;
        u32::try_from(v).map_err(|_| EvoError::Record(format!("field '{}' overflows: {}", field, v)))
    }

    fn signed(&mut self, field: &str) -> EvoResult<i32> {
        let v = self.real(field)?;
        if v.fract() != 0.0 || v < i32::MIN as f64 || v > i32::MAX as f64 {
            return Err(EvoError::Record(format!(
                "field '{}' must be an integer, found {}",
                field, v
            )));
        }
        Ok(v as i32)
    }

    fn flag(&mut self, field: &str) -> EvoResult<bool> {
        let v = self.real(field)?;
        if v == 0.0 {
            Ok(false)
        } else if v == 1.0 {
            Ok(true)
        } else {
            Err(EvoError::Record(format!(
                "field '{}' must be 0 or 1, found {}",
                field, v
            )))
        }
    }

    fn smalls(&mut self, n: usize, field: &str) -> EvoResult<Vec<u32>> {
        (0..n).map(|_| self.small(field)).collect()
    }

    fn pairs(&mut self, n: usize, field: &str) -> EvoResult<Vec<FlagPair>> {
        (0..n)
            .map(|_| {
                let last = self.flag(field)?;
                let cur = self.flag(field)?;
                Ok(FlagPair { cur, last })
            })
            .collect()
    }
}

fn check_len<T>(v: &[T], expected: usize, field: &str) -> EvoResult<()> {
    if v.len() != expected {
        return Err(EvoError::Record(format!(
            "field '{}' has {} entries, environment expects {}",
            field,
            v.len(),
            expected
        )));
    }
    Ok(())
}

impl Phenotype {
    pub fn snapshot(&self) -> PhenotypeRecord {
        PhenotypeRecord {
            merit: self.merit,
            genome_length: self.genome_length,
            copied_size: self.copied_size,
            executed_size: self.executed_size,
            gestation_time: self.gestation_time,
            gestation_start: self.gestation_start,
            fitness: self.fitness,
            div_type: self.div_type,

            cur_bonus: self.cur.bonus,
            cur_num_errors: self.cur.num_errors,
            cur_num_donates: self.cur.num_donates,
            cur_task_count: self.cur.task_count.clone(),
            cur_reaction_count: self.cur.reaction_count.clone(),
            cur_inst_count: self.cur.inst_count.clone(),

            last_merit_base: self.last_merit_base,
            last_bonus: self.last.bonus,
            last_num_errors: self.last.num_errors,
            last_num_donates: self.last.num_donates,
            last_task_count: self.last.task_count.clone(),
            last_reaction_count: self.last.reaction_count.clone(),
            last_inst_count: self.last.inst_count.clone(),

            num_divides: self.num_divides,
            generation: self.generation,
            cpu_cycles_used: self.cur.cpu_cycles,
            time_used: self.time_used,
            age: self.age,
            neutral_metric: self.neutral_metric,
            life_fitness: self.life_fitness,

            is_injected: self.is_injected,
            donor: self.donor.pairs().to_vec(),
            num_thresh_gb_donations_last: self.num_thresh_gb_donations_last,
            num_thresh_gb_donations: self.num_thresh_gb_donations,
            num_quanta_thresh_gb_donations_last: self.num_quanta_thresh_gb_donations_last,
            num_quanta_thresh_gb_donations: self.num_quanta_thresh_gb_donations,
            receiver: self.receiver.pairs().to_vec(),
            is_modifier: self.is_modifier,
            is_modified: self.is_modified,
            is_fertile: self.is_fertile,
            is_mutated: self.is_mutated,
            parent_true: self.parent_true,
            parent_sex: self.parent_sex,
            parent_cross_num: self.parent_cross_num,

            copy_true: self.copy_true,
            divide_sex: self.divide_sex,
            mate_select_id: self.mate_select_id,
            cross_num: self.cross_num,
            child_fertile: self.child_fertile,
            last_child_fertile: self.last_child_fertile,
        }
    }

    /// Rebuilds an active phenotype from a record. Fields the record does
    /// not carry (task quality, energy, trial history) start fresh.
    pub fn restore(settings: Arc<RunSettings>, rec: &PhenotypeRecord) -> EvoResult<Self> {
        let shape = settings.shape;
        check_len(&rec.cur_task_count, shape.num_tasks, "cur_task_count")?;
        check_len(&rec.cur_reaction_count, shape.num_reactions, "cur_reaction_count")?;
        check_len(&rec.cur_inst_count, shape.num_instructions, "cur_inst_count")?;
        check_len(&rec.last_task_count, shape.num_tasks, "last_task_count")?;
        check_len(&rec.last_reaction_count, shape.num_reactions, "last_reaction_count")?;
        check_len(&rec.last_inst_count, shape.num_instructions, "last_inst_count")?;

        let donor = DonorFlags::from_pairs(&rec.donor).ok_or_else(|| {
            EvoError::Record(format!(
                "expected {} donor flag pairs, found {}",
                DonorKind::COUNT,
                rec.donor.len()
            ))
        })?;
        let receiver = ReceiverFlags::from_pairs(&rec.receiver).ok_or_else(|| {
            EvoError::Record(format!(
                "expected {} receiver flag pairs, found {}",
                ReceiverKind::COUNT,
                rec.receiver.len()
            ))
        })?;

        let mut p = Phenotype::new(settings);

        p.merit = rec.merit;
        p.genome_length = rec.genome_length;
        p.copied_size = rec.copied_size;
        p.executed_size = rec.executed_size;
        p.gestation_time = rec.gestation_time;
        p.gestation_start = rec.gestation_start;
        p.fitness = rec.fitness;
        p.div_type = rec.div_type;

        p.cur = GenerationStats {
            bonus: rec.cur_bonus,
            cpu_cycles: rec.cpu_cycles_used,
            num_errors: rec.cur_num_errors,
            num_donates: rec.cur_num_donates,
            task_count: rec.cur_task_count.clone(),
            reaction_count: rec.cur_reaction_count.clone(),
            inst_count: rec.cur_inst_count.clone(),
            ..GenerationStats::fresh(&shape, rec.cur_bonus)
        };
        p.last = GenerationStats {
            bonus: rec.last_bonus,
            num_errors: rec.last_num_errors,
            num_donates: rec.last_num_donates,
            task_count: rec.last_task_count.clone(),
            reaction_count: rec.last_reaction_count.clone(),
            inst_count: rec.last_inst_count.clone(),
            ..GenerationStats::fresh(&shape, rec.last_bonus)
        };
        p.last_merit_base = rec.last_merit_base;

        p.num_divides = rec.num_divides;
        p.generation = rec.generation;
        p.time_used = rec.time_used;
        p.age = rec.age;
        p.neutral_metric = rec.neutral_metric;
        p.life_fitness = rec.life_fitness;

        p.is_injected = rec.is_injected;
        p.donor = donor;
        p.receiver = receiver;
        p.num_thresh_gb_donations_last = rec.num_thresh_gb_donations_last;
        p.num_thresh_gb_donations = rec.num_thresh_gb_donations;
        p.num_quanta_thresh_gb_donations_last = rec.num_quanta_thresh_gb_donations_last;
        p.num_quanta_thresh_gb_donations = rec.num_quanta_thresh_gb_donations;
        p.is_modifier = rec.is_modifier;
        p.is_modified = rec.is_modified;
        p.is_fertile = rec.is_fertile;
        p.is_mutated = rec.is_mutated;
        p.parent_true = rec.parent_true;
        p.parent_sex = rec.parent_sex;
        p.parent_cross_num = rec.parent_cross_num;

        p.copy_true = rec.copy_true;
        p.divide_sex = rec.divide_sex;
        p.mate_select_id = rec.mate_select_id;
        p.cross_num = rec.cross_num;
        p.child_fertile = rec.child_fertile;
        p.last_child_fertile = rec.last_child_fertile;

        p.state = LifeState::Active;
        Ok(p)
    }
}
