use crate::cmd::run::ReplicateOutcome;
use crate::cmd::schedule::SlotFrequency;
use comfy_table::presets::ASCII_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use evoforge::settings::RunSettings;

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn align_right(table: &mut Table, columns: std::ops::RangeInclusive<usize>) {
    for i in columns {
        if let Some(col) = table.column_mut(i) {
            col.set_cell_alignment(CellAlignment::Right);
        }
    }
}

pub fn print_replicate_summary(outcomes: &[ReplicateOutcome]) {
    let mut table = new_table();

    table.add_row(vec![
        Cell::new("Rep").add_attribute(Attribute::Bold),
        Cell::new("Seed"),
        Cell::new("Updates"),
        Cell::new("Orgs"),
        Cell::new("Births"),
        Cell::new("Merit").fg(Color::Cyan),
        Cell::new("Max Merit"),
        Cell::new("Fitness").fg(Color::Green),
        Cell::new("Gestation"),
        Cell::new("Generation").add_attribute(Attribute::Bold),
        Cell::new("Time"),
    ]);
    align_right(&mut table, 1..=10);

    let best_merit = outcomes
        .iter()
        .filter_map(|o| o.result.last())
        .map(|s| s.ave_merit)
        .fold(f64::NEG_INFINITY, f64::max);

    for o in outcomes {
        let Some(last) = o.result.last() else {
            table.add_row(vec![
                Cell::new(o.replicate).add_attribute(Attribute::Bold),
                Cell::new(o.seed),
                Cell::new("0").fg(Color::Red),
            ]);
            continue;
        };

        let total_births: usize = o.result.history.iter().map(|s| s.births).sum();
        let merit_cell = Cell::new(format!("{:.2}", last.ave_merit));
        let merit_cell = if last.ave_merit == best_merit {
            merit_cell.fg(Color::Green).add_attribute(Attribute::Bold)
        } else {
            merit_cell.fg(Color::Cyan)
        };

        table.add_row(vec![
            Cell::new(o.replicate).add_attribute(Attribute::Bold),
            Cell::new(o.seed),
            Cell::new(o.result.history.len()),
            Cell::new(last.num_organisms),
            Cell::new(total_births),
            merit_cell,
            Cell::new(format!("{:.2}", last.max_merit)),
            Cell::new(format!("{:.4}", last.ave_fitness)).fg(Color::Green),
            Cell::new(format!("{:.1}", last.ave_gestation)),
            Cell::new(format!("{:.2}", last.ave_generation)),
            Cell::new(format!("{:.2}s", o.result.elapsed.as_secs_f64())),
        ]);
    }
    println!("\n{}", table);
}

pub fn print_schedule_report(settings: &RunSettings, draws: usize, rows: &[SlotFrequency]) {
    println!(
        "\nScheduler: {} | {} slots | {} demes | {} draws",
        settings.slicing_method, settings.world_size, settings.num_demes, draws
    );

    let mut table = new_table();
    table.add_row(vec![
        Cell::new("Slot").add_attribute(Attribute::Bold),
        Cell::new("Merit"),
        Cell::new("Expected").fg(Color::Cyan),
        Cell::new("Observed"),
        Cell::new("Delta"),
    ]);
    align_right(&mut table, 1..=4);

    // Color bands are in standard errors of the observed share.
    let fmt_delta = |expected: f64, observed: f64| -> Cell {
        let delta = observed - expected;
        let sigma = (expected * (1.0 - expected) / draws.max(1) as f64).sqrt();
        let text = format!("{:+.5}", delta);
        if sigma == 0.0 || delta.abs() <= 2.0 * sigma {
            Cell::new(text).fg(Color::Green)
        } else if delta.abs() <= 4.0 * sigma {
            Cell::new(text).fg(Color::Yellow)
        } else {
            Cell::new(text).fg(Color::Red)
        }
    };

    for r in rows {
        table.add_row(vec![
            Cell::new(r.slot).add_attribute(Attribute::Bold),
            Cell::new(format!("{:.2}", r.merit)),
            Cell::new(format!("{:.5}", r.expected)).fg(Color::Cyan),
            Cell::new(format!("{:.5}", r.observed)),
            fmt_delta(r.expected, r.observed),
        ]);
    }
    println!("{}", table);
}
