use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use los_common::format_metric;
use los_evaluate::Metrics;
use los_model::{PipelineReport, UnmappedValues};
use los_transform::DiagnosisFailure;

use crate::types::{EvaluateOutcome, PrepareOutcome};

/// Failures listed individually before the rest are summarized.
const MAX_LISTED_FAILURES: usize = 20;
/// Coefficients shown, largest magnitude first.
const MAX_LISTED_COEFFICIENTS: usize = 15;

pub fn print_prepare_summary(outcome: &PrepareOutcome) {
    println!("Output: {}", outcome.output.display());
    println!("Features: {} rows x {} columns", outcome.rows, outcome.columns);
    if let Some(path) = &outcome.report_path {
        println!("Stage report: {}", path.display());
    }
    if let Some(path) = &outcome.unmapped_path {
        println!("Unmapped values: {}", path.display());
    }
    println!("{}", stage_table(&outcome.report));
    if let Some(table) = unmapped_table(&outcome.report.unmapped) {
        println!();
        println!("Unmapped category values:");
        println!("{table}");
    }
}

fn stage_table(report: &PipelineReport) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Stage"),
        header_cell("Rows in"),
        header_cell("Rows out"),
        header_cell("Removed"),
        header_cell("Subjects in"),
        header_cell("Subjects out"),
        header_cell("ms"),
    ]);
    apply_summary_table_style(&mut table);
    for index in 1..=6 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    for stage in &report.stages {
        table.add_row(vec![
            Cell::new(stage.stage.name())
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(stage.rows_in),
            Cell::new(stage.rows_out),
            count_cell(stage.rows_removed(), Color::Yellow),
            Cell::new(stage.subjects_in),
            Cell::new(stage.subjects_out),
            dim_cell(stage.duration_ms),
        ]);
    }
    table
}

fn unmapped_table(unmapped: &UnmappedValues) -> Option<Table> {
    if unmapped.is_empty() {
        return None;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Column"),
        header_cell("Value"),
        header_cell("Count"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    for (column, values) in unmapped {
        for (value, count) in values {
            table.add_row(vec![
                Cell::new(column),
                Cell::new(value),
                count_cell(*count, Color::Yellow),
            ]);
        }
    }
    Some(table)
}

pub fn print_evaluation_summary(outcome: &EvaluateOutcome) {
    let evaluation = &outcome.evaluation;
    println!("Target: {}", evaluation.model.target);
    if let Some(path) = &outcome.model_path {
        println!("Model: {}", path.display());
    }
    if !evaluation.dropped_features.is_empty() {
        println!(
            "Features left out of the fit: {}",
            evaluation.dropped_features.join(", ")
        );
    }
    if let Some(cv) = outcome
        .cross_validation
        .as_ref()
        .filter(|cv| !cv.excluded_features.is_empty())
    {
        let names: Vec<&str> = cv.excluded_features.iter().map(String::as_str).collect();
        println!("Left out of some folds: {}", names.join(", "));
    }

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Partition"),
        header_cell("Rows"),
        header_cell("R²"),
        header_cell("RMSE"),
        header_cell("MAE"),
    ]);
    apply_summary_table_style(&mut table);
    for index in 1..=4 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    table.add_row(metric_row(
        "train",
        Cell::new(evaluation.train_rows),
        evaluation.train(),
    ));
    table.add_row(metric_row(
        "test",
        Cell::new(evaluation.test_rows),
        evaluation.test(),
    ));
    if let Some(cv) = &outcome.cross_validation {
        table.add_row(metric_row(
            &format!("cv mean ({} folds)", cv.folds.len()),
            dim_cell("-"),
            cv.mean,
        ));
        table.add_row(metric_row("cv std dev", dim_cell("-"), cv.std_dev));
    }
    println!("{table}");
    println!("{}", coefficient_table(outcome));
}

fn metric_row(label: &str, rows: Cell, metrics: Metrics) -> Vec<Cell> {
    vec![
        Cell::new(label).add_attribute(Attribute::Bold),
        rows,
        Cell::new(format_metric(metrics.r2, 4)),
        Cell::new(format_metric(metrics.rmse, 4)),
        Cell::new(format_metric(metrics.mae, 4)),
    ]
}

fn coefficient_table(outcome: &EvaluateOutcome) -> Table {
    let model = &outcome.evaluation.model;
    let mut coefficients: Vec<(&String, f64)> = model
        .coefficients
        .iter()
        .map(|(name, value)| (name, *value))
        .collect();
    coefficients.sort_by(|a, b| b.1.abs().total_cmp(&a.1.abs()).then_with(|| a.0.cmp(b.0)));

    let mut table = Table::new();
    table.set_header(vec![header_cell("Feature"), header_cell("Coefficient")]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    table.add_row(vec![
        dim_cell("(intercept)"),
        Cell::new(format_metric(model.intercept, 4)),
    ]);
    for (name, value) in coefficients.iter().take(MAX_LISTED_COEFFICIENTS) {
        table.add_row(vec![Cell::new(name), Cell::new(format_metric(*value, 4))]);
    }
    if coefficients.len() > MAX_LISTED_COEFFICIENTS {
        table.add_row(vec![
            dim_cell(format!(
                "... {} more",
                coefficients.len() - MAX_LISTED_COEFFICIENTS
            )),
            dim_cell(""),
        ]);
    }
    table
}

pub fn print_diagnosis_failures(failures: &[DiagnosisFailure]) {
    for failure in failures.iter().take(MAX_LISTED_FAILURES) {
        eprintln!("- {failure}");
    }
    if failures.len() > MAX_LISTED_FAILURES {
        eprintln!(
            "... and {} more ({} total)",
            failures.len() - MAX_LISTED_FAILURES,
            failures.len()
        );
    }
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

pub fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

pub fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
