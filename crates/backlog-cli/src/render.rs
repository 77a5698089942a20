//! Human-readable output

use crate::commands::{EntityValidation, PlanRow};
use backlog_model::{FeedbackItem, FullImportResult, PhaseName};
use std::fmt::Write;

/// Text report of an import
#[must_use]
pub fn import_text(result: &FullImportResult) -> String {
    let mut out = String::new();
    let status = if result.success { "OK" } else { "FAILED" };
    let _ = writeln!(out, "Import: {status}");

    if let Some(summary) = &result.summary {
        let _ = writeln!(out, "  Project: {} ({})", summary.project_name, summary.project_code);
        let _ = writeln!(out, "  Sprints: {}", summary.sprints);
        let _ = writeln!(out, "  Epics:   {}", summary.epics);
        let _ = writeln!(out, "  Stories: {}", summary.stories);
        let _ = writeln!(out, "  Tasks:   {}", summary.tasks);
    }
    if let Some(phase) = result.failed_phase {
        let _ = writeln!(out, "  Failed phase: {phase}");
        let _ = writeln!(out, "  Rolled back: {}", result.rolled_back);
    }

    let _ = writeln!(out, "\nPhases:");
    for phase in PhaseName::ORDER {
        if let Some(report) = result.phase(phase) {
            let mark = if report.success { "ok" } else { "FAILED" };
            let _ = writeln!(
                out,
                "  {:<20} {mark:<7} {:>6}ms",
                phase.as_str(),
                report.elapsed_ms
            );
        }
    }

    write_items(&mut out, "Errors", &result.feedback.errors);
    write_items(&mut out, "Warnings", &result.feedback.warnings);
    if !result.feedback.completions.is_empty() {
        let _ = writeln!(out, "\nCompletions:");
        for c in &result.feedback.completions {
            let _ = writeln!(out, "  {}.{} = {} ({})", c.entity, c.field, c.value, c.reason);
        }
    }
    out
}

fn write_items(out: &mut String, title: &str, items: &[FeedbackItem]) {
    if items.is_empty() {
        return;
    }
    let _ = writeln!(out, "\n{title}:");
    for item in items {
        let phase = item.phase.map(|p| p.as_str()).unwrap_or("-");
        let _ = writeln!(out, "  [{:?}] {phase}: {}", item.kind, item.message);
    }
}

/// Text table of a sprint plan
#[must_use]
pub fn plan_text(rows: &[PlanRow]) -> String {
    let mut out = String::new();
    for row in rows {
        let _ = writeln!(
            out,
            "{:>2}. {} [{} .. {}] {}w cap {} {:?}",
            row.sequence, row.name, row.start_date, row.end_date, row.weeks, row.capacity, row.status
        );
        let _ = writeln!(out, "    {}", row.goal);
    }
    out
}

/// Text report of a validation run
#[must_use]
pub fn validation_text(outcome: &[EntityValidation]) -> String {
    let mut out = String::new();
    for entity in outcome {
        let _ = writeln!(out, "{}: {}/{} valid", entity.entity, entity.valid, entity.total);
        for error in &entity.errors {
            let _ = writeln!(out, "  - {error}");
        }
    }
    out
}
