//! Human-readable output formatting.

use colored::Colorize;

use super::QueueStatus;
use crate::features::simulate::SimulationReport;
use crate::link::{PersistedEntry, Snapshot};

const RULE_WIDTH: usize = 60;

/// Format queue status for the terminal.
#[must_use]
pub fn format_status_pretty(status: &QueueStatus) -> String {
    let mut lines = Vec::new();

    lines.push(format!("Offline Queue ({})", status.store_key).bold().to_string());
    lines.push("─".repeat(40));

    lines.push(format!(
        "  Entries:    {} {}",
        status.entries,
        if status.entries > 0 {
            "waiting for replay".dimmed()
        } else {
            "".dimmed()
        }
    ));
    lines.push(format!("  Mutations:  {}", status.mutations));
    lines.push(format!("  Queries:    {}", status.queries));

    match &status.updated_at {
        Some(updated) => lines.push(format!("  Updated:    {}", updated.dimmed())),
        None => lines.push(format!("  Updated:    {}", "never written".dimmed())),
    }

    lines.join("\n")
}

/// Format persisted entries as a table.
#[must_use]
pub fn format_snapshot_pretty(store_key: &str, snapshot: &Snapshot, limit: usize) -> String {
    if snapshot.is_empty() {
        return format!("No operations persisted under {store_key}.");
    }

    let mut lines = Vec::new();
    lines.push(format!("Persisted Operations ({})", snapshot.len()).bold().to_string());
    lines.push("─".repeat(RULE_WIDTH));
    lines.push(format!("{:<4} {:<10} {:<24} {}", "#", "Kind", "Operation", "Variables"));
    lines.push("─".repeat(RULE_WIDTH));

    for (index, entry) in snapshot.entries().iter().take(limit).enumerate() {
        lines.push(entry_line(index + 1, entry));
    }

    if snapshot.len() > limit {
        lines.push(
            format!("… {} more", snapshot.len() - limit)
                .dimmed()
                .to_string(),
        );
    }

    lines.join("\n")
}

fn entry_line(position: usize, entry: &PersistedEntry) -> String {
    let kind = if entry.document.is_mutation() {
        "mutation".yellow()
    } else {
        "query".cyan()
    };
    let name = entry
        .document
        .document()
        .operation_name()
        .unwrap_or("<anonymous>");
    let variables = if entry.variables.is_empty() {
        "-".to_string()
    } else {
        entry.variables.keys().cloned().collect::<Vec<_>>().join(", ")
    };

    format!("{position:<4} {kind:<10} {name:<24} {}", variables.dimmed())
}

/// Format a simulation report.
#[must_use]
pub fn format_report_pretty(report: &SimulationReport) -> String {
    let mut lines = Vec::new();

    lines.push("Simulation".bold().to_string());
    lines.push("─".repeat(RULE_WIDTH));
    for step in &report.steps {
        lines.push(format!(
            "  {:>3}. {:<8} {} {}",
            step.step,
            step.action,
            step.detail,
            format!("[queue: {}]", step.queue_len).dimmed()
        ));
    }

    lines.push(String::new());
    if report.forwarded.is_empty() {
        lines.push(format!("Forwarded: {}", "nothing".dimmed()));
    } else {
        lines.push(format!("Forwarded: {}", report.forwarded.join(" → ").green()));
    }

    lines.push(String::new());
    lines.push("Tasks".bold().to_string());
    for task in &report.tasks {
        let state = match task.state.as_str() {
            "forwarding" => task.state.green(),
            "cancelled" => task.state.red(),
            _ => task.state.yellow(),
        };
        lines.push(format!(
            "  {:<16} {} {}",
            task.id,
            state,
            format!("({} notifications)", task.notifications).dimmed()
        ));
    }

    lines.push(String::new());
    lines.push(format_snapshot_pretty(&report.store_key, &report.persisted, usize::MAX));

    lines.join("\n")
}
