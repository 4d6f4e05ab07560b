use crate::engine::StatusReport;
use crate::engine::history::CleanLogEntry;
use crate::engine::reclaim::CleanResult;
use crate::engine::sampler::MemorySnapshot;

pub const EMPTY_HISTORY: &str = "No clean records yet";

/// One-line summary, the tray tooltip text.
pub fn tooltip(snapshot: &MemorySnapshot) -> String {
    format!(
        "Memory: {}/{} GB ({}%)",
        snapshot.used_gb(),
        snapshot.total_gb(),
        snapshot.percent_used()
    )
}

pub fn status_block(report: &StatusReport) -> String {
    let snap = &report.snapshot;
    let mut out = String::from("=== Memory status ===\n");
    out.push_str(&format!(
        "Used: {} GB / {} GB ({}%)\n",
        snap.used_gb(),
        snap.total_gb(),
        snap.percent_used()
    ));
    out.push_str(&format!("Available: {} GB\n", snap.available_gb()));
    out.push_str(&format!("Level: {}", report.color.as_str()));
    if report.over_warning {
        out.push_str(" (above warning threshold)");
    }
    out.push('\n');
    out
}

/// Newest first, as the status panel lists them.
pub fn history_lines(entries: &[CleanLogEntry]) -> Vec<String> {
    if entries.is_empty() {
        return vec![EMPTY_HISTORY.to_string()];
    }
    entries.iter().rev().map(CleanLogEntry::display_line).collect()
}

pub fn clean_summary(result: &CleanResult) -> String {
    if result.success {
        format!(
            "Clean succeeded: freed {} GB ({}% -> {}%)",
            result.freed_gb,
            result.before.percent_used(),
            result.after.percent_used()
        )
    } else {
        format!(
            "Clean failed: {}",
            result.error.as_deref().unwrap_or("unknown error")
        )
    }
}
