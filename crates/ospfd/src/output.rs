//! Human-readable rendering of summaries and cycle reports.

use std::fmt::Write;

use ospf_cost::CostSummary;
use ospf_optimizer::CycleReport;

const RULE: &str = "------------------------------------------------------------";

pub fn format_summary(summary: &CostSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Links monitored:   {}", summary.total_links);
    let _ = writeln!(out, "Links to update:   {}", summary.links_to_update);
    let _ = writeln!(out, "Links stable:      {}", summary.links_stable);
    let _ = writeln!(out, "{RULE}");

    if summary.updates.is_empty() {
        let _ = writeln!(out, "No changes needed");
    } else {
        let _ = writeln!(out, "Proposed changes:");
        for update in &summary.updates {
            let _ = writeln!(out, "  {}: {} -> {}", update.link, update.current, update.new);
            let _ = writeln!(out, "    reason: {}", update.reason);
        }
    }

    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "Link status:");
    for record in &summary.all_results {
        let marker = if record.will_update { '*' } else { ' ' };
        let m = &record.metrics;
        let _ = writeln!(
            out,
            "  {marker} {}: cost {} -> {} | bw {:.1}% | latency {:.1}ms | loss {:.2}%",
            record.link,
            record.current,
            record.calculated,
            m.bandwidth_utilization,
            m.latency_ms,
            m.packet_loss_percent
        );
    }
    out
}

pub fn format_report(report: &CycleReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Cycle ({} strategy{}) finished in {:.2}s",
        report.strategy,
        if report.dry_run { ", dry run" } else { "" },
        report.duration_seconds
    );
    let _ = writeln!(
        out,
        "Changes applied: {}  failed: {}",
        report.changes_applied, report.failed_changes
    );
    let _ = writeln!(out, "{RULE}");
    out.push_str(&format_summary(&report.summary));
    out
}
