//! End-of-run report rendering
//!
//! Turns a `NetworkSnapshot` into numbered text pages. A new page starts as
//! soon as the current one has no room left for another node row. Writing
//! the pages anywhere is up to the caller.

use cnt_sim::{NetworkSnapshot, NodeId, NodeRow, SimResult};

pub const REPORT_TITLE: &str = "Cooperative Node Trust Simulator Report";

const COLUMN_HEADER: &str = "Node | Role      | Trust | Energy | Sent | Received | Dropped";

/// One rendered page
#[derive(Debug, Clone, PartialEq)]
pub struct ReportPage {
    pub number: usize,
    pub lines: Vec<String>,
}

fn format_row(row: &NodeRow) -> String {
    format!(
        "{:<4} | {:<9} | {:.2}  | {:>5.1}% | {:>4} | {:>8} | {}",
        row.node,
        row.role,
        row.trust,
        row.energy,
        row.packets_sent,
        row.packets_received,
        row.packets_dropped
    )
}

fn format_suspicious(snapshot: &NetworkSnapshot) -> String {
    if snapshot.suspicious.is_empty() {
        "None".to_string()
    } else {
        let ids: Vec<NodeId> = snapshot.suspicious.iter().copied().collect();
        format!("{:?}", ids)
    }
}

/// Render the report, at most `rows_per_page` node rows per page
pub fn render_report(snapshot: &NetworkSnapshot, rows_per_page: usize) -> Vec<ReportPage> {
    let rows_per_page = rows_per_page.max(1);
    let mut pages = Vec::new();

    let mut lines = vec![
        REPORT_TITLE.to_string(),
        String::new(),
        format!("Total Nodes: {}", snapshot.nodes.len()),
        format!("Steps Run: {}", snapshot.steps_run),
        String::new(),
        COLUMN_HEADER.to_string(),
    ];
    let mut rows_on_page = 0;

    for row in &snapshot.nodes {
        if rows_on_page == rows_per_page {
            pages.push(ReportPage {
                number: pages.len() + 1,
                lines: std::mem::take(&mut lines),
            });
            lines.push(COLUMN_HEADER.to_string());
            rows_on_page = 0;
        }
        lines.push(format_row(row));
        rows_on_page += 1;
    }

    lines.push(String::new());
    lines.push("Summary:".to_string());
    lines.push(format!(
        "Detected Suspicious Nodes: {}",
        format_suspicious(snapshot)
    ));
    lines.push(format!("Total Packets Sent: {}", snapshot.totals.sent));
    lines.push(format!("Total Packets Received: {}", snapshot.totals.received));
    lines.push(format!("Total Packets Dropped: {}", snapshot.totals.dropped));

    pages.push(ReportPage {
        number: pages.len() + 1,
        lines,
    });
    pages
}

/// Print a summary of the simulation results
pub fn print_summary(result: &SimResult) {
    let snapshot = &result.final_snapshot;

    println!("\n╔════════════════════════════════════════════════════════╗");
    println!("║        Trust Simulation Results                        ║");
    println!("╚════════════════════════════════════════════════════════╝\n");

    println!("Configuration:");
    println!("  Seed: {:?}", result.seed_used);
    println!("  Nodes: {}  Edges: {}", snapshot.nodes.len(), snapshot.edges.len());
    println!("  Steps: {} ({} outcomes, {} skipped)\n", result.steps_run, result.outcomes, result.skipped);

    println!("Packets:");
    println!("  Sent: {}", snapshot.totals.sent);
    println!("  Received: {}", snapshot.totals.received);
    println!("  Dropped: {}\n", snapshot.totals.dropped);

    println!("Detection:");
    println!("  {}", snapshot.status_line());
    println!(
        "  True positives: {}  False positives: {}  Missed: {}",
        result.detection.true_positives, result.detection.false_positives, result.detection.missed
    );
    println!(
        "  Precision: {:.2}  Recall: {:.2}",
        result.detection.precision, result.detection.recall
    );
    for (node, step) in &result.first_flagged {
        println!("  Node {} first flagged at step {}", node, step + 1);
    }
}
