//! `ftree check`: structural diagnostics for a snapshot.
//!
//! Reports problems that make analysis output misleading without failing
//! the analysis itself: several or zero top-event candidates, dangling
//! connections, duplicate ids and cycles. Exits non-zero with `--strict`
//! when the snapshot is not well formed.

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::Args;
use ftree_core::{SnapshotDiagnostics, diagnose};
use serde::Serialize;

use super::{CommandContext, load_snapshot};
use crate::output::{pretty_kv, pretty_section, render_mode};

/// Arguments for `ftree check`.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Snapshot JSON file (`-` for stdin).
    pub snapshot: PathBuf,

    /// Fail when the snapshot is not well formed.
    #[arg(long)]
    pub strict: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CheckReport {
    snapshot_hash: String,
    well_formed: bool,
    #[serde(flatten)]
    diagnostics: SnapshotDiagnostics,
}

/// Execute `ftree check`.
///
/// # Errors
///
/// Fails when the snapshot cannot be loaded, or with `--strict` when it
/// has structural problems.
pub fn run_check(args: &CheckArgs, ctx: &CommandContext) -> Result<()> {
    let snapshot = load_snapshot(&args.snapshot)?;
    let diagnostics = diagnose(&snapshot);
    let report = CheckReport {
        snapshot_hash: snapshot.content_hash(),
        well_formed: diagnostics.is_well_formed(),
        diagnostics,
    };

    render_mode(ctx.output, &report, |r, w| render_text(r, w), |r, w| render_pretty(r, w))?;

    if args.strict && !report.well_formed {
        bail!("snapshot {} is not well formed", args.snapshot.display());
    }
    Ok(())
}

fn render_text(report: &CheckReport, w: &mut dyn Write) -> io::Result<()> {
    let d = &report.diagnostics;
    writeln!(w, "well_formed\t{}", report.well_formed)?;
    writeln!(w, "nodes\t{}", d.node_count)?;
    writeln!(w, "connections\t{}", d.connection_count)?;
    writeln!(w, "basic_events\t{}", d.basic_event_count)?;
    writeln!(w, "top_event_candidates\t{}", d.top_event_candidates.join(","))?;
    writeln!(w, "dangling_endpoints\t{}", d.dangling_endpoints.join(","))?;
    writeln!(w, "duplicate_ids\t{}", d.duplicate_ids.join(","))?;
    for cycle in &d.cycles {
        writeln!(w, "cycle\t{}", cycle.join(","))?;
    }
    Ok(())
}

fn render_pretty(report: &CheckReport, w: &mut dyn Write) -> io::Result<()> {
    let d = &report.diagnostics;
    pretty_section(w, "Snapshot check")?;
    pretty_kv(w, "Snapshot", &report.snapshot_hash)?;
    pretty_kv(
        w,
        "Size",
        format!(
            "{} nodes, {} connections, {} basic events",
            d.node_count, d.connection_count, d.basic_event_count
        ),
    )?;

    match d.top_event_candidates.as_slice() {
        [] => pretty_kv(w, "Top event", "none (every node is a target)")?,
        [top] => pretty_kv(w, "Top event", top)?,
        [first, rest @ ..] => pretty_kv(
            w,
            "Top event",
            format!("{first} (ignoring {})", rest.join(", ")),
        )?,
    }
    if !d.dangling_endpoints.is_empty() {
        pretty_kv(w, "Dangling", d.dangling_endpoints.join(", "))?;
    }
    if !d.duplicate_ids.is_empty() {
        pretty_kv(w, "Duplicate ids", d.duplicate_ids.join(", "))?;
    }
    for cycle in &d.cycles {
        pretty_kv(w, "Cycle", cycle.join(" → "))?;
    }

    writeln!(w)?;
    if report.well_formed {
        writeln!(w, "✓ well formed")
    } else {
        writeln!(w, "✗ structural problems found")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ftree_core::{Connection, Gate, Node, Snapshot};

    #[test]
    fn json_flattens_diagnostics() {
        let snapshot = Snapshot::new(
            vec![Node::gate("g1", Gate::Or), Node::basic_event("x1", "X1", 0.1)],
            vec![Connection::new("g1", "x1"), Connection::new("g1", "ghost")],
        );
        let diagnostics = diagnose(&snapshot);
        let report = CheckReport {
            snapshot_hash: snapshot.content_hash(),
            well_formed: diagnostics.is_well_formed(),
            diagnostics,
        };
        let json = serde_json::to_value(&report).expect("serialize");
        assert_eq!(json["wellFormed"], false);
        assert_eq!(json["danglingEndpoints"][0], "ghost");
        assert_eq!(json["topEventCandidates"][0], "g1");
        assert!(
            json["snapshotHash"]
                .as_str()
                .is_some_and(|h| h.starts_with("blake3:"))
        );
    }
}
