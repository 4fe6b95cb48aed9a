//! `ftree analyze`: full minimal cut set analysis of one top event.
//!
//! JSON output is the engine's [`AnalysisResult`] unchanged, so the same
//! camelCase document the library produces reaches scripts.

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use ftree_core::{AnalysisResult, CutSetSummary, FaultTreeAnalyzer, format_probability};
use tracing::info;

use super::{CommandContext, load_snapshot};
use crate::output::{pretty_kv, pretty_section, render_mode};

/// Arguments for `ftree analyze`.
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Snapshot JSON file (`-` for stdin).
    pub snapshot: PathBuf,

    /// Analyse this node instead of the detected top event.
    #[arg(long)]
    pub root: Option<String>,
}

/// Execute `ftree analyze`.
///
/// # Errors
///
/// Fails when the snapshot cannot be loaded or the configured cut-set
/// limit is exceeded.
pub fn run_analyze(args: &AnalyzeArgs, ctx: &CommandContext) -> Result<()> {
    let snapshot = load_snapshot(&args.snapshot)?;
    let hash = snapshot.content_hash();
    let analyzer = FaultTreeAnalyzer::from_snapshot(snapshot);

    let limits = ctx.config.analysis.limits();
    let result = analyzer.try_analysis_result(args.root.as_deref(), &limits)?;
    info!(snapshot = %hash, cut_sets = result.cut_set_count, "analysis complete");

    let summary = CutSetSummary::from_result(&result);
    let rows = ctx.config.report.importance_rows;
    render_mode(
        ctx.output,
        &result,
        |r, w| render_text(r, w),
        |r, w| render_pretty(r, &summary, &hash, rows, w),
    )
}

fn render_text(result: &AnalysisResult, w: &mut dyn Write) -> io::Result<()> {
    writeln!(
        w,
        "top_event\t{}",
        result.top_event_id.as_deref().unwrap_or("-")
    )?;
    writeln!(w, "top_event_probability\t{}", result.top_event_probability)?;
    writeln!(w, "cut_set_count\t{}", result.cut_set_count)?;
    for record in &result.minimal_cut_sets {
        writeln!(
            w,
            "cut_set\t{}\t{}",
            record.probability,
            record.event_names.join(",")
        )?;
    }
    for item in &result.structural_importance {
        writeln!(
            w,
            "importance\t{}\t{}\t{}",
            item.event_name, item.occurrences, item.structural_importance
        )?;
    }
    Ok(())
}

fn render_pretty(
    result: &AnalysisResult,
    summary: &CutSetSummary,
    hash: &str,
    importance_rows: usize,
    w: &mut dyn Write,
) -> io::Result<()> {
    let Some(top) = result.top_event_id.as_deref() else {
        writeln!(w, "No top event found: every node is the target of a connection.")?;
        return Ok(());
    };

    pretty_section(w, "Fault tree analysis")?;
    pretty_kv(w, "Top event", top)?;
    pretty_kv(
        w,
        "Probability",
        format_probability(Some(result.top_event_probability)),
    )?;
    pretty_kv(
        w,
        "Minimal cut sets",
        format!("{} (max order {})", result.cut_set_count, summary.max_order),
    )?;
    pretty_kv(w, "Snapshot", hash)?;
    writeln!(w)?;

    pretty_section(w, "Minimal cut sets")?;
    if result.minimal_cut_sets.is_empty() {
        writeln!(w, "  (none)")?;
    }
    for (i, (record, share)) in result
        .minimal_cut_sets
        .iter()
        .zip(&summary.contributions)
        .enumerate()
    {
        writeln!(
            w,
            "  {:>3}  {:<12} {:>6.2}%  {{{}}}",
            i + 1,
            format_probability(Some(record.probability)),
            share,
            record.event_names.join(", ")
        )?;
    }
    writeln!(w)?;

    if !summary.single_point_failures.is_empty() {
        pretty_section(w, "Single-point failures")?;
        for record in &summary.single_point_failures {
            writeln!(w, "  {}", record.event_names.join(", "))?;
        }
        writeln!(w)?;
    }

    if !result.structural_importance.is_empty() {
        pretty_section(w, "Structural importance")?;
        for item in result.structural_importance.iter().take(importance_rows) {
            writeln!(
                w,
                "  {:<16} {:>8.4}  in {}/{} cut sets",
                item.event_name, item.structural_importance, item.occurrences, item.total_cut_sets
            )?;
        }
        let hidden = result
            .structural_importance
            .len()
            .saturating_sub(importance_rows);
        if hidden > 0 {
            writeln!(w, "  ... {hidden} more (ftree importance)")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ftree_core::{Connection, Gate, Node};

    fn result() -> AnalysisResult {
        FaultTreeAnalyzer::new(
            vec![
                Node::gate("g1", Gate::Or),
                Node::basic_event("x1", "X1", 0.01),
                Node::basic_event("x2", "X2", 0.02),
            ],
            vec![Connection::new("g1", "x1"), Connection::new("g1", "x2")],
        )
        .get_analysis_result(None)
    }

    #[test]
    fn text_lists_cut_sets_most_probable_first() {
        let mut buf = Vec::new();
        render_text(&result(), &mut buf).expect("render");
        let text = String::from_utf8(buf).expect("utf8");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "top_event\tg1");
        assert_eq!(lines[2], "cut_set_count\t2");
        assert_eq!(lines[3], "cut_set\t0.02\tX2");
        assert_eq!(lines[4], "cut_set\t0.01\tX1");
    }

    #[test]
    fn pretty_truncates_importance_rows() {
        let result = result();
        let summary = CutSetSummary::from_result(&result);
        let mut buf = Vec::new();
        render_pretty(&result, &summary, "blake3:00", 1, &mut buf).expect("render");
        let text = String::from_utf8(buf).expect("utf8");
        assert!(text.contains("Single-point failures"));
        assert!(text.contains("... 1 more"));
    }

    #[test]
    fn pretty_without_top_event() {
        let result = FaultTreeAnalyzer::new(Vec::new(), Vec::new()).get_analysis_result(None);
        let summary = CutSetSummary::from_result(&result);
        let mut buf = Vec::new();
        render_pretty(&result, &summary, "blake3:00", 10, &mut buf).expect("render");
        assert!(String::from_utf8(buf).expect("utf8").starts_with("No top event"));
    }
}
