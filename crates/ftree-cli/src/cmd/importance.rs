//! `ftree importance`: structural importance ranking of basic events.

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use ftree_core::{FaultTreeAnalyzer, StructuralImportance};

use super::{CommandContext, load_snapshot};
use crate::output::{pretty_section, render_mode};

/// Arguments for `ftree importance`.
#[derive(Args, Debug)]
pub struct ImportanceArgs {
    /// Snapshot JSON file (`-` for stdin).
    pub snapshot: PathBuf,

    /// Analyse this node instead of the detected top event.
    #[arg(long)]
    pub root: Option<String>,

    /// Show at most this many events (default: all).
    #[arg(long)]
    pub limit: Option<usize>,
}

/// Execute `ftree importance`.
///
/// # Errors
///
/// Fails when the snapshot cannot be loaded or the configured cut-set
/// limit is exceeded.
pub fn run_importance(args: &ImportanceArgs, ctx: &CommandContext) -> Result<()> {
    let analyzer = FaultTreeAnalyzer::from_snapshot(load_snapshot(&args.snapshot)?);
    let minimal =
        analyzer.try_minimal_cut_sets(args.root.as_deref(), &ctx.config.analysis.limits())?;

    let mut ranking = analyzer.calculate_structural_importance(&minimal);
    if let Some(limit) = args.limit {
        ranking.truncate(limit);
    }

    render_mode(ctx.output, &ranking, |r, w| render_text(r, w), |r, w| render_pretty(r, w))
}

fn render_text(ranking: &[StructuralImportance], w: &mut dyn Write) -> io::Result<()> {
    for item in ranking {
        writeln!(
            w,
            "{}\t{}\t{}\t{}/{}",
            item.event_id,
            item.structural_importance,
            item.event_type.as_str(),
            item.occurrences,
            item.total_cut_sets
        )?;
    }
    Ok(())
}

fn render_pretty(ranking: &[StructuralImportance], w: &mut dyn Write) -> io::Result<()> {
    pretty_section(w, "Structural importance")?;
    if ranking.is_empty() {
        writeln!(w, "  (no minimal cut sets)")?;
    }
    for (rank, item) in ranking.iter().enumerate() {
        writeln!(
            w,
            "  {:>3}. {:<16} {:>8.4}  {:<11} in {}/{} cut sets",
            rank + 1,
            item.event_name,
            item.structural_importance,
            item.event_type.as_str(),
            item.occurrences,
            item.total_cut_sets
        )?;
    }
    Ok(())
}
