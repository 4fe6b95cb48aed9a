//! `ftree cut-sets`: minimal cut sets only, most probable first.

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use ftree_core::{CutSetRecord, FaultTreeAnalyzer, format_probability};

use super::{CommandContext, load_snapshot};
use crate::output::{pretty_section, render_mode};

/// Arguments for `ftree cut-sets`.
#[derive(Args, Debug)]
pub struct CutSetsArgs {
    /// Snapshot JSON file (`-` for stdin).
    pub snapshot: PathBuf,

    /// Analyse this node instead of the detected top event.
    #[arg(long)]
    pub root: Option<String>,

    /// Only show cut sets of at most this many events.
    #[arg(long)]
    pub max_order: Option<usize>,
}

/// Execute `ftree cut-sets`.
///
/// # Errors
///
/// Fails when the snapshot cannot be loaded or the configured cut-set
/// limit is exceeded.
pub fn run_cut_sets(args: &CutSetsArgs, ctx: &CommandContext) -> Result<()> {
    let analyzer = FaultTreeAnalyzer::from_snapshot(load_snapshot(&args.snapshot)?);
    let result =
        analyzer.try_analysis_result(args.root.as_deref(), &ctx.config.analysis.limits())?;

    let records: Vec<CutSetRecord> = result
        .minimal_cut_sets
        .into_iter()
        .filter(|r| args.max_order.is_none_or(|max| r.order() <= max))
        .collect();

    render_mode(ctx.output, &records, |r, w| render_text(r, w), |r, w| render_pretty(r, w))
}

fn render_text(records: &[CutSetRecord], w: &mut dyn Write) -> io::Result<()> {
    for record in records {
        writeln!(
            w,
            "{}\t{}\t{}",
            record.probability,
            record.order(),
            record.events.join(",")
        )?;
    }
    Ok(())
}

fn render_pretty(records: &[CutSetRecord], w: &mut dyn Write) -> io::Result<()> {
    pretty_section(w, &format!("Minimal cut sets ({})", records.len()))?;
    for record in records {
        writeln!(
            w,
            "  {:<12} order {:<3} {{{}}}",
            format_probability(Some(record.probability)),
            record.order(),
            record.event_names.join(", ")
        )?;
    }
    Ok(())
}
