//! Repair command implementation.

use super::Context;
use crate::cli::RepairArgs;
use crate::error::Result;
use crate::output::Formatter;
use meridian_engine::ExitStatus;
use meridian_janitor::RepairConfig;

/// Execute the repair command.
///
/// The exit status reflects the corpus after repair, or before it in a dry run.
pub fn execute_repair(args: RepairArgs, ctx: &Context, formatter: &Formatter) -> Result<ExitStatus> {
    let config = RepairConfig {
        workers: args.workers.unwrap_or(ctx.workers),
        repair_slug_mismatch: !args.keep_mismatched_slugs,
        ..RepairConfig::default()
    };
    let engine = ctx.engine()?.with_repair_config(config);
    let outcome = engine.repair(args.scope, args.dry_run)?;

    println!("{}", formatter.format_repair(&outcome)?);

    Ok(outcome.after.exit_status(&ctx.thresholds(&args.thresholds)))
}
