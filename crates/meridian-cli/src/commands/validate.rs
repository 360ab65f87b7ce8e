//! Validate command implementation.

use super::Context;
use crate::cli::ValidateArgs;
use crate::error::Result;
use crate::output::Formatter;
use meridian_engine::ExitStatus;

/// Execute the validate command.
pub fn execute_validate(args: ValidateArgs, ctx: &Context, formatter: &Formatter) -> Result<ExitStatus> {
    let engine = ctx.engine()?;
    let report = engine.validate(args.scope)?;

    println!("{}", formatter.format_report(&report)?);

    Ok(report.exit_status(&ctx.thresholds(&args.thresholds)))
}
