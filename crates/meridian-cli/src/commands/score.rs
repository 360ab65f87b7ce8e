//! Score command implementation.

use super::Context;
use crate::cli::ScoreArgs;
use crate::error::Result;
use crate::output::Formatter;
use meridian_engine::ExitStatus;

/// Execute the score command.
///
/// Exits non-zero when any scored document fails its completeness gate.
pub fn execute_score(args: ScoreArgs, ctx: &Context, formatter: &Formatter) -> Result<ExitStatus> {
    let engine = ctx.engine()?;
    let table = engine.score(args.scope)?;

    println!("{}", formatter.format_completeness(&table, args.failing)?);

    if table.failing().next().is_some() {
        Ok(ExitStatus::ViolationsFound)
    } else {
        Ok(ExitStatus::Clean)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::fixtures;
    use crate::config::OutputFormat;
    use meridian_domain::Domain;
    use meridian_engine::Scope;
    use std::fs;

    #[test]
    fn test_complete_corpus_passes() {
        let dir = fixtures::corpus();
        let ctx = fixtures::context(&dir);
        let formatter = Formatter::new(OutputFormat::Quiet, false);

        let args = ScoreArgs {
            scope: Scope::Domain(Domain::Materials),
            failing: false,
        };
        assert_eq!(execute_score(args, &ctx, &formatter).unwrap(), ExitStatus::Clean);
    }

    #[test]
    fn test_missing_required_field_fails() {
        let dir = fixtures::corpus();
        fs::write(
            dir.path().join("contaminants/rust.yaml"),
            "id: rust\nname: Rust\n",
        )
        .unwrap();
        let ctx = fixtures::context(&dir);
        let formatter = Formatter::new(OutputFormat::Table, false);

        let args = ScoreArgs {
            scope: Scope::Domain(Domain::Contaminants),
            failing: true,
        };
        assert_eq!(
            execute_score(args, &ctx, &formatter).unwrap(),
            ExitStatus::ViolationsFound
        );
    }
}
