//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use meridian_domain::{Severity, ViolationCode};
use meridian_engine::{CompletenessTable, RepairOutcome, Report};
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format a validation report.
    pub fn format_report(&self, report: &Report) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
            OutputFormat::Table => Ok(self.format_report_table(report)),
            OutputFormat::Quiet => Ok(Self::report_counts(report)),
        }
    }

    /// Format the outcome of a repair run.
    pub fn format_repair(&self, outcome: &RepairOutcome) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(outcome)?),
            OutputFormat::Table => Ok(self.format_repair_table(outcome)),
            OutputFormat::Quiet => Ok(format!(
                "changed={} fixed={} {}",
                outcome.result.documents_changed,
                outcome.result.violations_fixed,
                Self::report_counts(&outcome.after)
            )),
        }
    }

    /// Format a completeness table.
    pub fn format_completeness(&self, table: &CompletenessTable, failing_only: bool) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                if failing_only {
                    let failing = CompletenessTable {
                        fields: table.fields.clone(),
                        documents: table.failing().cloned().collect(),
                    };
                    Ok(serde_json::to_string_pretty(&failing)?)
                } else {
                    Ok(serde_json::to_string_pretty(table)?)
                }
            }
            OutputFormat::Table => Ok(self.format_completeness_table(table, failing_only)),
            OutputFormat::Quiet => Ok(format!(
                "documents={} failing={}",
                table.documents.len(),
                table.failing().count()
            )),
        }
    }

    /// One-line severity counts.
    fn report_counts(report: &Report) -> String {
        let mut parts = vec![format!("total={}", report.total)];
        for severity in SEVERITIES {
            parts.push(format!("{}={}", severity.as_str(), report.count_severity(severity)));
        }
        parts.join(" ")
    }

    fn format_report_table(&self, report: &Report) -> String {
        if report.is_clean() {
            return self.success(&format!(
                "No violations in {} document(s) (scope: {})",
                report.documents_checked, report.scope
            ));
        }

        let mut builder = Builder::default();
        builder.push_record(["Severity", "Domain", "Entity", "Path", "Kind", "Description"]);
        for severity in SEVERITIES {
            for violation in report.violations.iter().filter(|v| v.severity() == severity) {
                builder.push_record([
                    self.severity_label(severity),
                    violation.domain.to_string(),
                    violation.entity_id.to_string(),
                    violation.path.to_string(),
                    violation.code().to_string(),
                    violation.description.clone(),
                ]);
            }
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        let mut out = vec![table.to_string(), String::new(), self.summary_table(report)];

        let failing = report.completeness.failing().count();
        if failing > 0 {
            out.push(self.warning(&format!(
                "{} document(s) below their completeness threshold",
                failing
            )));
        }
        out.push(self.info(&format!(
            "{} violation(s) in {} document(s) (scope: {})",
            report.total, report.documents_checked, report.scope
        )));
        out.join("\n")
    }

    /// Counts per domain and kind.
    fn summary_table(&self, report: &Report) -> String {
        let mut builder = Builder::default();
        let mut header = vec!["Domain".to_string()];
        let codes: Vec<ViolationCode> = ViolationCode::ALL
            .into_iter()
            .filter(|code| report.count(*code) > 0)
            .collect();
        header.extend(codes.iter().map(|c| c.to_string()));
        builder.push_record(header);

        for (domain, counts) in &report.by_domain {
            let mut row = vec![domain.to_string()];
            row.extend(
                codes
                    .iter()
                    .map(|code| counts.get(code).copied().unwrap_or(0).to_string()),
            );
            builder.push_record(row);
        }

        let mut total = vec!["total".to_string()];
        total.extend(codes.iter().map(|code| report.count(*code).to_string()));
        builder.push_record(total);

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));
        table.to_string()
    }

    fn format_repair_table(&self, outcome: &RepairOutcome) -> String {
        let result = &outcome.result;
        let mut out = Vec::new();

        let verb = if result.dry_run { "Would change" } else { "Changed" };
        out.push(self.success(&format!(
            "{} {} document(s), {} violation(s) fixed, {} skipped",
            verb, result.documents_changed, result.violations_fixed, result.violations_skipped
        )));

        if !result.fixed_by_kind.is_empty() {
            let mut builder = Builder::default();
            builder.push_record(["Kind", "Fixed"]);
            for (code, count) in &result.fixed_by_kind {
                builder.push_record([code.to_string(), count.to_string()]);
            }
            let mut table = builder.build();
            table
                .with(Style::rounded())
                .with(Modify::new(Rows::first()).with(Alignment::center()));
            out.push(table.to_string());
        }

        if !result.discrepancies.is_empty() {
            out.push(self.warning(&format!(
                "{} slug(s) replaced from their URL, review:",
                result.discrepancies.len()
            )));
            let mut builder = Builder::default();
            builder.push_record(["Document", "Path", "Was", "Now"]);
            for d in &result.discrepancies {
                builder.push_record([
                    d.key.to_string(),
                    d.path.to_string(),
                    d.original.clone(),
                    d.replacement.clone(),
                ]);
            }
            let mut table = builder.build();
            table
                .with(Style::rounded())
                .with(Modify::new(Rows::first()).with(Alignment::center()));
            out.push(table.to_string());
        }

        for failure in &result.failures {
            out.push(self.error(&format!("{}: {}", failure.key, failure.reason)));
        }

        if result.dry_run {
            out.push(self.info("Dry run: no files were written"));
        } else {
            out.push(self.info(&format!(
                "Violations: {} before, {} after",
                outcome.before.total, outcome.after.total
            )));
        }
        if !outcome.fixed_point {
            out.push(self.warning("Another repair pass would change more documents"));
        }

        let remaining = &outcome.after;
        if !remaining.is_clean() {
            out.push(self.info(&format!(
                "Remaining: {}",
                Self::report_counts(remaining)
            )));
        }
        out.join("\n")
    }

    fn format_completeness_table(&self, table: &CompletenessTable, failing_only: bool) -> String {
        if table.documents.is_empty() {
            return self.colorize("No documents found.", "yellow");
        }

        let mut out = Vec::new();

        let mut builder = Builder::default();
        builder.push_record(["Domain", "Field", "Present", "Total", "Coverage"]);
        for row in &table.fields {
            builder.push_record([
                row.domain.to_string(),
                row.field.clone(),
                row.present_count.to_string(),
                row.total_count.to_string(),
                format!("{:.1}%", row.coverage_ratio * 100.0),
            ]);
        }
        let mut coverage = builder.build();
        coverage
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));
        out.push(coverage.to_string());

        let mut builder = Builder::default();
        builder.push_record(["Document", "Version", "Confidence", "Threshold", "Missing"]);
        let mut rows = 0;
        for score in &table.documents {
            if failing_only && score.passed() {
                continue;
            }
            let missing: Vec<&str> = score
                .missing_required_fields
                .iter()
                .chain(score.missing_optional_fields.iter())
                .map(String::as_str)
                .collect();
            let confidence = if score.passed() {
                self.colorize(&score.confidence_score.to_string(), "green")
            } else {
                self.colorize(&score.confidence_score.to_string(), "red")
            };
            builder.push_record([
                score.key.to_string(),
                score.schema_version.to_string(),
                confidence,
                score.threshold.to_string(),
                missing.join(", "),
            ]);
            rows += 1;
        }
        if rows > 0 {
            let mut documents = builder.build();
            documents
                .with(Style::rounded())
                .with(Modify::new(Rows::first()).with(Alignment::center()));
            out.push(documents.to_string());
        }

        let failing = table.failing().count();
        if failing == 0 {
            out.push(self.success(&format!(
                "All {} document(s) meet their threshold",
                table.documents.len()
            )));
        } else {
            out.push(self.warning(&format!(
                "{} of {} document(s) below their threshold",
                failing,
                table.documents.len()
            )));
        }
        out.join("\n")
    }

    fn severity_label(&self, severity: Severity) -> String {
        let color = match severity {
            Severity::Critical => "red",
            Severity::High => "magenta",
            Severity::Medium => "yellow",
            Severity::Low => "cyan",
            Severity::Info => "blue",
        };
        self.colorize(severity.as_str(), color)
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().to_string(),
            "magenta" => text.magenta().to_string(),
            _ => text.to_string(),
        }
    }
}

/// Most severe first.
const SEVERITIES: [Severity; 5] = [
    Severity::Critical,
    Severity::High,
    Severity::Medium,
    Severity::Low,
    Severity::Info,
];
