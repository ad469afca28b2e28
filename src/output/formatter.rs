//! Output formatters for suite results
//!
//! Provides JSON, Table, CSV and summary output formats, plus file export.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{info, warn};

use crate::http::RequestResult;
use crate::models::{SuiteSummary, TestOutcome};

/// Output format options
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    JsonPretty,
    Csv,
    Summary,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "table" => Some(OutputFormat::Table),
            "json" => Some(OutputFormat::Json),
            "json-pretty" | "jsonpretty" => Some(OutputFormat::JsonPretty),
            "csv" => Some(OutputFormat::Csv),
            "summary" => Some(OutputFormat::Summary),
            _ => None,
        }
    }

    /// Formats whose stdout must stay machine-readable
    pub fn is_machine_readable(&self) -> bool {
        matches!(
            self,
            OutputFormat::Json | OutputFormat::JsonPretty | OutputFormat::Csv
        )
    }
}

/// Result formatter
pub struct ResultFormatter {
    format: OutputFormat,
    colorize: bool,
}

impl ResultFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            colorize: true,
        }
    }

    pub fn no_color(mut self) -> Self {
        self.colorize = false;
        self
    }

    /// Format the result of a single action
    ///
    /// Table and summary output is already shown by the response panel, so
    /// only a status line is produced for those.
    pub fn format_request(&self, result: &RequestResult) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string(result).unwrap_or_default(),
            OutputFormat::JsonPretty => serde_json::to_string_pretty(result).unwrap_or_default(),
            OutputFormat::Csv => format!(
                "status,elapsed_ms,body\n{},{},\"{}\"",
                result.status,
                result.elapsed_ms,
                result.data.to_string().replace('"', "\"\"")
            ),
            OutputFormat::Table | OutputFormat::Summary => {
                format!("{} ({}ms)", result.status, result.elapsed_ms)
            }
        }
    }

    fn format_outcome_table(&self, outcome: &TestOutcome) -> String {
        let status_str = match (self.colorize, outcome.success) {
            (true, true) => "\x1b[32m✓ PASS\x1b[0m",
            (true, false) => "\x1b[31m✗ FAIL\x1b[0m",
            (false, true) => "✓ PASS",
            (false, false) => "✗ FAIL",
        };

        let status_code = outcome
            .status
            .map(|s| s.to_string())
            .unwrap_or_else(|| "-".to_string());

        let mut line = format!(
            "{:24} {} {:>3} [{:>6}ms]",
            outcome.name, status_str, status_code, outcome.duration_ms
        );
        if let Some(err) = &outcome.error {
            line.push_str(&format!("  {err}"));
        }
        line
    }

    /// Format a suite summary
    pub fn format_summary(&self, summary: &SuiteSummary) -> String {
        match self.format {
            OutputFormat::Table => self.format_summary_table(summary),
            OutputFormat::Json => serde_json::to_string(summary).unwrap_or_default(),
            OutputFormat::JsonPretty => serde_json::to_string_pretty(summary).unwrap_or_default(),
            OutputFormat::Csv => self.format_summary_csv(summary),
            OutputFormat::Summary => self.format_summary_brief(summary),
        }
    }

    fn format_summary_table(&self, summary: &SuiteSummary) -> String {
        let mut output = String::new();

        output.push_str("\n╔══════════════════════════════════════════════════════════════╗\n");
        output.push_str("║  Sequential Test Run                                         ║\n");
        output.push_str("╠══════════════════════════════════════════════════════════════╣\n");

        for outcome in &summary.outcomes {
            output.push_str(&format!("║  {}\n", self.format_outcome_table(outcome)));
        }

        output.push_str("╠══════════════════════════════════════════════════════════════╣\n");

        let pass_str = if self.colorize {
            format!("\x1b[32m{}\x1b[0m", summary.passed)
        } else {
            summary.passed.to_string()
        };
        let fail_str = if self.colorize && summary.failed > 0 {
            format!("\x1b[31m{}\x1b[0m", summary.failed)
        } else {
            summary.failed.to_string()
        };

        output.push_str(&format!(
            "║  Test Summary: {} passed, {} failed (of {})\n",
            pass_str, fail_str, summary.total
        ));
        output.push_str(&format!(
            "║  Pass Rate: {:5.1}% | Duration: {}ms\n",
            summary.pass_rate(),
            summary.total_duration_ms
        ));
        output.push_str("╚══════════════════════════════════════════════════════════════╝\n");

        output
    }

    fn format_summary_csv(&self, summary: &SuiteSummary) -> String {
        let mut buffer = Vec::new();
        if let Err(e) = write_summary_csv(summary, &mut buffer) {
            warn!("Failed to render CSV: {}", e);
        }
        String::from_utf8_lossy(&buffer).into_owned()
    }

    fn format_summary_brief(&self, summary: &SuiteSummary) -> String {
        format!(
            "Test Summary: {} passed, {} failed ({:.1}%) in {}ms",
            summary.passed,
            summary.failed,
            summary.pass_rate(),
            summary.total_duration_ms
        )
    }
}

impl Default for ResultFormatter {
    fn default() -> Self {
        Self::new(OutputFormat::Table)
    }
}

/// Export format
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(ExportFormat::Json),
            "csv" => Some(ExportFormat::Csv),
            _ => None,
        }
    }

    pub fn from_extension(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_str)
    }
}

/// Export a suite summary to a file
pub fn export_summary(summary: &SuiteSummary, path: &Path, format: ExportFormat) -> Result<()> {
    match format {
        ExportFormat::Json => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            let writer = BufWriter::new(file);
            serde_json::to_writer_pretty(writer, summary).context("Failed to write results")?;
        }
        ExportFormat::Csv => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            write_summary_csv(summary, BufWriter::new(file)).context("Failed to write results")?;
        }
    }

    info!("Exported results to {}", path.display());
    Ok(())
}

/// One row per outcome; stdout and exported files share this layout
fn write_summary_csv<W: Write>(summary: &SuiteSummary, writer: W) -> csv::Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(["name", "success", "status", "duration_ms", "error"])?;
    for outcome in &summary.outcomes {
        writer.write_record([
            outcome.name.clone(),
            outcome.success.to_string(),
            outcome.status.map(|s| s.to_string()).unwrap_or_default(),
            outcome.duration_ms.to_string(),
            outcome.error.clone().unwrap_or_default(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// Write a response body to a file
pub fn save_response(body: &str, path: &Path) -> Result<()> {
    std::fs::write(path, body)
        .with_context(|| format!("Failed to write response to {}", path.display()))?;
    info!("Saved response to {}", path.display());
    Ok(())
}
