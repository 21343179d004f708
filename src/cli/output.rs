/// Output formatting for `stylename check`
///
/// - Text: `path:line:col: unknown class 'name'`, one per line, compiler style
/// - Json: the whole report as one pretty-printed object
use crate::cli::check::CheckReport;
use anyhow::Result;
use std::io::{self, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

pub struct OutputWriter {
    format: OutputFormat,
    writer: Box<dyn Write>,
}

impl OutputWriter {
    pub fn new(format: OutputFormat) -> Self {
        Self::with_writer(format, Box::new(io::stdout()))
    }

    pub fn with_writer(format: OutputFormat, writer: Box<dyn Write>) -> Self {
        Self { format, writer }
    }

    pub fn write_report(&mut self, report: &CheckReport) -> Result<()> {
        match self.format {
            OutputFormat::Text => {
                for finding in &report.findings {
                    writeln!(
                        self.writer,
                        "{}:{}:{}: unknown class '{}'",
                        finding.file.display(),
                        finding.line,
                        finding.column,
                        finding.class_name
                    )?;
                }
                writeln!(
                    self.writer,
                    "{} file(s) checked, {} unknown class usage(s)",
                    report.files_checked,
                    report.findings.len()
                )?;
            }
            OutputFormat::Json => {
                serde_json::to_writer_pretty(&mut self.writer, report)?;
                writeln!(self.writer)?;
            }
        }
        self.writer.flush()?;
        Ok(())
    }
}
