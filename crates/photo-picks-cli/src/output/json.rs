//! JSON writers for batch reports.

use std::io::Write;
use std::sync::Mutex;

use anyhow::{Context, Result};
use photo_picks_core::{BatchReport, ResultOutput};

/// How the report is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonStyle {
    /// One compact JSON object for the whole report.
    Compact,
    /// One indented JSON object for the whole report.
    Pretty,
    /// JSON Lines: one pick object per line, no surrounding report.
    Lines,
}

/// Writes batch reports as JSON to an underlying writer.
pub struct JsonOutput {
    writer: Mutex<Box<dyn Write + Send>>,
    style: JsonStyle,
}

impl JsonOutput {
    /// Creates an output over an arbitrary writer.
    pub fn new(writer: Box<dyn Write + Send>, style: JsonStyle) -> Self {
        Self {
            writer: Mutex::new(writer),
            style,
        }
    }

    /// Creates an output writing to stdout.
    #[must_use]
    pub fn stdout(style: JsonStyle) -> Self {
        Self::new(Box::new(std::io::stdout()), style)
    }
}

impl ResultOutput for JsonOutput {
    fn write(&self, report: &BatchReport) -> Result<()> {
        let mut writer = self
            .writer
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        match self.style {
            JsonStyle::Compact => {
                serde_json::to_writer(&mut *writer, report).context("serializing report")?;
                writeln!(writer)?;
            }
            JsonStyle::Pretty => {
                serde_json::to_writer_pretty(&mut *writer, report)
                    .context("serializing report")?;
                writeln!(writer)?;
            }
            JsonStyle::Lines => {
                for pick in &report.picks {
                    serde_json::to_writer(&mut *writer, pick).context("serializing pick")?;
                    writeln!(writer)?;
                }
            }
        }
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        self.writer
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .flush()
            .context("flushing output")
    }
}
