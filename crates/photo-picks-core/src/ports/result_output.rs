//! Result output port for writing batch reports.

use crate::engine::BatchReport;

/// Port for outputting the result of a batch run.
pub trait ResultOutput: Send + Sync {
    /// Writes a batch report.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write(&self, report: &BatchReport) -> anyhow::Result<()>;

    /// Flushes any buffered output.
    ///
    /// # Errors
    ///
    /// Returns an error if flushing fails.
    fn flush(&self) -> anyhow::Result<()>;
}
