//! Presentation port trait.

use std::io::Write;

use crate::domain::error::MoversError;
use crate::domain::monthly_returns::MonthlyReturnRow;
use crate::domain::report::MoversReport;

/// Port for rendering ranked movers.
pub trait ReportPort {
    fn write(&self, report: &MoversReport, out: &mut dyn Write) -> Result<(), MoversError>;

    /// Default implementation: a heading line per group followed by `write`.
    fn write_grouped(
        &self,
        groups: &[(String, MoversReport)],
        out: &mut dyn Write,
    ) -> Result<(), MoversError> {
        for (name, report) in groups {
            writeln!(out, "## {name}")?;
            self.write(report, out)?;
        }
        Ok(())
    }

    fn write_heatmap(
        &self,
        symbol: &str,
        rows: &[MonthlyReturnRow],
        out: &mut dyn Write,
    ) -> Result<(), MoversError>;
}
