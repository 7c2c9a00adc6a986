//! CSV scan report adapter implementing ReportPort.
//!
//! One row per ranked signal with columns
//! `Stock,Strategy,Entry,Stop Loss,Target,RR Ratio`.

use crate::domain::error::SwingError;
use crate::domain::scanner::ScanReport;
use crate::ports::report_port::ReportPort;

pub const HEADER: [&str; 6] = ["Stock", "Strategy", "Entry", "Stop Loss", "Target", "RR Ratio"];

pub struct CsvReportAdapter;

impl CsvReportAdapter {
    pub fn new() -> Self {
        Self
    }

    /// Renders the report into an in-memory CSV document.
    pub fn render(&self, report: &ScanReport) -> Result<String, SwingError> {
        let mut wtr = csv::Writer::from_writer(Vec::new());
        wtr.write_record(HEADER).map_err(report_error)?;

        for signal in &report.signals {
            let c = &signal.candidate;
            wtr.write_record([
                signal.symbol.clone(),
                c.strategy.to_string(),
                format!("{:.2}", c.entry),
                format!("{:.2}", c.stop_loss),
                format!("{:.2}", c.target),
                format!("{:.2}", c.reward_risk),
            ])
            .map_err(report_error)?;
        }

        let bytes = wtr.into_inner().map_err(|e| SwingError::Report {
            reason: e.to_string(),
        })?;
        String::from_utf8(bytes).map_err(|e| SwingError::Report {
            reason: e.to_string(),
        })
    }
}

impl Default for CsvReportAdapter {
    fn default() -> Self {
        Self::new()
    }
}

fn report_error(e: csv::Error) -> SwingError {
    SwingError::Report {
        reason: format!("CSV write error: {e}"),
    }
}

impl ReportPort for CsvReportAdapter {
    fn write_scan(&self, report: &ScanReport, output_path: &str) -> Result<(), SwingError> {
        let content = self.render(report)?;
        std::fs::write(output_path, content).map_err(|e| SwingError::Report {
            reason: format!("failed to write {output_path}: {e}"),
        })
    }
}
