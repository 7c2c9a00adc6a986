//! Scan report output port.

use crate::domain::error::SwingError;
use crate::domain::scanner::ScanReport;

pub trait ReportPort {
    fn write_scan(&self, report: &ScanReport, output_path: &str) -> Result<(), SwingError>;
}
