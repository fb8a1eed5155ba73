//! JSON rendering of a summary, matching the `/summary/` response body.

use crate::domain::error::BrandspendError;
use crate::domain::summary::Summary;
use crate::ports::report_port::ReportPort;
use std::io::Write;

#[derive(Default)]
pub struct JsonReport {
    pub pretty: bool,
}

impl ReportPort for JsonReport {
    fn write(&self, summary: &Summary, out: &mut dyn Write) -> Result<(), BrandspendError> {
        let result = if self.pretty {
            serde_json::to_writer_pretty(&mut *out, summary)
        } else {
            serde_json::to_writer(&mut *out, summary)
        };
        result.map_err(std::io::Error::from)?;
        writeln!(out)?;
        Ok(())
    }
}
