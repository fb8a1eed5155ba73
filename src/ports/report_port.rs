//! Summary rendering port trait.

use crate::domain::error::BrandspendError;
use crate::domain::summary::Summary;
use std::io::Write;

/// Port for presenting a summary. Implementations only read the summary.
pub trait ReportPort {
    fn write(&self, summary: &Summary, out: &mut dyn Write) -> Result<(), BrandspendError>;

    /// Render into a string.
    fn render(&self, summary: &Summary) -> Result<String, BrandspendError> {
        let mut buf = Vec::new();
        self.write(summary, &mut buf)?;
        String::from_utf8(buf).map_err(|e| std::io::Error::other(e).into())
    }
}
