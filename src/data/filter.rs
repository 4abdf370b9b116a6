use log::debug;

use super::error::PipelineError;
use super::model::{columns, CellValue, TraceRecord};

// ---------------------------------------------------------------------------
// Mobility filter: drop samples taken while standing still
// ---------------------------------------------------------------------------

/// Which samples survive the velocity check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MobilityFilter {
    /// Keep samples whose velocity is a number > 0.
    MovingOnly,
    /// Keep everything (stationary behaviour is studied too).
    KeepStationary,
}

impl MobilityFilter {
    pub fn from_keep_static(keep_static: bool) -> Self {
        if keep_static {
            MobilityFilter::KeepStationary
        } else {
            MobilityFilter::MovingOnly
        }
    }

    /// Filter one record in place and return how many samples were removed.
    ///
    /// A sample passes `MovingOnly` when:
    /// * its velocity cell is numeric and strictly positive → kept
    /// * its velocity is zero, negative, missing or not a number → removed
    ///
    /// The velocity column itself is never dropped.
    pub fn apply(self, record: &mut TraceRecord) -> Result<usize, PipelineError> {
        if self == MobilityFilter::KeepStationary {
            return Ok(0);
        }
        if !record.has_column(columns::VELOCITY) {
            return Err(PipelineError::SchemaViolation {
                record: record.name.clone(),
                column: columns::VELOCITY.to_string(),
            });
        }
        let removed = record.retain_samples(|sample| {
            sample
                .get(columns::VELOCITY)
                .and_then(CellValue::as_f64)
                .is_some_and(|v| v > 0.0)
        });
        debug!(
            "{}: removed {removed} non-positive velocity samples, {} left",
            record.name,
            record.len()
        );
        Ok(removed)
    }

    /// Filter every record of a slice; the first schema violation aborts.
    pub fn apply_all(self, records: &mut [TraceRecord]) -> Result<usize, PipelineError> {
        let mut removed = 0;
        for record in records.iter_mut() {
            removed += self.apply(record)?;
        }
        Ok(removed)
    }
}
