//! Cleaning step trait.
//!
//! RULE: Every record-level cleaning transformation implements
//! CleaningStep. The cleaner runs registered steps once each, in
//! registration order. The order is fixed and documented in cleaner.rs.

use crate::{error::ReportResult, event::PipelineEvent, record::ComplaintRecord};

/// The contract every cleaning step must fulfill.
pub trait CleaningStep {
    /// Unique stable name for this step.
    fn name(&self) -> &'static str;

    /// Transform the record set. A step may edit fields or remove whole
    /// rows; it never adds rows.
    ///
    /// Must be idempotent: applying it to its own output changes nothing.
    ///
    /// Returns events describing what changed.
    fn apply(&self, records: &mut Vec<ComplaintRecord>) -> ReportResult<Vec<PipelineEvent>>;
}
