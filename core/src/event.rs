//! The run event log — what each stage did to the data.
//!
//! Events are appended in stage order and never rewritten. They are
//! kept in memory for the caller; nothing is persisted.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PipelineEvent {
    // ── Loader ─────────────────────────────────────
    TableLoaded {
        source: String,
        rows: usize,
        columns: usize,
    },

    // ── Table preparation ──────────────────────────
    ColumnsPruned {
        columns: Vec<String>,
    },
    ColumnsRenamed {
        count: usize,
    },
    RecordsBuilt {
        rows: usize,
    },

    // ── Cleaning steps ─────────────────────────────
    LabelCanonicalized {
        from: String,
        to: String,
        count: usize,
    },
    /// Values that did not parse. Only the first few are sampled.
    DatesUnparsed {
        column: String,
        count: usize,
        samples: Vec<String>,
    },
    EndDatesSubstituted {
        placeholder: String,
        count: usize,
    },
    RowsExcluded {
        reason: String,
        count: usize,
    },
    SentinelFilled {
        column: String,
        count: usize,
    },
    StepCompleted {
        step: String,
        rows_in: usize,
        rows_out: usize,
    },
}

impl PipelineEvent {
    /// Stable name of the variant, matching its serialized tag.
    pub fn type_name(&self) -> &'static str {
        match self {
            PipelineEvent::TableLoaded { .. }         => "table_loaded",
            PipelineEvent::ColumnsPruned { .. }       => "columns_pruned",
            PipelineEvent::ColumnsRenamed { .. }      => "columns_renamed",
            PipelineEvent::RecordsBuilt { .. }        => "records_built",
            PipelineEvent::LabelCanonicalized { .. }  => "label_canonicalized",
            PipelineEvent::DatesUnparsed { .. }       => "dates_unparsed",
            PipelineEvent::EndDatesSubstituted { .. } => "end_dates_substituted",
            PipelineEvent::RowsExcluded { .. }        => "rows_excluded",
            PipelineEvent::SentinelFilled { .. }      => "sentinel_filled",
            PipelineEvent::StepCompleted { .. }       => "step_completed",
        }
    }
}
