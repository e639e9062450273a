//! The cleaner — turns a loaded table into records safe for aggregation.
//!
//! EXECUTION ORDER (fixed, documented, never reordered):
//!   1. Column pruning          (table)
//!   2. Column renaming         (table)
//!   3. Record building         (table → records)
//!   4. Label canonicalization
//!   5. Start-date parsing
//!   6. End-date sentinel handling
//!   7. Date-range filtering
//!   8. Demographic sentinel fill
//!
//! RULES:
//!   - Steps 4-8 implement CleaningStep and run once each, in order.
//!   - Only date-range filtering removes rows.
//!   - Value-level parse failures never abort the run.
//!   - Every change is recorded in the event log.

use crate::{
    cleaning_steps::standard_steps,
    config::ReportConfig,
    error::ReportResult,
    event::PipelineEvent,
    record::{build_records, ComplaintRecord},
    step::CleaningStep,
    table::Table,
};
use std::collections::HashMap;

pub struct Cleaner {
    dropped_columns: Vec<String>,
    renames: HashMap<String, String>,
    date_format: String,
    time_format: String,
    steps: Vec<Box<dyn CleaningStep>>,
}

/// Output of one cleaning pass.
#[derive(Debug)]
pub struct CleanedData {
    pub records: Vec<ComplaintRecord>,
    pub events: Vec<PipelineEvent>,
}

impl Cleaner {
    /// A cleaner with no record-level steps registered.
    pub fn new(config: &ReportConfig) -> Self {
        Self {
            dropped_columns: config.schema.dropped_columns.clone(),
            renames: config
                .schema
                .column_renames
                .iter()
                .map(|r| (r.from.clone(), r.to.clone()))
                .collect(),
            date_format: config.cleaning.date_format.clone(),
            time_format: config.cleaning.time_format.clone(),
            steps: Vec::new(),
        }
    }

    /// Build a cleaner with all standard steps registered.
    /// Call this instead of new() + manual register() calls.
    pub fn build(config: &ReportConfig) -> ReportResult<Self> {
        let mut cleaner = Cleaner::new(config);
        for step in standard_steps(config)? {
            cleaner.register(step);
        }
        Ok(cleaner)
    }

    /// Register a step. Call in the documented execution order.
    pub fn register(&mut self, step: Box<dyn CleaningStep>) {
        self.steps.push(step);
    }

    pub fn step_names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    /// Prune, rename and convert a loaded table, then run every step.
    pub fn clean(&self, table: Table) -> ReportResult<CleanedData> {
        let mut events = Vec::new();

        for name in &self.dropped_columns {
            if let Ok(rate) = table.missing_rate(name) {
                log::debug!("cleaner: dropping {name} ({:.1}% missing)", rate * 100.0);
            }
        }
        let (mut table, dropped) = table.drop_columns(&self.dropped_columns);
        events.push(PipelineEvent::ColumnsPruned { columns: dropped });

        let renamed = table.rename_columns(&self.renames);
        events.push(PipelineEvent::ColumnsRenamed { count: renamed });

        let records = build_records(&table, &self.date_format, &self.time_format)?;
        events.push(PipelineEvent::RecordsBuilt { rows: records.len() });

        let mut cleaned = self.run_steps(records)?;
        events.append(&mut cleaned.events);
        Ok(CleanedData {
            records: cleaned.records,
            events,
        })
    }

    /// Run the registered steps over existing records. Running this on
    /// its own output is a no-op apart from the event log.
    pub fn run_steps(&self, mut records: Vec<ComplaintRecord>) -> ReportResult<CleanedData> {
        let mut events = Vec::new();
        for step in &self.steps {
            let rows_in = records.len();
            let step_events = step.apply(&mut records)?;
            for event in &step_events {
                log::debug!("{}: {}", step.name(), serde_json::to_string(event)?);
            }
            events.extend(step_events);
            events.push(PipelineEvent::StepCompleted {
                step: step.name().to_string(),
                rows_in,
                rows_out: records.len(),
            });
        }
        log::info!("cleaner: {} records after {} steps", records.len(), self.steps.len());
        Ok(CleanedData { records, events })
    }
}
