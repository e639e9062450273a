//! The report pipeline — Loader → Cleaner → Aggregator.
//!
//! RULES:
//!   - Each stage consumes the previous stage's full output.
//!   - No stage feeds back into an earlier one.
//!   - Any stage error halts the run; there is no partial output.
//!   - Rendering is left to the caller (see render::render_report).

use crate::{
    cleaner::Cleaner,
    config::ReportConfig,
    error::ReportResult,
    event::PipelineEvent,
    loader::Loader,
    record::ComplaintRecord,
    report::{CrimeReport, RunTotals},
    table::Table,
};
use std::{io::Read, path::Path};

pub struct ReportPipeline {
    pub config: ReportConfig,
    cleaner: Cleaner,
    events: Vec<PipelineEvent>,
}

/// Everything a run produces, held in memory only.
#[derive(Debug)]
pub struct PipelineOutput {
    pub records: Vec<ComplaintRecord>,
    pub report: CrimeReport,
}

impl ReportPipeline {
    pub fn new(config: ReportConfig) -> ReportResult<Self> {
        config.validate()?;
        let cleaner = Cleaner::build(&config)?;
        Ok(Self {
            config,
            cleaner,
            events: Vec::new(),
        })
    }

    /// Run every stage over the file at `path`.
    pub fn run_path(&mut self, path: &Path) -> ReportResult<PipelineOutput> {
        let table = Loader::new(&self.config.schema).load_path(path)?;
        self.run_table(table, &path.display().to_string())
    }

    /// Run every stage over CSV read from `reader`. `source` only labels
    /// the event log.
    pub fn run_reader<R: Read>(&mut self, reader: R, source: &str) -> ReportResult<PipelineOutput> {
        let table = Loader::new(&self.config.schema).load_reader(reader)?;
        self.run_table(table, source)
    }

    fn run_table(&mut self, table: Table, source: &str) -> ReportResult<PipelineOutput> {
        self.events.clear();
        self.events.push(PipelineEvent::TableLoaded {
            source: source.to_string(),
            rows: table.row_count(),
            columns: table.columns().len(),
        });

        let cleaned = self.cleaner.clean(table)?;
        self.events.extend(cleaned.events);

        let totals = RunTotals::from_events(&self.events, cleaned.records.len());
        let report = CrimeReport::build(&cleaned.records, totals, &self.config.aggregation);
        Ok(PipelineOutput {
            records: cleaned.records,
            report,
        })
    }

    /// The event log of the most recent run, in stage order.
    pub fn events(&self) -> &[PipelineEvent] {
        &self.events
    }

    pub fn cleaner(&self) -> &Cleaner {
        &self.cleaner
    }
}
