//! The record-level cleaning steps.

use crate::{
    config::{LabelSubstitution, ReportConfig},
    error::{ParseError, ReportResult},
    event::PipelineEvent,
    record::{ComplaintRecord, DemographicField},
    step::CleaningStep,
};
use chrono::NaiveDate;
use std::collections::HashMap;

/// How many unparseable values are quoted in a DatesUnparsed event.
const UNPARSED_SAMPLE_LIMIT: usize = 5;

fn parse_date(
    column: &str,
    raw: &str,
    format: &str,
) -> Result<NaiveDate, ParseError> {
    NaiveDate::parse_from_str(raw.trim(), format).map_err(|_| ParseError {
        column: column.to_string(),
        raw: raw.to_string(),
        expected: format.to_string(),
    })
}

/// Collects per-row parse failures into one summary event.
#[derive(Default)]
struct UnparsedTally {
    count: usize,
    samples: Vec<String>,
}

impl UnparsedTally {
    fn record(&mut self, err: ParseError) {
        if self.count == 0 {
            log::warn!("{err}");
        }
        self.count += 1;
        if self.samples.len() < UNPARSED_SAMPLE_LIMIT {
            self.samples.push(err.raw);
        }
    }

    fn into_event(self, column: &str) -> Option<PipelineEvent> {
        (self.count > 0).then(|| PipelineEvent::DatesUnparsed {
            column: column.to_string(),
            count: self.count,
            samples: self.samples,
        })
    }
}

// ── Label canonicalization ─────────────────────────────────────────

/// Exact-match replacement of known-bad offense descriptions.
pub struct CanonicalizeLabels {
    substitutions: Vec<LabelSubstitution>,
}

impl CanonicalizeLabels {
    pub fn new(substitutions: Vec<LabelSubstitution>) -> Self {
        Self { substitutions }
    }
}

impl CleaningStep for CanonicalizeLabels {
    fn name(&self) -> &'static str { "canonicalize_labels" }

    fn apply(&self, records: &mut Vec<ComplaintRecord>) -> ReportResult<Vec<PipelineEvent>> {
        let lookup: HashMap<&str, usize> = self
            .substitutions
            .iter()
            .enumerate()
            .map(|(idx, s)| (s.from.as_str(), idx))
            .collect();
        let mut counts = vec![0usize; self.substitutions.len()];

        for record in records.iter_mut() {
            let Some(desc) = record.offense_desc.as_mut() else { continue };
            if let Some(&idx) = lookup.get(desc.as_str()) {
                *desc = self.substitutions[idx].to.clone();
                counts[idx] += 1;
            }
        }

        Ok(self
            .substitutions
            .iter()
            .zip(counts)
            .filter(|(_, count)| *count > 0)
            .map(|(s, count)| PipelineEvent::LabelCanonicalized {
                from: s.from.clone(),
                to: s.to.clone(),
                count,
            })
            .collect())
    }
}

// ── Start date ─────────────────────────────────────────────────────

/// Parse `date_start` from its raw text. Failures leave the field empty.
pub struct ParseStartDates {
    format: String,
}

impl ParseStartDates {
    pub fn new(format: impl Into<String>) -> Self {
        Self { format: format.into() }
    }
}

impl CleaningStep for ParseStartDates {
    fn name(&self) -> &'static str { "parse_start_dates" }

    fn apply(&self, records: &mut Vec<ComplaintRecord>) -> ReportResult<Vec<PipelineEvent>> {
        let mut unparsed = UnparsedTally::default();
        for record in records.iter_mut() {
            record.date_start = match record.date_start_text.as_deref() {
                Some(raw) => match parse_date("date_start", raw, &self.format) {
                    Ok(date) => Some(date),
                    Err(err) => {
                        unparsed.record(err);
                        None
                    }
                },
                None => None,
            };
        }
        Ok(unparsed.into_event("date_start").into_iter().collect())
    }
}

// ── End date ───────────────────────────────────────────────────────

/// Flag and fill missing end dates with the placeholder, then parse
/// every end date. The flag is sticky, so a second pass over records
/// that already carry the placeholder keeps it set.
pub struct SubstituteMissingEndDates {
    format: String,
    placeholder: String,
}

impl SubstituteMissingEndDates {
    pub fn new(format: impl Into<String>, placeholder: impl Into<String>) -> Self {
        Self {
            format: format.into(),
            placeholder: placeholder.into(),
        }
    }
}

impl CleaningStep for SubstituteMissingEndDates {
    fn name(&self) -> &'static str { "substitute_missing_end_dates" }

    fn apply(&self, records: &mut Vec<ComplaintRecord>) -> ReportResult<Vec<PipelineEvent>> {
        let mut substituted = 0;
        for record in records.iter_mut() {
            if record.date_end_text.is_none() {
                record.date_end_missing = true;
                record.date_end_text = Some(self.placeholder.clone());
                substituted += 1;
            }
        }

        let mut unparsed = UnparsedTally::default();
        for record in records.iter_mut() {
            let raw = record.date_end_text.as_deref().unwrap_or(&self.placeholder);
            record.date_end = match parse_date("date_end", raw, &self.format) {
                Ok(date) => Some(date),
                Err(err) => {
                    unparsed.record(err);
                    None
                }
            };
        }

        let mut events = Vec::new();
        if substituted > 0 {
            events.push(PipelineEvent::EndDatesSubstituted {
                placeholder: self.placeholder.clone(),
                count: substituted,
            });
        }
        events.extend(unparsed.into_event("date_end"));
        Ok(events)
    }
}

// ── Date range ─────────────────────────────────────────────────────

/// Keep rows starting on or after `min_date` whose end date is either on
/// or after `min_date` or the substituted placeholder. A raw end date
/// that merely equals the placeholder is not exempt. Unparsed dates fail
/// both tests.
pub struct FilterDateRange {
    min_date: NaiveDate,
    placeholder: NaiveDate,
}

impl FilterDateRange {
    pub fn new(min_date: NaiveDate, placeholder: NaiveDate) -> Self {
        Self { min_date, placeholder }
    }

    pub fn keeps(&self, record: &ComplaintRecord) -> bool {
        let start_ok = record.date_start.is_some_and(|d| d >= self.min_date);
        let end_ok = record
            .date_end
            .is_some_and(|d| d >= self.min_date || (d == self.placeholder && record.date_end_missing));
        start_ok && end_ok
    }
}

impl CleaningStep for FilterDateRange {
    fn name(&self) -> &'static str { "filter_date_range" }

    fn apply(&self, records: &mut Vec<ComplaintRecord>) -> ReportResult<Vec<PipelineEvent>> {
        let before = records.len();
        records.retain(|r| self.keeps(r));
        let excluded = before - records.len();
        if excluded == 0 {
            return Ok(vec![]);
        }
        Ok(vec![PipelineEvent::RowsExcluded {
            reason: format!("date outside range (min {})", self.min_date),
            count: excluded,
        }])
    }
}

// ── Demographics ───────────────────────────────────────────────────

/// Replace the null marker, or an absent value, with the unknown label
/// in all six demographic columns.
pub struct FillDemographicSentinels {
    null_marker: String,
    unknown_label: String,
}

impl FillDemographicSentinels {
    pub fn new(null_marker: impl Into<String>, unknown_label: impl Into<String>) -> Self {
        Self {
            null_marker: null_marker.into(),
            unknown_label: unknown_label.into(),
        }
    }
}

impl CleaningStep for FillDemographicSentinels {
    fn name(&self) -> &'static str { "fill_demographic_sentinels" }

    fn apply(&self, records: &mut Vec<ComplaintRecord>) -> ReportResult<Vec<PipelineEvent>> {
        let mut events = Vec::new();
        for field in DemographicField::ALL {
            let mut filled = 0;
            for record in records.iter_mut() {
                let value = field.get_mut(record);
                let is_null = match value.as_deref() {
                    None => true,
                    Some(v) => v == self.null_marker,
                };
                if is_null {
                    *value = Some(self.unknown_label.clone());
                    filled += 1;
                }
            }
            if filled > 0 {
                events.push(PipelineEvent::SentinelFilled {
                    column: field.column().to_string(),
                    count: filled,
                });
            }
        }
        Ok(events)
    }
}

/// The standard record-level steps, in execution order.
pub fn standard_steps(config: &ReportConfig) -> ReportResult<Vec<Box<dyn CleaningStep>>> {
    let cleaning = &config.cleaning;
    Ok(vec![
        Box::new(CanonicalizeLabels::new(cleaning.label_substitutions.clone())),
        Box::new(ParseStartDates::new(&cleaning.date_format)),
        Box::new(SubstituteMissingEndDates::new(
            &cleaning.date_format,
            &cleaning.end_date_placeholder,
        )),
        Box::new(FilterDateRange::new(
            cleaning.min_date,
            config.end_date_placeholder()?,
        )),
        Box::new(FillDemographicSentinels::new(
            &cleaning.null_marker,
            &cleaning.unknown_label,
        )),
    ])
}
