//! The assembled report: every aggregate section computed from one set of
//! cleaned records, plus run totals taken from the event log.

use crate::{
    aggregator::{
        top_locations, top_offense_per_year, AggregateTable, GroupColumn, GroupQuery,
        LocationCount, RowOrder, YearlyTopOffense,
    },
    config::{AggregationConfig, RenderConfig},
    event::PipelineEvent,
    record::{ComplaintRecord, OffenseLevel},
    render::{render_bar_chart, render_point_map, BarSeries, Orientation, RenderedChart},
};
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunTotals {
    pub rows_loaded: usize,
    pub rows_cleaned: usize,
    pub rows_excluded: usize,
    pub end_dates_substituted: usize,
    pub unparsed_dates: usize,
    pub labels_canonicalized: usize,
    pub sentinels_filled: usize,
}

impl RunTotals {
    pub fn from_events(events: &[PipelineEvent], rows_cleaned: usize) -> Self {
        let mut totals = RunTotals {
            rows_cleaned,
            ..Default::default()
        };
        for event in events {
            match event {
                PipelineEvent::TableLoaded { rows, .. } => totals.rows_loaded += rows,
                PipelineEvent::RowsExcluded { count, .. } => totals.rows_excluded += count,
                PipelineEvent::EndDatesSubstituted { count, .. } => {
                    totals.end_dates_substituted += count
                }
                PipelineEvent::DatesUnparsed { count, .. } => totals.unparsed_dates += count,
                PipelineEvent::LabelCanonicalized { count, .. } => {
                    totals.labels_canonicalized += count
                }
                PipelineEvent::SentinelFilled { count, .. } => totals.sentinels_filled += count,
                _ => {}
            }
        }
        totals
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrimeReport {
    pub totals: RunTotals,

    // ── Temporal ───────────────────────────────────
    pub by_year: AggregateTable,
    pub by_month: AggregateTable,
    pub by_weekday: AggregateTable,
    pub by_hour: AggregateTable,

    // ── Offense ────────────────────────────────────
    pub by_offense_level: AggregateTable,
    pub by_status: AggregateTable,
    pub top_offenses: AggregateTable,
    pub top_premises: AggregateTable,
    pub top_offense_per_year: Vec<YearlyTopOffense>,

    // ── Spatial ────────────────────────────────────
    pub by_borough: AggregateTable,
    pub felonies_by_borough: AggregateTable,
    pub top_locations: Vec<LocationCount>,

    // ── Demographic ────────────────────────────────
    pub suspect_age: AggregateTable,
    pub suspect_race: AggregateTable,
    pub suspect_sex: AggregateTable,
    pub victim_age: AggregateTable,
    pub victim_race: AggregateTable,
    pub victim_sex: AggregateTable,
}

impl CrimeReport {
    pub fn build(records: &[ComplaintRecord], totals: RunTotals, config: &AggregationConfig) -> Self {
        let ranked = |column| GroupQuery::by(column).order(RowOrder::CountDesc).run(records);
        let chronological = |column| GroupQuery::by(column).order(RowOrder::KeyAsc).run(records);

        let report = Self {
            totals,
            by_year: chronological(GroupColumn::Year),
            by_month: chronological(GroupColumn::Month),
            by_weekday: chronological(GroupColumn::Weekday),
            by_hour: chronological(GroupColumn::Hour),
            by_offense_level: ranked(GroupColumn::OffenseLevel),
            by_status: ranked(GroupColumn::Status),
            top_offenses: GroupQuery::by(GroupColumn::OffenseDesc)
                .top(config.top_n)
                .run(records),
            top_premises: GroupQuery::by(GroupColumn::PremiseDesc)
                .top(config.top_n)
                .run(records),
            top_offense_per_year: top_offense_per_year(records),
            by_borough: ranked(GroupColumn::Borough),
            felonies_by_borough: GroupQuery::by(GroupColumn::Borough)
                .filter(|r| r.offense_level == Some(OffenseLevel::Felony))
                .order(RowOrder::CountDesc)
                .run(records),
            top_locations: top_locations(records, config.top_locations),
            suspect_age: ranked(GroupColumn::SuspectAge),
            suspect_race: ranked(GroupColumn::SuspectRace),
            suspect_sex: ranked(GroupColumn::SuspectSex),
            // The age columns carry a tail of malformed values ("-940",
            // "1022", ...) that each occur a handful of times.
            victim_age: GroupQuery::by(GroupColumn::VictimAge)
                .exclude_at_or_below(config.min_group_count)
                .order(RowOrder::CountDesc)
                .run(records),
            victim_race: ranked(GroupColumn::VictimRace),
            victim_sex: ranked(GroupColumn::VictimSex),
        };
        log::info!(
            "report: {} records, {} offense types in top list, {} years",
            report.totals.rows_cleaned,
            report.top_offenses.rows.len(),
            report.top_offense_per_year.len()
        );
        report
    }

    /// The bar-chart sections with their titles and preferred layout.
    pub fn chart_sections(&self) -> Vec<(&'static str, &str, &AggregateTable, Orientation)> {
        use Orientation::{Horizontal, Vertical};
        vec![
            ("by_year", "Complaints per year", &self.by_year, Vertical),
            ("by_month", "Complaints per month", &self.by_month, Vertical),
            ("by_weekday", "Complaints per weekday", &self.by_weekday, Vertical),
            ("by_hour", "Complaints per hour of day", &self.by_hour, Vertical),
            ("by_offense_level", "Offense level", &self.by_offense_level, Horizontal),
            ("by_status", "Attempted vs completed", &self.by_status, Horizontal),
            ("top_offenses", "Most common offenses", &self.top_offenses, Horizontal),
            ("top_premises", "Most common premises", &self.top_premises, Horizontal),
            ("by_borough", "Complaints per borough", &self.by_borough, Horizontal),
            ("felonies_by_borough", "Felonies per borough", &self.felonies_by_borough, Horizontal),
            ("suspect_age", "Suspect age group", &self.suspect_age, Horizontal),
            ("suspect_race", "Suspect race", &self.suspect_race, Horizontal),
            ("suspect_sex", "Suspect sex", &self.suspect_sex, Horizontal),
            ("victim_age", "Victim age group", &self.victim_age, Horizontal),
            ("victim_race", "Victim race", &self.victim_race, Horizontal),
            ("victim_sex", "Victim sex", &self.victim_sex, Horizontal),
        ]
    }

    pub fn top_offense_per_year_series(&self) -> BarSeries {
        BarSeries::new(
            "Top offense per year",
            self.top_offense_per_year
                .iter()
                .map(|t| (format!("{} {}", t.year, t.offense_desc), t.count))
                .collect(),
        )
    }
}

/// Render every section of the report as an SVG artifact.
pub fn render_report(report: &CrimeReport, style: &RenderConfig) -> Vec<RenderedChart> {
    let mut charts: Vec<RenderedChart> = report
        .chart_sections()
        .into_iter()
        .map(|(name, title, table, orientation)| RenderedChart {
            file_name: format!("{name}.svg"),
            svg: render_bar_chart(&BarSeries::new(title, table.series()), orientation, style),
        })
        .collect();

    charts.push(RenderedChart {
        file_name: "top_offense_per_year.svg".into(),
        svg: render_bar_chart(&report.top_offense_per_year_series(), Orientation::Horizontal, style),
    });
    charts.push(RenderedChart {
        file_name: "top_locations.svg".into(),
        svg: render_point_map("Most frequent complaint locations", &report.top_locations, style),
    });
    charts
}
