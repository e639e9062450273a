//! Cleaner tests — the documented scenarios plus leniency and idempotence.

mod common;

use chrono::NaiveDate;
use common::{run_pipeline, Row};
use crimestat_core::{
    cleaner::Cleaner,
    config::ReportConfig,
    event::PipelineEvent,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn misspelled_harassment_is_canonicalized() {
    let (pipeline, output) = run_pipeline(&[Row::new("1").set("OFNS_DESC", "HARRASSMENT 2")]);
    assert_eq!(output.records[0].offense_desc.as_deref(), Some("HARASSMENT"));
    assert!(pipeline.events().contains(&PipelineEvent::LabelCanonicalized {
        from: "HARRASSMENT 2".into(),
        to: "HARASSMENT".into(),
        count: 1,
    }));
}

#[test]
fn other_labels_pass_through() {
    let (_, output) = run_pipeline(&[Row::new("1").set("OFNS_DESC", "PETIT LARCENY")]);
    assert_eq!(output.records[0].offense_desc.as_deref(), Some("PETIT LARCENY"));
}

#[test]
fn impossible_year_is_excluded() {
    let rows = [
        Row::new("keep"),
        Row::new("drop").set("CMPLNT_FR_DT", "01/15/1022"),
    ];
    let (pipeline, output) = run_pipeline(&rows);
    assert_eq!(output.records.len(), 1);
    assert_eq!(output.records[0].complaint_num, "keep");
    assert!(pipeline
        .events()
        .iter()
        .any(|e| matches!(e, PipelineEvent::RowsExcluded { count: 1, .. })));
}

#[test]
fn historical_end_date_is_excluded() {
    let rows = [Row::new("1").set("CMPLNT_TO_DT", "12/31/2016")];
    let (_, output) = run_pipeline(&rows);
    assert!(output.records.is_empty());
}

#[test]
fn missing_end_date_gets_placeholder_and_flag() {
    let rows = [Row::new("1")
        .set("CMPLNT_FR_DT", "03/01/2022")
        .set("CMPLNT_TO_DT", "")];
    let (pipeline, output) = run_pipeline(&rows);
    assert_eq!(output.records.len(), 1);
    let record = &output.records[0];
    assert_eq!(record.date_start, Some(date(2022, 3, 1)));
    assert_eq!(record.date_end, Some(date(1900, 1, 1)));
    assert!(record.date_end_missing);
    assert_eq!(output.report.totals.end_dates_substituted, 1);
    assert!(pipeline
        .events()
        .iter()
        .any(|e| matches!(e, PipelineEvent::EndDatesSubstituted { count: 1, .. })));
}

#[test]
fn raw_placeholder_end_date_is_not_exempt() {
    // Equal to the placeholder, but actually recorded in the source.
    let rows = [Row::new("1").set("CMPLNT_TO_DT", "01/01/1900")];
    let (_, output) = run_pipeline(&rows);
    assert!(output.records.is_empty());
}

#[test]
fn unparseable_start_date_nulls_the_field_without_aborting() {
    let rows = [
        Row::new("ok"),
        Row::new("bad").set("CMPLNT_FR_DT", "13/45/2020"),
    ];
    let (pipeline, output) = run_pipeline(&rows);
    // The run completes; the bad row then fails the range filter.
    assert_eq!(output.records.len(), 1);
    assert_eq!(output.report.totals.unparsed_dates, 1);
    assert!(pipeline.events().iter().any(|e| matches!(
        e,
        PipelineEvent::DatesUnparsed { column, count: 1, samples }
            if column == "date_start" && samples == &vec!["13/45/2020".to_string()]
    )));
}

#[test]
fn null_marker_becomes_unknown() {
    let rows = [Row::new("1")
        .set("SUSP_RACE", "(null)")
        .set("VIC_SEX", "")
        .set("SUSP_SEX", "M")];
    let (_, output) = run_pipeline(&rows);
    let record = &output.records[0];
    assert_eq!(record.suspect.race.as_deref(), Some("UNKNOWN"));
    assert_eq!(record.victim.sex.as_deref(), Some("UNKNOWN"));
    assert_eq!(record.suspect.sex.as_deref(), Some("M"));
    assert_eq!(record.victim.race.as_deref(), Some("WHITE HISPANIC"));
}

#[test]
fn pruning_and_renaming_are_logged() {
    let (pipeline, _) = run_pipeline(&[Row::new("1")]);
    let pruned = pipeline.events().iter().find_map(|e| match e {
        PipelineEvent::ColumnsPruned { columns } => Some(columns.clone()),
        _ => None,
    });
    let pruned = pruned.expect("ColumnsPruned event");
    assert_eq!(pruned.len(), 8);
    assert!(pruned.contains(&"PARKS_NM".to_string()));
    assert!(pipeline
        .events()
        .contains(&PipelineEvent::ColumnsRenamed { count: 27 }));
}

#[test]
fn typed_fields_are_populated() {
    let (_, output) = run_pipeline(&[Row::new("1")]);
    let r = &output.records[0];
    assert_eq!(r.precinct, Some(75));
    assert_eq!(r.offense_code, Some(578));
    assert_eq!(r.borough.as_deref(), Some("BROOKLYN"));
    assert_eq!(r.location.lat_lon(), Some((40.6701, -73.8902)));
    assert!(r.time_start.is_some());
    assert_eq!(r.report_date, Some(date(2022, 3, 2)));
}

#[test]
fn steps_run_in_documented_order() {
    let cleaner = Cleaner::build(&ReportConfig::default()).unwrap();
    assert_eq!(
        cleaner.step_names(),
        vec![
            "canonicalize_labels",
            "parse_start_dates",
            "substitute_missing_end_dates",
            "filter_date_range",
            "fill_demographic_sentinels",
        ]
    );
}

#[test]
fn cleaning_is_idempotent() {
    let rows = common::synthetic_rows(17, 300);
    let (pipeline, output) = run_pipeline(&rows);

    let again = pipeline.cleaner().run_steps(output.records.clone()).unwrap();
    assert_eq!(again.records, output.records);
    // Nothing left to change: only StepCompleted markers are emitted.
    assert!(again
        .events
        .iter()
        .all(|e| matches!(e, PipelineEvent::StepCompleted { rows_in, rows_out, .. } if rows_in == rows_out)));
}
