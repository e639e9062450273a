//! Typed complaint records built from the renamed table.

use crate::{
    error::ReportResult,
    table::{Cell, Table},
    types::{ComplaintId, Precinct},
};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OffenseLevel {
    Felony,
    Misdemeanor,
    Violation,
}

impl OffenseLevel {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "FELONY" => Some(Self::Felony),
            "MISDEMEANOR" => Some(Self::Misdemeanor),
            "VIOLATION" => Some(Self::Violation),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Felony => "FELONY",
            Self::Misdemeanor => "MISDEMEANOR",
            Self::Violation => "VIOLATION",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CompletionStatus {
    Attempted,
    Completed,
}

impl CompletionStatus {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "ATTEMPTED" => Some(Self::Attempted),
            "COMPLETED" => Some(Self::Completed),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Attempted => "ATTEMPTED",
            Self::Completed => "COMPLETED",
        }
    }
}

/// Age group, race and sex of one party to a complaint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Demographics {
    pub age_group: Option<String>,
    pub race: Option<String>,
    pub sex: Option<String>,
}

/// The six demographic columns, in source order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DemographicField {
    SuspectAge,
    SuspectRace,
    SuspectSex,
    VictimAge,
    VictimRace,
    VictimSex,
}

impl DemographicField {
    pub const ALL: [DemographicField; 6] = [
        Self::SuspectAge,
        Self::SuspectRace,
        Self::SuspectSex,
        Self::VictimAge,
        Self::VictimRace,
        Self::VictimSex,
    ];

    pub fn column(&self) -> &'static str {
        match self {
            Self::SuspectAge => "susp_age",
            Self::SuspectRace => "susp_race",
            Self::SuspectSex => "susp_sex",
            Self::VictimAge => "vic_age",
            Self::VictimRace => "vic_race",
            Self::VictimSex => "vic_sex",
        }
    }

    pub fn get<'r>(&self, record: &'r ComplaintRecord) -> Option<&'r str> {
        let value = match self {
            Self::SuspectAge => &record.suspect.age_group,
            Self::SuspectRace => &record.suspect.race,
            Self::SuspectSex => &record.suspect.sex,
            Self::VictimAge => &record.victim.age_group,
            Self::VictimRace => &record.victim.race,
            Self::VictimSex => &record.victim.sex,
        };
        value.as_deref()
    }

    pub fn get_mut<'r>(&self, record: &'r mut ComplaintRecord) -> &'r mut Option<String> {
        match self {
            Self::SuspectAge => &mut record.suspect.age_group,
            Self::SuspectRace => &mut record.suspect.race,
            Self::SuspectSex => &mut record.suspect.sex,
            Self::VictimAge => &mut record.victim.age_group,
            Self::VictimRace => &mut record.victim.race,
            Self::VictimSex => &mut record.victim.sex,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    /// New York State Plane, Long Island zone (feet).
    pub x_coord: Option<f64>,
    pub y_coord: Option<f64>,
    /// WGS84.
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl GeoLocation {
    pub fn lat_lon(&self) -> Option<(f64, f64)> {
        Some((self.latitude?, self.longitude?))
    }
}

/// One complaint.
///
/// Raw date text is kept next to the parsed value: the cleaning steps
/// parse from the text, so re-running them over cleaned records yields
/// the same records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplaintRecord {
    pub complaint_num: ComplaintId,
    pub precinct: Option<Precinct>,
    pub borough: Option<String>,

    pub date_start_text: Option<String>,
    pub date_start: Option<NaiveDate>,
    pub time_start: Option<NaiveTime>,
    pub date_end_text: Option<String>,
    pub date_end: Option<NaiveDate>,
    /// The raw end date was absent and the placeholder was substituted.
    pub date_end_missing: bool,
    pub time_end: Option<NaiveTime>,
    pub report_date: Option<NaiveDate>,

    pub status: Option<CompletionStatus>,
    pub offense_code: Option<i64>,
    pub offense_desc: Option<String>,
    pub internal_code: Option<i64>,
    pub internal_desc: Option<String>,
    pub offense_level: Option<OffenseLevel>,

    pub suspect: Demographics,
    pub victim: Demographics,

    pub juris_code: Option<i64>,
    pub juris_desc: Option<String>,
    pub premise_desc: Option<String>,
    pub location: GeoLocation,
}

/// Column positions in the renamed table, resolved once per table.
struct RecordColumns {
    complaint_num: usize,
    precinct: usize,
    borough: usize,
    date_start: usize,
    time_start: usize,
    date_end: usize,
    time_end: usize,
    report_date: usize,
    status: usize,
    offense_code: usize,
    offense_desc: usize,
    internal_code: usize,
    internal_desc: usize,
    offense_level: usize,
    susp_age: usize,
    susp_race: usize,
    susp_sex: usize,
    vic_age: usize,
    vic_race: usize,
    vic_sex: usize,
    juris_code: usize,
    juris_desc: usize,
    premise_desc: usize,
    x_coord: usize,
    y_coord: usize,
    latitude: usize,
    longitude: usize,
}

impl RecordColumns {
    fn resolve(table: &Table) -> ReportResult<Self> {
        Ok(Self {
            complaint_num: table.column_index("complaint_num")?,
            precinct: table.column_index("precinct_num")?,
            borough: table.column_index("borough")?,
            date_start: table.column_index("date_start")?,
            time_start: table.column_index("time_start")?,
            date_end: table.column_index("date_end")?,
            time_end: table.column_index("time_end")?,
            report_date: table.column_index("report_date")?,
            status: table.column_index("status")?,
            offense_code: table.column_index("offense_code")?,
            offense_desc: table.column_index("offense_desc")?,
            internal_code: table.column_index("internal_code")?,
            internal_desc: table.column_index("internal_desc")?,
            offense_level: table.column_index("offense_level")?,
            susp_age: table.column_index("susp_age")?,
            susp_race: table.column_index("susp_race")?,
            susp_sex: table.column_index("susp_sex")?,
            vic_age: table.column_index("vic_age")?,
            vic_race: table.column_index("vic_race")?,
            vic_sex: table.column_index("vic_sex")?,
            juris_code: table.column_index("juris_code")?,
            juris_desc: table.column_index("juris_desc")?,
            premise_desc: table.column_index("premise_desc")?,
            x_coord: table.column_index("x_coord")?,
            y_coord: table.column_index("y_coord")?,
            latitude: table.column_index("latitude")?,
            longitude: table.column_index("longitude")?,
        })
    }
}

/// Build typed records from a pruned and renamed table.
///
/// A missing column is fatal. A malformed value only empties its field:
/// dates stay unparsed here and are handled by the cleaning steps, times
/// and the report date are parsed leniently with the given formats.
pub fn build_records(
    table: &Table,
    date_format: &str,
    time_format: &str,
) -> ReportResult<Vec<ComplaintRecord>> {
    let cols = RecordColumns::resolve(table)?;
    let records = table
        .rows()
        .iter()
        .map(|row| {
            let text = |idx: usize| row[idx].to_text();
            let time = |idx: usize| {
                text(idx).and_then(|t| NaiveTime::parse_from_str(&t, time_format).ok())
            };
            ComplaintRecord {
                complaint_num: text(cols.complaint_num).unwrap_or_default(),
                precinct: row[cols.precinct]
                    .as_i64()
                    .and_then(|p| Precinct::try_from(p).ok()),
                borough: text(cols.borough),
                date_start_text: text(cols.date_start),
                date_start: None,
                time_start: time(cols.time_start),
                date_end_text: text(cols.date_end),
                date_end: None,
                date_end_missing: false,
                time_end: time(cols.time_end),
                report_date: text(cols.report_date)
                    .and_then(|t| NaiveDate::parse_from_str(&t, date_format).ok()),
                status: text(cols.status).and_then(|s| CompletionStatus::parse(&s)),
                offense_code: row[cols.offense_code].as_i64(),
                offense_desc: text(cols.offense_desc),
                internal_code: row[cols.internal_code].as_i64(),
                internal_desc: text(cols.internal_desc),
                offense_level: text(cols.offense_level).and_then(|l| OffenseLevel::parse(&l)),
                suspect: Demographics {
                    age_group: text(cols.susp_age),
                    race: text(cols.susp_race),
                    sex: text(cols.susp_sex),
                },
                victim: Demographics {
                    age_group: text(cols.vic_age),
                    race: text(cols.vic_race),
                    sex: text(cols.vic_sex),
                },
                juris_code: row[cols.juris_code].as_i64(),
                juris_desc: text(cols.juris_desc),
                premise_desc: text(cols.premise_desc),
                location: GeoLocation {
                    x_coord: coordinate(&row[cols.x_coord]),
                    y_coord: coordinate(&row[cols.y_coord]),
                    latitude: coordinate(&row[cols.latitude]),
                    longitude: coordinate(&row[cols.longitude]),
                },
            }
        })
        .collect();
    Ok(records)
}

fn coordinate(cell: &Cell) -> Option<f64> {
    cell.as_f64().filter(|v| v.is_finite())
}
