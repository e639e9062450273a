//! Shared fixtures: CSV text in the complaint schema, hand-built or
//! generated from a seeded RNG.

#![allow(dead_code)]

use crimestat_core::config::ReportConfig;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64Mcg;
use std::collections::HashMap;

pub fn header() -> Vec<String> {
    ReportConfig::default().schema.expected_columns
}

/// One raw row with sensible defaults; override any raw column by name.
#[derive(Clone)]
pub struct Row {
    values: HashMap<String, String>,
}

impl Row {
    pub fn new(id: &str) -> Self {
        let defaults = [
            ("CMPLNT_NUM", id),
            ("ADDR_PCT_CD", "75"),
            ("BORO_NM", "BROOKLYN"),
            ("CMPLNT_FR_DT", "03/01/2022"),
            ("CMPLNT_FR_TM", "14:30:00"),
            ("CMPLNT_TO_DT", "03/02/2022"),
            ("CMPLNT_TO_TM", "09:00:00"),
            ("CRM_ATPT_CPTD_CD", "COMPLETED"),
            ("JURISDICTION_CODE", "0"),
            ("JURIS_DESC", "N.Y. POLICE DEPT"),
            ("KY_CD", "578"),
            ("LAW_CAT_CD", "VIOLATION"),
            ("OFNS_DESC", "HARRASSMENT 2"),
            ("PD_CD", "638"),
            ("PD_DESC", "HARASSMENT,SUBD 3,4,5"),
            ("PREM_TYP_DESC", "RESIDENCE - APT. HOUSE"),
            ("RPT_DT", "03/02/2022"),
            ("SUSP_AGE_GROUP", "25-44"),
            ("SUSP_RACE", "BLACK"),
            ("SUSP_SEX", "M"),
            ("VIC_AGE_GROUP", "25-44"),
            ("VIC_RACE", "WHITE HISPANIC"),
            ("VIC_SEX", "F"),
            ("X_COORD_CD", "1015000"),
            ("Y_COORD_CD", "180000"),
            ("Latitude", "40.6701"),
            ("Longitude", "-73.8902"),
        ];
        Self {
            values: defaults
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    pub fn set(mut self, column: &str, value: &str) -> Self {
        self.values.insert(column.to_string(), value.to_string());
        self
    }

    fn fields(&self, header: &[String]) -> Vec<String> {
        header
            .iter()
            .map(|h| self.values.get(h).cloned().unwrap_or_default())
            .collect()
    }
}

pub fn csv_text(rows: &[Row]) -> String {
    let header = header();
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(&header).unwrap();
    for row in rows {
        wtr.write_record(row.fields(&header)).unwrap();
    }
    String::from_utf8(wtr.into_inner().unwrap()).unwrap()
}

const BOROUGHS: [&str; 5] = ["BRONX", "BROOKLYN", "MANHATTAN", "QUEENS", "STATEN ISLAND"];
const OFFENSES: [(&str, &str); 6] = [
    ("HARRASSMENT 2", "VIOLATION"),
    ("PETIT LARCENY", "MISDEMEANOR"),
    ("ASSAULT 3 & RELATED OFFENSES", "MISDEMEANOR"),
    ("FELONY ASSAULT", "FELONY"),
    ("CRIMINAL MISCHIEF & RELATED OF", "MISDEMEANOR"),
    ("OFF. AGNST PUB ORD SENSBLTY &", "MISDEMEANOR"),
];
const AGES: [&str; 8] = ["<18", "18-24", "25-44", "45-64", "65+", "UNKNOWN", "(null)", "-940"];
const RACES: [&str; 5] = ["BLACK", "WHITE", "WHITE HISPANIC", "ASIAN / PACIFIC ISLANDER", "(null)"];
const SEXES: [&str; 4] = ["M", "F", "U", "(null)"];
const LOCATIONS: [(&str, &str); 4] = [
    ("40.750431", "-73.989282"),
    ("40.668602", "-73.931525"),
    ("40.816224", "-73.917193"),
    ("40.7053", "-73.7976"),
];

fn pick<'a>(rng: &mut Pcg64Mcg, items: &[&'a str]) -> &'a str {
    items[rng.gen_range(0..items.len())]
}

fn random_date(rng: &mut Pcg64Mcg) -> String {
    // Mostly in range, some historical, a few malformed years.
    let year = match rng.gen_range(0..20) {
        0 => 1022,
        1..=3 => rng.gen_range(2006..2017),
        _ => rng.gen_range(2017..2023),
    };
    format!("{:02}/{:02}/{year}", rng.gen_range(1..=12), rng.gen_range(1..=28))
}

/// A deterministic synthetic dataset with every quirk the cleaner
/// handles: misspelled labels, null markers, missing and ancient dates.
pub fn synthetic_rows(seed: u64, count: usize) -> Vec<Row> {
    let mut rng = Pcg64Mcg::seed_from_u64(seed);
    (0..count)
        .map(|i| {
            let (offense, level) = OFFENSES[rng.gen_range(0..OFFENSES.len())];
            let (lat, lon) = LOCATIONS[rng.gen_range(0..LOCATIONS.len())];
            let end = match rng.gen_range(0..10) {
                0..=2 => String::new(),
                3 => "not a date".to_string(),
                _ => random_date(&mut rng),
            };
            let start = if rng.gen_range(0..25) == 0 {
                String::new()
            } else {
                random_date(&mut rng)
            };
            Row::new(&format!("{}", 100_000 + i))
                .set("BORO_NM", pick(&mut rng, &BOROUGHS))
                .set("CMPLNT_FR_DT", &start)
                .set("CMPLNT_TO_DT", &end)
                .set("OFNS_DESC", offense)
                .set("LAW_CAT_CD", level)
                .set("SUSP_AGE_GROUP", pick(&mut rng, &AGES))
                .set("SUSP_RACE", pick(&mut rng, &RACES))
                .set("SUSP_SEX", pick(&mut rng, &SEXES))
                .set("VIC_AGE_GROUP", pick(&mut rng, &AGES))
                .set("VIC_RACE", pick(&mut rng, &RACES))
                .set("VIC_SEX", pick(&mut rng, &SEXES))
                .set("Latitude", lat)
                .set("Longitude", lon)
        })
        .collect()
}

pub fn run_pipeline(
    rows: &[Row],
) -> (
    crimestat_core::pipeline::ReportPipeline,
    crimestat_core::pipeline::PipelineOutput,
) {
    let mut pipeline =
        crimestat_core::pipeline::ReportPipeline::new(ReportConfig::default()).unwrap();
    let output = pipeline
        .run_reader(csv_text(rows).as_bytes(), "fixture")
        .unwrap();
    (pipeline, output)
}
