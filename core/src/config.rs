use crate::error::{ReportError, ReportResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub const CONFIG_FILE: &str = "report_config.json";

// ── Schema ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ColumnRename {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaConfig {
    /// Raw header names the input must contain.
    pub expected_columns: Vec<String>,
    /// Raw columns read as free text regardless of what they look like.
    pub text_columns: Vec<String>,
    /// Raw columns dropped before anything else happens.
    pub dropped_columns: Vec<String>,
    /// Raw → normalized names, applied after pruning.
    pub column_renames: Vec<ColumnRename>,
}

// ── Cleaning ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LabelSubstitution {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleaningConfig {
    /// chrono format of the raw date columns.
    pub date_format: String,
    /// chrono format of the raw time columns.
    pub time_format: String,
    /// Earliest date kept by the range filter.
    pub min_date: NaiveDate,
    /// Raw text substituted for a missing end date. Must parse with
    /// `date_format`.
    pub end_date_placeholder: String,
    /// Marker the source uses for an unrecorded demographic value.
    pub null_marker: String,
    pub unknown_label: String,
    pub label_substitutions: Vec<LabelSubstitution>,
}

// ── Aggregation ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregationConfig {
    /// Limit for the ranked top-N sections (offenses, premises).
    pub top_n: usize,
    /// Limit for the most frequent coordinates.
    pub top_locations: usize,
    /// Groups with a count at or below this are dropped from the
    /// victim age section.
    pub min_group_count: usize,
}

// ── Rendering ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    pub chart_width: u32,
    /// Height of one bar slot in horizontal charts.
    pub bar_slot: u32,
    pub map_width: u32,
    pub map_height: u32,
    pub bar_color: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    pub schema: SchemaConfig,
    pub cleaning: CleaningConfig,
    pub aggregation: AggregationConfig,
    pub render: RenderConfig,
}

impl ReportConfig {
    /// Load `report_config.json` from the data/ directory.
    /// In tests, use ReportConfig::default().
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let path = format!("{data_dir}/{CONFIG_FILE}");
        let content = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: ReportConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Like `load`, but falls back to the built-in defaults when the
    /// file does not exist. A file that exists but is invalid is still
    /// an error.
    pub fn load_or_default(data_dir: &str) -> anyhow::Result<Self> {
        let path = std::path::Path::new(data_dir).join(CONFIG_FILE);
        if path.exists() {
            Self::load(data_dir)
        } else {
            log::info!("{} not found, using built-in config", path.display());
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> ReportResult<()> {
        self.end_date_placeholder()?;

        let sources: HashSet<&str> = self
            .cleaning
            .label_substitutions
            .iter()
            .map(|s| s.from.as_str())
            .collect();
        if let Some(chained) = self
            .cleaning
            .label_substitutions
            .iter()
            .find(|s| sources.contains(s.to.as_str()))
        {
            return Err(ReportError::InvalidConfig(format!(
                "label substitution target '{}' is also a source",
                chained.to
            )));
        }

        let mut targets = HashSet::new();
        for rename in &self.schema.column_renames {
            if !targets.insert(rename.to.as_str()) {
                return Err(ReportError::InvalidConfig(format!(
                    "column '{}' is the target of more than one rename",
                    rename.to
                )));
            }
        }

        if self.aggregation.top_n == 0 || self.aggregation.top_locations == 0 {
            return Err(ReportError::InvalidConfig(
                "top-N limits must be positive".into(),
            ));
        }
        Ok(())
    }

    /// The placeholder end date, parsed.
    pub fn end_date_placeholder(&self) -> ReportResult<NaiveDate> {
        NaiveDate::parse_from_str(
            &self.cleaning.end_date_placeholder,
            &self.cleaning.date_format,
        )
        .map_err(|e| {
            ReportError::InvalidConfig(format!(
                "end_date_placeholder '{}' does not match '{}': {e}",
                self.cleaning.end_date_placeholder, self.cleaning.date_format
            ))
        })
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn renames(pairs: &[(&str, &str)]) -> Vec<ColumnRename> {
    pairs
        .iter()
        .map(|(from, to)| ColumnRename {
            from: from.to_string(),
            to: to.to_string(),
        })
        .collect()
}

impl Default for ReportConfig {
    /// Mirrors data/report_config.json.
    fn default() -> Self {
        Self {
            schema: SchemaConfig {
                expected_columns: strings(&[
                    "CMPLNT_NUM", "ADDR_PCT_CD", "BORO_NM", "CMPLNT_FR_DT",
                    "CMPLNT_FR_TM", "CMPLNT_TO_DT", "CMPLNT_TO_TM", "CRM_ATPT_CPTD_CD",
                    "HADEVELOPT", "HOUSING_PSA", "JURISDICTION_CODE", "JURIS_DESC",
                    "KY_CD", "LAW_CAT_CD", "LOC_OF_OCCUR_DESC", "OFNS_DESC",
                    "PARKS_NM", "PATROL_BORO", "PD_CD", "PD_DESC",
                    "PREM_TYP_DESC", "RPT_DT", "STATION_NAME", "SUSP_AGE_GROUP",
                    "SUSP_RACE", "SUSP_SEX", "TRANSIT_DISTRICT", "VIC_AGE_GROUP",
                    "VIC_RACE", "VIC_SEX", "X_COORD_CD", "Y_COORD_CD",
                    "Latitude", "Longitude", "Lat_Lon",
                ]),
                text_columns: strings(&[
                    "CMPLNT_NUM", "ADDR_PCT_CD", "BORO_NM", "CMPLNT_FR_DT", "CMPLNT_TO_DT",
                ]),
                dropped_columns: strings(&[
                    "HADEVELOPT", "HOUSING_PSA", "LOC_OF_OCCUR_DESC", "PARKS_NM",
                    "PATROL_BORO", "STATION_NAME", "TRANSIT_DISTRICT", "Lat_Lon",
                ]),
                column_renames: renames(&[
                    ("CMPLNT_NUM", "complaint_num"),
                    ("ADDR_PCT_CD", "precinct_num"),
                    ("BORO_NM", "borough"),
                    ("CMPLNT_FR_DT", "date_start"),
                    ("CMPLNT_FR_TM", "time_start"),
                    ("CMPLNT_TO_DT", "date_end"),
                    ("CMPLNT_TO_TM", "time_end"),
                    ("CRM_ATPT_CPTD_CD", "status"),
                    ("JURISDICTION_CODE", "juris_code"),
                    ("JURIS_DESC", "juris_desc"),
                    ("KY_CD", "offense_code"),
                    ("LAW_CAT_CD", "offense_level"),
                    ("OFNS_DESC", "offense_desc"),
                    ("PD_CD", "internal_code"),
                    ("PD_DESC", "internal_desc"),
                    ("PREM_TYP_DESC", "premise_desc"),
                    ("RPT_DT", "report_date"),
                    ("SUSP_AGE_GROUP", "susp_age"),
                    ("SUSP_RACE", "susp_race"),
                    ("SUSP_SEX", "susp_sex"),
                    ("VIC_AGE_GROUP", "vic_age"),
                    ("VIC_RACE", "vic_race"),
                    ("VIC_SEX", "vic_sex"),
                    ("X_COORD_CD", "x_coord"),
                    ("Y_COORD_CD", "y_coord"),
                    ("Latitude", "latitude"),
                    ("Longitude", "longitude"),
                ]),
            },
            cleaning: CleaningConfig {
                date_format: "%m/%d/%Y".into(),
                time_format: "%H:%M:%S".into(),
                min_date: NaiveDate::from_ymd_opt(2017, 1, 1).unwrap_or(NaiveDate::MIN),
                end_date_placeholder: "01/01/1900".into(),
                null_marker: "(null)".into(),
                unknown_label: "UNKNOWN".into(),
                label_substitutions: vec![
                    LabelSubstitution {
                        from: "HARRASSMENT 2".into(),
                        to: "HARASSMENT".into(),
                    },
                    LabelSubstitution {
                        from: "OFF. AGNST PUB ORD SENSBLTY &".into(),
                        to: "OFFENSES AGAINST PUBLIC ORDER SENSIBILITY".into(),
                    },
                    LabelSubstitution {
                        from: "CRIMINAL MISCHIEF & RELATED OF".into(),
                        to: "CRIMINAL MISCHIEF & RELATED OFFENSES".into(),
                    },
                ],
            },
            aggregation: AggregationConfig {
                top_n: 10,
                top_locations: 10,
                min_group_count: 5,
            },
            render: RenderConfig {
                chart_width: 720,
                bar_slot: 28,
                map_width: 720,
                map_height: 720,
                bar_color: "#2563eb".into(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = ReportConfig::default();
        config.validate().unwrap();
        assert_eq!(
            config.end_date_placeholder().unwrap(),
            NaiveDate::from_ymd_opt(1900, 1, 1).unwrap()
        );
        assert_eq!(config.schema.expected_columns.len(), 35);
    }

    #[test]
    fn chained_substitutions_are_rejected() {
        let mut config = ReportConfig::default();
        config.cleaning.label_substitutions.push(LabelSubstitution {
            from: "HARASSMENT".into(),
            to: "HARASSMENT (ALL)".into(),
        });
        assert!(matches!(
            config.validate(),
            Err(ReportError::InvalidConfig(_))
        ));
    }

    #[test]
    fn bad_placeholder_is_rejected() {
        let mut config = ReportConfig::default();
        config.cleaning.end_date_placeholder = "1900-01-01".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn shipped_config_matches_defaults() {
        let data_dir = concat!(env!("CARGO_MANIFEST_DIR"), "/../data");
        let loaded = ReportConfig::load(data_dir).unwrap();
        let builtin = ReportConfig::default();
        assert_eq!(loaded.schema.column_renames, builtin.schema.column_renames);
        assert_eq!(
            loaded.cleaning.label_substitutions,
            builtin.cleaning.label_substitutions
        );
        assert_eq!(loaded.cleaning.min_date, builtin.cleaning.min_date);
    }
}
