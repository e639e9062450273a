//! Grouped counts and top-N rankings over cleaned records.
//!
//! Everything here is read-only over the record slice. Groups are
//! counted in first-encounter order; rankings use a stable sort, so
//! equal counts keep that order.

use crate::record::{ComplaintRecord, DemographicField};
use chrono::{Datelike, Timelike};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

/// Count records per key, in the order keys are first seen. Records for
/// which `key` returns None are skipped.
pub fn count_by<K, F>(records: &[ComplaintRecord], key: F) -> Vec<(K, usize)>
where
    K: Eq + Hash + Clone,
    F: Fn(&ComplaintRecord) -> Option<K>,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<(K, usize)> = Vec::new();
    for record in records {
        let Some(k) = key(record) else { continue };
        match index.get(&k) {
            Some(&pos) => groups[pos].1 += 1,
            None => {
                index.insert(k.clone(), groups.len());
                groups.push((k, 1));
            }
        }
    }
    groups
}

/// Sort by count, descending. Stable: ties keep their current order.
pub fn rank_descending<K>(groups: &mut [(K, usize)]) {
    groups.sort_by(|a, b| b.1.cmp(&a.1));
}

/// The `n` largest groups, ties resolved by current order.
pub fn top_n<K>(mut groups: Vec<(K, usize)>, n: usize) -> Vec<(K, usize)> {
    rank_descending(&mut groups);
    groups.truncate(n);
    groups
}

// ── Grouping columns ───────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupColumn {
    Borough,
    Precinct,
    OffenseDesc,
    OffenseLevel,
    Status,
    PremiseDesc,
    JurisDesc,
    SuspectAge,
    SuspectRace,
    SuspectSex,
    VictimAge,
    VictimRace,
    VictimSex,
    /// Derived from `date_start`.
    Year,
    /// Zero-padded month number of `date_start`.
    Month,
    /// `date_start` weekday, prefixed with its number from Monday.
    Weekday,
    /// Zero-padded hour of `time_start`.
    Hour,
}

impl GroupColumn {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Borough => "borough",
            Self::Precinct => "precinct_num",
            Self::OffenseDesc => "offense_desc",
            Self::OffenseLevel => "offense_level",
            Self::Status => "status",
            Self::PremiseDesc => "premise_desc",
            Self::JurisDesc => "juris_desc",
            Self::SuspectAge => "susp_age",
            Self::SuspectRace => "susp_race",
            Self::SuspectSex => "susp_sex",
            Self::VictimAge => "vic_age",
            Self::VictimRace => "vic_race",
            Self::VictimSex => "vic_sex",
            Self::Year => "year",
            Self::Month => "month",
            Self::Weekday => "weekday",
            Self::Hour => "hour",
        }
    }

    pub fn value(&self, r: &ComplaintRecord) -> Option<String> {
        let demographic = |field: DemographicField| field.get(r).map(str::to_string);
        match self {
            Self::Borough => r.borough.clone(),
            Self::Precinct => r.precinct.map(|p| p.to_string()),
            Self::OffenseDesc => r.offense_desc.clone(),
            Self::OffenseLevel => r.offense_level.map(|l| l.label().to_string()),
            Self::Status => r.status.map(|s| s.label().to_string()),
            Self::PremiseDesc => r.premise_desc.clone(),
            Self::JurisDesc => r.juris_desc.clone(),
            Self::SuspectAge => demographic(DemographicField::SuspectAge),
            Self::SuspectRace => demographic(DemographicField::SuspectRace),
            Self::SuspectSex => demographic(DemographicField::SuspectSex),
            Self::VictimAge => demographic(DemographicField::VictimAge),
            Self::VictimRace => demographic(DemographicField::VictimRace),
            Self::VictimSex => demographic(DemographicField::VictimSex),
            Self::Year => r.date_start.map(|d| d.year().to_string()),
            Self::Month => r.date_start.map(|d| format!("{:02}", d.month())),
            Self::Weekday => r
                .date_start
                .map(|d| format!("{} {}", d.weekday().number_from_monday(), d.weekday())),
            Self::Hour => r.time_start.map(|t| format!("{:02}", t.hour())),
        }
    }
}

// ── Queries ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupCount {
    pub key: Vec<String>,
    pub count: usize,
}

impl GroupCount {
    pub fn label(&self) -> String {
        self.key.join(" / ")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregateTable {
    pub columns: Vec<GroupColumn>,
    pub rows: Vec<GroupCount>,
}

impl AggregateTable {
    pub fn total(&self) -> usize {
        self.rows.iter().map(|r| r.count).sum()
    }

    /// (category, count) pairs, the renderer's input shape.
    pub fn series(&self) -> Vec<(String, usize)> {
        self.rows.iter().map(|r| (r.label(), r.count)).collect()
    }

    pub fn count_of(&self, key: &[&str]) -> Option<usize> {
        self.rows
            .iter()
            .find(|r| r.key.iter().map(String::as_str).eq(key.iter().copied()))
            .map(|r| r.count)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowOrder {
    /// First-encounter order of the keys.
    Encounter,
    /// Count descending, ties in encounter order.
    CountDesc,
    /// Key ascending (lexicographic per column).
    KeyAsc,
}

type Predicate<'f> = Box<dyn Fn(&ComplaintRecord) -> bool + 'f>;

/// A grouped count: key columns, optional pre-filter, optional exclusion
/// threshold and optional top-N limit.
pub struct GroupQuery<'f> {
    columns: Vec<GroupColumn>,
    filter: Option<Predicate<'f>>,
    exclude_at_or_below: Option<usize>,
    limit: Option<usize>,
    order: RowOrder,
}

impl<'f> GroupQuery<'f> {
    pub fn by(column: GroupColumn) -> Self {
        Self::by_columns(vec![column])
    }

    pub fn by_columns(columns: Vec<GroupColumn>) -> Self {
        Self {
            columns,
            filter: None,
            exclude_at_or_below: None,
            limit: None,
            order: RowOrder::Encounter,
        }
    }

    pub fn filter(mut self, predicate: impl Fn(&ComplaintRecord) -> bool + 'f) -> Self {
        self.filter = Some(Box::new(predicate));
        self
    }

    /// Drop groups whose count is at or below `threshold`.
    pub fn exclude_at_or_below(mut self, threshold: usize) -> Self {
        self.exclude_at_or_below = Some(threshold);
        self
    }

    /// Keep the `n` largest groups. Implies count-descending order.
    pub fn top(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self.order = RowOrder::CountDesc;
        self
    }

    pub fn order(mut self, order: RowOrder) -> Self {
        self.order = order;
        self
    }

    pub fn run(&self, records: &[ComplaintRecord]) -> AggregateTable {
        let mut groups = count_by(records, |r| {
            if let Some(filter) = &self.filter {
                if !filter(r) {
                    return None;
                }
            }
            self.columns
                .iter()
                .map(|c| c.value(r))
                .collect::<Option<Vec<String>>>()
        });

        if let Some(threshold) = self.exclude_at_or_below {
            groups.retain(|(_, count)| *count > threshold);
        }

        match self.order {
            RowOrder::Encounter => {}
            RowOrder::CountDesc => rank_descending(&mut groups),
            RowOrder::KeyAsc => groups.sort_by(|a, b| a.0.cmp(&b.0)),
        }

        if let Some(n) = self.limit {
            groups.truncate(n);
        }

        AggregateTable {
            columns: self.columns.clone(),
            rows: groups
                .into_iter()
                .map(|(key, count)| GroupCount { key, count })
                .collect(),
        }
    }
}

// ── Specialised aggregates ─────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct YearlyTopOffense {
    pub year: i32,
    pub offense_desc: String,
    pub count: usize,
}

/// The most frequent offense of each start year, years ascending. Ties
/// go to the offense encountered first.
pub fn top_offense_per_year(records: &[ComplaintRecord]) -> Vec<YearlyTopOffense> {
    let groups = count_by(records, |r| {
        Some((r.date_start?.year(), r.offense_desc.clone()?))
    });

    let mut best: BTreeMap<i32, (String, usize)> = BTreeMap::new();
    for ((year, desc), count) in groups {
        let replace = best.get(&year).map_or(true, |(_, top)| count > *top);
        if replace {
            best.insert(year, (desc, count));
        }
    }

    best.into_iter()
        .map(|(year, (offense_desc, count))| YearlyTopOffense {
            year,
            offense_desc,
            count,
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LocationCount {
    pub latitude: f64,
    pub longitude: f64,
    pub count: usize,
}

/// The `n` most frequent (latitude, longitude) pairs, count descending.
/// Records without both coordinates are skipped.
pub fn top_locations(records: &[ComplaintRecord], n: usize) -> Vec<LocationCount> {
    // f64 is not Hash; group on the bit patterns.
    let groups = count_by(records, |r| {
        r.location
            .lat_lon()
            .map(|(lat, lon)| (lat.to_bits(), lon.to_bits()))
    });
    top_n(groups, n)
        .into_iter()
        .map(|((lat, lon), count)| LocationCount {
            latitude: f64::from_bits(lat),
            longitude: f64::from_bits(lon),
            count,
        })
        .collect()
}
