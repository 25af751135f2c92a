// src/process/record.rs
use std::collections::{btree_map, BTreeMap};
use std::fmt;

/// Number of columns kept from each source row.
pub const FIELD_COUNT: usize = 18;

/// The projected column set, in output order.
pub const SELECTED_FIELDS: [&str; FIELD_COUNT] = [
    "Year",
    "Month",
    "DayofMonth",
    "DayOfWeek",
    "FlightDate",
    "UniqueCarrier",
    "FlightNum",
    "Origin",
    "Dest",
    "CRSDepTime",
    "DepTime",
    "DepDelay",
    "DepDelayMinutes",
    "CRSArrTime",
    "ArrTime",
    "ArrDelay",
    "ArrDelayMinutes",
    "Cancelled",
];

const YEAR: usize = 0;
const MONTH: usize = 1;
const DAY_OF_MONTH: usize = 2;

/// One source row reduced to exactly the `SELECTED_FIELDS` columns.
/// Values are the raw strings from the source, in `SELECTED_FIELDS` order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectedRecord {
    values: [String; FIELD_COUNT],
}

impl ProjectedRecord {
    pub fn new(values: [String; FIELD_COUNT]) -> Self {
        Self { values }
    }

    /// Look up a value by column name. `None` for names outside the fixed set.
    pub fn get(&self, field: &str) -> Option<&str> {
        SELECTED_FIELDS
            .iter()
            .position(|f| *f == field)
            .map(|i| self.values[i].as_str())
    }

    pub fn values(&self) -> &[String; FIELD_COUNT] {
        &self.values
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        SELECTED_FIELDS
            .iter()
            .copied()
            .zip(self.values.iter().map(String::as_str))
    }

    /// Parse the grouping key out of `Year`, `Month` and `DayofMonth`.
    pub fn date_key(&self) -> Result<DateKey, DateKeyError> {
        let year = parse_component("Year", &self.values[YEAR])?;
        let month = parse_component("Month", &self.values[MONTH])?;
        let day = parse_component("DayofMonth", &self.values[DAY_OF_MONTH])?;
        Ok(DateKey { year, month, day })
    }
}

fn parse_component<T: std::str::FromStr>(field: &'static str, raw: &str) -> Result<T, DateKeyError> {
    raw.trim().parse::<T>().map_err(|_| DateKeyError {
        field,
        value: raw.to_string(),
    })
}

/// A grouping field that is not a decimal integer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateKeyError {
    pub field: &'static str,
    pub value: String,
}

impl fmt::Display for DateKeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} is not an integer: {:?}", self.field, self.value)
    }
}

/// Calendar-day partition key. Values are taken as-is from the source row;
/// no calendar validation happens here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateKey {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl DateKey {
    pub fn new(year: i32, month: u32, day: u32) -> Self {
        Self { year, month, day }
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

/// Records bucketed by calendar day. Buckets iterate in date order;
/// records inside a bucket keep their source row order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateIndex {
    days: BTreeMap<DateKey, Vec<ProjectedRecord>>,
}

impl DateIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: DateKey, record: ProjectedRecord) {
        self.days.entry(key).or_default().push(record);
    }

    pub fn get(&self, key: &DateKey) -> Option<&[ProjectedRecord]> {
        self.days.get(key).map(Vec::as_slice)
    }

    /// Number of day buckets.
    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Sum of all bucket sizes.
    pub fn total_records(&self) -> usize {
        self.days.values().map(Vec::len).sum()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, DateKey, Vec<ProjectedRecord>> {
        self.days.iter()
    }
}

impl<'a> IntoIterator for &'a DateIndex {
    type Item = (&'a DateKey, &'a Vec<ProjectedRecord>);
    type IntoIter = btree_map::Iter<'a, DateKey, Vec<ProjectedRecord>>;

    fn into_iter(self) -> Self::IntoIter {
        self.days.iter()
    }
}

#[cfg(test)]
const FLIGHT_NUM: usize = 6;

#[cfg(test)]
pub(crate) fn record_for(year: &str, month: &str, day: &str, flight: &str) -> ProjectedRecord {
    let mut values: [String; FIELD_COUNT] = Default::default();
    values[YEAR] = year.to_string();
    values[MONTH] = month.to_string();
    values[DAY_OF_MONTH] = day.to_string();
    values[FLIGHT_NUM] = flight.to_string();
    ProjectedRecord::new(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_key_parses_padded_and_spaced_values() {
        let rec = record_for("2015", "03", " 9", "1");
        assert_eq!(rec.date_key().unwrap(), DateKey::new(2015, 3, 9));
    }

    #[test]
    fn date_key_reports_offending_field() {
        let rec = record_for("2015", "March", "9", "1");
        let err = rec.date_key().unwrap_err();
        assert_eq!(err.field, "Month");
        assert_eq!(err.value, "March");
    }

    #[test]
    fn get_only_answers_for_selected_fields() {
        let rec = record_for("2020", "1", "2", "UA100");
        assert_eq!(SELECTED_FIELDS[FLIGHT_NUM], "FlightNum");
        assert_eq!(rec.get("FlightNum"), Some("UA100"));
        assert_eq!(rec.get("TailNum"), None);
        assert_eq!(rec.iter().count(), FIELD_COUNT);
    }

    #[test]
    fn index_keeps_insertion_order_within_a_day() {
        let mut idx = DateIndex::new();
        let key = DateKey::new(2020, 1, 1);
        idx.insert(key, record_for("2020", "1", "1", "a"));
        idx.insert(DateKey::new(2019, 12, 31), record_for("2019", "12", "31", "z"));
        idx.insert(key, record_for("2020", "1", "1", "b"));

        let flights: Vec<_> = idx
            .get(&key)
            .unwrap()
            .iter()
            .map(|r| r.get("FlightNum").unwrap())
            .collect();
        assert_eq!(flights, ["a", "b"]);
        assert_eq!(idx.len(), 2);
        assert_eq!(idx.total_records(), 3);

        // buckets come back in date order
        let first = idx.iter().next().map(|(k, _)| *k);
        assert_eq!(first, Some(DateKey::new(2019, 12, 31)));
    }
}
