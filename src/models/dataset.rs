use std::collections::{BTreeSet, HashMap};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{ProcessingError, Result};
use crate::models::WeatherRecord;

/// Immutable, date-ordered collection of daily records.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WeatherDataset {
    records: Vec<WeatherRecord>,
}

impl WeatherDataset {
    /// Build a dataset, sorting by date and rejecting malformed rows or
    /// repeated dates.
    ///
    /// Errors carry the 1-based position in `records`; for a repeated date
    /// that is the second occurrence.
    pub fn new(mut records: Vec<WeatherRecord>) -> Result<Self> {
        let mut seen: HashMap<NaiveDate, usize> = HashMap::with_capacity(records.len());
        for (i, record) in records.iter().enumerate() {
            let row = i + 1;
            record.check_well_formed(row)?;
            if let Some(first) = seen.insert(record.date, row) {
                return Err(ProcessingError::malformed(
                    row,
                    format!("duplicate date {} (first seen at row {})", record.date, first),
                ));
            }
        }

        records.sort_by_key(|r| r.date);
        Ok(Self { records })
    }

    /// Subsets of an already-validated dataset skip the checks.
    pub(crate) fn from_ordered(records: Vec<WeatherRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[WeatherRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, WeatherRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        match (self.records.first(), self.records.last()) {
            (Some(first), Some(last)) => Some((first.date, last.date)),
            _ => None,
        }
    }

    /// Records sorted newest to oldest, for raw table views.
    pub fn newest_first(&self) -> Vec<&WeatherRecord> {
        self.records.iter().rev().collect()
    }
}

impl<'a> IntoIterator for &'a WeatherDataset {
    type Item = &'a WeatherRecord;
    type IntoIter = std::slice::Iter<'a, WeatherRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Non-empty set of calendar years.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<i32>", into = "Vec<i32>")]
pub struct YearSelection {
    years: BTreeSet<i32>,
}

impl YearSelection {
    pub fn new<I>(years: I) -> Result<Self>
    where
        I: IntoIterator<Item = i32>,
    {
        let years: BTreeSet<i32> = years.into_iter().collect();
        if years.is_empty() {
            return Err(ProcessingError::InvalidSelection);
        }
        Ok(Self { years })
    }

    pub fn contains(&self, year: i32) -> bool {
        self.years.contains(&year)
    }

    pub fn years(&self) -> impl Iterator<Item = i32> + '_ {
        self.years.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.years.len()
    }

    pub fn label(&self) -> String {
        self.years
            .iter()
            .map(|y| y.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl TryFrom<Vec<i32>> for YearSelection {
    type Error = ProcessingError;

    fn try_from(years: Vec<i32>) -> Result<Self> {
        YearSelection::new(years)
    }
}

impl From<YearSelection> for Vec<i32> {
    fn from(selection: YearSelection) -> Self {
        selection.years.into_iter().collect()
    }
}
