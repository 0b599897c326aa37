//! Series identifiers, the catalogue of series the pipelines use, and date ranges.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A remote series identifier paired with the logical column name it
/// becomes once downloaded (e.g. `CLF16OV` → `Total_US_Labor_Force`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SeriesSpec {
    pub id: String,
    pub name: String,
}

impl SeriesSpec {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    /// Parse `ID=Name` or a bare `ID`.
    ///
    /// A bare identifier is looked up in the catalogue; unknown identifiers
    /// use the identifier itself as the column name.
    pub fn parse(s: &str) -> Self {
        match s.split_once('=') {
            Some((id, name)) => Self::new(id.trim(), name.trim()),
            None => {
                let id = s.trim();
                KnownSeries::lookup(id)
                    .map(|k| k.spec())
                    .unwrap_or_else(|| Self::new(id, id))
            }
        }
    }
}

impl fmt::Display for SeriesSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}

/// A series from the built-in catalogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KnownSeries {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

impl KnownSeries {
    pub const FOREIGN_BORN_LABOR_FORCE: Self = Self {
        id: "LNU01073395",
        name: "Foreign_Born_Labor_Force",
        description: "Civilian labor force level, foreign born (thousands)",
    };
    pub const FOREIGN_BORN_EMPLOYMENT: Self = Self {
        id: "LNU02073395",
        name: "Foreign_Born_Employment",
        description: "Employment level, foreign born (thousands)",
    };
    pub const FOREIGN_BORN_LF_PARTICIPATION: Self = Self {
        id: "LNU01373395",
        name: "Foreign_Born_LF_Participation",
        description: "Labor force participation rate, foreign born (%)",
    };
    pub const FOREIGN_BORN_UNEMPLOYMENT: Self = Self {
        id: "LNU04073395",
        name: "Foreign_Born_Unemployment_Rate",
        description: "Unemployment rate, foreign born (%)",
    };
    // CPS native-born series share the 073413 suffix.
    pub const NATIVE_BORN_LABOR_FORCE: Self = Self {
        id: "LNU01073413",
        name: "Native_Born_Labor_Force_Reported",
        description: "Civilian labor force level, native born (thousands)",
    };
    pub const NATIVE_BORN_UNEMPLOYMENT: Self = Self {
        id: "LNU04073413",
        name: "Native_Born_Unemployment_Rate",
        description: "Unemployment rate, native born (%)",
    };
    pub const TOTAL_LABOR_FORCE: Self = Self {
        id: "CLF16OV",
        name: "Total_US_Labor_Force",
        description: "Civilian labor force level, 16 years and over (thousands)",
    };
    pub const TOTAL_EMPLOYMENT: Self = Self {
        id: "CE16OV",
        name: "Total_US_Employment",
        description: "Employment level, 16 years and over (thousands)",
    };
    pub const TOTAL_LF_PARTICIPATION: Self = Self {
        id: "CIVPART",
        name: "Total_US_LF_Participation",
        description: "Labor force participation rate (%)",
    };

    pub const ALL: [Self; 9] = [
        Self::FOREIGN_BORN_LABOR_FORCE,
        Self::FOREIGN_BORN_EMPLOYMENT,
        Self::FOREIGN_BORN_LF_PARTICIPATION,
        Self::FOREIGN_BORN_UNEMPLOYMENT,
        Self::NATIVE_BORN_LABOR_FORCE,
        Self::NATIVE_BORN_UNEMPLOYMENT,
        Self::TOTAL_LABOR_FORCE,
        Self::TOTAL_EMPLOYMENT,
        Self::TOTAL_LF_PARTICIPATION,
    ];

    pub fn lookup(id: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.id == id)
    }

    pub fn spec(&self) -> SeriesSpec {
        SeriesSpec::new(self.id, self.name)
    }

    /// Foreign-born inputs to the native-born derivation.
    pub fn foreign_born_inputs() -> [SeriesSpec; 3] {
        [
            Self::FOREIGN_BORN_LABOR_FORCE.spec(),
            Self::FOREIGN_BORN_EMPLOYMENT.spec(),
            Self::FOREIGN_BORN_LF_PARTICIPATION.spec(),
        ]
    }

    /// Whole-population inputs to the native-born derivation.
    pub fn total_us_inputs() -> [SeriesSpec; 3] {
        [
            Self::TOTAL_LABOR_FORCE.spec(),
            Self::TOTAL_EMPLOYMENT.spec(),
            Self::TOTAL_LF_PARTICIPATION.spec(),
        ]
    }
}

/// Inclusive date range for a fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Everything from `start` onwards.
    pub fn starting(start: NaiveDate) -> Self {
        Self {
            start,
            end: NaiveDate::MAX,
        }
    }

    /// January 1 of `start_year` through December 31 of `end_year`.
    pub fn years(start_year: i32, end_year: i32) -> Option<Self> {
        Some(Self {
            start: NaiveDate::from_ymd_opt(start_year, 1, 1)?,
            end: NaiveDate::from_ymd_opt(end_year, 12, 31)?,
        })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    pub fn start_year(&self) -> i32 {
        self.start.year()
    }

    pub fn end_year(&self) -> i32 {
        self.end.year()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_named_pair() {
        let spec = SeriesSpec::parse("CLF16OV=Total_US_Labor_Force");
        assert_eq!(spec, SeriesSpec::new("CLF16OV", "Total_US_Labor_Force"));
    }

    #[test]
    fn parse_bare_known_id_uses_catalogue_name() {
        let spec = SeriesSpec::parse("CIVPART");
        assert_eq!(spec.name, "Total_US_LF_Participation");
    }

    #[test]
    fn parse_bare_unknown_id_uses_id_as_name() {
        let spec = SeriesSpec::parse("UNRATE");
        assert_eq!(spec, SeriesSpec::new("UNRATE", "UNRATE"));
    }

    #[test]
    fn native_born_series_use_the_073413_ids() {
        assert_eq!(
            KnownSeries::lookup("LNU01073413"),
            Some(KnownSeries::NATIVE_BORN_LABOR_FORCE)
        );
        assert_eq!(
            KnownSeries::lookup("LNU04073413"),
            Some(KnownSeries::NATIVE_BORN_UNEMPLOYMENT)
        );
        assert_eq!(KnownSeries::lookup("LNU01073391"), None);
    }

    #[test]
    fn catalogue_ids_are_unique() {
        let mut ids: Vec<&str> = KnownSeries::ALL.iter().map(|k| k.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), KnownSeries::ALL.len());
    }

    #[test]
    fn year_range_covers_whole_years() {
        let range = DateRange::years(2015, 2024).unwrap();
        assert!(range.contains(NaiveDate::from_ymd_opt(2015, 1, 1).unwrap()));
        assert!(range.contains(NaiveDate::from_ymd_opt(2024, 12, 31).unwrap()));
        assert!(!range.contains(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()));
        assert_eq!((range.start_year(), range.end_year()), (2015, 2024));
    }
}
