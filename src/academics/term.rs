use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Season {
    Spring,
    Summer,
    Fall,
}

impl Season {
    fn from_month(month: u32) -> Self {
        match month {
            1..=5 => Season::Spring,
            6..=7 => Season::Summer,
            _ => Season::Fall,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Season::Spring => "Spring",
            Season::Summer => "Summer",
            Season::Fall => "Fall",
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid term label '{0}', expected '<Spring|Summer|Fall> <year>'")]
pub struct TermParseError(pub String);

/// An academic period such as "Fall 2025".
///
/// Field order matters: the derived ordering compares the year first and
/// then the season.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Term {
    pub year: i32,
    pub season: Season,
}

impl Term {
    pub fn new(season: Season, year: i32) -> Self {
        Self { year, season }
    }

    pub fn containing(date: NaiveDate) -> Self {
        Self::new(Season::from_month(date.month()), date.year())
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.season.as_str(), self.year)
    }
}

impl FromStr for Term {
    type Err = TermParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || TermParseError(s.to_string());
        let mut parts = s.split_whitespace();
        let (Some(season), Some(year), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(err());
        };

        let season = match season.to_ascii_lowercase().as_str() {
            "spring" => Season::Spring,
            "summer" => Season::Summer,
            "fall" => Season::Fall,
            _ => return Err(err()),
        };
        let year: i32 = year.parse().map_err(|_| err())?;
        if !(1900..=9999).contains(&year) {
            return Err(err());
        }

        Ok(Term::new(season, year))
    }
}

impl TryFrom<String> for Term {
    type Error = TermParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Term> for String {
    fn from(term: Term) -> Self {
        term.to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TermPhase {
    Past,
    Current,
    Future,
}

/// Single source of truth for "which term is now".
#[derive(Debug, Clone, Default)]
pub struct TermCalendar {
    pinned: Option<Term>,
}

impl TermCalendar {
    pub fn from_clock() -> Self {
        Self { pinned: None }
    }

    pub fn pinned(term: Term) -> Self {
        Self { pinned: Some(term) }
    }

    pub fn is_pinned(&self) -> bool {
        self.pinned.is_some()
    }

    pub fn current_term(&self, today: NaiveDate) -> Term {
        self.pinned.unwrap_or_else(|| Term::containing(today))
    }

    pub fn classify(&self, term: Term, today: NaiveDate) -> TermPhase {
        match term.cmp(&self.current_term(today)) {
            Ordering::Less => TermPhase::Past,
            Ordering::Equal => TermPhase::Current,
            Ordering::Greater => TermPhase::Future,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_case_insensitive_labels() {
        assert_eq!("fall 2025".parse::<Term>().unwrap(), Term::new(Season::Fall, 2025));
        assert_eq!("  Spring   2024 ".parse::<Term>().unwrap().to_string(), "Spring 2024");
        assert!("Winter 2025".parse::<Term>().is_err());
        assert!("Fall".parse::<Term>().is_err());
        assert!("Fall 2025 extra".parse::<Term>().is_err());
        assert!("Fall twenty".parse::<Term>().is_err());
    }

    #[test]
    fn orders_by_year_then_season() {
        let spring = Term::new(Season::Spring, 2025);
        let fall = Term::new(Season::Fall, 2025);
        let next_spring = Term::new(Season::Spring, 2026);
        assert!(spring < fall);
        assert!(fall < next_spring);
    }

    #[test]
    fn term_containing_uses_month_bands() {
        assert_eq!(Term::containing(date(2025, 5, 31)).season, Season::Spring);
        assert_eq!(Term::containing(date(2025, 6, 1)).season, Season::Summer);
        assert_eq!(Term::containing(date(2025, 7, 31)).season, Season::Summer);
        assert_eq!(Term::containing(date(2025, 8, 1)).season, Season::Fall);
        assert_eq!(Term::containing(date(2025, 12, 31)).season, Season::Fall);
    }

    #[test]
    fn classifies_against_pinned_term() {
        let calendar = TermCalendar::pinned(Term::new(Season::Fall, 2025));
        let today = date(2030, 1, 1);
        assert_eq!(calendar.classify("Spring 2025".parse().unwrap(), today), TermPhase::Past);
        assert_eq!(calendar.classify("Fall 2025".parse().unwrap(), today), TermPhase::Current);
        assert_eq!(calendar.classify("Spring 2026".parse().unwrap(), today), TermPhase::Future);
    }

    #[test]
    fn clock_calendar_follows_today() {
        let calendar = TermCalendar::from_clock();
        assert_eq!(calendar.current_term(date(2026, 3, 10)).to_string(), "Spring 2026");
        assert_eq!(
            calendar.classify("Fall 2025".parse().unwrap(), date(2026, 3, 10)),
            TermPhase::Past
        );
    }

    #[test]
    fn serde_uses_label_form() {
        let term: Term = serde_json::from_str("\"summer 2024\"").unwrap();
        assert_eq!(serde_json::to_string(&term).unwrap(), "\"Summer 2024\"");
        assert!(serde_json::from_str::<Term>("\"nope\"").is_err());
    }
}
