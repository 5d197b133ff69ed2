use std::env;
use std::net::SocketAddr;
use std::str::FromStr;

use crate::academics::{DEFAULT_COMPLETION_GRADE, Term, TermCalendar, grading};
use crate::error::AppError;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub max_connections: u32,
    /// Overrides the clock-derived current term, e.g. "Fall 2025".
    pub current_term: Option<Term>,
    pub default_completion_grade: f64,
    pub metrics_interval_secs: u64,
    pub sweep_interval_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite://campus.db?mode=rwc".to_string(),
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            max_connections: 5,
            current_term: None,
            default_completion_grade: DEFAULT_COMPLETION_GRADE,
            metrics_interval_secs: 30,
            sweep_interval_secs: 3600,
        }
    }
}

impl AppConfig {
    pub fn new_from_env() -> Result<Self, AppError> {
        let defaults = Self::default();

        let default_completion_grade =
            parse_var("DEFAULT_COMPLETION_GRADE", defaults.default_completion_grade)?;
        if !grading::is_valid_grade(default_completion_grade) {
            return Err(AppError::Config(format!(
                "DEFAULT_COMPLETION_GRADE must be within 0.0..=4.0, got {}",
                default_completion_grade
            )));
        }

        let current_term = match env::var("CURRENT_TERM") {
            Ok(raw) if !raw.trim().is_empty() => Some(
                raw.parse::<Term>()
                    .map_err(|e| AppError::Config(format!("CURRENT_TERM: {}", e)))?,
            ),
            _ => None,
        };

        Ok(Self {
            database_url: env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            bind_addr: parse_var("BIND_ADDR", defaults.bind_addr)?,
            max_connections: parse_var("DB_MAX_CONNECTIONS", defaults.max_connections)?,
            current_term,
            default_completion_grade,
            metrics_interval_secs: parse_var("METRICS_INTERVAL_SECS", defaults.metrics_interval_secs)?,
            sweep_interval_secs: parse_var("SWEEP_INTERVAL_SECS", defaults.sweep_interval_secs)?,
        })
    }

    pub fn term_calendar(&self) -> TermCalendar {
        match self.current_term {
            Some(term) => TermCalendar::pinned(term),
            None => TermCalendar::from_clock(),
        }
    }
}

fn parse_var<T>(key: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| AppError::Config(format!("{} is invalid: {}", key, e))),
        Err(_) => Ok(default),
    }
}
