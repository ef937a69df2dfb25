//! Row mapping primitives shared by every entity kind.
//!
//! # Invariants
//! - Mapping is pure: no I/O, no clock reads.
//! - Malformed dates fail loudly; they never become a placeholder value.

use super::EntityId;
use crate::db::StoreRow;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rusqlite::types::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

const DATE_FORMAT: &str = "%Y-%m-%d";
const SQLITE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Failure converting a storage row into a domain entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowMapError {
    MissingColumn(&'static str),
    TypeMismatch {
        column: &'static str,
        expected: &'static str,
        found: &'static str,
    },
    MalformedDate {
        column: &'static str,
        value: String,
    },
    MalformedJson {
        column: &'static str,
        message: String,
    },
}

impl RowMapError {
    pub(crate) fn type_mismatch(column: &'static str, expected: &'static str, found: &Value) -> Self {
        Self::TypeMismatch {
            column,
            expected,
            found: value_type_name(found),
        }
    }
}

impl Display for RowMapError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingColumn(column) => write!(f, "column `{column}` missing from row"),
            Self::TypeMismatch {
                column,
                expected,
                found,
            } => write!(f, "column `{column}` expected {expected}, found {found}"),
            Self::MalformedDate { column, value } => {
                write!(f, "malformed date `{value}` in column `{column}`")
            }
            Self::MalformedJson { column, message } => {
                write!(f, "malformed json in column `{column}`: {message}")
            }
        }
    }
}

impl Error for RowMapError {}

/// Extraction of a typed storage row from a raw executor row.
pub trait FromStoreRow: Sized {
    fn from_store_row(row: &StoreRow) -> Result<Self, RowMapError>;
}

/// A domain record persisted in one table.
///
/// Binds the table name and the row mapper the generic repository needs;
/// nothing else about the entity's columns is known at that layer.
pub trait Entity: Sized {
    const TABLE: &'static str;
    type Row: FromStoreRow;

    fn from_row(row: Self::Row) -> Result<Self, RowMapError>;

    fn id(&self) -> EntityId;
}

/// Parses a `YYYY-MM-DD` calendar date.
pub fn parse_date(column: &'static str, value: &str) -> Result<NaiveDate, RowMapError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| RowMapError::MalformedDate {
        column,
        value: value.to_string(),
    })
}

/// Parses a nullable calendar date.
pub fn parse_opt_date(
    column: &'static str,
    value: Option<&str>,
) -> Result<Option<NaiveDate>, RowMapError> {
    value.map(|text| parse_date(column, text)).transpose()
}

/// Parses a store timestamp.
///
/// Accepts RFC 3339 (what the schema defaults write) and SQLite's
/// `CURRENT_TIMESTAMP` shape, which is read as UTC.
pub fn parse_timestamp(column: &'static str, value: &str) -> Result<DateTime<Utc>, RowMapError> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(parsed.with_timezone(&Utc));
    }

    NaiveDateTime::parse_from_str(value, SQLITE_TIMESTAMP_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|_| RowMapError::MalformedDate {
            column,
            value: value.to_string(),
        })
}

/// Formats a calendar date the way it is stored.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Integer(_) => "integer",
        Value::Real(_) => "real",
        Value::Text(_) => "text",
        Value::Blob(_) => "blob",
    }
}

#[cfg(test)]
mod tests {
    use super::{format_date, parse_date, parse_opt_date, parse_timestamp, RowMapError};
    use chrono::{Datelike, NaiveDate, Timelike};

    #[test]
    fn parse_date_reads_iso_calendar_dates() {
        let date = parse_date("date", "1984-02-29").unwrap();
        assert_eq!((date.year(), date.month(), date.day()), (1984, 2, 29));
        assert_eq!(format_date(date), "1984-02-29");
    }

    #[test]
    fn parse_date_fails_loudly_on_garbage() {
        let err = parse_date("date_naissance", "1985-02-30").unwrap_err();
        assert_eq!(
            err,
            RowMapError::MalformedDate {
                column: "date_naissance",
                value: "1985-02-30".to_string(),
            }
        );
        assert!(parse_date("date", "").is_err());
    }

    #[test]
    fn parse_opt_date_keeps_absence() {
        assert_eq!(parse_opt_date("date_fin", None).unwrap(), None);
        assert_eq!(
            parse_opt_date("date_fin", Some("2024-01-05")).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 5)
        );
    }

    #[test]
    fn parse_timestamp_accepts_rfc3339_and_sqlite_shapes() {
        let rfc = parse_timestamp("created_at", "2024-03-01T10:20:30.250Z").unwrap();
        assert_eq!(rfc.hour(), 10);
        assert_eq!(rfc.timestamp_subsec_millis(), 250);

        let sqlite = parse_timestamp("created_at", "2024-03-01 10:20:30").unwrap();
        assert_eq!(sqlite.minute(), 20);

        assert!(matches!(
            parse_timestamp("created_at", "yesterday"),
            Err(RowMapError::MalformedDate { column: "created_at", .. })
        ));
    }
}
