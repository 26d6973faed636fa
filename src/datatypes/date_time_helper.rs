use chrono::{DateTime, Datelike, Days, Local, NaiveDate, NaiveDateTime};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DateTimeError {
    #[error("Failed to parse (date-)time")]
    DateTimeParseFailed(#[from] chrono::format::ParseError),
    #[error("Date is out of the supported range")]
    DateOutOfRange,
    #[error("Failed to parse date from string '{0}'")]
    StringParseError(String),
}

/// Today's date in the local time zone
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Parse a date given in the provided format
pub fn date_from_str(date_str: &str, format: &str) -> Result<NaiveDate, DateTimeError> {
    Ok(NaiveDate::parse_from_str(date_str, format)?)
}

/// Parse a purchase date as delivered by the backend or typed by a user.
/// The following inputs are accepted:
/// 0. plain ISO 8601 dates `%Y-%m-%d`
/// 1. RFC 3339 timestamps, the date part in the given offset is used
/// 2. ISO 8601 date-times without offset, e.g. `2024-01-20T08:30:00`
pub fn parse_date(date_str: &str) -> Result<NaiveDate, DateTimeError> {
    let date_str = date_str.trim();
    if let Ok(date) = date_from_str(date_str, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(time) = DateTime::parse_from_rfc3339(date_str) {
        return Ok(time.date_naive());
    }
    if let Ok(time) = NaiveDateTime::parse_from_str(date_str, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(time.date());
    }
    Err(DateTimeError::StringParseError(date_str.to_string()))
}

/// Date lying the given number of days before `date`
pub fn days_before(date: NaiveDate, days: u64) -> Result<NaiveDate, DateTimeError> {
    date.checked_sub_days(Days::new(days))
        .ok_or(DateTimeError::DateOutOfRange)
}

/// Calendar quarter (1 to 4) the date belongs to
pub fn quarter(date: &NaiveDate) -> u32 {
    date.month0() / 3 + 1
}

/// Serde adapter writing dates as `%Y-%m-%d` and reading them with [`parse_date`]
pub mod iso_date {
    use chrono::NaiveDate;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&date.format("%Y-%m-%d").to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        super::parse_date(&s).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_from_str() {
        let date = date_from_str("10-2020-02", "%d-%Y-%m").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2020, 2, 10).unwrap());
    }

    #[test]
    fn test_parse_date() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 20).unwrap();
        assert_eq!(parse_date("2024-01-20").unwrap(), expected);
        assert_eq!(parse_date(" 2024-01-20 ").unwrap(), expected);
        assert_eq!(parse_date("2024-01-20T23:30:00+08:00").unwrap(), expected);
        assert_eq!(parse_date("2024-01-20T08:30:00").unwrap(), expected);
        assert!(parse_date("20.01.2024").is_err());
        assert!(parse_date("").is_err());
    }

    #[test]
    fn test_days_before() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(
            days_before(date, 30).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap()
        );
        assert_eq!(days_before(NaiveDate::MIN, 1), Err(DateTimeError::DateOutOfRange));
    }

    #[test]
    fn test_quarter() {
        let q = |m| quarter(&NaiveDate::from_ymd_opt(2023, m, 15).unwrap());
        assert_eq!(q(1), 1);
        assert_eq!(q(3), 1);
        assert_eq!(q(4), 2);
        assert_eq!(q(9), 3);
        assert_eq!(q(12), 4);
    }
}
