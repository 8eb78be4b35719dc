use crate::error::{Result, ValidationError};
use rust_decimal::Decimal;
use std::str::FromStr;

pub const FIELD_SEPARATOR: char = '|';

/// One `time|entity|value` observation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub time: i64,
    pub entity: String,
    pub value: Decimal,
}

/// A well-formed line whose time is known but whose value is still raw.
///
/// The value is only parsed once the record is consumed, so a bad value in a
/// time unit that is never reached does not abort the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PendingRecord {
    pub(crate) line: u64,
    pub(crate) time: i64,
    entity: String,
    value: String,
}

impl PendingRecord {
    /// Tokenizes one physical line.
    ///
    /// Returns `Ok(None)` for lines that do not have exactly three fields.
    pub(crate) fn parse(line: u64, text: &str) -> Result<Option<Self>> {
        let text = text.trim_end_matches(['\n', '\r']);
        let mut fields = text.split(FIELD_SEPARATOR);
        let (Some(time), Some(entity), Some(value), None) =
            (fields.next(), fields.next(), fields.next(), fields.next())
        else {
            return Ok(None);
        };

        let time = parse_time(time).ok_or_else(|| ValidationError::InvalidNumber {
            line,
            field: "time",
            value: time.to_string(),
        })?;

        Ok(Some(Self {
            line,
            time,
            entity: entity.to_string(),
            value: value.to_string(),
        }))
    }

    pub(crate) fn into_record(self) -> Result<Record> {
        let Some(value) = parse_value(&self.value) else {
            return Err(ValidationError::InvalidNumber {
                line: self.line,
                field: "value",
                value: self.value,
            });
        };
        Ok(Record {
            time: self.time,
            entity: self.entity,
            value,
        })
    }
}

pub fn parse_time(raw: &str) -> Option<i64> {
    raw.trim().parse().ok()
}

/// Parses a price-like number exactly, accepting plain (`12.50`) and
/// scientific (`1.25e1`) notation.
pub fn parse_value(raw: &str) -> Option<Decimal> {
    let raw = raw.trim();
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .ok()
}
