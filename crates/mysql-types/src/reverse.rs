//! Reverse conversion: MySQL values → ColumnValue
//!
//! Rows are read with the binary protocol, so most values already arrive
//! typed (`Value::Int`, `Value::Date`, ...). DECIMAL, JSON, character and
//! blob columns arrive as `Value::Bytes` and are interpreted using the
//! column metadata.

use crate::row::{ColumnValue, SampledRow};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use mysql_async::consts::{ColumnFlags, ColumnType};
use mysql_async::{Row, Value};
use thiserror::Error;

/// Character set id MySQL reports for binary strings and blobs.
pub const BINARY_CHARSET: u16 = 63;

/// MySQL value with the column metadata needed to interpret it.
#[derive(Debug, Clone)]
pub struct MySQLValueWithSchema {
    /// The raw MySQL value.
    pub value: Value,
    /// The MySQL column type.
    pub column_type: ColumnType,
    /// Column flags (e.g., UNSIGNED, BINARY).
    pub column_flags: ColumnFlags,
    /// Character set id of the column.
    pub character_set: u16,
}

/// Error during MySQL value conversion.
#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("Unsupported MySQL type {column_type:?} for column '{column}'")]
    UnsupportedType {
        column: String,
        column_type: ColumnType,
    },
    #[error("Type mismatch: expected {expected}, got {actual:?}")]
    TypeMismatch { expected: String, actual: Value },
    #[error("Invalid UTF-8 in string: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
    #[error("Column '{column}': {source}")]
    Column {
        column: String,
        #[source]
        source: Box<ConversionError>,
    },
}

impl MySQLValueWithSchema {
    /// Create a new MySQLValueWithSchema for a text column.
    pub fn new(value: Value, column_type: ColumnType, column_flags: ColumnFlags) -> Self {
        Self {
            value,
            column_type,
            column_flags,
            character_set: 0,
        }
    }

    /// Set the column character set.
    pub fn with_character_set(mut self, character_set: u16) -> Self {
        self.character_set = character_set;
        self
    }

    fn is_binary(&self) -> bool {
        self.character_set == BINARY_CHARSET
    }

    /// Convert to ColumnValue.
    pub fn to_column_value(self) -> Result<ColumnValue, ConversionError> {
        ColumnValue::try_from(self)
    }
}

impl TryFrom<MySQLValueWithSchema> for ColumnValue {
    type Error = ConversionError;

    fn try_from(mv: MySQLValueWithSchema) -> Result<Self, Self::Error> {
        use ColumnType::*;

        match mv.value {
            Value::NULL => Ok(ColumnValue::Null),
            Value::Int(i) => Ok(ColumnValue::Int(i)),
            Value::UInt(u) => Ok(ColumnValue::UInt(u)),
            Value::Float(f) => Ok(ColumnValue::Float(f as f64)),
            Value::Double(d) => Ok(ColumnValue::Float(d)),
            Value::Date(year, month, day, hour, min, sec, micro) => {
                if mv.column_type == MYSQL_TYPE_DATE {
                    Ok(date_value(year, month, day))
                } else {
                    Ok(datetime_value(year, month, day, hour, min, sec, micro))
                }
            }
            Value::Time(negative, days, hours, minutes, seconds, micros) => Ok(ColumnValue::Time(
                format_time(negative, days, hours, minutes, seconds, micros),
            )),
            Value::Bytes(ref bytes) => match mv.column_type {
                MYSQL_TYPE_DECIMAL | MYSQL_TYPE_NEWDECIMAL => {
                    Ok(ColumnValue::Decimal(String::from_utf8(bytes.clone())?))
                }

                MYSQL_TYPE_JSON => {
                    let s = String::from_utf8(bytes.clone())?;
                    match serde_json::from_str::<serde_json::Value>(&s) {
                        Ok(json) => Ok(ColumnValue::Json(json)),
                        Err(_) => Ok(ColumnValue::Text(s)),
                    }
                }

                MYSQL_TYPE_TINY | MYSQL_TYPE_SHORT | MYSQL_TYPE_INT24 | MYSQL_TYPE_LONG
                | MYSQL_TYPE_LONGLONG | MYSQL_TYPE_YEAR => {
                    let s = String::from_utf8(bytes.clone())?;
                    if mv.column_flags.contains(ColumnFlags::UNSIGNED_FLAG) {
                        s.parse().map(ColumnValue::UInt).map_err(|_| mismatch("integer", &mv.value))
                    } else {
                        s.parse().map(ColumnValue::Int).map_err(|_| mismatch("integer", &mv.value))
                    }
                }

                MYSQL_TYPE_FLOAT | MYSQL_TYPE_DOUBLE => {
                    let s = String::from_utf8(bytes.clone())?;
                    s.parse()
                        .map(ColumnValue::Float)
                        .map_err(|_| mismatch("float", &mv.value))
                }

                MYSQL_TYPE_DATE => {
                    let s = String::from_utf8(bytes.clone())?;
                    Ok(NaiveDate::parse_from_str(&s, "%Y-%m-%d")
                        .map(ColumnValue::Date)
                        .unwrap_or(ColumnValue::Text(s)))
                }

                MYSQL_TYPE_DATETIME | MYSQL_TYPE_DATETIME2 | MYSQL_TYPE_TIMESTAMP
                | MYSQL_TYPE_TIMESTAMP2 => {
                    let s = String::from_utf8(bytes.clone())?;
                    Ok(parse_datetime(&s)
                        .map(ColumnValue::DateTime)
                        .unwrap_or(ColumnValue::Text(s)))
                }

                MYSQL_TYPE_TIME | MYSQL_TYPE_TIME2 => {
                    Ok(ColumnValue::Time(String::from_utf8(bytes.clone())?))
                }

                MYSQL_TYPE_BIT => {
                    // BIT(1) reads as a boolean
                    if bytes.len() == 1 && bytes[0] <= 1 {
                        Ok(ColumnValue::Bool(bytes[0] == 1))
                    } else {
                        Ok(ColumnValue::Bytes(bytes.clone()))
                    }
                }

                MYSQL_TYPE_GEOMETRY => Ok(ColumnValue::Bytes(bytes.clone())),

                col_type
                    if col_type.is_character_type()
                        || matches!(
                            col_type,
                            MYSQL_TYPE_TINY_BLOB
                                | MYSQL_TYPE_MEDIUM_BLOB
                                | MYSQL_TYPE_LONG_BLOB
                                | MYSQL_TYPE_BLOB
                                | MYSQL_TYPE_ENUM
                                | MYSQL_TYPE_SET
                        ) =>
                {
                    if mv.is_binary() {
                        Ok(ColumnValue::Bytes(bytes.clone()))
                    } else {
                        Ok(ColumnValue::Text(String::from_utf8(bytes.clone())?))
                    }
                }

                column_type => Err(ConversionError::UnsupportedType {
                    column: String::new(),
                    column_type,
                }),
            },
        }
    }
}

/// Convert a MySQL row into a `SampledRow`, keeping the server's column order.
pub fn row_to_sampled_row(row: Row) -> Result<SampledRow, ConversionError> {
    let columns = row.columns();
    let mut sampled = SampledRow::new();

    for (index, column) in columns.iter().enumerate() {
        let name = column.name_str().to_string();
        let value = row.as_ref(index).cloned().unwrap_or(Value::NULL);
        let mv = MySQLValueWithSchema::new(value, column.column_type(), column.flags())
            .with_character_set(column.character_set());

        let converted = mv.to_column_value().map_err(|e| match e {
            ConversionError::UnsupportedType { column_type, .. } => {
                ConversionError::UnsupportedType {
                    column: name.clone(),
                    column_type,
                }
            }
            other => ConversionError::Column {
                column: name.clone(),
                source: Box::new(other),
            },
        })?;
        sampled.push(name, converted);
    }

    Ok(sampled)
}

fn mismatch(expected: &str, actual: &Value) -> ConversionError {
    ConversionError::TypeMismatch {
        expected: expected.to_string(),
        actual: actual.clone(),
    }
}

/// Zero dates such as `0000-00-00` are passed through as text.
fn date_value(year: u16, month: u8, day: u8) -> ColumnValue {
    match NaiveDate::from_ymd_opt(year as i32, month as u32, day as u32) {
        Some(date) => ColumnValue::Date(date),
        None => ColumnValue::Text(format!("{year:04}-{month:02}-{day:02}")),
    }
}

fn datetime_value(
    year: u16,
    month: u8,
    day: u8,
    hour: u8,
    min: u8,
    sec: u8,
    micro: u32,
) -> ColumnValue {
    let date = NaiveDate::from_ymd_opt(year as i32, month as u32, day as u32);
    let time = NaiveTime::from_hms_micro_opt(hour as u32, min as u32, sec as u32, micro);
    match (date, time) {
        (Some(date), Some(time)) => ColumnValue::DateTime(NaiveDateTime::new(date, time)),
        _ if micro == 0 => ColumnValue::Text(format!(
            "{year:04}-{month:02}-{day:02} {hour:02}:{min:02}:{sec:02}"
        )),
        _ => ColumnValue::Text(format!(
            "{year:04}-{month:02}-{day:02} {hour:02}:{min:02}:{sec:02}.{micro:06}"
        )),
    }
}

fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S"))
        .ok()
}

fn format_time(
    negative: bool,
    days: u32,
    hours: u8,
    minutes: u8,
    seconds: u8,
    micros: u32,
) -> String {
    let sign = if negative { "-" } else { "" };
    let total_hours = days * 24 + hours as u32;
    if micros == 0 {
        format!("{sign}{total_hours:02}:{minutes:02}:{seconds:02}")
    } else {
        format!("{sign}{total_hours:02}:{minutes:02}:{seconds:02}.{micros:06}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn test_int_conversion() {
        let mv = MySQLValueWithSchema::new(
            Value::Int(42),
            ColumnType::MYSQL_TYPE_LONG,
            ColumnFlags::empty(),
        );
        assert_eq!(mv.to_column_value().unwrap(), ColumnValue::Int(42));
    }

    #[test]
    fn test_unsigned_bigint_conversion() {
        let mv = MySQLValueWithSchema::new(
            Value::UInt(18_446_744_073_709_551_615),
            ColumnType::MYSQL_TYPE_LONGLONG,
            ColumnFlags::UNSIGNED_FLAG,
        );
        assert_eq!(
            mv.to_column_value().unwrap(),
            ColumnValue::UInt(18_446_744_073_709_551_615)
        );
    }

    #[test]
    fn test_string_conversion() {
        let mv = MySQLValueWithSchema::new(
            Value::Bytes(b"hello world".to_vec()),
            ColumnType::MYSQL_TYPE_VAR_STRING,
            ColumnFlags::empty(),
        )
        .with_character_set(255);
        assert_eq!(
            mv.to_column_value().unwrap(),
            ColumnValue::Text("hello world".to_string())
        );
    }

    #[test]
    fn test_binary_blob_stays_bytes() {
        let mv = MySQLValueWithSchema::new(
            Value::Bytes(vec![0, 159, 146, 150]),
            ColumnType::MYSQL_TYPE_BLOB,
            ColumnFlags::BINARY_FLAG | ColumnFlags::BLOB_FLAG,
        )
        .with_character_set(BINARY_CHARSET);
        assert_eq!(
            mv.to_column_value().unwrap(),
            ColumnValue::Bytes(vec![0, 159, 146, 150])
        );
    }

    #[test]
    fn test_datetime_conversion() {
        let mv = MySQLValueWithSchema::new(
            Value::Date(2024, 6, 15, 10, 30, 45, 0),
            ColumnType::MYSQL_TYPE_DATETIME,
            ColumnFlags::empty(),
        );
        match mv.to_column_value().unwrap() {
            ColumnValue::DateTime(dt) => {
                assert_eq!(dt.year(), 2024);
                assert_eq!(dt.month(), 6);
                assert_eq!(dt.day(), 15);
            }
            other => panic!("Expected DateTime value, got {other:?}"),
        }
    }

    #[test]
    fn test_date_column_is_date_only() {
        let mv = MySQLValueWithSchema::new(
            Value::Date(2020, 2, 29, 0, 0, 0, 0),
            ColumnType::MYSQL_TYPE_DATE,
            ColumnFlags::empty(),
        );
        assert_eq!(
            mv.to_column_value().unwrap(),
            ColumnValue::Date(NaiveDate::from_ymd_opt(2020, 2, 29).unwrap())
        );
    }

    #[test]
    fn test_zero_datetime_passes_through_as_text() {
        let mv = MySQLValueWithSchema::new(
            Value::Date(0, 0, 0, 0, 0, 0, 0),
            ColumnType::MYSQL_TYPE_TIMESTAMP,
            ColumnFlags::empty(),
        );
        assert_eq!(
            mv.to_column_value().unwrap(),
            ColumnValue::Text("0000-00-00 00:00:00".to_string())
        );
    }

    #[test]
    fn test_zero_datetime_keeps_fraction() {
        let mv = MySQLValueWithSchema::new(
            Value::Date(0, 0, 0, 0, 0, 0, 123_456),
            ColumnType::MYSQL_TYPE_DATETIME,
            ColumnFlags::empty(),
        );
        assert_eq!(
            mv.to_column_value().unwrap(),
            ColumnValue::Text("0000-00-00 00:00:00.123456".to_string())
        );
    }

    #[test]
    fn test_textual_timestamp_is_parsed() {
        let mv = MySQLValueWithSchema::new(
            Value::Bytes(b"2022-05-01 08:09:10.250000".to_vec()),
            ColumnType::MYSQL_TYPE_TIMESTAMP,
            ColumnFlags::empty(),
        );
        let value = mv.to_column_value().unwrap();
        assert_eq!(
            serde_json::to_string(&value).unwrap(),
            r#""2022-05-01T08:09:10.250000""#
        );
    }

    #[test]
    fn test_time_conversion() {
        let mv = MySQLValueWithSchema::new(
            Value::Time(true, 1, 2, 3, 4, 0),
            ColumnType::MYSQL_TYPE_TIME,
            ColumnFlags::empty(),
        );
        assert_eq!(
            mv.to_column_value().unwrap(),
            ColumnValue::Time("-26:03:04".to_string())
        );
    }

    #[test]
    fn test_null_conversion() {
        let mv = MySQLValueWithSchema::new(
            Value::NULL,
            ColumnType::MYSQL_TYPE_LONG,
            ColumnFlags::empty(),
        );
        assert_eq!(mv.to_column_value().unwrap(), ColumnValue::Null);
    }

    #[test]
    fn test_json_conversion() {
        let json_str = r#"{"name":"Alice","age":30}"#;
        let mv = MySQLValueWithSchema::new(
            Value::Bytes(json_str.as_bytes().to_vec()),
            ColumnType::MYSQL_TYPE_JSON,
            ColumnFlags::empty(),
        );
        match mv.to_column_value().unwrap() {
            ColumnValue::Json(obj) => {
                assert_eq!(obj["name"], "Alice");
                assert_eq!(obj["age"], 30);
            }
            other => panic!("Expected Json value, got {other:?}"),
        }
    }

    #[test]
    fn test_decimal_conversion() {
        let mv = MySQLValueWithSchema::new(
            Value::Bytes(b"123.456".to_vec()),
            ColumnType::MYSQL_TYPE_NEWDECIMAL,
            ColumnFlags::empty(),
        );
        assert_eq!(
            mv.to_column_value().unwrap(),
            ColumnValue::Decimal("123.456".to_string())
        );
    }

    #[test]
    fn test_bit_one_is_bool() {
        let mv = MySQLValueWithSchema::new(
            Value::Bytes(vec![1]),
            ColumnType::MYSQL_TYPE_BIT,
            ColumnFlags::UNSIGNED_FLAG,
        );
        assert_eq!(mv.to_column_value().unwrap(), ColumnValue::Bool(true));
    }

    #[test]
    fn test_invalid_utf8_is_error() {
        let mv = MySQLValueWithSchema::new(
            Value::Bytes(vec![0xff, 0xfe]),
            ColumnType::MYSQL_TYPE_VAR_STRING,
            ColumnFlags::empty(),
        );
        assert!(matches!(
            mv.to_column_value(),
            Err(ConversionError::InvalidUtf8(_))
        ));
    }
}
