//! Typed validator
//!
//! Casts raw string tokens into values of a declared [`ScalarType`].
//! No inference: a token is only ever cast against the type its attribute
//! declares, and a failed cast is an error, never a fallback to string.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Number, Value};

use super::errors::{SchemaError, SchemaResult, ValidationDetails};
use super::types::ScalarType;

/// Casts strings into typed JSON values
pub struct TypedValidator;

impl TypedValidator {
    /// Casts `raw` into a value of type `scalar`.
    ///
    /// # Errors
    ///
    /// Returns AERO_FILTER_CAST_FAILED when the token is not a valid
    /// representation of the type.
    pub fn cast(raw: &str, scalar: ScalarType) -> SchemaResult<Value> {
        let fail = || SchemaError::cast_failed(ValidationDetails::new("", scalar.type_name(), raw));

        match scalar {
            ScalarType::Any => Ok(Value::String(raw.to_string())),
            ScalarType::String => {
                if raw.is_empty() {
                    return Err(fail());
                }
                Ok(Value::String(raw.to_string()))
            }
            ScalarType::Int => raw
                .parse::<i64>()
                .map(|n| Value::Number(n.into()))
                .map_err(|_| fail()),
            ScalarType::Float => {
                let n = raw.parse::<f64>().map_err(|_| fail())?;
                Number::from_f64(n).map(Value::Number).ok_or_else(fail)
            }
            ScalarType::Bool => {
                if raw.eq_ignore_ascii_case("true") {
                    Ok(Value::Bool(true))
                } else if raw.eq_ignore_ascii_case("false") {
                    Ok(Value::Bool(false))
                } else {
                    Err(fail())
                }
            }
            ScalarType::Timestamp => Self::cast_timestamp(raw).ok_or_else(fail),
            ScalarType::Uuid => uuid::Uuid::parse_str(raw)
                .map(|u| Value::String(u.hyphenated().to_string()))
                .map_err(|_| fail()),
        }
    }

    /// Casts an optional type; no type means the token passes through uncast
    pub fn cast_opt(raw: &str, scalar: Option<ScalarType>) -> SchemaResult<Value> {
        match scalar {
            Some(scalar) => Self::cast(raw, scalar),
            None => Ok(Value::String(raw.to_string())),
        }
    }

    /// Timestamps normalise to RFC 3339 UTC with millisecond precision
    fn cast_timestamp(raw: &str) -> Option<Value> {
        let parsed: DateTime<Utc> = match DateTime::parse_from_rfc3339(raw) {
            Ok(dt) => dt.with_timezone(&Utc),
            Err(_) => {
                let millis = raw.parse::<i64>().ok()?;
                DateTime::<Utc>::from_timestamp_millis(millis)?
            }
        };
        Some(Value::String(
            parsed.to_rfc3339_opts(SecondsFormat::Millis, true),
        ))
    }
}
