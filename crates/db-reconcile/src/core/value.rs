//! Scalar value types for database-agnostic row comparison.
//!
//! Fetched cells are decoded into a small tagged union so that the
//! comparison algorithms never see driver-specific types. The variants
//! cover the semantic kinds the reconciler distinguishes: null, text,
//! integer, float, exact decimal, boolean, and the two temporal kinds.

use chrono::{NaiveDate, NaiveDateTime, Timelike};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::ser::Serializer;
use serde::Serialize;

/// A single scalar cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// SQL NULL or an absent column.
    Null,

    /// Boolean value (BIT, BOOLEAN, TINYINT(1)).
    Bool(bool),

    /// Integer value (tinyint through bigint).
    Int(i64),

    /// Floating point value (real, float, double precision).
    Float(f64),

    /// Exact numeric value (decimal, numeric, money).
    Decimal(Decimal),

    /// Text value. Also the canonical form normalized temporals collapse to.
    Text(String),

    /// Date without time component.
    Date(NaiveDate),

    /// Timestamp without timezone.
    DateTime(NaiveDateTime),
}

impl Value {
    /// Check if this value is NULL.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Check if this value is one of the numeric kinds.
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Float(_) | Value::Decimal(_))
    }

    /// Numeric reading of this value, if it has one.
    ///
    /// Covers the numeric variants plus numeric-looking text, which shows
    /// up when one dialect returns `numeric` and the other `varchar` for
    /// the same logical column.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            Value::Decimal(v) => v.to_string().parse().ok(),
            Value::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Exact decimal reading of this value, if it has one.
    #[must_use]
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Value::Int(v) => Some(Decimal::from(*v)),
            Value::Float(v) => Decimal::from_f64(*v),
            Value::Decimal(v) => Some(*v),
            Value::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

/// Compare two values for reconciliation purposes.
///
/// Derived `PartialEq` stays strict (`Int(1) != Float(1.0)`); this helper
/// adds the cross-kind numeric equality heterogeneous dialects require:
/// MySQL `int 100`, Oracle `NUMBER 100.0`, and a stringly `"100"` column
/// all denote the same quantity. Callers are expected to pass already
/// normalized values.
#[must_use]
pub fn values_equal(a: &Value, b: &Value) -> bool {
    if a == b {
        return true;
    }

    // Cross-kind numeric comparison; exact when both sides convert to Decimal.
    if a.is_numeric() || b.is_numeric() {
        if let (Some(da), Some(db)) = (a.as_decimal(), b.as_decimal()) {
            return da == db;
        }
        if let (Some(fa), Some(fb)) = (a.as_f64(), b.as_f64()) {
            return fa == fb;
        }
    }

    false
}

impl std::fmt::Display for Value {
    /// Render the canonical comparison form.
    ///
    /// Composite keys and content hashes are built from this rendering, so
    /// it must be stable across dialects. NULL renders as the `<NULL>`
    /// sentinel the report layer shows for one-sided fields.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "<NULL>"),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Int(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Decimal(v) => write!(f, "{}", v),
            Value::Text(v) => write!(f, "{}", v),
            Value::Date(v) => write!(f, "{}", v.format("%Y-%m-%d")),
            Value::DateTime(v) => {
                if v.time().num_seconds_from_midnight() == 0 && v.time().nanosecond() == 0 {
                    write!(f, "{}", v.format("%Y-%m-%d"))
                } else {
                    write!(f, "{}", v.format("%Y-%m-%d %H:%M:%S%.f"))
                }
            }
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_none(),
            Value::Bool(v) => serializer.serialize_bool(*v),
            Value::Int(v) => serializer.serialize_i64(*v),
            Value::Float(v) => serializer.serialize_f64(*v),
            Value::Decimal(v) => serializer.serialize_str(&v.to_string()),
            Value::Text(v) => serializer.serialize_str(v),
            Value::Date(_) | Value::DateTime(_) => serializer.serialize_str(&self.to_string()),
        }
    }
}

// Convenience constructors for common cases
impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<Decimal> for Value {
    fn from(v: Decimal) -> Self {
        Value::Decimal(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Value::Date(v)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::DateTime(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}
