//! Field-kind coercion between model values and codec values.
//!
//! The codec only knows full date-times, so date-only and time-only fields
//! are widened on the way out and narrowed again on the way in.

use crate::{alias::AliasError, model::FieldKind, value::Value};
use time::{Date, Month, PrimitiveDateTime};

/// Anchor date for time-only values.
pub const TIME_ANCHOR: Date = match Date::from_calendar_date(1970, Month::January, 1) {
    Ok(date) => date,
    Err(_) => unreachable!(),
};

/// Coerce one raw field value into its codec representation.
#[must_use]
pub fn coerce_out(kind: FieldKind, value: Value) -> Value {
    match (kind, value) {
        (_, Value::NotProvided) => Value::Undefined,
        (_, Value::Null) => Value::Null,
        (FieldKind::DateTime, value) => value,
        (FieldKind::Date, Value::Date(date)) => Value::DateTime(date.midnight()),
        (FieldKind::Time, Value::Time(time)) => {
            Value::DateTime(PrimitiveDateTime::new(TIME_ANCHOR, time))
        }
        (_, Value::File(file)) => Value::Text(file.name().to_string()),
        (_, value) => value,
    }
}

/// Coerce one codec value back into the field's model representation.
pub fn coerce_in(field: &str, kind: FieldKind, value: Value) -> Result<Value, AliasError> {
    let value = match (kind, value) {
        (_, Value::Undefined) => Value::NotProvided,
        (FieldKind::AutoKey, Value::Int(0)) => Value::Null,
        (FieldKind::AutoKey, Value::Float(key)) if key == 0.0 => Value::Null,
        (FieldKind::DateTime, value) => value,
        (FieldKind::Date | FieldKind::Time, Value::Null) => Value::Null,
        (FieldKind::Date, Value::DateTime(dt)) => Value::Date(dt.date()),
        (FieldKind::Date, value @ Value::Date(_)) => value,
        (FieldKind::Time, Value::DateTime(dt)) => Value::Time(dt.time()),
        (FieldKind::Time, value @ Value::Time(_)) => value,
        (FieldKind::Date, other) => return Err(mismatch(field, "datetime", &other)),
        (FieldKind::Time, other) => return Err(mismatch(field, "datetime", &other)),
        (_, value) => value,
    };

    Ok(value)
}

fn mismatch(field: &str, expected: &'static str, found: &Value) -> AliasError {
    AliasError::InvalidFieldValue {
        field: field.to_string(),
        expected,
        found: found.kind_name(),
    }
}
