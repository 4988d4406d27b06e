//! DuckDB values as JSON.

use chrono::{DateTime, NaiveDate};
use duckdb::types::{TimeUnit, Value};
use serde_json::{json, Value as Json};

/// Days between 0001-01-01 and 1970-01-01.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

fn micros(unit: TimeUnit, value: i64) -> i64 {
    match unit {
        TimeUnit::Second => value.saturating_mul(1_000_000),
        TimeUnit::Millisecond => value.saturating_mul(1_000),
        TimeUnit::Microsecond => value,
        TimeUnit::Nanosecond => value / 1_000,
    }
}

fn timestamp(unit: TimeUnit, value: i64) -> Json {
    let us = micros(unit, value);
    let secs = us.div_euclid(1_000_000);
    let nanos = (us.rem_euclid(1_000_000) * 1_000) as u32;
    match DateTime::from_timestamp(secs, nanos) {
        Some(dt) => Json::String(dt.naive_utc().format("%Y-%m-%d %H:%M:%S%.f").to_string()),
        None => Json::Null,
    }
}

fn date(days: i32) -> Json {
    days.checked_add(UNIX_EPOCH_DAYS_FROM_CE)
        .and_then(NaiveDate::from_num_days_from_ce_opt)
        .map(|d| Json::String(d.format("%Y-%m-%d").to_string()))
        .unwrap_or(Json::Null)
}

/// Convert one cell to JSON; values without a JSON analogue become strings.
pub fn to_json(value: Value) -> Json {
    match value {
        Value::Null => Json::Null,
        Value::Boolean(b) => Json::Bool(b),
        Value::TinyInt(i) => json!(i),
        Value::SmallInt(i) => json!(i),
        Value::Int(i) => json!(i),
        Value::BigInt(i) => json!(i),
        Value::HugeInt(i) => i64::try_from(i)
            .map(Json::from)
            .unwrap_or_else(|_| json!(i as f64)),
        Value::UTinyInt(i) => json!(i),
        Value::USmallInt(i) => json!(i),
        Value::UInt(i) => json!(i),
        Value::UBigInt(i) => json!(i),
        Value::Float(f) => json!(f),
        Value::Double(f) => json!(f),
        Value::Decimal(d) => {
            let text = d.to_string();
            text.parse::<f64>().map(|f| json!(f)).unwrap_or(Json::String(text))
        }
        Value::Timestamp(unit, v) => timestamp(unit, v),
        Value::Date32(days) => date(days),
        Value::Text(s) | Value::Enum(s) => Json::String(s),
        Value::Blob(b) => Json::String(format!("<blob {} bytes>", b.len())),
        Value::List(items) | Value::Array(items) => {
            Json::Array(items.into_iter().map(to_json).collect())
        }
        Value::Union(inner) => to_json(*inner),
        other => Json::String(format!("{other:?}")),
    }
}
