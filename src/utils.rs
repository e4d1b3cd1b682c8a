use std::{collections::HashMap, str::FromStr};

use chrono::{DateTime, SecondsFormat, Utc};
use rust_decimal::Decimal;
use tera::Value;

/// Fixed-width RFC 3339 text, so ordering the column as text orders by time.
pub fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parses a price typed by a person; accepts `29,90` as well as `29.90`.
pub fn parse_preco(raw: &str) -> Option<Decimal> {
    let raw = raw.trim().replace(',', ".");
    if raw.is_empty() {
        return None;
    }
    Decimal::from_str(&raw).ok()
}

/// Price with two decimal places, the way the forms show it.
pub fn preco_2dp(preco: Decimal) -> String {
    format!("{:.2}", preco.round_dp(2))
}

/// Tera filter rendering a price as `R$ 29.90`.
pub fn brl_filter(value: &Value, _: &HashMap<String, Value>) -> tera::Result<Value> {
    let preco = match value {
        Value::Number(n) => Decimal::from_str(&n.to_string()).ok(),
        Value::String(s) => parse_preco(s),
        _ => None,
    }
    .ok_or_else(|| tera::Error::msg(format!("brl: not a price: {}", value)))?;

    Ok(Value::String(format!("R$ {}", preco_2dp(preco))))
}
