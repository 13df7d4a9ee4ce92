// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Import of JSON documents as metadata values.
//!
//! Objects become records in document order (`serde_json` is built with
//! `preserve_order`). Integers that fit `i64` stay integral; everything else is
//! a `Number`.

use crate::value::{Record, Sequence, Value};

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => n
                .as_i64()
                .map(Self::Integer)
                .or_else(|| n.as_f64().map(Self::Number))
                .unwrap_or_else(|| Self::Text(n.to_string())),
            serde_json::Value::String(s) => Self::Text(s),
            serde_json::Value::Array(items) => {
                Self::Sequence(items.into_iter().map(Value::from).collect::<Sequence>())
            }
            serde_json::Value::Object(map) => Self::Record(map.into_iter().collect::<Record>()),
        }
    }
}
