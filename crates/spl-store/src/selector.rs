//! CouchDB-style selector matching for the bundled stores.
//!
//! Only the subset the chaincode relies on is supported: a `selector` object
//! whose entries map a dot-separated field path to either a literal (implicit
//! equality) or `{"$eq": literal}`. Entries are ANDed together.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::error::{StoreError, StoreResult};
use crate::iter::QueryRecord;

/// A parsed rich query selector.
#[derive(Clone, Debug, PartialEq)]
pub struct Selector {
    conditions: Vec<Condition>,
}

#[derive(Clone, Debug, PartialEq)]
struct Condition {
    path: Vec<String>,
    expected: Value,
}

impl Selector {
    /// Parse a query document of the form `{"selector": {...}}`.
    pub fn parse(query: &str) -> StoreResult<Self> {
        let doc: Value = serde_json::from_str(query)
            .map_err(|e| StoreError::InvalidQuery(format!("not valid JSON: {e}")))?;
        let selector = doc
            .get("selector")
            .and_then(Value::as_object)
            .ok_or_else(|| StoreError::InvalidQuery("missing \"selector\" object".into()))?;

        let mut conditions = Vec::with_capacity(selector.len());
        for (field, clause) in selector {
            if field.is_empty() || field.starts_with('$') {
                return Err(StoreError::InvalidQuery(format!(
                    "unsupported selector field {field:?}"
                )));
            }
            conditions.push(Condition {
                path: field.split('.').map(str::to_owned).collect(),
                expected: equality_operand(field, clause)?,
            });
        }
        Ok(Self { conditions })
    }

    /// Whether a JSON document satisfies every condition.
    pub fn matches(&self, doc: &Value) -> bool {
        if !doc.is_object() {
            return false;
        }
        self.conditions.iter().all(|c| {
            let mut cursor = doc;
            for segment in &c.path {
                match cursor.get(segment) {
                    Some(next) => cursor = next,
                    None => return false,
                }
            }
            *cursor == c.expected
        })
    }

    /// Evaluate against raw world state, returning matches in key order.
    ///
    /// Values that are not JSON never match.
    pub fn filter(&self, state: &BTreeMap<String, Vec<u8>>) -> Vec<QueryRecord> {
        state
            .iter()
            .filter(|(_, value)| {
                serde_json::from_slice::<Value>(value)
                    .map(|doc| self.matches(&doc))
                    .unwrap_or(false)
            })
            .map(|(key, value)| QueryRecord::new(key.clone(), value.clone()))
            .collect()
    }
}

fn equality_operand(field: &str, clause: &Value) -> StoreResult<Value> {
    match clause {
        Value::Object(ops) if ops.keys().any(|k| k.starts_with('$')) => eq_operator(field, ops),
        other => Ok(other.clone()),
    }
}

fn eq_operator(field: &str, ops: &Map<String, Value>) -> StoreResult<Value> {
    match (ops.len(), ops.get("$eq")) {
        (1, Some(v)) => Ok(v.clone()),
        _ => Err(StoreError::InvalidQuery(format!(
            "only $eq is supported (field {field:?})"
        ))),
    }
}
