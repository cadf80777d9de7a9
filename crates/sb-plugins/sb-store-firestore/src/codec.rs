//! Firestore REST encoding: typed JSON values, `structuredQuery` bodies
//! and resource names.

use chrono::{DateTime, SecondsFormat, Utc};
use sb_core::query::{Direction, FilterOp, Query};
use sb_core::value::{Document, FieldValue};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

/// Pseudo-field that orders by document name.
pub const NAME_FIELD: &str = "__name__";

pub fn encode_value(value: &FieldValue) -> Value {
    match value {
        FieldValue::Null => json!({ "nullValue": null }),
        FieldValue::Boolean(b) => json!({ "booleanValue": b }),
        // int64 travels as a decimal string
        FieldValue::Integer(i) => json!({ "integerValue": i.to_string() }),
        FieldValue::Double(d) => json!({ "doubleValue": d }),
        FieldValue::Timestamp(ts) => {
            json!({ "timestampValue": ts.to_rfc3339_opts(SecondsFormat::Micros, true) })
        }
        FieldValue::String(s) => json!({ "stringValue": s }),
        FieldValue::Reference(r) => json!({ "referenceValue": r }),
        FieldValue::Array(values) => {
            json!({ "arrayValue": { "values": values.iter().map(encode_value).collect::<Vec<_>>() } })
        }
        FieldValue::Map(fields) => json!({ "mapValue": { "fields": encode_fields(fields) } }),
    }
}

fn encode_fields(fields: &BTreeMap<String, FieldValue>) -> Map<String, Value> {
    fields
        .iter()
        .map(|(name, value)| (name.clone(), encode_value(value)))
        .collect()
}

/// Decodes one typed value. Unknown or malformed shapes decode to `Null`
/// so that a single odd field never fails a whole page.
pub fn decode_value(value: &Value) -> FieldValue {
    let Some((kind, inner)) = value.as_object().and_then(|o| o.iter().next()) else {
        return FieldValue::Null;
    };
    match kind.as_str() {
        "booleanValue" => inner.as_bool().map(FieldValue::Boolean).unwrap_or(FieldValue::Null),
        "integerValue" => match inner {
            Value::String(s) => s.parse().map(FieldValue::Integer).unwrap_or(FieldValue::Null),
            other => other.as_i64().map(FieldValue::Integer).unwrap_or(FieldValue::Null),
        },
        "doubleValue" => match inner {
            Value::String(s) => s.parse().map(FieldValue::Double).unwrap_or(FieldValue::Null),
            other => other.as_f64().map(FieldValue::Double).unwrap_or(FieldValue::Null),
        },
        "timestampValue" => inner
            .as_str()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|ts| FieldValue::Timestamp(ts.with_timezone(&Utc)))
            .unwrap_or(FieldValue::Null),
        "stringValue" | "bytesValue" => inner
            .as_str()
            .map(|s| FieldValue::String(s.to_string()))
            .unwrap_or(FieldValue::Null),
        "referenceValue" => inner
            .as_str()
            .map(|s| FieldValue::Reference(s.to_string()))
            .unwrap_or(FieldValue::Null),
        "arrayValue" => FieldValue::Array(
            inner
                .get("values")
                .and_then(Value::as_array)
                .map(|values| values.iter().map(decode_value).collect())
                .unwrap_or_default(),
        ),
        "mapValue" => FieldValue::Map(decode_fields(inner.get("fields"))),
        "geoPointValue" => FieldValue::Map(
            ["latitude", "longitude"]
                .into_iter()
                .map(|axis| {
                    let v = inner.get(axis).and_then(Value::as_f64).unwrap_or_default();
                    (axis.to_string(), FieldValue::Double(v))
                })
                .collect(),
        ),
        _ => FieldValue::Null,
    }
}

pub fn decode_fields(fields: Option<&Value>) -> BTreeMap<String, FieldValue> {
    fields
        .and_then(Value::as_object)
        .map(|map| {
            map.iter()
                .map(|(name, value)| (name.clone(), decode_value(value)))
                .collect()
        })
        .unwrap_or_default()
}

/// A document as returned by `get` and `runQuery`.
#[derive(Debug, Deserialize)]
pub struct RawDocument {
    pub name: String,
    #[serde(default)]
    pub fields: Option<Value>,
}

impl RawDocument {
    pub fn into_document(self) -> Document {
        Document {
            id: document_id(&self.name).to_string(),
            fields: decode_fields(self.fields.as_ref()),
        }
    }
}

/// One element of the `runQuery` response stream. Elements without a
/// document only carry progress metadata.
#[derive(Debug, Deserialize)]
pub struct RunQueryItem {
    pub document: Option<RawDocument>,
}

/// Last path segment of a resource name.
pub fn document_id(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}

/// `projects/{p}/databases/(default)/documents`
pub fn documents_root(project_id: &str) -> String {
    format!("projects/{project_id}/databases/(default)/documents")
}

/// Field paths that are not plain identifiers must be backquoted.
fn field_path(field: &str) -> String {
    let simple = field
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && field.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if simple {
        field.to_string()
    } else {
        format!("`{}`", field.replace('\\', "\\\\").replace('`', "\\`"))
    }
}

fn op_name(op: FilterOp) -> &'static str {
    match op {
        FilterOp::Equal => "EQUAL",
        FilterOp::ArrayContains => "ARRAY_CONTAINS",
        FilterOp::GreaterOrEqual => "GREATER_THAN_OR_EQUAL",
        FilterOp::LessOrEqual => "LESS_THAN_OR_EQUAL",
    }
}

fn direction_name(direction: Direction) -> &'static str {
    match direction {
        Direction::Ascending => "ASCENDING",
        Direction::Descending => "DESCENDING",
    }
}

fn order_entry(field: &str, direction: Direction) -> Value {
    json!({ "field": { "fieldPath": field }, "direction": direction_name(direction) })
}

/// Builds the `runQuery` request body for `query`.
///
/// The document name is always the last sort key so that cursors resume
/// deterministically; the cursor itself is a `startAt` with
/// `before: false`, i.e. "start after".
pub fn structured_query(query: &Query, project_id: &str) -> Value {
    let mut structured = Map::new();
    structured.insert(
        "from".into(),
        json!([{ "collectionId": query.collection_name() }]),
    );

    let filters: Vec<Value> = query
        .filters()
        .iter()
        .map(|f| {
            json!({ "fieldFilter": {
                "field": { "fieldPath": field_path(&f.field) },
                "op": op_name(f.op),
                "value": encode_value(&f.value),
            }})
        })
        .collect();
    match filters.len() {
        0 => {}
        1 => {
            structured.insert("where".into(), filters.into_iter().next().unwrap_or_default());
        }
        _ => {
            structured.insert(
                "where".into(),
                json!({ "compositeFilter": { "op": "AND", "filters": filters } }),
            );
        }
    }

    let name_direction = query.ordering().map(|o| o.direction).unwrap_or(Direction::Ascending);
    let mut order = Vec::new();
    if let Some(ordering) = query.ordering() {
        order.push(order_entry(&field_path(&ordering.field), ordering.direction));
    }
    order.push(order_entry(NAME_FIELD, name_direction));
    structured.insert("orderBy".into(), Value::Array(order));

    if let Some(cursor) = query.cursor() {
        let reference = FieldValue::Reference(format!(
            "{}/{}/{}",
            documents_root(project_id),
            query.collection_name(),
            cursor.document_id()
        ));
        let mut values = Vec::new();
        if query.ordering().is_some() {
            values.push(encode_value(cursor.order_value()));
        }
        values.push(encode_value(&reference));
        structured.insert("startAt".into(), json!({ "values": values, "before": false }));
    }

    if let Some(limit) = query.max_results() {
        structured.insert("limit".into(), json!(limit));
    }

    json!({ "structuredQuery": structured })
}
