//! Deterministic in-memory stand-in for the remote store, used by the
//! parser and pagination tests.

use crate::{
    transport::{Transport, TransportError},
    view::ViewQuery,
};
use serde_json::{Value, json};
use std::{
    cell::RefCell,
    cmp::Ordering,
    collections::BTreeMap,
    io::{Cursor, Read},
};

///
/// FixtureRow
///

#[derive(Clone, Debug)]
pub(crate) struct FixtureRow {
    pub(crate) key: Value,
    pub(crate) id: String,
    pub(crate) value: Value,
}

///
/// FakeTransport
///
/// Serves view queries from a sorted fixture set, honoring start key,
/// start doc id (inclusive anchors), direction, and limit the way the
/// store's view protocol does.
///

pub(crate) struct FakeTransport {
    rows: Vec<FixtureRow>,
    docs: BTreeMap<String, Value>,
    pub(crate) bulk_requests: RefCell<Vec<Vec<u8>>>,
}

impl FakeTransport {
    pub(crate) fn new(mut rows: Vec<FixtureRow>) -> Self {
        rows.sort_by(|a, b| key_cmp(&a.key, &b.key).then_with(|| a.id.cmp(&b.id)));

        Self {
            rows,
            docs: BTreeMap::new(),
            bulk_requests: RefCell::new(Vec::new()),
        }
    }

    /// `count` rows keyed 0..count with ids `doc-000`.. and a `seq` value.
    pub(crate) fn sequential(count: usize) -> Self {
        let rows = (0..count)
            .map(|seq| FixtureRow {
                key: json!(seq),
                id: format!("doc-{seq:03}"),
                value: json!({ "seq": seq }),
            })
            .collect();

        Self::new(rows)
    }

    pub(crate) fn with_docs(mut self, docs: impl IntoIterator<Item = (String, Value)>) -> Self {
        self.docs.extend(docs);
        self
    }

    fn window(&self, query: &ViewQuery) -> Vec<&FixtureRow> {
        let mut ordered: Vec<&FixtureRow> = self.rows.iter().collect();
        if query.descending {
            ordered.reverse();
        }

        let anchored: Vec<&FixtureRow> = match &query.start_key {
            None => ordered,
            Some(start_key) => {
                let anchor_id = query.start_key_doc_id.as_deref();
                ordered
                    .into_iter()
                    .skip_while(|row| {
                        let at_anchor = anchor_cmp(row, start_key, anchor_id);
                        if query.descending {
                            at_anchor == Ordering::Greater
                        } else {
                            at_anchor == Ordering::Less
                        }
                    })
                    .collect()
            }
        };

        match query.limit {
            Some(limit) => anchored.into_iter().take(limit.get()).collect(),
            None => anchored,
        }
    }
}

impl Transport for FakeTransport {
    type Body = Cursor<Vec<u8>>;

    fn view_query(&self, query: &ViewQuery) -> Result<Self::Body, TransportError> {
        let rows: Vec<Value> = self
            .window(query)
            .into_iter()
            .map(|row| json!({ "key": row.key, "id": row.id, "value": row.value }))
            .collect();
        let body = json!({ "total_rows": self.rows.len(), "rows": rows });

        Ok(Cursor::new(body.to_string().into_bytes()))
    }

    fn send_bulk(
        &self,
        body: &mut dyn Read,
        _content_length: Option<u64>,
    ) -> Result<Self::Body, TransportError> {
        let mut request = Vec::new();
        body.read_to_end(&mut request)?;
        self.bulk_requests.borrow_mut().push(request);

        Ok(Cursor::new(b"[]".to_vec()))
    }

    fn fetch_documents(&self, ids: &[String]) -> Result<Vec<Value>, TransportError> {
        ids.iter()
            .map(|id| {
                self.docs
                    .get(id)
                    .cloned()
                    .ok_or_else(|| TransportError::Remote {
                        status: 404,
                        reason: format!("no document with id {id}"),
                    })
            })
            .collect()
    }
}

// (key, id) comparison against the query anchor; a missing anchor id
// matches any id with the same key, keeping the anchor inclusive.
fn anchor_cmp(row: &FixtureRow, anchor_key: &Value, anchor_id: Option<&str>) -> Ordering {
    key_cmp(&row.key, anchor_key).then_with(|| match anchor_id {
        Some(anchor_id) => row.id.as_str().cmp(anchor_id),
        None => Ordering::Equal,
    })
}

// Total order over fixture keys, close enough to the store's collation
// for test data: null < bool < number < string < array.
pub(crate) fn key_cmp(a: &Value, b: &Value) -> Ordering {
    const fn rank(value: &Value) -> u8 {
        match value {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Number(_) => 2,
            Value::String(_) => 3,
            Value::Array(_) => 4,
            Value::Object(_) => 5,
        }
    }

    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .unwrap_or(0.0)
            .total_cmp(&y.as_f64().unwrap_or(0.0)),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Array(x), Value::Array(y)) => {
            for (xi, yi) in x.iter().zip(y.iter()) {
                let ord = key_cmp(xi, yi);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            x.len().cmp(&y.len())
        }
        _ => rank(a).cmp(&rank(b)),
    }
}
