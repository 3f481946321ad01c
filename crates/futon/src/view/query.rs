use serde_json::Value;
use std::{fmt::Write as _, num::NonZeroUsize};

///
/// ViewQuery
///
/// Immutable descriptor for one view query. Built fluently, then handed to
/// the transport, which renders it with [`ViewQuery::path`] and
/// [`ViewQuery::as_query_string`]. The engine only ever narrows a caller's
/// base query with an anchor, a limit, and a direction.
///

#[derive(Clone, Debug, PartialEq)]
pub struct ViewQuery {
    pub(crate) design_doc: Option<String>,
    pub(crate) view_name: String,
    pub(crate) start_key: Option<Value>,
    pub(crate) start_key_doc_id: Option<String>,
    pub(crate) end_key: Option<Value>,
    pub(crate) limit: Option<NonZeroUsize>,
    pub(crate) descending: bool,
    pub(crate) include_docs: bool,
    pub(crate) reduce: Option<bool>,
    pub(crate) extra: Vec<(String, String)>,
}

impl ViewQuery {
    #[must_use]
    pub fn new(design_doc: impl Into<String>, view_name: impl Into<String>) -> Self {
        Self {
            design_doc: Some(design_doc.into()),
            view_name: view_name.into(),
            start_key: None,
            start_key_doc_id: None,
            end_key: None,
            limit: None,
            descending: false,
            include_docs: false,
            reduce: None,
            extra: Vec::new(),
        }
    }

    /// Query the store's built-in id-ordered index instead of a named view.
    #[must_use]
    pub fn all_docs() -> Self {
        Self {
            design_doc: None,
            ..Self::new("", "_all_docs")
        }
    }

    #[must_use]
    pub fn start_key(mut self, key: Value) -> Self {
        self.start_key = Some(key);
        self
    }

    #[must_use]
    pub fn start_key_doc_id(mut self, doc_id: impl Into<String>) -> Self {
        self.start_key_doc_id = Some(doc_id.into());
        self
    }

    #[must_use]
    pub fn end_key(mut self, key: Value) -> Self {
        self.end_key = Some(key);
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: NonZeroUsize) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub fn descending(mut self, descending: bool) -> Self {
        self.descending = descending;
        self
    }

    #[must_use]
    pub fn include_docs(mut self, include_docs: bool) -> Self {
        self.include_docs = include_docs;
        self
    }

    #[must_use]
    pub fn reduce(mut self, reduce: bool) -> Self {
        self.reduce = Some(reduce);
        self
    }

    /// Attach an arbitrary pass-through query parameter.
    #[must_use]
    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.push((name.into(), value.into()));
        self
    }

    /// Request path for this query, relative to the database root.
    #[must_use]
    pub fn path(&self) -> String {
        match &self.design_doc {
            Some(design_doc) => format!("_design/{design_doc}/_view/{}", self.view_name),
            None => self.view_name.clone(),
        }
    }

    /// Render the query string (without the leading `?`). Keys are
    /// JSON-encoded before percent-escaping, per the view protocol.
    #[must_use]
    pub fn as_query_string(&self) -> String {
        let mut params = Vec::new();

        if let Some(key) = &self.start_key {
            params.push(format!("startkey={}", encode_component(&key.to_string())));
        }
        if let Some(doc_id) = &self.start_key_doc_id {
            params.push(format!("startkey_docid={}", encode_component(doc_id)));
        }
        if let Some(key) = &self.end_key {
            params.push(format!("endkey={}", encode_component(&key.to_string())));
        }
        if let Some(limit) = self.limit {
            params.push(format!("limit={limit}"));
        }
        if self.descending {
            params.push("descending=true".to_string());
        }
        if self.include_docs {
            params.push("include_docs=true".to_string());
        }
        if let Some(reduce) = self.reduce {
            params.push(format!("reduce={reduce}"));
        }
        for (name, value) in &self.extra {
            params.push(format!(
                "{}={}",
                encode_component(name),
                encode_component(value)
            ));
        }

        params.join("&")
    }
}

// Percent-escape everything outside the unreserved set.
fn encode_component(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char);
            }
            _ => {
                let _ = write!(out, "%{byte:02X}");
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::ViewQuery;
    use serde_json::json;
    use std::num::NonZeroUsize;

    #[test]
    fn view_path_names_design_doc_and_view() {
        let query = ViewQuery::new("accounts", "by_name");
        assert_eq!(query.path(), "_design/accounts/_view/by_name");

        assert_eq!(ViewQuery::all_docs().path(), "_all_docs");
    }

    #[test]
    fn query_string_json_encodes_and_escapes_keys() {
        let query = ViewQuery::new("accounts", "by_name")
            .start_key(json!(["a b", 1]))
            .start_key_doc_id("doc/7")
            .limit(NonZeroUsize::new(4).expect("nonzero"))
            .descending(true);

        assert_eq!(
            query.as_query_string(),
            "startkey=%5B%22a%20b%22%2C1%5D&startkey_docid=doc%2F7&limit=4&descending=true"
        );
    }

    #[test]
    fn query_string_keeps_pass_through_params_in_insertion_order() {
        let query = ViewQuery::all_docs()
            .include_docs(true)
            .param("stale", "ok")
            .param("group_level", "2");

        assert_eq!(
            query.as_query_string(),
            "include_docs=true&stale=ok&group_level=2"
        );
    }
}
