use serde_json::Value;

///
/// RowBoundary
///
/// Key/id pair of the first or last row of a fetched window, used to
/// anchor the adjacent page's cursor.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RowBoundary {
    key: Value,
    doc_id: Option<String>,
}

impl RowBoundary {
    #[must_use]
    pub const fn new(key: Value, doc_id: Option<String>) -> Self {
        Self { key, doc_id }
    }

    #[must_use]
    pub const fn key(&self) -> &Value {
        &self.key
    }

    #[must_use]
    pub fn doc_id(&self) -> Option<&str> {
        self.doc_id.as_deref()
    }

    /// Consume this boundary and return `(key, doc_id)`.
    #[must_use]
    pub fn into_parts(self) -> (Value, Option<String>) {
        (self.key, self.doc_id)
    }
}

///
/// ViewRow
///
/// One decoded query result entry. Immutable once produced; `key` is an
/// opaque order-comparable value and `doc_id` is the tie-breaker, unique
/// within a query.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ViewRow<T> {
    key: Value,
    doc_id: Option<String>,
    value: T,
}

impl<T> ViewRow<T> {
    pub(crate) const fn new(key: Value, doc_id: Option<String>, value: T) -> Self {
        Self { key, doc_id, value }
    }

    #[must_use]
    pub const fn key(&self) -> &Value {
        &self.key
    }

    #[must_use]
    pub fn doc_id(&self) -> Option<&str> {
        self.doc_id.as_deref()
    }

    #[must_use]
    pub const fn value(&self) -> &T {
        &self.value
    }

    #[must_use]
    pub fn into_value(self) -> T {
        self.value
    }

    /// Consume this row and return `(key, doc_id, value)`.
    #[must_use]
    pub fn into_parts(self) -> (Value, Option<String>, T) {
        (self.key, self.doc_id, self.value)
    }

    #[must_use]
    pub fn boundary(&self) -> RowBoundary {
        RowBoundary::new(self.key.clone(), self.doc_id.clone())
    }
}
