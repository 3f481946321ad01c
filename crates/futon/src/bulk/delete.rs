use serde::Serialize;

///
/// BulkDeleteDocument
///
/// Deletion marker for a bulk batch: the store drops the revision when a
/// batch element carries `_deleted: true`.
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct BulkDeleteDocument {
    #[serde(rename = "_id")]
    id: String,
    #[serde(rename = "_rev")]
    rev: String,
    #[serde(rename = "_deleted")]
    deleted: bool,
}

impl BulkDeleteDocument {
    #[must_use]
    pub fn of(id: impl Into<String>, rev: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            rev: rev.into(),
            deleted: true,
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn rev(&self) -> &str {
        &self.rev
    }
}

#[cfg(test)]
mod tests {
    use super::BulkDeleteDocument;

    #[test]
    fn serializes_with_the_deleted_marker() {
        let doc = BulkDeleteDocument::of("doc-1", "2-abc");
        let encoded = serde_json::to_string(&doc).expect("delete doc should serialize");

        assert_eq!(encoded, r#"{"_id":"doc-1","_rev":"2-abc","_deleted":true}"#);
    }
}
