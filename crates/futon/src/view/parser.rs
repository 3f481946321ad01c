use crate::{
    error::Error,
    transport::Transport,
    view::row::{RowBoundary, ViewRow},
};
use serde::{
    Deserialize,
    de::{self, DeserializeOwned, DeserializeSeed, IgnoredAny, MapAccess, SeqAccess, Visitor},
};
use serde_json::Value;
use std::{fmt, io::Read, marker::PhantomData};
use thiserror::Error as ThisError;
use tracing::{debug, trace};

///
/// ViewParseError
///

#[derive(Debug, ThisError)]
pub enum ViewParseError {
    #[error("malformed view result: {reason}")]
    Malformed { reason: String },

    #[error("row {index} failed to decode: {reason}")]
    RowDecode { index: usize, reason: String },

    #[error("row {index} flagged by the store: {error}")]
    RowError { index: usize, error: String },

    #[error("row {index} value is not a document id")]
    NotAReference { index: usize },

    #[error("document batch returned {found} documents for {requested} ids")]
    ReferenceCountMismatch { requested: usize, found: usize },
}

///
/// ViewResult
///
/// One parsed view result: the ordered rows that decoded successfully, the
/// store-reported total row count, and the boundary key/id pairs of the
/// first and last row actually kept.
///

#[derive(Debug)]
pub struct ViewResult<T> {
    rows: Vec<ViewRow<T>>,
    total_rows: Option<u64>,
    skipped: usize,
}

impl<T> ViewResult<T> {
    /// Store-reported total; falls back to the kept-row count when the
    /// result omits it (reduced views do).
    #[must_use]
    pub fn total_rows(&self) -> u64 {
        self.total_rows.unwrap_or(self.rows.len() as u64)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows the parser dropped under `ignore_not_found`.
    #[must_use]
    pub const fn skipped(&self) -> usize {
        self.skipped
    }

    #[must_use]
    pub fn first_boundary(&self) -> Option<RowBoundary> {
        self.rows.first().map(ViewRow::boundary)
    }

    #[must_use]
    pub fn last_boundary(&self) -> Option<RowBoundary> {
        self.rows.last().map(ViewRow::boundary)
    }

    #[must_use]
    pub fn rows(&self) -> &[ViewRow<T>] {
        &self.rows
    }

    #[must_use]
    pub fn into_rows(self) -> Vec<ViewRow<T>> {
        self.rows
    }
}

///
/// ViewResultParser
///
/// Streaming decoder for `{"total_rows": .., "rows": [..]}` bodies. Rows
/// are visited one at a time off the reader; the source is never buffered
/// whole, and there is no rewinding.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct ViewResultParser {
    ignore_not_found: bool,
}

impl ViewResultParser {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            ignore_not_found: false,
        }
    }

    /// Skip rows that fail to decode or that the store flags as missing,
    /// instead of failing the whole result.
    #[must_use]
    pub const fn ignore_not_found(mut self, ignore: bool) -> Self {
        self.ignore_not_found = ignore;
        self
    }

    /// Parse a streamed result body, mapping each row value (or inline
    /// `doc`, when present) to `T`.
    pub fn parse<T, R>(&self, body: R) -> Result<ViewResult<T>, ViewParseError>
    where
        T: DeserializeOwned,
        R: Read,
    {
        let mut fatal = None;
        let mut deserializer = serde_json::Deserializer::from_reader(body);
        let outcome = EnvelopeSeed {
            ignore_not_found: self.ignore_not_found,
            fatal: &mut fatal,
            marker: PhantomData::<T>,
        }
        .deserialize(&mut deserializer);

        match outcome {
            Ok(envelope) => {
                deserializer.end().map_err(|err| ViewParseError::Malformed {
                    reason: err.to_string(),
                })?;
                debug!(
                    rows = envelope.rows.len(),
                    skipped = envelope.skipped,
                    "parsed view result"
                );

                Ok(ViewResult {
                    rows: envelope.rows,
                    total_rows: envelope.total_rows,
                    skipped: envelope.skipped,
                })
            }
            Err(err) => Err(fatal.take().unwrap_or_else(|| ViewParseError::Malformed {
                reason: err.to_string(),
            })),
        }
    }

    /// Parse a result whose row values are document ids rather than inline
    /// documents: batch-fetch the referenced documents and substitute them
    /// in original row order before mapping to `T`.
    pub fn parse_resolving<T, R, Tr>(
        &self,
        body: R,
        transport: &Tr,
    ) -> Result<ViewResult<T>, Error>
    where
        T: DeserializeOwned,
        R: Read,
        Tr: Transport + ?Sized,
    {
        let raw: ViewResult<Value> = self.parse(body)?;
        let ViewResult {
            rows,
            total_rows,
            skipped,
        } = raw;

        let mut ids = Vec::with_capacity(rows.len());
        for (index, row) in rows.iter().enumerate() {
            match row.value().as_str() {
                Some(id) => ids.push(id.to_string()),
                None => return Err(ViewParseError::NotAReference { index }.into()),
            }
        }

        let documents = transport.fetch_documents(&ids)?;
        if documents.len() != ids.len() {
            return Err(ViewParseError::ReferenceCountMismatch {
                requested: ids.len(),
                found: documents.len(),
            }
            .into());
        }

        let mut resolved = Vec::with_capacity(rows.len());
        for (index, (row, document)) in rows.into_iter().zip(documents).enumerate() {
            let (key, doc_id, _) = row.into_parts();
            match serde_json::from_value::<T>(document) {
                Ok(value) => resolved.push(ViewRow::new(key, doc_id, value)),
                Err(err) => {
                    return Err(ViewParseError::RowDecode {
                        index,
                        reason: err.to_string(),
                    }
                    .into());
                }
            }
        }

        Ok(ViewResult {
            rows: resolved,
            total_rows,
            skipped,
        })
    }
}

// ------------------------------------------------------------------
// Streaming envelope decoding
// ------------------------------------------------------------------

struct Envelope<T> {
    total_rows: Option<u64>,
    rows: Vec<ViewRow<T>>,
    skipped: usize,
}

// Fatal row errors cannot travel through serde's error type without losing
// structure, so the seed records them in `fatal` and aborts with a marker
// error the caller discards.
struct EnvelopeSeed<'a, T> {
    ignore_not_found: bool,
    fatal: &'a mut Option<ViewParseError>,
    marker: PhantomData<T>,
}

impl<'de, T: DeserializeOwned> DeserializeSeed<'de> for EnvelopeSeed<'_, T> {
    type Value = Envelope<T>;

    fn deserialize<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
    where
        D: de::Deserializer<'de>,
    {
        deserializer.deserialize_map(self)
    }
}

impl<'de, T: DeserializeOwned> Visitor<'de> for EnvelopeSeed<'_, T> {
    type Value = Envelope<T>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a view result object with a rows array")
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let Self {
            ignore_not_found,
            fatal,
            ..
        } = self;
        let mut total_rows = None;
        let mut rows = None;

        while let Some(field) = map.next_key::<String>()? {
            match field.as_str() {
                "total_rows" => total_rows = Some(map.next_value::<u64>()?),
                "rows" => {
                    rows = Some(map.next_value_seed(RowsSeed {
                        ignore_not_found,
                        fatal: &mut *fatal,
                        marker: PhantomData::<T>,
                    })?);
                }
                _ => {
                    map.next_value::<IgnoredAny>()?;
                }
            }
        }

        let (rows, skipped) = rows.ok_or_else(|| de::Error::missing_field("rows"))?;

        Ok(Envelope {
            total_rows,
            rows,
            skipped,
        })
    }
}

struct RowsSeed<'a, T> {
    ignore_not_found: bool,
    fatal: &'a mut Option<ViewParseError>,
    marker: PhantomData<T>,
}

impl<'de, T: DeserializeOwned> DeserializeSeed<'de> for RowsSeed<'_, T> {
    type Value = (Vec<ViewRow<T>>, usize);

    fn deserialize<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
    where
        D: de::Deserializer<'de>,
    {
        deserializer.deserialize_seq(self)
    }
}

impl<'de, T: DeserializeOwned> Visitor<'de> for RowsSeed<'_, T> {
    type Value = (Vec<ViewRow<T>>, usize);

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an array of view rows")
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let Self {
            ignore_not_found,
            fatal,
            ..
        } = self;
        let mut rows = Vec::new();
        let mut skipped = 0usize;
        let mut index = 0usize;

        while let Some(raw) = seq.next_element::<RawRow>()? {
            match accept_row::<T>(raw, index, ignore_not_found) {
                Ok(Some(row)) => rows.push(row),
                Ok(None) => {
                    skipped += 1;
                    trace!(index, "skipped view row");
                }
                Err(err) => {
                    *fatal = Some(err);
                    return Err(de::Error::custom("fatal row error"));
                }
            }
            index += 1;
        }

        Ok((rows, skipped))
    }
}

///
/// RawRow
/// Wire shape of one row before value mapping. `doc` carries the alternate
/// encoding where the store inlines the document next to the row value.
///

#[derive(Debug, Deserialize)]
struct RawRow {
    #[serde(default)]
    key: Value,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    value: Option<Value>,
    #[serde(default)]
    doc: Option<Value>,
    #[serde(default)]
    error: Option<String>,
}

fn accept_row<T: DeserializeOwned>(
    raw: RawRow,
    index: usize,
    ignore_not_found: bool,
) -> Result<Option<ViewRow<T>>, ViewParseError> {
    if let Some(error) = raw.error {
        if ignore_not_found {
            return Ok(None);
        }
        return Err(ViewParseError::RowError { index, error });
    }

    let payload = raw.doc.or(raw.value).unwrap_or(Value::Null);
    match serde_json::from_value::<T>(payload) {
        Ok(value) => Ok(Some(ViewRow::new(raw.key, raw.id, value))),
        Err(_) if ignore_not_found => Ok(None),
        Err(err) => Err(ViewParseError::RowDecode {
            index,
            reason: err.to_string(),
        }),
    }
}
