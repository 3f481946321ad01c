//! Module: bulk::encoder
//! Responsibility: assembling the bulk-operation envelope as a byte stream.
//! Does not own: sending the request or interpreting per-document results.

use serde::Serialize;
use std::io::{self, Read};

// Envelope fragments are fixed so the wire format stays byte-stable:
// `all_or_nothing`, when present, always precedes `docs`.
const fn envelope_header(all_or_nothing: bool) -> &'static [u8] {
    if all_or_nothing {
        br#"{"all_or_nothing":true,"docs":"#
    } else {
        br#"{"docs":"#
    }
}

const ENVELOPE_FOOTER: &[u8] = b"}";

/// Encode an in-memory document collection as a bulk-operation body.
///
/// Documents are serialized one at a time as the body is read, in
/// insertion order; the full `docs` array is never buffered.
pub fn encode_bulk<I>(docs: I, all_or_nothing: bool) -> EncodedBulk<I::IntoIter>
where
    I: IntoIterator,
    I::Item: Serialize,
{
    let mut buf = envelope_header(all_or_nothing).to_vec();
    buf.push(b'[');

    EncodedBulk {
        docs: docs.into_iter(),
        buf,
        pos: 0,
        emitted_any: false,
        closed: false,
    }
}

/// Splice an already-serialized JSON array body into a bulk-operation
/// envelope.
///
/// The output is three segments read back to back: a generated header, the
/// caller's stream verbatim, and a generated footer. The middle segment is
/// never copied, and never validated: the output is well-formed JSON iff
/// the input is a well-formed JSON array body.
pub fn encode_bulk_from_stream<R: Read>(raw_docs: R, all_or_nothing: bool) -> SplicedBulk<R> {
    SplicedBulk {
        header: envelope_header(all_or_nothing).to_vec(),
        header_pos: 0,
        raw_docs,
        docs_done: false,
        footer_pos: 0,
    }
}

///
/// EncodedBulk
///
/// Byte stream over `{"all_or_nothing":true,"docs":[..]}` with the array
/// elements pulled from the iterator on demand. Consumable exactly once.
///

#[derive(Debug)]
pub struct EncodedBulk<I> {
    docs: I,
    buf: Vec<u8>,
    pos: usize,
    emitted_any: bool,
    closed: bool,
}

impl<I> Read for EncodedBulk<I>
where
    I: Iterator,
    I::Item: Serialize,
{
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        if out.is_empty() {
            return Ok(0);
        }

        loop {
            if self.pos < self.buf.len() {
                let pending = &self.buf[self.pos..];
                let n = pending.len().min(out.len());
                out[..n].copy_from_slice(&pending[..n]);
                self.pos += n;
                return Ok(n);
            }

            if self.closed {
                // Buffers are spent; release them.
                self.buf = Vec::new();
                self.pos = 0;
                return Ok(0);
            }

            self.buf.clear();
            self.pos = 0;
            match self.docs.next() {
                Some(doc) => {
                    if self.emitted_any {
                        self.buf.push(b',');
                    }
                    serde_json::to_writer(&mut self.buf, &doc).map_err(io::Error::other)?;
                    self.emitted_any = true;
                }
                None => {
                    self.buf.extend_from_slice(b"]");
                    self.buf.extend_from_slice(ENVELOPE_FOOTER);
                    self.closed = true;
                }
            }
        }
    }
}

///
/// SplicedBulk
///
/// Header, raw docs stream, and footer read as one logical stream.
///

#[derive(Debug)]
pub struct SplicedBulk<R> {
    header: Vec<u8>,
    header_pos: usize,
    raw_docs: R,
    docs_done: bool,
    footer_pos: usize,
}

impl<R: Read> Read for SplicedBulk<R> {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        if out.is_empty() {
            return Ok(0);
        }

        if self.header_pos < self.header.len() {
            let pending = &self.header[self.header_pos..];
            let n = pending.len().min(out.len());
            out[..n].copy_from_slice(&pending[..n]);
            self.header_pos += n;
            if self.header_pos == self.header.len() {
                // Header fully emitted; release its buffer.
                self.header = Vec::new();
                self.header_pos = 0;
            }
            return Ok(n);
        }

        if !self.docs_done {
            let n = self.raw_docs.read(out)?;
            if n > 0 {
                return Ok(n);
            }
            self.docs_done = true;
        }

        let pending = &ENVELOPE_FOOTER[self.footer_pos..];
        if pending.is_empty() {
            return Ok(0);
        }
        let n = pending.len().min(out.len());
        out[..n].copy_from_slice(&pending[..n]);
        self.footer_pos += n;

        Ok(n)
    }
}

///
/// TESTS
///
