//! Streaming body decoding
//!
//! Two composable stages sit between the transport and the caller of a
//! record-producing endpoint:
//!
//! 1. [`Inflater`] undoes the transfer compression announced by the
//!    response's `Content-Encoding` header (`gzip`, `deflate`, or none),
//!    incrementally, so fragments can be decoded as they arrive.
//! 2. [`RecordDecoder`] splits the inflated byte stream into complete
//!    msgpack values, carrying partial trailing bytes over to the next
//!    fragment.
//!
//! [`RecordStream`] chains the two for the common case.

use std::io::Write;

use flate2::write::{GzDecoder, ZlibDecoder};
use rmpv::Value;
use strata_domain::{ClientError, Result};
use tracing::debug;

/// Incremental decompressor selected from a `Content-Encoding` header.
///
/// An absent or unrecognized encoding passes bytes through untouched; the
/// match on recognized tokens is exact but case-insensitive, so a value
/// like `"gzip, identity"` is treated as unrecognized rather than
/// guessed at.
pub struct Inflater {
    inner: Decoder,
}

enum Decoder {
    Identity,
    Gzip(GzDecoder<Vec<u8>>),
    Zlib(ZlibDecoder<Vec<u8>>),
}

impl Inflater {
    pub fn from_content_encoding(encoding: Option<&str>) -> Self {
        let inner = match encoding.map(str::trim) {
            Some(token) if token.eq_ignore_ascii_case("gzip") => {
                Decoder::Gzip(GzDecoder::new(Vec::new()))
            }
            Some(token) if token.eq_ignore_ascii_case("deflate") => {
                Decoder::Zlib(ZlibDecoder::new(Vec::new()))
            }
            _ => Decoder::Identity,
        };
        Self { inner }
    }

    /// Inflate one fragment, returning whatever complete output it yields.
    ///
    /// May return an empty vec when the fragment ends inside a compressed
    /// block; the held-back bytes surface with the next fragment or at
    /// [`finish`](Self::finish).
    pub fn feed(&mut self, chunk: &[u8]) -> Result<Vec<u8>> {
        match &mut self.inner {
            Decoder::Identity => Ok(chunk.to_vec()),
            Decoder::Gzip(decoder) => inflate_chunk(decoder, chunk),
            Decoder::Zlib(decoder) => inflate_chunk(decoder, chunk),
        }
    }

    /// Flush the decompressor and return any remaining output.
    ///
    /// A stream cut off mid-block is not an error here: the bytes inflated
    /// so far are returned and the truncation is left for the record layer
    /// to notice. Result bodies are fetched over connections that can drop,
    /// and a partial tail must not destroy the records before it.
    pub fn finish(self) -> Vec<u8> {
        match self.inner {
            Decoder::Identity => Vec::new(),
            Decoder::Gzip(decoder) => finish_decoder(decoder),
            Decoder::Zlib(decoder) => finish_decoder(decoder),
        }
    }
}

fn inflate_chunk<W>(decoder: &mut W, chunk: &[u8]) -> Result<Vec<u8>>
where
    W: Write + InnerBuf,
{
    decoder
        .write_all(chunk)
        .and_then(|()| decoder.flush())
        .map_err(|e| ClientError::Decode(format!("corrupt compressed stream: {e}")))?;
    Ok(std::mem::take(decoder.inner_buf()))
}

fn finish_decoder<D: FinishDecoder>(mut decoder: D) -> Vec<u8> {
    let _ = decoder.flush();
    let mut out = std::mem::take(decoder.inner_buf());
    match decoder.finish_inner() {
        Ok(rest) => out.extend_from_slice(&rest),
        // Truncated tail: keep what was already inflated.
        Err(_) => {}
    }
    out
}

trait InnerBuf {
    fn inner_buf(&mut self) -> &mut Vec<u8>;
}

trait FinishDecoder: Write + InnerBuf + Sized {
    fn finish_inner(self) -> std::io::Result<Vec<u8>>;
}

impl InnerBuf for GzDecoder<Vec<u8>> {
    fn inner_buf(&mut self) -> &mut Vec<u8> {
        self.get_mut()
    }
}

impl InnerBuf for ZlibDecoder<Vec<u8>> {
    fn inner_buf(&mut self) -> &mut Vec<u8> {
        self.get_mut()
    }
}

impl FinishDecoder for GzDecoder<Vec<u8>> {
    fn finish_inner(self) -> std::io::Result<Vec<u8>> {
        self.finish()
    }
}

impl FinishDecoder for ZlibDecoder<Vec<u8>> {
    fn finish_inner(self) -> std::io::Result<Vec<u8>> {
        self.finish()
    }
}

/// Inflate a complete buffered body in one go.
pub(crate) fn inflate_all(encoding: Option<&str>, data: &[u8]) -> Result<Vec<u8>> {
    let mut inflater = Inflater::from_content_encoding(encoding);
    let mut out = inflater.feed(data)?;
    out.extend_from_slice(&inflater.finish());
    Ok(out)
}

/// Incremental msgpack record splitter.
///
/// Fragments rarely end on a value boundary; bytes left over after the
/// last complete value are carried into the next `feed`. Only a malformed
/// marker is an error. Truncation (a value cut off by the end of the
/// buffered bytes) just means "wait for more".
#[derive(Default)]
pub struct RecordDecoder {
    carry: Vec<u8>,
}

impl RecordDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode every complete value in `carry + bytes`, appending to `out`.
    pub fn feed(&mut self, bytes: &[u8], out: &mut Vec<Value>) -> Result<()> {
        self.carry.extend_from_slice(bytes);

        let mut cursor = std::io::Cursor::new(&self.carry[..]);
        loop {
            let mark = cursor.position();
            match rmpv::decode::read_value(&mut cursor) {
                Ok(value) => out.push(value),
                Err(err) if is_truncation(&err) => {
                    cursor.set_position(mark);
                    break;
                }
                Err(err) => {
                    return Err(ClientError::Decode(format!("malformed msgpack record: {err}")))
                }
            }
            if cursor.position() as usize == self.carry.len() {
                break;
            }
        }

        let consumed = cursor.position() as usize;
        self.carry.drain(..consumed);
        Ok(())
    }

    /// Close the stream, discarding a trailing partial value if one is
    /// buffered.
    pub fn finish(self) {
        if !self.carry.is_empty() {
            debug!(bytes = self.carry.len(), "discarding partial trailing record");
        }
    }
}

/// Whether a decode failure means "ran out of bytes" rather than
/// "malformed bytes".
fn is_truncation(err: &rmpv::decode::Error) -> bool {
    use rmpv::decode::Error;
    match err {
        Error::InvalidMarkerRead(io) | Error::InvalidDataRead(io) => {
            io.kind() == std::io::ErrorKind::UnexpectedEof
        }
        _ => false,
    }
}

/// [`Inflater`] and [`RecordDecoder`] chained: raw transfer bytes in,
/// complete msgpack values out.
pub struct RecordStream {
    inflater: Inflater,
    decoder: RecordDecoder,
}

impl RecordStream {
    pub fn from_content_encoding(encoding: Option<&str>) -> Self {
        Self {
            inflater: Inflater::from_content_encoding(encoding),
            decoder: RecordDecoder::new(),
        }
    }

    /// Push one raw fragment; returns the records it completed.
    pub fn feed(&mut self, chunk: &[u8]) -> Result<Vec<Value>> {
        let inflated = self.inflater.feed(chunk)?;
        let mut records = Vec::new();
        self.decoder.feed(&inflated, &mut records)?;
        Ok(records)
    }

    /// Drain the decompressor and return any final complete records.
    pub fn finish(mut self) -> Result<Vec<Value>> {
        let tail = self.inflater.finish();
        let mut records = Vec::new();
        self.decoder.feed(&tail, &mut records)?;
        self.decoder.finish();
        Ok(records)
    }
}
