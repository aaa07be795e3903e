//! Namespace declarations of an RDF/XML document.
//!
//! Only the first structural element is read; the rest of the stream is never
//! touched. Streams are taken by value and dropped on every return path.

use std::collections::BTreeSet;
use std::io::{self, BufRead, BufReader, ErrorKind, Read};
use std::sync::Arc;

use cgmes_core::{CgmesError, CgmesResult};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::debug;
use zip::result::ZipError;

use crate::format_error;

/// Namespace URIs declared on the first element of `input`.
///
/// Empty or truncated input yields an empty set.
pub fn namespaces<R: Read>(input: R) -> CgmesResult<BTreeSet<String>> {
    let first = first_element(BufReader::new(input), |element| {
        let mut found = BTreeSet::new();
        for attr in element.attributes() {
            let attr = attr.map_err(format_error)?;
            let key = attr.key.as_ref();
            if key == b"xmlns" || key.starts_with(b"xmlns:") {
                found.insert(attr.unescape_value().map_err(format_error)?.into_owned());
            }
        }
        Ok(found)
    })?;
    Ok(first.unwrap_or_default())
}

/// Namespaces of the first entry of a zip-compressed stream.
pub fn namespaces_from_zip<R: Read>(input: R) -> CgmesResult<BTreeSet<String>> {
    Ok(with_first_zip_entry(input, |entry| namespaces(entry))?.unwrap_or_default())
}

/// Value of `xml:base` on the first element of `input`, if declared.
pub fn base<R: Read>(input: R) -> CgmesResult<Option<String>> {
    let first = first_element(BufReader::new(input), |element| {
        for attr in element.attributes() {
            let attr = attr.map_err(format_error)?;
            if attr.key.as_ref() == b"xml:base" {
                let value = attr.unescape_value().map_err(format_error)?;
                return Ok(Some(value.into_owned()));
            }
        }
        Ok(None)
    })?;
    Ok(first.flatten())
}

/// [`base`] for the first entry of a zip-compressed stream.
pub fn base_from_zip<R: Read>(input: R) -> CgmesResult<Option<String>> {
    Ok(with_first_zip_entry(input, |entry| base(entry))?.flatten())
}

// A stream cut off before the first local header counts as having no entry,
// and so does an entry whose data ends early or fails its checksum.
pub(crate) fn with_first_zip_entry<R, T, F>(mut input: R, read: F) -> CgmesResult<Option<T>>
where
    R: Read,
    F: FnOnce(zip::read::ZipFile<'_>) -> CgmesResult<T>,
{
    match zip::read::read_zipfile_from_stream(&mut input) {
        Ok(Some(entry)) => match read(entry) {
            Ok(value) => Ok(Some(value)),
            Err(CgmesError::Io(e)) => {
                debug!(error = %e, "zip entry cut off");
                Ok(None)
            }
            Err(e) => Err(e),
        },
        Ok(None) => Ok(None),
        Err(ZipError::Io(e)) if e.kind() == ErrorKind::UnexpectedEof => Ok(None),
        Err(e) => Err(format_error(e)),
    }
}

// Applies `inspect` to the first start (or empty) element. `None` when the
// document ends, or is cut off, before one is found. A start element whose
// attributes do not parse and after which the stream ends was never closed.
fn first_element<B, T, F>(input: B, inspect: F) -> CgmesResult<Option<T>>
where
    B: BufRead,
    F: FnOnce(&BytesStart) -> CgmesResult<T>,
{
    let mut reader = Reader::from_reader(input);
    reader.trim_text(true);
    let mut buf = Vec::new();
    let element = loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Empty(ref e)) => return inspect(e).map(Some),
            Ok(Event::Start(e)) => break e.into_owned(),
            Ok(Event::Eof) => return Ok(None),
            Ok(_) => {}
            Err(quick_xml::Error::UnexpectedEof(_)) => return Ok(None),
            Err(quick_xml::Error::Io(e)) if e.kind() == ErrorKind::UnexpectedEof => return Ok(None),
            Err(quick_xml::Error::Io(e)) => return Err(CgmesError::Io(unshare(e))),
            Err(e) => return Err(format_error(e)),
        }
        buf.clear();
    };
    match inspect(&element) {
        Ok(value) => Ok(Some(value)),
        Err(err) => {
            buf.clear();
            if stream_ends(&mut reader, &mut buf) {
                debug!(error = %err, "first element cut off");
                Ok(None)
            } else {
                Err(err)
            }
        }
    }
}

fn stream_ends<B: BufRead>(reader: &mut Reader<B>, buf: &mut Vec<u8>) -> bool {
    matches!(
        reader.read_event_into(buf),
        Ok(Event::Eof) | Err(quick_xml::Error::UnexpectedEof(_))
    )
}

fn unshare(e: Arc<io::Error>) -> io::Error {
    Arc::try_unwrap(e).unwrap_or_else(|e| io::Error::new(e.kind(), e.to_string()))
}
