//! Provenance headers for migrations copied into the catalog.
//!
//! A copied file starts with a single line
//!
//! ```text
//! #migration: <origin path>;<md5 of the original bytes>
//! ```
//!
//! The checksum is computed over the source file *before* the header is
//! added, so it can be compared directly with a digest of the source.

use crate::checksum::compute_checksum;
use serde::Serialize;

/// Line prefix identifying a provenance header
pub const HEADER_PREFIX: &str = "#migration:";

/// Origin path and checksum recovered from a header.
///
/// Both fields are empty when the file carries no (well-formed) header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Provenance {
    pub origin: String,
    pub checksum: String,
}

impl Provenance {
    /// Provenance for `source` copied from `origin`
    pub fn for_source(source: &[u8], origin: &str) -> Self {
        Self {
            origin: origin.to_string(),
            checksum: compute_checksum(source),
        }
    }

    /// True when no metadata is available
    pub fn is_empty(&self) -> bool {
        self.origin.is_empty() && self.checksum.is_empty()
    }

    /// The header line, newline included
    pub fn header_line(&self) -> String {
        format!("{} {};{}\n", HEADER_PREFIX, self.origin, self.checksum)
    }
}

/// Build the header line for `source` copied from `origin`
pub fn tag(source: &[u8], origin: &str) -> String {
    Provenance::for_source(source, origin).header_line()
}

/// Header followed by the source body.
///
/// If the source already starts with a provenance header (it is itself a
/// copy), that line is replaced rather than stacked.
pub fn tagged_contents(source: &[u8], provenance: &Provenance) -> Vec<u8> {
    let body = strip_header(source);
    let header = provenance.header_line();
    let mut out = Vec::with_capacity(header.len() + body.len());
    out.extend_from_slice(header.as_bytes());
    out.extend_from_slice(body);
    out
}

/// The bytes after a leading provenance header line, or all of `bytes`
pub fn strip_header(bytes: &[u8]) -> &[u8] {
    if !bytes.starts_with(HEADER_PREFIX.as_bytes()) {
        return bytes;
    }
    match bytes.iter().position(|&b| b == b'\n') {
        Some(nl) => &bytes[nl + 1..],
        None => &[],
    }
}

/// Parse the first provenance header found in `bytes`.
///
/// A header whose remainder does not split into exactly two `;`-separated
/// parts counts as absent.
pub fn parse(bytes: &[u8]) -> Provenance {
    let text = String::from_utf8_lossy(bytes);
    for line in text.lines() {
        let Some(rest) = line.strip_prefix(HEADER_PREFIX) else {
            continue;
        };
        let parts: Vec<&str> = rest.trim().split(';').collect();
        if let [origin, checksum] = parts.as_slice() {
            return Provenance {
                origin: origin.to_string(),
                checksum: checksum.to_string(),
            };
        }
    }
    Provenance::default()
}

#[cfg(test)]
#[path = "provenance_test.rs"]
mod tests;
