//! Content type detection for files.
//!
//! [`sniff`] decides a file's MIME type in strict priority order:
//!
//! 1. Binary signature: if the lowercase extension has an entry in the
//!    signature table, each candidate is read at its offset and compared;
//!    the first exact match wins.
//! 2. Text heuristic: a file whose first 128 bytes hold no NUL byte is
//!    `text/plain`. If the file cannot be read here, the result is
//!    `application/octet-stream`.
//! 3. Extension table lookup.
//! 4. `application/octet-stream`.
//!
//! Sniffing never fails; every error degrades to the next step. Results are
//! not cached and every call reads the file again.

mod extensions;
pub mod signatures;

pub use extensions::{add_extension_type, extensions_by_type, type_by_extension};
pub use signatures::{SignatureEntry, SIGNATURES};

use std::ffi::OsStr;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

/// The generic binary type every failed detection falls back to.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// The type reported by the text heuristic.
pub const TEXT_PLAIN: &str = "text/plain";

/// Number of leading bytes inspected by the text heuristic.
const TEXT_SAMPLE_LEN: u64 = 128;

/// Returns the MIME type of the file at `path` using the built-in signature table.
///
/// # Examples
///
/// ```
/// use tokio_formdata::sniff;
///
/// assert_eq!(sniff("/no/such/file.png"), "application/octet-stream");
/// ```
pub fn sniff(path: impl AsRef<Path>) -> String {
    sniff_with(path, SIGNATURES)
}

/// Returns the MIME type of the file at `path`, matching signatures from `table`.
pub fn sniff_with(path: impl AsRef<Path>, table: &[SignatureEntry]) -> String {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(OsStr::to_str)
        .map(str::to_ascii_lowercase);

    if let Some(entry) = extension
        .as_deref()
        .and_then(|ext| signatures::lookup(table, ext))
    {
        if let Some(mime) = match_signatures(path, entry) {
            log::debug!("{}: signature match, {}", path.display(), mime);
            return mime.to_string();
        }
    }

    match is_text(path) {
        Ok(true) => {
            log::debug!("{}: no NUL in leading bytes, {}", path.display(), TEXT_PLAIN);
            return TEXT_PLAIN.to_string();
        }
        Ok(false) => {}
        Err(e) => {
            log::debug!("{}: unreadable ({}), {}", path.display(), e, OCTET_STREAM);
            return OCTET_STREAM.to_string();
        }
    }

    if let Some(mime) = extension.and_then(|ext| type_by_extension(&format!(".{}", ext))) {
        log::debug!("{}: extension match, {}", path.display(), mime);
        return mime;
    }

    log::debug!("{}: no match, {}", path.display(), OCTET_STREAM);
    OCTET_STREAM.to_string()
}

/// Tries each candidate of `entry` in order; the file handle lives only for this call.
fn match_signatures(path: &Path, entry: &SignatureEntry) -> Option<&'static str> {
    let mut file = match File::open(path) {
        Ok(file) => file,
        Err(e) => {
            log::trace!("{}: cannot open for signature check: {}", path.display(), e);
            return None;
        }
    };

    entry
        .signatures
        .iter()
        .find(|(offset, hex)| {
            let matched = match read_at(&mut file, *offset, hex.len() / 2) {
                Ok(bytes) => to_upper_hex(&bytes) == *hex,
                // offset past the end of the file
                Err(_) => false,
            };
            log::trace!(
                "{}: candidate {}@{} {}",
                path.display(),
                hex,
                offset,
                if matched { "matched" } else { "missed" }
            );
            matched
        })
        .map(|_| entry.mime)
}

fn read_at(file: &mut File, offset: u64, len: usize) -> io::Result<Vec<u8>> {
    file.seek(SeekFrom::Start(offset))?;
    let mut buf = vec![0; len];
    file.read_exact(&mut buf)?;
    Ok(buf)
}

fn to_upper_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02X}", b)).collect()
}

/// Reports whether the leading bytes of the file contain no NUL byte.
fn is_text(path: &Path) -> io::Result<bool> {
    let mut sample = Vec::with_capacity(TEXT_SAMPLE_LEN as usize);
    File::open(path)?
        .take(TEXT_SAMPLE_LEN)
        .read_to_end(&mut sample)?;
    Ok(!sample.contains(&0))
}
