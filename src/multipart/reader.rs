//! Multipart body reader.
//!
//! Parses RFC 2046 multipart bodies with async I/O. Each part is buffered in
//! full; part payloads are returned exactly, without the line break that
//! precedes the next delimiter.

use crate::error::{Error, Result};
use crate::media_type::{parse_disposition, parse_media_type};
use bytes::Bytes;
use std::collections::HashMap;
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader, ReadBuf};

const PEEK_BUFFER_SIZE: usize = 4096;
const MAX_MIME_HEADER_SIZE: usize = 10 << 20; // 10 MB
const MAX_MIME_HEADERS: usize = 10000;
const MAX_PART_SIZE: usize = 32 << 20; // 32 MB

/// Part headers, keyed by lowercase name.
pub type MimeHeader = HashMap<String, Vec<String>>;

/// What a line turned out to be.
#[derive(Debug, PartialEq, Eq)]
enum Delimiter {
    Part,
    Final,
}

/// A multipart body reader.
pub struct Reader<R> {
    buf_reader: BufReader<R>,
    dash_boundary: Vec<u8>, // "--" + boundary
    pending: Option<Vec<u8>>,
    parts_read: usize,
    finished: bool,
}

impl<R: AsyncRead + Unpin> Reader<R> {
    /// Creates a reader for a body using the given boundary parameter.
    ///
    /// # Examples
    ///
    /// ```
    /// use tokio_formdata::multipart::Reader;
    ///
    /// # #[tokio::main]
    /// # async fn main() -> tokio_formdata::Result<()> {
    /// let data = b"--b\r\nContent-Disposition: form-data; name=\"q\"\r\n\r\nrust\r\n--b--\r\n";
    /// let mut reader = Reader::new(&data[..], "b");
    ///
    /// let part = reader.next_part().await?.unwrap();
    /// assert_eq!(part.form_name(), Some("q"));
    /// assert_eq!(&part.bytes()[..], b"rust");
    /// assert!(reader.next_part().await?.is_none());
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(r: R, boundary: &str) -> Self {
        Self {
            buf_reader: BufReader::with_capacity(PEEK_BUFFER_SIZE, r),
            dash_boundary: format!("--{}", boundary).into_bytes(),
            pending: None,
            parts_read: 0,
            finished: false,
        }
    }

    /// Returns the next part, or `None` after the closing delimiter.
    pub async fn next_part(&mut self) -> Result<Option<Part>> {
        if self.dash_boundary.len() == 2 {
            return Err(Error::Multipart("boundary is empty".to_string()));
        }
        if self.finished {
            return Ok(None);
        }

        loop {
            let line = self.read_line().await?;
            if line.is_empty() {
                return Err(Error::Io(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "unexpected EOF before closing boundary",
                )));
            }

            match self.delimiter(&line) {
                Some(Delimiter::Part) => {
                    self.parts_read += 1;
                    let header = read_mime_header(&mut self.buf_reader).await?;
                    let data = self.read_part_data().await?;
                    return Ok(Some(Part::new(header, data)));
                }
                Some(Delimiter::Final) => {
                    self.finished = true;
                    return Ok(None);
                }
                None if self.parts_read == 0 => continue, // preamble
                None => {
                    return Err(Error::Multipart(format!(
                        "unexpected line in next_part: {:?}",
                        String::from_utf8_lossy(&line)
                    )))
                }
            }
        }
    }

    async fn read_line(&mut self) -> Result<Vec<u8>> {
        if let Some(line) = self.pending.take() {
            return Ok(line);
        }
        let mut line = Vec::new();
        let limit = MAX_PART_SIZE as u64;
        let n = (&mut self.buf_reader)
            .take(limit)
            .read_until(b'\n', &mut line)
            .await?;
        if n as u64 == limit && !line.ends_with(b"\n") {
            return Err(Error::MessageTooLarge);
        }
        Ok(line)
    }

    /// Classifies a complete line as a delimiter, ignoring trailing LWSP.
    fn delimiter(&self, line: &[u8]) -> Option<Delimiter> {
        let rest = line.strip_prefix(self.dash_boundary.as_slice())?;
        let rest = rest.strip_suffix(b"\n").unwrap_or(rest);
        let rest = rest.strip_suffix(b"\r").unwrap_or(rest);

        match trim_lwsp_end(rest) {
            b"" => Some(Delimiter::Part),
            b"--" => Some(Delimiter::Final),
            _ => None,
        }
    }

    /// Reads a payload up to the next delimiter line, which is kept for
    /// `next_part`.
    async fn read_part_data(&mut self) -> Result<Vec<u8>> {
        let mut data = Vec::new();

        loop {
            // room for the rest of the part plus a closing delimiter line
            let limit = MAX_PART_SIZE - data.len() + self.dash_boundary.len() + 4;
            let mut line = Vec::new();
            let n = (&mut self.buf_reader)
                .take(limit as u64)
                .read_until(b'\n', &mut line)
                .await?;
            if n == 0 {
                return Err(Error::Io(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "unexpected EOF in part body",
                )));
            }

            if self.delimiter(&line).is_some() {
                self.pending = Some(line);
                // the line break before a delimiter belongs to the delimiter
                if data.ends_with(b"\r\n") {
                    data.truncate(data.len() - 2);
                } else if data.ends_with(b"\n") {
                    data.truncate(data.len() - 1);
                }
                return Ok(data);
            }

            data.extend_from_slice(&line);
            if data.len() > MAX_PART_SIZE {
                return Err(Error::MessageTooLarge);
            }
        }
    }
}

/// A single part of a multipart body.
#[derive(Debug)]
pub struct Part {
    /// The part headers, keyed by lowercase name.
    pub header: MimeHeader,
    data: Bytes,
    pos: usize,
    disposition: Option<(String, HashMap<String, String>)>,
}

impl Part {
    fn new(header: MimeHeader, data: Vec<u8>) -> Self {
        let disposition = header
            .get("content-disposition")
            .and_then(|values| values.first())
            .and_then(|v| parse_disposition(v).ok());

        Self {
            header,
            data: Bytes::from(data),
            pos: 0,
            disposition,
        }
    }

    /// The field name, if the part has `Content-Disposition: form-data`.
    pub fn form_name(&self) -> Option<&str> {
        match &self.disposition {
            Some((kind, params)) if kind == "form-data" => params.get("name").map(String::as_str),
            _ => None,
        }
    }

    /// The base name of the `filename` disposition parameter.
    pub fn file_name(&self) -> Option<&str> {
        let (_, params) = self.disposition.as_ref()?;
        let filename = params.get("filename")?;
        Some(
            filename
                .rsplit(|c: char| c == '/' || c == '\\')
                .next()
                .unwrap_or(filename),
        )
    }

    /// The media type from the part's `Content-Type` header, without parameters.
    pub fn content_type(&self) -> Option<String> {
        let value = self.header.get("content-type")?.first()?;
        parse_media_type(value).ok().map(|(media_type, _)| media_type)
    }

    /// The complete payload.
    pub fn bytes(&self) -> Bytes {
        self.data.clone()
    }
}

impl AsyncRead for Part {
    fn poll_read(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let remaining = &self.data[self.pos..];
        let to_read = remaining.len().min(buf.remaining());

        buf.put_slice(&remaining[..to_read]);
        self.pos += to_read;

        Poll::Ready(Ok(()))
    }
}

/// Reads part headers up to and including the blank line.
async fn read_mime_header<R: AsyncBufRead + Unpin>(reader: &mut R) -> Result<MimeHeader> {
    let mut header = HashMap::new();
    let mut total_size = 0;
    let mut header_count = 0;

    loop {
        let mut line = String::new();
        (&mut *reader)
            .take((MAX_MIME_HEADER_SIZE - total_size + 1) as u64)
            .read_line(&mut line)
            .await?;

        total_size += line.len();
        if total_size > MAX_MIME_HEADER_SIZE {
            return Err(Error::MessageTooLarge);
        }

        if line.is_empty() {
            return Err(Error::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "unexpected EOF in part headers",
            )));
        }
        if line == "\r\n" || line == "\n" {
            break;
        }

        header_count += 1;
        if header_count > MAX_MIME_HEADERS {
            return Err(Error::MessageTooLarge);
        }

        match parse_header_line(&line) {
            Some((key, value)) => header
                .entry(key.to_ascii_lowercase())
                .or_insert_with(Vec::new)
                .push(value.to_string()),
            None => {
                return Err(Error::Multipart(format!(
                    "malformed header line: {:?}",
                    line.trim_end()
                )))
            }
        }
    }

    Ok(header)
}

/// Splits `Name: value` into its trimmed halves.
fn parse_header_line(line: &str) -> Option<(&str, &str)> {
    let line = line.trim_end_matches(['\r', '\n']);
    let (key, value) = line.split_once(':')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    Some((key, value.trim()))
}

fn trim_lwsp_end(mut b: &[u8]) -> &[u8] {
    while let [rest @ .., b' ' | b'\t'] = b {
        b = rest;
    }
    b
}
