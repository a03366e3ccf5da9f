//! Multipart form body construction.

use crate::error::{Error, Result};
use crate::media_type::quote;
use crate::multipart::boundary::Boundary;
use crate::multipart::buffer::BodyBuffer;
use crate::multipart::fields::{Field, FieldSet};
use crate::sniff::sniff;
use bytes::Bytes;
use std::ffi::OsStr;
use std::fs;
use std::path::Path;
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// A fully built `multipart/form-data` body and its `Content-Type` header value.
///
/// The body is materialized in memory and immutable once built.
#[derive(Debug, Clone)]
pub struct FormData {
    boundary: Boundary,
    content_type: String,
    body: Bytes,
}

impl FormData {
    /// Builds a form body from `fields` using a freshly generated boundary.
    ///
    /// Each path under a `file`/`files` field becomes its own part carrying the
    /// file's base name and sniffed content type. Every other field becomes a
    /// part holding its text.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidInput`] if a reserved field does not hold file paths,
    ///   a file list is bound to any other name, a field name or file base
    ///   name contains CR, LF or NUL, or a file base name is not valid UTF-8.
    ///   Nothing is read from disk.
    /// - [`Error::FileRead`] if a listed file cannot be opened or read.
    ///
    /// # Examples
    ///
    /// ```
    /// use tokio_formdata::{FieldSet, FormData};
    ///
    /// let mut fields = FieldSet::new();
    /// fields.insert("username", "john_doe");
    /// fields.insert("remember", true);
    ///
    /// let form = FormData::new(fields).unwrap();
    /// assert!(form.content_type().starts_with("multipart/form-data; boundary="));
    ///
    /// let body = String::from_utf8(form.body().to_vec()).unwrap();
    /// assert!(body.contains("form-data; name=\"username\"\r\n\r\njohn_doe\r\n"));
    /// assert!(body.contains("name=\"remember\"\r\n\r\ntrue\r\n"));
    /// ```
    pub fn new(fields: FieldSet) -> Result<Self> {
        Self::with_boundary(fields, Boundary::generate())
    }

    /// Builds a form body using the given boundary.
    pub fn with_boundary(fields: FieldSet, boundary: Boundary) -> Result<Self> {
        let classified = fields.classify()?;

        let mut buf = BodyBuffer::with_capacity(512);
        for field in &classified {
            match field {
                Field::File { name, paths } => {
                    for path in paths.iter() {
                        write_file_part(&mut buf, &boundary, name, path)?;
                    }
                }
                Field::Scalar { name, text } => {
                    log::debug!("adding field {:?} ({} bytes)", name, text.len());
                    buf.put_line(boundary.token());
                    buf.put_line(&format!("Content-Disposition: form-data; name={}", quote(name)));
                    buf.put_crlf();
                    buf.put_text(text);
                    buf.put_crlf();
                }
            }
        }

        buf.put_text(boundary.token());
        buf.put_line("--");

        log::debug!(
            "built multipart body: {} fields, {} bytes",
            classified.len(),
            buf.len()
        );

        let content_type = format!("multipart/form-data; boundary={}", boundary.parameter());
        Ok(Self {
            boundary,
            content_type,
            body: buf.freeze(),
        })
    }

    /// The boundary separating the parts of this body.
    pub fn boundary(&self) -> &Boundary {
        &self.boundary
    }

    /// The `Content-Type` header value, `multipart/form-data; boundary=...`.
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// The serialized body, ready to send as-is.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// The body length in bytes, for a `Content-Length` header.
    pub fn content_length(&self) -> usize {
        self.body.len()
    }

    /// Consumes the form, returning the `Content-Type` value and the body.
    pub fn into_parts(self) -> (String, Bytes) {
        (self.content_type, self.body)
    }

    /// Writes the body verbatim to `writer` and flushes it.
    ///
    /// # Examples
    ///
    /// ```
    /// use tokio_formdata::{FieldSet, FormData};
    ///
    /// # #[tokio::main]
    /// # async fn main() -> tokio_formdata::Result<()> {
    /// let form = FormData::new([("q", "rust")].into_iter().collect::<FieldSet>())?;
    ///
    /// let mut sent = Vec::new();
    /// form.write_to(&mut sent).await?;
    /// assert_eq!(&sent[..], &form.body()[..]);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn write_to<W: AsyncWrite + Unpin>(&self, mut writer: W) -> Result<()> {
        writer.write_all(&self.body).await?;
        writer.flush().await?;
        Ok(())
    }
}

/// Appends one file part. The file is read in full before anything is written.
///
/// The base name has already been checked to be UTF-8 without line breaks.
fn write_file_part(
    buf: &mut BodyBuffer,
    boundary: &Boundary,
    name: &str,
    path: &Path,
) -> Result<()> {
    let contents = fs::read(path).map_err(|e| Error::file_read(path, e))?;

    let filename = path
        .file_name()
        .and_then(OsStr::to_str)
        .ok_or_else(|| {
            Error::file_read(
                path,
                std::io::Error::new(std::io::ErrorKind::InvalidInput, "path has no file name"),
            )
        })?;
    let content_type = sniff(path);

    log::debug!(
        "adding file {:?} to field {:?} as {} ({} bytes)",
        filename,
        name,
        content_type,
        contents.len()
    );

    buf.put_line(boundary.token());
    buf.put_line(&format!(
        "Content-Disposition: form-data; name={}; filename={}",
        quote(name),
        quote(filename)
    ));
    buf.put_line(&format!("Content-Type: {}", content_type));
    buf.put_crlf();
    buf.put_bytes(&contents);
    buf.put_crlf();

    Ok(())
}
