//! `multipart/form-data` body construction with content type sniffing.
//!
//! This crate provides:
//! - An ordered field model ([`FieldSet`]) with reserved `file`/`files` fields
//! - Multipart body construction into a single in-memory body ([`FormData`])
//! - Content type detection by binary signature, text heuristic and
//!   file extension ([`sniff`])
//! - A multipart reader for parsing bodies back into parts
//!
//! Body construction and sniffing use blocking file reads. Handing the
//! finished body to an async transport and reading multipart input are
//! async using tokio.
//!
//! # Examples
//!
//! ```no_run
//! use tokio_formdata::{FieldSet, FormData};
//!
//! # fn example() -> tokio_formdata::Result<()> {
//! let mut fields = FieldSet::new();
//! fields.insert("title", "holiday");
//! fields.insert("public", true);
//! fields.files("files", ["photos/beach.png", "photos/notes.txt"]);
//!
//! let form = FormData::new(fields)?;
//! println!("Content-Type: {}", form.content_type());
//! println!("{} bytes", form.content_length());
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod media_type;
pub mod multipart;
pub mod sniff;

// Re-export commonly used types
pub use error::{Error, Result};
pub use multipart::{Boundary, FieldSet, FieldValue, FormData};
pub use sniff::{add_extension_type, extensions_by_type, sniff, type_by_extension};
