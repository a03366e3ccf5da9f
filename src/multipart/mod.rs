//! Multipart form building and parsing.

pub mod boundary;
mod buffer;
pub mod fields;
pub mod formdata;
pub mod reader;

pub use boundary::Boundary;
pub use fields::{is_file_field, FieldSet, FieldValue};
pub use formdata::FormData;
pub use reader::{Part, Reader};
