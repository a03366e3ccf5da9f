//! Form fields.
//!
//! A [`FieldSet`] is an ordered mapping from field name to [`FieldValue`].
//! Fields named `file` or `files` (any case) are reserved for file paths;
//! every other field holds a scalar.

use crate::error::{Error, Result};
use serde_json::Value;
use std::borrow::Cow;
use std::path::{Path, PathBuf};

/// The value of a single form field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Text written verbatim as the part body.
    Text(String),
    /// A boolean, written as `true` or `false`.
    Bool(bool),
    /// Paths of files to upload, one part per path.
    Files(Vec<PathBuf>),
}

impl FieldValue {
    /// Creates a file list value.
    pub fn files<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        FieldValue::Files(paths.into_iter().map(Into::into).collect())
    }

    fn kind(&self) -> &'static str {
        match self {
            FieldValue::Text(_) => "text",
            FieldValue::Bool(_) => "boolean",
            FieldValue::Files(_) => "file list",
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

macro_rules! text_from_display {
    ($($t:ty),*) => {
        $(
            impl From<$t> for FieldValue {
                fn from(value: $t) -> Self {
                    FieldValue::Text(value.to_string())
                }
            }
        )*
    };
}

text_from_display!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

/// Reports whether `name` is reserved for file paths.
pub fn is_file_field(name: &str) -> bool {
    name.eq_ignore_ascii_case("file") || name.eq_ignore_ascii_case("files")
}

/// An ordered mapping of field names to values.
///
/// Iteration follows insertion order, which is also the order parts appear
/// in the built body.
///
/// # Examples
///
/// ```
/// use tokio_formdata::{FieldSet, FieldValue};
///
/// let mut fields = FieldSet::new();
/// fields.insert("name", "report");
/// fields.insert("draft", false);
/// fields.files("files", ["a.png", "b.pdf"]);
///
/// let names: Vec<&str> = fields.iter().map(|(name, _)| name).collect();
/// assert_eq!(names, ["name", "draft", "files"]);
/// assert_eq!(fields.get("draft"), Some(&FieldValue::Bool(false)));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldSet {
    fields: Vec<(String, FieldValue)>,
}

impl FieldSet {
    /// Creates an empty field set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `name` to `value`.
    ///
    /// An existing field keeps its position and its previous value is returned.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        value: impl Into<FieldValue>,
    ) -> Option<FieldValue> {
        let name = name.into();
        let value = value.into();

        match self.fields.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.fields.push((name, value));
                None
            }
        }
    }

    /// Sets `name` to a list of file paths.
    pub fn files<I, P>(&mut self, name: impl Into<String>, paths: I) -> Option<FieldValue>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.insert(name, FieldValue::files(paths))
    }

    /// Returns the value of `name`.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value)
    }

    /// Iterates fields in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Splits the set into file and scalar fields, checking the reserved names.
    ///
    /// Runs before any file is touched, so malformed input never causes I/O.
    /// Field names and file base names end up inside a quoted header
    /// parameter, so line breaks and NUL are rejected in both, as are file
    /// names that are not valid UTF-8.
    pub(crate) fn classify(&self) -> Result<Vec<Field<'_>>> {
        self.fields
            .iter()
            .map(|(name, value)| {
                check_header_text("field name", name)?;
                match (is_file_field(name), value) {
                    (true, FieldValue::Files(paths)) => {
                        paths.iter().try_for_each(|path| check_file_name(path))?;
                        Ok(Field::File { name, paths })
                    }
                    (true, other) => Err(Error::InvalidInput(format!(
                        "field {:?} is reserved for file paths but holds a {}",
                        name,
                        other.kind()
                    ))),
                    (false, FieldValue::Files(_)) => Err(Error::InvalidInput(format!(
                        "field {:?} holds a file list; only \"file\" or \"files\" may",
                        name
                    ))),
                    (false, FieldValue::Text(text)) => Ok(Field::Scalar {
                        name,
                        text: Cow::Borrowed(text),
                    }),
                    (false, FieldValue::Bool(flag)) => Ok(Field::Scalar {
                        name,
                        text: Cow::Borrowed(if *flag { "true" } else { "false" }),
                    }),
                }
            })
            .collect()
    }
}

fn check_header_text(what: &str, text: &str) -> Result<()> {
    if text.contains(['\r', '\n', '\0']) {
        return Err(Error::InvalidInput(format!(
            "{} {:?} contains a line break or NUL",
            what, text
        )));
    }
    Ok(())
}

/// Paths without a final component are left for the build to report.
fn check_file_name(path: &Path) -> Result<()> {
    match path.file_name() {
        Some(os_name) => match os_name.to_str() {
            Some(name) => check_header_text("file name", name),
            None => Err(Error::InvalidInput(format!(
                "file name of {} is not valid UTF-8",
                path.display()
            ))),
        },
        None => Ok(()),
    }
}

impl<K, V> FromIterator<(K, V)> for FieldSet
where
    K: Into<String>,
    V: Into<FieldValue>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut fields = FieldSet::new();
        for (name, value) in iter {
            fields.insert(name, value);
        }
        fields
    }
}

/// Builds a field set from a JSON object, keeping document order.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use tokio_formdata::{Error, FieldSet};
///
/// let fields = FieldSet::try_from(json!({"title": "x", "count": 3, "files": ["a.txt"]})).unwrap();
/// assert_eq!(fields.len(), 3);
///
/// assert!(matches!(FieldSet::try_from(json!(["not", "a", "map"])), Err(Error::InvalidInput(_))));
/// ```
impl TryFrom<Value> for FieldSet {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        let object = match value {
            Value::Object(object) => object,
            other => {
                return Err(Error::InvalidInput(format!(
                    "form fields must be a key-value mapping, got {}",
                    json_kind(&other)
                )))
            }
        };

        let mut fields = FieldSet::new();
        for (name, value) in object {
            let value = match value {
                Value::String(text) => FieldValue::Text(text),
                Value::Number(number) => FieldValue::Text(number.to_string()),
                Value::Bool(flag) => FieldValue::Bool(flag),
                Value::Array(items) => {
                    let paths = items
                        .into_iter()
                        .map(|item| match item {
                            Value::String(path) => Ok(PathBuf::from(path)),
                            other => Err(Error::InvalidInput(format!(
                                "field {:?} must list file paths as strings, got {}",
                                name,
                                json_kind(&other)
                            ))),
                        })
                        .collect::<Result<Vec<_>>>()?;
                    FieldValue::Files(paths)
                }
                other => {
                    return Err(Error::InvalidInput(format!(
                        "field {:?} holds an unsupported {} value",
                        name,
                        json_kind(&other)
                    )))
                }
            };
            fields.insert(name, value);
        }

        Ok(fields)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// A field after reserved-name classification.
#[derive(Debug)]
pub(crate) enum Field<'a> {
    File {
        name: &'a str,
        paths: &'a [PathBuf],
    },
    Scalar {
        name: &'a str,
        text: Cow<'a, str>,
    },
}
