//! MIME type lookup by file extension.
//!
//! This is the last resort of the sniffer, consulted once the signature
//! table and the text heuristic have both failed. Extensions are matched
//! case-insensitively and always carry a leading dot, as in ".html".
//! Mappings can be added or overridden at runtime with [`add_extension_type`].

use crate::error::{Error, Result};
use crate::media_type::parse_media_type;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// Built-in MIME type mappings (all lowercase extensions).
static BUILTIN_TYPES: &[(&str, &str)] = &[
    (".7z", "application/x-7z-compressed"),
    (".aac", "audio/aac"),
    (".avi", "video/x-msvideo"),
    (".avif", "image/avif"),
    (".bin", "application/octet-stream"),
    (".bmp", "image/bmp"),
    (".bz2", "application/x-bzip2"),
    (".css", "text/css"),
    (".csv", "text/csv"),
    (".doc", "application/msword"),
    (".docx", "application/vnd.openxmlformats-officedocument.wordprocessingml.document"),
    (".eot", "application/vnd.ms-fontobject"),
    (".epub", "application/epub+zip"),
    (".flac", "audio/flac"),
    (".gif", "image/gif"),
    (".gz", "application/gzip"),
    (".htm", "text/html"),
    (".html", "text/html"),
    (".ico", "image/vnd.microsoft.icon"),
    (".ics", "text/calendar"),
    (".jar", "application/java-archive"),
    (".jpeg", "image/jpeg"),
    (".jpg", "image/jpeg"),
    (".js", "text/javascript"),
    (".json", "application/json"),
    (".jsonld", "application/ld+json"),
    (".log", "text/plain"),
    (".m4a", "audio/mp4"),
    (".md", "text/markdown"),
    (".mid", "audio/midi"),
    (".midi", "audio/midi"),
    (".mjs", "text/javascript"),
    (".mkv", "video/x-matroska"),
    (".mov", "video/quicktime"),
    (".mp3", "audio/mpeg"),
    (".mp4", "video/mp4"),
    (".mpeg", "video/mpeg"),
    (".odp", "application/vnd.oasis.opendocument.presentation"),
    (".ods", "application/vnd.oasis.opendocument.spreadsheet"),
    (".odt", "application/vnd.oasis.opendocument.text"),
    (".oga", "audio/ogg"),
    (".ogg", "audio/ogg"),
    (".ogv", "video/ogg"),
    (".opus", "audio/opus"),
    (".otf", "font/otf"),
    (".pdf", "application/pdf"),
    (".png", "image/png"),
    (".ppt", "application/vnd.ms-powerpoint"),
    (".pptx", "application/vnd.openxmlformats-officedocument.presentationml.presentation"),
    (".rar", "application/vnd.rar"),
    (".rtf", "application/rtf"),
    (".sh", "application/x-sh"),
    (".svg", "image/svg+xml"),
    (".tar", "application/x-tar"),
    (".tif", "image/tiff"),
    (".tiff", "image/tiff"),
    (".ts", "video/mp2t"),
    (".ttf", "font/ttf"),
    (".txt", "text/plain"),
    (".wasm", "application/wasm"),
    (".wav", "audio/wav"),
    (".weba", "audio/webm"),
    (".webm", "video/webm"),
    (".webp", "image/webp"),
    (".woff", "font/woff"),
    (".woff2", "font/woff2"),
    (".xhtml", "application/xhtml+xml"),
    (".xls", "application/vnd.ms-excel"),
    (".xlsx", "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"),
    (".xml", "application/xml"),
    (".xz", "application/x-xz"),
    (".yaml", "application/yaml"),
    (".yml", "application/yaml"),
    (".zip", "application/zip"),
    (".zst", "application/zstd"),
];

/// Forward and reverse extension mappings.
#[derive(Default)]
struct Registry {
    /// ".jpg" => "image/jpeg"
    types: HashMap<String, String>,
    /// "image/jpeg" => [".jpg", ".jpeg"]
    extensions: HashMap<String, Vec<String>>,
}

impl Registry {
    fn builtin() -> Self {
        let mut registry = Registry::default();
        for (ext, mime) in BUILTIN_TYPES {
            registry.insert(ext.to_string(), mime.to_string(), mime.to_string());
        }
        registry
    }

    fn insert(&mut self, ext_lower: String, mime: String, just_type: String) {
        if let Some(previous) = self.types.insert(ext_lower.clone(), mime) {
            if let Ok((old_type, _)) = parse_media_type(&previous) {
                if let Some(exts) = self.extensions.get_mut(&old_type) {
                    exts.retain(|e| *e != ext_lower);
                }
            }
        }

        let exts = self.extensions.entry(just_type).or_default();
        if !exts.contains(&ext_lower) {
            exts.push(ext_lower);
        }
    }
}

static REGISTRY: Lazy<RwLock<Registry>> = Lazy::new(|| RwLock::new(Registry::builtin()));

/// Returns the MIME type associated with the file extension `ext`.
///
/// The extension should begin with a leading dot, as in ".html", and is
/// matched case-insensitively. When `ext` has no associated type, returns None.
///
/// # Examples
///
/// ```
/// use tokio_formdata::type_by_extension;
///
/// assert_eq!(type_by_extension(".html"), Some("text/html".to_string()));
/// assert_eq!(type_by_extension(".JPG"), Some("image/jpeg".to_string()));
/// assert_eq!(type_by_extension(".unknown"), None);
/// ```
pub fn type_by_extension(ext: &str) -> Option<String> {
    let lower = ext.to_lowercase();
    let registry = REGISTRY.read().unwrap_or_else(PoisonError::into_inner);
    registry.types.get(&lower).cloned()
}

/// Returns the extensions known to be associated with the MIME type `mime_type`.
///
/// Parameters on `mime_type` are ignored. The result is sorted and each
/// extension begins with a leading dot.
///
/// # Examples
///
/// ```
/// use tokio_formdata::extensions_by_type;
///
/// let exts = extensions_by_type("image/jpeg").unwrap();
/// assert_eq!(exts, [".jpeg", ".jpg"]);
/// ```
pub fn extensions_by_type(mime_type: &str) -> Result<Vec<String>> {
    let (just_type, _) = parse_media_type(mime_type)?;

    let registry = REGISTRY.read().unwrap_or_else(PoisonError::into_inner);
    let mut exts = registry
        .extensions
        .get(&just_type)
        .cloned()
        .unwrap_or_default();
    exts.sort();
    Ok(exts)
}

/// Sets the MIME type associated with the extension `ext` to `mime_type`.
///
/// The extension must begin with a leading dot. Existing mappings,
/// built-in ones included, are replaced.
///
/// # Examples
///
/// ```
/// use tokio_formdata::{add_extension_type, type_by_extension};
///
/// add_extension_type(".foo", "application/x-foo").unwrap();
/// assert_eq!(type_by_extension(".FOO"), Some("application/x-foo".to_string()));
///
/// assert!(add_extension_type("foo", "application/x-foo").is_err());
/// ```
pub fn add_extension_type(ext: &str, mime_type: &str) -> Result<()> {
    if !ext.starts_with('.') || ext.len() < 2 {
        return Err(Error::MediaType(format!(
            "extension {:?} missing leading dot",
            ext
        )));
    }

    let (just_type, _) = parse_media_type(mime_type)?;

    let mut registry = REGISTRY.write().unwrap_or_else(PoisonError::into_inner);
    registry.insert(ext.to_lowercase(), mime_type.trim().to_string(), just_type);
    Ok(())
}
