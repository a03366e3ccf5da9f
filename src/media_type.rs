//! Header value grammar for multipart parts.
//!
//! Token rules follow RFC 2045. Parameters are parsed with quoted-string
//! support so that escaped field and file names survive a round trip
//! through [`quote`].

use crate::error::{Error, Result};
use std::collections::HashMap;

/// Reports whether the character is in 'tspecials' as defined by RFC 2045.
pub fn is_tspecial(c: char) -> bool {
    matches!(
        c,
        '(' | ')' | '<' | '>' | '@' | ',' | ';' | ':' | '\\' | '"' | '/' | '[' | ']' | '?' | '='
    )
}

/// Reports whether the character may appear in an RFC 2045 'token'.
pub fn is_token_char(c: char) -> bool {
    c > '\x20' && c < '\x7f' && !is_tspecial(c)
}

/// Reports whether the string is a non-empty RFC 2045 'token'.
pub fn is_token(s: &str) -> bool {
    !s.is_empty() && s.chars().all(is_token_char)
}

/// Wraps a header parameter value in a quoted-string.
///
/// Backslashes and double quotes are escaped with a backslash.
///
/// CR, LF and NUL are copied through unchanged; callers keep them out of `s`.
///
/// # Examples
///
/// ```
/// use tokio_formdata::media_type::quote;
///
/// assert_eq!(quote("report.pdf"), "\"report.pdf\"");
/// assert_eq!(quote("say \"hi\""), "\"say \\\"hi\\\"\"");
/// ```
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for ch in s.chars() {
        if ch == '"' || ch == '\\' {
            out.push('\\');
        }
        out.push(ch);
    }
    out.push('"');
    out
}

/// Parses a Content-Type value into its lowercase `type/subtype` and parameters.
///
/// # Examples
///
/// ```
/// use tokio_formdata::media_type::parse_media_type;
///
/// let (media_type, params) = parse_media_type("multipart/form-data; boundary=abc").unwrap();
/// assert_eq!(media_type, "multipart/form-data");
/// assert_eq!(params.get("boundary"), Some(&"abc".to_string()));
/// ```
pub fn parse_media_type(v: &str) -> Result<(String, HashMap<String, String>)> {
    let (base, rest) = v.split_once(';').unwrap_or((v, ""));
    let media_type = base.trim().to_ascii_lowercase();

    match media_type.split_once('/') {
        Some((major, sub)) if is_token(major) && is_token(sub) => {}
        Some(_) => return Err(Error::MediaType("invalid media type format".to_string())),
        None => return Err(Error::MediaType("no media type".to_string())),
    }

    Ok((media_type, parse_params(rest)?))
}

/// Parses a Content-Disposition value (RFC 2183) into its lowercase type and parameters.
///
/// # Examples
///
/// ```
/// use tokio_formdata::media_type::parse_disposition;
///
/// let (kind, params) = parse_disposition(r#"form-data; name="a;b"; filename="x.png""#).unwrap();
/// assert_eq!(kind, "form-data");
/// assert_eq!(params["name"], "a;b");
/// assert_eq!(params["filename"], "x.png");
/// ```
pub fn parse_disposition(v: &str) -> Result<(String, HashMap<String, String>)> {
    let (base, rest) = v.split_once(';').unwrap_or((v, ""));
    let disposition = base.trim().to_ascii_lowercase();

    if !is_token(&disposition) {
        return Err(Error::MediaType(format!(
            "invalid disposition type {:?}",
            disposition
        )));
    }

    Ok((disposition, parse_params(rest)?))
}

/// Parses `; key=value` pairs. Keys are lowercased; quoted values are unescaped.
fn parse_params(mut rest: &str) -> Result<HashMap<String, String>> {
    let mut params = HashMap::new();

    loop {
        rest = rest.trim_start_matches(|c: char| c == ';' || c.is_ascii_whitespace());
        if rest.is_empty() {
            return Ok(params);
        }

        let eq = rest
            .find('=')
            .ok_or_else(|| Error::MediaType(format!("parameter without value: {:?}", rest)))?;
        let key = rest[..eq].trim().to_ascii_lowercase();
        if !is_token(&key) {
            return Err(Error::MediaType(format!("invalid parameter name {:?}", key)));
        }
        rest = rest[eq + 1..].trim_start();

        let value = if let Some(quoted) = rest.strip_prefix('"') {
            let (value, consumed) = consume_quoted(quoted)?;
            rest = &quoted[consumed..];
            value
        } else {
            let end = rest.find(';').unwrap_or(rest.len());
            let value = rest[..end].trim().to_string();
            rest = &rest[end..];
            value
        };

        if params.insert(key.clone(), value).is_some() {
            return Err(Error::MediaType(format!("duplicate parameter {:?}", key)));
        }
    }
}

/// Reads a quoted-string body (opening quote already stripped).
///
/// Returns the unescaped value and the number of bytes consumed including the
/// closing quote.
fn consume_quoted(s: &str) -> Result<(String, usize)> {
    let mut value = String::new();
    let mut escaped = false;

    for (i, ch) in s.char_indices() {
        if escaped {
            value.push(ch);
            escaped = false;
        } else if ch == '\\' {
            escaped = true;
        } else if ch == '"' {
            return Ok((value, i + 1));
        } else {
            value.push(ch);
        }
    }

    Err(Error::MediaType("unterminated quoted string".to_string()))
}
