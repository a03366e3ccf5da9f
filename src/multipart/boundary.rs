//! Multipart boundary generation and validation.

use crate::error::{Error, Result};
use rand::seq::SliceRandom;
use std::fmt;

/// Characters a generated boundary is drawn from.
const ALPHABET: &[u8; 62] = b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Number of random characters in a generated boundary.
const RANDOM_LEN: usize = 12;

/// Length of the dash run a generated boundary starts with.
const DASH_RUN: usize = 30;

/// Longest boundary parameter RFC 2046 allows.
const MAX_PARAMETER_LEN: usize = 70;

/// The delimiter separating parts of a multipart body.
///
/// A boundary has two renderings:
/// - the token, written at the start of every delimiter line in the body
/// - the parameter, carried by the `Content-Type` header, which is the token
///   without its two leading dashes
#[derive(Clone, PartialEq, Eq)]
pub struct Boundary {
    token: String,
}

impl Boundary {
    /// Generates a fresh random boundary.
    ///
    /// The token is a run of 30 dashes followed by 12 characters taken from a
    /// shuffled alphanumeric alphabet, so no character repeats.
    pub fn generate() -> Self {
        let mut alphabet = *ALPHABET;
        alphabet.shuffle(&mut rand::thread_rng());

        let mut token = "-".repeat(DASH_RUN);
        token.extend(alphabet[..RANDOM_LEN].iter().map(|&b| b as char));

        Self { token }
    }

    /// Creates a boundary from a `Content-Type` boundary parameter.
    ///
    /// The parameter must be 1-70 characters from the RFC 2046 `bchars` set
    /// and must not end with a space.
    ///
    /// # Examples
    ///
    /// ```
    /// use tokio_formdata::Boundary;
    ///
    /// let boundary = Boundary::new("simple-boundary").unwrap();
    /// assert_eq!(boundary.token(), "--simple-boundary");
    /// assert_eq!(boundary.parameter(), "simple-boundary");
    ///
    /// assert!(Boundary::new("").is_err());
    /// assert!(Boundary::new("no\"quotes").is_err());
    /// ```
    pub fn new(parameter: impl Into<String>) -> Result<Self> {
        let parameter = parameter.into();

        if parameter.is_empty() || parameter.len() > MAX_PARAMETER_LEN {
            return Err(Error::Multipart("invalid boundary length".to_string()));
        }

        if parameter.ends_with(' ') {
            return Err(Error::Multipart(
                "boundary must not end with a space".to_string(),
            ));
        }

        if let Some(ch) = parameter.chars().find(|&ch| !is_bchar(ch)) {
            return Err(Error::Multipart(format!(
                "invalid boundary character: {:?}",
                ch
            )));
        }

        Ok(Self {
            token: format!("--{}", parameter),
        })
    }

    /// The token written at the start of each delimiter line in the body.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// The value of the `boundary` parameter in the `Content-Type` header.
    pub fn parameter(&self) -> &str {
        &self.token[2..]
    }
}

impl Default for Boundary {
    fn default() -> Self {
        Self::generate()
    }
}

impl fmt::Display for Boundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.token)
    }
}

impl fmt::Debug for Boundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Boundary").field(&self.token).finish()
    }
}

/// RFC 2046 `bchars`.
fn is_bchar(ch: char) -> bool {
    ch.is_ascii_alphanumeric()
        || matches!(
            ch,
            '\'' | '(' | ')' | '+' | '_' | ',' | '-' | '.' | '/' | ':' | '=' | '?' | ' '
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generated_shape() {
        let boundary = Boundary::generate();
        let token = boundary.token();

        assert_eq!(token.len(), DASH_RUN + RANDOM_LEN);
        assert!(token[..DASH_RUN].bytes().all(|b| b == b'-'));

        let random = &token[DASH_RUN..];
        assert!(random.bytes().all(|b| b.is_ascii_alphanumeric()));

        // drawn from a permutation, so no character repeats
        let unique: HashSet<u8> = random.bytes().collect();
        assert_eq!(unique.len(), RANDOM_LEN);
    }

    #[test]
    fn test_parameter_strips_two_dashes() {
        let boundary = Boundary::generate();
        assert_eq!(format!("--{}", boundary.parameter()), boundary.token());
        assert_eq!(boundary.parameter().len(), DASH_RUN + RANDOM_LEN - 2);
    }

    #[test]
    fn test_generated_boundaries_differ() {
        let seen: HashSet<String> = (0..64)
            .map(|_| Boundary::generate().token().to_string())
            .collect();
        assert_eq!(seen.len(), 64);
    }

    #[test]
    fn test_generated_parameter_is_valid() {
        let generated = Boundary::generate();
        let rebuilt = Boundary::new(generated.parameter()).unwrap();
        assert_eq!(rebuilt, generated);
    }

    #[test]
    fn test_boundary_validation() {
        assert!(Boundary::new("simple-boundary").is_ok());
        assert!(Boundary::new("with inner space").is_ok());

        assert!(Boundary::new(String::new()).is_err());
        assert!(Boundary::new("a".repeat(71)).is_err());
        assert!(Boundary::new("trailing ").is_err());
        assert!(Boundary::new("semi;colon").is_err());
    }
}
