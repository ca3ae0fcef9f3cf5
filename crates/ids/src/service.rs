//! Internal implementation of identifier services.

use crate::{IdError, IdResult};
use base64::{engine::general_purpose, Engine as _};
use rand::{rngs::OsRng, RngCore};
use std::{fmt, str::FromStr};

/// Identifier length used for users and appointments.
pub const DEFAULT_ID_LENGTH: usize = 16;

/// Longest identifier a single 16-byte draw can produce (unpadded base64 of 16 bytes).
pub const MAX_ID_LENGTH: usize = 22;

const RANDOM_BYTES: usize = 16;

/// Upper bound for identifiers accepted from outside (seed files, API paths).
const MAX_PARSE_LENGTH: usize = 64;

/// A record identifier made of URL-safe base64 characters.
///
/// Generated identifiers have the configured fixed length. Identifiers parsed from
/// external input only need to be non-empty, at most 64 characters, and drawn from the
/// URL-safe alphabet, so seed data can use readable ids such as `dr-grey`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "String", into = "String")
)]
pub struct ShortId(String);

impl ShortId {
    /// Validates an externally supplied identifier.
    ///
    /// # Errors
    ///
    /// Returns [`IdError::InvalidInput`] if `input` is empty, longer than 64 characters,
    /// or contains characters outside `A-Z a-z 0-9 - _`.
    pub fn parse(input: &str) -> IdResult<Self> {
        if Self::is_well_formed(input) {
            return Ok(Self(input.to_owned()));
        }
        Err(IdError::InvalidInput(format!(
            "identifier must be 1-{MAX_PARSE_LENGTH} URL-safe characters, got: '{input}'"
        )))
    }

    /// Returns true if `input` could be a record identifier.
    pub fn is_well_formed(input: &str) -> bool {
        !input.is_empty()
            && input.len() <= MAX_PARSE_LENGTH
            && input
                .bytes()
                .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'z' | b'A'..=b'Z' | b'-' | b'_'))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ShortId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ShortId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for ShortId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ShortId::parse(s)
    }
}

impl TryFrom<String> for ShortId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if Self::is_well_formed(&value) {
            Ok(Self(value))
        } else {
            Self::parse(&value)
        }
    }
}

impl From<ShortId> for String {
    fn from(id: ShortId) -> Self {
        id.0
    }
}

/// Stateless generator for fixed-length random identifiers.
///
/// The generator only carries its settings; the caller supplies the existence check used
/// for collision testing on every call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IdService {
    length: usize,
    max_attempts: u32,
}

impl IdService {
    /// Creates a generator for identifiers of `length` characters that gives up after
    /// `max_attempts` colliding candidates.
    ///
    /// # Errors
    ///
    /// Returns [`IdError::InvalidInput`] if `length` is zero or above [`MAX_ID_LENGTH`], or if
    /// `max_attempts` is zero.
    pub fn new(length: usize, max_attempts: u32) -> IdResult<Self> {
        if length == 0 || length > MAX_ID_LENGTH {
            return Err(IdError::InvalidInput(format!(
                "identifier length must be between 1 and {MAX_ID_LENGTH}, got {length}"
            )));
        }
        if max_attempts == 0 {
            return Err(IdError::InvalidInput(
                "max_attempts must be at least 1".into(),
            ));
        }
        Ok(Self {
            length,
            max_attempts,
        })
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Draws one candidate identifier without any collision check.
    pub fn generate(&self) -> ShortId {
        let mut bytes = [0u8; RANDOM_BYTES];
        OsRng.fill_bytes(&mut bytes);
        let mut encoded = general_purpose::URL_SAFE_NO_PAD.encode(bytes);
        encoded.truncate(self.length);
        ShortId(encoded)
    }

    /// Draws candidates until `exists` reports one as free.
    ///
    /// # Errors
    ///
    /// Returns [`IdError::Exhausted`] when `max_attempts` consecutive candidates collide.
    pub fn generate_unique(&self, mut exists: impl FnMut(&str) -> bool) -> IdResult<ShortId> {
        for _ in 0..self.max_attempts {
            let candidate = self.generate();
            if !exists(candidate.as_str()) {
                return Ok(candidate);
            }
        }
        Err(IdError::Exhausted {
            attempts: self.max_attempts,
        })
    }
}

impl Default for IdService {
    fn default() -> Self {
        Self {
            length: DEFAULT_ID_LENGTH,
            max_attempts: 32,
        }
    }
}
