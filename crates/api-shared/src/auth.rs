//! Request authentication helpers shared by the API surfaces.

/// Header carrying the deployment API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Header naming the user on whose behalf the request is made.
pub const USER_ID_HEADER: &str = "x-user-id";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Missing API key")]
    MissingApiKey,
    #[error("Invalid API key")]
    InvalidApiKey,
    #[error("Missing x-user-id header")]
    MissingUser,
    #[error("Unknown user: {0}")]
    UnknownUser(String),
}

/// Validates the provided API key against the key configured at startup.
///
/// Returns `Ok(())` if the key matches, or an error if it is missing or wrong.
pub fn validate_api_key(expected: &str, provided: Option<&str>) -> Result<(), AuthError> {
    match provided {
        None => Err(AuthError::MissingApiKey),
        Some(key) if keys_match(expected.as_bytes(), key.as_bytes()) => Ok(()),
        Some(_) => Err(AuthError::InvalidApiKey),
    }
}

/// Byte comparison whose running time depends only on the lengths, not on where the
/// first difference is.
fn keys_match(expected: &[u8], provided: &[u8]) -> bool {
    let diff = expected
        .iter()
        .zip(provided)
        .fold(expected.len() ^ provided.len(), |acc, (a, b)| {
            acc | usize::from(a ^ b)
        });
    diff == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_key_must_match() {
        assert_eq!(validate_api_key("secret", Some("secret")), Ok(()));
        assert_eq!(
            validate_api_key("secret", Some("guess")),
            Err(AuthError::InvalidApiKey)
        );
        assert_eq!(validate_api_key("secret", None), Err(AuthError::MissingApiKey));
    }

    #[test]
    fn prefixes_and_extensions_do_not_match() {
        assert!(keys_match(b"secret", b"secret"));
        assert!(!keys_match(b"secret", b"secre"));
        assert!(!keys_match(b"secret", b"secret!"));
        assert!(!keys_match(b"secret", b""));
        assert!(!keys_match(b"secret", b"sekret"));
    }
}
