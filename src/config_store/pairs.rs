use super::ConfigError;

/// Splits `key=value` tokens into ordered `(key, value)` pairs.
///
/// Each token is split at its first `=`, so values may themselves contain
/// `=` and may be empty. Input order is preserved and repeated keys are kept
/// as separate pairs.
///
/// # Examples
/// * `"A=b=c"` parses to `("A", "b=c")`
/// * `"EMPTY="` parses to `("EMPTY", "")`
///
/// # Errors
/// * `ConfigError::MalformedPair` - if a token has no `=` or an empty key
pub fn parse_pairs<S: AsRef<str>>(tokens: &[S]) -> Result<Vec<(String, String)>, ConfigError> {
    tokens
        .iter()
        .map(|token| {
            let token = token.as_ref();
            let (key, value) = token
                .split_once('=')
                .ok_or_else(|| ConfigError::MalformedPair {
                    token: token.to_string(),
                    reason: "expected key=value".to_string(),
                })?;

            if key.is_empty() {
                return Err(ConfigError::MalformedPair {
                    token: token.to_string(),
                    reason: "key is empty".to_string(),
                });
            }

            Ok((key.to_string(), value.to_string()))
        })
        .collect()
}
