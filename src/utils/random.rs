//! Random identifier generation.

use base64::Engine as _;

/// Generates a cryptographically secure random identifier.
///
/// Draws `byte_len` bytes from the OS entropy source via `getrandom` and
/// encodes them as URL-safe base64 without padding, so the result is safe to
/// use in paths and file names.
///
/// # Errors
///
/// Returns the `getrandom` error if the system random number generator fails.
pub fn random_id(byte_len: usize) -> Result<String, getrandom::Error> {
    let mut buffer = vec![0u8; byte_len];
    getrandom::fill(&mut buffer)?;
    Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(buffer))
}
