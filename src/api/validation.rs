//! Custom field validators used by the request DTOs.

use std::borrow::Cow;
use validator::ValidationError;

use crate::security::signatures;

/// Characters accepted as the special class in passwords.
const PASSWORD_SPECIALS: &str = "@$!%*?&";

/// Rejects values matching any XSS signature.
///
/// Shares the signature set with the request inspection pipeline.
pub fn no_xss(value: &str) -> Result<(), ValidationError> {
    match signatures::matches(value, signatures::xss()) {
        Some(_) => Err(ValidationError::new("no_xss")
            .with_message(Cow::Borrowed("Potentially dangerous content detected"))),
        None => Ok(()),
    }
}

/// Requires a lowercase letter, an uppercase letter, a digit and one of
/// `@$!%*?&`, with no other characters and at least 8 in total.
pub fn strong_password(value: &str) -> Result<(), ValidationError> {
    let allowed = value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || PASSWORD_SPECIALS.contains(c));

    let strong = allowed
        && value.chars().count() >= 8
        && value.chars().any(|c| c.is_ascii_lowercase())
        && value.chars().any(|c| c.is_ascii_uppercase())
        && value.chars().any(|c| c.is_ascii_digit())
        && value.chars().any(|c| PASSWORD_SPECIALS.contains(c));

    if strong {
        Ok(())
    } else {
        Err(ValidationError::new("password_strength").with_message(Cow::Borrowed(
            "Password must contain at least one lowercase letter, one uppercase letter, one digit and one special character (@$!%*?&)",
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_xss_accepts_plain_text() {
        assert!(no_xss("alice_01").is_ok());
        assert!(no_xss("").is_ok());
    }

    #[test]
    fn test_no_xss_rejects_markup() {
        assert!(no_xss("<script>alert(1)</script>").is_err());
        assert!(no_xss("javascript:alert(1)").is_err());
        assert!(no_xss("<b>bold</b>").is_err());
    }

    #[test]
    fn test_strong_password() {
        assert!(strong_password("Str0ng!Pass").is_ok());
        assert!(strong_password("weakpass").is_err());
        assert!(strong_password("N0Special1").is_err());
        assert!(strong_password("Sh0rt!").is_err());
        assert!(strong_password("Has Sp4ce!x").is_err());
        assert!(strong_password("Bad#Char1x").is_err());
    }
}
