//! Input checks shared by the services.

use crate::errors::{Error, Result};
use chrono::{DateTime, Utc};

/// Longest name accepted for roleplays, characters and species.
pub const MAX_NAME_LENGTH: usize = 100;

/// Trims `value` and rejects it if nothing is left.
pub fn require_text(value: &str, what: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::validation(format!("{what} cannot be empty")));
    }
    Ok(trimmed.to_string())
}

/// Like [`require_text`], additionally bounding the length.
pub fn require_name(value: &str, what: &str) -> Result<String> {
    let name = require_text(value, what)?;
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(Error::validation(format!(
            "{what} cannot be longer than {MAX_NAME_LENGTH} characters"
        )));
    }
    Ok(name)
}

/// Rejects expiry times that are not in the future.
pub fn require_future(expires_on: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Result<()> {
    match expires_on {
        Some(expiry) if expiry <= now => Err(Error::validation(
            "The expiry time must be in the future",
        )),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_require_text_trims() {
        assert_eq!(require_text("  tavern ", "Name").unwrap(), "tavern");
        assert!(matches!(
            require_text("   ", "Name"),
            Err(Error::Validation { .. })
        ));
    }

    #[test]
    fn test_require_name_bounds_length() {
        let long = "a".repeat(MAX_NAME_LENGTH + 1);
        assert!(require_name(&long, "Name").is_err());
        assert!(require_name(&"a".repeat(MAX_NAME_LENGTH), "Name").is_ok());
    }

    #[test]
    fn test_require_future() {
        let now = Utc::now();
        assert!(require_future(None, now).is_ok());
        assert!(require_future(Some(now + Duration::hours(1)), now).is_ok());
        assert!(require_future(Some(now), now).is_err());
        assert!(require_future(Some(now - Duration::hours(1)), now).is_err());
    }
}
