//! Validates the Discord bot token while deserializing, so a malformed token
//! fails at startup instead of at login.

use serde::de::{Deserialize as _, Deserializer, Error as _};

pub fn deserialize<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    normalize(&raw)
        .map(str::to_owned)
        .ok_or_else(|| D::Error::custom("invalid discord token"))
}

/// Strips whitespace and the `Bot ` prefix, then validates the rest.
fn normalize(raw: &str) -> Option<&str> {
    let token = raw.trim();
    let token = token.strip_prefix("Bot ").unwrap_or(token);
    serenity::utils::validate_token(token).ok()?;
    Some(token)
}

#[cfg(test)]
mod tests {
    use super::normalize;

    #[test]
    fn strips_decoration() {
        assert_eq!(normalize("aaaa.bbbb.cccc"), Some("aaaa.bbbb.cccc"));
        assert_eq!(normalize(" Bot aaaa.bbbb.cccc\n"), Some("aaaa.bbbb.cccc"));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(normalize(""), None, "empty token");
        assert_eq!(normalize("aaaa.bbbb"), None, "missing part");
    }
}
