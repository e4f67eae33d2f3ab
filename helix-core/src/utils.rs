//! Utility functions and helpers

use serde::{Deserialize, Deserializer};

/// Truncate a string to a maximum byte length, ensuring valid UTF-8 boundaries
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        let mut end = max_len.saturating_sub(3);
        while !s.is_char_boundary(end) {
            end = end.saturating_sub(1);
        }
        format!("{}...", &s[..end])
    }
}

/// Mask a secret for display, keeping the last four characters
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.is_empty() {
        return "(not set)".to_string();
    }
    if chars.len() <= 4 {
        return "****".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{}", tail)
}

/// Deserialize a field that the backend may send as `null`, falling back to
/// the type's default. Pair with `#[serde(default)]` for missing keys.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world", 8), "hello...");
        assert_eq!(truncate("test", 3), "...");
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate("héllo wörld", 5), "h...");
    }

    #[test]
    fn test_null_as_default() {
        #[derive(serde::Deserialize)]
        struct Payload {
            #[serde(default, deserialize_with = "null_as_default")]
            files: Vec<String>,
            #[serde(default, deserialize_with = "null_as_default")]
            name: String,
        }

        let payload: Payload = serde_json::from_str(r#"{"files": null, "name": null}"#).unwrap();
        assert!(payload.files.is_empty());
        assert!(payload.name.is_empty());

        let payload: Payload = serde_json::from_str(r#"{"files": ["a.txt"]}"#).unwrap();
        assert_eq!(payload.files, vec!["a.txt"]);
    }

    #[test]
    fn test_mask_secret() {
        assert_eq!(mask_secret(""), "(not set)");
        assert_eq!(mask_secret("abc"), "****");
        assert_eq!(mask_secret("hl-secret-1234"), "****1234");
    }
}
