//! Object key generation for profile images.

use rand::Rng;

/// Key prefix for profile images.
const KEY_PREFIX: &str = "pp";

/// Label used when sanitization strips every character.
const FALLBACK_LABEL: &str = "user";

/// Size of the random suffix space.
const SUFFIX_SPACE: u32 = 10_000;

/// Generates an object key of the form `pp/<label>-<n>.jpg`.
///
/// The owner label is lowercased and stripped to `[a-z0-9]`; it only makes
/// the key readable and carries no identity. The suffix is drawn from
/// `[0, 10000)` and gives no global uniqueness guarantee: two keys for
/// the same owner can collide, which the ingestion flow tolerates by
/// never deleting the key it just wrote.
#[must_use]
pub fn generate_key(owner_label: &str) -> String {
    let label = sanitize_label(owner_label);
    let suffix = rand::rng().random_range(0..SUFFIX_SPACE);
    format!("{KEY_PREFIX}/{label}-{suffix}.jpg")
}

/// Lowercases and strips everything outside `[a-z0-9]`, falling back to a
/// fixed label when nothing survives.
fn sanitize_label(label: &str) -> String {
    let sanitized: String = label
        .to_lowercase()
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .collect();

    if sanitized.is_empty() {
        FALLBACK_LABEL.to_string()
    } else {
        sanitized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_key_shape(key: &str) {
        let rest = key.strip_prefix("pp/").expect("pp/ prefix");
        let rest = rest.strip_suffix(".jpg").expect(".jpg suffix");
        let (label, suffix) = rest.rsplit_once('-').expect("hyphenated suffix");

        assert!(!label.is_empty());
        assert!(
            label
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        );
        let n: u32 = suffix.parse().expect("numeric suffix");
        assert!(n < SUFFIX_SPACE);
    }

    #[test]
    fn test_sanitize_label() {
        assert_eq!(sanitize_label("Alice"), "alice");
        assert_eq!(sanitize_label("Bob Smith 3rd"), "bobsmith3rd");
        assert_eq!(sanitize_label("user@example.com"), "userexamplecom");
    }

    #[test]
    fn test_sanitize_label_empty_falls_back() {
        assert_eq!(sanitize_label(""), "user");
        assert_eq!(sanitize_label("---"), "user");
        assert_eq!(sanitize_label("日本語"), "user");
    }

    #[test]
    fn test_generate_key_shape() {
        assert_key_shape(&generate_key("Alice Example"));
        assert_key_shape(&generate_key(""));
        assert_key_shape(&generate_key("!!!"));
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        // For any owner label, the generated key matches
        // pp/[a-z0-9]+-[0-9]{1,4}.jpg
        proptest! {
            #[test]
            fn prop_key_always_matches_shape(label in ".*") {
                assert_key_shape(&generate_key(&label));
            }
        }
    }
}
