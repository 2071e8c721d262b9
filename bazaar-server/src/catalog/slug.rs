//! Slug normalization
//!
//! Derives URL-safe identifiers from display names. Allocation policy
//! differs per entity: category and sub-category slugs must be unique and
//! collide with a Conflict error; product slugs are disambiguated in the
//! db layer by appending a millisecond timestamp.

/// Normalize a display name to a URL-safe slug: trim, lowercase, ASCII
/// alphanumerics only, non-alphanumeric runs collapsed to single hyphens.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_hyphen = false;
    for c in name.trim().chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            slug.push(c.to_ascii_lowercase());
            pending_hyphen = false;
        } else {
            pending_hyphen = true;
        }
    }
    slug
}

/// Disambiguate a taken product slug with a millisecond timestamp suffix.
pub fn with_suffix(base: &str, now_millis: i64) -> String {
    format!("{base}-{now_millis}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_normalization() {
        assert_eq!(slugify("Wireless Mouse"), "wireless-mouse");
        assert_eq!(slugify("  Trimmed  Name  "), "trimmed-name");
        assert_eq!(slugify("UPPER"), "upper");
    }

    #[test]
    fn test_special_characters_collapse() {
        assert_eq!(slugify("T-Shirt (Blue)"), "t-shirt-blue");
        assert_eq!(slugify("A  &  B // C"), "a-b-c");
        assert_eq!(slugify("50% off!"), "50-off");
    }

    #[test]
    fn test_non_ascii_stripped() {
        assert_eq!(slugify("Café Table"), "caf-table");
        assert_eq!(slugify("日本語"), "");
    }

    #[test]
    fn test_no_leading_or_trailing_hyphens() {
        assert_eq!(slugify("---edge---"), "edge");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_suffix() {
        assert_eq!(with_suffix("wireless-mouse", 1700000000000), "wireless-mouse-1700000000000");
    }

    #[test]
    fn test_idempotent_on_slug_input() {
        let s = slugify("Wireless Mouse");
        assert_eq!(slugify(&s), s);
    }
}
