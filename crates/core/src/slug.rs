//! URL slugs for public map viewer links.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::CoreError;

/// Maximum slug length accepted for storage.
pub const MAX_SLUG_LEN: usize = 120;

static NON_WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9_\s-]").expect("valid regex"));

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

static SLUG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9_-]+$").expect("valid regex"));

/// Derive a slug from a display name.
///
/// Lower-cases, strips everything except ASCII word characters, whitespace
/// and hyphens, then turns each whitespace run into a single hyphen.
///
/// ```
/// use lotmap_core::slug::slugify;
///
/// assert_eq!(slugify("Sunset Ridge Phase 2"), "sunset-ridge-phase-2");
/// assert_eq!(slugify("  Oak & Elm: North  "), "oak-elm-north");
/// ```
pub fn slugify(name: &str) -> String {
    let lowered = name.to_lowercase();
    let stripped = NON_WORD_RE.replace_all(&lowered, "");
    WHITESPACE_RE
        .replace_all(stripped.trim(), "-")
        .into_owned()
}

/// Check that an explicitly supplied slug is URL-safe and within length.
pub fn validate_slug(slug: &str) -> Result<(), CoreError> {
    if slug.is_empty() {
        return Err(CoreError::Validation(
            "Slug must not be empty; choose a name containing letters or digits".into(),
        ));
    }
    if slug.len() > MAX_SLUG_LEN {
        return Err(CoreError::Validation(format!(
            "Slug must be at most {MAX_SLUG_LEN} characters"
        )));
    }
    if !SLUG_RE.is_match(slug) {
        return Err(CoreError::Validation(format!(
            "Slug '{slug}' may only contain lowercase letters, digits, '-' and '_'"
        )));
    }
    Ok(())
}

/// Use `explicit` when given, otherwise derive from `name`. Either way the
/// result is validated.
pub fn resolve_slug(name: &str, explicit: Option<&str>) -> Result<String, CoreError> {
    let slug = match explicit {
        Some(s) => s.trim().to_string(),
        None => slugify(name),
    };
    validate_slug(&slug)?;
    Ok(slug)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn derives_from_name() {
        assert_eq!(slugify("Sunset Ridge Phase 2"), "sunset-ridge-phase-2");
    }

    #[test]
    fn strips_punctuation() {
        assert_eq!(slugify("Lakeview (East) #3!"), "lakeview-east-3");
    }

    #[test]
    fn keeps_existing_hyphens_and_underscores() {
        assert_eq!(slugify("north_field - lots"), "north_field---lots");
    }

    #[test]
    fn collapses_whitespace_runs() {
        assert_eq!(slugify("a \t  b\nc"), "a-b-c");
    }

    #[test]
    fn punctuation_only_name_is_rejected() {
        assert_matches!(resolve_slug("!!!", None), Err(CoreError::Validation(_)));
    }

    #[test]
    fn explicit_slug_wins() {
        assert_eq!(
            resolve_slug("Sunset Ridge", Some("sr-2024")).unwrap(),
            "sr-2024"
        );
    }

    #[test]
    fn explicit_slug_must_be_url_safe() {
        assert_matches!(
            resolve_slug("Sunset Ridge", Some("Sunset Ridge")),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn overlong_slug_is_rejected() {
        let long = "a".repeat(MAX_SLUG_LEN + 1);
        assert_matches!(validate_slug(&long), Err(CoreError::Validation(_)));
    }
}
