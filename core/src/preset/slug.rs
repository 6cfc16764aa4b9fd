use std::collections::BTreeMap;

use crate::error::SlugError;
use crate::executor::{entry_slug, InstalledPlugin};

/// Trim and validate a plugin slug.
///
/// Slugs become directory names and fallback entry paths (`slug/slug.php`),
/// so anything that could escape the plugins directory is rejected.
pub fn normalize_slug(raw: &str) -> Result<&str, SlugError> {
    let slug = raw.trim();
    if slug.is_empty() {
        return Err(SlugError::Empty);
    }
    let bad = slug.contains("..")
        || slug
            .chars()
            .any(|c| c == '/' || c == '\\' || c.is_whitespace() || c.is_control());
    if bad {
        return Err(SlugError::Invalid(slug.to_string()));
    }
    Ok(slug)
}

/// Parse the comma-separated editor text: trim each piece, drop empties.
pub fn parse_slug_list(text: &str) -> Result<Vec<String>, SlugError> {
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| normalize_slug(s).map(str::to_string))
        .collect()
}

/// Inverse of [`parse_slug_list`].
pub fn join_slug_list(slugs: &[String]) -> String {
    slugs.join(", ")
}

/// Slugs of installed plugins, skipping our own and root-level single files.
pub fn installed_slugs(installed: &BTreeMap<String, InstalledPlugin>, self_slug: &str) -> Vec<String> {
    let mut slugs: Vec<String> = Vec::new();
    for entry in installed.keys() {
        let Some(slug) = entry_slug(entry) else {
            continue;
        };
        if slug == self_slug || slugs.iter().any(|s| s == slug) {
            continue;
        }
        slugs.push(slug.to_string());
    }
    slugs
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_installed_slugs_skips_self_and_single_files() {
        let plugin = |name: &str| InstalledPlugin {
            name: name.to_string(),
            version: None,
            active: false,
        };
        let installed: BTreeMap<String, InstalledPlugin> = [
            ("akismet/akismet.php", "Akismet"),
            ("hello.php", "Hello Dolly"),
            ("packager/packager.php", "Packager"),
            ("woo/woo.php", "Woo"),
            ("woo/extra.php", "Woo Extra"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), plugin(v)))
        .collect();

        assert_eq!(installed_slugs(&installed, "packager"), vec!["akismet", "woo"]);
    }

    #[test]
    fn test_normalize_trims() {
        assert_eq!(normalize_slug("  akismet \n"), Ok("akismet"));
        assert_eq!(normalize_slug("rank-math-seo"), Ok("rank-math-seo"));
    }

    #[test]
    fn test_normalize_rejects_paths_and_blanks() {
        assert_eq!(normalize_slug("   "), Err(SlugError::Empty));
        for bad in ["../etc", "a/b", "a\\b", "two words", "a..b"] {
            assert!(
                matches!(normalize_slug(bad), Err(SlugError::Invalid(_))),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_parse_slug_list() {
        let slugs = parse_slug_list(" updraftplus, filebird,, rank-math-seo ,").unwrap();
        assert_eq!(slugs, vec!["updraftplus", "filebird", "rank-math-seo"]);
        assert!(parse_slug_list("").unwrap().is_empty());
        assert!(parse_slug_list("ok, bad/slug").is_err());
    }

    #[test]
    fn test_join_slug_list() {
        let slugs = vec!["a".to_string(), "b".to_string()];
        assert_eq!(join_slug_list(&slugs), "a, b");
        assert_eq!(parse_slug_list(&join_slug_list(&slugs)).unwrap(), slugs);
    }
}
