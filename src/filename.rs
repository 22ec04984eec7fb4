//! Download filenames derived from graphic titles

use crate::ScannedAsset;

/// Longest slug kept from a title, in characters
pub const MAX_SLUG_CHARS: usize = 60;

const FORBIDDEN: [char; 9] = ['\\', '/', ':', '*', '?', '"', '<', '>', '|'];

/// Turn free text into a filename-safe slug.
///
/// Trims, replaces each run of `\ / : * ? " < > |` with `-`, then each run
/// of whitespace with `-`, and keeps at most 60 characters.
///
/// ```
/// assert_eq!(svgrab::filename::sanitize("  My: Logo / v2 "), "My--Logo---v2");
/// ```
pub fn sanitize(input: &str) -> String {
    let no_forbidden = collapse_runs(input.trim(), |c| FORBIDDEN.contains(&c));
    let no_space = collapse_runs(&no_forbidden, char::is_whitespace);
    no_space.chars().take(MAX_SLUG_CHARS).collect()
}

fn collapse_runs(input: &str, matches: impl Fn(char) -> bool) -> String {
    let mut out = String::with_capacity(input.len());
    let mut in_run = false;
    for c in input.chars() {
        if matches(c) {
            if !in_run {
                out.push('-');
            }
            in_run = true;
        } else {
            out.push(c);
            in_run = false;
        }
    }
    out
}

/// Filename for a single export from the export dialog: `<slug>.png`, or
/// `svg.png` when the title yields nothing.
pub fn filename_for_title(title: &str) -> String {
    let slug = sanitize(title);
    if slug.is_empty() {
        "svg.png".to_string()
    } else {
        format!("{}.png", slug)
    }
}

/// Filename for an asset exported from the scan list:
/// `svg-NNN-<slug>.png` or `svg-NNN.png`, with `NNN` the 1-based index.
pub fn filename_for_asset(asset: &ScannedAsset) -> String {
    filename_for_index(asset.index, &asset.asset.title)
}

pub fn filename_for_index(index: usize, title: &str) -> String {
    let prefix = format!("svg-{:03}", index + 1);
    let slug = sanitize(title);
    if slug.is_empty() {
        format!("{}.png", prefix)
    } else {
        format!("{}-{}.png", prefix, slug)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn sanitize_replaces_runs() {
        assert_eq!(sanitize("a<>b"), "a-b");
        assert_eq!(sanitize("a \t b"), "a-b");
        assert_eq!(sanitize("a /b"), "a--b");
        assert_eq!(sanitize("   "), "");
        assert_eq!(sanitize(&"x".repeat(100)).len(), 60);
    }

    #[test]
    fn dialog_filenames() {
        assert_eq!(filename_for_title("Company Logo"), "Company-Logo.png");
        assert_eq!(filename_for_title(""), "svg.png");
        assert_eq!(filename_for_title(" \n"), "svg.png");
    }

    #[test]
    fn list_filenames() {
        assert_eq!(filename_for_index(0, ""), "svg-001.png");
        assert_eq!(filename_for_index(41, "menu icon"), "svg-042-menu-icon.png");
        assert_eq!(filename_for_index(1233, "x"), "svg-1234-x.png");
    }

    proptest! {
        #[test]
        fn sanitize_is_idempotent(s in ".{0,120}") {
            let once = sanitize(&s);
            prop_assert_eq!(sanitize(&once), once.clone());
            prop_assert!(once.chars().count() <= MAX_SLUG_CHARS);
            prop_assert!(!once.chars().any(|c| c.is_whitespace() || FORBIDDEN.contains(&c)));
        }

        #[test]
        fn dialog_filename_fits(s in "\\PC{0,200}") {
            prop_assert!(filename_for_title(&s).chars().count() <= MAX_SLUG_CHARS + 4);
        }
    }
}
