//! Directory-name generation for books.

use deunicode::deunicode;
use regex::Regex;
use std::sync::OnceLock;
use unicode_segmentation::UnicodeSegmentation;

static HYPHEN_RUN: OnceLock<Regex> = OnceLock::new();

fn hyphen_run() -> &'static Regex {
    HYPHEN_RUN.get_or_init(|| Regex::new(r"-+").unwrap())
}

/// Convert a book title to a kebab-case directory name
///
/// Rules:
/// - Transliterated to ASCII, then lowercased
/// - Whitespace and apostrophes become hyphens
/// - Punctuation is dropped (underscores are kept)
/// - Hyphen runs collapse, leading/trailing hyphens are trimmed
///
/// # Examples
///
/// ```
/// use mkbook_core::kebab_case;
///
/// assert_eq!(kebab_case("Hello World"), "hello-world");
/// assert_eq!(kebab_case("Hello World!"), "hello-world");
/// assert_eq!(kebab_case("L'abricot"), "l-abricot");
/// assert_eq!(kebab_case("Éléphant"), "elephant");
/// ```
pub fn kebab_case(input: &str) -> String {
    let lowercased = deunicode(input).to_lowercase();

    let cleaned = lowercased
        .graphemes(true)
        .filter_map(|g| {
            let c = g.chars().next()?;
            if c.is_whitespace() || c == '\'' || c == '\u{2019}' {
                Some("-")
            } else if c.is_alphanumeric() || c == '-' || c == '_' {
                Some(g)
            } else {
                None
            }
        })
        .collect::<String>();

    let collapsed = hyphen_run().replace_all(&cleaned, "-");
    collapsed.trim_matches('-').to_string()
}
