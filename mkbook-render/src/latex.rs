//! LaTeX text helpers: escaping, sectioning commands and directives.

use std::path::Path;

/// Escape LaTeX special characters in plain text
///
/// ```
/// use mkbook_render::latex::escape_latex;
///
/// assert_eq!(escape_latex("Hello & {World}"), r"Hello \& \{World\}");
/// ```
pub fn escape_latex(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str(r"\&"),
            '%' => out.push_str(r"\%"),
            '#' => out.push_str(r"\#"),
            '$' => out.push_str(r"\$"),
            '_' => out.push_str(r"\_"),
            '^' => out.push_str(r"\^{}"),
            '{' => out.push_str(r"\{"),
            '}' => out.push_str(r"\}"),
            '~' => out.push_str(r"\textasciitilde{}"),
            '\\' => out.push_str(r"\textbackslash{}"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape the characters `\href` and `\url` do not accept verbatim
pub fn escape_url(url: &str) -> String {
    url.replace('\\', "/").replace('%', r"\%").replace('#', r"\#")
}

/// Sectioning command for a heading level
///
/// -2 is a part, -1 a chapter, 0 a section, down to subparagraphs.
pub fn sectioning_command(level: i32) -> &'static str {
    match level {
        i32::MIN..=-2 => "part",
        -1 => "chapter",
        0 => "section",
        1 => "subsection",
        2 => "subsubsection",
        3 => "paragraph",
        _ => "subparagraph",
    }
}

/// `\chapter{Title}` or `\chapter*{Title}`
pub fn heading(title: &str, level: i32, numbered: bool) -> String {
    format!(
        "\\{}{}{{{}}}",
        sectioning_command(level),
        if numbered { "" } else { "*" },
        escape_latex(title)
    )
}

/// `\input{path}` for a rendered page, tagged with its title
pub fn include(path: &Path, title: &str) -> String {
    let path = path
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");
    let title = title.replace(['\n', '\r'], " ");
    format!("\\input{{{}}} % {}", path, title)
}

/// Merge inclusive line ranges that overlap or touch
///
/// Reversed ranges are ignored; only the bounds are looked at.
///
/// ```
/// use mkbook_render::latex::merge_ranges;
///
/// assert_eq!(merge_ranges(&[(1, 3), (5, 5), (4, 4), (7, 8)]), vec!["1-5", "7-8"]);
/// ```
pub fn merge_ranges(ranges: &[(u32, u32)]) -> Vec<String> {
    let mut sorted: Vec<(u32, u32)> = ranges
        .iter()
        .copied()
        .filter(|(start, end)| start <= end)
        .collect();
    sorted.sort_unstable();

    let mut labels = Vec::new();
    let mut iter = sorted.into_iter();
    let Some((mut start, mut end)) = iter.next() else {
        return labels;
    };
    for (next_start, next_end) in iter {
        if next_start <= end.saturating_add(1) {
            end = end.max(next_end);
        } else {
            labels.push(range_label(start, end));
            start = next_start;
            end = next_end;
        }
    }
    labels.push(range_label(start, end));
    labels
}

fn range_label(start: u32, end: u32) -> String {
    if start == end {
        start.to_string()
    } else {
        format!("{}-{}", start, end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_escape_every_special_character() {
        assert_eq!(
            escape_latex(r"50% of $x_1^2 # {a} ~ \"),
            r"50\% of \$x\_1\^{}2 \# \{a\} \textasciitilde{} \textbackslash{}"
        );
        assert_eq!(escape_latex("plain text"), "plain text");
    }

    #[test]
    fn test_sectioning_commands() {
        assert_eq!(sectioning_command(-3), "part");
        assert_eq!(sectioning_command(-2), "part");
        assert_eq!(sectioning_command(-1), "chapter");
        assert_eq!(sectioning_command(0), "section");
        assert_eq!(sectioning_command(3), "paragraph");
        assert_eq!(sectioning_command(9), "subparagraph");
    }

    #[test]
    fn test_heading() {
        assert_eq!(heading("Getting Started", -1, true), r"\chapter{Getting Started}");
        assert_eq!(heading("Q&A", 0, false), r"\section*{Q\&A}");
    }

    #[test]
    fn test_include_uses_forward_slashes() {
        let path: PathBuf = ["guide", "ch1.tex"].iter().collect();
        assert_eq!(include(&path, "Chapter\n1"), r"\input{guide/ch1.tex} % Chapter 1");
    }

    #[test]
    fn test_escape_url() {
        assert_eq!(
            escape_url("https://example.com/a%20b#frag"),
            r"https://example.com/a\%20b\#frag"
        );
    }

    #[test]
    fn test_merge_ranges() {
        assert_eq!(
            merge_ranges(&[(5, 9), (1, 3), (4, 4), (12, 12), (8, 10)]),
            vec!["1-10", "12"]
        );
        assert_eq!(merge_ranges(&[(1, 4_000_000_000)]), vec!["1-4000000000"]);
        assert_eq!(merge_ranges(&[(u32::MAX, u32::MAX), (7, 3)]), vec!["4294967295"]);
    }
}
