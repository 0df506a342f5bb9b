//! Markdown to LaTeX page renderer.
//!
//! Besides CommonMark (tables, footnotes, task lists, math), pages may use:
//! - acronym definitions `*[HTML]: Hyper Text Markup Language`,
//! - fenced `glossary` blocks of `term: definition` lines,
//! - fenced `solution` blocks, collected into the solutions list.
//!
//! Local images are copied into the book's `assets/` directory and recorded
//! in the asset map.

use crate::latex::{escape_latex, escape_url, merge_ranges, sectioning_command};
use mkbook_core::assets::ASSETS_DIR;
use mkbook_core::{AssetMap, PageRenderer, PageRequest, RenderError};
use pulldown_cmark::{Alignment, CodeBlockKind, CowStr, Event, Options, Parser, Tag};
use regex::Regex;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::OnceLock;

static ACRONYM_REGEX: OnceLock<Regex> = OnceLock::new();
static HL_LINES_REGEX: OnceLock<Regex> = OnceLock::new();

fn acronym_regex() -> &'static Regex {
    ACRONYM_REGEX.get_or_init(|| Regex::new(r"(?m)^\*\[([^\]]+)\]:[ \t]*(.*?)[ \t]*$\n?").unwrap())
}

fn hl_lines_regex() -> &'static Regex {
    HL_LINES_REGEX.get_or_init(|| Regex::new(r#"hl_lines="([^"]*)""#).unwrap())
}

const FOOTNOTE_MARK: char = '\u{1}';

#[derive(Debug, Clone)]
struct Solution {
    page: String,
    text: String,
}

/// Renders the pages of one book
pub struct LatexRenderer {
    docs_dir: PathBuf,
    book_dir: PathBuf,
    options: Options,
    assets: AssetMap,
    acronyms: BTreeMap<String, String>,
    glossary: BTreeMap<String, String>,
    solutions: Vec<Solution>,
}

impl LatexRenderer {
    pub fn new(docs_dir: impl Into<PathBuf>, book_dir: impl Into<PathBuf>) -> Self {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_FOOTNOTES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);
        options.insert(Options::ENABLE_MATH);
        options.insert(Options::ENABLE_YAML_STYLE_METADATA_BLOCKS);
        options.insert(Options::ENABLE_HEADING_ATTRIBUTES);

        Self {
            docs_dir: docs_dir.into(),
            book_dir: book_dir.into(),
            options,
            assets: AssetMap::new(),
            acronyms: BTreeMap::new(),
            glossary: BTreeMap::new(),
            solutions: Vec::new(),
        }
    }

    /// Remove acronym definitions from `content`, remembering them
    fn take_acronyms(&mut self, content: &str) -> String {
        for captures in acronym_regex().captures_iter(content) {
            let key = captures[1].trim().to_string();
            let value = captures[2].to_string();
            self.acronyms.entry(key).or_insert(value);
        }
        acronym_regex().replace_all(content, "").into_owned()
    }

    /// Copy a local image into the assets directory and return its asset name
    fn register_image(&mut self, page_src: &Path, dest: &str) -> Result<String, RenderError> {
        let rel = if let Some(absolute) = dest.strip_prefix('/') {
            PathBuf::from(absolute)
        } else {
            page_src
                .parent()
                .unwrap_or_else(|| Path::new(""))
                .join(dest)
        };
        let rel = normalize(&rel);
        let reference = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        let name = self.asset_name(&reference.replace('/', "-"), &reference);

        let src = self.docs_dir.join(&rel);
        let assets_dir = self.book_dir.join(ASSETS_DIR);
        let target = assets_dir.join(&name);
        fs::create_dir_all(&assets_dir).map_err(|source| RenderError::Io {
            path: assets_dir.clone(),
            source,
        })?;
        fs::copy(&src, &target).map_err(|source| RenderError::Io { path: src, source })?;

        self.assets.insert(name.clone(), reference);
        Ok(name)
    }

    /// `flat`, or `flat` numbered `-2`, `-3`, ... when another source
    /// already owns that name
    fn asset_name(&self, flat: &str, reference: &str) -> String {
        let (stem, extension) = match flat.rsplit_once('.') {
            Some((stem, extension)) if !stem.is_empty() => (stem, Some(extension)),
            _ => (flat, None),
        };
        let mut name = flat.to_string();
        let mut n = 1;
        while let Some(owner) = self.assets.get(&name) {
            if owner == reference {
                break;
            }
            n += 1;
            name = match extension {
                Some(extension) => format!("{}-{}.{}", stem, n, extension),
                None => format!("{}-{}", stem, n),
            };
        }
        name
    }
}

/// Drop `.` components and resolve `..` lexically
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            Component::Normal(part) => out.push(part),
            Component::RootDir | Component::Prefix(_) => {}
        }
    }
    out
}

impl PageRenderer for LatexRenderer {
    fn render(&mut self, page: &PageRequest<'_>) -> Result<String, RenderError> {
        let content = self.take_acronyms(page.content);
        let options = self.options;
        let events: Vec<Event> = Parser::new_ext(&content, options).collect();

        let mut writer = PageWriter::new(self, page);
        for event in events {
            writer.event(event)?;
        }
        Ok(writer.finish())
    }

    fn asset_map(&self) -> AssetMap {
        self.assets.clone()
    }

    fn acronym_list(&self) -> String {
        description_list(&self.acronyms)
    }

    fn glossary_list(&self) -> String {
        description_list(&self.glossary)
    }

    fn solution_list(&self) -> String {
        let mut out = String::new();
        for (index, solution) in self.solutions.iter().enumerate() {
            let number = index + 1;
            out.push_str(&format!(
                "\\subsection*{{Solution {} ({})}}\\label{{solution:{}}}\n",
                number,
                escape_latex(&solution.page),
                number
            ));
            out.push_str(&solution.text);
            out.push('\n');
        }
        out
    }
}

fn description_list(entries: &BTreeMap<String, String>) -> String {
    if entries.is_empty() {
        return String::new();
    }
    let mut out = String::from("\\begin{description}\n");
    for (term, definition) in entries {
        out.push_str(&format!(
            "  \\item[{}] {}\n",
            escape_latex(term),
            escape_latex(definition)
        ));
    }
    out.push_str("\\end{description}\n");
    out
}

/// Plain paragraphs from raw text
fn paragraphs(text: &str) -> String {
    text.split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(escape_latex)
        .collect::<Vec<_>>()
        .join("\n\n")
        + "\n"
}

/// What an end event has to do, pushed by the matching start event
enum Closer {
    Text(&'static str),
    Heading { dropped: bool },
    Code,
    Glossary,
    Solution,
    List { ordered: bool },
    Link,
    Skip,
    Footnote(String),
    TableHead,
    TableRow,
    Table,
    Nothing,
}

struct PageWriter<'r, 'p> {
    renderer: &'r mut LatexRenderer,
    page: &'p PageRequest<'p>,
    out: String,
    captures: Vec<String>,
    closers: Vec<Closer>,
    /// Text is copied verbatim (code blocks)
    raw: usize,
    /// Text is discarded (dropped title, image alt text, metadata)
    skip: usize,
    title_dropped: bool,
    cell: usize,
    footnotes: BTreeMap<String, String>,
}

impl<'r, 'p> PageWriter<'r, 'p> {
    fn new(renderer: &'r mut LatexRenderer, page: &'p PageRequest<'p>) -> Self {
        Self {
            renderer,
            page,
            out: String::new(),
            captures: Vec::new(),
            closers: Vec::new(),
            raw: 0,
            skip: 0,
            title_dropped: false,
            cell: 0,
            footnotes: BTreeMap::new(),
        }
    }

    fn push(&mut self, text: &str) {
        if self.skip > 0 {
            return;
        }
        match self.captures.last_mut() {
            Some(capture) => capture.push_str(text),
            None => self.out.push_str(text),
        }
    }

    fn event(&mut self, event: Event<'_>) -> Result<(), RenderError> {
        match event {
            Event::Start(tag) => {
                let closer = self.open(tag)?;
                self.closers.push(closer);
            }
            Event::End(_) => {
                if let Some(closer) = self.closers.pop() {
                    self.close(closer);
                }
            }
            Event::Text(text) => {
                if self.raw > 0 {
                    self.push(&text);
                } else {
                    self.push(&escape_latex(&text));
                }
            }
            Event::Code(code) => self.push(&format!("\\texttt{{{}}}", escape_latex(&code))),
            Event::InlineMath(math) => self.push(&format!("${}$", math)),
            Event::DisplayMath(math) => self.push(&format!("\\[{}\\]", math)),
            Event::SoftBreak => self.push("\n"),
            Event::HardBreak => self.push("\\\\\n"),
            Event::Rule => self.push("\\par\\noindent\\rule{\\linewidth}{0.4pt}\\par\n\n"),
            Event::FootnoteReference(label) => {
                self.push(&format!("\\footnote{{{m}{}{m}}}", label, m = FOOTNOTE_MARK));
            }
            Event::TaskListMarker(checked) => {
                self.push(if checked { "$\\boxtimes$ " } else { "$\\square$ " });
            }
            Event::Html(_) | Event::InlineHtml(_) => {
                tracing::debug!("Dropping raw HTML in {:?}", self.page.src_path);
            }
            #[allow(unreachable_patterns)]
            _ => {}
        }
        Ok(())
    }

    fn open(&mut self, tag: Tag<'_>) -> Result<Closer, RenderError> {
        let closer = match tag {
            Tag::Paragraph => Closer::Text("\n\n"),
            Tag::Heading { level, .. } => {
                let depth = level as i32;
                if depth == 1 && self.page.drop_title && !self.title_dropped {
                    self.title_dropped = true;
                    self.skip += 1;
                    Closer::Heading { dropped: true }
                } else {
                    let command = sectioning_command(self.page.level + depth - 1);
                    let star = if self.page.numbered { "" } else { "*" };
                    self.push(&format!("\\{}{}{{", command, star));
                    Closer::Heading { dropped: false }
                }
            }
            Tag::BlockQuote(_) => {
                self.push("\\begin{quote}\n");
                Closer::Text("\\end{quote}\n\n")
            }
            Tag::CodeBlock(kind) => self.open_code_block(kind),
            Tag::List(start) => {
                let ordered = start.is_some();
                if let Some(n) = start {
                    self.push("\\begin{enumerate}\n");
                    if n != 1 {
                        self.push(&format!("\\setcounter{{enumi}}{{{}}}\n", n.saturating_sub(1)));
                    }
                } else {
                    self.push("\\begin{itemize}\n");
                }
                Closer::List { ordered }
            }
            Tag::Item => {
                self.push("  \\item ");
                Closer::Text("\n")
            }
            Tag::FootnoteDefinition(label) => {
                self.captures.push(String::new());
                Closer::Footnote(label.to_string())
            }
            Tag::Table(alignments) => {
                let spec: String = alignments.iter().map(column_spec).collect();
                self.push(&format!("\\begin{{tabular}}{{{}}}\n\\hline\n", spec));
                Closer::Table
            }
            Tag::TableHead => {
                self.cell = 0;
                Closer::TableHead
            }
            Tag::TableRow => {
                self.cell = 0;
                Closer::TableRow
            }
            Tag::TableCell => {
                if self.cell > 0 {
                    self.push(" & ");
                }
                self.cell += 1;
                Closer::Nothing
            }
            Tag::Emphasis => {
                self.push("\\emph{");
                Closer::Text("}")
            }
            Tag::Strong => {
                self.push("\\textbf{");
                Closer::Text("}")
            }
            Tag::Strikethrough => {
                self.push("\\sout{");
                Closer::Text("}")
            }
            Tag::Link { dest_url, .. } => {
                self.push(&format!("\\href{{{}}}{{", escape_url(&dest_url)));
                Closer::Link
            }
            Tag::Image { dest_url, .. } => {
                if dest_url.contains("://") {
                    self.push(&format!("\\url{{{}}}", escape_url(&dest_url)));
                } else {
                    let name = self.renderer.register_image(self.page.src_path, &dest_url)?;
                    self.push(&format!(
                        "\\includegraphics[width=\\linewidth]{{{}/{}}}",
                        ASSETS_DIR, name
                    ));
                }
                self.skip += 1;
                Closer::Skip
            }
            Tag::MetadataBlock(_) | Tag::HtmlBlock => {
                self.skip += 1;
                Closer::Skip
            }
            _ => Closer::Nothing,
        };
        Ok(closer)
    }

    fn open_code_block(&mut self, kind: CodeBlockKind<'_>) -> Closer {
        let info: CowStr = match kind {
            CodeBlockKind::Fenced(info) => info,
            CodeBlockKind::Indented => CowStr::Borrowed(""),
        };
        let lang = info.split_whitespace().next().unwrap_or_default();
        self.raw += 1;
        match lang {
            "glossary" => {
                self.captures.push(String::new());
                Closer::Glossary
            }
            "solution" => {
                self.captures.push(String::new());
                Closer::Solution
            }
            _ => {
                let highlighted = highlighted_lines(&info);
                if highlighted.is_empty() {
                    self.push("\\begin{Verbatim}\n");
                } else {
                    self.push(&format!(
                        "\\begin{{Verbatim}}[highlightlines={{{}}}]\n",
                        merge_ranges(&highlighted).join(",")
                    ));
                }
                Closer::Code
            }
        }
    }

    fn close(&mut self, closer: Closer) {
        match closer {
            Closer::Text(text) => self.push(text),
            Closer::Heading { dropped: true } => self.skip -= 1,
            Closer::Heading { dropped: false } => self.push("}\n\n"),
            Closer::Code => {
                self.raw -= 1;
                self.push("\\end{Verbatim}\n\n");
            }
            Closer::Glossary => {
                self.raw -= 1;
                let text = self.captures.pop().unwrap_or_default();
                for line in text.lines() {
                    if let Some((term, definition)) = line.split_once(':') {
                        self.renderer
                            .glossary
                            .insert(term.trim().to_string(), definition.trim().to_string());
                    }
                }
            }
            Closer::Solution => {
                self.raw -= 1;
                let text = self.captures.pop().unwrap_or_default();
                self.renderer.solutions.push(Solution {
                    page: self.page.title.to_string(),
                    text: paragraphs(&text),
                });
                let number = self.renderer.solutions.len();
                self.push(&format!(
                    "\\textit{{See solution~\\ref{{solution:{}}}.}}\n\n",
                    number
                ));
            }
            Closer::List { ordered } => self.push(if ordered {
                "\\end{enumerate}\n\n"
            } else {
                "\\end{itemize}\n\n"
            }),
            Closer::Link => self.push("}"),
            Closer::Skip => self.skip -= 1,
            Closer::Footnote(label) => {
                let text = self.captures.pop().unwrap_or_default();
                self.footnotes.insert(label, text.trim().to_string());
            }
            Closer::TableHead => self.push(" \\\\\n\\hline\n"),
            Closer::TableRow => self.push(" \\\\\n"),
            Closer::Table => self.push("\\hline\n\\end{tabular}\n\n"),
            Closer::Nothing => {}
        }
    }

    fn finish(self) -> String {
        let mut out = self.out;
        for (label, text) in &self.footnotes {
            let marker = format!("{m}{}{m}", label, m = FOOTNOTE_MARK);
            out = out.replace(&marker, text);
        }
        // References without a definition
        out = out.replace(FOOTNOTE_MARK, "");
        format!("{}\n", out.trim_end())
    }
}

fn column_spec(alignment: &Alignment) -> char {
    match alignment {
        Alignment::Center => 'c',
        Alignment::Right => 'r',
        Alignment::Left | Alignment::None => 'l',
    }
}

/// Line ranges listed in a fence's `hl_lines="1 3-4"` attribute
fn highlighted_lines(info: &str) -> Vec<(u32, u32)> {
    let Some(captures) = hl_lines_regex().captures(info) else {
        return Vec::new();
    };
    captures[1]
        .split_whitespace()
        .filter_map(|item| match item.split_once('-') {
            Some((start, end)) => Some((start.parse().ok()?, end.parse().ok()?)),
            None => item.parse().ok().map(|n| (n, n)),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn request<'a>(content: &'a str, src: &'a Path) -> PageRequest<'a> {
        PageRequest {
            title: "Page",
            content,
            src_path: src,
            output_path: Path::new("page.tex"),
            level: 0,
            numbered: true,
            drop_title: false,
        }
    }

    fn render(content: &str) -> String {
        let mut renderer = LatexRenderer::new("docs", "book");
        renderer
            .render(&request(content, Path::new("page.md")))
            .unwrap()
    }

    #[test]
    fn test_headings_follow_page_level() {
        let mut renderer = LatexRenderer::new("docs", "book");
        let mut page = request("# Title\n\n## Sub\n", Path::new("page.md"));
        page.level = -1;
        let out = renderer.render(&page).unwrap();
        assert_eq!(out, "\\chapter{Title}\n\n\\section{Sub}\n");
    }

    #[test]
    fn test_unnumbered_and_dropped_title() {
        let mut renderer = LatexRenderer::new("docs", "book");
        let mut page = request("# Welcome\n\nHello.\n\n# Again\n", Path::new("index.md"));
        page.numbered = false;
        page.drop_title = true;
        let out = renderer.render(&page).unwrap();
        assert_eq!(out, "Hello.\n\n\\section*{Again}\n");
    }

    #[test]
    fn test_inline_markup() {
        let out = render("Some *emphasis*, **bold**, `a_b` and [link](https://x.org/#top).\n");
        assert_eq!(
            out,
            "Some \\emph{emphasis}, \\textbf{bold}, \\texttt{a\\_b} and \\href{https://x.org/\\#top}{link}.\n"
        );
    }

    #[test]
    fn test_lists() {
        let out = render("- one\n- two\n\n3. three\n4. four\n");
        insta::assert_snapshot!(out, @r"
        \begin{itemize}
          \item one
          \item two
        \end{itemize}

        \begin{enumerate}
        \setcounter{enumi}{2}
          \item three
          \item four
        \end{enumerate}
        ");
    }

    #[test]
    fn test_code_block_is_verbatim() {
        let out = render("```python hl_lines=\"1 2 4\"\nx = {'a': 1}  # 100%\n```\n");
        assert_eq!(
            out,
            "\\begin{Verbatim}[highlightlines={1-2,4}]\nx = {'a': 1}  # 100%\n\\end{Verbatim}\n"
        );
    }

    #[test]
    fn test_math_passes_through() {
        let out = render("Euler: $e^{i\\pi} = -1$\n");
        assert_eq!(out, "Euler: $e^{i\\pi} = -1$\n");
    }

    #[test]
    fn test_footnotes() {
        let out = render("Text[^1].\n\n[^1]: The note.\n");
        assert_eq!(out, "Text\\footnote{The note.}.\n");
    }

    #[test]
    fn test_front_matter_is_ignored() {
        let out = render("---\ntitle: Hidden\n---\nBody\n");
        assert_eq!(out, "Body\n");
    }

    #[test]
    fn test_acronyms_are_collected() {
        let mut renderer = LatexRenderer::new("docs", "book");
        let out = renderer
            .render(&request(
                "The HTML spec.\n\n*[HTML]: Hyper Text Markup Language\n",
                Path::new("a.md"),
            ))
            .unwrap();
        assert_eq!(out, "The HTML spec.\n");
        assert_eq!(
            renderer.acronym_list(),
            "\\begin{description}\n  \\item[HTML] Hyper Text Markup Language\n\\end{description}\n"
        );
    }

    #[test]
    fn test_glossary_and_solutions() {
        let mut renderer = LatexRenderer::new("docs", "book");
        let content = "```glossary\nCompiler: translates code\n```\n\nExercise.\n\n```solution\nThe answer is 42 & more.\n```\n";
        let out = renderer
            .render(&request(content, Path::new("ex.md")))
            .unwrap();

        assert_eq!(out, "Exercise.\n\n\\textit{See solution~\\ref{solution:1}.}\n");
        assert_eq!(
            renderer.glossary_list(),
            "\\begin{description}\n  \\item[Compiler] translates code\n\\end{description}\n"
        );
        assert_eq!(
            renderer.solution_list(),
            "\\subsection*{Solution 1 (Page)}\\label{solution:1}\nThe answer is 42 \\& more.\n\n"
        );
    }

    #[test]
    fn test_empty_lists_render_nothing() {
        let renderer = LatexRenderer::new("docs", "book");
        assert_eq!(renderer.acronym_list(), "");
        assert_eq!(renderer.glossary_list(), "");
        assert_eq!(renderer.solution_list(), "");
    }

    #[test]
    fn test_table() {
        let out = render("| a | b |\n|:--|--:|\n| 1 | 2 |\n");
        insta::assert_snapshot!(out, @r"
        \begin{tabular}{lr}
        \hline
        a & b \\
        \hline
        1 & 2 \\
        \hline
        \end{tabular}
        ");
    }

    #[test]
    fn test_local_image_becomes_asset() {
        let dir = tempdir().unwrap();
        let docs = dir.path().join("docs");
        let book = dir.path().join("book");
        fs::create_dir_all(docs.join("guide/img")).unwrap();
        fs::write(docs.join("guide/img/fig.png"), "png").unwrap();

        let mut renderer = LatexRenderer::new(&docs, &book);
        let out = renderer
            .render(&request("![A figure](img/fig.png)\n", Path::new("guide/setup.md")))
            .unwrap();

        assert_eq!(out, "\\includegraphics[width=\\linewidth]{assets/guide-img-fig.png}\n");
        assert!(book.join("assets/guide-img-fig.png").exists());
        assert_eq!(
            renderer.asset_map().get("guide-img-fig.png").map(String::as_str),
            Some("guide/img/fig.png")
        );
    }

    #[test]
    fn test_missing_image_is_an_error() {
        let dir = tempdir().unwrap();
        let mut renderer = LatexRenderer::new(dir.path().join("docs"), dir.path().join("book"));
        let result = renderer.render(&request("![x](nope.png)\n", Path::new("p.md")));
        assert!(matches!(result, Err(RenderError::Io { .. })));
    }

    #[test]
    fn test_highlighted_lines() {
        assert_eq!(
            highlighted_lines(r#"rust hl_lines="1 3-5""#),
            vec![(1, 1), (3, 5)]
        );
        assert!(highlighted_lines("rust").is_empty());
    }

    #[test]
    fn test_huge_highlight_range() {
        let out = render("```rust hl_lines=\"2 1-4000000000\"\nfn main() {}\n```\n");
        assert!(out.starts_with("\\begin{Verbatim}[highlightlines={1-4000000000}]\n"));
    }

    #[test]
    fn test_images_with_similar_paths_stay_apart() {
        let dir = tempdir().unwrap();
        let docs = dir.path().join("docs");
        let book = dir.path().join("book");
        fs::create_dir_all(docs.join("a-b")).unwrap();
        fs::create_dir_all(docs.join("a")).unwrap();
        fs::write(docs.join("a-b/c.png"), "first").unwrap();
        fs::write(docs.join("a/b-c.png"), "second").unwrap();

        let mut renderer = LatexRenderer::new(&docs, &book);
        let first = renderer
            .render(&request("![](a-b/c.png)\n", Path::new("one.md")))
            .unwrap();
        let second = renderer
            .render(&request("![](a/b-c.png)\n", Path::new("two.md")))
            .unwrap();
        let again = renderer
            .render(&request("![](a-b/c.png)\n", Path::new("three.md")))
            .unwrap();

        assert_eq!(first, "\\includegraphics[width=\\linewidth]{assets/a-b-c.png}\n");
        assert_eq!(second, "\\includegraphics[width=\\linewidth]{assets/a-b-c-2.png}\n");
        assert_eq!(again, first);
        assert_eq!(fs::read_to_string(book.join("assets/a-b-c.png")).unwrap(), "first");
        assert_eq!(fs::read_to_string(book.join("assets/a-b-c-2.png")).unwrap(), "second");

        let map = renderer.asset_map();
        assert_eq!(map.get("a-b-c.png").map(String::as_str), Some("a-b/c.png"));
        assert_eq!(map.get("a-b-c-2.png").map(String::as_str), Some("a/b-c.png"));
    }
}
