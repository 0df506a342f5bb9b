//! # mkbook-render
//!
//! LaTeX backend for mkbook.
//!
//! Pages are converted from Markdown with pulldown-cmark; the book document
//! and its covers are Askama templates.

pub mod latex;
pub mod markdown;
pub mod templates;

pub use markdown::LatexRenderer;
pub use templates::{BookTemplate, Circles, CirclesCover, Plain, PlainCover, CLASS_FILE};

use mkbook_core::{
    Backend, BookDefinition, BookMeta, CoverTemplate, Formatter, PageRenderer, RenderError,
};
use std::path::Path;

/// Class file name, matching `\documentclass{mkbook}`
pub const CLASS_FILE_NAME: &str = "mkbook.cls";

/// LaTeX directives and document templates
#[derive(Debug, Default, Clone, Copy)]
pub struct LatexFormatter;

impl Formatter for LatexFormatter {
    fn include(&self, path: &Path, title: &str) -> String {
        latex::include(path, title)
    }

    fn heading(&self, title: &str, level: i32, numbered: bool) -> String {
        latex::heading(title, level, numbered)
    }

    fn assemble(
        &self,
        meta: &BookMeta<'_>,
        frontmatter: &str,
        mainmatter: &str,
    ) -> Result<String, RenderError> {
        templates::render_book(meta, frontmatter, mainmatter)
    }

    fn cover(&self, name: &str) -> Option<&dyn CoverTemplate> {
        match name {
            "circles" => Some(&Circles),
            "plain" => Some(&Plain),
            _ => None,
        }
    }

    fn class_file(&self) -> Option<(&str, &str)> {
        Some((CLASS_FILE_NAME, CLASS_FILE))
    }
}

/// Markdown to LaTeX backend
#[derive(Debug, Default, Clone, Copy)]
pub struct LatexBackend {
    formatter: LatexFormatter,
}

impl LatexBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Backend for LatexBackend {
    fn renderer(&self, book: &BookDefinition, docs_dir: &Path) -> Box<dyn PageRenderer> {
        Box::new(LatexRenderer::new(docs_dir, &book.directory))
    }

    fn formatter(&self) -> &dyn Formatter {
        &self.formatter
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mkbook_core::CoverConfig;
    use std::path::PathBuf;

    fn meta() -> BookMeta<'static> {
        BookMeta {
            title: "R&D Notes",
            subtitle: Some("Volume 1"),
            author: Some("Jane Doe"),
            email: None,
            year: 2024,
        }
    }

    #[test]
    fn test_book_document() {
        let doc = LatexFormatter
            .assemble(&meta(), "\\input{preface.tex} % Preface", "\\input{ch1.tex} % One")
            .unwrap();
        insta::assert_snapshot!(doc, @r"
        \documentclass{mkbook}

        \title{R\&D Notes}
        \subtitle{Volume 1}
        \author{Jane Doe}
        \date{2024}

        \begin{document}
        \input{cover}

        \frontmatter
        \tableofcontents
        \input{preface.tex} % Preface

        \mainmatter
        \input{ch1.tex} % One

        \backmatter
        \input{solutions}
        \input{acronyms}
        \input{glossary}
        \end{document}
        ");
    }

    #[test]
    fn test_covers() {
        let cover = CoverConfig {
            name: "circles".to_string(),
            color: "teal".to_string(),
            logo: Some("img\\logo.png".to_string()),
        };
        let circles = LatexFormatter.cover("circles").unwrap().render(&cover).unwrap();
        assert!(circles.contains(r"\fill[teal] (current page.north east)"));
        assert!(circles.contains(r"\fill[teal!60]"));
        assert!(circles.contains(r"\includegraphics[width=3cm]{img/logo.png}"));

        let plain = LatexFormatter
            .cover("plain")
            .unwrap()
            .render(&CoverConfig {
                logo: None,
                ..cover
            })
            .unwrap();
        assert!(plain.contains(r"{\color{teal}\Huge"));
        assert!(!plain.contains("includegraphics"));

        assert!(LatexFormatter.cover("stars").is_none());
    }

    #[test]
    fn test_directives() {
        let path: PathBuf = ["guide", "intro.tex"].iter().collect();
        assert_eq!(
            LatexFormatter.include(&path, "Intro"),
            r"\input{guide/intro.tex} % Intro"
        );
        assert_eq!(LatexFormatter.heading("Guide", -1, true), r"\chapter{Guide}");
    }

    #[test]
    fn test_class_file() {
        let (name, contents) = LatexFormatter.class_file().unwrap();
        assert_eq!(name, "mkbook.cls");
        assert!(contents.contains(r"\ProvidesClass{mkbook}"));
    }
}
