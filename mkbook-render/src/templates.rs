//! Askama template definitions.

use crate::latex::escape_latex;
use askama::Template;
use mkbook_core::{BookMeta, CoverConfig, CoverTemplate, RenderError};

/// Document class shipped next to every book
pub const CLASS_FILE: &str = include_str!("../assets/mkbook.cls");

/// Top-level book document (`index.tex`)
#[derive(Template)]
#[template(
    ext = "txt",
    source = r"\documentclass{mkbook}

\title{ {{- title -}} }
{% if let Some(subtitle) = subtitle %}\subtitle{ {{- subtitle -}} }
{% endif %}{% if let Some(author) = author %}\author{ {{- author -}} }
{% endif %}{% if let Some(email) = email %}\email{ {{- email -}} }
{% endif %}\date{ {{- year -}} }

\begin{document}
\input{cover}

\frontmatter
\tableofcontents
{{ frontmatter }}

\mainmatter
{{ mainmatter }}

\backmatter
\input{solutions}
\input{acronyms}
\input{glossary}
\end{document}
"
)]
pub struct BookTemplate<'a> {
    // Book metadata, already escaped
    pub title: String,
    pub subtitle: Option<String>,
    pub author: Option<String>,
    pub email: Option<String>,
    pub year: i32,

    // Rendered matter blocks
    pub frontmatter: &'a str,
    pub mainmatter: &'a str,
}

impl<'a> BookTemplate<'a> {
    pub fn new(meta: &BookMeta<'_>, frontmatter: &'a str, mainmatter: &'a str) -> Self {
        Self {
            title: escape_latex(meta.title),
            subtitle: meta.subtitle.map(escape_latex),
            author: meta.author.map(escape_latex),
            email: meta.email.map(escape_latex),
            year: meta.year,
            frontmatter,
            mainmatter,
        }
    }
}

/// Title page with three tinted circles
#[derive(Template)]
#[template(
    ext = "txt",
    source = r"\begin{titlepage}
\begin{tikzpicture}[remember picture, overlay]
\fill[ {{- color -}} ] (current page.north east) circle (7cm);
\fill[ {{- color -}} !60] (current page.south west) circle (5cm);
\fill[ {{- color -}} !30] ([xshift=4cm, yshift=-9cm]current page.north west) circle (1.5cm);
\end{tikzpicture}
\vspace*{6cm}
\begin{flushleft}
{\Huge\bfseries\thetitle\par}
\vspace{1em}
{\Large\thesubtitle\par}
\vfill
{\large\theauthor\par}
{\small\theemail\par}
{\small\thedate\par}
{% if let Some(logo) = logo %}\vspace{1em}
\includegraphics[width=3cm]{ {{- logo -}} }
{% endif %}\end{flushleft}
\end{titlepage}
"
)]
pub struct CirclesCover {
    pub color: String,
    pub logo: Option<String>,
}

/// Title page with text only
#[derive(Template)]
#[template(
    ext = "txt",
    source = r"\begin{titlepage}
\centering
\vspace*{4cm}
{\color{ {{- color -}} }\Huge\bfseries\thetitle\par}
\vspace{1em}
{\Large\thesubtitle\par}
\vfill
{% if let Some(logo) = logo %}\includegraphics[width=3cm]{ {{- logo -}} }\par
\vspace{2em}
{% endif %}{\large\theauthor\par}
{\small\thedate\par}
\end{titlepage}
"
)]
pub struct PlainCover {
    pub color: String,
    pub logo: Option<String>,
}

/// Logo paths go to `\includegraphics` unescaped, with forward slashes
fn logo_path(cover: &CoverConfig) -> Option<String> {
    cover.logo.as_ref().map(|logo| logo.replace('\\', "/"))
}

fn template_error(err: askama::Error) -> RenderError {
    RenderError::Template(err.to_string())
}

/// `circles` cover
pub struct Circles;

impl CoverTemplate for Circles {
    fn render(&self, cover: &CoverConfig) -> Result<String, RenderError> {
        CirclesCover {
            color: cover.color.clone(),
            logo: logo_path(cover),
        }
        .render()
        .map_err(template_error)
    }
}

/// `plain` cover
pub struct Plain;

impl CoverTemplate for Plain {
    fn render(&self, cover: &CoverConfig) -> Result<String, RenderError> {
        PlainCover {
            color: cover.color.clone(),
            logo: logo_path(cover),
        }
        .render()
        .map_err(template_error)
    }
}

pub(crate) fn render_book(
    meta: &BookMeta<'_>,
    frontmatter: &str,
    mainmatter: &str,
) -> Result<String, RenderError> {
    BookTemplate::new(meta, frontmatter, mainmatter)
        .render()
        .map_err(template_error)
}
