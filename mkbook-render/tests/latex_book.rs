use mkbook_core::{load_nav, BookDriver, Config};
use mkbook_render::LatexBackend;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn project() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(
        root,
        "mkbook.yml",
        r#"
site:
  name: Field Guide
  author: Jane Doe
nav:
  - Guide:
      - Preface: preface.md
      - Basics: basics.md
books:
  books:
    - root: Guide
      base_level: -1
      title: Field Guide
      year: 2024
      frontmatter: [Preface]
      cover:
        name: plain
"#,
    );
    write(root, "docs/preface.md", "# Preface\n\nWhy this guide exists.\n");
    write(
        root,
        "docs/basics.md",
        r#"# Basics

The *HTML* format, see ![diagram](img/flow.png).

*[HTML]: Hyper Text Markup Language

```glossary
Node: an element of the tree
```

```solution
Count the leaves.
```
"#,
    );
    write(root, "docs/img/flow.png", "png");
    dir
}

#[test]
fn test_build_latex_book() {
    let dir = project();
    let config = Config::from_file(dir.path().join("mkbook.yml")).unwrap();
    let tree = load_nav(&config).unwrap();
    let backend = LatexBackend::new();
    let driver = BookDriver::new(&backend, config.docs_dir());

    let summaries = driver
        .run(&tree, config.book_definitions(&tree), config.books.enabled)
        .unwrap();
    assert_eq!(summaries.len(), 1);

    let book_dir = dir.path().join("books").join("field-guide");
    for file in [
        "index.tex",
        "cover.tex",
        "acronyms.tex",
        "glossary.tex",
        "solutions.tex",
        "assets_map.yml",
        "mkbook.cls",
        "pages/preface.tex",
        "pages/basics.tex",
    ] {
        assert!(book_dir.join(file).is_file(), "missing {}", file);
    }

    let index = fs::read_to_string(book_dir.join("index.tex")).unwrap();
    assert!(index.contains(r"\title{Field Guide}"));
    assert!(index.contains(r"\author{Jane Doe}"));
    assert!(index.contains(r"\date{2024}"));
    let front = index.find(r"\input{pages/preface.tex} % Preface").unwrap();
    let main = index.find(r"\mainmatter").unwrap();
    let basics = index.find(r"\input{pages/basics.tex} % Basics").unwrap();
    assert!(front < main && main < basics);

    let basics = fs::read_to_string(book_dir.join("pages/basics.tex")).unwrap();
    assert!(basics.contains(r"\section{Basics}"));
    assert!(basics.contains(r"\emph{HTML}"));
    assert!(!basics.contains("*[HTML]"));
    assert!(basics.contains(r"\ref{solution:1}"));

    assert!(book_dir.join("assets").join("img-flow.png").is_file());
    let assets = fs::read_to_string(book_dir.join("assets_map.yml")).unwrap();
    assert!(assets.contains("img-flow.png: img/flow.png"));

    let acronyms = fs::read_to_string(book_dir.join("acronyms.tex")).unwrap();
    assert!(acronyms.contains(r"\item[HTML] Hyper Text Markup Language"));
    let glossary = fs::read_to_string(book_dir.join("glossary.tex")).unwrap();
    assert!(glossary.contains(r"\item[Node] an element of the tree"));
    let solutions = fs::read_to_string(book_dir.join("solutions.tex")).unwrap();
    assert!(solutions.contains("Count the leaves."));

    let cover = fs::read_to_string(book_dir.join("cover.tex")).unwrap();
    assert!(cover.contains(r"{\color{black}\Huge"));
}

#[test]
fn test_missing_image_names_the_page() {
    let dir = project();
    fs::remove_file(dir.path().join("docs/img/flow.png")).unwrap();
    let config = Config::from_file(dir.path().join("mkbook.yml")).unwrap();
    let tree = load_nav(&config).unwrap();
    let backend = LatexBackend::new();

    let err = BookDriver::new(&backend, config.docs_dir())
        .run(&tree, config.book_definitions(&tree), true)
        .unwrap_err();
    let message = err.to_string();
    assert!(message.contains("basics.md"), "{}", message);
}

#[test]
fn test_default_book_keeps_index_page_and_document_apart() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(root, "mkbook.yml", "site:\n  name: Docs\n");
    write(root, "docs/index.md", "# Welcome\n\nHello world\n");
    write(root, "docs/guide/a.md", "# A\n");

    let config = Config::from_file(root.join("mkbook.yml")).unwrap();
    let tree = load_nav(&config).unwrap();
    let backend = LatexBackend::new();
    BookDriver::new(&backend, config.docs_dir())
        .run(&tree, config.book_definitions(&tree), true)
        .unwrap();

    let book_dir = root.join("books").join("docs");
    let page = fs::read_to_string(book_dir.join("pages/index.tex")).unwrap();
    assert!(page.contains("Hello world"));

    let index = fs::read_to_string(book_dir.join("index.tex")).unwrap();
    assert!(index.contains(r"\input{pages/index.tex} % Welcome"));
    assert!(!index.contains(r"\input{index.tex}"));
}
