use std::fs;

use tandem_tui::document::{Document, DocumentFormat, load_document};
use tandem_tui::replace::Strategy;
use tandem_tui::session::Session;
use tandem_tui::translate::{TranslateError, Translator, language_by_code};
use tdoc::{Document as Tree, InlineStyle, Paragraph, Span};
use tempfile::TempDir;

struct Upper;

impl Translator for Upper {
    fn name(&self) -> &str {
        "upper"
    }

    fn translate_text(&self, text: &str, _target: &str) -> Result<String, TranslateError> {
        Ok(text.to_uppercase())
    }
}

// Styled text sits in the children of a container span, as the FTML parser
// builds it. The writer drops the tag of a styled leaf span.
fn styled_tree() -> Tree {
    let mut bold = Span::new_text("");
    bold.style = InlineStyle::Bold;
    bold.children = vec![Span::new_text("brown")];
    Tree::new().with_paragraphs(vec![
        Paragraph::new_text().with_content(vec![
            Span::new_text("The quick "),
            bold,
            Span::new_text(" fox"),
        ]),
        Paragraph::new_text().with_content(vec![Span::new_text("jumps over the lazy dog")]),
    ])
}

fn has_bold(spans: &[Span], text: &str) -> bool {
    spans.iter().any(|span| {
        let own_text = span.text == text || span.children.iter().any(|child| child.text == text);
        (matches!(span.style, InlineStyle::Bold) && own_text) || has_bold(&span.children, text)
    })
}

#[test]
fn ftml_translation_keeps_the_structure() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("fable.ftml");
    let bytes = Document::from_tree(styled_tree())
        .to_bytes(DocumentFormat::Ftml)
        .unwrap();
    fs::write(&source, bytes).unwrap();

    let german = language_by_code("de").unwrap();
    let mut session = Session::open(&source, Box::new(Upper), german).unwrap();
    let replacement = session.translate_selection("fox jumps").unwrap();
    assert_eq!(replacement.strategy, Strategy::CrossParagraph);

    let output = session.default_output_path();
    assert_eq!(output, dir.path().join("fable.de.ftml"));
    session.save_translation(&output).unwrap();

    let (saved, format) = load_document(&output).unwrap();
    assert_eq!(format, DocumentFormat::Ftml);
    assert_eq!(
        saved.paragraph_texts(),
        vec!["The quick brown FOX", "JUMPS over the lazy dog"]
    );
    assert!(has_bold(saved.runs(0).unwrap(), "brown"));

    let (original, _) = load_document(&source).unwrap();
    assert_eq!(
        original.paragraph_texts(),
        vec!["The quick brown fox", "jumps over the lazy dog"]
    );
    assert!(has_bold(original.runs(0).unwrap(), "brown"));
}

#[test]
fn markdown_selections_accumulate_in_one_session() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("notes.md");
    fs::write(
        &source,
        "# Notes\n\nThe quick brown fox\n\njumps over the lazy dog\n",
    )
    .unwrap();

    let mut session =
        Session::open(&source, Box::new(Upper), language_by_code("fr").unwrap()).unwrap();

    let first = session.translate_selection("quick brown").unwrap();
    assert_eq!(first.strategy, Strategy::Direct);
    let again = session.translate_selection("quick brown").unwrap();
    assert_eq!(again.strategy, Strategy::SegmentMemory);
    assert_eq!(again.paragraphs, vec![1]);
    session.translate_selection("lazy dog").unwrap();

    let output = dir.path().join("out").join("notes.md");
    fs::create_dir_all(output.parent().unwrap()).unwrap();
    session.save_translation(&output).unwrap();

    let (saved, format) = load_document(&output).unwrap();
    assert_eq!(format, DocumentFormat::Markdown);
    assert_eq!(
        saved.paragraph_texts(),
        vec!["Notes", "The QUICK BROWN fox", "jumps over the LAZY DOG"]
    );
}

#[test]
fn reload_discards_unsaved_replacements() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("notes.md");
    fs::write(&source, "alpha beta\n").unwrap();

    let mut session =
        Session::open(&source, Box::new(Upper), language_by_code("es").unwrap()).unwrap();
    session.translate_selection("beta").unwrap();
    assert!(session.is_dirty());

    fs::write(&source, "alpha beta\n\ngamma\n").unwrap();
    session.reload().unwrap();

    assert!(!session.is_dirty());
    assert_eq!(session.translated().paragraph_texts(), vec!["alpha beta", "gamma"]);
    assert_eq!(session.original_flat().as_str(), "alpha beta gamma");
}
