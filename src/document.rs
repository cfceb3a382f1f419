use std::{
    fs,
    io::{self, Cursor},
    path::{Path, PathBuf},
};

use tdoc::{Document as Tree, Paragraph, Span, markdown, parse, writer::Writer};
use thiserror::Error;

mod path;
pub mod runs;

use path::{BlockPath, block_content, block_content_mut, index_blocks};
pub use runs::{char_find, char_slice, char_to_byte_idx, run_texts, run_texts_mut, runs_text};

type BoxedError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("failed to read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse {format} document")]
    Parse {
        format: DocumentFormat,
        #[source]
        source: BoxedError,
    },
    #[error("failed to render {format} document")]
    Render {
        format: DocumentFormat,
        #[source]
        source: BoxedError,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DocumentFormat {
    Ftml,
    Markdown,
}

impl DocumentFormat {
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());
        match ext.as_deref() {
            Some("md") | Some("markdown") | Some("mkd") | Some("mdown") | Some("mdtxt") => {
                DocumentFormat::Markdown
            }
            _ => DocumentFormat::Ftml,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DocumentFormat::Ftml => "FTML",
            DocumentFormat::Markdown => "Markdown",
        }
    }
}

impl std::fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlockKind {
    Text,
    Heading(u8),
    Code,
    ChecklistItem,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListMarker {
    Bullet,
    Number(usize),
    Checkbox(bool),
}

/// Presentation details of a paragraph, derived from its place in the tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockInfo {
    pub kind: BlockKind,
    /// Set only on the first paragraph of a list entry or checklist item.
    pub marker: Option<ListMarker>,
    pub quote_depth: usize,
    pub list_depth: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    tree: Tree,
    blocks: Vec<(BlockPath, BlockInfo)>,
}

impl Document {
    pub fn from_tree(tree: Tree) -> Self {
        let blocks = index_blocks(&tree);
        Self { tree, blocks }
    }

    /// Builds a document of plain text paragraphs, one per span sequence.
    pub fn from_paragraphs(paragraphs: Vec<Vec<Span>>) -> Self {
        let paragraphs = paragraphs
            .into_iter()
            .map(|spans| Paragraph::new_text().with_content(spans))
            .collect();
        Self::from_tree(Tree::new().with_paragraphs(paragraphs))
    }

    pub fn parse(bytes: &[u8], format: DocumentFormat) -> Result<Self, DocumentError> {
        let tree = match format {
            DocumentFormat::Ftml => parse(Cursor::new(bytes)).map_err(|err| DocumentError::Parse {
                format,
                source: Box::new(err),
            })?,
            DocumentFormat::Markdown => {
                markdown::parse(Cursor::new(bytes))
                    .map_err(|source| DocumentError::Parse { format, source })?
            }
        };
        Ok(Self::from_tree(tree))
    }

    pub fn to_bytes(&self, format: DocumentFormat) -> Result<Vec<u8>, DocumentError> {
        match format {
            DocumentFormat::Ftml => {
                let writer = Writer::new();
                let contents = writer
                    .write_to_string(&self.tree)
                    .map_err(|err| DocumentError::Render {
                        format,
                        source: Box::new(err),
                    })?;
                Ok(contents.into_bytes())
            }
            DocumentFormat::Markdown => {
                let mut contents = Vec::new();
                markdown::write(&mut contents, &self.tree).map_err(|err| {
                    DocumentError::Render {
                        format,
                        source: Box::new(err),
                    }
                })?;
                Ok(contents)
            }
        }
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// Number of text paragraphs.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn info(&self, idx: usize) -> Option<BlockInfo> {
        self.blocks.get(idx).map(|(_, info)| *info)
    }

    pub fn runs(&self, idx: usize) -> Option<&[Span]> {
        let (path, _) = self.blocks.get(idx)?;
        block_content(&self.tree, path)
    }

    /// The live run sequence of a paragraph. Callers may rewrite the spans but
    /// the paragraph itself stays in place.
    pub fn runs_mut(&mut self, idx: usize) -> Option<&mut Vec<Span>> {
        let (path, _) = self.blocks.get(idx)?;
        block_content_mut(&mut self.tree, path)
    }

    pub fn paragraph_text(&self, idx: usize) -> Option<String> {
        self.runs(idx).map(runs_text)
    }

    pub fn paragraph_texts(&self) -> Vec<String> {
        (0..self.len())
            .map(|idx| self.paragraph_text(idx).unwrap_or_default())
            .collect()
    }
}

pub fn load_document(path: &Path) -> Result<(Document, DocumentFormat), DocumentError> {
    let format = DocumentFormat::from_path(path);
    let bytes = fs::read(path).map_err(|source| DocumentError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let document = Document::parse(&bytes, format)?;
    Ok((document, format))
}

pub fn save_document(document: &Document, path: &Path) -> Result<DocumentFormat, DocumentError> {
    let format = DocumentFormat::from_path(path);
    let contents = document.to_bytes(format)?;
    fs::write(path, contents).map_err(|source| DocumentError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(format)
}

#[cfg(test)]
#[path = "document_tests.rs"]
mod document_tests;
