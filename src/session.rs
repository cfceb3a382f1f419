use std::{
    fs,
    ops::Range,
    path::{Path, PathBuf},
};

use tracing::{debug, info, warn};

use crate::document::{Document, DocumentError, DocumentFormat, save_document};
use crate::normalize::FlatText;
use crate::replace::{ReplaceError, Replacement, Replacer};
use crate::translate::{Language, Translator};

pub struct Session {
    source: PathBuf,
    format: DocumentFormat,
    original: Document,
    translated: Document,
    original_flat: FlatText,
    replacer: Replacer,
    translator: Box<dyn Translator>,
    target: Language,
    dirty: bool,
}

impl Session {
    pub fn open(
        path: &Path,
        translator: Box<dyn Translator>,
        target: Language,
    ) -> Result<Self, DocumentError> {
        let bytes = read_source(path)?;
        Self::from_bytes(path, &bytes, translator, target)
    }

    /// Builds a session from document bytes already in memory. `path` decides
    /// the format and the default output location.
    pub fn from_bytes(
        path: &Path,
        bytes: &[u8],
        translator: Box<dyn Translator>,
        target: Language,
    ) -> Result<Self, DocumentError> {
        let format = DocumentFormat::from_path(path);
        let original = Document::parse(bytes, format)?;
        let translated = Document::parse(bytes, format)?;
        let original_flat = FlatText::new(original.paragraph_texts());
        info!(
            path = %path.display(),
            %format,
            paragraphs = original.len(),
            "opened document"
        );

        Ok(Self {
            source: path.to_path_buf(),
            format,
            original,
            translated,
            original_flat,
            replacer: Replacer::new(),
            translator,
            target,
            dirty: false,
        })
    }

    /// Reads the source file again and discards every replacement.
    pub fn reload(&mut self) -> Result<(), DocumentError> {
        let bytes = read_source(&self.source)?;
        self.original = Document::parse(&bytes, self.format)?;
        self.translated = Document::parse(&bytes, self.format)?;
        self.original_flat = FlatText::new(self.original.paragraph_texts());
        self.replacer.reset();
        self.dirty = false;
        info!(path = %self.source.display(), "reloaded document");
        Ok(())
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn original(&self) -> &Document {
        &self.original
    }

    pub fn translated(&self) -> &Document {
        &self.translated
    }

    /// Normalized text of the original, the space selections are made in.
    pub fn original_flat(&self) -> &FlatText {
        &self.original_flat
    }

    pub fn selected_text(&self, range: Range<usize>) -> String {
        self.original_flat.slice(range.start, range.end).to_string()
    }

    pub fn target(&self) -> Language {
        self.target
    }

    pub fn set_target(&mut self, language: Language) {
        debug!(language = language.code, "switched target language");
        self.target = language;
    }

    pub fn translator_name(&self) -> &str {
        self.translator.name()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn replacer(&self) -> &Replacer {
        &self.replacer
    }

    /// Translates `selected` and writes the result into the working copy.
    pub fn translate_selection(&mut self, selected: &str) -> Result<Replacement, ReplaceError> {
        let translator = &self.translator;
        let target = self.target.code;
        let result = self
            .replacer
            .replace(&mut self.translated, selected, |text| {
                translator.translate(text, target)
            });

        match &result {
            Ok(replacement) => {
                self.dirty = true;
                debug!(splices = ?replacement.splices, "spliced working copy");
                info!(
                    strategy = replacement.strategy.label(),
                    paragraphs = ?replacement.paragraphs,
                    language = target,
                    "replaced selection"
                );
            }
            Err(ReplaceError::EmptySelection) => debug!("ignored blank selection"),
            Err(ReplaceError::SegmentNotFound) => {
                warn!(selection = %selected.trim(), "selection not found in working copy")
            }
            Err(err @ ReplaceError::Transform {
                applied_fragments, ..
            }) => {
                if *applied_fragments > 0 {
                    self.dirty = true;
                }
                warn!(%err, "translation failed");
            }
        }
        result
    }

    pub fn save_translation(&mut self, path: &Path) -> Result<DocumentFormat, DocumentError> {
        let format = save_document(&self.translated, path)?;
        self.dirty = false;
        info!(path = %path.display(), %format, "saved translation");
        Ok(format)
    }

    /// `<stem>.<language>.<ext>` next to the source file.
    pub fn default_output_path(&self) -> PathBuf {
        output_path_for(&self.source, self.format, self.target)
    }
}

pub fn output_path_for(source: &Path, format: DocumentFormat, target: Language) -> PathBuf {
    let stem = source
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("document");
    let ext = source
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or(match format {
            DocumentFormat::Ftml => "ftml",
            DocumentFormat::Markdown => "md",
        });
    source.with_file_name(format!("{stem}.{}.{ext}", target.code))
}

fn read_source(path: &Path) -> Result<Vec<u8>, DocumentError> {
    fs::read(path).map_err(|source| DocumentError::Read {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod session_tests;
