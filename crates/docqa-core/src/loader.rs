use std::fs;
use std::path::Path;

use crate::error::{Error, Result};
use crate::traits::DocumentLoader;
use crate::types::Document;

/// Page break marker emitted by most text extractors (`pdftotext` and friends).
pub const FORM_FEED: char = '\u{0c}';

const PDF_MAGIC: &[u8] = b"%PDF-";

/// Loads plain-text documents; pages are separated by form feeds.
///
/// PDFs and other binary files are rejected with [`Error::InvalidInput`];
/// stray invalid UTF-8 in otherwise textual files is replaced lossily.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextLoader;

impl TextLoader {
    pub fn new() -> Self {
        Self
    }

    fn read_file_content(&self, path: &Path) -> Result<String> {
        let bytes = fs::read(path)?;
        if bytes.starts_with(PDF_MAGIC) {
            return Err(Error::InvalidInput(format!(
                "{} is a PDF; extract its text first (for example with `pdftotext`)",
                path.display()
            )));
        }
        if bytes.contains(&0) {
            return Err(Error::InvalidInput(format!("{} is a binary file, not text", path.display())));
        }
        match String::from_utf8(bytes) {
            Ok(content) => Ok(content),
            Err(e) => Ok(String::from_utf8_lossy(e.as_bytes()).into_owned()),
        }
    }
}

impl DocumentLoader for TextLoader {
    fn load(&self, path: &Path) -> Result<Vec<String>> {
        if !path.exists() {
            return Err(Error::NotFound(path.display().to_string()));
        }
        let content = self.read_file_content(path)?;
        let mut pages: Vec<String> = content.split(FORM_FEED).map(str::to_string).collect();
        // a trailing form feed closes the last page rather than opening an empty one
        if pages.len() > 1 && pages.last().is_some_and(|p| p.trim().is_empty()) {
            pages.pop();
        }
        Ok(pages)
    }
}

/// Loads `path` with `loader` and assembles the pages into one [`Document`].
pub fn load_document(loader: &dyn DocumentLoader, path: &Path) -> Result<Document> {
    let pages = loader.load(path)?;
    Ok(Document::from_pages(path.display().to_string(), &pages))
}
