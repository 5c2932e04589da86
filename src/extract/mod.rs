//! Turns ALTO, PAGE and plain text files into full text plus located items.

use std::fs;
use std::path::Path;

use roxmltree::{Document, ParsingOptions};
use serde::Serialize;

use crate::error::{EvalError, EvalResult};
use crate::geometry::join_items;
use crate::model::{Granularity, TextItem};

mod alto;
mod page;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceFormat {
    Alto,
    Page,
    PlainText,
}

impl SourceFormat {
    /// Picks a format from the name of the root element. Content that does
    /// not start with markup is plain text.
    pub fn sniff(content: &str) -> Option<Self> {
        let content = content.trim_start_matches('\u{feff}').trim_start();
        if !content.starts_with('<') {
            return Some(Self::PlainText);
        }
        match root_element_name(content) {
            Some("alto") => Some(Self::Alto),
            Some("PcGts") => Some(Self::Page),
            _ if content.starts_with("<?xml") => None,
            _ => Some(Self::PlainText),
        }
    }

    fn reader(self) -> &'static dyn FormatReader {
        match self {
            Self::Alto => &alto::AltoReader,
            Self::Page => &page::PageReader,
            Self::PlainText => &PlainTextReader,
        }
    }
}

/// Local name of the first start tag, past any XML declaration, processing
/// instructions, comments and DOCTYPE (including an internal subset).
fn root_element_name(content: &str) -> Option<&str> {
    let mut rest = content;
    loop {
        rest = rest.trim_start();
        if let Some(after) = rest.strip_prefix("<?") {
            rest = &after[after.find("?>")? + 2..];
        } else if let Some(after) = rest.strip_prefix("<!--") {
            rest = &after[after.find("-->")? + 3..];
        } else if let Some(after) = rest.strip_prefix("<!") {
            rest = skip_declaration(after)?;
        } else if let Some(after) = rest.strip_prefix('<') {
            let end = after
                .find(|c: char| c.is_whitespace() || c == '>' || c == '/')
                .unwrap_or(after.len());
            let name = &after[..end];
            return name.rsplit(':').next();
        } else {
            return None;
        }
    }
}

fn skip_declaration(declaration: &str) -> Option<&str> {
    let mut depth = 0usize;
    for (index, ch) in declaration.char_indices() {
        match ch {
            '[' => depth += 1,
            ']' => depth = depth.saturating_sub(1),
            '>' if depth == 0 => return Some(&declaration[index + 1..]),
            _ => {}
        }
    }
    None
}

#[derive(Debug, Clone, Serialize)]
pub struct ExtractedDocument {
    pub format: SourceFormat,
    pub text: String,
    /// `None` when the source format records no geometry at all.
    pub items: Option<Vec<TextItem>>,
}

impl ExtractedDocument {
    fn from_items(format: SourceFormat, items: Vec<TextItem>) -> Self {
        Self {
            format,
            text: join_items(&items),
            items: Some(items),
        }
    }

    /// One token per structural word when the source is tokenized at word
    /// level, `None` when tokens have to come from whitespace splitting.
    pub fn structural_tokens(&self) -> Option<Vec<String>> {
        structural_tokens(self.items.as_deref()?)
    }
}

pub fn structural_tokens(items: &[TextItem]) -> Option<Vec<String>> {
    if items.is_empty() || items.iter().any(|item| item.granularity != Granularity::Word) {
        return None;
    }
    Some(
        items
            .iter()
            .filter(|item| !item.text.trim().is_empty())
            .map(|item| item.text.trim().to_string())
            .collect(),
    )
}

/// Parsing of one concrete source format.
trait FormatReader: Sync {
    fn read(&self, path: &Path, content: &str) -> EvalResult<ExtractedDocument>;
}

/// Capability used by the evaluation runner to read both sides of a pair.
pub trait DocumentExtractor: Sync {
    fn extract(&self, path: &Path) -> EvalResult<ExtractedDocument>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct FileExtractor;

impl DocumentExtractor for FileExtractor {
    fn extract(&self, path: &Path) -> EvalResult<ExtractedDocument> {
        let raw = fs::read(path).map_err(|source| EvalError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let content = String::from_utf8(raw).map_err(|err| EvalError::Extraction {
            path: path.to_path_buf(),
            reason: format!("not valid UTF-8: {err}"),
        })?;
        extract_from_str(path, &content)
    }
}

pub fn extract_from_str(path: &Path, content: &str) -> EvalResult<ExtractedDocument> {
    let format = SourceFormat::sniff(content).ok_or_else(|| EvalError::Extraction {
        path: path.to_path_buf(),
        reason: "XML document is neither ALTO nor PAGE".to_string(),
    })?;
    format.reader().read(path, content)
}

struct PlainTextReader;

impl FormatReader for PlainTextReader {
    fn read(&self, _path: &Path, content: &str) -> EvalResult<ExtractedDocument> {
        let text = content.trim_start_matches('\u{feff}').to_string();
        Ok(ExtractedDocument {
            format: SourceFormat::PlainText,
            text,
            items: None,
        })
    }
}

fn parse_xml<'input>(path: &Path, content: &'input str) -> EvalResult<Document<'input>> {
    let mut options = ParsingOptions::default();
    options.allow_dtd = true;
    Document::parse_with_options(content, options).map_err(|err| EvalError::Extraction {
        path: path.to_path_buf(),
        reason: err.to_string(),
    })
}
