//! Front-matter codec for post files.
//!
//! Every post is a two-part text document: an optional YAML header block
//! delimited by `---` lines, followed by a free-text (markdown) body.
//!
//! ```text
//! ---
//! title: Hello World
//! date: 2024-05-01T10:00:00.000Z
//! tags:
//! - rust
//! categories: []
//! ---
//! Body text starts here.
//! ```
//!
//! ## Parsing rules
//!
//! - The header is recognised only when the very first line is exactly `---`.
//!   Anything else (including `----` or leading blank lines) makes the whole
//!   file the body, with empty metadata.
//! - The header ends at the next line that is exactly `---` (trailing
//!   whitespace tolerated). The body is everything after that line's newline.
//! - A header that is opened but never closed is an error, as is a header that
//!   is not valid YAML or does not decode to a mapping.
//!
//! Keys keep their document order through parse and serialize, so unknown
//! fields written by other tools survive an edit untouched.

use serde_yaml::{Mapping, Value};
use thiserror::Error;

/// Line that opens and closes the header block.
pub const MARKER: &str = "---";

#[derive(Error, Debug)]
pub enum FrontMatterError {
    #[error("header block opened with `---` is never closed")]
    Unterminated,
    #[error("header block is not valid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("header block must be a mapping of fields, found {0}")]
    NotAMapping(&'static str),
}

/// A decoded post: header fields plus body text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    pub metadata: Mapping,
    pub body: String,
}

/// Split `raw` into header metadata and body.
pub fn parse(raw: &str) -> Result<Document, FrontMatterError> {
    let Some(after_open) = strip_open_marker(raw) else {
        return Ok(Document {
            metadata: Mapping::new(),
            body: raw.to_string(),
        });
    };

    let mut offset = 0;
    for line in after_open.split_inclusive('\n') {
        if line.trim_end() == MARKER {
            let header = &after_open[..offset];
            let body = &after_open[offset + line.len()..];
            return Ok(Document {
                metadata: decode_header(header)?,
                body: body.to_string(),
            });
        }
        offset += line.len();
    }

    Err(FrontMatterError::Unterminated)
}

/// Render metadata and body back into the on-disk format.
///
/// An empty mapping still produces the marker pair, so the file keeps an
/// (empty) header block.
pub fn serialize(metadata: &Mapping, body: &str) -> Result<String, FrontMatterError> {
    let header = if metadata.is_empty() {
        String::new()
    } else {
        serde_yaml::to_string(metadata)?
    };

    let mut out = String::with_capacity(header.len() + body.len() + 8);
    out.push_str(MARKER);
    out.push('\n');
    out.push_str(&header);
    out.push_str(MARKER);
    out.push('\n');
    out.push_str(body);
    Ok(out)
}

/// Return the text after the opening `---` line, if the document has one.
fn strip_open_marker(raw: &str) -> Option<&str> {
    let rest = raw.strip_prefix(MARKER)?;
    if rest.is_empty() {
        return Some(rest);
    }
    rest.strip_prefix("\r\n").or_else(|| rest.strip_prefix('\n'))
}

fn decode_header(header: &str) -> Result<Mapping, FrontMatterError> {
    if header.trim().is_empty() {
        return Ok(Mapping::new());
    }
    match serde_yaml::from_str::<Value>(header)? {
        Value::Mapping(mapping) => Ok(mapping),
        Value::Null => Ok(Mapping::new()),
        Value::Bool(_) => Err(FrontMatterError::NotAMapping("a boolean")),
        Value::Number(_) => Err(FrontMatterError::NotAMapping("a number")),
        Value::String(_) => Err(FrontMatterError::NotAMapping("a string")),
        Value::Sequence(_) => Err(FrontMatterError::NotAMapping("a sequence")),
        Value::Tagged(_) => Err(FrontMatterError::NotAMapping("a tagged value")),
    }
}
