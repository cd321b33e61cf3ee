// Front matter extraction - markdown files carry a YAML header between
// `---` delimiters, followed by the markdown body.

use crate::error::{GranaryError, Result};
use serde_yaml::{Mapping, Value};

const DELIMITER: &str = "---";

/// The field the markdown body is folded into.
pub const BODY_FIELD: &str = "body";

/// Convert markdown-with-front-matter into the same document shape a plain
/// YAML file produces: the front matter fields, plus the body (if any) under
/// the `body` field. A file without a front matter header is all body.
pub fn to_document(text: &str) -> Result<Value> {
    let (front, body) = split_front_matter(text)?;

    let mut document: Value = if front.is_empty() {
        Value::Mapping(Mapping::new())
    } else {
        serde_yaml::from_str(&front)?
    };
    if document.is_null() {
        document = Value::Mapping(Mapping::new());
    }

    let mapping = document.as_mapping_mut().ok_or_else(|| {
        GranaryError::Other("front matter must be a YAML mapping".into())
    })?;

    let body = body.trim();
    if !body.is_empty() {
        mapping.insert(
            Value::String(BODY_FIELD.into()),
            Value::String(body.to_string()),
        );
    }

    Ok(document)
}

/// Split a markdown file into (front matter, body). The front matter block
/// must open on the first line and close with a matching delimiter;
/// an unterminated block is an error.
fn split_front_matter(text: &str) -> Result<(String, String)> {
    let mut lines = text.lines();

    match lines.next() {
        Some(line) if line.trim_end() == DELIMITER => {}
        // No header at all: the whole file is body
        _ => return Ok((String::new(), text.to_string())),
    }

    let mut front = String::new();
    let mut closed = false;
    for line in lines.by_ref() {
        if line.trim_end() == DELIMITER {
            closed = true;
            break;
        }
        front.push_str(line);
        front.push('\n');
    }

    if !closed {
        return Err(GranaryError::Other(
            "unterminated front matter: missing closing '---'".into(),
        ));
    }

    let mut body = String::new();
    for line in lines {
        body.push_str(line);
        body.push('\n');
    }

    Ok((front, body))
}
