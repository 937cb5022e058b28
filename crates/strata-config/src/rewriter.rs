//! Block Rewriter
//!
//! Inserts, replaces and removes a single named top-level block in the raw
//! text of a project `.strata` file. The document is never parsed and
//! re-serialized, so comments, key order and formatting of everything outside
//! the targeted block survive untouched.
//!
//! A block starts at a line matching `^<key>:` and runs up to, but not
//! including, the next line that begins with a non-whitespace character, or
//! to the end of the file:
//!
//! ```text
//! server: http://localhost:3030   <- not part of the block
//! warehouse:                      <- block start
//!   username: alice               <- block
//!
//!   password: secret              <- block (blank line above too)
//! # trailing comment              <- block end (column 0)
//! ```

use crate::{ConfigError, ConfigResult};
use indexmap::IndexMap;
use regex::Regex;
use serde_yaml::Value;
use std::borrow::Cow;
use std::ops::Range;
use std::path::{Path, PathBuf};

/// Ordered field name -> value pairs written into a block
pub type FieldMap = IndexMap<String, String>;

/// Rewrites named blocks of one configuration file
#[derive(Debug, Clone)]
pub struct BlockRewriter {
    path: PathBuf,
}

impl BlockRewriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace (or add) the block for `key` with `fields`.
    ///
    /// A missing file is treated as empty and created.
    pub fn replace(&self, key: &str, fields: &FieldMap) -> ConfigResult<()> {
        let original = self.read()?;
        let updated = replace_block(&original, key, fields)?;
        std::fs::write(&self.path, updated)?;
        tracing::debug!(path = %self.path.display(), key, "replaced block");
        Ok(())
    }

    /// Remove the block for `key`. Returns whether a block was found.
    pub fn remove(&self, key: &str) -> ConfigResult<bool> {
        let original = self.read()?;
        let (updated, removed) = remove_block(&original, key)?;
        if removed {
            std::fs::write(&self.path, updated)?;
            tracing::debug!(path = %self.path.display(), key, "removed block");
        }
        Ok(removed)
    }

    fn read(&self) -> ConfigResult<String> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(ConfigError::IoError(e)),
        }
    }
}

/// Byte range of the first block named `key`, if any
pub fn find_block(text: &str, key: &str) -> ConfigResult<Option<Range<usize>>> {
    let header = header_pattern(key)?;

    let mut offset = 0;
    let mut start = None;
    for line in text.split_inclusive('\n') {
        match start {
            None if header.is_match(line) => start = Some(offset),
            Some(begin) if line.starts_with(|c: char| !c.is_whitespace()) => {
                return Ok(Some(begin..offset));
            }
            _ => {}
        }
        offset += line.len();
    }

    Ok(start.map(|begin| begin..text.len()))
}

/// Remove every block named `key`. Returns the new text and whether anything
/// was removed.
pub fn remove_block(text: &str, key: &str) -> ConfigResult<(String, bool)> {
    let mut out = text.to_string();
    let mut removed = false;
    while let Some(span) = find_block(&out, key)? {
        out.replace_range(span, "");
        removed = true;
    }
    Ok((out, removed))
}

/// Remove any block named `key` and append a fresh one holding `fields`
pub fn replace_block(text: &str, key: &str, fields: &FieldMap) -> ConfigResult<String> {
    let (mut out, _) = remove_block(text, key)?;
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
    out.push_str(&render_block(key, fields));
    Ok(out)
}

/// Render a block: `key:` followed by one indented line per non-blank field
pub fn render_block(key: &str, fields: &FieldMap) -> String {
    let mut block = format!("{}:\n", key);
    for (field, value) in fields {
        if value.trim().is_empty() {
            continue;
        }
        block.push_str(&format!("  {}: {}\n", field, yaml_scalar(value)));
    }
    block
}

fn header_pattern(key: &str) -> ConfigResult<Regex> {
    if key.is_empty() || key.contains(['\n', '\r']) || key.starts_with(char::is_whitespace) {
        return Err(ConfigError::InvalidKey(key.to_string()));
    }
    Regex::new(&format!("^{}:", regex::escape(key)))
        .map_err(|_| ConfigError::InvalidKey(key.to_string()))
}

/// Quote a value when writing it plain would break the document or read back
/// as something other than the same string (`123456`, `null`, `~`, `true`,
/// `0x1F`, `.inf`).
fn yaml_scalar(value: &str) -> Cow<'_, str> {
    if needs_quoting(value) {
        Cow::Owned(double_quoted(value))
    } else {
        Cow::Borrowed(value)
    }
}

fn needs_quoting(value: &str) -> bool {
    const INDICATORS: &[char] = &[
        '-', '?', ':', ',', '[', ']', '{', '}', '#', '&', '*', '!', '|', '>', '\'', '"', '%',
        '@', '`',
    ];

    value != value.trim()
        || value.starts_with(INDICATORS)
        || value.ends_with(':')
        || value.contains(": ")
        || value.contains(" #")
        || value.chars().any(char::is_control)
        || !reads_back_as_string(value)
}

fn reads_back_as_string(value: &str) -> bool {
    matches!(serde_yaml::from_str::<Value>(value), Ok(Value::String(s)) if s == value)
}

fn double_quoted(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push_str(&format!("\\u{:04X}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
