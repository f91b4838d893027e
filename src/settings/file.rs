//! The config file format.
//!
//! One `key = value` pair per line. Blank lines and lines starting with `#` or `;` are ignored.
//! Bytes that would not survive the format (control characters, non-ASCII, `%`, and `=` or
//! comment markers in keys) are written as `%XX`.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::io;
use std::path::Path;

use thiserror::Error;

use crate::fs::path_ext::PathExt;

/// Name of the config file inside the config directory of an application.
pub const CONFIG_FILE_NAME: &str = "config.ini";

const COMMENT_MARKERS: [char; 2] = ['#', ';'];

/// A line that does not follow the config file format.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("line {line}: expected `key = value`")]
    MissingSeparator { line: usize },

    #[error("line {line}: empty key")]
    EmptyKey { line: usize },

    #[error("line {line}: invalid `%` escape")]
    InvalidEscape { line: usize },
}

/// Contents of one config file, with keys and values unescaped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigFile {
    entries: BTreeMap<String, String>,
}

/// Escape `data` so it can be stored in a config file.
///
/// Characters in `extra` are escaped as well, and so are spaces at either end, which would
/// otherwise be trimmed away when reading.
pub fn escape(data: &str, extra: &[char]) -> String {
    let last = data.chars().count().saturating_sub(1);
    let mut out = String::with_capacity(data.len());
    for (i, c) in data.chars().enumerate() {
        let edge_space = c == ' ' && (i == 0 || i == last);
        if c.is_ascii_control() || !c.is_ascii() || c == '%' || edge_space || extra.contains(&c) {
            let mut buf = [0; 4];
            for byte in c.encode_utf8(&mut buf).bytes() {
                let _ = write!(out, "%{byte:02X}");
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Reverse of [`escape`]. [`None`] if an escape is malformed, or the bytes are not UTF-8.
pub fn unescape(data: &str) -> Option<String> {
    let bytes = data.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = data.get(i + 1..i + 3)?;
            if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
                return None;
            }
            out.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).ok()
}

impl ConfigFile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse config file `text`. When a key is repeated, the first value is kept.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let mut entries = BTreeMap::new();
        for (index, line) in text.lines().enumerate() {
            let line_no = index + 1;
            let line = line.trim();
            if line.is_empty() || line.starts_with(COMMENT_MARKERS) {
                continue;
            }
            let (key, value) = line
                .split_once('=')
                .ok_or(ParseError::MissingSeparator { line: line_no })?;
            let key = unescape(key.trim()).ok_or(ParseError::InvalidEscape { line: line_no })?;
            if key.is_empty() {
                return Err(ParseError::EmptyKey { line: line_no });
            }
            let value =
                unescape(value.trim()).ok_or(ParseError::InvalidEscape { line: line_no })?;
            entries.entry(key).or_insert(value);
        }
        Ok(Self { entries })
    }

    /// Read and parse the file at `path`. A missing file is [`None`].
    pub fn read(path: &Path) -> io::Result<Option<Result<Self, ParseError>>> {
        Ok(path.read_if_exists()?.map(|text| Self::parse(&text)))
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries, sorted by key.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Text of the file, sorted by key.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (key, value) in &self.entries {
            let mut key_extra = vec!['='];
            if key.starts_with(COMMENT_MARKERS) {
                key_extra.extend(COMMENT_MARKERS);
            }
            let _ = writeln!(out, "{} = {}", escape(key, &key_extra), escape(value, &[]));
        }
        out
    }

    /// Write [`ConfigFile::render`] into `path`, creating its parent directories.
    pub fn write(&self, path: &Path) -> io::Result<()> {
        path.write_creating_parents(self.render())
    }
}
