//! Parser for cscope's line-oriented (`-L`) output.
//!
//! Every line carries four space-separated fields: `kind path line text...`.
//! The trailing text is the raw source line and may itself contain spaces.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;

use crate::model::MatchRecord;

static LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\S+)\s+(\S+)\s+(\d+)(?:\s(.*))?$").expect("cscope line pattern is valid")
});

static ROOTED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[A-Za-z]:)?[/\\]").expect("rooted path pattern is valid"));

/// Parse one output line produced for `index`. Returns `None` for lines that
/// do not follow the four-field grammar.
pub fn parse_line(line: &str, index: &Path) -> Option<MatchRecord> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    let caps = LINE_RE.captures(line)?;

    let line_number: u32 = caps[3].parse().ok()?;
    if line_number == 0 {
        return None;
    }

    Some(MatchRecord {
        kind: caps[1].to_owned(),
        file_path: rebase_path(&caps[2], index),
        line_number,
        line_text: caps.get(4).map(|m| m.as_str()).unwrap_or_default().to_owned(),
    })
}

/// Parse every line of one invocation's output, skipping malformed lines.
pub fn parse_output<I, S>(lines: I, index: &Path) -> Vec<MatchRecord>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut records = Vec::new();
    for line in lines {
        let line = line.as_ref();
        if line.trim().is_empty() {
            continue;
        }
        match parse_line(line, index) {
            Some(record) => records.push(record),
            None => warn!(
                "parse_output: skipping malformed line from {}: {line:?}",
                index.display()
            ),
        }
    }
    records
}

/// True when `path` starts with a separator, optionally after a drive letter.
pub fn is_rooted(path: &str) -> bool {
    ROOTED_RE.is_match(path)
}

/// Relative paths in the tool's output are relative to the index file's directory.
pub fn rebase_path(path: &str, index: &Path) -> PathBuf {
    if is_rooted(path) {
        return PathBuf::from(path);
    }
    match index.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.join(path),
        _ => PathBuf::from(path),
    }
}
