use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// One parsed line of cscope line-oriented output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    /// Location marker emitted by the tool (usually the enclosing function or `<global>`).
    pub kind: String,
    pub file_path: PathBuf,
    pub line_number: u32,
    pub line_text: String,
}

impl MatchRecord {
    /// Row shown by a chooser: kind, file, line number, line text.
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.kind.clone(),
            self.file_path.to_string_lossy().into_owned(),
            self.line_number.to_string(),
            self.line_text.clone(),
        ]
    }
}

/// A file plus an editor offset within it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JumpPosition {
    pub file_path: PathBuf,
    pub offset: u64,
}

impl JumpPosition {
    pub fn new(file_path: impl Into<PathBuf>, offset: u64) -> Self {
        Self {
            file_path: file_path.into(),
            offset,
        }
    }
}

/// Result of a single chooser interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    Cancelled,
    Selected(usize),
}

/// What a navigation request ended up doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GotoOutcome {
    Jumped(JumpPosition),
    NoTag,
    NoIndex,
    NoMatches,
    Cancelled,
}

impl GotoOutcome {
    pub fn status(&self) -> &'static str {
        match self {
            GotoOutcome::Jumped(_) => "jumped",
            GotoOutcome::NoTag => "no_tag",
            GotoOutcome::NoIndex => "no_index",
            GotoOutcome::NoMatches => "no_matches",
            GotoOutcome::Cancelled => "cancelled",
        }
    }
}
