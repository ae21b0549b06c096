//! Picking exactly one match out of many.

use tracing::debug;

use crate::model::{Choice, MatchRecord};

pub const COLUMNS: [&str; 4] = ["Kind", "File", "Line", "Text"];

/// Rows are filtered by file path by default.
pub const DEFAULT_SEARCH_COLUMN: usize = 1;

/// Selection UI collaborator.
pub trait Chooser {
    fn choose_one(
        &mut self,
        columns: &[&str],
        rows: &[Vec<String>],
        default_search_column: usize,
    ) -> Choice;
}

/// Chooser with a fixed answer, for callers that already know the choice.
/// Remembers the rows it was offered so they can be shown later.
#[derive(Debug, Clone, Default)]
pub struct PresetChooser {
    choice: Option<usize>,
    offered: Option<Vec<Vec<String>>>,
}

impl PresetChooser {
    pub fn new(choice: Option<usize>) -> Self {
        Self {
            choice,
            offered: None,
        }
    }

    /// Whether the chooser was consulted at all.
    pub fn was_asked(&self) -> bool {
        self.offered.is_some()
    }

    pub fn offered(&self) -> &[Vec<String>] {
        self.offered.as_deref().unwrap_or_default()
    }
}

impl Chooser for PresetChooser {
    fn choose_one(&mut self, _columns: &[&str], rows: &[Vec<String>], _default: usize) -> Choice {
        self.offered = Some(rows.to_vec());
        match self.choice {
            Some(index) => Choice::Selected(index),
            None => Choice::Cancelled,
        }
    }
}

/// Zero matches cancel, a single match is taken as is, anything more goes
/// through the chooser.
pub fn select<C>(mut matches: Vec<MatchRecord>, chooser: &mut C) -> Option<MatchRecord>
where
    C: Chooser + ?Sized,
{
    match matches.len() {
        0 => None,
        1 => matches.pop(),
        n => {
            let rows: Vec<Vec<String>> = matches.iter().map(MatchRecord::to_row).collect();
            match chooser.choose_one(&COLUMNS, &rows, DEFAULT_SEARCH_COLUMN) {
                Choice::Selected(index) if index < n => Some(matches.swap_remove(index)),
                Choice::Selected(index) => {
                    debug!("select: chooser returned out-of-range row {index} of {n}");
                    None
                }
                Choice::Cancelled => None,
            }
        }
    }
}
