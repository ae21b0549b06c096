//! One editor session: resolve, look up, select, jump, and replay history.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::history::{JumpHistory, NavigationSink};
use crate::lookup::{LookupReport, LookupTool, find_tags};
use crate::model::{GotoOutcome, JumpPosition, MatchRecord};
use crate::resolve::{IndexResolver, Workspace};
use crate::select::{Chooser, select};
use crate::text::line_start_offset;

/// The host editor as seen from a navigation request.
pub trait Editor: NavigationSink {
    /// Path of the active buffer, `None` for unsaved buffers.
    fn current_file(&self) -> Option<PathBuf>;
    fn caret_offset(&self) -> u64;
    /// Identifier at `offset` in the active buffer.
    fn word_at(&self, offset: u64) -> Option<String>;

    fn notify(&mut self, message: &str) {
        info!("{message}");
    }

    fn current_position(&self) -> Option<JumpPosition> {
        self.current_file()
            .map(|file| JumpPosition::new(file, self.caret_offset()))
    }
}

pub struct Navigator<W, T> {
    resolver: IndexResolver<W>,
    tool: T,
    history: JumpHistory,
}

impl<W, T> Navigator<W, T>
where
    W: Workspace,
    T: LookupTool,
{
    pub fn new(resolver: IndexResolver<W>, tool: T) -> Self {
        Self {
            resolver,
            tool,
            history: JumpHistory::new(),
        }
    }

    pub fn history(&self) -> &JumpHistory {
        &self.history
    }

    pub fn resolve(&self, current_file: Option<&Path>) -> Vec<PathBuf> {
        self.resolver.resolve(current_file)
    }

    /// Matches for `tag` from every index applicable to `current_file`.
    pub fn find(&self, tag: &str, current_file: Option<&Path>) -> LookupReport {
        let sources = self.resolve(current_file);
        find_tags(&self.tool, tag, &sources)
    }

    /// Jump to the definition of `tag`, or of the word under the caret when
    /// no tag is given.
    pub fn goto_tag<E, C>(&mut self, editor: &mut E, chooser: &mut C, tag: Option<&str>) -> GotoOutcome
    where
        E: Editor + ?Sized,
        C: Chooser + ?Sized,
    {
        let tag = match tag.map(str::trim).filter(|t| !t.is_empty()) {
            Some(tag) => tag.to_owned(),
            None => match editor.word_at(editor.caret_offset()) {
                Some(word) if !word.is_empty() => word,
                _ => return GotoOutcome::NoTag,
            },
        };

        let current_file = editor.current_file();
        let sources = self.resolve(current_file.as_deref());
        if sources.is_empty() {
            return GotoOutcome::NoIndex;
        }

        let report = find_tags(&self.tool, &tag, &sources);
        if report.all_failed() {
            editor.notify(&format!(
                "cscope lookup failed for all {} index file(s)",
                report.queried
            ));
        }
        if report.matches.is_empty() {
            return GotoOutcome::NoMatches;
        }

        let Some(chosen) = select(report.matches, chooser) else {
            return GotoOutcome::Cancelled;
        };

        let target = position_of(&chosen);
        let departure = editor.current_position();
        self.history
            .record_and_jump(target.clone(), departure, editor);
        GotoOutcome::Jumped(target)
    }

    pub fn back<E>(&mut self, editor: &mut E) -> Option<JumpPosition>
    where
        E: Editor + ?Sized,
    {
        self.history.back(editor).cloned()
    }

    pub fn forward<E>(&mut self, editor: &mut E) -> Option<JumpPosition>
    where
        E: Editor + ?Sized,
    {
        self.history.forward(editor).cloned()
    }
}

/// Start of the matched line. Falls back to the top of the file when the
/// line can not be located.
pub fn position_of(record: &MatchRecord) -> JumpPosition {
    let offset = match line_start_offset(&record.file_path, record.line_number) {
        Ok(Some(offset)) => offset,
        Ok(None) => {
            warn!(
                "position_of: line {} is past the end of {}",
                record.line_number,
                record.file_path.display()
            );
            0
        }
        Err(err) => {
            warn!(
                "position_of: failed to read {}: {err}",
                record.file_path.display()
            );
            0
        }
    };
    JumpPosition::new(record.file_path.clone(), offset)
}
