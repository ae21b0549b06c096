use std::path::{Path, PathBuf};

use cscope_nav_core::{Editor, NavigationSink, read_text_file, word_at};
use tracing::{info, warn};

/// Editor state reported by a client: the file it has open and the caret
/// offset. Navigation instructions update that state in place.
#[derive(Debug, Clone, Default)]
pub struct ReportedEditor {
    file: Option<PathBuf>,
    offset: u64,
    notices: Vec<String>,
}

impl ReportedEditor {
    pub fn new(file: Option<PathBuf>, offset: u64) -> Self {
        Self {
            file,
            offset,
            notices: Vec::new(),
        }
    }

    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn take_notices(&mut self) -> Vec<String> {
        std::mem::take(&mut self.notices)
    }
}

impl NavigationSink for ReportedEditor {
    fn open_file(&mut self, path: &Path) {
        self.file = Some(path.to_path_buf());
    }

    fn goto_offset(&mut self, offset: u64) {
        self.offset = offset;
    }
}

impl Editor for ReportedEditor {
    fn current_file(&self) -> Option<PathBuf> {
        self.file.clone()
    }

    fn caret_offset(&self) -> u64 {
        self.offset
    }

    fn word_at(&self, offset: u64) -> Option<String> {
        let file = self.file.as_deref()?;
        let text = match read_text_file(file) {
            Ok(Some(text)) => text,
            Ok(None) => return None,
            Err(err) => {
                warn!("word_at: failed to read {}: {err}", file.display());
                return None;
            }
        };
        let offset = usize::try_from(offset).unwrap_or(usize::MAX);
        word_at(&text, offset).map(str::to_owned)
    }

    fn notify(&mut self, message: &str) {
        info!("{message}");
        self.notices.push(message.to_owned());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_comes_from_file_on_disk() -> std::io::Result<()> {
        let dir = tempfile::tempdir()?;
        let file = dir.path().join("a.c");
        std::fs::write(&file, "int main(void) { return helper(); }\n")?;

        let editor = ReportedEditor::new(Some(file), 26);
        assert_eq!(editor.word_at(26).as_deref(), Some("helper"));
        assert_eq!(editor.word_at(3), Some("int".to_owned()));
        assert_eq!(ReportedEditor::default().word_at(0), None);
        Ok(())
    }

    #[test]
    fn moves_update_reported_state() {
        let mut editor = ReportedEditor::new(None, 5);
        assert_eq!(editor.current_position(), None);
        editor.open_file(Path::new("/x.c"));
        editor.goto_offset(12);
        assert_eq!(editor.file(), Some(Path::new("/x.c")));
        assert_eq!(editor.offset(), 12);
        editor.notify("hello");
        assert_eq!(editor.take_notices(), vec!["hello"]);
        assert!(editor.take_notices().is_empty());
    }
}
