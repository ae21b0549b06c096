//! Browser-style back/forward history of editor positions.

use std::path::Path;

use tracing::debug;

use crate::model::JumpPosition;

/// Instructs the host editor to show a location.
pub trait NavigationSink {
    fn open_file(&mut self, path: &Path);
    fn goto_offset(&mut self, offset: u64);

    fn move_to(&mut self, position: &JumpPosition) {
        self.open_file(&position.file_path);
        self.goto_offset(position.offset);
    }
}

/// Ordered positions plus a cursor.
///
/// `pos` counts entries up to and including the current one: `0` means no
/// entry is current, `entries.len()` means the newest entry is current.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JumpHistory {
    entries: Vec<JumpPosition>,
    pos: usize,
}

impl JumpHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn entries(&self) -> &[JumpPosition] {
        &self.entries
    }

    pub fn current(&self) -> Option<&JumpPosition> {
        self.pos.checked_sub(1).and_then(|i| self.entries.get(i))
    }

    fn push(&mut self, position: JumpPosition) {
        if self.pos < self.entries.len() {
            self.entries.truncate(self.pos);
        }
        self.entries.push(position);
        self.pos = self.entries.len();
    }

    /// Record where the editor was (when known), move it to `target` and
    /// record the target. Any forward entries are discarded first.
    pub fn record_and_jump<S>(
        &mut self,
        target: JumpPosition,
        departure: Option<JumpPosition>,
        sink: &mut S,
    ) where
        S: NavigationSink + ?Sized,
    {
        self.entries.truncate(self.pos);

        if let Some(departure) = departure
            && self.entries.last() != Some(&departure)
        {
            self.push(departure);
        }

        sink.move_to(&target);
        self.push(target);
        debug!(
            "record_and_jump: history now {} entries, pos {}",
            self.entries.len(),
            self.pos
        );
    }

    /// Step one entry back. `None` when already at the oldest entry.
    pub fn back<S>(&mut self, sink: &mut S) -> Option<&JumpPosition>
    where
        S: NavigationSink + ?Sized,
    {
        if self.pos <= 1 {
            return None;
        }
        self.pos -= 1;
        let position = &self.entries[self.pos - 1];
        sink.move_to(position);
        Some(position)
    }

    /// Step one entry forward. `None` when already at the newest entry.
    pub fn forward<S>(&mut self, sink: &mut S) -> Option<&JumpPosition>
    where
        S: NavigationSink + ?Sized,
    {
        if self.pos >= self.entries.len() {
            return None;
        }
        self.pos += 1;
        let position = &self.entries[self.pos - 1];
        sink.move_to(position);
        Some(position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[derive(Default)]
    struct Moves(Vec<(PathBuf, u64)>);

    impl NavigationSink for Moves {
        fn open_file(&mut self, path: &Path) {
            self.0.push((path.to_path_buf(), u64::MAX));
        }

        fn goto_offset(&mut self, offset: u64) {
            if let Some(last) = self.0.last_mut() {
                last.1 = offset;
            }
        }
    }

    fn at(file: &str, offset: u64) -> JumpPosition {
        JumpPosition::new(file, offset)
    }

    fn assert_bounded(history: &JumpHistory) {
        assert!(history.position() <= history.len());
    }

    #[test]
    fn starts_empty() {
        let history = JumpHistory::new();
        assert_eq!(history.position(), 0);
        assert!(history.is_empty());
        assert!(history.current().is_none());
    }

    #[test]
    fn records_departure_and_arrival() {
        let mut history = JumpHistory::new();
        let mut sink = Moves::default();

        history.record_and_jump(at("/b.c", 40), Some(at("/a.c", 10)), &mut sink);

        assert_eq!(history.entries(), &[at("/a.c", 10), at("/b.c", 40)]);
        assert_eq!(history.position(), 2);
        assert_eq!(sink.0, vec![(PathBuf::from("/b.c"), 40)]);
    }

    #[test]
    fn departure_equal_to_last_entry_is_not_duplicated() {
        let mut history = JumpHistory::new();
        let mut sink = Moves::default();

        history.record_and_jump(at("/b.c", 40), Some(at("/a.c", 10)), &mut sink);
        history.record_and_jump(at("/c.c", 5), Some(at("/b.c", 40)), &mut sink);
        assert_eq!(history.len(), 3);

        history.record_and_jump(at("/d.c", 5), Some(at("/c.c", 6)), &mut sink);
        assert_eq!(history.len(), 5);
        assert_eq!(history.position(), 5);
    }

    #[test]
    fn unknown_departure_records_only_target() {
        let mut history = JumpHistory::new();
        let mut sink = Moves::default();
        history.record_and_jump(at("/b.c", 40), None, &mut sink);
        assert_eq!(history.entries(), &[at("/b.c", 40)]);
        assert_eq!(history.back(&mut sink), None);
    }

    #[test]
    fn back_then_forward_returns_to_same_entry() {
        let mut history = JumpHistory::new();
        let mut sink = Moves::default();
        history.record_and_jump(at("/b.c", 40), Some(at("/a.c", 10)), &mut sink);
        history.record_and_jump(at("/c.c", 7), Some(at("/b.c", 41)), &mut sink);
        assert_eq!(history.position(), 4);

        assert_eq!(history.back(&mut sink), Some(&at("/b.c", 41)));
        assert_eq!(history.back(&mut sink), Some(&at("/b.c", 40)));
        let before = history.position();
        let visited = history.current().cloned();

        history.back(&mut sink);
        history.forward(&mut sink);
        assert_eq!(history.position(), before);
        assert_eq!(history.current().cloned(), visited);
        assert_eq!(sink.0.last(), Some(&(PathBuf::from("/b.c"), 40)));
    }

    #[test]
    fn boundaries_are_no_ops() {
        let mut history = JumpHistory::new();
        let mut sink = Moves::default();
        assert_eq!(history.back(&mut sink), None);
        assert_eq!(history.forward(&mut sink), None);

        history.record_and_jump(at("/b.c", 40), Some(at("/a.c", 10)), &mut sink);
        let moves = sink.0.len();
        assert_eq!(history.forward(&mut sink), None);
        assert!(history.back(&mut sink).is_some());
        assert_eq!(history.back(&mut sink), None);
        assert_eq!(history.position(), 1);
        assert_eq!(sink.0.len(), moves + 1);
    }

    #[test]
    fn jumping_mid_history_truncates_forward_entries() {
        let mut history = JumpHistory::new();
        let mut sink = Moves::default();
        history.record_and_jump(at("/b.c", 1), Some(at("/a.c", 1)), &mut sink);
        history.record_and_jump(at("/d.c", 1), Some(at("/c.c", 1)), &mut sink);
        assert_eq!(history.len(), 4);

        history.back(&mut sink);
        history.back(&mut sink);
        let pos_before = history.position();
        assert_eq!(pos_before, 2);

        history.record_and_jump(at("/x.c", 9), Some(at("/b.c", 3)), &mut sink);
        assert_eq!(history.len(), pos_before + 1 + 1);
        assert_eq!(history.position(), history.len());
        assert_eq!(
            history.entries(),
            &[at("/a.c", 1), at("/b.c", 1), at("/b.c", 3), at("/x.c", 9)]
        );
        assert_eq!(history.forward(&mut sink), None);
    }

    #[test]
    fn cursor_stays_in_bounds_over_mixed_operations() {
        let mut history = JumpHistory::new();
        let mut sink = Moves::default();
        for step in 0..40u64 {
            match step % 7 {
                0 | 3 => history.record_and_jump(
                    at("/t.c", step),
                    Some(at("/d.c", step / 2)),
                    &mut sink,
                ),
                1 | 4 | 5 => {
                    history.back(&mut sink);
                }
                _ => {
                    history.forward(&mut sink);
                }
            }
            assert_bounded(&history);
        }
    }
}
