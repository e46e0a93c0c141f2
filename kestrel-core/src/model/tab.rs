//! ``src/model/tab.rs``
//! ============================================================================
//! # `Tab`: One Independent Browsing Session
//!
//! A tab owns its working directory, the current entry snapshot, the cursor,
//! the view mode (with the visual anchor), the selection set, and a listing
//! epoch used to discard stale directory responses. All transitions here are
//! pure; anything that touches the file-system service lives in the engine.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use smallvec::SmallVec;
use uuid::Uuid;

use crate::fs::entry_info::EntryInfo;

/// Cursor-driven view mode. The visual variants carry the anchor fixed at
/// mode-entry time, so an anchor cannot outlive visual mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Normal,
    VisualChar {
        anchor: usize,
    },
    VisualLine {
        anchor: usize,
    },
}

impl ViewMode {
    #[inline]
    #[must_use]
    pub const fn anchor(self) -> Option<usize> {
        match self {
            Self::Normal => None,
            Self::VisualChar { anchor } | Self::VisualLine { anchor } => Some(anchor),
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_visual(self) -> bool {
        !matches!(self, Self::Normal)
    }
}

/// Small path batch used for clipboard staging and trash requests.
pub type PathBatch = SmallVec<[Arc<PathBuf>; 4]>;

#[derive(Debug, Clone)]
pub struct Tab {
    pub id: Uuid,
    pub cwd: Arc<PathBuf>,
    pub entries: Vec<EntryInfo>,
    pub cursor: usize,
    pub mode: ViewMode,
    pub selected: HashSet<Arc<PathBuf>>,

    /// Bumped for every listing request issued for this tab; responses
    /// carrying an older value are dropped.
    epoch: u64,
}

impl Tab {
    #[must_use]
    pub fn new(cwd: PathBuf) -> Self {
        Self {
            id: Uuid::new_v4(),
            cwd: Arc::new(cwd),
            entries: Vec::new(),
            cursor: 0,
            mode: ViewMode::Normal,
            selected: HashSet::new(),
            epoch: 0,
        }
    }

    /// New tab pointed at this tab's directory, with a fresh cursor and no
    /// selection. The entry snapshot is carried over so the new tab is usable
    /// before its first refresh.
    #[must_use]
    pub fn spawn(&self) -> Self {
        Self {
            id: Uuid::new_v4(),
            cwd: Arc::clone(&self.cwd),
            entries: self.entries.clone(),
            cursor: 0,
            mode: ViewMode::Normal,
            selected: HashSet::new(),
            epoch: 0,
        }
    }

    #[must_use]
    pub fn current_entry(&self) -> Option<&EntryInfo> {
        self.entries.get(self.cursor)
    }

    #[inline]
    #[must_use]
    pub const fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Reserve the next listing epoch for a request being issued now.
    pub const fn begin_listing(&mut self) -> u64 {
        self.epoch += 1;
        self.epoch
    }

    #[inline]
    #[must_use]
    pub const fn accepts_epoch(&self, epoch: u64) -> bool {
        self.epoch == epoch
    }

    /// Move the cursor by `delta`, clamped to both ends. In a visual mode the
    /// selection is recomputed from the anchor.
    pub fn move_cursor(&mut self, delta: isize) {
        if self.entries.is_empty() {
            return;
        }

        let last = self.entries.len() - 1;
        let target = self.cursor as isize + delta;
        self.cursor = target.clamp(0, last as isize) as usize;
        self.refresh_visual_selection();
    }

    pub fn jump_top(&mut self) {
        self.cursor = 0;
        self.refresh_visual_selection();
    }

    pub fn jump_bottom(&mut self) {
        self.cursor = self.entries.len().saturating_sub(1);
        self.refresh_visual_selection();
    }

    /// Enter a visual mode anchored at the cursor, seeding the selection with
    /// the anchor entry. Any toggle-built selection is discarded.
    pub fn enter_visual(&mut self, line: bool) {
        if self.entries.is_empty() {
            return;
        }

        let anchor = self.cursor;
        self.mode = if line {
            ViewMode::VisualLine { anchor }
        } else {
            ViewMode::VisualChar { anchor }
        };

        self.selected.clear();
        if let Some(entry) = self.entries.get(anchor) {
            self.selected.insert(Arc::clone(&entry.path));
        }
    }

    /// Back to `Normal`; anchor and selection are cleared atomically.
    pub fn cancel_selection(&mut self) {
        self.mode = ViewMode::Normal;
        self.selected.clear();
    }

    /// Toggle the current entry in the selection set and advance the cursor.
    /// Only meaningful in `Normal` mode; visual mode owns the selection.
    pub fn toggle_select(&mut self) {
        if self.mode.is_visual() {
            return;
        }

        let Some(entry) = self.current_entry() else {
            return;
        };

        let path = Arc::clone(&entry.path);
        if !self.selected.remove(&path) {
            self.selected.insert(path);
        }

        self.cursor = (self.cursor + 1).min(self.entries.len() - 1);
    }

    pub fn select_all(&mut self) {
        self.selected = self
            .entries
            .iter()
            .map(|entry| Arc::clone(&entry.path))
            .collect();
    }

    /// The selection, or the current entry when nothing is selected. Empty
    /// only when the directory itself is empty.
    #[must_use]
    pub fn selection_or_current(&self) -> PathBatch {
        if self.selected.is_empty() {
            self.current_entry()
                .map(|entry| Arc::clone(&entry.path))
                .into_iter()
                .collect()
        } else {
            self.selected.iter().map(Arc::clone).collect()
        }
    }

    /// Replace state for a newly entered directory: fresh cursor, no
    /// selection, `Normal` mode.
    pub fn set_listing(&mut self, path: Arc<PathBuf>, entries: Vec<EntryInfo>) {
        self.cwd = path;
        self.entries = entries;
        self.cursor = 0;
        self.mode = ViewMode::Normal;
        self.selected.clear();
    }

    /// Replace the entry snapshot in place, keeping position: the cursor (and
    /// a visual anchor) are clamped to the new length instead of reset.
    pub fn refresh_entries(&mut self, entries: Vec<EntryInfo>) {
        self.entries = entries;
        let last = self.entries.len().saturating_sub(1);
        self.cursor = self.cursor.min(last);

        self.mode = match self.mode {
            ViewMode::Normal => ViewMode::Normal,
            ViewMode::VisualChar { anchor } => ViewMode::VisualChar {
                anchor: anchor.min(last),
            },
            ViewMode::VisualLine { anchor } => ViewMode::VisualLine {
                anchor: anchor.min(last),
            },
        };

        if self.entries.is_empty() {
            if self.mode.is_visual() {
                self.cancel_selection();
            }
        } else {
            self.refresh_visual_selection();
        }
    }

    /// Selection invariant while visual: the closed interval between anchor
    /// and cursor, mapped to entry paths.
    fn refresh_visual_selection(&mut self) {
        let Some(anchor) = self.mode.anchor() else {
            return;
        };

        let lo = anchor.min(self.cursor);
        let hi = anchor.max(self.cursor);

        self.selected = self
            .entries
            .iter()
            .skip(lo)
            .take(hi - lo + 1)
            .map(|entry| Arc::clone(&entry.path))
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use compact_str::CompactString;
    use std::time::UNIX_EPOCH;

    fn entry(name: &str) -> EntryInfo {
        EntryInfo {
            path: Arc::new(PathBuf::from(format!("/tmp/{name}"))),
            size: 0,
            modified: UNIX_EPOCH,
            name: CompactString::from(name),
            extension: None,
            is_dir: false,
            is_symlink: false,
            is_hidden: false,
        }
    }

    fn tab_with(names: &[&str]) -> Tab {
        let mut tab = Tab::new(PathBuf::from("/tmp"));
        tab.entries = names.iter().map(|n| entry(n)).collect();
        tab
    }

    fn selected_names(tab: &Tab) -> Vec<String> {
        let mut names: Vec<String> = tab
            .selected
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_cursor_clamps_at_both_ends() {
        let mut tab = tab_with(&["a", "b", "c"]);

        tab.move_cursor(-5);
        assert_eq!(tab.cursor, 0);

        tab.move_cursor(10);
        assert_eq!(tab.cursor, 2);

        tab.move_cursor(-1);
        assert_eq!(tab.cursor, 1);
    }

    #[test]
    fn test_cursor_inert_on_empty_listing() {
        let mut tab = tab_with(&[]);
        tab.move_cursor(3);
        tab.jump_bottom();
        assert_eq!(tab.cursor, 0);
        assert!(tab.current_entry().is_none());
    }

    #[test]
    fn test_visual_selection_tracks_anchor_interval() {
        let mut tab = tab_with(&["a", "b", "c", "d", "e"]);
        tab.cursor = 2;

        tab.enter_visual(false);
        assert_eq!(selected_names(&tab), vec!["c"]);

        tab.move_cursor(2);
        assert_eq!(selected_names(&tab), vec!["c", "d", "e"]);

        // Crossing back over the anchor flips the interval.
        tab.move_cursor(-4);
        assert_eq!(tab.cursor, 0);
        assert_eq!(selected_names(&tab), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_jump_recomputes_visual_selection() {
        let mut tab = tab_with(&["a", "b", "c", "d"]);
        tab.cursor = 1;
        tab.enter_visual(true);

        tab.jump_bottom();
        assert_eq!(selected_names(&tab), vec!["b", "c", "d"]);

        tab.jump_top();
        assert_eq!(selected_names(&tab), vec!["a", "b"]);
    }

    #[test]
    fn test_cancel_clears_mode_and_selection() {
        let mut tab = tab_with(&["a", "b"]);
        tab.enter_visual(false);
        tab.move_cursor(1);

        tab.cancel_selection();

        assert_eq!(tab.mode, ViewMode::Normal);
        assert_eq!(tab.mode.anchor(), None);
        assert!(tab.selected.is_empty());
    }

    #[test]
    fn test_toggle_pair_is_idempotent() {
        let mut tab = tab_with(&["a", "b", "c"]);
        tab.toggle_select();
        assert_eq!(selected_names(&tab), vec!["a"]);
        assert_eq!(tab.cursor, 1);

        // Move back and toggle the same entry again.
        tab.move_cursor(-1);
        tab.toggle_select();
        assert!(tab.selected.is_empty());
    }

    #[test]
    fn test_toggle_advance_clamps_at_bottom() {
        let mut tab = tab_with(&["a", "b"]);
        tab.cursor = 1;
        tab.toggle_select();
        tab.toggle_select();
        assert_eq!(tab.cursor, 1);
        assert!(tab.selected.is_empty());
    }

    #[test]
    fn test_toggle_ignored_in_visual_mode() {
        let mut tab = tab_with(&["a", "b", "c"]);
        tab.enter_visual(false);

        tab.toggle_select();

        assert_eq!(tab.cursor, 0);
        assert_eq!(selected_names(&tab), vec!["a"]);
    }

    #[test]
    fn test_enter_visual_discards_toggled_selection() {
        let mut tab = tab_with(&["a", "b", "c"]);
        tab.toggle_select();
        tab.toggle_select();
        assert_eq!(tab.selected.len(), 2);

        tab.enter_visual(false);

        assert_eq!(selected_names(&tab), vec!["c"]);
        assert_eq!(tab.mode.anchor(), Some(2));
    }

    #[test]
    fn test_selection_or_current_falls_back_to_cursor() {
        let mut tab = tab_with(&["a", "b"]);
        tab.cursor = 1;

        let batch = tab.selection_or_current();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].as_ref(), &PathBuf::from("/tmp/b"));

        tab.select_all();
        assert_eq!(tab.selection_or_current().len(), 2);
    }

    #[test]
    fn test_set_listing_resets_position_and_mode() {
        let mut tab = tab_with(&["a", "b", "c"]);
        tab.cursor = 2;
        tab.enter_visual(false);

        tab.set_listing(Arc::new(PathBuf::from("/other")), vec![entry("z")]);

        assert_eq!(tab.cwd.as_ref(), &PathBuf::from("/other"));
        assert_eq!(tab.cursor, 0);
        assert_eq!(tab.mode, ViewMode::Normal);
        assert!(tab.selected.is_empty());
    }

    #[test]
    fn test_refresh_clamps_cursor_and_anchor() {
        let mut tab = tab_with(&["a", "b", "c", "d", "e"]);
        tab.cursor = 4;
        tab.enter_visual(false);

        tab.refresh_entries(vec![entry("a"), entry("b")]);

        assert_eq!(tab.cursor, 1);
        assert_eq!(tab.mode.anchor(), Some(1));
        assert_eq!(selected_names(&tab), vec!["b"]);
    }

    #[test]
    fn test_refresh_to_empty_cancels_visual() {
        let mut tab = tab_with(&["a", "b"]);
        tab.enter_visual(false);

        tab.refresh_entries(Vec::new());

        assert_eq!(tab.cursor, 0);
        assert_eq!(tab.mode, ViewMode::Normal);
        assert!(tab.selected.is_empty());
    }

    #[test]
    fn test_epoch_accepts_only_latest() {
        let mut tab = tab_with(&[]);
        let first = tab.begin_listing();
        let second = tab.begin_listing();

        assert!(!tab.accepts_epoch(first));
        assert!(tab.accepts_epoch(second));
    }

    #[test]
    fn test_spawn_carries_path_with_fresh_state() {
        let mut tab = tab_with(&["a", "b"]);
        tab.cursor = 1;
        tab.select_all();

        let spawned = tab.spawn();

        assert_eq!(spawned.cwd, tab.cwd);
        assert_eq!(spawned.entries.len(), 2);
        assert_eq!(spawned.cursor, 0);
        assert!(spawned.selected.is_empty());
        assert_ne!(spawned.id, tab.id);
    }
}
