//! ``src/model/session.rs``
//! ============================================================================
//! # `Session`: Authoritative Interaction State
//!
//! The session owns the tab list, the session-wide clipboard stage, the
//! hidden-entry flag, the picker mode, and the loading/error condition shared
//! by all asynchronous transitions. It is an explicitly owned value with pure
//! transition methods — no ambient globals — so every transition is unit
//! testable without a UI harness.

use std::path::PathBuf;

use clipstage::{Stage, StageOp};
use tracing::debug;
use uuid::Uuid;

use crate::model::tab::Tab;

/// Restrictive session variants: a picker session terminates when the user
/// activates a qualifying entry, reporting its path to the invoking process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PickerMode {
    #[default]
    None,
    File,
    Dir,
}

#[derive(Debug, Clone)]
pub struct Session {
    /// Always non-empty.
    pub tabs: Vec<Tab>,
    pub active: usize,

    /// Session-wide by design: a stage built in one tab pastes in another.
    pub stage: Stage,

    pub show_hidden: bool,
    pub picker: PickerMode,

    /// True while one asynchronous file-system request is in flight.
    pub loading: bool,

    /// Latest non-fatal failure, dismissed explicitly by the caller.
    pub error: Option<String>,

    finished: bool,
}

impl Session {
    #[must_use]
    pub fn new(start_dir: PathBuf, show_hidden: bool, picker: PickerMode) -> Self {
        Self {
            tabs: vec![Tab::new(start_dir)],
            active: 0,
            stage: Stage::new(),
            show_hidden,
            picker,
            loading: false,
            error: None,
            finished: false,
        }
    }

    #[must_use]
    pub fn active_tab(&self) -> &Tab {
        &self.tabs[self.active]
    }

    pub fn active_tab_mut(&mut self) -> &mut Tab {
        &mut self.tabs[self.active]
    }

    pub fn tab_mut(&mut self, id: Uuid) -> Option<&mut Tab> {
        self.tabs.iter_mut().find(|tab| tab.id == id)
    }

    /// Append a tab spawned from the active one and focus it.
    pub fn new_tab(&mut self) {
        let spawned = self.active_tab().spawn();
        self.tabs.push(spawned);
        self.active = self.tabs.len() - 1;
    }

    /// Close the active tab. Closing the last remaining tab is a no-op; a
    /// session always has at least one.
    pub fn close_tab(&mut self) {
        if self.tabs.len() <= 1 {
            return;
        }

        self.tabs.remove(self.active);
        self.active = self.active.min(self.tabs.len() - 1);
    }

    /// Focus tab `index`; out-of-range indices are ignored.
    pub fn switch_tab(&mut self, index: usize) {
        if index < self.tabs.len() {
            self.active = index;
        }
    }

    /// Stage the selection (or the current entry) for a later paste. Leaves
    /// visual mode and drops the selection; a no-op in an empty directory.
    pub fn stage_from_selection(&mut self, op: StageOp) {
        let tab = self.active_tab_mut();
        let paths = tab.selection_or_current();
        if paths.is_empty() {
            return;
        }

        debug!(op = op.tag(), count = paths.len(), "Selection staged");

        let staged = match op {
            StageOp::Copy => self.stage.stage_copy(paths),
            StageOp::Move => self.stage.stage_move(paths),
        };
        debug_assert!(staged.is_ok());

        let tab = self.active_tab_mut();
        tab.cancel_selection();
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    /// Mark the session finished (quit, or a reported pick).
    pub const fn finish(&mut self) {
        self.finished = true;
    }

    #[inline]
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.finished
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::entry_info::EntryInfo;
    use crate::model::tab::ViewMode;
    use compact_str::CompactString;
    use std::sync::Arc;
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

    fn session_with(names: &[&str]) -> Session {
        let mut session = Session::new(PathBuf::from("/tmp"), false, PickerMode::None);
        session.active_tab_mut().entries = names.iter().map(|n| entry(n)).collect();
        session
    }

    #[test]
    fn test_close_last_tab_is_a_noop() {
        let mut session = session_with(&["a"]);
        session.close_tab();
        assert_eq!(session.tabs.len(), 1);
    }

    #[test]
    fn test_close_tab_clamps_active_index() {
        let mut session = session_with(&["a"]);
        session.new_tab();
        session.new_tab();
        assert_eq!(session.active, 2);

        session.close_tab();
        assert_eq!(session.tabs.len(), 2);
        assert_eq!(session.active, 1);
    }

    #[test]
    fn test_switch_tab_out_of_range_is_a_noop() {
        let mut session = session_with(&["a"]);
        session.new_tab();
        session.switch_tab(0);
        assert_eq!(session.active, 0);

        session.switch_tab(7);
        assert_eq!(session.active, 0);
    }

    #[test]
    fn test_new_tab_spawns_from_active_and_focuses() {
        let mut session = session_with(&["a", "b"]);
        session.active_tab_mut().cursor = 1;

        session.new_tab();

        assert_eq!(session.tabs.len(), 2);
        assert_eq!(session.active, 1);
        assert_eq!(session.active_tab().cursor, 0);
        assert_eq!(session.active_tab().cwd, session.tabs[0].cwd);
    }

    #[test]
    fn test_switching_tabs_restores_cursor_mode_and_selection() {
        let mut session = session_with(&["a", "b", "c"]);
        session.active_tab_mut().cursor = 1;
        session.active_tab_mut().enter_visual(false);
        session.active_tab_mut().move_cursor(1);

        session.new_tab();
        session.switch_tab(0);

        let tab = session.active_tab();
        assert_eq!(tab.cursor, 2);
        assert_eq!(tab.mode.anchor(), Some(1));
        assert_eq!(tab.selected.len(), 2);
    }

    #[test]
    fn test_yank_from_visual_stages_copy_and_resets() {
        let mut session = session_with(&["a", "b", "c"]);
        session.active_tab_mut().enter_visual(false);
        session.active_tab_mut().move_cursor(1);

        session.stage_from_selection(StageOp::Copy);

        let staged = session.stage.staged().expect("stage populated");
        assert_eq!(staged.op, StageOp::Copy);
        assert_eq!(staged.paths.len(), 2);

        let tab = session.active_tab();
        assert_eq!(tab.mode, ViewMode::Normal);
        assert!(tab.selected.is_empty());
    }

    #[test]
    fn test_cut_without_selection_stages_current_entry() {
        let mut session = session_with(&["a", "b"]);
        session.active_tab_mut().cursor = 1;

        session.stage_from_selection(StageOp::Move);

        let staged = session.stage.staged().expect("stage populated");
        assert_eq!(staged.op, StageOp::Move);
        assert_eq!(staged.paths.len(), 1);
        assert_eq!(staged.paths[0].as_ref(), &PathBuf::from("/tmp/b"));
    }

    #[test]
    fn test_stage_in_empty_directory_is_a_noop() {
        let mut session = session_with(&[]);
        session.stage_from_selection(StageOp::Copy);
        assert!(session.stage.is_empty());
    }

    #[test]
    fn test_stage_is_session_wide_across_tabs() {
        let mut session = session_with(&["a"]);
        session.stage_from_selection(StageOp::Copy);

        session.new_tab();

        assert_eq!(session.stage.op(), Some(StageOp::Copy));
    }
}
