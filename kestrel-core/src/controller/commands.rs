//! src/controller/commands.rs
//! ============================================================================
//! # Commands: Decoded User Intents
//!
//! The `Command` enum is the decoder's entire output vocabulary and the
//! engine's entire input vocabulary: one value per logical user action,
//! independent of which physical keys produced it.

/// A resolved user command, ready to be applied as one state transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Move the cursor by a signed delta, clamped to the listing.
    MoveCursor(isize),

    /// Jump to the first entry.
    JumpTop,

    /// Jump to the last entry.
    JumpBottom,

    /// Navigate to the parent directory.
    GoParent,

    /// Enter the directory under the cursor, or open/pick the file there.
    EnterOrOpen,

    /// The explicit activate key; honours directory-picker sessions.
    Activate,

    /// Toggle the current entry in the selection set (Normal mode only).
    ToggleSelect,

    /// Enter visual selection anchored at the cursor.
    EnterVisual { line: bool },

    /// Leave visual mode and drop the selection.
    CancelSelection,

    /// Select every entry in the listing.
    SelectAll,

    /// Stage the selection for a later copy.
    Yank,

    /// Stage the selection for a later move.
    Cut,

    /// Commit the staged copy/move into the current directory.
    Paste,

    /// Send the selection (or current entry) to the trash.
    Delete,

    /// Open a new tab at the current directory.
    NewTab,

    /// Close the active tab (never the last one).
    CloseTab,

    /// Focus tab `n` (zero-based).
    SwitchTab(usize),

    /// Flip hidden-entry visibility and refresh the listing.
    ToggleHidden,

    /// Navigate to the home directory.
    GoHome,

    /// End the session.
    Quit,
}
