//! src/controller/key_decoder.rs
//! ============================================================================
//! # Key-Sequence Decoder
//!
//! Maps raw key events to [`Command`]s, resolving multi-key chords (`gg`)
//! through a timeout-bounded pending-prefix buffer. The buffer is the only
//! state here: an explicit `Idle`/`Pending` machine with the expiry deadline
//! stored in the state itself, so prefix cancellation is a pure transition
//! instead of a race against a timer callback. The decoder knows nothing
//! about cursors, entries, or modes.
//!
//! Callers embedding this next to a text-input widget must not forward that
//! widget's key events; the decoder assumes every event it sees is meant for
//! navigation.

use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::controller::commands::Command;

/// How long a chord prefix stays alive waiting for its second key.
pub const CHORD_TIMEOUT: Duration = Duration::from_millis(500);

/// Outcome of feeding one key event to the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoded {
    /// The event resolved to a command; the event is consumed.
    Command(Command),

    /// The event started (or extended) a chord; consumed, nothing to do yet.
    Pending,

    /// The event means nothing to the decoder; callers may propagate it.
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DecoderState {
    Idle,
    Pending { prefix: char, deadline: Instant },
}

#[derive(Debug, Clone, Copy)]
pub struct KeyDecoder {
    state: DecoderState,
}

impl Default for KeyDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyDecoder {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: DecoderState::Idle,
        }
    }

    /// Deadline of the live prefix, if one is buffered. Callers can arm a
    /// timer on this to call [`expire`](Self::expire); correctness does not
    /// depend on it — a stale prefix is also discarded lazily on the next key.
    #[must_use]
    pub const fn deadline(&self) -> Option<Instant> {
        match self.state {
            DecoderState::Idle => None,
            DecoderState::Pending { deadline, .. } => Some(deadline),
        }
    }

    /// Silently discard the pending prefix once its deadline has passed.
    pub fn expire(&mut self, now: Instant) {
        if let DecoderState::Pending { deadline, .. } = self.state
            && now >= deadline
        {
            self.state = DecoderState::Idle;
        }
    }

    /// Feed one key event, observed at `now`.
    pub fn decode(&mut self, key: &KeyEvent, now: Instant) -> Decoded {
        if key.kind == KeyEventKind::Release {
            return Decoded::Ignored;
        }

        // Modifier chords resolve in one step and leave any pending prefix
        // untouched.
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return match key.code {
                KeyCode::Char('a') => Decoded::Command(Command::SelectAll),
                KeyCode::Char('c') => Decoded::Command(Command::Quit),
                _ => Decoded::Ignored,
            };
        }

        // A live prefix gets first claim on this key. A non-matching second
        // key cancels the prefix and is then processed as a fresh single key.
        if let DecoderState::Pending { prefix, deadline } = self.state {
            self.state = DecoderState::Idle;

            if now < deadline
                && let KeyCode::Char(second) = key.code
                && let Some(command) = chord_command(prefix, second)
            {
                return Decoded::Command(command);
            }
        }

        self.decode_single(key, now)
    }

    fn decode_single(&mut self, key: &KeyEvent, now: Instant) -> Decoded {
        let command = match key.code {
            KeyCode::Char(c) if is_prefix_key(c) => {
                self.state = DecoderState::Pending {
                    prefix: c,
                    deadline: now + CHORD_TIMEOUT,
                };
                return Decoded::Pending;
            }

            KeyCode::Char('j') | KeyCode::Down => Command::MoveCursor(1),
            KeyCode::Char('k') | KeyCode::Up => Command::MoveCursor(-1),
            KeyCode::Char('h') | KeyCode::Left => Command::GoParent,
            KeyCode::Char('l') | KeyCode::Right => Command::EnterOrOpen,
            KeyCode::Enter => Command::Activate,

            KeyCode::Char('G') => Command::JumpBottom,

            KeyCode::Char(' ') => Command::ToggleSelect,
            KeyCode::Char('v') => Command::EnterVisual { line: false },
            KeyCode::Char('V') => Command::EnterVisual { line: true },
            KeyCode::Esc => Command::CancelSelection,

            KeyCode::Char('y') => Command::Yank,
            KeyCode::Char('x') => Command::Cut,
            KeyCode::Char('p') => Command::Paste,
            KeyCode::Char('d') => Command::Delete,

            KeyCode::Char('t') => Command::NewTab,
            KeyCode::Char('w') => Command::CloseTab,
            KeyCode::Char(c @ '1'..='9') => {
                Command::SwitchTab(c as usize - '1' as usize)
            }

            KeyCode::Char('.') => Command::ToggleHidden,
            KeyCode::Char('~') => Command::GoHome,
            KeyCode::Char('q') => Command::Quit,

            _ => return Decoded::Ignored,
        };

        Decoded::Command(command)
    }
}

/// Keys that open a chord instead of acting on their own.
const fn is_prefix_key(c: char) -> bool {
    matches!(c, 'g')
}

/// Known two-key chords.
const fn chord_command(prefix: char, second: char) -> Option<Command> {
    match (prefix, second) {
        ('g', 'g') => Some(Command::JumpTop),
        _ => None,
    }
}
