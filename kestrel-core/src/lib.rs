//! # kestrel-core
//!
//! Interaction core of a keyboard-driven file browser: a key-sequence decoder
//! feeding a modal navigation/selection state machine, with file-system I/O
//! behind a service trait.

pub mod error;

pub mod config;

pub mod controller {
    pub mod commands;
    pub use commands::Command;

    pub mod key_decoder;
    pub use key_decoder::{CHORD_TIMEOUT, Decoded, KeyDecoder};

    pub mod engine;
    pub use engine::{CursorPlacement, Engine, TaskResult};
}

pub mod model {
    pub mod session;
    pub use session::{PickerMode, Session};

    pub mod tab;
    pub use tab::{Tab, ViewMode};
}

pub mod fs {
    pub mod entry_info;
    pub use entry_info::{EntryInfo, EntryKind};

    pub mod service;
    pub use service::{FileSystemService, LocalFileSystem};
}

pub mod logging;

pub use error::AppError;

pub use controller::{commands::Command, engine::Engine, key_decoder::KeyDecoder};
pub use model::{session::Session, tab::Tab};
