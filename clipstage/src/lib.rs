//! # clipstage - Staged Clipboard for File Managers
//!
//! A clipboard that records *intent* instead of performing I/O: a set of
//! source paths is staged together with a copy-or-move operation kind, and the
//! actual file transfer happens later, when the host application commits a
//! paste. Copy stages survive repeated pastes; move stages are single-use.

pub mod error;
pub mod operations;
pub mod stage;

// Re-export main types for easy use
pub use error::{StageError, StageResult};
pub use operations::{PastePlan, Transfer};
pub use stage::{Stage, StageOp, StagedSet};
