use crate::error::{StageError, StageResult};
use smallvec::SmallVec;
use std::path::PathBuf;
use std::sync::Arc;

/// What a committed paste will do with the staged paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageOp {
    Copy,
    Move,
}

impl StageOp {
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Copy => "copy",
            Self::Move => "move",
        }
    }
}

/// One staged operation: a non-empty set of source paths plus the operation
/// kind. The path set is immutable once staged; re-staging replaces it
/// wholesale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedSet {
    pub paths: SmallVec<[Arc<PathBuf>; 4]>,
    pub op: StageOp,
}

impl StagedSet {
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// Holds at most one staged operation. Staging replaces any previous stage;
/// committing a `Move` paste consumes the stage, committing a `Copy` paste
/// leaves it in place for the next paste.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stage {
    staged: Option<StagedSet>,
}

impl Stage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage paths for a later copy. Fails on an empty set.
    pub fn stage_copy<I>(&mut self, paths: I) -> StageResult<()>
    where
        I: IntoIterator<Item = Arc<PathBuf>>,
    {
        self.stage(paths, StageOp::Copy)
    }

    /// Stage paths for a later move. Fails on an empty set.
    pub fn stage_move<I>(&mut self, paths: I) -> StageResult<()>
    where
        I: IntoIterator<Item = Arc<PathBuf>>,
    {
        self.stage(paths, StageOp::Move)
    }

    fn stage<I>(&mut self, paths: I, op: StageOp) -> StageResult<()>
    where
        I: IntoIterator<Item = Arc<PathBuf>>,
    {
        let paths: SmallVec<[Arc<PathBuf>; 4]> = paths.into_iter().collect();
        if paths.is_empty() {
            return Err(StageError::EmptyStage);
        }

        self.staged = Some(StagedSet { paths, op });
        Ok(())
    }

    pub fn staged(&self) -> Option<&StagedSet> {
        self.staged.as_ref()
    }

    pub fn op(&self) -> Option<StageOp> {
        self.staged.as_ref().map(|s| s.op)
    }

    pub fn is_empty(&self) -> bool {
        self.staged.is_none()
    }

    pub fn len(&self) -> usize {
        self.staged.as_ref().map_or(0, StagedSet::len)
    }

    pub fn clear(&mut self) {
        self.staged = None;
    }

    /// Record that a paste of the current stage completed successfully.
    /// A `Move` stage is consumed; a `Copy` stage persists.
    pub fn commit_paste(&mut self) {
        if self.op() == Some(StageOp::Move) {
            self.staged = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(s: &str) -> Arc<PathBuf> {
        Arc::new(PathBuf::from(s))
    }

    #[test]
    fn test_stage_replaces_previous() {
        let mut stage = Stage::new();
        stage.stage_copy([p("/a")]).unwrap();
        stage.stage_move([p("/b"), p("/c")]).unwrap();

        assert_eq!(stage.op(), Some(StageOp::Move));
        assert_eq!(stage.len(), 2);
    }

    #[test]
    fn test_empty_set_is_rejected() {
        let mut stage = Stage::new();
        assert_eq!(stage.stage_copy([]), Err(StageError::EmptyStage));
        assert!(stage.is_empty());
    }

    #[test]
    fn test_copy_stage_survives_commit() {
        let mut stage = Stage::new();
        stage.stage_copy([p("/a"), p("/b")]).unwrap();

        stage.commit_paste();
        stage.commit_paste();

        assert_eq!(stage.op(), Some(StageOp::Copy));
        assert_eq!(stage.len(), 2);
    }

    #[test]
    fn test_move_stage_is_single_use() {
        let mut stage = Stage::new();
        stage.stage_move([p("/a")]).unwrap();

        stage.commit_paste();

        assert!(stage.is_empty());
        assert_eq!(stage.op(), None);
    }
}
