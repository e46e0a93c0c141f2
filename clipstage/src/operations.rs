use crate::error::{StageError, StageResult};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// One source path resolved against a destination directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transfer {
    pub source: Arc<PathBuf>,
    pub dest: PathBuf,
}

/// The per-file transfers a paste will perform: each staged source keeps its
/// file name and lands directly inside the destination directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PastePlan {
    pub transfers: Vec<Transfer>,
}

impl PastePlan {
    pub fn new(sources: &[Arc<PathBuf>], dest_dir: &Path) -> StageResult<Self> {
        if sources.is_empty() {
            return Err(StageError::EmptyStage);
        }

        let transfers = sources
            .iter()
            .map(|source| {
                let file_name = source
                    .file_name()
                    .ok_or_else(|| StageError::InvalidPath(source.as_ref().clone()))?;

                Ok(Transfer {
                    source: Arc::clone(source),
                    dest: dest_dir.join(file_name),
                })
            })
            .collect::<StageResult<Vec<Transfer>>>()?;

        Ok(Self { transfers })
    }

    pub fn len(&self) -> usize {
        self.transfers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transfers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(s: &str) -> Arc<PathBuf> {
        Arc::new(PathBuf::from(s))
    }

    #[test]
    fn test_plan_joins_file_names() {
        let plan = PastePlan::new(&[p("/src/a.txt"), p("/other/b")], Path::new("/dest")).unwrap();

        assert_eq!(plan.len(), 2);
        assert_eq!(plan.transfers[0].dest, PathBuf::from("/dest/a.txt"));
        assert_eq!(plan.transfers[1].dest, PathBuf::from("/dest/b"));
    }

    #[test]
    fn test_plan_rejects_nameless_source() {
        let err = PastePlan::new(&[p("/")], Path::new("/dest")).unwrap_err();
        assert_eq!(err, StageError::InvalidPath(PathBuf::from("/")));
    }

    #[test]
    fn test_plan_rejects_empty_sources() {
        assert_eq!(
            PastePlan::new(&[], Path::new("/dest")).unwrap_err(),
            StageError::EmptyStage
        );
    }
}
