use std::path::PathBuf;

/// What happened to a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum ChangeKind {
    Created,
    Modified,
    Removed,
}

impl ChangeKind {
    pub(super) fn label(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Modified => "modified",
            Self::Removed => "removed",
        }
    }
}

/// One debounced batch, sorted by path.
#[derive(Debug, Default)]
pub(super) struct ChangeBatch(pub(super) Vec<(PathBuf, ChangeKind)>);

impl ChangeBatch {
    pub(super) fn paths(&self) -> impl Iterator<Item = &PathBuf> {
        self.0.iter().map(|(path, _)| path)
    }

    pub(super) fn len(&self) -> usize {
        self.0.len()
    }
}
