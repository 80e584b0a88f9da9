use crate::common::DomainResult;

/// Source of textual maze layouts, keyed by name.
pub trait MazeLayoutSource: Send + Sync {
    fn load_layout(&self, name: &str) -> DomainResult<String>;

    /// Names of the layouts this source can load, sorted.
    fn list_layouts(&self) -> DomainResult<Vec<String>>;
}
