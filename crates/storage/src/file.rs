use std::path::PathBuf;

/// File metadata returned by storage backends when listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    /// Relative path from storage root
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
}
impl FileInfo {
    pub fn new(path: impl Into<PathBuf>, size: u64) -> Self {
        Self { path: path.into(), size }
    }

    /// Bare file name, if the path is a single UTF-8 component.
    pub fn file_name(&self) -> Option<&str> {
        let mut components = self.path.components();
        let first = components.next()?;
        if components.next().is_some() {
            return None;
        }
        first.as_os_str().to_str()
    }
}
