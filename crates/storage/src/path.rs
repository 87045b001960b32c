//! Path validation for backend keys.
//!
//! Backends address blobs by relative paths; every path handed to a backend
//! goes through [`validate`] first so nothing can escape the storage root.

use std::path::{Component, Path, PathBuf};

use crate::error::{ErrorKind, Result};

/// Validates and normalizes a storage path.
///
/// `.` components and duplicate separators are dropped and `..` is resolved
/// lexically, but a path that would climb above the storage root, contains a
/// null byte, carries a Windows prefix, or resolves to nothing is rejected
/// with [`InvalidPath`](crate::error::ErrorKind::InvalidPath).
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use shelf_storage::validate_path;
///
/// assert!(validate_path("8f2c1e.json").is_ok());
/// assert!(validate_path("../8f2c1e.json").is_err());
/// assert_eq!(validate_path("./tmp/../8f2c1e.json").unwrap(), Path::new("8f2c1e.json"));
/// ```
pub fn validate(path: impl AsRef<Path>) -> Result<PathBuf> {
    let path = path.as_ref();
    let mut components = Vec::new();
    for component in path.components() {
        match component {
            Component::Normal(s) => {
                // Null bytes survive Path::components() on Unix but truncate
                // paths in C-based syscalls.
                if s.as_encoded_bytes().contains(&0) {
                    exn::bail!(ErrorKind::InvalidPath(path.to_path_buf()));
                }
                components.push(s)
            },
            Component::CurDir | Component::RootDir => {},
            Component::Prefix(_) => exn::bail!(ErrorKind::InvalidPath(path.to_path_buf())),
            Component::ParentDir => {
                if components.pop().is_none() {
                    exn::bail!(ErrorKind::InvalidPath(path.to_path_buf()));
                }
            },
        }
    }
    match components.is_empty() {
        true => exn::bail!(ErrorKind::InvalidPath(path.to_path_buf())),
        false => Ok(components.into_iter().collect()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("abc123.json", "abc123.json")]
    #[case("./abc123.json", "abc123.json")]
    #[case("nested//abc123.json", "nested/abc123.json")]
    #[case("nested/../abc123.json", "abc123.json")]
    #[case("abc123.json/", "abc123.json")]
    fn test_normalizes(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(validate(input).unwrap(), Path::new(expected));
    }

    #[rstest]
    #[case("")]
    #[case(".")]
    #[case("./.")]
    #[case("..")]
    #[case("../abc123.json")]
    #[case("nested/../../abc123.json")]
    #[case("abc\0123.json")]
    fn test_rejects(#[case] input: &str) {
        let err = validate(input).unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidPath(_)));
    }
}
