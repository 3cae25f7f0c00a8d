//! Source file paths as stored in a project

use std::fmt;

/// A project-relative source path with `/` separators.
///
/// IAR accepts either separator, so `src\main.c` and `src/main.c` name the same
/// file. Comparison is otherwise exact: case-sensitive, no `..` resolution and no
/// filesystem lookup.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourcePath(String);

impl SourcePath {
    pub fn new(path: &str) -> Self {
        Self(path.replace('\\', "/"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SourcePath {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

impl From<String> for SourcePath {
    fn from(path: String) -> Self {
        Self::new(&path)
    }
}

impl AsRef<str> for SourcePath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourcePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
