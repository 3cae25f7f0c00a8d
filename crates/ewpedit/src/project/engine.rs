//! Containment test and file insertion
//!
//! Callers check [`contains`] first and only then [`insert`]; [`add`] does both.
//! `insert` itself never re-checks, so calling it for a present path adds a duplicate.

use tracing::{debug, info};

use crate::project::model::{FileEntry, Node, Project};
use crate::project::path::SourcePath;

/// Result of [`add`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Some entry already referenced the path; the project is unchanged
    AlreadyPresent,
    /// A new top-level entry was appended
    Inserted,
}

/// Whether any file entry, at any depth, references `candidate`
pub fn contains(project: &Project, candidate: &str) -> bool {
    let candidate = SourcePath::new(candidate);
    let found = project.file_entries().any(|file| file.path() == &candidate);
    debug!(path = %candidate, found, "containment check");
    found
}

/// Append a top-level entry for `candidate` after every existing node
pub fn insert(mut project: Project, candidate: &str) -> Project {
    append(&mut project, candidate);
    project
}

/// Check, then insert if absent
pub fn add(project: &mut Project, candidate: &str) -> Outcome {
    if contains(project, candidate) {
        info!(path = candidate, "file already in project, not adding");
        return Outcome::AlreadyPresent;
    }
    append(project, candidate);
    Outcome::Inserted
}

pub(crate) fn append(project: &mut Project, candidate: &str) {
    let path = SourcePath::new(candidate);
    info!(path = %path, "adding file to project");
    project.push(Node::File(FileEntry::new(path)));
}

impl Project {
    /// See [`contains`]
    pub fn contains(&self, candidate: &str) -> bool {
        contains(self, candidate)
    }

    /// See [`insert`]
    pub fn insert(&mut self, candidate: &str) {
        append(self, candidate);
    }
}
