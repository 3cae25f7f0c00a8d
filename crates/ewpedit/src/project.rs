//! EWP project model and editing

pub mod engine;
pub mod model;
pub mod path;

pub use engine::Outcome;
pub use model::{FileEntries, FileEntry, Group, Node, Project};
pub use path::SourcePath;
