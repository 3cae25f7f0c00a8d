//! ewpedit - add source files to IAR Embedded Workbench projects
//!
//! An `.ewp` file is read into a [`Project`], queried and extended, and written back
//! with the same declaration, indentation, line endings and element order it was
//! read with. Only the inserted entry shows up in a diff.
//!
//! # Quick Start
//!
//! ```
//! use ewpedit::{add_file, Edit};
//! # fn main() -> Result<(), ewpedit::Error> {
//! let ewp = b"<?xml version=\"1.0\" encoding=\"iso-8859-1\"?>\n\
//! <project>\n  <group>\n    <name>App</name>\n    <file>\n      <name>main.c</name>\n    </file>\n  </group>\n</project>\n";
//!
//! let Edit::Inserted(bytes) = add_file(ewp, "util.c")? else {
//!     unreachable!("util.c is not in the project yet");
//! };
//! let text = String::from_utf8_lossy(&bytes);
//! assert!(text.ends_with("  <file>\n    <name>util.c</name>\n  </file>\n</project>\n"));
//!
//! assert_eq!(add_file(&bytes, "util.c")?, Edit::Unchanged);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

use encoding_rs::UTF_8;
use tracing::{debug, instrument};

pub mod charset;
pub mod error;
pub mod input;
pub mod project;
pub mod xml;

pub use error::{Error, ErrorKind, ParseError, Pos, Result, SerializeError, Span};
pub use input::Input;
pub use project::engine;
pub use project::{FileEntry, Group, Node, Outcome, Project, SourcePath};
pub use xml::{Config, Indent, Layout, LineEnding};

/// Result of [`add_file`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Edit {
    /// The file was already referenced; nothing needs to be written
    Unchanged,
    /// The complete new document
    Inserted(Vec<u8>),
}

/// Parse project bytes with default limits
pub fn parse(bytes: &[u8]) -> Result<Project, ParseError> {
    parse_with_config(bytes, Config::default())
}

/// Parse project bytes with custom parser limits
#[instrument(skip(bytes), fields(len = bytes.len()))]
pub fn parse_with_config(bytes: &[u8], config: Config) -> Result<Project, ParseError> {
    let decoded = Input::from_bytes(bytes).decode()?;
    debug!(encoding = decoded.encoding.name(), bom = decoded.bom, "decoded input");

    let mut parser = xml::Parser::with_config(decoded.text.as_bytes(), config);
    let mut document = parser.parse()?;
    document.layout.bom = decoded.bom;

    let project = Project::from_document(document)?;
    debug!(
        nodes = project.nodes().len(),
        files = project.file_entries().count(),
        "parsed project"
    );
    Ok(project)
}

/// Render a project to bytes in its declared encoding.
///
/// The whole document is built in memory; on error nothing is returned.
#[instrument(skip_all)]
pub fn serialize(project: &Project) -> Result<Vec<u8>, SerializeError> {
    let document = project.to_document();
    let text = xml::write(&document)?;

    let encoding = if document.layout.bom {
        UTF_8
    } else {
        match document.declaration.as_ref().and_then(|d| d.encoding()) {
            Some(label) => charset::lookup(label).ok_or_else(|| SerializeError::UnknownEncoding {
                label: label.to_string(),
            })?,
            None => UTF_8,
        }
    };

    let bytes = charset::encode(&text, encoding, document.layout.bom)?;
    debug!(len = bytes.len(), encoding = encoding.name(), "serialized project");
    Ok(bytes)
}

/// Parse, add `candidate` unless already present, and serialize
#[instrument(skip(bytes), fields(len = bytes.len()))]
pub fn add_file(bytes: &[u8], candidate: &str) -> Result<Edit> {
    let mut project = parse(bytes)?;
    match engine::add(&mut project, candidate) {
        Outcome::AlreadyPresent => Ok(Edit::Unchanged),
        Outcome::Inserted => Ok(Edit::Inserted(serialize(&project)?)),
    }
}
