//! Minimal XML reader and writer for project documents

pub mod cursor;
pub mod layout;
pub mod model;
pub mod parser;
pub mod writer;

pub use cursor::Cursor;
pub use layout::{Indent, Layout, LineEnding};
pub use model::{Attributes, Content, Declaration, Document, Element, EmptyTag, Text};
pub use parser::{Config, Parser};
pub use writer::write;
