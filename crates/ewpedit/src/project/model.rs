//! Typed view of an EWP document
//!
//! `<group>` and `<file>` elements directly under `<project>` or another `<group>`
//! become [`Group`] and [`FileEntry`] nodes. Everything else (`<fileVersion>`,
//! `<configuration>`, a group's own `<name>`, `<excluded>`, ...) is kept as a plain
//! [`Element`] in its original position so it is written back unchanged.

use crate::error::{ErrorKind, ParseError, Span};
use crate::project::path::SourcePath;
use crate::xml::{Attributes, Content, Declaration, Document, Element, EmptyTag, Layout, Text};

pub const PROJECT_TAG: &str = "project";
pub const GROUP_TAG: &str = "group";
pub const FILE_TAG: &str = "file";
pub const NAME_TAG: &str = "name";

/// Root of an EWP document
#[derive(Clone, Debug, PartialEq)]
pub struct Project {
    attributes: Attributes,
    nodes: Vec<Node>,
    empty_tag: EmptyTag,
    declaration: Option<Declaration>,
    layout: Layout,
}

/// A child of the project or of a group
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    Group(Group),
    File(FileEntry),
    /// Content the model does not interpret
    Element(Element),
    Text(Text),
}

/// Named container of groups and files
#[derive(Clone, Debug, PartialEq)]
pub struct Group {
    name: String,
    attributes: Attributes,
    /// Includes the `<name>` element itself
    nodes: Vec<Node>,
}

/// Reference to one source file
#[derive(Clone, Debug, PartialEq)]
pub struct FileEntry {
    path: SourcePath,
    element: Element,
}

impl Project {
    pub fn from_document(document: Document) -> Result<Self, ParseError> {
        let Document {
            declaration,
            root,
            layout,
        } = document;

        if root.name != PROJECT_TAG {
            return Err(ParseError::new(
                ErrorKind::NotAProject { found: root.name },
                Span::empty(),
            ));
        }

        Ok(Self {
            attributes: root.attributes,
            nodes: nodes_from(root.children)?,
            empty_tag: root.empty_tag,
            declaration,
            layout,
        })
    }

    /// The document to write. A project read without a declaration gets the
    /// default one, so output always starts with exactly one.
    pub fn to_document(&self) -> Document {
        let root = Element {
            name: PROJECT_TAG.to_string(),
            attributes: self.attributes.clone(),
            children: self.nodes.iter().map(Node::to_content).collect(),
            empty_tag: self.empty_tag,
        };

        Document {
            declaration: Some(self.declaration.clone().unwrap_or_default()),
            root,
            layout: self.layout.clone(),
        }
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Top-level nodes in document order
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Top-level groups
    pub fn groups(&self) -> impl Iterator<Item = &Group> {
        self.nodes.iter().filter_map(Node::as_group)
    }

    /// Every file entry in the tree, depth first
    pub fn file_entries(&self) -> FileEntries<'_> {
        FileEntries {
            stack: vec![self.nodes.iter()],
        }
    }

    pub fn declaration(&self) -> Option<&Declaration> {
        self.declaration.as_ref()
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub(crate) fn push(&mut self, node: Node) {
        self.nodes.push(node);
    }
}

impl Node {
    fn from_content(content: Content) -> Result<Self, ParseError> {
        match content {
            Content::Text(text) => Ok(Self::Text(text)),
            Content::Element(element) if element.name == GROUP_TAG => {
                Group::from_element(element).map(Self::Group)
            }
            Content::Element(element) if element.name == FILE_TAG => {
                FileEntry::from_element(element).map(Self::File)
            }
            Content::Element(element) => Ok(Self::Element(element)),
        }
    }

    fn to_content(&self) -> Content {
        match self {
            Self::Group(group) => Content::Element(group.to_element()),
            Self::File(file) => Content::Element(file.element.clone()),
            Self::Element(element) => Content::Element(element.clone()),
            Self::Text(text) => Content::Text(text.clone()),
        }
    }

    pub fn as_group(&self) -> Option<&Group> {
        match self {
            Self::Group(group) => Some(group),
            _ => None,
        }
    }

    pub fn as_file(&self) -> Option<&FileEntry> {
        match self {
            Self::File(file) => Some(file),
            _ => None,
        }
    }
}

impl Group {
    fn from_element(element: Element) -> Result<Self, ParseError> {
        let name = name_of(&element)?;
        Ok(Self {
            name,
            attributes: element.attributes,
            nodes: nodes_from(element.children)?,
        })
    }

    fn to_element(&self) -> Element {
        Element {
            name: GROUP_TAG.to_string(),
            attributes: self.attributes.clone(),
            children: self.nodes.iter().map(Node::to_content).collect(),
            empty_tag: EmptyTag::Pair,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Direct subgroups
    pub fn groups(&self) -> impl Iterator<Item = &Self> {
        self.nodes.iter().filter_map(Node::as_group)
    }

    /// Files directly in this group
    pub fn files(&self) -> impl Iterator<Item = &FileEntry> {
        self.nodes.iter().filter_map(Node::as_file)
    }
}

impl FileEntry {
    /// `<file><name>path</name></file>` with the normalized path
    pub fn new(path: SourcePath) -> Self {
        let element =
            Element::new(FILE_TAG).with_child(Element::with_text(NAME_TAG, path.as_str()));
        Self { path, element }
    }

    fn from_element(element: Element) -> Result<Self, ParseError> {
        let name = name_of(&element)?;
        Ok(Self {
            path: SourcePath::new(&name),
            element,
        })
    }

    pub fn path(&self) -> &SourcePath {
        &self.path
    }

    /// The path as written in the document
    pub fn raw_path(&self) -> String {
        self.element
            .child(NAME_TAG)
            .map(Element::text)
            .unwrap_or_default()
    }
}

/// Depth-first iterator over file entries
#[derive(Debug)]
pub struct FileEntries<'a> {
    stack: Vec<std::slice::Iter<'a, Node>>,
}

impl<'a> Iterator for FileEntries<'a> {
    type Item = &'a FileEntry;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(nodes) = self.stack.last_mut() {
            match nodes.next() {
                Some(Node::File(file)) => return Some(file),
                Some(Node::Group(group)) => self.stack.push(group.nodes.iter()),
                Some(Node::Element(_) | Node::Text(_)) => {}
                None => {
                    self.stack.pop();
                }
            }
        }
        None
    }
}

fn nodes_from(children: Vec<Content>) -> Result<Vec<Node>, ParseError> {
    children.into_iter().map(Node::from_content).collect()
}

fn name_of(element: &Element) -> Result<String, ParseError> {
    element.child(NAME_TAG).map(Element::text).ok_or_else(|| {
        ParseError::new(
            ErrorKind::MissingName {
                element: element.name.clone(),
            },
            Span::empty(),
        )
    })
}
