//! XML data model

use indexmap::IndexMap;

use crate::xml::layout::Layout;

/// Attributes in document order
pub type Attributes = IndexMap<String, String>;

/// XML document
#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    pub declaration: Option<Declaration>,
    pub root: Element,
    pub layout: Layout,
}

/// The `<?xml ...?>` declaration, pseudo-attributes in document order
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Declaration {
    pub attributes: Attributes,
    /// Quote character around the pseudo-attribute values
    pub quote: char,
}

impl Declaration {
    pub fn encoding(&self) -> Option<&str> {
        self.attributes.get("encoding").map(String::as_str)
    }
}

impl Default for Declaration {
    fn default() -> Self {
        let mut attributes = Attributes::new();
        attributes.insert("version".to_string(), "1.0".to_string());
        attributes.insert("encoding".to_string(), "UTF-8".to_string());
        Self {
            attributes,
            quote: '"',
        }
    }
}

/// How an element without children is written
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EmptyTag {
    /// `<x></x>`
    #[default]
    Pair,
    /// `<x/>`
    Closed,
    /// `<x />`
    Spaced,
}

/// XML element
#[derive(Clone, Debug, PartialEq)]
pub struct Element {
    pub name: String,
    pub attributes: Attributes,
    pub children: Vec<Content>,
    pub empty_tag: EmptyTag,
}

/// XML content node
#[derive(Clone, Debug, PartialEq)]
pub enum Content {
    Element(Element),
    Text(Text),
}

/// Character data.
///
/// Text read from a document keeps its source form (entity references, CDATA
/// sections) so it is written back exactly as it was read. Equality only looks at
/// the decoded value.
#[derive(Clone, Debug)]
pub struct Text {
    value: String,
    raw: Option<String>,
}

impl Text {
    /// Text written with the minimal escaping
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            raw: None,
        }
    }

    pub(crate) fn parsed(value: String, raw: String) -> Self {
        Self {
            value,
            raw: Some(raw),
        }
    }

    /// Decoded text
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Source form, if the text was read from a document
    pub fn raw(&self) -> Option<&str> {
        self.raw.as_deref()
    }

    /// Only XML whitespace in the source form
    pub fn is_blank(&self) -> bool {
        self.raw()
            .unwrap_or(&self.value)
            .bytes()
            .all(|b| matches!(b, b' ' | b'\t' | b'\r' | b'\n'))
    }
}

impl PartialEq for Text {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: IndexMap::new(),
            children: Vec::new(),
            empty_tag: EmptyTag::Pair,
        }
    }

    /// `<name>text</name>`
    pub fn with_text(name: impl Into<String>, text: impl Into<String>) -> Self {
        let mut element = Self::new(name);
        element.children.push(Content::Text(Text::new(text)));
        element
    }

    pub fn with_child(mut self, child: Self) -> Self {
        self.children.push(Content::Element(child));
        self
    }

    /// Child elements, skipping text
    pub fn elements(&self) -> impl Iterator<Item = &Self> {
        self.children.iter().filter_map(|content| match content {
            Content::Element(element) => Some(element),
            Content::Text(_) => None,
        })
    }

    /// First child element called `name`
    pub fn child(&self, name: &str) -> Option<&Self> {
        self.elements().find(|element| element.name == name)
    }

    /// Concatenated text children
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|content| match content {
                Content::Text(text) => Some(text.value()),
                Content::Element(_) => None,
            })
            .collect()
    }
}
