//! XML serializer
//!
//! Elements holding only other elements are broken over lines and indented one unit
//! per depth. Elements holding text, alone or mixed with elements, are written in
//! sequence without added whitespace. Text read from a document is written in its
//! source form.

use crate::error::SerializeError;
use crate::xml::layout::Layout;
use crate::xml::model::{Attributes, Content, Declaration, Document, Element, EmptyTag, Text};
use crate::xml::parser::{is_name_char, is_name_start};

type Result<T> = std::result::Result<T, SerializeError>;

/// Render `document` with its own layout
pub fn write(document: &Document) -> Result<String> {
    let mut writer = Writer::new(&document.layout);
    if let Some(declaration) = &document.declaration {
        writer.declaration(declaration)?;
    }
    writer.element(&document.root, 0)?;
    for _ in 0..document.layout.trailing_newlines {
        writer.newline();
    }
    Ok(writer.output)
}

struct Writer<'a> {
    layout: &'a Layout,
    output: String,
}

impl<'a> Writer<'a> {
    fn new(layout: &'a Layout) -> Self {
        Self {
            layout,
            output: String::new(),
        }
    }

    fn declaration(&mut self, declaration: &Declaration) -> Result<()> {
        self.output.push_str("<?xml");
        self.attributes(&declaration.attributes, declaration.quote)?;
        self.output.push_str("?>");
        self.newline();
        for _ in 0..self.layout.blank_lines_after_declaration {
            self.newline();
        }
        Ok(())
    }

    /// Writes from `<` to the closing `>`; the caller places it on its line
    fn element(&mut self, element: &Element, depth: usize) -> Result<()> {
        check_name(&element.name)?;
        self.output.push('<');
        self.output.push_str(&element.name);
        self.attributes(&element.attributes, '"')?;

        if element.children.is_empty() {
            match element.empty_tag {
                EmptyTag::Pair => {
                    self.output.push_str("></");
                    self.output.push_str(&element.name);
                    self.output.push('>');
                }
                EmptyTag::Closed => self.output.push_str("/>"),
                EmptyTag::Spaced => self.output.push_str(" />"),
            }
            return Ok(());
        }

        self.output.push('>');
        let block = element.children.iter().all(|child| match child {
            Content::Element(_) => true,
            Content::Text(text) => text.is_blank(),
        }) && element.elements().next().is_some();

        if block {
            self.newline();
            for child in element.elements() {
                self.indent(depth + 1);
                self.element(child, depth + 1)?;
                self.newline();
            }
            self.indent(depth);
        } else {
            for child in &element.children {
                match child {
                    Content::Element(child) => self.element(child, depth + 1)?,
                    Content::Text(text) => self.text(text)?,
                }
            }
        }

        self.output.push_str("</");
        self.output.push_str(&element.name);
        self.output.push('>');
        Ok(())
    }

    fn attributes(&mut self, attributes: &Attributes, quote: char) -> Result<()> {
        for (key, value) in attributes {
            check_name(key)?;
            self.output.push(' ');
            self.output.push_str(key);
            self.output.push('=');
            self.output.push(quote);
            escape_into(&mut self.output, value, Some(quote))?;
            self.output.push(quote);
        }
        Ok(())
    }

    fn text(&mut self, text: &Text) -> Result<()> {
        match text.raw() {
            Some(raw) => {
                self.output.push_str(raw);
                Ok(())
            }
            None => escape_into(&mut self.output, text.value(), None),
        }
    }

    fn indent(&mut self, depth: usize) {
        self.output.push_str(&self.layout.indent.repeat(depth));
    }

    fn newline(&mut self) {
        self.output.push_str(self.layout.line_ending.as_str());
    }
}

fn check_name(name: &str) -> Result<()> {
    let mut bytes = name.bytes();
    let valid = bytes.next().is_some_and(is_name_start) && bytes.all(is_name_char);
    if valid {
        Ok(())
    } else {
        Err(SerializeError::InvalidName {
            name: name.to_string(),
        })
    }
}

/// Characters XML 1.0 allows in a document
fn is_xml_char(ch: char) -> bool {
    matches!(
        ch,
        '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}'
    )
}

/// Escape markup characters, and `quote` inside an attribute value
fn escape_into(output: &mut String, input: &str, quote: Option<char>) -> Result<()> {
    for ch in input.chars() {
        match ch {
            '&' => output.push_str("&amp;"),
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            '"' if quote == Some('"') => output.push_str("&quot;"),
            '\'' if quote == Some('\'') => output.push_str("&apos;"),
            ch if is_xml_char(ch) => output.push(ch),
            ch => {
                return Err(SerializeError::InvalidCharacter {
                    ch,
                    context: if quote.is_some() { "attribute" } else { "text" },
                });
            }
        }
    }
    Ok(())
}
