//! XML parser implementation

use crate::error::{ErrorKind, ParseError, Span};
use crate::xml::cursor::Cursor;
use crate::xml::layout::{Indent, Layout, LineEnding};
use crate::xml::model::{Attributes, Content, Declaration, Document, Element, EmptyTag, Text};

type Result<T> = std::result::Result<T, ParseError>;

/// Configuration for the XML parser
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    /// Maximum element nesting depth (0 means unlimited)
    pub max_depth: u16,
    /// Maximum input size in bytes (0 means unlimited)
    pub max_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_depth: 128,
            max_size: 64 * 1024 * 1024,
        }
    }
}

impl Config {
    /// Create a new config with unlimited depth and size
    pub const fn unlimited() -> Self {
        Self {
            max_depth: 0,
            max_size: 0,
        }
    }

    /// Create a new config with specific limits
    pub const fn new(max_depth: u16, max_size: usize) -> Self {
        Self {
            max_depth,
            max_size,
        }
    }
}

/// XML parser
#[derive(Debug)]
pub struct Parser<'a> {
    input: &'a [u8],
    cursor: Cursor<'a>,
    config: Config,
    indent: Option<Indent>,
}

impl<'a> Parser<'a> {
    /// Create a new parser with default configuration
    pub fn new(input: &'a [u8]) -> Self {
        Self::with_config(input, Config::default())
    }

    /// Create a new parser with custom configuration
    pub const fn with_config(input: &'a [u8], config: Config) -> Self {
        Self {
            input,
            cursor: Cursor::new(input),
            config,
            indent: None,
        }
    }

    /// Parse an XML document, recording its layout along the way
    pub fn parse(&mut self) -> Result<Document> {
        if self.config.max_size != 0 && self.input.len() > self.config.max_size {
            return Err(ParseError::new(
                ErrorKind::MaxSizeExceeded {
                    max: self.config.max_size,
                },
                Span::empty(),
            ));
        }

        let mut layout = Layout {
            line_ending: LineEnding::detect(self.input).unwrap_or_default(),
            ..Layout::default()
        };

        let declaration = if self.at_declaration() {
            Some(self.parse_declaration()?)
        } else {
            None
        };

        let newlines = self.skip_misc()?;
        if declaration.is_some() {
            layout.blank_lines_after_declaration = newlines.saturating_sub(1);
        }

        if self.cursor.is_eof() {
            return Err(self.error_here(ErrorKind::Expected {
                expected: "root element".to_string(),
                found: "end of input".to_string(),
            }));
        }

        let root = self.parse_element(1)?;
        layout.trailing_newlines = self.skip_misc()?;

        if !self.cursor.is_eof() {
            return Err(self.error_here(ErrorKind::Expected {
                expected: "end of input".to_string(),
                found: self.describe_current(),
            }));
        }

        if let Some(indent) = self.indent {
            layout.indent = indent;
        }

        Ok(Document {
            declaration,
            root,
            layout,
        })
    }

    fn at_declaration(&self) -> bool {
        self.cursor.starts_with(b"<?xml")
            && matches!(
                self.cursor.peek(5),
                Some(b' ' | b'\t' | b'\r' | b'\n' | b'?')
            )
    }

    fn parse_declaration(&mut self) -> Result<Declaration> {
        self.cursor.advance_by(5);
        let (attributes, quote) = self.parse_attributes()?;
        self.expect_byte(b'?')?;
        self.expect_byte(b'>')?;
        Ok(Declaration {
            attributes,
            quote: quote.unwrap_or('"'),
        })
    }

    fn parse_element(&mut self, depth: u16) -> Result<Element> {
        if self.config.max_depth != 0 && depth > self.config.max_depth {
            return Err(self.error_here(ErrorKind::MaxDepthExceeded {
                max: self.config.max_depth,
            }));
        }

        self.expect_byte(b'<')?;
        let name = self.parse_name()?;
        let (attributes, _) = self.parse_attributes()?;

        if self.cursor.current() == Some(b'/') {
            let spaced = self.after_whitespace();
            self.cursor.advance();
            self.expect_byte(b'>')?;
            return Ok(Element {
                name,
                attributes,
                children: Vec::new(),
                empty_tag: if spaced {
                    EmptyTag::Spaced
                } else {
                    EmptyTag::Closed
                },
            });
        }

        self.expect_byte(b'>')?;

        let mut children = Vec::new();
        loop {
            if self.cursor.starts_with(b"</") {
                self.cursor.advance_by(2);
                let start = self.cursor.position();
                let close_name = self.parse_name()?;
                if close_name != name {
                    return Err(ParseError::new(
                        ErrorKind::MismatchedTag {
                            expected: name,
                            found: close_name,
                        },
                        Span::new(start, self.cursor.position()),
                    ));
                }
                self.skip_whitespace();
                self.expect_byte(b'>')?;
                break;
            }

            if self.cursor.starts_with(b"<!--") {
                self.cursor.advance_by(4);
                self.skip_until(b"-->")?;
                continue;
            }

            if self.cursor.starts_with(b"<![CDATA[") {
                self.cursor.advance_by(9);
                let text = self.read_until(b"]]>")?;
                let raw = format!("<![CDATA[{text}]]>");
                children.push(Content::Text(Text::parsed(text, raw)));
                continue;
            }

            if self.cursor.starts_with(b"<?") {
                self.cursor.advance_by(2);
                self.skip_until(b"?>")?;
                continue;
            }

            if self.cursor.current() == Some(b'<') {
                let child = self.parse_element(depth.saturating_add(1))?;
                children.push(Content::Element(child));
                continue;
            }

            if self.cursor.is_eof() {
                return Err(self.error_here(ErrorKind::UnexpectedEof));
            }

            let text = self.parse_text()?;
            if depth == 1 && self.indent.is_none() && text.is_blank() {
                self.indent = Indent::detect(text.value());
            }
            children.push(Content::Text(text));
        }

        // Blank text between child elements is indentation; the writer regenerates it.
        // In leaf elements and mixed content it is data.
        let has_elements = children.iter().any(|c| matches!(c, Content::Element(_)));
        let mixed = children
            .iter()
            .any(|c| matches!(c, Content::Text(text) if !text.is_blank()));
        if has_elements && !mixed {
            children.retain(|c| matches!(c, Content::Element(_)));
        }

        Ok(Element {
            name,
            attributes,
            children,
            empty_tag: EmptyTag::Pair,
        })
    }

    /// Attributes up to `/`, `>` or `?`, and the quote used by the first one
    fn parse_attributes(&mut self) -> Result<(Attributes, Option<char>)> {
        let mut attrs = Attributes::new();
        let mut first_quote = None;

        loop {
            self.skip_whitespace();
            match self.cursor.current() {
                Some(b'/' | b'>' | b'?') => break,
                Some(_) => {}
                None => return Err(self.error_here(ErrorKind::UnexpectedEof)),
            }

            let start = self.cursor.position();
            let name = self.parse_name()?;
            self.skip_whitespace();
            self.expect_byte(b'=')?;
            self.skip_whitespace();
            let (value, quote) = self.parse_attribute_value()?;
            first_quote.get_or_insert(char::from(quote));

            if attrs.contains_key(&name) {
                return Err(ParseError::new(
                    ErrorKind::DuplicateAttribute { name },
                    Span::new(start, self.cursor.position()),
                ));
            }
            attrs.insert(name, value);
        }

        Ok((attrs, first_quote))
    }

    fn parse_attribute_value(&mut self) -> Result<(String, u8)> {
        let quote = match self.cursor.current() {
            Some(quote @ (b'"' | b'\'')) => quote,
            _ => {
                return Err(self.error_here(ErrorKind::Expected {
                    expected: "quoted attribute value".to_string(),
                    found: self.describe_current(),
                }));
            }
        };
        self.cursor.advance();

        let start_pos = self.cursor.position();
        let start = self.cursor.pos();
        while let Some(b) = self.cursor.current() {
            if b == quote {
                let raw = self.cursor.slice_from(start);
                self.cursor.advance();
                let text = bytes_to_string(raw)?;
                let value = decode_entities(&text).map_err(|entity| {
                    ParseError::new(ErrorKind::InvalidEntity { entity }, Span::at(start_pos))
                })?;
                return Ok((value, quote));
            }
            self.cursor.advance();
        }

        Err(self.error_here(ErrorKind::UnexpectedEof))
    }

    fn parse_text(&mut self) -> Result<Text> {
        let start_pos = self.cursor.position();
        let start = self.cursor.pos();
        while let Some(b) = self.cursor.current() {
            if b == b'<' {
                break;
            }
            self.cursor.advance();
        }

        let raw = bytes_to_string(self.cursor.slice_from(start))?;
        let value = decode_entities(&raw).map_err(|entity| {
            ParseError::new(ErrorKind::InvalidEntity { entity }, Span::at(start_pos))
        })?;
        Ok(Text::parsed(value, raw))
    }

    fn parse_name(&mut self) -> Result<String> {
        let start = self.cursor.pos();

        match self.cursor.current() {
            Some(first) if is_name_start(first) => self.cursor.advance(),
            _ => {
                return Err(self.error_here(ErrorKind::Expected {
                    expected: "name".to_string(),
                    found: self.describe_current(),
                }));
            }
        }

        while let Some(b) = self.cursor.current() {
            if is_name_char(b) {
                self.cursor.advance();
            } else {
                break;
            }
        }

        bytes_to_string(self.cursor.slice_from(start))
    }

    /// Skip whitespace, comments, doctype and processing instructions outside
    /// the root element. Returns the number of line breaks seen.
    fn skip_misc(&mut self) -> Result<usize> {
        let mut newlines = 0;
        loop {
            newlines += self.skip_whitespace();
            if self.cursor.starts_with(b"<!--") {
                self.cursor.advance_by(4);
                self.skip_until(b"-->")?;
            } else if self.cursor.starts_with(b"<?") {
                self.cursor.advance_by(2);
                self.skip_until(b"?>")?;
            } else if self.cursor.starts_with(b"<!") {
                self.cursor.advance_by(2);
                self.skip_until(b">")?;
            } else {
                return Ok(newlines);
            }
        }
    }

    fn skip_until(&mut self, pattern: &[u8]) -> Result<()> {
        while !self.cursor.is_eof() {
            if self.cursor.starts_with(pattern) {
                self.cursor.advance_by(pattern.len());
                return Ok(());
            }
            self.cursor.advance();
        }
        Err(self.error_here(ErrorKind::UnexpectedEof))
    }

    fn read_until(&mut self, pattern: &[u8]) -> Result<String> {
        let start = self.cursor.pos();
        while !self.cursor.is_eof() {
            if self.cursor.starts_with(pattern) {
                let text = bytes_to_string(self.cursor.slice_from(start))?;
                self.cursor.advance_by(pattern.len());
                return Ok(text);
            }
            self.cursor.advance();
        }
        Err(self.error_here(ErrorKind::UnexpectedEof))
    }

    fn expect_byte(&mut self, expected: u8) -> Result<()> {
        if self.cursor.consume(expected) {
            Ok(())
        } else {
            Err(self.error_here(ErrorKind::Expected {
                expected: format!("'{}'", expected.escape_ascii()),
                found: self.describe_current(),
            }))
        }
    }

    /// Returns the number of line breaks skipped
    fn skip_whitespace(&mut self) -> usize {
        let mut newlines = 0;
        while let Some(b) = self.cursor.current() {
            match b {
                b'\n' => newlines += 1,
                b' ' | b'\t' | b'\r' => {}
                _ => break,
            }
            self.cursor.advance();
        }
        newlines
    }

    /// Whether the byte before the cursor is whitespace
    fn after_whitespace(&self) -> bool {
        self.cursor
            .pos()
            .checked_sub(1)
            .and_then(|idx| self.input.get(idx))
            .is_some_and(u8::is_ascii_whitespace)
    }

    fn describe_current(&self) -> String {
        match self.cursor.current() {
            Some(b) => format!("'{}'", b.escape_ascii()),
            None => "end of input".to_string(),
        }
    }

    fn error_here(&self, kind: ErrorKind) -> ParseError {
        ParseError::new(kind, Span::at(self.cursor.position()))
    }
}

fn bytes_to_string(bytes: &[u8]) -> Result<String> {
    std::str::from_utf8(bytes)
        .map(str::to_string)
        .map_err(|_| {
            ParseError::new(
                ErrorKind::InvalidEncoding {
                    encoding: "UTF-8".to_string(),
                },
                Span::empty(),
            )
        })
}

pub(crate) fn is_name_start(b: u8) -> bool {
    matches!(b, b'A'..=b'Z' | b'a'..=b'z' | b'_' | b':') || b >= 0x80
}

pub(crate) fn is_name_char(b: u8) -> bool {
    is_name_start(b) || matches!(b, b'0'..=b'9' | b'-' | b'.')
}

/// Replace entity references; the offending entity name is the error.
fn decode_entities(input: &str) -> std::result::Result<String, String> {
    if !input.contains('&') {
        return Ok(input.to_string());
    }

    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars();
    while let Some(ch) = chars.next() {
        if ch != '&' {
            result.push(ch);
            continue;
        }

        let mut entity = String::new();
        let mut terminated = false;
        for next in chars.by_ref() {
            if next == ';' {
                terminated = true;
                break;
            }
            entity.push(next);
        }

        let decoded = match entity.as_str() {
            _ if !terminated => None,
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            _ => decode_numeric_entity(&entity),
        };

        match decoded {
            Some(ch) => result.push(ch),
            None => return Err(entity),
        }
    }

    Ok(result)
}

fn decode_numeric_entity(entity: &str) -> Option<char> {
    if let Some(hex) = entity.strip_prefix("#x") {
        u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
    } else if let Some(dec) = entity.strip_prefix('#') {
        dec.parse::<u32>().ok().and_then(char::from_u32)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ensure_eq<T: PartialEq + std::fmt::Debug>(left: T, right: T) -> Result<()> {
        if left == right {
            Ok(())
        } else {
            Err(ParseError::new(
                ErrorKind::Expected {
                    expected: format!("{right:?}"),
                    found: format!("{left:?}"),
                },
                Span::empty(),
            ))
        }
    }

    fn first_element(element: &Element) -> Result<&Element> {
        element.elements().next().ok_or_else(|| {
            ParseError::new(
                ErrorKind::Expected {
                    expected: "child element".to_string(),
                    found: "none".to_string(),
                },
                Span::empty(),
            )
        })
    }

    fn parse_err(input: &[u8]) -> Option<ErrorKind> {
        Parser::new(input).parse().err().map(|e| e.kind().clone())
    }

    #[test]
    fn test_parse_simple_element() -> Result<()> {
        let doc = Parser::new(b"<project></project>").parse()?;

        ensure_eq(doc.root.name.as_str(), "project")?;
        ensure_eq(doc.root.children.len(), 0)?;
        ensure_eq(doc.root.empty_tag, EmptyTag::Pair)?;
        ensure_eq(doc.declaration, None)?;
        Ok(())
    }

    #[test]
    fn test_parse_with_attributes_in_order() -> Result<()> {
        let doc = Parser::new(b"<root z=\"1\" a='two' m=\"&amp;\"></root>").parse()?;

        let keys: Vec<&str> = doc.root.attributes.keys().map(String::as_str).collect();
        ensure_eq(keys, vec!["z", "a", "m"])?;
        ensure_eq(doc.root.attributes.get("a"), Some(&"two".to_string()))?;
        ensure_eq(doc.root.attributes.get("m"), Some(&"&".to_string()))?;
        Ok(())
    }

    #[test]
    fn test_parse_nested() -> Result<()> {
        let doc = Parser::new(b"<project><file><name>a&lt;b.c</name></file></project>").parse()?;

        let file = first_element(&doc.root)?;
        ensure_eq(file.name.as_str(), "file")?;
        let name = first_element(file)?;
        ensure_eq(name.text(), "a<b.c".to_string())?;
        Ok(())
    }

    #[test]
    fn test_parse_empty_tag_styles() -> Result<()> {
        let doc = Parser::new(b"<root><a /><b/><c x=\"1\"/><d></d></root>").parse()?;

        let children: Vec<(&str, EmptyTag)> = doc
            .root
            .elements()
            .map(|e| (e.name.as_str(), e.empty_tag))
            .collect();
        ensure_eq(
            children,
            vec![
                ("a", EmptyTag::Spaced),
                ("b", EmptyTag::Closed),
                ("c", EmptyTag::Closed),
                ("d", EmptyTag::Pair),
            ],
        )?;
        Ok(())
    }

    #[test]
    fn test_blank_leaf_text_is_kept() -> Result<()> {
        let doc = Parser::new(b"<option>\n  <state> </state>\n  <name>\n</name>\n</option>").parse()?;

        ensure_eq(doc.root.children.len(), 2)?;
        let texts: Vec<String> = doc.root.elements().map(Element::text).collect();
        ensure_eq(texts, vec![" ".to_string(), "\n".to_string()])?;
        Ok(())
    }

    #[test]
    fn test_mixed_content_keeps_all_text() -> Result<()> {
        let doc = Parser::new(b"<a>\n  hi\n  <b/>\n</a>").parse()?;
        ensure_eq(doc.root.children.len(), 3)?;
        ensure_eq(doc.root.text(), "\n  hi\n  \n".to_string())?;
        Ok(())
    }

    #[test]
    fn test_text_keeps_source_form() -> Result<()> {
        let doc = Parser::new(b"<state>A=&quot;1&quot; &#65;</state>").parse()?;
        let Some(Content::Text(text)) = doc.root.children.first() else {
            return ensure_eq("text", "missing");
        };
        ensure_eq(text.value(), "A=\"1\" A")?;
        ensure_eq(text.raw(), Some("A=&quot;1&quot; &#65;"))?;
        Ok(())
    }

    #[test]
    fn test_parse_declaration() -> Result<()> {
        let input = b"<?xml version=\"1.0\" encoding=\"iso-8859-1\"?>\n\n<project/>\n";
        let doc = Parser::new(input).parse()?;

        let declaration = doc.declaration.clone().unwrap_or_default();
        ensure_eq(declaration.encoding(), Some("iso-8859-1"))?;
        ensure_eq(declaration.quote, '"')?;
        ensure_eq(doc.layout.blank_lines_after_declaration, 1)?;
        ensure_eq(doc.layout.trailing_newlines, 1)?;
        Ok(())
    }

    #[test]
    fn test_single_quoted_declaration() -> Result<()> {
        let doc = Parser::new(b"<?xml version='1.0' encoding='UTF-8'?><project/>\n\n\n").parse()?;
        ensure_eq(doc.declaration.map(|d| d.quote), Some('\''))?;
        ensure_eq(doc.layout.trailing_newlines, 3)?;
        Ok(())
    }

    #[test]
    fn test_detects_iar_layout() -> Result<()> {
        let input = b"<?xml version=\"1.0\"?>\r\n<project>\r\n  <fileVersion>3</fileVersion>\r\n</project>";
        let doc = Parser::new(input).parse()?;

        ensure_eq(doc.layout.indent, Indent::Spaces(2))?;
        ensure_eq(doc.layout.line_ending, LineEnding::CrLf)?;
        ensure_eq(doc.layout.blank_lines_after_declaration, 0)?;
        ensure_eq(doc.layout.trailing_newlines, 0)?;
        Ok(())
    }

    #[test]
    fn test_single_line_document_uses_default_layout() -> Result<()> {
        let doc = Parser::new(b"<project><group/></project>").parse()?;
        ensure_eq(doc.layout, Layout::default())?;
        Ok(())
    }

    #[test]
    fn test_comments_and_instructions_are_skipped() -> Result<()> {
        let input = b"<!-- head --><project><!-- inner --><?pi data?><file/></project><!-- tail -->";
        let doc = Parser::new(input).parse()?;

        ensure_eq(doc.root.children.len(), 1)?;
        Ok(())
    }

    #[test]
    fn test_cdata_becomes_text() -> Result<()> {
        let doc = Parser::new(b"<name><![CDATA[a<b]]></name>").parse()?;
        ensure_eq(doc.root.text(), "a<b".to_string())?;
        let raw = match doc.root.children.first() {
            Some(Content::Text(text)) => text.raw(),
            _ => None,
        };
        ensure_eq(raw, Some("<![CDATA[a<b]]>"))?;
        Ok(())
    }

    #[test]
    fn test_mismatched_closing_tag() {
        assert_eq!(
            parse_err(b"<project><group></file></project>"),
            Some(ErrorKind::MismatchedTag {
                expected: "group".to_string(),
                found: "file".to_string(),
            })
        );
    }

    #[test]
    fn test_duplicate_attribute() {
        assert_eq!(
            parse_err(b"<project a=\"1\" a=\"2\"/>"),
            Some(ErrorKind::DuplicateAttribute {
                name: "a".to_string()
            })
        );
    }

    #[test]
    fn test_unterminated_element() {
        assert_eq!(parse_err(b"<project><group>"), Some(ErrorKind::UnexpectedEof));
    }

    #[test]
    fn test_invalid_entity() {
        assert_eq!(
            parse_err(b"<name>&bogus;</name>"),
            Some(ErrorKind::InvalidEntity {
                entity: "bogus".to_string()
            })
        );
    }

    #[test]
    fn test_trailing_content_is_rejected() {
        assert!(matches!(
            parse_err(b"<project/><project/>"),
            Some(ErrorKind::Expected { .. })
        ));
    }

    #[test]
    fn test_empty_input() {
        assert!(matches!(parse_err(b"  \n"), Some(ErrorKind::Expected { .. })));
    }

    #[test]
    fn test_error_position() {
        let err = Parser::new(b"<project>\n  <group\n</project>").parse().err();
        let line = err.map(|e| e.span().start.line);
        assert_eq!(line, Some(3));
    }

    #[test]
    fn test_max_depth() {
        let config = Config::new(2, 0);
        let result = Parser::with_config(b"<a><b><c/></b></a>", config).parse();
        assert_eq!(
            result.err().map(|e| e.kind().clone()),
            Some(ErrorKind::MaxDepthExceeded { max: 2 })
        );
    }

    #[test]
    fn test_max_size() {
        let config = Config::new(0, 4);
        let result = Parser::with_config(b"<project/>", config).parse();
        assert_eq!(
            result.err().map(|e| e.kind().clone()),
            Some(ErrorKind::MaxSizeExceeded { max: 4 })
        );
    }

    #[test]
    fn test_unlimited_config() -> Result<()> {
        let doc = Parser::with_config(b"<a><b><c/></b></a>", Config::unlimited()).parse()?;
        ensure_eq(doc.root.name.as_str(), "a")?;
        Ok(())
    }
}
