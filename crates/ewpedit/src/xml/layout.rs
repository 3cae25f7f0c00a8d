//! Formatting conventions of a document
//!
//! The parser records how the input was laid out and the writer reproduces it, so an
//! untouched document is written back byte for byte.

/// One level of indentation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Indent {
    Spaces(usize),
    Tabs(usize),
}

impl Indent {
    /// Indentation string for `depth` levels
    pub fn repeat(self, depth: usize) -> String {
        match self {
            Self::Spaces(width) => " ".repeat(width * depth),
            Self::Tabs(width) => "\t".repeat(width * depth),
        }
    }

    /// Guess the unit from the whitespace that precedes a depth-one element.
    ///
    /// Only the part after the last line break counts; mixed tabs and spaces are
    /// not a usable unit.
    pub fn detect(whitespace: &str) -> Option<Self> {
        let (_, line) = whitespace.rsplit_once('\n')?;
        if line.is_empty() {
            return None;
        }
        if line.bytes().all(|b| b == b' ') {
            Some(Self::Spaces(line.len()))
        } else if line.bytes().all(|b| b == b'\t') {
            Some(Self::Tabs(line.len()))
        } else {
            None
        }
    }
}

impl Default for Indent {
    fn default() -> Self {
        Self::Spaces(4)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LineEnding {
    #[default]
    Lf,
    CrLf,
}

impl LineEnding {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::CrLf => "\r\n",
        }
    }

    /// Line ending of the first line break in `input`
    pub fn detect(input: &[u8]) -> Option<Self> {
        let newline = input.iter().position(|&b| b == b'\n')?;
        let before = newline.checked_sub(1).and_then(|idx| input.get(idx));
        if before == Some(&b'\r') {
            Some(Self::CrLf)
        } else {
            Some(Self::Lf)
        }
    }
}

/// How a document is written out
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Layout {
    pub indent: Indent,
    pub line_ending: LineEnding,
    /// Empty lines between the declaration and the root element
    pub blank_lines_after_declaration: usize,
    /// Line breaks after the closing root tag
    pub trailing_newlines: usize,
    /// Leading UTF-8 byte order mark
    pub bom: bool,
}
