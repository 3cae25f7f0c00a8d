//! Raw project bytes and their decoding

use std::borrow::Cow;

use encoding_rs::{Encoding, UTF_8};

use crate::charset;
use crate::error::{ErrorKind, ParseError, Span};

/// Undecoded project bytes
#[derive(Clone, Debug)]
pub struct Input<'a> {
    source: &'a [u8],
}

/// Input text after byte-order-mark and charset handling
#[derive(Clone, Debug)]
pub struct Decoded<'a> {
    pub text: Cow<'a, str>,
    pub encoding: &'static Encoding,
    pub bom: bool,
}

impl<'a> Input<'a> {
    /// Create from byte slice
    pub const fn from_bytes(source: &'a [u8]) -> Self {
        Self { source }
    }

    /// Decode the source into text.
    ///
    /// A UTF-8 byte order mark wins over the declaration; otherwise the declared
    /// encoding is used, and UTF-8 when nothing is declared.
    pub fn decode(&self) -> Result<Decoded<'a>, ParseError> {
        let (body, bom) = match self.source.strip_prefix(charset::UTF8_BOM) {
            Some(rest) => (rest, true),
            None => (self.source, false),
        };

        let encoding = match charset::declared_label(body) {
            _ if bom => UTF_8,
            Some(label) => charset::lookup(label).ok_or_else(|| {
                ParseError::new(
                    ErrorKind::UnknownEncoding {
                        label: label.to_string(),
                    },
                    Span::empty(),
                )
            })?,
            None => UTF_8,
        };

        if !encoding.is_ascii_compatible() {
            return Err(ParseError::new(
                ErrorKind::UnsupportedEncoding {
                    label: encoding.name().to_string(),
                },
                Span::empty(),
            ));
        }

        let text = charset::decode(body, encoding).ok_or_else(|| {
            ParseError::new(
                ErrorKind::InvalidEncoding {
                    encoding: encoding.name().to_string(),
                },
                Span::empty(),
            )
        })?;

        Ok(Decoded {
            text,
            encoding,
            bom,
        })
    }
}
