//! Declared document encodings
//!
//! IAR writes project files as `iso-8859-1`. Bytes are decoded with the encoding named
//! in the XML declaration and encoded back with the same one, so a file that never
//! contained anything outside that charset comes back byte for byte.

use std::borrow::Cow;

use encoding_rs::{EncoderResult, Encoding, UTF_8};

use crate::error::SerializeError;

pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Look up an encoding by its declaration label (`UTF-8`, `iso-8859-1`, ...)
pub fn lookup(label: &str) -> Option<&'static Encoding> {
    Encoding::for_label(label.trim().as_bytes())
}

/// Read the `encoding` pseudo-attribute from a leading XML declaration without
/// decoding the rest of the input.
pub fn declared_label(bytes: &[u8]) -> Option<&str> {
    let head = bytes.strip_prefix(b"<?xml")?;
    let end = head.windows(2).position(|w| w == b"?>")?;
    let decl = std::str::from_utf8(head.get(..end)?).ok()?;

    let (_, rest) = decl.split_once("encoding")?;
    let rest = rest.trim_start().strip_prefix('=')?.trim_start();
    let quote = rest.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    let value = rest.get(1..)?;
    let (label, _) = value.split_once(quote)?;
    Some(label)
}

/// Decode without replacement; `None` if the bytes are malformed for `encoding`.
pub fn decode<'a>(bytes: &'a [u8], encoding: &'static Encoding) -> Option<Cow<'a, str>> {
    encoding.decode_without_bom_handling_and_without_replacement(bytes)
}

/// Encode `text`, failing on the first character the encoding cannot represent.
pub fn encode(
    text: &str,
    encoding: &'static Encoding,
    bom: bool,
) -> Result<Vec<u8>, SerializeError> {
    if !encoding.is_ascii_compatible() {
        return Err(SerializeError::UnsupportedEncoding {
            label: encoding.name().to_string(),
        });
    }

    let mut out = Vec::with_capacity(text.len() + UTF8_BOM.len());
    if bom && encoding == UTF_8 {
        out.extend_from_slice(UTF8_BOM);
    }

    let mut encoder = encoding.new_encoder();
    let mut rest = text;
    loop {
        let (result, read) = encoder.encode_from_utf8_to_vec_without_replacement(rest, &mut out, true);
        rest = rest.get(read..).unwrap_or_default();
        match result {
            EncoderResult::InputEmpty => return Ok(out),
            EncoderResult::OutputFull => out.reserve(rest.len() + 16),
            EncoderResult::Unmappable(ch) => {
                return Err(SerializeError::Unencodable {
                    ch,
                    encoding: encoding.name(),
                });
            }
        }
    }
}
