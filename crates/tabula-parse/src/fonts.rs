//! Font metrics and text decoding.
//!
//! Extracts the pieces of a font dictionary this pipeline consumes:
//! glyph widths, the ToUnicode CMap, and the space width. Simple fonts
//! without a ToUnicode map decode through WinAnsi; fonts without width
//! arrays fall back to built-in metrics for the standard families.

use std::collections::HashMap;

use encoding_rs::WINDOWS_1252;
use tracing::trace;

use crate::document::{PdfDocument, object_to_f64};
use crate::error::BackendError;

/// Default glyph width (1/1000 text space units) when nothing better is
/// known.
const DEFAULT_WIDTH: f64 = 500.0;

/// Fallback space width when the font defines no width for code 32
/// (a quarter em).
const DEFAULT_SPACE_WIDTH: f64 = 250.0;

/// Width metrics and decoding tables for one font.
#[derive(Debug, Clone)]
pub struct FontInfo {
    /// Base font name with any subset prefix intact.
    pub name: String,
    first_char: u32,
    widths: Vec<f64>,
    default_width: f64,
    space_width: f64,
    to_unicode: Option<HashMap<u32, String>>,
    /// Two-byte character codes (Type0/composite fonts).
    two_byte_codes: bool,
}

impl Default for FontInfo {
    fn default() -> Self {
        Self {
            name: String::new(),
            first_char: 0,
            widths: Vec::new(),
            default_width: DEFAULT_WIDTH,
            space_width: DEFAULT_SPACE_WIDTH,
            to_unicode: None,
            two_byte_codes: false,
        }
    }
}

/// Built-in metrics for the standard font families.
fn standard_metrics(name: &str) -> (f64, f64) {
    if name.contains("Courier") {
        (600.0, 600.0)
    } else if name.contains("Times") {
        (500.0, 250.0)
    } else if name.contains("Helvetica") || name.contains("Arial") {
        (556.0, 278.0)
    } else {
        (DEFAULT_WIDTH, DEFAULT_SPACE_WIDTH)
    }
}

impl FontInfo {
    /// Build font info from a font dictionary, degrading to defaults on
    /// anything unsupported.
    pub fn from_dict(doc: &PdfDocument, dict: &lopdf::Dictionary) -> Self {
        let name = dict
            .get(b"BaseFont")
            .ok()
            .and_then(|o| o.as_name().ok())
            .map(|n| String::from_utf8_lossy(n).into_owned())
            .unwrap_or_default();

        let two_byte_codes = dict
            .get(b"Subtype")
            .ok()
            .and_then(|o| o.as_name().ok())
            .is_some_and(|n| n == b"Type0");

        let (default_width, standard_space) = standard_metrics(&name);

        let first_char = dict
            .get(b"FirstChar")
            .ok()
            .and_then(|o| o.as_i64().ok())
            .unwrap_or(0) as u32;

        let widths = dict
            .get(b"Widths")
            .ok()
            .and_then(|o| doc.resolve(o).ok())
            .and_then(|o| o.as_array().ok())
            .map(|array| {
                array
                    .iter()
                    .map(|item| {
                        doc.resolve(item)
                            .ok()
                            .and_then(|o| object_to_f64(o).ok())
                            .unwrap_or(default_width)
                    })
                    .collect()
            })
            .unwrap_or_default();

        let to_unicode = dict
            .get(b"ToUnicode")
            .ok()
            .and_then(|o| o.as_reference().ok())
            .and_then(|id| doc.cmap_bytes(id).ok())
            .map(|bytes| parse_to_unicode(&bytes));

        let mut font = Self {
            name,
            first_char,
            widths,
            default_width,
            space_width: standard_space,
            to_unicode,
            two_byte_codes,
        };
        let explicit_space = font.lookup_width(32);
        if let Some(w) = explicit_space {
            if w > 0.0 {
                font.space_width = w;
            }
        }
        trace!(font = %font.name, widths = font.widths.len(), "loaded font metrics");
        font
    }

    fn lookup_width(&self, code: u32) -> Option<f64> {
        if code < self.first_char {
            return None;
        }
        self.widths.get((code - self.first_char) as usize).copied()
    }

    /// Glyph width for a character code, in 1/1000 text space units.
    pub fn width(&self, code: u32) -> f64 {
        self.lookup_width(code).unwrap_or(self.default_width)
    }

    /// Width of the space character, in 1/1000 text space units.
    pub fn space_width(&self) -> f64 {
        self.space_width
    }

    /// Decode a show-string into `(code, text)` pairs.
    pub fn decode(&self, bytes: &[u8]) -> Vec<(u32, String)> {
        if self.two_byte_codes {
            bytes
                .chunks_exact(2)
                .map(|pair| {
                    let code = u32::from(pair[0]) << 8 | u32::from(pair[1]);
                    (code, self.code_to_text(code))
                })
                .collect()
        } else {
            bytes
                .iter()
                .map(|&b| {
                    let code = u32::from(b);
                    (code, self.code_to_text(code))
                })
                .collect()
        }
    }

    fn code_to_text(&self, code: u32) -> String {
        if let Some(map) = &self.to_unicode {
            return map.get(&code).cloned().unwrap_or_default();
        }
        if self.two_byte_codes {
            // No ToUnicode map: the code is unrecoverable
            return String::new();
        }
        let byte = [code as u8];
        let (text, _, _) = WINDOWS_1252.decode(&byte);
        // Drop control characters that have no glyph
        if text.chars().any(char::is_control) {
            String::new()
        } else {
            text.into_owned()
        }
    }
}

/// Parse the bfchar/bfrange sections of a ToUnicode CMap.
fn parse_to_unicode(bytes: &[u8]) -> HashMap<u32, String> {
    let text = String::from_utf8_lossy(bytes);
    let mut map = HashMap::new();

    let mut rest = text.as_ref();
    while let Some(start) = rest.find("beginbfchar") {
        let section = &rest[start + "beginbfchar".len()..];
        let end = section.find("endbfchar").unwrap_or(section.len());
        let tokens = hex_tokens(&section[..end]);
        for pair in tokens.chunks_exact(2) {
            if let (Some(code), Some(target)) = (hex_to_u32(&pair[0]), hex_to_string(&pair[1])) {
                map.insert(code, target);
            }
        }
        rest = &section[end..];
    }

    let mut rest = text.as_ref();
    while let Some(start) = rest.find("beginbfrange") {
        let section = &rest[start + "beginbfrange".len()..];
        let end = section.find("endbfrange").unwrap_or(section.len());
        let tokens = hex_tokens(&section[..end]);
        for triple in tokens.chunks_exact(3) {
            let (Some(lo), Some(hi), Some(base)) = (
                hex_to_u32(&triple[0]),
                hex_to_u32(&triple[1]),
                hex_to_u32(&triple[2]),
            ) else {
                continue;
            };
            for offset in 0..=hi.saturating_sub(lo) {
                if let Some(c) = char::from_u32(base + offset) {
                    map.insert(lo + offset, c.to_string());
                }
            }
        }
        rest = &section[end..];
    }

    map
}

/// Collect `<...>` hex tokens from a CMap section.
fn hex_tokens(section: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current: Option<String> = None;
    for ch in section.chars() {
        match (ch, current.as_mut()) {
            ('<', _) => current = Some(String::new()),
            ('>', Some(token)) => {
                tokens.push(std::mem::take(token));
                current = None;
            }
            (c, Some(token)) if c.is_ascii_hexdigit() => token.push(c),
            _ => {}
        }
    }
    tokens
}

fn hex_to_u32(token: &str) -> Option<u32> {
    u32::from_str_radix(token, 16).ok()
}

/// A hex token to text: UTF-16BE code units, 4 hex digits each.
fn hex_to_string(token: &str) -> Option<String> {
    if token.len() % 4 != 0 {
        return hex_to_u32(token).and_then(char::from_u32).map(String::from);
    }
    let units: Option<Vec<u16>> = (0..token.len())
        .step_by(4)
        .map(|i| u16::from_str_radix(&token[i..i + 4], 16).ok())
        .collect();
    String::from_utf16(&units?).ok()
}

impl PdfDocument {
    /// Decompressed bytes of a CMap stream object.
    pub(crate) fn cmap_bytes(&self, id: lopdf::ObjectId) -> Result<Vec<u8>, BackendError> {
        let reference = lopdf::Object::Reference(id);
        let obj = self.resolve(&reference)?;
        let stream = obj
            .as_stream()
            .map_err(|e| BackendError::Parse(format!("ToUnicode is not a stream: {e}")))?;
        stream
            .decompressed_content()
            .or_else(|_| Ok(stream.content.clone()))
    }
}
