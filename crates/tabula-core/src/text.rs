//! Positioned glyph records and script direction.

use unicode_bidi::{BidiClass, bidi_class};

use crate::geometry::Rect;

/// Dominant script direction of a glyph, chunk, or line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TextDirection {
    #[default]
    Ltr,
    Rtl,
}

/// Direction tag for a piece of text.
///
/// Right-to-left covers the Arabic, Hebrew, Syriac, Thaana, and N'Ko
/// blocks plus the Arabic/Hebrew presentation forms, via the Unicode
/// bidirectional classes R, AL, and AN.
pub fn direction_of(text: &str) -> TextDirection {
    for ch in text.chars() {
        match bidi_class(ch) {
            BidiClass::R | BidiClass::AL | BidiClass::AN => return TextDirection::Rtl,
            _ => {}
        }
    }
    TextDirection::Ltr
}

/// A single positioned character from a PDF page.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TextElement {
    /// Bounding box in top-left origin page coordinates.
    pub rect: Rect,
    /// The character text.
    pub text: String,
    /// Font name (e.g. "Helvetica", "BCDFEE+ArialMT").
    pub font_name: String,
    /// Font size in points.
    pub font_size: f64,
    /// Width of the space character in this font at this size.
    pub width_of_space: f64,
    /// Script direction derived from the character.
    pub direction: TextDirection,
}

impl TextElement {
    /// Create a glyph record, deriving the direction tag from the text.
    pub fn new(
        rect: Rect,
        text: impl Into<String>,
        font_name: impl Into<String>,
        font_size: f64,
        width_of_space: f64,
    ) -> Self {
        let text = text.into();
        let direction = direction_of(&text);
        Self {
            rect,
            text,
            font_name: font_name.into(),
            font_size,
            width_of_space,
            direction,
        }
    }

    /// Whether the glyph consists only of whitespace.
    pub fn is_whitespace(&self) -> bool {
        self.text.chars().all(char::is_whitespace)
    }

    /// Glyph origin — the top-left corner of its box.
    pub fn origin(&self) -> (f64, f64) {
        (self.rect.top, self.rect.left)
    }
}
