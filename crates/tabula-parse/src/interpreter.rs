//! Content-stream interpreter.
//!
//! Walks a page's decoded operations, forwarding path and graphics-state
//! operators untransformed to the core [`PathPaintDevice`] (which owns
//! the CTM for path purposes) while resolving text-showing operators to
//! positioned glyph records through the text matrix and its own copy of
//! the CTM.

use std::collections::HashMap;

use lopdf::content::Operation;
use tracing::{debug, trace};

use tabula_core::geometry::{Ctm, Point, Rect};
use tabula_core::receiver::PathPaintDevice;
use tabula_core::text::TextElement;

use crate::document::{PdfDocument, object_to_f64};
use crate::error::BackendError;
use crate::fonts::FontInfo;

/// Device-to-page projection for glyph coordinates.
///
/// `origin_x`/`origin_y` are the media-box lower-left corner;
/// `y_inverted` reverses the sign convention for media boxes whose
/// y-axis already points down.
#[derive(Debug, Clone, Copy)]
pub struct PageSpace {
    pub origin_x: f64,
    pub origin_y: f64,
    pub height: f64,
    pub y_inverted: bool,
}

impl PageSpace {
    /// Project a device point into top-left page coordinates.
    pub fn to_page(&self, x: f64, y: f64) -> (f64, f64) {
        let px = x - self.origin_x;
        let py = y - self.origin_y;
        let page_y = if self.y_inverted { py } else { self.height - py };
        (px, page_y)
    }
}

/// Text state per PDF 9.3: matrices, spacing, scaling, leading.
struct TextState {
    tm: Ctm,
    tlm: Ctm,
    leading: f64,
    char_spacing: f64,
    word_spacing: f64,
    h_scale: f64,
    rise: f64,
    font_size: f64,
    font_key: Option<String>,
}

impl TextState {
    fn new() -> Self {
        Self {
            tm: Ctm::identity(),
            tlm: Ctm::identity(),
            leading: 0.0,
            char_spacing: 0.0,
            word_spacing: 0.0,
            h_scale: 1.0,
            rise: 0.0,
            font_size: 0.0,
            font_key: None,
        }
    }

    fn next_line(&mut self, tx: f64, ty: f64) {
        self.tlm = Ctm::new(1.0, 0.0, 0.0, 1.0, tx, ty).concat(&self.tlm);
        self.tm = self.tlm;
    }
}

/// Interpret a page's content stream.
///
/// Path-painting and CTM operators go to `device`; text shows come back
/// as positioned glyph records in top-left page coordinates.
pub fn interpret_page<D: PathPaintDevice>(
    doc: &PdfDocument,
    page_index: usize,
    space: PageSpace,
    device: &mut D,
) -> Result<Vec<TextElement>, BackendError> {
    let operations = doc.content_operations(page_index)?;
    let resources = doc.resources(page_index)?;

    let mut glyphs = Vec::new();
    let mut fonts: HashMap<String, FontInfo> = HashMap::new();
    let mut ctm = Ctm::identity();
    let mut ctm_stack: Vec<Ctm> = Vec::new();
    let mut text = TextState::new();

    for op in &operations {
        let operands = &op.operands;
        match op.operator.as_str() {
            // --- Graphics state ---
            "q" => {
                ctm_stack.push(ctm);
                device.save_state();
            }
            "Q" => {
                if let Some(saved) = ctm_stack.pop() {
                    ctm = saved;
                }
                device.restore_state();
            }
            "cm" => {
                if let Some(m) = matrix_operand(operands) {
                    ctm = m.concat(&ctm);
                    device.concat_ctm(m);
                }
            }

            // --- Path construction ---
            "m" => {
                if let [Some(x), Some(y)] = [num(operands, 0), num(operands, 1)] {
                    device.begin_subpath(x, y);
                }
            }
            "l" => {
                if let [Some(x), Some(y)] = [num(operands, 0), num(operands, 1)] {
                    device.append_line(x, y);
                }
            }
            "re" => {
                if operands.len() >= 4 {
                    let (x, y) = (num(operands, 0), num(operands, 1));
                    let (w, h) = (num(operands, 2), num(operands, 3));
                    if let (Some(x), Some(y), Some(w), Some(h)) = (x, y, w, h) {
                        device.append_rectangle(x, y, w, h);
                    }
                }
            }
            "h" => device.close_path(),
            // Curves only advance the current point; their chords never
            // become rulings.
            "c" => {
                if let [Some(x), Some(y)] = [num(operands, 4), num(operands, 5)] {
                    device.begin_subpath(x, y);
                }
            }
            "v" | "y" => {
                if let [Some(x), Some(y)] = [num(operands, 2), num(operands, 3)] {
                    device.begin_subpath(x, y);
                }
            }

            // --- Path painting ---
            "S" => device.stroke(),
            "s" => device.close_and_stroke(),
            "f" | "F" => device.fill_nonzero(),
            "f*" => device.fill_even_odd(),
            "B" => device.stroke(),
            "B*" => device.stroke(),
            "b" | "b*" => device.close_and_stroke(),
            "n" => device.end_path(),
            "W" | "W*" => {} // clipping does not affect rulings

            // --- Text object and state ---
            "BT" => {
                text.tm = Ctm::identity();
                text.tlm = Ctm::identity();
            }
            "ET" => {}
            "Tf" => {
                if let Some(name) = name_operand(operands, 0) {
                    text.font_key = Some(name.clone());
                    text.font_size = num(operands, 1).unwrap_or(0.0);
                    load_font(doc, resources, &name, &mut fonts);
                }
            }
            "Td" => {
                if let [Some(tx), Some(ty)] = [num(operands, 0), num(operands, 1)] {
                    text.next_line(tx, ty);
                }
            }
            "TD" => {
                if let [Some(tx), Some(ty)] = [num(operands, 0), num(operands, 1)] {
                    text.leading = -ty;
                    text.next_line(tx, ty);
                }
            }
            "Tm" => {
                if let Some(m) = matrix_operand(operands) {
                    text.tlm = m;
                    text.tm = m;
                }
            }
            "T*" => text.next_line(0.0, -text.leading),
            "TL" => text.leading = num(operands, 0).unwrap_or(0.0),
            "Tc" => text.char_spacing = num(operands, 0).unwrap_or(0.0),
            "Tw" => text.word_spacing = num(operands, 0).unwrap_or(0.0),
            "Tz" => text.h_scale = num(operands, 0).unwrap_or(100.0) / 100.0,
            "Ts" => text.rise = num(operands, 0).unwrap_or(0.0),

            // --- Text showing ---
            "Tj" => {
                if let Some(bytes) = string_operand(operands, 0) {
                    show_text(&bytes, &mut text, &fonts, &ctm, space, &mut glyphs);
                }
            }
            "'" => {
                text.next_line(0.0, -text.leading);
                if let Some(bytes) = string_operand(operands, 0) {
                    show_text(&bytes, &mut text, &fonts, &ctm, space, &mut glyphs);
                }
            }
            "\"" => {
                text.word_spacing = num(operands, 0).unwrap_or(text.word_spacing);
                text.char_spacing = num(operands, 1).unwrap_or(text.char_spacing);
                text.next_line(0.0, -text.leading);
                if let Some(bytes) = string_operand(operands, 2) {
                    show_text(&bytes, &mut text, &fonts, &ctm, space, &mut glyphs);
                }
            }
            "TJ" => {
                if let Some(lopdf::Object::Array(items)) = operands.first() {
                    for item in items {
                        match item {
                            lopdf::Object::String(bytes, _) => {
                                show_text(bytes, &mut text, &fonts, &ctm, space, &mut glyphs);
                            }
                            other => {
                                if let Ok(adjust) = object_to_f64(other) {
                                    let tx = -adjust / 1000.0 * text.font_size * text.h_scale;
                                    text.tm =
                                        Ctm::new(1.0, 0.0, 0.0, 1.0, tx, 0.0).concat(&text.tm);
                                }
                            }
                        }
                    }
                }
            }

            other => trace!(operator = other, "skipping operator"),
        }
    }

    debug!(
        page = page_index + 1,
        glyphs = glyphs.len(),
        "interpreted content stream"
    );
    Ok(glyphs)
}

fn num(operands: &[lopdf::Object], index: usize) -> Option<f64> {
    operands.get(index).and_then(|o| object_to_f64(o).ok())
}

fn matrix_operand(operands: &[lopdf::Object]) -> Option<Ctm> {
    if operands.len() < 6 {
        return None;
    }
    Some(Ctm::new(
        num(operands, 0)?,
        num(operands, 1)?,
        num(operands, 2)?,
        num(operands, 3)?,
        num(operands, 4)?,
        num(operands, 5)?,
    ))
}

fn name_operand(operands: &[lopdf::Object], index: usize) -> Option<String> {
    operands
        .get(index)
        .and_then(|o| o.as_name().ok())
        .map(|n| String::from_utf8_lossy(n).into_owned())
}

fn string_operand(operands: &[lopdf::Object], index: usize) -> Option<Vec<u8>> {
    match operands.get(index) {
        Some(lopdf::Object::String(bytes, _)) => Some(bytes.clone()),
        _ => None,
    }
}

fn load_font(
    doc: &PdfDocument,
    resources: Option<&lopdf::Dictionary>,
    name: &str,
    fonts: &mut HashMap<String, FontInfo>,
) {
    if fonts.contains_key(name) {
        return;
    }
    let info = resources
        .and_then(|res| res.get(b"Font").ok())
        .and_then(|fonts_obj| doc.resolve(fonts_obj).ok())
        .and_then(|fonts_obj| fonts_obj.as_dict().ok())
        .and_then(|font_map| font_map.get(name.as_bytes()).ok())
        .and_then(|font_obj| doc.resolve(font_obj).ok())
        .and_then(|font_obj| font_obj.as_dict().ok())
        .map(|dict| FontInfo::from_dict(doc, dict))
        .unwrap_or_default();
    fonts.insert(name.to_string(), info);
}

/// Resolve one show-string to glyph records and advance the text matrix.
fn show_text(
    bytes: &[u8],
    text: &mut TextState,
    fonts: &HashMap<String, FontInfo>,
    ctm: &Ctm,
    space: PageSpace,
    glyphs: &mut Vec<TextElement>,
) {
    let fallback = FontInfo::default();
    let font = text
        .font_key
        .as_ref()
        .and_then(|key| fonts.get(key))
        .unwrap_or(&fallback);
    let font_name = if font.name.is_empty() {
        text.font_key.clone().unwrap_or_default()
    } else {
        font.name.clone()
    };

    for (code, glyph_text) in font.decode(bytes) {
        let w0 = font.width(code) / 1000.0;

        // Text rendering matrix: glyph scale × Tm × CTM
        let scale = Ctm::new(
            text.font_size * text.h_scale,
            0.0,
            0.0,
            text.font_size,
            0.0,
            text.rise,
        );
        let trm = scale.concat(&text.tm).concat(ctm);

        if !glyph_text.is_empty() {
            let corners = [
                trm.transform_point(Point::new(0.0, 0.0)),
                trm.transform_point(Point::new(w0, 0.0)),
                trm.transform_point(Point::new(0.0, 1.0)),
                trm.transform_point(Point::new(w0, 1.0)),
            ];
            let (mut left, mut right) = (f64::INFINITY, f64::NEG_INFINITY);
            let (mut top, mut bottom) = (f64::INFINITY, f64::NEG_INFINITY);
            for corner in corners {
                let (x, y) = space.to_page(corner.x, corner.y);
                left = left.min(x);
                right = right.max(x);
                top = top.min(y);
                bottom = bottom.max(y);
            }

            // Space width through the same transform
            let sw0 = font.space_width() / 1000.0;
            let zero = trm.transform_point(Point::new(0.0, 0.0));
            let advanced = trm.transform_point(Point::new(sw0, 0.0));
            let width_of_space = (advanced.x - zero.x).hypot(advanced.y - zero.y);

            glyphs.push(TextElement::new(
                Rect::from_edges(top, left, bottom, right),
                glyph_text,
                font_name.clone(),
                text.font_size,
                width_of_space,
            ));
        }

        // Advance: glyph width plus character (and for code 32, word)
        // spacing, in text space
        let mut tx = w0 * text.font_size + text.char_spacing;
        if code == 32 {
            tx += text.word_spacing;
        }
        tx *= text.h_scale;
        text.tm = Ctm::new(1.0, 0.0, 0.0, 1.0, tx, 0.0).concat(&text.tm);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabula_core::config::ExtractionConfig;
    use tabula_core::receiver::RulingExtractor;

    /// Collects nothing; used when only glyphs matter.
    struct NullDevice;

    impl PathPaintDevice for NullDevice {
        fn begin_subpath(&mut self, _x: f64, _y: f64) {}
        fn append_line(&mut self, _x: f64, _y: f64) {}
        fn append_rectangle(&mut self, _x: f64, _y: f64, _w: f64, _h: f64) {}
        fn close_path(&mut self) {}
        fn stroke(&mut self) {}
        fn close_and_stroke(&mut self) {}
        fn fill_nonzero(&mut self) {}
        fn fill_even_odd(&mut self) {}
        fn end_path(&mut self) {}
        fn concat_ctm(&mut self, _ctm: Ctm) {}
        fn save_state(&mut self) {}
        fn restore_state(&mut self) {}
    }

    fn letter_space() -> PageSpace {
        PageSpace {
            origin_x: 0.0,
            origin_y: 0.0,
            height: 792.0,
            y_inverted: false,
        }
    }

    fn pdf_with_content(content: &str) -> PdfDocument {
        use lopdf::{Document, Object, Stream, dictionary};
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources = dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.as_bytes().to_vec(),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources,
        });
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).expect("save in-memory PDF");
        PdfDocument::open_bytes(&bytes, None).expect("reopen")
    }

    #[test]
    fn simple_text_produces_positioned_glyphs() {
        let doc = pdf_with_content("BT /F1 12 Tf 100 700 Td (AB) Tj ET");
        let glyphs = interpret_page(&doc, 0, letter_space(), &mut NullDevice).unwrap();
        assert_eq!(glyphs.len(), 2);

        let a = &glyphs[0];
        assert_eq!(a.text, "A");
        assert_eq!(a.font_name, "Courier");
        assert!((a.rect.left - 100.0).abs() < 1e-6);
        // Baseline at y=700 → top at 792 - 712 = 80
        assert!((a.rect.top - 80.0).abs() < 1e-6);
        assert!((a.rect.width - 7.2).abs() < 1e-6); // 600/1000 × 12

        let b = &glyphs[1];
        assert_eq!(b.text, "B");
        assert!((b.rect.left - 107.2).abs() < 1e-6);
    }

    #[test]
    fn spaces_become_whitespace_glyphs() {
        let doc = pdf_with_content("BT /F1 12 Tf 100 700 Td (A B) Tj ET");
        let glyphs = interpret_page(&doc, 0, letter_space(), &mut NullDevice).unwrap();
        assert_eq!(glyphs.len(), 3);
        assert_eq!(glyphs[1].text, " ");
    }

    #[test]
    fn tj_array_adjustments_move_the_pen() {
        // -1000 units at size 12 → 12 points of extra advance
        let doc = pdf_with_content("BT /F1 12 Tf 0 700 Td [(A) -1000 (B)] TJ ET");
        let glyphs = interpret_page(&doc, 0, letter_space(), &mut NullDevice).unwrap();
        assert_eq!(glyphs.len(), 2);
        assert!((glyphs[1].rect.left - (7.2 + 12.0)).abs() < 1e-6);
    }

    #[test]
    fn ctm_translation_applies_to_text() {
        let doc = pdf_with_content("q 1 0 0 1 50 0 cm BT /F1 12 Tf 0 700 Td (A) Tj ET Q");
        let glyphs = interpret_page(&doc, 0, letter_space(), &mut NullDevice).unwrap();
        assert!((glyphs[0].rect.left - 50.0).abs() < 1e-6);
    }

    #[test]
    fn quote_operator_advances_a_line() {
        let doc = pdf_with_content("BT /F1 12 Tf 14 TL 0 700 Td (A) Tj (B) ' ET");
        let glyphs = interpret_page(&doc, 0, letter_space(), &mut NullDevice).unwrap();
        assert_eq!(glyphs.len(), 2);
        // Second line is 14 points lower
        assert!((glyphs[1].rect.top - glyphs[0].rect.top - 14.0).abs() < 1e-6);
        assert!((glyphs[1].rect.left - 0.0).abs() < 1e-6);
    }

    #[test]
    fn stroked_path_reaches_the_ruling_extractor() {
        let doc = pdf_with_content("100 692 m 300 692 l S");
        let mut device =
            RulingExtractor::new(0.0, 0.0, 792.0, false, &ExtractionConfig::default());
        interpret_page(&doc, 0, letter_space(), &mut device).unwrap();
        let rulings = device.into_rulings();
        assert_eq!(rulings.len(), 1);
        assert!(rulings[0].horizontal());
        assert!((rulings[0].y1 - 100.0).abs() < 1e-6);
        assert!((rulings[0].x1 - 100.0).abs() < 1e-6);
        assert!((rulings[0].x2 - 300.0).abs() < 1e-6);
    }

    #[test]
    fn word_spacing_applies_to_spaces() {
        let doc = pdf_with_content("BT /F1 10 Tf 5 Tw 0 700 Td (A A) Tj ET");
        let glyphs = interpret_page(&doc, 0, letter_space(), &mut NullDevice).unwrap();
        assert_eq!(glyphs.len(), 3);
        // Advance for the space: 6.0 (width) + 5.0 (Tw) = 11.0;
        // second A starts at 6.0 + 11.0
        assert!((glyphs[2].rect.left - 17.0).abs() < 1e-6);
    }

    #[test]
    fn glyph_height_spans_one_em() {
        let doc = pdf_with_content("BT /F1 12 Tf 0 700 Td (A) Tj ET");
        let glyphs = interpret_page(&doc, 0, letter_space(), &mut NullDevice).unwrap();
        assert!((glyphs[0].rect.height - 12.0).abs() < 1e-6);
    }
}
