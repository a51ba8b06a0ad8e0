//! Document type: opens a PDF and assembles core [`Page`] values.

use tabula_core::config::ExtractionConfig;
use tabula_core::error::{ExtractError, Result};
use tabula_core::geometry::Rect;
use tabula_core::page::{Page, PageBuilder};
use tabula_core::receiver::RulingExtractor;
use tabula_core::ruling::Ruling;
use tabula_core::text::TextElement;
use tabula_parse::{PageSpace, PdfDocument, interpret_page};
use tracing::debug;

/// A PDF document opened for table extraction.
#[derive(Debug)]
pub struct Pdf {
    doc: PdfDocument,
    config: ExtractionConfig,
}

/// Iterator over the pages of a document, yielding each page on demand.
///
/// Pages are not retained after being yielded — the caller owns each
/// `Page` value.
pub struct PagesIter<'a> {
    pdf: &'a Pdf,
    next: usize,
    count: usize,
}

impl Iterator for PagesIter<'_> {
    type Item = Result<Page>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next > self.count {
            return None;
        }
        let result = self.pdf.page(self.next);
        self.next += 1;
        Some(result)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.count + 1 - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for PagesIter<'_> {}

impl Pdf {
    /// Open a document from a file path.
    ///
    /// # Errors
    ///
    /// [`ExtractError::FileNotFound`] when the path does not exist,
    /// [`ExtractError::PasswordRequired`] for encrypted documents
    /// without a valid password, [`ExtractError::InvalidPdf`] for
    /// malformed bytes.
    pub fn open(path: impl AsRef<std::path::Path>, password: Option<&str>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ExtractError::FileNotFound(path.display().to_string()));
        }
        let doc = PdfDocument::open(path, password)?;
        Ok(Self {
            doc,
            config: ExtractionConfig::default(),
        })
    }

    /// Open a document from bytes.
    pub fn open_bytes(bytes: &[u8], password: Option<&str>) -> Result<Self> {
        let doc = PdfDocument::open_bytes(bytes, password)?;
        Ok(Self {
            doc,
            config: ExtractionConfig::default(),
        })
    }

    /// Replace the extraction configuration.
    pub fn with_config(mut self, config: ExtractionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    pub fn page_count(&self) -> usize {
        self.doc.page_count()
    }

    /// Build the page with the given 1-based number.
    pub fn page(&self, number: usize) -> Result<Page> {
        if number == 0 || number > self.doc.page_count() {
            return Err(ExtractError::Argument(format!(
                "page {number} out of range (document has {} pages)",
                self.doc.page_count()
            )));
        }
        let index = number - 1;

        let media = self
            .doc
            .media_box(index)
            .map_err(|e| ExtractError::from(e).on_page(number))?;
        let crop = self
            .doc
            .crop_box(index)
            .map_err(|e| ExtractError::from(e).on_page(number))?;
        let rotation = self
            .doc
            .rotation(index)
            .map_err(|e| ExtractError::from(e).on_page(number))?;

        let [llx, lly, urx, ury] = media;
        let width = (urx - llx).abs();
        let height = (ury - lly).abs();
        let y_inverted = ury < lly;
        let space = PageSpace {
            origin_x: llx.min(urx),
            origin_y: lly.min(ury),
            height,
            y_inverted,
        };

        let mut device = RulingExtractor::new(
            space.origin_x,
            space.origin_y,
            height,
            y_inverted,
            &self.config,
        );
        let mut glyphs = interpret_page(&self.doc, index, space, &mut device)
            .map_err(|e| ExtractError::from(e).on_page(number))?;
        let mut rulings = device.into_rulings();

        // Everything so far is relative to the media box; a crop box
        // moves its own top-left corner to the origin.
        let mut bounds = Rect::new(0.0, 0.0, width, height);
        if let Some([cllx, clly, curx, cury]) = crop {
            let x_shift = cllx - llx;
            let y_shift = height - (cury - lly);
            for glyph in &mut glyphs {
                glyph.rect = glyph.rect.translate(-x_shift, -y_shift);
            }
            tabula_core::receiver::translate_rulings(&mut rulings, x_shift, y_shift);
            bounds = Rect::new(0.0, 0.0, curx - cllx, cury - clly);
        }

        if rotation != 0 {
            (bounds, glyphs, rulings) = rotate_page(rotation, bounds, glyphs, rulings);
        }

        debug!(
            page = number,
            glyphs = glyphs.len(),
            rulings = rulings.len(),
            "assembled page"
        );

        Ok(PageBuilder {
            bounds,
            number,
            rotation,
            rulings,
            glyphs,
        }
        .build())
    }

    /// Iterate all pages in order.
    pub fn pages(&self) -> PagesIter<'_> {
        PagesIter {
            pdf: self,
            next: 1,
            count: self.doc.page_count(),
        }
    }
}

/// Map page contents into display orientation for rotated pages.
fn rotate_page(
    rotation: i32,
    bounds: Rect,
    glyphs: Vec<TextElement>,
    rulings: Vec<Ruling>,
) -> (Rect, Vec<TextElement>, Vec<Ruling>) {
    let (w, h) = (bounds.width, bounds.height);
    let map = |x: f64, y: f64| -> (f64, f64) {
        match rotation {
            90 => (h - y, x),
            180 => (w - x, h - y),
            270 => (y, w - x),
            _ => (x, y),
        }
    };
    let new_bounds = match rotation {
        90 | 270 => Rect::new(0.0, 0.0, h, w),
        _ => bounds,
    };

    let glyphs = glyphs
        .into_iter()
        .map(|mut g| {
            let (x1, y1) = map(g.rect.left, g.rect.top);
            let (x2, y2) = map(g.rect.right(), g.rect.bottom());
            g.rect = Rect::from_edges(y1.min(y2), x1.min(x2), y1.max(y2), x1.max(x2));
            g
        })
        .collect();
    let rulings = rulings
        .into_iter()
        .map(|r| {
            let (x1, y1) = map(r.x1, r.y1);
            let (x2, y2) = map(r.x2, r.y2);
            Ruling::new(x1, y1, x2, y2)
        })
        .collect();
    (new_bounds, glyphs, rulings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_file_not_found() {
        let err = Pdf::open("/no/such/file.pdf", None).unwrap_err();
        assert!(matches!(err, ExtractError::FileNotFound(_)));
    }

    #[test]
    fn garbage_bytes_are_invalid_pdf() {
        let err = Pdf::open_bytes(b"garbage", None).unwrap_err();
        assert!(matches!(err, ExtractError::InvalidPdf(_)));
    }

    #[test]
    fn rotation_90_swaps_dimensions() {
        let bounds = Rect::new(0.0, 0.0, 612.0, 792.0);
        let rulings = vec![Ruling::new(0.0, 10.0, 100.0, 10.0)];
        let (new_bounds, _, new_rulings) = rotate_page(90, bounds, Vec::new(), rulings);
        assert_eq!(new_bounds.width, 792.0);
        assert_eq!(new_bounds.height, 612.0);
        // A horizontal ruling becomes vertical under rotation
        assert!(new_rulings[0].vertical());
    }

    #[test]
    fn rotation_180_keeps_orientation() {
        let bounds = Rect::new(0.0, 0.0, 612.0, 792.0);
        let rulings = vec![Ruling::new(0.0, 10.0, 100.0, 10.0)];
        let (_, _, new_rulings) = rotate_page(180, bounds, Vec::new(), rulings);
        assert!(new_rulings[0].horizontal());
        assert!((new_rulings[0].y1 - 782.0).abs() < 1e-9);
        assert!((new_rulings[0].x1 - 512.0).abs() < 1e-9);
    }
}
