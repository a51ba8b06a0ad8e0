//! Glyph → chunk → line merging.
//!
//! Glyphs are folded into chunks (words) while they stay on the same
//! visual row, no vertical ruling separates them, and the horizontal gap
//! stays within a fraction of the space width. Chunks are then grouped
//! into lines by vertical overlap. Right-to-left runs assemble in
//! descending-`left` order.

use crate::config::ExtractionConfig;
use crate::geometry::Rect;
use crate::projection::ProjectionProfile;
use crate::ruling::Ruling;
use crate::text::{TextDirection, TextElement};

/// A merged run of glyphs representing one word.
#[derive(Debug, Clone, PartialEq)]
pub struct TextChunk {
    pub elements: Vec<TextElement>,
    pub rect: Rect,
}

impl TextChunk {
    pub fn new(element: TextElement) -> Self {
        let rect = element.rect;
        Self {
            elements: vec![element],
            rect,
        }
    }

    /// Add a glyph, growing the bounding box.
    pub fn push(&mut self, element: TextElement) {
        self.rect = self.rect.union(&element.rect);
        self.elements.push(element);
    }

    /// Majority direction over member glyphs; LTR on a tie.
    pub fn direction(&self) -> TextDirection {
        majority_direction(self.elements.iter().map(|e| e.direction))
    }

    /// Mean space width over member glyphs.
    pub fn width_of_space(&self) -> f64 {
        if self.elements.is_empty() {
            return 0.0;
        }
        self.elements.iter().map(|e| e.width_of_space).sum::<f64>() / self.elements.len() as f64
    }

    /// Word text: glyphs by `left` ascending when LTR-dominant,
    /// descending when RTL-dominant.
    pub fn text(&self) -> String {
        let mut ordered: Vec<&TextElement> = self.elements.iter().collect();
        match self.direction() {
            TextDirection::Ltr => {
                ordered.sort_by(|a, b| a.rect.left.total_cmp(&b.rect.left));
            }
            TextDirection::Rtl => {
                ordered.sort_by(|a, b| b.rect.left.total_cmp(&a.rect.left));
            }
        }
        ordered.iter().map(|e| e.text.as_str()).collect()
    }
}

/// An ordered collection of chunks sharing a visual row.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub chunks: Vec<TextChunk>,
    pub rect: Rect,
}

impl Line {
    pub fn new(chunk: TextChunk) -> Self {
        let rect = chunk.rect;
        Self {
            chunks: vec![chunk],
            rect,
        }
    }

    pub fn push(&mut self, chunk: TextChunk) {
        self.rect = self.rect.union(&chunk.rect);
        self.chunks.push(chunk);
    }

    /// Majority direction over member chunks; LTR on a tie.
    pub fn direction(&self) -> TextDirection {
        majority_direction(self.chunks.iter().map(TextChunk::direction))
    }

    /// Chunks in visual reading order for the line's direction.
    pub fn sorted_chunks(&self) -> Vec<&TextChunk> {
        let mut ordered: Vec<&TextChunk> = self.chunks.iter().collect();
        match self.direction() {
            TextDirection::Ltr => {
                ordered.sort_by(|a, b| a.rect.left.total_cmp(&b.rect.left));
            }
            TextDirection::Rtl => {
                ordered.sort_by(|a, b| b.rect.left.total_cmp(&a.rect.left));
            }
        }
        ordered
    }

    /// Line text with chunks joined by `separator`.
    pub fn text(&self, separator: &str) -> String {
        self.sorted_chunks()
            .iter()
            .map(|c| c.text())
            .collect::<Vec<_>>()
            .join(separator)
    }

    /// Mean glyph width across the line.
    pub fn average_char_width(&self) -> f64 {
        let mut total = 0.0;
        let mut count = 0usize;
        for chunk in &self.chunks {
            for e in &chunk.elements {
                total += e.rect.width;
                count += 1;
            }
        }
        if count == 0 { 0.0 } else { total / count as f64 }
    }

    /// Midpoints of inter-chunk gaps wide enough to be column
    /// candidates, via a projection profile of the chunk extents.
    pub fn gap_positions(&self, config: &ExtractionConfig) -> Vec<f64> {
        let min_gap = self.average_char_width() / config.line_gap_multiplier;
        if min_gap <= 0.0 {
            return Vec::new();
        }
        ProjectionProfile::horizontal(self.chunks.iter().map(|c| &c.rect))
            .gap_midpoints(min_gap)
    }
}

fn majority_direction(directions: impl Iterator<Item = TextDirection>) -> TextDirection {
    let mut balance = 0i64;
    for d in directions {
        match d {
            TextDirection::Rtl => balance += 1,
            TextDirection::Ltr => balance -= 1,
        }
    }
    if balance > 0 {
        TextDirection::Rtl
    } else {
        TextDirection::Ltr
    }
}

/// Merge glyphs into word chunks.
///
/// Glyphs are scanned in reading order. A non-whitespace glyph joins the
/// current chunk while it vertically overlaps the chunk, no vertical
/// ruling covering both lies in the gap between them, and the horizontal
/// gap stays within the word-gap fraction of the space width. Whitespace
/// closes the current chunk.
pub fn merge_words(
    glyphs: &[TextElement],
    vertical_rulings: &[Ruling],
    config: &ExtractionConfig,
) -> Vec<TextChunk> {
    let mut sorted: Vec<&TextElement> = glyphs.iter().collect();
    sorted.sort_by(|a, b| a.rect.reading_order(&b.rect));

    let mut chunks = Vec::new();
    let mut current: Option<TextChunk> = None;

    for glyph in sorted {
        if glyph.is_whitespace() {
            if let Some(chunk) = current.take() {
                chunks.push(chunk);
            }
            continue;
        }

        match current.as_mut() {
            None => current = Some(TextChunk::new(glyph.clone())),
            Some(chunk) => {
                if can_join(chunk, glyph, vertical_rulings, config) {
                    chunk.push(glyph.clone());
                } else {
                    chunks.push(std::mem::replace(chunk, TextChunk::new(glyph.clone())));
                }
            }
        }
    }
    if let Some(chunk) = current {
        chunks.push(chunk);
    }
    chunks
}

fn can_join(
    chunk: &TextChunk,
    glyph: &TextElement,
    vertical_rulings: &[Ruling],
    config: &ExtractionConfig,
) -> bool {
    if !glyph
        .rect
        .vertically_overlaps(&chunk.rect, config.vertical_comparison_threshold)
    {
        return false;
    }
    if ruling_between(chunk, glyph, vertical_rulings) {
        return false;
    }
    let max_space = chunk
        .width_of_space()
        .max(glyph.width_of_space)
        .max(glyph.rect.width);
    glyph.rect.left - chunk.rect.right() <= config.word_gap_multiplier * max_space
}

/// Whether a vertical ruling separates the chunk from the glyph: its x
/// lies in the gap between them and its y-extent covers both.
fn ruling_between(chunk: &TextChunk, glyph: &TextElement, vertical_rulings: &[Ruling]) -> bool {
    let lo = chunk.rect.right().min(glyph.rect.left);
    let hi = chunk.rect.right().max(glyph.rect.left);
    let top = chunk.rect.top.min(glyph.rect.top);
    let bottom = chunk.rect.bottom().max(glyph.rect.bottom());
    vertical_rulings.iter().any(|r| {
        r.vertical() && r.x1 > lo && r.x1 < hi && r.y1 <= top && r.y2 >= bottom
    })
}

/// Group chunks into lines by vertical overlap, in reading order.
pub fn group_lines(chunks: Vec<TextChunk>, config: &ExtractionConfig) -> Vec<Line> {
    let mut sorted = chunks;
    sorted.sort_by(|a, b| a.rect.reading_order(&b.rect));

    let mut lines: Vec<Line> = Vec::new();
    let mut current: Option<Line> = None;
    for chunk in sorted {
        match current.as_mut() {
            None => current = Some(Line::new(chunk)),
            Some(line) => {
                if chunk
                    .rect
                    .vertically_overlaps(&line.rect, config.vertical_comparison_threshold)
                {
                    line.push(chunk);
                } else {
                    lines.push(std::mem::replace(line, Line::new(chunk)));
                }
            }
        }
    }
    if let Some(line) = current {
        lines.push(line);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn glyph(text: &str, top: f64, left: f64, width: f64) -> TextElement {
        TextElement::new(
            Rect::new(top, left, width, 10.0),
            text,
            "Helvetica",
            10.0,
            5.0,
        )
    }

    #[test]
    fn adjacent_glyphs_merge_into_one_word() {
        let glyphs = vec![
            glyph("H", 0.0, 0.0, 6.0),
            glyph("i", 0.0, 6.0, 3.0),
        ];
        let chunks = merge_words(&glyphs, &[], &ExtractionConfig::default());
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text(), "Hi");
        assert_eq!(chunks[0].rect, Rect::new(0.0, 0.0, 9.0, 10.0));
    }

    #[test]
    fn small_gaps_never_split_a_word() {
        // Gaps of at most half the space width stay within one chunk
        let glyphs = vec![
            glyph("a", 0.0, 0.0, 5.0),
            glyph("b", 0.0, 7.0, 5.0),
            glyph("c", 0.0, 14.0, 5.0),
        ];
        let chunks = merge_words(&glyphs, &[], &ExtractionConfig::default());
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text(), "abc");
    }

    #[test]
    fn wide_gap_splits_words() {
        let glyphs = vec![
            glyph("a", 0.0, 0.0, 5.0),
            glyph("b", 0.0, 30.0, 5.0),
        ];
        let chunks = merge_words(&glyphs, &[], &ExtractionConfig::default());
        assert_eq!(chunks.len(), 2);
    }

    #[test]
    fn whitespace_closes_the_chunk() {
        let glyphs = vec![
            glyph("a", 0.0, 0.0, 5.0),
            glyph(" ", 0.0, 5.0, 5.0),
            glyph("b", 0.0, 10.0, 5.0),
        ];
        let chunks = merge_words(&glyphs, &[], &ExtractionConfig::default());
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].text(), "a");
        assert_eq!(chunks[1].text(), "b");
    }

    #[test]
    fn vertically_distinct_runs_split() {
        let glyphs = vec![
            glyph("a", 0.0, 0.0, 5.0),
            glyph("b", 20.0, 5.0, 5.0),
        ];
        let chunks = merge_words(&glyphs, &[], &ExtractionConfig::default());
        assert_eq!(chunks.len(), 2);
    }

    #[test]
    fn covering_vertical_ruling_splits_a_word() {
        let glyphs = vec![
            glyph("a", 0.0, 0.0, 5.0),
            glyph("b", 0.0, 7.0, 5.0),
        ];
        let ruling = Ruling::new(6.0, -5.0, 6.0, 20.0);
        let chunks = merge_words(&glyphs, &[ruling], &ExtractionConfig::default());
        assert_eq!(chunks.len(), 2);
    }

    #[test]
    fn short_vertical_ruling_does_not_split() {
        // Ruling in the gap but not covering the glyphs' y-extent
        let glyphs = vec![
            glyph("a", 0.0, 0.0, 5.0),
            glyph("b", 0.0, 7.0, 5.0),
        ];
        let ruling = Ruling::new(6.0, 4.0, 6.0, 6.0);
        let chunks = merge_words(&glyphs, &[ruling], &ExtractionConfig::default());
        assert_eq!(chunks.len(), 1);
    }

    #[test]
    fn rtl_chunk_assembles_right_to_left() {
        // Glyphs at decreasing left spelling alef-bet-gimel
        let glyphs = vec![
            glyph("ג", 0.0, 0.0, 5.0),
            glyph("ב", 0.0, 6.0, 5.0),
            glyph("א", 0.0, 12.0, 5.0),
        ];
        let chunks = merge_words(&glyphs, &[], &ExtractionConfig::default());
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].direction(), TextDirection::Rtl);
        assert_eq!(chunks[0].text(), "אבג");
    }

    #[test]
    fn lines_group_by_vertical_overlap() {
        let glyphs = vec![
            glyph("a", 0.0, 0.0, 5.0),
            glyph("b", 0.0, 50.0, 5.0),
            glyph("c", 30.0, 0.0, 5.0),
        ];
        let chunks = merge_words(&glyphs, &[], &ExtractionConfig::default());
        let lines = group_lines(chunks, &ExtractionConfig::default());
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].chunks.len(), 2);
        assert_eq!(lines[1].chunks.len(), 1);
    }

    #[test]
    fn line_text_joins_sorted_chunks() {
        let glyphs = vec![
            glyph("b", 0.0, 50.0, 5.0),
            glyph("a", 0.0, 0.0, 5.0),
        ];
        let chunks = merge_words(&glyphs, &[], &ExtractionConfig::default());
        let lines = group_lines(chunks, &ExtractionConfig::default());
        assert_eq!(lines[0].text(" "), "a b");
    }

    #[test]
    fn rtl_line_sorts_chunks_right_to_left() {
        let first = glyph("א", 0.0, 50.0, 5.0);
        let second = glyph("ב", 0.0, 0.0, 5.0);
        let chunks = vec![TextChunk::new(first), TextChunk::new(second)];
        let lines = group_lines(chunks, &ExtractionConfig::default());
        assert_eq!(lines.len(), 1);
        let line = &lines[0];
        assert_eq!(line.direction(), TextDirection::Rtl);
        let sorted = line.sorted_chunks();
        assert_eq!(sorted[0].rect.left, 50.0);
        assert_eq!(line.text(""), "אב");
    }

    #[test]
    fn gap_positions_report_wide_gaps_only() {
        // Chunks [0,20] and [60,80]; avg char width 20 → min gap 40
        let glyphs = vec![
            glyph("a", 0.0, 0.0, 20.0),
            glyph("b", 0.0, 60.0, 20.0),
        ];
        let chunks = merge_words(&glyphs, &[], &ExtractionConfig::default());
        let lines = group_lines(chunks, &ExtractionConfig::default());
        let gaps = lines[0].gap_positions(&ExtractionConfig::default());
        assert_eq!(gaps, vec![40.0]);
    }

    #[test]
    fn narrow_gaps_are_not_columns() {
        let glyphs = vec![
            glyph("a", 0.0, 0.0, 20.0),
            glyph("b", 0.0, 30.0, 20.0),
        ];
        let chunks = merge_words(&glyphs, &[], &ExtractionConfig::default());
        let lines = group_lines(chunks, &ExtractionConfig::default());
        assert!(lines[0].gap_positions(&ExtractionConfig::default()).is_empty());
    }
}
