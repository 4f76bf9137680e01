use tiny_skia::Color;

use crate::geometry::CellRect;

/// Bounding box of one rendered glyph, relative to its drawing origin
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GlyphBounds {
    pub width: f32,
    pub height: f32,
}

/// Drawing collaborator supplied by the host
pub trait Surface {
    fn fill_round_rect(&mut self, rect: CellRect, radius: f32, color: Color);

    fn stroke_round_rect(&mut self, rect: CellRect, radius: f32, stroke_width: f32, color: Color);

    /// Measure a glyph in the surface's text style
    fn glyph_bounds(&mut self, glyph: char) -> GlyphBounds;

    /// Draw a single glyph with its origin at `x` and its baseline at `baseline`
    fn draw_glyph(&mut self, glyph: char, x: f32, baseline: f32);
}

/// One primitive call made against a [`Recorder`]
#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
    FillRoundRect { rect: CellRect, radius: f32, color: Color },
    StrokeRoundRect { rect: CellRect, radius: f32, stroke_width: f32, color: Color },
    Glyph { glyph: char, x: f32, baseline: f32 },
}

/// Surface that records draw calls instead of painting, for headless hosts and tests
#[derive(Clone, Debug, Default)]
pub struct Recorder {
    pub ops: Vec<DrawOp>,
    /// Every glyph measures as this box
    pub glyph_size: GlyphBounds,
}

impl Recorder {
    pub fn new(glyph_size: GlyphBounds) -> Self {
        Self { ops: Vec::new(), glyph_size }
    }

    /// Glyphs in draw order
    pub fn glyphs(&self) -> Vec<char> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Glyph { glyph, .. } => Some(*glyph),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.ops.clear();
    }
}

impl Surface for Recorder {
    fn fill_round_rect(&mut self, rect: CellRect, radius: f32, color: Color) {
        self.ops.push(DrawOp::FillRoundRect { rect, radius, color });
    }

    fn stroke_round_rect(&mut self, rect: CellRect, radius: f32, stroke_width: f32, color: Color) {
        self.ops.push(DrawOp::StrokeRoundRect { rect, radius, stroke_width, color });
    }

    fn glyph_bounds(&mut self, _glyph: char) -> GlyphBounds {
        self.glyph_size
    }

    fn draw_glyph(&mut self, glyph: char, x: f32, baseline: f32) {
        self.ops.push(DrawOp::Glyph { glyph, x, baseline });
    }
}
