use std::collections::HashMap;
use std::sync::Arc;

use tiny_skia::{Color, FillRule, Paint, Path, PathBuilder, Pixmap, Stroke, Transform};
use usvg::fontdb::{Family, Query};

use crate::config::TextStyle;
use crate::error::SurfaceError;
use crate::geometry::CellRect;
use crate::surface::{GlyphBounds, Surface};
use crate::view::PinView;

// Cubic bezier handle length for a quarter circle
const KAPPA: f32 = 0.552_284_8;

/// Parsed glyph trees, keyed by the hash of their SVG source
pub struct GlyphCache {
    options: usvg::Options<'static>,
    trees: HashMap<u64, usvg::Tree>,
}

impl Default for GlyphCache {
    fn default() -> Self {
        Self::new()
    }
}

impl GlyphCache {
    /// Cache backed by the system fonts
    pub fn new() -> Self {
        let mut fontdb = usvg::fontdb::Database::new();
        fontdb.load_system_fonts();
        Self::with_fontdb(fontdb)
    }

    pub fn with_fontdb(mut fontdb: usvg::fontdb::Database) -> Self {
        resolve_generic_families(&mut fontdb);

        let mut options = usvg::Options::default();
        options.fontdb = Arc::new(fontdb);

        Self { options, trees: HashMap::new() }
    }

    /// Register an extra font, e.g. on targets without system fonts
    pub fn load_font_data(&mut self, data: Vec<u8>) {
        let fontdb = Arc::make_mut(&mut self.options.fontdb);
        fontdb.load_font_data(data);
        resolve_generic_families(fontdb);
        self.trees.clear();
    }

    /// Number of font faces glyphs can be shaped with
    pub fn font_count(&self) -> usize {
        self.options.fontdb.len()
    }

    pub fn len(&self) -> usize {
        self.trees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }

    /// Tree for a glyph with its origin at (0, 0)
    fn glyph(&mut self, glyph: char, style: &TextStyle) -> Option<&usvg::Tree> {
        let svg = glyph_svg(glyph, style);
        let hash = seahash::hash(svg.as_bytes());

        if !self.trees.contains_key(&hash) {
            match usvg::Tree::from_str(&svg, &self.options) {
                Ok(tree) => {
                    self.trees.insert(hash, tree);
                }
                Err(err) => {
                    log::warn!("cannot shape glyph {glyph:?}: {err}");
                    return None;
                }
            }
        }

        self.trees.get(&hash)
    }
}

/// Point the generic families at installed faces when their defaults are missing
fn resolve_generic_families(fontdb: &mut usvg::fontdb::Database) {
    let Some(fallback) = fontdb.faces().find_map(|face| face.families.first()).map(|(name, _)| name.clone()) else {
        log::warn!("no fonts loaded; pin glyphs will not be drawn");
        return;
    };

    let resolves = |fontdb: &usvg::fontdb::Database, family: Family<'_>| {
        fontdb.query(&Query { families: &[family], ..Query::default() }).is_some()
    };

    if !resolves(fontdb, Family::SansSerif) {
        log::debug!("sans-serif falls back to {fallback}");
        fontdb.set_sans_serif_family(fallback.clone());
    }
    if !resolves(fontdb, Family::Serif) {
        fontdb.set_serif_family(fallback.clone());
    }
    if !resolves(fontdb, Family::Monospace) {
        fontdb.set_monospace_family(fallback);
    }
}

fn glyph_svg(glyph: char, style: &TextStyle) -> String {
    let color = style.color.to_color_u8();
    format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="1" height="1"><text x="0" y="0" font-family="{}" font-size="{}" fill="#{:02x}{:02x}{:02x}" fill-opacity="{}">{}</text></svg>"##,
        escape_xml(&style.font_family),
        style.size,
        color.red(),
        color.green(),
        color.blue(),
        color.alpha() as f32 / 255.0,
        escape_xml(&glyph.to_string()),
    )
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Rounded rectangle, radius bounded by the rect itself
fn round_rect_path(rect: CellRect, radius: f32) -> Option<Path> {
    let (left, top, right, bottom) = (rect.start_x, rect.top_y, rect.end_x, rect.bottom_y);
    let width = right - left;
    let height = bottom - top;
    if width <= 0.0 || height <= 0.0 {
        return None;
    }

    let r = radius.max(0.0).min(width / 2.0).min(height / 2.0);
    if r == 0.0 {
        return tiny_skia::Rect::from_ltrb(left, top, right, bottom).map(PathBuilder::from_rect);
    }
    let k = r * KAPPA;

    let mut pb = PathBuilder::new();
    pb.move_to(left + r, top);
    pb.line_to(right - r, top);
    pb.cubic_to(right - r + k, top, right, top + r - k, right, top + r);
    pb.line_to(right, bottom - r);
    pb.cubic_to(right, bottom - r + k, right - r + k, bottom, right - r, bottom);
    pb.line_to(left + r, bottom);
    pb.cubic_to(left + r - k, bottom, left, bottom - r + k, left, bottom - r);
    pb.line_to(left, top + r);
    pb.cubic_to(left, top + r - k, left + r - k, top, left + r, top);
    pb.close();
    pb.finish()
}

fn solid(color: Color) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(color);
    paint.anti_alias = true;
    paint
}

/// Surface that paints into a tiny-skia pixmap
pub struct PixmapSurface<'a> {
    pixmap: Pixmap,
    glyphs: &'a mut GlyphCache,
    text: TextStyle,
    origin: Transform,
}

impl<'a> PixmapSurface<'a> {
    pub fn new(width: u32, height: u32, text: TextStyle, glyphs: &'a mut GlyphCache) -> Result<Self, SurfaceError> {
        let pixmap = Pixmap::new(width, height).ok_or(SurfaceError::EmptyPixmap { width, height })?;
        Ok(Self { pixmap, glyphs, text, origin: Transform::identity() })
    }

    /// Shift all drawing, e.g. past the host padding
    pub fn with_origin(mut self, x: f32, y: f32) -> Self {
        self.origin = Transform::from_translate(x, y);
        self
    }

    pub fn fill(&mut self, color: Color) {
        self.pixmap.fill(color);
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    pub fn into_pixmap(self) -> Pixmap {
        self.pixmap
    }
}

impl Surface for PixmapSurface<'_> {
    fn fill_round_rect(&mut self, rect: CellRect, radius: f32, color: Color) {
        if let Some(path) = round_rect_path(rect, radius) {
            self.pixmap.fill_path(&path, &solid(color), FillRule::Winding, self.origin, None);
        }
    }

    fn stroke_round_rect(&mut self, rect: CellRect, radius: f32, stroke_width: f32, color: Color) {
        if let Some(path) = round_rect_path(rect, radius) {
            let stroke = Stroke { width: stroke_width, ..Stroke::default() };
            self.pixmap.stroke_path(&path, &solid(color), &stroke, self.origin, None);
        }
    }

    fn glyph_bounds(&mut self, glyph: char) -> GlyphBounds {
        match self.glyphs.glyph(glyph, &self.text) {
            Some(tree) if tree.root().has_children() => {
                let bounds = tree.root().abs_bounding_box();
                GlyphBounds { width: bounds.width(), height: bounds.height() }
            }
            _ => GlyphBounds::default(),
        }
    }

    fn draw_glyph(&mut self, glyph: char, x: f32, baseline: f32) {
        let origin = self.origin.pre_translate(x, baseline);
        if let Some(tree) = self.glyphs.glyph(glyph, &self.text) {
            resvg::render(tree, origin, &mut self.pixmap.as_mut());
        }
    }
}

/// Renders whole pin views to pixmaps, reusing shaped glyphs between frames
#[derive(Default)]
pub struct Rasterizer {
    pub glyphs: GlyphCache,
    /// Host-side clear colour for the target texture, transparent by default.
    /// Not a widget background: the view itself never paints one.
    pub clear_color: Option<Color>,
}

impl Rasterizer {
    pub fn new(glyphs: GlyphCache) -> Self {
        Self { glyphs, clear_color: None }
    }

    /// Paint the view at its last measured size
    pub fn render(&mut self, view: &PinView) -> Result<Pixmap, SurfaceError> {
        let (width, height) = view.measured_size().to_pixels();
        let padding = view.padding();

        let mut surface = PixmapSurface::new(width, height, view.text_style().clone(), &mut self.glyphs)?
            .with_origin(padding.start, padding.top);
        if let Some(color) = self.clear_color {
            surface.fill(color);
        }

        view.draw(&mut surface);
        Ok(surface.into_pixmap())
    }

    /// Straight (non-premultiplied) RGBA bytes for hosts that upload textures
    pub fn render_rgba(&mut self, view: &PinView) -> Result<(u32, u32, Vec<u8>), SurfaceError> {
        let pixmap = self.render(view)?;
        let (width, height) = (pixmap.width(), pixmap.height());
        let data = pixmap
            .pixels()
            .iter()
            .flat_map(|px| {
                let c = px.demultiply();
                [c.red(), c.green(), c.blue(), c.alpha()]
            })
            .collect();
        Ok((width, height, data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PinConfig;
    use crate::geometry::{cell_rect, MeasureSpec};

    fn empty_cache() -> GlyphCache {
        GlyphCache::with_fontdb(usvg::fontdb::Database::new())
    }

    fn alpha_at(pixmap: &Pixmap, x: u32, y: u32) -> u8 {
        pixmap.pixel(x, y).map(|px| px.alpha()).unwrap_or(0)
    }

    #[test]
    fn test_round_rect_path_bounds() {
        let rect = CellRect { start_x: 1.0, end_x: 41.0, top_y: 1.0, bottom_y: 39.0 };
        let path = round_rect_path(rect, 4.0).unwrap();
        let bounds = path.bounds();
        assert_eq!((bounds.left(), bounds.top(), bounds.right(), bounds.bottom()), (1.0, 1.0, 41.0, 39.0));
    }

    #[test]
    fn test_round_rect_path_degenerate() {
        let flat = CellRect { start_x: 5.0, end_x: 5.0, top_y: 0.0, bottom_y: 10.0 };
        assert!(round_rect_path(flat, 2.0).is_none());

        let square = CellRect { start_x: 0.0, end_x: 10.0, top_y: 0.0, bottom_y: 10.0 };
        assert!(round_rect_path(square, 0.0).is_some());
    }

    #[test]
    fn test_zero_sized_pixmap_is_an_error() {
        let mut cache = empty_cache();
        let result = PixmapSurface::new(0, 10, TextStyle::default(), &mut cache);
        assert!(matches!(result, Err(SurfaceError::EmptyPixmap { width: 0, height: 10 })));
    }

    #[test]
    fn test_render_bordered_cells() {
        let config = PinConfig::default()
            .with_cell_size(40.0, 40.0)
            .with_cell_spacing(10.0)
            .with_stroke(2.0, 4.0);
        let mut view = PinView::new(config).unwrap();
        view.on_measure(MeasureSpec::Unspecified, MeasureSpec::Unspecified);

        let mut rasterizer = Rasterizer::new(empty_cache());
        let pixmap = rasterizer.render(&view).unwrap();

        assert_eq!((pixmap.width(), pixmap.height()), (191, 41));
        // Top edge of the first cell's border
        assert!(alpha_at(&pixmap, 20, 1) > 0);
        // Transparent fill inside the cell and in the gap between cells
        assert_eq!(alpha_at(&pixmap, 20, 20), 0);
        assert_eq!(alpha_at(&pixmap, 45, 20), 0);
    }

    #[test]
    fn test_render_underlined_cells() {
        let config = PinConfig::default()
            .with_cell_size(40.0, 40.0)
            .with_cell_spacing(10.0)
            .with_stroke(4.0, 4.0)
            .with_style(crate::config::CellStyle::Underlined);
        let mut view = PinView::new(config).unwrap();
        view.on_measure(MeasureSpec::Unspecified, MeasureSpec::Unspecified);

        let mut rasterizer = Rasterizer::new(empty_cache());
        let pixmap = rasterizer.render(&view).unwrap();

        assert_eq!(alpha_at(&pixmap, 20, 38), 255);
        assert_eq!(alpha_at(&pixmap, 20, 10), 0);
    }

    #[test]
    fn test_render_rgba_with_clear_color() {
        let mut view = PinView::new(PinConfig::default()).unwrap();
        view.on_measure(MeasureSpec::Unspecified, MeasureSpec::Unspecified);

        let mut rasterizer = Rasterizer::new(empty_cache());
        rasterizer.clear_color = Some(Color::WHITE);
        let (width, height, data) = rasterizer.render_rgba(&view).unwrap();

        assert_eq!(data.len(), (width * height * 4) as usize);
        assert_eq!(&data[..4], &[255, 255, 255, 255]);
    }

    #[test]
    fn test_glyphs_are_skipped_without_fonts() {
        let mut view = PinView::new(PinConfig::default()).unwrap();
        view.on_text_changed("12");
        view.on_measure(MeasureSpec::Unspecified, MeasureSpec::Unspecified);

        let mut rasterizer = Rasterizer::new(empty_cache());
        assert!(rasterizer.render(&view).is_ok());
    }

    #[test]
    fn test_generic_families_resolve_to_installed_faces() {
        let glyphs = GlyphCache::new();
        if glyphs.font_count() == 0 {
            return;
        }

        for family in [Family::SansSerif, Family::Serif, Family::Monospace] {
            let query = Query { families: &[family], ..Query::default() };
            assert!(glyphs.options.fontdb.query(&query).is_some());
        }
    }

    #[test]
    fn test_default_family_inks_glyph_inside_its_cell() {
        let glyphs = GlyphCache::new();
        if glyphs.font_count() == 0 {
            return;
        }

        let config = PinConfig::default()
            .with_cell_size(40.0, 40.0)
            .with_cell_spacing(10.0)
            .with_stroke(2.0, 4.0);
        let mut view = PinView::new(config).unwrap();
        view.on_text_changed("8");
        view.on_measure(MeasureSpec::Unspecified, MeasureSpec::Unspecified);

        let mut rasterizer = Rasterizer::new(glyphs);
        let pixmap = rasterizer.render(&view).unwrap();

        // Interior of the first cell, clear of its border
        let rect = cell_rect(view.config(), 0);
        let xs = (rect.start_x as u32 + 2)..(rect.end_x as u32 - 2);
        let ys = (rect.top_y as u32 + 2)..(rect.bottom_y as u32 - 2);
        let inked = ys
            .flat_map(|y| xs.clone().map(move |x| (x, y)))
            .filter(|&(x, y)| alpha_at(&pixmap, x, y) > 0)
            .count();
        assert!(inked > 0, "no glyph pixels in the first cell");

        // The second cell holds no character and stays empty inside
        let next = cell_rect(view.config(), 1);
        let centre = ((next.start_x + next.end_x) / 2.0) as u32;
        assert_eq!(alpha_at(&pixmap, centre, 20), 0);
    }

    #[test]
    fn test_glyph_svg_escapes_markup() {
        let svg = glyph_svg('<', &TextStyle::default());
        assert!(svg.contains(">&lt;</text>"));
        assert!(svg.contains("fill=\"#000000\""));
    }
}
