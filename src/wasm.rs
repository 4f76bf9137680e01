use wasm_bindgen::prelude::*;
use wasm_bindgen::{Clamped, JsCast};
use web_sys::{ImageData, OffscreenCanvas, OffscreenCanvasRenderingContext2d};

use crate::config::{parse_color, CellStyle, Density, PinAttributes, PinConfig};
use crate::geometry::MeasureSpec;
use crate::raster::{GlyphCache, Rasterizer};
use crate::view::PinView;

fn js_error(err: impl std::fmt::Display) -> JsValue {
    js_sys::Error::new(&err.to_string()).into()
}

/// Pin view driven from JavaScript and painted into an OffscreenCanvas
#[wasm_bindgen]
pub struct WasmPinView {
    view: PinView,
    rasterizer: Rasterizer,
    density: Density,
}

#[wasm_bindgen]
impl WasmPinView {
    /// `attributes` is a plain object such as `{ cellCount: 6, style: "underlined" }`
    #[wasm_bindgen(constructor)]
    pub fn new(attributes: JsValue, density: f32) -> Result<WasmPinView, JsValue> {
        console_error_panic_hook::set_once();

        let attrs: PinAttributes = if attributes.is_undefined() || attributes.is_null() {
            PinAttributes::default()
        } else {
            serde_wasm_bindgen::from_value(attributes)?
        };
        let density = Density(density);
        let config = PinConfig::from_attributes(&attrs, density).map_err(js_error)?;
        let view = PinView::new(config).map_err(js_error)?;

        // There are no system fonts in the browser; callers supply one with load_font
        let glyphs = GlyphCache::with_fontdb(usvg::fontdb::Database::new());
        Ok(Self { view, rasterizer: Rasterizer::new(glyphs), density })
    }

    pub fn load_font(&mut self, data: Vec<u8>) {
        self.rasterizer.glyphs.load_font_data(data);
    }

    /// Feed the input element's full value; returns the normalized PIN
    pub fn on_text_changed(&mut self, raw: &str) -> String {
        self.view.on_text_changed(raw).to_string()
    }

    pub fn reset(&mut self) {
        self.view.reset();
    }

    pub fn text(&self) -> String {
        self.view.text().to_string()
    }

    pub fn max_length(&self) -> usize {
        self.view.length_filter().max
    }

    pub fn set_style(&mut self, style: &str) -> Result<(), JsValue> {
        let style: CellStyle = style.parse().map_err(js_error)?;
        self.view.set_style(style);
        Ok(())
    }

    pub fn set_cell_count(&mut self, count: usize) -> Result<(), JsValue> {
        self.view.set_cell_count(count).map_err(js_error)
    }

    /// Sizes below are in dp, like the constructor attributes
    pub fn set_cell_width(&mut self, dp: f32) -> Result<(), JsValue> {
        self.view.set_cell_width(self.density.px(dp)).map_err(js_error)
    }

    pub fn set_cell_height(&mut self, dp: f32) -> Result<(), JsValue> {
        self.view.set_cell_height(self.density.px(dp)).map_err(js_error)
    }

    pub fn set_cell_spacing(&mut self, dp: f32) -> Result<(), JsValue> {
        self.view.set_cell_spacing(self.density.px(dp)).map_err(js_error)
    }

    pub fn set_stroke_width(&mut self, dp: f32) -> Result<(), JsValue> {
        self.view.set_stroke_width(self.density.px(dp)).map_err(js_error)
    }

    pub fn set_stroke_radius(&mut self, dp: f32) -> Result<(), JsValue> {
        self.view.set_stroke_radius(self.density.px(dp)).map_err(js_error)
    }

    /// Colors are `#RRGGBB` or `#RRGGBBAA`
    pub fn set_stroke_color(&mut self, hex: &str) -> Result<(), JsValue> {
        self.view.set_stroke_color(parse_color(hex).map_err(js_error)?);
        Ok(())
    }

    pub fn set_fill_color(&mut self, hex: &str) -> Result<(), JsValue> {
        self.view.set_fill_color(parse_color(hex).map_err(js_error)?);
        Ok(())
    }

    pub fn set_text_size(&mut self, dp: f32) -> Result<(), JsValue> {
        let mut style = self.view.text_style().clone();
        style.size = self.density.px(dp);
        self.view.set_text_style(style).map_err(js_error)
    }

    pub fn set_text_color(&mut self, hex: &str) -> Result<(), JsValue> {
        let mut style = self.view.text_style().clone();
        style.color = parse_color(hex).map_err(js_error)?;
        self.view.set_text_style(style).map_err(js_error)
    }

    /// Measure, paint, and copy the result into `canvas`
    pub fn render(&mut self, canvas: &OffscreenCanvas) -> Result<(), JsValue> {
        self.view.take_invalidation();
        self.view.on_measure(MeasureSpec::Unspecified, MeasureSpec::Unspecified);

        let (width, height, data) = self.rasterizer.render_rgba(&self.view).map_err(js_error)?;
        canvas.set_width(width);
        canvas.set_height(height);

        let context = canvas
            .get_context("2d")?
            .ok_or_else(|| js_error("2d context unavailable"))?
            .dyn_into::<OffscreenCanvasRenderingContext2d>()?;
        let image = ImageData::new_with_u8_clamped_array_and_sh(Clamped(&data[..]), width, height)?;
        context.put_image_data(&image, 0.0, 0.0)
    }
}
