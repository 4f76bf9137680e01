use tiny_skia::Color;

use crate::config::{CellStyle, PinConfig};
use crate::geometry::CellRect;
use crate::surface::Surface;

/// Outline drawn around a bordered cell
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellStroke {
    pub width: f32,
    pub color: Color,
}

/// Paint for one draw pass, rebuilt from the config every time
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CellPaint {
    Bordered {
        fill: Color,
        /// None when the stroke width is zero
        stroke: Option<CellStroke>,
        radius: f32,
    },
    Underlined {
        color: Color,
        radius: f32,
    },
}

impl CellPaint {
    pub fn from_config(config: &PinConfig) -> Self {
        match config.style {
            CellStyle::Bordered => Self::Bordered {
                fill: config.fill_color,
                stroke: (config.stroke_width > 0.0).then_some(CellStroke {
                    width: config.stroke_width,
                    color: config.stroke_color,
                }),
                radius: config.effective_stroke_radius(),
            },
            CellStyle::Underlined => Self::Underlined {
                color: config.stroke_color,
                radius: config.stroke_width / 2.0,
            },
        }
    }
}

/// Paint one cell and, when present, its glyph
pub fn render_cell<S: Surface + ?Sized>(
    surface: &mut S,
    paint: &CellPaint,
    rect: CellRect,
    config: &PinConfig,
    glyph: Option<char>,
) {
    match *paint {
        CellPaint::Bordered { fill, stroke, radius } => {
            surface.fill_round_rect(rect, radius, fill);
            if let Some(stroke) = stroke {
                surface.stroke_round_rect(rect, radius, stroke.width, stroke.color);
            }
        }
        CellPaint::Underlined { color, radius } => {
            surface.fill_round_rect(rect, radius, color);
        }
    }

    if let Some(glyph) = glyph {
        draw_centered_glyph(surface, rect.start_x, config, glyph);
    }
}

/// Center a glyph in the cell that starts at `start`; positions snap toward zero
fn draw_centered_glyph<S: Surface + ?Sized>(surface: &mut S, start: f32, config: &PinConfig, glyph: char) {
    let bounds = surface.glyph_bounds(glyph);

    let text_start = (start + config.cell_width / 2.0 - bounds.width.abs() / 2.0).trunc();
    let text_top = (config.cell_height / 2.0 + bounds.height.abs() / 2.0).trunc();

    surface.draw_glyph(glyph, text_start, text_top);
}
