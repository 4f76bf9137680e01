use crate::config::{CellStyle, PinConfig};

/// Host measurement constraint for one dimension
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MeasureSpec {
    /// The host dictates the size
    Exactly(f32),
    /// Upper bound only; the widget still reports its computed size
    AtMost(f32),
    Unspecified,
}

/// Host-supplied padding around the cell row
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Padding {
    pub start: f32,
    pub top: f32,
    pub end: f32,
    pub bottom: f32,
}

impl Padding {
    pub fn uniform(value: f32) -> Self {
        Self { start: value, top: value, end: value, bottom: value }
    }

    pub fn horizontal(&self) -> f32 {
        self.start + self.end
    }

    pub fn vertical(&self) -> f32 {
        self.top + self.bottom
    }
}

/// Size the widget reports after a measure pass
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MeasuredSize {
    pub width: f32,
    pub height: f32,
}

impl MeasuredSize {
    /// Whole pixels large enough to hold the measured area
    pub fn to_pixels(self) -> (u32, u32) {
        (self.width.max(0.0).ceil() as u32, self.height.max(0.0).ceil() as u32)
    }
}

/// Bounds of one cell's painted shape
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellRect {
    pub start_x: f32,
    pub end_x: f32,
    pub top_y: f32,
    pub bottom_y: f32,
}

impl CellRect {
    pub fn width(&self) -> f32 {
        self.end_x - self.start_x
    }

    pub fn height(&self) -> f32 {
        self.bottom_y - self.top_y
    }
}

/// Width and height the widget asks for under the given constraints
pub fn desired_size(
    config: &PinConfig,
    padding: &Padding,
    width_spec: MeasureSpec,
    height_spec: MeasureSpec,
) -> MeasuredSize {
    let correction = config.stroke_correction();

    let width = match width_spec {
        MeasureSpec::Exactly(size) => size,
        MeasureSpec::AtMost(_) | MeasureSpec::Unspecified => {
            config.cell_step() * config.cell_count as f32 - config.cell_spacing
                + padding.horizontal()
                + correction
        }
    };

    let height = match height_spec {
        MeasureSpec::Exactly(size) => size,
        MeasureSpec::AtMost(_) | MeasureSpec::Unspecified => {
            config.cell_height + padding.vertical() + correction
        }
    };

    MeasuredSize { width, height }
}

/// Rect of the cell at `index`
pub fn cell_rect(config: &PinConfig, index: usize) -> CellRect {
    let offset = index as f32 * config.cell_step();
    cell_rect_at(config, offset, config.stroke_correction())
}

/// Rect of a cell whose slot starts at `offset`
pub fn cell_rect_at(config: &PinConfig, offset: f32, correction: f32) -> CellRect {
    let start_x = offset + correction;
    let end_x = start_x + config.cell_width - correction;

    let (top_y, bottom_y) = match config.style {
        CellStyle::Bordered => (correction, config.cell_height - correction),
        CellStyle::Underlined => (config.cell_height - config.stroke_width, config.cell_height),
    };

    CellRect { start_x, end_x, top_y, bottom_y }
}
