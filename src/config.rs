use serde::Deserialize;
use tiny_skia::Color;

use crate::error::ConfigError;

pub const DEFAULT_CELL_COUNT: usize = 4;
pub const DEFAULT_CELL_SIZE_DP: f32 = 40.0;
pub const DEFAULT_CELL_SPACING_DP: f32 = 10.0;
pub const DEFAULT_STROKE_WIDTH_DP: f32 = 2.0;
pub const DEFAULT_STROKE_RADIUS_DP: f32 = 4.0;
pub const DEFAULT_TEXT_SIZE_DP: f32 = 18.0;
pub const DEFAULT_FONT_FAMILY: &str = "sans-serif";

/// Display density: how many pixels one dp covers
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Density(pub f32);

impl Default for Density {
    fn default() -> Self {
        Self(1.0)
    }
}

impl Density {
    pub fn px(self, dp: f32) -> f32 {
        dp * self.0
    }
}

/// How each cell is painted
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellStyle {
    /// Filled and stroked rounded rectangle per cell
    #[default]
    #[serde(alias = "border")]
    Bordered,
    /// Rounded band along the bottom of each cell
    #[serde(alias = "underline")]
    Underlined,
}

impl std::str::FromStr for CellStyle {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bordered" | "border" => Ok(Self::Bordered),
            "underlined" | "underline" => Ok(Self::Underlined),
            _ => Err(ConfigError::UnknownStyle(s.to_string())),
        }
    }
}

/// Font used for the entered glyphs
#[derive(Clone, Debug, PartialEq)]
pub struct TextStyle {
    pub font_family: String,
    pub size: f32,
    pub color: Color,
}

impl TextStyle {
    pub fn new(density: Density) -> Self {
        Self {
            font_family: DEFAULT_FONT_FAMILY.to_string(),
            size: density.px(DEFAULT_TEXT_SIZE_DP),
            color: Color::BLACK,
        }
    }
}

impl Default for TextStyle {
    fn default() -> Self {
        Self::new(Density::default())
    }
}

/// Geometry and style of a PIN view, in pixels
#[derive(Clone, Debug, PartialEq)]
pub struct PinConfig {
    pub cell_count: usize,
    pub cell_width: f32,
    pub cell_height: f32,
    pub cell_spacing: f32,
    pub stroke_width: f32,
    /// Stored as given; clamped to half the shorter cell side when drawn
    pub stroke_radius: f32,
    pub fill_color: Color,
    pub stroke_color: Color,
    pub style: CellStyle,
    pub text: TextStyle,
}

impl Default for PinConfig {
    fn default() -> Self {
        Self::new(Density::default())
    }
}

impl PinConfig {
    /// Defaults resolved against a display density
    pub fn new(density: Density) -> Self {
        Self {
            cell_count: DEFAULT_CELL_COUNT,
            cell_width: density.px(DEFAULT_CELL_SIZE_DP),
            cell_height: density.px(DEFAULT_CELL_SIZE_DP),
            cell_spacing: density.px(DEFAULT_CELL_SPACING_DP),
            stroke_width: density.px(DEFAULT_STROKE_WIDTH_DP),
            stroke_radius: density.px(DEFAULT_STROKE_RADIUS_DP),
            fill_color: Color::TRANSPARENT,
            stroke_color: Color::BLACK,
            style: CellStyle::Bordered,
            text: TextStyle::new(density),
        }
    }

    pub fn with_cell_count(mut self, count: usize) -> Self {
        self.cell_count = count;
        self
    }

    pub fn with_cell_size(mut self, width: f32, height: f32) -> Self {
        self.cell_width = width;
        self.cell_height = height;
        self
    }

    pub fn with_cell_spacing(mut self, spacing: f32) -> Self {
        self.cell_spacing = spacing;
        self
    }

    pub fn with_stroke(mut self, width: f32, radius: f32) -> Self {
        self.stroke_width = width;
        self.stroke_radius = radius;
        self
    }

    pub fn with_colors(mut self, fill: Color, stroke: Color) -> Self {
        self.fill_color = fill;
        self.stroke_color = stroke;
        self
    }

    pub fn with_style(mut self, style: CellStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_text(mut self, text: TextStyle) -> Self {
        self.text = text;
        self
    }

    /// Reject empty or degenerate geometry before it reaches layout
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cell_count == 0 {
            return Err(ConfigError::ZeroCellCount);
        }
        check_dimension("cell_width", self.cell_width)?;
        check_dimension("cell_height", self.cell_height)?;
        check_dimension("cell_spacing", self.cell_spacing)?;
        check_dimension("stroke_width", self.stroke_width)?;
        check_dimension("stroke_radius", self.stroke_radius)?;
        check_dimension("text_size", self.text.size)?;
        Ok(())
    }

    /// Corner radius actually used for bordered cells
    pub fn effective_stroke_radius(&self) -> f32 {
        let limit = self.cell_width.min(self.cell_height) / 2.0;
        if self.stroke_radius > limit {
            limit
        } else {
            self.stroke_radius
        }
    }

    /// Half the stroke width; insets strokes so they stay inside the measured bounds
    pub fn stroke_correction(&self) -> f32 {
        self.stroke_width / 2.0
    }

    /// Horizontal distance between the starts of two neighbouring cells
    pub fn cell_step(&self) -> f32 {
        self.cell_width + self.cell_spacing
    }

    /// Resolve declarative attributes against defaults at the given density
    pub fn from_attributes(attrs: &PinAttributes, density: Density) -> Result<Self, ConfigError> {
        let mut config = Self::new(density);
        attrs.apply(&mut config, density)?;
        config.validate()?;
        Ok(config)
    }
}

pub(crate) fn check_dimension(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidDimension { field, value })
    }
}

/// Construction-time attributes; sizes are in dp, colors are hex strings
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PinAttributes {
    pub cell_count: Option<usize>,
    pub style: Option<CellStyle>,
    pub cell_width: Option<f32>,
    pub cell_height: Option<f32>,
    pub cell_spacing: Option<f32>,
    pub stroke_width: Option<f32>,
    pub stroke_radius: Option<f32>,
    pub stroke_color: Option<String>,
    pub fill_color: Option<String>,
    pub text_size: Option<f32>,
    pub text_color: Option<String>,
    pub font_family: Option<String>,
}

impl PinAttributes {
    fn apply(&self, config: &mut PinConfig, density: Density) -> Result<(), ConfigError> {
        if let Some(count) = self.cell_count {
            config.cell_count = count;
        }
        if let Some(style) = self.style {
            config.style = style;
        }
        if let Some(dp) = self.cell_width {
            config.cell_width = density.px(dp);
        }
        if let Some(dp) = self.cell_height {
            config.cell_height = density.px(dp);
        }
        if let Some(dp) = self.cell_spacing {
            config.cell_spacing = density.px(dp);
        }
        if let Some(dp) = self.stroke_width {
            config.stroke_width = density.px(dp);
        }
        if let Some(dp) = self.stroke_radius {
            config.stroke_radius = density.px(dp);
        }
        if let Some(hex) = &self.stroke_color {
            config.stroke_color = parse_color(hex)?;
        }
        if let Some(hex) = &self.fill_color {
            config.fill_color = parse_color(hex)?;
        }
        if let Some(dp) = self.text_size {
            config.text.size = density.px(dp);
        }
        if let Some(hex) = &self.text_color {
            config.text.color = parse_color(hex)?;
        }
        if let Some(family) = &self.font_family {
            config.text.font_family = family.clone();
        }
        Ok(())
    }
}

/// Parse `#RRGGBB` or `#RRGGBBAA`
pub fn parse_color(hex: &str) -> Result<Color, ConfigError> {
    let invalid = || ConfigError::InvalidColor(hex.to_string());
    let digits = hex.trim().strip_prefix('#').ok_or_else(invalid)?;
    if !digits.is_ascii() || !(digits.len() == 6 || digits.len() == 8) {
        return Err(invalid());
    }

    let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| invalid());
    let alpha = if digits.len() == 8 { channel(6)? } else { 255 };
    Ok(Color::from_rgba8(channel(0)?, channel(2)?, channel(4)?, alpha))
}
