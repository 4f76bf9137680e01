use tiny_skia::Color;

use crate::config::{CellStyle, Density, PinConfig, TextStyle};


/// Four bordered cells with a light fill, as shown by the demo binary
pub fn bordered_config(density: Density) -> PinConfig {
    PinConfig::new(density)
        .with_colors(Color::from_rgba8(0xf5, 0xf5, 0xf5, 0xff), Color::from_rgba8(0x30, 0x30, 0x30, 0xff))
        .with_text(TextStyle {
            size: density.px(22.0),
            ..TextStyle::new(density)
        })
}

/// Six underlined cells, the usual layout for SMS codes
pub fn underlined_config(density: Density) -> PinConfig {
    PinConfig::new(density)
        .with_cell_count(6)
        .with_cell_size(density.px(32.0), density.px(40.0))
        .with_cell_spacing(density.px(8.0))
        .with_style(CellStyle::Underlined)
        .with_colors(Color::TRANSPARENT, Color::from_rgba8(0x19, 0x76, 0xd2, 0xff))
}
