pub mod config;
pub mod demo;
pub mod error;
pub mod geometry;
pub mod mask;
pub mod plugin;
pub mod raster;
pub mod renderer;
pub mod surface;
pub mod view;

#[cfg(target_arch = "wasm32")]
pub mod wasm;

pub use config::{CellStyle, Density, PinAttributes, PinConfig, TextStyle};
pub use error::{ConfigError, SurfaceError};
pub use geometry::{cell_rect, desired_size, CellRect, MeasureSpec, MeasuredSize, Padding};
pub use mask::{InputMask, LengthFilter, PinText};
pub use raster::{GlyphCache, PixmapSurface, Rasterizer};
pub use renderer::{render_cell, CellPaint};
pub use surface::{DrawOp, GlyphBounds, Recorder, Surface};
pub use view::{InputHints, Invalidation, PinEvent, PinView};
