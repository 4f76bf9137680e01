use crossbeam_channel::{unbounded, Receiver, Sender};
use tiny_skia::Color;

use crate::config::{check_dimension, CellStyle, PinConfig, TextStyle};
use crate::error::ConfigError;
use crate::geometry::{cell_rect_at, desired_size, MeasureSpec, MeasuredSize, Padding};
use crate::mask::{InputMask, LengthFilter, PinText};
use crate::renderer::{render_cell, CellPaint};
use crate::surface::Surface;

/// Work the host owes the widget after a change
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Invalidation {
    Redraw,
    /// Size changed too; measure before drawing
    Relayout,
}

/// Notifications published to subscribers
#[derive(Clone, Debug, PartialEq)]
pub enum PinEvent {
    TextChanged(String),
    /// Every cell holds a character
    Completed(String),
    Invalidated(Invalidation),
}

/// Input behaviour the widget requests from its host editor
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InputHints {
    pub numeric_keyboard: bool,
    pub cursor_visible: bool,
    pub focusable_in_touch_mode: bool,
    pub suggestions: bool,
}

/// An OTP/PIN entry widget drawn as a row of cells
pub struct PinView {
    config: PinConfig,
    padding: Padding,
    mask: InputMask,
    text: PinText,
    measured: MeasuredSize,
    pending: Option<Invalidation>,
    subscribers: Vec<Sender<PinEvent>>,
}

impl PinView {
    pub fn new(config: PinConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            mask: InputMask::new(config.cell_count),
            config,
            padding: Padding::default(),
            text: PinText::default(),
            measured: MeasuredSize::default(),
            pending: Some(Invalidation::Relayout),
            subscribers: Vec::new(),
        })
    }

    pub fn config(&self) -> &PinConfig {
        &self.config
    }

    pub fn text(&self) -> &PinText {
        &self.text
    }

    pub fn padding(&self) -> Padding {
        self.padding
    }

    pub fn measured_size(&self) -> MeasuredSize {
        self.measured
    }

    /// The single length filter registered with the host editor
    pub fn length_filter(&self) -> LengthFilter {
        self.mask.filter()
    }

    pub fn input_hints(&self) -> InputHints {
        InputHints {
            numeric_keyboard: true,
            cursor_visible: false,
            focusable_in_touch_mode: true,
            suggestions: self.suggestions_enabled(),
        }
    }

    pub fn suggestions_enabled(&self) -> bool {
        false
    }

    /// The widget paints its own cells; host backgrounds are ignored
    pub fn set_background<B>(&mut self, _background: B) {
        log::debug!("ignoring host background for pin view");
    }

    /// New receiver for text and invalidation events
    pub fn subscribe(&mut self) -> Receiver<PinEvent> {
        let (tx, rx) = unbounded();
        self.subscribers.push(tx);
        rx
    }

    /// Hand pending work to the host and clear it
    pub fn take_invalidation(&mut self) -> Option<Invalidation> {
        self.pending.take()
    }

    /// Report the widget size for the host's constraints
    pub fn on_measure(&mut self, width_spec: MeasureSpec, height_spec: MeasureSpec) -> MeasuredSize {
        self.measured = desired_size(&self.config, &self.padding, width_spec, height_spec);
        log::debug!(
            "measured pin view at {}x{} ({:?}, {:?})",
            self.measured.width,
            self.measured.height,
            width_spec,
            height_spec
        );
        self.measured
    }

    /// Paint every cell onto `surface`
    pub fn draw<S: Surface + ?Sized>(&self, surface: &mut S) {
        let paint = CellPaint::from_config(&self.config);
        let correction = self.config.stroke_correction();
        let mut offset = 0.0;

        for index in 0..self.config.cell_count {
            let rect = cell_rect_at(&self.config, offset, correction);
            render_cell(surface, &paint, rect, &self.config, self.text.char_at(index));
            offset += self.config.cell_step();
        }
    }

    /// Accept the host editor's full current text
    pub fn on_text_changed(&mut self, raw: &str) -> &PinText {
        let text = self.mask.normalize(raw);
        if text != self.text {
            self.text = text;
            log::debug!("pin text now has {} of {} characters", self.text.len(), self.config.cell_count);
            self.publish_text();
        }
        self.invalidate(Invalidation::Redraw);
        &self.text
    }

    /// Clear the entered text
    pub fn reset(&mut self) {
        if !self.text.is_empty() {
            self.text = PinText::default();
            self.publish_text();
        }
        self.invalidate(Invalidation::Redraw);
    }

    pub fn set_padding(&mut self, padding: Padding) {
        self.padding = padding;
        self.invalidate(Invalidation::Relayout);
    }

    pub fn style(&self) -> CellStyle {
        self.config.style
    }

    pub fn set_style(&mut self, style: CellStyle) {
        self.config.style = style;
        self.invalidate(Invalidation::Redraw);
    }

    pub fn cell_count(&self) -> usize {
        self.config.cell_count
    }

    pub fn set_cell_count(&mut self, count: usize) -> Result<(), ConfigError> {
        if count == 0 {
            return Err(ConfigError::ZeroCellCount);
        }
        log::debug!("cell count {} -> {}", self.config.cell_count, count);
        self.config.cell_count = count;
        self.mask.set_max_length(count);
        if self.text.truncate(count) {
            self.publish_text();
        }
        self.invalidate(Invalidation::Relayout);
        Ok(())
    }

    pub fn fill_color(&self) -> Color {
        self.config.fill_color
    }

    pub fn set_fill_color(&mut self, color: Color) {
        self.config.fill_color = color;
        self.invalidate(Invalidation::Redraw);
    }

    pub fn stroke_color(&self) -> Color {
        self.config.stroke_color
    }

    pub fn set_stroke_color(&mut self, color: Color) {
        self.config.stroke_color = color;
        self.invalidate(Invalidation::Redraw);
    }

    pub fn cell_width(&self) -> f32 {
        self.config.cell_width
    }

    pub fn set_cell_width(&mut self, value: f32) -> Result<(), ConfigError> {
        check_dimension("cell_width", value)?;
        self.config.cell_width = value;
        self.invalidate(Invalidation::Relayout);
        Ok(())
    }

    pub fn cell_height(&self) -> f32 {
        self.config.cell_height
    }

    pub fn set_cell_height(&mut self, value: f32) -> Result<(), ConfigError> {
        check_dimension("cell_height", value)?;
        self.config.cell_height = value;
        self.invalidate(Invalidation::Relayout);
        Ok(())
    }

    pub fn cell_spacing(&self) -> f32 {
        self.config.cell_spacing
    }

    pub fn set_cell_spacing(&mut self, value: f32) -> Result<(), ConfigError> {
        check_dimension("cell_spacing", value)?;
        self.config.cell_spacing = value;
        self.invalidate(Invalidation::Relayout);
        Ok(())
    }

    pub fn stroke_width(&self) -> f32 {
        self.config.stroke_width
    }

    pub fn set_stroke_width(&mut self, value: f32) -> Result<(), ConfigError> {
        check_dimension("stroke_width", value)?;
        self.config.stroke_width = value;
        self.invalidate(Invalidation::Relayout);
        Ok(())
    }

    pub fn stroke_radius(&self) -> f32 {
        self.config.stroke_radius
    }

    pub fn set_stroke_radius(&mut self, value: f32) -> Result<(), ConfigError> {
        check_dimension("stroke_radius", value)?;
        self.config.stroke_radius = value;
        self.invalidate(Invalidation::Redraw);
        Ok(())
    }

    pub fn text_style(&self) -> &TextStyle {
        &self.config.text
    }

    pub fn set_text_style(&mut self, style: TextStyle) -> Result<(), ConfigError> {
        check_dimension("text_size", style.size)?;
        self.config.text = style;
        self.invalidate(Invalidation::Redraw);
        Ok(())
    }

    fn invalidate(&mut self, kind: Invalidation) {
        // Keep the stronger request when several changes land before the host polls
        let merged = self.pending.map_or(kind, |pending| pending.max(kind));
        self.pending = Some(merged);
        self.publish(PinEvent::Invalidated(kind));
    }

    fn publish_text(&mut self) {
        let text = self.text.to_string();
        self.publish(PinEvent::TextChanged(text.clone()));
        if self.text.len() == self.config.cell_count {
            self.publish(PinEvent::Completed(text));
        }
    }

    fn publish(&mut self, event: PinEvent) {
        self.subscribers.retain(|tx| tx.try_send(event.clone()).is_ok());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{DrawOp, GlyphBounds, Recorder};

    fn view() -> PinView {
        let config = PinConfig::default()
            .with_cell_size(40.0, 40.0)
            .with_cell_spacing(10.0)
            .with_stroke(2.0, 4.0);
        PinView::new(config).unwrap()
    }

    fn drain(rx: &Receiver<PinEvent>) -> Vec<PinEvent> {
        rx.try_iter().collect()
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        assert!(matches!(
            PinView::new(PinConfig::default().with_cell_count(0)),
            Err(ConfigError::ZeroCellCount)
        ));
        assert!(PinView::new(PinConfig::default().with_cell_spacing(-10.0)).is_err());
    }

    #[test]
    fn test_measure_uses_padding() {
        let mut view = view();
        view.set_padding(Padding { start: 8.0, top: 4.0, end: 8.0, bottom: 4.0 });
        let size = view.on_measure(MeasureSpec::Unspecified, MeasureSpec::AtMost(500.0));
        assert_eq!(size, MeasuredSize { width: 207.0, height: 49.0 });
        assert_eq!(view.measured_size(), size);
    }

    #[test]
    fn test_draw_one_shape_pair_per_cell() {
        let mut view = view();
        view.on_text_changed("9");
        let mut surface = Recorder::new(GlyphBounds { width: 10.0, height: 14.0 });

        view.draw(&mut surface);

        let fills = surface.ops.iter().filter(|op| matches!(op, DrawOp::FillRoundRect { .. })).count();
        let strokes = surface.ops.iter().filter(|op| matches!(op, DrawOp::StrokeRoundRect { .. })).count();
        assert_eq!((fills, strokes), (4, 4));
        assert_eq!(surface.glyphs(), vec!['9']);
    }

    #[test]
    fn test_draw_is_idempotent() {
        let mut view = view();
        view.on_text_changed("1234");
        let mut first = Recorder::default();
        let mut second = Recorder::default();

        view.draw(&mut first);
        view.draw(&mut second);

        assert_eq!(first.ops, second.ops);
    }

    #[test]
    fn test_text_events_and_completion() {
        let mut view = view();
        let rx = view.subscribe();

        view.on_text_changed("12");
        view.on_text_changed("12 34");

        let events = drain(&rx);
        assert!(events.contains(&PinEvent::TextChanged("12".into())));
        assert!(events.contains(&PinEvent::TextChanged("123".into())));
        assert!(!events.iter().any(|e| matches!(e, PinEvent::Completed(_))));

        view.on_text_changed("1234");
        assert!(drain(&rx).contains(&PinEvent::Completed("1234".into())));
    }

    #[test]
    fn test_unchanged_text_only_redraws() {
        let mut view = view();
        view.on_text_changed("12");
        let rx = view.subscribe();

        view.on_text_changed("1 2");

        assert_eq!(drain(&rx), vec![PinEvent::Invalidated(Invalidation::Redraw)]);
    }

    #[test]
    fn test_reset_clears_text() {
        let mut view = view();
        view.on_text_changed("5555");
        view.reset();
        assert!(view.text().is_empty());

        let mut surface = Recorder::default();
        view.draw(&mut surface);
        assert!(surface.glyphs().is_empty());
    }

    #[test]
    fn test_setters_invalidate() {
        let mut view = view();
        assert_eq!(view.take_invalidation(), Some(Invalidation::Relayout));
        assert_eq!(view.take_invalidation(), None);

        view.set_stroke_color(Color::WHITE);
        assert_eq!(view.take_invalidation(), Some(Invalidation::Redraw));

        view.set_fill_color(Color::BLACK);
        view.set_cell_width(32.0).unwrap();
        view.set_style(CellStyle::Underlined);
        assert_eq!(view.take_invalidation(), Some(Invalidation::Relayout));

        assert!(view.set_cell_height(-2.0).is_err());
        assert_eq!(view.cell_height(), 40.0);
        assert_eq!(view.take_invalidation(), None);
    }

    #[test]
    fn test_style_setters_used_by_script_hosts() {
        let mut view = view();
        view.take_invalidation();

        let mut style = view.text_style().clone();
        style.size = 24.0;
        style.color = Color::WHITE;
        view.set_text_style(style).unwrap();
        assert_eq!(view.text_style().size, 24.0);
        assert_eq!(view.text_style().color, Color::WHITE);
        assert_eq!(view.take_invalidation(), Some(Invalidation::Redraw));

        let mut bad = view.text_style().clone();
        bad.size = -1.0;
        assert!(view.set_text_style(bad).is_err());
        assert_eq!(view.text_style().size, 24.0);

        view.set_stroke_radius(6.0).unwrap();
        view.set_stroke_width(3.0).unwrap();
        view.set_cell_spacing(4.0).unwrap();
        assert_eq!((view.stroke_radius(), view.stroke_width(), view.cell_spacing()), (6.0, 3.0, 4.0));
        assert_eq!(view.take_invalidation(), Some(Invalidation::Relayout));
        assert!(view.set_stroke_radius(f32::INFINITY).is_err());
    }

    #[test]
    fn test_shrinking_cell_count_truncates_text() {
        let mut view = view();
        view.on_text_changed("1234");
        let rx = view.subscribe();

        view.set_cell_count(2).unwrap();

        assert_eq!(view.text().to_string(), "12");
        assert_eq!(view.length_filter(), LengthFilter::new(2));
        let events = drain(&rx);
        assert!(events.contains(&PinEvent::TextChanged("12".into())));
        assert!(events.contains(&PinEvent::Completed("12".into())));
        assert!(view.set_cell_count(0).is_err());
    }

    #[test]
    fn test_dropped_subscriber_is_pruned() {
        let mut view = view();
        let rx = view.subscribe();
        drop(rx);
        view.on_text_changed("1");
        assert!(view.subscribers.is_empty());
    }

    #[test]
    fn test_host_hooks() {
        let mut view = view();
        view.set_background(Color::WHITE);
        assert!(!view.suggestions_enabled());
        let hints = view.input_hints();
        assert!(hints.numeric_keyboard);
        assert!(!hints.cursor_visible);
        assert!(!hints.suggestions);
    }
}
