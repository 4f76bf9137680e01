use bevy::asset::RenderAssetUsages;
use bevy::input::keyboard::{Key, KeyboardInput};
use bevy::input::ButtonState;
use bevy::prelude::*;
use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat};
use crossbeam_channel::Receiver;

use crate::config::{CellStyle, PinConfig};
use crate::error::ConfigError;
use crate::geometry::MeasureSpec;
use crate::raster::Rasterizer;
use crate::view::{Invalidation, PinEvent, PinView};

/// Shows one pin view as a sprite and feeds it keyboard input
pub struct PinViewPlugin {
    config: PinConfig,
}

impl PinViewPlugin {
    pub fn new(config: PinConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }
}

impl Plugin for PinViewPlugin {
    fn build(&self, app: &mut App) {
        let mut view = match PinView::new(self.config.clone()) {
            Ok(view) => view,
            Err(err) => {
                log::error!("pin view disabled: {err}");
                return;
            }
        };
        let events = view.subscribe();

        app.insert_resource(PinViewState { view, editor: String::new(), events, image: None })
            .insert_non_send_resource(Rasterizer::default())
            .add_systems(Startup, setup_pin_view)
            .add_systems(Update, (handle_pin_input, log_pin_events, redraw_pin_view).chain());
    }
}

/// The widget plus the host editor's raw buffer
#[derive(Resource)]
pub struct PinViewState {
    pub view: PinView,
    /// Raw text as the host editor holds it, after the length filter
    pub editor: String,
    events: Receiver<PinEvent>,
    image: Option<Handle<Image>>,
}

#[derive(Component)]
struct PinViewSprite;

fn setup_pin_view(mut commands: Commands, mut images: ResMut<Assets<Image>>, mut state: ResMut<PinViewState>) {
    commands.spawn((Camera2d, Transform::from_xyz(0.0, 0.0, 0.0)));

    let placeholder = pixmap_image(1, 1, vec![0, 0, 0, 0]);
    let handle = images.add(placeholder);
    commands.spawn((Sprite::from_image(handle.clone()), PinViewSprite));
    state.image = Some(handle);

    commands.spawn((
        Text::new("Type digits, Backspace to delete, Tab to switch style, Esc to reset"),
        TextFont { font_size: 14.0, ..default() },
        TextColor(Color::WHITE),
        Node {
            position_type: PositionType::Absolute,
            top: Val::Px(10.0),
            left: Val::Px(10.0),
            ..default()
        },
    ));
}

fn handle_pin_input(mut keys: MessageReader<KeyboardInput>, mut state: ResMut<PinViewState>) {
    let mut edited = false;

    for key in keys.read() {
        if key.state != ButtonState::Pressed {
            continue;
        }

        match &key.logical_key {
            Key::Character(text) => {
                state.editor.push_str(text.as_str());
                edited = true;
            }
            Key::Space => {
                state.editor.push(' ');
                edited = true;
            }
            Key::Backspace => {
                state.editor.pop();
                edited = true;
            }
            Key::Escape => {
                state.editor.clear();
                state.view.reset();
            }
            Key::Tab => {
                let style = match state.view.style() {
                    CellStyle::Bordered => CellStyle::Underlined,
                    CellStyle::Underlined => CellStyle::Bordered,
                };
                state.view.set_style(style);
            }
            _ => {}
        }
    }

    if edited {
        let state = &mut *state;
        // The host editor enforces the widget's length filter before reporting the change
        let bounded = state.view.length_filter().apply(&state.editor).to_string();
        state.editor = bounded;
        state.view.on_text_changed(&state.editor);
    }
}

fn log_pin_events(state: Res<PinViewState>) {
    for event in state.events.try_iter() {
        match event {
            PinEvent::Completed(pin) => log::info!("pin complete: {pin}"),
            PinEvent::TextChanged(pin) => log::debug!("pin text: {pin:?}"),
            PinEvent::Invalidated(_) => {}
        }
    }
}

fn redraw_pin_view(
    mut state: ResMut<PinViewState>,
    mut rasterizer: NonSendMut<Rasterizer>,
    mut images: ResMut<Assets<Image>>,
) {
    let Some(kind) = state.view.take_invalidation() else { return };
    let Some(handle) = state.image.clone() else { return };

    if kind == Invalidation::Relayout || state.view.measured_size().width == 0.0 {
        state.view.on_measure(MeasureSpec::Unspecified, MeasureSpec::Unspecified);
    }

    match rasterizer.render_rgba(&state.view) {
        Ok((width, height, data)) => {
            if let Some(image) = images.get_mut(&handle) {
                *image = pixmap_image(width, height, data);
            }
        }
        Err(err) => log::warn!("skipping pin view frame: {err}"),
    }
}

fn pixmap_image(width: u32, height: u32, data: Vec<u8>) -> Image {
    Image::new(
        Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        TextureDimension::D2,
        data,
        TextureFormat::Rgba8UnormSrgb,
        RenderAssetUsages::default(),
    )
}
