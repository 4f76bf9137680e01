use bevy::{log::LogPlugin, prelude::*};

use pinview::config::Density;
use pinview::demo;
use pinview::plugin::PinViewPlugin;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // PINVIEW_STYLE=underlined switches to the six-cell layout
    let density = Density(2.0);
    let config = match std::env::var("PINVIEW_STYLE").as_deref() {
        Ok("underlined") => demo::underlined_config(density),
        _ => demo::bordered_config(density),
    };

    let plugin = match PinViewPlugin::new(config) {
        Ok(plugin) => plugin,
        Err(err) => {
            log::error!("invalid pin view config: {err}");
            std::process::exit(1);
        }
    };

    let mut app = App::new();
    app.add_plugins((
        DefaultPlugins
            .build()
            .disable::<LogPlugin>()
            .set(WindowPlugin {
                primary_window: Some(Window {
                    title: "pinview".into(),
                    ..default()
                }),
                ..default()
            }),
        plugin,
    ));
    app.run();
}
