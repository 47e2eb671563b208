// integration_tests crate: black-box scenarios across the published plugin APIs.
// Apps are headless (no window, no gizmos) and step with a fixed 1/60 s frame so runs are
// reproducible.

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use bevy_rapier3d::prelude::TimestepMode;
use ly_core::{ConfigRes, CorePlugin, RngSeed};
use std::time::Duration;

pub const FRAME_DT: f32 = 1.0 / 60.0;

/// Every lanyard plugin on top of MinimalPlugins, driven by a manual clock.
pub fn build_headless_app(cfg: ly_config::LanyardConfig) -> App {
    let mut app = App::new();
    app.add_plugins((MinimalPlugins, TransformPlugin, bevy::input::InputPlugin));
    app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f32(
        FRAME_DT,
    )));
    app.insert_resource(TimestepMode::Fixed {
        dt: FRAME_DT,
        substeps: 1,
    });
    app.insert_resource(ConfigRes(cfg));
    app.insert_resource(RngSeed(12345));
    app.add_plugins((
        CorePlugin,
        ly_physics::PhysicsPlugin,
        ly_gameplay::GameplayPlugin,
        ly_rendering::RenderingPlugin,
        ly_debug_tools::DebugToolsPlugin,
    ));
    app
}

/// Run `steps` frames.
pub fn advance(app: &mut App, steps: u32) {
    for _ in 0..steps {
        app.update();
    }
}
