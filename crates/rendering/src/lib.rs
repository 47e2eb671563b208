// Rendering crate: thin presentation adapter.
// Spawns the perspective camera, tracks hover / drag highlight from ly_core events, draws the
// lanyard with gizmos (skipped under test / headless), and toggles Rapier debug render with F1.

use bevy::prelude::*;
use bevy_rapier3d::render::DebugRenderContext;
use ly_core::{vec3, ConfigRes, DragChanged, HoverChanged};

mod palette;
pub use palette::{card_color, Palette};

#[cfg(not(any(test, feature = "headless")))]
mod gizmos;

pub const LOG_TARGET: &str = "ly_rendering";

#[derive(Component)]
pub struct LanyardCamera;

/// Presentation-side view of the interaction state.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CardHighlight {
    pub hovered: bool,
    pub dragging: bool,
}

fn setup_camera(mut commands: Commands, cfg: Res<ConfigRes>) {
    let cam = &cfg.0.camera;
    commands.spawn((
        Camera3d::default(),
        Projection::from(PerspectiveProjection {
            fov: cam.fov_degrees.to_radians(),
            ..default()
        }),
        Transform::from_translation(vec3(cam.position)).looking_to(Vec3::NEG_Z, Vec3::Y),
        LanyardCamera,
    ));
}

fn track_highlight(
    mut drag: EventReader<DragChanged>,
    mut hover: EventReader<HoverChanged>,
    mut highlight: ResMut<CardHighlight>,
) {
    let mut next = *highlight;
    for ev in drag.read() {
        next.dragging = ev.dragging;
    }
    for ev in hover.read() {
        next.hovered = ev.hovered;
    }
    if next != *highlight {
        *highlight = next;
    }
}

/// Start state from config, then F1 flips it. No-op without the debug render plugin.
fn sync_debug_render(
    keys: Option<Res<ButtonInput<KeyCode>>>,
    cfg: Res<ConfigRes>,
    ctx: Option<ResMut<DebugRenderContext>>,
    mut initialized: Local<bool>,
) {
    let Some(mut ctx) = ctx else { return; };
    if !*initialized {
        ctx.enabled = cfg.0.rapier_debug;
        *initialized = true;
    }
    if keys.is_some_and(|k| k.just_pressed(KeyCode::F1)) {
        ctx.enabled = !ctx.enabled;
        info!(target: LOG_TARGET, "rapier debug render -> {}", ctx.enabled);
    }
}

pub struct RenderingPlugin;

impl Plugin for RenderingPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CardHighlight>()
            .insert_resource(ClearColor(Palette::BG))
            .add_systems(Startup, setup_camera)
            .add_systems(Update, (track_highlight, sync_debug_render));

        #[cfg(not(any(test, feature = "headless")))]
        app.add_systems(
            PostUpdate,
            (
                gizmos::draw_ribbon,
                gizmos::draw_card,
                gizmos::draw_anchor,
                gizmos::draw_particles,
            )
                .after(ly_core::RibbonSet)
                .after(bevy::transform::TransformSystem::TransformPropagate),
        );
    }
}
