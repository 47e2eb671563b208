// Gameplay crate: pointer dragging of the card and the smoothed ribbon.
// - Pointer state is sampled once per frame into `PointerSample`.
// - Drag start/stop and the kinematic target are written in ly_core::PrePhysicsSet.
// - The ribbon is rebuilt in ly_core::RibbonSet once the chain pose has been read.

use bevy::prelude::*;
use ly_core::{PrePhysicsSet, RibbonSet};

pub mod controls;
pub mod curve;
pub mod drag;
pub mod pointer;
pub mod smoother;

pub use curve::CatmullRom;
pub use drag::{grab_offset, kinematic_target};
pub use pointer::{project_pointer, PointerRay, PointerSample};
pub use smoother::{clamped_distance, CurveSmoother, LaggedPoint};

pub const LOG_TARGET: &str = "ly_gameplay";

pub struct GameplayPlugin;

impl Plugin for GameplayPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PointerSample>();
        app.init_resource::<CurveSmoother>();
        {
            let s = app.world().resource::<CurveSmoother>();
            info!(
                target: LOG_TARGET,
                "ribbon smoothing: speeds {}..{}, {} samples",
                s.min_speed,
                s.max_speed,
                s.samples
            );
        }

        app.add_systems(
            Update,
            (
                pointer::sample_pointer.run_if(
                    resource_exists::<ButtonInput<MouseButton>>
                        .and(resource_exists::<Touches>)
                        .and(any_with_component::<Window>),
                ),
                drag::track_hover,
                (drag::begin_or_end_drag, drag::drive_drag_target)
                    .chain()
                    .in_set(PrePhysicsSet),
            )
                .chain(),
        );
        app.add_systems(
            Update,
            controls::handle_keys.run_if(resource_exists::<ButtonInput<KeyCode>>),
        );
        app.add_systems(PostUpdate, smoother::update_ribbon.in_set(RibbonSet));
    }
}
