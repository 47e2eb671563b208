//! ly_physics: Rapier 3D integration for the lanyard.
//!
//! Responsibilities:
//! * Build the chain rig (anchor, three rope segments, card) once at startup.
//! * Attach the container shell to the card and spawn the particle ensemble inside it.
//! * Publish `ChainPose` after every physics writeback.
//! * Apply the card's yaw stabilization.
//! * Keep Rapier's gravity in sync with the loaded config.

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;
use ly_core::{ChainLink, ChainPose, ConfigRes, PostPhysicsAdjustSet, PrePhysicsSet, RibbonSet};

pub mod container;
pub mod rig;
pub mod stabilize;
pub mod volume;

pub use container::ContainerGeometry;
pub use rig::{ChainRigSpec, JointKind, JointSpec, RigError};
pub use stabilize::corrected_angvel;
pub use volume::SpawnBox;

pub const LOG_TARGET: &str = "ly_physics";

pub struct PhysicsPlugin;

impl Plugin for PhysicsPlugin {
    fn build(&self, app: &mut App) {
        if !app.is_plugin_added::<RapierPhysicsPlugin<NoUserData>>() {
            app.add_plugins(RapierPhysicsPlugin::<NoUserData>::default());
        }

        // Drag targets are written in Update, Rapier steps in PostUpdate, reads follow writeback.
        app.configure_sets(Update, PrePhysicsSet);
        app.configure_sets(
            PostUpdate,
            PostPhysicsAdjustSet
                .after(PhysicsSet::Writeback)
                .before(bevy::transform::TransformSystem::TransformPropagate),
        );

        app.add_systems(Startup, (rig::setup_chain, volume::spawn_particles).chain());
        app.add_systems(PostUpdate, apply_config_gravity.before(PhysicsSet::SyncBackend));
        app.add_systems(
            PostUpdate,
            (
                read_chain_pose.before(RibbonSet),
                stabilize::stabilize_card.after(read_chain_pose),
            )
                .in_set(PostPhysicsAdjustSet),
        );
    }
}

/// Push `gravity.y` into every Rapier context when it differs.
pub fn apply_config_gravity(cfg: Res<ConfigRes>, mut contexts: Query<&mut RapierConfiguration>) {
    let gravity = Vec3::new(0.0, cfg.0.gravity.y, 0.0);
    for mut rapier in &mut contexts {
        if rapier.gravity != gravity {
            rapier.gravity = gravity;
        }
    }
}

/// Copy chain body transforms into `ChainPose`. Leaves the pose untouched if a body is missing.
pub fn read_chain_pose(bodies: Query<(&ChainLink, &Transform)>, mut pose: ResMut<ChainPose>) {
    let mut translations = pose.translations;
    let mut card_rotation = pose.card_rotation;
    let mut seen = 0usize;
    for (link, tf) in &bodies {
        translations[link.index()] = tf.translation;
        if *link == ChainLink::Card {
            card_rotation = tf.rotation;
        }
        seen |= 1 << link.index();
    }
    if seen != (1 << ly_core::CHAIN_BODY_COUNT) - 1 {
        return;
    }
    pose.translations = translations;
    pose.card_rotation = card_rotation;
    pose.ready = true;
}
