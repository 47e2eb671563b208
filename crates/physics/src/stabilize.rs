use bevy::prelude::*;
use bevy_rapier3d::prelude::Velocity;
use ly_core::{Card, ConfigRes};

/// Proportional yaw correction: only the Y component changes.
pub fn corrected_angvel(angvel: Vec3, rotation: Quat, gain: f32) -> Vec3 {
    Vec3::new(angvel.x, angvel.y - rotation.y * gain, angvel.z)
}

/// Post-physics: bias the card back toward facing the viewer. Runs whether or not it is dragged.
pub fn stabilize_card(cfg: Res<ConfigRes>, mut q: Query<(&Transform, &mut Velocity), With<Card>>) {
    let s = &cfg.0.stabilization;
    if !s.enabled {
        return;
    }
    for (tf, mut vel) in &mut q {
        let next = corrected_angvel(vel.angvel, tf.rotation, s.gain);
        if next.is_finite() && next != vel.angvel {
            vel.angvel = next;
        }
    }
}
