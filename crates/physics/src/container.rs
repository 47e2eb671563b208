// Container shell: thin static colliders in the card's local frame that hold the loose particles.
// They are children of the card body, so they move with it; the particles do not.

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;
use ly_config::CardConfig;
use ly_core::{vec3, ContainerShell};

use crate::rig::RigError;

/// Card and water-layer dimensions shared by the shell colliders and the particle spawn volume.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct ContainerGeometry {
    /// Half extents of the card's main cuboid.
    pub half_extents: Vec3,
    pub wall_thickness: f32,
    /// Depth of the water layer along local +Z, in front of the main cuboid.
    pub layer_depth: f32,
}

impl ContainerGeometry {
    pub fn new(half_extents: Vec3, wall_thickness: f32, layer_depth: f32) -> Result<Self, RigError> {
        if !half_extents.is_finite() || half_extents.min_element() <= 0.0 {
            return Err(RigError::DegenerateCard(format!(
                "half extents {half_extents:?} must be finite and > 0"
            )));
        }
        if !wall_thickness.is_finite() || wall_thickness < 0.0 {
            return Err(RigError::DegenerateCard(format!(
                "wall thickness {wall_thickness} must be finite and >= 0"
            )));
        }
        if !layer_depth.is_finite() || layer_depth <= 0.0 {
            return Err(RigError::NonPositiveLength {
                what: "card.layer_depth",
                value: layer_depth,
            });
        }
        Ok(Self {
            half_extents,
            wall_thickness,
            layer_depth,
        })
    }

    pub fn from_config(cfg: &CardConfig) -> Result<Self, RigError> {
        Self::new(vec3(cfg.half_extents), cfg.wall_thickness, cfg.layer_depth)
    }

    /// Z coordinate of the middle of the water layer.
    fn layer_center_z(&self) -> f32 {
        self.half_extents.z + self.layer_depth * 0.5
    }

    /// Local placement and half extents of every shell piece.
    pub fn shells(&self) -> [(ContainerShell, Vec3, Vec3); 5] {
        let Vec3 {
            x: hx,
            y: hy,
            z: hz,
        } = self.half_extents;
        let t = self.wall_thickness;
        let d = self.layer_depth;
        let zc = self.layer_center_z();
        [
            (
                ContainerShell::Floor,
                Vec3::new(0.0, -hy + t * 0.5, zc),
                Vec3::new(hx, t * 0.5, d * 0.5),
            ),
            (
                ContainerShell::Ceiling,
                Vec3::new(0.0, hy - t * 0.5, zc),
                Vec3::new(hx, t * 0.5, d * 0.5),
            ),
            (
                ContainerShell::LeftWall,
                Vec3::new(-hx + t * 0.5, 0.0, zc),
                Vec3::new(t * 0.5, hy, d * 0.5),
            ),
            (
                ContainerShell::RightWall,
                Vec3::new(hx - t * 0.5, 0.0, zc),
                Vec3::new(t * 0.5, hy, d * 0.5),
            ),
            (
                ContainerShell::FrontCover,
                Vec3::new(0.0, 0.0, hz + d + t * 0.5),
                Vec3::new(hx, hy, t * 0.5),
            ),
        ]
    }

    /// Local box covering the card and everything in front of it up to the cover.
    /// Returned as (center, half extents); used for pointer hit tests.
    pub fn grab_volume(&self) -> (Vec3, Vec3) {
        let Vec3 {
            x: hx,
            y: hy,
            z: hz,
        } = self.half_extents;
        let front = hz + self.layer_depth + self.wall_thickness;
        let center = Vec3::new(0.0, 0.0, (front - hz) * 0.5);
        let half = Vec3::new(hx, hy, (front + hz) * 0.5);
        (center, half)
    }
}

/// Spawn the shell colliders as children of `card`.
pub fn attach_shell(commands: &mut Commands, card: Entity, geometry: &ContainerGeometry) {
    commands.entity(card).with_children(|parent| {
        for (shell, center, half) in geometry.shells() {
            // Zero-thickness walls would make degenerate cuboids; skip them.
            if half.min_element() <= 0.0 {
                continue;
            }
            parent.spawn((
                shell,
                Collider::cuboid(half.x, half.y, half.z),
                Transform::from_translation(center),
            ));
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_geometry() -> ContainerGeometry {
        ContainerGeometry::from_config(&CardConfig::default()).expect("valid default card")
    }

    #[test]
    fn shells_sit_inside_card_outline() {
        let g = default_geometry();
        let hx = g.half_extents.x;
        let hy = g.half_extents.y;
        for (shell, center, half) in g.shells() {
            assert!(center.x.abs() + half.x <= hx + 1e-5, "{shell:?} exceeds width");
            assert!(center.y.abs() + half.y <= hy + 1e-5, "{shell:?} exceeds height");
            assert!(center.z - half.z >= g.half_extents.z - 1e-5, "{shell:?} behind card face");
        }
    }

    #[test]
    fn front_cover_closes_layer() {
        let g = default_geometry();
        let (_, cover_center, cover_half) = g
            .shells()
            .into_iter()
            .find(|(s, _, _)| *s == ContainerShell::FrontCover)
            .expect("front cover present");
        let layer_front = g.half_extents.z + g.layer_depth;
        assert!((cover_center.z - cover_half.z - layer_front).abs() < 1e-6);
    }

    #[test]
    fn grab_volume_spans_back_face_to_cover() {
        let g = default_geometry();
        let (center, half) = g.grab_volume();
        assert!((center.z - half.z + g.half_extents.z).abs() < 1e-6);
        let front = g.half_extents.z + g.layer_depth + g.wall_thickness;
        assert!((center.z + half.z - front).abs() < 1e-6);
    }

    #[test]
    fn rejects_non_positive_extents() {
        assert!(matches!(
            ContainerGeometry::new(Vec3::new(0.8, 0.0, 0.01), 0.02, 0.12),
            Err(RigError::DegenerateCard(_))
        ));
        assert!(matches!(
            ContainerGeometry::new(Vec3::new(0.8, 1.0, 0.01), 0.02, 0.0),
            Err(RigError::NonPositiveLength { .. })
        ));
        assert!(ContainerGeometry::new(Vec3::splat(f32::NAN), 0.02, 0.12).is_err());
    }
}
