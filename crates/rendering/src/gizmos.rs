//! Immediate-mode drawing of the lanyard with gizmos.
//!
//! The ribbon is the published `RibbonPolyline`; the card, container cover and anchor are drawn
//! from their current transforms; particles as small spheres at their simulated positions.

use bevy::prelude::*;
use ly_core::{Card, ChainPose, Particle, RibbonPolyline};
use ly_physics::ContainerGeometry;

use crate::palette::{card_color, Palette};
use crate::CardHighlight;

pub(crate) fn draw_ribbon(mut gizmos: Gizmos, ribbon: Res<RibbonPolyline>) {
    if ribbon.points.len() < 2 {
        return;
    }
    gizmos.linestrip(ribbon.points.iter().copied(), Palette::RIBBON);
}

pub(crate) fn draw_card(
    mut gizmos: Gizmos,
    geometry: Option<Res<ContainerGeometry>>,
    highlight: Res<CardHighlight>,
    cards: Query<&GlobalTransform, With<Card>>,
) {
    let Some(geometry) = geometry else { return; };
    let color = card_color(highlight.hovered, highlight.dragging);
    let (grab_center, grab_half) = geometry.grab_volume();
    for gt in &cards {
        let tf = gt.compute_transform();
        gizmos.cuboid(
            tf.with_scale(geometry.half_extents * 2.0),
            color,
        );
        let layer = Transform {
            translation: tf.transform_point(grab_center),
            rotation: tf.rotation,
            scale: grab_half * 2.0,
        };
        gizmos.cuboid(layer, Palette::CONTAINER);
    }
}

pub(crate) fn draw_anchor(mut gizmos: Gizmos, pose: Res<ChainPose>) {
    if !pose.ready {
        return;
    }
    gizmos.sphere(Isometry3d::from_translation(pose.anchor()), 0.08, Palette::ANCHOR);
}

pub(crate) fn draw_particles(
    mut gizmos: Gizmos,
    cfg: Res<ly_core::ConfigRes>,
    particles: Query<&GlobalTransform, With<Particle>>,
) {
    let r = cfg.0.particles.radius;
    for gt in &particles {
        gizmos
            .sphere(Isometry3d::from_translation(gt.translation()), r, Palette::PARTICLE)
            .resolution(6);
    }
}
