// Drag controller: Idle --press over card--> Dragging(offset) --release--> Idle.
// While dragging the card is kinematic and its translation tracks the pointer each frame.

use bevy::prelude::*;
use bevy_rapier3d::prelude::{RigidBody, Sleeping};
use ly_core::{Card, Chain, ConfigRes, DragChanged, DragState, HoverChanged};
use ly_physics::ContainerGeometry;

use crate::pointer::{ray_box_hit, PointerSample};
use crate::LOG_TARGET;

/// Grab point relative to the card origin.
pub fn grab_offset(contact: Vec3, card: Vec3) -> Vec3 {
    contact - card
}

/// Card translation that keeps the grab point under the pointer.
pub fn kinematic_target(pointer_world: Vec3, offset: Vec3) -> Vec3 {
    pointer_world - offset
}

/// Where the pointer ray first meets the card's grab volume.
pub fn card_contact(
    pointer: &PointerSample,
    card: &Transform,
    geometry: &ContainerGeometry,
) -> Option<Vec3> {
    let ray = pointer.ray?;
    let (center, half) = geometry.grab_volume();
    ray_box_hit(&ray, card, center, half).map(|t| ray.at(t))
}

pub type ChainBodies<'w, 's> = Query<
    'w,
    's,
    (
        &'static Transform,
        &'static mut RigidBody,
        Option<&'static mut Sleeping>,
    ),
>;

/// Switch the card between kinematic (dragging) and dynamic.
pub fn set_card_kinematic(bodies: &mut ChainBodies, chain: &Chain, kinematic: bool) {
    let want = if kinematic {
        RigidBody::KinematicPositionBased
    } else {
        RigidBody::Dynamic
    };
    if let Ok((_, mut rb, _)) = bodies.get_mut(chain.card()) {
        if *rb != want {
            *rb = want;
        }
    }
}

/// Force every chain body awake so the rope reacts in the same step as the card.
pub fn wake_chain(bodies: &mut ChainBodies, chain: &Chain) {
    for entity in chain.bodies {
        if let Ok((_, _, Some(mut sleeping))) = bodies.get_mut(entity) {
            sleeping.sleeping = false;
        }
    }
}

/// Pre-physics: start a drag on press over the card, end it on release anywhere.
pub fn begin_or_end_drag(
    pointer: Res<PointerSample>,
    cfg: Res<ConfigRes>,
    chain: Option<Res<Chain>>,
    geometry: Option<Res<ContainerGeometry>>,
    mut drag: ResMut<DragState>,
    mut bodies: ChainBodies,
    mut events: EventWriter<DragChanged>,
) {
    let (Some(chain), Some(geometry)) = (chain, geometry) else {
        return;
    };

    if pointer.just_released && drag.end() {
        set_card_kinematic(&mut bodies, &chain, false);
        events.write(DragChanged { dragging: false });
        debug!(target: LOG_TARGET, "drag end");
    }

    if !cfg.0.drag.enabled || !pointer.just_pressed || drag.is_dragging() {
        return;
    }
    let Ok((card_tf, _, _)) = bodies.get(chain.card()) else {
        return;
    };
    let card_tf = *card_tf;
    let Some(contact) = card_contact(&pointer, &card_tf, &geometry) else {
        return;
    };
    let offset = drag.begin(contact, card_tf.translation);
    set_card_kinematic(&mut bodies, &chain, true);
    wake_chain(&mut bodies, &chain);
    events.write(DragChanged { dragging: true });
    debug!(target: LOG_TARGET, "drag begin: contact {contact:?} offset {offset:?}");
}

/// Pre-physics: move the kinematic card to the pointer minus the grab offset.
pub fn drive_drag_target(
    pointer: Res<PointerSample>,
    drag: Res<DragState>,
    mut cards: Query<&mut Transform, With<Card>>,
) {
    let Some(world) = pointer.world else { return; };
    let Some(target) = drag.offset().map(|offset| kinematic_target(world, offset)) else {
        return;
    };
    if !target.is_finite() {
        return;
    }
    for mut tf in &mut cards {
        if tf.translation != target {
            tf.translation = target;
        }
    }
}

/// Emit `HoverChanged` when the pointer ray enters or leaves the card.
pub fn track_hover(
    pointer: Res<PointerSample>,
    geometry: Option<Res<ContainerGeometry>>,
    cards: Query<&Transform, With<Card>>,
    mut hovered: Local<bool>,
    mut events: EventWriter<HoverChanged>,
) {
    let Some(geometry) = geometry else { return; };
    let now = cards
        .iter()
        .any(|tf| card_contact(&pointer, tf, &geometry).is_some());
    if now != *hovered {
        *hovered = now;
        events.write(HoverChanged { hovered: now });
        trace!(target: LOG_TARGET, "hover -> {now}");
    }
}
