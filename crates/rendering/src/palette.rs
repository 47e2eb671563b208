//! Colors for the gizmo presentation. One place so the card states stay distinguishable.

use bevy::prelude::*;

pub struct Palette;
impl Palette {
    pub const BG: Color = Color::srgb(0.02, 0.02, 0.05);
    pub const RIBBON: Color = Color::srgb(0.95, 0.95, 1.0);
    pub const CARD: Color = Color::srgb(0.20, 0.55, 0.90);
    pub const CARD_HOVER: Color = Color::srgb(0.3, 0.6, 1.0);
    pub const CARD_DRAG: Color = Color::srgb(1.0, 1.0, 0.15);
    pub const CONTAINER: Color = Color::srgba(0.6, 0.8, 1.0, 0.5);
    pub const PARTICLE: Color = Color::srgb(0.20, 0.80, 0.45);
    pub const ANCHOR: Color = Color::srgb(1.0, 0.20, 0.25);
}

/// Card outline color for the current interaction state (dragging wins over hover).
#[inline]
pub fn card_color(hovered: bool, dragging: bool) -> Color {
    match (hovered, dragging) {
        (_, true) => Palette::CARD_DRAG,
        (true, false) => Palette::CARD_HOVER,
        (false, false) => Palette::CARD,
    }
}
