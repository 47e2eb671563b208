// Core crate: foundational ECS vocabulary shared by every lanyard crate.
// Components, resources, presentation events, and system set labels. No simulation logic lives here.

use bevy::prelude::*;

/// Number of rigid bodies in the chain: anchor, three rope segments, card.
pub const CHAIN_BODY_COUNT: usize = 5;
/// Rope joints between consecutive bodies up to the last segment, plus one spherical joint to the card.
pub const CHAIN_JOINT_COUNT: usize = 4;

/// Position of a body inside the chain (anchor -> card order).
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChainLink {
    Anchor,
    Segment(u8),
    Card,
}

impl ChainLink {
    /// The last rope segment; it carries the spherical joint to the card.
    pub const TERMINAL_SEGMENT: ChainLink = ChainLink::Segment(2);

    /// Index in anchor -> card order.
    pub fn index(self) -> usize {
        match self {
            ChainLink::Anchor => 0,
            ChainLink::Segment(i) => {
                debug_assert!(i < 3, "chain has three rope segments, got Segment({i})");
                1 + i as usize
            }
            ChainLink::Card => CHAIN_BODY_COUNT - 1,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(ChainLink::Anchor),
            1..=3 => Some(ChainLink::Segment((index - 1) as u8)),
            4 => Some(ChainLink::Card),
            _ => None,
        }
    }
}

/// Marker for the terminal card body.
#[derive(Component, Debug, Default, Clone, Copy)]
pub struct Card;

/// Marker for static collider children that form the card's fluid container.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerShell {
    Floor,
    Ceiling,
    LeftWall,
    RightWall,
    FrontCover,
}

/// A loose particle trapped in the container. Owned by the physics engine after spawn.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Particle {
    pub id: u32,
}

/// Chain body handles in anchor -> seg1 -> seg2 -> seg3 -> card order.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chain {
    pub bodies: [Entity; CHAIN_BODY_COUNT],
}

impl Chain {
    pub fn card(&self) -> Entity {
        self.bodies[ChainLink::Card.index()]
    }
}

/// Pointer drag state. `None` = not dragging; `Some(offset)` = grab point minus card origin at drag start.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq)]
pub struct DragState {
    offset: Option<Vec3>,
}

impl DragState {
    /// Capture the grab offset for a new gesture and return it.
    pub fn begin(&mut self, contact_point: Vec3, card_translation: Vec3) -> Vec3 {
        let offset = contact_point - card_translation;
        self.offset = Some(offset);
        offset
    }

    /// Clear the gesture; returns true if a drag was active.
    pub fn end(&mut self) -> bool {
        self.offset.take().is_some()
    }

    pub fn offset(&self) -> Option<Vec3> {
        self.offset
    }

    pub fn is_dragging(&self) -> bool {
        self.offset.is_some()
    }
}

/// World transforms of the chain bodies, read after each physics writeback.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct ChainPose {
    /// Translations in anchor -> card order.
    pub translations: [Vec3; CHAIN_BODY_COUNT],
    pub card_rotation: Quat,
    /// False until the first post-physics read.
    pub ready: bool,
}

impl Default for ChainPose {
    fn default() -> Self {
        Self {
            translations: [Vec3::ZERO; CHAIN_BODY_COUNT],
            card_rotation: Quat::IDENTITY,
            ready: false,
        }
    }
}

impl ChainPose {
    pub fn anchor(&self) -> Vec3 {
        self.translations[ChainLink::Anchor.index()]
    }
    pub fn translation(&self, link: ChainLink) -> Vec3 {
        self.translations[link.index()]
    }
    pub fn card(&self) -> Vec3 {
        self.translations[ChainLink::Card.index()]
    }
}

/// Smoothed ribbon polyline, regenerated every frame (anchor end last).
#[derive(Resource, Debug, Default, Clone, PartialEq)]
pub struct RibbonPolyline {
    pub points: Vec<Vec3>,
}

/// Initial world positions of every spawned particle. Written once at startup.
#[derive(Resource, Debug, Default, Clone, PartialEq)]
pub struct SpawnedParticles {
    pub positions: Vec<Vec3>,
}

/// Wrapper Bevy resource for the pure-data config (keeps ly_config free of bevy dependency).
#[derive(Resource, Debug, Clone, Default)]
pub struct ConfigRes(pub ly_config::LanyardConfig);

/// Deterministic RNG seed resource (set once at startup / tests for reproducible spawning).
#[derive(Resource, Debug, Copy, Clone, Default)]
pub struct RngSeed(pub u64);

/// Emitted when a drag gesture starts or ends. Consumed by presentation layers.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragChanged {
    pub dragging: bool,
}

/// Emitted when the pointer enters or leaves the card.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct HoverChanged {
    pub hovered: bool,
}

/// Convert a config triple into a Vec3.
pub fn vec3(v: [f32; 3]) -> Vec3 {
    Vec3::from_array(v)
}

#[derive(SystemSet, Debug, Hash, Eq, PartialEq, Clone)]
pub struct PrePhysicsSet; // kinematic targets written before the physics step
#[derive(SystemSet, Debug, Hash, Eq, PartialEq, Clone)]
pub struct PostPhysicsAdjustSet; // reads + lightweight corrections after the physics writeback
#[derive(SystemSet, Debug, Hash, Eq, PartialEq, Clone)]
pub struct RibbonSet; // publishes RibbonPolyline (inside PostPhysicsAdjustSet)

pub struct CorePlugin;

impl Plugin for CorePlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<DragChanged>()
            .add_event::<HoverChanged>()
            .init_resource::<DragState>()
            .init_resource::<ChainPose>()
            .init_resource::<RibbonPolyline>()
            .init_resource::<SpawnedParticles>()
            .configure_sets(PostUpdate, RibbonSet.in_set(PostPhysicsAdjustSet));
    }
}
