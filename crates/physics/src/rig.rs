// Chain rig: fixed anchor, three rope segments and the card, joined anchor -> card.
// Construction is validated up front; nothing is spawned for an invalid rig.

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;
use ly_config::ChainConfig;
use ly_core::{vec3, Card, Chain, ChainLink, ConfigRes, CHAIN_BODY_COUNT, CHAIN_JOINT_COUNT};
use thiserror::Error;

use crate::container::{attach_shell, ContainerGeometry};
use crate::LOG_TARGET;

/// Geometric configuration errors caught before any body exists.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RigError {
    #[error("anchor position {0:?} is not finite")]
    NonFiniteAnchor(Vec3),
    #[error("{what} {value:?} is not finite")]
    NonFiniteOffset { what: &'static str, value: Vec3 },
    #[error("{what} must be finite and > 0 (got {value})")]
    NonPositiveLength { what: &'static str, value: f32 },
    #[error("degenerate card: {0}")]
    DegenerateCard(String),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum JointKind {
    /// One-sided max-distance constraint.
    Rope { max_distance: f32 },
    Spherical,
}

/// One constraint of the chain; `child` carries the joint component.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointSpec {
    pub kind: JointKind,
    pub parent: ChainLink,
    pub child: ChainLink,
    pub local_anchor_parent: Vec3,
    pub local_anchor_child: Vec3,
}

impl JointSpec {
    pub fn to_impulse_joint(&self, parent: Entity) -> ImpulseJoint {
        match self.kind {
            JointKind::Rope { max_distance } => ImpulseJoint::new(
                parent,
                RopeJointBuilder::new(max_distance)
                    .local_anchor1(self.local_anchor_parent)
                    .local_anchor2(self.local_anchor_child),
            ),
            JointKind::Spherical => ImpulseJoint::new(
                parent,
                SphericalJointBuilder::new()
                    .local_anchor1(self.local_anchor_parent)
                    .local_anchor2(self.local_anchor_child),
            ),
        }
    }
}

/// Validated chain layout.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainRigSpec {
    pub anchor: Vec3,
    pub spacing: f32,
    pub rope_length: f32,
    pub card_joint_offset: Vec3,
    pub linear_damping: f32,
    pub angular_damping: f32,
    pub segment_radius: f32,
    pub can_sleep: bool,
}

impl ChainRigSpec {
    pub fn from_config(cfg: &ChainConfig) -> Result<Self, RigError> {
        let spec = Self {
            anchor: vec3(cfg.anchor),
            spacing: cfg.segment_spacing,
            rope_length: cfg.rope_length,
            card_joint_offset: vec3(cfg.card_joint_offset),
            linear_damping: cfg.linear_damping,
            angular_damping: cfg.angular_damping,
            segment_radius: cfg.segment_radius,
            can_sleep: cfg.can_sleep,
        };
        spec.validate()?;
        Ok(spec)
    }

    /// Same layout as the defaults, hung from `anchor`.
    pub fn with_anchor(anchor: Vec3) -> Result<Self, RigError> {
        let cfg = ChainConfig {
            anchor: anchor.to_array(),
            ..Default::default()
        };
        Self::from_config(&cfg)
    }

    pub fn validate(&self) -> Result<(), RigError> {
        if !self.anchor.is_finite() {
            return Err(RigError::NonFiniteAnchor(self.anchor));
        }
        if !self.card_joint_offset.is_finite() {
            return Err(RigError::NonFiniteOffset {
                what: "card joint offset",
                value: self.card_joint_offset,
            });
        }
        for (what, value) in [
            ("segment spacing", self.spacing),
            ("rope length", self.rope_length),
            ("segment radius", self.segment_radius),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(RigError::NonPositiveLength { what, value });
            }
        }
        Ok(())
    }

    /// Initial world positions, anchor first, spread along +X.
    pub fn body_positions(&self) -> [Vec3; CHAIN_BODY_COUNT] {
        std::array::from_fn(|i| self.anchor + Vec3::X * self.spacing * i as f32)
    }

    /// Where the card starts; particles are offset by this.
    pub fn card_position(&self) -> Vec3 {
        self.body_positions()[ChainLink::Card.index()]
    }

    /// Three rope joints then the spherical card joint, in body order.
    pub fn joints(&self) -> [JointSpec; CHAIN_JOINT_COUNT] {
        std::array::from_fn(|i| {
            let parent = ChainLink::from_index(i).unwrap_or(ChainLink::Anchor);
            let child = ChainLink::from_index(i + 1).unwrap_or(ChainLink::Card);
            if child == ChainLink::Card {
                JointSpec {
                    kind: JointKind::Spherical,
                    parent,
                    child,
                    local_anchor_parent: Vec3::ZERO,
                    local_anchor_child: self.card_joint_offset,
                }
            } else {
                JointSpec {
                    kind: JointKind::Rope {
                        max_distance: self.rope_length,
                    },
                    parent,
                    child,
                    local_anchor_parent: Vec3::ZERO,
                    local_anchor_child: Vec3::ZERO,
                }
            }
        })
    }

    fn sleeping(&self) -> Sleeping {
        if self.can_sleep {
            Sleeping::default()
        } else {
            Sleeping::disabled()
        }
    }
}

/// Spawn the five bodies and four joints. Returns the body handles in chain order.
pub fn spawn_chain(
    commands: &mut Commands,
    spec: &ChainRigSpec,
    geometry: &ContainerGeometry,
) -> Chain {
    let positions = spec.body_positions();
    let damping = Damping {
        linear_damping: spec.linear_damping,
        angular_damping: spec.angular_damping,
    };

    let bodies: [Entity; CHAIN_BODY_COUNT] = std::array::from_fn(|i| {
        let link = ChainLink::from_index(i).unwrap_or(ChainLink::Anchor);
        let mut body = commands.spawn((
            link,
            Transform::from_translation(positions[i]),
            damping,
            spec.sleeping(),
            Velocity::zero(),
        ));
        match link {
            ChainLink::Anchor => {
                body.insert((Name::new("Anchor"), RigidBody::Fixed));
            }
            ChainLink::Segment(n) => {
                body.insert((
                    Name::new(format!("Segment{}", n + 1)),
                    RigidBody::Dynamic,
                    Collider::ball(spec.segment_radius),
                ));
            }
            ChainLink::Card => {
                let h = geometry.half_extents;
                body.insert((
                    Name::new("Card"),
                    Card,
                    RigidBody::Dynamic,
                    Collider::cuboid(h.x, h.y, h.z),
                ));
            }
        }
        body.id()
    });

    for joint in spec.joints() {
        let parent = bodies[joint.parent.index()];
        let child = bodies[joint.child.index()];
        commands.entity(child).insert(joint.to_impulse_joint(parent));
    }
    attach_shell(commands, bodies[ChainLink::Card.index()], geometry);

    Chain { bodies }
}

/// Startup: validate the configured rig and spawn it.
pub fn setup_chain(mut commands: Commands, cfg: Res<ConfigRes>) {
    let spec = match ChainRigSpec::from_config(&cfg.0.chain) {
        Ok(spec) => spec,
        Err(e) => {
            error!(target: LOG_TARGET, "chain rig rejected: {e}");
            return;
        }
    };
    let geometry = match ContainerGeometry::from_config(&cfg.0.card) {
        Ok(g) => g,
        Err(e) => {
            error!(target: LOG_TARGET, "card geometry rejected: {e}");
            return;
        }
    };
    let chain = spawn_chain(&mut commands, &spec, &geometry);
    info!(
        target: LOG_TARGET,
        "chain rig built: {} bodies, {} joints, anchor {:?}",
        chain.bodies.len(),
        spec.joints().len(),
        spec.anchor
    );
    commands.insert_resource(geometry);
    commands.insert_resource(chain);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joints_follow_body_order_for_any_anchor() {
        for anchor in [Vec3::ZERO, Vec3::new(-3.0, 4.0, 2.5), Vec3::splat(1e4)] {
            let spec = ChainRigSpec::with_anchor(anchor).expect("finite anchor");
            let joints = spec.joints();
            assert_eq!(joints.len(), CHAIN_JOINT_COUNT);
            for (i, j) in joints.iter().enumerate() {
                assert_eq!(j.parent.index(), i);
                assert_eq!(j.child.index(), i + 1);
            }
            let ropes = joints
                .iter()
                .filter(|j| matches!(j.kind, JointKind::Rope { .. }))
                .count();
            assert_eq!(ropes, 3);
            assert_eq!(joints[3].kind, JointKind::Spherical);
            assert_eq!(joints[3].local_anchor_parent, Vec3::ZERO);
            assert_eq!(joints[3].local_anchor_child, Vec3::new(0.0, 1.45, 0.0));
        }
    }

    #[test]
    fn bodies_spaced_along_x() {
        let spec = ChainRigSpec::with_anchor(Vec3::new(1.0, 2.0, 3.0)).expect("valid");
        let offsets: Vec<f32> = spec
            .body_positions()
            .iter()
            .map(|p| p.x - spec.anchor.x)
            .collect();
        assert_eq!(offsets, vec![0.0, 0.5, 1.0, 1.5, 2.0]);
        assert_eq!(spec.card_position(), Vec3::new(3.0, 2.0, 3.0));
        for j in &spec.joints()[..3] {
            assert_eq!(j.kind, JointKind::Rope { max_distance: 1.0 });
        }
    }

    #[test]
    fn non_finite_anchor_rejected() {
        let err = ChainRigSpec::with_anchor(Vec3::new(f32::NAN, 0.0, 0.0)).unwrap_err();
        assert!(matches!(err, RigError::NonFiniteAnchor(_)));
        let err = ChainRigSpec::with_anchor(Vec3::new(0.0, f32::INFINITY, 0.0)).unwrap_err();
        assert!(matches!(err, RigError::NonFiniteAnchor(_)));
    }

    #[test]
    fn bad_lengths_rejected() {
        let cfg = ChainConfig {
            rope_length: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            ChainRigSpec::from_config(&cfg),
            Err(RigError::NonPositiveLength { what: "rope length", .. })
        ));
        let cfg = ChainConfig {
            card_joint_offset: [0.0, f32::NAN, 0.0],
            ..Default::default()
        };
        assert!(matches!(
            ChainRigSpec::from_config(&cfg),
            Err(RigError::NonFiniteOffset { .. })
        ));
    }

    #[test]
    fn startup_spawns_five_bodies_four_joints() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.insert_resource(ConfigRes::default());
        app.add_systems(Startup, setup_chain);
        app.update();

        let chain = *app.world().resource::<Chain>();
        let world = app.world_mut();
        let mut links = world.query::<&ChainLink>();
        assert_eq!(links.iter(world).count(), CHAIN_BODY_COUNT);
        let mut joints = world.query::<(Entity, &ImpulseJoint)>();
        let mut pairs: Vec<(usize, usize)> = joints
            .iter(world)
            .map(|(child, j)| {
                let ci = chain.bodies.iter().position(|b| *b == child).expect("child in chain");
                let pi = chain.bodies.iter().position(|b| *b == j.parent).expect("parent in chain");
                (pi, ci)
            })
            .collect();
        pairs.sort();
        assert_eq!(pairs, vec![(0, 1), (1, 2), (2, 3), (3, 4)]);
        let mut shells = world.query::<&ly_core::ContainerShell>();
        assert_eq!(shells.iter(world).count(), 5);
        assert!(world.get_resource::<ContainerGeometry>().is_some());
    }

    #[test]
    fn invalid_rig_spawns_nothing() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        let mut cfg = ly_config::LanyardConfig::default();
        cfg.chain.anchor = [f32::NAN, 0.0, 0.0];
        app.insert_resource(ConfigRes(cfg));
        app.add_systems(Startup, setup_chain);
        app.update();
        assert!(app.world().get_resource::<Chain>().is_none());
        let world = app.world_mut();
        let mut links = world.query::<&ChainLink>();
        assert_eq!(links.iter(world).count(), 0);
    }
}
