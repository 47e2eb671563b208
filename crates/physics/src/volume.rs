// Particle spawn volume and the one-shot spawner.
// Particles are placed in world space around the card's starting pose and never re-parented.

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;
use ly_config::ParticleConfig;
use ly_core::{Chain, ConfigRes, Particle, RngSeed, SpawnedParticles};
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::container::ContainerGeometry;
use crate::rig::ChainRigSpec;
use crate::LOG_TARGET;

/// Axis-aligned spawn region in the card's local frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl SpawnBox {
    /// Interior of the water layer minus walls and particle radius, restricted in Y to a shallow
    /// band above the floor. `None` when any axis collapses.
    pub fn from_geometry(geometry: &ContainerGeometry, radius: f32) -> Option<Self> {
        let Vec3 {
            x: hx,
            y: hy,
            z: hz,
        } = geometry.half_extents;
        let t = geometry.wall_thickness;
        let d = geometry.layer_depth;
        let band = (0.6 * d).min(0.4 * hy);

        let min = Vec3::new(-hx + t + radius, -hy + t + radius, hz + radius);
        let max = Vec3::new(hx - t - radius, -hy + t + band - radius, hz + d - radius);
        let valid = min.is_finite() && max.is_finite() && min.cmplt(max).all();
        valid.then_some(Self { min, max })
    }

    pub fn contains(&self, p: Vec3) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// `count` independent uniform points inside the box, shifted by `origin`.
    pub fn sample(&self, count: usize, origin: Vec3, rng: &mut impl Rng) -> Vec<Vec3> {
        (0..count)
            .map(|_| {
                origin
                    + Vec3::new(
                        rng.gen_range(self.min.x..self.max.x),
                        rng.gen_range(self.min.y..self.max.y),
                        rng.gen_range(self.min.z..self.max.z),
                    )
            })
            .collect()
    }
}

/// Spawn positions for the configured particle ensemble. Empty when the volume is degenerate.
pub fn plan_particles(
    geometry: &ContainerGeometry,
    cfg: &ParticleConfig,
    card_origin: Vec3,
    rng: &mut impl Rng,
) -> Vec<Vec3> {
    if !cfg.enabled || cfg.count == 0 {
        return Vec::new();
    }
    match SpawnBox::from_geometry(geometry, cfg.radius) {
        Some(spawn_box) => spawn_box.sample(cfg.count, card_origin, rng),
        None => {
            warn!(
                target: LOG_TARGET,
                "particle spawn volume degenerate (half extents {:?}, wall {}, depth {}, radius {}); spawning 0 particles",
                geometry.half_extents,
                geometry.wall_thickness,
                geometry.layer_depth,
                cfg.radius
            );
            Vec::new()
        }
    }
}

/// Startup, after the chain: spawn particles once and record their initial positions.
pub fn spawn_particles(
    mut commands: Commands,
    cfg: Res<ConfigRes>,
    seed: Option<Res<RngSeed>>,
    chain: Option<Res<Chain>>,
    geometry: Option<Res<ContainerGeometry>>,
    mut spawned: ResMut<SpawnedParticles>,
) {
    let (Some(_), Some(geometry)) = (chain, geometry) else {
        return;
    };
    let Ok(spec) = ChainRigSpec::from_config(&cfg.0.chain) else {
        return;
    };
    let p = &cfg.0.particles;
    let mut rng = StdRng::seed_from_u64(seed.map(|s| s.0).unwrap_or(0));
    let positions = plan_particles(&geometry, p, spec.card_position(), &mut rng);

    for (i, pos) in positions.iter().enumerate() {
        let mut particle = commands.spawn((
            Particle { id: i as u32 },
            RigidBody::Dynamic,
            Collider::ball(p.radius),
            Transform::from_translation(*pos),
            Velocity::zero(),
            Damping {
                linear_damping: p.linear_damping,
                angular_damping: p.angular_damping,
            },
            Restitution::coefficient(p.restitution),
            Friction::coefficient(p.friction),
        ));
        if p.ccd {
            particle.insert(Ccd::enabled());
        }
    }
    info!(target: LOG_TARGET, "spawned {} particles", positions.len());
    spawned.positions = positions;
}

#[cfg(test)]
mod tests {
    use super::*;
    use ly_config::CardConfig;

    fn geometry() -> ContainerGeometry {
        ContainerGeometry::from_config(&CardConfig::default()).expect("valid card")
    }

    #[test]
    fn samples_stay_inside_box() {
        let g = geometry();
        let spawn_box = SpawnBox::from_geometry(&g, 0.03).expect("default volume valid");
        let origin = Vec3::new(2.0, 4.0, -1.0);
        let mut rng = StdRng::seed_from_u64(7);
        let pts = spawn_box.sample(500, origin, &mut rng);
        assert_eq!(pts.len(), 500);
        let slack = SpawnBox {
            min: spawn_box.min - Vec3::splat(1e-5),
            max: spawn_box.max + Vec3::splat(1e-5),
        };
        for p in pts {
            assert!(slack.contains(p - origin), "{p:?} outside {spawn_box:?}");
        }
    }

    #[test]
    fn band_is_shallow() {
        let g = geometry();
        let spawn_box = SpawnBox::from_geometry(&g, 0.03).expect("valid");
        let band = (0.6 * g.layer_depth).min(0.4 * g.half_extents.y);
        assert!((spawn_box.size().y - (band - 0.06)).abs() < 1e-5);
        assert!(spawn_box.min.z > g.half_extents.z);
        assert!(spawn_box.max.z < g.half_extents.z + g.layer_depth);
    }

    #[test]
    fn degenerate_volume_yields_none_and_zero_particles() {
        let g = geometry();
        // Radius wider than the layer depth collapses Z.
        assert!(SpawnBox::from_geometry(&g, 0.5).is_none());
        let cfg = ParticleConfig {
            radius: 0.5,
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(1);
        assert!(plan_particles(&g, &cfg, Vec3::ZERO, &mut rng).is_empty());

        let thick = ContainerGeometry::new(Vec3::new(0.1, 1.0, 0.01), 0.2, 0.12).expect("valid");
        assert!(SpawnBox::from_geometry(&thick, 0.01).is_none());
    }

    #[test]
    fn same_seed_same_layout() {
        let g = geometry();
        let cfg = ParticleConfig::default();
        let a = plan_particles(&g, &cfg, Vec3::ONE, &mut StdRng::seed_from_u64(42));
        let b = plan_particles(&g, &cfg, Vec3::ONE, &mut StdRng::seed_from_u64(42));
        assert_eq!(a.len(), cfg.count);
        assert_eq!(a, b);
    }

    #[test]
    fn disabled_or_zero_count_spawns_nothing() {
        let g = geometry();
        let mut rng = StdRng::seed_from_u64(3);
        let off = ParticleConfig {
            enabled: false,
            ..Default::default()
        };
        assert!(plan_particles(&g, &off, Vec3::ZERO, &mut rng).is_empty());
        let none = ParticleConfig {
            count: 0,
            ..Default::default()
        };
        assert!(plan_particles(&g, &none, Vec3::ZERO, &mut rng).is_empty());
    }

    #[test]
    fn startup_spawns_configured_particles() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.insert_resource(ConfigRes::default());
        app.insert_resource(RngSeed(11));
        app.init_resource::<SpawnedParticles>();
        app.add_systems(
            Startup,
            (crate::rig::setup_chain, spawn_particles).chain(),
        );
        app.update();

        let expected = ParticleConfig::default().count;
        assert_eq!(app.world().resource::<SpawnedParticles>().positions.len(), expected);
        let world = app.world_mut();
        let mut q = world.query::<(&Particle, Option<&ChildOf>)>();
        assert_eq!(q.iter(world).count(), expected);
        assert!(q.iter(world).all(|(_, parent)| parent.is_none()), "particles stay top-level");
    }
}
