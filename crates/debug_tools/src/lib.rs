// Debug tools crate: periodic SIM stats line.
// Counts are gathered every frame into `DebugStats`; the log line is rate limited by `DebugState`.

use bevy::prelude::*;
use bevy_rapier3d::prelude::Sleeping;
use ly_core::{DragState, Particle, RibbonPolyline};

pub const LOG_TARGET: &str = "ly_debug";

#[derive(Resource, Debug, Clone)]
pub struct DebugState {
    pub frame_counter: u64,
    pub time_accum: f32,
    /// Seconds between SIM lines.
    pub log_interval: f32,
}

impl Default for DebugState {
    fn default() -> Self {
        Self {
            frame_counter: 0,
            time_accum: 0.0,
            log_interval: 2.0,
        }
    }
}

#[derive(Resource, Debug, Default, Clone, PartialEq)]
pub struct DebugStats {
    pub particles: usize,
    pub particles_awake: usize,
    pub ribbon_points: usize,
    pub dragging: bool,
}

/// Particles without a `Sleeping` component count as awake.
pub fn collect_stats(
    particles: Query<Option<&Sleeping>, With<Particle>>,
    ribbon: Res<RibbonPolyline>,
    drag: Res<DragState>,
    mut stats: ResMut<DebugStats>,
) {
    let mut total = 0;
    let mut awake = 0;
    for sleeping in &particles {
        total += 1;
        if !sleeping.is_some_and(|s| s.sleeping) {
            awake += 1;
        }
    }
    stats.particles = total;
    stats.particles_awake = awake;
    stats.ribbon_points = ribbon.points.len();
    stats.dragging = drag.is_dragging();
}

pub fn debug_logging_system(time: Res<Time>, mut state: ResMut<DebugState>, stats: Res<DebugStats>) {
    state.frame_counter += 1;
    state.time_accum += time.delta_secs();
    if state.time_accum >= state.log_interval {
        state.time_accum = 0.0;
        info!(
            target: LOG_TARGET,
            "SIM frame={} t={:.3}s dragging={} particles={} awake={} ribbon_pts={}",
            state.frame_counter,
            time.elapsed_secs(),
            stats.dragging,
            stats.particles,
            stats.particles_awake,
            stats.ribbon_points
        );
    }
}

pub struct DebugToolsPlugin;

impl Plugin for DebugToolsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<DebugState>()
            .init_resource::<DebugStats>()
            .add_systems(Last, (collect_stats, debug_logging_system).chain());
    }
}
