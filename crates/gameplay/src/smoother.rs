// Ribbon smoothing: the two interior rope joints are followed by lagged proxies whose catch-up
// rate grows with their distance from the simulated joint. The ribbon is resampled each frame.

use bevy::prelude::*;
use ly_config::SmoothingConfig;
use ly_core::{ChainLink, ChainPose, ConfigRes, RibbonPolyline};

use crate::curve::CatmullRom;
use crate::LOG_TARGET;

pub const MIN_CLAMPED_DISTANCE: f32 = 0.1;
pub const MAX_CLAMPED_DISTANCE: f32 = 1.0;

/// Lag distance clamped to [0.1, 1.0]; non-finite input counts as the far bound.
pub fn clamped_distance(lagged: Vec3, raw: Vec3) -> f32 {
    let d = lagged.distance(raw);
    if d.is_finite() {
        d.clamp(MIN_CLAMPED_DISTANCE, MAX_CLAMPED_DISTANCE)
    } else {
        MAX_CLAMPED_DISTANCE
    }
}

/// Interpolation factor for one frame. Clamped to [0, 1] so a long frame lands on the raw point
/// instead of overshooting it.
pub fn lag_factor(dt: f32, clamped: f32, min_speed: f32, max_speed: f32) -> f32 {
    let f = dt * (min_speed + clamped * (max_speed - min_speed));
    if f.is_finite() {
        f.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Damped proxy for one joint. Empty until its first update, which snaps to the raw position.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct LaggedPoint {
    value: Option<Vec3>,
}

impl LaggedPoint {
    pub fn value(&self) -> Option<Vec3> {
        self.value
    }

    /// Step toward `raw` and return the new lagged position. A non-finite `raw` is ignored.
    pub fn update(&mut self, raw: Vec3, dt: f32, min_speed: f32, max_speed: f32) -> Vec3 {
        if !raw.is_finite() {
            return self.value.unwrap_or(raw);
        }
        let next = match self.value {
            None => raw,
            Some(lagged) => {
                let cd = clamped_distance(lagged, raw);
                lagged.lerp(raw, lag_factor(dt, cd, min_speed, max_speed))
            }
        };
        self.value = Some(next);
        next
    }
}

#[derive(Resource, Debug, Clone, PartialEq)]
pub struct CurveSmoother {
    pub min_speed: f32,
    pub max_speed: f32,
    pub samples: usize,
    /// seg1, seg2.
    lagged: [LaggedPoint; 2],
}

impl Default for CurveSmoother {
    fn default() -> Self {
        Self::from_config(&SmoothingConfig::default())
    }
}

impl FromWorld for CurveSmoother {
    fn from_world(world: &mut World) -> Self {
        world
            .get_resource::<ConfigRes>()
            .map(|cfg| Self::from_config(&cfg.0.smoothing))
            .unwrap_or_default()
    }
}

impl CurveSmoother {
    pub fn new(min_speed: f32, max_speed: f32, samples: usize) -> Self {
        Self {
            min_speed,
            max_speed,
            samples,
            lagged: [LaggedPoint::default(); 2],
        }
    }

    pub fn from_config(cfg: &SmoothingConfig) -> Self {
        Self::new(cfg.min_speed, cfg.max_speed, cfg.samples)
    }

    /// Advance the lagged joints and return `[seg3 raw, seg2 lagged, seg1 lagged, anchor raw]`.
    pub fn control_points(&mut self, pose: &ChainPose, dt: f32) -> [Vec3; 4] {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        let (lo, hi) = (self.min_speed, self.max_speed);
        let seg1 = self.lagged[0].update(pose.translation(ChainLink::Segment(0)), dt, lo, hi);
        let seg2 = self.lagged[1].update(pose.translation(ChainLink::Segment(1)), dt, lo, hi);
        [
            pose.translation(ChainLink::TERMINAL_SEGMENT),
            seg2,
            seg1,
            pose.anchor(),
        ]
    }

    /// Full per-frame step: control points then a resampled polyline.
    pub fn polyline(&mut self, pose: &ChainPose, dt: f32) -> Option<Vec<Vec3>> {
        let ctrl = self.control_points(pose, dt);
        CatmullRom::chordal(&ctrl).map(|curve| curve.sample(self.samples))
    }
}

/// Post-physics: rebuild `RibbonPolyline` from the current chain pose.
pub fn update_ribbon(
    time: Res<Time>,
    pose: Res<ChainPose>,
    mut smoother: ResMut<CurveSmoother>,
    mut ribbon: ResMut<RibbonPolyline>,
) {
    if !pose.ready {
        return;
    }
    match smoother.polyline(&pose, time.delta_secs()) {
        Some(points) => ribbon.points = points,
        None => trace!(target: LOG_TARGET, "ribbon skipped: non-finite control points"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamped_distance_bounds() {
        let cases = [(0.0, 0.1), (0.05, 0.1), (1.0, 1.0), (50.0, 1.0)];
        for (d, expected) in cases {
            let got = clamped_distance(Vec3::ZERO, Vec3::new(d, 0.0, 0.0));
            assert!((got - expected).abs() < 1e-6, "distance {d} -> {got}");
        }
        assert_eq!(clamped_distance(Vec3::ZERO, Vec3::splat(f32::INFINITY)), 1.0);
    }

    #[test]
    fn first_update_snaps() {
        let mut p = LaggedPoint::default();
        assert_eq!(p.value(), None);
        let raw = Vec3::new(3.0, -2.0, 1.0);
        assert_eq!(p.update(raw, 1.0 / 60.0, 10.0, 50.0), raw);
        assert_eq!(p.value(), Some(raw));
    }

    #[test]
    fn converges_without_overshoot() {
        for start_dist in [0.02_f32, 0.5, 5.0] {
            let raw = Vec3::new(1.0, 2.0, 3.0);
            let mut p = LaggedPoint::default();
            p.update(raw + Vec3::new(start_dist, 0.0, 0.0), 0.016, 10.0, 50.0);
            let mut prev = start_dist;
            for _ in 0..400 {
                let v = p.update(raw, 0.016, 10.0, 50.0);
                let d = v.distance(raw);
                assert!(d <= prev + 1e-6, "distance increased: {prev} -> {d}");
                assert!(v.x >= raw.x - 1e-6, "overshot past raw");
                prev = d;
            }
            assert!(prev < 1e-3, "start {start_dist}: still {prev} away");
        }
    }

    #[test]
    fn huge_frame_lands_on_raw() {
        let mut p = LaggedPoint::default();
        p.update(Vec3::ZERO, 0.016, 10.0, 50.0);
        let raw = Vec3::new(10.0, 0.0, 0.0);
        let v = p.update(raw, 5.0, 10.0, 50.0);
        assert_eq!(v, raw);
    }

    #[test]
    fn non_finite_raw_keeps_state() {
        let mut p = LaggedPoint::default();
        p.update(Vec3::ONE, 0.016, 10.0, 50.0);
        let v = p.update(Vec3::splat(f32::NAN), 0.016, 10.0, 50.0);
        assert_eq!(v, Vec3::ONE);
        assert_eq!(p.value(), Some(Vec3::ONE));
    }

    #[test]
    fn control_point_order() {
        let mut pose = ChainPose {
            ready: true,
            ..Default::default()
        };
        pose.translations = [
            Vec3::new(0.0, 4.0, 0.0),
            Vec3::new(0.0, 3.0, 0.0),
            Vec3::new(0.0, 2.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(0.0, -1.0, 0.0),
        ];
        let mut s = CurveSmoother::default();
        let ctrl = s.control_points(&pose, 0.016);
        assert_eq!(
            ctrl,
            [
                pose.translation(ChainLink::TERMINAL_SEGMENT),
                pose.translation(ChainLink::Segment(1)),
                pose.translation(ChainLink::Segment(0)),
                pose.anchor()
            ]
        );
        let line = s.polyline(&pose, 0.016).expect("finite");
        assert_eq!(line.len(), 32);
        assert!(line[0].distance(pose.translation(ChainLink::TERMINAL_SEGMENT)) < 1e-4);
        assert!(line[31].distance(pose.anchor()) < 1e-4);
    }

    #[test]
    fn system_waits_for_pose() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.init_resource::<ChainPose>();
        app.init_resource::<RibbonPolyline>();
        app.init_resource::<CurveSmoother>();
        app.add_systems(Update, update_ribbon);
        app.update();
        assert!(app.world().resource::<RibbonPolyline>().points.is_empty());

        app.world_mut().resource_mut::<ChainPose>().ready = true;
        app.world_mut().resource_mut::<ChainPose>().translations[0] = Vec3::Y * 4.0;
        app.update();
        assert_eq!(app.world().resource::<RibbonPolyline>().points.len(), 32);
    }
}
