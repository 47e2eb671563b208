//! Open Catmull-Rom spline with chordal parameterization.
//!
//! Segment tangents are scaled by the distance between control points, which keeps the curve
//! from looping when neighbouring points are unevenly spaced (a taut rope next to a slack one).
//! The first and last segments use mirrored phantom points, so the curve passes through every
//! control point including both ends.

use bevy::prelude::*;

/// Below this spacing two control points are treated as coincident.
const MIN_SPACING: f32 = 1e-4;

#[derive(Debug, Clone, PartialEq)]
pub struct CatmullRom {
    points: Vec<Vec3>,
}

/// Cubic `c0 + c1 t + c2 t^2 + c3 t^3` for one segment.
#[derive(Debug, Clone, Copy)]
struct Cubic {
    c0: Vec3,
    c1: Vec3,
    c2: Vec3,
    c3: Vec3,
}

impl Cubic {
    fn hermite(x1: Vec3, x2: Vec3, t1: Vec3, t2: Vec3) -> Self {
        Self {
            c0: x1,
            c1: t1,
            c2: -3.0 * x1 + 3.0 * x2 - 2.0 * t1 - t2,
            c3: 2.0 * x1 - 2.0 * x2 + t1 + t2,
        }
    }

    /// Non-uniform Catmull-Rom through x1..x2 given parameter spans dt0, dt1, dt2.
    fn nonuniform(x0: Vec3, x1: Vec3, x2: Vec3, x3: Vec3, dt0: f32, dt1: f32, dt2: f32) -> Self {
        let t1 = ((x1 - x0) / dt0 - (x2 - x0) / (dt0 + dt1) + (x2 - x1) / dt1) * dt1;
        let t2 = ((x2 - x1) / dt1 - (x3 - x1) / (dt1 + dt2) + (x3 - x2) / dt2) * dt1;
        Self::hermite(x1, x2, t1, t2)
    }

    fn eval(&self, t: f32) -> Vec3 {
        let t2 = t * t;
        self.c0 + self.c1 * t + self.c2 * t2 + self.c3 * t2 * t
    }
}

impl CatmullRom {
    /// Needs at least two finite points.
    pub fn chordal(points: &[Vec3]) -> Option<Self> {
        if points.len() < 2 || points.iter().any(|p| !p.is_finite()) {
            return None;
        }
        Some(Self {
            points: points.to_vec(),
        })
    }

    pub fn control_points(&self) -> &[Vec3] {
        &self.points
    }

    /// Point at normalized parameter `t` in [0, 1] (clamped).
    pub fn point_at(&self, t: f32) -> Vec3 {
        let pts = &self.points;
        let l = pts.len();
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };

        let p = (l - 1) as f32 * t;
        let mut seg = p.floor() as usize;
        let mut weight = p - seg as f32;
        if seg >= l - 1 {
            seg = l - 2;
            weight = 1.0;
        }

        let p0 = if seg > 0 {
            pts[seg - 1]
        } else {
            2.0 * pts[0] - pts[1]
        };
        let p1 = pts[seg];
        let p2 = pts[seg + 1];
        let p3 = if seg + 2 < l {
            pts[seg + 2]
        } else {
            2.0 * pts[l - 1] - pts[l - 2]
        };

        let mut dt0 = p0.distance(p1);
        let mut dt1 = p1.distance(p2);
        let mut dt2 = p2.distance(p3);
        if dt1 < MIN_SPACING {
            dt1 = 1.0;
        }
        if dt0 < MIN_SPACING {
            dt0 = dt1;
        }
        if dt2 < MIN_SPACING {
            dt2 = dt1;
        }

        Cubic::nonuniform(p0, p1, p2, p3, dt0, dt1, dt2).eval(weight)
    }

    /// `count` points at evenly spaced parameters, first and last on the end control points.
    pub fn sample(&self, count: usize) -> Vec<Vec3> {
        match count {
            0 => Vec::new(),
            1 => vec![self.point_at(0.0)],
            n => (0..n)
                .map(|i| self.point_at(i as f32 / (n - 1) as f32))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vec3, b: Vec3) -> bool {
        a.distance(b) < 1e-4
    }

    #[test]
    fn passes_through_control_points() {
        let pts = [
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 2.0, 0.0),
            Vec3::new(3.0, 2.5, 1.0),
            Vec3::new(4.0, 0.0, 0.0),
        ];
        let curve = CatmullRom::chordal(&pts).expect("valid");
        for (i, p) in pts.iter().enumerate() {
            let t = i as f32 / 3.0;
            assert!(close(curve.point_at(t), *p), "t={t}: {:?} vs {p:?}", curve.point_at(t));
        }
    }

    #[test]
    fn sample_count_and_endpoints() {
        let pts = [Vec3::ZERO, Vec3::X, Vec3::new(2.0, 1.0, 0.0), Vec3::new(2.0, 3.0, 0.0)];
        let curve = CatmullRom::chordal(&pts).expect("valid");
        let out = curve.sample(32);
        assert_eq!(out.len(), 32);
        assert!(close(out[0], pts[0]));
        assert!(close(out[31], pts[3]));
        assert!(out.iter().all(|p| p.is_finite()));
    }

    #[test]
    fn collinear_points_stay_on_line() {
        let pts = [Vec3::ZERO, Vec3::Y, Vec3::Y * 3.0, Vec3::Y * 3.5];
        let curve = CatmullRom::chordal(&pts).expect("valid");
        let mut last_y = f32::NEG_INFINITY;
        for p in curve.sample(32) {
            assert!(p.x.abs() < 1e-5 && p.z.abs() < 1e-5);
            assert!(p.y >= last_y - 1e-5, "monotone along the line");
            last_y = p.y;
        }
    }

    #[test]
    fn coincident_points_are_finite() {
        let pts = [Vec3::ONE, Vec3::ONE, Vec3::ONE, Vec3::ZERO];
        let curve = CatmullRom::chordal(&pts).expect("valid");
        assert!(curve.sample(32).iter().all(|p| p.is_finite()));
    }

    #[test]
    fn rejects_too_few_or_non_finite() {
        assert!(CatmullRom::chordal(&[Vec3::ZERO]).is_none());
        assert!(CatmullRom::chordal(&[Vec3::ZERO, Vec3::splat(f32::NAN)]).is_none());
    }
}
