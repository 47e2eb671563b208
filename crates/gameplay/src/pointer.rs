// Pointer sampling: one place that reads window, touch and camera state each frame.
// Drag and hover logic only look at `PointerSample`, so they run without a window in tests.

use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use ly_core::ConfigRes;

/// World-space ray under the pointer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerRay {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl PointerRay {
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

#[derive(Resource, Debug, Default, Clone, Copy, PartialEq)]
pub struct PointerSample {
    pub ray: Option<PointerRay>,
    /// Unprojected pointer pushed out to the camera's distance from the origin.
    pub world: Option<Vec3>,
    pub just_pressed: bool,
    pub just_released: bool,
}

/// Window position (top-left origin) to NDC at `depth`. `None` for an empty viewport.
pub fn viewport_to_ndc(screen: Vec2, viewport: Rect, depth: f32) -> Option<Vec3> {
    let size = viewport.size();
    if size.x <= 0.0 || size.y <= 0.0 {
        return None;
    }
    let p = screen - viewport.min;
    Some(Vec3::new(
        p.x / size.x * 2.0 - 1.0,
        1.0 - p.y / size.y * 2.0,
        depth,
    ))
}

/// Extend the unprojected point along the camera-to-point direction by the camera's distance
/// from the world origin. Degenerate input returns the point unchanged.
pub fn project_pointer(unprojected: Vec3, camera_position: Vec3) -> Vec3 {
    let dir = (unprojected - camera_position).normalize_or_zero();
    let out = unprojected + dir * camera_position.length();
    if out.is_finite() {
        out
    } else {
        unprojected
    }
}

/// Distance along `ray` to an oriented box (given in `frame`'s local space by center and half
/// extents). Origin inside the box yields 0.
pub fn ray_box_hit(ray: &PointerRay, frame: &Transform, center: Vec3, half: Vec3) -> Option<f32> {
    let inv = frame.rotation.inverse();
    let o = inv * (ray.origin - frame.translation) - center;
    let d = inv * ray.direction;
    let mut t_min = f32::NEG_INFINITY;
    let mut t_max = f32::INFINITY;
    for axis in 0..3 {
        let (oa, da, ha) = (o[axis], d[axis], half[axis]);
        if da.abs() < 1e-8 {
            if oa.abs() > ha {
                return None;
            }
            continue;
        }
        let a = (-ha - oa) / da;
        let b = (ha - oa) / da;
        t_min = t_min.max(a.min(b));
        t_max = t_max.min(a.max(b));
    }
    if !t_min.is_finite() && !t_max.is_finite() {
        // Zero direction.
        return None;
    }
    if t_max < t_min.max(0.0) {
        return None;
    }
    Some(t_min.max(0.0))
}

fn primary_screen_pos(window: &Window, touches: &Touches) -> Option<Vec2> {
    if let Some(touch) = touches.iter().next() {
        return Some(touch.position());
    }
    window.cursor_position()
}

/// Refresh `PointerSample` from the primary window, first touch and first active camera.
pub fn sample_pointer(
    buttons: Res<ButtonInput<MouseButton>>,
    touches: Res<Touches>,
    windows: Query<&Window, With<PrimaryWindow>>,
    cameras: Query<(&Camera, &GlobalTransform)>,
    cfg: Res<ConfigRes>,
    mut sample: ResMut<PointerSample>,
) {
    sample.just_pressed =
        buttons.just_pressed(MouseButton::Left) || touches.any_just_pressed();
    sample.just_released =
        buttons.just_released(MouseButton::Left) || touches.any_just_released();
    sample.ray = None;
    sample.world = None;

    let Ok(window) = windows.single() else { return; };
    let Some(screen) = primary_screen_pos(window, &touches) else { return; };
    let Some((camera, cam_tf)) = cameras.iter().find(|(c, _)| c.is_active) else { return; };

    if let Ok(ray) = camera.viewport_to_world(cam_tf, screen) {
        sample.ray = Some(PointerRay {
            origin: ray.origin,
            direction: *ray.direction,
        });
    }
    let world = camera
        .logical_viewport_rect()
        .and_then(|rect| viewport_to_ndc(screen, rect, cfg.0.drag.reference_depth))
        .and_then(|ndc| camera.ndc_to_world(cam_tf, ndc))
        .filter(|p| p.is_finite())
        .map(|p| project_pointer(p, cam_tf.translation()));
    sample.world = world;
}
