// Pure-data configuration crate (no Bevy dependency).
// Provides: data structures, layered loading, validation producing warnings (non-fatal), and tests.

use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    pub width: f32,
    pub height: f32,
    pub title: String,
    /// Automatically close the app after this many seconds. 0.0 (or omitted) = run indefinitely.
    #[serde(rename = "autoClose")]
    pub auto_close: f32,
}
impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
            title: "Lanyard".into(),
            auto_close: 0.0,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct GravityConfig {
    pub y: f32,
}
impl Default for GravityConfig {
    fn default() -> Self {
        Self { y: -9.81 }
    }
}

/// Rope chain layout: fixed anchor, three rope segments, terminal card.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct ChainConfig {
    /// World position of the fixed anchor body.
    pub anchor: [f32; 3],
    /// Spacing between consecutive bodies along +X at construction time.
    pub segment_spacing: f32,
    /// Maximum separation enforced by each rope joint.
    pub rope_length: f32,
    /// Spherical joint anchor in the card's local frame.
    pub card_joint_offset: [f32; 3],
    pub linear_damping: f32,
    pub angular_damping: f32,
    /// Ball collider radius given to the three free segments (mass carrier).
    pub segment_radius: f32,
    pub can_sleep: bool,
}
impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            anchor: [0.0, 4.0, 0.0],
            segment_spacing: 0.5,
            rope_length: 1.0,
            card_joint_offset: [0.0, 1.45, 0.0],
            linear_damping: 2.0,
            angular_damping: 2.0,
            segment_radius: 0.1,
            can_sleep: true,
        }
    }
}

/// Card body and the fluid container shell attached to its front face.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct CardConfig {
    pub half_extents: [f32; 3],
    pub wall_thickness: f32,
    /// Depth (local +Z) of the water layer in front of the card's main body.
    pub layer_depth: f32,
}
impl Default for CardConfig {
    fn default() -> Self {
        Self {
            half_extents: [0.8, 1.125, 0.01],
            wall_thickness: 0.02,
            layer_depth: 0.12,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct ParticleConfig {
    pub enabled: bool,
    pub count: usize,
    pub radius: f32,
    pub linear_damping: f32,
    pub angular_damping: f32,
    pub restitution: f32,
    pub friction: f32,
    pub ccd: bool,
}
impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            count: 150,
            radius: 0.03,
            linear_damping: 0.5,
            angular_damping: 0.5,
            restitution: 0.1,
            friction: 0.2,
            ccd: true,
        }
    }
}

/// Ribbon smoothing: adaptive catch-up rate bounds (units / second) and polyline resolution.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct SmoothingConfig {
    pub min_speed: f32,
    pub max_speed: f32,
    pub samples: usize,
}
impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            min_speed: 10.0,
            max_speed: 50.0,
            samples: 32,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct StabilizationConfig {
    pub enabled: bool,
    pub gain: f32,
}
impl Default for StabilizationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            gain: 0.25,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct DragConfig {
    pub enabled: bool,
    /// NDC depth at which the pointer is unprojected before being pushed out by the camera distance.
    pub reference_depth: f32,
}
impl Default for DragConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            reference_depth: 0.5,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    pub position: [f32; 3],
    pub fov_degrees: f32,
}
impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: [0.0, 0.0, 13.0],
            fov_degrees: 25.0,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct LanyardConfig {
    pub window: WindowConfig,
    pub gravity: GravityConfig,
    pub chain: ChainConfig,
    pub card: CardConfig,
    pub particles: ParticleConfig,
    pub smoothing: SmoothingConfig,
    pub stabilization: StabilizationConfig,
    pub drag: DragConfig,
    pub camera: CameraConfig,
    pub rapier_debug: bool,
}
impl Default for LanyardConfig {
    fn default() -> Self {
        Self {
            window: Default::default(),
            gravity: Default::default(),
            chain: Default::default(),
            card: Default::default(),
            particles: Default::default(),
            smoothing: Default::default(),
            stabilization: Default::default(),
            drag: Default::default(),
            camera: Default::default(),
            rapier_debug: false,
        }
    }
}

impl LanyardConfig {
    /// Load from a single RON file (errors contain human-readable context).
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, String> {
        let data = fs::read_to_string(&path).map_err(|e| format!("read config: {e}"))?;
        ron::from_str(&data).map_err(|e| format!("parse RON: {e}"))
    }

    /// Load file; on failure returns default config plus error string.
    pub fn load_or_default(path: impl AsRef<Path>) -> (Self, Option<String>) {
        match Self::load_from_file(&path) {
            Ok(cfg) => (cfg, None),
            Err(e) => (Self::default(), Some(e)),
        }
    }

    /// Load multiple layers; later overrides earlier (deep merge).
    /// Skips missing files; returns (config, used_paths, errors).
    pub fn load_layered<P, I>(paths: I) -> (Self, Vec<String>, Vec<String>)
    where
        P: AsRef<Path>,
        I: IntoIterator<Item = P>,
    {
        use ron::value::Value;
        let mut merged: Option<Value> = None;
        let mut used = Vec::new();
        let mut errors = Vec::new();

        fn merge_value(base: &mut Value, overlay: Value) {
            match (base, overlay) {
                (Value::Map(bm), Value::Map(om)) => {
                    for (k, v) in om.into_iter() {
                        match bm.get_mut(&k) {
                            Some(existing) => merge_value(existing, v),
                            None => {
                                bm.insert(k, v);
                            }
                        }
                    }
                }
                (b, o) => *b = o,
            }
        }

        for p in paths {
            let path_ref = p.as_ref();
            match fs::read_to_string(path_ref) {
                Ok(txt) => match ron::from_str::<Value>(&txt) {
                    Ok(val) => {
                        if let Some(cur) = &mut merged {
                            merge_value(cur, val);
                        } else {
                            merged = Some(val);
                        }
                        used.push(path_ref.as_os_str().to_string_lossy().to_string());
                    }
                    Err(e) => errors.push(format!("{}: parse error: {e}", path_ref.display())),
                },
                Err(e) => errors.push(format!("{}: read error: {e}", path_ref.display())),
            }
        }

        let Some(val) = merged else {
            return (LanyardConfig::default(), used, errors);
        };
        match val.into_rust::<LanyardConfig>() {
            Ok(cfg) => (cfg, used, errors),
            Err(e) => {
                errors.push(format!(
                    "failed to deserialize merged config; using defaults: {e}"
                ));
                (LanyardConfig::default(), used, errors)
            }
        }
    }

    /// Produce validation warnings (non-fatal) for suspicious values.
    ///
    /// Hard geometric failures (non-finite anchor, non-positive card extents) are rejected later
    /// by rig construction; here they only show up as warnings so every problem is listed at once.
    pub fn validate(&self) -> Vec<String> {
        let mut w = Vec::new();
        if self.window.width <= 0.0 || self.window.height <= 0.0 {
            w.push("window dimensions must be > 0".into());
        }
        if self.window.auto_close < 0.0 {
            w.push(format!(
                "window.autoClose {} negative -> treated as disabled (should be >= 0)",
                self.window.auto_close
            ));
        } else if self.window.auto_close > 0.0 && self.window.auto_close < 0.01 {
            w.push(format!(
                "window.autoClose {} very small; closes almost immediately",
                self.window.auto_close
            ));
        }
        if self.gravity.y.abs() < 1e-4 {
            w.push("gravity.y magnitude near zero; the card will float".into());
        }
        if self.gravity.y > 0.0 {
            w.push(format!(
                "gravity.y is positive ({}); typical configs use negative for downward",
                self.gravity.y
            ));
        }

        let ch = &self.chain;
        if ch.anchor.iter().any(|c| !c.is_finite()) {
            w.push(format!("chain.anchor {:?} is not finite", ch.anchor));
        }
        if ch.card_joint_offset.iter().any(|c| !c.is_finite()) {
            w.push(format!(
                "chain.card_joint_offset {:?} is not finite",
                ch.card_joint_offset
            ));
        }
        if ch.rope_length <= 0.0 {
            w.push("chain.rope_length must be > 0".into());
        }
        if ch.segment_spacing <= 0.0 {
            w.push("chain.segment_spacing must be > 0".into());
        } else if ch.segment_spacing > ch.rope_length {
            w.push(format!(
                "chain.segment_spacing {} exceeds rope_length {}; chain starts stretched",
                ch.segment_spacing, ch.rope_length
            ));
        }
        if ch.linear_damping < 0.0 || ch.angular_damping < 0.0 {
            w.push("chain damping negative".into());
        }
        if ch.segment_radius <= 0.0 {
            w.push("chain.segment_radius must be > 0 (segments need mass)".into());
        }

        let card = &self.card;
        if card.half_extents.iter().any(|h| !h.is_finite() || *h <= 0.0) {
            w.push(format!(
                "card.half_extents {:?} must be finite and > 0",
                card.half_extents
            ));
        }
        if card.wall_thickness <= 0.0 {
            w.push("card.wall_thickness must be > 0".into());
        }
        if card.layer_depth <= 0.0 {
            w.push("card.layer_depth must be > 0".into());
        }

        if self.particles.enabled {
            let p = &self.particles;
            if p.count == 0 {
                w.push("particles.count is 0; nothing will spawn".into());
            }
            if p.count > 5_000 {
                w.push(format!(
                    "particles.count {} very high; performance may suffer",
                    p.count
                ));
            }
            if p.radius <= 0.0 {
                w.push("particles.radius must be > 0".into());
            } else if p.radius * 2.0 >= card.layer_depth {
                w.push(format!(
                    "particles.radius {} too large for card.layer_depth {}; spawn volume degenerate",
                    p.radius, card.layer_depth
                ));
            }
            if !(0.0..=1.0).contains(&p.restitution) {
                w.push(format!(
                    "particles.restitution {} outside 0..1",
                    p.restitution
                ));
            }
        }

        let s = &self.smoothing;
        if s.min_speed <= 0.0 {
            w.push("smoothing.min_speed must be > 0".into());
        }
        if s.min_speed > s.max_speed {
            w.push(format!(
                "smoothing.min_speed ({}) greater than max_speed ({})",
                s.min_speed, s.max_speed
            ));
        }
        if s.samples < 2 {
            w.push(format!(
                "smoothing.samples {} < 2; ribbon cannot be drawn",
                s.samples
            ));
        }

        if self.stabilization.enabled && !(0.0..=5.0).contains(&self.stabilization.gain) {
            w.push(format!(
                "stabilization.gain {} outside 0..5; card may spin",
                self.stabilization.gain
            ));
        }
        if !(0.0..=1.0).contains(&self.drag.reference_depth) {
            w.push(format!(
                "drag.reference_depth {} outside NDC depth range 0..1",
                self.drag.reference_depth
            ));
        }
        if !(1.0..=170.0).contains(&self.camera.fov_degrees) {
            w.push(format!(
                "camera.fov_degrees {} outside 1..170",
                self.camera.fov_degrees
            ));
        }
        w
    }
}
