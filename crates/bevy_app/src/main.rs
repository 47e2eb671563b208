/*!
Lanyard binary: loads the layered RON config, refuses to start on an invalid rig, and composes
the core / physics / gameplay / rendering plugins.

* Config loading (native layered + wasm embed) using ly_config::LanyardConfig.
* Validation warnings logged once logging is up.
* Rapier debug render plugin always added; visibility follows `rapier_debug` and F1.
*/

use bevy::prelude::*;
use bevy_rapier3d::prelude::RapierDebugRenderPlugin;
use ly_core::{ConfigRes, CorePlugin, RngSeed};
use ly_gameplay::GameplayPlugin;
use ly_physics::{ChainRigSpec, ContainerGeometry, PhysicsPlugin, RigError};
use ly_rendering::RenderingPlugin;

#[cfg(feature = "debug")]
use ly_debug_tools::DebugToolsPlugin;

mod auto_close;
use auto_close::AutoClosePlugin;

// ---------------- Config Loading ----------------

/// Loaded config plus messages to log once the log plugin is installed.
struct LoadedConfig {
    cfg: ly_config::LanyardConfig,
    notes: Vec<String>,
    issues: Vec<String>,
}

#[cfg(target_arch = "wasm32")]
fn load_config() -> LoadedConfig {
    // Embedded base layer only; no local override in the browser.
    const RAW: &str = include_str!("../../../assets/config/lanyard.ron");
    match ron::from_str(RAW) {
        Ok(cfg) => LoadedConfig {
            cfg,
            notes: vec!["config: embedded lanyard.ron".into()],
            issues: Vec::new(),
        },
        Err(e) => LoadedConfig {
            cfg: Default::default(),
            notes: Vec::new(),
            issues: vec![format!("embedded config parse failure: {e}; using defaults")],
        },
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn load_config() -> LoadedConfig {
    let (cfg, used, issues) = ly_config::LanyardConfig::load_layered([
        std::path::Path::new("assets/config/lanyard.ron"),
        std::path::Path::new("assets/config/lanyard.local.ron"),
    ]);
    let notes = if used.is_empty() {
        vec!["No config layers found; using defaults".into()]
    } else {
        vec![format!("Config layers loaded: {used:?}")]
    };
    LoadedConfig { cfg, notes, issues }
}

/// Geometric checks that would otherwise only surface as an empty scene.
fn check_rig(cfg: &ly_config::LanyardConfig) -> Result<(), RigError> {
    ChainRigSpec::from_config(&cfg.chain)?;
    ContainerGeometry::from_config(&cfg.card)?;
    Ok(())
}

// ---------------- Main ----------------

fn main() -> AppExit {
    #[cfg(target_arch = "wasm32")]
    {
        // Better panic messages on wasm
        console_error_panic_hook::set_once();
    }

    let LoadedConfig { cfg, notes, issues } = load_config();
    let window_title = cfg.window.title.clone();

    let mut app = App::new();
    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: window_title,
            resolution: (cfg.window.width, cfg.window.height).into(),
            resizable: true,
            ..Default::default()
        }),
        ..Default::default()
    }));

    for n in notes {
        info!("{n}");
    }
    for e in issues {
        warn!("CONFIG LOAD ISSUE: {e}");
    }
    for w in cfg.validate() {
        warn!("CONFIG WARNING: {w}");
    }
    if let Err(e) = check_rig(&cfg) {
        error!("invalid lanyard rig: {e}");
        return AppExit::error();
    }
    info!(?cfg.window, "Window config");
    info!(
        particles = cfg.particles.count,
        min_speed = cfg.smoothing.min_speed,
        max_speed = cfg.smoothing.max_speed,
        stabilization_gain = cfg.stabilization.gain,
        drag = cfg.drag.enabled,
        "Runtime summary"
    );

    app.insert_resource(ConfigRes(cfg))
        .insert_resource(RngSeed(12345))
        .add_plugins(CorePlugin)
        .add_plugins(PhysicsPlugin)
        .add_plugins(RapierDebugRenderPlugin::default())
        .add_plugins(RenderingPlugin)
        .add_plugins(GameplayPlugin)
        .add_plugins(AutoClosePlugin);

    #[cfg(feature = "debug")]
    {
        app.add_plugins(DebugToolsPlugin);
    }

    app.run()
}
