use bevy::prelude::*;
use bevy_rapier3d::prelude::RapierConfiguration;

use crate::LOG_TARGET;

/// P pauses / resumes the physics pipeline; Escape quits on native targets.
pub fn handle_keys(
    keys: Res<ButtonInput<KeyCode>>,
    mut rapier: Query<&mut RapierConfiguration>,
    mut exit: EventWriter<AppExit>,
) {
    if keys.just_pressed(KeyCode::KeyP) {
        for mut cfg in &mut rapier {
            cfg.physics_pipeline_active = !cfg.physics_pipeline_active;
            info!(
                target: LOG_TARGET,
                "physics {}",
                if cfg.physics_pipeline_active { "resumed" } else { "paused" }
            );
        }
    }
    // Browsers own the page lifecycle.
    if keys.just_pressed(KeyCode::Escape) && cfg!(not(target_arch = "wasm32")) {
        exit.write(AppExit::Success);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn p_toggles_pipeline() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.insert_resource(ButtonInput::<KeyCode>::default());
        app.add_systems(Update, handle_keys);
        let ctx = app.world_mut().spawn(RapierConfiguration::new(1.0)).id();
        app.world_mut()
            .resource_mut::<ButtonInput<KeyCode>>()
            .press(KeyCode::KeyP);
        app.update();
        assert!(
            !app.world()
                .get::<RapierConfiguration>(ctx)
                .expect("config")
                .physics_pipeline_active
        );
    }

    #[test]
    fn escape_requests_exit() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.insert_resource(ButtonInput::<KeyCode>::default());
        app.add_systems(Update, handle_keys);
        app.world_mut()
            .resource_mut::<ButtonInput<KeyCode>>()
            .press(KeyCode::Escape);
        app.update();
        let exits = app
            .world()
            .resource::<Events<AppExit>>()
            .iter_current_update_events()
            .count();
        assert_eq!(exits, 1);
    }
}
