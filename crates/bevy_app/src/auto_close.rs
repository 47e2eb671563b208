// Exits the app after `window.autoClose` seconds (0.0 = run until closed). Used by CI smoke runs.

use bevy::prelude::*;
use ly_core::ConfigRes;

#[derive(Resource, Deref, DerefMut)]
struct AutoCloseTimer(Timer);

pub struct AutoClosePlugin;

impl Plugin for AutoClosePlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, setup_autoclose)
            .add_systems(Update, check_autoclose);
    }
}

fn setup_autoclose(mut commands: Commands, cfg: Res<ConfigRes>) {
    let secs = cfg.0.window.auto_close;
    if secs > 0.0 {
        info!(seconds = secs, "AutoClose: will exit after {secs} seconds");
        commands.insert_resource(AutoCloseTimer(Timer::from_seconds(secs, TimerMode::Once)));
    }
}

fn check_autoclose(
    time: Res<Time>,
    mut timer: Option<ResMut<AutoCloseTimer>>,
    mut ev_exit: EventWriter<AppExit>,
) {
    if let Some(t) = timer.as_mut() {
        t.tick(time.delta());
        if t.just_finished() {
            info!("AutoClose: timer finished, requesting app exit");
            ev_exit.write(AppExit::Success);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::time::TimeUpdateStrategy;
    use std::time::Duration;

    fn app_with_auto_close(secs: f32) -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(100)));
        let mut cfg = ly_config::LanyardConfig::default();
        cfg.window.auto_close = secs;
        app.insert_resource(ConfigRes(cfg));
        app.add_plugins(AutoClosePlugin);
        app
    }

    fn exit_requested(app: &App) -> bool {
        app.world()
            .resource::<Events<AppExit>>()
            .iter_current_update_events()
            .next()
            .is_some()
    }

    #[test]
    fn exits_after_configured_time() {
        let mut app = app_with_auto_close(0.25);
        let mut frames = 0;
        while !exit_requested(&app) {
            app.update();
            frames += 1;
            assert!(frames < 20, "auto close never fired");
        }
        assert!(frames >= 3);
    }

    #[test]
    fn zero_disables() {
        let mut app = app_with_auto_close(0.0);
        for _ in 0..10 {
            app.update();
            assert!(!exit_requested(&app));
        }
    }
}
