mod common;

use bevy::prelude::*;
use horde_survivor::common::messages::{DamagePlayer, GainExperience};
use horde_survivor::common::state::{GameState, RunPhase};
use horde_survivor::common::tunables::Tunables;
use horde_survivor::plugins::player::{Loadout, PlayerStats};
use horde_survivor::plugins::progression::{Experience, PendingLevelUps};
use horde_survivor::plugins::run::{RunClock, Score};
use horde_survivor::plugins::settings::Settings;
use horde_survivor::plugins::ui::overlays::OverlayButton;
use horde_survivor::plugins::ui::upgrade_menu::UpgradeButton;
use horde_survivor::plugins::upgrades::{ChooseUpgrade, UpgradeChoices};

fn total_levels(loadout: &Loadout) -> u32 {
    loadout.weapons.iter().map(|w| w.level).sum::<u32>() + loadout.passives.iter().map(|p| p.level).sum::<u32>()
}

fn count<C: Component>(app: &mut App) -> usize {
    app.world_mut().query::<&C>().iter(app.world()).count()
}

#[test]
fn escape_pauses_and_resumes() {
    let mut app = common::app_headless();
    common::start_run(&mut app);

    app.insert_resource(ButtonInput::<KeyCode>::default());
    app.world_mut()
        .resource_mut::<ButtonInput<KeyCode>>()
        .press(KeyCode::Escape);
    app.update();
    app.world_mut().resource_mut::<ButtonInput<KeyCode>>().clear();
    app.update();

    assert_eq!(common::run_phase(&app), Some(RunPhase::Paused));
    assert!(app.world().resource::<Time<Virtual>>().is_paused());
    assert!(count::<OverlayButton>(&mut app) >= 3);

    app.world_mut()
        .resource_mut::<ButtonInput<KeyCode>>()
        .release(KeyCode::Escape);
    app.world_mut()
        .resource_mut::<ButtonInput<KeyCode>>()
        .press(KeyCode::Escape);
    app.update();
    app.world_mut().resource_mut::<ButtonInput<KeyCode>>().clear();
    app.update();

    assert_eq!(common::run_phase(&app), Some(RunPhase::Running));
    assert!(!app.world().resource::<Time<Virtual>>().is_paused());
    assert_eq!(count::<OverlayButton>(&mut app), 0);
}

#[test]
fn lethal_damage_ends_the_run() {
    let mut app = common::app_headless();
    common::start_run(&mut app);
    app.world_mut().resource_mut::<Score>().0 = 123;

    app.world_mut().write_message(DamagePlayer { amount: 100_000 });
    app.update();
    app.update();

    assert_eq!(common::run_phase(&app), Some(RunPhase::GameOver));
    assert_eq!(app.world().resource::<Settings>().high_score, 123);
    assert!(count::<OverlayButton>(&mut app) >= 2);
}

#[test]
fn surviving_the_clock_is_a_victory() {
    let mut app = common::app_headless();
    common::start_run(&mut app);

    {
        let mut clock = app.world_mut().resource_mut::<RunClock>();
        clock.elapsed = clock.limit;
    }
    app.update();
    app.update();

    assert_eq!(common::run_phase(&app), Some(RunPhase::Victory));
}

#[test]
fn level_up_offers_choices_and_applies_one() {
    let mut app = common::app_headless();
    common::start_run(&mut app);
    let player = common::player(&mut app);
    let before = total_levels(app.world().get::<Loadout>(player).unwrap());
    let needed = app.world().get::<Experience>(player).unwrap().to_next;

    app.world_mut().write_message(GainExperience { amount: needed });
    app.update();
    app.update();

    assert_eq!(common::run_phase(&app), Some(RunPhase::LevelUp));
    assert_eq!(app.world().resource::<PendingLevelUps>().0, 1);
    let offered = app.world().resource::<UpgradeChoices>().0.len();
    assert!(offered > 0);
    assert_eq!(count::<UpgradeButton>(&mut app), offered + 1);
    assert_eq!(app.world().get::<Experience>(player).unwrap().level, 2);

    app.world_mut().write_message(ChooseUpgrade(Some(0)));
    app.update();
    app.update();

    assert_eq!(common::run_phase(&app), Some(RunPhase::Running));
    assert_eq!(app.world().resource::<PendingLevelUps>().0, 0);
    assert_eq!(total_levels(app.world().get::<Loadout>(player).unwrap()), before + 1);
    assert_eq!(count::<UpgradeButton>(&mut app), 0);
}

#[test]
fn experience_gained_while_choosing_is_kept() {
    let mut app = common::app_headless();
    common::start_run(&mut app);
    let player = common::player(&mut app);
    let needed = app.world().get::<Experience>(player).unwrap().to_next;

    app.world_mut().write_message(GainExperience { amount: needed });
    app.update();
    app.update();
    assert_eq!(common::run_phase(&app), Some(RunPhase::LevelUp));

    app.world_mut().write_message(GainExperience { amount: 50.0 });
    for _ in 0..5 {
        app.update();
    }
    assert_eq!(common::run_phase(&app), Some(RunPhase::LevelUp));

    app.world_mut().write_message(ChooseUpgrade(None));
    app.update();
    app.update();

    assert_eq!(common::run_phase(&app), Some(RunPhase::Running));
    let xp = app.world().get::<Experience>(player).unwrap();
    assert_eq!(xp.level, 2);
    assert_eq!(xp.current, 50.0);
}

#[test]
fn level_up_heal_lands_before_the_menu_opens() {
    let mut app = common::app_headless();
    common::start_run(&mut app);
    let player = common::player(&mut app);
    let needed = app.world().get::<Experience>(player).unwrap().to_next;
    let max = app.world().get::<PlayerStats>(player).unwrap().max_health;
    app.world_mut().get_mut::<PlayerStats>(player).unwrap().health = 1;

    app.world_mut().write_message(GainExperience { amount: needed });
    app.update();
    app.update();
    app.update();

    assert_eq!(common::run_phase(&app), Some(RunPhase::LevelUp));
    let divisor = app.world().resource::<Tunables>().level_up_heal_divisor;
    assert_eq!(app.world().get::<PlayerStats>(player).unwrap().health, 1 + max / divisor);
}

#[test]
fn restart_begins_a_fresh_run() {
    let mut app = common::app_headless();
    common::start_run(&mut app);
    let first = common::player(&mut app);
    app.world_mut().write_message(DamagePlayer { amount: 10 });
    app.world_mut().resource_mut::<Score>().0 = 50;
    app.update();

    app.world_mut()
        .resource_mut::<NextState<GameState>>()
        .set(GameState::Restarting);
    for _ in 0..3 {
        app.update();
    }

    assert_eq!(common::game_state(&app), GameState::InGame);
    assert_eq!(common::run_phase(&app), Some(RunPhase::Running));
    let second = common::player(&mut app);
    assert_ne!(first, second);
    let stats = app.world().get::<PlayerStats>(second).unwrap();
    assert_eq!(stats.health, stats.max_health);
    assert_eq!(app.world().resource::<Score>().0, 0);
}
