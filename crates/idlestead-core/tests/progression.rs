//! End-to-end progression through the public `Game` API: the tutorial map,
//! a map switch, a prestige, and a save round trip.

#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::missing_panics_doc,
    clippy::indexing_slicing
)]

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use idlestead_core::combat::BattleOutcome;
use idlestead_core::config::KernelConfig;
use idlestead_core::game::Game;
use idlestead_core::tick::run_tick;
use idlestead_save::{MemorySaveStore, SaveStore};
use idlestead_types::{Currency, GameSpeed, ResourceKey};
use idlestead_world::ContentTables;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn new_game(now: DateTime<Utc>) -> Game {
    Game::new(
        Arc::new(ContentTables::builtin()),
        &KernelConfig::default(),
        now,
    )
    .expect("builtin content has a starting map")
}

/// Fight `node_id` from `start` until it falls; returns when it fell.
fn clear(game: &mut Game, node_id: &str, start: DateTime<Utc>) -> DateTime<Utc> {
    let preview = game.simulate(node_id).expect("node is reachable");
    let secs = i64::try_from(preview.ttk_secs).unwrap();
    assert!(game.start_battle(node_id, start));
    let done = start + TimeDelta::seconds(secs);
    assert!(matches!(
        game.tick_battle(done),
        BattleOutcome::Victory { .. }
    ));
    done
}

#[test]
fn tutorial_walkthrough_then_prestige() {
    let t0 = Utc::now();
    let mut game = new_game(t0);

    let preview = game.simulate("t1").unwrap();
    assert_eq!(preview.dps, dec!(10));
    assert_eq!(preview.ttk_secs, 5);

    assert!(game.start_battle("t1", t0));
    assert!(matches!(
        game.tick_battle(t0 + TimeDelta::seconds(4)),
        BattleOutcome::InProgress { .. }
    ));
    assert!(matches!(
        game.tick_battle(t0 + TimeDelta::seconds(5)),
        BattleOutcome::Victory { .. }
    ));
    let progress = game.combat().progress();
    assert!(progress.reachable.contains("t2"));
    assert!(!progress.reachable.contains("t1"));

    let t = clear(&mut game, "t2", t0 + TimeDelta::seconds(5));
    clear(&mut game, "t3", t);
    assert_eq!(game.combat().progress().total_cleared, 3);
    assert_eq!(game.world_tree().wallet().balance(Currency::Blueprint), dec!(2));
    assert_eq!(game.world_tree().wallet().balance(Currency::Memory), dec!(1));
    assert_eq!(game.available_maps(), vec!["tutorial", "forest"]);

    assert!(game.switch_map("forest"));
    assert_eq!(game.combat().progress().current_map_id, "forest");
    assert!(!game.switch_map("desert"));

    assert!(game.can_prestige());
    assert_eq!(game.do_prestige(), Some(dec!(3)));
    assert_eq!(game.prestige().state().legacy_points, dec!(3));
    assert_eq!(game.combat().progress().current_map_id, "tutorial");
    assert_eq!(game.combat().progress().total_cleared, 0);
    assert_eq!(game.world_tree().wallet().balance(Currency::Memory), dec!(1));
    assert!(game.resources().multiplier(ResourceKey::Wood) > Decimal::ONE);
}

#[test]
fn shield_nodes_halve_damage() {
    let t0 = Utc::now();
    let mut game = new_game(t0);
    let mut t = t0;
    for id in ["t1", "t2", "t3"] {
        t = clear(&mut game, id, t);
    }
    assert!(game.switch_map("forest"));
    clear(&mut game, "f1", t);

    assert_eq!(game.simulate("f3").unwrap().ttk_secs, 15);
    let shield = game.simulate("f2").unwrap();
    assert_eq!(shield.dps, dec!(5));
    assert_eq!(shield.ttk_secs, 36);
}

#[test]
fn production_ticks_stay_within_caps() {
    let t0 = Utc::now();
    let mut game = new_game(t0);
    let mut now = t0;
    for _ in 0..30 {
        now += TimeDelta::seconds(10);
        run_tick(&mut game, now).unwrap();
    }
    for key in ResourceKey::ALL {
        assert!(game.resources().amount(key) <= game.resources().cap(key));
    }
    assert_eq!(game.resources().amount(ResourceKey::Wood), dec!(100));
    assert_eq!(game.clock().tick(), 30);
}

#[tokio::test]
async fn save_and_restore_through_a_store() {
    let t0 = Utc::now();
    let mut game = new_game(t0);
    let t = clear(&mut game, "t1", t0);
    run_tick(&mut game, t).unwrap();
    assert!(game.equip_item("wooden_sword"));

    let store = MemorySaveStore::new();
    store.save(&game.snapshot(t, GameSpeed::Fast)).await.unwrap();
    let payload = store.load().await.unwrap().unwrap();
    assert_eq!(payload.speed, GameSpeed::Fast);

    let restored = Game::restore(
        Arc::new(ContentTables::builtin()),
        &KernelConfig::default(),
        &payload,
    )
    .unwrap();
    assert_eq!(
        restored.snapshot(t, GameSpeed::Fast),
        game.snapshot(t, GameSpeed::Fast)
    );
    assert_eq!(restored.combat().profile(), game.combat().profile());
    assert_eq!(restored.combat().progress().reachable, game.combat().progress().reachable);
}
