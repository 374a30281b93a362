//! A scheduler running on a background task, driven from outside.

use std::time::Duration;

use agora_engine::{
    ChannelStrategy, EventLog, RandomStrategy, Scheduler, SchedulerConfig, ScriptedStrategy,
};
use agora_foundation::ErrorKind;

use crate::two_rooms;

/// Waits until the log holds at least `count` events.
async fn wait_for(log: &EventLog, count: usize) {
    let mut latest = log.subscribe();
    tokio::time::timeout(Duration::from_secs(5), async {
        while log.len() < count {
            if latest.changed().await.is_err() {
                break;
            }
        }
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn driver_plays_one_character() {
    let mut s = Scheduler::standard(two_rooms(), SchedulerConfig::immediate()).unwrap();
    let (strategy, mut driver) = ChannelStrategy::pair(4);
    s.register_named("Alice", Box::new(strategy)).unwrap();
    s.register_named("Bob", Box::new(ScriptedStrategy::new(["wait", "wait", "wait"])))
        .unwrap();
    let handle = s.spawn();
    let log = handle.log();

    let first = driver.next_feedback().await.unwrap();
    assert_eq!(first.turn, 1);
    assert!(first.text.starts_with("You are Alice, in Bedroom."));
    assert!(first.commands.iter().any(|c| c == "go north"));

    driver.submit("north").await.unwrap();
    wait_for(&log, 2).await;
    let events = log.events_since(0);
    assert_eq!(events[0].actor, "Alice");
    assert!(events[0].description.starts_with("You go north to Kitchen."));
    assert_eq!(events[1].actor, "Bob");

    let next = driver.next_feedback().await.unwrap();
    assert_eq!(next.turn, 3);
    assert_eq!(next.text, events[0].description);

    let scheduler = handle.stop().await.unwrap();
    assert_eq!(scheduler.turns(), 2);
}

#[tokio::test]
async fn handle_registers_and_removes_characters() {
    let world = two_rooms();
    let alice = world.thing_named("Alice").unwrap();
    let bob = world.thing_named("Bob").unwrap();
    let apple = world.thing_named("apple").unwrap();
    let s = Scheduler::standard(world, SchedulerConfig::immediate()).unwrap();
    let handle = s.spawn();
    assert!(!handle.is_finished());

    handle
        .register(bob, Box::new(ScriptedStrategy::new(["get apple"])))
        .await
        .unwrap();
    let err = handle
        .register(bob, Box::new(RandomStrategy::new(1)))
        .await
        .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::DuplicateIdentity(_)));
    let err = handle
        .register(apple, Box::new(RandomStrategy::new(1)))
        .await
        .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::NotACharacter(_)));

    wait_for(&handle.log(), 1).await;
    assert_eq!(handle.log().get(1).unwrap().description, "You take the apple.");

    handle
        .register(alice, Box::new(RandomStrategy::new(3)))
        .await
        .unwrap();
    assert!(handle.deregister(bob).await);
    assert!(!handle.deregister(bob).await);

    let scheduler = handle.stop().await.unwrap();
    assert_eq!(scheduler.roster(), vec![alice]);
}

#[tokio::test]
async fn handle_reset_restores_world() {
    let mut s = Scheduler::standard(two_rooms(), SchedulerConfig::immediate()).unwrap();
    s.register_named("Bob", Box::new(ScriptedStrategy::new(["get apple"])))
        .unwrap();
    let handle = s.spawn();
    let log = handle.log();
    wait_for(&log, 1).await;

    let bob = handle.snapshot().thing_named("Bob").unwrap();
    assert_eq!(handle.perception(bob).unwrap().inventory.len(), 1);

    // The script replays after a reset, so the apple is taken again.
    assert!(handle.reset().await);
    wait_for(&log, 1).await;
    assert_eq!(log.get(1).unwrap().command, "get apple");
    assert!(log.get(1).unwrap().success);

    handle.stop().await.unwrap();
}

#[tokio::test]
async fn stops_at_turn_limit() {
    let config = SchedulerConfig::immediate().with_max_turns(Some(5));
    let mut s = Scheduler::standard(two_rooms(), config).unwrap();
    s.register_named("Alice", Box::new(RandomStrategy::new(11))).unwrap();
    s.register_named("Bob", Box::new(RandomStrategy::new(12))).unwrap();
    let scheduler = s.spawn().join().await.unwrap();

    assert_eq!(scheduler.turns(), 5);
    let log = scheduler.log();
    assert_eq!(log.events_since(0).last().map(|e| e.turn), Some(5));
    scheduler.snapshot().check_ownership().unwrap();
}

#[tokio::test]
async fn dropping_the_handle_stops_the_task() {
    let mut s = Scheduler::standard(two_rooms(), SchedulerConfig::immediate()).unwrap();
    let (strategy, driver) = ChannelStrategy::pair(1);
    s.register_named("Alice", Box::new(strategy)).unwrap();
    let handle = s.spawn();
    drop(handle);
    let disconnected = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            if driver.submit("look").await.is_err() {
                break;
            }
            tokio::task::yield_now().await;
        }
    })
    .await;
    assert!(disconnected.is_ok());
}
