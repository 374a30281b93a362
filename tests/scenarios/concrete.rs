//! The reference scenarios, one command at a time.

use agora_engine::{AgentStrategy, Feedback, ScriptedStrategy, StrategyError};
use agora_foundation::capability::IS_OPEN;
use agora_parser::FailureKind;
use agora_world::Owner;
use async_trait::async_trait;

use crate::{fingerprint, house, scheduler};

fn scripted(commands: &[&str]) -> Box<dyn AgentStrategy> {
    Box::new(ScriptedStrategy::new(commands.to_vec()))
}

#[tokio::test]
async fn going_north_reaches_the_kitchen() {
    let mut s = scheduler(house(), vec![scripted(&["go north"]), scripted(&["wait"])]);
    let event = s.step().await.unwrap();

    assert!(event.success);
    assert!(event.description.contains("Kitchen"));
    let world = s.snapshot();
    let alice = world.thing_named("Alice").unwrap();
    assert_eq!(
        world.character(alice).unwrap().location,
        world.location_named("Kitchen").unwrap()
    );
}

#[tokio::test]
async fn an_apple_can_only_be_taken_once() {
    let mut s = scheduler(
        house(),
        vec![scripted(&["wait", "wait"]), scripted(&["get apple", "get apple"])],
    );
    let events = s.run_turns(4).await;
    let (first, second) = (&events[1], &events[3]);

    assert!(first.success);
    let world = s.snapshot();
    let apple = world.thing_named("apple").unwrap();
    let bob = world.thing_named("Bob").unwrap();
    let kitchen = world.location_named("Kitchen").unwrap();
    assert_eq!(world.owner_of(apple), Some(Owner::Character(bob)));
    assert!(!world.contents_of(Owner::Location(kitchen)).contains(&apple));

    assert_eq!(second.failure, Some(FailureKind::TargetNotFound));
    assert!(!second.world_changed);
    assert_eq!(second.description, "You don't see any apple here.");
}

#[tokio::test]
async fn a_chest_can_only_be_opened_once() {
    let mut s = scheduler(
        house(),
        vec![scripted(&["wait", "wait"]), scripted(&["open chest", "open chest"])],
    );
    let events = s.run_turns(4).await;

    assert!(events[1].success);
    let world = s.snapshot();
    let chest = world.thing_named("chest").unwrap();
    assert!(world.thing(chest).unwrap().flag(IS_OPEN));
    assert_eq!(events[1].description, "You open the chest. Inside you see: pebble.");

    assert_eq!(events[3].failure, Some(FailureKind::PreconditionError));
    assert_eq!(events[3].description, "The chest is already open.");
    assert!(events[3].ends_turn);
}

#[tokio::test]
async fn unknown_words_do_not_advance_the_turn() {
    let mut s = scheduler(
        house(),
        vec![scripted(&["xyzzy", "north"]), scripted(&["wait"])],
    );
    let before = fingerprint(&s.snapshot());

    let event = s.step().await.unwrap();
    assert_eq!(event.failure, Some(FailureKind::ParseError));
    assert!(!event.world_changed);
    assert!(!event.ends_turn);
    assert_eq!(event.description, "I don't understand that command.");
    assert_eq!(fingerprint(&s.snapshot()), before);
    assert_eq!(s.turns(), 0);

    // Alice keeps the turn and acts again.
    let next = s.step().await.unwrap();
    assert_eq!(next.actor, "Alice");
    assert_eq!(next.turn, 1);
    assert!(next.success);
    assert_eq!(s.turns(), 1);
}

/// Fails its first decision and then behaves.
struct Crashes {
    crashed: bool,
}

#[async_trait]
impl AgentStrategy for Crashes {
    async fn decide(&mut self, _feedback: &Feedback) -> Result<String, StrategyError> {
        if self.crashed {
            Ok("wait".to_string())
        } else {
            self.crashed = true;
            Err(StrategyError::Failed("boom".to_string()))
        }
    }
}

#[tokio::test]
async fn strategy_failure_substitutes_default_and_moves_on() {
    let mut s = scheduler(
        house(),
        vec![Box::new(Crashes { crashed: false }), scripted(&["get apple"])],
    );
    let events = s.run_turns(3).await;

    let crash = &events[0];
    assert_eq!(crash.actor, "Alice");
    assert_eq!(crash.command, "look");
    assert_eq!(crash.failure, Some(FailureKind::StrategyFailure));
    assert!(crash.description.starts_with("Bedroom"));
    assert_eq!(events.iter().filter(|e| e.turn == 1).count(), 1);

    assert_eq!(events[1].actor, "Bob");
    assert!(events[1].success);
    assert_eq!(events[2].actor, "Alice");
    assert_eq!(events[2].command, "wait");
}
