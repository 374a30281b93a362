//! The event log as seen by observers of a running scheduler.

use agora_engine::{Scheduler, SchedulerConfig, ScriptedStrategy};

use crate::two_rooms;

fn scheduler() -> Scheduler {
    let mut s = Scheduler::standard(two_rooms(), SchedulerConfig::immediate()).unwrap();
    s.register_named("Alice", Box::new(ScriptedStrategy::new(["north", "get apple"])))
        .unwrap();
    s.register_named("Bob", Box::new(ScriptedStrategy::new(["open chest", "wait"])))
        .unwrap();
    s
}

#[tokio::test]
async fn events_since_returns_suffix() {
    let mut s = scheduler();
    s.run_turns(4).await;
    let log = s.log();
    assert_eq!(log.len(), 4);
    assert_eq!(log.latest_id(), 4);

    let tail: Vec<_> = log.events_since(2).iter().map(|e| e.id).collect();
    assert_eq!(tail, vec![3, 4]);
    assert!(log.events_since(4).is_empty());
    assert!(log.events_since(99).is_empty());
    assert_eq!(log.get(1).map(|e| e.command), Some("north".to_string()));
    assert!(log.get(0).is_none());
}

#[tokio::test]
async fn events_carry_outcomes_and_payload() {
    let mut s = scheduler();
    let events = s.run_turns(4).await;

    let summary: Vec<_> = events
        .iter()
        .map(|e| (e.turn, e.actor.as_str(), e.command.as_str(), e.success))
        .collect();
    assert_eq!(
        summary,
        vec![
            (1, "Alice", "north", true),
            (2, "Bob", "open chest", true),
            (3, "Alice", "get apple", true),
            (4, "Bob", "wait", true),
        ]
    );

    let get = &events[2];
    assert!(get.world_changed);
    assert_eq!(get.action.as_deref(), Some("get"));
    assert_eq!(get.payload["location"], "Kitchen");
    assert_eq!(get.payload["targets"]["item"], "apple");
    assert!(get.payload["strategy_error"].is_null());
    assert!(events.windows(2).all(|w| w[0].timestamp_ms <= w[1].timestamp_ms));
}

#[tokio::test]
async fn events_serialize_as_json_lines() {
    let mut s = scheduler();
    let events = s.run_turns(2).await;
    for event in &events {
        let line = serde_json::to_string(event).unwrap();
        assert!(!line.contains('\n'));
        let json: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(json["id"], event.id);
        assert_eq!(json["actor"], event.actor.as_str());
    }
}

#[tokio::test]
async fn reset_restarts_numbering() {
    let mut s = scheduler();
    s.run_turns(3).await;
    s.reset();
    assert!(s.log().is_empty());
    assert_eq!(s.turns(), 0);

    let events = s.run_turns(1).await;
    assert_eq!(events[0].id, 1);
    assert_eq!(events[0].turn, 1);
    assert_eq!(events[0].command, "north");
}
