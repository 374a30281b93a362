//! Decision providers and how the scheduler treats their failures.

use std::time::Duration;

use agora_engine::{
    AgentStrategy, Feedback, RandomStrategy, Scheduler, SchedulerConfig, ScriptedStrategy,
    StrategyError,
};
use agora_parser::FailureKind;
use async_trait::async_trait;

use crate::two_rooms;

/// Fails every other decision.
struct Flaky {
    calls: usize,
}

#[async_trait]
impl AgentStrategy for Flaky {
    async fn decide(&mut self, _feedback: &Feedback) -> Result<String, StrategyError> {
        self.calls += 1;
        if self.calls % 2 == 0 {
            Err(StrategyError::Failed("model unavailable".to_string()))
        } else {
            Ok("wait".to_string())
        }
    }
}

/// Never answers.
struct Silent;

#[async_trait]
impl AgentStrategy for Silent {
    async fn decide(&mut self, _feedback: &Feedback) -> Result<String, StrategyError> {
        std::future::pending().await
    }
}

#[tokio::test]
async fn random_choices_come_from_offered_commands() {
    let feedback = Feedback {
        text: String::new(),
        commands: vec!["look".into(), "go north".into(), "get apple".into()],
        turn: 1,
    };
    let mut random = RandomStrategy::new(5);
    for _ in 0..20 {
        let command = random.decide(&feedback).await.unwrap();
        assert!(feedback.commands.contains(&command));
    }
    let empty = Feedback::default();
    assert!(matches!(random.decide(&empty).await, Err(StrategyError::Failed(_))));
}

#[tokio::test]
async fn random_is_reproducible_after_reset() {
    let feedback = Feedback {
        text: String::new(),
        commands: (0..10).map(|i| format!("c{i}")).collect(),
        turn: 1,
    };
    let mut random = RandomStrategy::new(77);
    let mut first = Vec::new();
    for _ in 0..8 {
        first.push(random.decide(&feedback).await.unwrap());
    }
    random.reset();
    let mut second = Vec::new();
    for _ in 0..8 {
        second.push(random.decide(&feedback).await.unwrap());
    }
    assert_eq!(first, second);
    assert_eq!(random.seed(), 77);
}

#[tokio::test]
async fn failures_substitute_the_default_command() {
    let config = SchedulerConfig::immediate().with_default_command("inventory");
    let mut s = Scheduler::standard(two_rooms(), config).unwrap();
    s.register_named("Alice", Box::new(Flaky { calls: 0 })).unwrap();
    let events = s.run_turns(4).await;

    assert_eq!(events.len(), 4);
    let failed = &events[1];
    assert_eq!(failed.command, "inventory");
    assert_eq!(failed.failure, Some(FailureKind::StrategyFailure));
    assert!(!failed.success);
    assert!(failed.ends_turn);
    assert_eq!(failed.description, "You are empty-handed.");
    assert_eq!(
        failed.payload["strategy_error"],
        "decision failed: model unavailable"
    );
    assert!(failed.payload["default_failure"].is_null());
    assert_eq!(events[2].command, "wait");
    assert!(events[2].success);
}

#[tokio::test]
async fn failing_default_command_keeps_its_own_category() {
    let config = SchedulerConfig::immediate().with_default_command("get piano");
    let mut s = Scheduler::standard(two_rooms(), config).unwrap();
    s.register_named("Alice", Box::new(Flaky { calls: 1 })).unwrap();
    let events = s.run_turns(1).await;

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].command, "get piano");
    assert_eq!(events[0].failure, Some(FailureKind::StrategyFailure));
    assert!(events[0].ends_turn);
    assert_eq!(events[0].payload["default_failure"], "target_not_found");
}

#[tokio::test]
async fn silent_strategy_times_out() {
    let config = SchedulerConfig::immediate().with_decision_timeout(Duration::from_millis(20));
    let mut s = Scheduler::standard(two_rooms(), config).unwrap();
    s.register_named("Alice", Box::new(Silent)).unwrap();
    s.register_named("Bob", Box::new(ScriptedStrategy::new(["get apple"])))
        .unwrap();

    let events = s.run_turns(2).await;
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].actor, "Alice");
    assert_eq!(events[0].command, "look");
    assert_eq!(events[0].failure, Some(FailureKind::StrategyFailure));
    assert!(
        events[0].payload["strategy_error"]
            .as_str()
            .is_some_and(|e| e.contains("20"))
    );
    assert_eq!(events[1].actor, "Bob");
    assert!(events[1].success);
}

#[tokio::test]
async fn non_ending_actions_share_a_turn_up_to_the_cap() {
    let config = SchedulerConfig::immediate().with_max_actions_per_turn(3);
    let mut s = Scheduler::standard(two_rooms(), config).unwrap();
    s.register_named(
        "Alice",
        Box::new(ScriptedStrategy::new(["look", "inventory", "look", "north"])),
    )
    .unwrap();
    s.register_named("Bob", Box::new(ScriptedStrategy::new(["wait"])))
        .unwrap();

    let events = s.run_turns(2).await;
    let turns: Vec<_> = events.iter().map(|e| (e.turn, e.actor.as_str())).collect();
    assert_eq!(
        turns,
        vec![(1, "Alice"), (1, "Alice"), (1, "Alice"), (2, "Bob")]
    );
    assert!(events[..3].iter().all(|e| !e.ends_turn));
}
