//! Properties that hold for any run.

use agora_engine::{AgentStrategy, RandomStrategy, ScriptedStrategy};
use agora_parser::{FailureKind, Resolver};
use proptest::prelude::*;

use crate::{descriptions, fingerprint, house, scheduler};

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
        .block_on(future)
}

fn random_pair(a: u64, b: u64) -> Vec<Box<dyn AgentStrategy>> {
    vec![Box::new(RandomStrategy::new(a)), Box::new(RandomStrategy::new(b))]
}

const COMMANDS: &[&str] = &[
    "north", "south", "get apple", "drop apple", "open chest", "close chest",
    "get pebble", "put apple in chest", "give apple to alice", "give apple to bob",
    "look", "inventory", "xyzzy", "get chest",
];

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn ids_are_gapless_and_turns_never_go_back(a in any::<u64>(), b in any::<u64>(), turns in 1u64..40) {
        let events = block_on(async {
            let mut s = scheduler(house(), random_pair(a, b));
            s.run_turns(turns).await
        });
        let ids: Vec<u64> = events.iter().map(|e| e.id).collect();
        let expected: Vec<u64> = (1..=events.len() as u64).collect();
        prop_assert_eq!(ids, expected);
        prop_assert!(events.windows(2).all(|w| w[0].turn <= w[1].turn));
        prop_assert_eq!(events.last().map(|e| e.turn), Some(turns));
    }

    #[test]
    fn scripted_commands_keep_single_ownership(
        alice in prop::collection::vec(prop::sample::select(COMMANDS.to_vec()), 0..15),
        bob in prop::collection::vec(prop::sample::select(COMMANDS.to_vec()), 0..15),
    ) {
        let (world, events) = block_on(async {
            let mut s = scheduler(
                house(),
                vec![
                    Box::new(ScriptedStrategy::new(alice.clone())),
                    Box::new(ScriptedStrategy::new(bob.clone())),
                ],
            );
            let events = s.run_turns(30).await;
            (s.snapshot(), events)
        });
        prop_assert!(world.check_ownership().is_ok());
        for event in &events {
            if event.failure.is_some() {
                prop_assert!(!event.world_changed);
            }
            if event.failure == Some(FailureKind::ParseError) {
                prop_assert!(!event.ends_turn);
            }
        }
    }

    #[test]
    fn same_seeds_same_outcome(a in any::<u64>(), b in any::<u64>()) {
        let run = || block_on(async {
            let mut s = scheduler(house(), random_pair(a, b));
            let events = s.run_turns(20).await;
            (fingerprint(&s.snapshot()), descriptions(&events))
        });
        prop_assert_eq!(run(), run());
    }
}

#[tokio::test]
async fn scripted_runs_are_deterministic() {
    let script = ["north", "get apple", "open chest", "put apple in chest", "close chest"];
    let run = || async {
        let mut s = scheduler(
            house(),
            vec![
                Box::new(ScriptedStrategy::new(script)),
                Box::new(ScriptedStrategy::new(["get pebble", "south"])),
            ],
        );
        let events = s.run_turns(12).await;
        (fingerprint(&s.snapshot()), descriptions(&events))
    };
    assert_eq!(run().await, run().await);
}

#[tokio::test]
async fn reset_replays_the_same_story() {
    let mut s = scheduler(house(), random_pair(4, 8));
    let first = descriptions(&s.run_turns(15).await);
    let end = fingerprint(&s.snapshot());
    s.reset();
    assert_eq!(fingerprint(&s.snapshot()), fingerprint(&house()));
    let second = descriptions(&s.run_turns(15).await);
    assert_eq!(first, second);
    assert_eq!(fingerprint(&s.snapshot()), end);
}

#[test]
fn looking_twice_changes_nothing() {
    let resolver = Resolver::standard().unwrap();
    let mut world = house();
    let alice = world.thing_named("Alice").unwrap();
    let before = fingerprint(&world);

    let first = resolver.execute(&mut world, alice, "look");
    let second = resolver.execute(&mut world, alice, "look");
    assert_eq!(first, second);
    assert!(!first.world_changed);
    assert_eq!(fingerprint(&world), before);
}
