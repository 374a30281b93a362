//! Discovered commands are exactly the ones that would succeed.

use agora_parser::{Resolver, discover};
use proptest::prelude::*;

use crate::{cottage, id, lobby};

const POOL: &[&str] = &[
    "get apple",
    "get green apple",
    "get cup",
    "drop sack",
    "put key in sack",
    "put cup on table",
    "give key to bob",
    "unlock chest with key",
    "open chest",
    "close chest",
    "get coin",
    "north",
    "south",
    "down",
    "up",
    "get lamp",
    "turn on lamp",
    "eat red apple",
];

#[test]
fn discovery_lists_valid_commands() {
    let world = cottage();
    let alice = id(&world, "Alice");
    let commands = discover(&Resolver::standard().unwrap(), &world, alice).unwrap();

    for expected in [
        "look",
        "inventory",
        "go north",
        "go down",
        "get red apple",
        "get cup",
        "drop brass key",
        "place brass key in sack",
        "give sack to bob",
        "unlock chest with brass key",
        "wait",
    ] {
        assert!(commands.iter().any(|c| c == expected), "missing {expected}: {commands:?}");
    }
    for absent in ["open chest", "get coin", "get table", "drop cup", "go west", "eat table"] {
        assert!(!commands.iter().any(|c| c == absent), "unexpected {absent}");
    }
}

#[test]
fn discovery_covers_unusual_exits_and_names() {
    let resolver = Resolver::standard().unwrap();
    let world = lobby();
    let alice = id(&world, "Alice");
    let commands = discover(&resolver, &world, alice).unwrap();
    for expected in ["go n", "go portal", "get bob's hat"] {
        assert!(commands.iter().any(|c| c == expected), "missing {expected}: {commands:?}");
    }

    for command in &commands {
        let mut trial = world.clone();
        let r = resolver.execute(&mut trial, alice, command);
        assert!(r.success(), "{command} failed: {r:?}");
    }
}

#[test]
fn discovery_has_no_duplicates() {
    let world = cottage();
    let alice = id(&world, "Alice");
    let commands = discover(&Resolver::standard().unwrap(), &world, alice).unwrap();
    let mut sorted = commands.clone();
    sorted.sort();
    sorted.dedup();
    assert_eq!(sorted.len(), commands.len());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn every_discovered_command_succeeds(
        script in prop::collection::vec((any::<bool>(), prop::sample::select(POOL.to_vec())), 0..12)
    ) {
        let resolver = Resolver::standard().unwrap();
        let mut world = cottage();
        let alice = id(&world, "Alice");
        let bob = id(&world, "Bob");
        for (by_alice, command) in &script {
            let actor = if *by_alice { alice } else { bob };
            resolver.execute(&mut world, actor, command);
        }

        for actor in [alice, bob] {
            for command in discover(&resolver, &world, actor).unwrap() {
                let mut trial = world.clone();
                let r = resolver.execute(&mut trial, actor, &command);
                prop_assert!(r.success(), "{} failed: {:?}", command, r);
                prop_assert!(trial.check_ownership().is_ok());
            }
        }
    }
}
