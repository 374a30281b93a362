//! What a character perceives.

use agora_foundation::Capability;
use agora_parser::{Perception, Resolver, describe_surroundings};

use crate::{cottage, id};

#[test]
fn perception_lists_surroundings() {
    let world = cottage();
    let alice = id(&world, "Alice");
    let p = Perception::of(&Resolver::standard().unwrap(), &world, alice).unwrap();

    assert_eq!(p.character, "Alice");
    assert_eq!(p.location, "Kitchen");
    assert_eq!(p.characters, vec!["Bob"]);

    let held: Vec<_> = p.inventory.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(held, vec!["sack", "brass key"]);

    let cup = p.things.iter().find(|t| t.name == "cup").unwrap();
    assert_eq!(cup.inside.as_deref(), Some("table"));
    let chest = p.things.iter().find(|t| t.name == "chest").unwrap();
    assert_eq!(chest.state, vec!["closed", "locked"]);
    assert!(chest.capabilities.contains(&Capability::Lockable));
    assert!(p.things.iter().all(|t| t.name != "coin"));

    let mut exits: Vec<_> = p.exits.iter().map(|e| (e.direction.as_str(), e.to.as_str())).collect();
    exits.sort_unstable();
    assert_eq!(exits, vec![("down", "Cellar"), ("north", "Garden")]);
    assert!(p.commands.iter().any(|c| c == "get red apple"));
}

#[test]
fn perception_renders_as_text() {
    let world = cottage();
    let bob = id(&world, "Bob");
    let text = Perception::of(&Resolver::standard().unwrap(), &world, bob)
        .unwrap()
        .to_string();
    assert!(text.starts_with("You are Bob, in Kitchen.\nA warm kitchen.\n"));
    assert!(text.contains("chest [closed, locked]"));
    assert!(text.contains("cup (in table)"));
    assert!(text.contains("Also here: Alice."));
    assert!(!text.contains("You carry"));
}

#[test]
fn perception_serializes_to_json() {
    let world = cottage();
    let alice = id(&world, "Alice");
    let p = Perception::of(&Resolver::standard().unwrap(), &world, alice).unwrap();
    let json = serde_json::to_value(&p).unwrap();
    assert_eq!(json["location"], "Kitchen");
    assert_eq!(json["inventory"][0]["capabilities"][1], "container");
    let back: Perception = serde_json::from_value(json).unwrap();
    assert_eq!(back, p);
}

#[test]
fn look_matches_surroundings_and_is_repeatable() {
    let mut world = cottage();
    let alice = id(&world, "Alice");
    let resolver = Resolver::standard().unwrap();
    let first = resolver.execute(&mut world, alice, "look");
    let second = resolver.execute(&mut world, alice, "look");
    assert_eq!(first, second);
    assert_eq!(first.description, describe_surroundings(&world, alice).unwrap());
    assert!(first.description.contains("On the table: cup."));
}
