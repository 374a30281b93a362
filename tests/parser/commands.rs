//! The standard actions, end to end through the resolver.

use agora_foundation::capability::{IS_ACTIVE, IS_LOCKED, IS_OPEN};
use agora_foundation::Value;
use agora_parser::{FailureKind, Resolver};
use agora_world::Owner;

use crate::{cottage, id, lobby};

fn resolver() -> Resolver {
    Resolver::standard().unwrap()
}

#[test]
fn articles_and_case_are_ignored() {
    let mut world = cottage();
    let alice = id(&world, "Alice");
    let r = resolver().execute(&mut world, alice, "  TAKE The Cup ");
    assert!(r.success(), "{r:?}");
    assert_eq!(r.description, "You take the cup.");
    assert_eq!(world.owner_of(id(&world, "cup")), Some(Owner::Character(alice)));
}

#[test]
fn ambiguous_phrase_picks_first_declared() {
    let mut world = cottage();
    let alice = id(&world, "Alice");
    let r = resolver().execute(&mut world, alice, "get apple");
    assert!(r.success(), "{r:?}");
    assert_eq!(r.targets, vec![("item".to_string(), "red apple".to_string())]);

    // An exact name beats the shared alias.
    let r = resolver().execute(&mut world, alice, "get green apple");
    assert_eq!(r.description, "You take the green apple.");
}

#[test]
fn direction_synonyms_move_the_character() {
    let mut world = cottage();
    let alice = id(&world, "Alice");
    let r = resolver().execute(&mut world, alice, "d");
    assert!(r.success(), "{r:?}");
    assert!(r.description.starts_with("You go down to Cellar."));
    assert!(r.ends_turn);

    let r = resolver().execute(&mut world, alice, "go west");
    assert_eq!(r.failure, Some(FailureKind::PreconditionError));
    assert_eq!(r.description, "You can't go that way.");
}

#[test]
fn abbreviated_and_named_exits_are_usable() {
    let resolver = resolver();
    for input in ["go north", "north", "go n", "n"] {
        let mut world = lobby();
        let alice = id(&world, "Alice");
        let r = resolver.execute(&mut world, alice, input);
        assert!(r.success(), "{input}: {r:?}");
        assert!(r.description.starts_with("You go n to Study."), "{}", r.description);
    }

    let mut world = lobby();
    let alice = id(&world, "Alice");
    let r = resolver.execute(&mut world, alice, "go portal");
    assert!(r.success(), "{r:?}");
    assert!(r.description.starts_with("You go portal to Vault."));

    let r = resolver.execute(&mut world, alice, "go portal");
    assert_eq!(r.failure, Some(FailureKind::ParseError));
}

#[test]
fn punctuated_names_can_be_typed() {
    let resolver = resolver();
    for input in ["get bob's hat", "get Bobs Hat", "get \"Bob's hat\"", "take hat"] {
        let mut world = lobby();
        let alice = id(&world, "Alice");
        let r = resolver.execute(&mut world, alice, input);
        assert!(r.success(), "{input}: {r:?}");
        assert_eq!(r.description, "You take the Bob's hat.");
    }
}

#[test]
fn put_in_and_on() {
    let mut world = cottage();
    let alice = id(&world, "Alice");
    let resolver = resolver();

    let r = resolver.execute(&mut world, alice, "put key in sack");
    assert_eq!(r.description, "You put the brass key in the sack.");
    assert_eq!(
        world.owner_of(id(&world, "brass key")),
        Some(Owner::Container(id(&world, "sack")))
    );

    let r = resolver.execute(&mut world, alice, "put sack on table");
    assert_eq!(r.description, "You put the sack on the table.");

    let r = resolver.execute(&mut world, alice, "put sack in sack");
    assert_eq!(r.failure, Some(FailureKind::TargetNotFound));
    world.check_ownership().unwrap();
}

#[test]
fn refuses_to_put_things_in_closed_containers() {
    let mut world = cottage();
    let alice = id(&world, "Alice");
    let r = resolver().execute(&mut world, alice, "put key in chest");
    assert_eq!(r.failure, Some(FailureKind::PreconditionError));
    assert_eq!(r.description, "The chest is closed.");
}

#[test]
fn give_moves_to_another_character() {
    let mut world = cottage();
    let alice = id(&world, "Alice");
    let bob = id(&world, "Bob");
    let resolver = resolver();

    let r = resolver.execute(&mut world, alice, "give sack to bob");
    assert_eq!(r.description, "You give the sack to Bob.");
    assert_eq!(world.owner_of(id(&world, "sack")), Some(Owner::Character(bob)));

    let r = resolver.execute(&mut world, alice, "give key to table");
    assert_eq!(r.failure, Some(FailureKind::PreconditionError));
}

#[test]
fn unlock_open_and_lock_again() {
    let mut world = cottage();
    let alice = id(&world, "Alice");
    let chest = id(&world, "chest");
    let resolver = resolver();

    let r = resolver.execute(&mut world, alice, "open chest");
    assert_eq!(r.description, "The chest is locked.");

    let r = resolver.execute(&mut world, alice, "unlock chest with sack");
    assert_eq!(r.description, "The sack doesn't fit the chest.");

    let r = resolver.execute(&mut world, alice, "unlock chest with key");
    assert!(r.success(), "{r:?}");
    assert_eq!(world.thing(chest).unwrap().attribute(IS_LOCKED), Some(&Value::Bool(false)));

    let r = resolver.execute(&mut world, alice, "open chest");
    assert_eq!(r.description, "You open the chest. Inside you see: coin.");
    assert!(world.thing(chest).unwrap().flag(IS_OPEN));

    let r = resolver.execute(&mut world, alice, "lock chest with key");
    assert_eq!(r.description, "You need to close the chest first.");

    resolver.execute(&mut world, alice, "close chest");
    let r = resolver.execute(&mut world, alice, "lock chest with key");
    assert!(r.success(), "{r:?}");
    assert!(world.thing(chest).unwrap().flag(IS_LOCKED));
}

#[test]
fn contents_become_reachable_once_open() {
    let mut world = cottage();
    let alice = id(&world, "Alice");
    let resolver = resolver();

    let r = resolver.execute(&mut world, alice, "get coin");
    assert_eq!(r.failure, Some(FailureKind::TargetNotFound));

    resolver.execute(&mut world, alice, "unlock chest with key");
    resolver.execute(&mut world, alice, "open chest");
    let r = resolver.execute(&mut world, alice, "get coin");
    assert!(r.success(), "{r:?}");
}

#[test]
fn eating_removes_from_play() {
    let mut world = cottage();
    let alice = id(&world, "Alice");
    let apple = id(&world, "green apple");
    let r = resolver().execute(&mut world, alice, "eat green apple");
    assert_eq!(r.description, "You consume the green apple.");
    assert!(!world.is_live(apple));

    let r = resolver().execute(&mut world, alice, "eat table");
    assert_eq!(r.failure, Some(FailureKind::CapabilityMismatch));
    assert_eq!(r.description, "You can't eat the table.");
    world.check_ownership().unwrap();
}

#[test]
fn switching_devices() {
    let mut world = cottage();
    let alice = id(&world, "Alice");
    let lamp = id(&world, "lamp");
    let resolver = resolver();

    resolver.execute(&mut world, alice, "north");
    let r = resolver.execute(&mut world, alice, "switch on lamp");
    assert_eq!(r.description, "You turn on the lamp.");
    assert_eq!(world.thing(lamp).unwrap().attribute(IS_ACTIVE), Some(&Value::Bool(true)));

    let r = resolver.execute(&mut world, alice, "turn on lamp");
    assert_eq!(r.description, "The lamp is already on.");
    let r = resolver.execute(&mut world, alice, "turn off lamp");
    assert!(r.success());
}

#[test]
fn inventory_and_drop() {
    let mut world = cottage();
    let alice = id(&world, "Alice");
    let resolver = resolver();

    let r = resolver.execute(&mut world, alice, "i");
    assert_eq!(r.description, "You are carrying: sack, brass key.");
    assert!(!r.ends_turn);
    assert!(!r.world_changed);

    let r = resolver.execute(&mut world, alice, "drop table");
    assert_eq!(r.failure, Some(FailureKind::TargetNotFound));
    assert_eq!(r.description, "You aren't carrying any table.");

    resolver.execute(&mut world, alice, "drop sack");
    resolver.execute(&mut world, alice, "drop key");
    let r = resolver.execute(&mut world, alice, "inventory");
    assert_eq!(r.description, "You are empty-handed.");
}

#[test]
fn examine_reports_state_and_contents() {
    let mut world = cottage();
    let alice = id(&world, "Alice");
    let r = resolver().execute(&mut world, alice, "x chest");
    assert!(r.description.contains("closed"), "{}", r.description);
    assert!(r.description.contains("locked"), "{}", r.description);
    assert!(!r.ends_turn);
}
