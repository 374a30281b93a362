//! The ownership invariant: every thing in play has exactly one owner.

use agora_foundation::{Capability, ErrorKind, LocationId, ThingId};
use agora_world::{
    CharacterDecl, LocationDecl, Owner, ThingDecl, World, WorldBuilder, WorldConfig,
};
use proptest::prelude::*;

fn storeroom() -> World {
    WorldBuilder::from_config(&WorldConfig {
        locations: vec![
            LocationDecl::new("Store", "Shelves.").with_exit("east", "Yard"),
            LocationDecl::new("Yard", "Open sky.").with_exit("west", "Store"),
        ],
        characters: vec![
            CharacterDecl::new("Alice").at("Store"),
            CharacterDecl::new("Bob").at("Yard"),
        ],
        things: vec![
            ThingDecl::new("crate")
                .with_capability(Capability::Container)
                .with_capability(Capability::Gettable)
                .at("Store"),
            ThingDecl::new("box")
                .with_capability(Capability::Container)
                .with_capability(Capability::Gettable)
                .at("Store"),
            ThingDecl::new("bench")
                .with_capability(Capability::Surface)
                .at("Yard"),
            ThingDecl::new("nail").with_capability(Capability::Gettable).within("box"),
            ThingDecl::new("rope").with_capability(Capability::Gettable).at("Yard"),
            ThingDecl::new("apple")
                .with_capability(Capability::Gettable)
                .with_capability(Capability::Consumable)
                .carried_by("Alice"),
        ],
    })
    .unwrap()
}

fn id(world: &World, name: &str) -> ThingId {
    world.thing_named(name).unwrap()
}

fn loc(world: &World, name: &str) -> LocationId {
    world.location_named(name).unwrap()
}

#[test]
fn move_detaches_from_previous_owner() {
    let mut world = storeroom();
    let nail = id(&world, "nail");
    let bob = id(&world, "Bob");
    let the_box = id(&world, "box");

    world.move_thing(nail, Owner::Character(bob)).unwrap();
    assert!(world.contents_of(Owner::Container(the_box)).is_empty());
    assert_eq!(world.contents_of(Owner::Character(bob)), vec![nail]);
    world.check_ownership().unwrap();
}

#[test]
fn refuses_cycles() {
    let mut world = storeroom();
    let crate_ = id(&world, "crate");
    let the_box = id(&world, "box");

    world.move_thing(the_box, Owner::Container(crate_)).unwrap();
    let err = world.move_thing(crate_, Owner::Container(the_box)).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::OwnershipCycle(_)));
    let err = world.move_thing(crate_, Owner::Container(crate_)).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::OwnershipCycle(_)));
    world.check_ownership().unwrap();
}

#[test]
fn refuses_non_holders_and_characters() {
    let mut world = storeroom();
    let rope = id(&world, "rope");
    let apple = id(&world, "apple");
    let alice = id(&world, "Alice");

    let err = world.move_thing(rope, Owner::Container(apple)).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::InvalidOwner { .. }));
    let err = world
        .move_thing(alice, Owner::Location(loc(&world, "Yard")))
        .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::InvalidOwner { .. }));
}

#[test]
fn removal_spills_contents_to_former_owner() {
    let mut world = storeroom();
    let the_box = id(&world, "box");
    let nail = id(&world, "nail");
    let store = loc(&world, "Store");

    world.remove_thing(the_box).unwrap();
    assert!(!world.is_live(the_box));
    assert_eq!(world.owner_of(nail), Some(Owner::Location(store)));
    assert!(world.remove_thing(the_box).is_err());
    world.check_ownership().unwrap();
}

#[test]
fn characters_move_between_occupant_lists() {
    let mut world = storeroom();
    let alice = id(&world, "Alice");
    let store = loc(&world, "Store");
    let yard = loc(&world, "Yard");

    world.move_character(alice, yard).unwrap();
    assert_eq!(world.location(store).unwrap().occupants().count(), 0);
    assert_eq!(world.location(yard).unwrap().occupants().count(), 2);
    // Carried things travel with the character.
    assert_eq!(world.location_of(id(&world, "apple")), Some(yard));
    world.check_ownership().unwrap();
}

const THINGS: [&str; 6] = ["crate", "box", "bench", "nail", "rope", "apple"];

#[derive(Clone, Debug)]
enum Target {
    Location(&'static str),
    Character(&'static str),
    Container(&'static str),
}

fn target() -> impl Strategy<Value = Target> {
    prop_oneof![
        prop::sample::select(vec!["Store", "Yard"]).prop_map(Target::Location),
        prop::sample::select(vec!["Alice", "Bob"]).prop_map(Target::Character),
        prop::sample::select(THINGS.to_vec()).prop_map(Target::Container),
    ]
}

fn resolve(world: &World, target: &Target) -> Owner {
    match target {
        Target::Location(name) => Owner::Location(loc(world, name)),
        Target::Character(name) => Owner::Character(id(world, name)),
        Target::Container(name) => Owner::Container(id(world, name)),
    }
}

proptest! {
    #[test]
    fn arbitrary_moves_keep_single_ownership(
        moves in prop::collection::vec((prop::sample::select(THINGS.to_vec()), target()), 1..40)
    ) {
        let mut world = storeroom();
        for (thing, to) in &moves {
            let thing = id(&world, thing);
            let owner = resolve(&world, to);
            let before = world.owner_of(thing);
            match world.move_thing(thing, owner) {
                Ok(()) => prop_assert_eq!(world.owner_of(thing), Some(owner)),
                Err(_) => prop_assert_eq!(world.owner_of(thing), before),
            }
            prop_assert!(world.check_ownership().is_ok());
        }
    }
}
