//! World construction from declarations.

use agora_foundation::{Capability, ErrorKind, Value};
use agora_foundation::capability::{IS_LOCKED, IS_OPEN, KEY};
use agora_world::{
    CharacterDecl, CharacterKind, LocationDecl, Owner, ThingDecl, WorldBuilder, WorldConfig,
};

fn house() -> WorldConfig {
    WorldConfig {
        locations: vec![
            LocationDecl::new("Bedroom", "A small bedroom.").with_exit("north", "Kitchen"),
            LocationDecl::new("Kitchen", "A tidy kitchen.")
                .with_exit("south", "Bedroom")
                .with_exit("down", "Cellar"),
            LocationDecl::new("Cellar", "Dark and damp."),
        ],
        characters: vec![
            CharacterDecl::new("Alice").at("Bedroom"),
            CharacterDecl::new("Bob").at("Kitchen").external(),
        ],
        things: vec![
            // Declared before its holder on purpose.
            ThingDecl::new("coin").within("chest"),
            ThingDecl::new("chest")
                .with_capability(Capability::Container)
                .with_capability(Capability::Openable)
                .with_capability(Capability::Lockable)
                .with_attribute(IS_OPEN, false)
                .with_attribute(IS_LOCKED, true)
                .with_attribute(KEY, "brass key")
                .at("Cellar"),
            ThingDecl::new("brass key")
                .with_alias("key")
                .with_capability(Capability::Gettable)
                .carried_by("Bob"),
            ThingDecl::new("apple")
                .with_capability(Capability::Gettable)
                .at("Kitchen"),
        ],
    }
}

#[test]
fn builds_locations_exits_and_roster() {
    let world = WorldBuilder::from_config(&house()).unwrap();
    assert_eq!(world.location_count(), 3);

    let bedroom = world.location_named("bedroom").unwrap();
    let kitchen = world.location_named("Kitchen").unwrap();
    assert_eq!(world.location(bedroom).unwrap().exit("north"), Some(kitchen));
    assert_eq!(world.location(kitchen).unwrap().exits().len(), 2);

    let roster: Vec<_> = world.characters().map(|c| world.name_of(c).to_string()).collect();
    assert_eq!(roster, vec!["Alice", "Bob"]);

    let bob = world.thing_named("bob").unwrap();
    assert_eq!(world.character(bob).unwrap().kind, CharacterKind::External);
    assert_eq!(world.character(bob).unwrap().location, kitchen);
}

#[test]
fn places_things_with_their_owners() {
    let world = WorldBuilder::from_config(&house()).unwrap();
    let chest = world.thing_named("chest").unwrap();
    let coin = world.thing_named("coin").unwrap();
    let key = world.thing_named("brass key").unwrap();
    let bob = world.thing_named("Bob").unwrap();
    let cellar = world.location_named("Cellar").unwrap();

    assert_eq!(world.owner_of(coin), Some(Owner::Container(chest)));
    assert_eq!(world.owner_of(key), Some(Owner::Character(bob)));
    assert_eq!(world.location_of(coin), Some(cellar));
    assert!(world.is_within(coin, chest));
    assert_eq!(
        world.thing(chest).unwrap().attribute(KEY),
        Some(&Value::from("brass key"))
    );
    world.check_ownership().unwrap();
}

#[test]
fn rejects_duplicate_names_across_kinds() {
    let mut config = house();
    config.things.push(ThingDecl::new("kitchen").at("Bedroom"));
    let err = WorldBuilder::from_config(&config).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::DuplicateIdentity(_)));
}

#[test]
fn rejects_unknown_locations_and_holders() {
    let mut config = house();
    config.characters.push(CharacterDecl::new("Carol").at("Attic"));
    let err = WorldBuilder::from_config(&config).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::UnknownLocation(_)));

    let mut config = house();
    config.things.push(ThingDecl::new("pebble").within("nowhere"));
    let err = WorldBuilder::from_config(&config).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::UnknownThing(_)));
}

#[test]
fn rejects_missing_capability_attributes() {
    let mut config = house();
    config.things.push(
        ThingDecl::new("door")
            .with_capability(Capability::Openable)
            .at("Kitchen"),
    );
    let err = WorldBuilder::from_config(&config).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::MissingAttribute { .. }));

    let mut config = house();
    config.things.push(
        ThingDecl::new("door")
            .with_capability(Capability::Openable)
            .with_attribute(IS_OPEN, "no")
            .at("Kitchen"),
    );
    let err = WorldBuilder::from_config(&config).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::AttributeType { .. }));
}

#[test]
fn rejects_things_inside_non_holders() {
    let mut config = house();
    config.things.push(ThingDecl::new("seed").within("apple"));
    let err = WorldBuilder::from_config(&config).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::InvalidOwner { .. }));
}

#[test]
fn snapshots_are_independent() {
    let world = WorldBuilder::from_config(&house()).unwrap();
    let mut changed = world.clone();
    let apple = changed.thing_named("apple").unwrap();
    let alice = changed.thing_named("Alice").unwrap();
    changed.move_thing(apple, Owner::Character(alice)).unwrap();

    let kitchen = world.location_named("Kitchen").unwrap();
    assert_eq!(world.owner_of(apple), Some(Owner::Location(kitchen)));
    assert_eq!(changed.owner_of(apple), Some(Owner::Character(alice)));
}
