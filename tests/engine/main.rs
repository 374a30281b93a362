//! Integration tests for Layer 3: Engine
//!
//! Tests for the event log, strategies, and the turn scheduler running
//! in the background.

mod event_log;
mod live;
mod strategies;

use agora_foundation::Capability;
use agora_foundation::capability::IS_OPEN;
use agora_world::{CharacterDecl, LocationDecl, ThingDecl, World, WorldBuilder, WorldConfig};

/// Two rooms, two characters, a few things to handle.
pub fn two_rooms() -> World {
    WorldBuilder::from_config(&WorldConfig {
        locations: vec![
            LocationDecl::new("Bedroom", "Quiet.").with_exit("north", "Kitchen"),
            LocationDecl::new("Kitchen", "Warm.").with_exit("south", "Bedroom"),
        ],
        characters: vec![
            CharacterDecl::new("Alice").at("Bedroom"),
            CharacterDecl::new("Bob").at("Kitchen"),
        ],
        things: vec![
            ThingDecl::new("apple")
                .with_capability(Capability::Gettable)
                .at("Kitchen"),
            ThingDecl::new("chest")
                .with_capability(Capability::Container)
                .with_capability(Capability::Openable)
                .with_attribute(IS_OPEN, false)
                .at("Kitchen"),
        ],
    })
    .unwrap()
}
