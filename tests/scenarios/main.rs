//! End-to-end scenarios: worlds, strategies, and the scheduler together.

mod concrete;
mod properties;

use agora_engine::{AgentStrategy, Event, Scheduler, SchedulerConfig};
use agora_foundation::Capability;
use agora_foundation::capability::IS_OPEN;
use agora_world::{CharacterDecl, LocationDecl, ThingDecl, World, WorldBuilder, WorldConfig};

/// Bedroom and Kitchen, an apple and a closed chest.
pub fn house() -> World {
    WorldBuilder::from_config(&WorldConfig {
        locations: vec![
            LocationDecl::new("Bedroom", "A small bedroom.").with_exit("north", "Kitchen"),
            LocationDecl::new("Kitchen", "A tidy kitchen.").with_exit("south", "Bedroom"),
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
            ThingDecl::new("pebble")
                .with_capability(Capability::Gettable)
                .within("chest"),
        ],
    })
    .unwrap()
}

/// A scheduler over `world` with one strategy per character, in roster
/// order.
pub fn scheduler(world: World, strategies: Vec<Box<dyn AgentStrategy>>) -> Scheduler {
    let roster: Vec<_> = world.characters().collect();
    let mut s = Scheduler::standard(world, SchedulerConfig::immediate()).unwrap();
    for (actor, strategy) in roster.into_iter().zip(strategies) {
        s.register(actor, strategy).unwrap();
    }
    s
}

/// Every thing's name, owner, and attributes, for comparing world states.
pub fn fingerprint(world: &World) -> Vec<String> {
    world
        .things()
        .map(|t| {
            let location = t.character().map(|c| c.location);
            format!(
                "{} {:?} {:?} {:?}",
                t.name,
                t.owner(),
                location,
                t.attributes()
            )
        })
        .collect()
}

/// The descriptions of a run, in order.
pub fn descriptions(events: &[Event]) -> Vec<String> {
    events.iter().map(|e| e.description.clone()).collect()
}
