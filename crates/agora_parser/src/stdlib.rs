//! Standard library for adventure games.
//!
//! Contains the default action set. Each action is generic over the
//! capability its slots require, so any thing tagged *openable* can be
//! opened, any *container* filled, and so on.

use agora_foundation::capability::{IS_ACTIVE, IS_LOCKED, IS_OPEN, KEY};
use agora_foundation::{Capability, Error, ErrorKind, Result, Value};
use agora_world::Owner;

use crate::action::{ActionContext, ActionDef, ActionRegistry, EffectContext, Refusal};
use crate::perception::{describe_surroundings, describe_thing, list_names};
use crate::scope::SlotScope;

type Check = std::result::Result<(), Refusal>;

/// Builds the standard action registry.
///
/// Declaration order matters: among patterns of equal specificity, the
/// earlier action wins.
///
/// # Errors
///
/// Returns a configuration error if any definition is invalid.
pub fn standard_actions() -> Result<ActionRegistry> {
    let mut registry = ActionRegistry::new();
    for def in definitions() {
        registry.register(def)?;
    }
    Ok(registry)
}

fn definitions() -> Vec<ActionDef> {
    vec![
        // Looking
        ActionDef::new("look", look)
            .pattern("look")
            .pattern("l")
            .pattern("look around")
            .keeps_turn()
            .read_only(),
        ActionDef::new("examine", examine)
            .pattern("examine {item}")
            .pattern("x {item}")
            .pattern("look at {item}")
            .pattern("inspect {item}")
            .keeps_turn()
            .read_only(),
        ActionDef::new("inventory", inventory)
            .pattern("inventory")
            .pattern("i")
            .pattern("inv")
            .keeps_turn()
            .read_only(),
        // Movement
        ActionDef::new("go", go)
            .pattern("go {direction}")
            .pattern("walk {direction}")
            .pattern("{direction}")
            .precondition(can_go),
        // Manipulation
        ActionDef::new("get", get)
            .pattern("get {item}")
            .pattern("take {item}")
            .pattern("grab {item}")
            .pattern("pick up {item}")
            .scope("item", SlotScope::Nearby)
            .requires("item", Capability::Gettable),
        ActionDef::new("drop", drop)
            .pattern("drop {item}")
            .pattern("put down {item}")
            .scope("item", SlotScope::Held)
            .requires("item", Capability::Gettable),
        ActionDef::new("place in", place_in)
            .pattern("place {item} in {recipient}")
            .pattern("put {item} in {recipient}")
            .pattern("put {item} into {recipient}")
            .scope("item", SlotScope::Held)
            .requires("item", Capability::Gettable)
            .requires("recipient", Capability::Container)
            .precondition(can_place_in),
        ActionDef::new("place on", place_on)
            .pattern("place {item} on {recipient}")
            .pattern("put {item} on {recipient}")
            .pattern("put {item} onto {recipient}")
            .scope("item", SlotScope::Held)
            .requires("item", Capability::Gettable)
            .requires("recipient", Capability::Surface)
            .precondition(can_place_on),
        ActionDef::new("give", give)
            .pattern("give {item} to {recipient}")
            .pattern("hand {item} to {recipient}")
            .scope("item", SlotScope::Held)
            .scope("recipient", SlotScope::Nearby)
            .requires("item", Capability::Gettable)
            .precondition(can_give),
        // Containers and doors
        ActionDef::new("open", open)
            .pattern("open {item}")
            .requires("item", Capability::Openable)
            .precondition(can_open),
        ActionDef::new("close", close)
            .pattern("close {item}")
            .pattern("shut {item}")
            .requires("item", Capability::Openable)
            .precondition(can_close),
        ActionDef::new("unlock", unlock)
            .pattern("unlock {item} with {key}")
            .requires("item", Capability::Lockable)
            .scope("key", SlotScope::Held)
            .precondition(can_unlock),
        ActionDef::new("lock", lock)
            .pattern("lock {item} with {key}")
            .requires("item", Capability::Lockable)
            .scope("key", SlotScope::Held)
            .precondition(can_lock),
        // Consumables and devices
        ActionDef::new("eat", eat)
            .pattern("eat {item}")
            .pattern("consume {item}")
            .pattern("drink {item}")
            .requires("item", Capability::Consumable),
        ActionDef::new("turn on", turn_on)
            .pattern("turn on {item}")
            .pattern("switch on {item}")
            .pattern("activate {item}")
            .requires("item", Capability::Activatable)
            .precondition(can_turn_on),
        ActionDef::new("turn off", turn_off)
            .pattern("turn off {item}")
            .pattern("switch off {item}")
            .pattern("deactivate {item}")
            .requires("item", Capability::Activatable)
            .precondition(can_turn_off),
        // Meta
        ActionDef::new("wait", wait)
            .pattern("wait")
            .pattern("z")
            .read_only(),
    ]
}

// =============================================================================
// Looking
// =============================================================================

fn look(ctx: &mut EffectContext<'_>) -> Result<String> {
    describe_surroundings(ctx.world, ctx.actor)
}

fn examine(ctx: &mut EffectContext<'_>) -> Result<String> {
    describe_thing(ctx.world, ctx.target("item")?)
}

fn inventory(ctx: &mut EffectContext<'_>) -> Result<String> {
    let held = ctx.world.contents_of(Owner::Character(ctx.actor));
    if held.is_empty() {
        Ok("You are empty-handed.".to_string())
    } else {
        Ok(format!("You are carrying: {}.", list_names(ctx.world, &held)))
    }
}

// =============================================================================
// Movement
// =============================================================================

fn can_go(ctx: &ActionContext<'_>) -> Check {
    let destination = ctx.targets.direction().and_then(|dir| {
        let here = ctx.location()?;
        ctx.world.location(here).ok()?.exit(dir)
    });
    match destination {
        Some(_) => Ok(()),
        None => Err(Refusal::new("You can't go that way.")),
    }
}

fn go(ctx: &mut EffectContext<'_>) -> Result<String> {
    let here = ctx.location()?;
    let direction = ctx.targets.direction().unwrap_or_default().to_string();
    let to = ctx
        .world
        .location(here)?
        .exit(&direction)
        .ok_or_else(|| Error::new(ErrorKind::Internal(format!("no exit {direction}"))))?;
    ctx.world.move_character(ctx.actor, to)?;
    let arrival = format!(
        "You go {direction} to {}.",
        ctx.world.location(to)?.name
    );
    Ok(format!(
        "{arrival}\n\n{}",
        describe_surroundings(ctx.world, ctx.actor)?
    ))
}

// =============================================================================
// Manipulation
// =============================================================================

fn get(ctx: &mut EffectContext<'_>) -> Result<String> {
    let item = ctx.target("item")?;
    ctx.world.move_thing(item, Owner::Character(ctx.actor))?;
    Ok(format!("You take the {}.", ctx.name(item)))
}

fn drop(ctx: &mut EffectContext<'_>) -> Result<String> {
    let item = ctx.target("item")?;
    let here = ctx.location()?;
    ctx.world.move_thing(item, Owner::Location(here))?;
    Ok(format!("You drop the {}.", ctx.name(item)))
}

fn can_place(ctx: &ActionContext<'_>) -> Check {
    let item = ctx.require("item")?;
    let recipient = ctx.require("recipient")?;
    if item.id == recipient.id || ctx.world.is_within(recipient.id, item.id) {
        return Err(Refusal::new(format!(
            "You can't put the {} inside itself.",
            item.name
        )));
    }
    Ok(())
}

fn can_place_in(ctx: &ActionContext<'_>) -> Check {
    can_place(ctx)?;
    let recipient = ctx.require("recipient")?;
    if !recipient.exposes_contents() {
        return Err(Refusal::new(format!("The {} is closed.", recipient.name)));
    }
    Ok(())
}

fn can_place_on(ctx: &ActionContext<'_>) -> Check {
    can_place(ctx)
}

fn place_in(ctx: &mut EffectContext<'_>) -> Result<String> {
    let item = ctx.target("item")?;
    let recipient = ctx.target("recipient")?;
    ctx.world.move_thing(item, Owner::Container(recipient))?;
    Ok(format!(
        "You put the {} in the {}.",
        ctx.name(item),
        ctx.name(recipient)
    ))
}

fn place_on(ctx: &mut EffectContext<'_>) -> Result<String> {
    let item = ctx.target("item")?;
    let recipient = ctx.target("recipient")?;
    ctx.world.move_thing(item, Owner::Container(recipient))?;
    Ok(format!(
        "You put the {} on the {}.",
        ctx.name(item),
        ctx.name(recipient)
    ))
}

fn can_give(ctx: &ActionContext<'_>) -> Check {
    let recipient = ctx.require("recipient")?;
    if !recipient.is_character() || recipient.id == ctx.actor {
        return Err(Refusal::new(format!(
            "You can't give anything to the {}.",
            recipient.name
        )));
    }
    Ok(())
}

fn give(ctx: &mut EffectContext<'_>) -> Result<String> {
    let item = ctx.target("item")?;
    let recipient = ctx.target("recipient")?;
    ctx.world.move_thing(item, Owner::Character(recipient))?;
    Ok(format!(
        "You give the {} to {}.",
        ctx.name(item),
        ctx.name(recipient)
    ))
}

// =============================================================================
// Containers and doors
// =============================================================================

fn can_open(ctx: &ActionContext<'_>) -> Check {
    let item = ctx.require("item")?;
    if item.flag(IS_OPEN) {
        return Err(Refusal::new(format!("The {} is already open.", item.name)));
    }
    if item.has(Capability::Lockable) && item.flag(IS_LOCKED) {
        return Err(Refusal::new(format!("The {} is locked.", item.name)));
    }
    Ok(())
}

fn open(ctx: &mut EffectContext<'_>) -> Result<String> {
    let item = ctx.target("item")?;
    ctx.world.set_attribute(item, IS_OPEN, Value::Bool(true))?;
    let mut text = format!("You open the {}.", ctx.name(item));
    let thing = ctx.world.thing(item)?;
    if thing.holds_things() {
        let inside: Vec<_> = thing.contents().collect();
        if inside.is_empty() {
            text.push_str(" It is empty.");
        } else {
            text.push_str(&format!(" Inside you see: {}.", list_names(ctx.world, &inside)));
        }
    }
    Ok(text)
}

fn can_close(ctx: &ActionContext<'_>) -> Check {
    let item = ctx.require("item")?;
    if !item.flag(IS_OPEN) {
        return Err(Refusal::new(format!("The {} is already closed.", item.name)));
    }
    Ok(())
}

fn close(ctx: &mut EffectContext<'_>) -> Result<String> {
    let item = ctx.target("item")?;
    ctx.world.set_attribute(item, IS_OPEN, Value::Bool(false))?;
    Ok(format!("You close the {}.", ctx.name(item)))
}

fn check_key(ctx: &ActionContext<'_>) -> Check {
    let item = ctx.require("item")?;
    let key = ctx.require("key")?;
    let fits = item
        .attribute(KEY)
        .and_then(Value::as_text)
        .is_some_and(|name| key.is_named(name));
    if fits {
        Ok(())
    } else {
        Err(Refusal::new(format!(
            "The {} doesn't fit the {}.",
            key.name, item.name
        )))
    }
}

fn can_unlock(ctx: &ActionContext<'_>) -> Check {
    let item = ctx.require("item")?;
    if !item.flag(IS_LOCKED) {
        return Err(Refusal::new(format!("The {} is already unlocked.", item.name)));
    }
    check_key(ctx)
}

fn unlock(ctx: &mut EffectContext<'_>) -> Result<String> {
    let item = ctx.target("item")?;
    let key = ctx.target("key")?;
    ctx.world.set_attribute(item, IS_LOCKED, Value::Bool(false))?;
    Ok(format!(
        "You unlock the {} with the {}.",
        ctx.name(item),
        ctx.name(key)
    ))
}

fn can_lock(ctx: &ActionContext<'_>) -> Check {
    let item = ctx.require("item")?;
    if item.flag(IS_LOCKED) {
        return Err(Refusal::new(format!("The {} is already locked.", item.name)));
    }
    if item.has(Capability::Openable) && item.flag(IS_OPEN) {
        return Err(Refusal::new(format!(
            "You need to close the {} first.",
            item.name
        )));
    }
    check_key(ctx)
}

fn lock(ctx: &mut EffectContext<'_>) -> Result<String> {
    let item = ctx.target("item")?;
    let key = ctx.target("key")?;
    ctx.world.set_attribute(item, IS_LOCKED, Value::Bool(true))?;
    Ok(format!(
        "You lock the {} with the {}.",
        ctx.name(item),
        ctx.name(key)
    ))
}

// =============================================================================
// Consumables and devices
// =============================================================================

fn eat(ctx: &mut EffectContext<'_>) -> Result<String> {
    let item = ctx.target("item")?;
    let name = ctx.name(item);
    ctx.world.remove_thing(item)?;
    Ok(format!("You consume the {name}."))
}

fn can_turn_on(ctx: &ActionContext<'_>) -> Check {
    let item = ctx.require("item")?;
    if item.flag(IS_ACTIVE) {
        return Err(Refusal::new(format!("The {} is already on.", item.name)));
    }
    Ok(())
}

fn turn_on(ctx: &mut EffectContext<'_>) -> Result<String> {
    let item = ctx.target("item")?;
    ctx.world.set_attribute(item, IS_ACTIVE, Value::Bool(true))?;
    Ok(format!("You turn on the {}.", ctx.name(item)))
}

fn can_turn_off(ctx: &ActionContext<'_>) -> Check {
    let item = ctx.require("item")?;
    if !item.flag(IS_ACTIVE) {
        return Err(Refusal::new(format!("The {} is already off.", item.name)));
    }
    Ok(())
}

fn turn_off(ctx: &mut EffectContext<'_>) -> Result<String> {
    let item = ctx.target("item")?;
    ctx.world.set_attribute(item, IS_ACTIVE, Value::Bool(false))?;
    Ok(format!("You turn off the {}.", ctx.name(item)))
}

// =============================================================================
// Meta
// =============================================================================

fn wait(_: &mut EffectContext<'_>) -> Result<String> {
    Ok("You wait. Time passes.".to_string())
}
