//! The content catalogue: every character, card, status, summon and
//! support definition, resolved by name.
//!
//! Content is plug-in data behind the rule-object capability interface;
//! the engine reaches it only through the lookup functions here. A lookup
//! miss while processing an action is a content bug and surfaces as a
//! fatal match error, never a silent fallback.

pub mod cards;
pub mod characters;
pub mod statuses;
pub mod summons;
pub mod supports;

use crate::character::CharacterDefinition;
use crate::position::ObjectPosition;

pub use cards::{CardDefinition, CardEffect, CardRequirement, CardState, all_card_names};
pub use characters::all_character_names;
pub use statuses::{StatusObject, create_status};
pub use summons::{SummonObject, create_summon};
pub use supports::{SupportObject, create_support};

/// Resolve a character definition, optionally pinned to a version tag.
pub fn character_definition(name: &str, version: Option<&str>) -> Option<CharacterDefinition> {
    let def = characters::character_definition(name)?;
    match version {
        Some(v) if v != def.version => None,
        _ => Some(def),
    }
}

/// Resolve a card definition, optionally pinned to a version tag.
pub fn card_definition(name: &str, version: Option<&str>) -> Option<CardDefinition> {
    let def = cards::card_definition(name)?;
    match version {
        Some(v) if v != def.version => None,
        _ => Some(def),
    }
}

/// Instantiate a status, summon or support by name, trying each family in
/// turn. Used by `Action::CreateObject` processing.
pub fn instantiate(
    name: &str,
    position: ObjectPosition,
) -> Option<crate::object::GameObject> {
    use crate::object::GameObject;
    if let Some(status) = statuses::create_status(name, position) {
        return Some(GameObject::Status(status));
    }
    if let Some(summon) = summons::create_summon(name, position) {
        return Some(GameObject::Summon(summon));
    }
    if let Some(support) = supports::create_support(name, position) {
        return Some(GameObject::Support(support));
    }
    None
}
