//! The rule-object capability surface.
//!
//! Every live game entity (character, card, status, summon, support,
//! system handler) is a rule-object tracked by the registry. The engine
//! dispatches to them through one small interface: a declared event
//! subscription set with a handler, and a declared modifier set with a
//! value-adjustment hook. Per-variant state is plain data; the full set of
//! variants is closed and enumerated by `GameObject`.

use crate::action::{Action, EventArguments, EventContext, EventKind};
use crate::catalogue::cards::CardState;
use crate::catalogue::statuses::StatusObject;
use crate::catalogue::summons::SummonObject;
use crate::catalogue::supports::SupportObject;
use crate::character::CharacterState;
use crate::modifier::{ModifiableValue, ModifierKind, ResolveMode};
use crate::position::ObjectPosition;
use crate::system::SystemHandler;

/// Sub-kind of a card object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub enum CardKind {
    Event,
    Support,
    Artifact,
    Weapon,
    Talent,
}

/// Scope of a status object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusScope {
    /// Attached to a specific character slot.
    Character,
    /// Attached to the player's whole team.
    Team,
}

/// The closed set of rule-object kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    Character,
    Card(CardKind),
    Status(StatusScope),
    Summon,
    Support,
    SystemHandler,
}

/// The capability interface every rule-object implements.
///
/// Handlers return actions rather than mutating the match; the action
/// processor front-inserts what they return, which is what makes cascade
/// order an explicit data structure.
pub trait RuleObject: std::fmt::Debug {
    fn name(&self) -> &str;

    fn kind(&self) -> ObjectKind;

    fn position(&self) -> ObjectPosition;

    fn set_position(&mut self, position: ObjectPosition);

    /// Event kinds this object must be consulted on.
    fn listens(&self) -> Vec<EventKind> {
        Vec::new()
    }

    /// Value kinds this object contributes modifiers for.
    fn modifier_kinds(&self) -> Vec<ModifierKind> {
        Vec::new()
    }

    /// React to a dispatched event with zero or more follow-up actions.
    fn handle_event(&mut self, _args: &EventArguments, _ctx: &EventContext) -> Vec<Action> {
        Vec::new()
    }

    /// Adjust a candidate value, or leave it untouched when the guard does
    /// not apply. Must not mutate own state in `ResolveMode::Test`.
    fn modify_value(
        &mut self,
        _kind: ModifierKind,
        _value: &mut ModifiableValue,
        _ctx: &EventContext,
        _mode: ResolveMode,
    ) {
    }

    /// Remaining-uses counter; `None` for objects without one. Objects
    /// whose counter reaches zero are removed by the post-dispatch sweep.
    fn usage(&self) -> Option<i32> {
        None
    }

    fn set_usage(&mut self, _usage: i32) {}

    /// Whether this object forbids its character from using skills
    /// (frozen and similar lockdowns).
    fn blocks_skills(&self) -> bool {
        false
    }
}

/// A rule-object in the arena: the closed variant set.
#[derive(Debug)]
pub enum GameObject {
    Character(CharacterState),
    Card(CardState),
    Status(StatusObject),
    Summon(SummonObject),
    Support(SupportObject),
    System(SystemHandler),
}

impl GameObject {
    fn inner(&self) -> &dyn RuleObject {
        match self {
            GameObject::Character(o) => o,
            GameObject::Card(o) => o,
            GameObject::Status(o) => o,
            GameObject::Summon(o) => o,
            GameObject::Support(o) => o,
            GameObject::System(o) => o,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn RuleObject {
        match self {
            GameObject::Character(o) => o,
            GameObject::Card(o) => o,
            GameObject::Status(o) => o,
            GameObject::Summon(o) => o,
            GameObject::Support(o) => o,
            GameObject::System(o) => o,
        }
    }

    pub fn as_character(&self) -> Option<&CharacterState> {
        match self {
            GameObject::Character(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_character_mut(&mut self) -> Option<&mut CharacterState> {
        match self {
            GameObject::Character(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_card(&self) -> Option<&CardState> {
        match self {
            GameObject::Card(c) => Some(c),
            _ => None,
        }
    }
}

impl RuleObject for GameObject {
    fn name(&self) -> &str {
        self.inner().name()
    }

    fn kind(&self) -> ObjectKind {
        self.inner().kind()
    }

    fn position(&self) -> ObjectPosition {
        self.inner().position()
    }

    fn set_position(&mut self, position: ObjectPosition) {
        self.inner_mut().set_position(position);
    }

    fn listens(&self) -> Vec<EventKind> {
        self.inner().listens()
    }

    fn modifier_kinds(&self) -> Vec<ModifierKind> {
        self.inner().modifier_kinds()
    }

    fn handle_event(&mut self, args: &EventArguments, ctx: &EventContext) -> Vec<Action> {
        self.inner_mut().handle_event(args, ctx)
    }

    fn modify_value(
        &mut self,
        kind: ModifierKind,
        value: &mut ModifiableValue,
        ctx: &EventContext,
        mode: ResolveMode,
    ) {
        self.inner_mut().modify_value(kind, value, ctx, mode);
    }

    fn usage(&self) -> Option<i32> {
        self.inner().usage()
    }

    fn set_usage(&mut self, usage: i32) {
        self.inner_mut().set_usage(usage);
    }

    fn blocks_skills(&self) -> bool {
        self.inner().blocks_skills()
    }
}
