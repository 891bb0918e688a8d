//! Primitive actions, event kinds, and event records.
//!
//! An `Action` is a single primitive state mutation processed by the action
//! queue. The "why" of a mutation is not stored on the action; it is
//! reconstructed as an `EventArguments` record when the action is applied
//! and broadcast to subscribed rule-objects.

use crate::damage::{DamageValue, FinalDamageValue};
use crate::dice::DiceColor;
use crate::element::Element;
use crate::ids::{ObjectId, PlayerId};
use crate::position::Area;
use crate::reaction::Reaction;

/// A target slot selected when playing a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub enum CardTarget {
    /// One of the playing player's own characters, by roster index.
    OwnCharacter(u8),
}

/// Direction of a forced character switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchDirection {
    Next,
    Prev,
}

/// A primitive state mutation.
///
/// Actions carry only the fields needed to mutate state; dispatch context
/// lives on the `EventArguments` built at execution time.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Nop,

    // ------------------------------------------------------------------
    // Object lifecycle
    // ------------------------------------------------------------------
    /// Instantiate a catalogue object (status or summon) by name and
    /// register it. The id is assigned at registration.
    CreateObject {
        player: PlayerId,
        area: Area,
        character_index: Option<u8>,
        name: String,
    },
    RemoveObject {
        id: ObjectId,
    },
    /// Move an object between areas of its owner (deck/hand/discard).
    MoveObject {
        id: ObjectId,
        to_area: Area,
    },
    ChangeObjectUsage {
        id: ObjectId,
        delta: i32,
    },

    // ------------------------------------------------------------------
    // Combat
    // ------------------------------------------------------------------
    /// Resolve a batch of damage/heal/application instances through the
    /// modifier pipeline and the reaction table.
    MakeDamage {
        source_player: PlayerId,
        values: Vec<DamageValue>,
    },
    ChargeEnergy {
        player: PlayerId,
        /// `None` targets the active character.
        character_index: Option<u8>,
        delta: i8,
    },
    SwitchCharacter {
        player: PlayerId,
        to_index: u8,
    },
    ForceSwitchCharacter {
        player: PlayerId,
        direction: SwitchDirection,
    },

    // ------------------------------------------------------------------
    // Resources and cards
    // ------------------------------------------------------------------
    CreateDice {
        player: PlayerId,
        color: DiceColor,
        count: u8,
    },
    RemoveDice {
        player: PlayerId,
        dice: Vec<DiceColor>,
    },
    DrawCard {
        player: PlayerId,
        count: u8,
    },
    /// Hand to discard.
    RemoveCard {
        player: PlayerId,
        hand_id: ObjectId,
    },
    /// Hand back into the deck (opening-hand replacement).
    RestoreCard {
        player: PlayerId,
        hand_id: ObjectId,
    },

    // ------------------------------------------------------------------
    // Player decisions (already validated)
    // ------------------------------------------------------------------
    /// Activate a skill; dice were already paid by a preceding
    /// `RemoveDice`, energy is handled by the expansion.
    UseSkill {
        player: PlayerId,
        character_index: u8,
        skill_index: u8,
    },
    PlayCard {
        player: PlayerId,
        hand_id: ObjectId,
        target: Option<CardTarget>,
    },
    ElementalTuning {
        player: PlayerId,
        hand_id: ObjectId,
        die: DiceColor,
    },
    DeclareRoundEnd {
        player: PlayerId,
    },
    /// Issue a mandatory post-defeat character choice to `player`.
    GenerateChooseCharacterRequest {
        player: PlayerId,
    },

    // ------------------------------------------------------------------
    // Flow
    // ------------------------------------------------------------------
    RoundStart,
    RollDice {
        player: PlayerId,
        count: u8,
    },
    BeginActionPhase,
    BeginEndPhase,
    /// Close the acting player's turn; hands over on a combat action.
    TurnEnd {
        player: PlayerId,
        combat_action: bool,
    },
    /// Sweep both rosters for defeated characters; may end the game or
    /// suspend for a post-defeat choice.
    CheckDefeated,
    GameEnd {
        winner: Option<PlayerId>,
    },
}

impl Action {
    /// The event kind broadcast after this action's mutation applies.
    pub fn event_kind(&self) -> EventKind {
        match self {
            Action::Nop => EventKind::Nop,
            Action::CreateObject { .. } => EventKind::AfterCreateObject,
            Action::RemoveObject { .. } => EventKind::AfterRemoveObject,
            Action::MoveObject { .. } => EventKind::AfterMoveObject,
            Action::ChangeObjectUsage { .. } => EventKind::AfterChangeObjectUsage,
            Action::MakeDamage { .. } => EventKind::AfterMakeDamage,
            Action::ChargeEnergy { .. } => EventKind::AfterChargeEnergy,
            Action::SwitchCharacter { .. } | Action::ForceSwitchCharacter { .. } => {
                EventKind::AfterSwitchCharacter
            }
            Action::CreateDice { .. } => EventKind::AfterCreateDice,
            Action::RemoveDice { .. } => EventKind::AfterRemoveDice,
            Action::DrawCard { .. } => EventKind::AfterDrawCard,
            Action::RemoveCard { .. } => EventKind::AfterRemoveCard,
            Action::RestoreCard { .. } => EventKind::AfterRestoreCard,
            Action::UseSkill { .. } => EventKind::AfterUseSkill,
            Action::PlayCard { .. } => EventKind::AfterPlayCard,
            Action::ElementalTuning { .. } => EventKind::AfterElementalTuning,
            Action::DeclareRoundEnd { .. } => EventKind::AfterDeclareRoundEnd,
            Action::GenerateChooseCharacterRequest { .. } => EventKind::Nop,
            Action::RoundStart => EventKind::OnRoundStart,
            Action::RollDice { .. } => EventKind::OnRollDice,
            Action::BeginActionPhase => EventKind::OnActionPhaseBegin,
            Action::BeginEndPhase => EventKind::OnEndPhase,
            Action::TurnEnd { .. } => EventKind::OnTurnEnd,
            Action::CheckDefeated => EventKind::Nop,
            Action::GameEnd { .. } => EventKind::OnGameEnd,
        }
    }

    /// The player whose action this is, when one is named.
    pub fn acting_player(&self) -> Option<PlayerId> {
        match self {
            Action::CreateObject { player, .. }
            | Action::MakeDamage {
                source_player: player,
                ..
            }
            | Action::ChargeEnergy { player, .. }
            | Action::SwitchCharacter { player, .. }
            | Action::ForceSwitchCharacter { player, .. }
            | Action::CreateDice { player, .. }
            | Action::RemoveDice { player, .. }
            | Action::DrawCard { player, .. }
            | Action::RemoveCard { player, .. }
            | Action::RestoreCard { player, .. }
            | Action::UseSkill { player, .. }
            | Action::PlayCard { player, .. }
            | Action::ElementalTuning { player, .. }
            | Action::DeclareRoundEnd { player }
            | Action::GenerateChooseCharacterRequest { player }
            | Action::RollDice { player, .. }
            | Action::TurnEnd { player, .. } => Some(*player),
            _ => None,
        }
    }
}

/// Kinds of events rule-objects can subscribe to. Each action kind maps to
/// exactly one event kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Never dispatched; the kind of actions with no observable event.
    Nop,
    AfterCreateObject,
    AfterRemoveObject,
    AfterMoveObject,
    AfterChangeObjectUsage,
    AfterMakeDamage,
    AfterChargeEnergy,
    AfterSwitchCharacter,
    AfterCreateDice,
    AfterRemoveDice,
    AfterDrawCard,
    AfterRemoveCard,
    AfterRestoreCard,
    AfterUseSkill,
    AfterPlayCard,
    AfterElementalTuning,
    AfterDeclareRoundEnd,
    OnRoundStart,
    OnRollDice,
    OnActionPhaseBegin,
    OnEndPhase,
    OnTurnEnd,
    OnGameEnd,
}

/// The event record broadcast to subscribers: the triggering action plus
/// the dispatch context reconstructed while applying it.
#[derive(Debug, Clone, PartialEq)]
pub struct EventArguments {
    pub kind: EventKind,
    pub action: Action,
    pub acting_player: Option<PlayerId>,
    /// Hand sizes per player before/after the mutation.
    pub hand_size_before: [u8; 2],
    pub hand_size_after: [u8; 2],
    /// Per-instance damage outcomes (only for `AfterMakeDamage`).
    pub damages: Vec<FinalDamageValue>,
    /// The reaction fired by the leading damage instance, if any.
    pub reaction: Option<Reaction>,
}

impl EventArguments {
    pub fn new(kind: EventKind, action: Action) -> Self {
        let acting_player = action.acting_player();
        Self {
            kind,
            action,
            acting_player,
            hand_size_before: [0, 0],
            hand_size_after: [0, 0],
            damages: Vec::new(),
            reaction: None,
        }
    }
}

/// The resolved target of the damage instance currently in the modifier
/// pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DamageTargetInfo {
    pub player: PlayerId,
    pub character_index: u8,
    pub id: ObjectId,
}

/// Read-only context handed to a rule-object alongside an event or a
/// modifier resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct EventContext {
    /// The position of the object being consulted.
    pub own_position: crate::position::ObjectPosition,
    pub round: u32,
    pub current_player: PlayerId,
    /// Active character roster index per player.
    pub active_character: [Option<u8>; 2],
    /// Active character element per player, when one is set.
    pub active_element: [Option<Element>; 2],
    /// Set only while a damage instance is being piped through modifiers.
    pub damage_target: Option<DamageTargetInfo>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_event_kind_mapping() {
        assert_eq!(
            Action::DrawCard {
                player: PlayerId::P0,
                count: 2
            }
            .event_kind(),
            EventKind::AfterDrawCard
        );
        assert_eq!(
            Action::ForceSwitchCharacter {
                player: PlayerId::P1,
                direction: SwitchDirection::Next
            }
            .event_kind(),
            EventKind::AfterSwitchCharacter
        );
        assert_eq!(Action::CheckDefeated.event_kind(), EventKind::Nop);
    }

    #[test]
    fn test_acting_player() {
        assert_eq!(
            Action::DeclareRoundEnd { player: PlayerId::P1 }.acting_player(),
            Some(PlayerId::P1)
        );
        assert_eq!(Action::RoundStart.acting_player(), None);
        assert_eq!(Action::BeginEndPhase.acting_player(), None);
    }
}
