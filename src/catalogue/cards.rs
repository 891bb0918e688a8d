//! Action card definitions.
//!
//! A card is data: a cost, a play requirement, and a list of declarative
//! effects the processor expands into primitive actions. Card objects in
//! the deck/hand/discard carry their definition with them.

use crate::cost::{Cost, CostLabel};
use crate::dice::DiceColor;
use crate::object::{CardKind, ObjectKind, RuleObject};
use crate::position::ObjectPosition;

/// A precondition checked when computing whether a card is playable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardRequirement {
    None,
    /// One of the playing side's characters was defeated this round.
    DiedThisRound,
    /// Must target an own alive character; optionally one not yet satiated.
    OwnCharacter { not_satiated: bool },
    /// Must target the named own character (talent equips).
    NamedCharacter(&'static str),
}

impl CardRequirement {
    /// Whether playing this card selects a character target.
    pub fn needs_target(self) -> bool {
        matches!(
            self,
            CardRequirement::OwnCharacter { .. } | CardRequirement::NamedCharacter(_)
        )
    }
}

/// A declarative card effect, expanded by the processor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardEffect {
    Draw(u8),
    /// Heal the chosen character target.
    HealTarget(u8),
    /// Attach a character status to the chosen target.
    StatusOnTarget(&'static str),
    /// Equip a talent or weapon status on the chosen target.
    EquipOnTarget(&'static str),
    /// Charge the active character's energy.
    ChargeActive(i8),
    /// Add omni dice to the pool.
    OmniDice(u8),
    /// Create a team status on the playing side.
    TeamStatus(&'static str),
    /// Place a named support in the support zone.
    Support(&'static str),
}

/// Static card data, resolved from the catalogue by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardDefinition {
    pub name: &'static str,
    pub version: &'static str,
    pub kind: CardKind,
    pub cost: Cost,
    pub requirement: CardRequirement,
    pub effects: Vec<CardEffect>,
}

/// A card object in a deck, hand, or discard pile.
#[derive(Debug, Clone)]
pub struct CardState {
    definition: CardDefinition,
    position: ObjectPosition,
}

impl CardState {
    pub fn new(definition: CardDefinition, position: ObjectPosition) -> Self {
        Self {
            definition,
            position,
        }
    }

    pub fn definition(&self) -> &CardDefinition {
        &self.definition
    }
}

impl RuleObject for CardState {
    fn name(&self) -> &str {
        self.definition.name
    }

    fn kind(&self) -> ObjectKind {
        ObjectKind::Card(self.definition.kind)
    }

    fn position(&self) -> ObjectPosition {
        self.position
    }

    fn set_position(&mut self, position: ObjectPosition) {
        self.position = position;
    }
}

/// Resolve a card definition by name.
pub fn card_definition(name: &str) -> Option<CardDefinition> {
    let def = |name: &'static str,
               kind: CardKind,
               cost: Cost,
               requirement: CardRequirement,
               effects: Vec<CardEffect>| {
        let label = cost.label.union(CostLabel::CARD);
        CardDefinition {
            name,
            version: "1.0",
            kind,
            cost: cost.with_label(label),
            requirement,
            effects,
        }
    };
    match name {
        "Strategize" => Some(def(
            "Strategize",
            CardKind::Event,
            Cost::any(1),
            CardRequirement::None,
            vec![CardEffect::Draw(2)],
        )),
        "Sweet Madame" => Some(def(
            "Sweet Madame",
            CardKind::Event,
            Cost::free().with_label(CostLabel::FOOD),
            CardRequirement::OwnCharacter { not_satiated: true },
            vec![CardEffect::HealTarget(1), CardEffect::StatusOnTarget("Satiated")],
        )),
        "Starsigns" => Some(def(
            "Starsigns",
            CardKind::Event,
            Cost::any(2),
            CardRequirement::None,
            vec![CardEffect::ChargeActive(1)],
        )),
        "The Bestest Travel Companion!" => Some(def(
            "The Bestest Travel Companion!",
            CardKind::Event,
            Cost::any(2),
            CardRequirement::None,
            vec![CardEffect::OmniDice(2)],
        )),
        "Changing Shifts" => Some(def(
            "Changing Shifts",
            CardKind::Event,
            Cost::free(),
            CardRequirement::None,
            vec![CardEffect::TeamStatus("Changing Shifts")],
        )),
        "Leave It to Me!" => Some(def(
            "Leave It to Me!",
            CardKind::Event,
            Cost::free(),
            CardRequirement::None,
            vec![CardEffect::TeamStatus("Leave It to Me!")],
        )),
        "I Haven't Lost Yet!" => Some(def(
            "I Haven't Lost Yet!",
            CardKind::Event,
            Cost::free(),
            CardRequirement::DiedThisRound,
            vec![CardEffect::OmniDice(1), CardEffect::ChargeActive(1)],
        )),
        "Cold-Blooded Strike" => Some(def(
            "Cold-Blooded Strike",
            CardKind::Talent,
            Cost::elemental(DiceColor::Cryo, 4).with_label(CostLabel::TALENT),
            CardRequirement::NamedCharacter("Kaeya"),
            vec![CardEffect::EquipOnTarget("Cold-Blooded Strike")],
        )),
        "Paimon" => Some(def(
            "Paimon",
            CardKind::Support,
            Cost::any(3),
            CardRequirement::None,
            vec![CardEffect::Support("Paimon")],
        )),
        "Favonius Cathedral" => Some(def(
            "Favonius Cathedral",
            CardKind::Support,
            Cost::any(2),
            CardRequirement::None,
            vec![CardEffect::Support("Favonius Cathedral")],
        )),
        "Liyue Harbor Wharf" => Some(def(
            "Liyue Harbor Wharf",
            CardKind::Support,
            Cost::any(2),
            CardRequirement::None,
            vec![CardEffect::Support("Liyue Harbor Wharf")],
        )),
        "Mondstadt Hash Brown" => Some(def(
            "Mondstadt Hash Brown",
            CardKind::Event,
            Cost::any(1).with_label(CostLabel::FOOD),
            CardRequirement::OwnCharacter { not_satiated: true },
            vec![CardEffect::HealTarget(2), CardEffect::StatusOnTarget("Satiated")],
        )),
        "Northern Smoked Chicken" => Some(def(
            "Northern Smoked Chicken",
            CardKind::Event,
            Cost::free().with_label(CostLabel::FOOD),
            CardRequirement::OwnCharacter { not_satiated: true },
            vec![
                CardEffect::StatusOnTarget("Northern Smoked Chicken"),
                CardEffect::StatusOnTarget("Satiated"),
            ],
        )),
        "Lotus Flower Crisp" => Some(def(
            "Lotus Flower Crisp",
            CardKind::Event,
            Cost::any(1).with_label(CostLabel::FOOD),
            CardRequirement::OwnCharacter { not_satiated: true },
            vec![
                CardEffect::StatusOnTarget("Lotus Flower Crisp"),
                CardEffect::StatusOnTarget("Satiated"),
            ],
        )),
        "Adeptus' Temptation" => Some(def(
            "Adeptus' Temptation",
            CardKind::Event,
            Cost::any(2).with_label(CostLabel::FOOD),
            CardRequirement::OwnCharacter { not_satiated: true },
            vec![
                CardEffect::StatusOnTarget("Adeptus' Temptation"),
                CardEffect::StatusOnTarget("Satiated"),
            ],
        )),
        "Traveler's Handy Sword" => Some(def(
            "Traveler's Handy Sword",
            CardKind::Weapon,
            Cost::any(2),
            CardRequirement::OwnCharacter { not_satiated: false },
            vec![CardEffect::EquipOnTarget("Traveler's Handy Sword")],
        )),
        _ => None,
    }
}

/// Every card name in the standard catalogue.
pub fn all_card_names() -> Vec<&'static str> {
    vec![
        "Strategize",
        "Sweet Madame",
        "Mondstadt Hash Brown",
        "Northern Smoked Chicken",
        "Lotus Flower Crisp",
        "Adeptus' Temptation",
        "Starsigns",
        "The Bestest Travel Companion!",
        "Changing Shifts",
        "Leave It to Me!",
        "I Haven't Lost Yet!",
        "Cold-Blooded Strike",
        "Traveler's Handy Sword",
        "Paimon",
        "Favonius Cathedral",
        "Liyue Harbor Wharf",
    ]
}
