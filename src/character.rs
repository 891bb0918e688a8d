//! Character sheets: definitions (static data) and in-match state.

use crate::cost::{Cost, CostLabel};
use crate::element::{Aura, DamageType, Element};
use crate::object::{ObjectKind, RuleObject};
use crate::position::ObjectPosition;

/// The three active skill slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub enum SkillKind {
    NormalAttack,
    ElementalSkill,
    ElementalBurst,
}

impl SkillKind {
    pub fn cost_label(self) -> CostLabel {
        match self {
            SkillKind::NormalAttack => CostLabel::NORMAL_ATTACK,
            SkillKind::ElementalSkill => CostLabel::ELEMENTAL_SKILL,
            SkillKind::ElementalBurst => CostLabel::ELEMENTAL_BURST,
        }
    }
}

/// What a skill creates besides its damage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Creation {
    /// A status attached to the user's own character slot.
    CharacterStatus(&'static str),
    TeamStatus(&'static str),
    Summon(&'static str),
}

/// One skill on a character sheet. Effects are data: base damage, healing,
/// creations; the processor expands them into primitive actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillDefinition {
    pub name: &'static str,
    pub kind: SkillKind,
    pub cost: Cost,
    /// Base damage to the opposing active character (0 for pure utility).
    pub damage: u8,
    pub damage_type: DamageType,
    /// Healing applied to the user's own active character.
    pub heal: u8,
    pub creates: Vec<Creation>,
}

impl SkillDefinition {
    pub fn new(name: &'static str, kind: SkillKind, cost: Cost) -> Self {
        Self {
            name,
            kind,
            cost: cost.with_label(kind.cost_label()),
            damage: 0,
            damage_type: DamageType::Physical,
            heal: 0,
            creates: Vec::new(),
        }
    }

    pub fn dealing(mut self, damage: u8, damage_type: DamageType) -> Self {
        self.damage = damage;
        self.damage_type = damage_type;
        self
    }

    pub fn healing(mut self, heal: u8) -> Self {
        self.heal = heal;
        self
    }

    pub fn creating(mut self, creation: Creation) -> Self {
        self.creates.push(creation);
        self
    }
}

/// Static character data, resolved from the catalogue by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterDefinition {
    pub name: &'static str,
    pub version: &'static str,
    pub element: Element,
    pub faction: &'static str,
    pub max_hp: u8,
    pub max_charge: u8,
    pub skills: Vec<SkillDefinition>,
}

/// A character in a match: the definition plus mutable combat state.
#[derive(Debug, Clone)]
pub struct CharacterState {
    definition: CharacterDefinition,
    position: ObjectPosition,
    pub hp: u8,
    pub charge: u8,
    pub aura: Aura,
    pub alive: bool,
    /// Set once the defeat sweep has cleaned this character up, so the
    /// sweep stays idempotent across repeated checks.
    pub defeat_handled: bool,
}

impl CharacterState {
    pub fn new(definition: CharacterDefinition, position: ObjectPosition) -> Self {
        let hp = definition.max_hp;
        Self {
            definition,
            position,
            hp,
            charge: 0,
            aura: Aura::new(),
            alive: true,
            defeat_handled: false,
        }
    }

    pub fn definition(&self) -> &CharacterDefinition {
        &self.definition
    }

    pub fn element(&self) -> Element {
        self.definition.element
    }

    pub fn max_hp(&self) -> u8 {
        self.definition.max_hp
    }

    pub fn max_charge(&self) -> u8 {
        self.definition.max_charge
    }

    pub fn skill(&self, index: u8) -> Option<&SkillDefinition> {
        self.definition.skills.get(index as usize)
    }

    /// Apply a hp loss, marking defeat at zero.
    pub fn take_damage(&mut self, amount: u8) {
        self.hp = self.hp.saturating_sub(amount);
        if self.hp == 0 {
            self.alive = false;
        }
    }

    pub fn heal(&mut self, amount: u8) {
        if self.alive {
            self.hp = (self.hp + amount).min(self.definition.max_hp);
        }
    }

    pub fn gain_charge(&mut self, delta: i8) {
        if delta >= 0 {
            self.charge = (self.charge + delta as u8).min(self.definition.max_charge);
        } else {
            self.charge = self.charge.saturating_sub((-delta) as u8);
        }
    }

    /// Defeat bookkeeping: energy, aura and liveness are wiped.
    pub fn mark_defeated(&mut self) {
        self.hp = 0;
        self.charge = 0;
        self.aura.clear();
        self.alive = false;
    }
}

impl RuleObject for CharacterState {
    fn name(&self) -> &str {
        self.definition.name
    }

    fn kind(&self) -> ObjectKind {
        ObjectKind::Character
    }

    fn position(&self) -> ObjectPosition {
        self.position
    }

    fn set_position(&mut self, position: ObjectPosition) {
        self.position = position;
    }
}
