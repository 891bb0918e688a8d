//! Damage, healing and element-application value records.

use crate::cost::CostLabel;
use crate::element::{DamageType, Element};
use crate::ids::ObjectId;
use crate::position::ObjectPosition;
use crate::reaction::Reaction;

/// What a damage value does to its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageKind {
    /// Reduce hp on an opposing character.
    Damage,
    /// Restore hp on an own character.
    Heal,
    /// Apply an element without dealing damage (may still react).
    ElementApplication,
}

/// How a damage value selects its target character.
///
/// `Active`/`Back`/`Next`/`Prev` are resolved against the defending side's
/// roster at execution time; `Absolute` pins a specific character by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetRule {
    Active,
    /// Every alive non-active character (piercing AOE).
    Back,
    Next,
    Prev,
    Absolute(ObjectId),
}

/// One damage/heal/application instance as produced by a skill, card,
/// summon or reaction, before the value-modifier pipeline runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DamageValue {
    pub source: ObjectPosition,
    pub kind: DamageKind,
    pub amount: u8,
    pub damage_type: DamageType,
    /// The label of the cost that paid for this instance; modifiers keyed
    /// on action kind guard on it.
    pub cost_label: CostLabel,
    pub target: TargetRule,
}

impl DamageValue {
    pub fn damage(source: ObjectPosition, amount: u8, damage_type: DamageType) -> Self {
        Self {
            source,
            kind: DamageKind::Damage,
            amount,
            damage_type,
            cost_label: CostLabel::NONE,
            target: TargetRule::Active,
        }
    }

    pub fn heal(source: ObjectPosition, amount: u8) -> Self {
        Self {
            source,
            kind: DamageKind::Heal,
            amount,
            damage_type: DamageType::Physical,
            cost_label: CostLabel::NONE,
            target: TargetRule::Active,
        }
    }

    pub fn application(source: ObjectPosition, element: Element) -> Self {
        Self {
            source,
            kind: DamageKind::ElementApplication,
            amount: 0,
            damage_type: DamageType::Elemental(element),
            cost_label: CostLabel::NONE,
            target: TargetRule::Active,
        }
    }

    pub fn with_label(mut self, label: CostLabel) -> Self {
        self.cost_label = label;
        self
    }

    pub fn with_target(mut self, target: TargetRule) -> Self {
        self.target = target;
        self
    }
}

/// A damage instance after target resolution, pipeline adjustment and
/// reaction handling; what event subscribers observe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalDamageValue {
    pub damage: DamageValue,
    pub target_character: ObjectId,
    /// Post-pipeline, post-reaction amount actually applied to hp.
    pub final_amount: u8,
    pub hp_before: u8,
    pub hp_after: u8,
    pub applied_element: Option<Element>,
    pub reaction: Reaction,
}
