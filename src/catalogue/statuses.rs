//! Status definitions: character- and team-scoped combat effects.
//!
//! Statuses are the closed behavior set `StatusBehavior`; one `StatusObject`
//! struct carries the shared plumbing (position, usage, refresh cap) and
//! dispatches per behavior. Every effect flows out as actions; statuses
//! never touch the match directly.

use crate::action::{Action, EventArguments, EventContext, EventKind};
use crate::cost::CostLabel;
use crate::damage::{DamageKind, DamageValue};
use crate::element::{DamageType, Element};
use crate::modifier::{ModifiableValue, ModifierKind, ResolveMode};
use crate::object::{ObjectKind, RuleObject, StatusScope};
use crate::position::ObjectPosition;

/// The closed set of status behaviors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusBehavior {
    /// The attached character cannot use skills; physical or pyro damage
    /// against it gets +2 and shatters the status. Expires at end phase.
    Frozen,
    /// The attached character cannot eat more food this round.
    Satiated,
    /// Own electro or dendro damage +1 while usages remain.
    CatalyzingField,
    /// Next own pyro or electro damage +2.
    DendroCore,
    /// Absorbs damage aimed at the own active character, one point per
    /// usage; stacks up to two.
    CrystallizeShield,
    /// The next character switch costs nothing.
    ChangingShifts,
    /// The next character switch is a fast action.
    LeaveItToMe,
    /// Kaeya talent: his elemental skill deals +1.
    ColdBloodedStrike,
    /// Kaeya burst effect: own switches lash out for 2 cryo while usages
    /// remain.
    Icicle,
    /// The attached character's next normal attack costs one less any-die.
    NormalAttackDiscount,
    /// A character-scoped shield (Lotus Flower Crisp), one point per usage.
    CharacterShield,
    /// The attached character's next elemental burst deals +3.
    BurstBoost,
    /// Equipped weapon: the attached character's skills deal +1.
    WeaponBoost,
    /// Diluc burst effect: the character's physical damage becomes pyro
    /// while the infusion lasts; ticks down each end phase.
    PyroInfusion,
}

/// A status instance in the arena.
#[derive(Debug, Clone)]
pub struct StatusObject {
    name: &'static str,
    behavior: StatusBehavior,
    scope: StatusScope,
    position: ObjectPosition,
    usage: i32,
    max_usage: i32,
    /// Equipment-like statuses have no counter and never self-expire.
    counts_usage: bool,
}

impl StatusObject {
    pub fn behavior(&self) -> StatusBehavior {
        self.behavior
    }

    pub fn scope(&self) -> StatusScope {
        self.scope
    }

    pub fn max_usage(&self) -> i32 {
        self.max_usage
    }

    fn own_player(&self) -> crate::ids::PlayerId {
        self.position.player
    }

    /// Guard: the damage instance currently in the pipeline targets the
    /// character this status is attached to.
    fn guards_own_character(&self, ctx: &EventContext) -> bool {
        match (ctx.damage_target, self.position.character_index) {
            (Some(target), Some(own_index)) => {
                target.player == self.position.player && target.character_index == own_index
            }
            _ => false,
        }
    }

    fn spend(&mut self, amount: i32, mode: ResolveMode) {
        if mode == ResolveMode::Real && self.counts_usage {
            self.usage = (self.usage - amount).max(0);
        }
    }
}

impl RuleObject for StatusObject {
    fn name(&self) -> &str {
        self.name
    }

    fn kind(&self) -> ObjectKind {
        ObjectKind::Status(self.scope)
    }

    fn position(&self) -> ObjectPosition {
        self.position
    }

    fn set_position(&mut self, position: ObjectPosition) {
        self.position = position;
    }

    fn listens(&self) -> Vec<EventKind> {
        match self.behavior {
            StatusBehavior::Frozen
            | StatusBehavior::Satiated
            | StatusBehavior::PyroInfusion => vec![EventKind::OnEndPhase],
            StatusBehavior::Icicle => vec![EventKind::AfterSwitchCharacter],
            _ => Vec::new(),
        }
    }

    fn modifier_kinds(&self) -> Vec<ModifierKind> {
        match self.behavior {
            StatusBehavior::Frozen
            | StatusBehavior::CatalyzingField
            | StatusBehavior::DendroCore
            | StatusBehavior::ColdBloodedStrike
            | StatusBehavior::BurstBoost
            | StatusBehavior::WeaponBoost => vec![ModifierKind::DamageIncrease],
            StatusBehavior::CrystallizeShield | StatusBehavior::CharacterShield => {
                vec![ModifierKind::DamageDecrease]
            }
            StatusBehavior::ChangingShifts | StatusBehavior::NormalAttackDiscount => {
                vec![ModifierKind::Cost]
            }
            StatusBehavior::LeaveItToMe => vec![ModifierKind::CombatAction],
            StatusBehavior::PyroInfusion => vec![ModifierKind::DamageElementChange],
            StatusBehavior::Satiated | StatusBehavior::Icicle => Vec::new(),
        }
    }

    fn handle_event(&mut self, args: &EventArguments, _ctx: &EventContext) -> Vec<Action> {
        match self.behavior {
            // Round-scoped markers expire with the end phase.
            StatusBehavior::Frozen | StatusBehavior::Satiated => {
                if args.kind == EventKind::OnEndPhase {
                    vec![Action::RemoveObject {
                        id: self.position.id,
                    }]
                } else {
                    Vec::new()
                }
            }
            StatusBehavior::PyroInfusion => {
                if args.kind == EventKind::OnEndPhase && self.usage > 0 {
                    vec![Action::ChangeObjectUsage {
                        id: self.position.id,
                        delta: -1,
                    }]
                } else {
                    Vec::new()
                }
            }
            StatusBehavior::Icicle => {
                if args.kind == EventKind::AfterSwitchCharacter
                    && args.acting_player == Some(self.own_player())
                    && self.usage > 0
                {
                    vec![
                        Action::MakeDamage {
                            source_player: self.own_player(),
                            values: vec![DamageValue::damage(
                                self.position,
                                2,
                                DamageType::Elemental(Element::Cryo),
                            )],
                        },
                        Action::ChangeObjectUsage {
                            id: self.position.id,
                            delta: -1,
                        },
                    ]
                } else {
                    Vec::new()
                }
            }
            _ => Vec::new(),
        }
    }

    fn modify_value(
        &mut self,
        kind: ModifierKind,
        value: &mut ModifiableValue,
        ctx: &EventContext,
        mode: ResolveMode,
    ) {
        if self.counts_usage && self.usage <= 0 {
            return;
        }
        match (self.behavior, kind) {
            (StatusBehavior::Frozen, ModifierKind::DamageIncrease) => {
                let ModifiableValue::Damage(damage) = value else {
                    return;
                };
                let shatters = matches!(
                    damage.damage_type,
                    DamageType::Physical | DamageType::Elemental(Element::Pyro)
                );
                if damage.kind == DamageKind::Damage
                    && shatters
                    && self.guards_own_character(ctx)
                {
                    damage.amount += 2;
                    self.spend(self.usage, mode);
                }
            }
            (StatusBehavior::CatalyzingField, ModifierKind::DamageIncrease) => {
                let ModifiableValue::Damage(damage) = value else {
                    return;
                };
                let boosted = matches!(
                    damage.damage_type,
                    DamageType::Elemental(Element::Electro) | DamageType::Elemental(Element::Dendro)
                );
                if damage.kind == DamageKind::Damage
                    && boosted
                    && damage.source.player == self.own_player()
                {
                    damage.amount += 1;
                    self.spend(1, mode);
                }
            }
            (StatusBehavior::DendroCore, ModifierKind::DamageIncrease) => {
                let ModifiableValue::Damage(damage) = value else {
                    return;
                };
                let boosted = matches!(
                    damage.damage_type,
                    DamageType::Elemental(Element::Pyro) | DamageType::Elemental(Element::Electro)
                );
                if damage.kind == DamageKind::Damage
                    && boosted
                    && damage.source.player == self.own_player()
                {
                    damage.amount += 2;
                    self.spend(1, mode);
                }
            }
            (StatusBehavior::ColdBloodedStrike, ModifierKind::DamageIncrease) => {
                let ModifiableValue::Damage(damage) = value else {
                    return;
                };
                if damage.kind == DamageKind::Damage
                    && damage.source.player == self.own_player()
                    && damage.source.character_index == self.position.character_index
                    && damage.cost_label.intersects(CostLabel::ELEMENTAL_SKILL)
                {
                    damage.amount += 1;
                }
            }
            (StatusBehavior::CrystallizeShield, ModifierKind::DamageDecrease) => {
                let ModifiableValue::Damage(damage) = value else {
                    return;
                };
                let guards_active = ctx
                    .damage_target
                    .map(|t| {
                        t.player == self.own_player()
                            && ctx.active_character[t.player.index()] == Some(t.character_index)
                    })
                    .unwrap_or(false);
                if damage.kind == DamageKind::Damage && damage.amount > 0 && guards_active {
                    let absorbed = (self.usage as u8).min(damage.amount);
                    damage.amount -= absorbed;
                    self.spend(absorbed as i32, mode);
                }
            }
            (StatusBehavior::ChangingShifts, ModifierKind::Cost) => {
                let ModifiableValue::Cost { player, cost } = value else {
                    return;
                };
                if *player == self.own_player()
                    && cost.label.intersects(CostLabel::SWITCH)
                    && cost.total_dice() > 0
                {
                    cost.elemental = None;
                    cost.same = 0;
                    cost.any = 0;
                    self.spend(1, mode);
                }
            }
            (StatusBehavior::LeaveItToMe, ModifierKind::CombatAction) => {
                let ModifiableValue::CombatAction { player, fast } = value else {
                    return;
                };
                if *player == self.own_player() && !*fast {
                    *fast = true;
                    self.spend(1, mode);
                }
            }
            (StatusBehavior::NormalAttackDiscount, ModifierKind::Cost) => {
                let ModifiableValue::Cost { player, cost } = value else {
                    return;
                };
                let own_is_acting = *player == self.own_player()
                    && ctx.active_character[player.index()] == self.position.character_index;
                if own_is_acting
                    && cost.label.intersects(CostLabel::NORMAL_ATTACK)
                    && cost.any > 0
                {
                    cost.any -= 1;
                    self.spend(1, mode);
                }
            }
            (StatusBehavior::CharacterShield, ModifierKind::DamageDecrease) => {
                let ModifiableValue::Damage(damage) = value else {
                    return;
                };
                if damage.kind == DamageKind::Damage
                    && damage.amount > 0
                    && self.guards_own_character(ctx)
                {
                    let absorbed = (self.usage as u8).min(damage.amount);
                    damage.amount -= absorbed;
                    self.spend(absorbed as i32, mode);
                }
            }
            (StatusBehavior::BurstBoost, ModifierKind::DamageIncrease) => {
                let ModifiableValue::Damage(damage) = value else {
                    return;
                };
                if damage.kind == DamageKind::Damage
                    && damage.source.player == self.own_player()
                    && damage.source.character_index == self.position.character_index
                    && damage.cost_label.intersects(CostLabel::ELEMENTAL_BURST)
                {
                    damage.amount += 3;
                    self.spend(1, mode);
                }
            }
            (StatusBehavior::PyroInfusion, ModifierKind::DamageElementChange) => {
                let ModifiableValue::Damage(damage) = value else {
                    return;
                };
                if damage.kind == DamageKind::Damage
                    && damage.damage_type == DamageType::Physical
                    && damage.source.player == self.own_player()
                    && damage.source.character_index == self.position.character_index
                {
                    damage.damage_type = DamageType::Elemental(Element::Pyro);
                }
            }
            (StatusBehavior::WeaponBoost, ModifierKind::DamageIncrease) => {
                let ModifiableValue::Damage(damage) = value else {
                    return;
                };
                if damage.kind == DamageKind::Damage
                    && damage.source.player == self.own_player()
                    && damage.source.character_index == self.position.character_index
                    && damage.cost_label.is_skill()
                {
                    damage.amount += 1;
                }
            }
            _ => {}
        }
    }

    fn usage(&self) -> Option<i32> {
        self.counts_usage.then_some(self.usage)
    }

    fn set_usage(&mut self, usage: i32) {
        if self.counts_usage {
            self.usage = usage.min(self.max_usage);
        }
    }

    fn blocks_skills(&self) -> bool {
        matches!(self.behavior, StatusBehavior::Frozen)
    }
}

/// Instantiate a status by name. The position is a placeholder until the
/// processor anchors and registers the object.
pub fn create_status(name: &str, position: ObjectPosition) -> Option<StatusObject> {
    let build = |name: &'static str,
                 behavior: StatusBehavior,
                 scope: StatusScope,
                 usage: i32,
                 max_usage: i32,
                 counts_usage: bool| {
        StatusObject {
            name,
            behavior,
            scope,
            position,
            usage,
            max_usage,
            counts_usage,
        }
    };
    match name {
        "Frozen" => Some(build(
            "Frozen",
            StatusBehavior::Frozen,
            StatusScope::Character,
            1,
            1,
            true,
        )),
        "Satiated" => Some(build(
            "Satiated",
            StatusBehavior::Satiated,
            StatusScope::Character,
            1,
            1,
            true,
        )),
        "Catalyzing Field" => Some(build(
            "Catalyzing Field",
            StatusBehavior::CatalyzingField,
            StatusScope::Team,
            2,
            2,
            true,
        )),
        "Dendro Core" => Some(build(
            "Dendro Core",
            StatusBehavior::DendroCore,
            StatusScope::Team,
            1,
            1,
            true,
        )),
        "Crystallize Shield" => Some(build(
            "Crystallize Shield",
            StatusBehavior::CrystallizeShield,
            StatusScope::Team,
            1,
            2,
            true,
        )),
        "Changing Shifts" => Some(build(
            "Changing Shifts",
            StatusBehavior::ChangingShifts,
            StatusScope::Team,
            1,
            1,
            true,
        )),
        "Leave It to Me!" => Some(build(
            "Leave It to Me!",
            StatusBehavior::LeaveItToMe,
            StatusScope::Team,
            1,
            1,
            true,
        )),
        "Cold-Blooded Strike" => Some(build(
            "Cold-Blooded Strike",
            StatusBehavior::ColdBloodedStrike,
            StatusScope::Character,
            0,
            0,
            false,
        )),
        "Icicle" => Some(build(
            "Icicle",
            StatusBehavior::Icicle,
            StatusScope::Team,
            3,
            3,
            true,
        )),
        "Northern Smoked Chicken" => Some(build(
            "Northern Smoked Chicken",
            StatusBehavior::NormalAttackDiscount,
            StatusScope::Character,
            1,
            1,
            true,
        )),
        "Lotus Flower Crisp" => Some(build(
            "Lotus Flower Crisp",
            StatusBehavior::CharacterShield,
            StatusScope::Character,
            3,
            3,
            true,
        )),
        "Adeptus' Temptation" => Some(build(
            "Adeptus' Temptation",
            StatusBehavior::BurstBoost,
            StatusScope::Character,
            1,
            1,
            true,
        )),
        "Traveler's Handy Sword" => Some(build(
            "Traveler's Handy Sword",
            StatusBehavior::WeaponBoost,
            StatusScope::Character,
            0,
            0,
            false,
        )),
        "Pyro Infusion" => Some(build(
            "Pyro Infusion",
            StatusBehavior::PyroInfusion,
            StatusScope::Character,
            2,
            2,
            true,
        )),
        _ => None,
    }
}
