//! Summon definitions.
//!
//! Summons are field objects that act in the end phase: they deal their
//! payload to the opposing active character, spend one usage, and are
//! swept away when the counter runs out.

use crate::action::{Action, EventArguments, EventContext, EventKind};
use crate::damage::DamageValue;
use crate::element::{DamageType, Element};
use crate::object::{ObjectKind, RuleObject};
use crate::position::ObjectPosition;

#[derive(Debug, Clone)]
pub struct SummonObject {
    name: &'static str,
    position: ObjectPosition,
    usage: i32,
    max_usage: i32,
    damage: u8,
    damage_type: DamageType,
}

impl SummonObject {
    pub fn max_usage(&self) -> i32 {
        self.max_usage
    }

    pub fn damage(&self) -> u8 {
        self.damage
    }

    pub fn damage_type(&self) -> DamageType {
        self.damage_type
    }
}

impl RuleObject for SummonObject {
    fn name(&self) -> &str {
        self.name
    }

    fn kind(&self) -> ObjectKind {
        ObjectKind::Summon
    }

    fn position(&self) -> ObjectPosition {
        self.position
    }

    fn set_position(&mut self, position: ObjectPosition) {
        self.position = position;
    }

    fn listens(&self) -> Vec<EventKind> {
        vec![EventKind::OnEndPhase]
    }

    fn handle_event(&mut self, args: &EventArguments, _ctx: &EventContext) -> Vec<Action> {
        if args.kind != EventKind::OnEndPhase || self.usage <= 0 {
            return Vec::new();
        }
        vec![
            Action::MakeDamage {
                source_player: self.position.player,
                values: vec![DamageValue::damage(
                    self.position,
                    self.damage,
                    self.damage_type,
                )],
            },
            Action::ChangeObjectUsage {
                id: self.position.id,
                delta: -1,
            },
        ]
    }

    fn usage(&self) -> Option<i32> {
        Some(self.usage)
    }

    fn set_usage(&mut self, usage: i32) {
        self.usage = usage.min(self.max_usage);
    }
}

/// Instantiate a summon by name.
pub fn create_summon(name: &str, position: ObjectPosition) -> Option<SummonObject> {
    let build = |name: &'static str, usage: i32, max_usage: i32, damage: u8, element: Element| {
        SummonObject {
            name,
            position,
            usage,
            max_usage,
            damage,
            damage_type: DamageType::Elemental(element),
        }
    };
    match name {
        "Oz" => Some(build("Oz", 2, 2, 1, Element::Electro)),
        "Burning Flame" => Some(build("Burning Flame", 1, 2, 1, Element::Pyro)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{ObjectId, PlayerId};
    use crate::position::Area;

    fn end_phase_args() -> EventArguments {
        EventArguments::new(EventKind::OnEndPhase, Action::BeginEndPhase)
    }

    fn ctx() -> EventContext {
        EventContext {
            own_position: ObjectPosition::new(PlayerId::P0, Area::Summon, ObjectId::from_raw(4)),
            round: 1,
            current_player: PlayerId::P0,
            active_character: [Some(0), Some(0)],
            active_element: [None, None],
            damage_target: None,
        }
    }

    #[test]
    fn test_summon_acts_in_end_phase() {
        let position = ObjectPosition::new(PlayerId::P0, Area::Summon, ObjectId::from_raw(4));
        let mut oz = create_summon("Oz", position).unwrap();
        let actions = oz.handle_event(&end_phase_args(), &ctx());
        assert_eq!(actions.len(), 2);
        assert!(matches!(
            &actions[0],
            Action::MakeDamage { source_player, values }
                if *source_player == PlayerId::P0 && values[0].amount == 1
        ));
        assert!(matches!(
            actions[1],
            Action::ChangeObjectUsage { delta: -1, .. }
        ));
    }

    #[test]
    fn test_spent_summon_stays_quiet() {
        let position = ObjectPosition::new(PlayerId::P0, Area::Summon, ObjectId::from_raw(4));
        let mut oz = create_summon("Oz", position).unwrap();
        oz.set_usage(0);
        assert!(oz.handle_event(&end_phase_args(), &ctx()).is_empty());
    }

    #[test]
    fn test_refresh_caps_at_max() {
        let position = ObjectPosition::new(PlayerId::P1, Area::Summon, ObjectId::from_raw(4));
        let mut flame = create_summon("Burning Flame", position).unwrap();
        flame.set_usage(7);
        assert_eq!(flame.usage(), Some(2));
    }
}
