//! System rule-objects: engine bookkeeping registered alongside content so
//! it flows through the same dispatch surface, ordered ahead of content by
//! the processor's priority rules.

use crate::action::{Action, EventArguments, EventContext, EventKind};
use crate::object::{ObjectKind, RuleObject};
use crate::position::ObjectPosition;

/// The system handler roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemRole {
    /// Watches damage resolution and schedules the defeat sweep: win
    /// detection and the mandatory post-defeat character choice.
    DefeatWatcher,
}

/// An engine-owned rule-object.
#[derive(Debug, Clone)]
pub struct SystemHandler {
    role: SystemRole,
    position: ObjectPosition,
}

impl SystemHandler {
    pub fn new(role: SystemRole, position: ObjectPosition) -> Self {
        Self { role, position }
    }

    pub fn role(&self) -> SystemRole {
        self.role
    }
}

impl RuleObject for SystemHandler {
    fn name(&self) -> &str {
        match self.role {
            SystemRole::DefeatWatcher => "DefeatWatcher",
        }
    }

    fn kind(&self) -> ObjectKind {
        ObjectKind::SystemHandler
    }

    fn position(&self) -> ObjectPosition {
        self.position
    }

    fn set_position(&mut self, position: ObjectPosition) {
        self.position = position;
    }

    fn listens(&self) -> Vec<EventKind> {
        match self.role {
            SystemRole::DefeatWatcher => vec![EventKind::AfterMakeDamage],
        }
    }

    fn handle_event(&mut self, args: &EventArguments, _ctx: &EventContext) -> Vec<Action> {
        match self.role {
            SystemRole::DefeatWatcher => {
                if args.damages.iter().any(|d| d.hp_after == 0) {
                    vec![Action::CheckDefeated]
                } else {
                    Vec::new()
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cost::CostLabel;
    use crate::damage::{DamageValue, FinalDamageValue, TargetRule};
    use crate::element::DamageType;
    use crate::ids::{ObjectId, PlayerId};
    use crate::position::Area;
    use crate::reaction::Reaction;

    fn watcher() -> SystemHandler {
        SystemHandler::new(
            SystemRole::DefeatWatcher,
            ObjectPosition::new(PlayerId::P0, Area::System, ObjectId::from_raw(1)),
        )
    }

    fn damage_event(hp_after: u8) -> EventArguments {
        let source =
            ObjectPosition::new(PlayerId::P0, Area::Character, ObjectId::from_raw(2)).with_character(0);
        let value = DamageValue {
            source,
            kind: crate::damage::DamageKind::Damage,
            amount: 3,
            damage_type: DamageType::Physical,
            cost_label: CostLabel::NORMAL_ATTACK,
            target: TargetRule::Active,
        };
        let mut args = EventArguments::new(
            EventKind::AfterMakeDamage,
            Action::MakeDamage {
                source_player: PlayerId::P0,
                values: vec![value.clone()],
            },
        );
        args.damages.push(FinalDamageValue {
            damage: value,
            target_character: ObjectId::from_raw(9),
            final_amount: 3,
            hp_before: hp_after + 3,
            hp_after,
            applied_element: None,
            reaction: Reaction::None,
        });
        args
    }

    fn ctx() -> EventContext {
        EventContext {
            own_position: ObjectPosition::new(PlayerId::P0, Area::System, ObjectId::from_raw(1)),
            round: 1,
            current_player: PlayerId::P0,
            active_character: [Some(0), Some(0)],
            active_element: [None, None],
            damage_target: None,
        }
    }

    #[test]
    fn test_defeat_watcher_schedules_sweep_on_lethal() {
        let mut w = watcher();
        let actions = w.handle_event(&damage_event(0), &ctx());
        assert_eq!(actions, vec![Action::CheckDefeated]);
    }

    #[test]
    fn test_defeat_watcher_ignores_survivors() {
        let mut w = watcher();
        let actions = w.handle_event(&damage_event(4), &ctx());
        assert!(actions.is_empty());
    }
}
