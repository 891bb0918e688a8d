//! Support definitions: persistent companions acting from the support zone.

use crate::action::{Action, EventArguments, EventContext, EventKind};
use crate::damage::DamageValue;
use crate::dice::DiceColor;
use crate::object::{ObjectKind, RuleObject};
use crate::position::ObjectPosition;

/// The closed set of support behaviors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupportBehavior {
    /// Produces 2 omni dice at the start of each round.
    Paimon,
    /// Heals the own active character for 2 in each end phase.
    FavoniusCathedral,
    /// Draws 2 cards in each end phase.
    LiyueHarborWharf,
}

#[derive(Debug, Clone)]
pub struct SupportObject {
    name: &'static str,
    behavior: SupportBehavior,
    position: ObjectPosition,
    usage: i32,
}

impl RuleObject for SupportObject {
    fn name(&self) -> &str {
        self.name
    }

    fn kind(&self) -> ObjectKind {
        ObjectKind::Support
    }

    fn position(&self) -> ObjectPosition {
        self.position
    }

    fn set_position(&mut self, position: ObjectPosition) {
        self.position = position;
    }

    fn listens(&self) -> Vec<EventKind> {
        match self.behavior {
            SupportBehavior::Paimon => vec![EventKind::OnRoundStart],
            SupportBehavior::FavoniusCathedral | SupportBehavior::LiyueHarborWharf => {
                vec![EventKind::OnEndPhase]
            }
        }
    }

    fn handle_event(&mut self, args: &EventArguments, _ctx: &EventContext) -> Vec<Action> {
        if self.usage <= 0 {
            return Vec::new();
        }
        match self.behavior {
            SupportBehavior::Paimon => {
                if args.kind != EventKind::OnRoundStart {
                    return Vec::new();
                }
                vec![
                    Action::CreateDice {
                        player: self.position.player,
                        color: DiceColor::Omni,
                        count: 2,
                    },
                    Action::ChangeObjectUsage {
                        id: self.position.id,
                        delta: -1,
                    },
                ]
            }
            SupportBehavior::FavoniusCathedral => {
                if args.kind != EventKind::OnEndPhase {
                    return Vec::new();
                }
                vec![
                    Action::MakeDamage {
                        source_player: self.position.player,
                        values: vec![DamageValue::heal(self.position, 2)],
                    },
                    Action::ChangeObjectUsage {
                        id: self.position.id,
                        delta: -1,
                    },
                ]
            }
            SupportBehavior::LiyueHarborWharf => {
                if args.kind != EventKind::OnEndPhase {
                    return Vec::new();
                }
                vec![
                    Action::DrawCard {
                        player: self.position.player,
                        count: 2,
                    },
                    Action::ChangeObjectUsage {
                        id: self.position.id,
                        delta: -1,
                    },
                ]
            }
        }
    }

    fn usage(&self) -> Option<i32> {
        Some(self.usage)
    }

    fn set_usage(&mut self, usage: i32) {
        self.usage = usage;
    }
}

/// Instantiate a support by name.
pub fn create_support(name: &str, position: ObjectPosition) -> Option<SupportObject> {
    match name {
        "Paimon" => Some(SupportObject {
            name: "Paimon",
            behavior: SupportBehavior::Paimon,
            position,
            usage: 2,
        }),
        "Favonius Cathedral" => Some(SupportObject {
            name: "Favonius Cathedral",
            behavior: SupportBehavior::FavoniusCathedral,
            position,
            usage: 2,
        }),
        "Liyue Harbor Wharf" => Some(SupportObject {
            name: "Liyue Harbor Wharf",
            behavior: SupportBehavior::LiyueHarborWharf,
            position,
            usage: 2,
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{ObjectId, PlayerId};
    use crate::position::Area;

    #[test]
    fn test_paimon_pays_out_each_round() {
        let position = ObjectPosition::new(PlayerId::P0, Area::Support, ObjectId::from_raw(3));
        let mut paimon = create_support("Paimon", position).unwrap();
        let args = EventArguments::new(EventKind::OnRoundStart, Action::RoundStart);
        let ctx = EventContext {
            own_position: position,
            round: 2,
            current_player: PlayerId::P0,
            active_character: [Some(0), Some(0)],
            active_element: [None, None],
            damage_target: None,
        };
        let actions = paimon.handle_event(&args, &ctx);
        assert!(matches!(
            actions[0],
            Action::CreateDice {
                color: DiceColor::Omni,
                count: 2,
                ..
            }
        ));
        paimon.set_usage(0);
        assert!(paimon.handle_event(&args, &ctx).is_empty());
    }
}
