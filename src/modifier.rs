//! The value-modifier pipeline types.
//!
//! Rule-objects contribute modifiers that adjust derived values: effective
//! costs, outgoing/incoming damage, reroll chances, and whether a switch
//! counts as a combat action. Resolution iterates the priority-ordered
//! contributors; each either adjusts the value or passes it through when
//! its applicability guard fails.
//!
//! Every resolution runs in one of two modes. `Test` previews the value for
//! legality checks and MUST leave every contributor's own counters
//! untouched; `Real` performs the same computation and may consume usage.
//! Repeated `Test` resolutions over unchanged state are value-identical,
//! so a can-afford check can never burn a limited-use effect.

use crate::cost::Cost;
use crate::damage::DamageValue;
use crate::ids::PlayerId;

/// Resolution mode for a pipeline pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveMode {
    /// Preview only; contributors must not mutate their own state.
    Test,
    /// Committed resolution; contributors may consume usage.
    Real,
}

/// The kinds of derived values a rule-object can modify.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModifierKind {
    Cost,
    DamageIncrease,
    DamageDecrease,
    DamageElementChange,
    DamageMultiply,
    RerollCount,
    CombatAction,
}

impl ModifierKind {
    pub const ALL: [ModifierKind; 7] = [
        ModifierKind::Cost,
        ModifierKind::DamageIncrease,
        ModifierKind::DamageDecrease,
        ModifierKind::DamageElementChange,
        ModifierKind::DamageMultiply,
        ModifierKind::RerollCount,
        ModifierKind::CombatAction,
    ];
}

/// The candidate value threaded through one pipeline pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModifiableValue {
    /// An effective cost being computed for `player`.
    Cost { player: PlayerId, cost: Cost },
    /// A damage instance being adjusted (the defender is the opponent of
    /// the damage source's player for damage, the source's own side for
    /// heals).
    Damage(DamageValue),
    /// Reroll chances granted to `player` for the current roll phase.
    RerollCount { player: PlayerId, chances: u8 },
    /// Whether `player`'s pending switch resolves as a fast action.
    CombatAction { player: PlayerId, fast: bool },
}

impl ModifiableValue {
    /// The cost inside a `Cost` value; invariant violation otherwise.
    pub fn expect_cost(&self) -> &Cost {
        match self {
            ModifiableValue::Cost { cost, .. } => cost,
            other => panic!("expected cost value, got {other:?}"),
        }
    }

    pub fn expect_damage(&self) -> &DamageValue {
        match self {
            ModifiableValue::Damage(damage) => damage,
            other => panic!("expected damage value, got {other:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expect_accessors() {
        let value = ModifiableValue::Cost {
            player: PlayerId::P0,
            cost: Cost::any(2),
        };
        assert_eq!(value.expect_cost().any, 2);
    }

    #[test]
    #[should_panic(expected = "expected damage value")]
    fn test_expect_damage_panics_on_mismatch() {
        let value = ModifiableValue::RerollCount {
            player: PlayerId::P0,
            chances: 1,
        };
        value.expect_damage();
    }
}
