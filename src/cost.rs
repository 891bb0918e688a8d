//! Declarative action costs and their satisfaction check.
//!
//! A cost names what an action requires, not how it is paid: a number of
//! dice of one specific color, a number of dice all sharing some color, a
//! number of dice of any color, and an energy charge requirement. Omni dice
//! substitute for any required slot. `is_valid` is a pure predicate; payment
//! itself happens through actions once a response has been validated.

use crate::dice::DiceColor;
use crate::element::Element;

/// Bit-flag label describing what kind of action a cost (or the damage it
/// paid for) belongs to. Modifiers use labels as applicability guards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub struct CostLabel(u16);

impl CostLabel {
    pub const NONE: Self = Self(0);
    pub const NORMAL_ATTACK: Self = Self(1 << 0);
    pub const ELEMENTAL_SKILL: Self = Self(1 << 1);
    pub const ELEMENTAL_BURST: Self = Self(1 << 2);
    pub const SWITCH: Self = Self(1 << 3);
    pub const CARD: Self = Self(1 << 4);
    pub const TALENT: Self = Self(1 << 5);
    pub const FOOD: Self = Self(1 << 6);

    pub const fn union(self, other: CostLabel) -> Self {
        Self(self.0 | other.0)
    }

    pub const fn intersects(self, other: CostLabel) -> bool {
        self.0 & other.0 != 0
    }

    /// Any skill activation (normal attack, elemental skill or burst).
    pub const fn is_skill(self) -> bool {
        self.intersects(Self(
            Self::NORMAL_ATTACK.0 | Self::ELEMENTAL_SKILL.0 | Self::ELEMENTAL_BURST.0,
        ))
    }
}

/// A declarative dice/charge requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub struct Cost {
    /// Dice of one specific color (count, color).
    pub elemental: Option<(DiceColor, u8)>,
    /// Dice that must all share a single color (the color is the payer's choice).
    pub same: u8,
    /// Dice of any colors.
    pub any: u8,
    /// Energy charge required on the acting character.
    pub charge: u8,
    /// What kind of action this cost belongs to.
    pub label: CostLabel,
}

impl Cost {
    pub fn free() -> Self {
        Self::default()
    }

    pub fn elemental(color: DiceColor, count: u8) -> Self {
        Self {
            elemental: Some((color, count)),
            ..Self::default()
        }
    }

    pub fn of_element(element: Element, count: u8) -> Self {
        Self::elemental(DiceColor::from_element(element), count)
    }

    pub fn same(count: u8) -> Self {
        Self {
            same: count,
            ..Self::default()
        }
    }

    pub fn any(count: u8) -> Self {
        Self {
            any: count,
            ..Self::default()
        }
    }

    pub fn with_any(mut self, count: u8) -> Self {
        self.any = count;
        self
    }

    pub fn with_charge(mut self, charge: u8) -> Self {
        self.charge = charge;
        self
    }

    pub fn with_label(mut self, label: CostLabel) -> Self {
        self.label = label;
        self
    }

    /// Total number of dice this cost demands.
    pub fn total_dice(&self) -> u8 {
        self.elemental.map(|(_, n)| n).unwrap_or(0) + self.same + self.any
    }

    pub fn is_free(&self) -> bool {
        self.total_dice() == 0 && self.charge == 0
    }

    /// Check whether an offered die multiset and charge satisfy this cost.
    ///
    /// Omni substitutes for any required slot. With `strict`, the offer must
    /// be exact: no more dice than the cost demands.
    pub fn is_valid(&self, offered: &[DiceColor], charge: u8, strict: bool) -> bool {
        if charge < self.charge {
            return false;
        }
        if strict && offered.len() != self.total_dice() as usize {
            return false;
        }
        if offered.len() < self.total_dice() as usize {
            return false;
        }

        let mut counts = [0u8; 8];
        let mut omni = 0u8;
        for &d in offered {
            if d == DiceColor::Omni {
                omni += 1;
            } else {
                counts[color_slot(d)] += 1;
            }
        }

        // Elemental requirement: concrete color first, omni for the rest.
        if let Some((color, need)) = self.elemental {
            let mut need = need;
            if color == DiceColor::Omni {
                // An omni requirement is satisfiable by any one color plus omni;
                // treat it as a same-color group of its size.
                return Cost {
                    elemental: None,
                    same: self.same + need,
                    ..*self
                }
                .is_valid(offered, charge, strict);
            }
            let slot = color_slot(color);
            let take = need.min(counts[slot]);
            counts[slot] -= take;
            need -= take;
            if need > omni {
                return false;
            }
            omni -= need;
        }

        // Same-color requirement: some single color (padded by omni) covers it.
        if self.same > 0 {
            let best = counts.iter().copied().max().unwrap_or(0);
            if best.saturating_add(omni) < self.same {
                return false;
            }
        }

        // Anything left over covers the any-color requirement; the offer's
        // total was already checked against the cost's total.
        true
    }
}

fn color_slot(color: DiceColor) -> usize {
    match color {
        DiceColor::Omni => unreachable!("omni handled before slot lookup"),
        DiceColor::Cryo => 0,
        DiceColor::Hydro => 1,
        DiceColor::Pyro => 2,
        DiceColor::Electro => 3,
        DiceColor::Anemo => 4,
        DiceColor::Geo => 5,
        DiceColor::Dendro => 6,
    }
}

/// Greedy payment selection: pick dice from `pool` satisfying `cost`,
/// preferring concrete colors over omni. Returns `None` when the pool
/// cannot pay. Used by drivers and tests; the engine itself only validates
/// explicit selections.
pub fn select_payment(pool: &crate::dice::DicePool, cost: &Cost) -> Option<Vec<DiceColor>> {
    let mut remaining = pool.clone();
    let mut picked = Vec::new();

    let mut take = |color: DiceColor, n: u8, remaining: &mut crate::dice::DicePool| -> u8 {
        let got = n.min(remaining.count(color));
        remaining.remove(color, got);
        for _ in 0..got {
            picked.push(color);
        }
        got
    };

    if let Some((color, need)) = cost.elemental {
        let mut missing = need - take(color, need, &mut remaining);
        missing -= take(DiceColor::Omni, missing, &mut remaining);
        if missing > 0 {
            return None;
        }
    }

    if cost.same > 0 {
        // Choose the most plentiful concrete color, padded with omni.
        let best = DiceColor::ALL
            .into_iter()
            .filter(|c| *c != DiceColor::Omni)
            .max_by_key(|c| remaining.count(*c))?;
        let mut missing = cost.same - take(best, cost.same, &mut remaining);
        missing -= take(DiceColor::Omni, missing, &mut remaining);
        if missing > 0 {
            return None;
        }
    }

    if cost.any > 0 {
        let mut missing = cost.any;
        // Spend non-omni colors first, scarcest first, to preserve omni.
        let mut colors: Vec<DiceColor> = DiceColor::ALL
            .into_iter()
            .filter(|c| *c != DiceColor::Omni && remaining.count(*c) > 0)
            .collect();
        colors.sort_by_key(|c| remaining.count(*c));
        for color in colors {
            if missing == 0 {
                break;
            }
            missing -= take(color, missing, &mut remaining);
        }
        missing -= take(DiceColor::Omni, missing, &mut remaining);
        if missing > 0 {
            return None;
        }
    }

    Some(picked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::DicePool;

    #[test]
    fn test_free_cost() {
        let cost = Cost::free();
        assert!(cost.is_free());
        assert!(cost.is_valid(&[], 0, true));
        assert!(!cost.is_valid(&[DiceColor::Pyro], 0, true));
        assert!(cost.is_valid(&[DiceColor::Pyro], 0, false));
    }

    #[test]
    fn test_elemental_requirement() {
        let cost = Cost::elemental(DiceColor::Cryo, 3);
        assert!(cost.is_valid(&[DiceColor::Cryo; 3], 0, true));
        assert!(cost.is_valid(
            &[DiceColor::Cryo, DiceColor::Omni, DiceColor::Omni],
            0,
            true
        ));
        assert!(!cost.is_valid(&[DiceColor::Cryo, DiceColor::Cryo, DiceColor::Pyro], 0, true));
        assert!(!cost.is_valid(&[DiceColor::Cryo; 2], 0, true));
    }

    #[test]
    fn test_same_color_requirement() {
        let cost = Cost::same(3);
        assert!(cost.is_valid(&[DiceColor::Geo; 3], 0, true));
        assert!(cost.is_valid(&[DiceColor::Geo, DiceColor::Geo, DiceColor::Omni], 0, true));
        assert!(cost.is_valid(&[DiceColor::Omni; 3], 0, true));
        assert!(!cost.is_valid(&[DiceColor::Geo, DiceColor::Pyro, DiceColor::Omni], 0, true));
    }

    #[test]
    fn test_mixed_requirement() {
        // 1 pyro + 2 any, the typical normal-attack shape.
        let cost = Cost::elemental(DiceColor::Pyro, 1).with_any(2);
        assert_eq!(cost.total_dice(), 3);
        assert!(cost.is_valid(&[DiceColor::Pyro, DiceColor::Geo, DiceColor::Anemo], 0, true));
        assert!(cost.is_valid(&[DiceColor::Omni, DiceColor::Geo, DiceColor::Anemo], 0, true));
        assert!(!cost.is_valid(&[DiceColor::Geo, DiceColor::Geo, DiceColor::Anemo], 0, true));
    }

    #[test]
    fn test_charge_requirement() {
        let cost = Cost::of_element(Element::Cryo, 3).with_charge(2);
        assert!(!cost.is_valid(&[DiceColor::Cryo; 3], 1, true));
        assert!(cost.is_valid(&[DiceColor::Cryo; 3], 2, true));
        assert!(cost.is_valid(&[DiceColor::Cryo; 3], 3, true));
    }

    #[test]
    fn test_select_payment_prefers_concrete_colors() {
        let mut pool = DicePool::new();
        pool.add(DiceColor::Pyro, 2);
        pool.add(DiceColor::Omni, 2);
        pool.add(DiceColor::Geo, 1);

        let cost = Cost::elemental(DiceColor::Pyro, 2).with_any(1);
        let payment = select_payment(&pool, &cost).unwrap();
        assert!(cost.is_valid(&payment, 0, true));
        assert_eq!(
            payment.iter().filter(|d| **d == DiceColor::Omni).count(),
            0,
            "omni must be preserved when concrete dice suffice"
        );
    }

    #[test]
    fn test_select_payment_fails_when_short() {
        let mut pool = DicePool::new();
        pool.add(DiceColor::Hydro, 1);
        assert!(select_payment(&pool, &Cost::any(2)).is_none());
        assert!(select_payment(&pool, &Cost::elemental(DiceColor::Pyro, 1)).is_none());
    }
}
