//! Elemental dice: the per-player resource pool.
//!
//! Dice are eight-sided: one omni face plus the seven elements. The pool
//! tracks counts per color; all rolls go through the match-owned seeded
//! generator so a match replays bit-for-bit from its seed.

use crate::element::Element;
use rand::Rng;
use rand::rngs::StdRng;

/// The color of a single die.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub enum DiceColor {
    /// Wildcard, substitutable for any required color.
    Omni,
    Cryo,
    Hydro,
    Pyro,
    Electro,
    Anemo,
    Geo,
    Dendro,
}

impl DiceColor {
    pub const ALL: [DiceColor; 8] = [
        DiceColor::Omni,
        DiceColor::Cryo,
        DiceColor::Hydro,
        DiceColor::Pyro,
        DiceColor::Electro,
        DiceColor::Anemo,
        DiceColor::Geo,
        DiceColor::Dendro,
    ];

    pub fn from_element(element: Element) -> Self {
        match element {
            Element::Cryo => DiceColor::Cryo,
            Element::Hydro => DiceColor::Hydro,
            Element::Pyro => DiceColor::Pyro,
            Element::Electro => DiceColor::Electro,
            Element::Anemo => DiceColor::Anemo,
            Element::Geo => DiceColor::Geo,
            Element::Dendro => DiceColor::Dendro,
        }
    }

    /// The element this color corresponds to; `None` for omni.
    pub fn element(self) -> Option<Element> {
        match self {
            DiceColor::Omni => None,
            DiceColor::Cryo => Some(Element::Cryo),
            DiceColor::Hydro => Some(Element::Hydro),
            DiceColor::Pyro => Some(Element::Pyro),
            DiceColor::Electro => Some(Element::Electro),
            DiceColor::Anemo => Some(Element::Anemo),
            DiceColor::Geo => Some(Element::Geo),
            DiceColor::Dendro => Some(Element::Dendro),
        }
    }

    fn index(self) -> usize {
        match self {
            DiceColor::Omni => 0,
            DiceColor::Cryo => 1,
            DiceColor::Hydro => 2,
            DiceColor::Pyro => 3,
            DiceColor::Electro => 4,
            DiceColor::Anemo => 5,
            DiceColor::Geo => 6,
            DiceColor::Dendro => 7,
        }
    }
}

/// Per-color dice counts for one player.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DicePool {
    counts: [u8; 8],
}

impl DicePool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, color: DiceColor) -> u8 {
        self.counts[color.index()]
    }

    pub fn total(&self) -> u8 {
        self.counts.iter().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    pub fn add(&mut self, color: DiceColor, amount: u8) {
        self.counts[color.index()] = self.counts[color.index()].saturating_add(amount);
    }

    /// Remove dice of the specified color. Returns false (leaving the pool
    /// unchanged) if fewer are present.
    pub fn remove(&mut self, color: DiceColor, amount: u8) -> bool {
        let slot = &mut self.counts[color.index()];
        if *slot >= amount {
            *slot -= amount;
            true
        } else {
            false
        }
    }

    /// Remove an explicit die list. Either every die is removed or the pool
    /// is left untouched.
    pub fn remove_all(&mut self, dice: &[DiceColor]) -> bool {
        if !self.contains_all(dice) {
            return false;
        }
        for &d in dice {
            self.counts[d.index()] -= 1;
        }
        true
    }

    /// Whether the pool contains the given die multiset.
    pub fn contains_all(&self, dice: &[DiceColor]) -> bool {
        let mut needed = [0u8; 8];
        for &d in dice {
            needed[d.index()] += 1;
        }
        needed
            .iter()
            .zip(self.counts.iter())
            .all(|(need, have)| need <= have)
    }

    /// Expand the pool into a die list, omni first, then elements in
    /// declaration order. Stable across calls on an unchanged pool.
    pub fn to_vec(&self) -> Vec<DiceColor> {
        let mut out = Vec::with_capacity(self.total() as usize);
        for color in DiceColor::ALL {
            for _ in 0..self.count(color) {
                out.push(color);
            }
        }
        out
    }

    /// Roll `amount` fresh dice into the pool, returning what was rolled.
    pub fn roll(&mut self, rng: &mut StdRng, amount: u8) -> Vec<DiceColor> {
        let mut rolled = Vec::with_capacity(amount as usize);
        for _ in 0..amount {
            let color = DiceColor::ALL[rng.random_range(0..DiceColor::ALL.len())];
            self.add(color, 1);
            rolled.push(color);
        }
        rolled
    }

    pub fn clear(&mut self) {
        self.counts = [0; 8];
    }
}
