//! The elemental reaction resolver.
//!
//! `react` is a pure table over (attacking element, applied elements):
//! it names the reaction, the consumed elements, and what stays applied.
//! Splash consequences that need the defender's roster (piercing to the
//! bench, swirl AOE) are computed separately by `splash_damage` so the
//! table itself stays roster-free.

use crate::damage::{DamageValue, TargetRule};
use crate::element::{Aura, DamageType, Element};
use crate::ids::ObjectId;
use crate::position::ObjectPosition;

/// The outcome kind of an elemental interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reaction {
    /// No interaction; the attacking element may have been newly applied.
    None,
    Melt,
    Vaporize,
    Overloaded,
    Superconduct,
    ElectroCharged,
    Frozen,
    /// Carries the element that was swirled away.
    Swirl(Element),
    Crystallize,
    Burning,
    Bloom,
    Quicken,
}

impl Reaction {
    /// Direct bonus added to the triggering damage instance.
    pub fn damage_bonus(self) -> u8 {
        match self {
            Reaction::Melt | Reaction::Vaporize | Reaction::Overloaded => 2,
            Reaction::Superconduct
            | Reaction::ElectroCharged
            | Reaction::Frozen
            | Reaction::Crystallize
            | Reaction::Burning
            | Reaction::Bloom
            | Reaction::Quicken => 1,
            Reaction::Swirl(_) | Reaction::None => 0,
        }
    }
}

/// Result of resolving one attacking element against an aura.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactionOutcome {
    pub reaction: Reaction,
    /// Consumed elements, applied element first, attacking element second.
    /// Empty when no reaction fired.
    pub consumed: Vec<Element>,
    /// The aura left on the target, including a fresh application when the
    /// attacking element sticks without reacting.
    pub remaining: Aura,
}

/// The pair table: what `attacking` does to a single `applied` element.
/// `None` means the pair coexists (or the attack passes through).
fn pair_reaction(attacking: Element, applied: Element) -> Option<Reaction> {
    use Element::*;
    match (attacking, applied) {
        (Pyro, Cryo) | (Cryo, Pyro) => Some(Reaction::Melt),
        (Pyro, Hydro) | (Hydro, Pyro) => Some(Reaction::Vaporize),
        (Pyro, Electro) | (Electro, Pyro) => Some(Reaction::Overloaded),
        (Cryo, Electro) | (Electro, Cryo) => Some(Reaction::Superconduct),
        (Hydro, Electro) | (Electro, Hydro) => Some(Reaction::ElectroCharged),
        (Cryo, Hydro) | (Hydro, Cryo) => Some(Reaction::Frozen),
        (Pyro, Dendro) | (Dendro, Pyro) => Some(Reaction::Burning),
        (Hydro, Dendro) | (Dendro, Hydro) => Some(Reaction::Bloom),
        (Electro, Dendro) | (Dendro, Electro) => Some(Reaction::Quicken),
        (Anemo, Cryo | Hydro | Pyro | Electro) => Some(Reaction::Swirl(applied)),
        (Geo, Cryo | Hydro | Pyro | Electro) => Some(Reaction::Crystallize),
        // Cryo and dendro coexist; anemo/geo pass through dendro.
        _ => None,
    }
}

/// Resolve an attacking element against the currently applied elements.
///
/// The attack reacts with the earliest-applied element that has a table
/// entry; any other applied element stays. When nothing reacts and the
/// attacking element can be applied, it joins the aura.
pub fn react(attacking: Element, applied: &Aura) -> ReactionOutcome {
    for target in applied.elements() {
        if let Some(reaction) = pair_reaction(attacking, target) {
            let mut remaining = *applied;
            remaining.remove(target);
            return ReactionOutcome {
                reaction,
                consumed: vec![target, attacking],
                remaining,
            };
        }
    }

    let mut remaining = *applied;
    if attacking.can_be_applied() {
        remaining.push(attacking);
    }
    ReactionOutcome {
        reaction: Reaction::None,
        consumed: Vec::new(),
        remaining,
    }
}

/// Splash damage to the rest of the defending roster.
///
/// Superconduct and electro-charged pierce every other alive character for
/// 1; swirl carries the swirled-away element (never anemo itself) to every
/// other alive character for 1. All other reactions splash nothing.
pub fn splash_damage(
    reaction: Reaction,
    source: ObjectPosition,
    other_alive: &[ObjectId],
) -> Vec<DamageValue> {
    let payload = match reaction {
        Reaction::Superconduct | Reaction::ElectroCharged => DamageType::Piercing,
        Reaction::Swirl(element) => DamageType::Elemental(element),
        _ => return Vec::new(),
    };
    other_alive
        .iter()
        .map(|&id| {
            DamageValue::damage(source, 1, payload).with_target(TargetRule::Absolute(id))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::PlayerId;
    use crate::position::Area;

    fn aura(elements: &[Element]) -> Aura {
        Aura::from_elements(elements)
    }

    #[test]
    fn test_frozen_pair() {
        let out = react(Element::Cryo, &aura(&[Element::Hydro]));
        assert_eq!(out.reaction, Reaction::Frozen);
        assert_eq!(out.consumed, vec![Element::Hydro, Element::Cryo]);
        assert!(out.remaining.is_empty());
    }

    #[test]
    fn test_anemo_does_not_swirl_dendro() {
        let out = react(Element::Anemo, &aura(&[Element::Dendro]));
        assert_eq!(out.reaction, Reaction::None);
        assert!(out.consumed.is_empty());
        assert_eq!(out.remaining.elements(), vec![Element::Dendro]);
    }

    #[test]
    fn test_anemo_never_applies() {
        let out = react(Element::Anemo, &aura(&[]));
        assert_eq!(out.reaction, Reaction::None);
        assert!(out.remaining.is_empty());
    }

    #[test]
    fn test_application_without_reaction() {
        let out = react(Element::Cryo, &aura(&[]));
        assert_eq!(out.reaction, Reaction::None);
        assert_eq!(out.remaining.elements(), vec![Element::Cryo]);
    }

    #[test]
    fn test_cryo_dendro_coexist() {
        let out = react(Element::Cryo, &aura(&[Element::Dendro]));
        assert_eq!(out.reaction, Reaction::None);
        assert_eq!(
            out.remaining.elements(),
            vec![Element::Dendro, Element::Cryo]
        );
    }

    #[test]
    fn test_third_element_reacts_with_earliest() {
        // Dendro was applied first: pyro burns it, cryo stays.
        let out = react(Element::Pyro, &aura(&[Element::Dendro, Element::Cryo]));
        assert_eq!(out.reaction, Reaction::Burning);
        assert_eq!(out.consumed, vec![Element::Dendro, Element::Pyro]);
        assert_eq!(out.remaining.elements(), vec![Element::Cryo]);

        // Cryo was applied first: pyro melts it, dendro stays.
        let out = react(Element::Pyro, &aura(&[Element::Cryo, Element::Dendro]));
        assert_eq!(out.reaction, Reaction::Melt);
        assert_eq!(out.consumed, vec![Element::Cryo, Element::Pyro]);
        assert_eq!(out.remaining.elements(), vec![Element::Dendro]);
    }

    #[test]
    fn test_swirl_carries_swirled_element() {
        let out = react(Element::Anemo, &aura(&[Element::Pyro]));
        assert_eq!(out.reaction, Reaction::Swirl(Element::Pyro));
        assert_eq!(out.consumed, vec![Element::Pyro, Element::Anemo]);
        assert!(out.remaining.is_empty());
    }

    #[test]
    fn test_full_single_aura_table() {
        use Element::*;
        // (attacking, applied) -> expected reaction
        let cases: &[(Element, Element, Reaction)] = &[
            (Pyro, Cryo, Reaction::Melt),
            (Cryo, Pyro, Reaction::Melt),
            (Pyro, Hydro, Reaction::Vaporize),
            (Hydro, Pyro, Reaction::Vaporize),
            (Electro, Pyro, Reaction::Overloaded),
            (Pyro, Electro, Reaction::Overloaded),
            (Electro, Cryo, Reaction::Superconduct),
            (Cryo, Electro, Reaction::Superconduct),
            (Electro, Hydro, Reaction::ElectroCharged),
            (Hydro, Electro, Reaction::ElectroCharged),
            (Hydro, Cryo, Reaction::Frozen),
            (Cryo, Hydro, Reaction::Frozen),
            (Pyro, Dendro, Reaction::Burning),
            (Dendro, Pyro, Reaction::Burning),
            (Hydro, Dendro, Reaction::Bloom),
            (Dendro, Hydro, Reaction::Bloom),
            (Electro, Dendro, Reaction::Quicken),
            (Dendro, Electro, Reaction::Quicken),
            (Anemo, Cryo, Reaction::Swirl(Cryo)),
            (Anemo, Hydro, Reaction::Swirl(Hydro)),
            (Anemo, Pyro, Reaction::Swirl(Pyro)),
            (Anemo, Electro, Reaction::Swirl(Electro)),
            (Geo, Cryo, Reaction::Crystallize),
            (Geo, Hydro, Reaction::Crystallize),
            (Geo, Pyro, Reaction::Crystallize),
            (Geo, Electro, Reaction::Crystallize),
        ];
        for &(attacking, applied, expected) in cases {
            let out = react(attacking, &aura(&[applied]));
            assert_eq!(out.reaction, expected, "{attacking:?} onto {applied:?}");
            assert_eq!(out.consumed, vec![applied, attacking]);
            assert!(out.remaining.is_empty());
        }
    }

    #[test]
    fn test_same_element_does_not_stack() {
        let out = react(Element::Pyro, &aura(&[Element::Pyro]));
        assert_eq!(out.reaction, Reaction::None);
        assert_eq!(out.remaining.elements(), vec![Element::Pyro]);
    }

    #[test]
    fn test_damage_bonus_table() {
        assert_eq!(Reaction::Melt.damage_bonus(), 2);
        assert_eq!(Reaction::Vaporize.damage_bonus(), 2);
        assert_eq!(Reaction::Overloaded.damage_bonus(), 2);
        assert_eq!(Reaction::Superconduct.damage_bonus(), 1);
        assert_eq!(Reaction::ElectroCharged.damage_bonus(), 1);
        assert_eq!(Reaction::Frozen.damage_bonus(), 1);
        assert_eq!(Reaction::Crystallize.damage_bonus(), 1);
        assert_eq!(Reaction::Burning.damage_bonus(), 1);
        assert_eq!(Reaction::Bloom.damage_bonus(), 1);
        assert_eq!(Reaction::Quicken.damage_bonus(), 1);
        assert_eq!(Reaction::Swirl(Element::Pyro).damage_bonus(), 0);
        assert_eq!(Reaction::None.damage_bonus(), 0);
    }

    #[test]
    fn test_splash_damage() {
        let src = ObjectPosition::new(PlayerId::P0, Area::Character, ObjectId::from_raw(1))
            .with_character(0);
        let bench = [ObjectId::from_raw(10), ObjectId::from_raw(11)];

        let piercing = splash_damage(Reaction::Superconduct, src, &bench);
        assert_eq!(piercing.len(), 2);
        assert!(piercing.iter().all(|d| d.damage_type == DamageType::Piercing));
        assert!(piercing.iter().all(|d| d.amount == 1));
        assert_eq!(piercing[0].target, TargetRule::Absolute(bench[0]));

        let swirl = splash_damage(Reaction::Swirl(Element::Hydro), src, &bench);
        assert!(
            swirl
                .iter()
                .all(|d| d.damage_type == DamageType::Elemental(Element::Hydro))
        );

        assert!(splash_damage(Reaction::Melt, src, &bench).is_empty());
        assert!(splash_damage(Reaction::None, src, &bench).is_empty());
    }
}
