//! The seven elements, damage typing, and applied-element (aura) state.

/// The seven elemental types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub enum Element {
    Cryo,
    Hydro,
    Pyro,
    Electro,
    Anemo,
    Geo,
    Dendro,
}

impl Element {
    pub const ALL: [Element; 7] = [
        Element::Cryo,
        Element::Hydro,
        Element::Pyro,
        Element::Electro,
        Element::Anemo,
        Element::Geo,
        Element::Dendro,
    ];

    /// Whether this element sticks to a character when no reaction fires.
    /// Anemo and geo never remain applied.
    pub fn can_be_applied(self) -> bool {
        !matches!(self, Element::Anemo | Element::Geo)
    }
}

/// The type of a single damage instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub enum DamageType {
    /// Non-elemental damage; does not apply an element or react.
    Physical,
    /// Ignores shields and damage modifiers; does not apply an element.
    Piercing,
    /// Elemental damage; applies its element and may trigger a reaction.
    Elemental(Element),
}

impl DamageType {
    /// The element carried by this damage, if any.
    pub fn element(self) -> Option<Element> {
        match self {
            DamageType::Elemental(e) => Some(e),
            _ => None,
        }
    }
}

/// The elements currently applied to a character.
///
/// At most two elements coexist, and only because dendro and cryo do not
/// react with each other. Application order is preserved: when a third
/// element arrives, it reacts with the earliest-applied element that has a
/// reaction entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Aura {
    slots: [Option<Element>; 2],
}

impl Aura {
    pub const EMPTY: Aura = Aura { slots: [None, None] };

    pub fn new() -> Self {
        Self::EMPTY
    }

    /// Build an aura from an ordered element list (earliest applied first).
    pub fn from_elements(elements: &[Element]) -> Self {
        let mut aura = Self::EMPTY;
        for &e in elements {
            aura.push(e);
        }
        aura
    }

    pub fn is_empty(&self) -> bool {
        self.slots[0].is_none() && self.slots[1].is_none()
    }

    pub fn contains(&self, element: Element) -> bool {
        self.slots.iter().any(|s| *s == Some(element))
    }

    /// Applied elements in application order.
    pub fn elements(&self) -> Vec<Element> {
        self.slots.iter().filter_map(|s| *s).collect()
    }

    /// Append an element. Saturates at two slots and ignores duplicates;
    /// the reaction resolver is responsible for never pushing a third
    /// distinct element.
    pub fn push(&mut self, element: Element) {
        if self.contains(element) {
            return;
        }
        for slot in self.slots.iter_mut() {
            if slot.is_none() {
                *slot = Some(element);
                return;
            }
        }
    }

    /// Remove an element, shifting any later application forward.
    pub fn remove(&mut self, element: Element) {
        if self.slots[0] == Some(element) {
            self.slots[0] = self.slots[1];
            self.slots[1] = None;
        } else if self.slots[1] == Some(element) {
            self.slots[1] = None;
        }
    }

    pub fn clear(&mut self) {
        self.slots = [None, None];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_application_rules() {
        assert!(Element::Cryo.can_be_applied());
        assert!(Element::Dendro.can_be_applied());
        assert!(!Element::Anemo.can_be_applied());
        assert!(!Element::Geo.can_be_applied());
    }

    #[test]
    fn test_damage_type_element() {
        assert_eq!(DamageType::Physical.element(), None);
        assert_eq!(DamageType::Piercing.element(), None);
        assert_eq!(
            DamageType::Elemental(Element::Pyro).element(),
            Some(Element::Pyro)
        );
    }

    #[test]
    fn test_aura_push_preserves_order() {
        let mut aura = Aura::new();
        aura.push(Element::Dendro);
        aura.push(Element::Cryo);
        assert_eq!(aura.elements(), vec![Element::Dendro, Element::Cryo]);
    }

    #[test]
    fn test_aura_ignores_duplicates() {
        let mut aura = Aura::new();
        aura.push(Element::Hydro);
        aura.push(Element::Hydro);
        assert_eq!(aura.elements(), vec![Element::Hydro]);
    }

    #[test]
    fn test_aura_remove_shifts() {
        let mut aura = Aura::from_elements(&[Element::Dendro, Element::Cryo]);
        aura.remove(Element::Dendro);
        assert_eq!(aura.elements(), vec![Element::Cryo]);
        aura.remove(Element::Cryo);
        assert!(aura.is_empty());
    }
}
