//! Object positions: where a rule-object currently lives.

use crate::ids::{ObjectId, PlayerId};

/// The board area a rule-object occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub enum Area {
    Hand,
    Deck,
    Discard,
    Character,
    CharacterStatus,
    TeamStatus,
    Summon,
    Support,
    Skill,
    System,
}

impl Area {
    /// Areas whose objects are anchored to a specific character slot.
    pub fn needs_character_index(self) -> bool {
        matches!(self, Area::Character | Area::CharacterStatus | Area::Skill)
    }

    /// Areas whose contents are hidden from the opponent.
    pub fn is_hidden(self) -> bool {
        matches!(self, Area::Hand | Area::Deck)
    }
}

/// The full address of a rule-object.
///
/// Player and id are stable for the object's lifetime; area and character
/// index change as the object moves (deck to hand, hand to discard).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub struct ObjectPosition {
    pub player: PlayerId,
    pub character_index: Option<u8>,
    pub area: Area,
    pub id: ObjectId,
}

impl ObjectPosition {
    pub fn new(player: PlayerId, area: Area, id: ObjectId) -> Self {
        Self {
            player,
            character_index: None,
            area,
            id,
        }
    }

    pub fn with_character(mut self, index: u8) -> Self {
        self.character_index = Some(index);
        self
    }

    /// Structural validity: character-anchored areas carry an index, others
    /// do not.
    pub fn is_well_formed(&self) -> bool {
        self.area.needs_character_index() == self.character_index.is_some()
    }
}
