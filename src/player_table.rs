//! Per-player aggregate state.
//!
//! A `PlayerTable` holds the ids of everything a player owns plus the dice
//! pool and round-scoped flags. It is owned exclusively by the match and
//! mutated only through actions naming the target player; it deliberately
//! stores ids, never object references; the registry is the one arena.

use crate::dice::DicePool;
use crate::ids::{ObjectId, PlayerId};

#[derive(Debug, Clone, Default)]
pub struct PlayerTable {
    pub player: PlayerId,
    /// Roster in fixed slot order; characters stay listed when defeated.
    pub characters: Vec<ObjectId>,
    /// Index into `characters`; `None` before the opening choice.
    pub active_character: Option<u8>,
    pub hand: Vec<ObjectId>,
    /// Draw order: the last element is the top of the deck.
    pub deck: Vec<ObjectId>,
    pub discard: Vec<ObjectId>,
    pub dice: DicePool,
    pub team_statuses: Vec<ObjectId>,
    pub summons: Vec<ObjectId>,
    pub supports: Vec<ObjectId>,
    pub declared_end: bool,
    pub reroll_chances: u8,
    /// Set when one of this player's characters was defeated this round
    /// (gates recovery cards).
    pub died_this_round: bool,
}

impl PlayerTable {
    pub fn new(player: PlayerId) -> Self {
        Self {
            player,
            ..Self::default()
        }
    }

    pub fn active_character_id(&self) -> Option<ObjectId> {
        self.active_character
            .and_then(|i| self.characters.get(i as usize).copied())
    }

    pub fn character_id(&self, index: u8) -> Option<ObjectId> {
        self.characters.get(index as usize).copied()
    }

    pub fn character_slot(&self, id: ObjectId) -> Option<u8> {
        self.characters.iter().position(|c| *c == id).map(|i| i as u8)
    }

    pub fn hand_size(&self) -> u8 {
        self.hand.len() as u8
    }

    /// Drop an id from whatever list holds it (hand, deck, discard,
    /// statuses, summons, supports). Roster slots are kept: defeated
    /// characters remain addressable.
    pub fn forget(&mut self, id: ObjectId) {
        for list in [
            &mut self.hand,
            &mut self.deck,
            &mut self.discard,
            &mut self.team_statuses,
            &mut self.summons,
            &mut self.supports,
        ] {
            list.retain(|x| *x != id);
        }
    }

    /// Reset round-scoped flags at the start of a new round.
    pub fn begin_round(&mut self) {
        self.declared_end = false;
        self.died_this_round = false;
        self.reroll_chances = 0;
        self.dice.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_character_lookup() {
        let mut table = PlayerTable::new(PlayerId::P0);
        table.characters = vec![ObjectId::from_raw(1), ObjectId::from_raw(2)];
        assert_eq!(table.active_character_id(), None);
        table.active_character = Some(1);
        assert_eq!(table.active_character_id(), Some(ObjectId::from_raw(2)));
        assert_eq!(table.character_slot(ObjectId::from_raw(1)), Some(0));
        assert_eq!(table.character_slot(ObjectId::from_raw(9)), None);
    }

    #[test]
    fn test_forget_leaves_roster_intact() {
        let mut table = PlayerTable::new(PlayerId::P1);
        table.characters = vec![ObjectId::from_raw(1)];
        table.hand = vec![ObjectId::from_raw(5), ObjectId::from_raw(6)];
        table.summons = vec![ObjectId::from_raw(7)];
        table.forget(ObjectId::from_raw(5));
        table.forget(ObjectId::from_raw(7));
        assert_eq!(table.hand, vec![ObjectId::from_raw(6)]);
        assert!(table.summons.is_empty());
        assert_eq!(table.characters.len(), 1);
    }

    #[test]
    fn test_begin_round_resets_flags() {
        let mut table = PlayerTable::new(PlayerId::P0);
        table.declared_end = true;
        table.died_this_round = true;
        table.reroll_chances = 2;
        table.dice.add(crate::dice::DiceColor::Omni, 3);
        table.begin_round();
        assert!(!table.declared_end);
        assert!(!table.died_this_round);
        assert_eq!(table.reroll_chances, 0);
        assert!(table.dice.is_empty());
    }
}
