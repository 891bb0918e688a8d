/// Player identifier, index-based. A match always has exactly two players.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub struct PlayerId(pub u8);

impl PlayerId {
    pub const P0: PlayerId = PlayerId(0);
    pub const P1: PlayerId = PlayerId(1);

    pub const BOTH: [PlayerId; 2] = [PlayerId::P0, PlayerId::P1];

    /// Create a player ID from a specific index.
    pub fn from_index(index: u8) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// The other player in a two-player match.
    pub fn opponent(self) -> Self {
        Self(1 - self.0)
    }
}

/// Unique rule-object identifier, assigned by the registry at registration.
///
/// Ids are match-local and monotonically increasing; they are never reused,
/// even after the object is unregistered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub struct ObjectId(pub u32);

impl ObjectId {
    /// Create an object ID from a specific value (for when you need explicit control).
    pub fn from_raw(id: u32) -> Self {
        Self(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_id_opponent() {
        assert_eq!(PlayerId::P0.opponent(), PlayerId::P1);
        assert_eq!(PlayerId::P1.opponent(), PlayerId::P0);
        assert_eq!(PlayerId::P0.index(), 0);
        assert_eq!(PlayerId::P1.index(), 1);
    }

    #[test]
    fn test_object_id_from_raw() {
        let a = ObjectId::from_raw(100);
        let b = ObjectId::from_raw(200);
        assert_ne!(a, b);
        assert_eq!(a.0, 100);
    }
}
