//! Deck descriptions: the text interchange format and deck validation.
//!
//! The format is line-oriented, one directive per line:
//!
//! ```text
//! # comment
//! default_version:1.0
//! character:Kaeya
//! character:Diluc@1.0
//! Strategize*2
//! Sweet Madame@1.0*2
//! ```
//!
//! `default_version:<tag>` sets an implicit version for untagged entries;
//! `character:` lines add roster members; every other non-empty line is a
//! card name with optional `@version` and `*count` suffixes.

use crate::catalogue;
use crate::catalogue::CardRequirement;

/// Roster size of a valid deck.
pub const CHARACTERS_PER_DECK: usize = 3;
/// Card count of a valid deck.
pub const CARDS_PER_DECK: usize = 30;
/// Maximum copies of one card.
pub const MAX_CARD_COPIES: u8 = 2;

/// One parsed deck line.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub struct DeckEntry {
    pub name: String,
    pub version: Option<String>,
    pub count: u8,
}

/// A parsed deck description.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub struct Deck {
    pub characters: Vec<DeckEntry>,
    pub cards: Vec<DeckEntry>,
}

/// Parse failures, with the 1-based offending line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeckParseError {
    EmptyName { line: usize },
    BadCount { line: usize },
}

/// Validation failures against the catalogue and deck-building rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeckError {
    WrongCharacterCount { found: usize },
    WrongCardCount { found: usize },
    DuplicateCharacter { name: String },
    TooManyCopies { name: String },
    UnknownCharacter { name: String },
    UnknownCard { name: String },
    TalentWithoutCharacter { card: String, character: String },
}

impl Deck {
    /// Parse a deck description.
    pub fn parse(text: &str) -> Result<Deck, DeckParseError> {
        let mut deck = Deck::default();
        let mut default_version: Option<String> = None;

        for (index, raw) in text.lines().enumerate() {
            let line_no = index + 1;
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some(tag) = line.strip_prefix("default_version:") {
                default_version = Some(tag.trim().to_string());
                continue;
            }
            if let Some(rest) = line.strip_prefix("character:") {
                let entry = parse_entry(rest.trim(), default_version.as_deref(), line_no)?;
                deck.characters.push(entry);
                continue;
            }
            let entry = parse_entry(line, default_version.as_deref(), line_no)?;
            deck.cards.push(entry);
        }
        Ok(deck)
    }

    /// Expanded character names, one per roster slot.
    pub fn character_names(&self) -> Vec<&str> {
        expand(&self.characters)
    }

    /// Expanded card names, one per deck copy.
    pub fn card_names(&self) -> Vec<&str> {
        expand(&self.cards)
    }

    /// Check the deck against the catalogue and deck-building rules.
    pub fn validate(&self) -> Result<(), DeckError> {
        let roster = self.character_names();
        if roster.len() != CHARACTERS_PER_DECK {
            return Err(DeckError::WrongCharacterCount { found: roster.len() });
        }
        for entry in &self.characters {
            if entry.count > 1 || roster.iter().filter(|n| **n == entry.name).count() > 1 {
                return Err(DeckError::DuplicateCharacter {
                    name: entry.name.clone(),
                });
            }
            if catalogue::character_definition(&entry.name, entry.version.as_deref()).is_none() {
                return Err(DeckError::UnknownCharacter {
                    name: entry.name.clone(),
                });
            }
        }

        let cards = self.card_names();
        if cards.len() != CARDS_PER_DECK {
            return Err(DeckError::WrongCardCount { found: cards.len() });
        }
        for entry in &self.cards {
            let copies = cards.iter().filter(|n| **n == entry.name).count();
            if copies > MAX_CARD_COPIES as usize {
                return Err(DeckError::TooManyCopies {
                    name: entry.name.clone(),
                });
            }
            let Some(definition) =
                catalogue::card_definition(&entry.name, entry.version.as_deref())
            else {
                return Err(DeckError::UnknownCard {
                    name: entry.name.clone(),
                });
            };
            // Talent equips are dead cards without their character.
            if let CardRequirement::NamedCharacter(character) = definition.requirement
                && !roster.iter().any(|n| *n == character)
            {
                return Err(DeckError::TalentWithoutCharacter {
                    card: entry.name.clone(),
                    character: character.to_string(),
                });
            }
        }
        Ok(())
    }
}

fn expand(entries: &[DeckEntry]) -> Vec<&str> {
    let mut out = Vec::new();
    for entry in entries {
        for _ in 0..entry.count {
            out.push(entry.name.as_str());
        }
    }
    out
}

/// Parse `name[@version][*count]`.
fn parse_entry(
    text: &str,
    default_version: Option<&str>,
    line: usize,
) -> Result<DeckEntry, DeckParseError> {
    let (rest, count) = match text.rsplit_once('*') {
        Some((rest, count_text)) => {
            let count: u8 = count_text
                .trim()
                .parse()
                .map_err(|_| DeckParseError::BadCount { line })?;
            if count == 0 {
                return Err(DeckParseError::BadCount { line });
            }
            (rest.trim(), count)
        }
        None => (text, 1),
    };
    let (name, version) = match rest.rsplit_once('@') {
        Some((name, version)) => (name.trim(), Some(version.trim().to_string())),
        None => (rest.trim(), default_version.map(str::to_string)),
    };
    if name.is_empty() {
        return Err(DeckParseError::EmptyName { line });
    }
    Ok(DeckEntry {
        name: name.to_string(),
        version,
        count,
    })
}

/// A ready-to-play demo deck exercising the whole catalogue.
pub fn demo_deck(characters: [&str; 3]) -> Deck {
    let text = format!(
        "default_version:1.0\n\
         character:{}\ncharacter:{}\ncharacter:{}\n\
         Strategize*2\n\
         Sweet Madame*2\n\
         Mondstadt Hash Brown*2\n\
         Northern Smoked Chicken*2\n\
         Lotus Flower Crisp*2\n\
         Adeptus' Temptation*2\n\
         Starsigns*2\n\
         The Bestest Travel Companion!*2\n\
         Changing Shifts*2\n\
         Leave It to Me!*2\n\
         I Haven't Lost Yet!*2\n\
         Traveler's Handy Sword*2\n\
         Paimon*2\n\
         Favonius Cathedral*2\n\
         Liyue Harbor Wharf*2\n",
        characters[0], characters[1], characters[2],
    );
    Deck::parse(&text).expect("demo deck parses")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_directives() {
        let deck = Deck::parse(
            "# a comment\n\
             default_version:1.0\n\
             character:Kaeya\n\
             character:Diluc@1.0\n\
             \n\
             Strategize*2\n\
             Sweet Madame@1.0\n",
        )
        .unwrap();
        assert_eq!(deck.characters.len(), 2);
        assert_eq!(deck.characters[0].version.as_deref(), Some("1.0"));
        assert_eq!(deck.characters[1].version.as_deref(), Some("1.0"));
        assert_eq!(deck.cards[0].count, 2);
        assert_eq!(deck.card_names().len(), 3);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            Deck::parse("Strategize*x"),
            Err(DeckParseError::BadCount { line: 1 })
        );
        assert_eq!(
            Deck::parse("Strategize*0"),
            Err(DeckParseError::BadCount { line: 1 })
        );
        assert_eq!(
            Deck::parse("character: *2"),
            Err(DeckParseError::EmptyName { line: 1 })
        );
    }

    #[test]
    fn test_demo_deck_is_valid() {
        // The Kaeya roster may carry his talent card; swap two copies in.
        let mut deck = demo_deck(["Kaeya", "Diluc", "Fischl"]);
        deck.cards.pop();
        deck.cards.push(DeckEntry {
            name: "Cold-Blooded Strike".to_string(),
            version: Some("1.0".to_string()),
            count: 2,
        });
        assert_eq!(deck.validate(), Ok(()));
    }

    #[test]
    fn test_validate_counts() {
        let deck = Deck::parse("character:Kaeya\ncharacter:Diluc\n").unwrap();
        assert_eq!(
            deck.validate(),
            Err(DeckError::WrongCharacterCount { found: 2 })
        );

        let mut deck = demo_deck(["Kaeya", "Diluc", "Fischl"]);
        deck.cards.pop();
        assert!(matches!(
            deck.validate(),
            Err(DeckError::WrongCardCount { .. })
        ));
    }

    #[test]
    fn test_validate_copies_and_lookups() {
        let mut deck = demo_deck(["Kaeya", "Diluc", "Fischl"]);
        // Three Strategize total (2 + 1 already) plus one more breaks the cap.
        deck.cards.pop();
        deck.cards.push(DeckEntry {
            name: "Strategize".to_string(),
            version: None,
            count: 2,
        });
        assert_eq!(
            deck.validate(),
            Err(DeckError::TooManyCopies {
                name: "Strategize".to_string()
            })
        );

        let deck = Deck::parse("character:Nobody\ncharacter:Kaeya\ncharacter:Diluc\n").unwrap();
        assert_eq!(
            deck.validate(),
            Err(DeckError::UnknownCharacter {
                name: "Nobody".to_string()
            })
        );
    }

    #[test]
    fn test_talent_needs_its_character() {
        let mut deck = demo_deck(["Barbara", "Diluc", "Fischl"]);
        deck.cards.pop();
        deck.cards.push(DeckEntry {
            name: "Cold-Blooded Strike".to_string(),
            version: None,
            count: 2,
        });
        assert_eq!(
            deck.validate(),
            Err(DeckError::TalentWithoutCharacter {
                card: "Cold-Blooded Strike".to_string(),
                character: "Kaeya".to_string(),
            })
        );
    }
}
