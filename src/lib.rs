pub mod action;
pub mod catalogue;
pub mod character;
pub mod cost;
pub mod damage;
pub mod deck;
pub mod dice;
pub mod element;
pub mod game;
pub mod ids;
pub mod log;
pub mod modifier;
pub mod object;
pub mod player_table;
pub mod position;
pub mod processor;
pub mod reaction;
pub mod registry;
pub mod request;
pub mod system;

#[cfg(test)]
mod tests;

pub use action::{
    Action, CardTarget, DamageTargetInfo, EventArguments, EventContext, EventKind,
    SwitchDirection,
};
pub use character::{
    CharacterDefinition, CharacterState, Creation, SkillDefinition, SkillKind,
};
pub use cost::{Cost, CostLabel, select_payment};
pub use damage::{DamageKind, DamageValue, FinalDamageValue, TargetRule};
pub use deck::{
    CARDS_PER_DECK, CHARACTERS_PER_DECK, Deck, DeckEntry, DeckError, DeckParseError,
    MAX_CARD_COPIES, demo_deck,
};
pub use dice::{DiceColor, DicePool};
pub use element::{Aura, DamageType, Element};
pub use game::{
    Match, MatchError, MatchPhase, MatchStatus, RespondError, SetupStage, StartError,
};
pub use ids::{ObjectId, PlayerId};
pub use log::{LogEvent, MatchLog};
pub use modifier::{ModifiableValue, ModifierKind, ResolveMode};
pub use object::{CardKind, GameObject, ObjectKind, RuleObject, StatusScope};
pub use player_table::PlayerTable;
pub use position::{Area, ObjectPosition};
pub use reaction::{Reaction, ReactionOutcome, react, splash_damage};
pub use registry::Registry;
pub use request::{CardOption, Request, Response, SkillOption};
pub use system::{SystemHandler, SystemRole};
