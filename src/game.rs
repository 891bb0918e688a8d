//! The match: state machine, phase driver, and the public
//! start/respond/step/need_respond contract.
//!
//! A match owns everything mutable (the two player tables, the registry
//! arena, the action queue, and the single seeded generator) and exposes
//! only the narrow driver API. Execution is strictly sequential: one
//! action, including every cascade it spawns, completes before the next
//! queued action begins, and the only suspension point is the explicit
//! halt awaiting a response.

use std::collections::VecDeque;
use std::fmt;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::action::Action;
use crate::character::CharacterState;
use crate::catalogue;
use crate::catalogue::statuses::StatusObject;
use crate::deck::{Deck, DeckError};
use crate::ids::{ObjectId, PlayerId};
use crate::log::{LogEvent, MatchLog};
use crate::object::{GameObject, ObjectKind, RuleObject, StatusScope};
use crate::player_table::PlayerTable;
use crate::position::{Area, ObjectPosition};
use crate::registry::Registry;
use crate::request::{Request, Response};
use crate::system::{SystemHandler, SystemRole};

/// Internal engine invariant violations. Any of these moves the match to
/// `MatchStatus::Error`; they indicate a content or engine bug, never bad
/// player input, and are not retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchError {
    UnregisteredObject(ObjectId),
    UnknownCatalogueName(String),
    MissingCharacter { player: PlayerId, index: u8 },
    InvalidState(&'static str),
}

impl fmt::Display for MatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchError::UnregisteredObject(id) => {
                write!(f, "lookup of unregistered object {}", id.0)
            }
            MatchError::UnknownCatalogueName(name) => {
                write!(f, "unknown catalogue name {name:?}")
            }
            MatchError::MissingCharacter { player, index } => {
                write!(f, "missing character {index} for player {}", player.0)
            }
            MatchError::InvalidState(message) => write!(f, "invalid state: {message}"),
        }
    }
}

/// Errors from `Match::start`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartError {
    AlreadyStarted,
    InvalidDeck { player: PlayerId, error: DeckError },
    Internal(MatchError),
}

/// Errors from `Match::respond`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RespondError {
    /// The match is not waiting for input (not started, ended, or failed).
    NotAcceptingResponses,
    /// The response failed validation; state is untouched and a corrected
    /// response may be submitted.
    InvalidResponse,
}

/// The public match lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStatus {
    /// Created, not started.
    Waiting,
    /// Started, setup still in progress.
    Started,
    /// Halted awaiting the named player's response.
    PlayerChoosing(PlayerId),
    /// Processing the named player's accepted response.
    PlayerMidAction(PlayerId),
    Ended,
    /// An engine invariant was violated; the match is dead.
    Error,
}

/// Setup sub-stage before the first roll phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupStage {
    SwitchHand,
    ChooseActive,
}

/// The round phase driver's position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchPhase {
    Setup(SetupStage),
    Roll,
    Action,
    End,
}

/// Cards dealt to each opening hand.
pub const OPENING_HAND: u8 = 5;
/// Dice rolled at the start of each round.
pub const DICE_PER_ROUND: u8 = 8;
/// Cards drawn at the start of each round after the first.
pub const CARDS_PER_ROUND: u8 = 2;
/// Hand size cap; overdrawn cards are discarded.
pub const HAND_LIMIT: usize = 10;
/// Base reroll chances per roll phase, before modifiers.
pub const BASE_REROLLS: u8 = 1;

#[derive(Debug)]
pub struct Match {
    pub(crate) status: MatchStatus,
    pub(crate) phase: MatchPhase,
    pub(crate) round: u32,
    pub(crate) current_player: PlayerId,
    /// First player to declare round end; acts first next round.
    pub(crate) first_to_end: Option<PlayerId>,
    pub(crate) tables: [PlayerTable; 2],
    pub(crate) registry: Registry,
    pub(crate) queue: VecDeque<Action>,
    pub(crate) requests: Vec<Request>,
    pub(crate) rng: StdRng,
    pub(crate) winner: Option<PlayerId>,
    pub(crate) rolled_this_round: bool,
    pub(crate) log: MatchLog,
    pub(crate) error: Option<MatchError>,
    seed: u64,
}

impl Match {
    pub fn new(seed: u64) -> Self {
        Self {
            status: MatchStatus::Waiting,
            phase: MatchPhase::Setup(SetupStage::SwitchHand),
            round: 0,
            current_player: PlayerId::P0,
            first_to_end: None,
            tables: [PlayerTable::new(PlayerId::P0), PlayerTable::new(PlayerId::P1)],
            registry: Registry::new(),
            queue: VecDeque::new(),
            requests: Vec::new(),
            rng: StdRng::seed_from_u64(seed),
            winner: None,
            rolled_this_round: false,
            log: MatchLog::new(),
            error: None,
            seed,
        }
    }

    // ------------------------------------------------------------------
    // Public driver contract
    // ------------------------------------------------------------------

    /// Validate both decks, build the board, deal opening hands, and halt
    /// on the opening-hand requests.
    pub fn start(&mut self, decks: &[Deck; 2]) -> Result<(), StartError> {
        if self.status != MatchStatus::Waiting {
            return Err(StartError::AlreadyStarted);
        }
        for player in PlayerId::BOTH {
            decks[player.index()]
                .validate()
                .map_err(|error| StartError::InvalidDeck { player, error })?;
        }
        self.log.log(LogEvent::MatchStarted { seed: self.seed });

        // System handlers register first so priority ordering puts them
        // ahead of all content.
        self.registry.register(GameObject::System(SystemHandler::new(
            SystemRole::DefeatWatcher,
            ObjectPosition::new(PlayerId::P0, Area::System, ObjectId::from_raw(0)),
        )));

        for player in PlayerId::BOTH {
            let deck = &decks[player.index()];
            for (slot, entry) in deck.characters.iter().enumerate() {
                let definition = catalogue::character_definition(
                    &entry.name,
                    entry.version.as_deref(),
                )
                .expect("deck validated");
                let position = ObjectPosition::new(player, Area::Character, ObjectId::from_raw(0))
                    .with_character(slot as u8);
                let id = self
                    .registry
                    .register(GameObject::Character(CharacterState::new(definition, position)));
                self.tables[player.index()].characters.push(id);
            }
            for entry in &deck.cards {
                for _ in 0..entry.count {
                    let definition =
                        catalogue::card_definition(&entry.name, entry.version.as_deref())
                            .expect("deck validated");
                    let position =
                        ObjectPosition::new(player, Area::Deck, ObjectId::from_raw(0));
                    let id = self.registry.register(GameObject::Card(
                        catalogue::CardState::new(definition, position),
                    ));
                    self.tables[player.index()].deck.push(id);
                }
            }
            self.tables[player.index()].deck.shuffle(&mut self.rng);
        }

        self.status = MatchStatus::Started;
        self.phase = MatchPhase::Setup(SetupStage::SwitchHand);
        self.round = 0;

        for player in PlayerId::BOTH {
            self.queue.push_back(Action::DrawCard {
                player,
                count: OPENING_HAND,
            });
        }
        if let Err(error) = self.run_queue() {
            self.enter_error(error.clone());
            return Err(StartError::Internal(error));
        }
        self.issue_switch_hand_requests();
        self.update_waiting_status();
        Ok(())
    }

    /// Advance until the match ends or a response is required.
    pub fn step(&mut self) {
        if matches!(
            self.status,
            MatchStatus::Waiting | MatchStatus::Ended | MatchStatus::Error
        ) {
            return;
        }
        loop {
            if self.is_game_end() || !self.requests.is_empty() {
                break;
            }
            if let Some(action) = self.queue.pop_front() {
                if let Err(error) = self.apply_and_dispatch(action) {
                    self.enter_error(error);
                    return;
                }
                continue;
            }
            if let Err(error) = self.advance_phase() {
                self.enter_error(error);
                return;
            }
            if self.queue.is_empty() && self.requests.is_empty() && !self.is_game_end() {
                // The driver made no progress; stopping here turns a logic
                // bug into a diagnosable failure instead of a spin.
                self.enter_error(MatchError::InvalidState("phase driver made no progress"));
                return;
            }
        }
        self.update_waiting_status();
    }

    pub fn need_respond(&self, player: PlayerId) -> bool {
        self.has_request_for(player)
    }

    /// Validate and accept a response, converting it into queued actions.
    /// Invalid responses are rejected without any state change.
    pub fn respond(&mut self, response: &Response) -> Result<(), RespondError> {
        if !matches!(
            self.status,
            MatchStatus::Started | MatchStatus::PlayerChoosing(_) | MatchStatus::PlayerMidAction(_)
        ) {
            return Err(RespondError::NotAcceptingResponses);
        }
        if !response.is_valid(self) {
            return Err(RespondError::InvalidResponse);
        }
        let player = response.player();
        let actions = match self.actions_for_response(response) {
            Ok(actions) => actions,
            Err(error) => {
                self.enter_error(error);
                return Err(RespondError::NotAcceptingResponses);
            }
        };
        // A player never has two independent decision points outstanding;
        // accepting one response consumes all of their requests.
        self.requests.retain(|r| r.player() != player);
        self.log.log(LogEvent::ResponseAccepted {
            player,
            name: response.name(),
        });
        for action in actions.into_iter().rev() {
            self.queue.push_front(action);
        }
        self.status = MatchStatus::PlayerMidAction(player);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Inspection
    // ------------------------------------------------------------------

    pub fn is_game_end(&self) -> bool {
        matches!(self.status, MatchStatus::Ended | MatchStatus::Error)
    }

    pub fn winner(&self) -> Option<PlayerId> {
        self.winner
    }

    pub fn round_number(&self) -> u32 {
        self.round
    }

    pub fn current_player(&self) -> PlayerId {
        self.current_player
    }

    pub fn status(&self) -> MatchStatus {
        self.status
    }

    pub fn phase(&self) -> MatchPhase {
        self.phase
    }

    pub fn requests(&self) -> &[Request] {
        &self.requests
    }

    pub fn table(&self, player: PlayerId) -> &PlayerTable {
        &self.tables[player.index()]
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn log(&self) -> &MatchLog {
        &self.log
    }

    /// The invariant violation that moved the match to `Error`, if any.
    pub fn failure(&self) -> Option<&MatchError> {
        self.error.as_ref()
    }

    // ------------------------------------------------------------------
    // Phase driver
    // ------------------------------------------------------------------

    /// Called when the queue is empty and no requests are outstanding:
    /// push the match into its next decision point or phase.
    fn advance_phase(&mut self) -> Result<(), MatchError> {
        match self.phase {
            MatchPhase::Setup(SetupStage::SwitchHand) => {
                // Both opening hands are settled; pick active characters.
                self.phase = MatchPhase::Setup(SetupStage::ChooseActive);
                self.issue_choose_character_requests();
                Ok(())
            }
            MatchPhase::Setup(SetupStage::ChooseActive) => {
                if self.tables.iter().any(|t| t.active_character.is_none()) {
                    return Err(MatchError::InvalidState(
                        "setup finished without active characters",
                    ));
                }
                self.round = 1;
                self.log.log(LogEvent::RoundStarted { round: 1 });
                self.phase = MatchPhase::Roll;
                self.begin_roll_phase()
            }
            MatchPhase::Roll => {
                if !self.rolled_this_round {
                    return self.begin_roll_phase();
                }
                if self.issue_reroll_requests() > 0 {
                    return Ok(());
                }
                self.queue.push_back(Action::BeginActionPhase);
                Ok(())
            }
            MatchPhase::Action => {
                if self.tables.iter().all(|t| t.declared_end) {
                    self.queue.push_back(Action::BeginEndPhase);
                    return Ok(());
                }
                self.generate_turn_requests()
            }
            MatchPhase::End => {
                // End-phase cascade has drained; open the next round.
                let first = self.first_to_end.unwrap_or(self.current_player);
                self.queue.push_back(Action::RoundStart);
                for player in [first, first.opponent()] {
                    self.queue.push_back(Action::DrawCard {
                        player,
                        count: CARDS_PER_ROUND,
                    });
                }
                Ok(())
            }
        }
    }

    /// Set up the roll phase: resolve reroll chances and roll both pools.
    pub(crate) fn begin_roll_phase(&mut self) -> Result<(), MatchError> {
        use crate::modifier::{ModifiableValue, ModifierKind, ResolveMode};
        for player in [self.current_player, self.current_player.opponent()] {
            let mut value = ModifiableValue::RerollCount {
                player,
                chances: BASE_REROLLS,
            };
            self.resolve_value(
                ModifierKind::RerollCount,
                &mut value,
                player,
                None,
                ResolveMode::Real,
            )?;
            let chances = match value {
                ModifiableValue::RerollCount { chances, .. } => chances,
                _ => return Err(MatchError::InvalidState("reroll pipeline corrupted value")),
            };
            self.tables[player.index()].reroll_chances = chances;
            self.queue.push_back(Action::RollDice {
                player,
                count: DICE_PER_ROUND,
            });
        }
        self.rolled_this_round = true;
        Ok(())
    }

    /// Drain the queue outside of `step` (setup dealing).
    fn run_queue(&mut self) -> Result<(), MatchError> {
        while let Some(action) = self.queue.pop_front() {
            self.apply_and_dispatch(action)?;
        }
        Ok(())
    }

    pub(crate) fn enter_error(&mut self, error: MatchError) {
        self.status = MatchStatus::Error;
        self.error = Some(error);
        self.queue.clear();
        self.requests.clear();
    }

    // ------------------------------------------------------------------
    // Shared lookups
    // ------------------------------------------------------------------

    pub(crate) fn character(
        &self,
        player: PlayerId,
        index: u8,
    ) -> Result<&CharacterState, MatchError> {
        let id = self.tables[player.index()]
            .character_id(index)
            .ok_or(MatchError::MissingCharacter { player, index })?;
        self.registry
            .get(id)?
            .as_character()
            .ok_or(MatchError::InvalidState("roster id is not a character"))
    }

    pub(crate) fn character_mut(
        &mut self,
        player: PlayerId,
        index: u8,
    ) -> Result<&mut CharacterState, MatchError> {
        let id = self.tables[player.index()]
            .character_id(index)
            .ok_or(MatchError::MissingCharacter { player, index })?;
        self.registry
            .get_mut(id)?
            .as_character_mut()
            .ok_or(MatchError::InvalidState("roster id is not a character"))
    }

    /// The active character of a player, when one is set and registered.
    pub fn active_character(&self, player: PlayerId) -> Option<&CharacterState> {
        let index = self.tables[player.index()].active_character?;
        self.character(player, index).ok()
    }

    pub(crate) fn alive_character_indices(&self, player: PlayerId) -> Vec<u8> {
        let table = &self.tables[player.index()];
        (0..table.characters.len() as u8)
            .filter(|i| self.character(player, *i).map(|c| c.alive).unwrap_or(false))
            .collect()
    }

    /// Ids of alive characters other than the given slot.
    pub(crate) fn other_alive_ids(&self, player: PlayerId, except: u8) -> Vec<ObjectId> {
        self.alive_character_indices(player)
            .into_iter()
            .filter(|i| *i != except)
            .filter_map(|i| self.tables[player.index()].character_id(i))
            .collect()
    }

    /// Next alive roster slot after `from`, wrapping; `None` when nobody
    /// else stands.
    pub(crate) fn next_alive(&self, player: PlayerId, from: u8) -> Option<u8> {
        let count = self.tables[player.index()].characters.len() as u8;
        (1..count)
            .map(|offset| (from + offset) % count)
            .find(|i| self.character(player, *i).map(|c| c.alive).unwrap_or(false))
    }

    /// Previous alive roster slot before `from`, wrapping.
    pub(crate) fn prev_alive(&self, player: PlayerId, from: u8) -> Option<u8> {
        let count = self.tables[player.index()].characters.len() as u8;
        (1..count)
            .map(|offset| (from + count - offset) % count)
            .find(|i| self.character(player, *i).map(|c| c.alive).unwrap_or(false))
    }

    /// Statuses attached to one character slot, in id order.
    pub(crate) fn character_statuses(&self, player: PlayerId, index: u8) -> Vec<&StatusObject> {
        self.registry
            .objects_sorted()
            .into_iter()
            .filter_map(|object| match object {
                GameObject::Status(status) => Some(status),
                _ => None,
            })
            .filter(|status| {
                let position = status.position();
                matches!(status.kind(), ObjectKind::Status(StatusScope::Character))
                    && position.player == player
                    && position.character_index == Some(index)
            })
            .collect()
    }

    pub(crate) fn has_character_status(
        &self,
        player: PlayerId,
        index: u8,
        name: &str,
    ) -> bool {
        self.character_statuses(player, index)
            .iter()
            .any(|s| s.name() == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deck::demo_deck;

    fn decks() -> [Deck; 2] {
        [
            demo_deck(["Kaeya", "Diluc", "Fischl"]),
            demo_deck(["Barbara", "Collei", "Ningguang"]),
        ]
    }

    #[test]
    fn test_new_match_is_waiting() {
        let m = Match::new(1);
        assert_eq!(m.status(), MatchStatus::Waiting);
        assert!(!m.is_game_end());
        assert_eq!(m.round_number(), 0);
    }

    #[test]
    fn test_start_deals_hands_and_requests_switch() {
        let mut m = Match::new(1);
        m.start(&decks()).unwrap();
        for player in PlayerId::BOTH {
            assert_eq!(m.table(player).hand_size(), OPENING_HAND);
            assert_eq!(
                m.table(player).deck.len(),
                crate::deck::CARDS_PER_DECK - OPENING_HAND as usize
            );
            assert!(m.need_respond(player));
            assert_eq!(m.table(player).characters.len(), 3);
        }
        assert!(matches!(m.status(), MatchStatus::PlayerChoosing(_)));
    }

    #[test]
    fn test_start_twice_fails() {
        let mut m = Match::new(1);
        m.start(&decks()).unwrap();
        assert_eq!(m.start(&decks()), Err(StartError::AlreadyStarted));
    }

    #[test]
    fn test_start_rejects_invalid_deck() {
        let mut m = Match::new(1);
        let mut bad = decks();
        bad[1].cards.pop();
        match m.start(&bad) {
            Err(StartError::InvalidDeck { player, .. }) => assert_eq!(player, PlayerId::P1),
            other => panic!("expected invalid deck, got {other:?}"),
        }
        assert_eq!(m.status(), MatchStatus::Waiting);
    }

    #[test]
    fn test_respond_rejects_before_start() {
        let mut m = Match::new(1);
        let response = Response::DeclareRoundEnd { player: PlayerId::P0 };
        assert_eq!(
            m.respond(&response),
            Err(RespondError::NotAcceptingResponses)
        );
    }
}
