//! The request/response protocol between the engine and its drivers.
//!
//! When the match needs a decision it computes the exhaustive legal option
//! set, materializes `Request` records and halts. A driver answers with a
//! `Response` naming its originating request kind; `Response::is_valid` is
//! a pure check: no state is touched until a response has been accepted,
//! so rejection and retry are always safe.
//!
//! The `name` tags and field sets here are the wire contract; drivers
//! pattern-match on them and they must stay structurally stable.

use crate::action::{Action, CardTarget};
use crate::catalogue::CardRequirement;
use crate::cost::{Cost, CostLabel, select_payment};
use crate::dice::DiceColor;
use crate::element::Element;
use crate::game::{Match, MatchError, MatchStatus};
use crate::ids::{ObjectId, PlayerId};
use crate::log::LogEvent;
use crate::modifier::{ModifiableValue, ModifierKind, ResolveMode};
use crate::object::RuleObject;

/// One legal skill activation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub struct SkillOption {
    pub skill_index: u8,
    pub name: String,
    /// Effective cost after the modifier pipeline (TEST mode).
    pub cost: Cost,
}

/// One legal card play.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub struct CardOption {
    pub hand_index: u8,
    pub id: ObjectId,
    pub name: String,
    /// Effective cost after the modifier pipeline (TEST mode).
    pub cost: Cost,
    /// Legal character targets; empty when the card takes none.
    pub targets: Vec<u8>,
}

/// A decision the engine is waiting on.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serialization", serde(tag = "name"))]
pub enum Request {
    /// Replace any subset of the opening hand.
    SwitchHand { player: PlayerId, hand_size: u8 },
    /// Pick an active character (opening choice and post-defeat).
    ChooseCharacter { player: PlayerId, candidates: Vec<u8> },
    /// Reroll any subset of the rolled dice.
    RerollDice {
        player: PlayerId,
        dice: Vec<DiceColor>,
        chances: u8,
    },
    UseSkill {
        player: PlayerId,
        character_index: u8,
        options: Vec<SkillOption>,
    },
    PlayCard { player: PlayerId, options: Vec<CardOption> },
    SwitchCharacter {
        player: PlayerId,
        targets: Vec<u8>,
        /// Effective cost after the modifier pipeline (TEST mode).
        cost: Cost,
        /// Whether the switch resolves as a fast action.
        fast: bool,
    },
    /// Convert one die plus one discarded card into the active element.
    ElementalTuning { player: PlayerId, element: Element },
    DeclareRoundEnd { player: PlayerId },
}

impl Request {
    pub fn player(&self) -> PlayerId {
        match self {
            Request::SwitchHand { player, .. }
            | Request::ChooseCharacter { player, .. }
            | Request::RerollDice { player, .. }
            | Request::UseSkill { player, .. }
            | Request::PlayCard { player, .. }
            | Request::SwitchCharacter { player, .. }
            | Request::ElementalTuning { player, .. }
            | Request::DeclareRoundEnd { player } => *player,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Request::SwitchHand { .. } => "switch_hand",
            Request::ChooseCharacter { .. } => "choose_character",
            Request::RerollDice { .. } => "reroll_dice",
            Request::UseSkill { .. } => "use_skill",
            Request::PlayCard { .. } => "play_card",
            Request::SwitchCharacter { .. } => "switch_character",
            Request::ElementalTuning { .. } => "elemental_tuning",
            Request::DeclareRoundEnd { .. } => "declare_round_end",
        }
    }
}

/// A driver's answer to one outstanding request.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serialization", serde(tag = "name"))]
pub enum Response {
    SwitchHand {
        player: PlayerId,
        /// Hand indices to shuffle back; pairwise unique.
        hand_indices: Vec<u8>,
    },
    ChooseCharacter { player: PlayerId, character_index: u8 },
    RerollDice {
        player: PlayerId,
        /// Indices into the request's dice list; pairwise unique.
        dice_indices: Vec<u8>,
    },
    UseSkill {
        player: PlayerId,
        option_index: u8,
        /// The dice paid; must satisfy the option's embedded cost exactly.
        dice: Vec<DiceColor>,
    },
    PlayCard {
        player: PlayerId,
        option_index: u8,
        target_index: Option<u8>,
        dice: Vec<DiceColor>,
    },
    SwitchCharacter {
        player: PlayerId,
        to_index: u8,
        dice: Vec<DiceColor>,
    },
    ElementalTuning {
        player: PlayerId,
        hand_index: u8,
        die: DiceColor,
    },
    DeclareRoundEnd { player: PlayerId },
}

impl Response {
    pub fn player(&self) -> PlayerId {
        match self {
            Response::SwitchHand { player, .. }
            | Response::ChooseCharacter { player, .. }
            | Response::RerollDice { player, .. }
            | Response::UseSkill { player, .. }
            | Response::PlayCard { player, .. }
            | Response::SwitchCharacter { player, .. }
            | Response::ElementalTuning { player, .. }
            | Response::DeclareRoundEnd { player } => *player,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Response::SwitchHand { .. } => "switch_hand",
            Response::ChooseCharacter { .. } => "choose_character",
            Response::RerollDice { .. } => "reroll_dice",
            Response::UseSkill { .. } => "use_skill",
            Response::PlayCard { .. } => "play_card",
            Response::SwitchCharacter { .. } => "switch_character",
            Response::ElementalTuning { .. } => "elemental_tuning",
            Response::DeclareRoundEnd { .. } => "declare_round_end",
        }
    }

    /// Pure validation against the match's outstanding requests. Never
    /// mutates state; a rejected response can simply be corrected and
    /// retried.
    pub fn is_valid(&self, m: &Match) -> bool {
        let player = self.player();
        let charge = m
            .active_character(player)
            .map(|c| c.charge)
            .unwrap_or(0);
        let Some(request) = m.request_named(player, self.name()) else {
            return false;
        };
        let pool = &m.tables[player.index()].dice;

        match (self, request) {
            (
                Response::SwitchHand { hand_indices, .. },
                Request::SwitchHand { hand_size, .. },
            ) => in_range_unique(hand_indices, *hand_size),
            (
                Response::ChooseCharacter { character_index, .. },
                Request::ChooseCharacter { candidates, .. },
            ) => candidates.contains(character_index),
            (
                Response::RerollDice { dice_indices, .. },
                Request::RerollDice { dice, .. },
            ) => in_range_unique(dice_indices, dice.len() as u8),
            (
                Response::UseSkill { option_index, dice, .. },
                Request::UseSkill { options, .. },
            ) => {
                let Some(option) = options.get(*option_index as usize) else {
                    return false;
                };
                pool.contains_all(dice) && option.cost.is_valid(dice, charge, true)
            }
            (
                Response::PlayCard {
                    option_index,
                    target_index,
                    dice,
                    ..
                },
                Request::PlayCard { options, .. },
            ) => {
                let Some(option) = options.get(*option_index as usize) else {
                    return false;
                };
                let target_ok = if option.targets.is_empty() {
                    target_index.is_none()
                } else {
                    matches!(target_index, Some(t) if (*t as usize) < option.targets.len())
                };
                target_ok && pool.contains_all(dice) && option.cost.is_valid(dice, charge, true)
            }
            (
                Response::SwitchCharacter { to_index, dice, .. },
                Request::SwitchCharacter { targets, cost, .. },
            ) => {
                targets.contains(to_index)
                    && pool.contains_all(dice)
                    && cost.is_valid(dice, charge, true)
            }
            (
                Response::ElementalTuning { hand_index, die, .. },
                Request::ElementalTuning { element, .. },
            ) => {
                (*hand_index as usize) < m.tables[player.index()].hand.len()
                    && *die != DiceColor::Omni
                    && die.element() != Some(*element)
                    && pool.contains_all(&[*die])
            }
            (Response::DeclareRoundEnd { .. }, Request::DeclareRoundEnd { .. }) => true,
            _ => false,
        }
    }
}

fn in_range_unique(indices: &[u8], len: u8) -> bool {
    let mut seen = [false; 64];
    for &i in indices {
        if i >= len || i as usize >= seen.len() || seen[i as usize] {
            return false;
        }
        seen[i as usize] = true;
    }
    true
}

// ============================================================================
// Request generation and response conversion (engine side)
// ============================================================================

impl Match {
    /// The outstanding request of a given kind for a player.
    pub(crate) fn request_named(&self, player: PlayerId, name: &str) -> Option<&Request> {
        self.requests
            .iter()
            .find(|r| r.player() == player && r.name() == name)
    }

    fn push_request(&mut self, request: Request) {
        self.log.log(LogEvent::RequestIssued {
            player: request.player(),
            name: request.name(),
        });
        self.requests.push(request);
    }

    pub(crate) fn issue_switch_hand_requests(&mut self) {
        for player in PlayerId::BOTH {
            let hand_size = self.tables[player.index()].hand_size();
            self.push_request(Request::SwitchHand { player, hand_size });
        }
    }

    pub(crate) fn issue_choose_character_requests(&mut self) {
        for player in PlayerId::BOTH {
            self.push_choose_character_request(player);
        }
    }

    pub(crate) fn push_choose_character_request(&mut self, player: PlayerId) {
        let candidates = self.alive_character_indices(player);
        self.push_request(Request::ChooseCharacter { player, candidates });
    }

    /// Issue reroll requests for players with chances left. Returns how
    /// many were issued.
    pub(crate) fn issue_reroll_requests(&mut self) -> usize {
        let mut issued = 0;
        for player in PlayerId::BOTH {
            let chances = self.tables[player.index()].reroll_chances;
            if chances == 0 {
                continue;
            }
            let dice = self.tables[player.index()].dice.to_vec();
            self.push_request(Request::RerollDice {
                player,
                dice,
                chances,
            });
            issued += 1;
        }
        issued
    }

    /// Compute the full legal option set for the acting player's turn and
    /// materialize one request per action family.
    pub(crate) fn generate_turn_requests(&mut self) -> Result<(), MatchError> {
        let player = self.current_player;
        let Some(active_index) = self.tables[player.index()].active_character else {
            return Err(MatchError::InvalidState("action phase without active character"));
        };
        let (active_alive, charge, element, skills) = {
            let active = self.character(player, active_index)?;
            (
                active.alive,
                active.charge,
                active.element(),
                active.definition().skills.clone(),
            )
        };

        // Skills: blocked entirely by lockdown statuses (frozen).
        let blocked = self
            .character_statuses(player, active_index)
            .iter()
            .any(|s| s.blocks_skills());
        if active_alive && !blocked {
            let mut options = Vec::new();
            for (index, skill) in skills.iter().enumerate() {
                let cost = self.effective_cost(player, skill.cost)?;
                if cost.charge <= charge
                    && select_payment(&self.tables[player.index()].dice, &cost).is_some()
                {
                    options.push(SkillOption {
                        skill_index: index as u8,
                        name: skill.name.to_string(),
                        cost,
                    });
                }
            }
            if !options.is_empty() {
                self.push_request(Request::UseSkill {
                    player,
                    character_index: active_index,
                    options,
                });
            }
        }

        // Cards.
        let hand = self.tables[player.index()].hand.clone();
        let mut options = Vec::new();
        for (index, id) in hand.iter().enumerate() {
            let definition = self
                .registry
                .get(*id)?
                .as_card()
                .ok_or(MatchError::InvalidState("non-card object in hand"))?
                .definition()
                .clone();
            let cost = self.effective_cost(player, definition.cost)?;
            if select_payment(&self.tables[player.index()].dice, &cost).is_none() {
                continue;
            }
            let targets = match definition.requirement {
                CardRequirement::None => Vec::new(),
                CardRequirement::DiedThisRound => {
                    if !self.tables[player.index()].died_this_round {
                        continue;
                    }
                    Vec::new()
                }
                CardRequirement::OwnCharacter { not_satiated } => {
                    let targets: Vec<u8> = self
                        .alive_character_indices(player)
                        .into_iter()
                        .filter(|slot| {
                            !not_satiated || !self.has_character_status(player, *slot, "Satiated")
                        })
                        .collect();
                    if targets.is_empty() {
                        continue;
                    }
                    targets
                }
                CardRequirement::NamedCharacter(name) => {
                    let targets: Vec<u8> = self
                        .alive_character_indices(player)
                        .into_iter()
                        .filter(|slot| {
                            self.character(player, *slot)
                                .map(|c| c.definition().name == name)
                                .unwrap_or(false)
                        })
                        .collect();
                    if targets.is_empty() {
                        continue;
                    }
                    targets
                }
            };
            options.push(CardOption {
                hand_index: index as u8,
                id: *id,
                name: definition.name.to_string(),
                cost,
                targets,
            });
        }
        if !options.is_empty() {
            self.push_request(Request::PlayCard { player, options });
        }

        // Switch.
        let targets: Vec<u8> = self
            .alive_character_indices(player)
            .into_iter()
            .filter(|slot| *slot != active_index)
            .collect();
        if !targets.is_empty() {
            let cost =
                self.effective_cost(player, Cost::any(1).with_label(CostLabel::SWITCH))?;
            if select_payment(&self.tables[player.index()].dice, &cost).is_some() {
                let fast = self.switch_is_fast(player, ResolveMode::Test)?;
                self.push_request(Request::SwitchCharacter {
                    player,
                    targets,
                    cost,
                    fast,
                });
            }
        }

        // Tuning: needs a non-omni, off-element die and a card to discard.
        let tunable = self.tables[player.index()]
            .dice
            .to_vec()
            .iter()
            .any(|d| *d != DiceColor::Omni && d.element() != Some(element));
        if tunable && !hand.is_empty() {
            self.push_request(Request::ElementalTuning { player, element });
        }

        self.push_request(Request::DeclareRoundEnd { player });
        Ok(())
    }

    /// Run the cost pipeline in TEST mode for a request's embedded cost.
    pub(crate) fn effective_cost(
        &mut self,
        player: PlayerId,
        cost: Cost,
    ) -> Result<Cost, MatchError> {
        let mut value = ModifiableValue::Cost { player, cost };
        self.resolve_value(ModifierKind::Cost, &mut value, player, None, ResolveMode::Test)?;
        Ok(*value.expect_cost())
    }

    /// Run the combat-action pipeline for a pending switch.
    pub(crate) fn switch_is_fast(
        &mut self,
        player: PlayerId,
        mode: ResolveMode,
    ) -> Result<bool, MatchError> {
        let mut value = ModifiableValue::CombatAction {
            player,
            fast: false,
        };
        self.resolve_value(ModifierKind::CombatAction, &mut value, player, None, mode)?;
        match value {
            ModifiableValue::CombatAction { fast, .. } => Ok(fast),
            _ => Err(MatchError::InvalidState("combat-action pipeline corrupted value")),
        }
    }

    /// Convert an accepted response into the primitive actions it stands
    /// for. Runs the REAL-mode pipelines so limited-use modifiers are
    /// consumed exactly once, at commitment time.
    pub(crate) fn actions_for_response(
        &mut self,
        response: &Response,
    ) -> Result<Vec<Action>, MatchError> {
        let player = response.player();
        match response {
            Response::SwitchHand { hand_indices, .. } => {
                let hand = &self.tables[player.index()].hand;
                let ids: Vec<ObjectId> = hand_indices
                    .iter()
                    .filter_map(|i| hand.get(*i as usize).copied())
                    .collect();
                let mut actions: Vec<Action> = ids
                    .iter()
                    .map(|id| Action::RestoreCard {
                        player,
                        hand_id: *id,
                    })
                    .collect();
                if !ids.is_empty() {
                    actions.push(Action::DrawCard {
                        player,
                        count: ids.len() as u8,
                    });
                }
                Ok(actions)
            }
            Response::ChooseCharacter { character_index, .. } => Ok(vec![Action::SwitchCharacter {
                player,
                to_index: *character_index,
            }]),
            Response::RerollDice { dice_indices, .. } => {
                let Some(Request::RerollDice { dice, .. }) =
                    self.request_named(player, "reroll_dice").cloned()
                else {
                    return Err(MatchError::InvalidState("reroll response without request"));
                };
                let selected: Vec<DiceColor> = dice_indices
                    .iter()
                    .filter_map(|i| dice.get(*i as usize).copied())
                    .collect();
                let table = &mut self.tables[player.index()];
                if selected.is_empty() {
                    // Declining forfeits the remaining chances.
                    table.reroll_chances = 0;
                    return Ok(Vec::new());
                }
                table.reroll_chances -= 1;
                Ok(vec![
                    Action::RemoveDice {
                        player,
                        dice: selected.clone(),
                    },
                    Action::RollDice {
                        player,
                        count: selected.len() as u8,
                    },
                ])
            }
            Response::UseSkill {
                option_index, dice, ..
            } => {
                let Some(Request::UseSkill {
                    character_index,
                    options,
                    ..
                }) = self.request_named(player, "use_skill").cloned()
                else {
                    return Err(MatchError::InvalidState("skill response without request"));
                };
                let option = options
                    .get(*option_index as usize)
                    .ok_or(MatchError::InvalidState("skill option out of range"))?;
                // Commit the cost pipeline.
                let mut value = ModifiableValue::Cost {
                    player,
                    cost: option.cost,
                };
                self.resolve_value(
                    ModifierKind::Cost,
                    &mut value,
                    player,
                    None,
                    ResolveMode::Real,
                )?;
                let mut actions = Vec::new();
                if !dice.is_empty() {
                    actions.push(Action::RemoveDice {
                        player,
                        dice: dice.clone(),
                    });
                }
                actions.push(Action::UseSkill {
                    player,
                    character_index,
                    skill_index: option.skill_index,
                });
                actions.push(Action::TurnEnd {
                    player,
                    combat_action: true,
                });
                Ok(actions)
            }
            Response::PlayCard {
                option_index,
                target_index,
                dice,
                ..
            } => {
                let Some(Request::PlayCard { options, .. }) =
                    self.request_named(player, "play_card").cloned()
                else {
                    return Err(MatchError::InvalidState("card response without request"));
                };
                let option = options
                    .get(*option_index as usize)
                    .ok_or(MatchError::InvalidState("card option out of range"))?;
                let target = match target_index {
                    Some(t) => Some(CardTarget::OwnCharacter(
                        *option
                            .targets
                            .get(*t as usize)
                            .ok_or(MatchError::InvalidState("card target out of range"))?,
                    )),
                    None => None,
                };
                let mut value = ModifiableValue::Cost {
                    player,
                    cost: option.cost,
                };
                self.resolve_value(
                    ModifierKind::Cost,
                    &mut value,
                    player,
                    None,
                    ResolveMode::Real,
                )?;
                let mut actions = Vec::new();
                if !dice.is_empty() {
                    actions.push(Action::RemoveDice {
                        player,
                        dice: dice.clone(),
                    });
                }
                actions.push(Action::PlayCard {
                    player,
                    hand_id: option.id,
                    target,
                });
                actions.push(Action::TurnEnd {
                    player,
                    combat_action: false,
                });
                Ok(actions)
            }
            Response::SwitchCharacter { to_index, dice, .. } => {
                let Some(Request::SwitchCharacter { cost, .. }) =
                    self.request_named(player, "switch_character").cloned()
                else {
                    return Err(MatchError::InvalidState("switch response without request"));
                };
                let mut value = ModifiableValue::Cost { player, cost };
                self.resolve_value(
                    ModifierKind::Cost,
                    &mut value,
                    player,
                    None,
                    ResolveMode::Real,
                )?;
                let fast = self.switch_is_fast(player, ResolveMode::Real)?;
                let mut actions = Vec::new();
                if !dice.is_empty() {
                    actions.push(Action::RemoveDice {
                        player,
                        dice: dice.clone(),
                    });
                }
                actions.push(Action::SwitchCharacter {
                    player,
                    to_index: *to_index,
                });
                actions.push(Action::TurnEnd {
                    player,
                    combat_action: !fast,
                });
                Ok(actions)
            }
            Response::ElementalTuning {
                hand_index, die, ..
            } => {
                let hand_id = *self.tables[player.index()]
                    .hand
                    .get(*hand_index as usize)
                    .ok_or(MatchError::InvalidState("tuning hand index out of range"))?;
                Ok(vec![
                    Action::ElementalTuning {
                        player,
                        hand_id,
                        die: *die,
                    },
                    Action::TurnEnd {
                        player,
                        combat_action: false,
                    },
                ])
            }
            Response::DeclareRoundEnd { .. } => Ok(vec![
                Action::DeclareRoundEnd { player },
                Action::TurnEnd {
                    player,
                    combat_action: true,
                },
            ]),
        }
    }

    /// Whether a player has an outstanding request.
    pub(crate) fn has_request_for(&self, player: PlayerId) -> bool {
        self.requests.iter().any(|r| r.player() == player)
    }

    pub(crate) fn update_waiting_status(&mut self) {
        if let Some(request) = self.requests.first() {
            self.status = MatchStatus::PlayerChoosing(request.player());
        }
    }
}
