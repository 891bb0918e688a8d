//! The action processor: queue execution, event dispatch, the value
//! modifier pipeline, and damage resolution.
//!
//! One action is processed at a time: apply its primitive mutation, build
//! the event record, consult subscribers in priority order, and push
//! whatever they return onto the FRONT of the queue in return order.
//! Front insertion yields depth-first, trigger-order cascade resolution:
//! everything an action spawns resolves before the next originally-queued
//! action runs. Mutation follow-ups (skill effects, reaction consequences)
//! land ahead of subscriber reactions.

use crate::action::{
    Action, CardTarget, DamageTargetInfo, EventArguments, EventContext, EventKind, SwitchDirection,
};
use crate::catalogue;
use crate::catalogue::CardEffect;
use crate::character::{Creation, SkillKind};
use crate::damage::{DamageKind, DamageValue, FinalDamageValue, TargetRule};
use crate::dice::DiceColor;
use crate::element::DamageType;
use crate::game::{Match, MatchError, MatchStatus};
use crate::ids::{ObjectId, PlayerId};
use crate::log::LogEvent;
use crate::modifier::{ModifiableValue, ModifierKind, ResolveMode};
use crate::object::{ObjectKind, RuleObject};
use crate::position::{Area, ObjectPosition};
use crate::reaction::{Reaction, react, splash_damage};

impl Match {
    /// Apply one action, dispatch its event, and front-insert the cascade.
    pub(crate) fn apply_and_dispatch(&mut self, action: Action) -> Result<(), MatchError> {
        let mut args = EventArguments::new(action.event_kind(), action.clone());
        args.hand_size_before = [self.tables[0].hand_size(), self.tables[1].hand_size()];

        let follow_ups = self.apply_action(&action, &mut args)?;
        args.hand_size_after = [self.tables[0].hand_size(), self.tables[1].hand_size()];

        let subscriber_actions = if args.kind == EventKind::Nop {
            Vec::new()
        } else {
            self.dispatch_event(&args)?
        };
        for action in subscriber_actions.into_iter().rev() {
            self.queue.push_front(action);
        }
        for action in follow_ups.into_iter().rev() {
            self.queue.push_front(action);
        }
        self.sweep_spent_objects()?;
        Ok(())
    }

    /// Broadcast an event to its priority-ordered subscribers and collect
    /// their follow-up actions in consultation order.
    fn dispatch_event(&mut self, args: &EventArguments) -> Result<Vec<Action>, MatchError> {
        let acting = args.acting_player.unwrap_or(self.current_player);
        let mut ids = self.registry.subscribers_for(args.kind);
        self.priority_sort(&mut ids, acting);

        let mut collected = Vec::new();
        for id in ids {
            let position = self.registry.get(id)?.position();
            let ctx = self.event_context(position, None);
            let mut object = self.registry.take(id)?;
            let actions = object.handle_event(args, &ctx);
            self.registry.put(id, object);
            collected.extend(actions);
        }
        Ok(collected)
    }

    /// Game-priority ordering over registration order: system handlers
    /// first, then the acting player's objects before the opponent's,
    /// then active-character anchors before the bench.
    fn priority_sort(&self, ids: &mut [ObjectId], acting: PlayerId) {
        let rank = |id: &ObjectId| -> (u8, u8, u8) {
            let Ok(object) = self.registry.get(*id) else {
                return (3, 3, 3);
            };
            let position = object.position();
            let is_system = matches!(object.kind(), ObjectKind::SystemHandler);
            let own = position.player == acting;
            let active = position.character_index.is_some()
                && self.tables[position.player.index()].active_character
                    == position.character_index;
            (u8::from(!is_system), u8::from(!own), u8::from(!active))
        };
        ids.sort_by_key(rank);
    }

    /// Run one value through the modifier pipeline.
    ///
    /// `Test` previews (legality checks) and leaves every contributor's
    /// counters untouched; `Real` commits and lets them consume usage.
    pub(crate) fn resolve_value(
        &mut self,
        kind: ModifierKind,
        value: &mut ModifiableValue,
        acting: PlayerId,
        target: Option<DamageTargetInfo>,
        mode: ResolveMode,
    ) -> Result<(), MatchError> {
        let mut ids = self.registry.modifiers_for(kind);
        self.priority_sort(&mut ids, acting);
        for id in ids {
            let position = self.registry.get(id)?.position();
            let ctx = self.event_context(position, target);
            let mut object = self.registry.take(id)?;
            object.modify_value(kind, value, &ctx, mode);
            self.registry.put(id, object);
        }
        Ok(())
    }

    /// Remove every object whose usage counter has run out.
    fn sweep_spent_objects(&mut self) -> Result<(), MatchError> {
        let spent: Vec<ObjectId> = self
            .registry
            .objects_sorted()
            .into_iter()
            .filter(|object| matches!(object.usage(), Some(u) if u <= 0))
            .map(|object| object.position().id)
            .collect();
        for id in spent {
            let object = self.registry.unregister(id)?;
            let position = object.position();
            self.tables[position.player.index()].forget(id);
            self.log.log(LogEvent::ObjectRemoved {
                id,
                name: object.name().to_string(),
            });
        }
        Ok(())
    }

    pub(crate) fn event_context(
        &self,
        own_position: ObjectPosition,
        damage_target: Option<DamageTargetInfo>,
    ) -> EventContext {
        let active_character = [
            self.tables[0].active_character,
            self.tables[1].active_character,
        ];
        let active_element = [
            self.active_character(PlayerId::P0).map(|c| c.element()),
            self.active_character(PlayerId::P1).map(|c| c.element()),
        ];
        EventContext {
            own_position,
            round: self.round,
            current_player: self.current_player,
            active_character,
            active_element,
            damage_target,
        }
    }

    // ------------------------------------------------------------------
    // Primitive mutations
    // ------------------------------------------------------------------

    /// Apply one action's primitive mutation, filling in the event record,
    /// and return the mutation's own follow-up actions.
    fn apply_action(
        &mut self,
        action: &Action,
        args: &mut EventArguments,
    ) -> Result<Vec<Action>, MatchError> {
        match action {
            Action::Nop => Ok(Vec::new()),

            Action::CreateObject {
                player,
                area,
                character_index,
                name,
            } => self.create_or_refresh(*player, *area, *character_index, name),

            Action::RemoveObject { id } => {
                // A queued removal can race the usage sweep (a status that
                // both expires and gets consumed in one cascade); the
                // second removal is a no-op, not a fault.
                if !self.registry.contains(*id) {
                    args.kind = EventKind::Nop;
                    return Ok(Vec::new());
                }
                if matches!(self.registry.get(*id)?.kind(), ObjectKind::Character) {
                    return Err(MatchError::InvalidState("characters are never removed"));
                }
                let object = self.registry.unregister(*id)?;
                let position = object.position();
                self.tables[position.player.index()].forget(*id);
                self.log.log(LogEvent::ObjectRemoved {
                    id: *id,
                    name: object.name().to_string(),
                });
                Ok(Vec::new())
            }

            Action::MoveObject { id, to_area } => {
                if !matches!(to_area, Area::Hand | Area::Deck | Area::Discard) {
                    return Err(MatchError::InvalidState("move-object targets card areas"));
                }
                let mut position = self.registry.get(*id)?.position();
                let table = &mut self.tables[position.player.index()];
                table.forget(*id);
                match to_area {
                    Area::Hand => table.hand.push(*id),
                    Area::Deck => table.deck.push(*id),
                    Area::Discard => table.discard.push(*id),
                    _ => unreachable!(),
                }
                position.area = *to_area;
                self.registry.get_mut(*id)?.set_position(position);
                Ok(Vec::new())
            }

            Action::ChangeObjectUsage { id, delta } => {
                let object = self.registry.get_mut(*id)?;
                let Some(usage) = object.usage() else {
                    return Err(MatchError::InvalidState(
                        "usage change on object without a counter",
                    ));
                };
                object.set_usage(usage + delta);
                Ok(Vec::new())
            }

            Action::MakeDamage {
                source_player,
                values,
            } => self.process_damage(*source_player, values, args),

            Action::ChargeEnergy {
                player,
                character_index,
                delta,
            } => {
                let index = match character_index {
                    Some(index) => *index,
                    None => self.tables[player.index()]
                        .active_character
                        .ok_or(MatchError::InvalidState("energy change without active"))?,
                };
                self.character_mut(*player, index)?.gain_charge(*delta);
                Ok(Vec::new())
            }

            Action::SwitchCharacter { player, to_index } => {
                if !self.character(*player, *to_index)?.alive {
                    return Err(MatchError::InvalidState("switching to a defeated character"));
                }
                self.tables[player.index()].active_character = Some(*to_index);
                self.log.log(LogEvent::CharacterSwitched {
                    player: *player,
                    to_index: *to_index,
                });
                Ok(Vec::new())
            }

            Action::ForceSwitchCharacter { player, direction } => {
                let Some(from) = self.tables[player.index()].active_character else {
                    args.kind = EventKind::Nop;
                    return Ok(Vec::new());
                };
                let to = match direction {
                    SwitchDirection::Next => self.next_alive(*player, from),
                    SwitchDirection::Prev => self.prev_alive(*player, from),
                };
                let Some(to_index) = to else {
                    // Nobody to switch to; the forced switch fizzles.
                    args.kind = EventKind::Nop;
                    return Ok(Vec::new());
                };
                self.tables[player.index()].active_character = Some(to_index);
                self.log.log(LogEvent::CharacterSwitched {
                    player: *player,
                    to_index,
                });
                Ok(Vec::new())
            }

            Action::CreateDice {
                player,
                color,
                count,
            } => {
                self.tables[player.index()].dice.add(*color, *count);
                Ok(Vec::new())
            }

            Action::RemoveDice { player, dice } => {
                if !self.tables[player.index()].dice.remove_all(dice) {
                    return Err(MatchError::InvalidState("removing dice not in the pool"));
                }
                Ok(Vec::new())
            }

            Action::DrawCard { player, count } => {
                for _ in 0..*count {
                    let Some(id) = self.tables[player.index()].deck.pop() else {
                        break;
                    };
                    let mut position = self.registry.get(id)?.position();
                    let name = self.registry.get(id)?.name().to_string();
                    let table = &mut self.tables[player.index()];
                    if table.hand.len() >= crate::game::HAND_LIMIT {
                        table.discard.push(id);
                        position.area = Area::Discard;
                    } else {
                        table.hand.push(id);
                        position.area = Area::Hand;
                        self.log.log(LogEvent::CardDrawn {
                            player: *player,
                            name,
                        });
                    }
                    self.registry.get_mut(id)?.set_position(position);
                }
                Ok(Vec::new())
            }

            Action::RemoveCard { player, hand_id } => {
                self.discard_from_hand(*player, *hand_id)?;
                Ok(Vec::new())
            }

            Action::RestoreCard { player, hand_id } => {
                let table = &mut self.tables[player.index()];
                if !table.hand.contains(hand_id) {
                    return Err(MatchError::InvalidState("restoring a card not in hand"));
                }
                table.hand.retain(|id| id != hand_id);
                // Shuffled back in: a random deck slot keeps the draw
                // order a function of the seed alone.
                let deck_len = self.tables[player.index()].deck.len();
                let slot = rand::Rng::random_range(&mut self.rng, 0..=deck_len);
                self.tables[player.index()].deck.insert(slot, *hand_id);
                let mut position = self.registry.get(*hand_id)?.position();
                position.area = Area::Deck;
                self.registry.get_mut(*hand_id)?.set_position(position);
                Ok(Vec::new())
            }

            Action::UseSkill {
                player,
                character_index,
                skill_index,
            } => self.expand_skill(*player, *character_index, *skill_index),

            Action::PlayCard {
                player,
                hand_id,
                target,
            } => self.expand_card(*player, *hand_id, *target),

            Action::ElementalTuning {
                player,
                hand_id,
                die,
            } => {
                let element = self
                    .active_character(*player)
                    .ok_or(MatchError::InvalidState("tuning without active character"))?
                    .element();
                if !self.tables[player.index()].dice.remove_all(&[*die]) {
                    return Err(MatchError::InvalidState("tuning a die not in the pool"));
                }
                self.tables[player.index()]
                    .dice
                    .add(DiceColor::from_element(element), 1);
                self.discard_from_hand(*player, *hand_id)?;
                Ok(Vec::new())
            }

            Action::DeclareRoundEnd { player } => {
                self.tables[player.index()].declared_end = true;
                if self.first_to_end.is_none() {
                    self.first_to_end = Some(*player);
                }
                self.log.log(LogEvent::RoundEndDeclared { player: *player });
                Ok(Vec::new())
            }

            Action::GenerateChooseCharacterRequest { player } => {
                self.push_choose_character_request(*player);
                Ok(Vec::new())
            }

            Action::RoundStart => {
                self.round += 1;
                for table in self.tables.iter_mut() {
                    table.begin_round();
                }
                self.rolled_this_round = false;
                if let Some(first) = self.first_to_end.take() {
                    self.current_player = first;
                }
                self.phase = crate::game::MatchPhase::Roll;
                self.log.log(LogEvent::RoundStarted { round: self.round });
                Ok(Vec::new())
            }

            Action::RollDice { player, count } => {
                let rolled = self.tables[player.index()]
                    .dice
                    .roll(&mut self.rng, *count);
                self.log.log(LogEvent::DiceRolled {
                    player: *player,
                    total: rolled.len() as u8,
                });
                Ok(Vec::new())
            }

            Action::BeginActionPhase => {
                self.phase = crate::game::MatchPhase::Action;
                self.log.log(LogEvent::TurnPassedTo {
                    player: self.current_player,
                });
                Ok(Vec::new())
            }

            Action::BeginEndPhase => {
                self.phase = crate::game::MatchPhase::End;
                if let Some(first) = self.first_to_end {
                    self.current_player = first;
                }
                Ok(Vec::new())
            }

            Action::TurnEnd {
                player,
                combat_action,
            } => {
                if *combat_action {
                    let opponent = player.opponent();
                    if !self.tables[opponent.index()].declared_end {
                        self.current_player = opponent;
                        self.log.log(LogEvent::TurnPassedTo { player: opponent });
                    }
                }
                Ok(Vec::new())
            }

            Action::CheckDefeated => self.check_defeated(),

            Action::GameEnd { winner } => {
                self.winner = *winner;
                self.status = MatchStatus::Ended;
                self.queue.clear();
                self.requests.clear();
                self.log.log(LogEvent::MatchEnded { winner: *winner });
                Ok(Vec::new())
            }
        }
    }

    fn discard_from_hand(&mut self, player: PlayerId, hand_id: ObjectId) -> Result<(), MatchError> {
        let table = &mut self.tables[player.index()];
        if !table.hand.contains(&hand_id) {
            return Err(MatchError::InvalidState("discarding a card not in hand"));
        }
        table.hand.retain(|id| *id != hand_id);
        table.discard.push(hand_id);
        let mut position = self.registry.get(hand_id)?.position();
        position.area = Area::Discard;
        self.registry.get_mut(hand_id)?.set_position(position);
        Ok(())
    }

    /// Create a catalogue object, or refresh the usage of an identical one
    /// already standing at the same anchor.
    fn create_or_refresh(
        &mut self,
        player: PlayerId,
        area: Area,
        character_index: Option<u8>,
        name: &str,
    ) -> Result<Vec<Action>, MatchError> {
        let mut position = ObjectPosition::new(player, area, ObjectId::from_raw(0));
        position.character_index = character_index;
        let fresh = catalogue::instantiate(name, position)
            .ok_or_else(|| MatchError::UnknownCatalogueName(name.to_string()))?;
        let fresh_usage = fresh.usage();

        let existing = self
            .registry
            .objects_sorted()
            .into_iter()
            .find(|object| {
                let p = object.position();
                object.name() == name
                    && p.player == player
                    && p.area == area
                    && p.character_index == character_index
            })
            .map(|object| object.position().id);

        if let (Some(id), Some(add)) = (existing, fresh_usage) {
            let object = self.registry.get_mut(id)?;
            let current = object.usage().unwrap_or(0);
            // set_usage saturates at the object's own cap.
            object.set_usage(current + add);
            return Ok(Vec::new());
        }

        let id = self.registry.register(fresh);
        match area {
            Area::TeamStatus => self.tables[player.index()].team_statuses.push(id),
            Area::Summon => self.tables[player.index()].summons.push(id),
            Area::Support => self.tables[player.index()].supports.push(id),
            Area::CharacterStatus => {}
            _ => return Err(MatchError::InvalidState("create-object in a card area")),
        }
        self.log.log(LogEvent::ObjectCreated {
            id,
            name: name.to_string(),
        });
        Ok(Vec::new())
    }

    /// Expand a skill activation into its effect actions.
    fn expand_skill(
        &mut self,
        player: PlayerId,
        character_index: u8,
        skill_index: u8,
    ) -> Result<Vec<Action>, MatchError> {
        let (skill, source) = {
            let character = self.character(player, character_index)?;
            let skill = character
                .skill(skill_index)
                .ok_or(MatchError::InvalidState("skill index out of range"))?
                .clone();
            (skill, character.position())
        };
        self.log.log(LogEvent::SkillUsed {
            player,
            name: skill.name.to_string(),
        });

        let mut follow_ups = Vec::new();
        if skill.kind == SkillKind::ElementalBurst {
            follow_ups.push(Action::ChargeEnergy {
                player,
                character_index: Some(character_index),
                delta: -(skill.cost.charge as i8),
            });
        }

        let mut values = Vec::new();
        if skill.damage > 0 {
            values.push(
                DamageValue::damage(source, skill.damage, skill.damage_type)
                    .with_label(skill.cost.label),
            );
        }
        if skill.heal > 0 {
            values.push(DamageValue::heal(source, skill.heal).with_label(skill.cost.label));
        }
        if !values.is_empty() {
            follow_ups.push(Action::MakeDamage {
                source_player: player,
                values,
            });
        }

        for creation in &skill.creates {
            follow_ups.push(match creation {
                Creation::CharacterStatus(name) => Action::CreateObject {
                    player,
                    area: Area::CharacterStatus,
                    character_index: Some(character_index),
                    name: name.to_string(),
                },
                Creation::TeamStatus(name) => Action::CreateObject {
                    player,
                    area: Area::TeamStatus,
                    character_index: None,
                    name: name.to_string(),
                },
                Creation::Summon(name) => Action::CreateObject {
                    player,
                    area: Area::Summon,
                    character_index: None,
                    name: name.to_string(),
                },
            });
        }

        if skill.kind != SkillKind::ElementalBurst {
            follow_ups.push(Action::ChargeEnergy {
                player,
                character_index: Some(character_index),
                delta: 1,
            });
        }
        Ok(follow_ups)
    }

    /// Expand a card play: pay the card away, then its declared effects.
    fn expand_card(
        &mut self,
        player: PlayerId,
        hand_id: ObjectId,
        target: Option<CardTarget>,
    ) -> Result<Vec<Action>, MatchError> {
        let definition = self
            .registry
            .get(hand_id)?
            .as_card()
            .ok_or(MatchError::InvalidState("playing a non-card object"))?
            .definition()
            .clone();
        self.discard_from_hand(player, hand_id)?;
        self.log.log(LogEvent::CardPlayed {
            player,
            name: definition.name.to_string(),
        });

        let target_slot = match target {
            Some(CardTarget::OwnCharacter(slot)) => Some(slot),
            None => None,
        };
        let mut follow_ups = Vec::new();
        for effect in &definition.effects {
            match effect {
                CardEffect::Draw(count) => follow_ups.push(Action::DrawCard {
                    player,
                    count: *count,
                }),
                CardEffect::HealTarget(amount) => {
                    let slot = target_slot
                        .ok_or(MatchError::InvalidState("heal effect without a target"))?;
                    let id = self.tables[player.index()]
                        .character_id(slot)
                        .ok_or(MatchError::MissingCharacter { player, index: slot })?;
                    let source = ObjectPosition::new(player, Area::Hand, hand_id);
                    follow_ups.push(Action::MakeDamage {
                        source_player: player,
                        values: vec![
                            DamageValue::heal(source, *amount)
                                .with_target(TargetRule::Absolute(id)),
                        ],
                    });
                }
                CardEffect::StatusOnTarget(name) | CardEffect::EquipOnTarget(name) => {
                    let slot = target_slot
                        .ok_or(MatchError::InvalidState("status effect without a target"))?;
                    follow_ups.push(Action::CreateObject {
                        player,
                        area: Area::CharacterStatus,
                        character_index: Some(slot),
                        name: name.to_string(),
                    });
                }
                CardEffect::ChargeActive(delta) => follow_ups.push(Action::ChargeEnergy {
                    player,
                    character_index: None,
                    delta: *delta,
                }),
                CardEffect::OmniDice(count) => follow_ups.push(Action::CreateDice {
                    player,
                    color: DiceColor::Omni,
                    count: *count,
                }),
                CardEffect::TeamStatus(name) => follow_ups.push(Action::CreateObject {
                    player,
                    area: Area::TeamStatus,
                    character_index: None,
                    name: name.to_string(),
                }),
                CardEffect::Support(name) => follow_ups.push(Action::CreateObject {
                    player,
                    area: Area::Support,
                    character_index: None,
                    name: name.to_string(),
                }),
            }
        }
        Ok(follow_ups)
    }

    // ------------------------------------------------------------------
    // Damage resolution
    // ------------------------------------------------------------------

    /// Resolve a batch of damage/heal/application instances: target
    /// resolution, the modifier pipeline, the reaction table, hp
    /// application, and reaction consequences. Splash instances generated
    /// by reactions are appended to the batch and resolved in order.
    fn process_damage(
        &mut self,
        source_player: PlayerId,
        values: &[DamageValue],
        args: &mut EventArguments,
    ) -> Result<Vec<Action>, MatchError> {
        let mut follow_ups = Vec::new();
        let mut pending: std::collections::VecDeque<DamageValue> =
            values.iter().cloned().collect();

        while let Some(mut value) = pending.pop_front() {
            let defender = match value.kind {
                DamageKind::Damage => source_player.opponent(),
                _ => source_player,
            };

            // AOE over the bench expands into absolute instances.
            if value.target == TargetRule::Back {
                let active = self.tables[defender.index()].active_character;
                let mut expansion = Vec::new();
                for slot in self.alive_character_indices(defender) {
                    if Some(slot) == active {
                        continue;
                    }
                    if let Some(id) = self.tables[defender.index()].character_id(slot) {
                        expansion
                            .push(value.clone().with_target(TargetRule::Absolute(id)));
                    }
                }
                for instance in expansion.into_iter().rev() {
                    pending.push_front(instance);
                }
                continue;
            }

            let Some((slot, target_id)) = self.resolve_damage_target(defender, value.target)?
            else {
                continue;
            };
            value.target = TargetRule::Absolute(target_id);
            let target_info = DamageTargetInfo {
                player: defender,
                character_index: slot,
                id: target_id,
            };

            if value.kind == DamageKind::Heal {
                let character = self.character_mut(defender, slot)?;
                let hp_before = character.hp;
                character.heal(value.amount);
                let hp_after = character.hp;
                self.log.log(LogEvent::Healed {
                    target: target_id,
                    amount: hp_after - hp_before,
                });
                args.damages.push(FinalDamageValue {
                    damage: value,
                    target_character: target_id,
                    final_amount: hp_after - hp_before,
                    hp_before,
                    hp_after,
                    applied_element: None,
                    reaction: Reaction::None,
                });
                continue;
            }

            let is_piercing = value.damage_type == DamageType::Piercing;

            if value.kind == DamageKind::Damage && !is_piercing {
                let mut candidate = ModifiableValue::Damage(value);
                self.resolve_value(
                    ModifierKind::DamageElementChange,
                    &mut candidate,
                    source_player,
                    Some(target_info),
                    ResolveMode::Real,
                )?;
                value = match candidate {
                    ModifiableValue::Damage(damage) => damage,
                    _ => return Err(MatchError::InvalidState("damage pipeline corrupted value")),
                };
            }

            // Elemental reaction against the target's aura.
            let mut reaction = Reaction::None;
            let mut applied_element = None;
            if let DamageType::Elemental(element) = value.damage_type {
                let aura = self.character(defender, slot)?.aura;
                let outcome = react(element, &aura);
                reaction = outcome.reaction;
                if reaction == Reaction::None && outcome.remaining.contains(element)
                    && !aura.contains(element)
                {
                    applied_element = Some(element);
                }
                self.character_mut(defender, slot)?.aura = outcome.remaining;
                if value.kind == DamageKind::Damage {
                    value.amount += reaction.damage_bonus();
                }
            }

            if value.kind == DamageKind::Damage && !is_piercing {
                for kind in [
                    ModifierKind::DamageIncrease,
                    ModifierKind::DamageMultiply,
                    ModifierKind::DamageDecrease,
                ] {
                    let mut candidate = ModifiableValue::Damage(value);
                    self.resolve_value(
                        kind,
                        &mut candidate,
                        source_player,
                        Some(target_info),
                        ResolveMode::Real,
                    )?;
                    value = match candidate {
                        ModifiableValue::Damage(damage) => damage,
                        _ => {
                            return Err(MatchError::InvalidState(
                                "damage pipeline corrupted value",
                            ));
                        }
                    };
                }
            }

            let (hp_before, hp_after) = if value.kind == DamageKind::Damage {
                let character = self.character_mut(defender, slot)?;
                let before = character.hp;
                character.take_damage(value.amount);
                (before, character.hp)
            } else {
                let hp = self.character(defender, slot)?.hp;
                (hp, hp)
            };

            if value.kind == DamageKind::Damage {
                self.log.log(LogEvent::DamageDealt {
                    target: target_id,
                    amount: value.amount,
                    hp_after,
                });
            }
            if reaction != Reaction::None {
                self.log.log(LogEvent::ReactionTriggered {
                    target: target_id,
                    reaction,
                });
                if args.reaction.is_none() {
                    args.reaction = Some(reaction);
                }
            }
            args.damages.push(FinalDamageValue {
                damage: value.clone(),
                target_character: target_id,
                final_amount: if value.kind == DamageKind::Damage {
                    value.amount
                } else {
                    0
                },
                hp_before,
                hp_after,
                applied_element,
                reaction,
            });

            // Reaction splash onto the rest of the defending roster.
            let others = self.other_alive_ids(defender, slot);
            for splash in splash_damage(reaction, value.source, &others) {
                pending.push_back(splash);
            }

            // Reaction consequences beyond the direct bonus.
            match reaction {
                Reaction::Overloaded => follow_ups.push(Action::ForceSwitchCharacter {
                    player: defender,
                    direction: SwitchDirection::Next,
                }),
                Reaction::Frozen => follow_ups.push(Action::CreateObject {
                    player: defender,
                    area: Area::CharacterStatus,
                    character_index: Some(slot),
                    name: "Frozen".to_string(),
                }),
                Reaction::Crystallize => follow_ups.push(Action::CreateObject {
                    player: source_player,
                    area: Area::TeamStatus,
                    character_index: None,
                    name: "Crystallize Shield".to_string(),
                }),
                Reaction::Burning => follow_ups.push(Action::CreateObject {
                    player: source_player,
                    area: Area::Summon,
                    character_index: None,
                    name: "Burning Flame".to_string(),
                }),
                Reaction::Bloom => follow_ups.push(Action::CreateObject {
                    player: source_player,
                    area: Area::TeamStatus,
                    character_index: None,
                    name: "Dendro Core".to_string(),
                }),
                Reaction::Quicken => follow_ups.push(Action::CreateObject {
                    player: source_player,
                    area: Area::TeamStatus,
                    character_index: None,
                    name: "Catalyzing Field".to_string(),
                }),
                _ => {}
            }
        }
        Ok(follow_ups)
    }

    /// Resolve a target rule to an alive character, or `None` when the
    /// instance fizzles (no such target standing).
    fn resolve_damage_target(
        &self,
        defender: PlayerId,
        target: TargetRule,
    ) -> Result<Option<(u8, ObjectId)>, MatchError> {
        let table = &self.tables[defender.index()];
        let slot = match target {
            TargetRule::Active => table.active_character,
            TargetRule::Next => table
                .active_character
                .and_then(|from| self.next_alive(defender, from)),
            TargetRule::Prev => table
                .active_character
                .and_then(|from| self.prev_alive(defender, from)),
            TargetRule::Absolute(id) => table.character_slot(id),
            TargetRule::Back => {
                return Err(MatchError::InvalidState("back targets expand before resolution"));
            }
        };
        let Some(slot) = slot else {
            return Ok(None);
        };
        let character = self.character(defender, slot)?;
        if !character.alive {
            return Ok(None);
        }
        Ok(Some((
            slot,
            table
                .character_id(slot)
                .ok_or(MatchError::MissingCharacter {
                    player: defender,
                    index: slot,
                })?,
        )))
    }

    /// Sweep both rosters for freshly defeated characters: clean them up,
    /// detect the win, and demand post-defeat choices.
    fn check_defeated(&mut self) -> Result<Vec<Action>, MatchError> {
        let mut follow_ups = Vec::new();
        let mut all_dead = [false, false];

        for player in PlayerId::BOTH {
            let roster = self.tables[player.index()].characters.clone();
            let mut any_alive = false;
            for (slot, id) in roster.iter().enumerate() {
                let character = self
                    .registry
                    .get_mut(*id)?
                    .as_character_mut()
                    .ok_or(MatchError::InvalidState("roster id is not a character"))?;
                if character.alive {
                    any_alive = true;
                    continue;
                }
                if character.defeat_handled {
                    continue;
                }
                character.defeat_handled = true;
                character.mark_defeated();
                self.tables[player.index()].died_this_round = true;
                self.log.log(LogEvent::CharacterDefeated {
                    player,
                    character_index: slot as u8,
                });
                // Attached statuses die with the character.
                let status_ids: Vec<ObjectId> = self
                    .character_statuses(player, slot as u8)
                    .iter()
                    .map(|s| s.position().id)
                    .collect();
                for status_id in status_ids {
                    let object = self.registry.unregister(status_id)?;
                    self.tables[player.index()].forget(status_id);
                    self.log.log(LogEvent::ObjectRemoved {
                        id: status_id,
                        name: object.name().to_string(),
                    });
                }
            }
            all_dead[player.index()] = !any_alive;
        }

        match all_dead {
            [true, true] => {
                follow_ups.push(Action::GameEnd { winner: None });
                return Ok(follow_ups);
            }
            [true, false] => {
                follow_ups.push(Action::GameEnd {
                    winner: Some(PlayerId::P1),
                });
                return Ok(follow_ups);
            }
            [false, true] => {
                follow_ups.push(Action::GameEnd {
                    winner: Some(PlayerId::P0),
                });
                return Ok(follow_ups);
            }
            [false, false] => {}
        }

        // A defeated active character demands an immediate replacement
        // choice; the suspended cascade resumes after the switch.
        for player in PlayerId::BOTH {
            if let Some(active) = self.tables[player.index()].active_character
                && !self.character(player, active)?.alive
            {
                follow_ups.push(Action::GenerateChooseCharacterRequest { player });
            }
        }
        Ok(follow_ups)
    }
}
