//! Scripted match simulations.
//!
//! The public-contract tests play through start/respond/step exactly as a
//! driver would. The cascade tests bypass the request layer and feed the
//! action queue directly, which keeps reaction and ordering scenarios
//! independent of dice luck.

use crate::action::Action;
use crate::damage::DamageValue;
use crate::deck::{Deck, demo_deck};
use crate::dice::DiceColor;
use crate::element::{DamageType, Element};
use crate::game::{Match, MatchPhase, MatchStatus};
use crate::ids::PlayerId;
use crate::log::LogEvent;
use crate::modifier::{ModifiableValue, ModifierKind, ResolveMode};
use crate::object::RuleObject;
use crate::position::Area;
use crate::reaction::Reaction;
use crate::request::{Request, Response};

const P0: PlayerId = PlayerId::P0;
const P1: PlayerId = PlayerId::P1;

fn decks() -> [Deck; 2] {
    [
        demo_deck(["Kaeya", "Diluc", "Fischl"]),
        demo_deck(["Barbara", "Collei", "Ningguang"]),
    ]
}

fn started(seed: u64) -> Match {
    let mut m = Match::new(seed);
    m.start(&decks()).unwrap();
    m
}

/// Decline the mulligan, pick slot 0, decline the reroll; halts on the
/// first player's turn requests.
fn through_setup(seed: u64) -> Match {
    let mut m = started(seed);
    for player in PlayerId::BOTH {
        m.respond(&Response::SwitchHand {
            player,
            hand_indices: Vec::new(),
        })
        .unwrap();
        m.step();
    }
    for player in PlayerId::BOTH {
        m.respond(&Response::ChooseCharacter {
            player,
            character_index: 0,
        })
        .unwrap();
        m.step();
    }
    for player in PlayerId::BOTH {
        m.respond(&Response::RerollDice {
            player,
            dice_indices: Vec::new(),
        })
        .unwrap();
        m.step();
    }
    m
}

/// Drain the queue directly, bypassing the request halt. White-box tests
/// use this to run hand-built cascades.
fn drain(m: &mut Match) {
    while let Some(action) = m.queue.pop_front() {
        m.apply_and_dispatch(action).unwrap();
    }
}

/// Every id a table holds must resolve in the registry.
fn assert_structurally_valid(m: &Match) {
    for player in PlayerId::BOTH {
        let table = m.table(player);
        for id in table
            .characters
            .iter()
            .chain(&table.hand)
            .chain(&table.deck)
            .chain(&table.discard)
            .chain(&table.team_statuses)
            .chain(&table.summons)
            .chain(&table.supports)
        {
            assert!(m.registry().contains(*id), "orphaned id {id:?}");
        }
    }
}

fn hit(m: &mut Match, source_player: PlayerId, amount: u8, damage_type: DamageType) {
    let source = m
        .character(source_player, 0)
        .unwrap()
        .position();
    m.queue.push_back(Action::MakeDamage {
        source_player,
        values: vec![DamageValue::damage(source, amount, damage_type)],
    });
    drain(m);
}

// ============================================================================
// Setup and round flow through the public contract
// ============================================================================

#[test]
fn test_setup_reaches_first_action_turn() {
    let m = through_setup(1);
    assert_eq!(m.phase(), MatchPhase::Action);
    assert_eq!(m.round_number(), 1);
    assert_eq!(m.current_player(), P0);
    assert!(m.need_respond(P0));
    assert!(!m.need_respond(P1));
    assert!(m.request_named(P0, "declare_round_end").is_some());
    assert_eq!(m.table(P0).dice.total(), 8);
    assert_structurally_valid(&m);
}

#[test]
fn test_round_end_declarations_advance_the_round() {
    let mut m = through_setup(2);
    m.respond(&Response::DeclareRoundEnd { player: P0 }).unwrap();
    m.step();
    assert!(m.need_respond(P1), "turn must pass to the opponent");

    m.respond(&Response::DeclareRoundEnd { player: P1 }).unwrap();
    m.step();

    // Both declared: end phase ran and round 2 is rolling.
    assert_eq!(m.round_number(), 2);
    assert!(m.need_respond(P0) && m.need_respond(P1), "reroll requests");
    assert!(m.request_named(P0, "reroll_dice").is_some());
    // The first to declare end acts first next round.
    assert_eq!(m.current_player(), P0);
    // Round start drew two cards over the opening five.
    assert_eq!(m.table(P0).hand_size(), 7);
    assert_structurally_valid(&m);
}

#[test]
fn test_opening_hand_replacement() {
    let mut m = started(3);
    let deck_before = m.table(P0).deck.len();
    let kept = m.table(P0).hand[2..].to_vec();
    m.respond(&Response::SwitchHand {
        player: P0,
        hand_indices: vec![0, 1],
    })
    .unwrap();
    m.step();
    assert_eq!(m.table(P0).hand_size(), 5);
    assert_eq!(m.table(P0).deck.len(), deck_before);
    for id in kept {
        assert!(m.table(P0).hand.contains(&id), "kept cards stay in hand");
    }
    assert_structurally_valid(&m);
}

#[test]
fn test_invalid_responses_are_rejected_without_mutation() {
    let mut m = started(4);
    let hand_before = m.table(P0).hand.clone();

    // Duplicate indices.
    let dup = Response::SwitchHand {
        player: P0,
        hand_indices: vec![1, 1],
    };
    assert!(!dup.is_valid(&m));
    assert!(m.respond(&dup).is_err());

    // Out-of-range index.
    let oob = Response::SwitchHand {
        player: P0,
        hand_indices: vec![9],
    };
    assert!(!oob.is_valid(&m));

    // A response kind nobody asked for.
    let uninvited = Response::DeclareRoundEnd { player: P0 };
    assert!(!uninvited.is_valid(&m));

    assert_eq!(m.table(P0).hand, hand_before);
    assert!(m.need_respond(P0), "request still outstanding after rejects");
}

#[test]
fn test_determinism_fixed_seed_and_script() {
    let run = |seed: u64| -> (Vec<LogEvent>, Vec<DiceColor>, u8) {
        let mut m = through_setup(seed);
        for _ in 0..4 {
            let player = m.current_player();
            m.respond(&Response::DeclareRoundEnd { player }).unwrap();
            m.step();
            let opponent = player.opponent();
            m.respond(&Response::DeclareRoundEnd { player: opponent })
                .unwrap();
            m.step();
            for p in PlayerId::BOTH {
                if m.need_respond(p) && m.request_named(p, "reroll_dice").is_some() {
                    m.respond(&Response::RerollDice {
                        player: p,
                        dice_indices: Vec::new(),
                    })
                    .unwrap();
                    m.step();
                }
            }
        }
        (
            m.log().events().to_vec(),
            m.table(P0).dice.to_vec(),
            m.table(P1).hand_size(),
        )
    };
    let a = run(42);
    let b = run(42);
    assert_eq!(a.0, b.0, "journals diverged on replay");
    assert_eq!(a.1, b.1);
    assert_eq!(a.2, b.2);

    let c = run(43);
    assert_ne!(a.0, c.0, "different seeds should diverge somewhere");
}

// ============================================================================
// Turn actions through the public contract
// ============================================================================

/// Clear the pending requests, guarantee affordability, and regenerate the
/// acting player's option set.
fn with_rich_dice(m: &mut Match) {
    m.requests.clear();
    let index = m.current_player().index();
    m.tables[index].dice.add(DiceColor::Omni, 12);
    m.generate_turn_requests().unwrap();
}

#[test]
fn test_normal_attack_damages_and_charges() {
    let mut m = through_setup(5);
    with_rich_dice(&mut m);

    let Some(Request::UseSkill { options, .. }) = m.request_named(P0, "use_skill").cloned()
    else {
        panic!("skill request missing");
    };
    let option = &options[0]; // Ceremonial Bladework
    let dice = crate::cost::select_payment(&m.table(P0).dice, &option.cost).unwrap();
    m.respond(&Response::UseSkill {
        player: P0,
        option_index: 0,
        dice,
    })
    .unwrap();
    m.step();

    assert_eq!(m.character(P1, 0).unwrap().hp, 8);
    assert_eq!(m.character(P0, 0).unwrap().charge, 1);
    assert!(m.need_respond(P1), "a skill is a combat action");
    assert_structurally_valid(&m);
}

#[test]
fn test_switch_character_is_a_combat_action() {
    let mut m = through_setup(6);
    with_rich_dice(&mut m);

    let Some(Request::SwitchCharacter { targets, cost, fast, .. }) =
        m.request_named(P0, "switch_character").cloned()
    else {
        panic!("switch request missing");
    };
    assert!(!fast);
    let dice = crate::cost::select_payment(&m.table(P0).dice, &cost).unwrap();
    m.respond(&Response::SwitchCharacter {
        player: P0,
        to_index: targets[0],
        dice,
    })
    .unwrap();
    m.step();

    assert_eq!(m.table(P0).active_character, Some(targets[0]));
    assert!(m.need_respond(P1));
}

#[test]
fn test_play_card_is_a_fast_action() {
    let mut m = through_setup(7);
    with_rich_dice(&mut m);

    let Some(Request::PlayCard { options, .. }) = m.request_named(P0, "play_card").cloned()
    else {
        panic!("card request missing");
    };
    // Whatever the shuffle dealt, play the first legal option.
    let (index, option) = options
        .iter()
        .enumerate()
        .next()
        .expect("options are never empty once issued");
    let target_index = if option.targets.is_empty() { None } else { Some(0) };
    let dice = crate::cost::select_payment(&m.table(P0).dice, &option.cost).unwrap();
    m.respond(&Response::PlayCard {
        player: P0,
        option_index: index as u8,
        target_index,
        dice,
    })
    .unwrap();
    m.step();

    assert!(
        m.table(P0).discard.contains(&option.id),
        "the played card lands in the discard pile"
    );
    assert!(!m.table(P0).hand.contains(&option.id));
    assert!(m.need_respond(P0), "fast actions keep the turn");
    assert_structurally_valid(&m);
}

#[test]
fn test_elemental_tuning_converts_a_die() {
    let mut m = through_setup(8);
    m.requests.clear();
    // Guarantee one tunable die: geo is off-element for Kaeya.
    m.tables[0].dice.clear();
    m.tables[0].dice.add(DiceColor::Geo, 1);
    m.generate_turn_requests().unwrap();

    assert!(m.request_named(P0, "elemental_tuning").is_some());
    let hand_before = m.table(P0).hand_size();
    m.respond(&Response::ElementalTuning {
        player: P0,
        hand_index: 0,
        die: DiceColor::Geo,
    })
    .unwrap();
    m.step();

    assert_eq!(m.table(P0).dice.count(DiceColor::Cryo), 1);
    assert_eq!(m.table(P0).dice.count(DiceColor::Geo), 0);
    assert_eq!(m.table(P0).hand_size(), hand_before - 1);
    assert!(m.need_respond(P0), "tuning keeps the turn");
}

// ============================================================================
// Cascades, reactions, defeat (white box)
// ============================================================================

#[test]
fn test_frozen_scenario() {
    let mut m = through_setup(9);
    m.requests.clear();

    // Hydro lands first, then cryo freezes.
    hit(&mut m, P1, 1, DamageType::Elemental(Element::Hydro));
    assert_eq!(
        m.character(P0, 0).unwrap().aura.elements(),
        vec![Element::Hydro]
    );
    hit(&mut m, P1, 1, DamageType::Elemental(Element::Cryo));

    let kaeya = m.character(P0, 0).unwrap();
    assert!(kaeya.aura.is_empty(), "frozen consumed both elements");
    assert_eq!(kaeya.hp, 10 - 1 - 2, "frozen adds +1 to the trigger");
    assert!(m.has_character_status(P0, 0, "Frozen"));
    assert!(
        m.character_statuses(P0, 0).iter().any(|s| s.blocks_skills()),
        "a frozen character cannot act"
    );
    assert!(
        m.log()
            .events()
            .iter()
            .any(|e| matches!(e, LogEvent::ReactionTriggered { reaction: Reaction::Frozen, .. }))
    );

    // The status expires with the end phase.
    m.queue.push_back(Action::BeginEndPhase);
    drain(&mut m);
    assert!(!m.has_character_status(P0, 0, "Frozen"));

    // A fresh cryo hit merely applies.
    hit(&mut m, P1, 1, DamageType::Elemental(Element::Cryo));
    assert_eq!(
        m.character(P0, 0).unwrap().aura.elements(),
        vec![Element::Cryo]
    );
    assert_eq!(m.character(P0, 0).unwrap().hp, 6);
}

#[test]
fn test_frozen_shatters_on_physical() {
    let mut m = through_setup(10);
    m.requests.clear();
    hit(&mut m, P1, 1, DamageType::Elemental(Element::Hydro));
    hit(&mut m, P1, 1, DamageType::Elemental(Element::Cryo));
    assert!(m.has_character_status(P0, 0, "Frozen"));
    let hp = m.character(P0, 0).unwrap().hp;

    hit(&mut m, P1, 2, DamageType::Physical);
    assert_eq!(m.character(P0, 0).unwrap().hp, hp - 4, "+2 shatter bonus");
    assert!(
        !m.has_character_status(P0, 0, "Frozen"),
        "shattered status is swept"
    );
}

#[test]
fn test_superconduct_pierces_the_bench() {
    let mut m = through_setup(11);
    m.requests.clear();
    hit(&mut m, P0, 1, DamageType::Elemental(Element::Electro));
    hit(&mut m, P0, 1, DamageType::Elemental(Element::Cryo));

    // Active: 1 electro + (1 cryo + 1 superconduct bonus).
    assert_eq!(m.character(P1, 0).unwrap().hp, 7);
    // Bench: 1 piercing each.
    assert_eq!(m.character(P1, 1).unwrap().hp, 9);
    assert_eq!(m.character(P1, 2).unwrap().hp, 9);
}

#[test]
fn test_overloaded_forces_a_switch() {
    let mut m = through_setup(12);
    m.requests.clear();
    hit(&mut m, P0, 1, DamageType::Elemental(Element::Electro));
    hit(&mut m, P0, 1, DamageType::Elemental(Element::Pyro));

    assert_eq!(m.character(P1, 0).unwrap().hp, 10 - 1 - 3);
    assert_eq!(
        m.table(P1).active_character,
        Some(1),
        "overloaded shoves the next character in"
    );
}

#[test]
fn test_crystallize_shields_the_attacker_side() {
    let mut m = through_setup(13);
    m.requests.clear();
    hit(&mut m, P0, 1, DamageType::Elemental(Element::Hydro));
    hit(&mut m, P0, 1, DamageType::Elemental(Element::Geo));
    assert!(
        m.table(P0)
            .team_statuses
            .iter()
            .any(|id| m.registry().get(*id).unwrap().name() == "Crystallize Shield")
    );

    // The shield soaks the next point of incoming damage.
    hit(&mut m, P1, 1, DamageType::Physical);
    assert_eq!(m.character(P0, 0).unwrap().hp, 10);
}

#[test]
fn test_queue_ordering_is_depth_first() {
    let mut m = through_setup(14);
    m.requests.clear();
    for player in PlayerId::BOTH {
        m.queue.push_back(Action::CreateObject {
            player,
            area: Area::Summon,
            character_index: None,
            name: "Oz".to_string(),
        });
    }
    drain(&mut m);
    let journal_start = m.log().len();

    m.queue.push_back(Action::BeginEndPhase);
    drain(&mut m);

    // Both summons answered the end phase; each one's damage (and its
    // whole cascade) resolves before the next subscriber's action runs.
    let hits: Vec<(PlayerId, u8)> = m.log().events()[journal_start..]
        .iter()
        .filter_map(|e| match e {
            LogEvent::DamageDealt { target, hp_after, .. } => {
                let side = if m.table(P1).characters.contains(target) {
                    P1
                } else {
                    P0
                };
                Some((side, *hp_after))
            }
            _ => None,
        })
        .collect();
    assert_eq!(
        hits,
        vec![(P1, 9), (P0, 9)],
        "current player's summon acts first, each hit fully resolved"
    );
    for player in PlayerId::BOTH {
        let oz = m.table(player).summons[0];
        assert_eq!(m.registry().get(oz).unwrap().usage(), Some(1));
    }
}

#[test]
fn test_infusion_changes_damage_element_in_flight() {
    let mut m = through_setup(18);
    m.requests.clear();
    m.queue.push_back(Action::CreateObject {
        player: P0,
        area: Area::CharacterStatus,
        character_index: Some(0),
        name: "Pyro Infusion".to_string(),
    });
    drain(&mut m);

    hit(&mut m, P0, 2, DamageType::Physical);
    let barbara = m.character(P1, 0).unwrap();
    assert_eq!(
        barbara.aura.elements(),
        vec![Element::Pyro],
        "infused physical damage applies pyro"
    );
    assert_eq!(barbara.hp, 8);
}

#[test]
fn test_defeat_demands_a_choice_and_resumes() {
    let mut m = through_setup(15);
    m.requests.clear();
    hit(&mut m, P0, 10, DamageType::Physical);

    assert!(!m.character(P1, 0).unwrap().alive);
    assert!(m.need_respond(P1), "post-defeat choice is mandatory");
    let Some(Request::ChooseCharacter { candidates, .. }) =
        m.request_named(P1, "choose_character").cloned()
    else {
        panic!("choose-character request missing");
    };
    assert_eq!(candidates, vec![1, 2]);

    m.respond(&Response::ChooseCharacter {
        player: P1,
        character_index: 2,
    })
    .unwrap();
    drain(&mut m);
    assert_eq!(m.table(P1).active_character, Some(2));
    assert!(m.table(P1).died_this_round);
    assert_structurally_valid(&m);
}

#[test]
fn test_wiping_the_roster_ends_the_match() {
    let mut m = through_setup(16);
    m.requests.clear();
    for slot in 0..3 {
        let id = m.table(P1).character_id(slot).unwrap();
        let source = m.character(P0, 0).unwrap().position();
        m.queue.push_back(Action::MakeDamage {
            source_player: P0,
            values: vec![
                DamageValue::damage(source, 10, DamageType::Physical)
                    .with_target(crate::damage::TargetRule::Absolute(id)),
            ],
        });
    }
    drain(&mut m);

    assert!(m.is_game_end());
    assert_eq!(m.status(), MatchStatus::Ended);
    assert_eq!(m.winner(), Some(P0));
    assert!(
        m.log()
            .events()
            .iter()
            .any(|e| matches!(e, LogEvent::MatchEnded { winner: Some(p) } if *p == P0))
    );
}

// ============================================================================
// Value pipeline: TEST/REAL duality
// ============================================================================

#[test]
fn test_preview_mode_never_consumes_modifiers() {
    let mut m = through_setup(17);
    m.requests.clear();
    m.queue.push_back(Action::CreateObject {
        player: P0,
        area: Area::TeamStatus,
        character_index: None,
        name: "Changing Shifts".to_string(),
    });
    drain(&mut m);
    let status_id = m.table(P0).team_statuses[0];

    let base = crate::cost::Cost::any(1).with_label(crate::cost::CostLabel::SWITCH);
    let first = m.effective_cost(P0, base).unwrap();
    let second = m.effective_cost(P0, base).unwrap();
    assert_eq!(first.total_dice(), 0, "the switch is free while it stands");
    assert_eq!(first, second, "previews are value-identical");
    assert_eq!(m.registry().get(status_id).unwrap().usage(), Some(1));

    // Committing consumes it; the sweep then clears the spent status.
    let mut value = ModifiableValue::Cost { player: P0, cost: base };
    m.resolve_value(ModifierKind::Cost, &mut value, P0, None, ResolveMode::Real)
        .unwrap();
    m.apply_and_dispatch(Action::Nop).unwrap();
    assert!(!m.registry().contains(status_id));
    assert_eq!(m.effective_cost(P0, base).unwrap().total_dice(), 1);
}
