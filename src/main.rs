//! invoker - seven-element invocation card battle engine
//!
//! Reference CLI: runs a full match between two seeded random drivers.
//!
//! ## Usage
//!
//! ```
//! invoker [OPTIONS]
//!
//! Options:
//!   --seed <n>         Seed for the match and both drivers (default 0)
//!   --deck <path>      Deck description file (repeat for each player)
//!   --json             Print a machine-readable result summary
//!   --trace            Print the full match journal
//! ```
//!
//! The first --deck is for player 0, the second for player 1; players
//! without one get a demo deck.

use std::env;
use std::fs;
use std::process::ExitCode;

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;

use invoker::deck::{Deck, demo_deck};
use invoker::{Match, PlayerId, Request, Response, select_payment};

struct Options {
    seed: u64,
    deck_paths: Vec<String>,
    json: bool,
    trace: bool,
}

fn parse_args() -> Result<Options, String> {
    let mut options = Options {
        seed: 0,
        deck_paths: Vec::new(),
        json: false,
        trace: false,
    };
    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--seed" => {
                let value = args.next().ok_or("--seed needs a value")?;
                options.seed = value.parse().map_err(|_| format!("bad seed {value:?}"))?;
            }
            "--deck" => {
                options.deck_paths.push(args.next().ok_or("--deck needs a path")?);
            }
            "--json" => options.json = true,
            "--trace" => options.trace = true,
            other => return Err(format!("unknown option {other:?}")),
        }
    }
    if options.deck_paths.len() > 2 {
        return Err("at most two --deck options".to_string());
    }
    Ok(options)
}

fn load_decks(options: &Options) -> Result<[Deck; 2], String> {
    let defaults = [
        demo_deck(["Kaeya", "Diluc", "Fischl"]),
        demo_deck(["Barbara", "Collei", "Ningguang"]),
    ];
    let mut decks = defaults;
    for (index, path) in options.deck_paths.iter().enumerate() {
        let text =
            fs::read_to_string(path).map_err(|e| format!("reading {path:?} failed: {e}"))?;
        decks[index] =
            Deck::parse(&text).map_err(|e| format!("parsing {path:?} failed: {e:?}"))?;
    }
    Ok(decks)
}

/// Pick an arbitrary valid response to one outstanding request.
fn respond_randomly(m: &Match, request: &Request, rng: &mut StdRng) -> Option<Response> {
    match request {
        Request::SwitchHand { player, .. } => Some(Response::SwitchHand {
            player: *player,
            hand_indices: Vec::new(),
        }),
        Request::ChooseCharacter { player, candidates } => Some(Response::ChooseCharacter {
            player: *player,
            character_index: *candidates.first()?,
        }),
        Request::RerollDice { player, .. } => Some(Response::RerollDice {
            player: *player,
            dice_indices: Vec::new(),
        }),
        Request::UseSkill {
            player, options, ..
        } => {
            let index = rng.random_range(0..options.len());
            let pool = &m.table(*player).dice;
            Some(Response::UseSkill {
                player: *player,
                option_index: index as u8,
                dice: select_payment(pool, &options[index].cost)?,
            })
        }
        Request::PlayCard { player, options } => {
            let index = rng.random_range(0..options.len());
            let option = &options[index];
            let pool = &m.table(*player).dice;
            let target_index = if option.targets.is_empty() {
                None
            } else {
                Some(rng.random_range(0..options[index].targets.len()) as u8)
            };
            Some(Response::PlayCard {
                player: *player,
                option_index: index as u8,
                target_index,
                dice: select_payment(pool, &option.cost)?,
            })
        }
        Request::SwitchCharacter {
            player,
            targets,
            cost,
            ..
        } => {
            let pool = &m.table(*player).dice;
            Some(Response::SwitchCharacter {
                player: *player,
                to_index: targets[rng.random_range(0..targets.len())],
                dice: select_payment(pool, cost)?,
            })
        }
        Request::ElementalTuning { player, element } => {
            let pool = m.table(*player).dice.to_vec();
            let die = pool
                .iter()
                .find(|d| {
                    **d != invoker::DiceColor::Omni && d.element() != Some(*element)
                })
                .copied()?;
            Some(Response::ElementalTuning {
                player: *player,
                hand_index: 0,
                die,
            })
        }
        Request::DeclareRoundEnd { player } => Some(Response::DeclareRoundEnd { player: *player }),
    }
}

fn run_match(options: &Options) -> Result<Match, String> {
    let decks = load_decks(options)?;
    let mut m = Match::new(options.seed);
    m.start(&decks).map_err(|e| format!("start failed: {e:?}"))?;

    let mut rng = StdRng::seed_from_u64(options.seed ^ 0x5eed);
    // A hard step bound turns a driver bug into a diagnosable failure.
    for _ in 0..100_000 {
        m.step();
        if m.is_game_end() {
            break;
        }
        let waiting: Vec<PlayerId> = PlayerId::BOTH
            .into_iter()
            .filter(|p| m.need_respond(*p))
            .collect();
        if waiting.is_empty() {
            continue;
        }
        for player in waiting {
            let requests: Vec<Request> = m
                .requests()
                .iter()
                .filter(|r| r.player() == player)
                .cloned()
                .collect();
            let picked = &requests[rng.random_range(0..requests.len())];
            let response = respond_randomly(&m, picked, &mut rng)
                .ok_or("driver failed to build a response")?;
            m.respond(&response)
                .map_err(|e| format!("response rejected: {e:?}"))?;
            // Only one response per halt; the other player may act later.
            break;
        }
    }
    Ok(m)
}

fn main() -> ExitCode {
    let options = match parse_args() {
        Ok(options) => options,
        Err(message) => {
            eprintln!("invoker: {message}");
            return ExitCode::FAILURE;
        }
    };
    let m = match run_match(&options) {
        Ok(m) => m,
        Err(message) => {
            eprintln!("invoker: {message}");
            return ExitCode::FAILURE;
        }
    };

    if options.trace {
        for event in m.log().events() {
            println!("{event:?}");
        }
    }
    if options.json {
        let summary = serde_json::json!({
            "seed": options.seed,
            "rounds": m.round_number(),
            "winner": m.winner().map(|p| p.index()),
            "journal_entries": m.log().len(),
        });
        println!("{summary}");
        return ExitCode::SUCCESS;
    }

    match m.winner() {
        Some(winner) => println!(
            "player {} wins after {} rounds ({} journal entries)",
            winner.index(),
            m.round_number(),
            m.log().len()
        ),
        None => println!(
            "draw after {} rounds ({} journal entries)",
            m.round_number(),
            m.log().len()
        ),
    }
    if let Some(error) = m.failure() {
        eprintln!("invoker: match failed: {error}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
