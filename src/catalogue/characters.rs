//! Character definitions, one per element.

use crate::character::{CharacterDefinition, Creation, SkillDefinition, SkillKind};
use crate::cost::Cost;
use crate::dice::DiceColor;
use crate::element::{DamageType, Element};

fn normal(name: &'static str, element: Element, damage: u8, damage_type: DamageType) -> SkillDefinition {
    SkillDefinition::new(
        name,
        SkillKind::NormalAttack,
        Cost::elemental(DiceColor::from_element(element), 1).with_any(2),
    )
    .dealing(damage, damage_type)
}

fn skill(name: &'static str, element: Element, damage: u8) -> SkillDefinition {
    SkillDefinition::new(
        name,
        SkillKind::ElementalSkill,
        Cost::elemental(DiceColor::from_element(element), 3),
    )
    .dealing(damage, DamageType::Elemental(element))
}

fn burst(name: &'static str, element: Element, dice: u8, charge: u8, damage: u8) -> SkillDefinition {
    SkillDefinition::new(
        name,
        SkillKind::ElementalBurst,
        Cost::elemental(DiceColor::from_element(element), dice).with_charge(charge),
    )
    .dealing(damage, DamageType::Elemental(element))
}

fn sheet(
    name: &'static str,
    element: Element,
    faction: &'static str,
    max_charge: u8,
    skills: Vec<SkillDefinition>,
) -> CharacterDefinition {
    CharacterDefinition {
        name,
        version: "1.0",
        element,
        faction,
        max_hp: 10,
        max_charge,
        skills,
    }
}

fn kaeya() -> CharacterDefinition {
    sheet(
        "Kaeya",
        Element::Cryo,
        "Mondstadt",
        2,
        vec![
            normal("Ceremonial Bladework", Element::Cryo, 2, DamageType::Physical),
            skill("Frostgnaw", Element::Cryo, 3),
            burst("Glacial Waltz", Element::Cryo, 4, 2, 1)
                .creating(Creation::TeamStatus("Icicle")),
        ],
    )
}

fn barbara() -> CharacterDefinition {
    sheet(
        "Barbara",
        Element::Hydro,
        "Mondstadt",
        3,
        vec![
            normal(
                "Whisper of Water",
                Element::Hydro,
                1,
                DamageType::Elemental(Element::Hydro),
            ),
            skill("Let the Show Begin", Element::Hydro, 1).healing(1),
            burst("Shining Miracle", Element::Hydro, 3, 3, 0).healing(4),
        ],
    )
}

fn diluc() -> CharacterDefinition {
    sheet(
        "Diluc",
        Element::Pyro,
        "Mondstadt",
        3,
        vec![
            normal("Tempered Sword", Element::Pyro, 2, DamageType::Physical),
            skill("Searing Onslaught", Element::Pyro, 3),
            burst("Dawn", Element::Pyro, 4, 3, 8)
                .creating(Creation::CharacterStatus("Pyro Infusion")),
        ],
    )
}

fn fischl() -> CharacterDefinition {
    sheet(
        "Fischl",
        Element::Electro,
        "Mondstadt",
        3,
        vec![
            normal("Bolts of Downfall", Element::Electro, 2, DamageType::Physical),
            skill("Nightrider", Element::Electro, 1).creating(Creation::Summon("Oz")),
            burst("Midnight Phantasmagoria", Element::Electro, 3, 3, 4),
        ],
    )
}

fn sucrose() -> CharacterDefinition {
    sheet(
        "Sucrose",
        Element::Anemo,
        "Mondstadt",
        2,
        vec![
            normal(
                "Wind Spirit Creation",
                Element::Anemo,
                1,
                DamageType::Elemental(Element::Anemo),
            ),
            skill("Astable Anemohypostasis Creation-6308", Element::Anemo, 3),
            burst("Forbidden Creation-Isomer 75/Type II", Element::Anemo, 3, 2, 4),
        ],
    )
}

fn ningguang() -> CharacterDefinition {
    sheet(
        "Ningguang",
        Element::Geo,
        "Liyue",
        3,
        vec![
            normal(
                "Sparkling Scatter",
                Element::Geo,
                1,
                DamageType::Elemental(Element::Geo),
            ),
            skill("Jade Screen", Element::Geo, 2),
            burst("Starshatter", Element::Geo, 3, 3, 6),
        ],
    )
}

fn collei() -> CharacterDefinition {
    sheet(
        "Collei",
        Element::Dendro,
        "Sumeru",
        2,
        vec![
            normal("Supplicant's Bowmanship", Element::Dendro, 2, DamageType::Physical),
            skill("Floral Brush", Element::Dendro, 3),
            burst("Trump-Card Kitty", Element::Dendro, 3, 2, 2),
        ],
    )
}

/// Resolve a character definition by name.
pub fn character_definition(name: &str) -> Option<CharacterDefinition> {
    match name {
        "Kaeya" => Some(kaeya()),
        "Barbara" => Some(barbara()),
        "Diluc" => Some(diluc()),
        "Fischl" => Some(fischl()),
        "Sucrose" => Some(sucrose()),
        "Ningguang" => Some(ningguang()),
        "Collei" => Some(collei()),
        _ => None,
    }
}

/// Every character name in the standard catalogue.
pub fn all_character_names() -> Vec<&'static str> {
    vec![
        "Kaeya",
        "Barbara",
        "Diluc",
        "Fischl",
        "Sucrose",
        "Ningguang",
        "Collei",
    ]
}
