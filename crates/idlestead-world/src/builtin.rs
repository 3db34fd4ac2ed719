//! Built-in content tables.
//!
//! Six maps of rising difficulty, a five-node world tree, five buildings,
//! six research projects, seven pieces of equipment, and two starter
//! artifacts with two presets. Also the daily task pool, the seven-day
//! login reward cycle, and twelve achievements.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use idlestead_types::{
    AchievementDef, AchievementMetric, ArtifactDef, ArtifactPreset, ArtifactTag, BonusKey,
    BuildingDef, BuildingEffect, Currency, DailyTaskDef, DailyTaskKind, DropEntry,
    EncounterNodeDef, EquipmentDef, EquipmentEffect, EquipmentSlot, EquipmentStat,
    LoginRewardDef, MapDef, NodeKind, Rarity, ResearchDef, ResearchEffect, ResearchUnlock,
    ResourceKey, Reward, RewardKind, Role, WorldNodeDef,
};

use crate::content::ContentTables;

/// Id of the map a fresh run starts on.
pub const STARTING_MAP: &str = "tutorial";

/// Id of the world-tree node purchased on a fresh game.
pub const ROOT_NODE: &str = "root";

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn d(num: i64, scale: u32) -> Decimal {
    Decimal::new(num, scale)
}

fn ids(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| (*s).to_string()).collect()
}

const fn reward(currency: Currency, weight: u32) -> DropEntry {
    DropEntry { currency, weight }
}

fn enc(
    id: &str,
    name: &str,
    kind: NodeKind,
    hp: i64,
    time_limit_secs: Option<u64>,
    adjacent: &[&str],
    drops: Vec<DropEntry>,
) -> EncounterNodeDef {
    EncounterNodeDef {
        id: id.to_string(),
        name: name.to_string(),
        kind,
        hp: Decimal::from(hp),
        time_limit_secs,
        adjacent: ids(adjacent),
        drops,
    }
}

fn map(id: &str, name: &str, required_clears: u32, nodes: Vec<EncounterNodeDef>) -> MapDef {
    let entry_node = nodes.first().map(|n| n.id.clone()).unwrap_or_default();
    MapDef {
        id: id.to_string(),
        name: name.to_string(),
        required_clears,
        entry_node,
        nodes,
    }
}

fn world_node(
    id: &str,
    name: &str,
    cost: (i64, i64),
    prerequisites: &[&str],
    unlocks: &[&str],
    bonuses: Vec<(BonusKey, Decimal)>,
) -> WorldNodeDef {
    WorldNodeDef {
        id: id.to_string(),
        name: name.to_string(),
        cost: BTreeMap::from([
            (Currency::Blueprint, Decimal::from(cost.0)),
            (Currency::Memory, Decimal::from(cost.1)),
        ]),
        prerequisites: ids(prerequisites),
        unlocks: ids(unlocks),
        bonuses: bonuses.into_iter().collect(),
    }
}

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

/// Build the complete built-in content set.
pub fn builtin_content() -> ContentTables {
    ContentTables {
        starting_map: STARTING_MAP.to_string(),
        world_nodes: world_nodes(),
        maps: maps(),
        buildings: buildings(),
        research: research(),
        equipment: equipment(),
        artifacts: artifacts(),
        starter_presets: presets(),
        daily_tasks: daily_tasks(),
        login_rewards: login_rewards(),
        achievements: achievements(),
    }
}

fn world_nodes() -> Vec<WorldNodeDef> {
    vec![
        world_node(ROOT_NODE, "World Seed", (0, 0), &[], &["res1", "com1"], vec![]),
        world_node(
            "res1",
            "Resource Surge I",
            (10, 5),
            &[ROOT_NODE],
            &["res2"],
            vec![(BonusKey::Resource, d(12, 1))],
        ),
        world_node(
            "res2",
            "Long Absence I",
            (30, 20),
            &["res1"],
            &[],
            vec![(BonusKey::OfflineCap, d(12, 0))],
        ),
        world_node(
            "com1",
            "Combat Basics",
            (15, 10),
            &[ROOT_NODE],
            &["com2"],
            vec![(BonusKey::Attack, d(115, 2))],
        ),
        world_node(
            "com2",
            "Shieldbreaking Drills",
            (50, 40),
            &["com1"],
            &[],
            vec![(BonusKey::ShieldBreak, d(1, 0))],
        ),
    ]
}

fn maps() -> Vec<MapDef> {
    use Currency::{Blueprint as B, Memory as M};
    use NodeKind::{Env, Normal, Protected, Shield, Timed};

    vec![
        map(
            "tutorial",
            "Novice Woods",
            0,
            vec![
                enc("t1", "Forest Path", Normal, 50, None, &["t2"], vec![reward(B, 1)]),
                enc("t2", "Wolf Den", Normal, 80, None, &["t3"], vec![reward(B, 1)]),
                enc("t3", "Ranger's Hut", Normal, 100, None, &[], vec![reward(M, 1)]),
            ],
        ),
        map(
            "forest",
            "Misty Forest",
            3,
            vec![
                enc("f1", "Mist Gate", Normal, 120, None, &["f2", "f3"], vec![reward(B, 1)]),
                enc("f2", "Elven Outpost", Shield, 180, None, &["f4"], vec![reward(M, 1)]),
                enc("f3", "Deep Thicket", Normal, 150, None, &["f4"], vec![reward(B, 2)]),
                enc("f4", "Heart of the Old Tree", Shield, 250, None, &[], vec![reward(M, 2)]),
            ],
        ),
        map(
            "desert",
            "Desert Ruins",
            7,
            vec![
                enc("d1", "Desert Edge", Normal, 200, None, &["d2", "d3"], vec![reward(B, 1)]),
                enc("d2", "Quicksand Trap", Timed, 300, Some(30), &["d4"], vec![reward(M, 3)]),
                enc("d3", "Oasis Camp", Normal, 180, None, &["d4"], vec![reward(B, 2)]),
                enc("d4", "Ruin Gate", Protected, 400, None, &["d5"], vec![reward(M, 2)]),
                enc(
                    "d5",
                    "Pharaoh's Vault",
                    Timed,
                    500,
                    Some(45),
                    &[],
                    vec![reward(B, 5), reward(M, 5)],
                ),
            ],
        ),
        map(
            "glacier",
            "Frozen Glacier",
            12,
            vec![
                enc("g1", "Glacier Mouth", Normal, 350, None, &["g2"], vec![reward(B, 2)]),
                enc("g2", "Frost Watchtower", Shield, 500, None, &["g3", "g4"], vec![reward(M, 2)]),
                enc("g3", "Blizzard Field", Env, 600, None, &["g5"], vec![reward(B, 3)]),
                enc("g4", "Frozen Lake", Shield, 550, None, &["g5"], vec![reward(M, 3)]),
                enc(
                    "g5",
                    "Ice Giant Lair",
                    Protected,
                    800,
                    None,
                    &["g6"],
                    vec![reward(B, 4), reward(M, 4)],
                ),
                enc(
                    "g6",
                    "Throne of Frost",
                    Shield,
                    1000,
                    None,
                    &[],
                    vec![reward(B, 6), reward(M, 6)],
                ),
            ],
        ),
        map(
            "volcano",
            "Blazing Volcano",
            18,
            vec![
                enc("v1", "Volcano Foothills", Normal, 400, None, &["v2", "v3"], vec![reward(B, 2)]),
                enc("v2", "Lava River", Timed, 600, Some(25), &["v4"], vec![reward(M, 4)]),
                enc("v3", "Magma Cave", Env, 550, None, &["v4"], vec![reward(B, 3)]),
                enc("v4", "Flame Warden", Shield, 700, None, &["v5"], vec![reward(M, 4)]),
                enc("v5", "Eruption Vent", Timed, 900, Some(35), &["v6"], vec![reward(B, 5)]),
                enc(
                    "v6",
                    "Volcano Heart",
                    Timed,
                    1200,
                    Some(40),
                    &[],
                    vec![reward(B, 8), reward(M, 8)],
                ),
            ],
        ),
        map(
            "abyss",
            "Endless Abyss",
            25,
            vec![
                enc("a1", "Abyss Rim", Normal, 500, None, &["a2"], vec![reward(B, 3)]),
                enc("a2", "Dark Passage", Protected, 700, None, &["a3", "a4"], vec![reward(M, 4)]),
                enc("a3", "Void Rift", Shield, 800, None, &["a5"], vec![reward(B, 4)]),
                enc("a4", "Shadow Gallery", Protected, 750, None, &["a5"], vec![reward(M, 4)]),
                enc(
                    "a5",
                    "Abyss Warden",
                    Protected,
                    1000,
                    None,
                    &["a6"],
                    vec![reward(B, 5), reward(M, 5)],
                ),
                enc(
                    "a6",
                    "Null Core",
                    Shield,
                    1500,
                    None,
                    &[],
                    vec![reward(B, 10), reward(M, 10)],
                ),
            ],
        ),
    ]
}

fn buildings() -> Vec<BuildingDef> {
    use ResourceKey::{Iron, Stone, Wood};

    vec![
        BuildingDef {
            id: "warehouse".to_string(),
            name: "Warehouse".to_string(),
            base_cost: BTreeMap::from([(Wood, d(50, 0)), (Stone, d(30, 0))]),
            cost_multiplier: d(15, 1),
            max_level: 20,
            effects: vec![
                BuildingEffect::ResourceCap { resource: Wood, per_level: d(100, 0) },
                BuildingEffect::ResourceCap { resource: Stone, per_level: d(100, 0) },
                BuildingEffect::ResourceCap { resource: Iron, per_level: d(50, 0) },
            ],
        },
        BuildingDef {
            id: "workshop".to_string(),
            name: "Workshop".to_string(),
            base_cost: BTreeMap::from([(Wood, d(100, 0)), (Stone, d(50, 0))]),
            cost_multiplier: d(16, 1),
            max_level: 15,
            effects: vec![BuildingEffect::Efficiency { role: Role::Worker, per_level: d(1, 1) }],
        },
        BuildingDef {
            id: "barracks".to_string(),
            name: "Barracks".to_string(),
            base_cost: BTreeMap::from([(Wood, d(80, 0)), (Stone, d(100, 0)), (Iron, d(30, 0))]),
            cost_multiplier: d(17, 1),
            max_level: 15,
            effects: vec![
                BuildingEffect::Efficiency { role: Role::Soldier, per_level: d(1, 1) },
                BuildingEffect::PopulationCap { per_level: 5 },
            ],
        },
        BuildingDef {
            id: "research_lab".to_string(),
            name: "Research Lab".to_string(),
            base_cost: BTreeMap::from([(Wood, d(120, 0)), (Stone, d(80, 0)), (Iron, d(50, 0))]),
            cost_multiplier: d(18, 1),
            max_level: 10,
            effects: vec![BuildingEffect::Efficiency {
                role: Role::Researcher,
                per_level: d(15, 2),
            }],
        },
        BuildingDef {
            id: "forge".to_string(),
            name: "Forge".to_string(),
            base_cost: BTreeMap::from([(Stone, d(150, 0)), (Iron, d(80, 0))]),
            cost_multiplier: d(16, 1),
            max_level: 12,
            effects: vec![BuildingEffect::ResourceMultiplier { resource: Iron, per_level: d(1, 1) }],
        },
    ]
}

fn research() -> Vec<ResearchDef> {
    let cost = |blueprint: i64, memory: i64| {
        let mut map = BTreeMap::new();
        if blueprint > 0 {
            map.insert(Currency::Blueprint, Decimal::from(blueprint));
        }
        if memory > 0 {
            map.insert(Currency::Memory, Decimal::from(memory));
        }
        map
    };

    vec![
        ResearchDef {
            id: "efficient_gathering".to_string(),
            name: "Efficient Gathering".to_string(),
            cost: cost(5, 0),
            duration_secs: 60,
            prerequisites: vec![],
            effects: vec![ResearchEffect::Multiplier { bonus: BonusKey::Resource, value: d(11, 1) }],
        },
        ResearchDef {
            id: "improved_construction".to_string(),
            name: "Improved Construction".to_string(),
            cost: cost(10, 2),
            duration_secs: 120,
            prerequisites: ids(&["efficient_gathering"]),
            effects: vec![ResearchEffect::Multiplier {
                bonus: BonusKey::BuildingCost,
                value: d(9, 1),
            }],
        },
        ResearchDef {
            id: "combat_training".to_string(),
            name: "Combat Training".to_string(),
            cost: cost(8, 3),
            duration_secs: 90,
            prerequisites: vec![],
            effects: vec![ResearchEffect::Multiplier { bonus: BonusKey::Attack, value: d(12, 1) }],
        },
        ResearchDef {
            id: "shield_breaker".to_string(),
            name: "Shield Breaker".to_string(),
            cost: cost(15, 5),
            duration_secs: 180,
            prerequisites: ids(&["combat_training"]),
            effects: vec![ResearchEffect::Unlock { unlock: ResearchUnlock::ShieldBreaker }],
        },
        ResearchDef {
            id: "scouting".to_string(),
            name: "Scouting".to_string(),
            cost: cost(12, 0),
            duration_secs: 150,
            prerequisites: ids(&["efficient_gathering"]),
            effects: vec![ResearchEffect::Unlock { unlock: ResearchUnlock::ScoutRole }],
        },
        ResearchDef {
            id: "auto_assign".to_string(),
            name: "Auto Assign".to_string(),
            cost: cost(0, 10),
            duration_secs: 240,
            prerequisites: ids(&["improved_construction"]),
            effects: vec![ResearchEffect::Unlock { unlock: ResearchUnlock::AutoAssign }],
        },
    ]
}

fn equipment() -> Vec<EquipmentDef> {
    use EquipmentSlot::{Accessory, Armor, Weapon};
    use EquipmentStat::{Attack, Defense, Efficiency, Health};

    let item = |id: &str,
                name: &str,
                slot: EquipmentSlot,
                rarity: Rarity,
                gear: Decimal,
                effects: Vec<(EquipmentStat, Decimal)>| EquipmentDef {
        id: id.to_string(),
        name: name.to_string(),
        slot,
        rarity,
        gear_score_bonus: gear,
        effects: effects
            .into_iter()
            .map(|(stat, value)| EquipmentEffect { stat, value })
            .collect(),
    };

    vec![
        item("wooden_sword", "Wooden Sword", Weapon, Rarity::Common, d(1, 0), vec![(Attack, d(2, 0))]),
        item("iron_sword", "Iron Sword", Weapon, Rarity::Uncommon, d(3, 0), vec![(Attack, d(5, 0))]),
        item("flame_blade", "Flame Blade", Weapon, Rarity::Rare, d(8, 0), vec![(Attack, d(12, 0))]),
        item("leather_armor", "Leather Armor", Armor, Rarity::Common, d(1, 0), vec![(Defense, d(2, 0))]),
        item(
            "chainmail",
            "Chainmail",
            Armor,
            Rarity::Uncommon,
            d(3, 0),
            vec![(Defense, d(5, 0)), (Health, d(10, 0))],
        ),
        item("lucky_charm", "Lucky Charm", Accessory, Rarity::Common, d(1, 0), vec![(Efficiency, d(5, 2))]),
        item(
            "ancient_ring",
            "Ancient Ring",
            Accessory,
            Rarity::Rare,
            d(5, 0),
            vec![(Attack, d(3, 0)), (Defense, d(3, 0))],
        ),
    ]
}

fn artifacts() -> Vec<ArtifactDef> {
    vec![
        ArtifactDef {
            id: "a1".to_string(),
            name: "Ring of Burst".to_string(),
            tags: vec![ArtifactTag::Burst],
            stats: BTreeMap::from([(BonusKey::Attack, d(13, 1))]),
            level: 1,
        },
        ArtifactDef {
            id: "a2".to_string(),
            name: "Steady Amulet".to_string(),
            tags: vec![ArtifactTag::Sustain],
            stats: BTreeMap::from([(BonusKey::Defense, d(125, 2))]),
            level: 1,
        },
    ]
}

fn presets() -> Vec<ArtifactPreset> {
    vec![
        ArtifactPreset {
            name: "Push".to_string(),
            slots: vec![Some("a1".to_string()), Some("a2".to_string()), None, None, None],
        },
        ArtifactPreset {
            name: "Resources".to_string(),
            slots: vec![None, None, None, None, None],
        },
    ]
}

fn pay(kind: RewardKind, amount: i64) -> Reward {
    Reward {
        kind,
        amount: Decimal::from(amount),
    }
}

fn daily_tasks() -> Vec<DailyTaskDef> {
    use DailyTaskKind::{ClearNodes, CompleteResearch, EquipArtifact, UpgradeBuilding};
    use RewardKind::{Blueprint, Memory};

    let task = |id: &str, name: &str, kind: DailyTaskKind, target: u32, reward: Reward| {
        DailyTaskDef {
            id: id.to_string(),
            name: name.to_string(),
            kind,
            target,
            reward,
        }
    };

    vec![
        task("daily_clear3", "Map Explorer", ClearNodes, 3, pay(Blueprint, 10)),
        task("daily_clear5", "Deep Explorer", ClearNodes, 5, pay(Memory, 8)),
        task("daily_build1", "Builder", UpgradeBuilding, 1, pay(Blueprint, 5)),
        task("daily_build3", "Master Builder", UpgradeBuilding, 3, pay(Memory, 10)),
        task("daily_research", "Scholar's Path", CompleteResearch, 1, pay(Blueprint, 15)),
        task("daily_artifact", "Tidy Loadout", EquipArtifact, 1, pay(Memory, 5)),
    ]
}

fn login_rewards() -> Vec<LoginRewardDef> {
    use RewardKind::{Blueprint, LegacyPoints, Memory};

    [
        pay(Blueprint, 5),
        pay(Memory, 5),
        pay(Blueprint, 10),
        pay(Memory, 10),
        pay(Blueprint, 15),
        pay(Memory, 15),
        pay(LegacyPoints, 1),
    ]
    .into_iter()
    .zip(1..)
    .map(|(reward, day)| LoginRewardDef { day, reward })
    .collect()
}

fn achievements() -> Vec<AchievementDef> {
    use AchievementMetric::{
        ArtifactCount, BuildingLevels, NodesCleared, ResearchCount, TotalPrestige, WorldNodes,
    };

    let entry = |id: &str, name: &str, metric: AchievementMetric, target: u32, points: i64| {
        AchievementDef {
            id: id.to_string(),
            name: name.to_string(),
            metric,
            target,
            points: Decimal::from(points),
        }
    };

    vec![
        entry("first_node", "First Steps", NodesCleared, 1, 10),
        entry("explorer10", "Explorer", NodesCleared, 10, 0),
        entry("explorer25", "Adventurer", NodesCleared, 25, 0),
        entry("map_master", "Map Master", NodesCleared, 50, 100),
        entry("first_prestige", "Heir", TotalPrestige, 1, 0),
        entry("prestige5", "Seasoned Cycler", TotalPrestige, 5, 0),
        entry("builder10", "Architect", BuildingLevels, 10, 20),
        entry("researcher3", "Scholar", ResearchCount, 3, 0),
        entry("research_master", "Research Master", ResearchCount, 6, 50),
        entry("artifact_collector", "Collector", ArtifactCount, 5, 0),
        entry("world_explorer", "World Explorer", WorldNodes, 5, 0),
        entry("world_master", "World Master", WorldNodes, 10, 100),
    ]
}
