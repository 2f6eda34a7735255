//! The species catalogue every encounter and wild spawn draws from.
//!
//! The catalogue is compiled into the binary from `data/pokedex.toml`.

use std::collections::BTreeMap;
use std::collections::HashSet;
use std::fmt::Display;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Deserialize;
use serde::Serialize;

use crate::error::PokedexError;

/// Raw catalogue shipped with the bot.
const POKEDEX_TOML: &str = include_str!("../../data/pokedex.toml");

/// Official artwork, keyed by national dex number.
const ARTWORK_URL: &str =
    "https://raw.githubusercontent.com/PokeAPI/sprites/master/sprites/pokemon/other/official-artwork";

/// Small in-game sprites, keyed by national dex number.
const SPRITE_URL: &str = "https://raw.githubusercontent.com/PokeAPI/sprites/master/sprites/pokemon";

/// Chance that a wild spawn is Common rather than Uncommon.
const WILD_COMMON_CHANCE: f64 = 0.7;

/// How rare a species is. Ordered from most to least common.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Legendary,
}

impl Rarity {
    /// Every rarity, most common first.
    pub const ALL: [Rarity; 4] = [
        Rarity::Common,
        Rarity::Uncommon,
        Rarity::Rare,
        Rarity::Legendary,
    ];

    /// Probability of an encounter landing in this tier.
    pub fn spawn_weight(self) -> f64 {
        match self {
            Rarity::Common => 0.60,
            Rarity::Uncommon => 0.30,
            Rarity::Rare => 0.08,
            Rarity::Legendary => 0.02,
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            Rarity::Common => "⚪",
            Rarity::Uncommon => "🟢",
            Rarity::Rare => "🔵",
            Rarity::Legendary => "🟡",
        }
    }

    /// Maps a uniform roll in `[0, 1)` onto a tier by walking the cumulative weights.
    /// Rolls past the final boundary (float drift) land on the rarest tier.
    pub fn from_roll(roll: f64) -> Rarity {
        let mut cumulative = 0.0;
        Rarity::ALL
            .into_iter()
            .find(|rarity| {
                cumulative += rarity.spawn_weight();
                roll < cumulative
            })
            .unwrap_or(Rarity::Legendary)
    }
}

impl Display for Rarity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Rarity::Common => "Common",
            Rarity::Uncommon => "Uncommon",
            Rarity::Rare => "Rare",
            Rarity::Legendary => "Legendary",
        };
        f.write_str(name)
    }
}

/// Base stats of a species.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseStats {
    pub hp: u32,
    pub attack: u32,
    pub defense: u32,
    pub sp_attack: u32,
    pub sp_defense: u32,
    pub speed: u32,
    pub total: u32,
}

/// A single catalogue entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Species {
    /// National dex number.
    pub id: u32,
    pub name: String,
    /// Primary type first.
    pub types: Vec<String>,
    pub rarity: Rarity,
    /// Base chance of a Poké Ball succeeding, in `[0, 1]`.
    pub catch_rate: f64,
    pub generation: u8,
    pub description: String,
    pub stats: BaseStats,
}

impl Species {
    pub fn image_url(&self) -> String {
        format!("{ARTWORK_URL}/{}.png", self.id)
    }

    pub fn sprite_url(&self) -> String {
        format!("{SPRITE_URL}/{}.png", self.id)
    }

    /// Embed color for this species.
    pub fn color(&self) -> u32 {
        type_color(&self.types)
    }

    /// Types joined for display, e.g. "Grass / Poison".
    pub fn type_line(&self) -> String {
        self.types.join(" / ")
    }
}

/// Embed color of the primary type, black when unknown.
pub fn type_color(types: &[String]) -> u32 {
    let Some(primary) = types.first() else {
        return 0x000000;
    };

    match primary.as_str() {
        "Normal" => 0xA8A878,
        "Fire" => 0xF08030,
        "Water" => 0x6890F0,
        "Electric" => 0xF8D030,
        "Grass" => 0x78C850,
        "Ice" => 0x98D8D8,
        "Fighting" => 0xC03028,
        "Poison" => 0xA040A0,
        "Ground" => 0xE0C068,
        "Flying" => 0xA890F0,
        "Psychic" => 0xF85888,
        "Bug" => 0xA8B820,
        "Rock" => 0xB8A038,
        "Ghost" => 0x705898,
        "Dragon" => 0x7038F8,
        "Dark" => 0x705848,
        "Steel" => 0xB8B8D0,
        "Fairy" => 0xEE99AC,
        _ => 0x000000,
    }
}

/// Shape of `data/pokedex.toml`.
#[derive(Deserialize)]
struct PokedexFile {
    species: Vec<Species>,
}

/// Summary counts of the catalogue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PokedexStats {
    pub total: usize,
    pub per_generation: BTreeMap<u8, usize>,
    pub per_rarity: BTreeMap<Rarity, usize>,
}

/// The loaded species catalogue.
#[derive(Debug, Clone)]
pub struct Pokedex {
    species: Vec<Species>,
}

impl Pokedex {
    /// Parses and validates the built-in catalogue.
    pub fn load() -> Result<Pokedex, PokedexError> {
        Pokedex::from_toml(POKEDEX_TOML)
    }

    /// Parses a catalogue in the `data/pokedex.toml` format.
    pub fn from_toml(content: &str) -> Result<Pokedex, PokedexError> {
        let to_toml = toml::Deserializer::new(content);
        let file: PokedexFile = serde_path_to_error::deserialize(to_toml)
            .map_err(|error| PokedexError::Parse { reason: error.to_string() })?;

        Pokedex::new(file.species)
    }

    /// Builds a catalogue, rejecting empty lists, duplicate ids and impossible catch rates.
    pub fn new(species: Vec<Species>) -> Result<Pokedex, PokedexError> {
        if species.is_empty() {
            return Err(PokedexError::Empty);
        }

        let mut seen = HashSet::new();
        for entry in &species {
            if !seen.insert(entry.id) {
                return Err(PokedexError::DuplicateId { id: entry.id });
            }
            if !(0.0..=1.0).contains(&entry.catch_rate) {
                return Err(PokedexError::BadCatchRate {
                    name: entry.name.clone(),
                    rate: entry.catch_rate,
                });
            }
        }

        Ok(Pokedex { species })
    }

    pub fn len(&self) -> usize {
        self.species.len()
    }

    pub fn by_id(&self, id: u32) -> Option<&Species> {
        self.species.iter().find(|s| s.id == id)
    }

    /// Case-insensitive exact name match.
    pub fn by_name(&self, name: &str) -> Option<&Species> {
        let name = name.trim();
        self.species.iter().find(|s| s.name.eq_ignore_ascii_case(name))
    }

    pub fn by_rarity(&self, rarity: Rarity) -> Vec<&Species> {
        self.species.iter().filter(|s| s.rarity == rarity).collect()
    }

    pub fn by_generation(&self, generation: u8) -> Vec<&Species> {
        self.species
            .iter()
            .filter(|s| s.generation == generation)
            .collect()
    }

    /// Case-insensitive substring search over names, in dex order.
    pub fn search(&self, query: &str, limit: usize) -> Vec<&Species> {
        let query = query.trim().to_lowercase();
        self.species
            .iter()
            .filter(|s| s.name.to_lowercase().contains(&query))
            .take(limit)
            .collect()
    }

    /// Generations present in the catalogue, ascending.
    pub fn generations(&self) -> Vec<u8> {
        self.stats().per_generation.into_keys().collect()
    }

    pub fn stats(&self) -> PokedexStats {
        let mut per_generation = BTreeMap::new();
        let mut per_rarity = BTreeMap::new();
        for entry in &self.species {
            *per_generation.entry(entry.generation).or_insert(0) += 1;
            *per_rarity.entry(entry.rarity).or_insert(0) += 1;
        }

        PokedexStats {
            total: self.species.len(),
            per_generation,
            per_rarity,
        }
    }

    /// Picks a tier by [Rarity::spawn_weight], then a species from that tier.
    /// An empty tier falls back to the whole catalogue.
    pub fn random_weighted<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&Species> {
        let tier = Rarity::from_roll(rng.gen());
        let pool = self.by_rarity(tier);

        match pool.choose(rng) {
            Some(species) => Some(*species),
            None => self.species.choose(rng),
        }
    }

    /// Wild spawns only ever come from the Common and Uncommon tiers.
    pub fn random_wild<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&Species> {
        let (first, second) = if rng.gen_bool(WILD_COMMON_CHANCE) {
            (Rarity::Common, Rarity::Uncommon)
        } else {
            (Rarity::Uncommon, Rarity::Common)
        };

        let first = self.by_rarity(first);
        if let Some(species) = first.choose(rng) {
            return Some(*species);
        }
        self.by_rarity(second).choose(rng).copied()
    }
}

#[cfg(test)]
pub(crate) mod test {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    /// A minimal species for tests elsewhere in the crate.
    pub(crate) fn species(id: u32, name: &str, rarity: Rarity, catch_rate: f64) -> Species {
        Species {
            id,
            name: name.to_string(),
            types: vec!["Normal".to_string()],
            rarity,
            catch_rate,
            generation: 1,
            description: String::new(),
            stats: BaseStats {
                hp: 10,
                attack: 20,
                defense: 30,
                sp_attack: 0,
                sp_defense: 0,
                speed: 0,
                total: 60,
            },
        }
    }

    #[test]
    fn builtin_catalogue_loads() {
        let dex = Pokedex::load().unwrap();
        assert_eq!(dex.len(), 35);

        let bulbasaur = dex.by_id(1).unwrap();
        assert_eq!(bulbasaur.name, "Bulbasaur");
        assert_eq!(bulbasaur.rarity, Rarity::Uncommon);
        assert_eq!(bulbasaur.catch_rate, 0.55);
        assert_eq!(bulbasaur.color(), 0x78C850);
        assert_eq!(
            bulbasaur.image_url(),
            "https://raw.githubusercontent.com/PokeAPI/sprites/master/sprites/pokemon/other/official-artwork/1.png"
        );

        let stats = dex.stats();
        assert_eq!(stats.total, 35);
        assert_eq!(stats.per_generation.get(&1), Some(&35));
        assert_eq!(stats.per_rarity.values().sum::<usize>(), 35);
        assert_eq!(dex.generations(), vec![1]);
        assert_eq!(dex.by_generation(1).len(), 35);
        assert!(dex.by_generation(2).is_empty());
    }

    #[test]
    fn name_lookup_ignores_case() {
        let dex = Pokedex::load().unwrap();
        assert_eq!(dex.by_name("pIkAcHu").map(|s| s.id), Some(25));
        assert!(dex.by_name("Agumon").is_none());
    }

    #[test]
    fn search_is_substring_and_limited() {
        let dex = Pokedex::load().unwrap();
        let hits = dex.search("saur", 10);
        let names: Vec<_> = hits.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Bulbasaur", "Ivysaur", "Venusaur"]);

        assert_eq!(dex.search("a", 2).len(), 2);
    }

    #[test]
    fn roll_boundaries_select_tiers() {
        assert_eq!(Rarity::from_roll(0.0), Rarity::Common);
        assert_eq!(Rarity::from_roll(0.59), Rarity::Common);
        assert_eq!(Rarity::from_roll(0.61), Rarity::Uncommon);
        assert_eq!(Rarity::from_roll(0.91), Rarity::Rare);
        assert_eq!(Rarity::from_roll(0.99), Rarity::Legendary);
        assert_eq!(Rarity::from_roll(1.5), Rarity::Legendary);
    }

    #[test]
    fn empty_tier_falls_back_to_whole_dex() {
        let dex = Pokedex::new(vec![species(1, "Onlyone", Rarity::Legendary, 0.1)]).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            assert_eq!(dex.random_weighted(&mut rng).map(|s| s.id), Some(1));
        }
    }

    #[test]
    fn wild_spawns_are_never_rare() {
        let dex = Pokedex::load().unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..500 {
            let rarity = dex.random_wild(&mut rng).unwrap().rarity;
            assert!(matches!(rarity, Rarity::Common | Rarity::Uncommon));
        }
    }

    #[test]
    fn wild_spawn_uses_other_tier_when_one_is_empty() {
        let dex = Pokedex::new(vec![species(4, "Uncommonmon", Rarity::Uncommon, 0.4)]).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..50 {
            assert_eq!(dex.random_wild(&mut rng).map(|s| s.id), Some(4));
        }

        let dex = Pokedex::new(vec![species(9, "Rareish", Rarity::Rare, 0.4)]).unwrap();
        assert!(dex.random_wild(&mut rng).is_none());
    }

    #[test]
    fn rejects_bad_catalogues() {
        assert!(matches!(Pokedex::new(vec![]), Err(PokedexError::Empty)));

        let dup = vec![
            species(1, "A", Rarity::Common, 0.5),
            species(1, "B", Rarity::Common, 0.5),
        ];
        assert!(matches!(
            Pokedex::new(dup),
            Err(PokedexError::DuplicateId { id: 1 })
        ));

        let bad_rate = vec![species(2, "C", Rarity::Common, 1.5)];
        assert!(matches!(
            Pokedex::new(bad_rate),
            Err(PokedexError::BadCatchRate { .. })
        ));
    }

    #[test]
    fn unknown_types_are_black() {
        assert_eq!(type_color(&[]), 0x000000);
        assert_eq!(type_color(&["Sound".to_string()]), 0x000000);
        assert_eq!(type_color(&["Fire".to_string(), "Flying".to_string()]), 0xF08030);
    }
}
