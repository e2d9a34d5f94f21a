//! The in-memory data model every randomizer reads and mutates.

pub mod dex;
pub mod encounter;
pub mod evolution;
pub mod generation;
pub mod moves;
pub mod species;
pub mod trainer;
pub mod types;
pub mod world;

pub use dex::Dex;
pub use encounter::{Encounter, EncounterArea};
pub use evolution::{Evolution, EvolutionMethods, EvolutionType, ParamKind, TypeChange};
pub use generation::Generation;
pub use moves::{LearntMove, Move, MoveCategory, METRONOME, STRUGGLE};
pub use species::{GrowthRate, Species, SpeciesId, Stats};
pub use trainer::{Trainer, TrainerCategory, TrainerPokemon, TrainerTag, UniquenessPool};
pub use types::{Effectiveness, Type, TypeTable};
pub use world::{FieldItem, InGameTrade, StaticEncounter};
