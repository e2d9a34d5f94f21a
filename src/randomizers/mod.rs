//! One randomizer per dataset concern, applied by the engine in a fixed order.

mod abilities;
mod compatibility;
mod encounters;
mod evolutions;
mod items;
mod moves;
mod movesets;
mod starters;
mod statics;
mod stats;
mod trades;
mod trainers;
mod types;

pub use abilities::AbilitiesRandomizer;
pub use compatibility::CompatibilityRandomizer;
pub use encounters::EncounterRandomizer;
pub use evolutions::EvolutionRandomizer;
pub use items::ItemRandomizer;
pub use moves::MoveRandomizer;
pub use movesets::MovesetRandomizer;
pub use starters::StarterRandomizer;
pub use statics::StaticRandomizer;
pub use stats::StatsRandomizer;
pub use trades::TradeRandomizer;
pub use trainers::{assign_group_types, TrainerRandomizer};
pub use types::TypesRandomizer;
