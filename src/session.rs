//! State of a single randomization run.

use std::collections::BTreeMap;

use crate::dataset::{Capabilities, RomData};
use crate::error::Result;
use crate::model::{
    Dex, EncounterArea, EvolutionMethods, FieldItem, Generation, InGameTrade, LearntMove, Move,
    SpeciesId, StaticEncounter, Trainer, Type, TypeTable,
};
use crate::pool::SpeciesPool;

/// Lookups memoised while a run is in progress.
#[derive(Debug, Default)]
pub struct SessionCache {
    /// Replacement chosen for each original trainer species.
    pub trainer_swaps: BTreeMap<SpeciesId, SpeciesId>,
    /// Trainer replacement pools keyed by theme type.
    pub type_pools: BTreeMap<Type, SpeciesPool>,
    /// Evolution branch a rival's starter took, keyed by variant and species.
    pub rival_branches: BTreeMap<(u32, SpeciesId), SpeciesId>,
}

/// The in-memory model every randomizer mutates, read from a [`RomData`]
/// source and written back once the whole run has succeeded.
///
/// A session is built per run and dropped afterwards; nothing carries over
/// between runs.
#[derive(Debug)]
pub struct Session {
    pub generation: Generation,
    pub capabilities: Capabilities,
    pub dex: Dex,
    pub type_table: TypeTable,
    pub methods: EvolutionMethods,
    pub abilities: Vec<u16>,
    pub moves: Vec<Move>,
    pub learnsets: BTreeMap<SpeciesId, Vec<LearntMove>>,
    pub tm_moves: Vec<u16>,
    pub tm_compatibility: BTreeMap<SpeciesId, Vec<bool>>,
    pub tutor_moves: Vec<u16>,
    pub tutor_compatibility: BTreeMap<SpeciesId, Vec<bool>>,
    pub starters: Vec<SpeciesId>,
    pub trainers: Vec<Trainer>,
    pub encounter_areas: Vec<EncounterArea>,
    pub static_encounters: Vec<StaticEncounter>,
    pub trades: Vec<InGameTrade>,
    pub field_items: Vec<FieldItem>,
    pub evolution_items: Vec<u16>,
    pub regular_items: Vec<u16>,
    pub cache: SessionCache,
}

impl Session {
    pub fn load(data: &dyn RomData) -> Result<Self> {
        let generation = data.generation();
        Ok(Self {
            generation,
            capabilities: data.capabilities(),
            dex: Dex::new(data.species())?,
            type_table: TypeTable::for_generation(generation),
            methods: EvolutionMethods::for_generation(generation),
            abilities: data.abilities(),
            moves: data.moves(),
            learnsets: data.learnsets(),
            tm_moves: data.tm_moves(),
            tm_compatibility: data.tm_compatibility(),
            tutor_moves: data.tutor_moves(),
            tutor_compatibility: data.tutor_compatibility(),
            starters: data.starters(),
            trainers: data.trainers(),
            encounter_areas: data.encounter_areas(),
            static_encounters: data.static_encounters(),
            trades: data.trades(),
            field_items: data.field_items(),
            evolution_items: data.evolution_items(),
            regular_items: data.regular_items(),
            cache: SessionCache::default(),
        })
    }

    /// Writes every collection back to `data`.
    pub fn store(&self, data: &mut dyn RomData) {
        data.set_species(self.dex.to_species());
        data.set_moves(self.moves.clone());
        data.set_learnsets(self.learnsets.clone());
        data.set_tm_compatibility(self.tm_compatibility.clone());
        data.set_tutor_compatibility(self.tutor_compatibility.clone());
        data.set_starters(self.starters.clone());
        data.set_trainers(self.trainers.clone());
        data.set_encounter_areas(self.encounter_areas.clone());
        data.set_static_encounters(self.static_encounters.clone());
        data.set_trades(self.trades.clone());
        data.set_field_items(self.field_items.clone());
    }

    /// All species eligible for random placement.
    pub fn species_pool(&self, no_legendaries: bool, allow_formes: bool) -> SpeciesPool {
        let allow_formes = allow_formes && self.capabilities.alternate_formes;
        let ids = self
            .dex
            .iter()
            .filter(|s| !(no_legendaries && s.legendary))
            .filter(|s| allow_formes || !s.is_forme())
            .map(|s| s.id);
        SpeciesPool::new(&self.dex, ids)
    }

    pub fn move_by_id(&self, id: u16) -> Option<&Move> {
        self.moves.iter().find(|m| m.id == id)
    }

    pub fn types_in_use(&self) -> Vec<Type> {
        Type::usable(self.generation)
    }
}
