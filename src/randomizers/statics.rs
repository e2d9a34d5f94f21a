use std::collections::BTreeMap;

use rand::Rng;

use crate::engine::{Randomizer, RandomizerContext};
use crate::error::{RandomizerError, Result};
use crate::model::{Dex, SpeciesId, StaticEncounter};
use crate::pool::SpeciesPool;
use crate::rng::RandomizerRng;
use crate::session::Session;
use crate::settings::{Settings, StaticMode};

/// Swaps scripted encounters, legendaries for legendaries and everything
/// else for non-legendaries.
pub struct StaticRandomizer;

impl StaticRandomizer {
    pub fn new() -> Self {
        Self
    }

    pub fn swap_legendaries<R: Rng + ?Sized>(
        dex: &Dex,
        statics: &mut [StaticEncounter],
        pool: &SpeciesPool,
        rng: &mut R,
    ) -> Result<()> {
        let mut legendaries = pool.clone();
        legendaries.filter_legendary(dex, true);
        let mut regulars = pool.clone();
        regulars.filter_legendary(dex, false);
        let full = [legendaries.clone(), regulars.clone()];
        let mut working = [legendaries, regulars];

        let mut map: BTreeMap<SpeciesId, SpeciesId> = BTreeMap::new();
        for encounter in statics.iter_mut() {
            let original = encounter.species;
            if let Some(&mapped) = map.get(&original) {
                encounter.species = mapped;
                continue;
            }
            let legendary = dex.get(original).map_or(false, |s| s.legendary);
            let side = if legendary { 0 } else { 1 };
            if working[side].is_empty() {
                working[side] = full[side].clone();
            }
            let pick = working[side].random_member(rng, true).map_err(|_| {
                RandomizerError::no_candidates(format!(
                    "no {} species to replace static {original}",
                    if legendary { "legendary" } else { "non-legendary" }
                ))
            })?;
            map.insert(original, pick);
            encounter.species = pick;
        }
        Ok(())
    }
}

impl Default for StaticRandomizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Randomizer for StaticRandomizer {
    fn name(&self) -> &str {
        "statics"
    }

    fn enabled(&self, settings: &Settings, session: &Session) -> bool {
        settings.statics.mode == StaticMode::SwapLegendaries && !session.static_encounters.is_empty()
    }

    fn run(
        &mut self,
        _ctx: &RandomizerContext,
        session: &mut Session,
        rng: &mut RandomizerRng<'_>,
    ) -> Result<()> {
        let pool = session.species_pool(false, false);
        Self::swap_legendaries(&session.dex, &mut session.static_encounters, &pool, rng)
    }
}
