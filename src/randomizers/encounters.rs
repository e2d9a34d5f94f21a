use std::collections::{BTreeMap, BTreeSet};

use log::debug;
use rand::Rng;

use crate::engine::{Randomizer, RandomizerContext};
use crate::error::{RandomizerError, Result};
use crate::model::{Dex, EncounterArea, SpeciesId};
use crate::pool::SpeciesPool;
use crate::rng::RandomizerRng;
use crate::session::Session;
use crate::settings::{EncounterMode, Settings};

/// Remaps wild encounter tables and rescales their levels.
pub struct EncounterRandomizer;

impl EncounterRandomizer {
    pub fn new() -> Self {
        Self
    }

    pub fn randomize<R: Rng + ?Sized>(
        dex: &Dex,
        areas: &mut [EncounterArea],
        pool: &SpeciesPool,
        mode: EncounterMode,
        rng: &mut R,
    ) -> Result<()> {
        if mode == EncounterMode::Unchanged {
            return Ok(());
        }
        if pool.is_empty() {
            return Err(RandomizerError::no_candidates("no species left for wild encounters"));
        }
        let mut working = pool.clone();
        let mut global: BTreeMap<SpeciesId, SpeciesId> = BTreeMap::new();
        for area in areas.iter_mut() {
            match mode {
                EncounterMode::Unchanged => {}
                EncounterMode::Random => {
                    for encounter in &mut area.encounters {
                        let mut obtainable = pool.obtainable_at(dex, encounter.level);
                        encounter.species = obtainable.random_member(rng, false)?;
                    }
                }
                EncounterMode::CatchEmAll => {
                    let map = map_area(area, |_| refill_draw(&mut working, pool, |p| p.random_member(&mut *rng, true)))?;
                    apply(area, &map);
                }
                EncounterMode::TypeThemed => {
                    let ty = pool.random_type_excluding(rng, false, &BTreeSet::new())?;
                    debug!("area {} themed {ty}", area.name);
                    let mut themed = pool.clone();
                    themed.filter_by_type(ty);
                    let full = themed.clone();
                    let map = map_area(area, |_| {
                        refill_draw(&mut themed, &full, |p| p.random_of_type(ty, &mut *rng, true))
                    })?;
                    apply(area, &map);
                }
                EncounterMode::SimilarStrength => {
                    let mut local = pool.clone();
                    let map = map_area(area, |original| {
                        refill_draw(&mut local, pool, |p| {
                            p.random_by_power_level(dex, original, false, &mut *rng, true)
                        })
                    })?;
                    apply(area, &map);
                }
                EncounterMode::AreaMapping => {
                    let mut local = pool.clone();
                    let map = map_area(area, |_| refill_draw(&mut local, pool, |p| p.random_member(&mut *rng, true)))?;
                    apply(area, &map);
                }
                EncounterMode::GlobalMapping => {
                    for original in area.distinct_species() {
                        if !global.contains_key(&original) {
                            let pick = refill_draw(&mut working, pool, |p| p.random_member(&mut *rng, true))?;
                            global.insert(original, pick);
                        }
                    }
                    apply(area, &global);
                }
            }
        }
        Ok(())
    }

    /// Multiplies every encounter level by `percent / 100`, clamped to 1..=100.
    pub fn scale_levels(areas: &mut [EncounterArea], percent: u16) {
        let scale = |level: u8| -> u8 {
            let scaled = (f64::from(level) * f64::from(percent) / 100.0).round();
            scaled.clamp(1.0, 100.0) as u8
        };
        for encounter in areas.iter_mut().flat_map(|a| a.encounters.iter_mut()) {
            encounter.level = scale(encounter.level);
            if encounter.max_level > 0 {
                encounter.max_level = scale(encounter.max_level);
            }
        }
    }
}

impl Default for EncounterRandomizer {
    fn default() -> Self {
        Self::new()
    }
}

/// One replacement per distinct species of the area.
fn map_area(
    area: &EncounterArea,
    mut pick: impl FnMut(SpeciesId) -> Result<SpeciesId>,
) -> Result<BTreeMap<SpeciesId, SpeciesId>> {
    area.distinct_species()
        .into_iter()
        .map(|original| Ok((original, pick(original)?)))
        .collect()
}

fn apply(area: &mut EncounterArea, map: &BTreeMap<SpeciesId, SpeciesId>) {
    for encounter in &mut area.encounters {
        if let Some(&replacement) = map.get(&encounter.species) {
            encounter.species = replacement;
        }
    }
}

/// Draws from `working`, restoring it from `full` first when it has run dry.
fn refill_draw(
    working: &mut SpeciesPool,
    full: &SpeciesPool,
    draw: impl FnOnce(&mut SpeciesPool) -> Result<SpeciesId>,
) -> Result<SpeciesId> {
    if working.is_empty() {
        *working = full.clone();
    }
    draw(working)
}

impl Randomizer for EncounterRandomizer {
    fn name(&self) -> &str {
        "encounters"
    }

    fn enabled(&self, settings: &Settings, session: &Session) -> bool {
        let encounters = &settings.encounters;
        !session.encounter_areas.is_empty()
            && (encounters.mode != EncounterMode::Unchanged || encounters.level_modifier_percent != 100)
    }

    fn run(
        &mut self,
        ctx: &RandomizerContext,
        session: &mut Session,
        rng: &mut RandomizerRng<'_>,
    ) -> Result<()> {
        let settings = &ctx.settings.encounters;
        let pool = session.species_pool(settings.no_legendaries, false);
        Self::randomize(&session.dex, &mut session.encounter_areas, &pool, settings.mode, rng)?;
        if settings.level_modifier_percent != 100 {
            Self::scale_levels(&mut session.encounter_areas, settings.level_modifier_percent);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Encounter, Type};
    use crate::randomizers::testing;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn area(name: &str, slots: &[(u16, u8)]) -> EncounterArea {
        EncounterArea {
            name: name.to_string(),
            rate: 20,
            encounters: slots
                .iter()
                .map(|&(id, level)| Encounter::new(SpeciesId(id), level))
                .collect(),
        }
    }

    fn species_of(area: &EncounterArea) -> Vec<SpeciesId> {
        area.encounters.iter().map(|e| e.species).collect()
    }

    #[test]
    fn catch_em_all_avoids_repeats_until_the_pool_runs_out() {
        let session = testing::session();
        let pool = session.species_pool(false, false);
        let slots: Vec<(u16, u8)> = (1..=10).map(|id| (id, 5)).collect();
        let mut areas = vec![area("Cave", &slots)];
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        EncounterRandomizer::randomize(&session.dex, &mut areas, &pool, EncounterMode::CatchEmAll, &mut rng)
            .unwrap();
        let picks: BTreeSet<SpeciesId> = species_of(&areas[0]).into_iter().collect();
        assert_eq!(picks.len(), 10);
    }

    #[test]
    fn area_mapping_is_consistent_within_an_area() {
        let session = testing::session();
        let pool = session.species_pool(false, false);
        for seed in 0..10 {
            let mut areas = session.encounter_areas.clone();
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            EncounterRandomizer::randomize(&session.dex, &mut areas, &pool, EncounterMode::AreaMapping, &mut rng)
                .unwrap();
            let picks = species_of(&areas[0]);
            assert_eq!(picks[0], picks[2]);
            assert_ne!(picks[0], picks[1]);
        }
    }

    #[test]
    fn global_mapping_is_shared_across_areas() {
        let session = testing::session();
        let pool = session.species_pool(false, false);
        let mut areas = vec![area("Route 1", &[(1, 3), (4, 4)]), area("Route 2", &[(4, 8), (9, 9), (1, 7)])];
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        EncounterRandomizer::randomize(&session.dex, &mut areas, &pool, EncounterMode::GlobalMapping, &mut rng)
            .unwrap();
        let first = species_of(&areas[0]);
        let second = species_of(&areas[1]);
        assert_eq!(first[0], second[2]);
        assert_eq!(first[1], second[0]);
        let distinct: BTreeSet<SpeciesId> = first.iter().chain(&second).copied().collect();
        assert_eq!(distinct.len(), 3);
    }

    #[test]
    fn themed_areas_share_a_type() {
        let session = testing::session();
        let pool = session.species_pool(false, false);
        for seed in 0..20 {
            let mut areas = vec![area("Forest", &[(1, 3), (4, 4), (7, 5), (9, 6)])];
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            EncounterRandomizer::randomize(&session.dex, &mut areas, &pool, EncounterMode::TypeThemed, &mut rng)
                .unwrap();
            let shared = Type::usable(session.generation).into_iter().any(|ty| {
                species_of(&areas[0])
                    .iter()
                    .all(|id| session.dex[*id].has_type(ty))
            });
            assert!(shared, "seed {seed}");
        }
    }

    #[test]
    fn similar_strength_stays_near_the_original_total() {
        let session = testing::session();
        let pool = session.species_pool(true, false);
        for seed in 0..20 {
            let mut areas = session.encounter_areas.clone();
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            EncounterRandomizer::randomize(&session.dex, &mut areas, &pool, EncounterMode::SimilarStrength, &mut rng)
                .unwrap();
            for (before, after) in session.encounter_areas[0].encounters.iter().zip(&areas[0].encounters) {
                let original = session.dex[before.species].bst();
                let picked = session.dex[after.species].bst();
                assert!(original.abs_diff(picked) * 4 <= original, "{original} -> {picked}");
            }
        }
    }

    #[test]
    fn random_slots_only_hold_species_obtainable_at_their_level() {
        let session = testing::session();
        let pool = session.species_pool(false, false);
        for seed in 0..20 {
            let mut areas = vec![area("Grass", &[(1, 3), (4, 5), (7, 20), (9, 40)])];
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            EncounterRandomizer::randomize(&session.dex, &mut areas, &pool, EncounterMode::Random, &mut rng)
                .unwrap();
            for encounter in &areas[0].encounters {
                assert!(session.dex.earliest_level(encounter.species) <= u16::from(encounter.level));
            }
        }
    }

    #[test]
    fn levels_scale_and_clamp() {
        let mut areas = vec![area("Sea", &[(1, 3), (4, 80), (7, 1)])];
        areas[0].encounters[0].max_level = 5;
        EncounterRandomizer::scale_levels(&mut areas, 200);
        let levels: Vec<(u8, u8)> = areas[0].encounters.iter().map(|e| (e.level, e.max_level)).collect();
        assert_eq!(levels, vec![(6, 10), (100, 0), (2, 0)]);

        EncounterRandomizer::scale_levels(&mut areas, 10);
        assert_eq!(areas[0].encounters[2].level, 1);
    }
}
