use std::collections::BTreeSet;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::engine::{Randomizer, RandomizerContext};
use crate::error::{RandomizerError, Result};
use crate::model::{LearntMove, Move, Species, METRONOME, STRUGGLE};
use crate::rng::RandomizerRng;
use crate::session::Session;
use crate::settings::{MovesetMode, MovesetSettings, Settings};

/// Chance that a slot is drawn from moves sharing the species' type.
const SAME_TYPE_CHANCE: f64 = 0.5;

pub struct MovesetRandomizer;

impl MovesetRandomizer {
    pub fn new() -> Self {
        Self
    }

    pub fn randomize<R: Rng + ?Sized>(
        session: &mut Session,
        settings: &MovesetSettings,
        rng: &mut R,
    ) -> Result<()> {
        match settings.mode {
            MovesetMode::Unchanged => Ok(()),
            MovesetMode::MetronomeOnly => {
                for learnset in session.learnsets.values_mut() {
                    *learnset = vec![LearntMove::new(METRONOME, 1)];
                }
                Ok(())
            }
            MovesetMode::Random => {
                let usable: Vec<&Move> = session
                    .moves
                    .iter()
                    .filter(|m| m.id != STRUGGLE)
                    .collect();
                for (&id, learnset) in session.learnsets.iter_mut() {
                    let Some(species) = session.dex.get(id) else {
                        continue;
                    };
                    *learnset = random_learnset(species, learnset, &usable, settings, rng)?;
                }
                Ok(())
            }
        }
    }
}

impl Default for MovesetRandomizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds a new learnset with the same level layout. At least
/// `guaranteed_level1_moves` moves are known at level 1 and the first of them
/// deals damage.
fn random_learnset<R: Rng + ?Sized>(
    species: &Species,
    current: &[LearntMove],
    usable: &[&Move],
    settings: &MovesetSettings,
    rng: &mut R,
) -> Result<Vec<LearntMove>> {
    let starting = current.iter().filter(|m| m.is_starting_move()).count();
    let floor = starting.max(settings.guaranteed_level1_moves);
    let mut levels: Vec<u8> = vec![1; floor];
    levels.extend(current.iter().filter(|m| !m.is_starting_move()).map(|m| m.level));
    levels.sort_unstable();
    if levels.len() > usable.len() {
        return Err(RandomizerError::no_candidates(format!(
            "{} needs {} distinct moves but only {} exist",
            species.id,
            levels.len(),
            usable.len()
        )));
    }

    let mut used: BTreeSet<u16> = BTreeSet::new();
    let mut learnset = Vec::with_capacity(levels.len());
    for (slot, level) in levels.into_iter().enumerate() {
        let open = |m: &&&Move| !used.contains(&m.id);
        let fresh: Vec<&Move> = usable.iter().filter(open).copied().collect();
        let damaging: Vec<&Move> = fresh.iter().copied().filter(|m| m.is_damaging()).collect();
        let same_type: Vec<&Move> = fresh
            .iter()
            .copied()
            .filter(|m| species.has_type(m.move_type))
            .collect();

        let pool = if slot == 0 && !damaging.is_empty() {
            &damaging
        } else if settings.prefer_same_type && !same_type.is_empty() && rng.gen_bool(SAME_TYPE_CHANCE)
        {
            &same_type
        } else {
            &fresh
        };
        let pick = pool
            .choose(rng)
            .ok_or_else(|| RandomizerError::no_candidates("ran out of moves"))?;
        used.insert(pick.id);
        learnset.push(LearntMove::new(pick.id, level));
    }
    Ok(learnset)
}

impl Randomizer for MovesetRandomizer {
    fn name(&self) -> &str {
        "movesets"
    }

    fn enabled(&self, settings: &Settings, _session: &Session) -> bool {
        settings.movesets.mode != MovesetMode::Unchanged
    }

    fn run(
        &mut self,
        ctx: &RandomizerContext,
        session: &mut Session,
        rng: &mut RandomizerRng<'_>,
    ) -> Result<()> {
        Self::randomize(session, &ctx.settings.movesets, rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SpeciesId;
    use crate::randomizers::testing;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn random(guaranteed: usize, prefer_same_type: bool) -> MovesetSettings {
        MovesetSettings {
            mode: MovesetMode::Random,
            prefer_same_type,
            guaranteed_level1_moves: guaranteed,
        }
    }

    #[test]
    fn movesets_have_no_duplicates_and_keep_their_floor() {
        for seed in 0..20 {
            let mut session = testing::session();
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            MovesetRandomizer::randomize(&mut session, &random(2, seed % 2 == 0), &mut rng).unwrap();
            for (id, learnset) in &session.learnsets {
                let mut ids: Vec<u16> = learnset.iter().map(|m| m.move_id).collect();
                ids.sort_unstable();
                ids.dedup();
                assert_eq!(ids.len(), learnset.len(), "duplicate move for {id}");
                assert_eq!(learnset.iter().filter(|m| m.level == 1).count(), 2);
                let levels: Vec<u8> = learnset.iter().map(|m| m.level).collect();
                assert_eq!(levels, vec![1, 1, 10, 20]);
                let first = session.move_by_id(learnset[0].move_id).unwrap();
                assert!(first.is_damaging());
            }
        }
    }

    #[test]
    fn too_few_moves_is_reported() {
        let mut session = testing::session();
        session.moves.truncate(2);
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let err = MovesetRandomizer::randomize(&mut session, &random(1, false), &mut rng).unwrap_err();
        assert!(err.is_no_candidates());
    }

    #[test]
    fn metronome_mode_replaces_everything() {
        let mut session = testing::session();
        let settings = MovesetSettings {
            mode: MovesetMode::MetronomeOnly,
            ..MovesetSettings::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        MovesetRandomizer::randomize(&mut session, &settings, &mut rng).unwrap();
        assert_eq!(
            session.learnsets[&SpeciesId(3)],
            vec![LearntMove::new(METRONOME, 1)]
        );
    }
}
