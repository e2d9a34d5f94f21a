use log::info;
use rand::Rng;

use crate::engine::{Randomizer, RandomizerContext};
use crate::error::{RandomizerError, Result};
use crate::model::SpeciesId;
use crate::pool::SpeciesPool;
use crate::rng::RandomizerRng;
use crate::session::Session;
use crate::settings::{Settings, StarterMode, StarterSettings};

pub struct StarterRandomizer;

impl StarterRandomizer {
    pub fn new() -> Self {
        Self
    }

    /// Draws as many distinct starters as the dataset has slots.
    pub fn randomize<R: Rng + ?Sized>(
        session: &mut Session,
        settings: &StarterSettings,
        rng: &mut R,
    ) -> Result<()> {
        let count = session.starters.len();
        let dex = &session.dex;
        let mut pool: SpeciesPool = session.species_pool(settings.no_legendaries, false);
        if settings.mode == StarterMode::BasicThreeStage {
            pool.filter_max_stage(dex, 0).filter_remaining_evolutions(dex, 2..=2);
        }
        if settings.no_split_evolutions {
            pool.filter_split_evolutions(dex, 1);
        }
        if let Some(max_bst) = settings.max_bst {
            pool.filter_max_power(dex, max_bst);
        }
        if pool.len() < count {
            return Err(RandomizerError::no_candidates(format!(
                "{} starter candidates for {count} slots",
                pool.len()
            )));
        }
        let picks: Vec<SpeciesId> = (0..count)
            .map(|_| pool.random_member(&mut *rng, true))
            .collect::<Result<_>>()?;
        info!("starters: {picks:?}");
        session.starters = picks;
        Ok(())
    }
}

impl Default for StarterRandomizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Randomizer for StarterRandomizer {
    fn name(&self) -> &str {
        "starters"
    }

    fn enabled(&self, settings: &Settings, _session: &Session) -> bool {
        settings.starters.mode != StarterMode::Unchanged
    }

    fn run(
        &mut self,
        ctx: &RandomizerContext,
        session: &mut Session,
        rng: &mut RandomizerRng<'_>,
    ) -> Result<()> {
        Self::randomize(session, &ctx.settings.starters, rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::randomizers::testing;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn three_stage_mode_only_offers_full_lines() {
        let mut session = testing::session();
        session.starters.truncate(1);
        let settings = StarterSettings {
            mode: StarterMode::BasicThreeStage,
            no_legendaries: true,
            ..StarterSettings::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        StarterRandomizer::randomize(&mut session, &settings, &mut rng).unwrap();
        assert_eq!(session.starters, vec![SpeciesId(1)]);

        session.starters = vec![SpeciesId(1), SpeciesId(4)];
        assert!(StarterRandomizer::randomize(&mut session, &settings, &mut rng)
            .unwrap_err()
            .is_no_candidates());
    }

    #[test]
    fn random_starters_are_distinct() {
        let settings = StarterSettings {
            mode: StarterMode::Random,
            no_legendaries: true,
            ..StarterSettings::default()
        };
        for seed in 0..20 {
            let mut session = testing::session();
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            StarterRandomizer::randomize(&mut session, &settings, &mut rng).unwrap();
            let mut picks = session.starters.clone();
            assert_eq!(picks.len(), 3);
            assert!(!picks.contains(&SpeciesId(10)));
            picks.sort_unstable();
            picks.dedup();
            assert_eq!(picks.len(), 3);
        }
    }

    #[test]
    fn power_cap_and_split_filter_narrow_the_offer() {
        let settings = StarterSettings {
            mode: StarterMode::Random,
            no_legendaries: false,
            max_bst: Some(330),
            no_split_evolutions: true,
        };
        for seed in 0..20 {
            let mut session = testing::session();
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            StarterRandomizer::randomize(&mut session, &settings, &mut rng).unwrap();
            let mut picks = session.starters.clone();
            picks.sort_unstable();
            // Species 4 splits; 1, 7 and 9 are the only others at or under 330.
            assert_eq!(picks, vec![SpeciesId(1), SpeciesId(7), SpeciesId(9)]);
        }
    }
}
