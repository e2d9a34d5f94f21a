use rand::seq::SliceRandom;
use rand::Rng;

use crate::chain::{ChainAction, ChainWalker};
use crate::engine::{Randomizer, RandomizerContext};
use crate::error::{RandomizerError, Result};
use crate::model::{Dex, Evolution, SpeciesId};
use crate::rng::RandomizerRng;
use crate::session::Session;
use crate::settings::{AbilitiesMode, Settings, SpeciesSettings};

pub struct AbilitiesRandomizer;

impl AbilitiesRandomizer {
    pub fn new() -> Self {
        Self
    }

    /// Gives every species distinct random abilities in as many slots as it
    /// used before, up to `slots_per_species`.
    pub fn randomize<R: Rng + ?Sized>(
        dex: &mut Dex,
        available: &[u16],
        slots_per_species: usize,
        settings: &SpeciesSettings,
        rng: &mut R,
    ) -> Result<()> {
        let allowed: Vec<u16> = available
            .iter()
            .copied()
            .filter(|&a| a != 0 && !settings.banned_abilities.contains(&a))
            .collect();
        if allowed.is_empty() {
            return Err(RandomizerError::no_candidates("every ability is banned"));
        }
        let mut action = AbilityAction {
            allowed,
            slots: slots_per_species.min(3),
            rng,
        };
        ChainWalker::new(settings.abilities_follow_evolutions).propagate(dex, &mut action)
    }
}

impl Default for AbilitiesRandomizer {
    fn default() -> Self {
        Self::new()
    }
}

struct AbilityAction<'r, R: ?Sized> {
    allowed: Vec<u16>,
    slots: usize,
    rng: &'r mut R,
}

impl<'r, R: Rng + ?Sized> ChainAction for AbilityAction<'r, R> {
    fn base(&mut self, dex: &mut Dex, id: SpeciesId) -> Result<()> {
        let wanted = dex[id].ability_count().clamp(1, self.slots.max(1)).min(self.allowed.len());
        let picks: Vec<u16> = self
            .allowed
            .choose_multiple(&mut *self.rng, wanted)
            .copied()
            .collect();
        let mut abilities = [0u16; 3];
        abilities[..picks.len()].copy_from_slice(&picks);
        dex[id].abilities = abilities;
        Ok(())
    }

    fn evolved(&mut self, dex: &mut Dex, evo: &Evolution, _is_final: bool) -> Result<()> {
        dex[evo.to].abilities = dex[evo.from].abilities;
        Ok(())
    }
}

impl Randomizer for AbilitiesRandomizer {
    fn name(&self) -> &str {
        "abilities"
    }

    fn enabled(&self, settings: &Settings, session: &Session) -> bool {
        settings.species.abilities == AbilitiesMode::Random
            && session.capabilities.abilities_per_species > 0
    }

    fn run(
        &mut self,
        ctx: &RandomizerContext,
        session: &mut Session,
        rng: &mut RandomizerRng<'_>,
    ) -> Result<()> {
        let slots = session.capabilities.abilities_per_species as usize;
        Self::randomize(
            &mut session.dex,
            &session.abilities,
            slots,
            &ctx.settings.species,
            rng,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::randomizers::testing;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn settings(follow: bool, banned: Vec<u16>) -> SpeciesSettings {
        SpeciesSettings {
            abilities: AbilitiesMode::Random,
            abilities_follow_evolutions: follow,
            banned_abilities: banned,
            ..SpeciesSettings::default()
        }
    }

    #[test]
    fn slots_are_distinct_and_never_banned() {
        let mut session = testing::session();
        session.dex[SpeciesId(5)].abilities = [1, 2, 3];
        let mut rng = ChaCha8Rng::seed_from_u64(12);
        let abilities = session.abilities.clone();
        AbilitiesRandomizer::randomize(&mut session.dex, &abilities, 3, &settings(false, vec![2, 5]), &mut rng)
            .unwrap();
        for species in session.dex.iter() {
            let used: Vec<u16> = species.abilities.iter().copied().filter(|&a| a != 0).collect();
            assert!(!used.is_empty());
            assert!(!used.contains(&2) && !used.contains(&5));
            let mut unique = used.clone();
            unique.sort_unstable();
            unique.dedup();
            assert_eq!(unique.len(), used.len());
        }
        assert_eq!(session.dex[SpeciesId(5)].ability_count(), 3);
    }

    #[test]
    fn evolutions_copy_their_pre_evolution() {
        let mut session = testing::session();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let abilities = session.abilities.clone();
        AbilitiesRandomizer::randomize(&mut session.dex, &abilities, 2, &settings(true, vec![]), &mut rng)
            .unwrap();
        let dex = &session.dex;
        assert_eq!(dex[SpeciesId(1)].abilities, dex[SpeciesId(2)].abilities);
        assert_eq!(dex[SpeciesId(2)].abilities, dex[SpeciesId(3)].abilities);
        assert_eq!(dex[SpeciesId(4)].abilities, dex[SpeciesId(6)].abilities);
    }

    #[test]
    fn fully_banned_list_is_reported() {
        let mut session = testing::session();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let err = AbilitiesRandomizer::randomize(&mut session.dex, &[3], 2, &settings(false, vec![3]), &mut rng)
            .unwrap_err();
        assert!(err.is_no_candidates());
    }
}
