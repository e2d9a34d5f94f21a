use rand::seq::SliceRandom;
use rand::Rng;

use crate::chain::{ChainAction, ChainWalker};
use crate::engine::{Randomizer, RandomizerContext};
use crate::error::{RandomizerError, Result};
use crate::model::{Dex, Evolution, SpeciesId, Type, TypeChange};
use crate::rng::RandomizerRng;
use crate::session::Session;
use crate::settings::{Settings, TypesMode};

/// Chance that a base species is given a second type.
const DUAL_TYPE_CHANCE: f64 = 0.5;
/// Chance that a mono-typed evolution picks up a second type of its own.
const GAIN_SECONDARY_CHANCE: f64 = 0.25;

pub struct TypesRandomizer;

impl TypesRandomizer {
    pub fn new() -> Self {
        Self
    }

    pub fn randomize<R: Rng + ?Sized>(
        dex: &mut Dex,
        usable: &[Type],
        mode: TypesMode,
        rng: &mut R,
    ) -> Result<()> {
        if mode == TypesMode::Unchanged {
            return Ok(());
        }
        if usable.len() < 2 {
            return Err(RandomizerError::no_candidates("fewer than two usable types"));
        }
        // Record which slots each evolution changed before anything moves.
        dex.refresh_type_changes();
        let mut action = TypeAction { usable, rng };
        ChainWalker::new(mode == TypesMode::FollowEvolutions).propagate(dex, &mut action)?;
        dex.refresh_type_changes();
        Ok(())
    }
}

impl Default for TypesRandomizer {
    fn default() -> Self {
        Self::new()
    }
}

struct TypeAction<'a, 'r, R: ?Sized> {
    usable: &'a [Type],
    rng: &'r mut R,
}

impl<'a, 'r, R: Rng + ?Sized> TypeAction<'a, 'r, R> {
    fn any_type(&mut self) -> Type {
        let index = self.rng.gen_range(0..self.usable.len());
        self.usable[index]
    }

    fn type_other_than(&mut self, taken: Type) -> Type {
        let others: Vec<Type> = self.usable.iter().copied().filter(|&t| t != taken).collect();
        others.choose(&mut *self.rng).copied().unwrap_or(taken)
    }

    fn fresh_pair(&mut self) -> (Type, Option<Type>) {
        let primary = self.any_type();
        let secondary = if self.rng.gen_bool(DUAL_TYPE_CHANCE) {
            Some(self.type_other_than(primary))
        } else {
            None
        };
        (primary, secondary)
    }
}

impl<'a, 'r, R: Rng + ?Sized> ChainAction for TypeAction<'a, 'r, R> {
    fn base(&mut self, dex: &mut Dex, id: SpeciesId) -> Result<()> {
        let (primary, secondary) = self.fresh_pair();
        dex[id].set_types(primary, secondary);
        Ok(())
    }

    fn evolved(&mut self, dex: &mut Dex, evo: &Evolution, _is_final: bool) -> Result<()> {
        let (mut primary, mut secondary) = dex[evo.from].types();
        match evo.types_differ {
            TypeChange::None => {
                if secondary.is_none() && self.rng.gen_bool(GAIN_SECONDARY_CHANCE) {
                    secondary = Some(self.type_other_than(primary));
                }
            }
            TypeChange::Primary => {
                let keep = secondary.unwrap_or(primary);
                primary = self.type_other_than(keep);
            }
            TypeChange::Secondary => {
                secondary = Some(self.type_other_than(primary));
            }
            TypeChange::Both => {
                (primary, secondary) = self.fresh_pair();
            }
        }
        dex[evo.to].set_types(primary, secondary);
        Ok(())
    }
}

impl Randomizer for TypesRandomizer {
    fn name(&self) -> &str {
        "types"
    }

    fn enabled(&self, settings: &Settings, _session: &Session) -> bool {
        settings.species.types != TypesMode::Unchanged
    }

    fn run(
        &mut self,
        ctx: &RandomizerContext,
        session: &mut Session,
        rng: &mut RandomizerRng<'_>,
    ) -> Result<()> {
        let usable = session.types_in_use();
        Self::randomize(&mut session.dex, &usable, ctx.settings.species.types, rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Generation;
    use crate::randomizers::testing;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn evolutions_inherit_unchanged_slots() {
        let usable = Type::usable(Generation::Gen5);
        for seed in 0..20 {
            let mut session = testing::session();
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            TypesRandomizer::randomize(
                &mut session.dex,
                &usable,
                TypesMode::FollowEvolutions,
                &mut rng,
            )
            .unwrap();
            let dex = &session.dex;
            // 2 -> 3 changed nothing, so 3 has exactly 2's types.
            assert_eq!(dex[SpeciesId(3)].types(), dex[SpeciesId(2)].types());
            // 1 -> 2 only added a secondary; the primary carries over.
            assert_eq!(dex[SpeciesId(2)].primary_type, dex[SpeciesId(1)].primary_type);
            assert!(dex[SpeciesId(2)].secondary_type.is_some());
            for species in dex.iter() {
                assert!(usable.contains(&species.primary_type));
                assert_ne!(Some(species.primary_type), species.secondary_type);
            }
        }
    }

    #[test]
    fn random_mode_only_uses_generation_types() {
        let usable = Type::usable(Generation::Gen1);
        let mut session = testing::session();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        TypesRandomizer::randomize(&mut session.dex, &usable, TypesMode::Random, &mut rng).unwrap();
        for species in session.dex.iter() {
            for ty in [Some(species.primary_type), species.secondary_type].into_iter().flatten() {
                assert!(!matches!(ty, Type::Dark | Type::Steel | Type::Fairy));
                assert!(!ty.is_hack_only());
            }
        }
    }
}
