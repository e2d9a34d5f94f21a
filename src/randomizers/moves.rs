use rand::seq::SliceRandom;
use rand::Rng;

use crate::engine::{Randomizer, RandomizerContext};
use crate::error::Result;
use crate::model::{Move, MoveCategory, STRUGGLE};
use crate::rng::RandomizerRng;
use crate::session::Session;
use crate::settings::{MoveSettings, Settings};

/// Re-rolls move power, PP, accuracy, type and category.
pub struct MoveRandomizer;

impl MoveRandomizer {
    pub fn new() -> Self {
        Self
    }

    pub fn randomize<R: Rng + ?Sized>(
        session: &mut Session,
        settings: &MoveSettings,
        rng: &mut R,
    ) -> Result<()> {
        let types = session.types_in_use();
        let split = session.capabilities.physical_special_split;
        for mv in session.moves.iter_mut().filter(|m| m.id != STRUGGLE) {
            if settings.power {
                reroll_power(mv, rng);
            }
            if settings.pp {
                mv.pp = random_pp(rng);
            }
            if settings.accuracy && mv.accuracy > 0 {
                mv.accuracy = random_accuracy(rng);
            }
            if settings.types {
                if let Some(&ty) = types.choose(rng) {
                    mv.move_type = ty;
                }
            }
            if settings.categories && split && mv.is_damaging() {
                mv.category = if rng.gen_bool(0.5) {
                    MoveCategory::Physical
                } else {
                    MoveCategory::Special
                };
            }
        }
        Ok(())
    }
}

impl Default for MoveRandomizer {
    fn default() -> Self {
        Self::new()
    }
}

fn reroll_power<R: Rng + ?Sized>(mv: &mut Move, rng: &mut R) {
    if !mv.is_damaging() || mv.has_fixed_damage() {
        return;
    }
    let mut power: u32 = if rng.gen_ratio(2, 3) {
        50 + 5 * rng.gen_range(0..=10)
    } else {
        20 + 5 * rng.gen_range(0..=26)
    };
    if rng.gen_ratio(1, 100) {
        power += 50;
    }
    if rng.gen_ratio(1, 100) {
        power += 50;
    }
    if mv.hit_count > 1 {
        power = (power / mv.hit_count as u32 / 5 * 5).max(5);
    }
    mv.power = power.min(255) as u8;
}

fn random_pp<R: Rng + ?Sized>(rng: &mut R) -> u8 {
    match rng.gen_range(0..100) {
        0..=14 => 5,
        15..=39 => 10,
        40..=69 => 15,
        70..=89 => 20,
        90..=96 => 30,
        _ => 40,
    }
}

fn random_accuracy<R: Rng + ?Sized>(rng: &mut R) -> u8 {
    match rng.gen_range(0..100) {
        0..=39 => 100,
        40..=84 => 75 + 5 * rng.gen_range(0..=4),
        _ => 50 + 5 * rng.gen_range(0..=4),
    }
}

impl Randomizer for MoveRandomizer {
    fn name(&self) -> &str {
        "moves"
    }

    fn enabled(&self, settings: &Settings, _session: &Session) -> bool {
        settings.moves.any()
    }

    fn run(
        &mut self,
        ctx: &RandomizerContext,
        session: &mut Session,
        rng: &mut RandomizerRng<'_>,
    ) -> Result<()> {
        Self::randomize(session, &ctx.settings.moves, rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Type;
    use crate::randomizers::testing;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn usable(session: &Session, ty: Type) -> bool {
        session.types_in_use().contains(&ty)
    }

    fn everything() -> MoveSettings {
        MoveSettings {
            power: true,
            pp: true,
            accuracy: true,
            types: true,
            categories: true,
        }
    }

    #[test]
    fn values_stay_within_their_tiers() {
        let mut session = testing::session();
        session.moves[0].accuracy = 0;
        session.moves[1].hit_count = 3;
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        for _ in 0..50 {
            MoveRandomizer::randomize(&mut session, &everything(), &mut rng).unwrap();
            for mv in &session.moves {
                assert!([5, 10, 15, 20, 30, 40].contains(&mv.pp));
                assert!(usable(&session, mv.move_type));
                if mv.is_damaging() {
                    assert_eq!(mv.power % 5, 0);
                    assert!(mv.power >= 5 && mv.power <= 250);
                    assert_ne!(mv.category, MoveCategory::Status);
                }
            }
            assert_eq!(session.moves[0].accuracy, 0);
            assert!(session.moves[1].power <= 250 / 3);
            assert!(session.moves[2].accuracy >= 50);
            assert_eq!(session.moves[3].power, 0);
            assert_eq!(session.moves[3].category, MoveCategory::Status);
        }
    }

    #[test]
    fn struggle_is_never_touched() {
        let mut session = testing::session();
        session.moves[0].id = STRUGGLE;
        let before = session.moves[0].clone();
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        MoveRandomizer::randomize(&mut session, &everything(), &mut rng).unwrap();
        let after = &session.moves[0];
        assert_eq!((after.power, after.pp, after.accuracy), (before.power, before.pp, before.accuracy));
        assert_eq!(after.move_type, before.move_type);
    }
}
