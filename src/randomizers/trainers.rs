//! Trainer roster randomization with type theming, a global swap map and
//! rival continuity.

use std::collections::{BTreeMap, BTreeSet};

use log::{debug, warn};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::engine::{Randomizer, RandomizerContext};
use crate::error::{RandomizerError, Result};
use crate::model::dex::NON_LEVEL_EVOLUTION_LEVEL;
use crate::model::{
    Dex, Evolution, SpeciesId, TrainerCategory, TrainerPokemon, TrainerTag, Type, UniquenessPool,
};
use crate::pool::SpeciesPool;
use crate::rng::RandomizerRng;
use crate::session::{Session, SessionCache};
use crate::settings::{Settings, TrainerMode, TrainerSettings};

/// Level gap between two rival fights after which a carried member evolves
/// regardless of its evolution method.
const CARRY_EVOLVE_GAP: u8 = 10;

pub struct TrainerRandomizer;

impl TrainerRandomizer {
    pub fn new() -> Self {
        Self
    }

    pub fn randomize<R: Rng + ?Sized>(
        session: &mut Session,
        settings: &TrainerSettings,
        rng: &mut R,
    ) -> Result<()> {
        if settings.mode == TrainerMode::Unchanged {
            return Ok(());
        }
        let base_pool = session.species_pool(settings.no_legendaries, false);
        if base_pool.is_empty() {
            return Err(RandomizerError::no_candidates("no species left for trainers"));
        }
        let tags: Vec<Option<TrainerTag>> =
            session.trainers.iter().map(|t| t.parsed_tag()).collect();

        let themed = matches!(
            settings.mode,
            TrainerMode::TypeThemed | TrainerMode::TypeThemedElite
        );
        let groups: BTreeMap<String, TrainerCategory> = tags
            .iter()
            .flatten()
            .filter(|tag| themed && tag.category.is_themed_group())
            .map(|tag| (tag.group.clone(), tag.category))
            .collect();
        let group_types =
            assign_group_types(&groups, &base_pool, settings.weight_types_by_frequency, rng)?;

        let mut replacer = Replacer {
            dex: &session.dex,
            base_pool,
            cache: &mut session.cache,
            settings,
        };
        for (trainer, tag) in session.trainers.iter_mut().zip(&tags) {
            let theme = match tag.as_ref().and_then(|t| group_types.get(&t.group)) {
                Some(&ty) => Some(ty),
                None if settings.mode == TrainerMode::TypeThemed => {
                    Some(if settings.weight_types_by_frequency {
                        replacer.base_pool.random_type_weighted(rng, false)?.0
                    } else {
                        replacer
                            .base_pool
                            .random_type_excluding(rng, false, &BTreeSet::new())?
                    })
                }
                None => None,
            };
            for member in &mut trainer.pokemon {
                let mut pick = replacer.replace(member.species, theme, member.level, rng)?;
                if let Some(threshold) = settings.force_fully_evolved_at {
                    if member.level >= threshold {
                        pick = replacer.fully_evolved(pick, theme, rng);
                    }
                }
                member.species = pick;
            }
            if let Some(threshold) = settings.force_fully_evolved_at {
                replacer.separate_evolved(&mut trainer.pokemon, theme, threshold, rng);
            }
        }
        let base_pool = replacer.base_pool;

        if settings.rival_carries_starter {
            carry_starters(session, &tags, &base_pool, rng)?;
        }
        if settings.rival_carries_team {
            carry_teams(session, &tags, &base_pool, settings.rival_carries_starter, rng)?;
        }
        Ok(())
    }
}

impl Default for TrainerRandomizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Gives each themed group a type. Groups sharing a uniqueness pool (all gym
/// leaders; elite four, champion and uber trainers) never share a type.
pub fn assign_group_types<R: Rng + ?Sized>(
    groups: &BTreeMap<String, TrainerCategory>,
    pool: &SpeciesPool,
    weighted: bool,
    rng: &mut R,
) -> Result<BTreeMap<String, Type>> {
    let mut taken: BTreeMap<UniquenessPool, BTreeSet<Type>> = BTreeMap::new();
    let mut assigned = BTreeMap::new();
    let unconstrained = BTreeSet::new();
    for (group, category) in groups {
        let uniqueness = category.uniqueness_pool();
        let excluded = uniqueness
            .and_then(|u| taken.get(&u))
            .unwrap_or(&unconstrained);
        let ty = pool
            .random_type_excluding(rng, weighted, excluded)
            .map_err(|_| {
                RandomizerError::exhausted(
                    format!("unique type for trainer group {group}"),
                    pool.types_present().len() as u32,
                )
            })?;
        debug!("trainer group {group} themed {ty}");
        if let Some(u) = uniqueness {
            taken.entry(u).or_default().insert(ty);
        }
        assigned.insert(group.clone(), ty);
    }
    Ok(assigned)
}

struct Replacer<'a> {
    dex: &'a Dex,
    base_pool: SpeciesPool,
    cache: &'a mut SessionCache,
    settings: &'a TrainerSettings,
}

impl<'a> Replacer<'a> {
    fn replace<R: Rng + ?Sized>(
        &mut self,
        original: SpeciesId,
        theme: Option<Type>,
        level: u8,
        rng: &mut R,
    ) -> Result<SpeciesId> {
        let dex = self.dex;
        if self.settings.global_swap {
            if let Some(&mapped) = self.cache.trainer_swaps.get(&original) {
                let fits = theme.map_or(true, |ty| dex[mapped].has_type(ty))
                    && dex.earliest_level(mapped) <= u16::from(level);
                if fits && self.base_pool.contains(mapped) {
                    return Ok(mapped);
                }
            }
        }

        let similar = self.settings.similar_strength;
        let pick = match theme {
            Some(ty) => {
                let themed = draw(dex, self.type_pool(ty), original, level, similar, rng);
                match themed {
                    Ok(pick) => pick,
                    Err(err) if err.is_no_candidates() => {
                        warn!("no {ty} species for trainers, drawing from every species");
                        draw(dex, &self.base_pool, original, level, similar, rng)?
                    }
                    Err(err) => return Err(err),
                }
            }
            None => draw(dex, &self.base_pool, original, level, similar, rng)?,
        };

        if self.settings.global_swap {
            self.cache.trainer_swaps.entry(original).or_insert(pick);
        }
        Ok(pick)
    }

    fn type_pool(&mut self, ty: Type) -> &SpeciesPool {
        let base_pool = &self.base_pool;
        self.cache.type_pools.entry(ty).or_insert_with(|| {
            let mut pool = base_pool.clone();
            pool.filter_by_type(ty);
            pool
        })
    }

    /// A final form of `id` that stays in the trainer pool and carries the
    /// theme, or `id` itself when no final form qualifies.
    fn fully_evolved<R: Rng + ?Sized>(
        &self,
        id: SpeciesId,
        theme: Option<Type>,
        rng: &mut R,
    ) -> SpeciesId {
        let finals = self
            .dex
            .final_forms(id)
            .into_iter()
            .filter(|&f| self.base_pool.contains(f));
        let mut finals = SpeciesPool::new(self.dex, finals);
        let include: Vec<Type> = theme.into_iter().collect();
        finals
            .random_of_types_restricted(&include, &[], rng, false)
            .unwrap_or(id)
    }

    /// Redraws members at or above `threshold` that repeat an earlier member,
    /// preferring unused final forms of the party's theme.
    fn separate_evolved<R: Rng + ?Sized>(
        &mut self,
        party: &mut [TrainerPokemon],
        theme: Option<Type>,
        threshold: u8,
        rng: &mut R,
    ) {
        for slot in 0..party.len() {
            let species = party[slot].species;
            if party[slot].level < threshold || !party[..slot].iter().any(|p| p.species == species) {
                continue;
            }
            let mut open = match theme {
                Some(ty) => self.type_pool(ty).clone(),
                None => self.base_pool.clone(),
            };
            open.exclude(party.iter().map(|p| p.species));
            let mut finals = open.clone();
            finals.filter(self.dex, |s| s.evolutions_from.is_empty());
            let pick = match finals.random_member(rng, false) {
                Ok(pick) => Ok(pick),
                Err(_) => open.random_member(rng, false),
            };
            match pick {
                Ok(pick) => party[slot].species = pick,
                Err(_) => debug!("no unused species to replace repeated {species}"),
            }
        }
    }
}

/// Draws from the members of `pool` obtainable at `level`.
fn draw<R: Rng + ?Sized>(
    dex: &Dex,
    pool: &SpeciesPool,
    original: SpeciesId,
    level: u8,
    similar_strength: bool,
    rng: &mut R,
) -> Result<SpeciesId> {
    let mut obtainable = pool.obtainable_at(dex, level);
    if similar_strength && dex.contains(original) {
        obtainable.random_by_power_level(dex, original, false, rng, false)
    } else {
        obtainable.random_member(rng, false)
    }
}

/// Follows evolutions from `species` while `level` meets each edge's level.
/// `branch` picks the next species when several are possible.
fn evolve_to_level(
    dex: &Dex,
    species: SpeciesId,
    level: u8,
    mut branch: impl FnMut(SpeciesId, &[Evolution]) -> Option<SpeciesId>,
) -> SpeciesId {
    let mut current = species;
    let mut seen = BTreeSet::new();
    while seen.insert(current) {
        let Some(entry) = dex.get(current) else {
            break;
        };
        let Some(next) = branch(current, entry.evolutions_from.as_slice()) else {
            break;
        };
        let Some(evo) = dex.find_evolution(current, next) else {
            break;
        };
        if (level as u16) < evo.level().unwrap_or(NON_LEVEL_EVOLUTION_LEVEL) {
            break;
        }
        current = next;
    }
    current
}

fn random_branch<R: Rng + ?Sized>(rng: &mut R, edges: &[Evolution]) -> Option<SpeciesId> {
    edges.choose(rng).map(|evo| evo.to)
}

/// A species from `pool` that is not already in `party`.
fn unique_member<R: Rng + ?Sized>(
    pool: &SpeciesPool,
    party: &[TrainerPokemon],
    rng: &mut R,
) -> Result<SpeciesId> {
    let mut open = pool.clone();
    open.exclude(party.iter().map(|p| p.species));
    open.random_member(rng, false)
}

/// Replaces repeated species in `party`, keeping the first occurrence and
/// any slot listed in `keep`.
fn deduplicate<R: Rng + ?Sized>(
    party: &mut [TrainerPokemon],
    keep: Option<usize>,
    pool: &SpeciesPool,
    rng: &mut R,
) -> Result<()> {
    for slot in 0..party.len() {
        let species = party[slot].species;
        let clashes = party
            .iter()
            .enumerate()
            .any(|(other, p)| other != slot && p.species == species && (other < slot || Some(other) == keep));
        if clashes && Some(slot) != keep {
            party[slot].species = unique_member(pool, party, rng)?;
        }
    }
    Ok(())
}

fn rival_line(tag: &TrainerTag) -> Option<(TrainerCategory, u32, u32)> {
    match tag.category {
        TrainerCategory::Rival | TrainerCategory::Friend => {
            Some((tag.category, tag.variant.unwrap_or(0), tag.battle?))
        }
        _ => None,
    }
}

/// Puts the player's counterpart starter in the ace slot of every rival and
/// friend fight, evolved as far as the slot's level allows. Rivals carry the
/// starter after the player's, friends the one after that.
fn carry_starters<R: Rng + ?Sized>(
    session: &mut Session,
    tags: &[Option<TrainerTag>],
    pool: &SpeciesPool,
    rng: &mut R,
) -> Result<()> {
    if session.starters.len() < 3 {
        warn!("rival starters need three starters, found {}", session.starters.len());
        return Ok(());
    }
    let dex = &session.dex;
    let branches = &mut session.cache.rival_branches;
    for (trainer, tag) in session.trainers.iter_mut().zip(tags) {
        let Some((category, variant, _)) = tag.as_ref().and_then(rival_line) else {
            continue;
        };
        let offset = if category == TrainerCategory::Rival { 1 } else { 2 };
        let starter = session.starters[(variant as usize + offset) % 3];
        let Some(ace) = trainer.ace_slot() else {
            continue;
        };
        let level = trainer.pokemon[ace].level;
        let carried = evolve_to_level(dex, starter, level, |from, edges| {
            if let Some(&chosen) = branches.get(&(variant, from)) {
                return Some(chosen);
            }
            let chosen = random_branch(&mut *rng, edges)?;
            branches.insert((variant, from), chosen);
            Some(chosen)
        });
        trainer.pokemon[ace].species = carried;
        deduplicate(&mut trainer.pokemon, Some(ace), pool, rng)?;
    }
    Ok(())
}

/// Copies each rival fight's roster into the next fight of the same line.
/// Members are skipped when the later slot is lower level, and evolve when
/// the later level allows it or the gap is large.
fn carry_teams<R: Rng + ?Sized>(
    session: &mut Session,
    tags: &[Option<TrainerTag>],
    pool: &SpeciesPool,
    keep_ace: bool,
    rng: &mut R,
) -> Result<()> {
    let mut lines: BTreeMap<(TrainerCategory, u32), Vec<(u32, usize)>> = BTreeMap::new();
    for (index, tag) in tags.iter().enumerate() {
        if let Some((category, variant, battle)) = tag.as_ref().and_then(rival_line) {
            lines.entry((category, variant)).or_default().push((battle, index));
        }
    }

    let dex = &session.dex;
    for fights in lines.values_mut() {
        fights.sort_unstable();
        for pair in fights.windows(2) {
            let (prev_index, next_index) = (pair[0].1, pair[1].1);
            let previous = session.trainers[prev_index].clone();
            let next = &mut session.trainers[next_index];
            let prev_ace = previous.ace_slot().filter(|_| keep_ace);
            let next_ace = next.ace_slot().filter(|_| keep_ace);

            let carried = previous
                .pokemon
                .iter()
                .enumerate()
                .filter(|(slot, _)| Some(*slot) != prev_ace)
                .map(|(_, member)| member);
            let targets: Vec<usize> = (0..next.pokemon.len())
                .filter(|slot| Some(*slot) != next_ace)
                .collect();
            for (member, slot) in carried.zip(targets) {
                let level = next.pokemon[slot].level;
                if level < member.level {
                    continue;
                }
                let mut species =
                    evolve_to_level(dex, member.species, level, |_, edges| random_branch(&mut *rng, edges));
                if species == member.species && level - member.level >= CARRY_EVOLVE_GAP {
                    if let Some(next_form) = random_branch(&mut *rng, &dex[species].evolutions_from) {
                        species = next_form;
                    }
                }
                next.pokemon[slot].species = species;
            }
            deduplicate(&mut next.pokemon, next_ace, pool, rng)?;
        }
    }
    Ok(())
}

impl Randomizer for TrainerRandomizer {
    fn name(&self) -> &str {
        "trainers"
    }

    fn enabled(&self, settings: &Settings, session: &Session) -> bool {
        settings.trainers.mode != TrainerMode::Unchanged && !session.trainers.is_empty()
    }

    fn run(
        &mut self,
        ctx: &RandomizerContext,
        session: &mut Session,
        rng: &mut RandomizerRng<'_>,
    ) -> Result<()> {
        Self::randomize(session, &ctx.settings.trainers, rng)
    }
}
