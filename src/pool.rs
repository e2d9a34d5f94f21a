//! Filterable, type-indexed species pools and the random draws made from
//! them.

use std::collections::{BTreeMap, BTreeSet};
use std::ops::RangeBounds;

use log::warn;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::{RandomizerError, Result};
use crate::model::{Dex, Species, SpeciesId, Type};

/// Closed interval of base stat totals accepted by a similar-strength draw.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PowerWindow {
    pub min: u32,
    pub max: u32,
}

impl PowerWindow {
    fn around(bst: u32, spread: u32) -> Self {
        Self {
            min: bst.saturating_sub(spread),
            max: bst + spread,
        }
    }

    pub fn contains(&self, bst: u32) -> bool {
        self.min <= bst && bst <= self.max
    }
}

const POWER_MIN_CANDIDATES: usize = 3;
const POWER_MAX_WIDENINGS: usize = 3;

/// A snapshot of species ids with a secondary index by type.
///
/// The pool never owns species data; it records each member's types at
/// insertion time so the index stays consistent while members are consumed.
/// Filters mutate in place and return `&mut Self` so they chain.
#[derive(Clone, Debug, Default)]
pub struct SpeciesPool {
    members: Vec<SpeciesId>,
    types: BTreeMap<SpeciesId, (Type, Option<Type>)>,
    by_type: BTreeMap<Type, Vec<SpeciesId>>,
}

impl SpeciesPool {
    /// Builds a pool from `ids`; duplicates collapse and ids missing from the
    /// dex are skipped.
    pub fn new(dex: &Dex, ids: impl IntoIterator<Item = SpeciesId>) -> Self {
        let unique: BTreeSet<SpeciesId> = ids.into_iter().filter(|&id| dex.contains(id)).collect();
        let mut pool = Self::default();
        for id in unique {
            pool.types.insert(id, dex[id].types());
            pool.members.push(id);
        }
        pool.rebuild_index();
        pool
    }

    pub fn all(dex: &Dex) -> Self {
        Self::new(dex, dex.ids())
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, id: SpeciesId) -> bool {
        self.types.contains_key(&id)
    }

    pub fn members(&self) -> &[SpeciesId] {
        &self.members
    }

    /// Types with at least one member.
    pub fn types_present(&self) -> Vec<Type> {
        self.by_type.keys().copied().collect()
    }

    pub fn type_count(&self, ty: Type) -> usize {
        self.by_type.get(&ty).map_or(0, Vec::len)
    }

    /// Sum of all bucket sizes; dual-typed members count twice.
    pub fn type_slots(&self) -> usize {
        self.by_type.values().map(Vec::len).sum()
    }

    pub fn insert(&mut self, dex: &Dex, id: SpeciesId) {
        if self.contains(id) || !dex.contains(id) {
            return;
        }
        let position = self.members.binary_search(&id).unwrap_or_else(|p| p);
        self.members.insert(position, id);
        self.types.insert(id, dex[id].types());
        self.rebuild_index();
    }

    pub fn remove(&mut self, id: SpeciesId) -> bool {
        let Some((primary, secondary)) = self.types.remove(&id) else {
            return false;
        };
        self.members.retain(|&m| m != id);
        for ty in std::iter::once(primary).chain(secondary) {
            if let Some(bucket) = self.by_type.get_mut(&ty) {
                bucket.retain(|&m| m != id);
                if bucket.is_empty() {
                    self.by_type.remove(&ty);
                }
            }
        }
        true
    }

    pub fn exclude(&mut self, ids: impl IntoIterator<Item = SpeciesId>) -> &mut Self {
        for id in ids {
            self.remove(id);
        }
        self
    }

    fn rebuild_index(&mut self) {
        self.by_type.clear();
        for &id in &self.members {
            let (primary, secondary) = self.types[&id];
            self.by_type.entry(primary).or_default().push(id);
            if let Some(secondary) = secondary {
                self.by_type.entry(secondary).or_default().push(id);
            }
        }
    }

    fn retain_members(&mut self, mut keep: impl FnMut(SpeciesId) -> bool) -> &mut Self {
        let types = &mut self.types;
        self.members.retain(|&id| {
            let kept = keep(id);
            if !kept {
                types.remove(&id);
            }
            kept
        });
        self.rebuild_index();
        self
    }

    pub fn filter(&mut self, dex: &Dex, predicate: impl Fn(&Species) -> bool) -> &mut Self {
        self.retain_members(|id| dex.get(id).map_or(false, &predicate))
    }

    pub fn filter_by_type(&mut self, ty: Type) -> &mut Self {
        let keep: BTreeSet<SpeciesId> = self
            .by_type
            .get(&ty)
            .map(|bucket| bucket.iter().copied().collect())
            .unwrap_or_default();
        self.retain_members(|id| keep.contains(&id))
    }

    /// Keeps species obtainable by a trainer or wild slot of `level`.
    pub fn filter_by_min_level(&mut self, dex: &Dex, level: u8) -> &mut Self {
        self.retain_members(|id| dex.earliest_level(id) <= level as u16)
    }

    pub fn filter_legendary(&mut self, dex: &Dex, legendary: bool) -> &mut Self {
        self.filter(dex, |s| s.legendary == legendary)
    }

    /// Keeps species whose number of further evolution stages lies in
    /// `range`. Members that can reach a cycle are dropped.
    pub fn filter_remaining_evolutions(
        &mut self,
        dex: &Dex,
        range: impl RangeBounds<usize>,
    ) -> &mut Self {
        self.retain_members(|id| dex.remaining_evolutions(id).map_or(false, |n| range.contains(&n)))
    }

    pub fn filter_split_evolutions(&mut self, dex: &Dex, max: usize) -> &mut Self {
        self.filter(dex, |s| s.evolutions_from.len() <= max)
    }

    pub fn filter_max_stage(&mut self, dex: &Dex, max: usize) -> &mut Self {
        self.retain_members(|id| dex.stage(id) <= max)
    }

    pub fn filter_max_power(&mut self, dex: &Dex, max_bst: u32) -> &mut Self {
        self.filter(dex, |s| s.bst() <= max_bst)
    }

    /// Members a slot of `level` can hold, or the whole pool when no member
    /// is obtainable that early.
    pub fn obtainable_at(&self, dex: &Dex, level: u8) -> SpeciesPool {
        let mut obtainable = self.clone();
        obtainable.filter_by_min_level(dex, level);
        if obtainable.is_empty() {
            self.clone()
        } else {
            obtainable
        }
    }

    fn finish_draw(&mut self, pick: SpeciesId, consume: bool) -> SpeciesId {
        if consume {
            self.remove(pick);
        }
        pick
    }

    pub fn random_member<R: Rng + ?Sized>(&mut self, rng: &mut R, consume: bool) -> Result<SpeciesId> {
        let pick = *self
            .members
            .choose(rng)
            .ok_or_else(|| RandomizerError::no_candidates("pool is empty"))?;
        Ok(self.finish_draw(pick, consume))
    }

    pub fn random_of_type<R: Rng + ?Sized>(
        &mut self,
        ty: Type,
        rng: &mut R,
        consume: bool,
    ) -> Result<SpeciesId> {
        let pick = self
            .by_type
            .get(&ty)
            .and_then(|bucket| bucket.choose(rng))
            .copied()
            .ok_or_else(|| RandomizerError::no_candidates(format!("no {ty} species in pool")))?;
        Ok(self.finish_draw(pick, consume))
    }

    /// Draws a type slot uniformly: a type is chosen with probability
    /// proportional to how many members carry it, then a member of that type.
    pub fn random_type_weighted<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        consume: bool,
    ) -> Result<(Type, SpeciesId)> {
        let total = self.type_slots();
        if total == 0 {
            return Err(RandomizerError::no_candidates("pool is empty"));
        }
        let mut index = rng.gen_range(0..total);
        let mut drawn = None;
        for (&ty, bucket) in &self.by_type {
            if index < bucket.len() {
                drawn = Some((ty, bucket[index]));
                break;
            }
            index -= bucket.len();
        }
        let (ty, pick) =
            drawn.ok_or_else(|| RandomizerError::no_candidates("type index out of range"))?;
        Ok((ty, self.finish_draw(pick, consume)))
    }

    /// Picks a type with a non-empty bucket that is not in `excluded`,
    /// uniformly or weighted by bucket size.
    pub fn random_type_excluding<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        weighted: bool,
        excluded: &BTreeSet<Type>,
    ) -> Result<Type> {
        let open: Vec<(Type, usize)> = self
            .by_type
            .iter()
            .filter(|(ty, _)| !excluded.contains(ty))
            .map(|(&ty, bucket)| (ty, if weighted { bucket.len() } else { 1 }))
            .collect();
        let total: usize = open.iter().map(|(_, weight)| weight).sum();
        if total == 0 {
            return Err(RandomizerError::no_candidates("every type is already taken"));
        }
        let mut index = rng.gen_range(0..total);
        for (ty, weight) in open {
            if index < weight {
                return Ok(ty);
            }
            index -= weight;
        }
        Err(RandomizerError::no_candidates("type index out of range"))
    }

    /// Draws a member carrying at least one type of `must_include` (any
    /// member when it is empty) and no type of `must_exclude`.
    pub fn random_of_types_restricted<R: Rng + ?Sized>(
        &mut self,
        must_include: &[Type],
        must_exclude: &[Type],
        rng: &mut R,
        consume: bool,
    ) -> Result<SpeciesId> {
        let candidates: Vec<SpeciesId> = self
            .members
            .iter()
            .copied()
            .filter(|id| {
                let (primary, secondary) = self.types[id];
                let has = |ty: &Type| primary == *ty || secondary == Some(*ty);
                (must_include.is_empty() || must_include.iter().any(has))
                    && !must_exclude.iter().any(has)
            })
            .collect();
        let pick = *candidates.choose(rng).ok_or_else(|| {
            RandomizerError::no_candidates(format!(
                "no species with {must_include:?} and without {must_exclude:?}"
            ))
        })?;
        Ok(self.finish_draw(pick, consume))
    }

    /// Members whose base stat total lies near the reference's.
    ///
    /// The window starts at +-10% of the reference total and widens by 5%
    /// per round until it holds three members or has widened three times.
    /// If it is still empty it is stretched to the nearest member.
    pub fn power_level_candidates(
        &self,
        dex: &Dex,
        reference: SpeciesId,
        exclude_reference: bool,
    ) -> (Vec<SpeciesId>, PowerWindow) {
        let bst = dex.get(reference).map_or(0, Species::bst);
        let eligible: Vec<(SpeciesId, u32)> = self
            .members
            .iter()
            .copied()
            .filter(|&id| !(exclude_reference && id == reference))
            .filter_map(|id| dex.get(id).map(|s| (id, s.bst())))
            .collect();
        let within = |spread: u32| -> Vec<SpeciesId> {
            eligible
                .iter()
                .filter(|(_, total)| total.abs_diff(bst) <= spread)
                .map(|(id, _)| *id)
                .collect()
        };

        let step = bst / 20;
        let mut spread = bst / 10;
        let mut candidates = within(spread);
        let mut widenings = 0;
        while candidates.len() < POWER_MIN_CANDIDATES && widenings < POWER_MAX_WIDENINGS {
            spread += step;
            widenings += 1;
            candidates = within(spread);
        }
        if candidates.is_empty() {
            if let Some(nearest) = eligible.iter().map(|(_, total)| total.abs_diff(bst)).min() {
                warn!("no species within {spread} of {reference}'s total {bst}; stretching to {nearest}");
                spread = nearest;
                candidates = within(spread);
            }
        }
        (candidates, PowerWindow::around(bst, spread))
    }

    pub fn random_by_power_level<R: Rng + ?Sized>(
        &mut self,
        dex: &Dex,
        reference: SpeciesId,
        exclude_reference: bool,
        rng: &mut R,
        consume: bool,
    ) -> Result<SpeciesId> {
        let (candidates, _) = self.power_level_candidates(dex, reference, exclude_reference);
        let pick = *candidates.choose(rng).ok_or_else(|| {
            RandomizerError::no_candidates(format!("no species of similar strength to {reference}"))
        })?;
        Ok(self.finish_draw(pick, consume))
    }
}
