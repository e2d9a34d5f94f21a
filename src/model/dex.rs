//! The species arena and the evolution graph stored on it.

use std::collections::{BTreeMap, BTreeSet};
use std::ops::{Index, IndexMut};

use crate::error::{RandomizerError, Result};
use crate::model::{Evolution, Species, SpeciesId, TypeChange};

/// Level assumed for stone, trade and happiness evolutions when deciding
/// whether a species fits a level.
pub const NON_LEVEL_EVOLUTION_LEVEL: u16 = 30;

#[derive(Copy, Clone, PartialEq, Eq)]
enum Mark {
    Active,
    Done,
}

/// All species of a dataset, indexed by [`SpeciesId`]. Slot 0 is reserved.
///
/// Every evolution edge is stored twice: in `evolutions_from` of its source
/// and in `evolutions_to` of its target. All edge mutation goes through this
/// type so the two copies never diverge.
#[derive(Clone, Debug, Default)]
pub struct Dex {
    slots: Vec<Option<Species>>,
}

impl Dex {
    /// Builds the arena. Edges are taken from each species' `evolutions_from`
    /// list and mirrored onto their targets; existing `evolutions_to` lists
    /// are ignored. Loops already present in the data are kept.
    pub fn new(species: Vec<Species>) -> Result<Self> {
        let max_id = species.iter().map(|s| s.id.index()).max().unwrap_or(0);
        let mut slots: Vec<Option<Species>> = (0..=max_id).map(|_| None).collect();
        let mut edges = Vec::new();
        for mut entry in species {
            if entry.id.raw() == 0 {
                return Err(RandomizerError::InvalidInput(
                    "species id 0 is reserved".into(),
                ));
            }
            let index = entry.id.index();
            if slots[index].is_some() {
                return Err(RandomizerError::InvalidInput(format!(
                    "species id {} defined more than once",
                    entry.id
                )));
            }
            edges.append(&mut entry.evolutions_from);
            entry.evolutions_to.clear();
            entry.processed = false;
            slots[index] = Some(entry);
        }

        let mut dex = Self { slots };
        for evo in edges {
            if dex.find_evolution(evo.from, evo.to).is_some() {
                continue;
            }
            dex.insert_evolution_unchecked(evo)?;
        }
        Ok(dex)
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, id: SpeciesId) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: SpeciesId) -> Option<&Species> {
        self.slots.get(id.index()).and_then(|slot| slot.as_ref())
    }

    pub fn get_mut(&mut self, id: SpeciesId) -> Option<&mut Species> {
        self.slots.get_mut(id.index()).and_then(|slot| slot.as_mut())
    }

    /// Ids of every species, ascending.
    pub fn ids(&self) -> Vec<SpeciesId> {
        self.iter().map(|s| s.id).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Species> {
        self.slots.iter().filter_map(|slot| slot.as_ref())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Species> {
        self.slots.iter_mut().filter_map(|slot| slot.as_mut())
    }

    pub fn into_species(self) -> Vec<Species> {
        self.slots.into_iter().flatten().collect()
    }

    pub fn to_species(&self) -> Vec<Species> {
        self.iter().cloned().collect()
    }

    pub fn reset_processed(&mut self) {
        for species in self.iter_mut() {
            species.processed = false;
        }
    }

    /// Every edge, ordered by source id then insertion order.
    pub fn evolutions(&self) -> Vec<Evolution> {
        self.iter()
            .flat_map(|s| s.evolutions_from.iter().copied())
            .collect()
    }

    pub fn find_evolution(&self, from: SpeciesId, to: SpeciesId) -> Option<&Evolution> {
        self.get(from)?
            .evolutions_from
            .iter()
            .find(|evo| evo.connects(from, to))
    }

    fn require(&self, id: SpeciesId) -> Result<()> {
        if self.contains(id) {
            Ok(())
        } else {
            Err(RandomizerError::UnknownSpecies(id))
        }
    }

    /// Inserts an edge without loop or cycle checks. Meant for loading data
    /// that may legitimately contain them.
    pub fn insert_evolution_unchecked(&mut self, evo: Evolution) -> Result<()> {
        self.require(evo.from)?;
        self.require(evo.to)?;
        self[evo.from].evolutions_from.push(evo);
        self[evo.to].evolutions_to.push(evo);
        Ok(())
    }

    /// Adds a new edge, rejecting self-loops, duplicates and cycles.
    pub fn add_evolution(&mut self, evo: Evolution) -> Result<()> {
        self.require(evo.from)?;
        self.require(evo.to)?;
        if evo.from == evo.to {
            return Err(RandomizerError::InvalidInput(format!(
                "{} cannot evolve into itself",
                evo.from
            )));
        }
        if self.find_evolution(evo.from, evo.to).is_some() {
            return Err(RandomizerError::InvalidInput(format!(
                "{} already evolves into {}",
                evo.from, evo.to
            )));
        }
        if self.creates_cycle(evo.from, evo.to) {
            return Err(RandomizerError::InvalidInput(format!(
                "evolution {} -> {} would create a cycle",
                evo.from, evo.to
            )));
        }
        self.insert_evolution_unchecked(evo)
    }

    /// Whether adding `from -> to` would close a directed cycle. The edge is
    /// inserted provisionally, the graph searched from `from`, and the edge
    /// removed again.
    pub fn creates_cycle(&mut self, from: SpeciesId, to: SpeciesId) -> bool {
        if from == to {
            return true;
        }
        if !self.contains(from) || !self.contains(to) {
            return false;
        }
        let probe = Evolution::new(from, to, crate::model::EvolutionType::Level, 0);
        self[from].evolutions_from.push(probe);
        let mut marks = BTreeMap::new();
        let cyclic = self.visit_for_cycle(from, &mut marks);
        self[from].evolutions_from.pop();
        cyclic
    }

    pub fn remove_evolution(&mut self, from: SpeciesId, to: SpeciesId) -> Option<Evolution> {
        let position = self
            .get(from)?
            .evolutions_from
            .iter()
            .position(|evo| evo.connects(from, to))?;
        let removed = self[from].evolutions_from.remove(position);
        if let Some(target) = self.get_mut(to) {
            target.evolutions_to.retain(|evo| !evo.connects(from, to));
        }
        Some(removed)
    }

    /// Applies `update` to the edge and mirrors the result onto the target's
    /// copy. The endpoints themselves must not be changed.
    pub fn update_evolution(
        &mut self,
        from: SpeciesId,
        to: SpeciesId,
        update: impl FnOnce(&mut Evolution),
    ) -> bool {
        let Some(source) = self.get_mut(from) else {
            return false;
        };
        let Some(edge) = source
            .evolutions_from
            .iter_mut()
            .find(|evo| evo.connects(from, to))
        else {
            return false;
        };
        update(edge);
        edge.from = from;
        edge.to = to;
        let updated = *edge;
        if let Some(target) = self.get_mut(to) {
            for copy in target
                .evolutions_to
                .iter_mut()
                .filter(|evo| evo.connects(from, to))
            {
                *copy = updated;
            }
        }
        true
    }

    pub fn clear_evolutions(&mut self) {
        for species in self.iter_mut() {
            species.evolutions_from.clear();
            species.evolutions_to.clear();
        }
    }

    pub fn has_cycle(&self) -> bool {
        let mut marks = BTreeMap::new();
        self.ids()
            .into_iter()
            .any(|id| self.visit_for_cycle(id, &mut marks))
    }

    fn visit_for_cycle(&self, id: SpeciesId, marks: &mut BTreeMap<SpeciesId, Mark>) -> bool {
        match marks.get(&id) {
            Some(Mark::Done) => return false,
            Some(Mark::Active) => return true,
            None => {}
        }
        marks.insert(id, Mark::Active);
        for evo in &self[id].evolutions_from {
            if self.visit_for_cycle(evo.to, marks) {
                return true;
            }
        }
        marks.insert(id, Mark::Done);
        false
    }

    pub fn pre_evolution(&self, id: SpeciesId) -> Option<SpeciesId> {
        self.get(id)?.evolutions_to.first().map(|evo| evo.from)
    }

    /// Length of the longest pre-evolution chain ending at `id`; 0 for a
    /// species nothing evolves into. Loops are cut at the first repeat.
    pub fn stage(&self, id: SpeciesId) -> usize {
        let mut on_path = BTreeSet::new();
        self.longest_back(id, &mut on_path)
    }

    fn longest_back(&self, id: SpeciesId, on_path: &mut BTreeSet<SpeciesId>) -> usize {
        if !on_path.insert(id) {
            return 0;
        }
        let best = self[id]
            .evolutions_to
            .iter()
            .map(|evo| 1 + self.longest_back(evo.from, on_path))
            .max()
            .unwrap_or(0);
        on_path.remove(&id);
        best
    }

    /// Longest chain of further evolutions from `id`, or `None` when a cycle
    /// is reachable.
    pub fn remaining_evolutions(&self, id: SpeciesId) -> Option<usize> {
        let mut on_path = BTreeSet::new();
        self.longest_forward(id, &mut on_path)
    }

    fn longest_forward(&self, id: SpeciesId, on_path: &mut BTreeSet<SpeciesId>) -> Option<usize> {
        if !on_path.insert(id) {
            return None;
        }
        let mut best = 0;
        for evo in &self[id].evolutions_from {
            best = best.max(1 + self.longest_forward(evo.to, on_path)?);
        }
        on_path.remove(&id);
        Some(best)
    }

    /// Number of pre-evolutions the deepest member of the chain would have if
    /// `from -> to` were added: every ancestor of `from` plus every
    /// descendant of `to` is walked. Cyclic chains report `usize::MAX`.
    pub fn chain_length_through(&self, from: SpeciesId, to: SpeciesId) -> usize {
        let back = self.stage(from);
        match self.remaining_evolutions(to) {
            Some(forward) => back + 1 + forward,
            None => usize::MAX,
        }
    }

    /// Lowest level at which `id` can be obtained by evolving its base form.
    /// Methods without a level requirement count as
    /// [`NON_LEVEL_EVOLUTION_LEVEL`].
    pub fn earliest_level(&self, id: SpeciesId) -> u16 {
        let mut seen = BTreeSet::new();
        let mut level = 1;
        let mut current = id;
        while seen.insert(current) {
            let Some(evo) = self[current].evolutions_to.first() else {
                break;
            };
            level = level.max(evo.level().unwrap_or(NON_LEVEL_EVOLUTION_LEVEL));
            current = evo.from;
        }
        level
    }

    /// Species reachable from `id` that do not evolve further. A species with
    /// no evolutions is its own final form.
    pub fn final_forms(&self, id: SpeciesId) -> Vec<SpeciesId> {
        let mut finals = BTreeSet::new();
        let mut seen = BTreeSet::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if !seen.insert(current) {
                continue;
            }
            let evolutions = &self[current].evolutions_from;
            if evolutions.is_empty() {
                finals.insert(current);
            }
            stack.extend(evolutions.iter().map(|evo| evo.to));
        }
        finals.into_iter().collect()
    }

    /// Recomputes `types_differ` on every edge from the current types.
    pub fn refresh_type_changes(&mut self) {
        for evo in self.evolutions() {
            let change = TypeChange::between(self[evo.from].types(), self[evo.to].types());
            self.update_evolution(evo.from, evo.to, |edge| edge.types_differ = change);
        }
    }
}

impl Index<SpeciesId> for Dex {
    type Output = Species;

    fn index(&self, id: SpeciesId) -> &Species {
        self.get(id)
            .unwrap_or_else(|| panic!("species {id} is not in the dex"))
    }
}

impl IndexMut<SpeciesId> for Dex {
    fn index_mut(&mut self, id: SpeciesId) -> &mut Species {
        self.get_mut(id)
            .unwrap_or_else(|| panic!("species {id} is not in the dex"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EvolutionType, GrowthRate, Stats, Type};

    fn species(id: u16) -> Species {
        Species::new(
            SpeciesId(id),
            format!("mon{id}"),
            Type::Normal,
            None,
            Stats::new(50, 50, 50, 50, 50, 50),
            GrowthRate::MediumFast,
        )
    }

    fn level(from: u16, to: u16) -> Evolution {
        Evolution::new(SpeciesId(from), SpeciesId(to), EvolutionType::Level, 16)
    }

    fn line_dex() -> Dex {
        let mut dex = Dex::new((1..=5).map(species).collect()).unwrap();
        dex.add_evolution(level(1, 2)).unwrap();
        dex.add_evolution(level(2, 3)).unwrap();
        dex
    }

    #[test]
    fn edges_are_mirrored_on_both_endpoints() {
        let dex = line_dex();
        assert_eq!(dex[SpeciesId(1)].evolutions_from.len(), 1);
        assert_eq!(dex[SpeciesId(2)].evolutions_to[0].from, SpeciesId(1));
        assert_eq!(dex.pre_evolution(SpeciesId(3)), Some(SpeciesId(2)));
    }

    #[test]
    fn rejects_self_loops_duplicates_and_cycles() {
        let mut dex = line_dex();
        assert!(dex.add_evolution(level(4, 4)).is_err());
        assert!(dex.add_evolution(level(1, 2)).is_err());
        assert!(dex.creates_cycle(SpeciesId(3), SpeciesId(1)));
        assert!(dex.add_evolution(level(3, 1)).is_err());
        assert!(!dex.has_cycle());
        assert_eq!(dex[SpeciesId(1)].evolutions_from.len(), 1);
        assert!(!dex.creates_cycle(SpeciesId(3), SpeciesId(4)));
    }

    #[test]
    fn loaded_loops_are_tolerated_by_readers() {
        let mut a = species(1);
        a.evolutions_from.push(level(1, 2));
        let mut b = species(2);
        b.evolutions_from.push(level(2, 1));
        let dex = Dex::new(vec![a, b]).unwrap();
        assert!(dex.has_cycle());
        assert_eq!(dex.remaining_evolutions(SpeciesId(1)), None);
        assert_eq!(dex.stage(SpeciesId(1)), 2);
    }

    #[test]
    fn chain_lengths_cover_the_whole_chain() {
        let mut dex = line_dex();
        assert_eq!(dex.stage(SpeciesId(3)), 2);
        assert_eq!(dex.remaining_evolutions(SpeciesId(1)), Some(2));
        dex.add_evolution(level(4, 5)).unwrap();
        // 1 -> 2 -> 3 -> 4 -> 5 would give species 5 four pre-evolutions
        assert_eq!(dex.chain_length_through(SpeciesId(3), SpeciesId(4)), 4);
        assert_eq!(dex.final_forms(SpeciesId(1)), vec![SpeciesId(3)]);
    }

    #[test]
    fn update_and_remove_keep_copies_in_sync() {
        let mut dex = line_dex();
        assert!(dex.update_evolution(SpeciesId(1), SpeciesId(2), |evo| {
            evo.method = EvolutionType::Stone;
            evo.extra_info = 82;
        }));
        assert_eq!(dex[SpeciesId(2)].evolutions_to[0].method, EvolutionType::Stone);
        assert!(dex.remove_evolution(SpeciesId(1), SpeciesId(2)).is_some());
        assert!(dex[SpeciesId(2)].evolutions_to.is_empty());
        assert!(dex.remove_evolution(SpeciesId(1), SpeciesId(2)).is_none());
    }

    #[test]
    fn duplicate_and_reserved_ids_are_rejected() {
        assert!(Dex::new(vec![species(1), species(1)]).is_err());
        assert!(Dex::new(vec![species(0)]).is_err());
    }
}
