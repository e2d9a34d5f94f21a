//! Applies an effect to base species and carries it up each evolution chain.

use std::collections::BTreeSet;

use crate::error::Result;
use crate::model::{Dex, Evolution, SpeciesId};

/// Callbacks invoked by [`ChainWalker::propagate`].
pub trait ChainAction {
    /// A species with no pre-evolution, or one excluded from inheritance.
    fn base(&mut self, dex: &mut Dex, id: SpeciesId) -> Result<()>;

    /// `evo.to` inherits from `evo.from`, which has already been handled.
    fn evolved(&mut self, dex: &mut Dex, evo: &Evolution, is_final: bool) -> Result<()>;

    /// Used instead of the other two when chain semantics are off.
    fn independent(&mut self, dex: &mut Dex, id: SpeciesId) -> Result<()> {
        self.base(dex, id)
    }
}

#[derive(Clone, Debug, Default)]
pub struct ChainWalker {
    follow_evolutions: bool,
    excluded: BTreeSet<SpeciesId>,
}

impl ChainWalker {
    pub fn new(follow_evolutions: bool) -> Self {
        Self {
            follow_evolutions,
            excluded: BTreeSet::new(),
        }
    }

    /// Species that are treated as roots even when they have a pre-evolution.
    pub fn exclude(mut self, ids: impl IntoIterator<Item = SpeciesId>) -> Self {
        self.excluded.extend(ids);
        self
    }

    /// Invokes exactly one action per species. Pre-evolutions are handled
    /// before their evolutions except inside loops present in the data.
    pub fn propagate(&self, dex: &mut Dex, action: &mut impl ChainAction) -> Result<()> {
        dex.reset_processed();
        let ids = dex.ids();

        if !self.follow_evolutions {
            for id in ids {
                action.independent(dex, id)?;
                dex[id].processed = true;
            }
            return Ok(());
        }

        let evolves_further: BTreeSet<SpeciesId> = dex
            .iter()
            .filter(|s| !s.evolutions_from.is_empty())
            .map(|s| s.id)
            .collect();

        for &id in &ids {
            if dex[id].evolutions_to.is_empty() || self.excluded.contains(&id) {
                action.base(dex, id)?;
                dex[id].processed = true;
            }
        }

        for &id in &ids {
            if dex[id].processed {
                continue;
            }
            let mut stack: Vec<Evolution> = Vec::new();
            let mut current = id;
            while let Some(evo) = dex[current].evolutions_to.first().copied() {
                if stack.iter().any(|seen| seen.connects(evo.from, evo.to)) {
                    break;
                }
                stack.push(evo);
                if dex[evo.from].processed {
                    break;
                }
                current = evo.from;
            }
            while let Some(evo) = stack.pop() {
                if dex[evo.to].processed {
                    continue;
                }
                action.evolved(dex, &evo, !evolves_further.contains(&evo.to))?;
                dex[evo.to].processed = true;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EvolutionType, GrowthRate, Species, Stats, Type};
    use std::collections::BTreeMap;

    #[derive(Default)]
    struct Recorder {
        calls: Vec<String>,
        per_species: BTreeMap<SpeciesId, usize>,
    }

    impl ChainAction for Recorder {
        fn base(&mut self, _dex: &mut Dex, id: SpeciesId) -> Result<()> {
            self.calls.push(format!("base {}", id.raw()));
            *self.per_species.entry(id).or_default() += 1;
            Ok(())
        }

        fn evolved(&mut self, _dex: &mut Dex, evo: &Evolution, is_final: bool) -> Result<()> {
            let suffix = if is_final { " final" } else { "" };
            self.calls
                .push(format!("evo {}->{}{}", evo.from.raw(), evo.to.raw(), suffix));
            *self.per_species.entry(evo.to).or_default() += 1;
            Ok(())
        }

        fn independent(&mut self, _dex: &mut Dex, id: SpeciesId) -> Result<()> {
            self.calls.push(format!("solo {}", id.raw()));
            Ok(())
        }
    }

    fn species(id: u16, evolves_into: &[u16]) -> Species {
        let mut s = Species::new(
            SpeciesId(id),
            format!("mon{id}"),
            Type::Normal,
            None,
            Stats::new(40, 40, 40, 40, 40, 40),
            GrowthRate::Fast,
        );
        s.evolutions_from = evolves_into
            .iter()
            .map(|&to| Evolution::new(SpeciesId(id), SpeciesId(to), EvolutionType::Level, 20))
            .collect();
        s
    }

    fn position(calls: &[String], entry: &str) -> usize {
        calls
            .iter()
            .position(|c| c == entry)
            .unwrap_or_else(|| panic!("{entry} missing from {calls:?}"))
    }

    #[test]
    fn linear_chain_runs_root_to_leaf() {
        // Leaf first in id order so the walk has to climb back to the root.
        let mut dex = Dex::new(vec![species(1, &[]), species(2, &[1]), species(3, &[2])]).unwrap();
        let mut recorder = Recorder::default();
        ChainWalker::new(true).propagate(&mut dex, &mut recorder).unwrap();

        let base = position(&recorder.calls, "base 3");
        let middle = position(&recorder.calls, "evo 3->2");
        let last = position(&recorder.calls, "evo 2->1 final");
        assert!(base < middle && middle < last, "{:?}", recorder.calls);
        assert_eq!(recorder.calls.len(), 3);
    }

    #[test]
    fn branches_and_exclusions_get_one_call_each() {
        let mut dex = Dex::new(vec![
            species(1, &[2, 3]),
            species(2, &[]),
            species(3, &[]),
            species(4, &[5]),
            species(5, &[]),
        ])
        .unwrap();
        let mut recorder = Recorder::default();
        ChainWalker::new(true)
            .exclude([SpeciesId(5)])
            .propagate(&mut dex, &mut recorder)
            .unwrap();
        assert!(recorder.calls.contains(&"base 5".to_string()));
        assert!(recorder.calls.contains(&"evo 1->2 final".to_string()));
        assert!(recorder.calls.contains(&"evo 1->3 final".to_string()));
        assert!(recorder.per_species.values().all(|&n| n == 1));
        assert_eq!(recorder.per_species.len(), 5);
    }

    #[test]
    fn loops_in_loaded_data_terminate() {
        let mut dex = Dex::new(vec![species(1, &[2]), species(2, &[1]), species(3, &[])]).unwrap();
        let mut recorder = Recorder::default();
        ChainWalker::new(true).propagate(&mut dex, &mut recorder).unwrap();
        assert_eq!(recorder.per_species.len(), 3);
        assert!(recorder.per_species.values().all(|&n| n == 1));
    }

    #[test]
    fn independent_mode_ignores_edges() {
        let mut dex = Dex::new(vec![species(1, &[2]), species(2, &[])]).unwrap();
        let mut recorder = Recorder::default();
        ChainWalker::new(false).propagate(&mut dex, &mut recorder).unwrap();
        assert_eq!(recorder.calls, vec!["solo 1", "solo 2"]);
    }
}
