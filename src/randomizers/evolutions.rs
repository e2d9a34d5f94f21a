//! Rewrites the evolution graph.
//!
//! Each attempt clears every edge and rebuilds one replacement per original
//! edge. When any edge runs out of candidates the whole attempt is thrown
//! away and started over; there is no partial backtracking.

use std::collections::{BTreeMap, BTreeSet};

use log::{debug, info};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::engine::{Randomizer, RandomizerContext};
use crate::error::{RandomizerError, Result};
use crate::model::{
    Dex, Evolution, EvolutionMethods, EvolutionType, ParamKind, SpeciesId, TypeChange,
};
use crate::pool::SpeciesPool;
use crate::rng::RandomizerRng;
use crate::session::Session;
use crate::settings::{EvolutionMode, EvolutionSettings, Settings};

const HIGHEST_LEVEL: u16 = 100;

pub struct EvolutionRandomizer;

impl EvolutionRandomizer {
    pub fn new() -> Self {
        Self
    }

    /// Replaces every evolution target, retrying whole passes up to
    /// `settings.max_attempts` times. On failure the original edges are
    /// restored and [`RandomizerError::ConstraintsExhausted`] is returned.
    pub fn rewrite<R: Rng + ?Sized>(
        dex: &mut Dex,
        settings: &EvolutionSettings,
        rng: &mut R,
    ) -> Result<()> {
        let original = dex.evolutions();
        if original.is_empty() {
            return Ok(());
        }
        let plan = RewritePlan::new(dex, original);
        let attempts = settings.max_attempts.max(1);
        for attempt in 1..=attempts {
            match plan.attempt(dex, settings, rng) {
                Ok(()) => {
                    info!(
                        "rewrote {} evolutions after {} attempt(s)",
                        plan.original.len(),
                        attempt
                    );
                    return Ok(());
                }
                Err(err) if err.is_no_candidates() => {
                    debug!("evolution attempt {attempt} discarded: {err}");
                }
                Err(err) => {
                    plan.restore(dex)?;
                    return Err(err);
                }
            }
        }
        plan.restore(dex)?;
        Err(RandomizerError::exhausted("evolution rewriting", attempts))
    }

    /// Assigns new evolution methods to every edge, keeping each species'
    /// set of outgoing methods unambiguous. Fails when a species has more
    /// evolutions than distinct methods to give them.
    pub fn reassign_methods<R: Rng + ?Sized>(
        dex: &mut Dex,
        methods: &EvolutionMethods,
        evolution_items: &[u16],
        rng: &mut R,
    ) -> Result<()> {
        let assignable: Vec<EvolutionType> = methods
            .assignable()
            .into_iter()
            .filter(|m| m.param_kind() != ParamKind::Item || !evolution_items.is_empty())
            .collect();
        if assignable.is_empty() {
            return Ok(());
        }
        for from in dex.ids() {
            let edges = dex[from].evolutions_from.clone();
            if edges.is_empty() {
                continue;
            }
            let default_level = (20 + 15 * dex.stage(from) as u16).min(HIGHEST_LEVEL);
            let mut budget = MethodBudget::default();
            for old in edges {
                let level = old.level().unwrap_or(default_level);
                let (method, param) =
                    pick_method(&budget, &assignable, level, evolution_items, rng).ok_or_else(|| {
                        RandomizerError::no_candidates(format!(
                            "no unused evolution method for {from} -> {}",
                            old.to
                        ))
                    })?;
                budget.record(method, param);
                dex.update_evolution(old.from, old.to, |evo| {
                    evo.method = method;
                    evo.extra_info = param;
                });
            }
        }
        Ok(())
    }
}

/// A random method the budget still allows. Item methods try every item
/// before the method is given up.
fn pick_method<R: Rng + ?Sized>(
    budget: &MethodBudget,
    assignable: &[EvolutionType],
    level: u16,
    evolution_items: &[u16],
    rng: &mut R,
) -> Option<(EvolutionType, u16)> {
    let mut order = assignable.to_vec();
    order.shuffle(rng);
    order.into_iter().find_map(|method| match method.param_kind() {
        ParamKind::Level => budget.allows(method, level).then_some((method, level)),
        ParamKind::Item => {
            let mut items = evolution_items.to_vec();
            items.shuffle(&mut *rng);
            items
                .into_iter()
                .find(|&item| budget.allows(method, item))
                .map(|item| (method, item))
        }
        _ => budget.allows(method, 0).then_some((method, 0)),
    })
}

impl Default for EvolutionRandomizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of the graph taken before the first attempt.
struct RewritePlan {
    original: Vec<Evolution>,
    old_pairs: BTreeSet<(SpeciesId, SpeciesId)>,
    stages: BTreeMap<SpeciesId, usize>,
    sources: Vec<SpeciesId>,
    ids: Vec<SpeciesId>,
}

impl RewritePlan {
    fn new(dex: &Dex, original: Vec<Evolution>) -> Self {
        let ids = dex.ids();
        let stages = ids.iter().map(|&id| (id, dex.stage(id))).collect();
        let old_pairs = original.iter().map(|evo| (evo.from, evo.to)).collect();
        let sources: BTreeSet<SpeciesId> = original.iter().map(|evo| evo.from).collect();
        Self {
            original,
            old_pairs,
            stages,
            sources: sources.into_iter().collect(),
            ids,
        }
    }

    fn restore(&self, dex: &mut Dex) -> Result<()> {
        dex.clear_evolutions();
        for evo in &self.original {
            dex.insert_evolution_unchecked(*evo)?;
        }
        Ok(())
    }

    fn attempt<R: Rng + ?Sized>(
        &self,
        dex: &mut Dex,
        settings: &EvolutionSettings,
        rng: &mut R,
    ) -> Result<()> {
        dex.clear_evolutions();
        let mut order = self.sources.clone();
        order.shuffle(rng);
        let mut picked: BTreeSet<SpeciesId> = BTreeSet::new();

        for from in order {
            for old in self.original.iter().filter(|evo| evo.from == from) {
                let candidates = self.candidates(dex, old, &picked, settings);
                let to = match candidates.len() {
                    0 => {
                        return Err(RandomizerError::no_candidates(format!(
                            "no evolution target for {from}"
                        )))
                    }
                    1 => candidates[0],
                    _ if settings.similar_strength => {
                        let mut pool = SpeciesPool::new(dex, candidates);
                        pool.random_by_power_level(dex, old.to, false, rng, false)?
                    }
                    _ => *candidates
                        .choose(rng)
                        .ok_or_else(|| RandomizerError::no_candidates("empty candidate list"))?,
                };
                let mut evo = *old;
                evo.to = to;
                evo.types_differ = TypeChange::between(dex[from].types(), dex[to].types());
                dex.add_evolution(evo)?;
                picked.insert(to);
            }
        }
        Ok(())
    }

    fn candidates(
        &self,
        dex: &mut Dex,
        old: &Evolution,
        picked: &BTreeSet<SpeciesId>,
        settings: &EvolutionSettings,
    ) -> Vec<SpeciesId> {
        let from = old.from;
        let mut candidates = Vec::new();
        for &to in &self.ids {
            let source = &dex[from];
            let target = &dex[to];
            if to == from
                || target.growth_rate != source.growth_rate
                || picked.contains(&to)
                || (settings.force_change && self.old_pairs.contains(&(from, to)))
            {
                continue;
            }
            if settings.same_typing && !target.shares_type_with(source) {
                continue;
            }
            if settings.same_stage && self.stages.get(&to) != self.stages.get(&old.to) {
                continue;
            }
            if settings.no_power_decrease && target.bst() < source.bst() {
                continue;
            }
            if dex.creates_cycle(from, to) {
                continue;
            }
            if dex.chain_length_through(from, to) > settings.max_pre_evolutions {
                continue;
            }
            candidates.push(to);
        }
        candidates
    }
}

/// Tracks the methods already given to one species' evolutions.
#[derive(Default)]
struct MethodBudget {
    used: Vec<(EvolutionType, u16)>,
}

impl MethodBudget {
    fn allows(&self, method: EvolutionType, param: u16) -> bool {
        let has = |m: EvolutionType| self.used.iter().any(|&(u, _)| u == m);
        if method.is_uncontrolled_level()
            && self.used.iter().filter(|(u, _)| u.is_uncontrolled_level()).count() >= 2
        {
            return false;
        }
        match method {
            EvolutionType::Happiness
                if has(EvolutionType::HappinessDay) || has(EvolutionType::HappinessNight) =>
            {
                return false
            }
            EvolutionType::HappinessDay | EvolutionType::HappinessNight
                if has(EvolutionType::Happiness) =>
            {
                return false
            }
            _ => {}
        }
        if method.param_kind() == ParamKind::Item {
            return !self.used.contains(&(method, param));
        }
        !has(method)
    }

    fn record(&mut self, method: EvolutionType, param: u16) {
        self.used.push((method, param));
    }
}

impl Randomizer for EvolutionRandomizer {
    fn name(&self) -> &str {
        "evolutions"
    }

    fn enabled(&self, settings: &Settings, _session: &Session) -> bool {
        settings.evolutions.mode == EvolutionMode::Random
    }

    fn run(
        &mut self,
        ctx: &RandomizerContext,
        session: &mut Session,
        rng: &mut RandomizerRng<'_>,
    ) -> Result<()> {
        let settings = &ctx.settings.evolutions;
        Self::rewrite(&mut session.dex, settings, rng)?;
        if settings.change_methods {
            Self::reassign_methods(
                &mut session.dex,
                &session.methods,
                &session.evolution_items,
                rng,
            )?;
        }
        Ok(())
    }
}
