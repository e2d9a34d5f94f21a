use std::collections::BTreeMap;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::chain::{ChainAction, ChainWalker};
use crate::engine::{Randomizer, RandomizerContext};
use crate::error::Result;
use crate::model::{Dex, Evolution, SpeciesId};
use crate::rng::RandomizerRng;
use crate::session::Session;
use crate::settings::{Settings, StatsMode};

const MAX_STAT: u32 = 255;
const MIN_HP: u32 = 20;
const MIN_STAT: u32 = 10;

/// Shuffles or redistributes base stats, keeping evolution lines coherent.
pub struct StatsRandomizer;

impl StatsRandomizer {
    pub fn new() -> Self {
        Self
    }

    pub fn randomize<R: Rng + ?Sized>(dex: &mut Dex, mode: StatsMode, rng: &mut R) -> Result<()> {
        if mode == StatsMode::Unchanged {
            return Ok(());
        }
        let mut action = StatAction {
            mode,
            rng,
            permutations: BTreeMap::new(),
        };
        ChainWalker::new(true).propagate(dex, &mut action)
    }
}

impl Default for StatsRandomizer {
    fn default() -> Self {
        Self::new()
    }
}

struct StatAction<'r, R: ?Sized> {
    mode: StatsMode,
    rng: &'r mut R,
    permutations: BTreeMap<SpeciesId, Vec<usize>>,
}

impl<'r, R: Rng + ?Sized> StatAction<'r, R> {
    fn shuffle(&mut self, dex: &mut Dex, id: SpeciesId, inherited: Option<Vec<usize>>) {
        let slots = dex[id].stats.slots();
        let order = inherited
            .filter(|order| order.len() == slots.len())
            .unwrap_or_else(|| {
                let mut order: Vec<usize> = (0..slots.len()).collect();
                order.shuffle(&mut *self.rng);
                order
            });
        let shuffled: Vec<u16> = order.iter().map(|&i| slots[i]).collect();
        dex[id].stats.set_slots(&shuffled);
        self.permutations.insert(id, order);
    }

    fn redistribute(&mut self, dex: &mut Dex, id: SpeciesId) {
        let slots = dex[id].stats.slots();
        let spread = random_spread(dex[id].bst(), slots.len(), &mut *self.rng);
        dex[id].stats.set_slots(&spread);
    }
}

fn minimum(slot: usize) -> u32 {
    if slot == 0 {
        MIN_HP
    } else {
        MIN_STAT
    }
}

/// Splits `total` over `count` slots at random, honouring the per-slot floor
/// and the 255 ceiling.
fn random_spread<R: Rng + ?Sized>(total: u32, count: usize, rng: &mut R) -> Vec<u16> {
    let mut values: Vec<u32> = (0..count).map(minimum).collect();
    let floor: u32 = values.iter().sum();
    let total = total.clamp(floor, MAX_STAT * count as u32);
    let remaining = total - floor;

    let weights: Vec<f64> = (0..count).map(|_| rng.gen_range(0.2..1.0)).collect();
    let weight_sum: f64 = weights.iter().sum();
    for (value, weight) in values.iter_mut().zip(&weights) {
        let share = (remaining as f64 * weight / weight_sum).floor() as u32;
        *value = (*value + share).min(MAX_STAT);
    }

    let mut leftover = total - values.iter().sum::<u32>();
    let start = rng.gen_range(0..count);
    for offset in 0..count {
        if leftover == 0 {
            break;
        }
        let slot = (start + offset) % count;
        let room = (MAX_STAT - values[slot]).min(leftover);
        values[slot] += room;
        leftover -= room;
    }
    values.into_iter().map(|v| v as u16).collect()
}

/// Scales `template` so it sums to `total`, keeping its ratios.
fn scaled_spread(template: &[u16], total: u32) -> Vec<u16> {
    let template_total: u32 = template.iter().map(|&v| v as u32).sum();
    if template_total == 0 {
        return template.to_vec();
    }
    template
        .iter()
        .enumerate()
        .map(|(slot, &v)| {
            let scaled = (v as f64 * total as f64 / template_total as f64).round() as u32;
            scaled.clamp(minimum(slot), MAX_STAT) as u16
        })
        .collect()
}

impl<'r, R: Rng + ?Sized> ChainAction for StatAction<'r, R> {
    fn base(&mut self, dex: &mut Dex, id: SpeciesId) -> Result<()> {
        match self.mode {
            StatsMode::Shuffle => self.shuffle(dex, id, None),
            StatsMode::Random => self.redistribute(dex, id),
            StatsMode::Unchanged => {}
        }
        Ok(())
    }

    fn evolved(&mut self, dex: &mut Dex, evo: &Evolution, _is_final: bool) -> Result<()> {
        if !evo.carry_stats {
            return self.base(dex, evo.to);
        }
        match self.mode {
            StatsMode::Shuffle => {
                let inherited = self.permutations.get(&evo.from).cloned();
                self.shuffle(dex, evo.to, inherited);
            }
            StatsMode::Random => {
                let template = dex[evo.from].stats.slots();
                let slots = dex[evo.to].stats.slots();
                if template.len() == slots.len() {
                    let scaled = scaled_spread(&template, dex[evo.to].bst());
                    dex[evo.to].stats.set_slots(&scaled);
                } else {
                    self.redistribute(dex, evo.to);
                }
            }
            StatsMode::Unchanged => {}
        }
        Ok(())
    }
}

impl Randomizer for StatsRandomizer {
    fn name(&self) -> &str {
        "stats"
    }

    fn enabled(&self, settings: &Settings, _session: &Session) -> bool {
        settings.species.stats != StatsMode::Unchanged
    }

    fn run(
        &mut self,
        ctx: &RandomizerContext,
        session: &mut Session,
        rng: &mut RandomizerRng<'_>,
    ) -> Result<()> {
        Self::randomize(&mut session.dex, ctx.settings.species.stats, rng)
    }
}
