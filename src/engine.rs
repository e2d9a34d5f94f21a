use std::time::Instant;

use anyhow::{Context, Result};
use log::{debug, info};

use crate::{
    dataset::RomData,
    randomizers::{
        AbilitiesRandomizer, CompatibilityRandomizer, EncounterRandomizer, EvolutionRandomizer,
        ItemRandomizer, MoveRandomizer, MovesetRandomizer, StarterRandomizer, StaticRandomizer,
        StatsRandomizer, TradeRandomizer, TrainerRandomizer, TypesRandomizer,
    },
    rng::{RandomizerRng, RngManager},
    session::Session,
    settings::Settings,
};

#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub run_name: String,
    pub seed: u64,
}

pub struct EngineBuilder {
    settings: EngineSettings,
    randomizers: Vec<Box<dyn Randomizer>>,
}

impl EngineBuilder {
    pub fn new(settings: EngineSettings) -> Self {
        Self {
            settings,
            randomizers: Vec::new(),
        }
    }

    pub fn with_randomizer(mut self, randomizer: impl Randomizer + 'static) -> Self {
        self.randomizers.push(Box::new(randomizer));
        self
    }

    pub fn push_randomizer(&mut self, randomizer: impl Randomizer + 'static) {
        self.randomizers.push(Box::new(randomizer));
    }

    /// Every randomizer, in the order a full run applies them.
    pub fn with_standard_randomizers(self) -> Self {
        self.with_randomizer(MoveRandomizer::new())
            .with_randomizer(StatsRandomizer::new())
            .with_randomizer(TypesRandomizer::new())
            .with_randomizer(AbilitiesRandomizer::new())
            .with_randomizer(EvolutionRandomizer::new())
            .with_randomizer(StarterRandomizer::new())
            .with_randomizer(MovesetRandomizer::new())
            .with_randomizer(CompatibilityRandomizer::new())
            .with_randomizer(TrainerRandomizer::new())
            .with_randomizer(EncounterRandomizer::new())
            .with_randomizer(StaticRandomizer::new())
            .with_randomizer(TradeRandomizer::new())
            .with_randomizer(ItemRandomizer::new())
    }

    pub fn build(self) -> Engine {
        Engine {
            rng: RngManager::new(self.settings.seed),
            randomizers: self.randomizers,
            settings: self.settings,
        }
    }
}

pub struct Engine {
    rng: RngManager,
    randomizers: Vec<Box<dyn Randomizer>>,
    settings: EngineSettings,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RandomizerRunReport {
    pub name: String,
    pub skipped: bool,
    pub duration_ms: u128,
}

#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub randomizers: Vec<RandomizerRunReport>,
}

impl RunReport {
    pub fn applied(&self) -> impl Iterator<Item = &str> {
        self.randomizers
            .iter()
            .filter(|r| !r.skipped)
            .map(|r| r.name.as_str())
    }
}

impl Engine {
    pub fn seed(&self) -> u64 {
        self.rng.seed()
    }

    /// Loads `data` into a fresh session, applies every enabled randomizer
    /// and writes the result back. Nothing is written when any randomizer
    /// fails.
    pub fn run(&mut self, data: &mut dyn RomData, settings: &Settings) -> Result<RunReport> {
        let mut session = Session::load(data).context("Failed to load dataset")?;
        info!(
            "run '{}' with seed {}: {} species, {} trainers, {} encounter areas",
            self.settings.run_name,
            self.rng.seed(),
            session.dex.len(),
            session.trainers.len(),
            session.encounter_areas.len()
        );

        let mut report = RunReport::default();
        for randomizer in &mut self.randomizers {
            // Streams are drawn even for skipped randomizers so toggling one
            // never changes the others' output.
            let mut rng_stream = self.rng.stream(randomizer.name());
            if !randomizer.enabled(settings, &session) {
                debug!("{} disabled", randomizer.name());
                report.randomizers.push(RandomizerRunReport {
                    name: randomizer.name().to_string(),
                    skipped: true,
                    duration_ms: 0,
                });
                continue;
            }
            let ctx = RandomizerContext {
                run_name: &self.settings.run_name,
                settings,
            };
            let started = Instant::now();
            info!("{} started", randomizer.name());
            randomizer
                .run(&ctx, &mut session, &mut rng_stream)
                .with_context(|| format!("Randomizer '{}' failed", randomizer.name()))?;
            let elapsed = started.elapsed().as_millis();
            info!("{} finished in {} ms", randomizer.name(), elapsed);
            report.randomizers.push(RandomizerRunReport {
                name: randomizer.name().to_string(),
                skipped: false,
                duration_ms: elapsed,
            });
        }

        session.store(data);
        Ok(report)
    }
}

pub struct RandomizerContext<'a> {
    pub run_name: &'a str,
    pub settings: &'a Settings,
}

pub trait Randomizer {
    fn name(&self) -> &str;

    /// Whether the settings ask this randomizer to change anything.
    fn enabled(&self, settings: &Settings, session: &Session) -> bool;

    fn run(
        &mut self,
        ctx: &RandomizerContext,
        session: &mut Session,
        rng: &mut RandomizerRng<'_>,
    ) -> crate::Result<()>;
}
