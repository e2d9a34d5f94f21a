#![allow(dead_code)]

use std::path::Path;

use dexshuffle::{
    dataset::{Dataset, DatasetLoader},
    engine::{EngineBuilder, EngineSettings, RunReport},
    model::{Generation, GrowthRate, Species, SpeciesId, Stats, Trainer, TrainerPokemon, Type},
    settings::Settings,
};

pub fn loader() -> DatasetLoader {
    DatasetLoader::new(env!("CARGO_MANIFEST_DIR"))
}

pub fn sample() -> Dataset {
    loader()
        .load("datasets/sample.yaml")
        .expect("sample dataset parses")
}

pub fn full_settings() -> Settings {
    Settings::from_yaml(Path::new(env!("CARGO_MANIFEST_DIR")).join("configs/full.yaml"))
        .expect("full settings parse")
}

pub fn run(dataset: &mut Dataset, settings: &Settings, seed: u64) -> anyhow::Result<RunReport> {
    let mut engine = EngineBuilder::new(EngineSettings {
        run_name: dataset.name.clone(),
        seed,
    })
    .with_standard_randomizers()
    .build();
    engine.run(dataset, settings)
}

pub fn json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string(value).expect("serializes")
}

pub const SIX_TYPES: [Type; 6] = [
    Type::Grass,
    Type::Water,
    Type::Fire,
    Type::Rock,
    Type::Electric,
    Type::Ghost,
];

/// Three mono-typed species per type and a party per tag.
pub fn six_type_dataset(tags: &[&str]) -> Dataset {
    let mut dataset = Dataset::new("six types", Generation::Gen5);
    let mut id = 1;
    for ty in SIX_TYPES {
        for _ in 0..3 {
            dataset.species.push(Species::new(
                SpeciesId(id),
                format!("{ty}-{id}"),
                ty,
                None,
                Stats::new(60, 60, 60, 60, 60, 60 + id),
                GrowthRate::MediumFast,
            ));
            id += 1;
        }
    }
    dataset.trainers = tags
        .iter()
        .enumerate()
        .map(|(index, tag)| Trainer {
            index,
            name: tag.to_lowercase(),
            tag: Some(tag.to_string()),
            pokemon: (0..3)
                .map(|slot| TrainerPokemon::new(SpeciesId(1 + slot * 5), 20 + slot as u8))
                .collect(),
        })
        .collect();
    dataset
}
