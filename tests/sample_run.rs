mod common;

use std::collections::BTreeSet;

use dexshuffle::{
    dataset::{write_dataset, RomData},
    model::{Dex, Generation, SpeciesId},
    settings::{Settings, StarterMode, TrainerMode},
};

use common::{full_settings, json, run, sample};

#[test]
fn sample_dataset_parses() {
    let dataset = sample();
    assert_eq!(dataset.generation, Generation::Gen5);
    assert_eq!(dataset.species.len(), 25);
    assert_eq!(dataset.evolutions.len(), 13);
    assert_eq!(dataset.starters, vec![SpeciesId(1), SpeciesId(4), SpeciesId(7)]);
    assert!(dataset.trainers.iter().any(|t| t.tag.as_deref() == Some("GYM1-LEADER")));
    let dex = Dex::new(dataset.species()).expect("sample builds a dex");
    assert!(!dex.has_cycle());
}

#[test]
fn full_run_is_deterministic() {
    let settings = full_settings();
    let mut first = sample();
    let mut second = sample();
    run(&mut first, &settings, 42).unwrap();
    run(&mut second, &settings, 42).unwrap();
    assert_eq!(json(&first), json(&second));

    let mut other = sample();
    run(&mut other, &settings, 43).unwrap();
    assert_ne!(json(&first), json(&other));
}

#[test]
fn full_run_applies_every_randomizer() {
    let mut dataset = sample();
    let report = run(&mut dataset, &full_settings(), 7).unwrap();
    let applied: Vec<&str> = report.applied().collect();
    assert_eq!(
        applied,
        vec![
            "moves",
            "stats",
            "types",
            "abilities",
            "evolutions",
            "starters",
            "movesets",
            "compatibility",
            "trainers",
            "encounters",
            "statics",
            "trades",
            "items",
        ]
    );
}

#[test]
fn rewritten_evolutions_stay_a_shallow_forest() {
    for seed in 0..10 {
        let mut dataset = sample();
        run(&mut dataset, &full_settings(), seed).unwrap();
        assert_eq!(dataset.evolutions.len(), 13);

        let dex = Dex::new(dataset.species()).unwrap();
        assert!(!dex.has_cycle(), "seed {seed}");
        for species in dex.iter() {
            assert!(species.evolutions_to.len() <= 1, "seed {seed}: {}", species.id);
            assert!(dex.stage(species.id) <= 2, "seed {seed}: {}", species.id);
        }
        let targets: BTreeSet<SpeciesId> = dataset.evolutions.iter().map(|e| e.to).collect();
        assert_eq!(targets.len(), dataset.evolutions.len());
    }
}

#[test]
fn default_settings_leave_the_dataset_alone() {
    let original = sample();
    let mut dataset = sample();
    let report = run(&mut dataset, &Settings::default(), 1).unwrap();
    assert_eq!(report.applied().count(), 0);
    assert_eq!(json(&dataset.species), json(&original.species));
    assert_eq!(json(&dataset.trainers), json(&original.trainers));
    assert_eq!(json(&dataset.encounter_areas), json(&original.encounter_areas));
    assert_eq!(json(&dataset.learnsets), json(&original.learnsets));
    let pairs = |d: &dexshuffle::Dataset| -> BTreeSet<(SpeciesId, SpeciesId, u16)> {
        d.evolutions.iter().map(|e| (e.from, e.to, e.extra_info)).collect()
    };
    assert_eq!(pairs(&dataset), pairs(&original));
}

#[test]
fn rivals_carry_the_counterpart_starter() {
    let mut settings = Settings::default();
    settings.starters.mode = StarterMode::Random;
    settings.trainers.mode = TrainerMode::Random;
    settings.trainers.rival_carries_starter = true;
    for seed in 0..10 {
        let mut dataset = sample();
        run(&mut dataset, &settings, seed).unwrap();
        let starters = dataset.starters.clone();
        for (tag, expected) in [("RIVAL1-0", 1), ("RIVAL1-1", 2), ("RIVAL1-2", 0)] {
            let trainer = dataset
                .trainers
                .iter()
                .find(|t| t.tag.as_deref() == Some(tag))
                .unwrap();
            assert_eq!(trainer.pokemon[0].species, starters[expected], "seed {seed} {tag}");
        }
    }
}

#[test]
fn randomized_dataset_round_trips_through_files() {
    let mut dataset = sample();
    run(&mut dataset, &full_settings(), 99).unwrap();
    let dir = tempfile::tempdir().unwrap();
    for file in ["out/randomized.yaml", "out/randomized.json"] {
        write_dataset(&dataset, dir.path().join(file)).unwrap();
        let loaded = dexshuffle::DatasetLoader::new(dir.path()).load(file).unwrap();
        assert_eq!(json(&loaded), json(&dataset));
    }
}
