mod common;

use dexshuffle::{
    engine::{EngineBuilder, EngineSettings, Randomizer, RandomizerContext},
    randomizers::MoveRandomizer,
    rng::RandomizerRng,
    session::Session,
    settings::{Settings, TrainerMode},
    RandomizerError,
};

use common::{json, run, sample};

struct AlwaysFails;

impl Randomizer for AlwaysFails {
    fn name(&self) -> &str {
        "always_fails"
    }

    fn enabled(&self, _settings: &Settings, _session: &Session) -> bool {
        true
    }

    fn run(
        &mut self,
        _ctx: &RandomizerContext,
        _session: &mut Session,
        _rng: &mut RandomizerRng<'_>,
    ) -> dexshuffle::Result<()> {
        Err(RandomizerError::exhausted("impossible constraints", 3))
    }
}

fn move_settings() -> Settings {
    let mut settings = Settings::default();
    settings.moves.power = true;
    settings.moves.types = true;
    settings
}

#[test]
fn failures_name_the_randomizer_and_keep_their_cause() {
    let mut dataset = sample();
    let mut engine = EngineBuilder::new(EngineSettings {
        run_name: "failing".into(),
        seed: 1,
    })
    .with_randomizer(MoveRandomizer::new())
    .with_randomizer(AlwaysFails)
    .build();
    let err = engine.run(&mut dataset, &move_settings()).unwrap_err();
    assert!(err.to_string().contains("always_fails"));
    assert!(matches!(
        err.downcast_ref::<RandomizerError>(),
        Some(RandomizerError::ConstraintsExhausted { attempts: 3, .. })
    ));
}

#[test]
fn failed_runs_leave_the_dataset_untouched() {
    let original = sample();
    let mut dataset = sample();
    let mut engine = EngineBuilder::new(EngineSettings {
        run_name: "failing".into(),
        seed: 1,
    })
    .with_randomizer(MoveRandomizer::new())
    .with_randomizer(AlwaysFails)
    .build();
    assert!(engine.run(&mut dataset, &move_settings()).is_err());
    assert_eq!(json(&dataset.moves), json(&original.moves));
}

#[test]
fn toggling_one_randomizer_does_not_shift_another() {
    let mut trainers_only = Settings::default();
    trainers_only.trainers.mode = TrainerMode::Random;
    let mut with_moves = move_settings();
    with_moves.trainers.mode = TrainerMode::Random;

    let mut first = sample();
    let mut second = sample();
    run(&mut first, &trainers_only, 11).unwrap();
    run(&mut second, &with_moves, 11).unwrap();
    assert_eq!(json(&first.trainers), json(&second.trainers));
    assert_ne!(json(&first.moves), json(&second.moves));
}
