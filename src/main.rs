use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use log::info;
use rand::Rng;

use dexshuffle::{
    dataset::{write_dataset, DatasetLoader},
    engine::{EngineBuilder, EngineSettings},
    settings::Settings,
};

#[derive(Debug, Parser)]
#[command(author, version, about = "Randomize a game dataset")]
struct Cli {
    /// Path to the dataset (YAML or JSON)
    #[arg(long, default_value = "datasets/sample.yaml")]
    dataset: PathBuf,

    /// Settings YAML file (every randomizer off when omitted)
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Seed for the run; a random one is chosen and logged when omitted
    #[arg(long)]
    seed: Option<u64>,

    /// Where to write the randomized dataset
    #[arg(long, default_value = "randomized.yaml")]
    output: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = match &cli.settings {
        Some(path) => Settings::from_yaml(path)?,
        None => Settings::default(),
    };
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(settings.logging.level.as_str()),
    )
    .init();

    let mut dataset = DatasetLoader::new(".").load(&cli.dataset)?;
    let seed = cli.seed.unwrap_or_else(|| rand::thread_rng().gen());
    info!("using seed {seed}");

    let mut engine = EngineBuilder::new(EngineSettings {
        run_name: dataset.name.clone(),
        seed,
    })
    .with_standard_randomizers()
    .build();
    let report = engine.run(&mut dataset, &settings)?;
    write_dataset(&dataset, &cli.output)?;

    let applied: Vec<&str> = report.applied().collect();
    println!(
        "Dataset '{}' randomized with seed {} ({}). Written to {}",
        dataset.name,
        seed,
        if applied.is_empty() {
            "no changes".to_string()
        } else {
            applied.join(", ")
        },
        cli.output.display()
    );
    Ok(())
}
