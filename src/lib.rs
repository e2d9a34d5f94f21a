pub mod chain;
pub mod dataset;
pub mod engine;
pub mod error;
pub mod model;
pub mod pool;
pub mod randomizers;
pub mod rng;
pub mod session;
pub mod settings;

pub use dataset::{Dataset, DatasetLoader, RomData};
pub use engine::{Engine, EngineBuilder, EngineSettings, RunReport};
pub use error::{RandomizerError, Result};
pub use session::Session;
pub use settings::Settings;
