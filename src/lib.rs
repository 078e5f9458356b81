pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use config::{cli::LocalStorage, env::AppEnv, session_file::SessionFile};

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use core::{GeneratedScript, GenerationEngine};
pub use domain::enums::{ExportTarget, OptionSet, StepKind};
pub use domain::model::ModelConfiguration;
pub use domain::session::Session;
pub use utils::error::{GenError, Result};
