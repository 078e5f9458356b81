use crate::config::env::AppEnv;
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use clap::Parser;
use serde::Serialize;

#[derive(Debug, Clone, Serialize, Parser)]
#[command(name = "f3dat-gen")]
#[command(about = "Generate FLAC3D .f3dat model scripts from a saved session")]
pub struct CliConfig {
    /// Session file holding project, settings and construction steps
    #[arg(short, long, default_value = "session.toml")]
    pub session: String,

    /// Directory the generated script is written to
    #[arg(short, long, default_value = "./output")]
    pub output_dir: String,

    /// Override the derived `<project>_<version>.f3dat` file name
    #[arg(long)]
    pub output_name: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    /// Force production mode regardless of APP_ENV
    #[arg(long)]
    pub prod: bool,

    /// Validate the session and print a summary without writing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Print the validated configuration as JSON instead of writing a script
    #[arg(long)]
    pub json: bool,

    /// Print the script to stdout instead of writing a file
    #[arg(long)]
    pub stdout: bool,
}

impl CliConfig {
    pub fn app_env(&self) -> Result<AppEnv> {
        if self.prod {
            Ok(AppEnv::Production)
        } else {
            AppEnv::from_env()
        }
    }

    /// Whether stdout carries the JSON preview or the script itself.
    pub fn writes_to_stdout(&self) -> bool {
        self.stdout || self.json
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_path("--session", &self.session)?;
        validation::validate_path("--output-dir", &self.output_dir)?;

        if let Some(name) = &self.output_name {
            validation::validate_file_name("--output-name", name)?;
            validation::validate_file_extension("--output-name", name, &["f3dat"])?;
        }
        Ok(())
    }
}
