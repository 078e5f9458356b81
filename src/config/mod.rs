pub mod cli;
pub mod env;
pub mod session_file;

#[cfg(feature = "cli")]
mod args;

#[cfg(feature = "cli")]
pub use args::CliConfig;
