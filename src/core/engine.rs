use crate::core::generator;
use crate::domain::model::ModelConfiguration;
use crate::domain::ports::Storage;
use crate::domain::session::Session;
use crate::utils::error::Result;
use crate::utils::text::make_f3dat_filename;
use crate::utils::validation::Validate;
use serde::Serialize;

/// A rendered script and the name it was (or would be) stored under.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedScript {
    pub file_name: String,
    pub contents: String,
}

/// Derived `<project>_<version>.f3dat` name for a configuration.
pub fn output_file_name(config: &ModelConfiguration) -> String {
    make_f3dat_filename(
        config.project().name(),
        config.settings().flac_version().file_tag(),
    )
}

pub struct GenerationEngine<S: Storage> {
    storage: S,
    output_name: Option<String>,
}

impl<S: Storage> GenerationEngine<S> {
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            output_name: None,
        }
    }

    pub fn with_output_name(mut self, name: impl Into<String>) -> Self {
        self.output_name = Some(name.into());
        self
    }

    /// Validate the session, render it and write the script. Nothing is
    /// written when validation fails.
    pub async fn run(&self, session: &Session) -> Result<GeneratedScript> {
        tracing::info!("Validating session ({} step draft(s))", session.steps().len());
        let config = session.finalize()?;
        tracing::info!(
            "Configuration '{}' is complete with {} enabled step(s)",
            config.project().name(),
            config.steps().len()
        );

        self.generate(&config).await
    }

    pub async fn generate(&self, config: &ModelConfiguration) -> Result<GeneratedScript> {
        debug_assert!(
            config.validate().is_ok(),
            "ModelConfiguration failed its cross-step checks"
        );
        let script = self.render(config);

        self.storage
            .write_file(&script.file_name, script.contents.as_bytes())
            .await?;
        tracing::info!("Script written to {}", script.file_name);

        Ok(script)
    }

    /// Render without touching storage.
    pub fn render(&self, config: &ModelConfiguration) -> GeneratedScript {
        let file_name = self
            .output_name
            .clone()
            .unwrap_or_else(|| output_file_name(config));

        GeneratedScript {
            file_name,
            contents: generator::render(config),
        }
    }
}
