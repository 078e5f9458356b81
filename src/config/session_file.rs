//! Session checkpoint files.
//!
//! A session file is the saved state of an editing session: raw form values
//! for the project, the global settings and each construction step. Values are
//! kept raw so an incomplete session can be saved and reloaded.
//!
//! ```toml
//! [project]
//! name = "North Block"
//!
//! [settings]
//! flac_version = "7.0"
//!
//! [[steps]]
//! kind = "stoping"
//! depth = 50
//! ```

use crate::domain::enums::{OptionSet, StepKind};
use crate::domain::form::FormFields;
use crate::domain::session::{Session, StepDraft};
use crate::utils::error::{FieldError, FieldErrorKind, GenError, Result};
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;

static ENV_VAR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").unwrap());

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionFile {
    #[serde(default)]
    pub project: FormFields,
    #[serde(default)]
    pub settings: FormFields,
    #[serde(default)]
    pub steps: Vec<StepEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepEntry {
    pub kind: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(flatten)]
    pub fields: FormFields,
}

fn default_enabled() -> bool {
    true
}

impl SessionFile {
    /// 從 TOML 檔案載入工作階段
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = Self::substitute_env_vars(content);

        toml::from_str(&processed).map_err(|e| GenError::SessionFileError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${MODEL_DIR})，未設定者保留原樣
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR
            .replace_all(content, |caps: &Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    /// Snapshot a session, including disabled and unfinished steps.
    pub fn from_session(session: &Session) -> Self {
        Self {
            project: session.project_fields().clone(),
            settings: session.settings_fields().clone(),
            steps: session
                .steps()
                .iter()
                .map(|draft| StepEntry {
                    kind: draft.kind.stored_value().to_string(),
                    enabled: draft.enabled,
                    fields: draft.fields.clone(),
                })
                .collect(),
        }
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| GenError::SessionFileError {
            message: format!("TOML serialization error: {}", e),
        })
    }

    /// Rebuild the draft session. Only step kinds are checked here; field values
    /// are left for [`Session::finalize`].
    pub fn into_session(self) -> Result<Session> {
        let mut errors = Vec::new();
        let mut drafts = Vec::with_capacity(self.steps.len());

        for (index, entry) in self.steps.into_iter().enumerate() {
            match StepKind::parse_option(&entry.kind) {
                Some(kind) => drafts.push(StepDraft {
                    kind,
                    enabled: entry.enabled,
                    fields: entry.fields,
                }),
                None => errors.push(FieldError::new(
                    format!("steps[{}].kind", index),
                    FieldErrorKind::NotInDomain {
                        value: entry.kind,
                        allowed: StepKind::ALL
                            .iter()
                            .map(|kind| kind.stored_value().to_string())
                            .collect(),
                    },
                )),
            }
        }

        if !errors.is_empty() {
            return Err(GenError::InvalidFields { errors });
        }

        tracing::debug!("Loaded session with {} step draft(s)", drafts.len());
        Ok(Session::from_parts(self.project, self.settings, drafts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::form::FormValue;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SESSION: &str = r#"
[project]
name = "North Block"
author = "Geotech Team"

[settings]
flac_version = 7.0
output_format = "standard"
paraview = true

[[steps]]
kind = "stoping"
file = "stopes.stl"
min_zone_size = 3
init_zone_size = 6
depth = 50

[[steps]]
kind = "Topography"
enabled = false
"#;

    #[test]
    fn test_parse_session_file() {
        let file = SessionFile::from_toml_str(SESSION).unwrap();

        assert_eq!(file.project.get("name"), Some(&FormValue::Text("North Block".into())));
        assert_eq!(file.settings.get("flac_version"), Some(&FormValue::Float(7.0)));
        assert_eq!(file.steps.len(), 2);
        assert_eq!(file.steps[0].fields.get("depth"), Some(&FormValue::Integer(50)));
        assert!(file.steps[0].fields.get("kind").is_none());
        assert!(!file.steps[1].enabled);
    }

    #[test]
    fn test_into_session_and_finalize() {
        let session = SessionFile::from_toml_str(SESSION)
            .unwrap()
            .into_session()
            .unwrap();

        assert_eq!(session.steps()[1].kind, StepKind::Topography);
        let config = session.finalize().unwrap();
        assert_eq!(config.steps().len(), 1);
    }

    #[test]
    fn test_unknown_step_kind() {
        let content = "[[steps]]\nkind = \"blasting\"\n";
        let error = SessionFile::from_toml_str(content)
            .unwrap()
            .into_session()
            .unwrap_err();
        assert_eq!(error.field_errors()[0].field, "steps[0].kind");
    }

    #[test]
    fn test_invalid_toml_is_session_file_error() {
        let error = SessionFile::from_toml_str("[project\nname = ").unwrap_err();
        assert!(matches!(error, GenError::SessionFileError { .. }));
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("F3DAT_TEST_GEOMETRY_DIR", "/data/geometry");

        let content = "[[steps]]\nkind = \"development\"\nfile = \"${F3DAT_TEST_GEOMETRY_DIR}/dev.stl\"\nnote = \"${F3DAT_TEST_UNSET_VAR}\"\n";
        let file = SessionFile::from_toml_str(content).unwrap();
        assert_eq!(
            file.steps[0].fields.get("file"),
            Some(&FormValue::Text("/data/geometry/dev.stl".into()))
        );
        assert_eq!(
            file.steps[0].fields.get("note"),
            Some(&FormValue::Text("${F3DAT_TEST_UNSET_VAR}".into()))
        );

        std::env::remove_var("F3DAT_TEST_GEOMETRY_DIR");
    }

    #[test]
    fn test_save_and_reload_partial_session() {
        let mut session = Session::new();
        session.set_project_field("name", "Draft");
        let index = session.add_step(StepKind::AreaOfInterest);
        session.set_step_field(index, "geo_type", "Pit Slope").unwrap();
        session.set_step_enabled(index, false).unwrap();

        let text = SessionFile::from_session(&session).to_toml_string().unwrap();
        let reloaded = SessionFile::from_toml_str(&text)
            .unwrap()
            .into_session()
            .unwrap();
        assert_eq!(reloaded, session);
    }

    #[test]
    fn test_session_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(SESSION.as_bytes()).unwrap();

        let file = SessionFile::from_file(temp_file.path()).unwrap();
        assert_eq!(file.steps[0].kind, "stoping");
    }
}
