//! Draft state of one editing session.
//!
//! A [`Session`] holds whatever has been entered so far, valid or not. Nothing
//! is checked until a record is explicitly checked or the whole session is
//! finalized into a [`ModelConfiguration`].

use crate::domain::enums::{ExportTarget, StepKind};
use crate::domain::form::{FormFields, FormValue};
use crate::domain::model::{check_steps, step_prefix, GlobalSettings, ModelConfiguration, ProjectInfo};
use crate::domain::steps::ConstructionStep;
use crate::utils::error::{FieldError, GenError, Result};

/// A construction step as entered, possibly incomplete.
#[derive(Debug, Clone, PartialEq)]
pub struct StepDraft {
    pub kind: StepKind,
    pub enabled: bool,
    pub fields: FormFields,
}

impl StepDraft {
    pub fn new(kind: StepKind) -> Self {
        Self {
            kind,
            enabled: true,
            fields: FormFields::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    project: FormFields,
    settings: FormFields,
    steps: Vec<StepDraft>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_parts(project: FormFields, settings: FormFields, steps: Vec<StepDraft>) -> Self {
        Self {
            project,
            settings,
            steps,
        }
    }

    pub fn project_fields(&self) -> &FormFields {
        &self.project
    }

    pub fn settings_fields(&self) -> &FormFields {
        &self.settings
    }

    pub fn steps(&self) -> &[StepDraft] {
        &self.steps
    }

    pub fn set_project_field(&mut self, name: &str, value: impl Into<FormValue>) {
        self.project.set(name, value);
    }

    pub fn set_settings_field(&mut self, name: &str, value: impl Into<FormValue>) {
        self.settings.set(name, value);
    }

    pub fn set_export(&mut self, target: ExportTarget, enabled: bool) {
        self.settings.set(target.field_name(), enabled);
    }

    /// Append an enabled, empty step and return its index.
    pub fn add_step(&mut self, kind: StepKind) -> usize {
        self.steps.push(StepDraft::new(kind));
        tracing::debug!("Added {} step at index {}", kind, self.steps.len() - 1);
        self.steps.len() - 1
    }

    pub fn set_step_field(
        &mut self,
        index: usize,
        name: &str,
        value: impl Into<FormValue>,
    ) -> Result<()> {
        self.step_mut(index)?.fields.set(name, value);
        Ok(())
    }

    pub fn clear_step_field(&mut self, index: usize, name: &str) -> Result<Option<FormValue>> {
        Ok(self.step_mut(index)?.fields.unset(name))
    }

    pub fn set_step_enabled(&mut self, index: usize, enabled: bool) -> Result<()> {
        self.step_mut(index)?.enabled = enabled;
        Ok(())
    }

    /// Move the step at `from` so that it ends up at index `to`.
    pub fn move_step(&mut self, from: usize, to: usize) -> Result<()> {
        self.ensure_index(from)?;
        self.ensure_index(to)?;
        let step = self.steps.remove(from);
        self.steps.insert(to, step);
        Ok(())
    }

    pub fn remove_step(&mut self, index: usize) -> Result<StepDraft> {
        self.ensure_index(index)?;
        Ok(self.steps.remove(index))
    }

    pub fn check_project(&self) -> Result<()> {
        ProjectInfo::read(&self.project, "project")
            .map(|_| ())
            .map_err(|errors| GenError::InvalidFields { errors })
    }

    pub fn check_settings(&self) -> Result<()> {
        GlobalSettings::read(&self.settings, "settings")
            .map(|_| ())
            .map_err(|errors| GenError::InvalidFields { errors })
    }

    /// Validate one step's own parameters, whether or not it is enabled.
    pub fn check_step(&self, index: usize) -> Result<()> {
        self.ensure_index(index)?;
        let draft = &self.steps[index];
        ConstructionStep::from_form(draft.kind, &draft.fields, &step_prefix(index, draft.kind))
            .map(|_| ())
            .map_err(|errors| GenError::InvalidFields { errors })
    }

    /// Validate everything and build the configuration of the enabled steps.
    ///
    /// Every failing field is reported, not only the first one.
    pub fn finalize(&self) -> Result<ModelConfiguration> {
        let mut errors: Vec<FieldError> = Vec::new();

        let project = ProjectInfo::read(&self.project, "project")
            .map_err(|e| errors.extend(e))
            .ok();
        let settings = GlobalSettings::read(&self.settings, "settings")
            .map_err(|e| errors.extend(e))
            .ok();

        let mut steps = Vec::new();
        for (index, draft) in self.steps.iter().enumerate() {
            if !draft.enabled {
                continue;
            }
            let prefix = step_prefix(index, draft.kind);
            match ConstructionStep::from_form(draft.kind, &draft.fields, &prefix) {
                Ok(step) => steps.push((prefix, step)),
                Err(step_errors) => errors.extend(step_errors),
            }
        }

        // 設定可解析時，已通過的步驟也要做跨步驟檢查，一次列出全部錯誤
        if let Some(settings) = &settings {
            errors.extend(check_steps(settings, &steps));
        }

        let (Some(project), Some(settings), true) = (project, settings, errors.is_empty()) else {
            tracing::debug!("Session is incomplete: {} field error(s)", errors.len());
            return Err(GenError::IncompleteConfiguration { errors });
        };

        ModelConfiguration::assemble(project, settings, steps).map_err(|errors| {
            tracing::debug!("Session failed cross-step checks: {} error(s)", errors.len());
            GenError::IncompleteConfiguration { errors }
        })
    }

    fn ensure_index(&self, index: usize) -> Result<()> {
        if index < self.steps.len() {
            Ok(())
        } else {
            Err(GenError::StepIndexError {
                index,
                len: self.steps.len(),
            })
        }
    }

    fn step_mut(&mut self, index: usize) -> Result<&mut StepDraft> {
        let len = self.steps.len();
        self.steps
            .get_mut(index)
            .ok_or(GenError::StepIndexError { index, len })
    }
}
