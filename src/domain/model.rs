use crate::domain::enums::{
    ExportTarget, FlacVersion, GeometryFormat, OptionSet, OutputFormat, StepKind,
};
use crate::domain::form::{FieldReader, FormFields};
use crate::domain::steps::ConstructionStep;
use crate::utils::error::{FieldError, GenError, Result};
use crate::utils::validation::{self, Validate};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

pub const MAX_PROJECT_NAME_CHARS: usize = 120;
pub const OCTREE_LEVELS: u32 = 6;
pub const DEFAULT_ZONE_SIZE_LEVEL: u8 = 3;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectInfo {
    pub(crate) name: String,
    pub(crate) author: String,
    pub(crate) description: String,
    pub(crate) company: Option<String>,
}

impl ProjectInfo {
    pub fn from_form(fields: &FormFields) -> Result<Self> {
        Self::read(fields, "project").map_err(|errors| GenError::InvalidFields { errors })
    }

    pub(crate) fn read(fields: &FormFields, prefix: &str) -> std::result::Result<Self, Vec<FieldError>> {
        let mut reader = FieldReader::new(prefix, fields);

        let name = reader.required_text("name");
        if !name.is_empty() {
            let field = reader.path("name");
            reader.check(validation::validate_max_length(
                &field,
                &name,
                MAX_PROJECT_NAME_CHARS,
            ));
        }

        let project = ProjectInfo {
            name,
            author: reader.required_text("author"),
            description: reader.optional_text("description").unwrap_or_default(),
            company: reader.optional_text("company"),
        };
        reader.finish(project)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn company(&self) -> Option<&str> {
        self.company.as_deref()
    }
}

/// Zone size used during the initial meshing iteration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneSizeMultiplier {
    /// `farfield / 2^level`
    Predefined { level: u8 },
    Custom { size: f64 },
}

impl ZoneSizeMultiplier {
    pub fn size(&self, farfield_zone_size: f64) -> f64 {
        match self {
            ZoneSizeMultiplier::Predefined { level } => {
                farfield_zone_size / f64::from(2_u32.pow(u32::from(*level)))
            }
            ZoneSizeMultiplier::Custom { size } => *size,
        }
    }
}

/// Octree zone sizes available for a far-field zone size, largest first.
pub fn octree_sizes(farfield_zone_size: f64) -> Vec<f64> {
    (0..OCTREE_LEVELS)
        .map(|level| farfield_zone_size / f64::from(2_u32.pow(level)))
        .collect()
}

pub fn is_octree_size(value: f64, farfield_zone_size: f64) -> bool {
    octree_sizes(farfield_zone_size)
        .iter()
        .any(|size| (size - value).abs() <= 1e-9 * size.max(1.0))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GlobalSettings {
    pub(crate) flac_version: FlacVersion,
    pub(crate) output_format: OutputFormat,
    pub(crate) geometry_format: GeometryFormat,
    pub(crate) exports: BTreeSet<ExportTarget>,
    pub(crate) target_zones: u64,
    pub(crate) farfield_zone_size: f64,
    pub(crate) model_boundary_offset: f64,
    pub(crate) zone_size: ZoneSizeMultiplier,
    pub(crate) mesh_file: Option<String>,
    pub(crate) map3d_file: Option<String>,
}

impl GlobalSettings {
    pub fn from_form(fields: &FormFields) -> Result<Self> {
        Self::read(fields, "settings").map_err(|errors| GenError::InvalidFields { errors })
    }

    pub(crate) fn read(fields: &FormFields, prefix: &str) -> std::result::Result<Self, Vec<FieldError>> {
        let mut reader = FieldReader::new(prefix, fields);

        let flac_version = reader.choice("flac_version");
        let output_format = reader.choice("output_format");
        let geometry_format = reader.choice_or("geometry_format", GeometryFormat::Stl);

        let exports = ExportTarget::ALL
            .iter()
            .copied()
            .filter(|target| reader.bool_or(target.field_name(), false))
            .collect();

        let target_zones = reader.integer_or("target_zones", 2_000_000, 10_000, 50_000_000);
        let farfield_zone_size = if reader.is_present("farfield_zone_size") {
            reader.positive_number("farfield_zone_size", 1000.0)
        } else {
            48.0
        };
        let model_boundary_offset = reader.number_or("model_boundary_offset", 400.0, 0.0, 100_000.0);

        let zone_size = match reader.optional_positive_number("custom_zone_size", farfield_zone_size) {
            Some(size) => ZoneSizeMultiplier::Custom { size },
            None => {
                let level = reader.integer_or(
                    "zone_size_level",
                    i64::from(DEFAULT_ZONE_SIZE_LEVEL),
                    0,
                    i64::from(OCTREE_LEVELS - 1),
                );
                ZoneSizeMultiplier::Predefined {
                    level: u8::try_from(level).unwrap_or(DEFAULT_ZONE_SIZE_LEVEL),
                }
            }
        };

        let mesh_file = Self::read_import(&mut reader, "import_mesh", "mesh_file");
        let map3d_file = Self::read_import(&mut reader, "import_map3d", "map3d_file");

        let settings = GlobalSettings {
            flac_version,
            output_format,
            geometry_format,
            exports,
            target_zones: u64::try_from(target_zones).unwrap_or_default(),
            farfield_zone_size,
            model_boundary_offset,
            zone_size,
            mesh_file,
            map3d_file,
        };
        reader.finish(settings)
    }

    /// An import toggle with the file it needs; the file is ignored while the toggle is off.
    fn read_import(reader: &mut FieldReader<'_>, toggle: &str, file_field: &str) -> Option<String> {
        if !reader.bool_or(toggle, false) {
            return None;
        }
        let file = reader.optional_text(file_field);
        let field = reader.path(file_field);
        if let Err(error) = validation::validate_required(&field, &file) {
            if !reader.has_error_for(file_field) {
                reader.record(error);
            }
        }
        file
    }

    pub fn flac_version(&self) -> FlacVersion {
        self.flac_version
    }

    pub fn output_format(&self) -> OutputFormat {
        self.output_format
    }

    pub fn geometry_format(&self) -> GeometryFormat {
        self.geometry_format
    }

    pub fn exports(&self) -> &BTreeSet<ExportTarget> {
        &self.exports
    }

    pub fn farfield_zone_size(&self) -> f64 {
        self.farfield_zone_size
    }

    pub fn zone_size(&self) -> f64 {
        self.zone_size.size(self.farfield_zone_size)
    }
}

pub fn step_prefix(index: usize, kind: StepKind) -> String {
    format!("steps[{}].{}", index, kind.stored_value())
}

/// A complete, validated configuration. Holding one means every enabled step
/// and every required project and settings field passed validation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelConfiguration {
    project: ProjectInfo,
    settings: GlobalSettings,
    steps: Vec<ConstructionStep>,
}

impl ModelConfiguration {
    pub fn new(
        project: ProjectInfo,
        settings: GlobalSettings,
        steps: Vec<ConstructionStep>,
    ) -> Result<Self> {
        let labelled = steps
            .into_iter()
            .enumerate()
            .map(|(index, step)| (step_prefix(index, step.kind()), step))
            .collect();
        Self::assemble(project, settings, labelled)
            .map_err(|errors| GenError::InvalidFields { errors })
    }

    /// Run the cross-record checks over steps labelled with their field paths.
    pub(crate) fn assemble(
        project: ProjectInfo,
        settings: GlobalSettings,
        steps: Vec<(String, ConstructionStep)>,
    ) -> std::result::Result<Self, Vec<FieldError>> {
        let errors = check_steps(&settings, &steps);
        if !errors.is_empty() {
            return Err(errors);
        }

        tracing::debug!(
            "Assembled configuration '{}' with {} construction step(s)",
            project.name,
            steps.len()
        );

        Ok(Self {
            project,
            settings,
            steps: steps.into_iter().map(|(_, step)| step).collect(),
        })
    }

    pub fn project(&self) -> &ProjectInfo {
        &self.project
    }

    pub fn settings(&self) -> &GlobalSettings {
        &self.settings
    }

    /// Enabled steps in the order they were added.
    pub fn steps(&self) -> &[ConstructionStep] {
        &self.steps
    }

    pub fn includes(&self, kind: StepKind) -> bool {
        self.steps.iter().any(|step| step.kind() == kind)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Validate for ModelConfiguration {
    fn validate(&self) -> Result<()> {
        let labelled: Vec<(String, ConstructionStep)> = self
            .steps
            .iter()
            .enumerate()
            .map(|(index, step)| (step_prefix(index, step.kind()), step.clone()))
            .collect();
        let errors = check_steps(&self.settings, &labelled);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(GenError::InvalidFields { errors })
        }
    }
}

pub(crate) fn check_steps(
    settings: &GlobalSettings,
    steps: &[(String, ConstructionStep)],
) -> Vec<FieldError> {
    let mut errors = Vec::new();
    let mut seen: BTreeMap<StepKind, &str> = BTreeMap::new();
    let extension = settings.geometry_format.extension();

    for (prefix, step) in steps {
        let kind = step.kind();
        if let Some(first) = seen.get(&kind) {
            errors.push(FieldError::invalid(
                format!("{}.kind", prefix),
                format!("{} is already configured at {}", kind.label(), first),
            ));
        } else {
            seen.insert(kind, prefix.as_str());
        }

        let geometry = step.geometry();
        if let Err(error) = validation::validate_file_extension(
            &format!("{}.file", prefix),
            &geometry.file,
            &[extension],
        ) {
            errors.push(error);
        }

        if let ConstructionStep::Topography(topo) = step {
            if let Some(surface) = &topo.phreatic_surface_file {
                if let Err(error) = validation::validate_file_extension(
                    &format!("{}.phreatic_surface_file", prefix),
                    surface,
                    &[extension],
                ) {
                    errors.push(error);
                }
            }
        }

        for (name, size) in [
            ("min_zone_size", geometry.min_zone_size),
            ("init_zone_size", geometry.init_zone_size),
        ] {
            if !is_octree_size(size, settings.farfield_zone_size) {
                errors.push(FieldError::invalid(
                    format!("{}.{}", prefix, name),
                    format!(
                        "{} is not an octree zone size for far-field size {} (allowed: {})",
                        size,
                        settings.farfield_zone_size,
                        octree_sizes(settings.farfield_zone_size)
                            .iter()
                            .map(|s| s.to_string())
                            .collect::<Vec<_>>()
                            .join(", ")
                    ),
                ));
            }
        }
    }

    errors
}
