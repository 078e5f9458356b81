//! Model-construction steps and their parameter sets.

use crate::domain::enums::{
    AoiGeoType, BackfillMaterial, DensificationLevel, GeometryAccuracy, StepKind,
};
use crate::domain::form::{FieldReader, FormFields};
use crate::utils::error::{FieldError, FieldErrorKind};
use crate::utils::text::file_name_from_location;
use serde::Serialize;

pub const MAX_ZONE_SIZE: f64 = 1000.0;
pub const MAX_DENSIFICATION_DISTANCE: f64 = 1000.0;
pub const MAX_STOPING_DEPTH: f64 = 10_000.0;
pub const MAX_MINING_STEPS: i64 = 10_000;

/// Geometry input shared by every construction step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeometrySpec {
    pub(crate) file: String,
    pub(crate) min_zone_size: f64,
    pub(crate) init_zone_size: f64,
    pub(crate) accuracy: GeometryAccuracy,
    pub(crate) densification_distance: f64,
}

impl GeometrySpec {
    fn read(reader: &mut FieldReader<'_>) -> Self {
        let file = reader.required_text("file");
        let file = if file.is_empty() {
            file
        } else {
            file_name_from_location(&file)
        };

        let min_zone_size = reader.positive_number("min_zone_size", MAX_ZONE_SIZE);
        let init_zone_size = reader.positive_number("init_zone_size", MAX_ZONE_SIZE);
        if !reader.has_error_for("min_zone_size")
            && !reader.has_error_for("init_zone_size")
            && min_zone_size > init_zone_size
        {
            let field = reader.path("min_zone_size");
            reader.record(FieldError::invalid(
                field,
                format!(
                    "minimum zone size {} exceeds initial zone size {}",
                    min_zone_size, init_zone_size
                ),
            ));
        }

        Self {
            file,
            min_zone_size,
            init_zone_size,
            accuracy: reader.choice_or("accuracy", GeometryAccuracy::Intermediate),
            densification_distance: reader.number_or(
                "densification_distance",
                0.0,
                0.0,
                MAX_DENSIFICATION_DISTANCE,
            ),
        }
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    pub fn min_zone_size(&self) -> f64 {
        self.min_zone_size
    }

    pub fn init_zone_size(&self) -> f64 {
        self.init_zone_size
    }

    pub fn accuracy(&self) -> GeometryAccuracy {
        self.accuracy
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StopingStep {
    pub(crate) geometry: GeometrySpec,
    /// Metres below ground surface.
    pub(crate) depth: f64,
    pub(crate) mining_steps: u32,
}

impl StopingStep {
    pub fn depth(&self) -> f64 {
        self.depth
    }

    pub fn mining_steps(&self) -> u32 {
        self.mining_steps
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopographyStep {
    pub(crate) geometry: GeometrySpec,
    pub(crate) include_pre_mining: bool,
    pub(crate) include_groundwater: bool,
    pub(crate) phreatic_surface_file: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DevelopmentStep {
    pub(crate) geometry: GeometrySpec,
    pub(crate) densification: DensificationLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AreaOfInterestStep {
    pub(crate) geometry: GeometrySpec,
    pub(crate) geo_type: AoiGeoType,
    pub(crate) zone_edge_length: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoricalMiningStep {
    pub(crate) geometry: GeometrySpec,
    /// `None` leaves the historical voids open.
    pub(crate) backfill: Option<BackfillMaterial>,
}

/// One enabled stage of model construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConstructionStep {
    Stoping(StopingStep),
    Topography(TopographyStep),
    Development(DevelopmentStep),
    AreaOfInterest(AreaOfInterestStep),
    HistoricalMining(HistoricalMiningStep),
}

impl ConstructionStep {
    /// Validate the raw fields of one step. `prefix` is the field path of the
    /// step, e.g. `steps[2].development`.
    pub fn from_form(
        kind: StepKind,
        fields: &FormFields,
        prefix: &str,
    ) -> Result<Self, Vec<FieldError>> {
        let mut reader = FieldReader::new(prefix, fields);
        let geometry = GeometrySpec::read(&mut reader);

        let step = match kind {
            StepKind::Stoping => {
                let depth = reader.positive_number("depth", MAX_STOPING_DEPTH);
                let mining_steps = reader.integer_or("mining_steps", 1, 1, MAX_MINING_STEPS);
                ConstructionStep::Stoping(StopingStep {
                    geometry,
                    depth,
                    mining_steps: u32::try_from(mining_steps).unwrap_or(1),
                })
            }
            StepKind::Topography => {
                let include_pre_mining = reader.bool_or("include_pre_mining", false);
                let include_groundwater = reader.bool_or("include_groundwater", false);
                let phreatic_surface_file = reader
                    .optional_text("phreatic_surface_file")
                    .map(|file| file_name_from_location(&file));
                if include_groundwater && phreatic_surface_file.is_none() {
                    let field = reader.path("phreatic_surface_file");
                    if !reader.errors().iter().any(|e| e.field == field) {
                        reader.record(FieldError::new(field, FieldErrorKind::Missing));
                    }
                }
                ConstructionStep::Topography(TopographyStep {
                    geometry,
                    include_pre_mining,
                    include_groundwater,
                    // 未啟用地下水時不輸出潛水面檔案
                    phreatic_surface_file: phreatic_surface_file.filter(|_| include_groundwater),
                })
            }
            StepKind::Development => ConstructionStep::Development(DevelopmentStep {
                geometry,
                densification: reader.choice_or("densification", DensificationLevel::No),
            }),
            StepKind::AreaOfInterest => {
                let geo_type = reader.choice("geo_type");
                let zone_edge_length = reader.positive_number("zone_edge_length", MAX_ZONE_SIZE);
                ConstructionStep::AreaOfInterest(AreaOfInterestStep {
                    geometry,
                    geo_type,
                    zone_edge_length,
                })
            }
            StepKind::HistoricalMining => {
                ConstructionStep::HistoricalMining(HistoricalMiningStep {
                    geometry,
                    backfill: reader.optional_choice("backfill"),
                })
            }
        };

        reader.finish(step)
    }

    pub fn kind(&self) -> StepKind {
        match self {
            ConstructionStep::Stoping(_) => StepKind::Stoping,
            ConstructionStep::Topography(_) => StepKind::Topography,
            ConstructionStep::Development(_) => StepKind::Development,
            ConstructionStep::AreaOfInterest(_) => StepKind::AreaOfInterest,
            ConstructionStep::HistoricalMining(_) => StepKind::HistoricalMining,
        }
    }

    pub fn geometry(&self) -> &GeometrySpec {
        match self {
            ConstructionStep::Stoping(step) => &step.geometry,
            ConstructionStep::Topography(step) => &step.geometry,
            ConstructionStep::Development(step) => &step.geometry,
            ConstructionStep::AreaOfInterest(step) => &step.geometry,
            ConstructionStep::HistoricalMining(step) => &step.geometry,
        }
    }
}
