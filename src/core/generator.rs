//! Renders a validated [`ModelConfiguration`] into a FLAC3D `.f3dat` script.
//!
//! The output is a pure function of the configuration. Sections appear in a
//! fixed order: project information, global settings, the model-construction
//! summary, one block per enabled step in sequence order, then one block per
//! selected export target.

use crate::core::script::ScriptBuilder;
use crate::domain::enums::{ExportTarget, OptionSet, StepKind};
use crate::domain::model::{GlobalSettings, ModelConfiguration, ProjectInfo, ZoneSizeMultiplier};
use crate::domain::steps::{ConstructionStep, GeometrySpec};
use crate::utils::text::{resolve_placeholders, sanitize_identifier};
use std::collections::BTreeMap;

const EXPORT_DIR_TEMPLATE: &str = "<project>/<target>";

pub fn render(config: &ModelConfiguration) -> String {
    let mut script = ScriptBuilder::new(config.settings().output_format());
    script.comment(&format!("Generated by f3dat-gen {}", env!("CARGO_PKG_VERSION")));

    write_project(&mut script, config.project());
    write_settings(&mut script, config.settings());
    write_construction_summary(&mut script, config);

    for (position, step) in config.steps().iter().enumerate() {
        write_step(&mut script, position + 1, step);
    }

    for target in config.settings().exports() {
        write_export(&mut script, *target, config.project());
    }

    tracing::debug!(
        "Rendered {} step block(s) and {} export block(s)",
        config.steps().len(),
        config.settings().exports().len()
    );

    script.build()
}

fn write_project(script: &mut ScriptBuilder, project: &ProjectInfo) {
    script.section_header("Project Information");
    script.set_text("Project_Name", project.name());
    script.set_text("Author", project.author());
    script.set_text("Description", project.description());
    if let Some(company) = project.company() {
        script.set_text("Company", company);
    }
    script.newline();
}

fn write_settings(script: &mut ScriptBuilder, settings: &GlobalSettings) {
    script.section_header("Global Settings");
    script.set_option("FLAC_Version", settings.flac_version());
    script.set_option("Output_Format", settings.output_format());
    script.set_option("Geometry_Format", settings.geometry_format());
    script.newline();

    script.subheading("Octree Mesh");
    script.set_integer("Target_Zones", settings.target_zones);
    script.set_number("Farfield_Zone_Size", settings.farfield_zone_size());
    script.set_number("Model_Boundary_Offset", settings.model_boundary_offset);
    match settings.zone_size {
        ZoneSizeMultiplier::Predefined { level } => {
            script.set_bool("Custom_Zone_Size", false);
            script.set_integer("Zone_Size_Level", level);
        }
        ZoneSizeMultiplier::Custom { .. } => script.set_bool("Custom_Zone_Size", true),
    }
    script.set_number("Zone_Size", settings.zone_size());
    script.newline();

    script.subheading("Imports");
    script.set_bool("Import_Mesh", settings.mesh_file.is_some());
    if let Some(file) = &settings.mesh_file {
        script.set_text("Mesh_File", file);
    }
    script.set_bool("Import_Map3D", settings.map3d_file.is_some());
    if let Some(file) = &settings.map3d_file {
        script.set_text("Map3D_File", file);
    }
    script.newline();
}

fn write_construction_summary(script: &mut ScriptBuilder, config: &ModelConfiguration) {
    script.section_header("Model Construction");
    script.set_integer("Construction_Steps", config.steps().len() as u64);
    for kind in StepKind::ALL {
        script.set_bool(&format!("Include_{}", kind.key_prefix()), config.includes(*kind));
    }
    script.newline();
}

fn write_geometry(script: &mut ScriptBuilder, prefix: &str, geometry: &GeometrySpec) {
    script.set_text(&format!("{}_File", prefix), geometry.file());
    script.set_number(&format!("{}_Min_Zone_Size", prefix), geometry.min_zone_size());
    script.set_number(&format!("{}_Init_Zone_Size", prefix), geometry.init_zone_size());
    script.set_option(&format!("{}_Geometry_Accuracy", prefix), geometry.accuracy());
    script.set_number(
        &format!("{}_Densification_Distance", prefix),
        geometry.densification_distance,
    );
}

fn write_step(script: &mut ScriptBuilder, position: usize, step: &ConstructionStep) {
    let kind = step.kind();
    let prefix = kind.key_prefix();
    let key = |name: &str| format!("{}_{}", prefix, name);

    script.section_header(&format!("Step {}: {}", position, kind.label()));
    script.set_integer(&key("Sequence"), position as u64);
    write_geometry(script, prefix, step.geometry());

    match step {
        ConstructionStep::Stoping(stoping) => {
            script.set_number(&key("Depth"), stoping.depth());
            script.set_integer(&key("Mining_Steps"), stoping.mining_steps());
        }
        ConstructionStep::Topography(topo) => {
            script.set_bool(&key("Include_Pre_Mining"), topo.include_pre_mining);
            script.set_bool(&key("Include_Groundwater"), topo.include_groundwater);
            if let Some(file) = &topo.phreatic_surface_file {
                script.set_text(&key("Phreatic_Surface_File"), file);
            }
        }
        ConstructionStep::Development(dev) => {
            script.set_option(&key("Densification"), dev.densification);
            script.set_option_index(&key("Densification_Level"), dev.densification);
        }
        ConstructionStep::AreaOfInterest(aoi) => {
            script.set_option(&key("Geo_Type"), aoi.geo_type);
            script.set_option_index(&key("Geo_Type_Index"), aoi.geo_type);
            script.set_number(&key("Zone_Edge_Length"), aoi.zone_edge_length);
        }
        ConstructionStep::HistoricalMining(hist) => {
            script.set_bool(&key("Backfill"), hist.backfill.is_some());
            if let Some(material) = hist.backfill {
                script.set_option(&key("Backfill_Material"), material);
            }
        }
    }
    script.newline();
}

fn write_export(script: &mut ScriptBuilder, target: ExportTarget, project: &ProjectInfo) {
    let replacements = BTreeMap::from([
        ("project", sanitize_identifier(project.name())),
        ("target", target.label().to_string()),
    ]);

    script.section_header(&format!("Export: {}", target.label()));
    script.set_bool(&format!("Export_{}", target.label()), true);
    script.set_text(
        &format!("{}_Output_Dir", target.label()),
        &resolve_placeholders(EXPORT_DIR_TEMPLATE, &replacements),
    );
    script.newline();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::session::Session;

    fn session() -> Session {
        let mut session = Session::new();
        session.set_project_field("name", "Deep Stopes");
        session.set_project_field("author", "Mine Planning");
        session.set_settings_field("flac_version", "7.0");
        session.set_settings_field("output_format", "standard");

        let stoping = session.add_step(StepKind::Stoping);
        session.set_step_field(stoping, "file", "stopes.stl").unwrap();
        session.set_step_field(stoping, "min_zone_size", 3.0).unwrap();
        session.set_step_field(stoping, "init_zone_size", 6.0).unwrap();
        session.set_step_field(stoping, "depth", 50_i64).unwrap();
        session
    }

    fn add_development(session: &mut Session) {
        let dev = session.add_step(StepKind::Development);
        session.set_step_field(dev, "file", "drives.stl").unwrap();
        session.set_step_field(dev, "min_zone_size", 1.5).unwrap();
        session.set_step_field(dev, "init_zone_size", 3.0).unwrap();
        session.set_step_field(dev, "densification", "Intermediate Densification").unwrap();
    }

    fn render_session(session: &Session) -> String {
        render(&session.finalize().unwrap())
    }

    #[test]
    fn test_single_stoping_step_example() {
        let output = render_session(&session());

        assert!(output.contains("fish set @FLAC_Version= '7.0'\n"));
        assert!(output.contains("fish set @Output_Format= 'Standard'\n"));
        assert_eq!(output.matches(";==== Step ").count(), 1);
        assert!(output.contains(";==== Step 1: Stoping\n"));
        assert!(output.contains("fish set @Stoping_Depth= 50\n"));
        assert!(output.contains("fish set @Include_Stoping= yes\n"));
        assert!(output.contains("fish set @Include_Topography= no\n"));
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let mut session = session();
        add_development(&mut session);
        session.set_export(ExportTarget::Gem4d, true);

        let config = session.finalize().unwrap();
        assert_eq!(render(&config), render(&config));
    }

    #[test]
    fn test_step_order_follows_sequence() {
        let mut session = session();
        add_development(&mut session);
        let forward = render_session(&session);

        session.move_step(1, 0).unwrap();
        let reversed = render_session(&session);

        let stoping = |s: &str| s.find("@Stoping_File").unwrap();
        let development = |s: &str| s.find("@Development_File").unwrap();
        assert!(stoping(&forward) < development(&forward));
        assert!(development(&reversed) < stoping(&reversed));
        assert!(reversed.contains(";==== Step 1: Development\n"));
    }

    #[test]
    fn test_export_blocks_are_independent_of_toggle_order() {
        let mut first = session();
        first.set_export(ExportTarget::Mxrap, true);
        first.set_export(ExportTarget::ParaView, true);

        let mut second = session();
        second.set_export(ExportTarget::ParaView, true);
        second.set_export(ExportTarget::Mxrap, true);

        let output = render_session(&first);
        assert_eq!(output, render_session(&second));
        assert_eq!(output.matches(";==== Export: ").count(), 2);
        assert!(output.contains("fish set @mXrap_Output_Dir= 'Deep_Stopes/mXrap'\n"));
        assert!(output.contains("fish set @Export_ParaView= yes\n"));
        assert!(output.find("Export: mXrap").unwrap() < output.find("Export: ParaView").unwrap());
    }

    #[test]
    fn test_toggling_export_only_adds_its_own_block() {
        let mut session = session();
        let without = render_session(&session);

        session.set_export(ExportTarget::Gem4d, true);
        let with = render_session(&session);

        assert!(with.starts_with(&without));
        let added = &with[without.len()..];
        assert!(added.starts_with(";==============================\n;==== Export: GEM4D\n"));
        assert_eq!(added.matches("fish set").count(), 2);
    }

    #[test]
    fn test_text_fields_are_sanitized() {
        let mut session = session();
        session.set_project_field("description", "North 'A'; test\nsecond line");
        let output = render_session(&session);
        assert!(output.contains("fish set @Description= 'North A test second line'\n"));
    }

    #[test]
    fn test_compact_format_has_no_blank_lines() {
        let mut session = session();
        session.set_settings_field("output_format", "compact");
        let output = render_session(&session);

        assert!(!output.contains("\n\n"));
        assert!(!output.contains(";=============================="));
        assert!(output.contains(";==== Step 1: Stoping\nfish set @Stoping_Sequence= 1\n"));
    }

    #[test]
    fn test_every_step_kind_renders_its_parameters() {
        let mut session = session();
        add_development(&mut session);

        let topo = session.add_step(StepKind::Topography);
        session.set_step_field(topo, "file", "surface.stl").unwrap();
        session.set_step_field(topo, "min_zone_size", 12.0).unwrap();
        session.set_step_field(topo, "init_zone_size", 24.0).unwrap();
        session.set_step_field(topo, "include_groundwater", true).unwrap();
        session.set_step_field(topo, "phreatic_surface_file", "water.stl").unwrap();

        let aoi = session.add_step(StepKind::AreaOfInterest);
        session.set_step_field(aoi, "file", "aoi.stl").unwrap();
        session.set_step_field(aoi, "min_zone_size", 3.0).unwrap();
        session.set_step_field(aoi, "init_zone_size", 3.0).unwrap();
        session.set_step_field(aoi, "geo_type", "Pit Slope").unwrap();
        session.set_step_field(aoi, "zone_edge_length", 2.5).unwrap();

        let hist = session.add_step(StepKind::HistoricalMining);
        session.set_step_field(hist, "file", "old.stl").unwrap();
        session.set_step_field(hist, "min_zone_size", 6.0).unwrap();
        session.set_step_field(hist, "init_zone_size", 6.0).unwrap();
        session.set_step_field(hist, "backfill", "elastic").unwrap();

        let output = render_session(&session);
        for line in [
            "fish set @Construction_Steps= 5",
            "fish set @Development_Densification= 'Intermediate Densification'",
            "fish set @Development_Densification_Level= 3",
            "fish set @Topography_Include_Groundwater= yes",
            "fish set @Topography_Phreatic_Surface_File= 'water.stl'",
            "fish set @Area_of_Interest_Geo_Type= 'Pit Slope'",
            "fish set @Area_of_Interest_Zone_Edge_Length= 2.5",
            "fish set @Historical_Mining_Backfill= yes",
            "fish set @Historical_Mining_Backfill_Material= 'Elastic'",
            "fish set @Include_Historical_Mining= yes",
        ] {
            assert!(output.contains(line), "missing line: {}", line);
        }
    }
}
