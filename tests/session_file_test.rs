use anyhow::Result;
use f3dat_gen::domain::enums::{FlacVersion, OptionSet, OutputFormat};
use f3dat_gen::{GenError, GenerationEngine, LocalStorage, SessionFile, StepKind};
use std::io::Write;
use tempfile::{NamedTempFile, TempDir};

const DEMO_SESSION: &str = include_str!("../demos/session.toml");

#[tokio::test]
async fn test_demo_session_generates_script() -> Result<()> {
    std::env::set_var("GEOMETRY_DIR", "/srv/geometry");

    let session = SessionFile::from_toml_str(DEMO_SESSION)?.into_session()?;
    assert_eq!(session.steps().len(), 4);
    assert_eq!(session.steps()[3].kind, StepKind::HistoricalMining);

    let model = session.finalize()?;
    let kinds: Vec<StepKind> = model.steps().iter().map(|s| s.kind()).collect();
    assert_eq!(
        kinds,
        vec![StepKind::Topography, StepKind::Stoping, StepKind::Development]
    );

    let temp_dir = TempDir::new()?;
    let engine = GenerationEngine::new(LocalStorage::new(temp_dir.path().to_string_lossy()));
    let script = engine.generate(&model).await?;

    assert_eq!(script.file_name, "North_Block_Expansion_7_0.f3dat");
    assert!(script.contents.contains("fish set @Topography_File= 'topography.stl'"));
    assert!(script.contents.contains("fish set @Stoping_File= 'stopes.stl'"));
    assert!(script.contents.contains("fish set @Stoping_Geometry_Accuracy= 'Maximum'"));
    assert!(script.contents.contains("fish set @Company= 'Cavroc'"));
    assert!(!script.contents.contains("Historical_Mining_File"));

    let topography = script.contents.find("Step 1: Topography").unwrap();
    let stoping = script.contents.find("Step 2: Stoping").unwrap();
    assert!(topography < stoping);

    std::env::remove_var("GEOMETRY_DIR");
    Ok(())
}

#[test]
fn test_every_version_and_format_combination_is_accepted() -> Result<()> {
    for version in FlacVersion::ALL {
        for format in OutputFormat::ALL {
            let content = format!(
                "[project]\nname = \"P\"\nauthor = \"A\"\n\n[settings]\nflac_version = \"{}\"\noutput_format = \"{}\"\n",
                version.label(),
                format.stored_value()
            );
            let model = SessionFile::from_toml_str(&content)?
                .into_session()?
                .finalize()?;
            assert_eq!(model.settings().flac_version(), *version);
            assert_eq!(model.settings().output_format(), *format);
        }
    }
    Ok(())
}

#[test]
fn test_out_of_domain_values_name_their_field() -> Result<()> {
    let content = r#"
[project]
name = "P"
author = "A"

[settings]
flac_version = "6.0"
output_format = "standard"

[[steps]]
kind = "development"
file = "d.stl"
min_zone_size = 6
init_zone_size = 6
densification = "Extreme"
"#;
    let error = SessionFile::from_toml_str(content)?
        .into_session()?
        .finalize()
        .unwrap_err();

    let fields: Vec<&str> = error.field_errors().iter().map(|e| e.field.as_str()).collect();
    assert_eq!(
        fields,
        vec!["settings.flac_version", "steps[0].development.densification"]
    );
    assert!(error.user_friendly_message().contains("Extreme"));
    Ok(())
}

#[test]
fn test_json_preview_of_loaded_session() -> Result<()> {
    let mut temp_file = NamedTempFile::new()?;
    temp_file.write_all(
        b"[project]\nname = \"P\"\nauthor = \"A\"\n\n[settings]\nflac_version = 5\noutput_format = \"compact\"\ngem4d = \"yes\"\n",
    )?;

    let model = SessionFile::from_file(temp_file.path())?
        .into_session()?
        .finalize()?;
    let json: serde_json::Value = serde_json::from_str(&model.to_json_pretty()?)?;

    assert_eq!(json["project"]["name"], "P");
    assert_eq!(json["settings"]["flac_version"], "5_0");
    assert_eq!(json["settings"]["exports"][0], "gem4d");
    Ok(())
}

#[test]
fn test_missing_session_file_is_io_error() {
    let error = SessionFile::from_file("/nonexistent/session.toml").unwrap_err();
    assert!(matches!(error, GenError::IoError(_)));
}
