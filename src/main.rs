use clap::Parser;
use f3dat_gen::core::engine::output_file_name;
use f3dat_gen::utils::error::{ErrorSeverity, GenError};
use f3dat_gen::utils::{logger, validation::Validate};
use f3dat_gen::{CliConfig, GenerationEngine, LocalStorage, ModelConfiguration, SessionFile};
use std::io::Write;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    // 執行環境：--prod 優先於 APP_ENV
    let app_env = match config.app_env() {
        Ok(app_env) => app_env,
        Err(e) => fail(&e),
    };

    // 初始化日誌
    logger::init_logger(app_env, config.verbose);

    tracing::info!("Starting f3dat-gen ({})", app_env);
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        fail(&e);
    }

    tracing::info!("📁 Loading session from: {}", config.session);
    let session = match SessionFile::from_file(&config.session).and_then(SessionFile::into_session)
    {
        Ok(session) => session,
        Err(e) => {
            eprintln!("❌ Failed to load session file '{}'", config.session);
            fail(&e);
        }
    };

    let model = match session.finalize() {
        Ok(model) => model,
        Err(e) => fail(&e),
    };
    tracing::info!("✅ Session validated successfully");

    // --stdout / --json 時 stdout 只放輸出內容，摘要改寫到 stderr
    if config.writes_to_stdout() {
        display_summary(&mut std::io::stderr(), &model, &config)?;
    } else {
        display_summary(&mut std::io::stdout(), &model, &config)?;
    }

    if config.json {
        println!("{}", model.to_json_pretty()?);
        return Ok(());
    }

    if config.dry_run {
        tracing::info!("🔍 DRY RUN MODE - no script will be written");
        return Ok(());
    }

    let mut engine = GenerationEngine::new(LocalStorage::new(config.output_dir.clone()));
    if let Some(name) = &config.output_name {
        engine = engine.with_output_name(name.clone());
    }

    if config.stdout {
        print!("{}", engine.render(&model).contents);
        return Ok(());
    }

    match engine.generate(&model).await {
        Ok(script) => {
            tracing::info!("✅ Script generated successfully!");
            println!("✅ Script generated successfully!");
            println!("📁 Output saved to: {}/{}", config.output_dir, script.file_name);
        }
        Err(e) => fail(&e),
    }

    Ok(())
}

fn display_summary(
    out: &mut impl Write,
    model: &ModelConfiguration,
    config: &CliConfig,
) -> std::io::Result<()> {
    let settings = model.settings();
    writeln!(out, "📋 Configuration Summary:")?;
    writeln!(out, "  Project: {}", model.project().name())?;
    writeln!(out, "  FLAC3D: {}", settings.flac_version())?;
    writeln!(out, "  Format: {}", settings.output_format())?;
    writeln!(
        out,
        "  Steps: {}",
        model
            .steps()
            .iter()
            .map(|step| step.kind().to_string())
            .collect::<Vec<_>>()
            .join(" → ")
    )?;
    if !settings.exports().is_empty() {
        writeln!(
            out,
            "  Exports: {}",
            settings
                .exports()
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        )?;
    }
    writeln!(
        out,
        "  Output: {}",
        config
            .output_name
            .clone()
            .unwrap_or_else(|| output_file_name(model))
    )?;

    if config.dry_run {
        writeln!(out, "  🔍 DRY RUN MODE ENABLED")?;
    }
    Ok(())
}

fn fail(e: &GenError) -> ! {
    // 記錄詳細錯誤信息
    tracing::error!(
        "❌ f3dat-gen failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    // 輸出用戶友好的錯誤信息
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 建議: {}", e.recovery_suggestion());

    // 根據錯誤嚴重程度決定退出碼
    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,      // 警告，但成功
        ErrorSeverity::Medium => 2,   // 可重試
        ErrorSeverity::High => 1,     // 輸入錯誤
        ErrorSeverity::Critical => 3, // 系統錯誤
    };
    std::process::exit(exit_code);
}
