use anyhow::{Context, Result};
use clap::Parser;
use f3dat_gen::domain::ports::Storage;
use f3dat_gen::utils::logger;
use f3dat_gen::utils::text::extract_project_name;
use f3dat_gen::LocalStorage;

#[derive(Parser)]
#[command(name = "f3dat-inspect")]
#[command(about = "Print the project name embedded in an existing .f3dat script")]
struct Args {
    /// Scripts to inspect
    #[arg(required = true)]
    files: Vec<String>,

    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    logger::init_cli_logger(args.verbose);

    let storage = LocalStorage::new(".");
    for file in &args.files {
        let bytes = storage
            .read_file(file)
            .await
            .with_context(|| format!("Failed to read '{}'", file))?;
        let contents = String::from_utf8_lossy(&bytes);

        match extract_project_name(&contents) {
            Some(name) => println!("{}: {}", file, name),
            None => {
                tracing::warn!("No @Project_Name line found in {}", file);
                println!("{}: <unknown>", file);
            }
        }
    }

    Ok(())
}
