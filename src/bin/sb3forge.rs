use anyhow::{Context as AnyhowContext, Result};
use clap::{Parser, Subcommand};
use sb3forge::manifest::Manifest;
use sb3forge::package::{Compression, ZipPackager};
use sb3forge::Project;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build an .sb3 archive from a project manifest
    Build {
        /// Path to the manifest YAML file
        manifest: PathBuf,

        /// Where to write the archive
        #[arg(long, short)]
        output: PathBuf,

        /// Store entries without compression
        #[arg(long)]
        stored: bool,

        /// Override the agent string written to meta
        #[arg(long)]
        agent: Option<String>,
    },
    /// Print the project.json a manifest produces
    Json {
        /// Path to the manifest YAML file
        manifest: PathBuf,
    },
}

fn load_project(manifest_path: &Path) -> Result<Project> {
    info!("Loading manifest from: {:?}", manifest_path);
    let manifest = Manifest::load(manifest_path)?;
    let base_dir = manifest_path.parent().unwrap_or_else(|| Path::new("."));
    manifest.into_project(base_dir)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Build { manifest, output, stored, agent } => {
            let mut project = load_project(&manifest)?;
            if let Some(agent) = agent {
                project = project.with_agent(&agent);
            }

            let compression = if stored { Compression::Stored } else { Compression::Deflated };
            let archive = project.zip(&ZipPackager::new(compression)).await?;

            if let Some(parent) = output.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&output, &archive)
                .with_context(|| format!("Failed to write archive to {}", output.display()))?;
            info!("Wrote {} bytes to {:?}", archive.len(), output);
        }
        Commands::Json { manifest } => {
            let project = load_project(&manifest)?;
            let json = project.to_json()?;
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
    }

    Ok(())
}
