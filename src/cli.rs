use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing::info;

use crate::diagnostic::{DiagnosticBridge, Stop, TracingConsumer};
use crate::pipeline::{
    capture_sources_to_folder, capture_sources_to_zip, compile_dpm_db,
    replace_dictionary_in_dpm_db,
};
use crate::source::SourceSpec;

/// CLI for taxgen: compile DPM dictionaries from reference data into a DPM database.
#[derive(Parser, Debug)]
#[clap(
    name = "taxgen",
    version,
    about = "Generate DPM databases from reference data code lists"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a new DPM database from the given source
    CompileDpmDb {
        /// Path of the database file to create
        #[clap(long)]
        output: PathBuf,
        #[clap(flatten)]
        source: SourceArgs,
        /// Replace an existing output file
        #[clap(long)]
        force_overwrite: bool,
    },
    /// Replace the source's dictionaries in an existing DPM database
    ReplaceDictionary {
        /// Path of the existing database file
        #[clap(long)]
        db: PathBuf,
        #[clap(flatten)]
        source: SourceArgs,
    },
    /// Capture the source into a folder, for later offline runs
    CaptureToFolder {
        #[clap(long)]
        output: PathBuf,
        #[clap(flatten)]
        source: SourceArgs,
        #[clap(long)]
        force_overwrite: bool,
    },
    /// Capture the source into a zip file, for later offline runs
    CaptureToZip {
        #[clap(long)]
        output: PathBuf,
        #[clap(flatten)]
        source: SourceArgs,
        #[clap(long)]
        force_overwrite: bool,
    },
}

/// Exactly one source location.
#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct SourceArgs {
    /// Source configuration file naming the remote code lists
    #[clap(long)]
    pub source_config: Option<PathBuf>,
    /// Folder holding a captured source
    #[clap(long)]
    pub source_folder: Option<PathBuf>,
    /// Zip file holding a captured source
    #[clap(long)]
    pub source_zip: Option<PathBuf>,
}

impl SourceArgs {
    pub fn source_spec(&self) -> Result<SourceSpec, Stop> {
        match (&self.source_config, &self.source_folder, &self.source_zip) {
            (Some(path), None, None) => Ok(SourceSpec::Config(path.clone())),
            (None, Some(path), None) => Ok(SourceSpec::Folder(path.clone())),
            (None, None, Some(path)) => Ok(SourceSpec::Zip(path.clone())),
            _ => Err(Stop::Fail(
                "Exactly one of --source-config, --source-folder or --source-zip is required"
                    .to_string(),
            )),
        }
    }
}

/// CLI logic entrypoint for integration tests and main().
pub fn run(cli: Cli) -> Result<(), Stop> {
    let diagnostic = DiagnosticBridge::new(Box::new(TracingConsumer));

    match cli.command {
        Commands::CompileDpmDb {
            output,
            source,
            force_overwrite,
        } => {
            let report = compile_dpm_db(&source.source_spec()?, &output, force_overwrite, &diagnostic)?;
            info!(output = %output.display(), "DPM database compiled\n{report}");
        }
        Commands::ReplaceDictionary { db, source } => {
            let report = replace_dictionary_in_dpm_db(&source.source_spec()?, &db, &diagnostic)?;
            info!(db = %db.display(), "DPM dictionaries replaced\n{report}");
        }
        Commands::CaptureToFolder {
            output,
            source,
            force_overwrite,
        } => {
            capture_sources_to_folder(&source.source_spec()?, &output, force_overwrite, &diagnostic)?;
        }
        Commands::CaptureToZip {
            output,
            source,
            force_overwrite,
        } => {
            capture_sources_to_zip(&source.source_spec()?, &output, force_overwrite, &diagnostic)?;
        }
    }
    Ok(())
}
