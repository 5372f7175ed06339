//! Coordinates the source-map-write and source-capture runs.
//!
//! Each run executes inside one top-level diagnostic frame; everything below it reports
//! through the same [`DiagnosticBridge`]. A `Stop` returned from here means the run failed
//! and the reason has already been reported.

use std::path::Path;

use tracing::info;

use crate::diagnostic::{ContextType, DiagnosticBridge, OrFatal, Stop};
use crate::mapper::map_dpm_dictionaries;
use crate::source::folder::{FolderDpmSource, ZipDpmSource};
use crate::source::rds::{HttpJsonFetcher, RdsDpmSource};
use crate::source::recorder::{capture_sources, FolderSink, SourceSink, ZipSink};
use crate::source::{DpmSource, SourceSpec};
use crate::writer::{write_dpm_db, DpmDbWriteReport, WriteMode};

/// Opens the source named by `spec`; remote sources get the production HTTP client.
pub fn open_source(
    spec: &SourceSpec,
    diagnostic: &DiagnosticBridge,
) -> Result<Box<dyn DpmSource>, Stop> {
    diagnostic.with_context(ContextType::InitSource, "", "", || {
        let source: Box<dyn DpmSource> = match spec {
            SourceSpec::Config(path) => {
                let fetcher = HttpJsonFetcher::new().or_fatal(diagnostic)?;
                let source = diagnostic.with_context(
                    ContextType::InitConfiguration,
                    "",
                    path.display().to_string(),
                    || RdsDpmSource::open(path, Box::new(fetcher)).or_fatal(diagnostic),
                )?;
                Box::new(source)
            }
            SourceSpec::Folder(path) => {
                Box::new(FolderDpmSource::open_folder(path).or_fatal(diagnostic)?)
            }
            SourceSpec::Zip(path) => Box::new(ZipDpmSource::open_zip(path).or_fatal(diagnostic)?),
        };
        diagnostic.update_current_context_details(
            Some(source.context_label()),
            Some(source.context_identifier()),
        );
        Ok(source)
    })
}

pub fn compile_dpm_db(
    spec: &SourceSpec,
    output: &Path,
    force_overwrite: bool,
    diagnostic: &DiagnosticBridge,
) -> Result<DpmDbWriteReport, Stop> {
    diagnostic.with_context(
        ContextType::CompileDpmDb,
        "",
        output.display().to_string(),
        || {
            let source = open_source(spec, diagnostic)?;
            write_from_source(
                source.as_ref(),
                output,
                WriteMode::Create { force_overwrite },
                diagnostic,
            )
        },
    )
}

pub fn replace_dictionary_in_dpm_db(
    spec: &SourceSpec,
    database: &Path,
    diagnostic: &DiagnosticBridge,
) -> Result<DpmDbWriteReport, Stop> {
    diagnostic.with_context(
        ContextType::ReplaceDictionaryInDpmDb,
        "",
        database.display().to_string(),
        || {
            let source = open_source(spec, diagnostic)?;
            write_from_source(source.as_ref(), database, WriteMode::Replace, diagnostic)
        },
    )
}

/// Maps every dictionary of an already opened source and writes them into `database`.
pub fn write_from_source(
    source: &dyn DpmSource,
    database: &Path,
    mode: WriteMode,
    diagnostic: &DiagnosticBridge,
) -> Result<DpmDbWriteReport, Stop> {
    let dictionaries = map_dpm_dictionaries(source, diagnostic)?;
    let report = write_dpm_db(database, mode, &dictionaries, diagnostic)?;
    info!(database = %database.display(), "{report}");
    Ok(report)
}

pub fn capture_sources_to_folder(
    spec: &SourceSpec,
    output: &Path,
    force_overwrite: bool,
    diagnostic: &DiagnosticBridge,
) -> Result<(), Stop> {
    capture(spec, diagnostic, || {
        FolderSink::create(output, force_overwrite)
            .map(|sink| Box::new(sink) as Box<dyn SourceSink>)
            .or_fatal(diagnostic)
    })
}

pub fn capture_sources_to_zip(
    spec: &SourceSpec,
    output: &Path,
    force_overwrite: bool,
    diagnostic: &DiagnosticBridge,
) -> Result<(), Stop> {
    capture(spec, diagnostic, || {
        ZipSink::create(output, force_overwrite)
            .map(|sink| Box::new(sink) as Box<dyn SourceSink>)
            .or_fatal(diagnostic)
    })
}

fn capture(
    spec: &SourceSpec,
    diagnostic: &DiagnosticBridge,
    create_sink: impl FnOnce() -> Result<Box<dyn SourceSink>, Stop>,
) -> Result<(), Stop> {
    diagnostic.with_context(ContextType::CaptureSources, "", "", || {
        let source = open_source(spec, diagnostic)?;
        let mut sink = diagnostic.with_context(ContextType::InitRecorder, "", "", || {
            let sink = create_sink()?;
            diagnostic.update_current_context_details(
                Some(sink.context_label()),
                Some(sink.context_identifier()),
            );
            Ok(sink)
        })?;
        capture_sources(source.as_ref(), sink.as_mut(), diagnostic)
    })
}
