//! Captures any [`DpmSource`] into the folder layout read by [`super::folder`], either as a
//! folder on disk or as entries of a zip file.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::info;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::folder::{
    CODES_PAGE_PREFIX, CODE_LIST_META_FILE, DICTIONARY_DIR_PREFIX, EXTENSION_DIR_PREFIX,
    EXTENSION_META_FILE, JSON_SUFFIX, MEMBERS_PAGE_PREFIX, OWNER_CONFIG_FILE,
    SOURCE_CONFIG_PATH, SUB_CODE_LIST_DIR_PREFIX,
};
use super::tree::join;
use super::{CodeListKind, CodeListSource, DpmSource, ExtensionSource, SourceError};
use crate::diagnostic::{ContextType, DiagnosticBridge, OrFatal, Stop};

/// Destination of captured files. Paths are relative and `/`-separated.
pub trait SourceSink {
    fn context_label(&self) -> String;

    fn context_identifier(&self) -> String;

    fn write_text(&mut self, path: &str, text: &str) -> Result<(), SourceError>;

    /// Flushes pending output; no further writes are accepted afterwards.
    fn finish(&mut self) -> Result<(), SourceError>;
}

pub struct FolderSink {
    root: PathBuf,
    force_overwrite: bool,
}

impl FolderSink {
    pub fn create(root: &Path, force_overwrite: bool) -> Result<Self, SourceError> {
        fs::create_dir_all(root).map_err(|e| SourceError::io(root.display().to_string(), e))?;
        let root =
            fs::canonicalize(root).map_err(|e| SourceError::io(root.display().to_string(), e))?;
        Ok(Self {
            root,
            force_overwrite,
        })
    }
}

impl SourceSink for FolderSink {
    fn context_label(&self) -> String {
        "folder".to_string()
    }

    fn context_identifier(&self) -> String {
        self.root.display().to_string()
    }

    fn write_text(&mut self, path: &str, text: &str) -> Result<(), SourceError> {
        let full_path = path
            .split('/')
            .fold(self.root.clone(), |acc, segment| acc.join(segment));

        if full_path.exists() && !self.force_overwrite {
            return Err(SourceError::TargetExists(full_path.display().to_string()));
        }
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| SourceError::io(parent.display().to_string(), e))?;
        }
        fs::write(&full_path, text).map_err(|e| SourceError::io(full_path.display().to_string(), e))
    }

    fn finish(&mut self) -> Result<(), SourceError> {
        Ok(())
    }
}

pub struct ZipSink {
    path: PathBuf,
    writer: Option<ZipWriter<File>>,
}

impl ZipSink {
    pub fn create(path: &Path, force_overwrite: bool) -> Result<Self, SourceError> {
        if path.exists() && !force_overwrite {
            return Err(SourceError::TargetExists(path.display().to_string()));
        }
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| SourceError::io(parent.display().to_string(), e))?;
        }
        let file = File::create(path).map_err(|e| SourceError::io(path.display().to_string(), e))?;
        let path = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());

        Ok(Self {
            path,
            writer: Some(ZipWriter::new(file)),
        })
    }

    fn zip_error(&self, source: zip::result::ZipError) -> SourceError {
        SourceError::Zip {
            path: self.path.display().to_string(),
            source,
        }
    }
}

impl SourceSink for ZipSink {
    fn context_label(&self) -> String {
        "ZIP file".to_string()
    }

    fn context_identifier(&self) -> String {
        self.path.display().to_string()
    }

    fn write_text(&mut self, path: &str, text: &str) -> Result<(), SourceError> {
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
        let zip_path = self.path.display().to_string();
        let Some(writer) = self.writer.as_mut() else {
            return Err(SourceError::Config(format!("ZIP file '{zip_path}' already closed")));
        };

        let started = writer.start_file(path, options);
        started.map_err(|source| SourceError::Zip {
            path: zip_path.clone(),
            source,
        })?;
        writer
            .write_all(text.as_bytes())
            .map_err(|e| SourceError::io(format!("{zip_path}!/{path}"), e))
    }

    fn finish(&mut self) -> Result<(), SourceError> {
        if let Some(mut writer) = self.writer.take() {
            writer.finish().map_err(|e| self.zip_error(e))?;
        }
        Ok(())
    }
}

/// Writes every file of `source` into `sink`, inside DpmSource / dictionary / code list frames.
pub fn capture_sources(
    source: &dyn DpmSource,
    sink: &mut dyn SourceSink,
    diagnostic: &DiagnosticBridge,
) -> Result<(), Stop> {
    diagnostic.with_context(
        ContextType::DpmSource,
        source.context_label(),
        source.context_identifier(),
        || {
            let config_data = source.source_config_data().or_fatal(diagnostic)?;
            sink.write_text(SOURCE_CONFIG_PATH, &config_data)
                .or_fatal(diagnostic)?;

            let dictionaries = source.dpm_dictionary_sources().or_fatal(diagnostic)?;
            for (index, dictionary) in dictionaries.iter().enumerate() {
                diagnostic.with_context(ContextType::DpmDictionary, "", "", || {
                    let dir = format!("{DICTIONARY_DIR_PREFIX}{index}");

                    let owner_data = dictionary.dpm_owner_config_data().or_fatal(diagnostic)?;
                    sink.write_text(&join(&dir, OWNER_CONFIG_FILE), &owner_data)
                        .or_fatal(diagnostic)?;

                    for kind in CodeListKind::ALL {
                        let code_list = dictionary.code_list_source(kind).or_fatal(diagnostic)?;
                        let Some(code_list) = code_list else {
                            continue;
                        };
                        diagnostic.with_context(ContextType::CodeList, kind.folder_name(), "", || {
                            capture_code_list(
                                code_list.as_ref(),
                                &join(&dir, kind.folder_name()),
                                sink,
                                diagnostic,
                            )
                        })?;
                    }
                    Ok(())
                })?;
            }
            Ok(())
        },
    )?;

    sink.finish().or_fatal(diagnostic)?;
    info!(
        target = %sink.context_identifier(),
        "DPM sources captured"
    );
    Ok(())
}

fn capture_code_list(
    code_list: &dyn CodeListSource,
    dir: &str,
    sink: &mut dyn SourceSink,
    diagnostic: &DiagnosticBridge,
) -> Result<(), Stop> {
    let meta_data = code_list.code_list_meta_data().or_fatal(diagnostic)?;
    sink.write_text(&join(dir, CODE_LIST_META_FILE), &meta_data)
        .or_fatal(diagnostic)?;

    let pages = code_list.code_pages_data().or_fatal(diagnostic)?;
    for (index, page) in pages.enumerate() {
        let page = page.or_fatal(diagnostic)?;
        sink.write_text(
            &join(dir, &format!("{CODES_PAGE_PREFIX}{index}{JSON_SUFFIX}")),
            &page,
        )
        .or_fatal(diagnostic)?;
    }

    let extensions = code_list.extension_sources().or_fatal(diagnostic)?;
    for (index, extension) in extensions.iter().enumerate() {
        diagnostic.with_context(ContextType::Extension, "", "", || {
            capture_extension(
                extension.as_ref(),
                &join(dir, &format!("{EXTENSION_DIR_PREFIX}{index}")),
                sink,
                diagnostic,
            )
        })?;
    }

    let sub_code_lists = code_list.sub_code_list_sources().or_fatal(diagnostic)?;
    for (index, sub_code_list) in sub_code_lists.iter().enumerate() {
        diagnostic.with_context(ContextType::SubCodeList, "", "", || {
            capture_code_list(
                sub_code_list.as_ref(),
                &join(dir, &format!("{SUB_CODE_LIST_DIR_PREFIX}{index}")),
                sink,
                diagnostic,
            )
        })?;
    }
    Ok(())
}

fn capture_extension(
    extension: &dyn ExtensionSource,
    dir: &str,
    sink: &mut dyn SourceSink,
    diagnostic: &DiagnosticBridge,
) -> Result<(), Stop> {
    let meta_data = extension.extension_meta_data().or_fatal(diagnostic)?;
    sink.write_text(&join(dir, EXTENSION_META_FILE), &meta_data)
        .or_fatal(diagnostic)?;

    let pages = extension.extension_member_pages_data().or_fatal(diagnostic)?;
    for (index, page) in pages.enumerate() {
        let page = page.or_fatal(diagnostic)?;
        sink.write_text(
            &join(dir, &format!("{MEMBERS_PAGE_PREFIX}{index}{JSON_SUFFIX}")),
            &page,
        )
        .or_fatal(diagnostic)?;
    }
    Ok(())
}
