//! # source: uniform access to DPM dictionary source data
//!
//! A DPM source is a list of dictionary sources; each dictionary source offers an owner
//! configuration and one optional code list per concept kind. Code lists expose their
//! metadata, code pages, extensions and nested (sub) code lists as raw JSON text.
//!
//! ## Implementations
//! - [`folder`]: captured folder layout, read either from disk or from inside a zip file
//! - [`rds`]: the remote Reference Data service, addressed through the configuration file
//!
//! ## Capturing
//! [`recorder`] writes any source back out in the folder layout, so a remote run can be
//! reproduced offline from a folder or zip.
//!
//! Resources (open zip archives, HTTP clients) are owned by the source value and released
//! when it is dropped.

mod blueprint;
pub mod folder;
pub mod rds;
pub mod recorder;
pub mod sorting;
pub mod tree;

pub use blueprint::{CodeListBlueprint, CodeListKind, ExtensionKind};

use std::path::PathBuf;

use crate::source::rds::FetchError;

/// Lazily produced sequence of JSON page texts.
pub type PageIter<'a> = Box<dyn Iterator<Item = Result<String, SourceError>> + 'a>;

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("Reading '{path}' failed: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("File not found: {0}")]
    MissingFile(String),
    #[error("ZIP file '{path}' failed: {source}")]
    Zip {
        path: String,
        #[source]
        source: zip::result::ZipError,
    },
    #[error("JSON parsing failed ({context}): {message}")]
    Json { context: String, message: String },
    #[error("Missing '{pointer}' in JSON ({context})")]
    MissingField { context: String, pointer: String },
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("Malformed URL ({phase}): {raw}")]
    MalformedUrl { phase: String, raw: String },
    #[error("Service returned identical next page url: {0}")]
    RepeatedPage(String),
    #[error("Target already exists: {0}")]
    TargetExists(String),
    #[error("{0}")]
    Config(String),
}

impl SourceError {
    pub(crate) fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        SourceError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Where a run reads its dictionaries from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceSpec {
    Config(PathBuf),
    Folder(PathBuf),
    Zip(PathBuf),
}

pub trait DpmSource {
    /// Short description of the source kind, e.g. `folder`.
    fn context_label(&self) -> String;

    /// Location of the source, e.g. the absolute folder path.
    fn context_identifier(&self) -> String;

    fn source_config_data(&self) -> Result<String, SourceError>;

    fn dpm_dictionary_sources(&self) -> Result<Vec<Box<dyn DpmDictionarySource + '_>>, SourceError>;
}

pub trait DpmDictionarySource {
    fn dpm_owner_config_data(&self) -> Result<String, SourceError>;

    /// `None` when the dictionary has no code list of this kind.
    fn code_list_source(
        &self,
        kind: CodeListKind,
    ) -> Result<Option<Box<dyn CodeListSource + '_>>, SourceError>;
}

pub trait CodeListSource {
    fn blueprint(&self) -> &CodeListBlueprint;

    fn code_list_meta_data(&self) -> Result<String, SourceError>;

    fn code_pages_data(&self) -> Result<PageIter<'_>, SourceError>;

    fn extension_sources(&self) -> Result<Vec<Box<dyn ExtensionSource + '_>>, SourceError>;

    fn sub_code_list_sources(&self) -> Result<Vec<Box<dyn CodeListSource + '_>>, SourceError>;
}

pub trait ExtensionSource {
    fn extension_meta_data(&self) -> Result<String, SourceError>;

    fn extension_member_pages_data(&self) -> Result<PageIter<'_>, SourceError>;
}
