//! # writer: DPM dictionaries into a SQLite DPM database
//!
//! Two modes share one write path:
//! - **create**: a new database file with the DPM schema and seeded languages
//! - **replace**: an existing database; rows owned by the written dictionaries' owners
//!   (matched by owner prefix) are purged and re-inserted, other owners are untouched
//!
//! Everything happens in one transaction. Reference resolution failures are ERRORs; the
//! checkpoint right before commit turns any accumulated ERROR into a rollback.

mod dictionary;
mod schema;

use std::fmt;
use std::fs;
use std::path::Path;

use rusqlite::Connection;
use serde::Serialize;
use tracing::info;

use self::dictionary::{purge_owner_content, upsert_owner, DictionaryWriter};
use crate::diagnostic::{ContextType, DiagnosticBridge, OrFatal, Stop};
use crate::model::DpmDictionary;

#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    #[error("Database operation failed: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Removing '{path}' failed: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Target file already exists: {0}")]
    TargetExists(String),
    #[error("DPM database not found: {0}")]
    MissingDatabase(String),
    #[error("No database language for '{0}'")]
    UnknownLanguage(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    Create { force_overwrite: bool },
    Replace,
}

/// Row counts written for one dictionary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DictionaryWriteReport {
    pub owner_prefix: String,
    pub explicit_domains: usize,
    pub typed_domains: usize,
    pub members: usize,
    pub hierarchies: usize,
    pub hierarchy_nodes: usize,
    pub dimensions: usize,
    pub metrics: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DpmDbWriteReport {
    pub dictionaries: Vec<DictionaryWriteReport>,
}

impl fmt::Display for DpmDbWriteReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for report in &self.dictionaries {
            writeln!(
                f,
                "{}: {} explicit domains, {} typed domains, {} members, {} hierarchies, {} hierarchy nodes, {} dimensions, {} metrics",
                report.owner_prefix,
                report.explicit_domains,
                report.typed_domains,
                report.members,
                report.hierarchies,
                report.hierarchy_nodes,
                report.dimensions,
                report.metrics
            )?;
        }
        Ok(())
    }
}

pub fn write_dpm_db(
    path: &Path,
    mode: WriteMode,
    dictionaries: &[DpmDictionary],
    diagnostic: &DiagnosticBridge,
) -> Result<DpmDbWriteReport, Stop> {
    let mut connection = diagnostic.with_context(
        ContextType::InitDpmDb,
        "",
        path.display().to_string(),
        || open_database(path, mode).or_fatal(diagnostic),
    )?;

    diagnostic.with_context(ContextType::WriteDpmDb, "", "", || {
        let transaction = connection.transaction().or_fatal(diagnostic)?;
        let language_ids = schema::ensure_languages(&transaction).or_fatal(diagnostic)?;

        let mut report = DpmDbWriteReport::default();
        for dictionary in dictionaries {
            let owner = &dictionary.owner;
            let dictionary_report = diagnostic.with_context(
                ContextType::DpmDictionary,
                owner.name.as_str(),
                owner.namespace.as_str(),
                || {
                    let owner_id = upsert_owner(&transaction, owner).or_fatal(diagnostic)?;
                    if mode == WriteMode::Replace {
                        purge_owner_content(&transaction, owner_id).or_fatal(diagnostic)?;
                    }
                    DictionaryWriter::new(&transaction, diagnostic, &language_ids, owner, owner_id)
                        .write(dictionary)
                        .or_fatal(diagnostic)
                },
            )?;
            report.dictionaries.push(dictionary_report);
        }

        // Dropping the uncommitted transaction rolls every write back.
        diagnostic.halt_if_unrecoverable_errors(|| {
            "DPM database write has errors, changes rolled back".to_string()
        })?;
        transaction.commit().or_fatal(diagnostic)?;

        info!(path = %path.display(), dictionaries = report.dictionaries.len(), "DPM database written");
        Ok(report)
    })
}

fn open_database(path: &Path, mode: WriteMode) -> Result<Connection, WriteError> {
    let path_text = path.display().to_string();
    match mode {
        WriteMode::Create { force_overwrite } => {
            if path.exists() {
                if !force_overwrite {
                    return Err(WriteError::TargetExists(path_text));
                }
                fs::remove_file(path).map_err(|source| WriteError::Io {
                    path: path_text.clone(),
                    source,
                })?;
            }
        }
        WriteMode::Replace => {
            if !path.is_file() {
                return Err(WriteError::MissingDatabase(path_text));
            }
        }
    }

    let connection = Connection::open(path)?;
    connection.pragma_update(None, "foreign_keys", true)?;
    schema::create_schema(&connection)?;
    info!(path = %path_text, mode = ?mode, "DPM database opened");
    Ok(connection)
}
