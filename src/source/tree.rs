//! Read-only file trees the folder layout can be read from: a directory on disk or the
//! entries of a zip archive. Paths are relative and `/`-separated.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use zip::ZipArchive;

use super::sorting::natural_cmp;
use super::SourceError;

pub trait SourceTree {
    fn read_text(&self, path: &str) -> Result<String, SourceError>;

    fn exists(&self, path: &str) -> bool;

    /// Names of the immediate children of `dir` (files and directories).
    fn list_entries(&self, dir: &str) -> Result<Vec<String>, SourceError>;
}

pub fn join(dir: &str, name: &str) -> String {
    if dir.is_empty() {
        name.to_string()
    } else {
        format!("{dir}/{name}")
    }
}

fn numbered_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(?P<stem>.*?)[0-9]+(?P<extension>(?:\.[A-Za-z]+)?)$")
            .expect("numbered entry pattern is valid")
    })
}

fn is_numbered_name(name: &str, prefix: &str, suffix: &str) -> bool {
    numbered_name_pattern()
        .captures(name)
        .is_some_and(|captures| &captures["stem"] == prefix && &captures["extension"] == suffix)
}

/// Children of `dir` named `<prefix><N><suffix>`, ordered by `N`.
pub fn numbered_entries(
    tree: &dyn SourceTree,
    dir: &str,
    prefix: &str,
    suffix: &str,
) -> Result<Vec<String>, SourceError> {
    let mut names: Vec<String> = tree
        .list_entries(dir)?
        .into_iter()
        .filter(|name| is_numbered_name(name, prefix, suffix))
        .collect();
    names.sort_by(|a, b| natural_cmp(a, b));
    Ok(names)
}

/// Directory on disk.
#[derive(Debug)]
pub struct FolderTree {
    root: PathBuf,
}

impl FolderTree {
    pub fn open(root: &Path) -> Result<Self, SourceError> {
        if !root.is_dir() {
            return Err(SourceError::MissingFile(root.display().to_string()));
        }
        let root = fs::canonicalize(root)
            .map_err(|e| SourceError::io(root.display().to_string(), e))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> PathBuf {
        path.split('/')
            .filter(|segment| !segment.is_empty())
            .fold(self.root.clone(), |acc, segment| acc.join(segment))
    }
}

impl SourceTree for FolderTree {
    fn read_text(&self, path: &str) -> Result<String, SourceError> {
        let full_path = self.resolve(path);
        if !full_path.is_file() {
            return Err(SourceError::MissingFile(full_path.display().to_string()));
        }
        fs::read_to_string(&full_path)
            .map_err(|e| SourceError::io(full_path.display().to_string(), e))
    }

    fn exists(&self, path: &str) -> bool {
        self.resolve(path).exists()
    }

    fn list_entries(&self, dir: &str) -> Result<Vec<String>, SourceError> {
        let full_path = self.resolve(dir);
        if !full_path.is_dir() {
            return Ok(Vec::new());
        }
        let entries = fs::read_dir(&full_path)
            .map_err(|e| SourceError::io(full_path.display().to_string(), e))?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| SourceError::io(full_path.display().to_string(), e))?;
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        Ok(names)
    }
}

/// Entries of a zip archive; the archive stays open for the lifetime of the tree.
pub struct ZipTree {
    path: PathBuf,
    archive: RefCell<ZipArchive<File>>,
    entry_names: BTreeSet<String>,
}

impl ZipTree {
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        if !path.is_file() {
            return Err(SourceError::MissingFile(path.display().to_string()));
        }
        let path = fs::canonicalize(path)
            .map_err(|e| SourceError::io(path.display().to_string(), e))?;
        let file =
            File::open(&path).map_err(|e| SourceError::io(path.display().to_string(), e))?;
        let archive = ZipArchive::new(file).map_err(|source| SourceError::Zip {
            path: path.display().to_string(),
            source,
        })?;

        let entry_names = archive
            .file_names()
            .map(|name| name.trim_end_matches('/').to_string())
            .collect();

        Ok(Self {
            path,
            archive: RefCell::new(archive),
            entry_names,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SourceTree for ZipTree {
    fn read_text(&self, path: &str) -> Result<String, SourceError> {
        let mut archive = self.archive.borrow_mut();
        let mut entry = archive.by_name(path).map_err(|source| match source {
            zip::result::ZipError::FileNotFound => {
                SourceError::MissingFile(format!("{}!/{path}", self.path.display()))
            }
            source => SourceError::Zip {
                path: self.path.display().to_string(),
                source,
            },
        })?;

        let mut text = String::new();
        entry
            .read_to_string(&mut text)
            .map_err(|e| SourceError::io(format!("{}!/{path}", self.path.display()), e))?;
        Ok(text)
    }

    fn exists(&self, path: &str) -> bool {
        let dir_prefix = format!("{path}/");
        self.entry_names
            .iter()
            .any(|name| name == path || name.starts_with(&dir_prefix))
    }

    fn list_entries(&self, dir: &str) -> Result<Vec<String>, SourceError> {
        let prefix = if dir.is_empty() {
            String::new()
        } else {
            format!("{dir}/")
        };

        let children: BTreeSet<String> = self
            .entry_names
            .iter()
            .filter_map(|name| name.strip_prefix(prefix.as_str()))
            .filter_map(|rest| rest.split('/').next())
            .filter(|child| !child.is_empty())
            .map(str::to_string)
            .collect();
        Ok(children.into_iter().collect())
    }
}
