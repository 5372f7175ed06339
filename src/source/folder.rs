//! Adapters reading the captured folder layout from any [`SourceTree`]:
//!
//! ```text
//! meta/source_config.json
//! dpm_dictionary_<i>/dpm_owner_config.json
//! dpm_dictionary_<i>/<kind>/code_list_meta.json
//! dpm_dictionary_<i>/<kind>/codes_page_<n>.json
//! dpm_dictionary_<i>/<kind>/extension_<n>/extension_meta.json
//! dpm_dictionary_<i>/<kind>/extension_<n>/members_page_<m>.json
//! dpm_dictionary_<i>/<kind>/sub_code_list_<n>/...
//! ```

use std::path::Path;

use super::tree::{join, numbered_entries, FolderTree, SourceTree, ZipTree};
use super::{
    CodeListBlueprint, CodeListKind, CodeListSource, DpmDictionarySource, DpmSource,
    ExtensionSource, PageIter, SourceError,
};

pub(crate) const SOURCE_CONFIG_PATH: &str = "meta/source_config.json";
pub(crate) const DICTIONARY_DIR_PREFIX: &str = "dpm_dictionary_";
pub(crate) const OWNER_CONFIG_FILE: &str = "dpm_owner_config.json";
pub(crate) const CODE_LIST_META_FILE: &str = "code_list_meta.json";
pub(crate) const CODES_PAGE_PREFIX: &str = "codes_page_";
pub(crate) const EXTENSION_DIR_PREFIX: &str = "extension_";
pub(crate) const EXTENSION_META_FILE: &str = "extension_meta.json";
pub(crate) const MEMBERS_PAGE_PREFIX: &str = "members_page_";
pub(crate) const SUB_CODE_LIST_DIR_PREFIX: &str = "sub_code_list_";
pub(crate) const JSON_SUFFIX: &str = ".json";

/// A DPM source laid out as folders, read through a [`SourceTree`].
pub struct TreeDpmSource<T: SourceTree> {
    tree: T,
    label: &'static str,
    identifier: String,
}

pub type FolderDpmSource = TreeDpmSource<FolderTree>;
pub type ZipDpmSource = TreeDpmSource<ZipTree>;

impl FolderDpmSource {
    pub fn open_folder(path: &Path) -> Result<Self, SourceError> {
        let tree = FolderTree::open(path)?;
        let identifier = tree.root().display().to_string();
        Ok(Self {
            tree,
            label: "folder",
            identifier,
        })
    }
}

impl ZipDpmSource {
    pub fn open_zip(path: &Path) -> Result<Self, SourceError> {
        let tree = ZipTree::open(path)?;
        let identifier = tree.path().display().to_string();
        Ok(Self {
            tree,
            label: "ZIP file",
            identifier,
        })
    }
}

impl<T: SourceTree> DpmSource for TreeDpmSource<T> {
    fn context_label(&self) -> String {
        self.label.to_string()
    }

    fn context_identifier(&self) -> String {
        self.identifier.clone()
    }

    fn source_config_data(&self) -> Result<String, SourceError> {
        self.tree.read_text(SOURCE_CONFIG_PATH)
    }

    fn dpm_dictionary_sources(&self) -> Result<Vec<Box<dyn DpmDictionarySource + '_>>, SourceError> {
        let dirs = numbered_entries(&self.tree, "", DICTIONARY_DIR_PREFIX, "")?;
        Ok(dirs
            .into_iter()
            .map(|dir| {
                Box::new(TreeDictionarySource {
                    tree: &self.tree,
                    dir,
                }) as Box<dyn DpmDictionarySource + '_>
            })
            .collect())
    }
}

struct TreeDictionarySource<'a> {
    tree: &'a dyn SourceTree,
    dir: String,
}

impl DpmDictionarySource for TreeDictionarySource<'_> {
    fn dpm_owner_config_data(&self) -> Result<String, SourceError> {
        self.tree.read_text(&join(&self.dir, OWNER_CONFIG_FILE))
    }

    fn code_list_source(
        &self,
        kind: CodeListKind,
    ) -> Result<Option<Box<dyn CodeListSource + '_>>, SourceError> {
        let dir = join(&self.dir, kind.folder_name());
        if !self.tree.exists(&dir) {
            return Ok(None);
        }
        Ok(Some(Box::new(TreeCodeListSource {
            tree: self.tree,
            dir,
            blueprint: kind.blueprint(),
        })))
    }
}

struct TreeCodeListSource<'a> {
    tree: &'a dyn SourceTree,
    dir: String,
    blueprint: CodeListBlueprint,
}

fn read_pages<'a>(
    tree: &'a dyn SourceTree,
    dir: &str,
    prefix: &str,
) -> Result<PageIter<'a>, SourceError> {
    let pages = numbered_entries(tree, dir, prefix, JSON_SUFFIX)?;
    let dir = dir.to_string();
    Ok(Box::new(
        pages
            .into_iter()
            .map(move |page| tree.read_text(&join(&dir, &page))),
    ))
}

impl CodeListSource for TreeCodeListSource<'_> {
    fn blueprint(&self) -> &CodeListBlueprint {
        &self.blueprint
    }

    fn code_list_meta_data(&self) -> Result<String, SourceError> {
        self.tree.read_text(&join(&self.dir, CODE_LIST_META_FILE))
    }

    fn code_pages_data(&self) -> Result<PageIter<'_>, SourceError> {
        read_pages(self.tree, &self.dir, CODES_PAGE_PREFIX)
    }

    fn extension_sources(&self) -> Result<Vec<Box<dyn ExtensionSource + '_>>, SourceError> {
        let dirs = numbered_entries(self.tree, &self.dir, EXTENSION_DIR_PREFIX, "")?;
        Ok(dirs
            .into_iter()
            .map(|dir| {
                Box::new(TreeExtensionSource {
                    tree: self.tree,
                    dir: join(&self.dir, &dir),
                }) as Box<dyn ExtensionSource + '_>
            })
            .collect())
    }

    fn sub_code_list_sources(&self) -> Result<Vec<Box<dyn CodeListSource + '_>>, SourceError> {
        let Some(sub_blueprint) = &self.blueprint.sub_code_list else {
            return Ok(Vec::new());
        };

        let dirs = numbered_entries(self.tree, &self.dir, SUB_CODE_LIST_DIR_PREFIX, "")?;
        Ok(dirs
            .into_iter()
            .map(|dir| {
                Box::new(TreeCodeListSource {
                    tree: self.tree,
                    dir: join(&self.dir, &dir),
                    blueprint: sub_blueprint.as_ref().clone(),
                }) as Box<dyn CodeListSource + '_>
            })
            .collect())
    }
}

struct TreeExtensionSource<'a> {
    tree: &'a dyn SourceTree,
    dir: String,
}

impl ExtensionSource for TreeExtensionSource<'_> {
    fn extension_meta_data(&self) -> Result<String, SourceError> {
        self.tree.read_text(&join(&self.dir, EXTENSION_META_FILE))
    }

    fn extension_member_pages_data(&self) -> Result<PageIter<'_>, SourceError> {
        read_pages(self.tree, &self.dir, MEMBERS_PAGE_PREFIX)
    }
}
