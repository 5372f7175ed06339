//! Reference Data service adapter: every code list is addressed by the URI given in the
//! source configuration and resolved to content URLs on first use.

mod client;
mod paging;
mod resolver;

pub use client::{FetchError, HttpJsonFetcher, JsonFetcher, MAX_RETRIES, READ_TIMEOUT};
#[cfg(any(test, feature = "test-export-mocks"))]
pub use client::MockJsonFetcher;
pub use paging::PAGE_SIZE;

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use self::paging::PagedFetch;
use self::resolver::{parse_json, ContentAddressResolver, ExtensionAddress};
use super::{
    CodeListBlueprint, CodeListKind, CodeListSource, DpmDictionarySource, DpmSource,
    ExtensionSource, PageIter, SourceError,
};
use crate::config::{DpmDictionaryConfig, DpmSourceConfig};
use crate::load_config::load_config;

pub struct RdsDpmSource {
    config_path: PathBuf,
    raw_config: String,
    config: DpmSourceConfig,
    fetcher: Box<dyn JsonFetcher>,
}

impl RdsDpmSource {
    pub fn open(config_path: &Path, fetcher: Box<dyn JsonFetcher>) -> Result<Self, SourceError> {
        let loaded = load_config(config_path).map_err(|e| SourceError::Config(format!("{e:#}")))?;
        let config_path = config_path
            .canonicalize()
            .unwrap_or_else(|_| config_path.to_path_buf());
        Ok(Self::from_config(config_path, loaded.raw, loaded.config, fetcher))
    }

    pub fn from_config(
        config_path: PathBuf,
        raw_config: String,
        config: DpmSourceConfig,
        fetcher: Box<dyn JsonFetcher>,
    ) -> Self {
        Self {
            config_path,
            raw_config,
            config,
            fetcher,
        }
    }
}

impl DpmSource for RdsDpmSource {
    fn context_label(&self) -> String {
        "config file".to_string()
    }

    fn context_identifier(&self) -> String {
        self.config_path.display().to_string()
    }

    fn source_config_data(&self) -> Result<String, SourceError> {
        Ok(self.raw_config.clone())
    }

    fn dpm_dictionary_sources(&self) -> Result<Vec<Box<dyn DpmDictionarySource + '_>>, SourceError> {
        Ok(self
            .config
            .dpm_dictionaries
            .iter()
            .map(|config| {
                Box::new(RdsDictionarySource {
                    config,
                    fetcher: self.fetcher.as_ref(),
                }) as Box<dyn DpmDictionarySource + '_>
            })
            .collect())
    }
}

struct RdsDictionarySource<'a> {
    config: &'a DpmDictionaryConfig,
    fetcher: &'a dyn JsonFetcher,
}

impl DpmDictionarySource for RdsDictionarySource<'_> {
    fn dpm_owner_config_data(&self) -> Result<String, SourceError> {
        serde_json::to_string_pretty(&self.config.owner).map_err(|e| SourceError::Json {
            context: "owner configuration".to_string(),
            message: e.to_string(),
        })
    }

    fn code_list_source(
        &self,
        kind: CodeListKind,
    ) -> Result<Option<Box<dyn CodeListSource + '_>>, SourceError> {
        match &self.config.code_list(kind).uri {
            Some(uri) => {
                let source = RdsCodeListSource::resolve(self.fetcher, uri, kind.blueprint())?;
                Ok(Some(Box::new(source)))
            }
            None => Ok(None),
        }
    }
}

struct RdsCodeListSource<'a> {
    fetcher: &'a dyn JsonFetcher,
    blueprint: CodeListBlueprint,
    resolver: ContentAddressResolver,
}

impl<'a> RdsCodeListSource<'a> {
    fn resolve(
        fetcher: &'a dyn JsonFetcher,
        uri: &str,
        blueprint: CodeListBlueprint,
    ) -> Result<Self, SourceError> {
        debug!(uri, "Resolving code list content address");
        let resolver = ContentAddressResolver::resolve(fetcher, uri, &blueprint)?;
        Ok(Self {
            fetcher,
            blueprint,
            resolver,
        })
    }
}

impl CodeListSource for RdsCodeListSource<'_> {
    fn blueprint(&self) -> &CodeListBlueprint {
        &self.blueprint
    }

    fn code_list_meta_data(&self) -> Result<String, SourceError> {
        Ok(self
            .fetcher
            .fetch_json(&self.resolver.address.code_list_url)?)
    }

    fn code_pages_data(&self) -> Result<PageIter<'_>, SourceError> {
        Ok(Box::new(PagedFetch::new(
            self.fetcher,
            &self.resolver.address.codes_url,
        )))
    }

    fn extension_sources(&self) -> Result<Vec<Box<dyn ExtensionSource + '_>>, SourceError> {
        Ok(self
            .resolver
            .address
            .extensions
            .iter()
            .map(|address| {
                Box::new(RdsExtensionSource {
                    fetcher: self.fetcher,
                    address,
                }) as Box<dyn ExtensionSource + '_>
            })
            .collect())
    }

    /// Codes carrying a `subCodeScheme` reference point to nested code lists.
    fn sub_code_list_sources(&self) -> Result<Vec<Box<dyn CodeListSource + '_>>, SourceError> {
        let Some(sub_blueprint) = &self.blueprint.sub_code_list else {
            return Ok(Vec::new());
        };

        let mut sources: Vec<Box<dyn CodeListSource + '_>> = Vec::new();
        for page in self.code_pages_data()? {
            let page = parse_json(&page?, "codes page")?;
            let codes = page
                .pointer("/results")
                .and_then(Value::as_array)
                .map(Vec::as_slice)
                .unwrap_or_default();

            for code in codes {
                let Some(sub_uri) = code
                    .pointer("/subCodeScheme/uri")
                    .and_then(Value::as_str)
                    .filter(|uri| !uri.trim().is_empty())
                else {
                    continue;
                };
                let decorated = self.resolver.decorate_uri(sub_uri)?;
                let source = RdsCodeListSource::resolve(
                    self.fetcher,
                    &decorated,
                    sub_blueprint.as_ref().clone(),
                )?;
                sources.push(Box::new(source));
            }
        }
        Ok(sources)
    }
}

struct RdsExtensionSource<'a> {
    fetcher: &'a dyn JsonFetcher,
    address: &'a ExtensionAddress,
}

impl ExtensionSource for RdsExtensionSource<'_> {
    fn extension_meta_data(&self) -> Result<String, SourceError> {
        Ok(self.fetcher.fetch_json(&self.address.url)?)
    }

    fn extension_member_pages_data(&self) -> Result<PageIter<'_>, SourceError> {
        Ok(Box::new(PagedFetch::new(self.fetcher, &self.address.members_url)))
    }
}
