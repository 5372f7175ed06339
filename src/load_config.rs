//! `load_config`: reads the DPM source configuration file into [`DpmSourceConfig`].
//!
//! The file may be YAML or JSON (JSON documents are valid YAML). The raw text is kept
//! alongside the parsed value because capture runs store it verbatim as
//! `meta/source_config.json`.
//!
//! All errors are `anyhow::Error`s with the offending path in the message; the pipeline
//! reports them as FATAL.

use anyhow::Result;
use std::fs;
use std::path::Path;
use tracing::{error, info};

use crate::config::DpmSourceConfig;

#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub raw: String,
    pub config: DpmSourceConfig,
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<LoadedConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading DPM source configuration from file");

    let raw = match fs::read_to_string(path_ref) {
        Ok(content) => {
            info!(config_path = ?path_ref, "Config file read successfully");
            content
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path_ref,
                e
            ));
        }
    };

    let config = match parse_config(&raw) {
        Ok(config) => {
            info!(config_path = ?path_ref, "Parsed config successfully");
            config
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config");
            return Err(anyhow::anyhow!(
                "Failed to parse config file {:?}: {e}",
                path_ref
            ));
        }
    };

    config.trace_loaded();
    Ok(LoadedConfig { raw, config })
}

pub fn parse_config(text: &str) -> Result<DpmSourceConfig> {
    let config: DpmSourceConfig = serde_yaml::from_str(text)?;
    if config.dpm_dictionaries.is_empty() {
        return Err(anyhow::anyhow!("no dpmDictionaries configured"));
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_config_with_null_uris_parses() {
        let config = parse_config(
            r#"{
              "dpmDictionaries": [{
                "owner": {
                  "name": "Owner", "namespace": "http://example.com", "prefix": "ex",
                  "location": "http://example.com/loc", "copyright": "(C)",
                  "languages": ["en", "fi"]
                },
                "metrics": { "uri": "http://uri.suomi.fi/codelist/ex/met" },
                "explicitDomainsAndHierarchies": { "uri": null }
              }]
            }"#,
        )
        .unwrap();

        let dictionary = &config.dpm_dictionaries[0];
        assert_eq!(
            dictionary.metrics.uri.as_deref(),
            Some("http://uri.suomi.fi/codelist/ex/met")
        );
        assert_eq!(dictionary.explicit_domains_and_hierarchies.uri, None);
        assert_eq!(dictionary.typed_dimensions.uri, None);
        assert_eq!(dictionary.owner.default_language, None);
    }

    #[test]
    fn empty_dictionary_list_is_rejected() {
        assert!(parse_config("dpmDictionaries: []").is_err());
    }
}
