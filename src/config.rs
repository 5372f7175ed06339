// dpm-taxgen/src/config.rs

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::source::CodeListKind;

/// Remote source configuration: which code lists make up each dictionary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DpmSourceConfig {
    pub dpm_dictionaries: Vec<DpmDictionaryConfig>,
}

impl DpmSourceConfig {
    pub fn trace_loaded(&self) {
        info!(
            dictionaries_count = self.dpm_dictionaries.len(),
            "Loaded DPM source config"
        );
        for dictionary in &self.dpm_dictionaries {
            dictionary.trace_loaded();
        }
        debug!(?self, "DPM source config loaded (full debug)");
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DpmDictionaryConfig {
    pub owner: OwnerConfig,
    #[serde(default)]
    pub metrics: CodeListConfig,
    #[serde(default)]
    pub explicit_domains_and_hierarchies: CodeListConfig,
    #[serde(default)]
    pub explicit_dimensions: CodeListConfig,
    #[serde(default)]
    pub typed_domains: CodeListConfig,
    #[serde(default)]
    pub typed_dimensions: CodeListConfig,
}

impl DpmDictionaryConfig {
    pub fn code_list(&self, kind: CodeListKind) -> &CodeListConfig {
        match kind {
            CodeListKind::Metrics => &self.metrics,
            CodeListKind::ExplicitDomainsAndHierarchies => &self.explicit_domains_and_hierarchies,
            CodeListKind::ExplicitDimensions => &self.explicit_dimensions,
            CodeListKind::TypedDomains => &self.typed_domains,
            CodeListKind::TypedDimensions => &self.typed_dimensions,
        }
    }

    pub fn trace_loaded(&self) {
        info!(
            owner_prefix = %self.owner.prefix,
            owner_name = %self.owner.name,
            metrics = self.metrics.uri.as_deref().unwrap_or("-"),
            explicit_domains_and_hierarchies =
                self.explicit_domains_and_hierarchies.uri.as_deref().unwrap_or("-"),
            explicit_dimensions = self.explicit_dimensions.uri.as_deref().unwrap_or("-"),
            typed_domains = self.typed_domains.uri.as_deref().unwrap_or("-"),
            typed_dimensions = self.typed_dimensions.uri.as_deref().unwrap_or("-"),
            "Loaded DPM dictionary config"
        );
    }
}

/// Owner details as written in configuration and in captured `dpm_owner_config.json` files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerConfig {
    pub name: String,
    pub namespace: String,
    pub prefix: String,
    pub location: String,
    pub copyright: String,
    pub languages: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_language: Option<String>,
}

/// A missing or null `uri` yields an empty list for that concept kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeListConfig {
    #[serde(default)]
    pub uri: Option<String>,
}
