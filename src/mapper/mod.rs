//! # mapper: source data to DPM model
//!
//! Reads every dictionary of a [`DpmSource`] and builds a [`DpmDictionary`] per dictionary.
//! Each code list is mapped in two phases: the codes give one item per uri in source order,
//! then the extensions the code list's blueprint recognizes fill in extension-sourced fields
//! (last extension member wins, members referring to unknown codes are ignored).
//!
//! A structurally broken record is FATAL. Recoverable problems are ERRORs, checked at a
//! checkpoint after every code list and after the dictionary has been validated.

mod concept;
mod dimensions;
mod explicit_domains;
mod hierarchies;
mod items;
mod metrics;
mod rds_model;
mod reader;
mod typed_domains;

use std::sync::Arc;

use tracing::info;

use self::reader::CodeListReader;
use crate::config::OwnerConfig;
use crate::diagnostic::{ContextType, DiagnosticBridge, OrFatal, Stop};
use crate::model::{DpmDictionary, Language, Owner};
use crate::source::{CodeListKind, DpmDictionarySource, DpmSource};

pub fn map_dpm_dictionaries(
    source: &dyn DpmSource,
    diagnostic: &DiagnosticBridge,
) -> Result<Vec<DpmDictionary>, Stop> {
    diagnostic.with_context(
        ContextType::DpmSource,
        source.context_label(),
        source.context_identifier(),
        || {
            let dictionary_sources = source.dpm_dictionary_sources().or_fatal(diagnostic)?;
            let mut dictionaries = Vec::with_capacity(dictionary_sources.len());
            for dictionary_source in &dictionary_sources {
                let dictionary = diagnostic.with_context(ContextType::DpmDictionary, "", "", || {
                    map_dictionary(dictionary_source.as_ref(), diagnostic)
                })?;
                dictionaries.push(dictionary);
            }
            Ok(dictionaries)
        },
    )
}

fn map_dictionary(
    source: &dyn DpmDictionarySource,
    diagnostic: &DiagnosticBridge,
) -> Result<DpmDictionary, Stop> {
    let owner_data = source.dpm_owner_config_data().or_fatal(diagnostic)?;
    let owner_config: OwnerConfig = serde_json::from_str(&owner_data)
        .map_err(|e| diagnostic.fatal(format!("JSON parsing failed (DPM owner configuration): {e}")))?;
    diagnostic.update_current_context_details(
        Some(owner_config.name.clone()),
        Some(owner_config.namespace.clone()),
    );
    let owner = Arc::new(map_owner(&owner_config, diagnostic)?);

    let metric_domains = map_code_list(
        source,
        CodeListKind::Metrics,
        ContextType::MapMetrics,
        diagnostic,
        |reader| metrics::map_metric_domain(reader, &owner, diagnostic),
    )?;

    let explicit_domains = map_code_list(
        source,
        CodeListKind::ExplicitDomainsAndHierarchies,
        ContextType::MapExplicitDomains,
        diagnostic,
        |reader| explicit_domains::map_explicit_domains(reader, &owner, diagnostic),
    )?;

    let typed_domains = map_code_list(
        source,
        CodeListKind::TypedDomains,
        ContextType::MapTypedDomains,
        diagnostic,
        |reader| typed_domains::map_typed_domains(reader, &owner, diagnostic),
    )?;

    let explicit_dimensions = map_code_list(
        source,
        CodeListKind::ExplicitDimensions,
        ContextType::MapExplicitDimensions,
        diagnostic,
        |reader| {
            dimensions::map_explicit_dimensions(reader, &explicit_domains, &owner, diagnostic)
        },
    )?;

    let typed_dimensions = map_code_list(
        source,
        CodeListKind::TypedDimensions,
        ContextType::MapTypedDimensions,
        diagnostic,
        |reader| dimensions::map_typed_dimensions(reader, &typed_domains, &owner, diagnostic),
    )?;

    let dictionary = DpmDictionary {
        owner,
        metric_domains,
        explicit_domains,
        typed_domains,
        explicit_dimensions,
        typed_dimensions,
    };

    diagnostic.validate(&dictionary);
    diagnostic.halt_if_unrecoverable_errors(|| {
        format!(
            "DPM dictionary '{}' has errors, processing halted",
            dictionary.owner.name
        )
    })?;

    info!(
        owner = %dictionary.owner.name,
        metric_domains = dictionary.metric_domains.len(),
        explicit_domains = dictionary.explicit_domains.len(),
        typed_domains = dictionary.typed_domains.len(),
        explicit_dimensions = dictionary.explicit_dimensions.len(),
        typed_dimensions = dictionary.typed_dimensions.len(),
        "DPM dictionary mapped"
    );
    Ok(dictionary)
}

/// Runs `map` for the code list of `kind` inside its own frame; an absent code list maps to
/// an empty list.
fn map_code_list<T>(
    source: &dyn DpmDictionarySource,
    kind: CodeListKind,
    context_type: ContextType,
    diagnostic: &DiagnosticBridge,
    map: impl FnOnce(&CodeListReader<'_>) -> Result<Vec<T>, Stop>,
) -> Result<Vec<T>, Stop> {
    diagnostic.with_context(context_type, "", "", || {
        let Some(code_list) = source.code_list_source(kind).or_fatal(diagnostic)? else {
            return Ok(Vec::new());
        };

        let reader = CodeListReader::open(code_list.as_ref(), diagnostic)?;
        diagnostic.update_current_context_details(
            reader.meta().code_value.clone(),
            reader.meta().uri.clone(),
        );

        let items = map(&reader)?;
        diagnostic.halt_if_unrecoverable_errors(|| {
            format!("{} mapping has errors, processing halted", context_type.title())
        })?;
        Ok(items)
    })
}

fn map_owner(config: &OwnerConfig, diagnostic: &DiagnosticBridge) -> Result<Owner, Stop> {
    let mut languages = Vec::with_capacity(config.languages.len());
    for code in &config.languages {
        match Language::by_iso_code(code) {
            Some(language) => languages.push(language),
            None => {
                return Err(diagnostic.fatal(format!(
                    "Unknown language code '{code}' in DPM owner configuration"
                )))
            }
        }
    }

    let default_language = match &config.default_language {
        Some(code) => Language::by_iso_code(code).ok_or_else(|| {
            diagnostic.fatal(format!(
                "Unknown default language code '{code}' in DPM owner configuration"
            ))
        })?,
        None => *languages.first().ok_or_else(|| {
            diagnostic.fatal("DPM owner configuration lists no languages")
        })?,
    };

    Ok(Owner {
        name: config.name.clone(),
        namespace: config.namespace.clone(),
        prefix: config.prefix.clone(),
        location: config.location.clone(),
        copyright: config.copyright.clone(),
        languages,
        default_language,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::DiagnosticCollector;

    fn owner_config(languages: &[&str], default_language: Option<&str>) -> OwnerConfig {
        OwnerConfig {
            name: "Owner".into(),
            namespace: "http://example.com/ns".into(),
            prefix: "ex".into(),
            location: "http://example.com/loc".into(),
            copyright: "(C)".into(),
            languages: languages.iter().map(|l| l.to_string()).collect(),
            default_language: default_language.map(str::to_string),
        }
    }

    #[test]
    fn owner_default_language_falls_back_to_first_language() {
        let diagnostic = DiagnosticBridge::new(Box::new(DiagnosticCollector::new()));

        let owner = map_owner(&owner_config(&["fi", "en"], None), &diagnostic).unwrap();
        assert_eq!(owner.default_language.iso_code(), "fi");

        let owner = map_owner(&owner_config(&["fi", "en"], Some("en")), &diagnostic).unwrap();
        assert_eq!(owner.default_language.iso_code(), "en");
    }

    #[test]
    fn unknown_owner_language_is_fatal() {
        let collector = DiagnosticCollector::new();
        let diagnostic = DiagnosticBridge::new(Box::new(collector.clone()));

        assert_eq!(
            map_owner(&owner_config(&["fi", "zz"], None), &diagnostic),
            Err(Stop::Halt)
        );
        assert_eq!(
            collector.messages(),
            vec!["[FATAL] [Unknown language code 'zz' in DPM owner configuration]"]
        );
    }
}
