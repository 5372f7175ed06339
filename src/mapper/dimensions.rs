use std::collections::HashMap;
use std::sync::Arc;

use super::concept::dpm_concept;
use super::items::UriIdentifiedItems;
use super::rds_model::MemberValueType;
use super::reader::{required_uri, CodeListReader};
use crate::diagnostic::{DiagnosticBridge, Stop};
use crate::model::{
    Concept, DpmElementKind, DpmElementRef, ExplicitDimension, ExplicitDomain, Owner,
    TypedDimension, TypedDomain,
};
use crate::source::ExtensionKind;

struct DimensionItem {
    uri: String,
    concept: Concept,
    dimension_code: String,
    domain_ref: DpmElementRef,
}

pub(crate) fn map_explicit_dimensions(
    reader: &CodeListReader<'_>,
    domains: &[ExplicitDomain],
    owner: &Arc<Owner>,
    diagnostic: &DiagnosticBridge,
) -> Result<Vec<ExplicitDimension>, Stop> {
    let domain_uris = domains
        .iter()
        .map(|domain| (domain.domain_code.as_str(), domain.uri.as_str()))
        .collect();

    let items = map_dimensions(
        reader,
        &domain_uris,
        DpmElementKind::ExplicitDomain,
        owner,
        diagnostic,
    )?;

    Ok(items
        .into_iter()
        .map(|item| ExplicitDimension {
            uri: item.uri,
            concept: item.concept,
            dimension_code: item.dimension_code,
            domain_ref: item.domain_ref,
        })
        .collect())
}

pub(crate) fn map_typed_dimensions(
    reader: &CodeListReader<'_>,
    domains: &[TypedDomain],
    owner: &Arc<Owner>,
    diagnostic: &DiagnosticBridge,
) -> Result<Vec<TypedDimension>, Stop> {
    let domain_uris = domains
        .iter()
        .map(|domain| (domain.domain_code.as_str(), domain.uri.as_str()))
        .collect();

    let items = map_dimensions(
        reader,
        &domain_uris,
        DpmElementKind::TypedDomain,
        owner,
        diagnostic,
    )?;

    Ok(items
        .into_iter()
        .map(|item| TypedDimension {
            uri: item.uri,
            concept: item.concept,
            dimension_code: item.dimension_code,
            domain_ref: item.domain_ref,
        })
        .collect())
}

/// Domain references arrive as domain codes and are resolved to uris of the same dictionary.
fn map_dimensions(
    reader: &CodeListReader<'_>,
    domain_uris: &HashMap<&str, &str>,
    domain_kind: DpmElementKind,
    owner: &Arc<Owner>,
    diagnostic: &DiagnosticBridge,
) -> Result<Vec<DimensionItem>, Stop> {
    let mut items = UriIdentifiedItems::new();

    reader.each_code(|code| {
        let uri = required_uri(code.uri.as_deref(), "Dimension code", diagnostic)?;
        let item = DimensionItem {
            uri: uri.clone(),
            concept: dpm_concept(&code.concept, owner, diagnostic)?,
            dimension_code: code.code_value.unwrap_or_default(),
            domain_ref: DpmElementRef::new("", domain_kind, ""),
        };
        items.push(&uri, item);
        Ok(())
    })?;

    reader.each_extension(|extension| {
        if extension.kind() != ExtensionKind::DpmDimension {
            return Ok(());
        }
        extension.each_member(|member| {
            let code_uri =
                required_uri(member.code_uri(), "Dimension extension member code", diagnostic)?;
            let domain_code = member.value_or_empty(MemberValueType::DpmDomainReference);

            items.update(&code_uri, |item| {
                let domain_uri = match domain_uris.get(domain_code.as_str()) {
                    Some(uri) => uri.to_string(),
                    None => {
                        if !domain_code.is_empty() {
                            diagnostic.error(format!(
                                "Dimension {} refers to unknown {} '{}'",
                                item.dimension_code,
                                domain_kind.type_name(),
                                domain_code
                            ));
                        }
                        String::new()
                    }
                };
                item.domain_ref = DpmElementRef::new(domain_uri, domain_kind, domain_code.clone());
            });
            Ok(())
        })
    })?;

    Ok(items.into_items())
}
