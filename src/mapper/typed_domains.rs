use std::sync::Arc;

use super::concept::dpm_concept;
use super::items::UriIdentifiedItems;
use super::metrics::translate;
use super::rds_model::MemberValueType;
use super::reader::{required_uri, CodeListReader};
use crate::diagnostic::{DiagnosticBridge, Stop};
use crate::model::{Owner, TypedDomain};
use crate::source::ExtensionKind;

const DOMAIN_DATA_TYPE_TRANSLATIONS: &[(&str, &str)] = &[("Percentage", "Percent")];

pub(crate) fn map_typed_domains(
    reader: &CodeListReader<'_>,
    owner: &Arc<Owner>,
    diagnostic: &DiagnosticBridge,
) -> Result<Vec<TypedDomain>, Stop> {
    let mut items = UriIdentifiedItems::new();

    reader.each_code(|code| {
        let uri = required_uri(code.uri.as_deref(), "Typed domain code", diagnostic)?;
        let domain = TypedDomain {
            uri: uri.clone(),
            concept: dpm_concept(&code.concept, owner, diagnostic)?,
            domain_code: code.code_value.unwrap_or_default(),
            data_type: String::new(),
        };
        items.push(&uri, domain);
        Ok(())
    })?;

    reader.each_extension(|extension| {
        if extension.kind() != ExtensionKind::DpmTypedDomain {
            return Ok(());
        }
        extension.each_member(|member| {
            let code_uri =
                required_uri(member.code_uri(), "Typed domain extension member code", diagnostic)?;
            items.update(&code_uri, |domain| {
                domain.data_type = translate(
                    DOMAIN_DATA_TYPE_TRANSLATIONS,
                    &member.value_or_empty(MemberValueType::DpmDomainDataType),
                );
            });
            Ok(())
        })
    })?;

    Ok(items.into_items())
}
