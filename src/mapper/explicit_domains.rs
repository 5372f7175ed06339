use std::collections::HashMap;
use std::sync::Arc;

use super::concept::dpm_concept;
use super::hierarchies::map_hierarchies;
use super::items::UriIdentifiedItems;
use super::reader::{required_uri, CodeListReader};
use crate::diagnostic::{DiagnosticBridge, Stop};
use crate::model::{DpmElementKind, ExplicitDomain, Member, Owner};

/// Domains come from the codes of the list; each domain's members and hierarchies come
/// from the sub code list its code points to with `subCodeScheme`.
pub(crate) fn map_explicit_domains(
    reader: &CodeListReader<'_>,
    owner: &Arc<Owner>,
    diagnostic: &DiagnosticBridge,
) -> Result<Vec<ExplicitDomain>, Stop> {
    let mut items = UriIdentifiedItems::new();
    let mut domain_uris_by_sub_code_list: HashMap<String, String> = HashMap::new();

    reader.each_code(|code| {
        let uri = required_uri(code.uri.as_deref(), "Explicit domain code", diagnostic)?;

        if let Some(sub_code_list_uri) = code
            .sub_code_scheme
            .as_ref()
            .and_then(|scheme| scheme.uri.as_deref())
            .filter(|uri| !uri.trim().is_empty())
        {
            domain_uris_by_sub_code_list
                .entry(sub_code_list_uri.to_string())
                .or_insert_with(|| uri.clone());
        }

        let domain = ExplicitDomain {
            uri: uri.clone(),
            concept: dpm_concept(&code.concept, owner, diagnostic)?,
            domain_code: code.code_value.unwrap_or_default(),
            members: Vec::new(),
            hierarchies: Vec::new(),
        };
        items.push(&uri, domain);
        Ok(())
    })?;

    reader.each_sub_code_list(|sub_code_list| {
        let Some(domain_uri) = sub_code_list
            .meta()
            .uri
            .as_deref()
            .and_then(|uri| domain_uris_by_sub_code_list.get(uri))
        else {
            return Ok(());
        };

        let members = map_members(sub_code_list, owner, diagnostic)?;
        let hierarchies = map_hierarchies(sub_code_list, DpmElementKind::Member, owner, diagnostic)?;

        items.update(domain_uri, |domain| {
            domain.members = members;
            domain.hierarchies = hierarchies;
        });
        Ok(())
    })?;

    Ok(items.into_items())
}

fn map_members(
    reader: &CodeListReader<'_>,
    owner: &Arc<Owner>,
    diagnostic: &DiagnosticBridge,
) -> Result<Vec<Member>, Stop> {
    let default_member_uri = reader
        .meta()
        .default_code
        .as_ref()
        .and_then(|default_code| default_code.uri.clone());

    let mut members = Vec::new();
    reader.each_code(|code| {
        let uri = required_uri(code.uri.as_deref(), "Member code", diagnostic)?;
        members.push(Member {
            default_member: default_member_uri.as_deref() == Some(uri.as_str()),
            concept: dpm_concept(&code.concept, owner, diagnostic)?,
            member_code: code.code_value.unwrap_or_default(),
            uri,
        });
        Ok(())
    })?;
    Ok(members)
}
