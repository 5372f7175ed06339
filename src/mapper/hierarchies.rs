use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use indexmap::IndexMap;

use super::concept::dpm_concept;
use super::rds_model::{MemberValueType, RdsExtensionMember};
use super::reader::{required_uri, CodeListReader, ExtensionReader};
use crate::diagnostic::{DiagnosticBridge, Stop};
use crate::model::{DpmElementKind, DpmElementRef, Hierarchy, HierarchyNode, Owner};

/// Maps every hierarchy extension of the code list into a [`Hierarchy`].
///
/// Node member references point at elements of `member_kind`.
pub(crate) fn map_hierarchies(
    reader: &CodeListReader<'_>,
    member_kind: DpmElementKind,
    owner: &Arc<Owner>,
    diagnostic: &DiagnosticBridge,
) -> Result<Vec<Hierarchy>, Stop> {
    let mut hierarchies = Vec::new();
    reader.each_extension(|extension| {
        if extension.kind().is_hierarchy() {
            hierarchies.push(map_hierarchy(extension, member_kind, owner, diagnostic)?);
        }
        Ok(())
    })?;
    Ok(hierarchies)
}

struct NodeItem {
    uri: String,
    parent_uri: Option<String>,
    member: RdsExtensionMember,
}

fn map_hierarchy(
    extension: &ExtensionReader<'_>,
    member_kind: DpmElementKind,
    owner: &Arc<Owner>,
    diagnostic: &DiagnosticBridge,
) -> Result<Hierarchy, Stop> {
    let meta = extension.meta();
    let uri = required_uri(meta.uri.as_deref(), "Hierarchy extension", diagnostic)?;
    let hierarchy_code = meta.code_value.clone().unwrap_or_default();

    let mut items = Vec::new();
    extension.each_member(|member| {
        let uri = required_uri(member.uri.as_deref(), "Hierarchy node", diagnostic)?;
        items.push(NodeItem {
            uri,
            parent_uri: member.parent_uri().map(str::to_string),
            member,
        });
        Ok(())
    })?;

    // Children grouped by parent uri, in source order; roots under `None`.
    let mut children: IndexMap<Option<&str>, Vec<&NodeItem>> = IndexMap::new();
    for item in &items {
        children
            .entry(item.parent_uri.as_deref())
            .or_default()
            .push(item);
    }

    let builder = TreeBuilder {
        hierarchy_code: &hierarchy_code,
        children: &children,
        member_kind,
        owner,
        diagnostic,
    };
    let mut path = Vec::new();
    let root_nodes = builder.build_children(None, &mut path)?;
    builder.check_unreached(&items, &root_nodes)?;

    Ok(Hierarchy {
        uri,
        concept: dpm_concept(&meta.concept, owner, diagnostic)?,
        hierarchy_code,
        root_nodes,
    })
}

struct TreeBuilder<'a> {
    hierarchy_code: &'a str,
    children: &'a IndexMap<Option<&'a str>, Vec<&'a NodeItem>>,
    member_kind: DpmElementKind,
    owner: &'a Arc<Owner>,
    diagnostic: &'a DiagnosticBridge,
}

impl<'a> TreeBuilder<'a> {
    /// `path` holds the uris from the root down to `parent_uri`.
    fn build_children(
        &self,
        parent_uri: Option<&'a str>,
        path: &mut Vec<&'a str>,
    ) -> Result<Vec<HierarchyNode>, Stop> {
        let Some(items) = self.children.get(&parent_uri) else {
            return Ok(Vec::new());
        };

        let mut nodes = Vec::with_capacity(items.len());
        for item in items {
            if path.contains(&item.uri.as_str()) {
                return Err(self.diagnostic.fatal(format!(
                    "Hierarchy '{}': cyclic parent reference at node {}",
                    self.hierarchy_code, item.uri
                )));
            }

            path.push(item.uri.as_str());
            let child_nodes = self.build_children(Some(item.uri.as_str()), path)?;
            path.pop();

            nodes.push(self.node(item, child_nodes)?);
        }
        Ok(nodes)
    }

    /// Nodes not reachable from a root either hang below an unknown parent (ERROR) or sit
    /// on a parent cycle (FATAL).
    fn check_unreached(&self, items: &[NodeItem], root_nodes: &[HierarchyNode]) -> Result<(), Stop> {
        let mut reached = HashSet::new();
        collect_uris(root_nodes, &mut reached);
        if reached.len() == items.len() {
            return Ok(());
        }

        let by_uri: HashMap<&str, &NodeItem> = items
            .iter()
            .rev()
            .map(|item| (item.uri.as_str(), item))
            .collect();
        let unreached = items
            .iter()
            .filter(|item| !reached.contains(item.uri.as_str()));

        let mut cyclic = None;
        for item in unreached {
            let mut seen = vec![item.uri.as_str()];
            let mut current = item;
            while let Some(parent_uri) = current.parent_uri.as_deref() {
                let Some(&parent) = by_uri.get(parent_uri) else {
                    if current.uri == item.uri {
                        self.diagnostic.error(format!(
                            "Hierarchy '{}': node {} refers to unknown parent node {parent_uri}",
                            self.hierarchy_code, item.uri
                        ));
                    }
                    break;
                };
                if seen.contains(&parent_uri) {
                    cyclic.get_or_insert(item.uri.as_str());
                    break;
                }
                seen.push(parent_uri);
                current = parent;
            }
        }

        match cyclic {
            Some(uri) => Err(self.diagnostic.fatal(format!(
                "Hierarchy '{}': cyclic parent reference at node {uri}",
                self.hierarchy_code
            ))),
            None => Ok(()),
        }
    }

    fn node(&self, item: &NodeItem, child_nodes: Vec<HierarchyNode>) -> Result<HierarchyNode, Stop> {
        let member = &item.member;
        let code = member.code.as_ref();

        // Nodes without an own label show the label of the referenced code.
        let concept_data = match code {
            Some(code) if !member.concept.has_label() => &code.concept,
            _ => &member.concept,
        };
        let concept = dpm_concept(concept_data, self.owner, self.diagnostic)?;

        let member_uri = member.code_uri().unwrap_or_default().to_string();
        let member_label = code
            .and_then(|code| code.code_value.clone())
            .unwrap_or_else(|| member_uri.clone());

        Ok(HierarchyNode {
            uri: item.uri.clone(),
            concept,
            abstract_node: member
                .value(MemberValueType::AbstractNode)
                .is_some_and(|value| value.eq_ignore_ascii_case("true")),
            comparison_operator: member
                .value(MemberValueType::ComparisonOperator)
                .map(str::to_string),
            unary_operator: member.value(MemberValueType::UnaryOperator).map(str::to_string),
            member_ref: DpmElementRef::new(member_uri, self.member_kind, member_label),
            child_nodes,
        })
    }
}

fn collect_uris<'n>(nodes: &'n [HierarchyNode], uris: &mut HashSet<&'n str>) {
    for node in nodes {
        uris.insert(node.uri.as_str());
        collect_uris(&node.child_nodes, uris);
    }
}
