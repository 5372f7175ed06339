use super::{element_info, validate_dpm_element, Concept, DpmElement, DpmElementKind, DpmElementRef};
use crate::validation::{
    validate_custom, validate_dpm_code_content, validate_element_value_unique, validate_length,
    validate_non_blank_uri, Validatable, ValidatableInfo, ValidationResults,
};

pub const COMPARISON_OPERATORS: &[&str] = &["=", "<=", ">="];
pub const UNARY_OPERATORS: &[&str] = &["+", "-"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hierarchy {
    pub uri: String,
    pub concept: Concept,
    pub hierarchy_code: String,
    pub root_nodes: Vec<HierarchyNode>,
}

impl Hierarchy {
    /// Every node of the tree in pre-order.
    pub fn all_nodes(&self) -> Vec<&HierarchyNode> {
        let mut nodes = Vec::new();
        for root in &self.root_nodes {
            root.collect_nodes(&mut nodes);
        }
        nodes
    }
}

impl DpmElement for Hierarchy {
    fn uri(&self) -> &str {
        &self.uri
    }

    fn concept(&self) -> &Concept {
        &self.concept
    }

    fn kind(&self) -> DpmElementKind {
        DpmElementKind::Hierarchy
    }

    fn code(&self) -> &str {
        &self.hierarchy_code
    }
}

impl Validatable for Hierarchy {
    fn validatable_info(&self) -> ValidatableInfo {
        element_info(self)
    }

    fn validate(&self, results: &mut ValidationResults) {
        validate_dpm_element(results, self);
        validate_length(results, self, "hierarchyCode", self.hierarchy_code.as_str(), 2, 50);
        validate_dpm_code_content(results, self, "hierarchyCode", &self.hierarchy_code);

        let nodes = self.all_nodes();
        validate_element_value_unique(
            results,
            self,
            "rootNodes",
            nodes.iter(),
            |node| node.uri.clone(),
            "uri",
        );
        validate_element_value_unique(
            results,
            self,
            "rootNodes",
            nodes.iter(),
            |node| node.member_ref.uri.clone(),
            "memberRef.uri",
        );

        for root in &self.root_nodes {
            root.validate(results);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HierarchyNode {
    pub uri: String,
    pub concept: Concept,
    pub abstract_node: bool,
    pub comparison_operator: Option<String>,
    pub unary_operator: Option<String>,
    pub member_ref: DpmElementRef,
    pub child_nodes: Vec<HierarchyNode>,
}

impl HierarchyNode {
    fn collect_nodes<'a>(&'a self, nodes: &mut Vec<&'a HierarchyNode>) {
        nodes.push(self);
        for child in &self.child_nodes {
            child.collect_nodes(nodes);
        }
    }

    pub fn all_nodes(&self) -> Vec<&HierarchyNode> {
        let mut nodes = Vec::new();
        self.collect_nodes(&mut nodes);
        nodes
    }
}

impl DpmElement for HierarchyNode {
    fn uri(&self) -> &str {
        &self.uri
    }

    fn concept(&self) -> &Concept {
        &self.concept
    }

    fn kind(&self) -> DpmElementKind {
        DpmElementKind::HierarchyNode
    }

    fn code(&self) -> &str {
        &self.uri
    }
}

impl Validatable for HierarchyNode {
    fn validatable_info(&self) -> ValidatableInfo {
        element_info(self)
    }

    fn validate(&self, results: &mut ValidationResults) {
        validate_dpm_element(results, self);
        validate_non_blank_uri(results, self, "memberRef", &self.member_ref.uri);

        if let Some(operator) = &self.comparison_operator {
            validate_custom(
                results,
                self,
                "comparisonOperator",
                !COMPARISON_OPERATORS.contains(&operator.as_str()),
                || format!("unsupported comparison operator '{operator}'"),
            );
        }

        if let Some(operator) = &self.unary_operator {
            validate_custom(
                results,
                self,
                "unaryOperator",
                !UNARY_OPERATORS.contains(&operator.as_str()),
                || format!("unsupported unary operator '{operator}'"),
            );
        }

        for child in &self.child_nodes {
            child.validate(results);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::model::test_support::*;

    #[test]
    fn nodes_are_listed_in_pre_order() {
        let h = hierarchy(
            "H1",
            vec![
                node("n1", "m1", vec![node("n1.1", "m2", vec![node("n1.1.1", "m3", vec![])])]),
                node("n2", "m4", vec![]),
            ],
        );

        let uris: Vec<&str> = h.all_nodes().iter().map(|n| n.uri.as_str()).collect();
        assert_eq!(uris, vec!["n1", "n1.1", "n1.1.1", "n2"]);
    }

    #[test]
    fn duplicate_node_anywhere_in_tree_is_reported_once() {
        let h = hierarchy(
            "H1",
            vec![
                node("X2", "m1", vec![]),
                node("n2", "m2", vec![node("X2", "m3", vec![])]),
            ],
        );

        assert_eq!(
            messages(&h),
            vec!["Hierarchy.rootNodes: duplicate uri value 'X2'"]
        );
    }

    #[test]
    fn duplicate_member_reference_is_reported() {
        let h = hierarchy(
            "H1",
            vec![node("n1", "m1", vec![]), node("n2", "m1", vec![])],
        );

        assert_eq!(
            messages(&h),
            vec!["Hierarchy.rootNodes: duplicate memberRef.uri value 'm1'"]
        );
    }

    #[test]
    fn nested_node_violations_surface_through_hierarchy() {
        let mut child = node("n1.1", "m2", vec![]);
        child.comparison_operator = Some("<>".into());
        let h = hierarchy("H1", vec![node("n1", "m1", vec![child])]);

        assert_eq!(
            messages(&h),
            vec!["HierarchyNode.comparisonOperator: unsupported comparison operator '<>'"]
        );
    }

    #[test]
    fn short_hierarchy_code_is_rejected() {
        let h = hierarchy("H", vec![]);
        assert_eq!(
            messages(&h),
            vec!["Hierarchy.hierarchyCode: is too short (minimum 2)"]
        );
    }
}
