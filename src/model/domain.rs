use std::collections::HashSet;

use super::{element_info, validate_dpm_element, Concept, DpmElement, DpmElementKind, Hierarchy, Member};
use crate::validation::{
    validate_custom, validate_dpm_code_content, validate_element_value_unique, validate_length,
    validate_referenced_values_contained, Validatable, ValidatableInfo, ValidationResults,
};

pub const TYPED_DOMAIN_DATA_TYPES: &[&str] = &[
    "Boolean", "Date", "Integer", "Monetary", "Percent", "String", "Decimal", "Lei", "Isin",
];

/// Domain with an enumerated member set and hierarchies over those members.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplicitDomain {
    pub uri: String,
    pub concept: Concept,
    pub domain_code: String,
    pub members: Vec<Member>,
    pub hierarchies: Vec<Hierarchy>,
}

impl DpmElement for ExplicitDomain {
    fn uri(&self) -> &str {
        &self.uri
    }

    fn concept(&self) -> &Concept {
        &self.concept
    }

    fn kind(&self) -> DpmElementKind {
        DpmElementKind::ExplicitDomain
    }

    fn code(&self) -> &str {
        &self.domain_code
    }
}

impl Validatable for ExplicitDomain {
    fn validatable_info(&self) -> ValidatableInfo {
        element_info(self)
    }

    fn validate(&self, results: &mut ValidationResults) {
        validate_dpm_element(results, self);
        validate_length(results, self, "domainCode", self.domain_code.as_str(), 2, 50);
        validate_dpm_code_content(results, self, "domainCode", &self.domain_code);
        validate_length(results, self, "members", &self.members, 0, 10000);
        validate_length(results, self, "hierarchies", &self.hierarchies, 0, 10000);

        validate_element_value_unique(results, self, "members", self.members.iter(), |m| m.uri.clone(), "uri");
        validate_element_value_unique(
            results,
            self,
            "members",
            self.members.iter(),
            |m| m.member_code.clone(),
            "memberCode",
        );
        validate_element_value_unique(
            results,
            self,
            "hierarchies",
            self.hierarchies.iter(),
            |h| h.uri.clone(),
            "uri",
        );
        validate_element_value_unique(
            results,
            self,
            "hierarchies",
            self.hierarchies.iter(),
            |h| h.hierarchy_code.clone(),
            "hierarchyCode",
        );

        let default_members = self.members.iter().filter(|m| m.default_member).count();
        validate_custom(results, self, "members", default_members > 1, || {
            format!("has {default_members} default members (maximum 1)")
        });

        let member_uris: HashSet<&str> = self.members.iter().map(|m| m.uri.as_str()).collect();
        validate_referenced_values_contained(
            results,
            self,
            "hierarchies",
            &member_uris,
            self.hierarchies.iter().flat_map(|h| {
                h.all_nodes()
                    .into_iter()
                    .map(|node| (node.uri.as_str(), node.member_ref.uri.as_str()))
            }),
            |node, member| {
                format!(
                    "DPM HierarchyNode {node} refers to DPM Member {member} which is not part of the containing DPM ExplicitDomain."
                )
            },
        );

        for member in &self.members {
            member.validate(results);
        }
        for hierarchy in &self.hierarchies {
            hierarchy.validate(results);
        }
    }
}

/// Domain whose values are free-form data of one type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedDomain {
    pub uri: String,
    pub concept: Concept,
    pub domain_code: String,
    pub data_type: String,
}

impl DpmElement for TypedDomain {
    fn uri(&self) -> &str {
        &self.uri
    }

    fn concept(&self) -> &Concept {
        &self.concept
    }

    fn kind(&self) -> DpmElementKind {
        DpmElementKind::TypedDomain
    }

    fn code(&self) -> &str {
        &self.domain_code
    }
}

impl Validatable for TypedDomain {
    fn validatable_info(&self) -> ValidatableInfo {
        element_info(self)
    }

    fn validate(&self, results: &mut ValidationResults) {
        validate_dpm_element(results, self);
        validate_length(results, self, "domainCode", self.domain_code.as_str(), 2, 50);
        validate_dpm_code_content(results, self, "domainCode", &self.domain_code);
        validate_custom(
            results,
            self,
            "dataType",
            !TYPED_DOMAIN_DATA_TYPES.contains(&self.data_type.as_str()),
            || format!("unsupported data type '{}'", self.data_type),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::test_support::*;

    fn typed_domain(data_type: &str) -> TypedDomain {
        TypedDomain {
            uri: "typ_dom_uri".into(),
            concept: concept("Typed domain"),
            domain_code: "TD".into(),
            data_type: data_type.into(),
        }
    }

    #[test]
    fn typed_domain_accepts_known_data_types() {
        for data_type in TYPED_DOMAIN_DATA_TYPES {
            assert!(messages(&typed_domain(data_type)).is_empty(), "{data_type}");
        }
    }

    #[test]
    fn typed_domain_rejects_unknown_data_type() {
        assert_eq!(
            messages(&typed_domain("Percentage")),
            vec!["TypedDomain.dataType: unsupported data type 'Percentage'"]
        );
    }

    fn explicit_domain(members: Vec<Member>, hierarchies: Vec<Hierarchy>) -> ExplicitDomain {
        ExplicitDomain {
            uri: "exp_dom_uri".into(),
            concept: concept("Explicit domain"),
            domain_code: "ED".into(),
            members,
            hierarchies,
        }
    }

    #[test]
    fn hierarchy_must_reference_own_members() {
        let domain = explicit_domain(
            vec![member("M1"), member("M2")],
            vec![hierarchy(
                "H1",
                vec![node("n1", "mbr_M1_uri", vec![node("n1.1", "foreign_uri", vec![])])],
            )],
        );

        assert_eq!(
            messages(&domain),
            vec!["ExplicitDomain.hierarchies: DPM HierarchyNode n1.1 refers to DPM Member foreign_uri which is not part of the containing DPM ExplicitDomain."]
        );
    }

    #[test]
    fn duplicate_member_codes_are_reported() {
        let mut second = member("M1");
        second.uri = "other_uri".into();
        let domain = explicit_domain(vec![member("M1"), second], vec![]);

        assert_eq!(
            messages(&domain),
            vec!["ExplicitDomain.members: duplicate memberCode value 'M1'"]
        );
    }

    #[test]
    fn only_one_default_member_allowed() {
        let mut first = member("M1");
        first.default_member = true;
        let mut second = member("M2");
        second.default_member = true;
        let domain = explicit_domain(vec![first, second], vec![]);

        assert_eq!(
            messages(&domain),
            vec!["ExplicitDomain.members: has 2 default members (maximum 1)"]
        );
    }
}
