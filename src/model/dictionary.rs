use std::sync::Arc;

use super::{ExplicitDimension, ExplicitDomain, MetricDomain, Owner, TypedDimension, TypedDomain};
use crate::validation::{
    validate_element_value_unique, validate_length, Validatable, ValidatableInfo,
    ValidationResults,
};

/// All elements published by one owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DpmDictionary {
    pub owner: Arc<Owner>,
    pub metric_domains: Vec<MetricDomain>,
    pub explicit_domains: Vec<ExplicitDomain>,
    pub typed_domains: Vec<TypedDomain>,
    pub explicit_dimensions: Vec<ExplicitDimension>,
    pub typed_dimensions: Vec<TypedDimension>,
}

impl Validatable for DpmDictionary {
    fn validatable_info(&self) -> ValidatableInfo {
        ValidatableInfo {
            object_kind: "DpmDictionary".into(),
            object_address: self.owner.prefix.clone(),
        }
    }

    fn validate(&self, results: &mut ValidationResults) {
        self.owner.validate(results);

        validate_length(results, self, "metricDomains", &self.metric_domains, 0, 1);
        validate_length(results, self, "explicitDomains", &self.explicit_domains, 0, 10000);
        validate_length(results, self, "typedDomains", &self.typed_domains, 0, 10000);
        validate_length(results, self, "explicitDimensions", &self.explicit_dimensions, 0, 10000);
        validate_length(results, self, "typedDimensions", &self.typed_dimensions, 0, 10000);

        let domains = self
            .metric_domains
            .iter()
            .map(|d| (d.uri.as_str(), d.domain_code.as_str()))
            .chain(
                self.explicit_domains
                    .iter()
                    .map(|d| (d.uri.as_str(), d.domain_code.as_str())),
            )
            .chain(
                self.typed_domains
                    .iter()
                    .map(|d| (d.uri.as_str(), d.domain_code.as_str())),
            )
            .collect::<Vec<_>>();
        validate_element_value_unique(results, self, "domains", domains.iter(), |d| d.0, "uri");
        validate_element_value_unique(results, self, "domains", domains.iter(), |d| d.1, "domainCode");

        let dimensions = self
            .explicit_dimensions
            .iter()
            .map(|d| (d.uri.as_str(), d.dimension_code.as_str()))
            .chain(
                self.typed_dimensions
                    .iter()
                    .map(|d| (d.uri.as_str(), d.dimension_code.as_str())),
            )
            .collect::<Vec<_>>();
        validate_element_value_unique(results, self, "dimensions", dimensions.iter(), |d| d.0, "uri");
        validate_element_value_unique(
            results,
            self,
            "dimensions",
            dimensions.iter(),
            |d| d.1,
            "dimensionCode",
        );

        for domain in &self.metric_domains {
            domain.validate(results);
        }
        for domain in &self.explicit_domains {
            domain.validate(results);
        }
        for domain in &self.typed_domains {
            domain.validate(results);
        }
        for dimension in &self.explicit_dimensions {
            dimension.validate(results);
        }
        for dimension in &self.typed_dimensions {
            dimension.validate(results);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::test_support::*;
    use crate::model::{DpmElementKind, DpmElementRef, TypedDomain};

    fn dictionary() -> DpmDictionary {
        DpmDictionary {
            owner: owner(),
            metric_domains: vec![],
            explicit_domains: vec![ExplicitDomain {
                uri: "exp_dom_uri".into(),
                concept: concept("Explicit domain"),
                domain_code: "DOM".into(),
                members: vec![member("M1")],
                hierarchies: vec![],
            }],
            typed_domains: vec![TypedDomain {
                uri: "typ_dom_uri".into(),
                concept: concept("Typed domain"),
                domain_code: "DOM".into(),
                data_type: "String".into(),
            }],
            explicit_dimensions: vec![ExplicitDimension {
                uri: "exp_dim_uri".into(),
                concept: concept("Dimension"),
                dimension_code: "DIM".into(),
                domain_ref: DpmElementRef::new("exp_dom_uri", DpmElementKind::ExplicitDomain, ""),
            }],
            typed_dimensions: vec![],
        }
    }

    #[test]
    fn domain_codes_must_be_unique_across_domain_kinds() {
        assert_eq!(
            messages(&dictionary()),
            vec!["DpmDictionary.domains: duplicate domainCode value 'DOM'"]
        );
    }

    #[test]
    fn one_pass_surfaces_violations_deep_in_the_tree() {
        let mut dictionary = dictionary();
        dictionary.typed_domains[0].domain_code = "TDOM".into();
        dictionary.explicit_domains[0].members[0].member_code = "9x".into();
        dictionary.explicit_dimensions[0].domain_ref.uri = String::new();

        assert_eq!(
            messages(&dictionary),
            vec![
                "ExplicitDimension.domainRef: empty or blank uri",
                "Member.memberCode: is illegal DPM Code",
            ]
        );
    }
}
