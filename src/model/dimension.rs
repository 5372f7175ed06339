use super::{element_info, validate_dpm_element, Concept, DpmElement, DpmElementKind, DpmElementRef};
use crate::validation::{
    validate_dpm_code_content, validate_length, validate_non_blank_uri, Validatable,
    ValidatableInfo, ValidationResults,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplicitDimension {
    pub uri: String,
    pub concept: Concept,
    pub dimension_code: String,
    pub domain_ref: DpmElementRef,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedDimension {
    pub uri: String,
    pub concept: Concept,
    pub dimension_code: String,
    pub domain_ref: DpmElementRef,
}

fn validate_dimension<D: DpmElement>(
    results: &mut ValidationResults,
    dimension: &D,
    dimension_code: &str,
    domain_ref: &DpmElementRef,
) {
    validate_dpm_element(results, dimension);
    validate_length(results, dimension, "dimensionCode", dimension_code, 2, 50);
    validate_dpm_code_content(results, dimension, "dimensionCode", dimension_code);
    validate_non_blank_uri(results, dimension, "domainRef", &domain_ref.uri);
}

impl DpmElement for ExplicitDimension {
    fn uri(&self) -> &str {
        &self.uri
    }

    fn concept(&self) -> &Concept {
        &self.concept
    }

    fn kind(&self) -> DpmElementKind {
        DpmElementKind::ExplicitDimension
    }

    fn code(&self) -> &str {
        &self.dimension_code
    }
}

impl Validatable for ExplicitDimension {
    fn validatable_info(&self) -> ValidatableInfo {
        element_info(self)
    }

    fn validate(&self, results: &mut ValidationResults) {
        validate_dimension(results, self, &self.dimension_code, &self.domain_ref);
    }
}

impl DpmElement for TypedDimension {
    fn uri(&self) -> &str {
        &self.uri
    }

    fn concept(&self) -> &Concept {
        &self.concept
    }

    fn kind(&self) -> DpmElementKind {
        DpmElementKind::TypedDimension
    }

    fn code(&self) -> &str {
        &self.dimension_code
    }
}

impl Validatable for TypedDimension {
    fn validatable_info(&self) -> ValidatableInfo {
        element_info(self)
    }

    fn validate(&self, results: &mut ValidationResults) {
        validate_dimension(results, self, &self.dimension_code, &self.domain_ref);
    }
}
