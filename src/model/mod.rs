//! In-memory DPM model: owners, concepts and the element kinds of a dictionary.
//!
//! Every element pairs a `uri` and a kind-specific code with a [`Concept`]. Values are
//! immutable once built; the mapper produces them and the writer consumes them.
//! All types compare structurally, so two mapping runs over the same source can be
//! checked for equality.

mod concept;
mod dictionary;
mod dimension;
mod domain;
mod hierarchy;
mod language;
mod member;
mod metric;
mod owner;
mod translated_text;

pub use concept::Concept;
pub use dictionary::DpmDictionary;
pub use dimension::{ExplicitDimension, TypedDimension};
pub use domain::{ExplicitDomain, TypedDomain, TYPED_DOMAIN_DATA_TYPES};
pub use hierarchy::{Hierarchy, HierarchyNode, COMPARISON_OPERATORS, UNARY_OPERATORS};
pub use language::Language;
pub use member::Member;
pub use metric::{
    Metric, MetricDomain, METRIC_BALANCE_TYPES, METRIC_DATA_TYPES, METRIC_DOMAIN_CODE,
    METRIC_DOMAIN_URI, METRIC_FLOW_TYPES,
};
pub use owner::Owner;
pub use translated_text::TranslatedText;

use std::fmt;

use crate::validation::{validate_length, Validatable, ValidatableInfo, ValidationResults};

/// Closed set of element kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DpmElementKind {
    Member,
    ExplicitDomain,
    TypedDomain,
    Hierarchy,
    HierarchyNode,
    ExplicitDimension,
    TypedDimension,
    Metric,
    MetricDomain,
}

impl DpmElementKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            DpmElementKind::Member => "Member",
            DpmElementKind::ExplicitDomain => "ExplicitDomain",
            DpmElementKind::TypedDomain => "TypedDomain",
            DpmElementKind::Hierarchy => "Hierarchy",
            DpmElementKind::HierarchyNode => "HierarchyNode",
            DpmElementKind::ExplicitDimension => "ExplicitDimension",
            DpmElementKind::TypedDimension => "TypedDimension",
            DpmElementKind::Metric => "Metric",
            DpmElementKind::MetricDomain => "MetricDomain",
        }
    }
}

impl fmt::Display for DpmElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// Uri-based pointer from one element to another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DpmElementRef {
    pub uri: String,
    pub kind: DpmElementKind,
    pub diagnostic_label: String,
}

impl DpmElementRef {
    pub fn new(uri: impl Into<String>, kind: DpmElementKind, diagnostic_label: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            kind,
            diagnostic_label: diagnostic_label.into(),
        }
    }
}

pub trait DpmElement: Validatable {
    fn uri(&self) -> &str;

    fn concept(&self) -> &Concept;

    fn kind(&self) -> DpmElementKind;

    /// Kind-specific code (member code, domain code, ...).
    fn code(&self) -> &str;

    fn element_ref(&self) -> DpmElementRef {
        DpmElementRef::new(self.uri(), self.kind(), self.concept().diagnostic_label())
    }
}

/// Attribution used by every element's [`Validatable::validatable_info`].
pub(crate) fn element_info<E: DpmElement>(element: &E) -> ValidatableInfo {
    ValidatableInfo {
        object_kind: element.kind().type_name().to_string(),
        object_address: element.uri().to_string(),
    }
}

/// Rules shared by every element: uri bounds and the concept itself.
pub(crate) fn validate_dpm_element<E: DpmElement>(results: &mut ValidationResults, element: &E) {
    validate_length(results, element, "uri", element.uri(), 1, 500);
    element.concept().validate(results);
}
