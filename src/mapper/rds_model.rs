//! Serde shapes of the Reference Data service JSON: only the fields the mapper reads.

use std::collections::BTreeMap;

use serde::Deserialize;

/// Concept fields shared by code lists, codes, extensions and extension members.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RdsConceptData {
    pub created: Option<String>,
    pub modified: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub pref_label: Option<BTreeMap<String, String>>,
    pub description: Option<BTreeMap<String, String>>,
    pub definition: Option<BTreeMap<String, String>>,
}

impl RdsConceptData {
    pub fn has_label(&self) -> bool {
        self.pref_label.as_ref().is_some_and(|label| !label.is_empty())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RdsUriRef {
    pub uri: Option<String>,
    pub code_value: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RdsCodeListMeta {
    pub uri: Option<String>,
    pub code_value: Option<String>,
    pub default_code: Option<RdsUriRef>,
    #[serde(flatten)]
    pub concept: RdsConceptData,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RdsCode {
    pub uri: Option<String>,
    pub code_value: Option<String>,
    pub sub_code_scheme: Option<RdsUriRef>,
    #[serde(flatten)]
    pub concept: RdsConceptData,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct RdsCodePage {
    #[serde(default)]
    pub results: Vec<RdsCode>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RdsPropertyType {
    pub uri: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RdsExtensionMeta {
    pub uri: Option<String>,
    pub code_value: Option<String>,
    pub property_type: Option<RdsPropertyType>,
    #[serde(flatten)]
    pub concept: RdsConceptData,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RdsValueType {
    pub local_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RdsMemberValue {
    pub value: Option<String>,
    pub value_type: Option<RdsValueType>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RdsExtensionMember {
    pub uri: Option<String>,
    pub code: Option<RdsCode>,
    pub related_member: Option<RdsUriRef>,
    #[serde(default)]
    pub member_values: Vec<RdsMemberValue>,
    #[serde(flatten)]
    pub concept: RdsConceptData,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct RdsExtensionMemberPage {
    #[serde(default)]
    pub results: Vec<RdsExtensionMember>,
}

/// Member value types, by their `valueType.localName`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MemberValueType {
    DpmMetricDataType,
    DpmFlowType,
    DpmBalanceType,
    DpmDomainReference,
    DpmHierarchyReference,
    DpmDomainDataType,
    ComparisonOperator,
    UnaryOperator,
    AbstractNode,
}

impl MemberValueType {
    fn local_name(&self) -> &'static str {
        match self {
            MemberValueType::DpmMetricDataType => "dpmMetricDataType",
            MemberValueType::DpmFlowType => "dpmFlowType",
            MemberValueType::DpmBalanceType => "dpmBalanceType",
            MemberValueType::DpmDomainReference => "dpmDomainReference",
            MemberValueType::DpmHierarchyReference => "dpmHierarchyReference",
            MemberValueType::DpmDomainDataType => "dpmDomainDataType",
            MemberValueType::ComparisonOperator => "comparisonOperator",
            MemberValueType::UnaryOperator => "unaryOperator",
            MemberValueType::AbstractNode => "abstractNode",
        }
    }
}

impl RdsExtensionMember {
    /// Non-blank value of the given type, if present.
    pub fn value(&self, value_type: MemberValueType) -> Option<&str> {
        self.member_values
            .iter()
            .find(|member_value| {
                member_value
                    .value_type
                    .as_ref()
                    .and_then(|t| t.local_name.as_deref())
                    == Some(value_type.local_name())
            })
            .and_then(|member_value| member_value.value.as_deref())
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }

    pub fn value_or_empty(&self, value_type: MemberValueType) -> String {
        self.value(value_type).unwrap_or_default().to_string()
    }

    pub fn code_uri(&self) -> Option<&str> {
        self.code
            .as_ref()
            .and_then(|code| code.uri.as_deref())
            .filter(|uri| !uri.trim().is_empty())
    }

    pub fn parent_uri(&self) -> Option<&str> {
        self.related_member
            .as_ref()
            .and_then(|related| related.uri.as_deref())
            .filter(|uri| !uri.trim().is_empty())
    }
}
