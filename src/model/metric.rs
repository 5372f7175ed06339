use std::collections::HashSet;

use super::{element_info, validate_dpm_element, Concept, DpmElement, DpmElementKind, Hierarchy};
use crate::validation::{
    validate_custom, validate_dpm_code_content, validate_element_value_unique, validate_length,
    validate_referenced_values_contained, Validatable, ValidatableInfo, ValidationResults,
};

pub const METRIC_DATA_TYPES: &[&str] = &[
    "Enumeration/Code",
    "Boolean",
    "Date",
    "Integer",
    "Monetary",
    "Percent",
    "String",
    "Decimal",
    "Lei",
    "Isin",
];
pub const METRIC_FLOW_TYPES: &[&str] = &["Stock", "Flow"];
pub const METRIC_BALANCE_TYPES: &[&str] = &["Credit", "Debit"];

pub const METRIC_DOMAIN_URI: &str = "MET";
pub const METRIC_DOMAIN_CODE: &str = "MET";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metric {
    pub uri: String,
    pub concept: Concept,
    pub metric_code: String,
    pub data_type: String,
    pub flow_type: Option<String>,
    pub balance_type: Option<String>,
    pub referenced_domain_code: Option<String>,
    pub referenced_hierarchy_code: Option<String>,
}

impl DpmElement for Metric {
    fn uri(&self) -> &str {
        &self.uri
    }

    fn concept(&self) -> &Concept {
        &self.concept
    }

    fn kind(&self) -> DpmElementKind {
        DpmElementKind::Metric
    }

    fn code(&self) -> &str {
        &self.metric_code
    }
}

impl Validatable for Metric {
    fn validatable_info(&self) -> ValidatableInfo {
        element_info(self)
    }

    fn validate(&self, results: &mut ValidationResults) {
        validate_dpm_element(results, self);
        validate_length(results, self, "metricCode", self.metric_code.as_str(), 1, 50);
        validate_dpm_code_content(results, self, "metricCode", &self.metric_code);

        validate_custom(
            results,
            self,
            "dataType",
            !METRIC_DATA_TYPES.contains(&self.data_type.as_str()),
            || format!("unsupported data type '{}'", self.data_type),
        );

        if let Some(flow_type) = &self.flow_type {
            validate_custom(
                results,
                self,
                "flowType",
                !METRIC_FLOW_TYPES.contains(&flow_type.as_str()),
                || format!("unsupported flow type '{flow_type}'"),
            );
        }

        if let Some(balance_type) = &self.balance_type {
            validate_custom(
                results,
                self,
                "balanceType",
                !METRIC_BALANCE_TYPES.contains(&balance_type.as_str()),
                || format!("unsupported balance type '{balance_type}'"),
            );
        }
    }
}

/// The per-dictionary domain that holds all metrics and the hierarchies over them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricDomain {
    pub uri: String,
    pub concept: Concept,
    pub domain_code: String,
    pub metrics: Vec<Metric>,
    pub hierarchies: Vec<Hierarchy>,
}

impl DpmElement for MetricDomain {
    fn uri(&self) -> &str {
        &self.uri
    }

    fn concept(&self) -> &Concept {
        &self.concept
    }

    fn kind(&self) -> DpmElementKind {
        DpmElementKind::MetricDomain
    }

    fn code(&self) -> &str {
        &self.domain_code
    }
}

impl Validatable for MetricDomain {
    fn validatable_info(&self) -> ValidatableInfo {
        element_info(self)
    }

    fn validate(&self, results: &mut ValidationResults) {
        validate_dpm_element(results, self);
        validate_length(results, self, "domainCode", self.domain_code.as_str(), 2, 50);
        validate_length(results, self, "metrics", &self.metrics, 0, 10000);
        validate_length(results, self, "hierarchies", &self.hierarchies, 0, 10000);

        validate_element_value_unique(results, self, "metrics", self.metrics.iter(), |m| m.uri.clone(), "uri");
        validate_element_value_unique(
            results,
            self,
            "metrics",
            self.metrics.iter(),
            |m| m.metric_code.clone(),
            "metricCode",
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

        let metric_uris: HashSet<&str> = self.metrics.iter().map(|m| m.uri.as_str()).collect();
        validate_referenced_values_contained(
            results,
            self,
            "hierarchies",
            &metric_uris,
            self.hierarchies.iter().flat_map(|h| {
                h.all_nodes()
                    .into_iter()
                    .map(|node| (node.uri.as_str(), node.member_ref.uri.as_str()))
            }),
            |node, metric| {
                format!(
                    "DPM HierarchyNode {node} refers to DPM Metric {metric} which is not part of the containing DPM MetricDomain."
                )
            },
        );

        for metric in &self.metrics {
            metric.validate(results);
        }
        for hierarchy in &self.hierarchies {
            hierarchy.validate(results);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::test_support::*;

    fn metric(code: &str) -> Metric {
        Metric {
            uri: format!("met_{code}_uri"),
            concept: concept(&format!("Metric {code}")),
            metric_code: code.into(),
            data_type: "Monetary".into(),
            flow_type: Some("Stock".into()),
            balance_type: None,
            referenced_domain_code: None,
            referenced_hierarchy_code: None,
        }
    }

    fn metric_domain(metrics: Vec<Metric>, hierarchies: Vec<Hierarchy>) -> MetricDomain {
        MetricDomain {
            uri: METRIC_DOMAIN_URI.into(),
            concept: concept("Metrics"),
            domain_code: METRIC_DOMAIN_CODE.into(),
            metrics,
            hierarchies,
        }
    }

    #[test]
    fn duplicate_metric_uri_and_code_are_reported() {
        let domain = metric_domain(vec![metric("mi1"), metric("mi1"), metric("mi2")], vec![]);

        let mut found = messages(&domain);
        found.sort();
        assert_eq!(
            found,
            vec![
                "MetricDomain.metrics: duplicate metricCode value 'mi1'",
                "MetricDomain.metrics: duplicate uri value 'met_mi1_uri'",
            ]
        );
    }

    #[test]
    fn hierarchy_nodes_must_reference_metrics_of_the_domain() {
        let domain = metric_domain(
            vec![metric("mi1"), metric("mi2")],
            vec![hierarchy(
                "MH",
                vec![
                    node("hn_1", "met_mi1_uri", vec![]),
                    node("hn_2", "met_mi2_uri", vec![node("hn_2.1", "met_x_uri", vec![])]),
                ],
            )],
        );

        assert_eq!(
            messages(&domain),
            vec!["MetricDomain.hierarchies: DPM HierarchyNode hn_2.1 refers to DPM Metric met_x_uri which is not part of the containing DPM MetricDomain."]
        );
    }

    #[test]
    fn unknown_flow_type_is_rejected() {
        let mut m = metric("mi1");
        m.flow_type = Some("Instant".into());
        assert_eq!(
            messages(&m),
            vec!["Metric.flowType: unsupported flow type 'Instant'"]
        );
    }
}
