use std::sync::Arc;

use super::concept::dpm_concept;
use super::hierarchies::map_hierarchies;
use super::items::UriIdentifiedItems;
use super::reader::{required_uri, CodeListReader};
use super::rds_model::MemberValueType;
use crate::diagnostic::{DiagnosticBridge, Stop};
use crate::model::{
    DpmElementKind, Language, Metric, MetricDomain, Owner, TranslatedText, METRIC_DOMAIN_CODE,
    METRIC_DOMAIN_URI,
};
use crate::source::ExtensionKind;

const METRIC_DATA_TYPE_TRANSLATIONS: &[(&str, &str)] = &[
    ("Enumeration", "Enumeration/Code"),
    ("Percentage", "Percent"),
];

const METRIC_FLOW_TYPE_TRANSLATIONS: &[(&str, &str)] = &[("Instant", "Stock"), ("Duration", "Flow")];

/// Source vocabulary to DPM vocabulary; unknown values pass through unchanged.
pub(crate) fn translate(translations: &[(&str, &str)], value: &str) -> String {
    translations
        .iter()
        .find(|(source, _)| *source == value)
        .map_or(value, |&(_, target)| target)
        .to_string()
}

/// Synthesizes the single `MET` domain from the metrics code list.
pub(crate) fn map_metric_domain(
    reader: &CodeListReader<'_>,
    owner: &Arc<Owner>,
    diagnostic: &DiagnosticBridge,
) -> Result<Vec<MetricDomain>, Stop> {
    let label_language = Language::by_iso_code("en")
        .filter(|english| owner.languages.contains(english))
        .unwrap_or(owner.default_language);

    let concept = dpm_concept(&reader.meta().concept, owner, diagnostic)?.with_texts(
        TranslatedText::single(label_language, "Metrics"),
        TranslatedText::empty(),
    );

    let metrics = map_metrics(reader, owner, diagnostic)?;
    let hierarchies = map_hierarchies(reader, DpmElementKind::Metric, owner, diagnostic)?;

    Ok(vec![MetricDomain {
        uri: METRIC_DOMAIN_URI.to_string(),
        concept,
        domain_code: METRIC_DOMAIN_CODE.to_string(),
        metrics,
        hierarchies,
    }])
}

fn map_metrics(
    reader: &CodeListReader<'_>,
    owner: &Arc<Owner>,
    diagnostic: &DiagnosticBridge,
) -> Result<Vec<Metric>, Stop> {
    let mut items = UriIdentifiedItems::new();

    reader.each_code(|code| {
        let uri = required_uri(code.uri.as_deref(), "Metric code", diagnostic)?;
        let metric = Metric {
            uri: uri.clone(),
            concept: dpm_concept(&code.concept, owner, diagnostic)?,
            metric_code: code.code_value.unwrap_or_default(),
            data_type: String::new(),
            flow_type: None,
            balance_type: None,
            referenced_domain_code: None,
            referenced_hierarchy_code: None,
        };
        items.push(&uri, metric);
        Ok(())
    })?;

    reader.each_extension(|extension| {
        if extension.kind() != ExtensionKind::DpmMetric {
            return Ok(());
        }
        extension.each_member(|member| {
            let code_uri = required_uri(member.code_uri(), "Metric extension member code", diagnostic)?;
            items.update(&code_uri, |metric| {
                metric.data_type = translate(
                    METRIC_DATA_TYPE_TRANSLATIONS,
                    &member.value_or_empty(MemberValueType::DpmMetricDataType),
                );
                metric.flow_type = member
                    .value(MemberValueType::DpmFlowType)
                    .map(|flow_type| translate(METRIC_FLOW_TYPE_TRANSLATIONS, flow_type));
                metric.balance_type = member
                    .value(MemberValueType::DpmBalanceType)
                    .map(str::to_string);
                metric.referenced_domain_code = member
                    .value(MemberValueType::DpmDomainReference)
                    .map(str::to_string);
                metric.referenced_hierarchy_code = member
                    .value(MemberValueType::DpmHierarchyReference)
                    .map(str::to_string);
            });
            Ok(())
        })
    })?;

    Ok(items.into_items())
}
