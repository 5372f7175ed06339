use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};

use super::rds_model::RdsConceptData;
use crate::diagnostic::{DiagnosticBridge, Stop};
use crate::model::{Concept, Language, Owner, TranslatedText};

/// Builds a concept; missing `created` means the Unix epoch, missing `modified` means `created`.
pub(crate) fn dpm_concept(
    data: &RdsConceptData,
    owner: &Arc<Owner>,
    diagnostic: &DiagnosticBridge,
) -> Result<Concept, Stop> {
    let created_at = match &data.created {
        Some(raw) => parse_timestamp(raw, "created", diagnostic)?,
        None => DateTime::<Utc>::default(),
    };
    let modified_at = match &data.modified {
        Some(raw) => parse_timestamp(raw, "modified", diagnostic)?,
        None => created_at,
    };
    let applicable_from = data
        .start_date
        .as_deref()
        .map(|raw| parse_date(raw, "startDate", diagnostic))
        .transpose()?;
    let applicable_until = data
        .end_date
        .as_deref()
        .map(|raw| parse_date(raw, "endDate", diagnostic))
        .transpose()?;

    let description = data
        .description
        .as_ref()
        .filter(|texts| !texts.is_empty())
        .or(data.definition.as_ref());

    Ok(Concept::new(
        created_at,
        modified_at,
        applicable_from,
        applicable_until,
        translated_text(data.pref_label.as_ref(), diagnostic),
        translated_text(description, diagnostic),
        Arc::clone(owner),
    ))
}

/// Unknown language codes are reported as errors and their texts dropped.
pub(crate) fn translated_text(
    texts: Option<&BTreeMap<String, String>>,
    diagnostic: &DiagnosticBridge,
) -> TranslatedText {
    let mut translations = BTreeMap::new();
    for (code, text) in texts.into_iter().flatten() {
        match Language::by_iso_code(code) {
            Some(language) => {
                translations.insert(language, text.clone());
            }
            None => diagnostic.error(format!("Unknown language code '{code}'")),
        }
    }
    TranslatedText::new(translations)
}

fn parse_timestamp(
    raw: &str,
    property: &str,
    diagnostic: &DiagnosticBridge,
) -> Result<DateTime<Utc>, Stop> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|timestamp| timestamp.with_timezone(&Utc))
        .map_err(|e| diagnostic.fatal(format!("Malformed timestamp in '{property}': {raw} ({e})")))
}

fn parse_date(raw: &str, property: &str, diagnostic: &DiagnosticBridge) -> Result<NaiveDate, Stop> {
    let raw = raw.trim();
    // Dates are sometimes published with a time part.
    let date_part = raw.split('T').next().unwrap_or(raw);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .map_err(|e| diagnostic.fatal(format!("Malformed date in '{property}': {raw} ({e})")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::DiagnosticCollector;
    use crate::model::test_support::{lang, owner};

    fn bridge() -> (DiagnosticBridge, DiagnosticCollector) {
        let collector = DiagnosticCollector::new();
        (DiagnosticBridge::new(Box::new(collector.clone())), collector)
    }

    fn concept_data(json: &str) -> RdsConceptData {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn timestamps_dates_and_texts_are_mapped() {
        let (diagnostic, _) = bridge();
        let data = concept_data(
            r#"{
              "created": "2018-09-03T10:12:25.243Z",
              "modified": "2018-09-04T08:00:00Z",
              "startDate": "2018-02-22",
              "endDate": "2018-05-15",
              "prefLabel": { "fi": "Nimike", "en": "Label" },
              "definition": { "en": "Definition" }
            }"#,
        );

        let concept = dpm_concept(&data, &owner(), &diagnostic).unwrap();

        assert_eq!(concept.created_at.to_rfc3339(), "2018-09-03T10:12:25.243+00:00");
        assert_eq!(concept.modified_at.to_rfc3339(), "2018-09-04T08:00:00+00:00");
        assert_eq!(concept.applicable_from, NaiveDate::from_ymd_opt(2018, 2, 22));
        assert_eq!(concept.applicable_until, NaiveDate::from_ymd_opt(2018, 5, 15));
        assert_eq!(concept.label.default_text(), Some("Nimike"));
        assert_eq!(concept.description.text(lang("en")), Some("Definition"));
    }

    #[test]
    fn missing_timestamps_default_to_epoch() {
        let (diagnostic, _) = bridge();
        let concept = dpm_concept(&RdsConceptData::default(), &owner(), &diagnostic).unwrap();
        assert_eq!(concept.created_at.timestamp(), 0);
        assert_eq!(concept.modified_at, concept.created_at);
        assert!(concept.label.is_empty());
    }

    #[test]
    fn malformed_timestamp_is_fatal() {
        let (diagnostic, collector) = bridge();
        let data = concept_data(r#"{ "created": "yesterday" }"#);

        assert_eq!(dpm_concept(&data, &owner(), &diagnostic), Err(Stop::Halt));
        assert!(collector.messages()[0].starts_with("[FATAL] [Malformed timestamp in 'created': yesterday"));
    }

    #[test]
    fn unknown_language_is_an_error() {
        let (diagnostic, collector) = bridge();
        let texts = BTreeMap::from([("xx".to_string(), "?".to_string())]);

        let text = translated_text(Some(&texts), &diagnostic);

        assert!(text.is_empty());
        assert_eq!(collector.messages(), vec!["[ERROR] [Unknown language code 'xx']"]);
    }
}
