mod common;

use std::path::Path;

use common::{member, write_source, DictionaryFixture};
use dpm_taxgen::diagnostic::{DiagnosticBridge, DiagnosticCollector, Stop};
use dpm_taxgen::pipeline::{compile_dpm_db, replace_dictionary_in_dpm_db};
use dpm_taxgen::source::SourceSpec;
use dpm_taxgen::writer::{DictionaryWriteReport, DpmDbWriteReport};
use rusqlite::Connection;
use tempfile::tempdir;

fn bridge() -> (DiagnosticBridge, DiagnosticCollector) {
    let collector = DiagnosticCollector::new();
    (DiagnosticBridge::new(Box::new(collector.clone())), collector)
}

fn source_folder(root: &Path, name: &str, dictionaries: &[DictionaryFixture]) -> SourceSpec {
    let folder = root.join(name);
    write_source(&folder, dictionaries);
    SourceSpec::Folder(folder)
}

fn strings(db: &Path, sql: &str) -> Vec<String> {
    let connection = Connection::open(db).unwrap();
    let mut statement = connection.prepare(sql).unwrap();
    let rows = statement
        .query_map([], |row| row.get::<_, String>(0))
        .unwrap();
    let values = rows.map(Result::unwrap).collect();
    values
}

fn count(db: &Path, sql: &str) -> i64 {
    let connection = Connection::open(db).unwrap();
    connection.query_row(sql, [], |row| row.get(0)).unwrap()
}

fn standard_report(prefix: &str) -> DictionaryWriteReport {
    DictionaryWriteReport {
        owner_prefix: prefix.to_string(),
        explicit_domains: 1,
        typed_domains: 1,
        members: 4,
        hierarchies: 2,
        hierarchy_nodes: 4,
        dimensions: 2,
        metrics: 2,
    }
}

#[test]
fn compile_writes_every_element_with_xbrl_codes() {
    let dir = tempdir().unwrap();
    let source = source_folder(dir.path(), "source", &[DictionaryFixture::standard("TO")]);
    let db = dir.path().join("dpm.db");
    let (diagnostic, _) = bridge();

    let report = compile_dpm_db(&source, &db, false, &diagnostic).unwrap();
    assert_eq!(
        report,
        DpmDbWriteReport {
            dictionaries: vec![standard_report("TO")]
        }
    );

    assert_eq!(
        strings(&db, "SELECT DomainXBRLCode FROM mDomain ORDER BY DomainID"),
        vec!["TO_exp:DOM", "TO_typ:TD", "TO_exp:MET"]
    );
    assert_eq!(
        strings(&db, "SELECT MemberXBRLCode FROM mMember ORDER BY MemberID"),
        vec!["TO_DOM:m1", "TO_DOM:m2", "TO_met:mi1", "TO_met:mi2"]
    );
    assert_eq!(
        strings(&db, "SELECT DimensionXBRLCode FROM mDimension ORDER BY DimensionID"),
        vec!["TO_dim:DIM", "TO_dim:TDIM"]
    );
    assert_eq!(
        strings(&db, "SELECT DataType || '/' || FlowType FROM mMetric ORDER BY MetricID"),
        vec!["Enumeration/Code/Stock", "Percent/Flow"]
    );
    assert_eq!(
        count(
            &db,
            "SELECT COUNT(*) FROM mMetric me
             JOIN mDomain d ON d.DomainID = me.ReferencedDomainID
             JOIN mHierarchy h ON h.HierarchyID = me.ReferencedHierarchyID
             WHERE d.DomainCode = 'DOM' AND h.HierarchyCode = 'HIER'"
        ),
        1
    );
    assert_eq!(
        strings(
            &db,
            "SELECT m.MemberCode || ':' || n.Level || ':' || n.`Order` || ':' || IFNULL(p.MemberCode, '-')
             FROM mHierarchyNode n
             JOIN mHierarchy h ON h.HierarchyID = n.HierarchyID
             JOIN mMember m ON m.MemberID = n.MemberID
             LEFT JOIN mMember p ON p.MemberID = n.ParentMemberID
             WHERE h.HierarchyCode = 'HIER' ORDER BY n.`Order`"
        ),
        vec!["m1:1:1:-", "m2:2:2:m1"]
    );
    assert_eq!(
        strings(
            &db,
            "SELECT t.Text FROM mConceptTranslation t
             JOIN mLanguage l ON l.LanguageID = t.LanguageID
             JOIN mDomain d ON d.ConceptID = t.ConceptID
             WHERE d.DomainCode = 'DOM' AND t.Role = 'label' ORDER BY l.IsoCode"
        ),
        vec!["Explicit domain", "Explicit domain fi"]
    );
}

#[test]
fn compile_refuses_existing_database_unless_forced() {
    let dir = tempdir().unwrap();
    let source = source_folder(dir.path(), "source", &[DictionaryFixture::standard("TO")]);
    let db = dir.path().join("dpm.db");
    std::fs::write(&db, "").unwrap();

    let (diagnostic, collector) = bridge();
    assert_eq!(compile_dpm_db(&source, &db, false, &diagnostic), Err(Stop::Halt));
    assert!(collector
        .messages()
        .iter()
        .any(|message| message.starts_with("[FATAL] [Target file already exists")));

    let (diagnostic, _) = bridge();
    assert!(compile_dpm_db(&source, &db, true, &diagnostic).is_ok());
}

#[test]
fn replace_rewrites_only_the_owners_of_the_source() {
    let dir = tempdir().unwrap();
    let initial = source_folder(
        dir.path(),
        "initial",
        &[DictionaryFixture::standard("TO"), DictionaryFixture::standard("OT")],
    );
    let db = dir.path().join("dpm.db");
    let (diagnostic, _) = bridge();
    compile_dpm_db(&initial, &db, false, &diagnostic).unwrap();

    let mut updated = DictionaryFixture::standard("TO");
    updated.code_list_mut("met").code_pages[0]["results"]
        .as_array_mut()
        .unwrap()
        .push(common::code("http://uri.example/TO/met/mi3", "mi3", "Metric 3"));
    updated.code_list_mut("met").extensions[0].member_pages[0]["results"]
        .as_array_mut()
        .unwrap()
        .push(member(
            "http://uri.example/TO/met/ext/metric/3",
            "http://uri.example/TO/met/mi3",
            "mi3",
            &[("dpmMetricDataType", "Integer")],
        ));
    let replacement = source_folder(dir.path(), "replacement", &[updated]);

    let (diagnostic, _) = bridge();
    let report = replace_dictionary_in_dpm_db(&replacement, &db, &diagnostic).unwrap();
    assert_eq!(report.dictionaries[0].metrics, 3);

    assert_eq!(
        strings(
            &db,
            "SELECT MemberXBRLCode FROM mMember WHERE MemberXBRLCode LIKE 'TO_met:%' ORDER BY MemberID"
        ),
        vec!["TO_met:mi1", "TO_met:mi2", "TO_met:mi3"]
    );
    assert_eq!(
        count(&db, "SELECT COUNT(*) FROM mMember WHERE MemberXBRLCode LIKE 'OT\\_%' ESCAPE '\\'"),
        4
    );
    assert_eq!(count(&db, "SELECT COUNT(*) FROM mOwner"), 2);
    assert_eq!(count(&db, "SELECT COUNT(*) FROM mDomain"), 6);
    assert_eq!(count(&db, "SELECT COUNT(*) FROM mHierarchyNode"), 8);
    assert_eq!(count(&db, "SELECT COUNT(*) FROM mMetric"), 5);
    assert_eq!(
        count(
            &db,
            "SELECT COUNT(*) FROM mConceptTranslation
             WHERE ConceptID NOT IN (SELECT ConceptID FROM mConcept)"
        ),
        0
    );
}

#[test]
fn unresolved_metric_reference_rolls_back_the_replace() {
    let dir = tempdir().unwrap();
    let initial = source_folder(dir.path(), "initial", &[DictionaryFixture::standard("TO")]);
    let db = dir.path().join("dpm.db");
    let (diagnostic, _) = bridge();
    compile_dpm_db(&initial, &db, false, &diagnostic).unwrap();
    let concepts_before = count(&db, "SELECT COUNT(*) FROM mConcept");

    let mut broken = DictionaryFixture::standard("TO");
    broken.code_list_mut("met").extensions[0].member_pages[0]["results"][0]["memberValues"][3]["value"] =
        serde_json::Value::from("UNKNOWN");
    let replacement = source_folder(dir.path(), "replacement", &[broken]);

    let (diagnostic, collector) = bridge();
    assert_eq!(
        replace_dictionary_in_dpm_db(&replacement, &db, &diagnostic),
        Err(Stop::Halt)
    );

    let messages = collector.messages();
    assert!(messages.contains(&"[ERROR] [Metric mi1 refers to unknown domain 'UNKNOWN']".to_string()));
    assert!(messages
        .contains(&"[INFO] [DPM database write has errors, changes rolled back]".to_string()));

    assert_eq!(count(&db, "SELECT COUNT(*) FROM mConcept"), concepts_before);
    assert_eq!(
        count(&db, "SELECT COUNT(*) FROM mMetric WHERE ReferencedDomainID IS NOT NULL"),
        1
    );
}

#[test]
fn replace_requires_an_existing_database() {
    let dir = tempdir().unwrap();
    let source = source_folder(dir.path(), "source", &[DictionaryFixture::standard("TO")]);
    let (diagnostic, collector) = bridge();

    assert_eq!(
        replace_dictionary_in_dpm_db(&source, &dir.path().join("missing.db"), &diagnostic),
        Err(Stop::Halt)
    );
    assert!(collector
        .messages()
        .iter()
        .any(|message| message.starts_with("[FATAL] [DPM database not found")));
}

#[test]
fn repeated_replace_keeps_foreign_keys_intact() {
    let dir = tempdir().unwrap();
    let source = source_folder(dir.path(), "source", &[DictionaryFixture::standard("TO")]);
    let db = dir.path().join("dpm.db");
    let (diagnostic, _) = bridge();
    compile_dpm_db(&source, &db, false, &diagnostic).unwrap();

    for _ in 0..2 {
        let (diagnostic, collector) = bridge();
        let report = replace_dictionary_in_dpm_db(&source, &db, &diagnostic).unwrap();
        assert_eq!(report.dictionaries, vec![standard_report("TO")]);
        assert!(!collector
            .messages()
            .iter()
            .any(|message| message.starts_with("[FATAL]") || message.starts_with("[ERROR]")));
    }

    assert_eq!(count(&db, "SELECT COUNT(*) FROM mDimension"), 2);
    assert_eq!(count(&db, "SELECT COUNT(*) FROM mMetric"), 2);
    assert_eq!(count(&db, "SELECT COUNT(*) FROM pragma_foreign_key_check"), 0);
    assert_eq!(
        count(
            &db,
            "SELECT COUNT(*) FROM mDimension d LEFT JOIN mDomain o ON o.DomainID = d.DomainID
             WHERE o.DomainID IS NULL"
        ),
        0
    );
}
