//! Captured-folder fixtures shared by the integration tests.
#![allow(dead_code)]

use std::fs;
use std::path::Path;

use serde_json::{json, Value};

const PROPERTY_TYPE_BASE: &str = "http://uri.suomi.fi/datamodel/ns/code#";

pub struct ExtensionFixture {
    pub meta: Value,
    pub member_pages: Vec<Value>,
}

pub struct CodeListFixture {
    pub meta: Value,
    pub code_pages: Vec<Value>,
    pub extensions: Vec<ExtensionFixture>,
    pub sub_code_lists: Vec<CodeListFixture>,
}

pub struct DictionaryFixture {
    pub owner: Value,
    /// Code lists by folder name (`met`, `exp_dom_hier`, ...).
    pub code_lists: Vec<(&'static str, CodeListFixture)>,
}

pub fn concept(label: &str) -> Value {
    json!({
        "created": "2018-09-03T10:12:25.763Z",
        "modified": "2018-09-03T22:10:36.863Z",
        "startDate": "2018-02-22",
        "endDate": "2018-05-15",
        "prefLabel": { "en": label, "fi": format!("{label} fi") }
    })
}

fn with_concept(mut value: Value, label: &str) -> Value {
    if let (Value::Object(target), Value::Object(source)) = (&mut value, concept(label)) {
        target.extend(source);
    }
    value
}

pub fn code(uri: &str, code_value: &str, label: &str) -> Value {
    with_concept(json!({ "uri": uri, "codeValue": code_value }), label)
}

pub fn code_list_meta(uri: &str, code_value: &str) -> Value {
    with_concept(
        json!({ "uri": uri, "codeValue": code_value }),
        &format!("Code list {code_value}"),
    )
}

pub fn extension_meta(uri: &str, code_value: &str, property_type: &str) -> Value {
    with_concept(
        json!({
            "uri": uri,
            "codeValue": code_value,
            "propertyType": { "uri": format!("{PROPERTY_TYPE_BASE}{property_type}") }
        }),
        &format!("Extension {code_value}"),
    )
}

/// Extension member pointing at `code_uri`, carrying `(localName, value)` member values.
pub fn member(uri: &str, code_uri: &str, code_value: &str, values: &[(&str, &str)]) -> Value {
    let member_values: Vec<Value> = values
        .iter()
        .map(|(local_name, value)| {
            json!({ "value": value, "valueType": { "localName": local_name } })
        })
        .collect();
    json!({
        "uri": uri,
        "code": code(code_uri, code_value, &format!("Code {code_value}")),
        "memberValues": member_values
    })
}

pub fn node(uri: &str, code_uri: &str, code_value: &str, parent: Option<&str>, values: &[(&str, &str)]) -> Value {
    let mut node = member(uri, code_uri, code_value, values);
    if let (Some(parent), Value::Object(fields)) = (parent, &mut node) {
        fields.insert("relatedMember".into(), json!({ "uri": parent }));
    }
    node
}

pub fn page(results: Vec<Value>) -> Value {
    json!({ "results": results })
}

impl CodeListFixture {
    pub fn new(meta: Value, codes: Vec<Value>) -> Self {
        Self {
            meta,
            code_pages: vec![page(codes)],
            extensions: Vec::new(),
            sub_code_lists: Vec::new(),
        }
    }

    pub fn with_extension(mut self, meta: Value, members: Vec<Value>) -> Self {
        self.extensions.push(ExtensionFixture {
            meta,
            member_pages: vec![page(members)],
        });
        self
    }

    pub fn with_sub_code_list(mut self, sub_code_list: CodeListFixture) -> Self {
        self.sub_code_lists.push(sub_code_list);
        self
    }

    fn write(&self, dir: &Path) {
        fs::create_dir_all(dir).unwrap();
        write_json(&dir.join("code_list_meta.json"), &self.meta);
        for (index, code_page) in self.code_pages.iter().enumerate() {
            write_json(&dir.join(format!("codes_page_{index}.json")), code_page);
        }
        for (index, extension) in self.extensions.iter().enumerate() {
            let extension_dir = dir.join(format!("extension_{index}"));
            fs::create_dir_all(&extension_dir).unwrap();
            write_json(&extension_dir.join("extension_meta.json"), &extension.meta);
            for (page_index, member_page) in extension.member_pages.iter().enumerate() {
                write_json(
                    &extension_dir.join(format!("members_page_{page_index}.json")),
                    member_page,
                );
            }
        }
        for (index, sub_code_list) in self.sub_code_lists.iter().enumerate() {
            sub_code_list.write(&dir.join(format!("sub_code_list_{index}")));
        }
    }
}

impl DictionaryFixture {
    /// A complete, valid dictionary: two metrics with a metric hierarchy, one explicit
    /// domain with two members and a hierarchy, one typed domain and one dimension of each kind.
    pub fn standard(prefix: &str) -> Self {
        let uri = |local: &str| format!("http://uri.example/{prefix}/{local}");

        let metrics = CodeListFixture::new(
            code_list_meta(&uri("met"), "met"),
            vec![
                code(&uri("met/mi1"), "mi1", "Metric 1"),
                code(&uri("met/mi2"), "mi2", "Metric 2"),
            ],
        )
        .with_extension(
            extension_meta(&uri("met/ext/metric"), "dpmMetric", "dpmMetric"),
            vec![
                member(
                    &uri("met/ext/metric/1"),
                    &uri("met/mi1"),
                    "mi1",
                    &[
                        ("dpmMetricDataType", "Enumeration"),
                        ("dpmFlowType", "Instant"),
                        ("dpmBalanceType", "Credit"),
                        ("dpmDomainReference", "DOM"),
                        ("dpmHierarchyReference", "HIER"),
                    ],
                ),
                member(
                    &uri("met/ext/metric/2"),
                    &uri("met/mi2"),
                    "mi2",
                    &[("dpmMetricDataType", "Percentage"), ("dpmFlowType", "Duration")],
                ),
            ],
        )
        .with_extension(
            extension_meta(&uri("met/ext/hier"), "METHIER", "definitionHierarchy"),
            vec![
                node(&uri("met/ext/hier/1"), &uri("met/mi1"), "mi1", None, &[]),
                node(
                    &uri("met/ext/hier/2"),
                    &uri("met/mi2"),
                    "mi2",
                    Some(&uri("met/ext/hier/1")),
                    &[("unaryOperator", "+")],
                ),
            ],
        );

        let members = CodeListFixture::new(
            with_concept(
                json!({
                    "uri": uri("dom/members"),
                    "codeValue": "DOM",
                    "defaultCode": { "uri": uri("dom/members/m1") }
                }),
                "Members of DOM",
            ),
            vec![
                code(&uri("dom/members/m1"), "m1", "Member 1"),
                code(&uri("dom/members/m2"), "m2", "Member 2"),
            ],
        )
        .with_extension(
            extension_meta(&uri("dom/members/ext/hier"), "HIER", "calculationHierarchy"),
            vec![
                node(
                    &uri("dom/members/ext/hier/1"),
                    &uri("dom/members/m1"),
                    "m1",
                    None,
                    &[("abstractNode", "true"), ("comparisonOperator", "=")],
                ),
                node(
                    &uri("dom/members/ext/hier/2"),
                    &uri("dom/members/m2"),
                    "m2",
                    Some(&uri("dom/members/ext/hier/1")),
                    &[("unaryOperator", "-")],
                ),
            ],
        );

        let mut domain_code = code(&uri("dom/DOM"), "DOM", "Explicit domain");
        domain_code["subCodeScheme"] = json!({ "uri": uri("dom/members") });
        let explicit_domains =
            CodeListFixture::new(code_list_meta(&uri("dom"), "exp_dom_hier"), vec![domain_code])
                .with_sub_code_list(members);

        let typed_domains = CodeListFixture::new(
            code_list_meta(&uri("typ_dom"), "typ_dom"),
            vec![code(&uri("typ_dom/TD"), "TD", "Typed domain")],
        )
        .with_extension(
            extension_meta(&uri("typ_dom/ext"), "dpmTypedDomain", "dpmTypedDomain"),
            vec![member(
                &uri("typ_dom/ext/1"),
                &uri("typ_dom/TD"),
                "TD",
                &[("dpmDomainDataType", "Percentage")],
            )],
        );

        let explicit_dimensions = CodeListFixture::new(
            code_list_meta(&uri("exp_dim"), "exp_dim"),
            vec![code(&uri("exp_dim/DIM"), "DIM", "Explicit dimension")],
        )
        .with_extension(
            extension_meta(&uri("exp_dim/ext"), "dpmDimension", "dpmDimension"),
            vec![member(
                &uri("exp_dim/ext/1"),
                &uri("exp_dim/DIM"),
                "DIM",
                &[("dpmDomainReference", "DOM")],
            )],
        );

        let typed_dimensions = CodeListFixture::new(
            code_list_meta(&uri("typ_dim"), "typ_dim"),
            vec![code(&uri("typ_dim/TDIM"), "TDIM", "Typed dimension")],
        )
        .with_extension(
            extension_meta(&uri("typ_dim/ext"), "dpmDimension", "dpmDimension"),
            vec![member(
                &uri("typ_dim/ext/1"),
                &uri("typ_dim/TDIM"),
                "TDIM",
                &[("dpmDomainReference", "TD")],
            )],
        );

        Self {
            owner: json!({
                "name": format!("Owner {prefix}"),
                "namespace": format!("http://example.com/{prefix}"),
                "prefix": prefix,
                "location": format!("http://example.com/{prefix}/location"),
                "copyright": format!("(C) Owner {prefix}"),
                "languages": ["en", "fi"],
                "defaultLanguage": "en"
            }),
            code_lists: vec![
                ("met", metrics),
                ("exp_dom_hier", explicit_domains),
                ("typ_dom", typed_domains),
                ("exp_dim", explicit_dimensions),
                ("typ_dim", typed_dimensions),
            ],
        }
    }

    pub fn code_list_mut(&mut self, folder_name: &str) -> &mut CodeListFixture {
        self.code_lists
            .iter_mut()
            .find(|(name, _)| *name == folder_name)
            .map(|(_, code_list)| code_list)
            .unwrap_or_else(|| panic!("no code list {folder_name}"))
    }
}

pub fn write_json(path: &Path, value: &Value) {
    fs::write(path, serde_json::to_string_pretty(value).unwrap()).unwrap();
}

/// Writes `dictionaries` in the captured folder layout under `root`.
pub fn write_source(root: &Path, dictionaries: &[DictionaryFixture]) {
    fs::create_dir_all(root.join("meta")).unwrap();
    write_json(
        &root.join("meta/source_config.json"),
        &json!({ "dpmDictionaries": dictionaries.iter().map(|d| json!({ "owner": d.owner })).collect::<Vec<_>>() }),
    );

    for (index, dictionary) in dictionaries.iter().enumerate() {
        let dir = root.join(format!("dpm_dictionary_{index}"));
        fs::create_dir_all(&dir).unwrap();
        write_json(&dir.join("dpm_owner_config.json"), &dictionary.owner);
        for (folder_name, code_list) in &dictionary.code_lists {
            code_list.write(&dir.join(folder_name));
        }
    }
}

/// Every file below `root` with its content, by path relative to `root`.
pub fn read_tree(root: &Path) -> Vec<(String, String)> {
    fn visit(root: &Path, dir: &Path, files: &mut Vec<(String, String)>) {
        for entry in fs::read_dir(dir).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                visit(root, &path, files);
            } else {
                let relative = path.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/");
                files.push((relative, fs::read_to_string(&path).unwrap()));
            }
        }
    }

    let mut files = Vec::new();
    visit(root, root, &mut files);
    files.sort();
    files
}
