use std::collections::HashMap;

use rusqlite::{params, Connection, OptionalExtension};

use super::{DictionaryWriteReport, WriteError};
use crate::diagnostic::DiagnosticBridge;
use crate::model::{
    Concept, DpmDictionary, DpmElementRef, ExplicitDomain, Hierarchy, HierarchyNode, Language,
    MetricDomain, Owner, TranslatedText, TypedDomain,
};

const CONCEPT_TYPE_DOMAIN: &str = "Domain";
const CONCEPT_TYPE_MEMBER: &str = "Member";
const CONCEPT_TYPE_HIERARCHY: &str = "Hierarchy";
const CONCEPT_TYPE_HIERARCHY_NODE: &str = "HierarchyNode";
const CONCEPT_TYPE_DIMENSION: &str = "Dimension";

/// Owner-scoped deletes, referencing rows before referenced ones so foreign keys hold after
/// every step. Each entry removes the rows whose concept belongs to the owner, then the
/// concepts themselves.
const PURGE_STEPS: &[(&str, &str)] = &[
    ("mHierarchyNode", CONCEPT_TYPE_HIERARCHY_NODE),
    ("mHierarchy", CONCEPT_TYPE_HIERARCHY),
    ("mMember", CONCEPT_TYPE_MEMBER),
    ("mDimension", CONCEPT_TYPE_DIMENSION),
    ("mDomain", CONCEPT_TYPE_DOMAIN),
];

/// Inserts the owner, or refreshes the row already registered for its prefix.
pub(crate) fn upsert_owner(connection: &Connection, owner: &Owner) -> Result<i64, WriteError> {
    let existing: Option<i64> = connection
        .query_row(
            "SELECT OwnerID FROM mOwner WHERE OwnerPrefix = ?1",
            params![owner.prefix],
            |row| row.get(0),
        )
        .optional()?;

    match existing {
        Some(owner_id) => {
            connection.execute(
                "UPDATE mOwner SET OwnerName = ?1, OwnerNamespace = ?2, OwnerLocation = ?3, OwnerCopyright = ?4
                 WHERE OwnerID = ?5",
                params![
                    owner.name,
                    owner.namespace,
                    owner.location,
                    owner.copyright,
                    owner_id
                ],
            )?;
            Ok(owner_id)
        }
        None => {
            connection.execute(
                "INSERT INTO mOwner (OwnerName, OwnerNamespace, OwnerLocation, OwnerPrefix, OwnerCopyright)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    owner.name,
                    owner.namespace,
                    owner.location,
                    owner.prefix,
                    owner.copyright
                ],
            )?;
            Ok(connection.last_insert_rowid())
        }
    }
}

/// Removes every dictionary row owned by `owner_id`; other owners' rows stay.
pub(crate) fn purge_owner_content(connection: &Connection, owner_id: i64) -> Result<(), WriteError> {
    // Metrics carry no concept of their own; they go with their corresponding members.
    connection.execute(
        "DELETE FROM mMetric WHERE CorrespondingMemberID IN (
           SELECT m.MemberID FROM mMember m JOIN mConcept c ON c.ConceptID = m.ConceptID
           WHERE c.OwnerID = ?1)",
        params![owner_id],
    )?;

    for (table, concept_type) in PURGE_STEPS {
        connection.execute(
            &format!(
                "DELETE FROM {table} WHERE ConceptID IN (
                   SELECT ConceptID FROM mConcept WHERE OwnerID = ?1 AND ConceptType = ?2)"
            ),
            params![owner_id, concept_type],
        )?;
        connection.execute(
            "DELETE FROM mConceptTranslation WHERE ConceptID IN (
               SELECT ConceptID FROM mConcept WHERE OwnerID = ?1 AND ConceptType = ?2)",
            params![owner_id, concept_type],
        )?;
        connection.execute(
            "DELETE FROM mConcept WHERE OwnerID = ?1 AND ConceptType = ?2",
            params![owner_id, concept_type],
        )?;
    }
    Ok(())
}

/// Writes one dictionary, resolving business-key references to the row ids generated
/// earlier in the same transaction.
pub(crate) struct DictionaryWriter<'a> {
    connection: &'a Connection,
    diagnostic: &'a DiagnosticBridge,
    language_ids: &'a HashMap<Language, i64>,
    owner_prefix: String,
    owner_id: i64,
    domain_ids_by_uri: HashMap<String, i64>,
    domain_ids_by_code: HashMap<String, i64>,
    hierarchy_ids_by_code: HashMap<String, i64>,
    report: DictionaryWriteReport,
}

impl<'a> DictionaryWriter<'a> {
    pub fn new(
        connection: &'a Connection,
        diagnostic: &'a DiagnosticBridge,
        language_ids: &'a HashMap<Language, i64>,
        owner: &Owner,
        owner_id: i64,
    ) -> Self {
        Self {
            connection,
            diagnostic,
            language_ids,
            owner_prefix: owner.prefix.clone(),
            owner_id,
            domain_ids_by_uri: HashMap::new(),
            domain_ids_by_code: HashMap::new(),
            hierarchy_ids_by_code: HashMap::new(),
            report: DictionaryWriteReport {
                owner_prefix: owner.prefix.clone(),
                ..DictionaryWriteReport::default()
            },
        }
    }

    pub fn write(mut self, dictionary: &DpmDictionary) -> Result<DictionaryWriteReport, WriteError> {
        for domain in &dictionary.explicit_domains {
            self.write_explicit_domain(domain)?;
        }
        for domain in &dictionary.typed_domains {
            self.write_typed_domain(domain)?;
        }
        for dimension in &dictionary.explicit_dimensions {
            self.write_dimension(
                &dimension.concept,
                &dimension.dimension_code,
                &dimension.domain_ref,
                false,
            )?;
        }
        for dimension in &dictionary.typed_dimensions {
            self.write_dimension(
                &dimension.concept,
                &dimension.dimension_code,
                &dimension.domain_ref,
                true,
            )?;
        }
        for domain in &dictionary.metric_domains {
            self.write_metric_domain(domain)?;
        }
        Ok(self.report)
    }

    fn write_concept(&self, concept: &Concept, concept_type: &str) -> Result<i64, WriteError> {
        self.connection.execute(
            "INSERT INTO mConcept (ConceptType, OwnerID, CreationDate, ModificationDate, FromDate, ToDate)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                concept_type,
                self.owner_id,
                concept.created_at.to_rfc3339(),
                concept.modified_at.to_rfc3339(),
                concept.applicable_from.map(|date| date.format("%Y-%m-%d").to_string()),
                concept.applicable_until.map(|date| date.format("%Y-%m-%d").to_string()),
            ],
        )?;
        let concept_id = self.connection.last_insert_rowid();

        self.write_translations(concept_id, "label", &concept.label)?;
        self.write_translations(concept_id, "description", &concept.description)?;
        Ok(concept_id)
    }

    fn write_translations(
        &self,
        concept_id: i64,
        role: &str,
        text: &TranslatedText,
    ) -> Result<(), WriteError> {
        for (language, translation) in text.translations() {
            let language_id = self
                .language_ids
                .get(language)
                .ok_or_else(|| WriteError::UnknownLanguage(language.to_string()))?;
            self.connection.execute(
                "INSERT INTO mConceptTranslation (ConceptID, LanguageID, Text, Role) VALUES (?1, ?2, ?3, ?4)",
                params![concept_id, language_id, translation, role],
            )?;
        }
        Ok(())
    }

    fn insert_domain(
        &mut self,
        uri: &str,
        concept: &Concept,
        domain_code: &str,
        xbrl_code: String,
        data_type: Option<&str>,
    ) -> Result<i64, WriteError> {
        let concept_id = self.write_concept(concept, CONCEPT_TYPE_DOMAIN)?;
        self.connection.execute(
            "INSERT INTO mDomain (DomainCode, DomainLabel, DomainDescription, DomainXBRLCode, DataType, IsTypedDomain, ConceptID)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                domain_code,
                concept.label.default_text(),
                concept.description.default_text(),
                xbrl_code,
                data_type,
                data_type.is_some(),
                concept_id
            ],
        )?;
        let domain_id = self.connection.last_insert_rowid();
        self.domain_ids_by_uri.entry(uri.to_string()).or_insert(domain_id);
        self.domain_ids_by_code
            .entry(domain_code.to_string())
            .or_insert(domain_id);
        Ok(domain_id)
    }

    fn insert_member(
        &mut self,
        domain_id: i64,
        concept: &Concept,
        member_code: &str,
        xbrl_code: String,
        default_member: bool,
    ) -> Result<i64, WriteError> {
        let concept_id = self.write_concept(concept, CONCEPT_TYPE_MEMBER)?;
        self.connection.execute(
            "INSERT INTO mMember (DomainID, MemberCode, MemberLabel, MemberXBRLCode, IsDefaultMember, ConceptID)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                domain_id,
                member_code,
                concept.label.default_text(),
                xbrl_code,
                default_member,
                concept_id
            ],
        )?;
        self.report.members += 1;
        Ok(self.connection.last_insert_rowid())
    }

    fn write_explicit_domain(&mut self, domain: &ExplicitDomain) -> Result<(), WriteError> {
        let xbrl_code = format!("{}_exp:{}", self.owner_prefix, domain.domain_code);
        let domain_id = self.insert_domain(
            &domain.uri,
            &domain.concept,
            &domain.domain_code,
            xbrl_code,
            None,
        )?;
        self.report.explicit_domains += 1;

        let mut member_ids = HashMap::new();
        for member in &domain.members {
            let xbrl_code = format!(
                "{}_{}:{}",
                self.owner_prefix, domain.domain_code, member.member_code
            );
            let member_id = self.insert_member(
                domain_id,
                &member.concept,
                &member.member_code,
                xbrl_code,
                member.default_member,
            )?;
            member_ids.entry(member.uri.clone()).or_insert(member_id);
        }

        for hierarchy in &domain.hierarchies {
            let hierarchy_id = self.write_hierarchy(domain_id, hierarchy, &member_ids)?;
            self.hierarchy_ids_by_code
                .entry(hierarchy.hierarchy_code.clone())
                .or_insert(hierarchy_id);
        }
        Ok(())
    }

    fn write_typed_domain(&mut self, domain: &TypedDomain) -> Result<(), WriteError> {
        let xbrl_code = format!("{}_typ:{}", self.owner_prefix, domain.domain_code);
        self.insert_domain(
            &domain.uri,
            &domain.concept,
            &domain.domain_code,
            xbrl_code,
            Some(domain.data_type.as_str()),
        )?;
        self.report.typed_domains += 1;
        Ok(())
    }

    fn write_metric_domain(&mut self, domain: &MetricDomain) -> Result<(), WriteError> {
        let xbrl_code = format!("{}_exp:{}", self.owner_prefix, domain.domain_code);
        let domain_id = self.insert_domain(
            &domain.uri,
            &domain.concept,
            &domain.domain_code,
            xbrl_code,
            None,
        )?;

        let mut member_ids = HashMap::new();
        for metric in &domain.metrics {
            let xbrl_code = format!("{}_met:{}", self.owner_prefix, metric.metric_code);
            let member_id =
                self.insert_member(domain_id, &metric.concept, &metric.metric_code, xbrl_code, false)?;
            member_ids.entry(metric.uri.clone()).or_insert(member_id);

            let referenced_domain_id = self.resolve_code(
                metric.referenced_domain_code.as_deref(),
                &self.domain_ids_by_code,
                &metric.metric_code,
                "domain",
            );
            let referenced_hierarchy_id = self.resolve_code(
                metric.referenced_hierarchy_code.as_deref(),
                &self.hierarchy_ids_by_code,
                &metric.metric_code,
                "hierarchy",
            );

            self.connection.execute(
                "INSERT INTO mMetric (CorrespondingMemberID, DataType, FlowType, BalanceType, ReferencedDomainID, ReferencedHierarchyID)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    member_id,
                    metric.data_type,
                    metric.flow_type,
                    metric.balance_type,
                    referenced_domain_id,
                    referenced_hierarchy_id
                ],
            )?;
            self.report.metrics += 1;
        }

        for hierarchy in &domain.hierarchies {
            self.write_hierarchy(domain_id, hierarchy, &member_ids)?;
        }
        Ok(())
    }

    /// Unresolvable references are reported as ERRORs and stored as NULL; the pre-commit
    /// checkpoint then rolls the transaction back.
    fn resolve_code(
        &self,
        code: Option<&str>,
        ids_by_code: &HashMap<String, i64>,
        metric_code: &str,
        target: &str,
    ) -> Option<i64> {
        let code = code?;
        let id = ids_by_code.get(code).copied();
        if id.is_none() {
            self.diagnostic.error(format!(
                "Metric {metric_code} refers to unknown {target} '{code}'"
            ));
        }
        id
    }

    fn write_dimension(
        &mut self,
        concept: &Concept,
        dimension_code: &str,
        domain_ref: &DpmElementRef,
        typed: bool,
    ) -> Result<(), WriteError> {
        let domain_id = if domain_ref.uri.is_empty() {
            None
        } else {
            let domain_id = self.domain_ids_by_uri.get(&domain_ref.uri).copied();
            if domain_id.is_none() {
                self.diagnostic.error(format!(
                    "Dimension {dimension_code} refers to unknown {} '{}'",
                    domain_ref.kind, domain_ref.diagnostic_label
                ));
            }
            domain_id
        };

        let concept_id = self.write_concept(concept, CONCEPT_TYPE_DIMENSION)?;
        self.connection.execute(
            "INSERT INTO mDimension (DimensionCode, DimensionLabel, DimensionDescription, DimensionXBRLCode, DomainID, IsTypedDimension, ConceptID)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                dimension_code,
                concept.label.default_text(),
                concept.description.default_text(),
                format!("{}_dim:{}", self.owner_prefix, dimension_code),
                domain_id,
                typed,
                concept_id
            ],
        )?;
        self.report.dimensions += 1;
        Ok(())
    }

    fn write_hierarchy(
        &mut self,
        domain_id: i64,
        hierarchy: &Hierarchy,
        member_ids: &HashMap<String, i64>,
    ) -> Result<i64, WriteError> {
        let concept_id = self.write_concept(&hierarchy.concept, CONCEPT_TYPE_HIERARCHY)?;
        self.connection.execute(
            "INSERT INTO mHierarchy (HierarchyCode, HierarchyLabel, DomainID, HierarchyDescription, ConceptID)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                hierarchy.hierarchy_code,
                hierarchy.concept.label.default_text(),
                domain_id,
                hierarchy.concept.description.default_text(),
                concept_id
            ],
        )?;
        let hierarchy_id = self.connection.last_insert_rowid();
        self.report.hierarchies += 1;

        let mut order = 0;
        self.write_nodes(
            hierarchy_id,
            &hierarchy.root_nodes,
            member_ids,
            &NodePosition::root(),
            &mut order,
        )?;
        Ok(hierarchy_id)
    }

    fn write_nodes(
        &mut self,
        hierarchy_id: i64,
        nodes: &[HierarchyNode],
        member_ids: &HashMap<String, i64>,
        parent: &NodePosition,
        order: &mut u32,
    ) -> Result<(), WriteError> {
        for node in nodes {
            let Some(&member_id) = member_ids.get(&node.member_ref.uri) else {
                self.diagnostic.error(format!(
                    "Hierarchy node {} refers to unknown {} '{}'",
                    node.uri, node.member_ref.kind, node.member_ref.diagnostic_label
                ));
                continue;
            };

            *order += 1;
            let position = parent.child(member_id);
            let concept_id = self.write_concept(&node.concept, CONCEPT_TYPE_HIERARCHY_NODE)?;
            self.connection.execute(
                "INSERT INTO mHierarchyNode (HierarchyID, MemberID, IsAbstract, ComparisonOperator, UnaryOperator,
                   HierarchyNodeLabel, ParentMemberID, Level, `Order`, Path, ConceptID)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                params![
                    hierarchy_id,
                    member_id,
                    node.abstract_node,
                    node.comparison_operator,
                    node.unary_operator,
                    node.concept.label.default_text(),
                    parent.member_id,
                    position.level,
                    *order,
                    position.path,
                    concept_id
                ],
            )?;
            self.report.hierarchy_nodes += 1;

            self.write_nodes(hierarchy_id, &node.child_nodes, member_ids, &position, order)?;
        }
        Ok(())
    }
}

/// Where a node sits in its hierarchy: parent member, 1-based depth and the member id path.
struct NodePosition {
    member_id: Option<i64>,
    level: u32,
    path: String,
}

impl NodePosition {
    fn root() -> Self {
        Self {
            member_id: None,
            level: 0,
            path: String::new(),
        }
    }

    fn child(&self, member_id: i64) -> Self {
        let path = if self.path.is_empty() {
            member_id.to_string()
        } else {
            format!("{}/{member_id}", self.path)
        };
        Self {
            member_id: Some(member_id),
            level: self.level + 1,
            path,
        }
    }
}
