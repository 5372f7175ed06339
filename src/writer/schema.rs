use std::collections::HashMap;

use rusqlite::{params, Connection, OptionalExtension};

use super::WriteError;
use crate::model::Language;

/// DPM tables needed for dictionary content, in dependency order.
const CREATE_SCHEMA_SQL: &str = r"
CREATE TABLE IF NOT EXISTS mLanguage (
  LanguageID INTEGER PRIMARY KEY,
  LanguageName TEXT,
  EnglishName TEXT,
  IsoCode TEXT UNIQUE,
  ConceptID INTEGER
);

CREATE TABLE IF NOT EXISTS mOwner (
  OwnerID INTEGER PRIMARY KEY,
  OwnerName TEXT,
  OwnerNamespace TEXT,
  OwnerLocation TEXT,
  OwnerPrefix TEXT UNIQUE,
  OwnerCopyright TEXT,
  ParentOwnerID INTEGER,
  ConceptID INTEGER
);

CREATE TABLE IF NOT EXISTS mConcept (
  ConceptID INTEGER PRIMARY KEY,
  ConceptType TEXT,
  OwnerID INTEGER REFERENCES mOwner(OwnerID),
  CreationDate TEXT,
  ModificationDate TEXT,
  FromDate TEXT,
  ToDate TEXT
);

CREATE TABLE IF NOT EXISTS mConceptTranslation (
  ConceptID INTEGER REFERENCES mConcept(ConceptID),
  LanguageID INTEGER REFERENCES mLanguage(LanguageID),
  Text TEXT,
  Role TEXT,
  PRIMARY KEY (ConceptID, LanguageID, Role)
);

CREATE TABLE IF NOT EXISTS mDomain (
  DomainID INTEGER PRIMARY KEY,
  DomainCode TEXT,
  DomainLabel TEXT,
  DomainDescription TEXT,
  DomainXBRLCode TEXT,
  DataType TEXT,
  IsTypedDomain BOOLEAN,
  ConceptID INTEGER REFERENCES mConcept(ConceptID)
);

CREATE TABLE IF NOT EXISTS mMember (
  MemberID INTEGER PRIMARY KEY,
  DomainID INTEGER REFERENCES mDomain(DomainID),
  MemberCode TEXT,
  MemberLabel TEXT,
  MemberXBRLCode TEXT,
  IsDefaultMember BOOLEAN,
  ConceptID INTEGER REFERENCES mConcept(ConceptID)
);

CREATE TABLE IF NOT EXISTS mHierarchy (
  HierarchyID INTEGER PRIMARY KEY,
  HierarchyCode TEXT,
  HierarchyLabel TEXT,
  DomainID INTEGER REFERENCES mDomain(DomainID),
  HierarchyDescription TEXT,
  ConceptID INTEGER REFERENCES mConcept(ConceptID)
);

CREATE TABLE IF NOT EXISTS mHierarchyNode (
  HierarchyID INTEGER REFERENCES mHierarchy(HierarchyID),
  MemberID INTEGER REFERENCES mMember(MemberID),
  IsAbstract BOOLEAN,
  ComparisonOperator TEXT,
  UnaryOperator TEXT,
  HierarchyNodeLabel TEXT,
  ParentMemberID INTEGER REFERENCES mMember(MemberID),
  Level INTEGER,
  `Order` INTEGER,
  Path TEXT,
  ConceptID INTEGER REFERENCES mConcept(ConceptID),
  PRIMARY KEY (HierarchyID, MemberID)
);

CREATE TABLE IF NOT EXISTS mDimension (
  DimensionID INTEGER PRIMARY KEY,
  DimensionCode TEXT,
  DimensionLabel TEXT,
  DimensionDescription TEXT,
  DimensionXBRLCode TEXT,
  DomainID INTEGER REFERENCES mDomain(DomainID),
  IsTypedDimension BOOLEAN,
  ConceptID INTEGER REFERENCES mConcept(ConceptID)
);

CREATE TABLE IF NOT EXISTS mMetric (
  MetricID INTEGER PRIMARY KEY,
  CorrespondingMemberID INTEGER REFERENCES mMember(MemberID),
  DataType TEXT,
  FlowType TEXT,
  BalanceType TEXT,
  ReferencedDomainID INTEGER REFERENCES mDomain(DomainID),
  ReferencedHierarchyID INTEGER REFERENCES mHierarchy(HierarchyID)
);
";

pub(crate) fn create_schema(connection: &Connection) -> Result<(), WriteError> {
    connection.execute_batch(CREATE_SCHEMA_SQL)?;
    Ok(())
}

/// Inserts every known language once and returns the ids by language.
pub(crate) fn ensure_languages(
    connection: &Connection,
) -> Result<HashMap<Language, i64>, WriteError> {
    let mut ids = HashMap::new();
    for language in Language::all() {
        let existing: Option<i64> = connection
            .query_row(
                "SELECT LanguageID FROM mLanguage WHERE IsoCode = ?1",
                params![language.iso_code()],
                |row| row.get(0),
            )
            .optional()?;

        let id = match existing {
            Some(id) => id,
            None => {
                connection.execute(
                    "INSERT INTO mLanguage (LanguageName, EnglishName, IsoCode) VALUES (?1, ?2, ?3)",
                    params![
                        language.english_name(),
                        language.english_name(),
                        language.iso_code()
                    ],
                )?;
                connection.last_insert_rowid()
            }
        };
        ids.insert(language, id);
    }
    Ok(ids)
}
