const PROPERTY_TYPE_BASE: &str = "http://uri.suomi.fi/datamodel/ns/code#";

/// The five code list slots of a dictionary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CodeListKind {
    Metrics,
    ExplicitDomainsAndHierarchies,
    ExplicitDimensions,
    TypedDomains,
    TypedDimensions,
}

impl CodeListKind {
    pub const ALL: [CodeListKind; 5] = [
        CodeListKind::Metrics,
        CodeListKind::ExplicitDomainsAndHierarchies,
        CodeListKind::ExplicitDimensions,
        CodeListKind::TypedDomains,
        CodeListKind::TypedDimensions,
    ];

    /// Folder name used in the captured layout.
    pub fn folder_name(&self) -> &'static str {
        match self {
            CodeListKind::Metrics => "met",
            CodeListKind::ExplicitDomainsAndHierarchies => "exp_dom_hier",
            CodeListKind::ExplicitDimensions => "exp_dim",
            CodeListKind::TypedDomains => "typ_dom",
            CodeListKind::TypedDimensions => "typ_dim",
        }
    }

    pub fn blueprint(&self) -> CodeListBlueprint {
        match self {
            CodeListKind::Metrics => CodeListBlueprint::new(vec![
                ExtensionKind::DpmMetric,
                ExtensionKind::DefinitionHierarchy,
                ExtensionKind::CalculationHierarchy,
            ]),
            CodeListKind::ExplicitDomainsAndHierarchies => CodeListBlueprint::new(vec![])
                .with_sub_code_lists(CodeListBlueprint::new(vec![
                    ExtensionKind::DefinitionHierarchy,
                    ExtensionKind::CalculationHierarchy,
                ])),
            CodeListKind::ExplicitDimensions | CodeListKind::TypedDimensions => {
                CodeListBlueprint::new(vec![ExtensionKind::DpmDimension])
            }
            CodeListKind::TypedDomains => {
                CodeListBlueprint::new(vec![ExtensionKind::DpmTypedDomain])
            }
        }
    }
}

/// Extension flavours, identified in source data by their property-type URI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtensionKind {
    DpmMetric,
    DpmTypedDomain,
    DpmDimension,
    DefinitionHierarchy,
    CalculationHierarchy,
}

impl ExtensionKind {
    const ALL: [ExtensionKind; 5] = [
        ExtensionKind::DpmMetric,
        ExtensionKind::DpmTypedDomain,
        ExtensionKind::DpmDimension,
        ExtensionKind::DefinitionHierarchy,
        ExtensionKind::CalculationHierarchy,
    ];

    fn local_name(&self) -> &'static str {
        match self {
            ExtensionKind::DpmMetric => "dpmMetric",
            ExtensionKind::DpmTypedDomain => "dpmTypedDomain",
            ExtensionKind::DpmDimension => "dpmDimension",
            ExtensionKind::DefinitionHierarchy => "definitionHierarchy",
            ExtensionKind::CalculationHierarchy => "calculationHierarchy",
        }
    }

    pub fn property_type_uri(&self) -> String {
        format!("{PROPERTY_TYPE_BASE}{}", self.local_name())
    }

    pub fn from_property_type_uri(uri: &str) -> Option<ExtensionKind> {
        let local_name = uri.strip_prefix(PROPERTY_TYPE_BASE)?;
        Self::ALL
            .into_iter()
            .find(|kind| kind.local_name() == local_name)
    }

    pub fn is_hierarchy(&self) -> bool {
        matches!(
            self,
            ExtensionKind::DefinitionHierarchy | ExtensionKind::CalculationHierarchy
        )
    }
}

/// Which extensions of a code list matter, and whether it has nested code lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeListBlueprint {
    pub extension_kinds: Vec<ExtensionKind>,
    pub sub_code_list: Option<Box<CodeListBlueprint>>,
}

impl CodeListBlueprint {
    pub fn new(extension_kinds: Vec<ExtensionKind>) -> Self {
        Self {
            extension_kinds,
            sub_code_list: None,
        }
    }

    pub fn with_sub_code_lists(self, sub_code_list: CodeListBlueprint) -> Self {
        Self {
            sub_code_list: Some(Box::new(sub_code_list)),
            ..self
        }
    }

    pub fn uses_extensions(&self) -> bool {
        !self.extension_kinds.is_empty()
    }

    pub fn accepts_property_type(&self, property_type_uri: &str) -> bool {
        ExtensionKind::from_property_type_uri(property_type_uri)
            .is_some_and(|kind| self.extension_kinds.contains(&kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn property_type_uris_round_trip() {
        assert_eq!(
            ExtensionKind::DefinitionHierarchy.property_type_uri(),
            "http://uri.suomi.fi/datamodel/ns/code#definitionHierarchy"
        );
        assert_eq!(
            ExtensionKind::from_property_type_uri(
                "http://uri.suomi.fi/datamodel/ns/code#calculationHierarchy"
            ),
            Some(ExtensionKind::CalculationHierarchy)
        );
        assert_eq!(
            ExtensionKind::from_property_type_uri("http://example.com#dpmMetric"),
            None
        );
    }

    #[test]
    fn explicit_domain_blueprint_reads_hierarchies_from_sub_code_lists() {
        let blueprint = CodeListKind::ExplicitDomainsAndHierarchies.blueprint();
        assert!(!blueprint.uses_extensions());
        let sub = blueprint.sub_code_list.unwrap();
        assert!(sub.accepts_property_type(
            "http://uri.suomi.fi/datamodel/ns/code#definitionHierarchy"
        ));
        assert!(!sub.accepts_property_type("http://uri.suomi.fi/datamodel/ns/code#dpmMetric"));
    }
}
