use serde::de::DeserializeOwned;

use super::rds_model::{
    RdsCode, RdsCodeListMeta, RdsCodePage, RdsExtensionMember, RdsExtensionMemberPage,
    RdsExtensionMeta,
};
use crate::diagnostic::{ContextType, DiagnosticBridge, OrFatal, Stop};
use crate::source::{CodeListBlueprint, CodeListSource, ExtensionKind, ExtensionSource};

fn parse<T: DeserializeOwned>(
    text: &str,
    what: &str,
    diagnostic: &DiagnosticBridge,
) -> Result<T, Stop> {
    serde_json::from_str(text)
        .map_err(|e| diagnostic.fatal(format!("JSON parsing failed ({what}): {e}")))
}

/// Typed, diagnostic-aware view over a [`CodeListSource`].
pub(crate) struct CodeListReader<'a> {
    source: &'a dyn CodeListSource,
    diagnostic: &'a DiagnosticBridge,
    meta: RdsCodeListMeta,
}

impl<'a> CodeListReader<'a> {
    pub fn open(source: &'a dyn CodeListSource, diagnostic: &'a DiagnosticBridge) -> Result<Self, Stop> {
        let meta_data = source.code_list_meta_data().or_fatal(diagnostic)?;
        let meta = parse(&meta_data, "code list meta", diagnostic)?;
        Ok(Self {
            source,
            diagnostic,
            meta,
        })
    }

    pub fn meta(&self) -> &RdsCodeListMeta {
        &self.meta
    }

    pub fn blueprint(&self) -> &CodeListBlueprint {
        self.source.blueprint()
    }

    pub fn each_code(&self, mut action: impl FnMut(RdsCode) -> Result<(), Stop>) -> Result<(), Stop> {
        let pages = self.source.code_pages_data().or_fatal(self.diagnostic)?;
        for page in pages {
            let page = page.or_fatal(self.diagnostic)?;
            let page: RdsCodePage = parse(&page, "codes page", self.diagnostic)?;
            for code in page.results {
                action(code)?;
            }
        }
        Ok(())
    }

    /// Visits the extensions the blueprint recognizes, each inside an Extension frame.
    pub fn each_extension(
        &self,
        mut action: impl FnMut(&ExtensionReader<'_>) -> Result<(), Stop>,
    ) -> Result<(), Stop> {
        let extensions = self.source.extension_sources().or_fatal(self.diagnostic)?;
        for extension in &extensions {
            let meta_data = extension.extension_meta_data().or_fatal(self.diagnostic)?;
            let meta: RdsExtensionMeta = parse(&meta_data, "extension meta", self.diagnostic)?;

            let Some(kind) = meta
                .property_type
                .as_ref()
                .and_then(|property_type| property_type.uri.as_deref())
                .and_then(ExtensionKind::from_property_type_uri)
                .filter(|kind| self.blueprint().extension_kinds.contains(kind))
            else {
                continue;
            };

            let label = meta.code_value.clone().unwrap_or_default();
            let identifier = meta.uri.clone().unwrap_or_default();
            let reader = ExtensionReader {
                source: extension.as_ref(),
                diagnostic: self.diagnostic,
                meta,
                kind,
            };
            self.diagnostic
                .with_context(ContextType::Extension, label, identifier, || action(&reader))?;
        }
        Ok(())
    }

    pub fn each_sub_code_list(
        &self,
        mut action: impl FnMut(&CodeListReader<'_>) -> Result<(), Stop>,
    ) -> Result<(), Stop> {
        let sub_code_lists = self.source.sub_code_list_sources().or_fatal(self.diagnostic)?;
        for sub_code_list in &sub_code_lists {
            self.diagnostic.with_context(ContextType::SubCodeList, "", "", || {
                let reader = CodeListReader::open(sub_code_list.as_ref(), self.diagnostic)?;
                self.diagnostic.update_current_context_details(
                    reader.meta.code_value.clone(),
                    reader.meta.uri.clone(),
                );
                action(&reader)
            })?;
        }
        Ok(())
    }
}

pub(crate) struct ExtensionReader<'a> {
    source: &'a dyn ExtensionSource,
    diagnostic: &'a DiagnosticBridge,
    meta: RdsExtensionMeta,
    kind: ExtensionKind,
}

impl ExtensionReader<'_> {
    pub fn meta(&self) -> &RdsExtensionMeta {
        &self.meta
    }

    pub fn kind(&self) -> ExtensionKind {
        self.kind
    }

    pub fn each_member(
        &self,
        mut action: impl FnMut(RdsExtensionMember) -> Result<(), Stop>,
    ) -> Result<(), Stop> {
        let pages = self
            .source
            .extension_member_pages_data()
            .or_fatal(self.diagnostic)?;
        for page in pages {
            let page = page.or_fatal(self.diagnostic)?;
            let page: RdsExtensionMemberPage = parse(&page, "extension members page", self.diagnostic)?;
            for member in page.results {
                action(member)?;
            }
        }
        Ok(())
    }
}

/// Non-blank uri or FATAL.
pub(crate) fn required_uri(
    uri: Option<&str>,
    what: &str,
    diagnostic: &DiagnosticBridge,
) -> Result<String, Stop> {
    match uri.map(str::trim).filter(|uri| !uri.is_empty()) {
        Some(uri) => Ok(uri.to_string()),
        None => Err(diagnostic.fatal(format!("{what} without uri"))),
    }
}
