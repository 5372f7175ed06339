use serde_json::Value;
use url::Url;

use super::client::JsonFetcher;
use crate::source::sorting::natural_cmp;
use crate::source::{CodeListBlueprint, SourceError};

/// Query parameters inherited from a code list URI by every URI derived from it.
const PASSTHROUGH_PARAMS: [&str; 1] = ["env"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ContentAddress {
    pub code_list_url: Url,
    pub codes_url: Url,
    pub extensions: Vec<ExtensionAddress>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ExtensionAddress {
    pub uri: String,
    pub url: Url,
    pub members_url: Url,
}

/// Resolves a code list URI to the content URLs of the code list, its codes and the
/// extensions the blueprint asks for.
pub(crate) struct ContentAddressResolver {
    passthrough_params: Vec<(String, String)>,
    pub address: ContentAddress,
}

impl ContentAddressResolver {
    pub fn resolve(
        fetcher: &dyn JsonFetcher,
        code_list_uri: &str,
        blueprint: &CodeListBlueprint,
    ) -> Result<Self, SourceError> {
        let uri = parse_url(code_list_uri, "Code list URI")?;
        let passthrough_params = uri
            .query_pairs()
            .filter(|(name, _)| PASSTHROUGH_PARAMS.iter().any(|param| name == param))
            .map(|(name, value)| (name.into_owned(), value.into_owned()))
            .collect();

        let meta_data = fetch_value(fetcher, &uri)?;
        let content_url = url_at(&meta_data, "/url", "Content URL resolution via URI")?;

        let code_list = fetch_value(fetcher, &with_param(content_url, "expand", "extension"))?;

        let code_list_url = with_param(
            url_at(&code_list, "/url", "CodeList at content URL resolution")?,
            "expand",
            "code",
        );
        let codes_url = url_at(&code_list, "/codesUrl", "Codes at content URL resolution")?;

        let mut extensions = Vec::new();
        if let Some(extension_nodes) = code_list.pointer("/extensions").and_then(Value::as_array) {
            for node in extension_nodes {
                let property_type = text_at(node, "/propertyType/uri", "Extension property type")?;
                if blueprint.accepts_property_type(property_type) {
                    extensions.push(extension_address(node)?);
                }
            }
        }
        extensions.sort_by(|a, b| natural_cmp(&a.uri, &b.uri));

        Ok(Self {
            passthrough_params,
            address: ContentAddress {
                code_list_url,
                codes_url,
                extensions,
            },
        })
    }

    /// Adds the inherited query parameters to `uri`.
    pub fn decorate_uri(&self, uri: &str) -> Result<String, SourceError> {
        let mut url = parse_url(uri, "URI for decoration")?;
        for (name, value) in &self.passthrough_params {
            let retained: Vec<(String, String)> = url
                .query_pairs()
                .filter(|(existing, _)| existing != name)
                .map(|(n, v)| (n.into_owned(), v.into_owned()))
                .collect();
            url.query_pairs_mut()
                .clear()
                .extend_pairs(retained)
                .append_pair(name, value);
        }
        Ok(url.to_string())
    }
}

fn extension_address(node: &Value) -> Result<ExtensionAddress, SourceError> {
    Ok(ExtensionAddress {
        uri: text_at(node, "/uri", "Extension URI")?.to_string(),
        url: url_at(node, "/url", "Extension at content URL resolution")?,
        members_url: with_param(
            url_at(
                node,
                "/membersUrl",
                "ExtensionMembers at content URL resolution",
            )?,
            "expand",
            "memberValue",
        ),
    })
}

pub(crate) fn fetch_value(fetcher: &dyn JsonFetcher, url: &Url) -> Result<Value, SourceError> {
    let text = fetcher.fetch_json(url)?;
    parse_json(&text, url.as_str())
}

pub(crate) fn parse_json(text: &str, context: &str) -> Result<Value, SourceError> {
    serde_json::from_str(text).map_err(|e| SourceError::Json {
        context: context.to_string(),
        message: e.to_string(),
    })
}

pub(crate) fn text_at<'v>(value: &'v Value, pointer: &str, context: &str) -> Result<&'v str, SourceError> {
    value
        .pointer(pointer)
        .and_then(Value::as_str)
        .filter(|text| !text.trim().is_empty())
        .ok_or_else(|| SourceError::MissingField {
            context: context.to_string(),
            pointer: pointer.to_string(),
        })
}

pub(crate) fn url_at(value: &Value, pointer: &str, phase: &str) -> Result<Url, SourceError> {
    parse_url(text_at(value, pointer, phase)?, phase)
}

pub(crate) fn parse_url(raw: &str, phase: &str) -> Result<Url, SourceError> {
    match Url::parse(raw) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(url),
        _ => Err(SourceError::MalformedUrl {
            phase: phase.to_string(),
            raw: raw.to_string(),
        }),
    }
}

pub(crate) fn with_param(mut url: Url, name: &str, value: &str) -> Url {
    url.query_pairs_mut().append_pair(name, value);
    url
}
