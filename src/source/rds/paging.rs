use url::Url;

use super::client::JsonFetcher;
use super::resolver::{parse_json, parse_url, with_param};
use crate::source::SourceError;

pub const PAGE_SIZE: usize = 1000;

/// Fetches a paged resource lazily, following `meta.nextPage` until the service omits it.
pub(crate) struct PagedFetch<'a> {
    fetcher: &'a dyn JsonFetcher,
    next: Option<Url>,
}

impl<'a> PagedFetch<'a> {
    pub fn new(fetcher: &'a dyn JsonFetcher, url: &Url) -> Self {
        Self {
            fetcher,
            next: Some(with_param(url.clone(), "pageSize", &PAGE_SIZE.to_string())),
        }
    }

    fn fetch_page(&mut self, url: Url) -> Result<String, SourceError> {
        let text = self.fetcher.fetch_json(&url)?;
        let page = parse_json(&text, url.as_str())?;

        self.next = match page.pointer("/meta/nextPage").and_then(|v| v.as_str()) {
            Some(next) if !next.trim().is_empty() => {
                if next == url.as_str() {
                    return Err(SourceError::RepeatedPage(next.to_string()));
                }
                Some(parse_url(next, "Next page")?)
            }
            _ => None,
        };

        Ok(text)
    }
}

impl Iterator for PagedFetch<'_> {
    type Item = Result<String, SourceError>;

    fn next(&mut self) -> Option<Self::Item> {
        let url = self.next.take()?;
        Some(self.fetch_page(url))
    }
}
