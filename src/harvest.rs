//! Fetch every source page concurrently and pull server records out of it.

use futures::future::join_all;
use log::{debug, error, info};
use scraper::{ElementRef, Html, Selector};

use crate::config::Source;
use crate::extract::{RawFields, RecordExtractor};
use crate::fetch::Fetcher;
use crate::server::{ServerRecord, Validator};

/// Nodes matching `selector`, in document order.
pub fn select_nodes<'a>(document: &'a Html, selector: &Selector) -> Vec<ElementRef<'a>> {
    document.select(selector).collect()
}

pub struct Harvester<'f, F> {
    fetcher: &'f F,
    extractor: RecordExtractor,
    validator: Validator,
}

impl<'f, F: Fetcher> Harvester<'f, F> {
    pub fn new(fetcher: &'f F, extractor: RecordExtractor, validator: Validator) -> Self {
        Self {
            fetcher,
            extractor,
            validator,
        }
    }

    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    /// Raw field mappings for every node the selector matches.
    pub fn harvest_document(&self, document: &Html, selector: &Selector) -> Vec<RawFields> {
        select_nodes(document, selector)
            .into_iter()
            .map(|node| self.extractor.extract(node))
            .collect()
    }

    /// A failed fetch is logged and counts as an empty page.
    pub async fn harvest_source(&self, source: &Source) -> Vec<RawFields> {
        match self.fetcher.fetch_page(&source.url).await {
            Ok(document) => {
                let batch = self.harvest_document(&document, &source.selector);
                debug!(
                    "Selector '{}' matched {} node(s) on {}",
                    source.selector_text,
                    batch.len(),
                    source.url
                );
                batch
            }
            Err(e) => {
                error!("Failed to fetch {}: {}", source.url, e);
                Vec::new()
            }
        }
    }

    /// Fetch all sources at once, wait for every one of them, then validate.
    pub async fn harvest(&self, sources: &[Source]) -> Vec<ServerRecord> {
        let pages = join_all(sources.iter().map(|source| self.harvest_source(source))).await;

        let mut servers = Vec::new();
        for (source, batch) in sources.iter().zip(pages) {
            let accepted = self.validator.validate_all(&batch);
            info!(
                "{}: {} server(s) from {} block(s)",
                source.url,
                accepted.len(),
                batch.len()
            );
            servers.extend(accepted);
        }
        servers
    }
}
