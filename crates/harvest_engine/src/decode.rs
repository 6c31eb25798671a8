use atom_syndication::extension::ExtensionMap;
use atom_syndication::{Entry, Feed};
use harvest_core::{collapse_whitespace, shorten, strip_id_prefix, Record};

use crate::FieldLimits;

/// Records of one response, in document order, plus the declared total.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DecodedPage {
    pub records: Vec<Record>,
    pub total_results: Option<u64>,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("malformed feed: {0}")]
    Malformed(String),
}

pub trait PageDecoder: Send + Sync {
    fn decode(&self, bytes: &[u8]) -> Result<DecodedPage, DecodeError>;
}

/// Decodes arXiv-flavoured Atom feeds (`opensearch:totalResults`,
/// `arxiv:comment`, `arxiv:primary_category`).
#[derive(Debug, Clone, Default)]
pub struct AtomDecoder {
    limits: FieldLimits,
}

impl AtomDecoder {
    pub fn new(limits: FieldLimits) -> Self {
        Self { limits }
    }

    fn record(&self, entry: &Entry) -> Record {
        let authors = entry
            .authors()
            .iter()
            .map(|person| person.name().trim())
            .collect::<Vec<_>>()
            .join(", ");
        let summary = entry
            .summary()
            .map(|text| collapse_whitespace(text.as_str()))
            .unwrap_or_default();
        let category = extension(entry.extensions(), "arxiv", "primary_category")
            .and_then(|ext| ext.attrs().get("term").cloned())
            .or_else(|| {
                entry
                    .categories()
                    .first()
                    .map(|category| category.term().to_string())
            })
            .unwrap_or_default();
        let comment = extension(entry.extensions(), "arxiv", "comment")
            .and_then(|ext| ext.value())
            .map(collapse_whitespace)
            .unwrap_or_default();

        Record {
            id: strip_id_prefix(entry.id()),
            title: collapse_whitespace(entry.title().as_str()),
            published: entry
                .published()
                .map(|published| published.to_rfc3339())
                .unwrap_or_default(),
            category,
            authors: shorten(&authors, self.limits.max_authors_len),
            summary: shorten(&summary, self.limits.max_summary_len),
            comment,
        }
    }
}

impl PageDecoder for AtomDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<DecodedPage, DecodeError> {
        let feed = Feed::read_from(bytes).map_err(|err| DecodeError::Malformed(err.to_string()))?;
        let total_results = extension(feed.extensions(), "opensearch", "totalResults")
            .and_then(|ext| ext.value())
            .and_then(|value| value.trim().parse::<u64>().ok());
        let records = feed.entries().iter().map(|entry| self.record(entry)).collect();
        Ok(DecodedPage {
            records,
            total_results,
        })
    }
}

fn extension<'a>(
    map: &'a ExtensionMap,
    prefix: &str,
    name: &str,
) -> Option<&'a atom_syndication::extension::Extension> {
    map.get(prefix)?.get(name)?.first()
}
