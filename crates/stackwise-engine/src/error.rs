use stackwise_sources::SourceError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The price provider's credential is not configured.
    #[error("configuration missing: {0} is not set")]
    ConfigurationMissing(String),

    #[error("price search failed for '{item}': {source}")]
    PriceSearch {
        item: String,
        #[source]
        source: SourceError,
    },
}
