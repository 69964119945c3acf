use thiserror::Error;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("surface message is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("surface message has no string \"type\" tag")]
    MissingType,

    #[error("invalid payload for surface message \"{tag}\": {source}")]
    InvalidPayload {
        tag: String,
        #[source]
        source: serde_json::Error,
    },
}
