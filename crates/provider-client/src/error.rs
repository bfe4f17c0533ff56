use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("typed-record request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("typed-record provider returned HTTP {0}: {1}")]
    Api(u16, String),

    #[error("could not decode typed-record response: {0}")]
    Deserialization(String),

    #[error("malformed typed-record data: {0}")]
    InvalidData(String),

    #[error("missing provider credentials: {0}")]
    MissingCredentials(String),
}
