use thiserror::Error;

#[derive(Debug, Error)]
pub enum BigQueryError {
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("BigQuery API returned {status} while trying to {context}: {message}")]
    Api {
        status: u16,
        context: String,
        message: String,
    },

    #[error("Failed to decode BigQuery response while trying to {context}: {source}")]
    Decode {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Table `{0}` has no schema")]
    MissingSchema(String),

    #[error("Gave up after {attempts} attempts trying to {context}: {message}")]
    RetriesExhausted {
        attempts: u32,
        context: String,
        message: String,
    },
}
