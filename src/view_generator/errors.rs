use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ViewGeneratorError {
    #[error("Schema error: {0}")]
    SchemaError(String),
    #[error("Unsupported field shape at `{path}`: {detail}")]
    UnsupportedFieldShape { path: String, detail: String },
    #[error("Name collision: `{first}` and `{second}` both derive `{identifier}`")]
    NameCollision {
        identifier: String,
        first: String,
        second: String,
    },
}

impl ViewGeneratorError {
    /// Create an UnsupportedFieldShape error with the offending lineage path
    pub fn unsupported_shape(path: impl Into<String>, detail: impl Into<String>) -> Self {
        ViewGeneratorError::UnsupportedFieldShape {
            path: path.into(),
            detail: detail.into(),
        }
    }
}
