/// Convenience result type used across famflow.
pub type FamflowResult<T> = Result<T, FamflowError>;

/// Top-level error taxonomy used by pipeline APIs.
///
/// Every stage fails fast; nothing here is retried.
#[derive(thiserror::Error, Debug)]
pub enum FamflowError {
    /// Invalid configuration or option values.
    #[error("validation error: {0}")]
    Validation(String),

    /// Malformed family graph (unresolved references, parentage cycles, ...).
    #[error("family graph error: {0}")]
    Graph(String),

    /// The external layout solver failed or produced unparseable output.
    #[error("layout error: {0}")]
    Layout(String),

    /// Timeline construction produced an unusable action sequence.
    #[error("timeline error: {0}")]
    Timeline(String),

    /// Errors while rasterizing or encoding frames.
    #[error("evaluation error: {0}")]
    Evaluation(String),

    /// Errors when deserializing records or configuration.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FamflowError {
    /// Build a [`FamflowError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`FamflowError::Graph`] value.
    pub fn graph(msg: impl Into<String>) -> Self {
        Self::Graph(msg.into())
    }

    /// Build a [`FamflowError::Layout`] value.
    pub fn layout(msg: impl Into<String>) -> Self {
        Self::Layout(msg.into())
    }

    /// Build a [`FamflowError::Timeline`] value.
    pub fn timeline(msg: impl Into<String>) -> Self {
        Self::Timeline(msg.into())
    }

    /// Build a [`FamflowError::Evaluation`] value.
    pub fn evaluation(msg: impl Into<String>) -> Self {
        Self::Evaluation(msg.into())
    }

    /// Build a [`FamflowError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
