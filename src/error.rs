pub type VizletResult<T> = Result<T, VizletError>;

#[derive(thiserror::Error, Debug)]
pub enum VizletError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("registry error: {0}")]
    Registry(String),

    #[error("render error: {0}")]
    Render(String),

    /// A failure attributed to one descriptor. Dispatch wraps renderer errors
    /// into this variant so logs point at the offending visualization.
    #[error("descriptor '{id}': {message}")]
    Descriptor { id: String, message: String },

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl VizletError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn registry(msg: impl Into<String>) -> Self {
        Self::Registry(msg.into())
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Attributes this error to a descriptor. An error already carrying an id
    /// keeps the original attribution.
    pub fn with_descriptor(self, id: impl Into<String>) -> Self {
        match self {
            Self::Descriptor { .. } => self,
            other => Self::Descriptor {
                id: id.into(),
                message: other.to_string(),
            },
        }
    }
}
