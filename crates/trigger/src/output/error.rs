/// A file service or settings store failed outright.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{service} failed: {message}")]
pub struct CollaboratorError {
    pub service: String,
    pub message: String,
}

impl CollaboratorError {
    pub fn new(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OutputPathError {
    #[error("output folder '{folder}' is unusable for '{owner}' and fallback is disabled")]
    FallbackDisabled { owner: String, folder: String },

    #[error("no usable output folder for '{owner}'")]
    Unresolvable { owner: String },

    #[error("request has neither a job name nor an input file to name output after")]
    MissingBaseName,

    #[error(transparent)]
    Collaborator(#[from] CollaboratorError),
}
