use thiserror::Error;

/// Why a connection string could not be matched to a protocol
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConnectionUrlError {
    #[error("connection string has no scheme (expected scheme://...)")]
    MissingScheme,

    #[error("scheme '{scheme}' is shorter than {min} characters")]
    SchemeTooShort { scheme: String, min: usize },

    #[error("unrecognized database scheme '{0}'")]
    UnknownScheme(String),
}
