#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NeatIdError {
    #[error("prefix '{prefix}' is already registered for type '{existing}'")]
    DuplicatePrefix { prefix: String, existing: String },

    #[error("unknown prefix '{prefix}': registered prefixes are {known:?}")]
    UnknownPrefix { prefix: String, known: Vec<String> },

    #[error("not a valid neat id: {id}")]
    InvalidIdentifier { id: String },

    #[error("prefix must not be empty")]
    EmptyPrefix,

    #[error("codec configuration rejected: {reason}")]
    Config { reason: String },
}

impl From<sqids::Error> for NeatIdError {
    fn from(err: sqids::Error) -> Self {
        Self::Config {
            reason: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, NeatIdError>;
