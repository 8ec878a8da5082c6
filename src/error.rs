use thiserror::Error;

/// Errors raised by [`ChatHistory`](crate::ChatHistory) mutations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HistoryError {
    /// Every ephemeral message has been considered and the message still does not fit.
    #[error("not enough space in chat history: {required} tokens required, {available} available")]
    BudgetExhausted { required: usize, available: i64 },
}

/// Errors that abort a [`CompletionDriver`](crate::CompletionDriver) call chain.
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error(transparent)]
    Budget(#[from] HistoryError),

    /// The model asked for a function that was never declared.
    #[error("unknown function: {0}")]
    UnknownFunction(String),

    #[error("invalid arguments for function {function}: {source}")]
    ArgumentValidationFailed {
        function: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("function {function} failed: {source}")]
    FunctionFailed {
        function: String,
        #[source]
        source: anyhow::Error,
    },

    /// A function returned a non-text value and no stringifier was configured.
    #[error("function {0} returned a non-text value and no stringifier is configured")]
    MissingStringifier(String),

    #[error("completion response contained no selectable candidate")]
    NoCandidate,

    #[error("remote service failure: {0}")]
    RemoteServiceFailure(#[source] anyhow::Error),

    #[error("function call limit of {0} hops exceeded")]
    RecursionLimitExceeded(usize),
}

#[derive(Debug, Error)]
pub enum TokenizerError {
    #[error("failed to load encoding {encoding}")]
    LoadEncoding {
        encoding: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read settings file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse settings: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("environment variable {0} is not set")]
    MissingEnv(&'static str),
}
