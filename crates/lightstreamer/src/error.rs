#[derive(thiserror::Error, Debug)]
pub enum StreamError {
    #[error("stream client already started")]
    AlreadyStarted,
    #[error("failed to build async runtime: {0}")]
    Runtime(#[source] std::io::Error),
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("malformed {kind} line: {line:?}")]
    Malformed { kind: &'static str, line: String },
    #[error("update for unknown subscription {0}")]
    UnknownSubscription(u32),
    #[error("item {item} out of range for subscription {subscription}")]
    ItemOutOfRange { subscription: u32, item: usize },
    #[error("update carries more than {expected} fields")]
    TooManyFields { expected: usize },
    #[error("field value is not valid utf-8")]
    InvalidUtf8,
    #[error("rebind requested before the session was created")]
    NoSession,
}
