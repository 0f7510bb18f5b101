use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("validation: {0}")]
    Validation(String),

    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    #[error("webhook signature: {0}")]
    WebhookSignature(String),
}

/// Failure of a downstream side effect. Logged and swallowed by the notifier.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("{0} sink is not configured")]
    NotConfigured(&'static str),

    #[error("authorization failed: {0}")]
    Authorization(String),

    #[error("transport: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid email address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("could not build email: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("{0}")]
    Other(String),
}
