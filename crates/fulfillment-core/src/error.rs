use thiserror::Error;

#[derive(Debug, Error)]
pub enum FulfillmentError {
    /// A response item is missing its primary field.
    #[error("{kind} requires a {field}")]
    Construction { kind: &'static str, field: &'static str },

    #[error("Platform {platform} does not support rich messages")]
    UnsupportedPlatform { platform: String },

    /// A JSON-shaped field carried the wrong primitive type.
    #[error("{field} must be a {expected}")]
    InvalidFieldType {
        field: &'static str,
        expected: &'static str,
    },

    #[error("Unknown webhook format: body has neither `result` nor `queryResult`")]
    UnknownDialect,

    #[error("Request can not be empty")]
    MissingRequest,

    #[error("Response can not be empty")]
    MissingResponse,

    #[error("No handler for requested intent: {intent}")]
    NoHandler { intent: String },

    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error("No responses defined for platform: {platform}")]
    NoResponsesDefined { platform: String },

    #[error("Payload response for {platform} already defined")]
    DuplicatePayload { platform: String },

    #[error("Response has already been sent")]
    AlreadySent,

    #[error("Invalid context: {0}")]
    InvalidContext(String),

    #[error("Followup event must be a string or have a non-empty name")]
    InvalidFollowupEvent,

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl FulfillmentError {
    /// Short error code string, stable across releases.
    pub fn code(&self) -> &'static str {
        match self {
            FulfillmentError::Construction { .. } => "CONSTRUCTION_ERROR",
            FulfillmentError::UnsupportedPlatform { .. } => "UNSUPPORTED_PLATFORM",
            FulfillmentError::InvalidFieldType { .. } => "TYPE_ERROR",
            FulfillmentError::UnknownDialect => "UNKNOWN_DIALECT",
            FulfillmentError::MissingRequest => "MISSING_REQUEST",
            FulfillmentError::MissingResponse => "MISSING_RESPONSE",
            FulfillmentError::NoHandler { .. } => "NO_HANDLER",
            FulfillmentError::UnsupportedOperation(_) => "UNSUPPORTED_OPERATION",
            FulfillmentError::NoResponsesDefined { .. } => "NO_RESPONSES_DEFINED",
            FulfillmentError::DuplicatePayload { .. } => "DUPLICATE_PAYLOAD",
            FulfillmentError::AlreadySent => "ALREADY_SENT",
            FulfillmentError::InvalidContext(_) => "INVALID_CONTEXT",
            FulfillmentError::InvalidFollowupEvent => "INVALID_FOLLOWUP_EVENT",
            FulfillmentError::Transport(_) => "TRANSPORT_ERROR",
            FulfillmentError::Config(_) => "CONFIG_ERROR",
            FulfillmentError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// True for errors caused by malformed developer input rather than the request.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            FulfillmentError::Construction { .. }
                | FulfillmentError::UnsupportedPlatform { .. }
                | FulfillmentError::InvalidFieldType { .. }
                | FulfillmentError::InvalidContext(_)
                | FulfillmentError::InvalidFollowupEvent
                | FulfillmentError::DuplicatePayload { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, FulfillmentError>;
