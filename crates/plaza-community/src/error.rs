use thiserror::Error;

pub type Result<T> = std::result::Result<T, CommunityError>;

#[derive(Error, Debug)]
pub enum CommunityError {
    /// Caller could not be resolved to a user
    #[error("authentication required")]
    Unauthorized,

    /// Post, comment, parent comment, user or like is absent
    #[error("{0} not found")]
    NotFound(String),

    /// Ownership, role or restriction violation
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Empty contents, malformed pagination
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Nesting depth exceeded and similar structural violations
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// Duplicate like
    #[error("conflict: {0}")]
    Conflict(String),

    /// The store failed; nothing was applied and the whole operation may be retried
    #[error("store unavailable: {0}")]
    Unavailable(#[from] anyhow::Error),
}

/// Status classification for the boundary layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Unauthorized,
    NotFound,
    Forbidden,
    Conflict,
    BadInput,
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Unauthorized => "unauthorized",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Forbidden => "forbidden",
            ErrorKind::Conflict => "conflict",
            ErrorKind::BadInput => "bad_input",
            ErrorKind::Internal => "internal",
        }
    }
}

impl CommunityError {
    pub fn not_found<T: ToString>(what: T) -> Self {
        Self::NotFound(what.to_string())
    }

    pub fn forbidden<T: ToString>(msg: T) -> Self {
        Self::Forbidden(msg.to_string())
    }

    pub fn invalid_input<T: ToString>(msg: T) -> Self {
        Self::InvalidInput(msg.to_string())
    }

    pub fn invalid_state<T: ToString>(msg: T) -> Self {
        Self::InvalidState(msg.to_string())
    }

    pub fn conflict<T: ToString>(msg: T) -> Self {
        Self::Conflict(msg.to_string())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Unauthorized => ErrorKind::Unauthorized,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Forbidden(_) => ErrorKind::Forbidden,
            Self::InvalidInput(_) | Self::InvalidState(_) => ErrorKind::BadInput,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::Unavailable(_) => ErrorKind::Internal,
        }
    }
}
