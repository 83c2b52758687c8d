use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AllowlistError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid token id: {0}")]
    InvalidTokenId(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invariant violation: {0}")]
    Invariant(String),

    #[error("Allocation list must contain at least one entry")]
    EmptyAllocations,

    #[error("Merkle tree nodes must be 32 bytes")]
    InvalidNodeLength,

    #[error("Leaf index {index} out of bounds for {leaves} leaves")]
    IndexOutOfBounds { index: usize, leaves: usize },

    #[error("Merkle tree is invalid: {0}")]
    InvalidTree(String),

    #[error("Unknown leaf encoding: {0}")]
    UnknownEncoding(String),

    #[error("Unknown tree format: {0}")]
    UnknownFormat(String),

    #[error("Hex decode error: {0}")]
    HexDecode(String),

    #[error("Fixture error: {0}")]
    Fixture(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AllowlistError {
    /// True for errors caused by the caller's input rather than by the service.
    #[must_use]
    pub fn is_bad_request(&self) -> bool {
        matches!(
            self,
            Self::MissingParameter(_) | Self::InvalidAddress(_) | Self::InvalidTokenId(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, AllowlistError>;

#[inline]
pub fn validate_argument<T: AsRef<str>>(condition: bool, message: T) -> Result<()> {
    if !condition {
        Err(AllowlistError::InvalidArgument(
            message.as_ref().to_string(),
        ))
    } else {
        Ok(())
    }
}

#[inline]
pub fn invariant<T: AsRef<str>>(condition: bool, message: T) -> Result<()> {
    if !condition {
        Err(AllowlistError::Invariant(message.as_ref().to_string()))
    } else {
        Ok(())
    }
}
